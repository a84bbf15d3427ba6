//! `lookupIP`: resolve a DNS name to its IPv4 addresses.

use std::net::IpAddr;

use async_trait::async_trait;
use maltego::{entity_types, Transform, TransformError, UiMessageType};

use crate::registry::TransformHandler;

/// Resolves the input entity's value with the system resolver and returns
/// one `maltego.IPv4Address` entity per distinct address.
#[derive(Debug, Clone, Copy, Default)]
pub struct LookupIp;

#[async_trait]
impl TransformHandler for LookupIp {
    async fn run(&self, transform: &mut Transform) -> Result<(), TransformError> {
        let host = transform
            .input_entity()
            .map(|e| e.value.trim().to_string())
            .unwrap_or_default();
        if host.is_empty() {
            return Err(TransformError::Failed("no host name to look up".into()));
        }

        tracing::info!(%host, "looking up IPs");
        let addrs = tokio::net::lookup_host((host.as_str(), 0))
            .await
            .map_err(|e| TransformError::Failed(format!("failed to lookup IPs for {host}: {e}")))?;

        let mut ips = Vec::new();
        for addr in addrs {
            if let IpAddr::V4(ip) = addr.ip() {
                if !ips.contains(&ip) {
                    ips.push(ip);
                }
            }
        }
        tracing::debug!(%host, ?ips, "lookup results");

        if ips.is_empty() {
            transform.add_ui_message(
                &format!("no IPv4 addresses found for {host}"),
                UiMessageType::PartialError,
            );
        }
        for ip in ips {
            transform
                .add_entity(entity_types::IPV4_ADDRESS, &ip.to_string())
                .set_link_label("resolves to");
        }
        Ok(())
    }
}
