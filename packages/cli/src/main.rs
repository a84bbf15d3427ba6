//! `mtg`: Maltego transform protocol command-line interface.
//!
//! Provides three subcommands:
//!
//! - **`inspect`**: decode a message and print a human-readable summary.
//! - **`exception`**: print an exception envelope.
//! - **`resolve`**: a local transform resolving a DNS name to IPv4 addresses.
//!
//! XML goes to stdout; logs and progress updates go to stderr.

use std::fs;
use std::io::{self, Read};
use std::net::{IpAddr, ToSocketAddrs};
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use maltego::{
    die, entity_types, print_progress, summary, LocalTransform, Transform, UiMessageType,
};

/// mtg: Maltego transform protocol CLI
///
/// Inspect transform messages and run local transforms.
#[derive(Parser)]
#[command(name = "mtg", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode a transform message and print a summary of it.
    ///
    /// Accepts request, response and exception envelopes. Exits 1 if the
    /// input does not decode.
    ///
    /// Pass `-` as FILE to read from stdin.
    Inspect {
        /// Path to an XML file, or `-` for stdin.
        file: PathBuf,

        /// Print the decoded message as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Print an exception envelope carrying TEXT.
    ///
    /// Examples:
    ///   mtg exception "API key missing"
    ///   mtg exception --code 429 "rate limited" "try again later"
    Exception {
        /// Exception code attached to every message.
        #[arg(short = 'c', long, env = "MTG_EXCEPTION_CODE", default_value = "500")]
        code: String,

        /// One exception per argument.
        #[arg(required = true, value_name = "TEXT")]
        messages: Vec<String>,
    },

    /// Local transform: resolve a DNS name to IPv4Address entities.
    ///
    /// Invoked by the client as `mtg resolve VALUE PROPS`, where PROPS is a
    /// `#`-separated list of `key=value` pairs. Lookup failures are reported
    /// to the client as a fatal UI message.
    Resolve {
        /// The input value followed by the property arguments.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "ARGS")]
        args: Vec<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "maltego=warn,mtg=warn".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Inspect { file, json } => {
            let xml = read_input(&file);
            let message = maltego::decode(&xml).unwrap_or_else(|e| {
                eprintln!("error: {e}");
                process::exit(1);
            });
            if json {
                match serde_json::to_string_pretty(&message) {
                    Ok(s) => println!("{s}"),
                    Err(e) => fatal(&format!("failed to serialise message: {e}")),
                }
            } else {
                print!("{}", summary::render_message(&message));
            }
        }

        Command::Exception { code, messages } => {
            let mut t = Transform::new();
            for text in &messages {
                t.add_exception(text, &code);
            }
            println!("{}", t.render_as_exception());
        }

        Command::Resolve { args } => {
            let local = LocalTransform::parse(&args).unwrap_or_else(|e| {
                tracing::error!("{e}: {args:?}");
                eprintln!("mtg: {e}");
                process::exit(1);
            });
            println!("{}", resolve(&local));
        }
    }
}

/// Run the resolve transform and return its rendered reply.
fn resolve(local: &LocalTransform) -> String {
    let host = local.value.trim();
    if host.is_empty() {
        die("empty value", "no host name to resolve");
    }
    report_progress(0);

    let addrs = (host, 0)
        .to_socket_addrs()
        .unwrap_or_else(|e| die(e, &format!("failed to resolve {host}")));

    let mut ips = Vec::new();
    for addr in addrs {
        if let IpAddr::V4(ip) = addr.ip() {
            if !ips.contains(&ip) {
                ips.push(ip);
            }
        }
    }
    tracing::debug!(%host, ?ips, "lookup results");

    let mut t = Transform::new();
    for ip in &ips {
        let entity = t.add_entity(entity_types::IPV4_ADDRESS, &ip.to_string());
        entity.set_link_label("resolves to");
        if let Some(note) = local.values.get("note") {
            entity.set_note(note);
        }
    }
    if ips.is_empty() {
        t.add_ui_message(
            &format!("no IPv4 addresses found for {host}"),
            UiMessageType::PartialError,
        );
    }
    t.add_ui_message("complete", UiMessageType::Inform);
    report_progress(100);
    t.render()
}

fn report_progress(percentage: i32) {
    if let Err(e) = print_progress(percentage) {
        tracing::warn!("{e}");
    }
}

/// Read the full contents of a file, or stdin when the path is `"-"`.
fn read_input(path: &PathBuf) -> Vec<u8> {
    if path.to_str() == Some("-") {
        let mut buf = Vec::new();
        io::stdin()
            .read_to_end(&mut buf)
            .unwrap_or_else(|e| fatal(&format!("failed to read stdin: {}", e)));
        buf
    } else {
        fs::read(path)
            .unwrap_or_else(|e| fatal(&format!("failed to read {}: {}", path.display(), e)))
    }
}

/// Print an error message to stderr and exit with code 2.
fn fatal(msg: &str) -> ! {
    eprintln!("mtg: {}", msg);
    process::exit(2);
}
