//! Local transforms: executables the client runs directly.
//!
//! The client invokes a local transform as `program VALUE PROPS...`, where
//! each `PROPS` argument is a `#`-separated list of `key=value` pairs. The
//! transform writes its reply to stdout and progress updates to stderr.

use std::collections::HashMap;
use std::io::Write;

use thiserror::Error;

use crate::transform::Transform;
use crate::types::UiMessageType;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LocalArgsError {
    #[error("need at least 2 arguments, got {0}")]
    NotEnoughArguments(usize),

    #[error("invalid percentage value: {0}")]
    InvalidPercentage(i32),
}

/// The input of a local transform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalTransform {
    /// The input entity's value, `args[0]`.
    pub value: String,
    /// Entity properties passed in the remaining arguments.
    pub values: HashMap<String, String>,
}

impl LocalTransform {
    /// Parse the client's arguments, without the program name.
    ///
    /// Newlines inside an argument become spaces. A chunk with more than one
    /// `=` keeps everything after the first one as the value; a chunk with
    /// none maps to `""`. Later keys overwrite earlier ones.
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self, LocalArgsError> {
        if args.len() < 2 {
            return Err(LocalArgsError::NotEnoughArguments(args.len()));
        }

        let mut values = HashMap::new();
        for arg in &args[1..] {
            let arg = arg.as_ref().replace('\n', " ");
            if arg.is_empty() {
                continue;
            }
            for chunk in arg.split('#') {
                let parts: Vec<&str> = chunk.split('=').collect();
                let value = if parts.len() == 2 {
                    clean(parts[1])
                } else {
                    clean(&parts[1..].join("="))
                };
                values.insert(parts[0].to_string(), value);
            }
        }

        Ok(Self {
            value: args[0].as_ref().to_string(),
            values,
        })
    }

    /// Parse the process arguments, terminating with exit code 1 when there
    /// are too few.
    pub fn from_args_or_exit() -> Self {
        let args: Vec<String> = std::env::args().skip(1).collect();
        match Self::parse(&args) {
            Ok(local) => local,
            Err(e) => {
                tracing::error!("{e}: {args:?}");
                eprintln!("{e}: {args:?}");
                std::process::exit(1);
            }
        }
    }

    /// Value of property `key`, or `""`.
    pub fn get(&self, key: &str) -> &str {
        self.values.get(key).map(String::as_str).unwrap_or("")
    }
}

/// Undo the client's argument escaping in a single left-to-right pass.
fn clean(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while !rest.is_empty() {
        if let Some(tail) = rest.strip_prefix("&amp;") {
            out.push('&');
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix("\\=") {
            out.push('=');
            rest = tail;
        } else {
            let mut chars = rest.chars();
            if let Some(c) = chars.next() {
                out.push(c);
            }
            rest = chars.as_str();
        }
    }
    out
}

/// The reply printed by [`die`]: one `FatalError` UI message.
pub fn fatal_output(err: impl std::fmt::Display, msg: &str) -> String {
    let mut t = Transform::new();
    t.add_ui_message(&format!("{msg}: {err}"), UiMessageType::FatalError);
    t.render()
}

/// Report a fatal error to the client and exit.
///
/// The exit code is 0: the client only shows the UI message of a transform
/// that exited cleanly.
pub fn die(err: impl std::fmt::Display, msg: &str) -> ! {
    tracing::error!("{msg}: {err}");
    println!("{}", fatal_output(&err, msg));
    std::process::exit(0);
}

/// Move the client's progress bar to `percentage`.
pub fn print_progress(percentage: i32) -> Result<(), LocalArgsError> {
    write_progress(&mut std::io::stderr(), percentage)
}

fn write_progress(out: &mut impl Write, percentage: i32) -> Result<(), LocalArgsError> {
    if !(0..=100).contains(&percentage) {
        return Err(LocalArgsError::InvalidPercentage(percentage));
    }
    if let Err(e) = writeln!(out, "%{percentage}") {
        tracing::warn!("failed to write progress update: {e}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_value_and_properties() {
        let t = LocalTransform::parse(&["Tom", "name=Tom#age=3"]).unwrap();
        assert_eq!(t.value, "Tom");
        assert_eq!(t.get("name"), "Tom");
        assert_eq!(t.get("age"), "3");
        assert_eq!(t.values.len(), 2);
    }

    #[test]
    fn too_few_arguments_is_an_error() {
        assert_eq!(
            LocalTransform::parse(&["only"]),
            Err(LocalArgsError::NotEnoughArguments(1))
        );
        assert_eq!(
            LocalTransform::parse::<&str>(&[]),
            Err(LocalArgsError::NotEnoughArguments(0))
        );
    }

    #[test]
    fn extra_equals_signs_stay_in_value() {
        let t = LocalTransform::parse(&["v", "url=http://x/?a=1"]).unwrap();
        assert_eq!(t.get("url"), "http://x/?a=1");
    }

    #[test]
    fn chunk_without_equals_maps_to_empty() {
        let t = LocalTransform::parse(&["v", "flag#k=v"]).unwrap();
        assert_eq!(t.values.get("flag").map(String::as_str), Some(""));
        assert_eq!(t.get("k"), "v");
    }

    #[test]
    fn escapes_are_cleaned() {
        let t = LocalTransform::parse(&["v", "a=Tom&amp;Jerry#b=x\\=y"]).unwrap();
        assert_eq!(t.get("a"), "Tom&Jerry");
        // `\=` still splits the chunk; the rejoined value is then cleaned.
        assert_eq!(t.get("b"), "x=y");
    }

    #[test]
    fn clean_is_a_single_pass() {
        assert_eq!(clean("&amp;amp;"), "&amp;");
        assert_eq!(clean("a\\=b"), "a=b");
        assert_eq!(clean("ünï"), "ünï");
    }

    #[test]
    fn newlines_become_spaces_and_empty_args_are_skipped() {
        let t = LocalTransform::parse(&["v", "", "note=line1\nline2"]).unwrap();
        assert_eq!(t.get("note"), "line1 line2");
        assert_eq!(t.values.len(), 1);
    }

    #[test]
    fn later_keys_overwrite() {
        let t = LocalTransform::parse(&["v", "k=1", "k=2"]).unwrap();
        assert_eq!(t.get("k"), "2");
    }

    #[test]
    fn fatal_output_is_a_fatal_ui_message() {
        let out = fatal_output("connection refused", "lookup failed");
        assert_eq!(
            out,
            r#"<MaltegoMessage><MaltegoTransformResponseMessage><Entities></Entities><UIMessages><UIMessage MessageType="FatalError">lookup failed: connection refused</UIMessage></UIMessages></MaltegoTransformResponseMessage></MaltegoMessage>"#
        );
    }

    #[test]
    fn progress_format_and_range() {
        let mut buf = Vec::new();
        write_progress(&mut buf, 42).unwrap();
        write_progress(&mut buf, 0).unwrap();
        assert_eq!(String::from_utf8(buf.clone()).unwrap(), "%42\n%0\n");

        assert_eq!(
            write_progress(&mut buf, 101),
            Err(LocalArgsError::InvalidPercentage(101))
        );
        assert_eq!(
            write_progress(&mut buf, -1),
            Err(LocalArgsError::InvalidPercentage(-1))
        );
        assert_eq!(buf.len(), "%42\n%0\n".len());
    }
}
