//! Response presentation

use clap::ValueEnum;
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::io::Write;

/// How a response body is written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Body decoded as UTF-8 text
    #[default]
    #[value(skip)]
    Text,
    /// JSON re-indented for reading; raw text if the body is not JSON
    Pretty,
    /// Body bytes unmodified
    Binary,
}

pub fn render(mode: OutputMode, body: &[u8]) -> Vec<u8> {
    match mode {
        OutputMode::Text => as_text(body),
        OutputMode::Pretty => match serde_json::from_slice::<Value>(body) {
            Ok(value) => {
                let mut out = Vec::with_capacity(body.len() * 2);
                let mut ser = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
                match value.serialize(&mut ser) {
                    Ok(()) => {
                        out.push(b'\n');
                        out
                    }
                    Err(_) => as_text(body),
                }
            }
            Err(_) => as_text(body),
        },
        OutputMode::Binary => body.to_vec(),
    }
}

fn as_text(body: &[u8]) -> Vec<u8> {
    let mut out = String::from_utf8_lossy(body).into_owned().into_bytes();
    out.push(b'\n');
    out
}

/// Render `body` into `writer` and flush.
pub fn write_to(mode: OutputMode, body: &[u8], writer: &mut impl Write) -> std::io::Result<()> {
    writer.write_all(&render(mode, body))?;
    writer.flush()
}
