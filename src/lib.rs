//! shadow-call - Core Library
//! Signs and sends a single JSON request to the Shadowserver API

pub mod client;
pub mod core;
pub mod output;
pub mod signer;

// Re-exports
pub use client::{ApiClient, ClientConfig, SignedEnvelope, invoke, parse_request, sign_request};
pub use self::core::{Credentials, Error, ErrorKind, Result, load_credentials};
pub use output::OutputMode;
