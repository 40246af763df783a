//! Core module - credentials and error handling

pub mod config;
pub mod error;

pub use config::{Credentials, load_credentials, load_from};
pub use error::{Error, ErrorKind, Result};
