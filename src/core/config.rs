//! Credential loading from `~/.shadowserver.api`.
//!
//! The file uses the INI layout the Shadowserver tooling has always shipped
//! with:
//!
//! ```text
//! [api]
//! key = 123456798
//! secret = MySecret
//! uri = https://transform.shadowserver.org/api2/
//! ```
//!
//! Credentials are read once per process and passed by value into the
//! client; nothing here is global.

use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::core::{Error, Result};

/// File name of the credentials dotfile, relative to `$HOME`.
pub const CONFIG_FILE_NAME: &str = ".shadowserver.api";

const SECTION: &str = "api";
const DEFAULT_SECTION: &str = "DEFAULT";
const INLINE_ORIGIN: &str = "<inline>";

/// API key, shared secret and base URI for the remote service.
pub struct Credentials {
    key: String,
    secret: SecretString,
    base_uri: String,
}

impl Credentials {
    /// Build credentials directly. All three fields must be non-empty.
    pub fn new(
        key: impl Into<String>,
        secret: impl Into<String>,
        base_uri: impl Into<String>,
    ) -> Result<Self> {
        Self::validated(key.into(), secret.into(), base_uri.into(), Path::new(INLINE_ORIGIN))
    }

    /// Parse the text of a credentials file. `origin` is only used in
    /// error messages.
    pub fn parse(text: &str, origin: impl AsRef<Path>) -> Result<Self> {
        let origin = origin.as_ref();
        let sections = parse_sections(text).map_err(|reason| Error::malformed(origin, reason))?;

        if !sections.contains_key(SECTION) {
            return Err(Error::malformed(origin, format!("missing [{}] section", SECTION)));
        }

        let field = |name: &str| -> Result<String> {
            [SECTION, DEFAULT_SECTION]
                .iter()
                .find_map(|s| sections.get(*s).and_then(|entries| entries.get(name)))
                .cloned()
                .ok_or_else(|| {
                    Error::malformed(origin, format!("missing field `{}` in [{}]", name, SECTION))
                })
        };

        Self::validated(field("key")?, field("secret")?, field("uri")?, origin)
    }

    fn validated(key: String, secret: String, base_uri: String, origin: &Path) -> Result<Self> {
        for (name, value) in [("key", &key), ("secret", &secret), ("uri", &base_uri)] {
            if value.is_empty() {
                return Err(Error::malformed(
                    origin,
                    format!("field `{}` in [{}] is empty", name, SECTION),
                ));
            }
        }

        Ok(Self {
            key,
            secret: SecretString::from(secret),
            base_uri,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Shared secret bytes, for the signer only.
    pub(crate) fn secret(&self) -> &str {
        self.secret.expose_secret()
    }
}

impl Clone for Credentials {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            secret: SecretString::from(self.secret.expose_secret().to_owned()),
            base_uri: self.base_uri.clone(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shown: String = self.key.chars().take(4).collect();
        f.debug_struct("Credentials")
            .field("key", &format!("{}...", shown))
            .field("secret", &"[REDACTED]")
            .field("base_uri", &self.base_uri)
            .finish()
    }
}

/// `$HOME/.shadowserver.api`
pub fn default_path() -> Result<PathBuf> {
    match std::env::var_os("HOME") {
        Some(home) if !home.is_empty() => Ok(PathBuf::from(home).join(CONFIG_FILE_NAME)),
        _ => Err(Error::HomeNotSet),
    }
}

/// Load credentials from the well-known dotfile.
pub fn load_credentials() -> Result<Credentials> {
    load_from(default_path()?)
}

/// Load credentials from an explicit file.
pub fn load_from(path: impl AsRef<Path>) -> Result<Credentials> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| Error::CredentialsNotFound {
        path: path.to_path_buf(),
        source,
    })?;

    let creds = Credentials::parse(&content, path)?;
    tracing::debug!("Loaded credentials from {}", path.display());
    Ok(creds)
}

type Sections = HashMap<String, HashMap<String, String>>;

/// Minimal INI reader: `[section]` headers (name taken verbatim),
/// `name = value` / `name: value` entries, `#`/`;` comment lines, indented
/// continuation lines. Entry names are case-insensitive; duplicates are
/// rejected.
fn parse_sections(text: &str) -> std::result::Result<Sections, String> {
    let mut sections: Sections = HashMap::new();
    let mut current: Option<String> = None;
    let mut last_name: Option<String> = None;

    for (idx, raw) in text.lines().enumerate() {
        let lineno = idx + 1;
        let line = raw.trim();

        if line.is_empty() {
            last_name = None;
            continue;
        }
        if line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        // Continuation of the previous value
        if raw.starts_with(char::is_whitespace) {
            if let (Some(section), Some(name)) = (&current, &last_name) {
                if let Some(value) = sections.get_mut(section).and_then(|e| e.get_mut(name)) {
                    value.push('\n');
                    value.push_str(line);
                    continue;
                }
            }
        }

        if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let name = header.to_string();
            if sections.contains_key(&name) {
                return Err(format!("line {}: duplicate section [{}]", lineno, name));
            }
            sections.insert(name.clone(), HashMap::new());
            current = Some(name);
            last_name = None;
            continue;
        }

        let Some(split) = line.find(['=', ':']) else {
            return Err(format!("line {}: expected `name = value`", lineno));
        };
        let Some(section) = &current else {
            return Err(format!("line {}: entry outside of any section", lineno));
        };

        let name = line[..split].trim().to_lowercase();
        let value = line[split + 1..].trim().to_string();
        if name.is_empty() {
            return Err(format!("line {}: missing name before delimiter", lineno));
        }

        let entries = sections.entry(section.clone()).or_default();
        if entries.contains_key(&name) {
            return Err(format!("line {}: duplicate field `{}` in [{}]", lineno, name, section));
        }
        entries.insert(name.clone(), value);
        last_name = Some(name);
    }

    Ok(sections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ErrorKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const SAMPLE: &str = "[api]\nkey = K1\nsecret = S1\nuri = https://example.org/api/\n";

    fn scratch_file(content: &str) -> PathBuf {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!("shadow-call-{}-{}.api", std::process::id(), n));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_well_formed() {
        let path = scratch_file(SAMPLE);
        let creds = load_from(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(creds.key(), "K1");
        assert_eq!(creds.secret(), "S1");
        assert_eq!(creds.base_uri(), "https://example.org/api/");
    }

    #[test]
    fn test_missing_file() {
        let err = load_from("/definitely/not/here/.shadowserver.api").unwrap_err();
        assert!(matches!(err, Error::CredentialsNotFound { .. }));
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_missing_section() {
        let err = Credentials::parse("[other]\nkey = K1\n", "test").unwrap_err();
        assert!(matches!(err, Error::MalformedCredentials { .. }));
        assert!(err.to_string().contains("missing [api] section"));
    }

    #[test]
    fn test_missing_and_empty_fields() {
        let err = Credentials::parse("[api]\nkey = K1\nsecret = S1\n", "test").unwrap_err();
        assert!(err.to_string().contains("missing field `uri`"));

        let err = Credentials::parse("[api]\nkey = K1\nsecret =\nuri = u\n", "test").unwrap_err();
        assert!(err.to_string().contains("field `secret` in [api] is empty"));
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_ini_dialect() {
        let text = "# shadowserver\n\
                    [DEFAULT]\n\
                    uri = https://transform.shadowserver.org/api2/\n\
                    \n\
                    [api]\n\
                    ; numeric keys stay strings\n\
                    KEY: 123456798\n\
                    secret   =   My Secret  \n";
        let creds = Credentials::parse(text, "test").unwrap();
        assert_eq!(creds.key(), "123456798");
        assert_eq!(creds.secret(), "My Secret");
        assert_eq!(creds.base_uri(), "https://transform.shadowserver.org/api2/");
    }

    #[test]
    fn test_continuation_line() {
        let text = "[api]\nkey = K1\nsecret = first\n  second\nuri = u\n";
        let creds = Credentials::parse(text, "test").unwrap();
        assert_eq!(creds.secret(), "first\nsecond");
    }

    #[test]
    fn test_section_name_is_verbatim() {
        let err = Credentials::parse("[ api ]\nkey = K1\nsecret = S1\nuri = u\n", "test").unwrap_err();
        assert!(err.to_string().contains("missing [api] section"));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(Credentials::parse("key = K1\n[api]\n", "test").is_err());
        assert!(Credentials::parse("[api]\nnot an entry\n", "test").is_err());
        assert!(Credentials::parse("[api]\nkey = a\nkey = b\n", "test").is_err());
        assert!(Credentials::parse("[api]\n[api]\n", "test").is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let creds = Credentials::new("ABCDEFGH", "hunter2", "https://example.org/").unwrap();
        let shown = format!("{:?}", creds);
        assert!(!shown.contains("hunter2"));
        assert!(!shown.contains("ABCDEFGH"));
        assert!(shown.contains("[REDACTED]"));
    }

    #[test]
    fn test_new_rejects_empty() {
        assert!(Credentials::new("", "s", "u").is_err());
        assert!(Credentials::new("k", "s", "").is_err());
    }
}
