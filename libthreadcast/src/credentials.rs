//! Credential loading for Threadcast
//!
//! Secrets live in small `KEY=VALUE` text files, one secret per line:
//!
//! ```text
//! CONSUMER_KEY=...
//! CONSUMER_SECRET=...
//! ACCESS_TOKEN=...
//! ACCESS_SECRET=...
//! ```
//!
//! Values are wrapped in [`SecretString`] as soon as they are read so they
//! are zeroed on drop and never show up in `Debug` output or logs.
//!
//! # Example
//!
//! ```no_run
//! use libthreadcast::credentials::{CredentialStore, OAuth1Credentials};
//!
//! # fn example() -> libthreadcast::error::Result<()> {
//! let store = CredentialStore::load("/home/me/.secrets/x-api")?;
//! let oauth = OAuth1Credentials::from_store(&store)?;
//! # Ok(())
//! # }
//! ```

use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{CredentialError, Result};

pub const CONSUMER_KEY: &str = "CONSUMER_KEY";
pub const CONSUMER_SECRET: &str = "CONSUMER_SECRET";
pub const ACCESS_TOKEN: &str = "ACCESS_TOKEN";
pub const ACCESS_SECRET: &str = "ACCESS_SECRET";
pub const BEARER_TOKEN: &str = "BEARER_TOKEN";

/// Named secrets read from one or more credential files
#[derive(Debug, Default)]
pub struct CredentialStore {
    secrets: HashMap<String, SecretString>,
}

impl CredentialStore {
    /// Read a credentials file
    ///
    /// # Errors
    ///
    /// - `CredentialError::Io` if the file cannot be read
    /// - `CredentialError::MalformedLine` for a non-blank, non-comment line
    ///   without `=`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(CredentialError::Io)?;
        let store = Self::parse(&content)?;
        tracing::debug!(
            "Loaded {} credential(s) from {}",
            store.secrets.len(),
            path.display()
        );
        Ok(store)
    }

    /// Parse `KEY=VALUE` lines. Splits on the first `=` only.
    pub fn parse(content: &str) -> Result<Self> {
        let mut secrets = HashMap::new();

        for (index, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (key, value) = line
                .split_once('=')
                .ok_or(CredentialError::MalformedLine { line: index + 1 })?;
            let key = key.trim();
            if key.is_empty() {
                return Err(CredentialError::MalformedLine { line: index + 1 }.into());
            }

            secrets.insert(key.to_string(), SecretString::from(value.trim().to_string()));
        }

        Ok(Self { secrets })
    }

    /// Fold another store into this one; keys in `other` win
    pub fn merge(mut self, other: CredentialStore) -> Self {
        self.secrets.extend(other.secrets);
        self
    }

    pub fn get(&self, key: &str) -> Option<&SecretString> {
        self.secrets.get(key)
    }

    /// Look up a secret that must be present
    pub fn require(&self, key: &str) -> Result<&SecretString> {
        self.secrets
            .get(key)
            .ok_or_else(|| CredentialError::MissingKey(key.to_string()).into())
    }

    /// App-only bearer token, if one was loaded
    pub fn bearer_token(&self) -> Option<SecretString> {
        self.get(BEARER_TOKEN).map(copy_secret)
    }
}

fn copy_secret(secret: &SecretString) -> SecretString {
    SecretString::from(secret.expose_secret().to_string())
}

/// OAuth 1.0a user-context credentials
#[derive(Debug)]
pub struct OAuth1Credentials {
    pub consumer_key: SecretString,
    pub consumer_secret: SecretString,
    pub access_token: SecretString,
    pub access_secret: SecretString,
}

impl OAuth1Credentials {
    /// Pull the four OAuth 1.0a secrets out of a store
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::MissingKey` naming the first absent key.
    pub fn from_store(store: &CredentialStore) -> Result<Self> {
        Ok(Self {
            consumer_key: copy_secret(store.require(CONSUMER_KEY)?),
            consumer_secret: copy_secret(store.require(CONSUMER_SECRET)?),
            access_token: copy_secret(store.require(ACCESS_TOKEN)?),
            access_secret: copy_secret(store.require(ACCESS_SECRET)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const FULL: &str = "CONSUMER_KEY=ck\nCONSUMER_SECRET=cs\nACCESS_TOKEN=at\nACCESS_SECRET=as\n";

    #[test]
    fn test_parse_key_value_lines() {
        let store = CredentialStore::parse(FULL).unwrap();
        assert_eq!(store.secrets.len(), 4);
        assert_eq!(store.require(CONSUMER_KEY).unwrap().expose_secret(), "ck");
        assert_eq!(store.require(ACCESS_SECRET).unwrap().expose_secret(), "as");
    }

    #[test]
    fn test_parse_splits_on_first_equals_only() {
        let store = CredentialStore::parse("BEARER_TOKEN=AAAA%3D=tail==\n").unwrap();
        assert_eq!(
            store.bearer_token().unwrap().expose_secret(),
            "AAAA%3D=tail=="
        );
    }

    #[test]
    fn test_parse_skips_blank_and_comment_lines() {
        let store = CredentialStore::parse("\n# x api\nCONSUMER_KEY=ck\n   \n").unwrap();
        assert_eq!(store.secrets.len(), 1);
    }

    #[test]
    fn test_parse_rejects_line_without_separator() {
        let err = CredentialStore::parse("CONSUMER_KEY=ck\njunk\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_parse_rejects_empty_key() {
        let err = CredentialStore::parse("=value\n").unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let err = CredentialStore::load(dir.path().join("x-api")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("Failed to read credentials file"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("x-api");
        std::fs::write(&path, FULL).unwrap();

        let store = CredentialStore::load(&path).unwrap();
        assert!(store.get(ACCESS_TOKEN).is_some());
    }

    #[test]
    fn test_oauth1_requires_all_keys() {
        let store = CredentialStore::parse("CONSUMER_KEY=ck\nCONSUMER_SECRET=cs\n").unwrap();
        let err = OAuth1Credentials::from_store(&store).unwrap_err();
        assert!(err.to_string().contains("Missing credential: ACCESS_TOKEN"));
    }

    #[test]
    fn test_merge_adds_bearer_token() {
        let main = CredentialStore::parse(FULL).unwrap();
        assert!(main.bearer_token().is_none());

        let bearer = CredentialStore::parse("BEARER_TOKEN=bt\n").unwrap();
        let merged = main.merge(bearer);
        assert_eq!(merged.secrets.len(), 5);
        assert_eq!(merged.bearer_token().unwrap().expose_secret(), "bt");
    }

    #[test]
    fn test_debug_output_redacts_values() {
        let store = CredentialStore::parse("CONSUMER_SECRET=hunter2\n").unwrap();
        let debug = format!("{:?}", store);
        assert!(!debug.contains("hunter2"));
    }
}
