//! OAuth 1.0a request signing (HMAC-SHA1)
//!
//! JSON request bodies are not part of the signature base string; only the
//! query parameters and the `oauth_*` protocol parameters are signed.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use rand::{distributions::Alphanumeric, Rng};
use secrecy::ExposeSecret;
use sha1::Sha1;
use zeroize::Zeroizing;

use crate::credentials::OAuth1Credentials;
use crate::error::{PlatformError, Result};

type HmacSha1 = Hmac<Sha1>;

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const OAUTH_VERSION: &str = "1.0";
const NONCE_LEN: usize = 32;

/// Builds `Authorization: OAuth ...` header values for one user context
#[derive(Debug)]
pub struct OAuth1Signer {
    credentials: OAuth1Credentials,
}

impl OAuth1Signer {
    pub fn new(credentials: OAuth1Credentials) -> Self {
        Self { credentials }
    }

    /// Sign a request with a fresh nonce and the current timestamp
    ///
    /// `params` are the request's query parameters (unencoded).
    pub fn authorization_header(&self, method: &str, url: &str, params: &[(&str, &str)]) -> Result<String> {
        let nonce: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(NONCE_LEN)
            .map(char::from)
            .collect();
        let timestamp = chrono::Utc::now().timestamp().to_string();

        self.authorization_header_with(method, url, params, &nonce, &timestamp)
    }

    pub(crate) fn authorization_header_with(
        &self,
        method: &str,
        url: &str,
        params: &[(&str, &str)],
        nonce: &str,
        timestamp: &str,
    ) -> Result<String> {
        let consumer_key = self.credentials.consumer_key.expose_secret();
        let token = self.credentials.access_token.expose_secret();

        let mut oauth_params: Vec<(&str, &str)> = vec![
            ("oauth_consumer_key", consumer_key),
            ("oauth_nonce", nonce),
            ("oauth_signature_method", SIGNATURE_METHOD),
            ("oauth_timestamp", timestamp),
            ("oauth_token", token),
            ("oauth_version", OAUTH_VERSION),
        ];

        let mut all_params: Vec<(&str, &str)> = oauth_params.clone();
        all_params.extend_from_slice(params);

        let signature = self.sign(method, url, &all_params)?;
        oauth_params.push(("oauth_signature", &signature));
        oauth_params.sort();

        let header = oauth_params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(format!("OAuth {}", header))
    }

    fn sign(&self, method: &str, url: &str, params: &[(&str, &str)]) -> Result<String> {
        let base = signature_base_string(method, url, params);

        let key = Zeroizing::new(format!(
            "{}&{}",
            encode(self.credentials.consumer_secret.expose_secret()),
            encode(self.credentials.access_secret.expose_secret())
        ));

        let mut mac = HmacSha1::new_from_slice(key.as_bytes()).map_err(|e| {
            PlatformError::Authentication(format!("Failed to initialise request signer: {}", e))
        })?;
        mac.update(base.as_bytes());

        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }
}

/// RFC 3986 percent-encoding; only unreserved characters pass through
fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

fn signature_base_string(method: &str, url: &str, params: &[(&str, &str)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (encode(k), encode(v)))
        .collect();
    encoded.sort();

    let param_string = encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        encode(url),
        encode(&param_string)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::CredentialStore;

    // Published OAuth 1.0a signing walkthrough for the platform's v1.1 API
    fn reference_signer() -> OAuth1Signer {
        let store = CredentialStore::parse(
            "CONSUMER_KEY=xvz1evFS4wEEPTGEFPHBog\n\
             CONSUMER_SECRET=kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw\n\
             ACCESS_TOKEN=370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb\n\
             ACCESS_SECRET=LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE\n",
        )
        .unwrap();
        OAuth1Signer::new(OAuth1Credentials::from_store(&store).unwrap())
    }

    #[test]
    fn test_encode_is_rfc3986() {
        assert_eq!(encode("Ladies + Gentlemen"), "Ladies%20%2B%20Gentlemen");
        assert_eq!(encode("a-b_c.d~e"), "a-b_c.d~e");
        assert_eq!(encode("!"), "%21");
    }

    #[test]
    fn test_reference_signature() {
        let header = reference_signer()
            .authorization_header_with(
                "POST",
                "https://api.twitter.com/1.1/statuses/update.json",
                &[
                    ("include_entities", "true"),
                    ("status", "Hello Ladies + Gentlemen, a signed OAuth request!"),
                ],
                "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg",
                "1318622958",
            )
            .unwrap();

        assert!(header.contains("oauth_signature=\"hCtSmYh%2BiHYCEqBWrE7C7hYmtUk%3D\""));
    }

    #[test]
    fn test_header_layout() {
        let header = reference_signer()
            .authorization_header_with("POST", "https://api.twitter.com/2/tweets", &[], "abc", "1")
            .unwrap();

        assert!(header.starts_with("OAuth oauth_consumer_key=\"xvz1evFS4wEEPTGEFPHBog\", "));
        assert!(header.contains("oauth_nonce=\"abc\""));
        assert!(header.contains("oauth_signature_method=\"HMAC-SHA1\""));
        assert!(header.contains("oauth_timestamp=\"1\""));
        assert!(header.ends_with("oauth_version=\"1.0\""));
        assert!(!header.contains("kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw"));
    }

    #[test]
    fn test_fresh_nonce_per_request() {
        let signer = reference_signer();
        let first = signer.authorization_header("POST", "https://api.twitter.com/2/tweets", &[]).unwrap();
        let second = signer.authorization_header("POST", "https://api.twitter.com/2/tweets", &[]).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_base_string_sorts_and_encodes() {
        let base = signature_base_string("get", "https://example.com/a b", &[("z", "1"), ("a", "x y")]);
        assert_eq!(base, "GET&https%3A%2F%2Fexample.com%2Fa%20b&a%3Dx%2520y%26z%3D1");
    }
}
