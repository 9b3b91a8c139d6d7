//! X (Twitter) API v2 client
//!
//! Posts are created with `POST /2/tweets`, signed with OAuth 1.0a user
//! context. Handle lookups use the app-only bearer token when one is
//! configured and fall back to the user-context signature otherwise.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::credentials::{CredentialStore, OAuth1Credentials};
use crate::error::{PlatformError, Result};
use crate::platforms::oauth::OAuth1Signer;
use crate::platforms::Platform;
use crate::types::{FollowStatus, PostRequest, PostResult};

pub const CHARACTER_LIMIT: usize = 280;

/// Longest slice of an error body kept in follow error messages
const ERROR_BODY_PREVIEW: usize = 200;

#[derive(Debug, Serialize)]
struct CreatePostBody<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply: Option<ReplySettings<'a>>,
}

#[derive(Debug, Serialize)]
struct ReplySettings<'a> {
    in_reply_to_tweet_id: &'a str,
}

#[derive(Debug, Serialize)]
struct FollowBody<'a> {
    target_user_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct IdData {
    id: String,
}

pub struct XClient {
    http: Client,
    api_base: String,
    signer: OAuth1Signer,
    bearer: Option<SecretString>,
}

impl XClient {
    /// Create a client for `api_base` (e.g., "https://api.twitter.com")
    pub fn new(
        api_base: &str,
        credentials: OAuth1Credentials,
        bearer: Option<SecretString>,
    ) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("threadcast/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PlatformError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            signer: OAuth1Signer::new(credentials),
            bearer,
        })
    }

    /// Load the configured credential files and build a client
    ///
    /// # Errors
    ///
    /// Fails before any network activity if a credentials file is missing,
    /// malformed, or lacks one of the OAuth 1.0a keys.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut store = CredentialStore::load(config.credentials_path())?;
        if let Some(bearer_path) = config.bearer_path() {
            store = store.merge(CredentialStore::load(bearer_path)?);
        }

        let oauth = OAuth1Credentials::from_store(&store)?;
        Self::new(&config.api.base_url, oauth, store.bearer_token())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn user_auth(&self, method: &str, url: &str) -> Result<String> {
        self.signer.authorization_header(method, url, &[])
    }
}

/// Turn a create-post response into a [`PostResult`]
///
/// Only a 201 whose body carries `data.id` counts as a success.
pub fn classify_post_response(request: &PostRequest, status: u16, body: &str) -> PostResult {
    if status == StatusCode::CREATED.as_u16() {
        if let Ok(envelope) = serde_json::from_str::<DataEnvelope<IdData>>(body) {
            return PostResult::Success {
                post_id: envelope.data.id,
                text: request.text().to_string(),
                reply_to: request.reply_to().map(str::to_string),
            };
        }
        tracing::warn!("Post accepted but response had no data.id: {}", body);
    }

    PostResult::Failure {
        status_code: status,
        text: request.text().to_string(),
        reply_to: request.reply_to().map(str::to_string),
        response_body: body.to_string(),
    }
}

fn transport_failure(request: &PostRequest, reason: String) -> PostResult {
    PostResult::Failure {
        status_code: 0,
        text: request.text().to_string(),
        reply_to: request.reply_to().map(str::to_string),
        response_body: reason,
    }
}

fn preview(body: &str) -> String {
    body.chars().take(ERROR_BODY_PREVIEW).collect()
}

#[async_trait]
impl Platform for XClient {
    async fn submit(&self, request: &PostRequest) -> PostResult {
        let url = self.url("/2/tweets");
        let body = CreatePostBody {
            text: request.text(),
            reply: request
                .reply_to()
                .map(|id| ReplySettings { in_reply_to_tweet_id: id }),
        };

        let auth = match self.user_auth("POST", &url) {
            Ok(auth) => auth,
            Err(e) => return transport_failure(request, e.to_string()),
        };

        tracing::debug!(
            "Submitting post ({} characters, reply_to={:?})",
            request.text().chars().count(),
            request.reply_to()
        );

        let response = match self
            .http
            .post(&url)
            .header(AUTHORIZATION, auth)
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Post request did not complete: {}", e);
                return transport_failure(request, format!("request failed: {}", e));
            }
        };

        let status = response.status().as_u16();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => format!("<unreadable response body: {}>", e),
        };

        classify_post_response(request, status, &text)
    }

    async fn lookup_user(&self, handle: &str) -> Result<Option<String>> {
        let url = self.url(&format!(
            "/2/users/by/username/{}",
            urlencoding::encode(handle)
        ));

        let auth = match &self.bearer {
            Some(token) => format!("Bearer {}", token.expose_secret()),
            None => self.user_auth("GET", &url)?,
        };

        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, auth)
            .send()
            .await
            .map_err(|e| PlatformError::Network(format!("User lookup for @{} failed: {}", handle, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PlatformError::Network(format!("User lookup for @{} failed: {}", handle, e)))?;

        if status != StatusCode::OK {
            tracing::warn!("Could not look up @{} ({}): {}", handle, status.as_u16(), preview(&body));
            return Ok(None);
        }

        // A 200 can still carry only an `errors` array for unknown handles
        match serde_json::from_str::<DataEnvelope<IdData>>(&body) {
            Ok(envelope) => Ok(Some(envelope.data.id)),
            Err(_) => {
                tracing::warn!("Lookup for @{} returned no user: {}", handle, preview(&body));
                Ok(None)
            }
        }
    }

    async fn follow(&self, source_user_id: &str, target_user_id: &str) -> Result<FollowStatus> {
        let url = self.url(&format!(
            "/2/users/{}/following",
            urlencoding::encode(source_user_id)
        ));
        let auth = self.user_auth("POST", &url)?;

        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, auth)
            .json(&FollowBody { target_user_id })
            .send()
            .await
            .map_err(|e| PlatformError::Network(format!("Follow request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PlatformError::Network(format!("Follow request failed: {}", e)))?;

        if status != StatusCode::OK && status != StatusCode::CREATED {
            return Err(PlatformError::Posting(format!(
                "follow returned {}: {}",
                status.as_u16(),
                preview(&body)
            ))
            .into());
        }

        match serde_json::from_str::<DataEnvelope<FollowStatus>>(&body) {
            Ok(envelope) => Ok(envelope.data),
            Err(e) => {
                tracing::warn!(
                    "Follow of {} accepted ({}) but the response was unreadable ({}): {}",
                    target_user_id,
                    status.as_u16(),
                    e,
                    preview(&body)
                );
                Ok(FollowStatus::default())
            }
        }
    }

    fn name(&self) -> &str {
        "x"
    }

    fn character_limit(&self) -> Option<usize> {
        Some(CHARACTER_LIMIT)
    }
}
