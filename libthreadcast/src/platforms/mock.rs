//! Mock platform implementation for testing
//!
//! Replays a script of create-post responses in order and records every
//! request it receives, so sequencing and chaining can be checked without
//! network access. Clones share state, so a test can keep a handle while the
//! sequencer owns another.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use crate::error::{PlatformError, Result};
use crate::platforms::Platform;
use crate::types::{FollowStatus, PostRequest, PostResult};

/// One scripted reply to a create-post call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockResponse {
    /// 201 with `data.id`
    Created(String),
    /// Any other status with a raw body
    Status(u16, String),
}

impl MockResponse {
    pub fn created(id: &str) -> Self {
        MockResponse::Created(id.to_string())
    }

    pub fn status(code: u16, body: &str) -> Self {
        MockResponse::Status(code, body.to_string())
    }
}

/// A post the mock received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedPost {
    pub text: String,
    pub reply_to: Option<String>,
}

#[derive(Debug, Default)]
struct MockState {
    script: VecDeque<MockResponse>,
    submitted: Vec<SubmittedPost>,
    users: HashMap<String, String>,
    unreachable_handles: HashSet<String>,
    refused_follows: HashMap<String, String>,
    lookups: Vec<String>,
    follows: Vec<(String, String)>,
}

/// Mock platform for testing
#[derive(Debug, Clone)]
pub struct MockPlatform {
    name: String,
    character_limit: Option<usize>,
    state: Arc<Mutex<MockState>>,
}

impl MockPlatform {
    /// Create a mock that answers create-post calls from `script`
    ///
    /// Once the script runs out, further posts fail with status 500.
    pub fn scripted(script: Vec<MockResponse>) -> Self {
        Self {
            name: "mock".to_string(),
            character_limit: Some(280),
            state: Arc::new(Mutex::new(MockState {
                script: script.into(),
                ..Default::default()
            })),
        }
    }

    /// Create a mock whose posts all succeed with ids `start`, `start + 1`, ...
    pub fn sequential(start: u64, count: usize) -> Self {
        let script = (0..count as u64)
            .map(|n| MockResponse::Created((start + n).to_string()))
            .collect();
        Self::scripted(script)
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.character_limit = limit;
        self
    }

    /// Make `handle` resolvable to `user_id`
    pub fn with_user(self, handle: &str, user_id: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .users
            .insert(handle.to_string(), user_id.to_string());
        self
    }

    /// Make lookups of `handle` fail as if the network were down
    pub fn with_unreachable_lookup(self, handle: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .unreachable_handles
            .insert(handle.to_string());
        self
    }

    /// Make follows of `target_user_id` fail with `reason`
    pub fn with_refused_follow(self, target_user_id: &str, reason: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .refused_follows
            .insert(target_user_id.to_string(), reason.to_string());
        self
    }

    /// Get all posts that were submitted, in order
    pub fn submitted(&self) -> Vec<SubmittedPost> {
        self.state.lock().unwrap().submitted.clone()
    }

    pub fn submit_call_count(&self) -> usize {
        self.state.lock().unwrap().submitted.len()
    }

    /// Handles passed to `lookup_user`, in order
    pub fn lookups(&self) -> Vec<String> {
        self.state.lock().unwrap().lookups.clone()
    }

    /// `(source, target)` pairs passed to `follow`, in order
    pub fn follows(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().follows.clone()
    }
}

#[async_trait]
impl Platform for MockPlatform {
    async fn submit(&self, request: &PostRequest) -> PostResult {
        let mut state = self.state.lock().unwrap();
        state.submitted.push(SubmittedPost {
            text: request.text().to_string(),
            reply_to: request.reply_to().map(str::to_string),
        });

        let text = request.text().to_string();
        let reply_to = request.reply_to().map(str::to_string);

        match state.script.pop_front() {
            Some(MockResponse::Created(post_id)) => PostResult::Success {
                post_id,
                text,
                reply_to,
            },
            Some(MockResponse::Status(status_code, response_body)) => PostResult::Failure {
                status_code,
                text,
                reply_to,
                response_body,
            },
            None => PostResult::Failure {
                status_code: 500,
                text,
                reply_to,
                response_body: "mock script exhausted".to_string(),
            },
        }
    }

    async fn lookup_user(&self, handle: &str) -> Result<Option<String>> {
        let mut state = self.state.lock().unwrap();
        state.lookups.push(handle.to_string());

        if state.unreachable_handles.contains(handle) {
            return Err(PlatformError::Network(format!("lookup of @{} timed out", handle)).into());
        }

        Ok(state.users.get(handle).cloned())
    }

    async fn follow(&self, source_user_id: &str, target_user_id: &str) -> Result<FollowStatus> {
        let mut state = self.state.lock().unwrap();
        state
            .follows
            .push((source_user_id.to_string(), target_user_id.to_string()));

        if let Some(reason) = state.refused_follows.get(target_user_id) {
            return Err(PlatformError::Posting(reason.clone()).into());
        }

        Ok(FollowStatus {
            following: true,
            pending_follow: false,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn character_limit(&self) -> Option<usize> {
        self.character_limit
    }
}
