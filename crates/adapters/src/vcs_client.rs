// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! Outbound VCS side effects (GitHub-shaped): reviewer assignment, PR
//! comments, issue creation, labeling.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VcsError {
    #[error("transient vcs call failure: {0}")]
    Transient(String),
    #[error("vcs request rejected: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait VcsClient: Send + Sync {
    async fn request_reviewers(&self, repo: &str, pr_number: u64, reviewers: &[String]) -> Result<(), VcsError>;
    async fn comment(&self, repo: &str, pr_number: u64, body: &str) -> Result<(), VcsError>;
    async fn create_issue(&self, repo: &str, title: &str, body: &str) -> Result<String, VcsError>;
    async fn add_label(&self, repo: &str, issue_number: u64, label: &str) -> Result<(), VcsError>;
}

pub struct GithubVcsClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

impl GithubVcsClient {
    pub fn new(api_base: impl Into<String>, token: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { http, api_base: api_base.into(), token: token.into() }
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }

    fn map_status(status: reqwest::StatusCode) -> VcsError {
        if status.is_client_error() {
            VcsError::Rejected(status.to_string())
        } else {
            VcsError::Transient(status.to_string())
        }
    }
}

#[async_trait]
impl VcsClient for GithubVcsClient {
    async fn request_reviewers(&self, repo: &str, pr_number: u64, reviewers: &[String]) -> Result<(), VcsError> {
        let url = format!("{}/repos/{}/pulls/{}/requested_reviewers", self.api_base, repo, pr_number);
        let response = self
            .http
            .post(url)
            .header("Authorization", self.auth_header())
            .json(&serde_json::json!({ "reviewers": reviewers }))
            .send()
            .await
            .map_err(|err| VcsError::Transient(err.to_string()))?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::map_status(response.status()))
        }
    }

    async fn comment(&self, repo: &str, pr_number: u64, body: &str) -> Result<(), VcsError> {
        let url = format!("{}/repos/{}/issues/{}/comments", self.api_base, repo, pr_number);
        let response = self
            .http
            .post(url)
            .header("Authorization", self.auth_header())
            .json(&serde_json::json!({ "body": body }))
            .send()
            .await
            .map_err(|err| VcsError::Transient(err.to_string()))?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::map_status(response.status()))
        }
    }

    async fn create_issue(&self, repo: &str, title: &str, body: &str) -> Result<String, VcsError> {
        let url = format!("{}/repos/{}/issues", self.api_base, repo);
        let response = self
            .http
            .post(url)
            .header("Authorization", self.auth_header())
            .json(&serde_json::json!({ "title": title, "body": body }))
            .send()
            .await
            .map_err(|err| VcsError::Transient(err.to_string()))?;
        if !response.status().is_success() {
            return Err(Self::map_status(response.status()));
        }
        let created: serde_json::Value = response
            .json()
            .await
            .map_err(|err| VcsError::Transient(err.to_string()))?;
        created
            .get("html_url")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| VcsError::Transient("issue response missing html_url".to_string()))
    }

    async fn add_label(&self, repo: &str, issue_number: u64, label: &str) -> Result<(), VcsError> {
        let url = format!("{}/repos/{}/issues/{}/labels", self.api_base, repo, issue_number);
        let response = self
            .http
            .post(url)
            .header("Authorization", self.auth_header())
            .json(&serde_json::json!({ "labels": [label] }))
            .send()
            .await
            .map_err(|err| VcsError::Transient(err.to_string()))?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::map_status(response.status()))
        }
    }
}

/// In-memory client for tests: records every call.
#[derive(Default)]
pub struct RecordingVcsClient {
    pub comments: parking_lot::Mutex<Vec<(String, u64, String)>>,
    pub labels: parking_lot::Mutex<Vec<(String, u64, String)>>,
}

#[async_trait]
impl VcsClient for RecordingVcsClient {
    async fn request_reviewers(&self, _repo: &str, _pr_number: u64, _reviewers: &[String]) -> Result<(), VcsError> {
        Ok(())
    }

    async fn comment(&self, repo: &str, pr_number: u64, body: &str) -> Result<(), VcsError> {
        self.comments.lock().push((repo.to_string(), pr_number, body.to_string()));
        Ok(())
    }

    async fn create_issue(&self, _repo: &str, _title: &str, _body: &str) -> Result<String, VcsError> {
        Ok("https://example.invalid/issues/1".to_string())
    }

    async fn add_label(&self, repo: &str, issue_number: u64, label: &str) -> Result<(), VcsError> {
        self.labels.lock().push((repo.to_string(), issue_number, label.to_string()));
        Ok(())
    }
}
