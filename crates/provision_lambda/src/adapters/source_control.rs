use std::time::Duration;

use base64::Engine;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Reference to a pull request opened by the worker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullRequestRef {
    pub number: u64,
    pub url: String,
}

/// The three-step repository mutation surface the worker drives: resolve the
/// base tip, create a branch, commit a file, open a pull request.
pub trait SourceControlGateway {
    fn branch_head_sha(&self, branch: &str) -> Result<String, String>;
    fn create_branch(&self, branch: &str, commit_sha: &str) -> Result<(), String>;
    fn commit_file(
        &self,
        branch: &str,
        path: &str,
        content: &str,
        message: &str,
    ) -> Result<(), String>;
    fn open_pull_request(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: &str,
    ) -> Result<PullRequestRef, String>;
}

#[derive(Debug, Deserialize)]
struct GitRefResponse {
    object: GitRefObject,
}

#[derive(Debug, Deserialize)]
struct GitRefObject {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct PullRequestResponse {
    number: u64,
    html_url: String,
}

/// Thin client for the GitHub REST v3 surface. One instance per cold start;
/// the token comes from Secrets Manager, never from the message payload.
#[derive(Debug, Clone)]
pub struct GithubClient {
    client: Client,
    api_url: String,
    repository: String,
    token: String,
}

impl GithubClient {
    /// Create a client for the given repository (`owner/name`).
    pub fn new(api_url: &str, repository: &str, token: &str) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent("rds-provisioning-pipeline")
            .build()
            .expect("failed to build GitHub client");
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            repository: repository.to_string(),
            token: token.to_string(),
        }
    }

    fn repo_url(&self, tail: &str) -> String {
        format!("{}/repos/{}/{tail}", self.api_url, self.repository)
    }

    fn send_json(
        &self,
        request: reqwest::blocking::RequestBuilder,
        action: &str,
    ) -> Result<reqwest::blocking::Response, String> {
        let response = request
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .send()
            .map_err(|error| format!("failed to {action}: {error}"))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            return Err(format!("failed to {action}: GitHub returned {status}: {detail}"));
        }
        Ok(response)
    }
}

impl SourceControlGateway for GithubClient {
    fn branch_head_sha(&self, branch: &str) -> Result<String, String> {
        let url = self.repo_url(&format!("git/ref/heads/{branch}"));
        let response = self.send_json(
            self.client.get(url),
            &format!("resolve tip of branch '{branch}'"),
        )?;
        let parsed: GitRefResponse = response
            .json()
            .map_err(|error| format!("invalid git ref response: {error}"))?;
        Ok(parsed.object.sha)
    }

    fn create_branch(&self, branch: &str, commit_sha: &str) -> Result<(), String> {
        let url = self.repo_url("git/refs");
        let payload = json!({
            "ref": format!("refs/heads/{branch}"),
            "sha": commit_sha,
        });
        self.send_json(
            self.client.post(url).json(&payload),
            &format!("create branch '{branch}'"),
        )
        .map(|_| ())
    }

    fn commit_file(
        &self,
        branch: &str,
        path: &str,
        content: &str,
        message: &str,
    ) -> Result<(), String> {
        let url = self.repo_url(&format!("contents/{path}"));
        let payload = json!({
            "message": message,
            "content": base64::engine::general_purpose::STANDARD.encode(content),
            "branch": branch,
        });
        self.send_json(
            self.client.put(url).json(&payload),
            &format!("commit file '{path}'"),
        )
        .map(|_| ())
    }

    fn open_pull_request(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: &str,
    ) -> Result<PullRequestRef, String> {
        let url = self.repo_url("pulls");
        let payload = json!({
            "title": title,
            "head": head,
            "base": base,
            "body": body,
        });
        let response = self.send_json(
            self.client.post(url).json(&payload),
            &format!("open pull request from '{head}'"),
        )?;
        let parsed: PullRequestResponse = response
            .json()
            .map_err(|error| format!("invalid pull request response: {error}"))?;
        Ok(PullRequestRef {
            number: parsed.number,
            url: parsed.html_url,
        })
    }
}
