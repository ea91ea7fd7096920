//! GitHub contents and Pages API client.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use foldertally_core::{RawStore, StoreError};

use crate::error::GitHubError;
use crate::http::{RetryConfig, agent, send_with_retry};

/// Base URL of the GitHub REST API.
pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// Repository coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubRepo {
    /// Repository owner (user or organization).
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Branch to read and write; the repository default when unset.
    pub branch: Option<String>,
}

impl GitHubRepo {
    /// Create coordinates targeting the repository's default branch.
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            branch: None,
        }
    }

    /// Target a specific branch.
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    /// Public GitHub Pages URL of a file published at the repository root.
    pub fn pages_url(&self, file_name: &str) -> String {
        if file_name == "index.html" {
            format!("https://{}.github.io/{}/", self.owner, self.repo)
        } else {
            format!("https://{}.github.io/{}/{file_name}", self.owner, self.repo)
        }
    }
}

/// A file fetched from a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    /// Blob SHA, required to update the file.
    pub sha: String,
    /// Decoded file content.
    pub content: Vec<u8>,
}

/// Where a report was published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishedReport {
    /// Repository path of the uploaded file.
    pub file_name: String,
    /// Public Pages URL.
    pub pages_url: String,
}

#[derive(Deserialize)]
struct ContentsResponse {
    sha: String,
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
struct RepoResponse {
    default_branch: String,
}

/// Blocking client for one repository.
#[derive(Clone)]
pub struct GitHubClient {
    agent: ureq::Agent,
    token: String,
    repo: GitHubRepo,
    api_base: String,
    retry: RetryConfig,
}

impl GitHubClient {
    /// Create a client for `repo` authenticated with a personal access token.
    pub fn new(token: impl Into<String>, repo: GitHubRepo) -> Self {
        Self {
            agent: agent(),
            token: token.into(),
            repo,
            api_base: GITHUB_API_BASE.to_string(),
            retry: RetryConfig::default(),
        }
    }

    /// Point the client at a different API base URL.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Use a custom retry policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Repository coordinates.
    pub fn repo(&self) -> &GitHubRepo {
        &self.repo
    }

    fn repo_url(&self) -> String {
        format!("{}/repos/{}/{}", self.api_base, self.repo.owner, self.repo.repo)
    }

    fn contents_url(&self, path: &str) -> String {
        format!("{}/contents/{}", self.repo_url(), path.trim_start_matches('/'))
    }

    fn request(&self, method: &str, url: &str) -> ureq::Request {
        self.agent
            .request(method, url)
            .set("Authorization", &format!("Bearer {}", self.token))
            .set("Accept", "application/vnd.github+json")
            .set("X-GitHub-Api-Version", "2022-11-28")
    }

    /// Fetch a file; `Ok(None)` when it does not exist.
    pub fn get_file(&self, path: &str) -> Result<Option<RemoteFile>, GitHubError> {
        let url = self.contents_url(path);
        let result = send_with_retry(self.retry, || {
            let request = self.request("GET", &url);
            match &self.repo.branch {
                Some(branch) => request.query("ref", branch).call(),
                None => request.call(),
            }
        });

        let response = match result {
            Ok(response) => response,
            Err(ureq::Error::Status(404, _)) => return Ok(None),
            Err(err) => return Err(GitHubError::from_ureq(&url, err)),
        };

        let body: ContentsResponse = response
            .into_json()
            .map_err(|err| GitHubError::decode(&url, err.to_string()))?;
        let encoded: String = body
            .content
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let content = STANDARD
            .decode(encoded)
            .map_err(|err| GitHubError::decode(&url, err.to_string()))?;
        Ok(Some(RemoteFile {
            sha: body.sha,
            content,
        }))
    }

    /// Create or replace a file with a commit.
    pub fn put_file(&self, path: &str, content: &[u8], message: &str) -> Result<(), GitHubError> {
        let url = self.contents_url(path);
        let existing = self.get_file(path)?;

        let mut body = json!({
            "message": message,
            "content": STANDARD.encode(content),
        });
        if let Some(branch) = &self.repo.branch {
            body["branch"] = json!(branch);
        }
        if let Some(file) = existing {
            body["sha"] = json!(file.sha);
        }

        send_with_retry(self.retry, || self.request("PUT", &url).send_json(&body))
            .map_err(|err| GitHubError::from_ureq(&url, err))?;
        Ok(())
    }

    /// The repository's default branch.
    pub fn default_branch(&self) -> Result<String, GitHubError> {
        let url = self.repo_url();
        let response = send_with_retry(self.retry, || self.request("GET", &url).call())
            .map_err(|err| GitHubError::from_ureq(&url, err))?;
        let body: RepoResponse = response
            .into_json()
            .map_err(|err| GitHubError::decode(&url, err.to_string()))?;
        Ok(body.default_branch)
    }

    /// Check whether GitHub Pages is enabled.
    pub fn pages_enabled(&self) -> Result<bool, GitHubError> {
        let url = format!("{}/pages", self.repo_url());
        match send_with_retry(self.retry, || self.request("GET", &url).call()) {
            Ok(_) => Ok(true),
            Err(ureq::Error::Status(404, _)) => Ok(false),
            Err(err) => Err(GitHubError::from_ureq(&url, err)),
        }
    }

    /// Enable GitHub Pages serving the branch root. Already enabled is fine.
    pub fn enable_pages(&self) -> Result<(), GitHubError> {
        let branch = match &self.repo.branch {
            Some(branch) => branch.clone(),
            None => self.default_branch()?,
        };
        let url = format!("{}/pages", self.repo_url());
        let body = json!({ "source": { "branch": branch, "path": "/" } });

        match send_with_retry(self.retry, || self.request("POST", &url).send_json(&body)) {
            Ok(_) | Err(ureq::Error::Status(409, _)) => Ok(()),
            Err(err) => Err(GitHubError::from_ureq(&url, err)),
        }
    }

    /// Make sure Pages is serving the repository; failures are only logged.
    pub fn ensure_pages(&self) {
        match self.pages_enabled() {
            Ok(true) => {}
            Ok(false) => {
                info!("Enabling GitHub Pages");
                if let Err(err) = self.enable_pages() {
                    warn!(error = %err, "Could not enable GitHub Pages");
                }
            }
            Err(err) => warn!(error = %err, "Could not check GitHub Pages status"),
        }
    }

    /// Upload an HTML report and return where it will be served.
    pub fn publish_report(
        &self,
        file_name: &str,
        html: &str,
    ) -> Result<PublishedReport, GitHubError> {
        self.put_file(file_name, html.as_bytes(), "Update folder report")?;
        let published = PublishedReport {
            file_name: file_name.to_string(),
            pages_url: self.repo.pages_url(file_name),
        };
        info!(file = %published.file_name, url = %published.pages_url, "Report published");
        Ok(published)
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("repo", &self.repo)
            .field("api_base", &self.api_base)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

/// One repository file used as a [`RawStore`].
#[derive(Debug, Clone)]
pub struct GitHubFileStore {
    client: GitHubClient,
    path: String,
}

impl GitHubFileStore {
    /// Store state in `path` of the client's repository.
    pub fn new(client: GitHubClient, path: impl Into<String>) -> Self {
        Self {
            client,
            path: path.into(),
        }
    }
}

impl RawStore for GitHubFileStore {
    fn location(&self) -> String {
        format!(
            "github:{}/{}/{}",
            self.client.repo.owner, self.client.repo.repo, self.path
        )
    }

    fn read_raw(&self) -> Result<Option<Vec<u8>>, StoreError> {
        self.client
            .get_file(&self.path)
            .map(|file| file.map(|f| f.content))
            .map_err(|err| StoreError::remote(self.location(), err.to_string()))
    }

    fn write_raw(&self, bytes: &[u8]) -> Result<(), StoreError> {
        self.client
            .put_file(&self.path, bytes, "Update history data")
            .map_err(|err| StoreError::remote(self.location(), err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::test_server::{response, serve};

    fn client(url: &str, repo: GitHubRepo) -> GitHubClient {
        GitHubClient::new("ghp_test", repo)
            .with_api_base(url)
            .with_retry(RetryConfig::none())
    }

    #[test]
    fn pages_url_for_index_and_other_files() {
        let repo = GitHubRepo::new("octo", "reports");
        assert_eq!(repo.pages_url("index.html"), "https://octo.github.io/reports/");
        assert_eq!(
            repo.pages_url("report.html"),
            "https://octo.github.io/reports/report.html"
        );
    }

    #[test]
    fn get_file_decodes_wrapped_base64() {
        let encoded = STANDARD.encode(b"{\"data\": []}");
        let (head, tail) = encoded.split_at(6);
        let body = format!(r#"{{"sha": "abc123", "content": "{head}\n{tail}\n", "encoding": "base64"}}"#);
        let (url, requests) = serve(vec![response("200 OK", &body)]);

        let file = client(&url, GitHubRepo::new("octo", "reports").with_branch("gh-pages"))
            .get_file("history.json")
            .unwrap()
            .unwrap();

        assert_eq!(file.sha, "abc123");
        assert_eq!(file.content, b"{\"data\": []}");
        let request = requests.recv().unwrap();
        assert!(request.starts_with("GET /repos/octo/reports/contents/history.json?ref=gh-pages "));
        assert!(request.contains("Bearer ghp_test"));
    }

    #[test]
    fn get_file_missing_is_none() {
        let (url, _requests) = serve(vec![response("404 Not Found", "{\"message\": \"Not Found\"}")]);
        let file = client(&url, GitHubRepo::new("octo", "reports"))
            .get_file("history.json")
            .unwrap();
        assert!(file.is_none());
    }

    #[test]
    fn put_file_sends_existing_sha() {
        let existing = r#"{"sha": "old-sha", "content": ""}"#;
        let (url, requests) = serve(vec![
            response("200 OK", existing),
            response("200 OK", "{}"),
        ]);

        client(&url, GitHubRepo::new("octo", "reports"))
            .put_file("index.html", b"<html></html>", "Update folder report")
            .unwrap();

        let _get = requests.recv().unwrap();
        let put = requests.recv().unwrap();
        assert!(put.starts_with("PUT /repos/octo/reports/contents/index.html "));
        assert!(put.contains("\"sha\":\"old-sha\""));
        assert!(put.contains(&STANDARD.encode(b"<html></html>")));
        assert!(!put.contains("\"branch\""));
    }

    #[test]
    fn put_file_failure_carries_status() {
        let (url, _requests) = serve(vec![
            response("404 Not Found", "{}"),
            response("422 Unprocessable Entity", "{\"message\": \"sha wasn't supplied\"}"),
        ]);
        let err = client(&url, GitHubRepo::new("octo", "reports"))
            .put_file("index.html", b"x", "msg")
            .unwrap_err();
        assert_eq!(err.status(), Some(422));
        assert!(err.to_string().contains("sha wasn't supplied"));
    }

    #[test]
    fn enable_pages_tolerates_conflict() {
        let (url, requests) = serve(vec![response("409 Conflict", "{}")]);
        client(&url, GitHubRepo::new("octo", "reports").with_branch("main"))
            .enable_pages()
            .unwrap();
        let request = requests.recv().unwrap();
        assert!(request.contains("\"branch\":\"main\""));
    }

    #[test]
    fn enable_pages_looks_up_default_branch() {
        let (url, requests) = serve(vec![
            response("200 OK", "{\"default_branch\": \"trunk\"}"),
            response("201 Created", "{}"),
        ]);
        client(&url, GitHubRepo::new("octo", "reports"))
            .enable_pages()
            .unwrap();
        let _repo = requests.recv().unwrap();
        let post = requests.recv().unwrap();
        assert!(post.contains("\"branch\":\"trunk\""));
    }

    #[test]
    fn file_store_reports_remote_errors() {
        let (url, _requests) = serve(vec![response("500 Internal Server Error", "oops")]);
        let store = GitHubFileStore::new(
            client(&url, GitHubRepo::new("octo", "reports")),
            "history.json",
        );
        assert_eq!(store.location(), "github:octo/reports/history.json");
        assert!(matches!(store.read_raw(), Err(StoreError::Remote { .. })));
    }
}
