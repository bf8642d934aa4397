//! Push the processed JSONL to a dataset repository on the Hugging Face Hub.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use base64::Engine;
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::DatasetError;
use crate::settings::HubSettings;

/// A processed dataset read back from disk.
#[derive(Debug)]
pub struct LocalDataset {
    pub path: PathBuf,
    pub rows: usize,
    pub bytes: Vec<u8>,
}

/// Read and validate a `{"text": ...}` JSONL file. Blank lines are ignored.
pub fn load_dataset(path: &Path) -> Result<LocalDataset> {
    let bytes = fs::read(path).with_context(|| format!("Dataset file not found at {}", path.display()))?;
    let text = std::str::from_utf8(&bytes)
        .with_context(|| format!("{} is not valid UTF-8", path.display()))?;

    let mut rows = 0;
    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(line).map_err(|e| DatasetError::InvalidLine {
            line: idx + 1,
            reason: e.to_string(),
        })?;
        if !value.get("text").is_some_and(Value::is_string) {
            return Err(DatasetError::InvalidLine {
                line: idx + 1,
                reason: "missing string field 'text'".to_string(),
            }
            .into());
        }
        rows += 1;
    }
    if rows == 0 {
        return Err(DatasetError::EmptyDataset(path.to_path_buf()).into());
    }

    Ok(LocalDataset {
        path: path.to_path_buf(),
        rows,
        bytes,
    })
}

/// `org/name` -> (Some("org"), "name"); `name` -> (None, "name").
pub fn split_repo_id(repo_id: &str) -> (Option<&str>, &str) {
    match repo_id.split_once('/') {
        Some((ns, name)) => (Some(ns), name),
        None => (None, repo_id),
    }
}

/// NDJSON body for the hub commit endpoint: a header line, then one base64 file line.
pub fn commit_payload(path_in_repo: &str, bytes: &[u8], summary: &str) -> Result<String> {
    let header = json!({
        "key": "header",
        "value": { "summary": summary, "description": "" }
    });
    let file = json!({
        "key": "file",
        "value": {
            "content": base64::engine::general_purpose::STANDARD.encode(bytes),
            "path": path_in_repo,
            "encoding": "base64"
        }
    });
    Ok(format!(
        "{}\n{}\n",
        serde_json::to_string(&header)?,
        serde_json::to_string(&file)?
    ))
}

#[derive(Deserialize)]
struct WhoAmI {
    name: String,
}

#[derive(Deserialize)]
struct CommitResponse {
    #[serde(rename = "commitUrl")]
    commit_url: Option<String>,
}

pub struct HubClient {
    client: Client,
    endpoint: String,
    token: String,
}

impl HubClient {
    /// Build a client with the token from `settings.token_env`.
    pub fn from_settings(settings: &HubSettings) -> Result<Self> {
        let token = std::env::var(&settings.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| DatasetError::MissingToken(settings.token_env.clone()))?;
        Self::new(&settings.endpoint, token)
    }

    pub fn new(endpoint: &str, token: String) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(300))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(HubClient {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    /// Complete `name` with the token owner's namespace; `org/name` is returned as-is.
    pub fn resolve_repo_id(&self, repo_id: &str) -> Result<String> {
        if let (Some(_), _) = split_repo_id(repo_id) {
            return Ok(repo_id.to_string());
        }
        let url = self.url("/api/whoami-v2");
        let response = self.client.get(&url).bearer_auth(&self.token).send()?;
        let who: WhoAmI = check(response, &url)?.json().context("Unexpected whoami response")?;
        Ok(format!("{}/{}", who.name, repo_id))
    }

    /// Create the dataset repo. An existing repo is not an error.
    pub fn create_repo(&self, repo_id: &str, private: bool) -> Result<()> {
        let (namespace, name) = split_repo_id(repo_id);
        let url = self.url("/api/repos/create");
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&json!({
                "type": "dataset",
                "name": name,
                "organization": namespace,
                "private": private,
            }))
            .send()
            .with_context(|| format!("POST {} failed", url))?;

        if response.status() == StatusCode::CONFLICT {
            info!("Dataset repo {} already exists", repo_id);
            return Ok(());
        }
        check(response, &url)?;
        info!("Created dataset repo {}", repo_id);
        Ok(())
    }

    /// Commit `bytes` as `path_in_repo` on the main branch. Returns the commit URL if given.
    pub fn upload_file(
        &self,
        repo_id: &str,
        path_in_repo: &str,
        bytes: &[u8],
        summary: &str,
    ) -> Result<Option<String>> {
        let url = self.url(&format!("/api/datasets/{}/commit/main", repo_id));
        let body = commit_payload(path_in_repo, bytes, summary)?;
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
            .body(body)
            .send()
            .with_context(|| format!("POST {} failed", url))?;
        let commit: CommitResponse = check(response, &url)?
            .json()
            .context("Unexpected commit response")?;
        Ok(commit.commit_url)
    }
}

fn check(response: Response, url: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    warn!("{} returned {}: {}", url, status.as_u16(), body.trim());
    Err(DatasetError::HttpStatus {
        url: url.to_string(),
        status: status.as_u16(),
    }
    .into())
}

/// Validate `file`, create the repo if needed and commit the dataset.
pub fn upload_dataset(settings: &HubSettings, file: &Path, repo_id: &str, private: bool) -> Result<String> {
    let dataset = load_dataset(file)?;
    println!(
        "Loaded dataset with {} examples from {}",
        dataset.rows,
        dataset.path.display()
    );

    let hub = HubClient::from_settings(settings)?;
    let repo_id = hub.resolve_repo_id(repo_id)?;
    hub.create_repo(&repo_id, private)?;

    let summary = format!("Upload {} training examples", dataset.rows);
    let commit = hub.upload_file(&repo_id, &settings.path_in_repo, &dataset.bytes, &summary)?;
    if let Some(url) = commit {
        info!("Commit: {}", url);
    }
    Ok(repo_id)
}
