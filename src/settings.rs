use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

const DEFAULT_CONFIG_FILE: &str = "component_dataset";
const ENV_PREFIX: &str = "CDS";

/// Runtime settings: serde defaults, then an optional config file, then
/// `CDS_`-prefixed environment variables (`__` separates nested keys).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub raw_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub dataset_file: String,
    /// Raw sources read by the formatter, in order.
    pub sources: Vec<String>,
    pub write_summary: bool,
    pub scrape: ScrapeSettings,
    pub hub: HubSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScrapeSettings {
    pub request_delay_ms: u64,
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Code shorter than this (trimmed, in chars) is replaced by a template.
    pub min_code_len: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HubSettings {
    pub endpoint: String,
    pub repo_id: String,
    pub token_env: String,
    pub private: bool,
    pub path_in_repo: String,
    pub inference_endpoint: String,
    pub model: String,
    pub max_new_tokens: u32,
    pub temperature: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            raw_dir: PathBuf::from("data/raw"),
            processed_dir: PathBuf::from("data/processed"),
            dataset_file: "dataset.jsonl".to_string(),
            sources: vec!["magicui".to_string(), "aceternity".to_string()],
            write_summary: true,
            scrape: ScrapeSettings::default(),
            hub: HubSettings::default(),
        }
    }
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        ScrapeSettings {
            request_delay_ms: 2000,
            timeout_secs: 30,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
                .to_string(),
            min_code_len: 50,
        }
    }
}

impl Default for HubSettings {
    fn default() -> Self {
        HubSettings {
            endpoint: "https://huggingface.co".to_string(),
            repo_id: "shadcn-components".to_string(),
            token_env: "HF_TOKEN".to_string(),
            private: true,
            path_in_repo: "data/train.jsonl".to_string(),
            inference_endpoint: "https://api-inference.huggingface.co/models".to_string(),
            model: "meta-llama/Llama-3.2-3B-Instruct".to_string(),
            max_new_tokens: 1024,
            temperature: 0.2,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        let file = std::env::var("CDS_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.into());
        let settings = config::Config::builder()
            .add_source(config::File::with_name(&file).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration")?;
        settings
            .try_deserialize()
            .context("Invalid configuration values")
    }

    pub fn raw_path(&self, source: &str) -> PathBuf {
        self.raw_dir.join(format!("{}.json", source))
    }

    pub fn summary_path(&self, source: &str) -> PathBuf {
        self.raw_dir.join(format!("{}_summary.json", source))
    }

    pub fn dataset_path(&self) -> PathBuf {
        self.processed_dir.join(&self.dataset_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_data_dirs() {
        let s = Settings::default();
        assert_eq!(s.raw_path("magicui"), PathBuf::from("data/raw/magicui.json"));
        assert_eq!(
            s.summary_path("aceternity"),
            PathBuf::from("data/raw/aceternity_summary.json")
        );
        assert_eq!(s.dataset_path(), PathBuf::from("data/processed/dataset.jsonl"));
        assert_eq!(s.sources, vec!["magicui", "aceternity"]);
        assert_eq!(s.scrape.request_delay_ms, 2000);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.toml");
        std::fs::write(&path, "raw_dir = \"/tmp/raw\"\n[scrape]\nmin_code_len = 10\n").unwrap();

        let settings: Settings = config::Config::builder()
            .add_source(config::File::from(path))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.raw_dir, PathBuf::from("/tmp/raw"));
        assert_eq!(settings.scrape.min_code_len, 10);
        assert_eq!(settings.scrape.request_delay_ms, 2000);
        assert_eq!(settings.hub.token_env, "HF_TOKEN");
    }
}
