//! Raw prompt/completion files -> delimited `{"text": ...}` JSONL.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{DatasetError, DropReason};
use crate::model::TrainingExample;
use crate::store;

pub const PROMPT_TOKEN: &str = "<|prompt|>";
pub const COMPLETION_TOKEN: &str = "<|completion|>";
pub const END_TOKEN: &str = "<|endoftext|>";

#[derive(Debug, Default, PartialEq, Eq)]
pub struct FormatReport {
    pub loaded: usize,
    pub skipped_files: Vec<String>,
    pub written: usize,
    pub dropped: usize,
}

/// Format the raw files of `sources` (under `raw_dir`) into `output`.
/// Missing or unreadable raw files are skipped with a warning.
pub fn format_dataset(raw_dir: &Path, sources: &[String], output: &Path) -> Result<FormatReport> {
    let mut report = FormatReport::default();
    let mut combined = Vec::new();

    for source in sources {
        let path = raw_dir.join(format!("{}.json", source));
        match load_records(&path) {
            Ok(records) => {
                info!("Loaded {} items from {}", records.len(), source);
                report.loaded += records.len();
                combined.extend(records);
            }
            Err(e) => {
                match e.downcast_ref::<DatasetError>() {
                    Some(DatasetError::RawFileMissing(p)) => {
                        warn!("Raw data for {} not found at {}, skipping", source, p.display())
                    }
                    _ => warn!("Skipping {}: {:#}", source, e),
                }
                report.skipped_files.push(source.clone());
            }
        }
    }

    let mut lines = Vec::with_capacity(combined.len());
    for (idx, record) in combined.into_iter().enumerate() {
        match normalize_record(record) {
            Ok(example) => lines.push(jsonl_line(&render_text(&example))?),
            Err(reason) => {
                warn!("Dropping record {}: {}", idx, reason);
                report.dropped += 1;
            }
        }
    }

    write_lines(output, &lines)?;
    report.written = lines.len();
    info!("Wrote {} records to {}", report.written, output.display());
    Ok(report)
}

/// Read a raw file and unwrap it to its record sequence.
pub fn load_records(path: &Path) -> Result<Vec<Value>> {
    let value = store::read_raw(path)?;
    unwrap_records(value).ok_or_else(|| {
        DatasetError::UnexpectedLayout {
            path: PathBuf::from(path),
            reason: "expected an array or an object with a 'components' array".to_string(),
        }
        .into()
    })
}

/// `{components: [...]}` -> its sequence; a sequence as-is; anything else `None`.
pub fn unwrap_records(value: Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(mut map) => match map.remove("components") {
            Some(Value::Array(items)) => Some(items),
            _ => None,
        },
        _ => None,
    }
}

/// Validate one raw record. Strings are parsed as embedded JSON first.
pub fn normalize_record(record: Value) -> Result<TrainingExample, DropReason> {
    let record = match record {
        Value::String(raw) => {
            serde_json::from_str::<Value>(&raw).map_err(|_| DropReason::InvalidEmbeddedJson)?
        }
        other => other,
    };
    let Value::Object(map) = record else {
        return Err(DropReason::NotAnObject);
    };

    Ok(TrainingExample {
        prompt: required_text(map.get("prompt"), "prompt")?,
        completion: required_text(map.get("completion"), "completion")?,
    })
}

fn required_text(value: Option<&Value>, field: &'static str) -> Result<String, DropReason> {
    let text = match value {
        None | Some(Value::Null) => return Err(DropReason::MissingField(field)),
        Some(Value::String(s)) => s.clone(),
        Some(v @ (Value::Object(_) | Value::Array(_))) => {
            serde_json::to_string_pretty(v).map_err(|_| DropReason::UnsupportedType(field))?
        }
        Some(_) => return Err(DropReason::UnsupportedType(field)),
    };
    if text.is_empty() {
        return Err(DropReason::EmptyField(field));
    }
    Ok(text)
}

pub fn render_text(example: &TrainingExample) -> String {
    format!(
        "{}{}{}{}{}",
        PROMPT_TOKEN, example.prompt, COMPLETION_TOKEN, example.completion, END_TOKEN
    )
}

/// `{"text": "..."}` with a space after the colon.
pub fn jsonl_line(text: &str) -> Result<String> {
    Ok(format!("{{\"text\": {}}}", serde_json::to_string(text)?))
}

fn write_lines(output: &Path, lines: &[String]) -> Result<()> {
    if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let mut body = String::new();
    for line in lines {
        body.push_str(line);
        body.push('\n');
    }
    fs::write(output, body).with_context(|| format!("Failed to write {}", output.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(files: &[(&str, &str)], sources: &[&str]) -> (FormatReport, String) {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("raw");
        fs::create_dir_all(&raw).unwrap();
        for (name, body) in files {
            fs::write(raw.join(format!("{}.json", name)), body).unwrap();
        }
        let out = dir.path().join("processed/dataset.jsonl");
        let sources: Vec<String> = sources.iter().map(|s| s.to_string()).collect();
        let report = format_dataset(&raw, &sources, &out).unwrap();
        (report, fs::read_to_string(out).unwrap())
    }

    #[test]
    fn single_record_end_to_end() {
        let (report, out) = run(&[("magicui", r#"[{"prompt":"X","completion":"Y"}]"#)], &["magicui"]);
        assert_eq!(out.lines().collect::<Vec<_>>(), vec![
            r#"{"text": "<|prompt|>X<|completion|>Y<|endoftext|>"}"#
        ]);
        assert_eq!(report.written, 1);
        assert_eq!(report.dropped, 0);
    }

    #[test]
    fn missing_file_is_skipped() {
        let (report, out) = run(
            &[("magicui", r#"[{"prompt":"X","completion":"Y"}]"#)],
            &["magicui", "aceternity"],
        );
        assert_eq!(report.skipped_files, vec!["aceternity"]);
        assert_eq!(out.lines().count(), 1);
    }

    #[test]
    fn all_files_missing_writes_empty_dataset() {
        let (report, out) = run(&[], &["magicui", "aceternity"]);
        assert_eq!(report.skipped_files.len(), 2);
        assert_eq!(report.written, 0);
        assert!(out.is_empty());
    }

    #[test]
    fn components_mapping_is_unwrapped_and_order_kept() {
        let wrapped = json!({
            "source": "aceternity",
            "components": [
                {"prompt": "B", "completion": "2"},
                {"prompt": "C", "completion": "3"}
            ]
        })
        .to_string();
        let (report, out) = run(
            &[
                ("magicui", r#"[{"prompt":"A","completion":"1"}]"#),
                ("aceternity", wrapped.as_str()),
            ],
            &["magicui", "aceternity"],
        );
        assert_eq!(report.loaded, 3);
        let prompts: Vec<String> = out
            .lines()
            .map(|l| serde_json::from_str::<Value>(l).unwrap()["text"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(prompts, vec![
            "<|prompt|>A<|completion|>1<|endoftext|>",
            "<|prompt|>B<|completion|>2<|endoftext|>",
            "<|prompt|>C<|completion|>3<|endoftext|>",
        ]);
    }

    #[test]
    fn bad_layout_file_is_skipped() {
        let (report, _) = run(&[("magicui", r#"{"items": []}"#), ("aceternity", "not json")], &[
            "magicui",
            "aceternity",
        ]);
        assert_eq!(report.skipped_files, vec!["magicui", "aceternity"]);
    }

    #[test]
    fn incomplete_records_are_dropped() {
        let raw = json!([
            {"prompt": "ok", "completion": "fine"},
            {"prompt": "no completion"},
            {"completion": "no prompt"},
            {"prompt": "", "completion": "empty prompt"},
            {"prompt": "p", "completion": 42},
            7
        ])
        .to_string();
        let (report, out) = run(&[("magicui", raw.as_str())], &["magicui"]);
        assert_eq!(report.written, 1);
        assert_eq!(report.dropped, 5);
        assert!(out.contains("<|prompt|>ok<|completion|>fine"));
    }

    #[test]
    fn whitespace_only_fields_are_kept() {
        let ex = normalize_record(json!({"prompt": " ", "completion": "Y"})).unwrap();
        assert_eq!(render_text(&ex), "<|prompt|> <|completion|>Y<|endoftext|>");

        let ex = normalize_record(json!({"prompt": "X", "completion": "\n"})).unwrap();
        assert_eq!(ex.completion, "\n");
    }

    #[test]
    fn embedded_json_strings() {
        assert_eq!(
            normalize_record(json!(r#"{"prompt":"P","completion":"C"}"#)),
            Ok(TrainingExample { prompt: "P".into(), completion: "C".into() })
        );
        assert_eq!(normalize_record(json!("{not json")), Err(DropReason::InvalidEmbeddedJson));
        assert_eq!(normalize_record(json!("[1, 2]")), Err(DropReason::NotAnObject));
    }

    #[test]
    fn object_completion_is_serialized() {
        let ex = normalize_record(json!({"prompt": "P", "completion": {"name": "dock"}})).unwrap();
        assert_eq!(ex.completion, "{\n  \"name\": \"dock\"\n}");
    }

    #[test]
    fn delimiters_appear_in_order() {
        let ex = TrainingExample {
            prompt: "Generate a UI component like Marquee".into(),
            completion: "{\n  \"name\": \"marquee\"\n}".into(),
        };
        let text = render_text(&ex);
        let p = text.find(PROMPT_TOKEN).unwrap();
        let c = text.find(COMPLETION_TOKEN).unwrap();
        let e = text.find(END_TOKEN).unwrap();
        assert!(p < c && c < e);

        let line = jsonl_line(&text).unwrap();
        assert!(!line.contains('\n'));
        let back: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(back["text"], text);
    }
}
