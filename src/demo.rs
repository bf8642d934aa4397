//! Prompt -> hosted model -> best-effort registry JSON.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::DatasetError;
use crate::format::{COMPLETION_TOKEN, END_TOKEN, PROMPT_TOKEN};
use crate::settings::HubSettings;

pub const EXAMPLE_PROMPTS: [&str; 3] = [
    "A horizontal scrolling marquee with pauseOnHover",
    "A 3D card component with perspective effects",
    "An animated toggle switch with accessibility support",
];

/// Text generation backend for the demo.
pub trait Generator {
    fn generate(&self, prompt: &str) -> Result<String>;
}

/// Parse model output as JSON, falling back to the outermost `{...}` slice.
pub fn repair_json(raw: &str) -> Value {
    if let Ok(parsed) = serde_json::from_str::<Value>(raw) {
        return parsed;
    }
    match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) => raw
            .get(start..=end)
            .and_then(|slice| serde_json::from_str(slice).ok())
            .unwrap_or_else(|| json!({ "error": "Could not parse JSON", "raw_output": raw })),
        _ => json!({ "error": "No valid JSON found", "raw_output": raw }),
    }
}

/// Wrap a user description the way training prompts are wrapped.
pub fn build_prompt(description: &str) -> String {
    format!("{}{}{}", PROMPT_TOKEN, description.trim(), COMPLETION_TOKEN)
}

/// Strip an echoed prompt and anything after the end token.
pub fn clean_generation(prompt: &str, generated: &str) -> String {
    let body = generated.strip_prefix(prompt).unwrap_or(generated);
    let body = match body.find(COMPLETION_TOKEN) {
        Some(idx) => &body[idx + COMPLETION_TOKEN.len()..],
        None => body,
    };
    body.split(END_TOKEN).next().unwrap_or_default().trim().to_string()
}

pub fn answer(generator: &dyn Generator, description: &str) -> Result<Value> {
    let raw = generator.generate(description)?;
    Ok(repair_json(&raw))
}

/// Hosted inference API client (`POST {endpoint}/{model}`).
pub struct HubInference {
    client: Client,
    url: String,
    token: Option<String>,
    max_new_tokens: u32,
    temperature: f32,
}

impl HubInference {
    pub fn from_settings(settings: &HubSettings) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(120))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(HubInference {
            client,
            url: format!(
                "{}/{}",
                settings.inference_endpoint.trim_end_matches('/'),
                settings.model
            ),
            token: std::env::var(&settings.token_env).ok().filter(|t| !t.is_empty()),
            max_new_tokens: settings.max_new_tokens,
            temperature: settings.temperature,
        })
    }
}

impl Generator for HubInference {
    fn generate(&self, description: &str) -> Result<String> {
        let prompt = build_prompt(description);
        let mut request = self.client.post(&self.url).json(&json!({
            "inputs": prompt,
            "parameters": {
                "max_new_tokens": self.max_new_tokens,
                "temperature": self.temperature,
                "return_full_text": false,
            }
        }));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().with_context(|| format!("POST {} failed", self.url))?;
        let status = response.status();
        let body = response
            .text()
            .with_context(|| format!("Failed to read body of {}", self.url))?;
        let text = generated_text(&self.url, status, &body)?;
        debug!("Generated {} chars", text.len());
        Ok(clean_generation(&prompt, &text))
    }
}

/// Pull `generated_text` out of an inference reply. Non-success statuses are
/// reported with their code before the body is parsed.
fn generated_text(url: &str, status: StatusCode, body: &str) -> Result<String> {
    if !status.is_success() {
        warn!("{} returned {}: {}", url, status.as_u16(), body.trim());
        return Err(DatasetError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        }
        .into());
    }
    let value: Value = serde_json::from_str(body).context("Unexpected inference response")?;
    value
        .get(0)
        .or(Some(&value))
        .and_then(|v| v.get("generated_text"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| anyhow!("no generated_text in inference response"))
}

/// Interactive loop: one description in, one JSON document out. A number picks an example.
pub fn run_interactive(generator: &dyn Generator) -> Result<()> {
    println!("Describe the component (e.g. 'Create an animated dropdown'). Empty line to quit.");
    println!("Examples:");
    for (i, example) in EXAMPLE_PROMPTS.iter().enumerate() {
        println!("  [{}] {}", i + 1, example);
    }

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        io::stdout().flush()?;
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            break;
        }
        let description = pick_example(input).unwrap_or(input);

        match answer(generator, description) {
            Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
            Err(e) => eprintln!("Generation failed: {:#}", e),
        }
    }
    Ok(())
}

fn pick_example(input: &str) -> Option<&'static str> {
    let n: usize = input.parse().ok()?;
    EXAMPLE_PROMPTS.get(n.checked_sub(1)?).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Canned(&'static str);

    impl Generator for Canned {
        fn generate(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn direct_json_is_returned_as_is() {
        let v = repair_json(r#"{"name": "marquee", "type": "registry:ui"}"#);
        assert_eq!(v["name"], "marquee");
    }

    #[test]
    fn json_wrapped_in_prose_is_recovered() {
        let v = repair_json("Sure! Here it is:\n{\"name\": \"card\", \"files\": [{\"path\": \"a\"}]}\nEnjoy.");
        assert_eq!(v["name"], "card");
        assert_eq!(v["files"][0]["path"], "a");
    }

    #[test]
    fn unparseable_braces_report_error() {
        let v = repair_json("{ name: card }");
        assert_eq!(v["error"], "Could not parse JSON");
        assert_eq!(v["raw_output"], "{ name: card }");
    }

    #[test]
    fn no_braces_report_error() {
        let v = repair_json("I cannot help with that");
        assert_eq!(v["error"], "No valid JSON found");

        let v = repair_json("only an opening { brace");
        assert_eq!(v["error"], "No valid JSON found");

        let v = repair_json("} backwards {");
        assert_eq!(v["error"], "Could not parse JSON");
    }

    #[test]
    fn generation_is_trimmed_to_the_completion() {
        let prompt = build_prompt(" A glowing button ");
        assert_eq!(prompt, "<|prompt|>A glowing button<|completion|>");
        let generated = format!("{}{{\"name\": \"x\"}}<|endoftext|><|prompt|>junk", prompt);
        assert_eq!(clean_generation(&prompt, &generated), "{\"name\": \"x\"}");
        assert_eq!(clean_generation(&prompt, " {\"a\": 1} "), "{\"a\": 1}");
    }

    #[test]
    fn answer_repairs_generator_output() {
        let v = answer(&Canned("output: {\"title\": \"Dock\"}"), EXAMPLE_PROMPTS[0]).unwrap();
        assert_eq!(v["title"], "Dock");
    }

    #[test]
    fn inference_reply_is_unwrapped() {
        let url = "https://api-inference.huggingface.co/models/m";
        let text = generated_text(url, StatusCode::OK, r#"[{"generated_text": "{\"a\": 1}"}]"#).unwrap();
        assert_eq!(text, "{\"a\": 1}");
        let text = generated_text(url, StatusCode::OK, r#"{"generated_text": "x"}"#).unwrap();
        assert_eq!(text, "x");
        assert!(generated_text(url, StatusCode::OK, r#"{"other": 1}"#).is_err());
    }

    #[test]
    fn error_status_wins_over_html_body() {
        let url = "https://api-inference.huggingface.co/models/m";
        let err = generated_text(url, StatusCode::BAD_GATEWAY, "<html>502 Bad Gateway</html>")
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DatasetError>(),
            Some(DatasetError::HttpStatus { status: 502, .. })
        ));
    }

    #[test]
    fn numbers_pick_examples() {
        assert_eq!(pick_example("2"), Some(EXAMPLE_PROMPTS[1]));
        assert_eq!(pick_example("0"), None);
        assert_eq!(pick_example("9"), None);
        assert_eq!(pick_example("a marquee"), None);
    }
}
