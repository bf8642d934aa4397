use serde::{Deserialize, Serialize};

pub const REGISTRY_SCHEMA: &str = "https://ui.shadcn.com/schema/registry-item.json";
pub const REGISTRY_UI: &str = "registry:ui";

/// One component as scraped from a docs page, or synthesized from a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRecord {
    pub name: String,
    pub title: String,
    pub description: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub fallback: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryItem {
    #[serde(rename = "$schema")]
    pub schema: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub description: String,
    pub files: Vec<RegistryFile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryFile {
    pub path: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub prompt: String,
    pub completion: String,
}

impl RegistryItem {
    /// Wrap a component as a single-file `registry:ui` item under `namespace`.
    pub fn from_component(namespace: &str, component: &ComponentRecord) -> Self {
        RegistryItem {
            schema: REGISTRY_SCHEMA.to_string(),
            name: component.name.clone(),
            kind: REGISTRY_UI.to_string(),
            title: component.title.clone(),
            description: component.description.clone(),
            files: vec![RegistryFile {
                path: format!("registry/{}/{}.tsx", namespace, component.name),
                content: component.code.clone(),
                kind: REGISTRY_UI.to_string(),
                target: format!("components/{}/{}.tsx", namespace, component.name),
            }],
        }
    }
}

impl TrainingExample {
    pub fn from_component(
        namespace: &str,
        component: &ComponentRecord,
    ) -> serde_json::Result<Self> {
        let item = RegistryItem::from_component(namespace, component);
        Ok(TrainingExample {
            prompt: format!("Generate a UI component like {}", component.title),
            completion: serde_json::to_string_pretty(&item)?,
        })
    }
}

/// `animated-beam` -> `Animated Beam`.
pub fn title_case(slug: &str) -> String {
    slug.split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Lowercase, dash-separated identifier usable in URLs and file names.
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    out.trim_end_matches('-').to_string()
}
