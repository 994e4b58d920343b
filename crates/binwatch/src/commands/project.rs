use anyhow::Result;
use colored::Colorize;
use serde_json::{Map, Value};

use binwatch::api::ApiClient;
use binwatch::config::Config;

use crate::cli::ProjectCommands;

pub fn run(project: Option<String>, command: ProjectCommands) -> Result<()> {
    let config = Config::load_or_default()?;
    let project = super::resolve_project(project, &config)?;
    let client = ApiClient::new(&config.backend())?;

    match command {
        ProjectCommands::Show => {
            let current = client.project_config(&project)?;
            println!("{} {}", "Project:".bold(), project);
            super::print_json(&current)
        }
        ProjectCommands::Set { key, value } => {
            let patch = build_patch(&key, &value)?;
            let updated = client.patch_project_config(&project, &patch)?;
            println!("{} {key} on {project}", "Updated".green().bold());
            super::print_json(&updated)
        }
    }
}

/// Partial update for a dotted key: `a.b` with `1` becomes `{"a": {"b": 1}}`.
///
/// The value is sent as JSON when it parses as JSON, else as a string.
fn build_patch(key: &str, value: &str) -> Result<Map<String, Value>> {
    let parts: Vec<&str> = key.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        anyhow::bail!("Invalid key: '{key}'");
    }

    let mut leaf =
        serde_json::from_str::<Value>(value).unwrap_or_else(|_| Value::String(value.to_string()));
    for part in parts[1..].iter().rev() {
        let mut object = Map::new();
        object.insert((*part).to_string(), leaf);
        leaf = Value::Object(object);
    }

    let mut patch = Map::new();
    patch.insert(parts[0].to_string(), leaf);
    Ok(patch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_patch_flat() {
        let patch = build_patch("name", "Harbour district").unwrap();
        assert_eq!(Value::Object(patch), json!({"name": "Harbour district"}));
    }

    #[test]
    fn test_build_patch_nested_json_value() {
        let patch = build_patch("thresholds.fill", "80").unwrap();
        assert_eq!(Value::Object(patch), json!({"thresholds": {"fill": 80}}));

        let patch = build_patch("alerts.enabled", "true").unwrap();
        assert_eq!(Value::Object(patch), json!({"alerts": {"enabled": true}}));
    }

    #[test]
    fn test_build_patch_rejects_empty_segments() {
        assert!(build_patch("", "1").is_err());
        assert!(build_patch("a..b", "1").is_err());
        assert!(build_patch("a.", "1").is_err());
    }
}
