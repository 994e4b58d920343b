pub mod bins;
pub mod completion;
pub mod config;
pub mod heatmap;
pub mod project;
pub mod route;

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;

use binwatch::config::Config;

/// Project from the command line, else from `backend.project`.
fn resolve_project(arg: Option<String>, config: &Config) -> Result<String> {
    arg.or_else(|| config.backend().project).ok_or_else(|| {
        anyhow::anyhow!(
            "No project given. Pass --project or run: binwatch config set backend.project <name>"
        )
    })
}

fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use binwatch::config::BackendConfig;

    #[test]
    fn test_resolve_project_prefers_argument() {
        let config = Config {
            backend: Some(BackendConfig {
                project: Some("from-config".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(
            resolve_project(Some("cli".to_string()), &config).unwrap(),
            "cli"
        );
        assert_eq!(resolve_project(None, &config).unwrap(), "from-config");
        assert!(resolve_project(None, &Config::default()).is_err());
    }
}
