use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;
use ureq::Agent;

use crate::config::BackendConfig;
use crate::model::{Reading, Trashbin};

/// Client for the dashboard backend.
pub struct ApiClient {
    agent: Agent,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let base_url = config.base_url.as_deref().ok_or_else(|| {
            anyhow::anyhow!(
                "No backend configured.\n\
                 \n\
                 Run: binwatch config set backend.base_url https://your-backend/api"
            )
        })?;

        let agent_config = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs())))
            .build();

        Ok(Self {
            agent: agent_config.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: config.resolve_api_token(),
        })
    }

    pub fn project_url(&self, project: &str, resource: &str) -> String {
        format!("{}/projects/{}/{}", self.base_url, project, resource)
    }

    pub fn list_trashbins(&self, project: &str) -> Result<Vec<Trashbin>> {
        let url = self.project_url(project, "trashbins");
        self.get_json(&url, &[])
    }

    pub fn fetch_readings(
        &self,
        project: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Reading>> {
        let url = self.project_url(project, "readings");
        let mut query = Vec::new();
        if let Some(from) = from {
            query.push(("from", from.to_string()));
        }
        if let Some(to) = to {
            query.push(("to", to.to_string()));
        }
        self.get_json(&url, &query)
    }

    pub fn project_config(&self, project: &str) -> Result<Map<String, Value>> {
        let url = self.project_url(project, "config");
        self.get_json(&url, &[])
    }

    /// Send a partial update and return the config as the backend stored it.
    pub fn patch_project_config(
        &self,
        project: &str,
        patch: &Map<String, Value>,
    ) -> Result<Map<String, Value>> {
        let url = self.project_url(project, "config");
        debug!(%url, keys = patch.len(), "patching project config");

        let mut request = self.agent.patch(&url);
        if let Some(token) = &self.token {
            request = request.header("Authorization", &format!("Bearer {token}"));
        }
        request
            .send_json(patch)
            .with_context(|| format!("Failed to update {url}"))?
            .body_mut()
            .read_json()
            .with_context(|| format!("Failed to parse response from {url}"))
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        debug!(%url, "GET");
        let mut request = self.agent.get(url);
        for (key, value) in query {
            request = request.query(*key, value);
        }
        if let Some(token) = &self.token {
            request = request.header("Authorization", &format!("Bearer {token}"));
        }
        request
            .call()
            .with_context(|| format!("Failed to fetch {url}"))?
            .body_mut()
            .read_json()
            .with_context(|| format!("Failed to parse response from {url}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_base_url() {
        let err = ApiClient::new(&BackendConfig::default()).err().unwrap();
        assert!(err.to_string().contains("No backend configured"));
    }

    #[test]
    fn test_project_url() {
        let config = BackendConfig {
            base_url: Some("https://api.example.org/v2/".to_string()),
            api_token: Some("t".to_string()),
            ..Default::default()
        };
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(
            client.project_url("oslo", "trashbins"),
            "https://api.example.org/v2/projects/oslo/trashbins"
        );
        assert_eq!(client.token.as_deref(), Some("t"));
    }
}
