//! Conversation-analysis REST client.

use super::error::Error;
use super::types::{AnalyzeRequest, AnalyzeResponse, OrchestrationResult};
use crate::config::OrchestrationConfig;
use crate::http::{AuthConfig, HttpClient};
use std::time::Duration;

/// Header carrying the language resource key.
pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

const ANALYZE_PATH: &str = "/language/:analyze-conversations";

#[derive(Debug)]
pub struct OrchestrationClient {
    http: HttpClient,
    auth: AuthConfig,
    project: String,
    deployment: String,
    api_version: String,
}

impl OrchestrationClient {
    pub fn new(config: &OrchestrationConfig, timeout: Duration) -> Result<Self, Error> {
        let endpoint = config
            .endpoint
            .as_deref()
            .ok_or(Error::MissingSetting("endpoint"))?;
        let key = config.key.clone().ok_or(Error::MissingSetting("key"))?;
        let project = config
            .project
            .clone()
            .ok_or(Error::MissingSetting("project"))?;
        let deployment = config
            .deployment
            .clone()
            .ok_or(Error::MissingSetting("deployment"))?;

        Ok(Self {
            http: HttpClient::new(endpoint, timeout),
            auth: AuthConfig::ApiKey {
                header: SUBSCRIPTION_KEY_HEADER.to_string(),
                key,
            },
            project,
            deployment,
            api_version: config.api_version.clone(),
        })
    }

    /// Route `query` through the orchestration project.
    pub async fn analyze(&self, query: &str) -> Result<OrchestrationResult, Error> {
        let path = format!(
            "{ANALYZE_PATH}?api-version={}",
            urlencoding::encode(&self.api_version)
        );
        let body = AnalyzeRequest::new(query, &self.project, &self.deployment);
        let response = self.http.post_json(&path, &self.auth, &body).await?;

        if !response.status.is_success() {
            return Err(Error::Api {
                status: response.status.as_u16(),
                message: response.error_message(),
            });
        }

        let decoded: AnalyzeResponse = response.decode().map_err(Error::Decode)?;
        tracing::debug!(
            top_intent = %decoded.result.prediction.top_intent,
            "orchestration prediction received"
        );
        Ok(decoded.result)
    }
}
