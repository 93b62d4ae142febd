use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use anyhow::{Result, anyhow};

use crate::config::Settings;
use crate::extract::{self, Extracted};

#[derive(Serialize)]
struct RunRequest {
    input_value: String,
    output_type: String,
    input_type: String,
}

#[derive(Clone)]
pub struct LangflowClient {
    client: Client,
    base_url: String,
    langflow_id: String,
    flow_id: String,
    token: String,
}

impl LangflowClient {
    pub fn new(settings: &Settings) -> Self {
        Self {
            client: Client::new(),
            base_url: settings.base_api_url.clone(),
            langflow_id: settings.langflow_id.clone(),
            flow_id: settings.flow_id.clone(),
            token: settings.application_token.clone(),
        }
    }

    pub fn run_url(&self) -> String {
        format!(
            "{}/lf/{}/api/v1/run/{}",
            self.base_url, self.langflow_id, self.flow_id
        )
    }

    pub fn flow_id(&self) -> &str {
        &self.flow_id
    }

    /// Send one chat message through the flow and return the reply text.
    /// One round trip, no retries; a response whose JSON matches none of
    /// the known shapes is an error carrying the payload.
    pub async fn run_flow(&self, message: &str) -> Result<String> {
        let request = RunRequest {
            input_value: message.to_string(),
            output_type: "chat".to_string(),
            input_type: "chat".to_string(),
        };

        tracing::debug!(url = %self.run_url(), "sending message to flow");

        let response = self
            .client
            .post(self.run_url())
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "flow request failed");
            return Err(anyhow!("Langflow API error {}: {}", status, text));
        }

        let payload: Value = response.json().await?;

        match extract::reply_text(&payload) {
            Extracted::Reply(text) => Ok(text),
            Extracted::Unrecognized(payload) => Err(anyhow!(
                "Unrecognized response shape from flow: {}",
                payload
            )),
        }
    }
}
