use crate::{
    error::{GenError, Result},
    models::KieEnvelope,
};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

/// Wire seam for the Kie.ai job API. The production implementation speaks
/// HTTP; tests inject a scripted fake so polling behavior is deterministic.
#[async_trait]
pub trait KieTransport: Send + Sync {
    /// POST {base}/generate with the job payload.
    async fn create_task(&self, payload: &Value) -> Result<KieEnvelope>;

    /// GET {base}/record-info?taskId={id}.
    async fn record_info(&self, task_id: &str) -> Result<KieEnvelope>;
}

pub struct HttpTransport {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    async fn parse_envelope(response: reqwest::Response) -> Result<KieEnvelope> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenError::RequestError(format!(
                "Kie.ai returned HTTP {}: {}",
                status, body
            )));
        }

        response
            .json::<KieEnvelope>()
            .await
            .map_err(|e| GenError::ResponseError(format!("invalid Kie.ai envelope: {}", e)))
    }
}

#[async_trait]
impl KieTransport for HttpTransport {
    async fn create_task(&self, payload: &Value) -> Result<KieEnvelope> {
        let response = self
            .client
            .post(&format!("{}/generate", self.base_url))
            .bearer_auth(&self.api_key)
            .json(payload)
            .send()
            .await
            .map_err(|e| GenError::RequestError(format!("Kie.ai create request failed: {}", e)))?;

        Self::parse_envelope(response).await
    }

    async fn record_info(&self, task_id: &str) -> Result<KieEnvelope> {
        let response = self
            .client
            .get(&format!("{}/record-info", self.base_url))
            .query(&[("taskId", task_id)])
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| GenError::RequestError(format!("Kie.ai status request failed: {}", e)))?;

        Self::parse_envelope(response).await
    }
}
