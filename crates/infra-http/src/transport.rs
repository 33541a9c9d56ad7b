// HTTP Transport Implementation

use async_trait::async_trait;
use formsync_core::domain::ReportHandle;
use formsync_core::error::{AppError, Result};
use formsync_core::port::{Answer, Transport};
use serde::Serialize;
use tracing::debug;

/// Transport over the form backend's REST API.
///
/// Endpoints:
/// - `POST {base}/api/products/{id}/responses` with `{"answers": [...]}`
/// - `GET  {base}/api/reports/{id}` returning the report status JSON
///
/// Every error (connection, timeout, non-2xx) maps to
/// [`AppError::Transport`]; callers treat them uniformly as transient.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Serialize)]
struct SubmitBody<'a> {
    answers: &'a [Answer],
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn submit_answers(&self, product_id: &str, answers: &[Answer]) -> Result<()> {
        let url = format!("{}/api/products/{}/responses", self.base_url, product_id);
        debug!(url = %url, answers = answers.len(), "Submitting answers");

        let response = self
            .authorize(self.client.post(&url))
            .json(&SubmitBody { answers })
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("Submit request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Transport(format!(
                "Submit rejected with status {}",
                response.status()
            )));
        }

        Ok(())
    }

    async fn get_report_status(&self, report_id: &str) -> Result<ReportHandle> {
        let url = format!("{}/api/reports/{}", self.base_url, report_id);
        debug!(url = %url, "Fetching report status");

        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("Status request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Transport(format!(
                "Status fetch rejected with status {}",
                response.status()
            )));
        }

        response
            .json::<ReportHandle>()
            .await
            .map_err(|e| AppError::Transport(format!("Malformed report status: {}", e)))
    }
}
