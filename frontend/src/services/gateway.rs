use common::model::form_data::FieldErrors;
use common::model::submission::SubmissionReceipt;
use common::model::template::FormTemplate;
use common::requests::SubmissionRequest;
use common::submission::gateway::{GatewayError, SubmissionGateway};
use gloo_net::http::Request;

use crate::config::{SUBMISSIONS_PATH, TEMPLATES_PATH};

/// HTTP client for the form endpoints of the backend.
#[derive(Debug, Clone, Default)]
pub struct HttpGateway;

impl HttpGateway {
    pub async fn fetch_template(&self, template_id: &str) -> Result<FormTemplate, String> {
        let response = Request::get(&format!("{}/{}", TEMPLATES_PATH, template_id))
            .send()
            .await
            .map_err(|e| e.to_string())?;

        match response.status() {
            200 => response
                .json::<FormTemplate>()
                .await
                .map_err(|e| format!("Invalid template: {}", e)),
            404 => Err(format!("Template {} not found", template_id)),
            status => Err(format!(
                "Error loading template ({}): {}",
                status,
                response.text().await.unwrap_or_default()
            )),
        }
    }
}

impl SubmissionGateway for HttpGateway {
    async fn submit(&self, request: &SubmissionRequest) -> Result<SubmissionReceipt, GatewayError> {
        let response = Request::post(SUBMISSIONS_PATH)
            .json(request)
            .map_err(|e| GatewayError::Network(e.to_string()))?
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        match response.status() {
            200 | 201 => response
                .json::<SubmissionReceipt>()
                .await
                .map_err(|e| GatewayError::Server {
                    status: response.status(),
                    message: e.to_string(),
                }),
            422 => Err(GatewayError::Rejected(
                response.json::<FieldErrors>().await.unwrap_or_default(),
            )),
            status => Err(GatewayError::Server {
                status,
                message: response.text().await.unwrap_or_default(),
            }),
        }
    }
}
