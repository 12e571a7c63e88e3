//! Anthropic value resolver.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use smartfill_protocols::{FieldType, ResolveRequest, ResolverError, ValueResolver};

use crate::api::{ApiErrorBody, ApiMessage, ApiRequest, ApiResponse};
use crate::form_type::FormType;
use crate::prompt::build_prompt;

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-3-sonnet-20240229";
pub const DEFAULT_API_VERSION: &str = "2023-06-01";
pub const DEFAULT_MAX_TOKENS: u32 = 2048;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Resolves field values with one Messages API call per form.
pub struct AnthropicResolver {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_version: String,
    max_tokens: u32,
    timeout: Duration,
}

impl Default for AnthropicResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl AnthropicResolver {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Point at another API host (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }

    async fn send(&self, api_key: &str, api_request: &ApiRequest) -> Result<ApiResponse, ResolverError> {
        let response = self
            .client
            .post(self.endpoint())
            .timeout(self.timeout)
            .header("x-api-key", api_key)
            .header("anthropic-version", &self.api_version)
            .header("content-type", "application/json")
            .json(api_request)
            .send()
            .await
            .map_err(|e| ResolverError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            warn!("Anthropic API returned {}: {}", status, message);
            return Err(match status.as_u16() {
                401 | 403 => ResolverError::AuthRejected(message),
                code => ResolverError::Upstream {
                    status: code,
                    message,
                },
            });
        }

        response
            .json::<ApiResponse>()
            .await
            .map_err(|e| ResolverError::Unreachable(e.to_string()))
    }
}

/// Blank every file-upload field in the reply. Replies the validator would
/// reject are passed through untouched so it can report them.
fn blank_file_fields(reply: String, request: &ResolveRequest) -> String {
    let uploads: Vec<&str> = request
        .fields
        .iter()
        .filter(|field| field.field_type == FieldType::File)
        .map(|field| field.id.as_str())
        .collect();
    if uploads.is_empty() {
        return reply;
    }

    let Ok(mut values) = smartfill_core::extract_values(&reply) else {
        return reply;
    };
    for id in uploads {
        if let Some(value) = values.get_mut(id) {
            if !value.is_empty() {
                debug!("Dropping value proposed for file field {}", id);
                value.clear();
            }
        }
    }
    serde_json::to_string(&values).unwrap_or(reply)
}

#[async_trait]
impl ValueResolver for AnthropicResolver {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn resolve(&self, request: ResolveRequest) -> Result<String, ResolverError> {
        let api_key = request
            .credential
            .as_ref()
            .filter(|c| !c.is_blank())
            .ok_or_else(|| ResolverError::AuthRejected("no API key provided".to_string()))?;

        let form_type = FormType::detect(&request.context, &request.fields);
        info!(
            "Requesting values for {} fields ({}) from {}",
            request.fields.len(),
            form_type,
            self.model
        );

        let api_request = ApiRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            messages: vec![ApiMessage::user(build_prompt(form_type, &request))],
        };
        let response = self.send(api_key.expose(), &api_request).await?;

        let text = response
            .first_text()
            .ok_or(ResolverError::EmptyReply)?
            .to_string();
        debug!("Anthropic reply: {} chars", text.len());
        Ok(blank_file_fields(text, &request))
    }
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
