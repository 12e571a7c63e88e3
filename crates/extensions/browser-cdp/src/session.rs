//! Page session: commands scoped to one attached tab.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::debug;

use crate::client::CdpClient;
use crate::error::CdpError;
use crate::protocol::FrameTree;

/// Name of the isolated world scripts run in.
const WORLD_NAME: &str = "smartfill";

/// A session attached to a single page/target.
pub struct PageSession {
    target_id: String,
    session_id: String,
    client: Arc<CdpClient>,
}

impl PageSession {
    pub(crate) fn new(target_id: String, session_id: String, client: Arc<CdpClient>) -> Self {
        Self {
            target_id,
            session_id,
            client,
        }
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Send a CDP command to this page session.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.client.call(method, params, Some(&self.session_id)).await
    }

    pub(crate) async fn enable_domains(&self) -> Result<(), CdpError> {
        self.call("Page.enable", None).await?;
        self.call("Runtime.enable", None).await?;
        debug!("Enabled Page and Runtime domains for {}", self.target_id);
        Ok(())
    }

    pub async fn frame_tree(&self) -> Result<FrameTree, CdpError> {
        let result = self.call("Page.getFrameTree", None).await?;
        Ok(serde_json::from_value(result["frameTree"].clone())?)
    }

    /// Create an isolated world in a frame and return its execution context.
    pub async fn isolated_world(&self, frame_id: &str) -> Result<i64, CdpError> {
        let result = self
            .call(
                "Page.createIsolatedWorld",
                Some(json!({
                    "frameId": frame_id,
                    "worldName": WORLD_NAME,
                })),
            )
            .await
            .map_err(|e| match e {
                CdpError::Protocol { message, .. } => CdpError::FrameNotFound(format!("{}: {}", frame_id, message)),
                other => other,
            })?;

        result["executionContextId"]
            .as_i64()
            .ok_or_else(|| CdpError::InvalidResponse("Missing executionContextId".to_string()))
    }

    /// Evaluate a JavaScript expression in an execution context and return
    /// its value.
    pub async fn evaluate_in(&self, context_id: i64, expression: &str) -> Result<Value, CdpError> {
        let result = self
            .call(
                "Runtime.evaluate",
                Some(json!({
                    "expression": expression,
                    "contextId": context_id,
                    "returnByValue": true,
                    "awaitPromise": true,
                })),
            )
            .await?;

        if let Some(exception) = result.get("exceptionDetails") {
            let text = exception["exception"]["description"]
                .as_str()
                .or_else(|| exception["text"].as_str())
                .unwrap_or("Unknown error");
            return Err(CdpError::JavaScript(text.to_string()));
        }

        Ok(result["result"]["value"].clone())
    }
}
