//! Notification dispatch for alert state transitions

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::checks::{Alert, Check};

/// Notification target
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NotifyTarget {
    /// Log to tracing
    Log,
    /// HTTP webhook
    Webhook {
        url: String,
        #[serde(default)]
        headers: HashMap<String, String>,
    },
}

/// Notifier for dispatching alert transitions
pub struct Notifier {
    client: reqwest::Client,
    targets: Vec<NotifyTarget>,
}

impl Notifier {
    /// Create a notifier dispatching to the given targets
    pub fn new(targets: Vec<NotifyTarget>) -> Self {
        Self {
            client: reqwest::Client::new(),
            targets,
        }
    }

    /// Dispatch one alert to all targets
    pub async fn notify(&self, check: &Check, alert: &Alert) -> Result<(), NotifierError> {
        let mut errors = Vec::new();

        for target in &self.targets {
            if let Err(e) = self.notify_target(check, alert, target).await {
                errors.push(e);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(NotifierError::Multiple(errors))
        }
    }

    async fn notify_target(
        &self,
        check: &Check,
        alert: &Alert,
        target: &NotifyTarget,
    ) -> Result<(), NotifierError> {
        match target {
            NotifyTarget::Log => {
                tracing::warn!(
                    check_id = %check.id,
                    check_name = %check.name,
                    target = %alert.target,
                    value = alert.value,
                    "Check transitioned {} -> {}",
                    alert.from_type,
                    alert.to_type
                );
                Ok(())
            }
            NotifyTarget::Webhook { url, headers } => {
                self.send_webhook(check, alert, url, headers).await
            }
        }
    }

    async fn send_webhook(
        &self,
        check: &Check,
        alert: &Alert,
        url: &str,
        headers: &HashMap<String, String>,
    ) -> Result<(), NotifierError> {
        let payload = serde_json::json!({
            "check_id": check.id,
            "check_name": check.name,
            "target": alert.target,
            "value": alert.value,
            "warn": alert.warn,
            "error": alert.error,
            "from": alert.from_type,
            "to": alert.to_type,
            "timestamp": alert.timestamp.to_rfc3339(),
        });

        let mut request = self.client.post(url).json(&payload);

        for (key, value) in headers {
            request = request.header(key, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| NotifierError::Webhook(format!("Failed to send webhook: {}", e)))?;

        if !response.status().is_success() {
            return Err(NotifierError::Webhook(format!(
                "Webhook returned status {}",
                response.status()
            )));
        }

        tracing::debug!(
            check_id = %check.id,
            url = %url,
            "Webhook notification sent"
        );

        Ok(())
    }
}

/// Notifier errors
#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    #[error("Webhook error: {0}")]
    Webhook(String),

    #[error("Multiple notification failures: {0:?}")]
    Multiple(Vec<NotifierError>),
}
