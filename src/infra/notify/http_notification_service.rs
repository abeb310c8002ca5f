use crate::domain::ports::NotificationService;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::error;

/// Pushes user notifications to an external delivery service. The engine
/// treats delivery as fire-and-forget; callers log failures and move on.
pub struct HttpNotificationService {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpNotificationService {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            api_key,
        }
    }
}

#[derive(Serialize)]
struct NotificationPayload<'a> {
    user_id: &'a str,
    kind: &'a str,
    payload: &'a serde_json::Value,
}

#[async_trait]
impl NotificationService for HttpNotificationService {
    async fn notify(
        &self,
        user_id: &str,
        kind: &str,
        payload: &serde_json::Value,
    ) -> Result<(), AppError> {
        let body = NotificationPayload {
            user_id,
            kind,
            payload,
        };

        let res = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Notification service connection error: {}", e);
                error!("{}", msg);
                AppError::InternalWithMsg(msg)
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            let msg = format!("Notification service failed. Status: {}, Body: {}", status, text);
            error!("{}", msg);
            return Err(AppError::InternalWithMsg(msg));
        }

        Ok(())
    }
}
