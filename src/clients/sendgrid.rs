use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    clients::provider::{EmailOptions, EmailProvider},
    models::outcome::SendOutcome,
};

#[derive(Debug, Clone, Serialize)]
struct SendgridRequest {
    personalizations: Vec<SendgridPersonalization>,
    from: SendgridAddress,
    subject: String,
    content: Vec<SendgridContent>,
}

#[derive(Debug, Clone, Serialize)]
struct SendgridPersonalization {
    to: Vec<SendgridAddress>,
}

#[derive(Debug, Clone, Serialize)]
struct SendgridAddress {
    email: String,
}

#[derive(Debug, Clone, Serialize)]
struct SendgridContent {
    #[serde(rename = "type")]
    content_type: String,
    value: String,
}

pub struct SendgridProvider {
    http_client: Client,
    base_url: String,
    api_key: String,
    from_address: String,
}

impl SendgridProvider {
    pub fn new(base_url: String, api_key: String, from_address: String) -> Self {
        info!(base_url = %base_url, "SendGrid email provider initialized");

        Self {
            http_client: Client::new(),
            base_url,
            api_key,
            from_address,
        }
    }

    async fn send_once(&self, options: &EmailOptions) -> SendOutcome {
        // SendGrid requires plain text before HTML in the content array.
        let request = SendgridRequest {
            personalizations: vec![SendgridPersonalization {
                to: vec![SendgridAddress {
                    email: options.to.clone(),
                }],
            }],
            from: SendgridAddress {
                email: options
                    .from
                    .clone()
                    .unwrap_or_else(|| self.from_address.clone()),
            },
            subject: options.subject.clone(),
            content: vec![
                SendgridContent {
                    content_type: "text/plain".to_string(),
                    value: options.text.clone(),
                },
                SendgridContent {
                    content_type: "text/html".to_string(),
                    value: options.html.clone(),
                },
            ],
        };

        let url = format!("{}/v3/mail/send", self.base_url);

        let response = match self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(Duration::from_secs(10))
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "SendGrid request did not complete");
                return SendOutcome::failed(format!("SendGrid request failed: {}", e));
            }
        };

        if response.status().is_success() {
            let message_id = response
                .headers()
                .get("X-Message-Id")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);

            debug!(to = %options.to, "SendGrid accepted message");
            SendOutcome::sent(message_id)
        } else {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            warn!(status = %status, "SendGrid rejected message");
            SendOutcome::failed(format!(
                "SendGrid returned status {}: {}",
                status, error_text
            ))
        }
    }
}

#[async_trait]
impl EmailProvider for SendgridProvider {
    async fn send(&self, options: EmailOptions) -> SendOutcome {
        debug!(to = %options.to, subject = %options.subject, "Sending email via SendGrid");
        self.send_once(&options).await
    }

    fn name(&self) -> &'static str {
        "sendgrid"
    }
}
