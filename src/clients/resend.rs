use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    clients::provider::{EmailOptions, EmailProvider},
    models::outcome::SendOutcome,
};

#[derive(Debug, Clone, Serialize)]
struct ResendRequest {
    from: String,
    to: Vec<String>,
    subject: String,
    html: String,
    text: String,
}

#[derive(Debug, Deserialize)]
struct ResendResponse {
    id: String,
}

pub struct ResendProvider {
    http_client: Client,
    base_url: String,
    api_key: String,
    from_address: String,
}

impl ResendProvider {
    pub fn new(base_url: String, api_key: String, from_address: String) -> Self {
        info!(base_url = %base_url, "Resend email provider initialized");

        Self {
            http_client: Client::new(),
            base_url,
            api_key,
            from_address,
        }
    }

    async fn send_once(&self, options: &EmailOptions) -> SendOutcome {
        let request = ResendRequest {
            from: options
                .from
                .clone()
                .unwrap_or_else(|| self.from_address.clone()),
            to: vec![options.to.clone()],
            subject: options.subject.clone(),
            html: options.html.clone(),
            text: options.text.clone(),
        };

        let url = format!("{}/emails", self.base_url);

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
                warn!(error = %e, "Resend request did not complete");
                return SendOutcome::failed(format!("Resend request failed: {}", e));
            }
        };

        if response.status().is_success() {
            let message_id = response
                .json::<ResendResponse>()
                .await
                .map(|body| body.id)
                .ok();

            debug!(to = %options.to, "Resend accepted message");
            SendOutcome::sent(message_id)
        } else {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            warn!(status = %status, "Resend rejected message");
            SendOutcome::failed(format!("Resend returned status {}: {}", status, error_text))
        }
    }
}

#[async_trait]
impl EmailProvider for ResendProvider {
    async fn send(&self, options: EmailOptions) -> SendOutcome {
        debug!(to = %options.to, subject = %options.subject, "Sending email via Resend");
        self.send_once(&options).await
    }

    fn name(&self) -> &'static str {
        "resend"
    }
}
