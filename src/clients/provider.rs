use anyhow::{Error, Result};
use async_trait::async_trait;

use crate::{
    clients::{resend::ResendProvider, sendgrid::SendgridProvider},
    config::{Config, ProviderKind},
    models::outcome::SendOutcome,
};

/// Options for one outbound email. `from` overrides the provider's configured
/// sender when set.
#[derive(Debug, Clone)]
pub struct EmailOptions {
    pub to: String,
    pub from: Option<String>,
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Uniform send contract over interchangeable transactional-email backends.
///
/// Implementations make exactly one outbound HTTP request per call and report
/// every failure as a `SendOutcome` value. Retry policy, if any, belongs to
/// the caller.
#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send(&self, options: EmailOptions) -> SendOutcome;

    fn name(&self) -> &'static str;
}

/// Builds the backend selected by configuration. Fails when the selected
/// provider's credential is absent; the process should not start degraded.
pub fn build_provider(config: &Config) -> Result<Box<dyn EmailProvider>, Error> {
    let api_key = config.provider_api_key()?.to_string();

    let provider: Box<dyn EmailProvider> = match config.email_provider {
        ProviderKind::Resend => Box::new(ResendProvider::new(
            config.resend_base_url.clone(),
            api_key,
            config.email_from.clone(),
        )),
        ProviderKind::Sendgrid => Box::new(SendgridProvider::new(
            config.sendgrid_base_url.clone(),
            api_key,
            config.email_from.clone(),
        )),
    };

    Ok(provider)
}
