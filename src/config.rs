use anyhow::{Error, Result, anyhow};
use dotenvy::dotenv;
use serde::Deserialize;

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Resend,
    Sendgrid,
}

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    #[serde(default)]
    pub email_provider: ProviderKind,

    pub resend_api_key: Option<String>,
    pub sendgrid_api_key: Option<String>,

    pub email_from: String,

    pub app_base_url: String,

    #[serde(default = "default_resend_base_url")]
    pub resend_base_url: String,
    #[serde(default = "default_sendgrid_base_url")]
    pub sendgrid_base_url: String,
}

fn default_resend_base_url() -> String {
    "https://api.resend.com".to_string()
}

fn default_sendgrid_base_url() -> String {
    "https://api.sendgrid.com".to_string()
}

impl Config {
    pub fn load() -> Result<Self, Error> {
        dotenv().ok();

        let config = envy::from_env::<Self>()
            .map_err(|_| anyhow!("Invalid or missing environmental variable"))?;
        Ok(config)
    }

    /// Credential for the selected provider. A missing key for the selected
    /// provider is a startup error, not a per-send condition.
    pub fn provider_api_key(&self) -> Result<&str, Error> {
        match self.email_provider {
            ProviderKind::Resend => self
                .resend_api_key
                .as_deref()
                .ok_or_else(|| anyhow!("RESEND_API_KEY is required when EMAIL_PROVIDER=resend")),
            ProviderKind::Sendgrid => self.sendgrid_api_key.as_deref().ok_or_else(|| {
                anyhow!("SENDGRID_API_KEY is required when EMAIL_PROVIDER=sendgrid")
            }),
        }
    }
}
