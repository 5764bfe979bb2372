use std::collections::HashMap;

/// Ephemeral per-send render. Built, handed to the provider, then dropped;
/// never cached across intents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTemplate {
    pub subject: String,
    pub html: String,
    pub text: String,
    pub variables: HashMap<String, String>,
}
