/// What a provider reports back for one send attempt. Failures are carried
/// as values; the provider boundary never raises.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    pub success: bool,
    pub message_id: Option<String>,
    pub error: Option<String>,
}

impl SendOutcome {
    pub fn sent(message_id: Option<String>) -> Self {
        Self {
            success: true,
            message_id,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message_id: None,
            error: Some(error.into()),
        }
    }
}

/// Result of one service operation. Distinguishes a validation skip (nothing
/// attempted, nothing audited) from a provider failure (attempted, audited as
/// failed), and carries any audit-write error separately since a failed audit
/// write never rolls back a delivered email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendDisposition {
    Sent {
        message_id: Option<String>,
        audit_error: Option<String>,
    },
    Skipped(SkipReason),
    Failed {
        error: String,
        audit_error: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    InvalidDestinationEmail,
    MissingCurrentStep,
    MissingTenantContact,
}

impl SendDisposition {
    /// The coarse "did it work" view: true only when the email went out.
    pub fn delivered(&self) -> bool {
        matches!(self, SendDisposition::Sent { .. })
    }
}
