use std::fmt::{Display, Formatter, Result};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    Welcome,
    StepCompletion,
    Reminder,
    Completion,
    AdminAlert,
    Custom,
}

impl Display for DeliveryStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            DeliveryStatus::Sent => write!(f, "sent"),
            DeliveryStatus::Failed => write!(f, "failed"),
        }
    }
}

impl Display for NotificationType {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            NotificationType::Welcome => write!(f, "welcome"),
            NotificationType::StepCompletion => write!(f, "step_completion"),
            NotificationType::Reminder => write!(f, "reminder"),
            NotificationType::Completion => write!(f, "completion"),
            NotificationType::AdminAlert => write!(f, "admin_alert"),
            NotificationType::Custom => write!(f, "custom"),
        }
    }
}

/// One append-only record per attempted send, successful or not. Validation
/// skips write no entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub notification_type: NotificationType,
    /// Recipient identifier the entry is filed under.
    pub resource_id: String,
    pub status: DeliveryStatus,
    pub message_id: Option<String>,
    pub error: Option<String>,
    pub recipient_email: String,
    pub process_instance_id: String,
    pub step_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateAuditEntry {
    pub notification_type: NotificationType,
    pub resource_id: String,
    pub status: DeliveryStatus,
    pub message_id: Option<String>,
    pub error: Option<String>,
    pub recipient_email: String,
    pub process_instance_id: String,
    pub step_id: Option<String>,
}

impl CreateAuditEntry {
    pub fn new(
        notification_type: NotificationType,
        resource_id: String,
        status: DeliveryStatus,
        recipient_email: String,
        process_instance_id: String,
    ) -> Self {
        Self {
            notification_type,
            resource_id,
            status,
            message_id: None,
            error: None,
            recipient_email,
            process_instance_id,
            step_id: None,
        }
    }

    pub fn with_message_id(mut self, message_id: String) -> Self {
        self.message_id = Some(message_id);
        self
    }

    pub fn with_error(mut self, error: String) -> Self {
        self.error = Some(error);
        self
    }

    pub fn with_step_id(mut self, step_id: String) -> Self {
        self.step_id = Some(step_id);
        self
    }

    pub fn into_entry(self) -> AuditEntry {
        AuditEntry {
            id: Uuid::new_v4(),
            notification_type: self.notification_type,
            resource_id: self.resource_id,
            status: self.status,
            message_id: self.message_id,
            error: self.error,
            recipient_email: self.recipient_email,
            process_instance_id: self.process_instance_id,
            step_id: self.step_id,
            created_at: Utc::now(),
        }
    }
}
