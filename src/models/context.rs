use serde::{Deserialize, Serialize};

/// Input bag assembled by the caller from persisted process-instance and
/// progress records. This subsystem reads it; it never recomputes the
/// counters or mutates the records behind them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationContext {
    pub tenant: TenantBranding,
    pub recipient: Recipient,
    pub process_instance: ProcessInstance,
    pub current_step: Option<Step>,

    pub completed_steps: u32,
    pub total_steps: u32,
    /// 0-100 inclusive, derived by the caller. Trusted as-is.
    pub completion_percentage: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantBranding {
    pub brand_name: String,
    pub brand_color: String,
    pub logo_url: String,
    pub support_email: String,
    /// Where admin alerts go, and the from-override for admin-authored
    /// messages. Admin sends are skipped when this is absent.
    pub contact_email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessInstance {
    pub id: String,
    pub name: String,
    pub redirect_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub id: String,
    pub title: String,
    pub step_type: String,
}
