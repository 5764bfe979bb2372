use std::sync::Arc;

use anyhow::{Error, Result};
use tracing::{debug, info, warn};

use crate::{
    clients::{
        audit::AuditStore,
        provider::{EmailOptions, EmailProvider, build_provider},
    },
    config::Config,
    models::{
        audit::{AuditEntry, CreateAuditEntry, DeliveryStatus, NotificationType},
        context::NotificationContext,
        outcome::{SendDisposition, SkipReason},
        validation::validate_email,
    },
    templates::{Intent, TemplateResolver},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminNotificationKind {
    NewClient,
    ClientCompleted,
    ClientStuck,
}

/// Maps business intents to a resolve-template, provider-send, audit-log
/// sequence. Operations are independent units of work; nothing here
/// coordinates, orders, or deduplicates concurrent sends.
pub struct NotificationService {
    provider: Box<dyn EmailProvider>,
    audit_store: Arc<dyn AuditStore>,
    resolver: TemplateResolver,
}

impl NotificationService {
    pub fn new(
        provider: Box<dyn EmailProvider>,
        audit_store: Arc<dyn AuditStore>,
        resolver: TemplateResolver,
    ) -> Self {
        Self {
            provider,
            audit_store,
            resolver,
        }
    }

    /// Builds the configured provider. Fails when the selected provider's
    /// credential is missing.
    pub fn from_config(config: &Config, audit_store: Arc<dyn AuditStore>) -> Result<Self, Error> {
        let provider = build_provider(config)?;
        let resolver = TemplateResolver::new(config.app_base_url.clone());

        Ok(Self::new(provider, audit_store, resolver))
    }

    /// Fires when a recipient begins the process instance.
    pub async fn send_welcome(&self, ctx: &NotificationContext) -> SendDisposition {
        self.dispatch(
            ctx,
            Intent::Welcome,
            NotificationType::Welcome,
            ctx.recipient.email.clone(),
            None,
            None,
        )
        .await
    }

    /// Skips without a send or audit entry when no current step is present.
    pub async fn send_step_completion(&self, ctx: &NotificationContext) -> SendDisposition {
        let Some(step) = ctx.current_step.as_ref() else {
            debug!(
                recipient = %ctx.recipient.id,
                "Skipping step completion notification, no current step in context"
            );
            return SendDisposition::Skipped(SkipReason::MissingCurrentStep);
        };

        self.dispatch(
            ctx,
            Intent::StepCompletion,
            NotificationType::StepCompletion,
            ctx.recipient.email.clone(),
            None,
            Some(step.id.clone()),
        )
        .await
    }

    /// `days_since_last_activity` is at least 1; a value of 1 renders
    /// "yesterday" wording, anything greater renders a day count.
    pub async fn send_reminder(
        &self,
        ctx: &NotificationContext,
        days_since_last_activity: u32,
    ) -> SendDisposition {
        self.dispatch(
            ctx,
            Intent::Reminder {
                days_since_last_activity,
            },
            NotificationType::Reminder,
            ctx.recipient.email.clone(),
            None,
            None,
        )
        .await
    }

    pub async fn send_completion(&self, ctx: &NotificationContext) -> SendDisposition {
        self.dispatch(
            ctx,
            Intent::Completion,
            NotificationType::Completion,
            ctx.recipient.email.clone(),
            None,
            None,
        )
        .await
    }

    /// Alerts the tenant contact address. Skips without a send or audit entry
    /// when the tenant has no contact email on file.
    pub async fn send_admin_notification(
        &self,
        ctx: &NotificationContext,
        kind: AdminNotificationKind,
    ) -> SendDisposition {
        let Some(contact_email) = ctx.tenant.contact_email.clone() else {
            debug!(
                recipient = %ctx.recipient.id,
                "Skipping admin notification, tenant has no contact email"
            );
            return SendDisposition::Skipped(SkipReason::MissingTenantContact);
        };

        let intent = match kind {
            AdminNotificationKind::NewClient => Intent::AdminNewClient,
            AdminNotificationKind::ClientCompleted => Intent::AdminClientCompleted,
            AdminNotificationKind::ClientStuck => Intent::AdminClientStuck,
        };

        self.dispatch(
            ctx,
            intent,
            NotificationType::AdminAlert,
            contact_email,
            None,
            None,
        )
        .await
    }

    /// Operator-authored message to the recipient. With `from_admin` the
    /// outgoing from-address is overridden to the tenant contact when one is
    /// on file.
    pub async fn send_custom_message(
        &self,
        ctx: &NotificationContext,
        subject: &str,
        message: &str,
        from_admin: bool,
    ) -> SendDisposition {
        let from_override = if from_admin {
            ctx.tenant.contact_email.clone()
        } else {
            None
        };

        self.dispatch(
            ctx,
            Intent::Custom {
                subject: subject.to_string(),
                message: message.to_string(),
            },
            NotificationType::Custom,
            ctx.recipient.email.clone(),
            from_override,
            None,
        )
        .await
    }

    /// Audit trail for one recipient, newest first.
    pub async fn notification_history(
        &self,
        recipient_id: &str,
    ) -> Result<Vec<AuditEntry>, Error> {
        self.audit_store.for_recipient(recipient_id).await
    }

    // Shared resolve -> send -> audit sequence. Template and provider
    // failures both produce a failed audit entry; a failed audit write is
    // reported in the disposition but never rolls back a delivered email.
    // `step_id` is set only by the step-scoped operation.
    async fn dispatch(
        &self,
        ctx: &NotificationContext,
        intent: Intent,
        notification_type: NotificationType,
        to: String,
        from_override: Option<String>,
        step_id: Option<String>,
    ) -> SendDisposition {
        if !validate_email(&to) {
            debug!(
                to = %to,
                notification_type = %notification_type,
                "Skipping send, destination address is not a valid email"
            );
            return SendDisposition::Skipped(SkipReason::InvalidDestinationEmail);
        }

        let template = match self.resolver.resolve(&intent, ctx) {
            Ok(template) => template,
            Err(e) => {
                let error = format!("Template resolution failed: {}", e);

                let audit_error = self
                    .record(
                        ctx,
                        notification_type,
                        &to,
                        DeliveryStatus::Failed,
                        None,
                        Some(error.clone()),
                        step_id,
                    )
                    .await;

                return SendDisposition::Failed { error, audit_error };
            }
        };

        let outcome = self
            .provider
            .send(EmailOptions {
                to: to.clone(),
                from: from_override,
                subject: template.subject,
                html: template.html,
                text: template.text,
            })
            .await;

        if outcome.success {
            info!(
                provider = self.provider.name(),
                recipient = %ctx.recipient.id,
                notification_type = %notification_type,
                "Notification sent"
            );

            let audit_error = self
                .record(
                    ctx,
                    notification_type,
                    &to,
                    DeliveryStatus::Sent,
                    outcome.message_id.clone(),
                    None,
                    step_id,
                )
                .await;

            SendDisposition::Sent {
                message_id: outcome.message_id,
                audit_error,
            }
        } else {
            let error = outcome
                .error
                .unwrap_or_else(|| "Unknown provider error".to_string());

            warn!(
                provider = self.provider.name(),
                recipient = %ctx.recipient.id,
                notification_type = %notification_type,
                error = %error,
                "Notification send failed"
            );

            let audit_error = self
                .record(
                    ctx,
                    notification_type,
                    &to,
                    DeliveryStatus::Failed,
                    None,
                    Some(error.clone()),
                    step_id,
                )
                .await;

            SendDisposition::Failed { error, audit_error }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn record(
        &self,
        ctx: &NotificationContext,
        notification_type: NotificationType,
        recipient_email: &str,
        status: DeliveryStatus,
        message_id: Option<String>,
        error: Option<String>,
        step_id: Option<String>,
    ) -> Option<String> {
        let mut entry = CreateAuditEntry::new(
            notification_type,
            ctx.recipient.id.clone(),
            status,
            recipient_email.to_string(),
            ctx.process_instance.id.clone(),
        );

        if let Some(message_id) = message_id {
            entry = entry.with_message_id(message_id);
        }
        if let Some(error) = error {
            entry = entry.with_error(error);
        }
        if let Some(step_id) = step_id {
            entry = entry.with_step_id(step_id);
        }

        match self.audit_store.insert(entry).await {
            Ok(()) => None,
            Err(e) => {
                warn!(error = %e, "Failed to write audit entry");
                Some(e.to_string())
            }
        }
    }
}
