use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use anyhow::Result;
use async_trait::async_trait;
use onboard_notify::{
    NotificationService,
    clients::{
        audit::{AuditStore, MemoryAuditStore},
        provider::{EmailOptions, EmailProvider},
        resend::ResendProvider,
        sendgrid::SendgridProvider,
    },
    config::{Config, ProviderKind},
    models::{
        audit::{AuditEntry, CreateAuditEntry, DeliveryStatus, NotificationType},
        context::{NotificationContext, ProcessInstance, Recipient, Step, TenantBranding},
        outcome::{SendDisposition, SendOutcome, SkipReason},
    },
    service::AdminNotificationKind,
    templates::TemplateResolver,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path},
};

/// Test: successful welcome send records a sent audit entry with message id
#[tokio::test]
async fn test_welcome_success_records_sent_entry() -> Result<()> {
    let provider = StubProvider::succeeding("msg_001");
    let calls = provider.calls();
    let (service, audit_store) = create_service(provider);

    let ctx = create_context();
    let disposition = service.send_welcome(&ctx).await;

    assert!(disposition.delivered());
    assert_eq!(
        disposition,
        SendDisposition::Sent {
            message_id: Some("msg_001".to_string()),
            audit_error: None,
        }
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let history = audit_store.for_recipient("client_7").await?;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, DeliveryStatus::Sent);
    assert_eq!(history[0].message_id.as_deref(), Some("msg_001"));
    assert_eq!(history[0].recipient_email, "jane@client.example");
    assert_eq!(history[0].process_instance_id, "proc_42");

    Ok(())
}

/// Test: only step-scoped entries carry a step id
#[tokio::test]
async fn test_step_id_recorded_only_for_step_completion() -> Result<()> {
    let provider = StubProvider::succeeding("msg_009");
    let (service, audit_store) = create_service(provider);

    // Context carries a current step, but the welcome entry must not pick it
    // up.
    let ctx = create_context();
    service.send_welcome(&ctx).await;
    service.send_step_completion(&ctx).await;

    let history = audit_store.for_recipient("client_7").await?;
    assert_eq!(history.len(), 2);

    let welcome = history
        .iter()
        .find(|entry| entry.notification_type == NotificationType::Welcome)
        .expect("welcome entry recorded");
    assert!(welcome.step_id.is_none());

    let step = history
        .iter()
        .find(|entry| entry.notification_type == NotificationType::StepCompletion)
        .expect("step completion entry recorded");
    assert_eq!(step.step_id.as_deref(), Some("step_2"));

    Ok(())
}

/// Test: provider failure returns Failed and records a failed audit entry
#[tokio::test]
async fn test_provider_failure_records_failed_entry() -> Result<()> {
    let provider = StubProvider::failing("rate limited");
    let (service, audit_store) = create_service(provider);

    let ctx = create_context();
    let disposition = service.send_completion(&ctx).await;

    assert!(!disposition.delivered());
    assert_eq!(
        disposition,
        SendDisposition::Failed {
            error: "rate limited".to_string(),
            audit_error: None,
        }
    );

    let history = audit_store.for_recipient("client_7").await?;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, DeliveryStatus::Failed);
    assert_eq!(history[0].error.as_deref(), Some("rate limited"));
    assert!(history[0].message_id.is_none());

    Ok(())
}

/// Test: missing current step skips without a provider call or audit entry
#[tokio::test]
async fn test_step_completion_skips_without_step() -> Result<()> {
    let provider = StubProvider::succeeding("msg_002");
    let calls = provider.calls();
    let (service, audit_store) = create_service(provider);

    let mut ctx = create_context();
    ctx.current_step = None;

    let disposition = service.send_step_completion(&ctx).await;

    assert_eq!(
        disposition,
        SendDisposition::Skipped(SkipReason::MissingCurrentStep)
    );
    assert_eq!(calls.load(Ordering::SeqCst), 0, "No provider call expected");
    assert!(audit_store.for_recipient("client_7").await?.is_empty());

    Ok(())
}

/// Test: admin notification skips when the tenant has no contact email
#[tokio::test]
async fn test_admin_notification_skips_without_contact() -> Result<()> {
    let provider = StubProvider::succeeding("msg_003");
    let calls = provider.calls();
    let (service, audit_store) = create_service(provider);

    let mut ctx = create_context();
    ctx.tenant.contact_email = None;

    let disposition = service
        .send_admin_notification(&ctx, AdminNotificationKind::NewClient)
        .await;

    assert_eq!(
        disposition,
        SendDisposition::Skipped(SkipReason::MissingTenantContact)
    );
    assert_eq!(calls.load(Ordering::SeqCst), 0, "No provider call expected");
    assert!(audit_store.for_recipient("client_7").await?.is_empty());

    Ok(())
}

/// Test: admin notifications go to the tenant contact address
#[tokio::test]
async fn test_admin_notification_targets_tenant_contact() -> Result<()> {
    let provider = StubProvider::succeeding("msg_004");
    let sent = provider.last_options();
    let (service, audit_store) = create_service(provider);

    let ctx = create_context();
    let disposition = service
        .send_admin_notification(&ctx, AdminNotificationKind::ClientCompleted)
        .await;

    assert!(disposition.delivered());

    let options = sent.lock().unwrap().clone().expect("provider was called");
    assert_eq!(options.to, "owner@acme.example");
    assert!(options.subject.starts_with("Jane Doe: "));

    let history = audit_store.for_recipient("client_7").await?;
    assert_eq!(history[0].recipient_email, "owner@acme.example");

    Ok(())
}

/// Test: syntactically invalid destination skips without a provider call
#[tokio::test]
async fn test_invalid_destination_skips() -> Result<()> {
    let provider = StubProvider::succeeding("msg_005");
    let calls = provider.calls();
    let (service, audit_store) = create_service(provider);

    let mut ctx = create_context();
    ctx.recipient.email = "not-an-email".to_string();

    let disposition = service.send_welcome(&ctx).await;

    assert_eq!(
        disposition,
        SendDisposition::Skipped(SkipReason::InvalidDestinationEmail)
    );
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(audit_store.for_recipient("client_7").await?.is_empty());

    Ok(())
}

/// Test: custom admin message overrides the from-address and keeps paragraphs
#[tokio::test]
async fn test_custom_message_from_admin() -> Result<()> {
    let provider = StubProvider::succeeding("msg_006");
    let sent = provider.last_options();
    let (service, _audit_store) = create_service(provider);

    let ctx = create_context();
    let disposition = service
        .send_custom_message(&ctx, "Hi", "Line one\nLine two", true)
        .await;

    assert!(disposition.delivered());

    let options = sent.lock().unwrap().clone().expect("provider was called");
    assert_eq!(options.from.as_deref(), Some("owner@acme.example"));
    assert_eq!(options.subject, "Hi");
    assert!(options.html.contains("<p>Line one</p>"));
    assert!(options.html.contains("<p>Line two</p>"));

    Ok(())
}

/// Test: a failed audit write is reported but does not undo the send
#[tokio::test]
async fn test_audit_failure_does_not_roll_back_send() {
    let provider = StubProvider::succeeding("msg_007");
    let service = NotificationService::new(
        Box::new(provider),
        Arc::new(FailingAuditStore),
        TemplateResolver::new("https://app.example.com"),
    );

    let ctx = create_context();
    let disposition = service.send_welcome(&ctx).await;

    assert!(disposition.delivered(), "Send stands even if audit fails");

    match disposition {
        SendDisposition::Sent { audit_error, .. } => {
            assert!(audit_error.is_some(), "Audit failure should be reported");
        }
        other => panic!("Expected Sent disposition, got {:?}", other),
    }
}

/// Test: notification history returns entries for the recipient, newest first
#[tokio::test]
async fn test_notification_history_is_scoped_and_ordered() -> Result<()> {
    let provider = StubProvider::succeeding("msg_008");
    let (service, _audit_store) = create_service(provider);

    let ctx = create_context();
    service.send_welcome(&ctx).await;
    service.send_step_completion(&ctx).await;

    let mut other = create_context();
    other.recipient.id = "client_8".to_string();
    service.send_welcome(&other).await;

    let history = service.notification_history("client_7").await?;
    assert_eq!(history.len(), 2);
    assert!(history[0].created_at >= history[1].created_at);
    assert!(history.iter().all(|entry| entry.resource_id == "client_7"));

    Ok(())
}

/// Test: missing credential for the selected provider is a construction error
#[test]
fn test_missing_credential_fails_construction() {
    let config = Config {
        email_provider: ProviderKind::Resend,
        resend_api_key: None,
        sendgrid_api_key: Some("sg_key".to_string()),
        email_from: "onboarding@acme.example".to_string(),
        app_base_url: "https://app.example.com".to_string(),
        resend_base_url: "https://api.resend.com".to_string(),
        sendgrid_base_url: "https://api.sendgrid.com".to_string(),
    };

    let result = NotificationService::from_config(&config, Arc::new(MemoryAuditStore::new()));

    assert!(result.is_err(), "Missing RESEND_API_KEY should be fatal");
}

/// Test: Resend provider parses the message id from a 2xx response
#[tokio::test]
async fn test_resend_provider_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/emails"))
        .and(header("Authorization", "Bearer re_test_key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "email_123"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = ResendProvider::new(
        server.uri(),
        "re_test_key".to_string(),
        "onboarding@acme.example".to_string(),
    );

    let outcome = provider.send(create_email_options()).await;

    assert!(outcome.success);
    assert_eq!(outcome.message_id.as_deref(), Some("email_123"));
    assert!(outcome.error.is_none());
}

/// Test: Resend provider converts a non-2xx response into a failed outcome
#[tokio::test]
async fn test_resend_provider_non_2xx_is_failure_value() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limit exceeded"))
        .expect(1)
        .mount(&server)
        .await;

    let provider = ResendProvider::new(
        server.uri(),
        "re_test_key".to_string(),
        "onboarding@acme.example".to_string(),
    );

    let outcome = provider.send(create_email_options()).await;

    assert!(!outcome.success);
    assert!(outcome.message_id.is_none());

    let error = outcome.error.expect("error should be populated");
    assert!(error.contains("429"), "Error should carry the status: {}", error);
    assert!(error.contains("rate limit exceeded"));
}

/// Test: SendGrid provider reads the message id from the response header
#[tokio::test]
async fn test_sendgrid_provider_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/mail/send"))
        .and(header("Authorization", "Bearer sg_test_key"))
        .respond_with(ResponseTemplate::new(202).insert_header("X-Message-Id", "sg_456"))
        .expect(1)
        .mount(&server)
        .await;

    let provider = SendgridProvider::new(
        server.uri(),
        "sg_test_key".to_string(),
        "onboarding@acme.example".to_string(),
    );

    let outcome = provider.send(create_email_options()).await;

    assert!(outcome.success);
    assert_eq!(outcome.message_id.as_deref(), Some("sg_456"));
}

struct StubProvider {
    outcome: SendOutcome,
    calls: Arc<AtomicUsize>,
    last_options: Arc<Mutex<Option<EmailOptions>>>,
}

impl StubProvider {
    fn succeeding(message_id: &str) -> Self {
        Self {
            outcome: SendOutcome::sent(Some(message_id.to_string())),
            calls: Arc::new(AtomicUsize::new(0)),
            last_options: Arc::new(Mutex::new(None)),
        }
    }

    fn failing(error: &str) -> Self {
        Self {
            outcome: SendOutcome::failed(error),
            calls: Arc::new(AtomicUsize::new(0)),
            last_options: Arc::new(Mutex::new(None)),
        }
    }

    fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    fn last_options(&self) -> Arc<Mutex<Option<EmailOptions>>> {
        Arc::clone(&self.last_options)
    }
}

#[async_trait]
impl EmailProvider for StubProvider {
    async fn send(&self, options: EmailOptions) -> SendOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_options.lock().unwrap() = Some(options);
        self.outcome.clone()
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

struct FailingAuditStore;

#[async_trait]
impl AuditStore for FailingAuditStore {
    async fn insert(&self, _entry: CreateAuditEntry) -> Result<(), anyhow::Error> {
        Err(anyhow::anyhow!("audit store unavailable"))
    }

    async fn for_recipient(&self, _recipient_id: &str) -> Result<Vec<AuditEntry>, anyhow::Error> {
        Ok(Vec::new())
    }
}

fn create_service(provider: StubProvider) -> (NotificationService, Arc<MemoryAuditStore>) {
    let audit_store = Arc::new(MemoryAuditStore::new());

    let service = NotificationService::new(
        Box::new(provider),
        Arc::clone(&audit_store) as Arc<dyn AuditStore>,
        TemplateResolver::new("https://app.example.com"),
    );

    (service, audit_store)
}

fn create_email_options() -> EmailOptions {
    EmailOptions {
        to: "jane@client.example".to_string(),
        from: None,
        subject: "Welcome".to_string(),
        html: "<p>Welcome</p>".to_string(),
        text: "Welcome".to_string(),
    }
}

fn create_context() -> NotificationContext {
    NotificationContext {
        tenant: TenantBranding {
            brand_name: "Acme Onboarding".to_string(),
            brand_color: "#4f46e5".to_string(),
            logo_url: "https://cdn.example.com/logo.png".to_string(),
            support_email: "support@acme.example".to_string(),
            contact_email: Some("owner@acme.example".to_string()),
        },
        recipient: Recipient {
            id: "client_7".to_string(),
            name: "Jane Doe".to_string(),
            email: "jane@client.example".to_string(),
        },
        process_instance: ProcessInstance {
            id: "proc_42".to_string(),
            name: "Vendor Setup".to_string(),
            redirect_url: None,
        },
        current_step: Some(Step {
            id: "step_2".to_string(),
            title: "Upload contract".to_string(),
            step_type: "file_upload".to_string(),
        }),
        completed_steps: 2,
        total_steps: 6,
        completion_percentage: 33,
    }
}
