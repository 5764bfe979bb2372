//! Notification subsystem for the Onboard Hero client-onboarding platform.
//!
//! Maps business intents (welcome, step completion, reminder, completion,
//! admin alerts, custom messages) to rendered email templates, delivers them
//! through an interchangeable transactional-email provider, and records one
//! audit entry per attempted send.

pub mod clients;
pub mod config;
pub mod models;
pub mod service;
pub mod templates;

pub use service::NotificationService;
