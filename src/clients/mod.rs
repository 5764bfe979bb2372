pub mod audit;
pub mod provider;
pub mod resend;
pub mod sendgrid;
