use std::sync::LazyLock;

use regex::Regex;

// Permissive local@domain.tld shape check. A cheap sanity filter before a
// send is attempted, not RFC 5322 validation; passing it says nothing about
// deliverability.
static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid"));

pub fn validate_email(address: &str) -> bool {
    EMAIL_SHAPE.is_match(address)
}
