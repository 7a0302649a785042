//! Follow-up email notifier for stalled onboarding applications.
//!
//! Scans onboarding records in the managed data API and sends escalating
//! reminder emails to the debtor contact, tracking a per-record follow-up
//! count. Invoked either on a schedule (periodic scan) or for a single
//! record (direct mode).

pub mod config;
pub mod eligibility;
pub mod error;
pub mod mailer;
pub mod message;
pub mod model;
pub mod notifier;
pub mod spintax;
pub mod store;
