//! Eligibility rules — which records get another follow-up email.

use crate::model::{OnboardingRecord, FOLLOW_UP_CEILING};

/// Why a record was excluded from notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No debtor contact email on the record.
    MissingContact,
    /// The follow-up ceiling has been reached.
    CeilingReached,
    /// The application already reached its final step.
    Completed,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingContact => write!(f, "no debtor contact email"),
            Self::CeilingReached => write!(f, "follow-up ceiling reached"),
            Self::Completed => write!(f, "application completed"),
        }
    }
}

/// Check whether a record should receive another follow-up.
///
/// Pure and side-effect free. Returns the first matching exclusion, checked
/// in order: missing contact, ceiling, completed.
pub fn check(record: &OnboardingRecord) -> Result<(), SkipReason> {
    if record.contact_email().is_none() {
        return Err(SkipReason::MissingContact);
    }
    if record.follow_up_count() >= FOLLOW_UP_CEILING {
        return Err(SkipReason::CeilingReached);
    }
    if record.is_complete() {
        return Err(SkipReason::Completed);
    }
    Ok(())
}

/// Boolean form of [`check`].
pub fn is_eligible(record: &OnboardingRecord) -> bool {
    check(record).is_ok()
}
