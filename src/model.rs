//! Onboarding record model — the fields the notifier reads from the data API.

use serde::{Deserialize, Serialize};

/// Maximum number of follow-up emails ever sent for one record.
/// At this ceiling the record is terminal for the notifier.
pub const FOLLOW_UP_CEILING: u32 = 40;

/// Progress-step value marking a finished application.
pub const FINAL_STEP: &str = "laststep";

/// An onboarding application record, as returned by the data API.
///
/// Field names mirror the GraphQL schema; everything except `id` is optional
/// because partially-saved applications routinely leave fields unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnboardingRecord {
    pub id: String,
    #[serde(default)]
    pub legalperson_name: Option<String>,
    #[serde(default)]
    pub legalperson_contact_name: Option<String>,
    #[serde(default)]
    pub legalperson_contact_email: Option<String>,
    #[serde(default)]
    pub legalperson_address: Option<String>,
    #[serde(default)]
    pub loan_amount: Option<String>,
    #[serde(default)]
    pub loan_type: Option<String>,
    #[serde(default)]
    pub loan_progress_step: Option<String>,
    /// Destination address for follow-up notifications.
    #[serde(default)]
    pub loan_debtor_email: Option<String>,
    /// Number of follow-ups already sent. Unset means zero.
    #[serde(default)]
    pub loan_debtor_follow_up_emails: Option<u32>,
}

impl OnboardingRecord {
    /// Follow-up count with the unset case normalized to zero.
    pub fn follow_up_count(&self) -> u32 {
        self.loan_debtor_follow_up_emails.unwrap_or(0)
    }

    /// Whether the application has reached its final step.
    pub fn is_complete(&self) -> bool {
        self.loan_progress_step.as_deref() == Some(FINAL_STEP)
    }

    /// Debtor contact address, treating the empty string as absent.
    pub fn contact_email(&self) -> Option<&str> {
        self.loan_debtor_email.as_deref().filter(|s| !s.is_empty())
    }

    /// Display name for email templates: legal-person name, falling back to
    /// the contact name, then a generic salutation.
    pub fn display_name(&self) -> &str {
        self.legalperson_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| {
                self.legalperson_contact_name
                    .as_deref()
                    .filter(|s| !s.is_empty())
            })
            .unwrap_or("Valued Client")
    }

    /// Requested facility amount formatted for templates.
    pub fn display_amount(&self) -> String {
        match self.loan_amount.as_deref().filter(|s| !s.is_empty()) {
            Some(amount) => format!("${amount}"),
            None => "your requested amount".to_string(),
        }
    }
}
