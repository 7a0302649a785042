//! The follow-up driver — periodic scan and direct single-record modes.
//!
//! Per record the flow is: eligibility check, tier selection, render, send,
//! then persist `count + 1`. Records are processed sequentially; in
//! periodic mode one record's failure is logged and the scan moves on.
//!
//! There is no check-and-set on the count update, so two overlapping runs
//! could both send from the same stale count. One scheduled invoker at a
//! time is assumed.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::eligibility::{self, SkipReason};
use crate::error::{Error, NotifyError, Result, StoreError};
use crate::mailer::{Mailer, OutboundEmail};
use crate::message;
use crate::model::OnboardingRecord;
use crate::store::OnboardingStore;

/// How the notifier was invoked.
///
/// Matches the JSON events the entry point receives:
/// `{"type":"periodic"}` or `{"type":"direct","onboardingId":"..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Mode {
    Direct {
        #[serde(rename = "onboardingId")]
        onboarding_id: String,
    },
    Periodic,
}

/// Coarse outcome of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Records seen (all listed records in periodic mode, one in direct).
    pub scanned: usize,
    /// Emails sent with the count successfully incremented.
    pub sent: usize,
    /// Records excluded by the eligibility rules.
    pub skipped: usize,
    /// Records whose dispatch failed (periodic mode only).
    pub failed: usize,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} scanned, {} sent, {} skipped, {} failed",
            self.scanned, self.sent, self.skipped, self.failed
        )
    }
}

/// Drives follow-up notification over the store and mailer collaborators.
pub struct Notifier {
    store: Arc<dyn OnboardingStore>,
    mailer: Arc<dyn Mailer>,
    page_limit: u32,
}

impl Notifier {
    pub fn new(store: Arc<dyn OnboardingStore>, mailer: Arc<dyn Mailer>, page_limit: u32) -> Self {
        Self {
            store,
            mailer,
            page_limit,
        }
    }

    /// Run one invocation.
    pub async fn run(&self, mode: &Mode) -> Result<RunSummary> {
        match mode {
            Mode::Direct { onboarding_id } => self.run_direct(onboarding_id).await,
            Mode::Periodic => self.run_periodic().await,
        }
    }

    /// Direct mode: one record, fatal on not-found, missing contact, or any
    /// dispatch failure. Ineligible for other reasons is a skip, not an
    /// error.
    async fn run_direct(&self, id: &str) -> Result<RunSummary> {
        let record = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
            .map_err(Error::Store)?;

        let mut summary = RunSummary {
            scanned: 1,
            ..RunSummary::default()
        };

        match eligibility::check(&record) {
            Err(SkipReason::MissingContact) => {
                return Err(NotifyError::MissingContact { id: id.to_string() }.into());
            }
            Err(reason) => {
                warn!(id, %reason, "Record not eligible, nothing sent");
                summary.skipped = 1;
            }
            Ok(()) => {
                self.notify_one(&record).await?;
                summary.sent = 1;
            }
        }

        Ok(summary)
    }

    /// Periodic mode: scan every record page by page. A malformed or failed
    /// page listing ends the scan early with the records already fetched;
    /// a single record's failure never aborts the batch.
    async fn run_periodic(&self) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        let mut cursor: Option<String> = None;

        loop {
            let page = match self.store.list_page(self.page_limit, cursor.as_deref()).await {
                Ok(page) => page,
                Err(e) => {
                    error!(error = %e, "Listing page failed, stopping scan with partial results");
                    break;
                }
            };

            for record in &page.items {
                summary.scanned += 1;

                if let Err(reason) = eligibility::check(record) {
                    match reason {
                        SkipReason::MissingContact => {
                            warn!(id = %record.id, "Skipping record, no debtor contact email");
                        }
                        _ => info!(id = %record.id, %reason, "Skipping record"),
                    }
                    summary.skipped += 1;
                    continue;
                }

                match self.notify_one(record).await {
                    Ok(()) => summary.sent += 1,
                    Err(e) => {
                        error!(id = %record.id, error = %e, "Follow-up dispatch failed");
                        summary.failed += 1;
                    }
                }
            }

            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        info!(%summary, "Periodic follow-up run finished");
        Ok(summary)
    }

    /// Send one follow-up and persist the incremented count.
    ///
    /// If the send fails the count is untouched. If the send succeeds and
    /// the update fails, the error carries the count that went out; the
    /// increment is not retried here.
    async fn notify_one(&self, record: &OnboardingRecord) -> Result<()> {
        // check() has already run, so the contact address is present.
        let Some(to) = record.contact_email() else {
            return Err(NotifyError::MissingContact {
                id: record.id.clone(),
            }
            .into());
        };

        let count = record.follow_up_count();
        let content = {
            let mut rng = rand::thread_rng();
            message::compose(record, count, &mut rng)
        };

        let email = OutboundEmail {
            to: to.to_string(),
            subject: content.subject,
            text_body: content.text_body,
            html_body: content.html_body,
        };

        let delivery_id = self.mailer.send(&email).await?;
        info!(id = %record.id, follow_up = count, delivery_id = %delivery_id, "Follow-up email sent");

        self.store
            .set_follow_up_count(&record.id, count + 1)
            .await
            .map_err(|source| NotifyError::CountUpdateFailed {
                id: record.id.clone(),
                sent_count: count,
                source,
            })?;

        Ok(())
    }
}
