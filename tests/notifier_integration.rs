//! End-to-end notifier scenarios against in-memory collaborators.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use onboarding_notifier::error::{Error, MailError, NotifyError, StoreError};
use onboarding_notifier::mailer::{Mailer, OutboundEmail};
use onboarding_notifier::model::OnboardingRecord;
use onboarding_notifier::notifier::{Mode, Notifier};
use onboarding_notifier::store::{OnboardingPage, OnboardingStore};

// ── In-memory collaborators ─────────────────────────────────────────

/// Store over an ordered record list with index-based cursors.
struct MemoryStore {
    order: Vec<String>,
    records: Mutex<HashMap<String, OnboardingRecord>>,
    /// Page index (0-based) at which the listing starts failing, if any.
    fail_listing_from_page: Option<usize>,
    /// Record id whose count update fails, if any.
    fail_update_for: Option<String>,
    pages_served: AtomicUsize,
}

impl MemoryStore {
    fn new(records: Vec<OnboardingRecord>) -> Self {
        let order = records.iter().map(|r| r.id.clone()).collect();
        let map = records.into_iter().map(|r| (r.id.clone(), r)).collect();
        Self {
            order,
            records: Mutex::new(map),
            fail_listing_from_page: None,
            fail_update_for: None,
            pages_served: AtomicUsize::new(0),
        }
    }

    fn count_of(&self, id: &str) -> Option<u32> {
        self.records.lock().unwrap()[id].loan_debtor_follow_up_emails
    }
}

#[async_trait]
impl OnboardingStore for MemoryStore {
    async fn list_page(
        &self,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<OnboardingPage, StoreError> {
        let page_index = self.pages_served.fetch_add(1, Ordering::SeqCst);
        if self.fail_listing_from_page == Some(page_index) {
            return Err(StoreError::MalformedResponse("response has no data".into()));
        }

        let start: usize = cursor.map(|c| c.parse().unwrap()).unwrap_or(0);
        let end = (start + limit as usize).min(self.order.len());
        let records = self.records.lock().unwrap();
        let items = self.order[start..end]
            .iter()
            .map(|id| records[id].clone())
            .collect();
        let next_cursor = (end < self.order.len()).then(|| end.to_string());
        Ok(OnboardingPage { items, next_cursor })
    }

    async fn get(&self, id: &str) -> Result<Option<OnboardingRecord>, StoreError> {
        Ok(self.records.lock().unwrap().get(id).cloned())
    }

    async fn set_follow_up_count(&self, id: &str, count: u32) -> Result<(), StoreError> {
        if self.fail_update_for.as_deref() == Some(id) {
            return Err(StoreError::Request("update refused".into()));
        }
        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
        record.loan_debtor_follow_up_emails = Some(count);
        Ok(())
    }
}

/// Mailer that records every send and can fail for one address.
#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<OutboundEmail>>,
    fail_for: Option<String>,
}

impl RecordingMailer {
    fn failing_for(address: &str) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_for: Some(address.to_string()),
        }
    }

    fn sent_to(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|e| e.to.clone()).collect()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<String, MailError> {
        if self.fail_for.as_deref() == Some(email.to.as_str()) {
            return Err(MailError::Transport("connection refused".into()));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(format!("msg-{}", self.sent.lock().unwrap().len()))
    }
}

// ── Fixtures ────────────────────────────────────────────────────────

fn record(id: &str, email: Option<&str>, count: Option<u32>, step: Option<&str>) -> OnboardingRecord {
    OnboardingRecord {
        id: id.into(),
        legalperson_name: Some(format!("{id} Corp")),
        legalperson_contact_name: None,
        legalperson_contact_email: None,
        legalperson_address: None,
        loan_amount: Some("100,000".into()),
        loan_type: Some("factoring".into()),
        loan_progress_step: step.map(str::to_string),
        loan_debtor_email: email.map(str::to_string),
        loan_debtor_follow_up_emails: count,
    }
}

fn notifier(store: Arc<MemoryStore>, mailer: Arc<RecordingMailer>) -> Notifier {
    Notifier::new(store, mailer, 100)
}

// ── Direct mode ─────────────────────────────────────────────────────

#[tokio::test]
async fn direct_mode_sends_initial_and_increments() {
    let store = Arc::new(MemoryStore::new(vec![record(
        "A1",
        Some("x@y.com"),
        Some(0),
        Some("pending"),
    )]));
    let mailer = Arc::new(RecordingMailer::default());
    let n = notifier(Arc::clone(&store), Arc::clone(&mailer));

    let summary = n
        .run(&Mode::Direct {
            onboarding_id: "A1".into(),
        })
        .await
        .unwrap();

    assert_eq!(summary.sent, 1);
    assert_eq!(store.count_of("A1"), Some(1));

    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "x@y.com");
    // Initial tier: either declared subject variant is acceptable.
    assert!(
        sent[0].subject.starts_with("Action Required: Additional Information")
            || sent[0].subject.starts_with("Important: Documentation Needed"),
        "unexpected subject: {}",
        sent[0].subject
    );
}

#[tokio::test]
async fn direct_mode_unknown_id_is_fatal() {
    let store = Arc::new(MemoryStore::new(vec![]));
    let mailer = Arc::new(RecordingMailer::default());
    let n = notifier(store, Arc::clone(&mailer));

    let err = n
        .run(&Mode::Direct {
            onboarding_id: "missing".into(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Store(StoreError::NotFound { .. })));
    assert!(mailer.sent_to().is_empty());
}

#[tokio::test]
async fn direct_mode_missing_contact_is_fatal() {
    let store = Arc::new(MemoryStore::new(vec![record("A2", None, Some(5), None)]));
    let mailer = Arc::new(RecordingMailer::default());
    let n = notifier(Arc::clone(&store), Arc::clone(&mailer));

    let err = n
        .run(&Mode::Direct {
            onboarding_id: "A2".into(),
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Notify(NotifyError::MissingContact { .. })
    ));
    assert!(mailer.sent_to().is_empty());
    assert_eq!(store.count_of("A2"), Some(5));
}

#[tokio::test]
async fn direct_mode_at_ceiling_skips_without_error() {
    let store = Arc::new(MemoryStore::new(vec![record(
        "A3",
        Some("x@y.com"),
        Some(40),
        None,
    )]));
    let mailer = Arc::new(RecordingMailer::default());
    let n = notifier(Arc::clone(&store), Arc::clone(&mailer));

    let summary = n
        .run(&Mode::Direct {
            onboarding_id: "A3".into(),
        })
        .await
        .unwrap();

    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.sent, 0);
    assert!(mailer.sent_to().is_empty());
    assert_eq!(store.count_of("A3"), Some(40));
}

// ── Periodic mode ───────────────────────────────────────────────────

#[tokio::test]
async fn periodic_skips_ineligible_and_notifies_the_rest() {
    let store = Arc::new(MemoryStore::new(vec![
        record("A1", Some("a@x.com"), Some(0), Some("pending")),
        record("A2", Some(""), Some(5), None),
        record("A3", Some("c@x.com"), Some(40), None),
        record("A4", Some("d@x.com"), Some(2), Some("laststep")),
        record("A5", Some("e@x.com"), Some(39), Some("stepthree")),
    ]));
    let mailer = Arc::new(RecordingMailer::default());
    let n = notifier(Arc::clone(&store), Arc::clone(&mailer));

    let summary = n.run(&Mode::Periodic).await.unwrap();

    assert_eq!(summary.scanned, 5);
    assert_eq!(summary.sent, 2);
    assert_eq!(summary.skipped, 3);
    assert_eq!(summary.failed, 0);
    assert_eq!(mailer.sent_to(), vec!["a@x.com", "e@x.com"]);

    // Only notified records move; boundary record 39 reaches the ceiling.
    assert_eq!(store.count_of("A1"), Some(1));
    assert_eq!(store.count_of("A2"), Some(5));
    assert_eq!(store.count_of("A3"), Some(40));
    assert_eq!(store.count_of("A4"), Some(2));
    assert_eq!(store.count_of("A5"), Some(40));
}

#[tokio::test]
async fn periodic_continues_past_a_failing_send() {
    let store = Arc::new(MemoryStore::new(vec![
        record("A1", Some("a@x.com"), Some(1), None),
        record("A2", Some("b@x.com"), Some(1), None),
        record("A3", Some("c@x.com"), Some(1), None),
    ]));
    let mailer = Arc::new(RecordingMailer::failing_for("b@x.com"));
    let n = notifier(Arc::clone(&store), Arc::clone(&mailer));

    let summary = n.run(&Mode::Periodic).await.unwrap();

    assert_eq!(summary.sent, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(mailer.sent_to(), vec!["a@x.com", "c@x.com"]);

    // The failed record's count is untouched.
    assert_eq!(store.count_of("A1"), Some(2));
    assert_eq!(store.count_of("A2"), Some(1));
    assert_eq!(store.count_of("A3"), Some(2));
}

#[tokio::test]
async fn periodic_surfaces_count_update_failure_but_continues() {
    let mut store = MemoryStore::new(vec![
        record("A1", Some("a@x.com"), Some(3), None),
        record("A2", Some("b@x.com"), Some(3), None),
    ]);
    store.fail_update_for = Some("A1".into());
    let store = Arc::new(store);
    let mailer = Arc::new(RecordingMailer::default());
    let n = notifier(Arc::clone(&store), Arc::clone(&mailer));

    let summary = n.run(&Mode::Periodic).await.unwrap();

    // The email for A1 did go out; the lost increment counts as a failure.
    assert_eq!(mailer.sent_to(), vec!["a@x.com", "b@x.com"]);
    assert_eq!(summary.sent, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(store.count_of("A1"), Some(3));
    assert_eq!(store.count_of("A2"), Some(4));
}

#[tokio::test]
async fn periodic_walks_all_pages() {
    let records: Vec<OnboardingRecord> = (0..7)
        .map(|i| record(&format!("A{i}"), Some(&format!("u{i}@x.com")), Some(0), None))
        .collect();
    let store = Arc::new(MemoryStore::new(records));
    let mailer = Arc::new(RecordingMailer::default());
    // Page size 3 forces three pages.
    let n = Notifier::new(
        Arc::clone(&store) as Arc<dyn OnboardingStore>,
        Arc::clone(&mailer) as Arc<dyn Mailer>,
        3,
    );

    let summary = n.run(&Mode::Periodic).await.unwrap();

    assert_eq!(summary.scanned, 7);
    assert_eq!(summary.sent, 7);
    assert_eq!(store.pages_served.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn periodic_stops_early_on_malformed_page_with_partial_results() {
    let records: Vec<OnboardingRecord> = (0..6)
        .map(|i| record(&format!("A{i}"), Some(&format!("u{i}@x.com")), Some(0), None))
        .collect();
    let mut store = MemoryStore::new(records);
    store.fail_listing_from_page = Some(1);
    let store = Arc::new(store);
    let mailer = Arc::new(RecordingMailer::default());
    let n = Notifier::new(
        Arc::clone(&store) as Arc<dyn OnboardingStore>,
        Arc::clone(&mailer) as Arc<dyn Mailer>,
        3,
    );

    let summary = n.run(&Mode::Periodic).await.unwrap();

    // First page processed, scan ends when the second page comes back bad.
    assert_eq!(summary.scanned, 3);
    assert_eq!(summary.sent, 3);
    assert_eq!(store.count_of("A5"), Some(0));
}

#[tokio::test]
async fn tier_escalates_with_the_stored_count() {
    let store = Arc::new(MemoryStore::new(vec![record(
        "A1",
        Some("x@y.com"),
        Some(7),
        None,
    )]));
    let mailer = Arc::new(RecordingMailer::default());
    let n = notifier(Arc::clone(&store), Arc::clone(&mailer));

    n.run(&Mode::Periodic).await.unwrap();

    let sent = mailer.sent.lock().unwrap();
    assert!(
        sent[0].subject.starts_with("Final Notice")
            || sent[0].subject.starts_with("Last Opportunity")
            || sent[0].subject.starts_with("Critical Update"),
        "unexpected subject: {}",
        sent[0].subject
    );
    drop(sent);
    assert_eq!(store.count_of("A1"), Some(8));
}
