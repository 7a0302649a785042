//! Onboarding data access — backend trait plus the GraphQL client used in
//! production.

pub mod graphql;

use async_trait::async_trait;

pub use graphql::GraphQlStore;

use crate::error::StoreError;
use crate::model::OnboardingRecord;

/// One page of onboarding records from a cursor-based listing.
#[derive(Debug, Clone)]
pub struct OnboardingPage {
    pub items: Vec<OnboardingRecord>,
    /// Cursor for the next page, `None` once the listing is exhausted.
    pub next_cursor: Option<String>,
}

/// Backend-agnostic access to onboarding records.
#[async_trait]
pub trait OnboardingStore: Send + Sync {
    /// Fetch one page of records. `cursor` is `None` for the first page.
    async fn list_page(
        &self,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<OnboardingPage, StoreError>;

    /// Fetch a single record by id, `None` if it does not exist.
    async fn get(&self, id: &str) -> Result<Option<OnboardingRecord>, StoreError>;

    /// Persist a new follow-up count for a record (partial update).
    async fn set_follow_up_count(&self, id: &str, count: u32) -> Result<(), StoreError>;
}
