//! GraphQL-over-HTTP onboarding store.
//!
//! Talks to the managed data API the onboarding app writes to: a plain POST
//! of `{query, variables}` with an `x-api-key` header. Responses come back
//! as `{data, errors}`; a response with errors or without the requested
//! field is reported as malformed so the caller can decide whether to stop
//! a scan early.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::StoreError;
use crate::model::OnboardingRecord;
use crate::store::{OnboardingPage, OnboardingStore};

const GET_ONBOARDING: &str = r#"
query getOnboarding($id: ID!) {
  getOnboarding(id: $id) {
    id
    legalperson_name
    loan_progress_step
    loan_amount
    loan_type
    legalperson_contact_name
    legalperson_contact_email
    legalperson_address
    loan_debtor_email
    loan_debtor_follow_up_emails
  }
}
"#;

const LIST_ONBOARDING: &str = r#"
query listOnboarding($limit: Int, $nextToken: String) {
  listOnboarding(limit: $limit, nextToken: $nextToken) {
    items {
      id
      legalperson_name
      loan_progress_step
      loan_amount
      loan_type
      legalperson_contact_name
      legalperson_contact_email
      legalperson_address
      loan_debtor_email
      loan_debtor_follow_up_emails
    }
    nextToken
  }
}
"#;

const UPDATE_ONBOARDING: &str = r#"
mutation updateOnboarding($input: UpdateOnboardingInput!) {
  updateOnboarding(input: $input) {
    id
    loan_debtor_follow_up_emails
  }
}
"#;

#[derive(Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: Value,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ListPayload {
    items: Vec<OnboardingRecord>,
    #[serde(rename = "nextToken")]
    next_token: Option<String>,
}

/// Pull the named field out of a GraphQL response, treating GraphQL-level
/// errors and a missing field as a malformed response.
fn extract_field<T: DeserializeOwned>(
    response: GraphQlResponse,
    field: &str,
) -> Result<Option<T>, StoreError> {
    let Some(data) = response.data else {
        // Partial data takes precedence; errors only matter when there is
        // nothing to work with.
        return match response.errors {
            Some(errors) => Err(StoreError::Api(errors.to_string())),
            None => Err(StoreError::MalformedResponse("response has no data".into())),
        };
    };
    match data.get(field) {
        None => Err(StoreError::MalformedResponse(format!(
            "response data is missing `{field}`"
        ))),
        Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| StoreError::MalformedResponse(format!("cannot decode `{field}`: {e}"))),
    }
}

/// Onboarding store backed by the managed GraphQL data API.
pub struct GraphQlStore {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GraphQlStore {
    pub fn new(endpoint: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key,
        }
    }

    async fn execute(&self, query: &str, variables: Value) -> Result<GraphQlResponse, StoreError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .json(&GraphQlRequest { query, variables })
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        response
            .json()
            .await
            .map_err(|e| StoreError::MalformedResponse(e.to_string()))
    }
}

#[async_trait]
impl OnboardingStore for GraphQlStore {
    async fn list_page(
        &self,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<OnboardingPage, StoreError> {
        let variables = json!({ "limit": limit, "nextToken": cursor });
        let response = self.execute(LIST_ONBOARDING, variables).await?;
        let payload: ListPayload = extract_field(response, "listOnboarding")?.ok_or_else(|| {
            StoreError::MalformedResponse("`listOnboarding` is null".into())
        })?;

        Ok(OnboardingPage {
            items: payload.items,
            next_cursor: payload.next_token,
        })
    }

    async fn get(&self, id: &str) -> Result<Option<OnboardingRecord>, StoreError> {
        let response = self.execute(GET_ONBOARDING, json!({ "id": id })).await?;
        extract_field(response, "getOnboarding")
    }

    async fn set_follow_up_count(&self, id: &str, count: u32) -> Result<(), StoreError> {
        let variables = json!({
            "input": {
                "id": id,
                "loan_debtor_follow_up_emails": count,
            }
        });
        let response = self.execute(UPDATE_ONBOARDING, variables).await?;
        let updated: Option<Value> = extract_field(response, "updateOnboarding")?;
        if updated.is_none() {
            return Err(StoreError::NotFound { id: id.to_string() });
        }
        Ok(())
    }
}
