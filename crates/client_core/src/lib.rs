use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use shared::{
    domain::{Contact, ContactId},
    protocol::{persons_route, ContactPatch, NewContact},
};
use tracing::debug;
use url::Url;

pub mod error;
pub mod phonebook;
pub mod state;

pub use error::{PhonebookError, StoreError};
pub use phonebook::{
    AutoConfirm, Confirm, DeleteOutcome, IdAssignment, Phonebook, PhonebookOptions, SubmitOutcome,
};
pub use state::{
    next_local_id, reduce, visible_contacts, Notification, NotificationKind, PhonebookEvent,
    PhonebookState, DEFAULT_NOTIFICATION_DURATION, MAX_NOTIFICATION_DURATION,
};

/// The remote persons collection.
///
/// Every call is a single request. Nothing here retries or caches.
#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Contact>, StoreError>;
    async fn create(&self, contact: &NewContact) -> Result<Contact, StoreError>;
    async fn update(&self, id: &ContactId, patch: &ContactPatch) -> Result<Contact, StoreError>;
    /// Removing an id the server no longer has counts as success.
    async fn delete(&self, id: &ContactId) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
pub struct HttpContactStore {
    http: Client,
    base_url: Url,
}

impl HttpContactStore {
    pub fn new(base_url: &str) -> Result<Self, StoreError> {
        Self::with_timeout(base_url, None)
    }

    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self, StoreError> {
        let parsed = Url::parse(base_url.trim()).map_err(|e| StoreError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(StoreError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "expected an http(s) url".to_string(),
            });
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: parsed,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn persons_url(&self, id: Option<&ContactId>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push(persons_route().trim_start_matches('/'));
            if let Some(id) = id {
                segments.push(id.as_str());
            }
        }
        url
    }
}

async fn check_status(response: Response, id: Option<&ContactId>) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        if let Some(id) = id {
            return Err(StoreError::NotFound { id: id.clone() });
        }
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Status { status, body })
}

#[async_trait]
impl ContactStore for HttpContactStore {
    async fn list(&self) -> Result<Vec<Contact>, StoreError> {
        let url = self.persons_url(None);
        debug!(%url, "fetching contacts");
        let response = self.http.get(url).send().await?;
        Ok(check_status(response, None).await?.json().await?)
    }

    async fn create(&self, contact: &NewContact) -> Result<Contact, StoreError> {
        let url = self.persons_url(None);
        debug!(%url, name = %contact.name, "creating contact");
        let response = self.http.post(url).json(contact).send().await?;
        Ok(check_status(response, None).await?.json().await?)
    }

    async fn update(&self, id: &ContactId, patch: &ContactPatch) -> Result<Contact, StoreError> {
        let url = self.persons_url(Some(id));
        debug!(%url, "updating contact");
        let response = self.http.put(url).json(patch).send().await?;
        Ok(check_status(response, Some(id)).await?.json().await?)
    }

    async fn delete(&self, id: &ContactId) -> Result<(), StoreError> {
        let url = self.persons_url(Some(id));
        debug!(%url, "deleting contact");
        let response = self.http.delete(url).send().await?;
        match check_status(response, Some(id)).await {
            Ok(_) => Ok(()),
            Err(StoreError::NotFound { .. }) => Ok(()),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
