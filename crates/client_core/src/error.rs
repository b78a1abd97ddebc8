use reqwest::StatusCode;
use shared::domain::ContactId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid persons base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("request to persons collection failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("contact {id} does not exist on the server")]
    NotFound { id: ContactId },
    #[error("server responded {status}: {body}")]
    Status { status: StatusCode, body: String },
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

#[derive(Debug, Error)]
pub enum PhonebookError {
    #[error("contact name must not be empty")]
    EmptyName,
    #[error("failed to load contacts: {0}")]
    Load(#[source] StoreError),
    #[error("no contact named or numbered '{0}'")]
    UnknownContact(String),
}
