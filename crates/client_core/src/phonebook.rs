use std::time::{Duration, Instant};

use async_trait::async_trait;
use shared::{
    domain::{Contact, ContactId},
    protocol::{ContactPatch, NewContact},
};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::{
    error::PhonebookError,
    state::{
        next_local_id, reduce, visible_contacts, Notification, PhonebookEvent, PhonebookState,
        DEFAULT_NOTIFICATION_DURATION,
    },
    ContactStore,
};

/// Asks the user to approve an overwrite or a delete.
#[async_trait]
pub trait Confirm: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
}

/// Answers every prompt the same way.
pub struct AutoConfirm(pub bool);

#[async_trait]
impl Confirm for AutoConfirm {
    async fn confirm(&self, _prompt: &str) -> bool {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdAssignment {
    /// The create request carries no id.
    #[default]
    Server,
    /// The create request carries one more than the largest numeric id held
    /// locally. Two clients can pick the same id. Falls back to `Server` when
    /// the largest id is `u64::MAX`.
    LocalMaxPlusOne,
}

#[derive(Debug, Clone, Copy)]
pub struct PhonebookOptions {
    pub notification_duration: Duration,
    pub id_assignment: IdAssignment,
}

impl Default for PhonebookOptions {
    fn default() -> Self {
        Self {
            notification_duration: DEFAULT_NOTIFICATION_DURATION,
            id_assignment: IdAssignment::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(Contact),
    Updated(Contact),
    Declined,
    ConflictRemoved { id: ContactId, name: String },
    CreateFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(ContactId),
    Declined,
    Failed,
}

/// Client-side phonebook bound to one persons collection.
///
/// Submissions are not serialized. The state lock is only held while reading
/// the collection or applying an event, never across a request, so two
/// submissions in flight can both take the create path for the same name.
pub struct Phonebook<S: ContactStore> {
    store: S,
    state: Mutex<PhonebookState>,
    options: PhonebookOptions,
}

impl<S: ContactStore> Phonebook<S> {
    pub fn new(store: S) -> Self {
        Self::with_options(store, PhonebookOptions::default())
    }

    pub fn with_options(store: S, options: PhonebookOptions) -> Self {
        Self {
            store,
            state: Mutex::new(PhonebookState::default()),
            options,
        }
    }

    pub fn options(&self) -> PhonebookOptions {
        self.options
    }

    pub async fn snapshot(&self) -> PhonebookState {
        self.state.lock().await.clone()
    }

    pub async fn contacts(&self) -> Vec<Contact> {
        self.state.lock().await.contacts.clone()
    }

    /// Contacts matching the current filter.
    pub async fn visible(&self) -> Vec<Contact> {
        let state = self.state.lock().await;
        visible_contacts(&state.contacts, &state.filter)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn notification(&self) -> Option<Notification> {
        self.dispatch(PhonebookEvent::Tick).await;
        self.state
            .lock()
            .await
            .active_notification(Instant::now())
            .cloned()
    }

    pub async fn dispatch(&self, event: PhonebookEvent) {
        let mut state = self.state.lock().await;
        let current = std::mem::take(&mut *state);
        *state = reduce(
            current,
            event,
            Instant::now(),
            self.options.notification_duration,
        );
    }

    /// Replaces the local collection with the server's.
    pub async fn load(&self) -> Result<usize, PhonebookError> {
        let contacts = self.store.list().await.map_err(PhonebookError::Load)?;
        let count = contacts.len();
        self.dispatch(PhonebookEvent::Loaded(contacts)).await;
        info!(count, "contacts loaded");
        Ok(count)
    }

    pub async fn set_filter(&self, filter: impl Into<String>) {
        self.dispatch(PhonebookEvent::FilterInput(filter.into())).await;
    }

    /// Fills the inputs and submits them.
    pub async fn submit(
        &self,
        name: impl Into<String>,
        number: impl Into<String>,
        confirm: &dyn Confirm,
    ) -> Result<SubmitOutcome, PhonebookError> {
        self.dispatch(PhonebookEvent::NameInput(name.into())).await;
        self.dispatch(PhonebookEvent::NumberInput(number.into())).await;
        self.submit_inputs(confirm).await
    }

    /// Creates a contact from the inputs, or overwrites the number of the
    /// contact that already has that name.
    pub async fn submit_inputs(
        &self,
        confirm: &dyn Confirm,
    ) -> Result<SubmitOutcome, PhonebookError> {
        let (name, number, existing, local_id) = {
            let state = self.state.lock().await;
            let name = state.name_input.clone();
            if name.trim().is_empty() {
                return Err(PhonebookError::EmptyName);
            }
            let existing = state.find_by_name(&name).cloned();
            let local_id = match self.options.id_assignment {
                IdAssignment::Server => None,
                IdAssignment::LocalMaxPlusOne => next_local_id(&state.contacts),
            };
            (name, state.number_input.clone(), existing, local_id)
        };

        match existing {
            Some(existing) => Ok(self.overwrite_number(existing, number, confirm).await),
            None => Ok(self.create(name, number, local_id).await),
        }
    }

    async fn overwrite_number(
        &self,
        existing: Contact,
        number: String,
        confirm: &dyn Confirm,
    ) -> SubmitOutcome {
        let prompt = format!(
            "{} is already added to phonebook, replace the old number with a new one?",
            existing.name
        );
        if !confirm.confirm(&prompt).await {
            return SubmitOutcome::Declined;
        }

        let patch = ContactPatch {
            name: Some(existing.name.clone()),
            number: Some(number),
        };
        match self.store.update(&existing.id, &patch).await {
            Ok(updated) => {
                info!(id = %updated.id, name = %updated.name, "contact updated");
                self.dispatch(PhonebookEvent::Updated(updated.clone())).await;
                SubmitOutcome::Updated(updated)
            }
            Err(err) => {
                warn!(id = %existing.id, name = %existing.name, %err, "update failed; dropping stale contact");
                self.dispatch(PhonebookEvent::UpdateConflict {
                    id: existing.id.clone(),
                    name: existing.name.clone(),
                })
                .await;
                SubmitOutcome::ConflictRemoved {
                    id: existing.id,
                    name: existing.name,
                }
            }
        }
    }

    async fn create(&self, name: String, number: String, id: Option<ContactId>) -> SubmitOutcome {
        let body = NewContact { id, name, number };
        match self.store.create(&body).await {
            Ok(created) => {
                info!(id = %created.id, name = %created.name, "contact created");
                self.dispatch(PhonebookEvent::Created(created.clone())).await;
                SubmitOutcome::Created(created)
            }
            Err(err) => {
                warn!(name = %body.name, %err, "create failed");
                self.dispatch(PhonebookEvent::CreateFailed).await;
                SubmitOutcome::CreateFailed
            }
        }
    }

    /// Deletes after confirmation. Failures leave the collection as it was
    /// and raise no notification.
    pub async fn delete(&self, id: &ContactId, confirm: &dyn Confirm) -> DeleteOutcome {
        let name = {
            let state = self.state.lock().await;
            state
                .find_by_id(id)
                .map(|contact| contact.name.clone())
                .unwrap_or_else(|| id.to_string())
        };
        if !confirm.confirm(&format!("Delete {name}?")).await {
            return DeleteOutcome::Declined;
        }

        match self.store.delete(id).await {
            Ok(()) => {
                info!(%id, %name, "contact deleted");
                self.dispatch(PhonebookEvent::Deleted(id.clone())).await;
                DeleteOutcome::Deleted(id.clone())
            }
            Err(err) => {
                warn!(%id, %name, %err, "delete failed");
                DeleteOutcome::Failed
            }
        }
    }

    /// Finds a contact by exact name, falling back to its id.
    pub async fn resolve(&self, name_or_id: &str) -> Result<Contact, PhonebookError> {
        let state = self.state.lock().await;
        state
            .find_by_name(name_or_id)
            .or_else(|| state.find_by_id(&ContactId::new(name_or_id)))
            .cloned()
            .ok_or_else(|| PhonebookError::UnknownContact(name_or_id.to_string()))
    }
}

#[cfg(test)]
#[path = "tests/phonebook_tests.rs"]
mod tests;
