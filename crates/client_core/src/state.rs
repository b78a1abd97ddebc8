//! Phonebook state record and the pure transitions over it.
//!
//! Every change to what the client shows goes through [`reduce`]. Network
//! code never edits the state directly; it turns responses into
//! [`PhonebookEvent`]s and applies them to whatever the state is at that
//! moment.

use std::time::{Duration, Instant};

use shared::domain::{Contact, ContactId};

pub const DEFAULT_NOTIFICATION_DURATION: Duration = Duration::from_secs(5);
/// Longer durations are clamped to this.
pub const MAX_NOTIFICATION_DURATION: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
    pub expires_at: Instant,
}

impl Notification {
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhonebookState {
    pub contacts: Vec<Contact>,
    pub name_input: String,
    pub number_input: String,
    pub filter: String,
    pub notification: Option<Notification>,
}

impl PhonebookState {
    pub fn find_by_name(&self, name: &str) -> Option<&Contact> {
        self.contacts.iter().find(|contact| contact.name == name)
    }

    pub fn find_by_id(&self, id: &ContactId) -> Option<&Contact> {
        self.contacts.iter().find(|contact| &contact.id == id)
    }

    pub fn active_notification(&self, now: Instant) -> Option<&Notification> {
        self.notification
            .as_ref()
            .filter(|notification| !notification.is_expired(now))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhonebookEvent {
    Loaded(Vec<Contact>),
    NameInput(String),
    NumberInput(String),
    FilterInput(String),
    Created(Contact),
    Updated(Contact),
    UpdateConflict { id: ContactId, name: String },
    CreateFailed,
    Deleted(ContactId),
    Tick,
}

/// Applies one event. `now` stamps any notification the event raises and
/// decides whether the current one has expired.
pub fn reduce(
    state: PhonebookState,
    event: PhonebookEvent,
    now: Instant,
    notification_duration: Duration,
) -> PhonebookState {
    let expires_at = now
        .checked_add(notification_duration.min(MAX_NOTIFICATION_DURATION))
        .unwrap_or(now);
    let notify = |message: String, kind: NotificationKind| {
        Some(Notification {
            message,
            kind,
            expires_at,
        })
    };

    match event {
        PhonebookEvent::Loaded(contacts) => PhonebookState { contacts, ..state },
        PhonebookEvent::NameInput(name_input) => PhonebookState { name_input, ..state },
        PhonebookEvent::NumberInput(number_input) => PhonebookState {
            number_input,
            ..state
        },
        PhonebookEvent::FilterInput(filter) => PhonebookState { filter, ..state },
        PhonebookEvent::Created(contact) => {
            let notification = notify(format!("Added {}", contact.name), NotificationKind::Success);
            let mut contacts = state.contacts;
            contacts.push(contact);
            PhonebookState {
                contacts,
                name_input: String::new(),
                number_input: String::new(),
                notification,
                ..state
            }
        }
        PhonebookEvent::Updated(updated) => {
            let notification = notify(
                format!("Updated {}'s number", updated.name),
                NotificationKind::Success,
            );
            let contacts = state
                .contacts
                .into_iter()
                .map(|contact| {
                    if contact.id == updated.id {
                        updated.clone()
                    } else {
                        contact
                    }
                })
                .collect();
            PhonebookState {
                contacts,
                name_input: String::new(),
                number_input: String::new(),
                notification,
                ..state
            }
        }
        PhonebookEvent::UpdateConflict { id, name } => {
            let notification = notify(
                format!("Information of {name} has already been removed from server"),
                NotificationKind::Error,
            );
            let contacts = state
                .contacts
                .into_iter()
                .filter(|contact| contact.id != id)
                .collect();
            PhonebookState {
                contacts,
                name_input: String::new(),
                number_input: String::new(),
                notification,
                ..state
            }
        }
        PhonebookEvent::CreateFailed => PhonebookState {
            notification: notify("Failed to add person".to_string(), NotificationKind::Error),
            ..state
        },
        PhonebookEvent::Deleted(id) => {
            let contacts = state
                .contacts
                .into_iter()
                .filter(|contact| contact.id != id)
                .collect();
            PhonebookState { contacts, ..state }
        }
        PhonebookEvent::Tick => {
            let notification = state
                .notification
                .filter(|notification| !notification.is_expired(now));
            PhonebookState {
                notification,
                ..state
            }
        }
    }
}

/// Contacts whose name contains `filter`, ignoring case.
pub fn visible_contacts<'a>(contacts: &'a [Contact], filter: &str) -> Vec<&'a Contact> {
    let needle = filter.to_lowercase();
    contacts
        .iter()
        .filter(|contact| contact.name.to_lowercase().contains(&needle))
        .collect()
}

/// One greater than the largest numeric id, or 1. Non-numeric ids are skipped.
/// `None` once the largest id is `u64::MAX`.
pub fn next_local_id(contacts: &[Contact]) -> Option<ContactId> {
    let max = contacts
        .iter()
        .filter_map(|contact| contact.id.as_number())
        .max()
        .unwrap_or(0);
    max.checked_add(1).map(ContactId::from)
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
