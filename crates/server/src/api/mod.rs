//! In-memory persons collection behind the development server.

use std::sync::Arc;

use shared::{
    domain::{Contact, ContactId},
    error::{ApiError, ErrorCode},
    protocol::{ContactPatch, NewContact},
};
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct PersonStore {
    table: Arc<RwLock<PersonTable>>,
}

#[derive(Default)]
struct PersonTable {
    contacts: Vec<Contact>,
    last_id: u64,
}

impl PersonTable {
    fn contains(&self, id: &ContactId) -> bool {
        self.contacts.iter().any(|contact| &contact.id == id)
    }

    fn observe_id(&mut self, id: &ContactId) {
        if let Some(numeric) = id.as_number() {
            self.last_id = self.last_id.max(numeric);
        }
    }

    fn allocate_id(&mut self) -> Result<ContactId, ApiError> {
        loop {
            self.last_id = self.last_id.checked_add(1).ok_or_else(|| {
                ApiError::new(ErrorCode::Internal, "numeric person ids exhausted")
            })?;
            let candidate = ContactId::from(self.last_id);
            if !self.contains(&candidate) {
                return Ok(candidate);
            }
        }
    }
}

impl PersonStore {
    pub fn with_contacts(contacts: Vec<Contact>) -> Self {
        let mut table = PersonTable::default();
        for contact in &contacts {
            table.observe_id(&contact.id);
        }
        table.contacts = contacts;
        Self {
            table: Arc::new(RwLock::new(table)),
        }
    }

    pub async fn list(&self) -> Vec<Contact> {
        self.table.read().await.contacts.clone()
    }

    pub async fn get(&self, id: &ContactId) -> Result<Contact, ApiError> {
        self.table
            .read()
            .await
            .contacts
            .iter()
            .find(|contact| &contact.id == id)
            .cloned()
            .ok_or_else(|| missing(id))
    }

    /// Stores a new contact. A client-chosen id is honoured when it is free.
    pub async fn create(&self, request: NewContact) -> Result<Contact, ApiError> {
        let name = required("name", &request.name)?;
        let number = required("number", &request.number)?;

        let mut table = self.table.write().await;
        let id = match request.id {
            Some(id) if !id.as_str().trim().is_empty() && !table.contains(&id) => {
                table.observe_id(&id);
                id
            }
            _ => table.allocate_id()?,
        };
        let contact = Contact { id, name, number };
        table.contacts.push(contact.clone());
        Ok(contact)
    }

    pub async fn update(&self, id: &ContactId, patch: ContactPatch) -> Result<Contact, ApiError> {
        let name = patch
            .name
            .as_deref()
            .map(|name| required("name", name))
            .transpose()?;
        let number = patch
            .number
            .as_deref()
            .map(|number| required("number", number))
            .transpose()?;

        let mut table = self.table.write().await;
        let contact = table
            .contacts
            .iter_mut()
            .find(|contact| &contact.id == id)
            .ok_or_else(|| missing(id))?;
        if let Some(name) = name {
            contact.name = name;
        }
        if let Some(number) = number {
            contact.number = number;
        }
        Ok(contact.clone())
    }

    pub async fn delete(&self, id: &ContactId) -> Result<(), ApiError> {
        let mut table = self.table.write().await;
        let before = table.contacts.len();
        table.contacts.retain(|contact| &contact.id != id);
        if table.contacts.len() == before {
            return Err(missing(id));
        }
        Ok(())
    }
}

fn required(field: &str, value: &str) -> Result<String, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation(format!("{field} missing")));
    }
    Ok(trimmed.to_string())
}

fn missing(id: &ContactId) -> ApiError {
    ApiError::not_found(format!("person {id} not found"))
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
