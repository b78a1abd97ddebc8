use crate::api::PersonStore;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) persons: PersonStore,
}
