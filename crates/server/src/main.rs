use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use shared::{
    domain::{Contact, ContactId},
    error::{ApiError, ErrorCode},
    protocol::{ContactPatch, NewContact},
};
use tracing::{info, warn};

mod api;
mod app_state;
mod config;

use api::PersonStore;
use app_state::AppState;
use config::{load_seed, load_settings};

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings();
    let seed = match &settings.seed_path {
        Some(path) => {
            let persons = load_seed(path)?;
            info!(path = %path.display(), count = persons.len(), "seeded persons");
            persons
        }
        None => Vec::new(),
    };

    let state = AppState {
        persons: PersonStore::with_contacts(seed),
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "phonebook server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/persons", get(list_persons).post(create_person))
        .route(
            "/persons/:id",
            get(get_person).put(update_person).delete(delete_person),
        )
        .with_state(state)
}

fn reject(error: ApiError) -> (StatusCode, Json<ApiError>) {
    let status = match error.code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(error))
}

async fn healthz() -> &'static str {
    "ok"
}

async fn list_persons(State(state): State<Arc<AppState>>) -> Json<Vec<Contact>> {
    Json(state.persons.list().await)
}

async fn get_person(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Contact>> {
    state
        .persons
        .get(&ContactId::new(id))
        .await
        .map(Json)
        .map_err(reject)
}

async fn create_person(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewContact>,
) -> ApiResult<(StatusCode, Json<Contact>)> {
    let contact = state.persons.create(req).await.map_err(|e| {
        warn!(error = %e.message, "rejected new person");
        reject(e)
    })?;
    info!(id = %contact.id, name = %contact.name, "person created");
    Ok((StatusCode::CREATED, Json(contact)))
}

async fn update_person(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<ContactPatch>,
) -> ApiResult<Json<Contact>> {
    let contact = state
        .persons
        .update(&ContactId::new(id), patch)
        .await
        .map_err(reject)?;
    info!(id = %contact.id, "person updated");
    Ok(Json(contact))
}

async fn delete_person(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = ContactId::new(id);
    state.persons.delete(&id).await.map_err(reject)?;
    info!(%id, "person deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
