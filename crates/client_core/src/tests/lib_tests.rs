use super::*;
use axum::{
    extract::{Path, State},
    http::StatusCode as HttpStatus,
    routing::{get, put},
    Json, Router,
};
use std::sync::Arc;
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Default)]
struct FixtureState {
    contacts: Arc<Mutex<Vec<Contact>>>,
    seen_bodies: Arc<Mutex<Vec<serde_json::Value>>>,
}

async fn fixture_list(State(state): State<FixtureState>) -> Json<Vec<Contact>> {
    Json(state.contacts.lock().await.clone())
}

async fn fixture_create(
    State(state): State<FixtureState>,
    Json(body): Json<serde_json::Value>,
) -> (HttpStatus, Json<serde_json::Value>) {
    state.seen_bodies.lock().await.push(body.clone());
    let mut contacts = state.contacts.lock().await;
    // Numeric ids on purpose: the client must accept both shapes.
    let id = contacts.len() as u64 + 1;
    let name = body["name"].as_str().unwrap_or_default().to_string();
    let number = body["number"].as_str().unwrap_or_default().to_string();
    contacts.push(Contact::new(id, name.clone(), number.clone()));
    (
        HttpStatus::CREATED,
        Json(serde_json::json!({ "id": id, "name": name, "number": number })),
    )
}

async fn fixture_update(
    State(state): State<FixtureState>,
    Path(id): Path<String>,
    Json(patch): Json<ContactPatch>,
) -> Result<Json<Contact>, HttpStatus> {
    let mut contacts = state.contacts.lock().await;
    let contact = contacts
        .iter_mut()
        .find(|c| c.id.as_str() == id)
        .ok_or(HttpStatus::NOT_FOUND)?;
    if let Some(number) = patch.number {
        contact.number = number;
    }
    Ok(Json(contact.clone()))
}

async fn fixture_delete(State(state): State<FixtureState>, Path(id): Path<String>) -> HttpStatus {
    let mut contacts = state.contacts.lock().await;
    let before = contacts.len();
    contacts.retain(|c| c.id.as_str() != id);
    if contacts.len() == before {
        HttpStatus::NOT_FOUND
    } else {
        HttpStatus::OK
    }
}

async fn broken_create() -> (HttpStatus, &'static str) {
    (HttpStatus::INTERNAL_SERVER_ERROR, "database exploded")
}

async fn spawn_fixture(
    contacts: Vec<Contact>,
    prefix: &str,
) -> anyhow::Result<(String, FixtureState)> {
    let state = FixtureState {
        contacts: Arc::new(Mutex::new(contacts)),
        ..FixtureState::default()
    };
    let persons = Router::new()
        .route("/persons", get(fixture_list).post(fixture_create))
        .route("/persons/:id", put(fixture_update).delete(fixture_delete))
        .route("/broken/persons", axum::routing::post(broken_create))
        .with_state(state.clone());
    let app = if prefix.is_empty() {
        persons
    } else {
        Router::new().nest(prefix, persons)
    };

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}{prefix}"), state))
}

#[tokio::test]
async fn lists_contacts_with_string_and_numeric_ids() {
    let (base_url, state) = spawn_fixture(vec![Contact::new(1u64, "Ada", "1")], "")
        .await
        .expect("spawn fixture");
    state
        .contacts
        .lock()
        .await
        .push(Contact::new(ContactId::new("x9"), "Bo", "9"));

    let store = HttpContactStore::new(&base_url).expect("store");
    let contacts = store.list().await.expect("list");

    assert_eq!(
        contacts,
        vec![
            Contact::new(1u64, "Ada", "1"),
            Contact::new(ContactId::new("x9"), "Bo", "9"),
        ]
    );
}

#[tokio::test]
async fn create_posts_name_and_number_and_returns_echo() {
    let (base_url, state) = spawn_fixture(Vec::new(), "").await.expect("spawn fixture");
    let store = HttpContactStore::new(&base_url).expect("store");

    let created = store
        .create(&NewContact {
            id: None,
            name: "Bo".into(),
            number: "9".into(),
        })
        .await
        .expect("create");

    assert_eq!(created, Contact::new(1u64, "Bo", "9"));
    assert_eq!(
        state.seen_bodies.lock().await.clone(),
        vec![serde_json::json!({ "name": "Bo", "number": "9" })]
    );
}

#[tokio::test]
async fn update_of_missing_id_is_not_found() {
    let (base_url, _state) = spawn_fixture(Vec::new(), "").await.expect("spawn fixture");
    let store = HttpContactStore::new(&base_url).expect("store");

    let err = store
        .update(
            &ContactId::from(42u64),
            &ContactPatch {
                number: Some("2".into()),
                ..ContactPatch::default()
            },
        )
        .await
        .expect_err("must fail");

    assert!(err.is_not_found(), "unexpected error: {err}");
}

#[tokio::test]
async fn delete_of_missing_id_counts_as_success() {
    let (base_url, _state) = spawn_fixture(Vec::new(), "").await.expect("spawn fixture");
    let store = HttpContactStore::new(&base_url).expect("store");

    store
        .delete(&ContactId::from(42u64))
        .await
        .expect("missing id is fine");
}

#[tokio::test]
async fn server_error_keeps_status_and_body() {
    let (base_url, _state) = spawn_fixture(Vec::new(), "").await.expect("spawn fixture");
    let store = HttpContactStore::new(&format!("{base_url}/broken")).expect("store");

    let err = store
        .create(&NewContact {
            id: None,
            name: "Bo".into(),
            number: "9".into(),
        })
        .await
        .expect_err("must fail");

    match err {
        StoreError::Status { status, body } => {
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body, "database exploded");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn base_url_path_prefix_is_kept() {
    let (base_url, _state) = spawn_fixture(vec![Contact::new(1u64, "Ada", "1")], "/api")
        .await
        .expect("spawn fixture");

    let store = HttpContactStore::new(&format!("{base_url}/")).expect("store");
    assert_eq!(store.list().await.expect("list").len(), 1);
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let store = HttpContactStore::new(&format!("http://{addr}")).expect("store");
    let err = store.list().await.expect_err("must fail");
    assert!(matches!(err, StoreError::Transport(_)));
}

#[test]
fn rejects_non_http_base_urls() {
    assert!(matches!(
        HttpContactStore::new("not a url"),
        Err(StoreError::InvalidBaseUrl { .. })
    ));
    assert!(matches!(
        HttpContactStore::new("mailto:someone@example.com"),
        Err(StoreError::InvalidBaseUrl { .. })
    ));
}

#[test]
fn persons_url_encodes_id_segment() {
    let store = HttpContactStore::new("http://localhost:3001").expect("store");
    assert_eq!(
        store.persons_url(None).as_str(),
        "http://localhost:3001/persons"
    );
    assert_eq!(
        store.persons_url(Some(&ContactId::new("a b"))).as_str(),
        "http://localhost:3001/persons/a%20b"
    );
}

#[tokio::test]
async fn phonebook_round_trip_over_http() {
    let (base_url, _state) = spawn_fixture(vec![Contact::new(1u64, "Ada", "1")], "")
        .await
        .expect("spawn fixture");
    let phonebook = Phonebook::new(HttpContactStore::new(&base_url).expect("store"));
    phonebook.load().await.expect("load");

    let outcome = phonebook
        .submit("Ada", "2", &AutoConfirm(true))
        .await
        .expect("submit");

    assert_eq!(outcome, SubmitOutcome::Updated(Contact::new(1u64, "Ada", "2")));
    assert_eq!(phonebook.contacts().await, vec![Contact::new(1u64, "Ada", "2")]);
}
