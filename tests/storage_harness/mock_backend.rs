//! A PostgREST-flavoured mock backend served by axum
//!
//! Table routes delegate to an `InMemoryTableStore`, so a `RestTableStore`
//! pointed at the mock can run the same contract suite as the in-memory
//! store. Every request is recorded for header and query assertions.

use agency_sync::core::query::{Embed, Order, Row, SelectQuery};
use agency_sync::core::store::TableStore;
use agency_sync::storage::InMemoryTableStore;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub const ANON_KEY: &str = "anon-key";
pub const PASSWORD: &str = "secret";

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub path: String,
    pub query: HashMap<String, String>,
    pub apikey: Option<String>,
    pub authorization: Option<String>,
    pub prefer: Option<String>,
    pub accept: Option<String>,
}

#[derive(Clone, Default)]
pub struct MockBackend {
    pub store: InMemoryTableStore,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    fail_status: Arc<Mutex<Option<StatusCode>>>,
    users: Arc<Mutex<HashMap<String, Uuid>>>,
}

impl MockBackend {
    /// Serve on an ephemeral local port; returns the base URL
    pub async fn spawn() -> (String, MockBackend) {
        let backend = MockBackend::default();
        let app = Router::new()
            .route(
                "/rest/v1/{table}",
                get(select_rows)
                    .post(insert_row)
                    .patch(update_row)
                    .delete(delete_row),
            )
            .route("/auth/v1/signup", post(sign_up))
            .route("/auth/v1/token", post(token))
            .route("/auth/v1/logout", post(logout))
            .with_state(backend.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), backend)
    }

    /// Answer every table request with this status until cleared
    pub fn fail_with(&self, status: Option<StatusCode>) {
        *self.fail_status.lock().unwrap() = status;
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests().pop().expect("at least one request")
    }

    pub fn register(&self, email: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.users.lock().unwrap().insert(email.to_string(), id);
        id
    }

    fn record(
        &self,
        method: &'static str,
        path: String,
        query: &HashMap<String, String>,
        headers: &HeaderMap,
    ) {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            path,
            query: query.clone(),
            apikey: header("apikey"),
            authorization: header("authorization"),
            prefer: header("prefer"),
            accept: header("accept"),
        });
    }

    fn reject(&self, headers: &HeaderMap) -> Option<Response> {
        if headers.get("apikey").and_then(|v| v.to_str().ok()) != Some(ANON_KEY) {
            return Some(
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "message": "Invalid API key" })),
                )
                    .into_response(),
            );
        }
        let forced = *self.fail_status.lock().unwrap();
        forced.map(|status| (status, Json(json!({ "message": "forced failure" }))).into_response())
    }
}

fn leak(s: String) -> &'static str {
    Box::leak(s.into_boxed_str())
}

/// Parse `*,clients(name),projects(name)` into embeds; the foreign key is
/// the relation name minus its plural `s` plus `_id`.
fn parse_embeds(select: Option<&String>) -> &'static [Embed] {
    let Some(select) = select else {
        return &[];
    };

    let mut fragments = Vec::new();
    let mut depth = 0;
    let mut current = String::new();
    for c in select.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                fragments.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    fragments.push(current);

    let embeds: Vec<Embed> = fragments
        .iter()
        .filter_map(|fragment| {
            let (relation, rest) = fragment.split_once('(')?;
            let columns: Vec<&'static str> = rest
                .trim_end_matches(')')
                .split(',')
                .map(|c| leak(c.to_string()))
                .collect();
            let singular = relation.strip_suffix('s').unwrap_or(relation);
            Some(Embed::new(
                leak(relation.to_string()),
                leak(format!("{}_id", singular)),
                Box::leak(columns.into_boxed_slice()),
            ))
        })
        .collect();
    Box::leak(embeds.into_boxed_slice())
}

fn eq_uuid(query: &HashMap<String, String>, column: &str) -> Option<Uuid> {
    query
        .get(column)
        .and_then(|v| v.strip_prefix("eq."))
        .and_then(|v| Uuid::parse_str(v).ok())
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "message": message }))).into_response()
}

fn store_error(e: anyhow::Error) -> Response {
    (
        StatusCode::CONFLICT,
        Json(json!({ "message": e.to_string() })),
    )
        .into_response()
}

async fn select_rows(
    State(backend): State<MockBackend>,
    Path(table): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    backend.record("GET", format!("/rest/v1/{}", table), &query, &headers);
    if let Some(rejection) = backend.reject(&headers) {
        return rejection;
    }
    let Some(owner) = eq_uuid(&query, "user_id") else {
        return bad_request("missing owner filter");
    };
    let order = match query.get("order").map(String::as_str) {
        Some("created_at.asc") => Order::CreatedAsc,
        _ => Order::CreatedDesc,
    };

    let select = SelectQuery {
        table: leak(table),
        owner,
        embeds: parse_embeds(query.get("select")),
        order,
    };
    match backend.store.select(&select).await {
        Ok(rows) => Json(rows).into_response(),
        Err(e) => store_error(e),
    }
}

async fn insert_row(
    State(backend): State<MockBackend>,
    Path(table): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(row): Json<Row>,
) -> Response {
    backend.record("POST", format!("/rest/v1/{}", table), &query, &headers);
    if let Some(rejection) = backend.reject(&headers) {
        return rejection;
    }

    let embeds = parse_embeds(query.get("select"));
    match backend.store.insert(&table, row, embeds).await {
        Ok(row) => (StatusCode::CREATED, Json(row)).into_response(),
        Err(e) => store_error(e),
    }
}

async fn update_row(
    State(backend): State<MockBackend>,
    Path(table): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(fields): Json<Row>,
) -> Response {
    backend.record("PATCH", format!("/rest/v1/{}", table), &query, &headers);
    if let Some(rejection) = backend.reject(&headers) {
        return rejection;
    }
    let Some(id) = eq_uuid(&query, "id") else {
        return bad_request("missing id filter");
    };

    match backend.store.update(&table, &id, fields).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => store_error(e),
    }
}

async fn delete_row(
    State(backend): State<MockBackend>,
    Path(table): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    backend.record("DELETE", format!("/rest/v1/{}", table), &query, &headers);
    if let Some(rejection) = backend.reject(&headers) {
        return rejection;
    }
    let Some(id) = eq_uuid(&query, "id") else {
        return bad_request("missing id filter");
    };

    match backend.store.delete(&table, &id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => store_error(e),
    }
}

#[derive(Deserialize)]
struct Credentials {
    email: String,
    password: String,
}

fn session_body(id: Uuid, email: &str) -> Response {
    Json(json!({
        "access_token": format!("token-{}", id),
        "token_type": "bearer",
        "expires_in": 3600,
        "user": { "id": id, "email": email }
    }))
    .into_response()
}

async fn sign_up(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Json(credentials): Json<Credentials>,
) -> Response {
    backend.record("POST", "/auth/v1/signup".to_string(), &HashMap::new(), &headers);
    let id = backend.register(&credentials.email);
    session_body(id, &credentials.email)
}

async fn token(
    State(backend): State<MockBackend>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(credentials): Json<Credentials>,
) -> Response {
    backend.record("POST", "/auth/v1/token".to_string(), &query, &headers);
    if query.get("grant_type").map(String::as_str) != Some("password") {
        return bad_request("unsupported grant type");
    }

    let known = backend.users.lock().unwrap().get(&credentials.email).copied();
    match known {
        Some(id) if credentials.password == PASSWORD => session_body(id, &credentials.email),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials"
            })),
        )
            .into_response(),
    }
}

async fn logout(State(backend): State<MockBackend>, headers: HeaderMap) -> Response {
    backend.record("POST", "/auth/v1/logout".to_string(), &HashMap::new(), &headers);
    if headers.get("authorization").is_none() {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}
