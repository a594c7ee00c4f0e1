//! HTTP backend for a hosted PostgREST-style table store and its auth service
//!
//! Tables live under `{url}/rest/v1/{table}` and accounts under
//! `{url}/auth/v1`. Every request carries the project's anon key in the
//! `apikey` header and a bearer token: the session's access token when one is
//! set, otherwise the anon key itself.

use crate::config::BackendConfig;
use crate::core::auth::{AuthProvider, Identity, Session};
use crate::core::error::StoreError;
use crate::core::query::{Embed, OWNER_COLUMN, Row, SelectQuery, select_param};
use crate::core::store::TableStore;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

const OBJECT_MEDIA_TYPE: &str = "application/vnd.pgrst.object+json";

fn base(url: &str) -> &str {
    url.trim_end_matches('/')
}

async fn check(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|e| format!("<unreadable body: {}>", e));
    Err(StoreError::Status {
        status: status.as_u16(),
        body,
    })
}

async fn send(request: RequestBuilder) -> Result<Response, StoreError> {
    let response = request
        .send()
        .await
        .map_err(|e| StoreError::Transport(e.to_string()))?;
    check(response).await
}

/// Table store talking to a hosted PostgREST endpoint
#[derive(Clone)]
pub struct RestTableStore {
    client: Client,
    base_url: String,
    anon_key: String,
    access_token: Arc<RwLock<Option<String>>>,
}

impl RestTableStore {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            anon_key: anon_key.into(),
            access_token: Arc::new(RwLock::new(None)),
        }
    }

    pub fn from_config(config: &BackendConfig) -> Self {
        Self::new(config.url.clone(), config.anon_key.clone())
    }

    /// Authenticate subsequent requests as this session, or anonymously
    pub fn use_session(&self, session: Option<&Session>) {
        let mut token = self
            .access_token
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *token = session.map(|s| s.access_token.clone());
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", base(&self.base_url), table)
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        let bearer = self
            .access_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .unwrap_or_else(|| self.anon_key.clone());

        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }
}

#[async_trait]
impl TableStore for RestTableStore {
    async fn select(&self, query: &SelectQuery) -> Result<Vec<Row>> {
        tracing::debug!(table = query.table, owner = %query.owner, "select");
        let request = self
            .request(Method::GET, self.table_url(query.table))
            .query(&[
                ("select", query.select_param()),
                (OWNER_COLUMN, format!("eq.{}", query.owner)),
                ("order", query.order.as_param().to_string()),
            ]);

        let rows = send(request)
            .await?
            .json::<Vec<Row>>()
            .await
            .map_err(|e| StoreError::Body(e.to_string()))?;
        Ok(rows)
    }

    async fn insert(&self, table: &str, row: Row, embeds: &[Embed]) -> Result<Row> {
        tracing::debug!(table, "insert");
        let request = self
            .request(Method::POST, self.table_url(table))
            .query(&[("select", select_param(embeds))])
            .header("Prefer", "return=representation")
            .header("Accept", OBJECT_MEDIA_TYPE)
            .json(&row);

        let row = send(request)
            .await?
            .json::<Row>()
            .await
            .map_err(|e| StoreError::Body(e.to_string()))?;
        Ok(row)
    }

    async fn update(&self, table: &str, id: &Uuid, fields: Row) -> Result<()> {
        tracing::debug!(table, %id, "update");
        let request = self
            .request(Method::PATCH, self.table_url(table))
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=minimal")
            .json(&fields);

        send(request).await?;
        Ok(())
    }

    async fn delete(&self, table: &str, id: &Uuid) -> Result<()> {
        tracing::debug!(table, %id, "delete");
        let request = self
            .request(Method::DELETE, self.table_url(table))
            .query(&[("id", format!("eq.{}", id))]);

        send(request).await?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    user: Option<Identity>,
}

impl TokenResponse {
    fn into_session(self) -> Result<Session> {
        match (self.access_token, self.user) {
            (Some(access_token), Some(identity)) => Ok(Session {
                identity,
                access_token,
            }),
            (None, _) => Err(anyhow!(
                "no session returned; the account may need email confirmation"
            )),
            (Some(_), None) => Err(StoreError::Body("session without user".to_string()).into()),
        }
    }
}

/// Delegates account operations to the hosted auth service
#[derive(Clone)]
pub struct RestAuthProvider {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl RestAuthProvider {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            anon_key: anon_key.into(),
        }
    }

    pub fn from_config(config: &BackendConfig) -> Self {
        Self::new(config.url.clone(), config.anon_key.clone())
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", base(&self.base_url), path)
    }

    async fn token_request(&self, url: String, email: &str, password: &str) -> Result<Session> {
        let request = self
            .client
            .post(url)
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }));

        let body = send(request)
            .await?
            .json::<TokenResponse>()
            .await
            .map_err(|e| StoreError::Body(e.to_string()))?;
        body.into_session()
    }
}

#[async_trait]
impl AuthProvider for RestAuthProvider {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Session> {
        tracing::debug!(email, "sign up");
        self.token_request(self.auth_url("signup"), email, password)
            .await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        tracing::debug!(email, "sign in");
        self.token_request(self.auth_url("token?grant_type=password"), email, password)
            .await
    }

    async fn sign_out(&self, session: &Session) -> Result<()> {
        tracing::debug!(user_id = %session.identity.user_id, "sign out");
        let request = self
            .client
            .post(self.auth_url("logout"))
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token);

        send(request).await?;
        Ok(())
    }
}
