//! Typed client for the resource endpoints.
//!
//! [`ResourceClient`] maps the four CRUD operations onto HTTP calls and
//! normalizes every failure into a [`ClientError`]. [`ResourceStore`] pairs a
//! client with a [`CollectionState`] cache for the active scope, and
//! [`Session`] holds one store per entity kind.

mod state;
mod store;

pub use state::*;
pub use store::*;

use std::fmt;
use std::marker::PhantomData;

use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{validate_scope_id, Record, Resource};

/// Failure of a resource operation. Every variant displays as a message fit
/// for showing to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Rejected before any request was sent
    #[error("{0}")]
    Validation(String),
    /// The server reported a uniqueness violation
    #[error("{0}")]
    Conflict(String),
    /// The target record does not exist
    #[error("{0}")]
    NotFound(String),
    /// Any other non-success response
    #[error("{message}")]
    Server { status: u16, message: String },
    /// The request never completed
    #[error("Network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Network(err.to_string())
    }
}

/// A validated scope key (admin id).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Scope(String);

impl Scope {
    pub fn new(id: impl Into<String>) -> Result<Self, ClientError> {
        let id = id.into();
        validate_scope_id(&id).map_err(ClientError::Validation)?;
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Serialize)]
struct ScopedBody<'a, R> {
    #[serde(rename = "adminID")]
    admin_id: &'a str,
    #[serde(flatten)]
    fields: &'a R,
}

#[derive(Deserialize)]
struct Envelope<T> {
    message: String,
    data: Option<T>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    message: String,
}

/// HTTP client for one resource kind.
pub struct ResourceClient<R> {
    http: reqwest::Client,
    base_url: Url,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for ResourceClient<R> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> ResourceClient<R> {
    pub fn new(http: reqwest::Client, base_url: Url) -> Result<Self, ClientError> {
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Validation(format!(
                "Invalid server URL {}",
                base_url
            )));
        }
        Ok(Self {
            http,
            base_url,
            _resource: PhantomData,
        })
    }

    /// Fetch every record of the scope.
    pub async fn list(&self, scope: &Scope) -> Result<Vec<Record<R>>, ClientError> {
        let resp = self
            .http
            .get(self.endpoint(Some(scope.as_str()))?)
            .send()
            .await?;
        read_data(resp).await
    }

    /// Validate and create a record; returns it with its server-assigned id.
    pub async fn create(&self, scope: &Scope, fields: &R) -> Result<Record<R>, ClientError> {
        fields.validate().map_err(ClientError::Validation)?;

        let body = ScopedBody {
            admin_id: scope.as_str(),
            fields,
        };
        let resp = self
            .http
            .post(self.endpoint(None)?)
            .json(&body)
            .send()
            .await?;
        read_data(resp).await
    }

    /// Validate and replace the fields of record `id`.
    pub async fn update(
        &self,
        scope: &Scope,
        id: &str,
        fields: &R,
    ) -> Result<Record<R>, ClientError> {
        fields.validate().map_err(ClientError::Validation)?;

        let body = ScopedBody {
            admin_id: scope.as_str(),
            fields,
        };
        let resp = self
            .http
            .put(self.endpoint(Some(id))?)
            .json(&body)
            .send()
            .await?;
        read_data(resp).await
    }

    /// Delete record `id`. A record that is already gone counts as deleted.
    pub async fn delete(&self, scope: &Scope, id: &str) -> Result<(), ClientError> {
        let resp = self
            .http
            .delete(self.endpoint(Some(id))?)
            .query(&[("adminID", scope.as_str())])
            .send()
            .await?;

        if resp.status().is_success() {
            return Ok(());
        }
        match error_from_response(resp).await {
            ClientError::NotFound(message) => {
                tracing::debug!(kind = R::KIND, id = id, "Delete of absent record: {}", message);
                Ok(())
            }
            err => Err(err),
        }
    }

    fn endpoint(&self, key: Option<&str>) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                ClientError::Validation(format!("Invalid server URL {}", self.base_url))
            })?;
            segments.pop_if_empty().push("api").push(R::KIND);
            if let Some(key) = key {
                segments.push(key);
            }
        }
        Ok(url)
    }
}

async fn read_data<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(error_from_response(resp).await);
    }

    let Envelope { message, data } =
        resp.json::<Envelope<T>>()
            .await
            .map_err(|e| ClientError::Server {
                status: status.as_u16(),
                message: format!("Unreadable response: {}", e),
            })?;

    data.ok_or_else(|| ClientError::Server {
        status: status.as_u16(),
        message: format!("Response carried no data: {}", message),
    })
}

async fn error_from_response(resp: reqwest::Response) -> ClientError {
    let status = resp.status();
    let message = match resp.json::<ErrorEnvelope>().await {
        Ok(body) => body.message,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string(),
    };

    match status {
        StatusCode::CONFLICT => ClientError::Conflict(message),
        StatusCode::NOT_FOUND => ClientError::NotFound(message),
        _ => ClientError::Server {
            status: status.as_u16(),
            message,
        },
    }
}
