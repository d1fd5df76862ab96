//! Resource stores: a client plus its cached collection for the active scope.

use std::sync::Arc;

use reqwest::Url;
use tokio::sync::RwLock;

use super::{ClientError, CollectionState, Generation, ResourceClient, Scope};
use crate::models::{
    Category, Discount, Division, House, Reason, Record, Resource, StockItem, Teacher, Visitor,
};

/// Message stored when an operation is attempted before an admin is selected.
pub const NO_SCOPE_MESSAGE: &str = "No admin selected";

struct StoreInner<R> {
    scope: Option<Scope>,
    state: CollectionState<R>,
}

/// Runs CRUD operations for one resource kind and keeps the resulting
/// [`CollectionState`] up to date.
///
/// Every failure is stored in the collection and returned to the caller;
/// nothing is retried. After a successful write the list is fetched again so
/// the cache matches the server.
pub struct ResourceStore<R> {
    client: ResourceClient<R>,
    inner: Arc<RwLock<StoreInner<R>>>,
}

impl<R> Clone for ResourceStore<R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: Resource> ResourceStore<R> {
    pub fn new(client: ResourceClient<R>) -> Self {
        Self {
            client,
            inner: Arc::new(RwLock::new(StoreInner {
                scope: None,
                state: CollectionState::new(),
            })),
        }
    }

    /// Copy of the current collection.
    pub async fn snapshot(&self) -> CollectionState<R> {
        self.inner.read().await.state.clone()
    }

    pub async fn scope(&self) -> Option<Scope> {
        self.inner.read().await.scope.clone()
    }

    /// Switch the active scope. A different scope clears the collection.
    pub async fn set_scope(&self, scope: Option<Scope>) {
        let mut inner = self.inner.write().await;
        if inner.scope != scope {
            inner.state.reset();
            inner.scope = scope;
        }
    }

    /// Clear the collection, keeping the scope.
    pub async fn reset(&self) {
        self.inner.write().await.state.reset();
    }

    /// Take the stored error message for display.
    pub async fn take_error(&self) -> Option<String> {
        self.inner.write().await.state.take_error()
    }

    /// Fetch the list for the active scope.
    pub async fn fetch(&self) -> Result<Vec<Record<R>>, ClientError> {
        let (scope, generation) = self.begin().await?;
        self.fetch_in(&scope, generation).await
    }

    /// Create a record, then refresh the list.
    pub async fn create(&self, fields: R) -> Result<Record<R>, ClientError> {
        let (scope, generation) = self.begin().await?;

        let record = match self.client.create(&scope, &fields).await {
            Ok(record) => record,
            Err(err) => return Err(self.fail(generation, err).await),
        };
        self.inner
            .write()
            .await
            .state
            .created(generation, record.clone());

        self.refetch(&scope).await;
        Ok(record)
    }

    /// Replace the fields of record `id`, then refresh the list.
    pub async fn update(&self, id: &str, fields: R) -> Result<Record<R>, ClientError> {
        let (scope, generation) = self.begin().await?;

        let record = match self.client.update(&scope, id, &fields).await {
            Ok(record) => record,
            Err(err) => return Err(self.fail(generation, err).await),
        };
        self.inner
            .write()
            .await
            .state
            .updated(generation, record.clone());

        self.refetch(&scope).await;
        Ok(record)
    }

    /// Delete record `id`, then refresh the list.
    pub async fn delete(&self, id: &str) -> Result<(), ClientError> {
        let (scope, generation) = self.begin().await?;

        if let Err(err) = self.client.delete(&scope, id).await {
            return Err(self.fail(generation, err).await);
        }
        self.inner.write().await.state.deleted(generation, id);

        self.refetch(&scope).await;
        Ok(())
    }

    /// Move the collection to pending. Without an active scope the request
    /// fails immediately and nothing is sent.
    async fn begin(&self) -> Result<(Scope, Generation), ClientError> {
        let mut inner = self.inner.write().await;
        let generation = inner.state.request();
        match inner.scope.clone() {
            Some(scope) => Ok((scope, generation)),
            None => {
                let err = ClientError::Validation(NO_SCOPE_MESSAGE.to_string());
                inner.state.failed(generation, err.to_string());
                Err(err)
            }
        }
    }

    async fn fetch_in(
        &self,
        scope: &Scope,
        generation: Generation,
    ) -> Result<Vec<Record<R>>, ClientError> {
        match self.client.list(scope).await {
            Ok(records) => {
                self.inner
                    .write()
                    .await
                    .state
                    .listed(generation, records.clone());
                Ok(records)
            }
            Err(err) => Err(self.fail(generation, err).await),
        }
    }

    /// Refresh after a successful write. A failed refresh is recorded in the
    /// collection; the write itself still succeeded.
    async fn refetch(&self, scope: &Scope) {
        let generation = {
            let mut inner = self.inner.write().await;
            if inner.scope.as_ref() != Some(scope) {
                return;
            }
            inner.state.request()
        };

        if let Err(err) = self.fetch_in(scope, generation).await {
            tracing::warn!(kind = R::KIND, "Refresh after write failed: {}", err);
        }
    }

    async fn fail(&self, generation: Generation, err: ClientError) -> ClientError {
        tracing::debug!(kind = R::KIND, "Request failed: {}", err);
        self.inner
            .write()
            .await
            .state
            .failed(generation, err.to_string());
        err
    }
}

/// Application state of a client: one store per resource kind, all sharing
/// the active scope.
pub struct Session {
    pub teachers: ResourceStore<Teacher>,
    pub stock_items: ResourceStore<StockItem>,
    pub divisions: ResourceStore<Division>,
    pub discounts: ResourceStore<Discount>,
    pub visitors: ResourceStore<Visitor>,
    pub categories: ResourceStore<Category>,
    pub reasons: ResourceStore<Reason>,
    pub houses: ResourceStore<House>,
}

impl Session {
    /// Create a session against the server at `base_url`, with no scope selected.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base = Url::parse(base_url).map_err(|e| {
            ClientError::Validation(format!("Invalid server URL {:?}: {}", base_url, e))
        })?;
        let http = reqwest::Client::builder().build()?;

        Ok(Self {
            teachers: store(&http, &base)?,
            stock_items: store(&http, &base)?,
            divisions: store(&http, &base)?,
            discounts: store(&http, &base)?,
            visitors: store(&http, &base)?,
            categories: store(&http, &base)?,
            reasons: store(&http, &base)?,
            houses: store(&http, &base)?,
        })
    }

    /// Switch every store to `scope`, clearing their collections.
    pub async fn set_scope(&self, scope: Option<Scope>) {
        self.teachers.set_scope(scope.clone()).await;
        self.stock_items.set_scope(scope.clone()).await;
        self.divisions.set_scope(scope.clone()).await;
        self.discounts.set_scope(scope.clone()).await;
        self.visitors.set_scope(scope.clone()).await;
        self.categories.set_scope(scope.clone()).await;
        self.reasons.set_scope(scope.clone()).await;
        self.houses.set_scope(scope).await;
    }

    /// Tear down: clear the scope and every cached collection.
    pub async fn dispose(&self) {
        self.set_scope(None).await;
    }
}

fn store<R: Resource>(http: &reqwest::Client, base: &Url) -> Result<ResourceStore<R>, ClientError> {
    Ok(ResourceStore::new(ResourceClient::new(
        http.clone(),
        base.clone(),
    )?))
}
