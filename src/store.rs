//! Collection and document CRUD passthrough.
//!
//! [`StoreClient`] forwards create/read/update/delete operations for
//! collections and documents to the remote API. Payloads and results are
//! dynamic JSON — the backend owns the schema.

use std::sync::Arc;

use crate::error::ClientResult;
use crate::http::HttpClient;

/// Nesting scope for collection operations.
///
/// Collections may live under a parent collection/document pair; the
/// default scope addresses top-level collections.
#[derive(Debug, Clone, Default)]
pub struct CollectionScope {
    /// Parent collection id for nested collections.
    pub parent_collection_id: Option<String>,
    /// Parent document id for nested collections.
    pub parent_document_id: Option<String>,
}

impl CollectionScope {
    fn query_pairs(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(id) = &self.parent_collection_id {
            query.push(("parent_collection_id".to_string(), id.clone()));
        }
        if let Some(id) = &self.parent_document_id {
            query.push(("parent_document_id".to_string(), id.clone()));
        }
        query
    }
}

/// Read options for a single document fetch.
///
/// When `firestore_format` is set, the backend renders the document in
/// Firestore's wire format; `project_id` and `database_id` qualify the
/// rendered resource names.
#[derive(Debug, Clone, Default)]
pub struct DocumentQuery {
    /// Request the Firestore wire format rendering.
    pub firestore_format: bool,
    /// Project id for the rendered resource name.
    pub project_id: Option<String>,
    /// Database id for the rendered resource name.
    pub database_id: Option<String>,
}

/// Client for the collection/document REST surface.
#[derive(Debug, Clone)]
pub struct StoreClient {
    http: Arc<HttpClient>,
}

impl StoreClient {
    /// Creates a store client sharing the given HTTP client.
    #[must_use]
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    /// Creates a collection, optionally nested under a parent.
    ///
    /// # Errors
    ///
    /// [`crate::error::ClientError::Http`] on a failure status,
    /// [`crate::error::ClientError::Transport`] on a transport fault.
    pub async fn create_collection(
        &self,
        name: &str,
        scope: &CollectionScope,
    ) -> ClientResult<serde_json::Value> {
        let mut payload = serde_json::json!({ "name": name });
        if let Some(id) = &scope.parent_collection_id {
            payload_insert(&mut payload, "parent_collection_id", id);
        }
        if let Some(id) = &scope.parent_document_id {
            payload_insert(&mut payload, "parent_document_id", id);
        }

        let response = match self.http.post("/api/collections", payload).await {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(name, %err, "failed to create collection");
                return Err(err);
            }
        };

        tracing::info!(
            name,
            collection_id = %response.data.get("id").cloned().unwrap_or_default(),
            "collection created"
        );
        Ok(response.data)
    }

    /// Lists collections in a scope. Returns the `collections` array,
    /// empty when the response omits it.
    ///
    /// # Errors
    ///
    /// [`crate::error::ClientError::Http`] on a failure status,
    /// [`crate::error::ClientError::Transport`] on a transport fault.
    pub async fn collections(
        &self,
        scope: &CollectionScope,
    ) -> ClientResult<Vec<serde_json::Value>> {
        let response = self.http.get("/api/collections", scope.query_pairs()).await?;
        let collections = response
            .data
            .get("collections")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();
        Ok(collections)
    }

    /// Fetches a single collection by id.
    ///
    /// # Errors
    ///
    /// [`crate::error::ClientError::Http`] on a failure status,
    /// [`crate::error::ClientError::Transport`] on a transport fault.
    pub async fn collection(&self, collection_id: &str) -> ClientResult<serde_json::Value> {
        let response = self
            .http
            .get(&format!("/api/collections/{collection_id}"), Vec::new())
            .await?;
        Ok(response.data)
    }

    /// Deletes a collection.
    ///
    /// # Errors
    ///
    /// [`crate::error::ClientError::Http`] on a failure status,
    /// [`crate::error::ClientError::Transport`] on a transport fault.
    pub async fn delete_collection(&self, collection_id: &str) -> ClientResult<serde_json::Value> {
        let response = match self
            .http
            .delete(&format!("/api/collections/{collection_id}"))
            .await
        {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(collection_id, %err, "failed to delete collection");
                return Err(err);
            }
        };

        tracing::info!(collection_id, "collection deleted");
        Ok(response.data)
    }

    /// Creates a document in a collection, with an optional
    /// caller-chosen document id.
    ///
    /// # Errors
    ///
    /// [`crate::error::ClientError::Http`] on a failure status,
    /// [`crate::error::ClientError::Transport`] on a transport fault.
    pub async fn create_document(
        &self,
        collection_id: &str,
        data: serde_json::Value,
        document_id: Option<&str>,
    ) -> ClientResult<serde_json::Value> {
        let mut payload = serde_json::json!({ "data": data });
        if let Some(id) = document_id {
            payload_insert(&mut payload, "document_id", id);
        }

        let response = match self
            .http
            .post(&format!("/api/collections/{collection_id}/documents"), payload)
            .await
        {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(collection_id, document_id, %err, "failed to create document");
                return Err(err);
            }
        };

        tracing::info!(
            collection_id,
            document_id = %response.data.get("document_id").cloned().unwrap_or_default(),
            "document created"
        );
        Ok(response.data)
    }

    /// Lists documents in a collection, paginated.
    ///
    /// # Errors
    ///
    /// [`crate::error::ClientError::Http`] on a failure status,
    /// [`crate::error::ClientError::Transport`] on a transport fault.
    pub async fn documents(
        &self,
        collection_id: &str,
        page: u32,
        limit: u32,
    ) -> ClientResult<serde_json::Value> {
        let query = vec![
            ("page".to_string(), page.to_string()),
            ("limit".to_string(), limit.to_string()),
        ];
        let response = self
            .http
            .get(&format!("/api/collections/{collection_id}/documents"), query)
            .await?;
        Ok(response.data)
    }

    /// Fetches a single document.
    ///
    /// # Errors
    ///
    /// [`crate::error::ClientError::Http`] on a failure status,
    /// [`crate::error::ClientError::Transport`] on a transport fault.
    pub async fn document(
        &self,
        collection_id: &str,
        document_id: &str,
        query: &DocumentQuery,
    ) -> ClientResult<serde_json::Value> {
        let mut pairs = Vec::new();
        if query.firestore_format {
            pairs.push(("format".to_string(), "firestore".to_string()));
            if let Some(id) = &query.project_id {
                pairs.push(("project_id".to_string(), id.clone()));
            }
            if let Some(id) = &query.database_id {
                pairs.push(("database_id".to_string(), id.clone()));
            }
        }

        let response = self
            .http
            .get(
                &format!("/api/collections/{collection_id}/documents/{document_id}"),
                pairs,
            )
            .await?;
        Ok(response.data)
    }

    /// Replaces a document's data.
    ///
    /// # Errors
    ///
    /// [`crate::error::ClientError::Http`] on a failure status,
    /// [`crate::error::ClientError::Transport`] on a transport fault.
    pub async fn update_document(
        &self,
        collection_id: &str,
        document_id: &str,
        data: serde_json::Value,
    ) -> ClientResult<serde_json::Value> {
        let response = match self
            .http
            .put(
                &format!("/api/collections/{collection_id}/documents/{document_id}"),
                serde_json::json!({ "data": data }),
            )
            .await
        {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(collection_id, document_id, %err, "failed to update document");
                return Err(err);
            }
        };

        tracing::info!(collection_id, document_id, "document updated");
        Ok(response.data)
    }

    /// Deletes a document.
    ///
    /// # Errors
    ///
    /// [`crate::error::ClientError::Http`] on a failure status,
    /// [`crate::error::ClientError::Transport`] on a transport fault.
    pub async fn delete_document(
        &self,
        collection_id: &str,
        document_id: &str,
    ) -> ClientResult<serde_json::Value> {
        let response = match self
            .http
            .delete(&format!(
                "/api/collections/{collection_id}/documents/{document_id}"
            ))
            .await
        {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(collection_id, document_id, %err, "failed to delete document");
                return Err(err);
            }
        };

        tracing::info!(collection_id, document_id, "document deleted");
        Ok(response.data)
    }
}

/// Inserts a string field into a JSON object payload.
fn payload_insert(payload: &mut serde_json::Value, key: &str, value: &str) {
    if let Some(map) = payload.as_object_mut() {
        map.insert(key.to_string(), serde_json::Value::String(value.to_string()));
    }
}
