// Remote repository: forwards the CRUD contract to an HTTP record backend

use super::{Operation, Repository};
use crate::errors::{
    ApiError, FieldError, RepositoryError, ValidationError, CODE_NOT_FOUND, CODE_VALIDATION,
};
use crate::models::{Record, RecordId};
use crate::telemetry::observe;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::marker::PhantomData;
use tracing::{debug, error, instrument};

/// Success envelope used by the backend: `{"data": ...}`
#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

/// Repository backed by `{base_url}/{collection}` endpoints.
///
/// Backend failures are translated into the repository contract:
/// 404 / `not_found` becomes `NotFound`, 400 / 422 / `validation_error`
/// becomes `Validation` with the per-field details, anything else
/// (including connectivity problems) becomes `Transport`.
pub struct RemoteRepository<R: Record> {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> Clone for RemoteRepository<R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            _record: PhantomData,
        }
    }
}

impl<R: Record> RemoteRepository<R> {
    pub fn new(client: Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            _record: PhantomData,
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.base_url, R::COLLECTION)
    }

    fn record_url(&self, id: RecordId) -> String {
        format!("{}/{}/{}", self.base_url, R::COLLECTION, id)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, RepositoryError> {
        let request = match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        };

        request.send().await.map_err(|e| {
            error!(error = %e, entity = R::ENTITY, "Record backend request failed");
            RepositoryError::Transport(format!("HTTP request failed: {}", e))
        })
    }

    /// Decode a success envelope or translate the failure payload.
    /// `id` is the record the request addressed, if any.
    async fn decode<T: DeserializeOwned>(
        &self,
        response: Response,
        id: Option<RecordId>,
    ) -> Result<T, RepositoryError> {
        let status = response.status();

        if status.is_success() {
            let envelope: DataEnvelope<T> = response.json().await.map_err(|e| {
                error!(error = %e, entity = R::ENTITY, "Failed to decode backend response");
                RepositoryError::Transport(format!("Failed to decode response: {}", e))
            })?;
            return Ok(envelope.data);
        }

        let body = response.text().await.unwrap_or_default();
        let api_error = serde_json::from_str::<ApiError>(&body).ok();
        Err(translate_failure::<R>(status, api_error, &body, id))
    }
}

fn translate_failure<R: Record>(
    status: StatusCode,
    api_error: Option<ApiError>,
    body: &str,
    id: Option<RecordId>,
) -> RepositoryError {
    let code = api_error.as_ref().map(|e| e.error.as_str());

    let is_not_found = status == StatusCode::NOT_FOUND || code == Some(CODE_NOT_FOUND);
    if let (true, Some(id)) = (is_not_found, id) {
        return RepositoryError::not_found(R::ENTITY, id);
    }

    let is_validation = matches!(
        status,
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY
    ) || code == Some(CODE_VALIDATION);
    if is_validation {
        let fields = match &api_error {
            Some(api_error) => {
                let fields = api_error.field_errors();
                if fields.is_empty() {
                    vec![FieldError::new("request", api_error.message.clone())]
                } else {
                    fields
                }
            }
            None => vec![FieldError::new("request", body.to_string())],
        };
        return ValidationError::Fields(fields).into();
    }

    let message = api_error
        .map(|e| e.message)
        .unwrap_or_else(|| body.to_string());
    error!(
        status = %status,
        entity = R::ENTITY,
        message = %message,
        "Record backend returned an error"
    );
    RepositoryError::Transport(format!("Backend returned {}: {}", status, message))
}

#[async_trait]
impl<R: Record> Repository<R> for RemoteRepository<R> {
    #[instrument(skip(self), fields(entity = R::ENTITY))]
    async fn list(&self) -> Result<Vec<R>, RepositoryError> {
        observe(R::ENTITY, Operation::List, async {
            let response = self.send(self.client.get(self.collection_url())).await?;
            let records: Vec<R> = self.decode(response, None).await?;
            debug!(count = records.len(), "Listed remote records");
            Ok(records)
        })
        .await
    }

    #[instrument(skip(self), fields(entity = R::ENTITY))]
    async fn get_by_id(&self, id: RecordId) -> Result<R, RepositoryError> {
        observe(R::ENTITY, Operation::Get, async {
            let response = self.send(self.client.get(self.record_url(id))).await?;
            self.decode(response, Some(id)).await
        })
        .await
    }

    #[instrument(skip(self, patch), fields(entity = R::ENTITY))]
    async fn create(&self, patch: R::Patch) -> Result<R, RepositoryError> {
        observe(R::ENTITY, Operation::Create, async move {
            let request = self.client.post(self.collection_url()).json(&patch);
            let response = self.send(request).await?;
            self.decode(response, None).await
        })
        .await
    }

    #[instrument(skip(self, patch), fields(entity = R::ENTITY))]
    async fn update(&self, id: RecordId, patch: R::Patch) -> Result<R, RepositoryError> {
        observe(R::ENTITY, Operation::Update, async move {
            let request = self.client.put(self.record_url(id)).json(&patch);
            let response = self.send(request).await?;
            let record: R = self.decode(response, Some(id)).await?;
            if record.id() != id {
                return Err(RepositoryError::Transport(format!(
                    "Backend changed {} id from {} to {}",
                    R::ENTITY,
                    id,
                    record.id()
                )));
            }
            Ok(record)
        })
        .await
    }

    #[instrument(skip(self), fields(entity = R::ENTITY))]
    async fn delete(&self, id: RecordId) -> Result<R, RepositoryError> {
        observe(R::ENTITY, Operation::Delete, async {
            let response = self.send(self.client.delete(self.record_url(id))).await?;
            self.decode(response, Some(id)).await
        })
        .await
    }
}
