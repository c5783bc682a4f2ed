//! Transport-neutral request handling for serverless and gateway style callers.
//!
//! A gateway event is normalized into an [`ApiRequest`], dispatched against the
//! service, and answered with an [`ApiResponse`] whose body is a JSON string.
//! Error bodies are `{"error": "<message>"}`.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::{BTreeMap, HashMap};

use super::payload::{SearchQueryParams, SearchResponse, StoreVectorRequest, StoreVectorResponse};
use crate::error::VectorError;
use crate::models::StoreOutcome;
use crate::repository::{MetadataRepository, VectorIndexRepository};
use crate::service::VectorService;

pub const INVALID_JSON: &str = "Invalid JSON in request body";
pub const STORE_FAILED: &str = "Failed to store vector";
pub const INTERNAL_ERROR: &str = "Internal server error";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Store,
    Search,
    Get,
    Repair,
    Unsupported(String),
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub operation: Operation,
    /// Path parameter for get and repair
    pub id: Option<String>,
    /// Raw JSON body for store
    pub body: Option<String>,
    /// Query-string parameters for search
    pub query: HashMap<String, String>,
}

impl ApiRequest {
    /// Routes by verb: POST stores (or repairs when an id is present), GET
    /// searches without an id and fetches with one.
    pub fn from_gateway(
        method: &str,
        path_id: Option<String>,
        body: Option<String>,
        query: HashMap<String, String>,
    ) -> Self {
        let operation = match (method.to_ascii_uppercase().as_str(), &path_id) {
            ("POST", None) => Operation::Store,
            ("POST", Some(_)) => Operation::Repair,
            ("GET", None) => Operation::Search,
            ("GET", Some(_)) => Operation::Get,
            (other, _) => Operation::Unsupported(other.to_string()),
        };

        Self {
            operation,
            id: path_id,
            body,
            query,
        }
    }
}

/// API gateway proxy event; only the fields used for routing are read.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayEvent {
    pub http_method: Option<String>,
    pub body: Option<String>,
    pub query_string_parameters: Option<HashMap<String, String>>,
    pub path_parameters: Option<HashMap<String, String>>,
}

impl From<GatewayEvent> for ApiRequest {
    fn from(event: GatewayEvent) -> Self {
        let method = event.http_method.unwrap_or_else(|| "GET".to_string());
        let id = event.path_parameters.and_then(|mut p| p.remove("id"));
        ApiRequest::from_gateway(
            &method,
            id,
            event.body,
            event.query_string_parameters.unwrap_or_default(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status_code: u16, body: &Value) -> Self {
        Self {
            status_code,
            headers: cors_headers(),
            body: body.to_string(),
        }
    }

    pub fn error(status_code: u16, message: impl Into<String>) -> Self {
        Self::new(status_code, &json!({ "error": message.into() }))
    }

    fn from_vector_error(err: &VectorError) -> Self {
        if !matches!(err, VectorError::Validation(_) | VectorError::NotFound(_)) {
            tracing::error!(error = %err, "Request failed");
        }
        Self::error(err.status_code().as_u16(), err.public_message())
    }

    /// Parsed body; `Value::Null` if it is not JSON.
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }
}

fn cors_headers() -> BTreeMap<String, String> {
    [
        ("Content-Type", "application/json"),
        ("Access-Control-Allow-Origin", "*"),
        ("Access-Control-Allow-Headers", "Content-Type"),
        ("Access-Control-Allow-Methods", "GET,POST,OPTIONS"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn to_json<T: Serialize>(value: &T) -> ApiResponse {
    match serde_json::to_value(value) {
        Ok(body) => ApiResponse::new(200, &body),
        Err(err) => {
            tracing::error!(error = %err, "Failed to serialize response");
            ApiResponse::error(500, INTERNAL_ERROR)
        }
    }
}

/// Dispatches one request. Never fails; every error becomes a response.
pub async fn handle<I, M>(service: &VectorService<I, M>, request: ApiRequest) -> ApiResponse
where
    I: VectorIndexRepository,
    M: MetadataRepository,
{
    let ApiRequest {
        operation,
        id,
        body,
        query,
    } = request;

    match operation {
        Operation::Store => store(service, body).await,
        Operation::Search => search(service, query).await,
        Operation::Get => match id {
            Some(id) => match service.get(&id).await {
                Ok(record) => to_json(&record),
                Err(err) => ApiResponse::from_vector_error(&err),
            },
            None => ApiResponse::error(400, "Missing required parameter: id"),
        },
        Operation::Repair => match id {
            Some(id) => match service.repair_metadata(&id).await {
                Ok(record) => to_json(&record),
                Err(err) => ApiResponse::from_vector_error(&err),
            },
            None => ApiResponse::error(400, "Missing required parameter: id"),
        },
        Operation::Unsupported(method) => {
            ApiResponse::error(405, format!("Method {} not allowed", method))
        }
    }
}

async fn store<I, M>(service: &VectorService<I, M>, body: Option<String>) -> ApiResponse
where
    I: VectorIndexRepository,
    M: MetadataRepository,
{
    let body = body.unwrap_or_else(|| "{}".to_string());
    let request: StoreVectorRequest = match serde_json::from_str(&body) {
        Ok(request) => request,
        Err(_) => return ApiResponse::error(400, INVALID_JSON),
    };

    let record = match request.into_record() {
        Ok(record) => record,
        Err(err) => return ApiResponse::from_vector_error(&err),
    };
    let id = record.id.clone();

    match service.store(record).await {
        Ok(StoreOutcome::Stored) => to_json(&StoreVectorResponse::stored(id)),
        Ok(StoreOutcome::PartiallyStored { .. } | StoreOutcome::Rejected) => {
            ApiResponse::error(500, STORE_FAILED)
        }
        Err(err) => ApiResponse::from_vector_error(&err),
    }
}

async fn search<I, M>(service: &VectorService<I, M>, mut query: HashMap<String, String>) -> ApiResponse
where
    I: VectorIndexRepository,
    M: MetadataRepository,
{
    let params = SearchQueryParams {
        embedding: query.remove("vector").or_else(|| query.remove("embedding")),
        k: query.remove("k"),
    };

    let request = match params.into_request() {
        Ok(request) => request,
        Err(err) => return ApiResponse::from_vector_error(&err),
    };

    match service.search(request).await {
        Ok(results) => to_json(&SearchResponse { results }),
        Err(err) => ApiResponse::from_vector_error(&err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{InMemoryMetadataStore, InMemoryVectorIndex};

    fn service() -> (
        VectorService<InMemoryVectorIndex, InMemoryMetadataStore>,
        InMemoryVectorIndex,
        InMemoryMetadataStore,
    ) {
        let index = InMemoryVectorIndex::new(3);
        let metadata = InMemoryMetadataStore::new();
        (
            VectorService::new(index.clone(), metadata.clone()),
            index,
            metadata,
        )
    }

    fn post(body: &str) -> ApiRequest {
        ApiRequest::from_gateway("POST", None, Some(body.to_string()), HashMap::new())
    }

    fn search_query(pairs: &[(&str, &str)]) -> ApiRequest {
        let query = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiRequest::from_gateway("GET", None, None, query)
    }

    #[test]
    fn test_from_gateway_routing() {
        let route = |method: &str, id: Option<&str>| {
            ApiRequest::from_gateway(method, id.map(str::to_string), None, HashMap::new()).operation
        };

        assert_eq!(route("POST", None), Operation::Store);
        assert_eq!(route("post", Some("v1")), Operation::Repair);
        assert_eq!(route("GET", None), Operation::Search);
        assert_eq!(route("GET", Some("v1")), Operation::Get);
        assert_eq!(route("DELETE", None), Operation::Unsupported("DELETE".to_string()));
    }

    #[test]
    fn test_gateway_event_deserializes() {
        let event: GatewayEvent = serde_json::from_value(json!({
            "httpMethod": "GET",
            "queryStringParameters": {"vector": "[0.1,0.2,0.3]", "k": "1"},
            "pathParameters": null
        }))
        .unwrap();

        let request = ApiRequest::from(event);
        assert_eq!(request.operation, Operation::Search);
        assert_eq!(request.query.get("k").map(String::as_str), Some("1"));
    }

    #[tokio::test]
    async fn test_store_then_search_end_to_end() {
        let (service, _, _) = service();

        let response = handle(
            &service,
            post(r#"{"id": "v1", "vector": [0.1, 0.2, 0.3], "metadata": {"title": "Doc"}}"#),
        )
        .await;
        assert_eq!(response.status_code, 200);
        assert_eq!(
            response.json(),
            json!({"id": "v1", "message": "Vector stored successfully"})
        );

        let response = handle(&service, search_query(&[("vector", "[0.1,0.2,0.3]"), ("k", "1")])).await;
        assert_eq!(response.status_code, 200);
        let results = response.json()["results"].clone();
        assert_eq!(results[0]["id"], "v1");
        assert_eq!(results[0]["metadata"], json!({"title": "Doc"}));
        assert!((results[0]["score"].as_f64().unwrap() - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_headers_are_fixed_cors_set() {
        let (service, _, _) = service();
        let response = handle(&service, post("{not json")).await;

        assert_eq!(response.status_code, 400);
        assert_eq!(response.json(), json!({"error": INVALID_JSON}));
        assert_eq!(response.headers["Access-Control-Allow-Origin"], "*");
        assert_eq!(response.headers["Access-Control-Allow-Methods"], "GET,POST,OPTIONS");
        assert_eq!(response.headers["Content-Type"], "application/json");
    }

    #[tokio::test]
    async fn test_store_missing_fields() {
        let (service, _, _) = service();
        let response = handle(&service, post(r#"{"id": "v1"}"#)).await;

        assert_eq!(response.status_code, 400);
        assert_eq!(
            response.json(),
            json!({"error": "Missing required fields: id and vector"})
        );
    }

    #[tokio::test]
    async fn test_store_failures_report_generic_message() {
        let (service, index, metadata) = service();

        metadata.set_available(false);
        let response = handle(&service, post(r#"{"id": "v1", "vector": [1, 0, 0]}"#)).await;
        assert_eq!(response.status_code, 500);
        assert_eq!(response.json(), json!({"error": STORE_FAILED}));

        index.set_available(false);
        let response = handle(&service, post(r#"{"id": "v2", "vector": [1, 0, 0]}"#)).await;
        assert_eq!(response.status_code, 500);
        assert_eq!(response.json(), json!({"error": STORE_FAILED}));
    }

    #[tokio::test]
    async fn test_search_parameter_errors() {
        let (service, _, _) = service();

        let response = handle(&service, search_query(&[])).await;
        assert_eq!(response.status_code, 400);
        assert_eq!(response.json(), json!({"error": "Missing required parameter: vector"}));

        let response = handle(&service, search_query(&[("vector", "[0.1"), ("k", "2")])).await;
        assert_eq!(response.json(), json!({"error": "Invalid vector format or k parameter"}));

        let response = handle(&service, search_query(&[("vector", "[0.1,0.2,0.3]"), ("k", "0")])).await;
        assert_eq!(response.status_code, 400);
        assert_eq!(response.json(), json!({"error": "k must be between 1 and 100"}));
    }

    #[tokio::test]
    async fn test_search_with_index_down_is_empty_success() {
        let (service, index, _) = service();
        index.set_available(false);

        let response = handle(&service, search_query(&[("vector", "[0.1,0.2,0.3]")])).await;
        assert_eq!(response.status_code, 200);
        assert_eq!(response.json(), json!({"results": []}));
    }

    #[tokio::test]
    async fn test_get_and_not_found() {
        let (service, _, _) = service();
        handle(&service, post(r#"{"id": "v1", "embedding": [0.1, 0.2, 0.3]}"#)).await;

        let get = |id: &str| ApiRequest::from_gateway("GET", Some(id.to_string()), None, HashMap::new());

        let response = handle(&service, get("v1")).await;
        assert_eq!(response.status_code, 200);
        assert_eq!(response.json()["id"], "v1");

        let response = handle(&service, get("missing")).await;
        assert_eq!(response.status_code, 404);
        assert_eq!(response.json(), json!({"error": "Vector 'missing' not found"}));
    }

    #[tokio::test]
    async fn test_unsupported_method() {
        let (service, _, _) = service();
        let response = handle(
            &service,
            ApiRequest::from_gateway("PUT", None, None, HashMap::new()),
        )
        .await;

        assert_eq!(response.status_code, 405);
        assert_eq!(response.json(), json!({"error": "Method PUT not allowed"}));
    }
}
