//! Athena `StartQueryExecution` over the JSON 1.1 protocol
//!
//! Submission only. The returned execution id is not polled; the statement
//! runs asynchronously on the Athena side.

use crate::aws::AwsSigV4HttpClient;
use crate::error::CatalogError;
use crate::http::HttpClient;
use async_trait::async_trait;
use plclog_config::CatalogConfig;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

const SIGNING_SERVICE: &str = "athena";
const TARGET_START_QUERY: &str = "AmazonAthena.StartQueryExecution";
const CONTENT_TYPE: &str = "application/x-amz-json-1.1";

/// Identifier the query service assigned to an accepted statement
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmittedQueryId(String);

impl SubmittedQueryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubmittedQueryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Catalog-query submission capability
#[async_trait]
pub trait QueryEngine: Send + Sync {
    async fn submit_query(
        &self,
        statement: &str,
        database: &str,
        output_location: &str,
    ) -> Result<SubmittedQueryId, CatalogError>;
}

#[async_trait]
impl<T: QueryEngine + ?Sized> QueryEngine for &T {
    async fn submit_query(
        &self,
        statement: &str,
        database: &str,
        output_location: &str,
    ) -> Result<SubmittedQueryId, CatalogError> {
        (**self)
            .submit_query(statement, database, output_location)
            .await
    }
}

#[async_trait]
impl<T: QueryEngine + ?Sized> QueryEngine for Arc<T> {
    async fn submit_query(
        &self,
        statement: &str,
        database: &str,
        output_location: &str,
    ) -> Result<SubmittedQueryId, CatalogError> {
        (**self)
            .submit_query(statement, database, output_location)
            .await
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct StartQueryExecutionRequest<'a> {
    query_string: &'a str,
    query_execution_context: QueryExecutionContext<'a>,
    result_configuration: ResultConfiguration<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    work_group: Option<&'a str>,
    client_request_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct QueryExecutionContext<'a> {
    database: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ResultConfiguration<'a> {
    output_location: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StartQueryExecutionResponse {
    query_execution_id: String,
}

#[derive(Deserialize, Default)]
struct AwsErrorBody {
    #[serde(rename = "__type")]
    error_type: Option<String>,
    #[serde(alias = "message", rename = "Message")]
    message: Option<String>,
}

pub struct AthenaQueryClient {
    http: Arc<dyn HttpClient>,
    endpoint: String,
    workgroup: Option<String>,
}

impl AthenaQueryClient {
    pub fn new(http: Arc<dyn HttpClient>, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            workgroup: None,
        }
    }

    pub fn with_workgroup(mut self, workgroup: Option<String>) -> Self {
        self.workgroup = workgroup;
        self
    }

    /// Signed client for the configured region (or endpoint override)
    pub async fn from_config(config: &CatalogConfig) -> anyhow::Result<Self> {
        let http = AwsSigV4HttpClient::new(&config.region, SIGNING_SERVICE).await?;
        let endpoint = config
            .endpoint
            .clone()
            .unwrap_or_else(|| regional_endpoint(&config.region));
        Ok(Self::new(Arc::new(http), endpoint).with_workgroup(config.workgroup.clone()))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

pub fn regional_endpoint(region: &str) -> String {
    format!("https://athena.{}.amazonaws.com", region)
}

#[async_trait]
impl QueryEngine for AthenaQueryClient {
    #[instrument(skip(self, statement), fields(endpoint = %self.endpoint))]
    async fn submit_query(
        &self,
        statement: &str,
        database: &str,
        output_location: &str,
    ) -> Result<SubmittedQueryId, CatalogError> {
        let request = StartQueryExecutionRequest {
            query_string: statement,
            query_execution_context: QueryExecutionContext { database },
            result_configuration: ResultConfiguration { output_location },
            work_group: self.workgroup.as_deref(),
            client_request_token: uuid::Uuid::new_v4().to_string(),
        };
        let body = serde_json::to_vec(&request)
            .map_err(|e| CatalogError::InvalidResponse(format!("request encoding: {}", e)))?;

        let headers = vec![
            ("content-type".to_string(), CONTENT_TYPE.to_string()),
            ("x-amz-target".to_string(), TARGET_START_QUERY.to_string()),
        ];
        let url = format!("{}/", self.endpoint.trim_end_matches('/'));

        let response = self
            .http
            .post(&url, headers, body)
            .await
            .map_err(CatalogError::Transport)?;

        if !response.is_success() {
            let error: AwsErrorBody = response.json().unwrap_or_default();
            let message = error.message.unwrap_or_else(|| response.body_string());
            return Err(CatalogError::rejected(
                response.status,
                error.error_type.as_deref(),
                message,
            ));
        }

        let accepted: StartQueryExecutionResponse = response
            .json()
            .map_err(|e| CatalogError::InvalidResponse(format!("{:#}", e)))?;
        debug!(query_execution_id = %accepted.query_execution_id, "Query accepted");
        Ok(SubmittedQueryId(accepted.query_execution_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::ReqwestHttpClient;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer) -> AthenaQueryClient {
        let http = Arc::new(ReqwestHttpClient::new().unwrap());
        AthenaQueryClient::new(http, server.base_url())
    }

    #[tokio::test]
    async fn test_submit_returns_execution_id() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/")
                    .header("x-amz-target", TARGET_START_QUERY)
                    .header("content-type", CONTENT_TYPE)
                    .body_contains(r#""Database":"plc_analytics""#)
                    .body_contains(r#""OutputLocation":"s3://results/""#)
                    .body_contains("ClientRequestToken");
                then.status(200)
                    .json_body(json!({ "QueryExecutionId": "qe-123" }));
            })
            .await;

        let id = client_for(&server)
            .submit_query("SELECT 1", "plc_analytics", "s3://results/")
            .await
            .unwrap();

        assert_eq!(id.as_str(), "qe-123");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_workgroup_is_sent_when_configured() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).body_contains(r#""WorkGroup":"plc""#);
                then.status(200)
                    .json_body(json!({ "QueryExecutionId": "qe-wg" }));
            })
            .await;

        let client = client_for(&server).with_workgroup(Some("plc".into()));
        client.submit_query("SELECT 1", "db", "s3://r/").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rejection_is_surfaced() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(400).json_body(json!({
                    "__type": "InvalidRequestException",
                    "Message": "line 1:13: mismatched input"
                }));
            })
            .await;

        let err = client_for(&server)
            .submit_query("ALTER TABLE", "db", "s3://r/")
            .await
            .unwrap_err();

        match err {
            CatalogError::Rejected {
                status,
                error_type,
                message,
            } => {
                assert_eq!(status, 400);
                assert_eq!(error_type, "InvalidRequestException");
                assert!(message.contains("mismatched input"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transport_error() {
        let http = Arc::new(ReqwestHttpClient::new().unwrap());
        let client = AthenaQueryClient::new(http, "http://127.0.0.1:1");
        let err = client.submit_query("SELECT 1", "db", "s3://r/").await.unwrap_err();
        assert!(matches!(err, CatalogError::Transport(_)));
    }

    #[test]
    fn test_regional_endpoint() {
        assert_eq!(
            regional_endpoint("eu-west-1"),
            "https://athena.eu-west-1.amazonaws.com"
        );
    }
}
