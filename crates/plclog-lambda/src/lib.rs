// AWS Lambda adapter for the partition registrar
//
// Triggered by S3 ObjectCreated notifications on the log bucket. Each
// invocation submits an `ADD IF NOT EXISTS PARTITION` statement to Athena
// and returns without waiting for it to run.

use aws_lambda_events::event::s3::S3Event;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use plclog_catalog::{
    AthenaQueryClient, PartitionRegistrar, QueryEngine, RegistrarSettings, SubmittedQueryId,
};
use plclog_config::{init_tracing, LogOutput, Platform, RuntimeConfig};
use plclog_core::{CoreError, ObjectCreatedEvent, ObjectCreatedRecord};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

const SUCCESS_MESSAGE: &str = "Partition added successfully";

/// Response returned to the invoker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub status_code: u16,
    pub body: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResponseBody<'a> {
    message: &'a str,
    query_execution_ids: &'a [SubmittedQueryId],
}

impl RegistrationResponse {
    fn submitted(ids: &[SubmittedQueryId]) -> Self {
        let body = serde_json::to_string(&ResponseBody {
            message: SUCCESS_MESSAGE,
            query_execution_ids: ids,
        })
        .unwrap_or_else(|_| format!("\"{}\"", SUCCESS_MESSAGE));
        Self {
            status_code: 200,
            body,
        }
    }
}

/// Validate the raw notification into the registrar's event type
pub fn to_object_created_event(event: S3Event) -> Result<ObjectCreatedEvent, CoreError> {
    let records = event
        .records
        .into_iter()
        .enumerate()
        .map(|(idx, record)| {
            let bucket = record.s3.bucket.name.ok_or_else(|| {
                CoreError::invalid_event(format!("record {} has no bucket name", idx))
            })?;
            let key = record.s3.object.key.ok_or_else(|| {
                CoreError::invalid_event(format!("record {} has no object key", idx))
            })?;
            ObjectCreatedRecord::from_encoded(bucket, &key)
        })
        .collect::<Result<Vec<_>, _>>()?;
    ObjectCreatedEvent::new(records)
}

/// Handle one notification; errors fail the invocation
pub async fn handle_event<Q: QueryEngine>(
    event: S3Event,
    registrar: &PartitionRegistrar<Q>,
) -> Result<RegistrationResponse, Error> {
    let event = to_object_created_event(event).map_err(|e| {
        error!(error = %e, "Rejected storage event");
        Error::from(e.to_string())
    })?;

    let ids = registrar.register(&event).await.map_err(|e| {
        error!(error = %e, "Partition registration failed");
        Error::from(e.to_string())
    })?;

    Ok(RegistrationResponse::submitted(&ids))
}

/// Lambda runtime entry point
pub async fn run() -> Result<(), Error> {
    let config = RuntimeConfig::load_for_platform(Platform::Lambda)
        .map_err(|e| Error::from(format!("Failed to load configuration: {:#}", e)))?;
    init_tracing(&config.logging, LogOutput::CloudWatch);

    let engine = AthenaQueryClient::from_config(&config.catalog)
        .await
        .map_err(|e| Error::from(format!("Failed to initialize Athena client: {:#}", e)))?;
    info!(
        endpoint = engine.endpoint(),
        database = %config.catalog.database,
        table = %config.catalog.table,
        "Partition registrar ready"
    );

    let registrar = Arc::new(PartitionRegistrar::new(
        engine,
        RegistrarSettings::from(&config.catalog),
    ));

    lambda_runtime::run(service_fn(move |event: LambdaEvent<S3Event>| {
        let registrar = registrar.clone();
        async move { handle_event(event.payload, &*registrar).await }
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use plclog_catalog::CatalogError;
    use plclog_config::CatalogConfig;

    fn s3_event(keys: &[&str]) -> S3Event {
        let records: Vec<_> = keys
            .iter()
            .map(|key| {
                serde_json::json!({
                    "eventVersion": "2.1",
                    "eventSource": "aws:s3",
                    "awsRegion": "us-east-1",
                    "eventTime": "2025-06-24T08:15:00.000Z",
                    "eventName": "ObjectCreated:Put",
                    "userIdentity": { "principalId": "EXAMPLE" },
                    "requestParameters": { "sourceIPAddress": "127.0.0.1" },
                    "responseElements": {
                        "x-amz-request-id": "EXAMPLE123456789",
                        "x-amz-id-2": "EXAMPLE123/abcdefghijklmno"
                    },
                    "s3": {
                        "s3SchemaVersion": "1.0",
                        "configurationId": "plc-log-created",
                        "bucket": {
                            "name": "vibration-daily-readings-project",
                            "ownerIdentity": { "principalId": "EXAMPLE" },
                            "arn": "arn:aws:s3:::vibration-daily-readings-project"
                        },
                        "object": {
                            "key": key,
                            "size": 1024,
                            "eTag": "0123456789abcdef0123456789abcdef",
                            "sequencer": "0A1B2C3D4E5F678901"
                        }
                    }
                })
            })
            .collect();
        serde_json::from_value(serde_json::json!({ "Records": records })).unwrap()
    }

    struct StaticEngine;

    #[async_trait]
    impl QueryEngine for StaticEngine {
        async fn submit_query(
            &self,
            statement: &str,
            _database: &str,
            _output_location: &str,
        ) -> Result<SubmittedQueryId, CatalogError> {
            assert!(statement.contains(
                "LOCATION 's3://vibration-daily-readings-project/plc-logs/year=2025/month=06/day=24/'"
            ));
            Ok(SubmittedQueryId::new("qe-1"))
        }
    }

    fn registrar() -> PartitionRegistrar<StaticEngine> {
        PartitionRegistrar::new(
            StaticEngine,
            RegistrarSettings::from(&CatalogConfig::default()),
        )
    }

    #[test]
    fn test_convert_decodes_keys() {
        let event =
            to_object_created_event(s3_event(&["plc-logs/year=2025/month=06/day=24/plc+data.csv"]))
                .unwrap();
        assert_eq!(event.first().bucket(), "vibration-daily-readings-project");
        assert_eq!(
            event.first().key(),
            "plc-logs/year=2025/month=06/day=24/plc data.csv"
        );
    }

    #[test]
    fn test_convert_rejects_empty_event() {
        let err = to_object_created_event(s3_event(&[])).unwrap_err();
        assert!(matches!(err, CoreError::InvalidEvent { .. }));
    }

    #[tokio::test]
    async fn test_handle_event_returns_200() {
        let response = handle_event(
            s3_event(&["plc-logs/year=2025/month=06/day=24/plc-data-20250624.csv"]),
            &registrar(),
        )
        .await
        .unwrap();

        assert_eq!(response.status_code, 200);
        let body: serde_json::Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body["message"], SUCCESS_MESSAGE);
        assert_eq!(body["queryExecutionIds"][0], "qe-1");

        let wire = serde_json::to_value(&response).unwrap();
        assert_eq!(wire["statusCode"], 200);
    }

    #[tokio::test]
    async fn test_malformed_key_fails_invocation() {
        let err = handle_event(s3_event(&["onlyoneseg"]), &registrar())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Malformed object key"));
    }
}
