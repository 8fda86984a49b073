//! Partition Registrar: object-created event in, partition-add statement out

use crate::athena::{QueryEngine, SubmittedQueryId};
use crate::error::RegistrarError;
use plclog_config::CatalogConfig;
use plclog_core::{
    ObjectCreatedEvent, ObjectCreatedRecord, PartitionDescriptor, PrefixPolicy,
    RegistrationStatement,
};
use std::collections::HashSet;
use tracing::{info, instrument, warn};

/// Constants the registrar needs from configuration
#[derive(Debug, Clone)]
pub struct RegistrarSettings {
    pub database: String,
    pub table: String,
    pub output_location: String,
    pub prefix: String,
    pub prefix_policy: PrefixPolicy,
    pub process_all_records: bool,
}

impl From<&CatalogConfig> for RegistrarSettings {
    fn from(config: &CatalogConfig) -> Self {
        Self {
            database: config.database.clone(),
            table: config.table.clone(),
            output_location: config.output_location.clone(),
            prefix: config.prefix.clone(),
            prefix_policy: config.prefix_policy(),
            process_all_records: config.process_all_records,
        }
    }
}

impl RegistrarSettings {
    /// Build the statement for one record without submitting it
    pub fn statement_for(
        &self,
        record: &ObjectCreatedRecord,
    ) -> Result<RegistrationStatement, RegistrarError> {
        let descriptor =
            PartitionDescriptor::from_record(record, &self.prefix, self.prefix_policy)?;
        Ok(RegistrationStatement::new(self.table.as_str(), descriptor)?)
    }

    /// Statements a registrar with these settings submits for `event`
    ///
    /// Only the first record unless `process_all_records` is set. Records
    /// that map to an already planned partition are skipped.
    pub fn plan(
        &self,
        event: &ObjectCreatedEvent,
    ) -> Result<Vec<RegistrationStatement>, RegistrarError> {
        if !self.process_all_records {
            warn_ignored_records(event);
            return Ok(vec![self.statement_for(event.first())?]);
        }

        let mut seen = HashSet::new();
        let mut statements = Vec::with_capacity(event.len());
        for record in event.records() {
            let statement = self.statement_for(record)?;
            if seen.insert(statement.descriptor().location_uri()) {
                statements.push(statement);
            }
        }
        Ok(statements)
    }
}

fn warn_ignored_records(event: &ObjectCreatedEvent) {
    if event.len() > 1 {
        warn!(
            ignored = event.len() - 1,
            "Event carries several records; only the first is registered"
        );
    }
}

pub struct PartitionRegistrar<Q> {
    engine: Q,
    settings: RegistrarSettings,
}

impl<Q: QueryEngine> PartitionRegistrar<Q> {
    pub fn new(engine: Q, settings: RegistrarSettings) -> Self {
        Self { engine, settings }
    }

    pub fn settings(&self) -> &RegistrarSettings {
        &self.settings
    }

    /// Register the partition of the event's first record
    #[instrument(skip_all, fields(records = event.len()))]
    pub async fn handle_object_created_event(
        &self,
        event: &ObjectCreatedEvent,
    ) -> Result<SubmittedQueryId, RegistrarError> {
        warn_ignored_records(event);
        let statement = self.settings.statement_for(event.first())?;
        self.submit(&statement).await
    }

    /// Register according to settings: first record, or every distinct partition
    ///
    /// Stops at the first failure; statements submitted before it stay submitted.
    pub async fn register(
        &self,
        event: &ObjectCreatedEvent,
    ) -> Result<Vec<SubmittedQueryId>, RegistrarError> {
        let statements = self.settings.plan(event)?;
        let mut ids = Vec::with_capacity(statements.len());
        for statement in &statements {
            ids.push(self.submit(statement).await?);
        }
        Ok(ids)
    }

    async fn submit(
        &self,
        statement: &RegistrationStatement,
    ) -> Result<SubmittedQueryId, RegistrarError> {
        let location = statement.descriptor().location_uri();
        let sql = statement.sql();

        let id = self
            .engine
            .submit_query(
                &sql,
                &self.settings.database,
                &self.settings.output_location,
            )
            .await
            .map_err(|source| RegistrarError::SubmissionFailed {
                location: location.clone(),
                source,
            })?;

        info!(
            query_execution_id = %id,
            table = statement.table(),
            %location,
            "Submitted partition registration"
        );
        Ok(id)
    }
}
