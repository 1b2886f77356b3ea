use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode, KeySchemaElement, KeyType, ScalarAttributeType, TableStatus,
};
use aws_sdk_dynamodb::Client as DynamoDbClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

use super::table_support::map_dynamodb_error;
use crate::models::{RepositoryError, RepositoryResult};

/// Provisions the catalog tables when they do not exist yet
pub struct TableManager {
    client: Arc<DynamoDbClient>,
    poll_interval: Duration,
    max_attempts: u32,
}

impl TableManager {
    pub fn new(client: Arc<DynamoDbClient>) -> Self {
        Self {
            client,
            poll_interval: Duration::from_secs(2),
            max_attempts: 60,
        }
    }

    /// Create the meals and drinks tables if missing
    pub async fn ensure_catalog_tables(
        &self,
        meals_table_name: &str,
        drinks_table_name: &str,
    ) -> RepositoryResult<()> {
        self.ensure_table(meals_table_name).await?;
        self.ensure_table(drinks_table_name).await
    }

    /// Create a pay-per-request table keyed by the string attribute `id`
    #[instrument(skip(self), fields(table_name = %table_name))]
    pub async fn ensure_table(&self, table_name: &str) -> RepositoryResult<()> {
        if self.table_exists(table_name).await? {
            info!("Table {} already exists", table_name);
            return Ok(());
        }

        info!("Creating table {}", table_name);

        let attribute_definition = AttributeDefinition::builder()
            .attribute_name("id")
            .attribute_type(ScalarAttributeType::S)
            .build()
            .map_err(|e| RepositoryError::AwsSdk {
                message: format!("Failed to build attribute definition: {}", e),
            })?;

        let key_schema = KeySchemaElement::builder()
            .attribute_name("id")
            .key_type(KeyType::Hash)
            .build()
            .map_err(|e| RepositoryError::AwsSdk {
                message: format!("Failed to build key schema: {}", e),
            })?;

        self.client
            .create_table()
            .table_name(table_name)
            .attribute_definitions(attribute_definition)
            .key_schema(key_schema)
            .billing_mode(BillingMode::PayPerRequest)
            .send()
            .await
            .map_err(|e| map_dynamodb_error(table_name, e.into()))?;

        info!("Table creation initiated, waiting for table to become active");
        self.wait_for_table_active(table_name).await
    }

    /// Check if a table exists
    #[instrument(skip(self), fields(table_name = %table_name))]
    pub async fn table_exists(&self, table_name: &str) -> RepositoryResult<bool> {
        match self.client.describe_table().table_name(table_name).send().await {
            Ok(_) => Ok(true),
            Err(e) => match map_dynamodb_error(table_name, e.into()) {
                RepositoryError::TableNotFound { .. } => Ok(false),
                other => {
                    error!("Error checking table existence: {}", other);
                    Err(RepositoryError::ConnectionFailed)
                }
            },
        }
    }

    #[instrument(skip(self), fields(table_name = %table_name))]
    async fn wait_for_table_active(&self, table_name: &str) -> RepositoryResult<()> {
        for _ in 0..self.max_attempts {
            let response = self
                .client
                .describe_table()
                .table_name(table_name)
                .send()
                .await
                .map_err(|e| map_dynamodb_error(table_name, e.into()))?;

            match response.table.and_then(|table| table.table_status) {
                Some(TableStatus::Active) => {
                    info!("Table {} is now active", table_name);
                    return Ok(());
                }
                Some(status) => info!("Table {} status: {:?}, waiting...", table_name, status),
                None => warn!("Table {} status unknown, waiting...", table_name),
            }

            tokio::time::sleep(self.poll_interval).await;
        }

        error!("Timeout waiting for table {} to become active", table_name);
        Err(RepositoryError::Timeout)
    }
}
