use async_trait::async_trait;
use aws_sdk_dynamodb::operation::RequestId;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client as DynamoDbClient;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn, Instrument};

use super::table_support::{
    decimal_attr, dynamodb_span, map_dynamodb_error, missing_row, string_attr, Item,
    UpdateExpression,
};
use crate::models::{DrinkEntry, DrinkPatch, NewDrinkEntry, RepositoryError, RepositoryResult};

/// Remote access to the `drinks` table
#[async_trait]
pub trait DrinkRepository: Send + Sync {
    /// Fetch every drink row
    async fn find_all(&self) -> RepositoryResult<Vec<DrinkEntry>>;

    /// Insert a drink and return the row as stored, including its id
    async fn insert(&self, entry: NewDrinkEntry) -> RepositoryResult<DrinkEntry>;

    /// Update the set columns of drink `id` and return the stored row
    async fn update(&self, id: &str, patch: DrinkPatch) -> RepositoryResult<DrinkEntry>;

    /// Delete drink `id`
    async fn delete(&self, id: &str) -> RepositoryResult<()>;
}

/// DynamoDB implementation of the DrinkRepository trait
pub struct DynamoDbDrinkRepository {
    client: Arc<DynamoDbClient>,
    table_name: String,
    region: String,
}

impl DynamoDbDrinkRepository {
    pub fn new(client: Arc<DynamoDbClient>, table_name: String, region: String) -> Self {
        Self {
            client,
            table_name,
            region,
        }
    }

    /// Get the table name (for testing)
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Convert a DrinkEntry to DynamoDB attribute values
    pub fn entry_to_item(&self, entry: &DrinkEntry) -> Item {
        let mut item = HashMap::new();

        item.insert("id".to_string(), AttributeValue::S(entry.id.clone()));
        item.insert("name".to_string(), AttributeValue::S(entry.name.clone()));
        item.insert(
            "price".to_string(),
            AttributeValue::N(entry.price.to_string()),
        );
        item.insert(
            "category".to_string(),
            AttributeValue::S(entry.category.clone()),
        );

        item
    }

    /// Convert a DynamoDB item to a DrinkEntry
    pub fn item_to_entry(&self, item: &Item) -> RepositoryResult<DrinkEntry> {
        Ok(DrinkEntry {
            id: string_attr(item, "id")?,
            name: string_attr(item, "name")?,
            price: decimal_attr(item, "price")?,
            category: string_attr(item, "category")?,
        })
    }

    /// Build the update expression for the set fields of a patch
    pub(crate) fn patch_to_update(&self, patch: &DrinkPatch) -> RepositoryResult<UpdateExpression> {
        let mut assignments = Vec::new();

        if let Some(ref name) = patch.name {
            assignments.push(("name", AttributeValue::S(name.clone())));
        }
        if let Some(price) = patch.price {
            assignments.push(("price", AttributeValue::N(price.to_string())));
        }
        if let Some(ref category) = patch.category {
            assignments.push(("category", AttributeValue::S(category.clone())));
        }

        UpdateExpression::build(assignments)
    }
}

#[async_trait]
impl DrinkRepository for DynamoDbDrinkRepository {
    #[instrument(skip(self), fields(table = %self.table_name))]
    async fn find_all(&self) -> RepositoryResult<Vec<DrinkEntry>> {
        info!("Scanning all drinks");

        let mut entries = Vec::new();
        let mut start_key: Option<Item> = None;

        loop {
            let scan_span = dynamodb_span("Scan", &self.table_name, &self.region);

            let response = async {
                let result = self
                    .client
                    .scan()
                    .table_name(&self.table_name)
                    .set_exclusive_start_key(start_key.take())
                    .send()
                    .await;

                if let Ok(output) = &result {
                    if let Some(request_id) = output.request_id() {
                        tracing::Span::current().record("aws.request_id", request_id);
                    }
                }

                result.map_err(|e| map_dynamodb_error(&self.table_name, e.into()))
            }
            .instrument(scan_span)
            .await?;

            for item in response.items.unwrap_or_default() {
                match self.item_to_entry(&item) {
                    Ok(entry) => entries.push(entry),
                    Err(e) => {
                        warn!("Failed to parse drink item: {}", e);
                        continue;
                    }
                }
            }

            match response.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        info!("Found {} drinks", entries.len());
        Ok(entries)
    }

    #[instrument(skip(self, entry), fields(table = %self.table_name, name = %entry.name))]
    async fn insert(&self, entry: NewDrinkEntry) -> RepositoryResult<DrinkEntry> {
        info!("Inserting drink");

        let entry = DrinkEntry::new(entry);
        let item = self.entry_to_item(&entry);

        let put_span = dynamodb_span("PutItem", &self.table_name, &self.region);

        async {
            self.client
                .put_item()
                .table_name(&self.table_name)
                .set_item(Some(item))
                .condition_expression("attribute_not_exists(id)")
                .send()
                .await
                .map_err(|e| map_dynamodb_error(&self.table_name, e.into()))
        }
        .instrument(put_span)
        .await?;

        info!(id = %entry.id, "Drink inserted");
        Ok(entry)
    }

    #[instrument(skip(self, patch), fields(table = %self.table_name, id = %id))]
    async fn update(&self, id: &str, patch: DrinkPatch) -> RepositoryResult<DrinkEntry> {
        info!("Updating drink");

        let update = self.patch_to_update(&patch)?;
        let update_span = dynamodb_span("UpdateItem", &self.table_name, &self.region);

        let response = async {
            self.client
                .update_item()
                .table_name(&self.table_name)
                .key("id", AttributeValue::S(id.to_string()))
                .update_expression(update.expression)
                .set_expression_attribute_names(Some(update.names))
                .set_expression_attribute_values(Some(update.values))
                .condition_expression("attribute_exists(id)")
                .return_values(ReturnValue::AllNew)
                .send()
                .await
                .map_err(|e| missing_row(map_dynamodb_error(&self.table_name, e.into())))
        }
        .instrument(update_span)
        .await?;

        let attributes = response
            .attributes
            .ok_or_else(|| RepositoryError::InvalidItem {
                message: "Update returned no attributes".to_string(),
            })?;

        let entry = self.item_to_entry(&attributes)?;
        info!("Drink updated");
        Ok(entry)
    }

    #[instrument(skip(self), fields(table = %self.table_name, id = %id))]
    async fn delete(&self, id: &str) -> RepositoryResult<()> {
        info!("Deleting drink");

        let delete_span = dynamodb_span("DeleteItem", &self.table_name, &self.region);

        async {
            self.client
                .delete_item()
                .table_name(&self.table_name)
                .key("id", AttributeValue::S(id.to_string()))
                .condition_expression("attribute_exists(id)")
                .send()
                .await
                .map_err(|e| missing_row(map_dynamodb_error(&self.table_name, e.into())))?;

            info!("Drink deleted");
            Ok(())
        }
        .instrument(delete_span)
        .await
    }
}
