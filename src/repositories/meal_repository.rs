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
use crate::models::{MealPatch, MenuEntry, NewMenuEntry, RepositoryError, RepositoryResult};

/// Remote access to the `menuItems` table
#[async_trait]
pub trait MealRepository: Send + Sync {
    /// Fetch every meal row
    async fn find_all(&self) -> RepositoryResult<Vec<MenuEntry>>;

    /// Insert a meal and return the row as stored, including its id
    async fn insert(&self, entry: NewMenuEntry) -> RepositoryResult<MenuEntry>;

    /// Update the set columns of meal `id` and return the stored row
    async fn update(&self, id: &str, patch: MealPatch) -> RepositoryResult<MenuEntry>;

    /// Delete meal `id`
    async fn delete(&self, id: &str) -> RepositoryResult<()>;
}

/// DynamoDB implementation of the MealRepository trait
pub struct DynamoDbMealRepository {
    client: Arc<DynamoDbClient>,
    table_name: String,
    region: String,
}

impl DynamoDbMealRepository {
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

    /// Convert a MenuEntry to DynamoDB attribute values
    pub fn entry_to_item(&self, entry: &MenuEntry) -> Item {
        let mut item = HashMap::new();

        item.insert("id".to_string(), AttributeValue::S(entry.id.clone()));
        item.insert(
            "item_name".to_string(),
            AttributeValue::S(entry.item_name.clone()),
        );
        item.insert(
            "description".to_string(),
            AttributeValue::S(entry.description.clone()),
        );
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

    /// Convert a DynamoDB item to a MenuEntry
    pub fn item_to_entry(&self, item: &Item) -> RepositoryResult<MenuEntry> {
        Ok(MenuEntry {
            id: string_attr(item, "id")?,
            item_name: string_attr(item, "item_name")?,
            description: string_attr(item, "description")?,
            price: decimal_attr(item, "price")?,
            category: string_attr(item, "category")?,
        })
    }

    /// Build the update expression for the set fields of a patch
    pub(crate) fn patch_to_update(&self, patch: &MealPatch) -> RepositoryResult<UpdateExpression> {
        let mut assignments = Vec::new();

        if let Some(ref item_name) = patch.item_name {
            assignments.push(("item_name", AttributeValue::S(item_name.clone())));
        }
        if let Some(ref description) = patch.description {
            assignments.push(("description", AttributeValue::S(description.clone())));
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
impl MealRepository for DynamoDbMealRepository {
    #[instrument(skip(self), fields(table = %self.table_name))]
    async fn find_all(&self) -> RepositoryResult<Vec<MenuEntry>> {
        info!("Scanning all meals");

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
                        warn!("Failed to parse meal item: {}", e);
                        continue;
                    }
                }
            }

            match response.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        info!("Found {} meals", entries.len());
        Ok(entries)
    }

    #[instrument(skip(self, entry), fields(table = %self.table_name, item_name = %entry.item_name))]
    async fn insert(&self, entry: NewMenuEntry) -> RepositoryResult<MenuEntry> {
        info!("Inserting meal");

        let entry = MenuEntry::new(entry);
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

        info!(id = %entry.id, "Meal inserted");
        Ok(entry)
    }

    #[instrument(skip(self, patch), fields(table = %self.table_name, id = %id))]
    async fn update(&self, id: &str, patch: MealPatch) -> RepositoryResult<MenuEntry> {
        info!("Updating meal");

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
        info!("Meal updated");
        Ok(entry)
    }

    #[instrument(skip(self), fields(table = %self.table_name, id = %id))]
    async fn delete(&self, id: &str) -> RepositoryResult<()> {
        info!("Deleting meal");

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

            info!("Meal deleted");
            Ok(())
        }
        .instrument(delete_span)
        .await
    }
}
