//! DynamoDB plumbing shared by the meal and drink repositories.

use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Error as DynamoDbError;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::error;

use crate::models::{RepositoryError, RepositoryResult};

pub(crate) type Item = HashMap<String, AttributeValue>;

/// Create a DynamoDB client span with the attributes the trace backend groups on
pub(crate) fn dynamodb_span(operation: &str, table_name: &str, region: &str) -> tracing::Span {
    tracing::info_span!(
        "DynamoDB",
        "aws.service" = "DynamoDB",
        "aws.operation" = operation,
        "aws.region" = %region,
        "aws.dynamodb.table_name" = %table_name,
        "aws.request_id" = tracing::field::Empty,

        "otel.kind" = "client",
        "otel.name" = format!("DynamoDB.{}", operation),

        "rpc.system" = "aws-api",
        "rpc.service" = "AmazonDynamoDBv2",
        "rpc.method" = operation,

        "db.system" = "dynamodb",
        "db.name" = %table_name,
        "db.operation" = operation,
    )
}

/// Convert a DynamoDB error into a RepositoryError
pub(crate) fn map_dynamodb_error(table_name: &str, error: DynamoDbError) -> RepositoryError {
    error!("DynamoDB error: {:?}", error);

    match error {
        DynamoDbError::ResourceNotFoundException(_) => RepositoryError::TableNotFound {
            table_name: table_name.to_string(),
        },
        DynamoDbError::ConditionalCheckFailedException(e) => RepositoryError::ConditionFailed {
            message: e.to_string(),
        },
        other => RepositoryError::AwsSdk {
            message: other.to_string(),
        },
    }
}

/// Rejected conditions on update/delete mean the row is gone
pub(crate) fn missing_row(error: RepositoryError) -> RepositoryError {
    match error {
        RepositoryError::ConditionFailed { .. } => RepositoryError::NotFound,
        other => other,
    }
}

pub(crate) fn string_attr(item: &Item, key: &str) -> RepositoryResult<String> {
    item.get(key)
        .and_then(|v| v.as_s().ok())
        .cloned()
        .ok_or_else(|| RepositoryError::InvalidItem {
            message: format!("Missing {}", key),
        })
}

pub(crate) fn decimal_attr(item: &Item, key: &str) -> RepositoryResult<Decimal> {
    item.get(key)
        .and_then(|v| v.as_n().ok())
        .and_then(|s| Decimal::from_str(s).ok())
        .ok_or_else(|| RepositoryError::InvalidItem {
            message: format!("Invalid {}", key),
        })
}

/// A `SET` update expression with placeholder names for every column, so
/// reserved words such as `name` never reach the expression text.
#[derive(Debug, Default)]
pub(crate) struct UpdateExpression {
    pub expression: String,
    pub names: HashMap<String, String>,
    pub values: HashMap<String, AttributeValue>,
}

impl UpdateExpression {
    pub fn build(assignments: Vec<(&str, AttributeValue)>) -> RepositoryResult<Self> {
        if assignments.is_empty() {
            return Err(RepositoryError::InvalidItem {
                message: "Update contains no fields".to_string(),
            });
        }

        let mut update = UpdateExpression::default();
        let mut clauses = Vec::with_capacity(assignments.len());

        for (column, value) in assignments {
            clauses.push(format!("#{column} = :{column}"));
            update.names.insert(format!("#{column}"), column.to_string());
            update.values.insert(format!(":{column}"), value);
        }

        update.expression = format!("SET {}", clauses.join(", "));
        Ok(update)
    }
}
