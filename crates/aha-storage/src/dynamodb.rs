//! DynamoDB-backed state store.
//!
//! Rows use the attribute names of the existing table layout so deployments
//! can keep their table: `arn` (partition key), `lastUpdatedTime`, `added`,
//! `ttl` (the table's TTL attribute), `statusCode`, `affectedAccountIDs` and
//! `latestDescription`.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::error::{DisplayErrorContext, SdkError};
use aws_sdk_dynamodb::types::AttributeValue;
use tracing::debug;

use aha_core::{EventStatus, TrackedEventRecord};

use crate::error::StorageError;
use crate::traits::StateStore;

const ATTR_ARN: &str = "arn";
const ATTR_LAST_UPDATED: &str = "lastUpdatedTime";
const ATTR_ADDED: &str = "added";
const ATTR_TTL: &str = "ttl";
const ATTR_STATUS: &str = "statusCode";
const ATTR_ACCOUNTS: &str = "affectedAccountIDs";
const ATTR_DESCRIPTION: &str = "latestDescription";

pub struct DynamoStateStore {
    client: Client,
    table: String,
}

impl DynamoStateStore {
    pub fn new(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }
}

#[async_trait]
impl StateStore for DynamoStateStore {
    async fn get(&self, arn: &str) -> Result<Option<TrackedEventRecord>, StorageError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .key(ATTR_ARN, AttributeValue::S(arn.to_string()))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| sdk_error("GetItem", &self.table, e))?;

        match output.item() {
            Some(item) => item_to_record(item).map(Some),
            None => {
                debug!(event_arn = %arn, "No tracked record");
                Ok(None)
            }
        }
    }

    async fn put(&self, record: &TrackedEventRecord) -> Result<(), StorageError> {
        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(record_to_item(record)))
            .send()
            .await
            .map_err(|e| sdk_error("PutItem", &self.table, e))?;
        Ok(())
    }
}

fn sdk_error<E, R>(operation: &'static str, table: &str, err: SdkError<E, R>) -> StorageError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => {
            StorageError::unavailable(format!("{operation} on {table}: {}", DisplayErrorContext(&err)))
        }
        _ => StorageError::backend(operation, table, DisplayErrorContext(&err).to_string()),
    }
}

/// Encodes a record as a DynamoDB item.
pub fn record_to_item(record: &TrackedEventRecord) -> HashMap<String, AttributeValue> {
    let accounts = record
        .affected_account_ids
        .iter()
        .map(|id| AttributeValue::S(id.clone()))
        .collect();

    HashMap::from([
        (ATTR_ARN.to_string(), AttributeValue::S(record.arn.clone())),
        (
            ATTR_LAST_UPDATED.to_string(),
            AttributeValue::S(record.last_updated_time.clone()),
        ),
        (
            ATTR_ADDED.to_string(),
            AttributeValue::N(record.added_at.to_string()),
        ),
        (
            ATTR_TTL.to_string(),
            AttributeValue::N(record.expires_at.to_string()),
        ),
        (
            ATTR_STATUS.to_string(),
            AttributeValue::S(record.status_code.as_str().to_string()),
        ),
        (ATTR_ACCOUNTS.to_string(), AttributeValue::L(accounts)),
        (
            ATTR_DESCRIPTION.to_string(),
            AttributeValue::S(record.latest_description.clone()),
        ),
    ])
}

/// Decodes a DynamoDB item into a record.
///
/// Numeric attributes are accepted as either `N` or `S`, since older rows
/// stored the first-seen time as a string.
pub fn item_to_record(
    item: &HashMap<String, AttributeValue>,
) -> Result<TrackedEventRecord, StorageError> {
    let arn = string_attr(item, ATTR_ARN, "<unknown>")?;
    let status = string_attr(item, ATTR_STATUS, &arn)?;
    let status_code = status
        .parse::<EventStatus>()
        .map_err(|e| StorageError::invalid_record(&arn, e.to_string()))?;

    let affected_account_ids = match item.get(ATTR_ACCOUNTS) {
        Some(AttributeValue::L(values)) => values
            .iter()
            .map(|value| {
                value
                    .as_s()
                    .cloned()
                    .map_err(|_| StorageError::invalid_record(&arn, "non-string account id"))
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(AttributeValue::Ss(values)) => values.clone(),
        Some(_) => {
            return Err(StorageError::invalid_record(
                &arn,
                format!("{ATTR_ACCOUNTS} is not a list"),
            ));
        }
        None => Vec::new(),
    };

    Ok(TrackedEventRecord {
        last_updated_time: string_attr(item, ATTR_LAST_UPDATED, &arn)?,
        status_code,
        latest_description: item
            .get(ATTR_DESCRIPTION)
            .and_then(|value| value.as_s().ok())
            .cloned()
            .unwrap_or_default(),
        affected_account_ids,
        added_at: number_attr(item, ATTR_ADDED, &arn)?,
        expires_at: number_attr(item, ATTR_TTL, &arn)?,
        arn,
    })
}

fn string_attr(
    item: &HashMap<String, AttributeValue>,
    name: &str,
    arn: &str,
) -> Result<String, StorageError> {
    item.get(name)
        .and_then(|value| value.as_s().ok())
        .cloned()
        .ok_or_else(|| StorageError::invalid_record(arn, format!("missing string {name}")))
}

fn number_attr(
    item: &HashMap<String, AttributeValue>,
    name: &str,
    arn: &str,
) -> Result<i64, StorageError> {
    let raw = match item.get(name) {
        Some(AttributeValue::N(n)) | Some(AttributeValue::S(n)) => n,
        _ => {
            return Err(StorageError::invalid_record(
                arn,
                format!("missing number {name}"),
            ));
        }
    };
    raw.parse::<i64>()
        .map_err(|e| StorageError::invalid_record(arn, format!("{name}: {e}")))
}
