//! Organization-mode account exclusion list.
//!
//! The list is a `.csv` object in S3 holding one account id per line.

use std::collections::HashSet;

use aws_sdk_s3::error::DisplayErrorContext;
use tracing::{info, warn};

use crate::error::HealthError;

/// Account ids whose impact is not reported
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionList {
    accounts: HashSet<String>,
}

/// Outcome of filtering an event's affected accounts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filtered {
    /// Accounts left to report; empty if the event named none to begin with
    Keep(Vec<String>),

    /// Every affected account was excluded; the event is skipped
    AllExcluded,
}

impl ExclusionList {
    pub fn parse(text: &str) -> Self {
        let accounts = text
            .lines()
            .map(|line| line.trim().trim_matches(',').trim())
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Self { accounts }
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn contains(&self, account_id: &str) -> bool {
        self.accounts.contains(account_id)
    }

    /// Removes excluded accounts, preserving order.
    pub fn filter(&self, accounts: Vec<String>) -> Filtered {
        if accounts.is_empty() || self.accounts.is_empty() {
            return Filtered::Keep(accounts);
        }
        let kept: Vec<String> = accounts
            .into_iter()
            .filter(|id| !self.accounts.contains(id))
            .collect();
        if kept.is_empty() {
            Filtered::AllExcluded
        } else {
            Filtered::Keep(kept)
        }
    }

    /// Loads the list from `s3://{bucket}/{key}`.
    ///
    /// A key without a `.csv` extension is ignored with a warning and yields
    /// an empty list.
    pub async fn load_from_s3(
        client: &aws_sdk_s3::Client,
        bucket: &str,
        key: &str,
    ) -> Result<Self, HealthError> {
        if !has_csv_extension(key) {
            warn!(key, "Account exclusion key is not a .csv file, ignoring");
            return Ok(Self::default());
        }

        let output = client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                HealthError::exclusions(format!(
                    "GetObject s3://{bucket}/{key} failed: {}",
                    DisplayErrorContext(&e)
                ))
            })?;
        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| HealthError::exclusions(e.to_string()))?
            .into_bytes();
        let text = std::str::from_utf8(&bytes)
            .map_err(|e| HealthError::exclusions(format!("s3://{bucket}/{key}: {e}")))?;

        let list = Self::parse(text);
        info!(bucket, key, count = list.len(), "Loaded account exclusion list");
        Ok(list)
    }
}

fn has_csv_extension(key: &str) -> bool {
    std::path::Path::new(key)
        .extension()
        .is_some_and(|ext| ext == "csv")
}
