use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use aha_core::account_label;

/// Resolves account ids to display names.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// `None` when the name cannot be resolved
    async fn account_name(&self, account_id: &str) -> Option<String>;
}

/// Labels for a list of account ids, `"{name} ({id})"` each.
pub async fn account_labels(directory: &dyn AccountDirectory, account_ids: &[String]) -> Vec<String> {
    let mut labels = Vec::with_capacity(account_ids.len());
    for id in account_ids {
        let name = directory.account_name(id).await;
        labels.push(account_label(id, name.as_deref()));
    }
    labels
}

/// Directory backed by AWS Organizations `DescribeAccount`.
///
/// Names are cached for the lifetime of the directory; lookup failures are
/// not cached so a later pass can retry them.
pub struct OrganizationsDirectory {
    client: aws_sdk_organizations::Client,
    names: DashMap<String, String>,
}

impl OrganizationsDirectory {
    pub fn new(client: aws_sdk_organizations::Client) -> Self {
        Self {
            client,
            names: DashMap::new(),
        }
    }
}

#[async_trait]
impl AccountDirectory for OrganizationsDirectory {
    async fn account_name(&self, account_id: &str) -> Option<String> {
        if let Some(name) = self.names.get(account_id) {
            return Some(name.value().clone());
        }

        match self
            .client
            .describe_account()
            .account_id(account_id)
            .send()
            .await
        {
            Ok(output) => {
                let name = output.account().and_then(|a| a.name())?.to_string();
                self.names.insert(account_id.to_string(), name.clone());
                Some(name)
            }
            Err(e) => {
                debug!(
                    account_id,
                    error = %aws_sdk_organizations::error::DisplayErrorContext(&e),
                    "Account name lookup failed, using id"
                );
                None
            }
        }
    }
}

/// Directory that never resolves names, so labels fall back to ids.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdOnlyDirectory;

#[async_trait]
impl AccountDirectory for IdOnlyDirectory {
    async fn account_name(&self, _account_id: &str) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Fixed(HashMap<&'static str, &'static str>);

    #[async_trait]
    impl AccountDirectory for Fixed {
        async fn account_name(&self, account_id: &str) -> Option<String> {
            self.0.get(account_id).map(|name| name.to_string())
        }
    }

    #[tokio::test]
    async fn test_labels_fall_back_to_id() {
        let directory = Fixed(HashMap::from([("111111111111", "prod")]));
        let labels = account_labels(
            &directory,
            &["111111111111".to_string(), "222222222222".to_string()],
        )
        .await;
        assert_eq!(
            labels,
            vec!["prod (111111111111)", "222222222222 (222222222222)"]
        );
    }

    #[tokio::test]
    async fn test_id_only_directory() {
        let labels = account_labels(&IdOnlyDirectory, &["123456789012".to_string()]).await;
        assert_eq!(labels, vec!["123456789012 (123456789012)"]);
    }

    #[tokio::test]
    async fn test_no_accounts() {
        assert!(account_labels(&IdOnlyDirectory, &[]).await.is_empty());
    }
}
