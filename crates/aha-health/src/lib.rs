//! Health event source for AHA.
//!
//! [`HealthEventSource`] is the seam the poll loop reads events through.
//! [`AwsHealthSource`] implements it against the AWS Health API in either
//! the single-account or the organization view. Account name resolution and
//! the organization-mode exclusion list live alongside it.

pub mod accounts;
pub mod aws;
pub mod error;
pub mod exclusions;
pub mod source;

pub use accounts::{AccountDirectory, IdOnlyDirectory, OrganizationsDirectory, account_labels};
pub use aws::{AwsHealthSource, HealthView};
pub use error::HealthError;
pub use exclusions::{ExclusionList, Filtered};
pub use source::{EventFilter, HealthEventSource, ISSUE_CATEGORIES};
