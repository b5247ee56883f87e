//! Rules for turning affected accounts and entities into display labels.

use crate::event::AffectedEntity;

/// Entity value reported for public events with no specific resource
pub const UNKNOWN_ENTITY: &str = "UNKNOWN";

/// Entity value reported for account-level impact
pub const ACCOUNT_ENTITY: &str = "AWS_ACCOUNT";

/// Which list a label set describes; selects the placeholder text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    Accounts,
    Resources,
}

/// How a label list is joined, and whether its placeholder is split
/// across two lines for narrow chat card fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListFormat {
    pub separator: &'static str,
    pub stacked_placeholder: bool,
}

impl ListFormat {
    /// Newline-joined, placeholder split over two lines
    pub const STACKED: Self = Self {
        separator: "\n",
        stacked_placeholder: true,
    };

    /// Newline-joined, placeholder on one line
    pub const LINES: Self = Self {
        separator: "\n",
        stacked_placeholder: false,
    };

    /// Comma-joined for prose
    pub const COMMA: Self = Self {
        separator: ", ",
        stacked_placeholder: false,
    };
}

impl LabelKind {
    pub fn placeholder(&self, stacked: bool) -> &'static str {
        match (self, stacked) {
            (Self::Accounts, false) => "All accounts in region",
            (Self::Accounts, true) => "All accounts\nin region",
            (Self::Resources, false) => "All resources in region",
            (Self::Resources, true) => "All resources\nin region",
        }
    }
}

/// Label shown for an affected account: `"{name} ({id})"`.
///
/// Without a resolved name the id stands in for it.
pub fn account_label(account_id: &str, account_name: Option<&str>) -> String {
    format!("{} ({account_id})", account_name.unwrap_or(account_id))
}

/// Resource labels from affected entities.
///
/// Entries that describe account-level impact (`AWS_ACCOUNT`, or the
/// entity's own account id) are reported through the accounts list instead.
pub fn resource_labels(entities: &[AffectedEntity]) -> Vec<String> {
    entities
        .iter()
        .filter(|entity| entity.entity_value != ACCOUNT_ENTITY)
        .filter(|entity| entity.account_id.as_deref() != Some(entity.entity_value.as_str()))
        .map(|entity| entity.entity_value.clone())
        .collect()
}

/// Whether a label list means "everything in the region".
pub fn is_unspecified(labels: &[String]) -> bool {
    match labels {
        [] => true,
        [only] => only == UNKNOWN_ENTITY,
        _ => false,
    }
}

/// Joins labels, substituting the region-wide placeholder for an empty
/// list or a lone `UNKNOWN` entity.
pub fn render_labels(labels: &[String], kind: LabelKind, format: ListFormat) -> String {
    if is_unspecified(labels) {
        return kind.placeholder(format.stacked_placeholder).to_string();
    }
    labels.join(format.separator)
}

/// Labels as a list, with the placeholder as the sole entry when unspecified.
pub fn label_list(labels: &[String], kind: LabelKind) -> Vec<String> {
    if is_unspecified(labels) {
        return vec![kind.placeholder(false).to_string()];
    }
    labels.to_vec()
}
