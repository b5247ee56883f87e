pub mod detector;
pub mod error;
pub mod event;
pub mod labels;
pub mod record;
pub mod time;

pub use detector::{Change, ChangeDetector, EventType};
pub use error::{CoreError, Result};
pub use event::{AffectedEntity, Event, EventStatus, EventSummary};
pub use labels::{LabelKind, ListFormat, account_label, render_labels, resource_labels};
pub use record::{EXPIRY_GRACE_SECS, TrackedEventRecord};
pub use time::{cleanup_time, epoch_seconds, now_epoch, upstream_timestamp};
