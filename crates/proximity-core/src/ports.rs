//! Port trait definitions
//!
//! These traits define the interfaces that adapters must implement.

pub mod notify;
pub mod query;

pub use notify::{Notification, NotificationSink, Severity};
pub use query::QueryCapability;
