//! Notification dispatch adapters.
//!
//! `ChannelNotifier` decouples the request path from delivery through a
//! bounded channel; sinks do the actual sending.

mod channel;
mod http_sink;
mod in_memory;

pub use channel::{ChannelNotifier, DEFAULT_QUEUE_CAPACITY};
pub use http_sink::{HttpNotificationSink, NotifySinkConfig};
pub use in_memory::InMemoryNotificationSink;
