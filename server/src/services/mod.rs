//! Services module

pub mod notification;

pub use notification::{LogSink, NotificationEvent, NotificationService, NotificationSink};
