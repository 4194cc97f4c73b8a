//! Per-user album subscriptions.

pub mod service;

pub use service::SubscriptionService;
