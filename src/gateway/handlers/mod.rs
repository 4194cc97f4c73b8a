pub mod health;
pub mod music;
pub mod subscription;

pub use health::{HealthResponse, health_check};
pub use music::{get_music, query_music};
pub use subscription::{get_subscriptions, subscribe};
