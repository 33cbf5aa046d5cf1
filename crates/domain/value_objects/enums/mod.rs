pub mod payment_statuses;
pub mod server_statuses;
pub mod subscription_statuses;
