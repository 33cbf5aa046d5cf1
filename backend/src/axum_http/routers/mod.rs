pub mod admin_events;
pub mod audit_logs;
pub mod auth;
pub mod payments;
pub mod plans;
pub mod servers;
