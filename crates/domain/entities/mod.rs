pub mod audit_logs;
pub mod payments;
pub mod plans;
pub mod servers;
pub mod users;
