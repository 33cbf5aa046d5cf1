pub mod audit_logs;
pub mod leader_lock;
pub mod payments;
pub mod plans;
pub mod renewal_sweep;
pub mod servers;
pub mod users;
