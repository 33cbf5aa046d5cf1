pub mod audit_logs;
pub mod leader_lock;
pub mod mailer;
pub mod payments;
pub mod plans;
pub mod realtime;
pub mod renewal_sweep;
pub mod servers;
pub mod users;
