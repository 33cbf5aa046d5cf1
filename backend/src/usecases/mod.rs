pub mod auth;
pub mod auto_renewal;
pub mod expiration;
pub mod payments;
pub mod plans;
pub mod servers;
