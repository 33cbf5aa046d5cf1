use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ServerStatus {
    #[default]
    Pending,
    Active,
    Expired,
}

impl Display for ServerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let server_status = match self {
            ServerStatus::Pending => "pending",
            ServerStatus::Active => "active",
            ServerStatus::Expired => "expired",
        };
        write!(f, "{}", server_status)
    }
}

impl ServerStatus {
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(ServerStatus::Pending),
            "active" => Some(ServerStatus::Active),
            "expired" => Some(ServerStatus::Expired),
            _ => None,
        }
    }
}
