use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore;
use rand::rngs::OsRng;
use serde::Serialize;

const PASSWORD_BYTES: usize = 12;
const PASSWORD_LEN: usize = 16;

/// Login credentials issued to a server on payment approval. The username is
/// deterministic (`user_<serverId>`); the password comes from the OS CSPRNG.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ServerCredentials {
    pub username: String,
    pub password: String,
}

impl ServerCredentials {
    pub fn generate(server_id: i64) -> Self {
        let mut bytes = [0u8; PASSWORD_BYTES];
        OsRng.fill_bytes(&mut bytes);

        let mut password = STANDARD.encode(bytes);
        password.truncate(PASSWORD_LEN);

        Self {
            username: format!("user_{}", server_id),
            password,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_is_deterministic_per_server() {
        let first = ServerCredentials::generate(42);
        let second = ServerCredentials::generate(42);

        assert_eq!(first.username, "user_42");
        assert_eq!(second.username, "user_42");
    }

    #[test]
    fn password_has_required_length() {
        let credentials = ServerCredentials::generate(7);
        assert_eq!(credentials.password.len(), 16);
        assert!(credentials.password.is_ascii());
    }

    #[test]
    fn passwords_are_not_repeated() {
        let first = ServerCredentials::generate(1);
        let second = ServerCredentials::generate(1);
        assert_ne!(first.password, second.password);
    }
}
