/// Access/client token lifecycle
///
/// Tokens are opaque random secrets stored in the `tokens` table. They are
/// fresh for plain validation during a short window after issuance and remain
/// refreshable until their absolute expiry, when the next validation sweeps them.

mod store;

pub use store::TokenStore;

use rand::{distributions::Alphanumeric, Rng};

/// Length of generated access and client tokens
pub const TOKEN_LENGTH: usize = 128;

/// Generate a random alphanumeric token
pub fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Outcome of a validation, used for metrics labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    Valid,
    Unknown,
    ClientMismatch,
    Stale,
}

impl Validation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Validation::Valid => "valid",
            Validation::Unknown => "unknown",
            Validation::ClientMismatch => "client_mismatch",
            Validation::Stale => "stale",
        }
    }
}
