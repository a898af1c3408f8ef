//! Identifier utilities

use rand::Rng;
use uuid::Uuid;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of a generated asset id
pub const ASSET_ID_LEN: usize = 9;

/// Random lowercase base-36 string of `len` characters
///
/// Not checked against existing records; callers rely on the backing
/// table's primary key to reject the rare collision.
pub fn short_id(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

/// Generate a new asset id
pub fn asset_id() -> String {
    short_id(ASSET_ID_LEN)
}

/// Generate an opaque admin session token
pub fn session_token() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_id_shape() {
        let id = asset_id();
        assert_eq!(id.len(), ASSET_ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_session_tokens_differ() {
        let a = session_token();
        let b = session_token();
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
    }
}
