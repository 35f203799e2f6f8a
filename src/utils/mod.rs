pub mod ip;
pub mod password;
pub mod sanitize;
pub mod throttle;
pub mod validators;

use base64::Engine;
use rand::RngExt;

/// Generate an opaque URL-safe token from `len` random bytes
pub fn generate_token(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::rng().fill(&mut bytes[..]);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_is_url_safe() {
        let token = generate_token(32);
        // 32 bytes -> 43 base64 chars without padding
        assert_eq!(token.len(), 43);
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_generate_token_is_random() {
        assert_ne!(generate_token(32), generate_token(32));
    }
}
