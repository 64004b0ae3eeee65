//! Basket access tokens.

use rand::{distributions::Alphanumeric, Rng};

/// Length of generated tokens.
pub const TOKEN_LENGTH: usize = 44;

/// Generate a new random access token.
///
/// Uses the thread-local CSPRNG, so tokens are not guessable from earlier ones.
pub fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Compare two tokens without short-circuiting on the first differing byte.
///
/// Only the length comparison returns early, and lengths are public anyway.
pub fn tokens_match(expected: &str, provided: &str) -> bool {
    let a = expected.as_bytes();
    let b = provided.as_bytes();
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_shape() {
        let token = generate_token();
        assert_eq!(token.len(), TOKEN_LENGTH);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_tokens_are_unique() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
    }

    #[test]
    fn test_tokens_match() {
        let token = "abcdef123";
        assert!(tokens_match(token, "abcdef123"));
        assert!(!tokens_match(token, ""));
        assert!(!tokens_match(token, "abcdef"));
        assert!(!tokens_match(token, "bcdef123"));
        assert!(!tokens_match(token, "abcdef1234"));
        assert!(!tokens_match(token, "abcdef124"));
    }
}
