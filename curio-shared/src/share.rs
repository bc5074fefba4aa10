/// Share code generation for public collection views
///
/// A share code is an opaque token stored on a collection that grants
/// unauthenticated read access to its public view. Codes are 12 random
/// base62 characters, giving 62^12 ≈ 2^71 combinations. That is far beyond
/// casual enumeration while staying short enough to paste into a chat
/// message.
///
/// Codes are stored in plaintext on the collection row. They grant read
/// access to a single collection's public fields, so hashing them would buy
/// nothing and would break the "regenerate overwrites the old code"
/// contract.
///
/// # Example
///
/// ```
/// use curio_shared::share::{generate_share_code, validate_share_code_format};
///
/// let code = generate_share_code();
/// assert_eq!(code.len(), 12);
/// assert!(validate_share_code_format(&code));
/// ```

use rand::Rng;

/// Length of a share code (characters)
pub const SHARE_CODE_LENGTH: usize = 12;

/// Generates a new share code
///
/// Uses base62 (A-Z, a-z, 0-9) so codes are URL-safe without escaping.
pub fn generate_share_code() -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    (0..SHARE_CODE_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Validates share code format
///
/// Checks length and that the code is ASCII alphanumeric. Used to reject
/// garbage before hitting the database.
pub fn validate_share_code_format(code: &str) -> bool {
    code.len() == SHARE_CODE_LENGTH && code.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_share_code() {
        let code1 = generate_share_code();
        let code2 = generate_share_code();

        assert_eq!(code1.len(), SHARE_CODE_LENGTH);
        assert_eq!(code2.len(), SHARE_CODE_LENGTH);

        // Should be random
        assert_ne!(code1, code2);

        assert!(code1.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_validate_share_code_format() {
        assert!(validate_share_code_format("AbCdEf123456"));
        assert!(validate_share_code_format(&generate_share_code()));

        // Too short
        assert!(!validate_share_code_format("AbC123"));

        // Too long
        assert!(!validate_share_code_format("AbCdEf1234567890"));

        // Non-alphanumeric
        assert!(!validate_share_code_format("AbCdEf12345!"));
        assert!(!validate_share_code_format("AbCdEf12345 "));

        // Empty
        assert!(!validate_share_code_format(""));
    }
}
