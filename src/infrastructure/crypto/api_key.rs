//! API key value generation

use rand::Rng;

/// Prefix identifying secret API keys
pub const API_KEY_PREFIX: &str = "sk-";

/// Length of the random part following the prefix
pub const API_KEY_RANDOM_LEN: usize = 32;

/// URL-safe alphabet (same 64 symbols as base64url)
const URL_SAFE_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Generate a new key value: `sk-` + 32 URL-safe characters from the OS-seeded CSPRNG.
pub fn generate_api_key() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..API_KEY_RANDOM_LEN)
        .map(|_| URL_SAFE_ALPHABET[rng.gen_range(0..URL_SAFE_ALPHABET.len())] as char)
        .collect();

    format!("{}{}", API_KEY_PREFIX, suffix)
}
