//! Tracking-hash generation.
//!
//! Tracked links need a unique, unguessable token; a predictable token would
//! let anyone inflate visit counts or enumerate links.

use base64::Engine as _;

/// Length of random bytes before base64 encoding.
const HASH_LENGTH_BYTES: usize = 12;

/// Generates a cryptographically secure random tracking hash.
///
/// Uses `getrandom` for entropy and encodes the result as URL-safe base64
/// without padding, producing a 16-character token.
///
/// # Panics
///
/// Panics if the system random number generator fails (extremely rare).
pub fn generate_hash() -> String {
    let mut buffer = [0u8; HASH_LENGTH_BYTES];

    getrandom::fill(&mut buffer).expect("Failed to generate random bytes");

    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buffer)
}
