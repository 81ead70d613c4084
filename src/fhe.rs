//! Encryption stub for visit paths.
//!
//! Stands in for the external homomorphic-encryption service: it produces a
//! scheme-tagged opaque blob from the plaintext path and preferences. Only
//! that service can ever interpret the blob; this crate defines no decode.

use crate::types::Ciphertext;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;

#[derive(Serialize)]
struct SealInput<'a> {
    path: &'a str,
    preferences: &'a str,
}

/// Seal a path description and preference string into an opaque blob.
pub fn seal(path: &str, preferences: &str) -> Ciphertext {
    let input = SealInput { path, preferences };
    // Serializing two borrowed strings cannot fail.
    let json = serde_json::to_string(&input).expect("seal input serializes");
    Ciphertext::from_raw(format!("{}{}", Ciphertext::SCHEME_TAG, STANDARD.encode(json)))
}
