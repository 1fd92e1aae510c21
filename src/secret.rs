//! Handling of the shared secret in its textual base32 form.
//!
//! Every consumer of a secret goes through [`decode`], so the tolerance
//! rules (case-insensitivity, optional padding) apply uniformly.

use data_encoding::BASE32_NOPAD;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::OtpError;

/// Entropy used for freshly generated secrets, per RFC 4226 recommendation.
/// 20 bytes encode to 32 base32 characters.
pub const DEFAULT_SECRET_BYTES: usize = 20;

/// Brings a human-typed secret into the canonical RFC4648 base32 form:
/// uppercase, no `=` padding.
pub fn normalize(secret: &str) -> String {
    secret
        .trim()
        .trim_end_matches('=')
        .to_uppercase()
}

/// Decodes a textual base32 secret into its raw bytes.
///
/// Lowercase input and trailing `=` padding are accepted; an input that is
/// empty (or decodes to zero bytes) is rejected.
pub fn decode(secret: &str) -> Result<Vec<u8>, OtpError> {
    let normalized = normalize(secret);
    if normalized.is_empty() {
        return Err(OtpError::EmptySecret);
    }

    let decoded = BASE32_NOPAD
        .decode(normalized.as_bytes())
        .map_err(OtpError::InvalidSecret)?;

    if decoded.is_empty() {
        return Err(OtpError::EmptySecret);
    }

    Ok(decoded)
}

/// Checks that a secret is well-formed without keeping the decoded bytes.
pub fn validate(secret: &str) -> Result<(), OtpError> {
    decode(secret).map(|_| ())
}

/// Generates a fresh random secret of `byte_length` bytes and returns its
/// base32 text form (uppercase, no padding).
///
/// The bytes come from the operating system's entropy source; if that source
/// cannot be read the error is fatal and there is no fallback.
pub fn generate(byte_length: usize) -> Result<String, OtpError> {
    let mut dest = vec![0u8; byte_length];
    OsRng
        .try_fill_bytes(&mut dest)
        .map_err(OtpError::EntropyUnavailable)?;

    Ok(BASE32_NOPAD.encode(&dest))
}

/// Generates a fresh secret with the default entropy length.
pub fn generate_default() -> Result<String, OtpError> {
    generate(DEFAULT_SECRET_BYTES)
}
