pub mod render;
pub mod secret;
pub mod totp;
pub(crate) mod uri_helper;

use std::{fmt::Display, str::FromStr};

use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::{Sha256, Sha512};

#[derive(Debug, thiserror::Error)]
pub enum OtpError {
    #[error("The secret is empty")]
    EmptySecret,
    #[error("Could not decode the secret as base32")]
    InvalidSecret(#[source] data_encoding::DecodeError),
    #[error("Unsupported digit count {0}. Expected a value from 1 to 10")]
    InvalidDigits(u32),
    #[error("User and issuer labels must not be empty")]
    InvalidLabel,
    #[error("The system entropy source could not be read")]
    EntropyUnavailable(#[source] rand::Error),
    #[error("Invalid hashing algorithm, found {0}. Expected one of: SHA1, SHA256 or SHA512")]
    InvalidHashingAlgorithm(String),
    #[error("Could not parse the URI")]
    UriParseError(#[source] url::ParseError),
    #[error("Invalid digest")]
    InvalidDigest(Vec<u8>),
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub enum OtpHashAlgorithm {
    #[default]
    SHA1,
    SHA256,
    SHA512,
}

impl Display for OtpHashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SHA1 => write!(f, "SHA1"),
            Self::SHA256 => write!(f, "SHA256"),
            Self::SHA512 => write!(f, "SHA512"),
        }
    }
}

impl FromStr for OtpHashAlgorithm {
    type Err = OtpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_uppercase();

        match normalized.as_str() {
            "SHA1" => Ok(Self::SHA1),
            "SHA256" => Ok(Self::SHA256),
            "SHA512" => Ok(Self::SHA512),
            _ => Err(OtpError::InvalidHashingAlgorithm(s.to_string())),
        }
    }
}

/// A derived one-time code, kept together with the digit count it was
/// truncated to so the zero-padded textual form can be reproduced.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct OtpCode {
    pub(crate) code: u32,
    pub(crate) digits: u32,
}

impl OtpCode {
    pub fn integer(&self) -> u32 {
        self.code
    }
}

impl Display for OtpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:0padding$}",
            self.code,
            padding = (self.digits as usize)
        )
    }
}

pub trait Otp {
    /// Decodes a secret (given as an RFC4648 base32-encoded ASCII string)
    /// into a byte string.
    ///
    /// Decoding is case-insensitive and tolerates missing `=` padding.
    fn decode_secret(secret: &str) -> Result<Vec<u8>, OtpError> {
        secret::decode(secret)
    }

    /// Calculates the HMAC digest of the counter for the given secret.
    ///
    /// # Panics
    /// If the HMAC context cannot be constructed
    fn calc_digest(
        &self,
        decoded_secret: &[u8],
        algorithm: OtpHashAlgorithm,
        data: u64,
    ) -> Vec<u8> {
        let data = data.to_be_bytes();

        match algorithm {
            OtpHashAlgorithm::SHA1 => {
                let mut mac = Hmac::<Sha1>::new_from_slice(decoded_secret)
                    .expect("HMAC accepts keys of any size");
                mac.update(&data);
                mac.finalize().into_bytes().to_vec()
            }
            OtpHashAlgorithm::SHA256 => {
                let mut mac = Hmac::<Sha256>::new_from_slice(decoded_secret)
                    .expect("HMAC accepts keys of any size");
                mac.update(&data);
                mac.finalize().into_bytes().to_vec()
            }
            OtpHashAlgorithm::SHA512 => {
                let mut mac = Hmac::<Sha512>::new_from_slice(decoded_secret)
                    .expect("HMAC accepts keys of any size");
                mac.update(&data);
                mac.finalize().into_bytes().to_vec()
            }
        }
    }

    /// Encodes the HMAC digest into a truncated integer.
    ///
    /// The low-order 4 bits of the last digest byte select the offset of the
    /// 4 bytes composing the code; the top bit is masked off so the value
    /// fits 31 bits before the decimal truncation.
    fn encode_digest_truncated(digest: &[u8], target_digits_count: u32) -> Result<u32, OtpError> {
        let offset = match digest.last() {
            Some(x) => *x & 0xf,
            None => return Err(OtpError::InvalidDigest(Vec::from(digest))),
        } as usize;

        // Gets the 4 bytes that will compose the code
        let code_bytes: [u8; 4] = match digest
            .get(offset..offset + 4)
            .and_then(|bytes| bytes.try_into().ok())
        {
            Some(x) => x,
            None => return Err(OtpError::InvalidDigest(Vec::from(digest))),
        };

        let code = u32::from_be_bytes(code_bytes);
        // 64-bit modulus so a 10-digit truncation does not overflow
        let truncation_factor = u64::pow(10, target_digits_count);

        Ok(((code & 0x7fffffff) as u64 % truncation_factor) as u32)
    }

    fn to_uri(&self, user: &str, issuer: &str) -> Result<String, OtpError>;
}
