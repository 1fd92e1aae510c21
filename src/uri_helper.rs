use crate::{secret, totp::Totp, OtpError, OtpHashAlgorithm};

const TOTP_URI_BASE: &str = "otpauth://totp/";

const URI_SECRET_QUERY: &str = "secret";
const URI_ISSUER_QUERY: &str = "issuer";
const URI_HASH_QUERY: &str = "algorithm";
const URI_PERIOD_QUERY: &str = "period";
const URI_DIGITS_QUERY: &str = "digits";

const DEFAULT_HASH: OtpHashAlgorithm = OtpHashAlgorithm::SHA1;
const DEFAULT_PERIOD: u64 = 30;
const DEFAULT_DIGITS: u32 = 6;

/// Builds the `otpauth://totp/{issuer}:{user}?secret=...&issuer=...`
/// provisioning URI for an authenticator app to scan.
///
/// Labels are percent-encoded by the URI layer; the secret is embedded in
/// its canonical base32 form, which needs no encoding. `algorithm`,
/// `digits` and `period` are appended only when they differ from the RFC
/// defaults, so a default configuration produces the short two-parameter
/// form authenticator apps expect.
pub fn totp_to_uri(totp: &Totp, user: &str, issuer: &str) -> Result<String, OtpError> {
    if user.trim().is_empty() || issuer.trim().is_empty() {
        return Err(OtpError::InvalidLabel);
    }

    let mut uri = url::Url::parse(TOTP_URI_BASE).map_err(OtpError::UriParseError)?;
    uri.set_path(&format!("{issuer}:{user}"));

    {
        let mut query_params = uri.query_pairs_mut();

        query_params
            .append_pair(URI_SECRET_QUERY, &secret::normalize(&totp.secret))
            .append_pair(URI_ISSUER_QUERY, issuer);

        if totp.algorithm != DEFAULT_HASH {
            query_params.append_pair(URI_HASH_QUERY, &totp.algorithm.to_string());
        }

        if totp.digits != DEFAULT_DIGITS {
            query_params.append_pair(URI_DIGITS_QUERY, &totp.digits.to_string());
        }

        if totp.period != DEFAULT_PERIOD {
            query_params.append_pair(URI_PERIOD_QUERY, &totp.period.to_string());
        }
    }

    Ok(uri.to_string())
}
