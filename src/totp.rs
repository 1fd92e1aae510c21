use crate::{uri_helper, Otp, OtpCode, OtpError, OtpHashAlgorithm};

/// The drift-tolerance window: two steps behind, the current step, and two
/// steps ahead, in the order they are meant to be displayed.
pub const DRIFT_WINDOW_OFFSETS: [i64; 5] = [-60, -30, 0, 30, 60];

/// Smallest and largest supported code widths. Ten digits is the ceiling
/// the 31-bit truncated value can fill.
const MIN_DIGITS: u32 = 1;
const MAX_DIGITS: u32 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct Totp {
    pub(crate) secret: String,
    pub(crate) algorithm: OtpHashAlgorithm,
    pub(crate) period: u64,
    pub(crate) digits: u32,
}

/// One entry of a drift-tolerance batch: the requested signed offset, the
/// instant it resolved to, and the code at that instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsetCode {
    pub offset_seconds: i64,
    pub seconds_since_epoch: u64,
    pub code: OtpCode,
}

impl Otp for Totp {
    fn to_uri(&self, user: &str, issuer: &str) -> Result<String, OtpError> {
        uri_helper::totp_to_uri(self, user, issuer)
    }
}

impl Totp {
    /// Creates the config for the [Time-based One-time Password Algorithm](http://en.wikipedia.org/wiki/Time-based_One-time_Password_Algorithm)
    /// (TOTP) given an RFC4648 base32 encoded secret
    ///
    /// Obs.: This method defaults to the SHA1 hash, a 6-digit code and a period of 30 seconds
    pub fn new(secret: String) -> Self {
        Self {
            secret,
            algorithm: OtpHashAlgorithm::SHA1,
            period: 30,
            digits: 6,
        }
    }

    ///  Sets hashing algorithm
    pub fn with_algorithm(&mut self, algorithm: OtpHashAlgorithm) -> &mut Self {
        self.algorithm = algorithm;

        self
    }

    ///  Sets the period in seconds
    pub fn with_period(&mut self, period: u64) -> &mut Self {
        self.period = period;

        self
    }

    ///  Sets the number of digits to generate
    pub fn with_digits(&mut self, digits: u32) -> &mut Self {
        self.digits = digits;

        self
    }

    /// Generates a Totp from the provided seconds since the UNIX epoch
    /// truncated to the specified number of digits
    pub fn generate(&self, seconds_since_epoch: u64) -> Result<OtpCode, OtpError> {
        if !(MIN_DIGITS..=MAX_DIGITS).contains(&self.digits) {
            return Err(OtpError::InvalidDigits(self.digits));
        }

        let calculated_time = seconds_since_epoch / self.period;

        let decoded = Self::decode_secret(self.secret.as_str())?;
        let digest = self.calc_digest(decoded.as_slice(), self.algorithm, calculated_time);

        let code = Self::encode_digest_truncated(digest.as_ref(), self.digits)?;

        Ok(OtpCode {
            code,
            digits: self.digits,
        })
    }

    /// Generates one code per signed offset around the given instant,
    /// preserving the order of the offsets.
    ///
    /// Used to tolerate clock drift between the generator and the party
    /// checking the code: printing the codes of the adjacent steps lets the
    /// user pick the one their counterpart expects. Offsets that would land
    /// before the UNIX epoch clamp to the epoch itself.
    pub fn codes_at_offsets(
        &self,
        seconds_since_epoch: u64,
        offsets: &[i64],
    ) -> Result<Vec<OffsetCode>, OtpError> {
        let mut codes = Vec::with_capacity(offsets.len());

        for &offset_seconds in offsets {
            let instant = seconds_since_epoch.saturating_add_signed(offset_seconds);

            codes.push(OffsetCode {
                offset_seconds,
                seconds_since_epoch: instant,
                code: self.generate(instant)?,
            });
        }

        Ok(codes)
    }

    /// Seconds left before the code changes
    pub fn remaining_seconds(&self, seconds_since_epoch: u64) -> u64 {
        self.period - (seconds_since_epoch % self.period)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    use crate::{
        totp::{Totp, DRIFT_WINDOW_OFFSETS},
        Otp, OtpError, OtpHashAlgorithm,
    };

    #[fixture]
    pub fn sha1_secret() -> String {
        "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ".to_string()
    }

    #[fixture]
    pub fn sha256_secret() -> String {
        "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQGEZA".to_string()
    }

    #[fixture]
    pub fn sha512_secret() -> String {
        "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQGEZDGNA".to_string()
    }

    #[rstest]
    #[case(sha1_secret(), "sha1", 59, "94287082")]
    #[case(sha256_secret(), "sha256", 59, "46119246")]
    #[case(sha512_secret(), "sha512", 59, "90693936")]
    #[case(sha1_secret(), "sha1", 1111111109, "07081804")]
    #[case(sha256_secret(), "sha256", 1111111109, "68084774")]
    #[case(sha512_secret(), "sha512", 1111111109, "25091201")]
    #[case(sha1_secret(), "sha1", 1111111111, "14050471")]
    #[case(sha256_secret(), "sha256", 1111111111, "67062674")]
    #[case(sha512_secret(), "sha512", 1111111111, "99943326")]
    #[case(sha1_secret(), "sha1", 1234567890, "89005924")]
    #[case(sha256_secret(), "sha256", 1234567890, "91819424")]
    #[case(sha512_secret(), "sha512", 1234567890, "93441116")]
    #[case(sha1_secret(), "sha1", 2000000000, "69279037")]
    #[case(sha256_secret(), "sha256", 2000000000, "90698825")]
    #[case(sha512_secret(), "sha512", 2000000000, "38618901")]
    #[case(sha1_secret(), "sha1", 20000000000, "65353130")]
    #[case(sha256_secret(), "sha256", 20000000000, "77737706")]
    #[case(sha512_secret(), "sha512", 20000000000, "47863826")]
    #[case(sha1_secret(), "sha1", 20000000000, "353130")]
    #[case(sha256_secret(), "sha256", 20000000000, "737706")]
    #[case(sha512_secret(), "sha512", 20000000000, "863826")]
    fn rfc6238_vectors(
        #[case] secret: String,
        #[case] hash: OtpHashAlgorithm,
        #[case] timestamp: u64,
        #[case] expected: &str,
    ) {
        let mut totp_base = Totp::new(secret);
        totp_base
            .with_algorithm(hash)
            .with_digits(expected.len() as u32);

        let generated_otp = totp_base.generate(timestamp).unwrap();
        assert_eq!(expected, generated_otp.to_string());
    }

    // RFC 4226 appendix D vectors, exercised through the shared digest and
    // truncation core that TOTP is defined over.
    #[rstest]
    #[case(0, 755224)]
    #[case(1, 287082)]
    #[case(2, 359152)]
    #[case(3, 969429)]
    #[case(4, 338314)]
    #[case(5, 254676)]
    #[case(6, 287922)]
    #[case(7, 162583)]
    #[case(8, 399871)]
    #[case(9, 520489)]
    fn rfc4226_vectors(sha1_secret: String, #[case] counter: u64, #[case] expected: u32) {
        let totp = Totp::new(sha1_secret.clone());

        let decoded = Totp::decode_secret(&sha1_secret).unwrap();
        let digest = totp.calc_digest(&decoded, OtpHashAlgorithm::SHA1, counter);

        assert_eq!(
            Totp::encode_digest_truncated(&digest, 6).unwrap(),
            expected
        );
    }

    #[rstest]
    #[case(0)]
    #[case(59)]
    #[case(1111111109)]
    #[case(u32::MAX as u64 * 30)]
    #[case(2u64.pow(32) * 30)]
    fn codes_are_six_digit_strings(sha1_secret: String, #[case] timestamp: u64) {
        let totp = Totp::new(sha1_secret);

        let rendered = totp.generate(timestamp).unwrap().to_string();

        assert_eq!(rendered.len(), 6);
        assert!(rendered.chars().all(|c| c.is_ascii_digit()));
    }

    #[rstest]
    fn generation_is_deterministic(sha1_secret: String) {
        let totp = Totp::new(sha1_secret);

        assert_eq!(
            totp.generate(1234567890).unwrap(),
            totp.generate(1234567890).unwrap()
        );
    }

    #[rstest]
    #[case(0)]
    #[case(11)]
    fn out_of_range_digits_are_rejected(sha1_secret: String, #[case] digits: u32) {
        let mut totp = Totp::new(sha1_secret);
        totp.with_digits(digits);

        assert!(matches!(
            totp.generate(59),
            Err(OtpError::InvalidDigits(d)) if d == digits
        ));
    }

    #[test]
    fn empty_secret_is_rejected() {
        let totp = Totp::new("".to_string());

        assert!(matches!(totp.generate(59), Err(OtpError::EmptySecret)));
    }

    #[rstest]
    fn drift_window_preserves_offset_order(sha1_secret: String) {
        let totp = Totp::new(sha1_secret);
        let base = 1111111109;

        let codes = totp.codes_at_offsets(base, &DRIFT_WINDOW_OFFSETS).unwrap();

        assert_eq!(codes.len(), 5);
        for (entry, offset) in codes.iter().zip(DRIFT_WINDOW_OFFSETS) {
            assert_eq!(entry.offset_seconds, offset);
            assert_eq!(
                entry.seconds_since_epoch,
                base.saturating_add_signed(offset)
            );
            assert_eq!(entry.code, totp.generate(entry.seconds_since_epoch).unwrap());
        }
    }

    #[rstest]
    fn drift_window_clamps_to_epoch(sha1_secret: String) {
        let totp = Totp::new(sha1_secret);

        let codes = totp.codes_at_offsets(30, &[-60]).unwrap();

        assert_eq!(codes[0].seconds_since_epoch, 0);
        assert_eq!(codes[0].code, totp.generate(0).unwrap());
    }

    #[rstest]
    #[case(59, 1)]
    #[case(60, 30)]
    #[case(75, 15)]
    fn remaining_seconds_in_step(
        sha1_secret: String,
        #[case] timestamp: u64,
        #[case] expected: u64,
    ) {
        let totp = Totp::new(sha1_secret);

        assert_eq!(totp.remaining_seconds(timestamp), expected);
    }

    #[rstest]
    fn to_uri_default_config(sha1_secret: String) {
        let totp = Totp::new(sha1_secret);

        let generated_uri = totp.to_uri("user@example.com", "Example Corp").unwrap();

        assert_eq!(
            "otpauth://totp/Example%20Corp:user@example.com?secret=GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ&issuer=Example+Corp",
            generated_uri
        );
    }

    #[rstest]
    fn to_uri_appends_non_default_params(sha1_secret: String) {
        let mut totp = Totp::new(sha1_secret);
        totp.with_algorithm(OtpHashAlgorithm::SHA256)
            .with_digits(8)
            .with_period(60);

        let generated_uri = totp.to_uri("john.doe@email.com", "ACME Co").unwrap();

        assert_eq!(
            "otpauth://totp/ACME%20Co:john.doe@email.com?secret=GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ&issuer=ACME+Co&algorithm=SHA256&digits=8&period=60",
            generated_uri
        );
    }

    #[rstest]
    fn to_uri_normalizes_the_secret(#[values("gezdgnbvgy3tqojq", "GEZDGNBVGY3TQOJQ====")] raw: &str) {
        let totp = Totp::new(raw.to_string());

        let generated_uri = totp.to_uri("user@example.com", "Example Corp").unwrap();

        assert!(generated_uri.contains("secret=GEZDGNBVGY3TQOJQ&"));
    }

    #[rstest]
    #[case("", "Example Corp")]
    #[case("user@example.com", "")]
    #[case("   ", "Example Corp")]
    fn to_uri_rejects_blank_labels(
        sha1_secret: String,
        #[case] user: &str,
        #[case] issuer: &str,
    ) {
        let totp = Totp::new(sha1_secret);

        assert!(matches!(
            totp.to_uri(user, issuer),
            Err(OtpError::InvalidLabel)
        ));
    }

    #[test]
    fn hash_algorithm_parses_case_insensitively() {
        use std::str::FromStr;

        assert_eq!(
            OtpHashAlgorithm::from_str("sha256").unwrap(),
            OtpHashAlgorithm::SHA256
        );
        assert!(OtpHashAlgorithm::from_str("md5").is_err());
    }
}
