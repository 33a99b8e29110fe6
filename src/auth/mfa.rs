use base64::{engine::general_purpose, Engine as _};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha1::Sha1;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

type HmacSha1 = Hmac<Sha1>;

const SECRET_BYTES: usize = 20;
const DIGITS: u32 = 6;
const PERIOD: u64 = 30;
const WINDOW: u64 = 1;

#[derive(Debug, Error)]
pub enum MfaError {
    #[error("Invalid TOTP secret")]
    InvalidSecret,
    #[error("Invalid TOTP code")]
    InvalidCode,
    #[error("System clock error: {0}")]
    ClockError(String),
}

/// Generates a fresh base64-encoded TOTP secret.
pub fn generate_secret() -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    general_purpose::STANDARD.encode(bytes)
}

/// Builds the otpauth:// provisioning URI encoded into the enrollment QR code.
pub fn provisioning_uri(issuer: &str, account: &str, secret: &str) -> String {
    format!(
        "otpauth://totp/{issuer}:{account}?secret={secret}&issuer={issuer}&algorithm=SHA1&digits={DIGITS}&period={PERIOD}"
    )
}

/// Computes the TOTP code for a given counter value (RFC 6238 over RFC 4226).
pub fn generate_code(secret: &str, counter: u64) -> Result<String, MfaError> {
    let key = general_purpose::STANDARD
        .decode(secret)
        .map_err(|_| MfaError::InvalidSecret)?;

    let mut mac = HmacSha1::new_from_slice(&key).map_err(|_| MfaError::InvalidSecret)?;
    mac.update(&counter.to_be_bytes());
    let result = mac.finalize().into_bytes();

    // Dynamic truncation per RFC 4226 section 5.3.
    let offset = (result[19] & 0xf) as usize;
    let binary = ((result[offset] as u32 & 0x7f) << 24)
        | ((result[offset + 1] as u32) << 16)
        | ((result[offset + 2] as u32) << 8)
        | (result[offset + 3] as u32);

    let code = binary % 10u32.pow(DIGITS);
    Ok(format!("{code:0width$}", width = DIGITS as usize))
}

/// Verifies a submitted code against the current time step, accepting one
/// step of clock skew in either direction.
pub fn verify_code(secret: &str, code: &str) -> Result<bool, MfaError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| MfaError::ClockError(e.to_string()))?
        .as_secs();
    verify_code_at(secret, code, now)
}

pub fn verify_code_at(secret: &str, code: &str, unix_time: u64) -> Result<bool, MfaError> {
    if code.len() != DIGITS as usize || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(false);
    }
    let counter = unix_time / PERIOD;
    let start = counter.saturating_sub(WINDOW);
    for candidate in start..=counter + WINDOW {
        if generate_code(secret, candidate)? == code {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_code_verifies_at_same_time() {
        let secret = generate_secret();
        let now = 1_700_000_000u64;
        let code = generate_code(&secret, now / PERIOD).unwrap();
        assert!(verify_code_at(&secret, &code, now).unwrap());
    }

    #[test]
    fn code_from_previous_step_is_accepted_within_window() {
        let secret = generate_secret();
        let now = 1_700_000_000u64;
        let code = generate_code(&secret, now / PERIOD - 1).unwrap();
        assert!(verify_code_at(&secret, &code, now).unwrap());
    }

    #[test]
    fn code_outside_window_is_rejected() {
        let secret = generate_secret();
        let now = 1_700_000_000u64;
        let code = generate_code(&secret, now / PERIOD - 5).unwrap();
        assert!(!verify_code_at(&secret, &code, now).unwrap());
    }

    #[test]
    fn malformed_code_is_rejected_without_error() {
        let secret = generate_secret();
        assert!(!verify_code_at(&secret, "abc123", 1_700_000_000).unwrap());
        assert!(!verify_code_at(&secret, "12345", 1_700_000_000).unwrap());
    }

    #[test]
    fn rfc6238_sha1_test_vector() {
        // RFC 6238 appendix B: ASCII key "12345678901234567890", T = 59s.
        let secret = general_purpose::STANDARD.encode(b"12345678901234567890");
        let code = generate_code(&secret, 59 / PERIOD).unwrap();
        assert_eq!(code, "287082");
    }

    #[test]
    fn provisioning_uri_contains_account_and_issuer() {
        let uri = provisioning_uri("AssetTrack", "user@example.com", "SECRET");
        assert!(uri.starts_with("otpauth://totp/AssetTrack:user@example.com?"));
        assert!(uri.contains("issuer=AssetTrack"));
        assert!(uri.contains("digits=6"));
    }
}
