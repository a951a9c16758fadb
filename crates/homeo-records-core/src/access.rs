//! Shared-password gate in front of the record operations.

use sha2::{Digest, Sha256};

use crate::records::{RecordError, RecordResult};

/// Single shared password check.
///
/// Only SHA-256 digests are kept and compared, so the secret itself does not
/// need to stay in memory and the comparison covers the whole digest.
#[derive(Debug, Clone, Default)]
pub struct AccessGate {
    digest: Option<[u8; 32]>,
}

impl AccessGate {
    /// Gate for `secret`; `None` leaves the gate open.
    pub fn new(secret: Option<&str>) -> Self {
        Self {
            digest: secret.map(digest),
        }
    }

    /// Gate from a hex-encoded SHA-256 digest of the password.
    pub fn from_hex_digest(hex_digest: &str) -> RecordResult<Self> {
        let bytes = hex::decode(hex_digest.trim()).map_err(|e| {
            RecordError::Validation(format!("Password digest is not valid hex: {}", e))
        })?;
        let digest: [u8; 32] = bytes.try_into().map_err(|_| {
            RecordError::Validation("Password digest must be 32 bytes".to_string())
        })?;
        Ok(Self {
            digest: Some(digest),
        })
    }

    /// Whether a password is configured.
    pub fn is_open(&self) -> bool {
        self.digest.is_none()
    }

    /// Check `input` against the configured password.
    pub fn verify(&self, input: &str) -> RecordResult<()> {
        let Some(expected) = &self.digest else {
            return Ok(());
        };

        let actual = digest(input);
        let diff = expected
            .iter()
            .zip(actual.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b));
        if diff == 0 {
            Ok(())
        } else {
            tracing::warn!("rejected app password");
            Err(RecordError::AccessDenied)
        }
    }
}

/// Hex-encoded SHA-256 of `password`, the form accepted by [`AccessGate::from_hex_digest`].
pub fn password_digest_hex(password: &str) -> String {
    hex::encode(digest(password))
}

fn digest(input: &str) -> [u8; 32] {
    Sha256::digest(input.as_bytes()).into()
}
