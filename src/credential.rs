//! Credential hashing and verification.
//!
//! Secrets are stored only as hex-encoded SHA-256 digests. Verification
//! recomputes the digest and compares in constant time.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A hex-encoded SHA-256 digest of a user secret.
///
/// The plaintext secret is never stored, logged, or otherwise retained past
/// the call that hashes it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialDigest(String);

impl CredentialDigest {
    /// Hashes a plaintext secret into a digest. Deterministic, no side effects.
    pub fn from_secret(secret: &str) -> Self {
        let digest = Sha256::digest(secret.as_bytes());
        CredentialDigest(hex::encode(digest))
    }

    /// Checks a candidate secret against this digest.
    ///
    /// Recomputes the digest for the candidate and compares the two encodings
    /// in constant time.
    pub fn verify(&self, candidate: &str) -> bool {
        let candidate_digest = Self::from_secret(candidate);
        constant_time_eq(self.0.as_bytes(), candidate_digest.0.as_bytes())
    }
}

// Digests are not secrets, but keep them out of debug output anyway so a
// stray `{:?}` on an account never hands an attacker an offline target.
impl fmt::Debug for CredentialDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CredentialDigest(..)")
    }
}

/// Compares two byte slices without an early exit on the first mismatch.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }

    result == 0
}
