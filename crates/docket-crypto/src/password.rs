//! Salted PBKDF2 password hashing.
//!
//! Stored credentials have the form `base64(salt):base64(key)` where the salt
//! is 16 random bytes and the key is 32 bytes of PBKDF2-HMAC-SHA256 output
//! at 100,000 iterations. The format carries no version tag, so the
//! parameters below are fixed for as long as existing credentials must keep
//! verifying.
//!
//! # Security
//!
//! - Salts come from the OS CSPRNG and are fresh on every call.
//! - Key comparison uses [`subtle::ConstantTimeEq`].
//! - [`verify_password`] never errors. A malformed stored credential still
//!   pays for a full key derivation, so it cannot be told apart from a wrong
//!   password by timing.
//! - Derived key material is zeroized on drop.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CryptoError, CryptoResult};

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Derived key length in bytes.
pub const KEY_LEN: usize = 32;

/// PBKDF2 iteration count.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Separator between the salt and key halves.
pub const SEPARATOR: char = ':';

/// Salt used to burn the same KDF cost when the stored credential is unusable.
const DUMMY_SALT: [u8; SALT_LEN] = *b"docket-dummy-slt";

/// A PBKDF2-derived key. Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
struct DerivedKey([u8; KEY_LEN]);

impl DerivedKey {
    fn derive(password: &[u8], salt: &[u8]) -> Self {
        let mut key = [0u8; KEY_LEN];
        pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, PBKDF2_ITERATIONS, &mut key);
        Self(key)
    }

    fn ct_matches(&self, other: &Self) -> bool {
        bool::from(self.0.as_slice().ct_eq(other.0.as_slice()))
    }
}

/// A parsed `salt:hash` credential.
///
/// Use [`CredentialBlob::parse`] to inspect a stored value and
/// [`fmt::Display`] to produce the persisted string.
#[derive(Clone)]
pub struct CredentialBlob {
    salt: [u8; SALT_LEN],
    key: DerivedKey,
}

impl CredentialBlob {
    /// Derive a new credential for `password` with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::EntropyUnavailable`] if the OS random source fails.
    pub fn derive(password: &str) -> CryptoResult<Self> {
        let salt = generate_salt()?;
        let key = DerivedKey::derive(password.as_bytes(), &salt);
        Ok(Self { salt, key })
    }

    /// Parse a stored credential.
    ///
    /// Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns a [`CryptoError`] describing why the value is not a valid
    /// credential: missing or repeated separator, bad base64, or wrong
    /// decoded lengths.
    pub fn parse(stored: &str) -> CryptoResult<Self> {
        let stored = stored.trim();
        if stored.is_empty() {
            return Err(CryptoError::MalformedCredential("empty"));
        }

        let (salt_b64, key_b64) = stored
            .split_once(SEPARATOR)
            .ok_or(CryptoError::MalformedCredential("missing separator"))?;
        if key_b64.contains(SEPARATOR) {
            return Err(CryptoError::MalformedCredential("more than one separator"));
        }

        let salt_bytes = STANDARD
            .decode(salt_b64)
            .map_err(|_| CryptoError::InvalidBase64Encoding { part: "salt" })?;
        let key_bytes = zeroize::Zeroizing::new(
            STANDARD
                .decode(key_b64)
                .map_err(|_| CryptoError::InvalidBase64Encoding { part: "hash" })?,
        );

        let salt: [u8; SALT_LEN] =
            salt_bytes
                .as_slice()
                .try_into()
                .map_err(|_| CryptoError::InvalidSaltLength {
                    expected: SALT_LEN,
                    actual: salt_bytes.len(),
                })?;
        let key: [u8; KEY_LEN] =
            key_bytes
                .as_slice()
                .try_into()
                .map_err(|_| CryptoError::InvalidKeyLength {
                    expected: KEY_LEN,
                    actual: key_bytes.len(),
                })?;

        Ok(Self {
            salt,
            key: DerivedKey(key),
        })
    }

    /// Check `password` against this credential in constant time.
    #[must_use]
    pub fn matches(&self, password: &str) -> bool {
        let candidate = DerivedKey::derive(password.as_bytes(), &self.salt);
        candidate.ct_matches(&self.key)
    }

    /// The raw salt bytes.
    #[must_use]
    pub fn salt(&self) -> &[u8; SALT_LEN] {
        &self.salt
    }

    /// Encode as the persisted `base64(salt):base64(key)` string.
    #[must_use]
    pub fn encode(&self) -> String {
        format!(
            "{}{SEPARATOR}{}",
            STANDARD.encode(self.salt),
            STANDARD.encode(self.key.0)
        )
    }
}

impl fmt::Display for CredentialBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl fmt::Debug for CredentialBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialBlob")
            .field("salt", &STANDARD.encode(self.salt))
            .finish_non_exhaustive()
    }
}

impl FromStr for CredentialBlob {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Hash a password into a storable `salt:hash` credential.
///
/// Deliberately expensive. Empty passwords are hashed like any other.
///
/// # Errors
///
/// Returns [`CryptoError::EntropyUnavailable`] if the OS random source fails.
pub fn hash_password(password: &str) -> CryptoResult<String> {
    CredentialBlob::derive(password).map(|blob| blob.encode())
}

/// Verify a password against a stored credential.
///
/// Returns `false` for a wrong password and for any stored value that is not
/// a well-formed credential. Both paths perform one full key derivation.
#[must_use]
pub fn verify_password(password: &str, stored: &str) -> bool {
    match CredentialBlob::parse(stored) {
        Ok(blob) => blob.matches(password),
        Err(_) => {
            burn_verification_cost(password);
            false
        },
    }
}

/// Spend the cost of one verification without a usable credential.
///
/// Callers that have no stored credential at all (unknown user names) use
/// this so the response time matches a real verification.
pub fn burn_verification_cost(password: &str) {
    let candidate = DerivedKey::derive(password.as_bytes(), &DUMMY_SALT);
    let reference = DerivedKey([0u8; KEY_LEN]);
    std::hint::black_box(candidate.ct_matches(&reference));
}

fn generate_salt() -> CryptoResult<[u8; SALT_LEN]> {
    let mut salt = [0u8; SALT_LEN];
    OsRng
        .try_fill_bytes(&mut salt)
        .map_err(|e| CryptoError::EntropyUnavailable(e.to_string()))?;
    Ok(salt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let stored = hash_password("correct-password").unwrap();
        assert!(verify_password("correct-password", &stored));
        assert!(!verify_password("wrong-password", &stored));
    }

    #[test]
    fn test_hash_format() {
        let stored = hash_password("hunter2").unwrap();
        let re = regex::Regex::new(r"^[A-Za-z0-9+/=]+:[A-Za-z0-9+/=]+$").unwrap();
        assert!(re.is_match(&stored), "unexpected format: {stored}");

        let (salt, key) = stored.split_once(':').unwrap();
        assert_eq!(STANDARD.decode(salt).unwrap().len(), SALT_LEN);
        assert_eq!(STANDARD.decode(key).unwrap().len(), KEY_LEN);
    }

    #[test]
    fn test_fresh_salt_each_call() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();
        assert_ne!(a, b);
        assert!(verify_password("same", &a));
        assert!(verify_password("same", &b));
    }

    #[test]
    fn test_empty_password_is_hashed() {
        let stored = hash_password("").unwrap();
        assert!(verify_password("", &stored));
        assert!(!verify_password(" ", &stored));
    }

    #[test]
    fn test_verify_is_deterministic() {
        let stored = hash_password("repeat").unwrap();
        for _ in 0..3 {
            assert!(verify_password("repeat", &stored));
            assert!(!verify_password("repeaT", &stored));
        }
    }

    #[test]
    fn test_known_vector() {
        // Salt "AAAAAAAAAAAAAAAAAAAAAA==" is sixteen zero bytes.
        let salt = [0u8; SALT_LEN];
        let key = DerivedKey::derive(b"password", &salt);
        let blob = CredentialBlob { salt, key };
        let stored = blob.encode();
        assert!(stored.starts_with("AAAAAAAAAAAAAAAAAAAAAA==:"));
        assert!(verify_password("password", &stored));
    }

    #[test]
    fn test_malformed_blobs_fail_closed() {
        let sixteen = STANDARD.encode([7u8; SALT_LEN]);
        let thirty_two = STANDARD.encode([9u8; KEY_LEN]);
        let cases = [
            String::new(),
            "   ".to_owned(),
            "not-a-valid-blob".to_owned(),
            ":".to_owned(),
            format!("{sixteen}:"),
            format!(":{thirty_two}"),
            format!("{sixteen}:{thirty_two}:{thirty_two}"),
            format!("!!!:{thirty_two}"),
            format!("{sixteen}:@@@"),
            format!("{}:{thirty_two}", STANDARD.encode([1u8; 8])),
            format!("{sixteen}:{}", STANDARD.encode([1u8; 31])),
        ];
        for blob in &cases {
            assert!(!verify_password("hunter2", blob), "accepted {blob:?}");
        }
        assert!(!verify_password("hunter2", "not-a-valid-blob"));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            CredentialBlob::parse(""),
            Err(CryptoError::MalformedCredential("empty"))
        ));
        assert!(matches!(
            CredentialBlob::parse("abc"),
            Err(CryptoError::MalformedCredential("missing separator"))
        ));
        assert!(matches!(
            CredentialBlob::parse("a:b:c"),
            Err(CryptoError::MalformedCredential("more than one separator"))
        ));
        assert!(matches!(
            CredentialBlob::parse("***:AAAA"),
            Err(CryptoError::InvalidBase64Encoding { part: "salt" })
        ));
        let short_salt = format!("{}:{}", STANDARD.encode([0u8; 4]), STANDARD.encode([0u8; 32]));
        assert!(matches!(
            CredentialBlob::parse(&short_salt),
            Err(CryptoError::InvalidSaltLength {
                expected: 16,
                actual: 4
            })
        ));
    }

    #[test]
    fn test_parse_then_display_is_stable() {
        let stored = hash_password("stable").unwrap();
        let blob: CredentialBlob = stored.parse().unwrap();
        assert_eq!(blob.to_string(), stored);
        assert!(blob.matches("stable"));
    }

    #[test]
    fn test_debug_hides_key() {
        let blob = CredentialBlob::derive("secret").unwrap();
        let debug = format!("{blob:?}");
        assert!(debug.contains("salt"));
        assert!(!debug.contains(&STANDARD.encode(blob.key.0)));
    }
}
