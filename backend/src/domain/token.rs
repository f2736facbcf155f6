//! Identity token issuance and verification.
//!
//! Tokens are opaque two-segment strings: a base64url JSON claims segment and
//! a base64url HMAC-SHA256 signature over that segment, joined by `.`. They
//! are stateless; verification needs only the process-wide signing key and
//! the embedded expiry. The signing key is configuration established at
//! startup and never mutated afterwards.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroizing;

use super::user::Email;

type HmacSha256 = Hmac<Sha256>;

/// Token lifetime applied by [`TokenService::new`].
const DEFAULT_TTL_SECONDS: i64 = 3600;

/// Errors raised when constructing a [`SigningKey`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SigningKeyError {
    /// The key material was empty.
    #[error("signing key must not be empty")]
    Empty,
}

/// Process-wide token signing key.
///
/// Key material is wiped from memory on drop.
pub struct SigningKey(Zeroizing<Vec<u8>>);

impl SigningKey {
    /// Wrap raw key material, rejecting empty input.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, SigningKeyError> {
        if bytes.is_empty() {
            return Err(SigningKeyError::Empty);
        }
        Ok(Self(Zeroizing::new(bytes)))
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.as_slice()
    }
}

impl core::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // Never print key material; the struct exists to keep it secret.
        f.debug_struct("SigningKey").finish_non_exhaustive()
    }
}

/// Claims carried by an identity token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// The authenticated address.
    pub email: Email,
    /// Issue instant, seconds since the Unix epoch.
    pub issued_at: i64,
    /// Expiry instant, seconds since the Unix epoch.
    pub expires_at: i64,
}

/// Verification failures.
///
/// All variants collapse to the same 401 envelope at the HTTP boundary so a
/// caller cannot distinguish a forged token from an expired one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// The token did not have the expected two-segment shape or its claims
    /// segment failed to decode.
    #[error("identity token is malformed")]
    Malformed,
    /// The signature did not match the claims segment.
    #[error("identity token signature is invalid")]
    BadSignature,
    /// The token's expiry instant has passed.
    #[error("identity token has expired")]
    Expired,
}

/// Issues and verifies signed identity tokens.
///
/// # Examples
/// ```
/// use coursedesk_backend::domain::{Email, SigningKey, TokenService};
///
/// let key = SigningKey::from_bytes(b"topsecret".to_vec()).expect("non-empty key");
/// let tokens = TokenService::new(key);
/// let email = Email::new("ada@x.com").expect("valid email");
/// let token = tokens.issue(&email);
/// let claims = tokens.verify(&token).expect("fresh token verifies");
/// assert_eq!(claims.email, email);
/// ```
pub struct TokenService {
    key: SigningKey,
    ttl: Duration,
}

impl TokenService {
    /// Build a service issuing tokens with the standard one-hour lifetime.
    pub fn new(key: SigningKey) -> Self {
        Self::with_ttl(key, Duration::seconds(DEFAULT_TTL_SECONDS))
    }

    /// Build a service with an explicit lifetime. Negative lifetimes produce
    /// already-expired tokens, which tests use to exercise the expiry path.
    pub fn with_ttl(key: SigningKey, ttl: Duration) -> Self {
        Self { key, ttl }
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(self.key.as_bytes()).expect("HMAC can take key of any size")
    }

    /// Issue a signed token asserting the given address.
    pub fn issue(&self, email: &Email) -> String {
        let issued_at = Utc::now().timestamp();
        let claims = Claims {
            email: email.clone(),
            issued_at,
            expires_at: issued_at + self.ttl.num_seconds(),
        };
        let payload = match serde_json::to_vec(&claims) {
            Ok(bytes) => URL_SAFE_NO_PAD.encode(bytes),
            // Claims hold only strings and integers; serialisation is total.
            Err(err) => panic!("claims serialisation must not fail: {err}"),
        };
        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        format!("{payload}.{signature}")
    }

    /// Verify a token's signature and expiry, returning the embedded claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let (payload, signature) = token.split_once('.').ok_or(TokenError::Malformed)?;
        let signature_bytes = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::Malformed)?;

        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        // Constant-time comparison; do not decode claims before the
        // signature holds.
        mac.verify_slice(&signature_bytes)
            .map_err(|_| TokenError::BadSignature)?;

        let claim_bytes = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| TokenError::Malformed)?;
        let claims: Claims =
            serde_json::from_slice(&claim_bytes).map_err(|_| TokenError::Malformed)?;

        if claims.expires_at <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn email() -> Email {
        Email::new("ada@x.com").expect("valid email")
    }

    fn service() -> TokenService {
        let key = SigningKey::from_bytes(b"unit-test-key".to_vec()).expect("non-empty key");
        TokenService::new(key)
    }

    #[rstest]
    fn issue_then_verify_returns_the_claims(email: Email) {
        let tokens = service();
        let claims = tokens.verify(&tokens.issue(&email)).expect("verifies");
        assert_eq!(claims.email, email);
        assert_eq!(claims.expires_at - claims.issued_at, DEFAULT_TTL_SECONDS);
    }

    #[rstest]
    #[case("")]
    #[case("no-separator")]
    #[case("two.separators.here")]
    fn malformed_tokens_are_rejected(#[case] token: &str) {
        // "two.separators.here" splits into a valid shape but an undecodable
        // signature segment is still malformed.
        let err = service().verify(token).expect_err("rejected");
        assert_eq!(err, TokenError::Malformed);
    }

    #[rstest]
    fn tampered_payloads_fail_the_signature_check(email: Email) {
        let tokens = service();
        let token = tokens.issue(&email);
        let (payload, signature) = token.split_once('.').expect("two segments");
        let forged = format!("{payload}x.{signature}");
        assert_eq!(
            tokens.verify(&forged).expect_err("rejected"),
            TokenError::BadSignature
        );
    }

    #[rstest]
    fn tokens_signed_with_another_key_are_rejected(email: Email) {
        let other = TokenService::new(
            SigningKey::from_bytes(b"different-key".to_vec()).expect("non-empty key"),
        );
        let token = other.issue(&email);
        assert_eq!(
            service().verify(&token).expect_err("rejected"),
            TokenError::BadSignature
        );
    }

    #[rstest]
    fn expired_tokens_are_rejected(email: Email) {
        let key = SigningKey::from_bytes(b"unit-test-key".to_vec()).expect("non-empty key");
        let tokens = TokenService::with_ttl(key, Duration::seconds(-60));
        let token = tokens.issue(&email);
        assert_eq!(
            tokens.verify(&token).expect_err("rejected"),
            TokenError::Expired
        );
    }

    #[rstest]
    fn empty_keys_are_rejected() {
        assert_eq!(
            SigningKey::from_bytes(Vec::new()).expect_err("rejected"),
            SigningKeyError::Empty
        );
    }
}
