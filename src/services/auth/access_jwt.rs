use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use thiserror::Error;

use crate::services::auth::identity::Identity;

// Errors returned by access-token verification.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("malformed token")]
    MalformedToken(#[source] jsonwebtoken::errors::Error),
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("token not yet valid")]
    NotYetValid,
    #[error("missing or invalid 'uid' claim")]
    MissingClaim,
}

impl AuthError {
    /// Stable, value-free label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedToken(_) => "malformed_token",
            Self::InvalidSignature => "invalid_signature",
            Self::Expired => "expired",
            Self::NotYetValid => "not_yet_valid",
            Self::MissingClaim => "missing_claim",
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::ImmatureSignature => Self::NotYetValid,
            // Wrong algorithm family, unparsable header/payload, bad base64, ...
            _ => Self::MalformedToken(e),
        }
    }
}

#[derive(Debug, Error)]
#[error("access token secret must not be empty")]
pub struct EmptySecret;

/// Access token (JWT) claims.
///
/// `uid` is kept as a raw JSON value: issuers are not consistent about
/// integer vs. float encoding, and a wrong type must surface as
/// `MissingClaim` instead of a parse failure.
#[derive(Debug, Deserialize)]
struct AccessTokenClaims {
    #[serde(default)]
    uid: Option<serde_json::Value>,
}

/// HMAC (HS256/384/512) access-token verifier.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct AccessTokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for AccessTokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("AccessTokenVerifier")
            .field("validation", &self.validation)
            .finish()
    }
}

impl AccessTokenVerifier {
    pub fn new(secret: &str, leeway_seconds: u64) -> Result<Self, EmptySecret> {
        if secret.is_empty() {
            return Err(EmptySecret);
        }

        let decoding_key = DecodingKey::from_secret(secret.as_bytes());

        // Only the HMAC family. A header naming RS*/ES*/EdDSA (or "none") never
        // reaches signature verification.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        // exp/nbf are checked when present but not required; uid is the only
        // claim this service depends on.
        validation.required_spec_claims.clear();
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.validate_aud = false;
        validation.leeway = leeway_seconds;

        Ok(Self {
            decoding_key,
            validation,
        })
    }

    /// Verify a raw access token and extract the caller identity.
    pub fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let data =
            jsonwebtoken::decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation)?;

        let uid = data
            .claims
            .uid
            .as_ref()
            .and_then(uid_from_claim)
            .ok_or(AuthError::MissingClaim)?;

        Ok(Identity::new(uid))
    }
}

// Helper: numeric `uid` claim -> u64. Integral floats (42.0) are accepted.
fn uid_from_claim(value: &serde_json::Value) -> Option<u64> {
    let serde_json::Value::Number(n) = value else {
        return None;
    };
    if let Some(uid) = n.as_u64() {
        return Some(uid);
    }

    let f = n.as_f64()?;
    // 2^64 itself is not representable.
    if f.is_finite() && f.fract() == 0.0 && f >= 0.0 && f < 18_446_744_073_709_551_616.0 {
        Some(f as u64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use jsonwebtoken::{EncodingKey, Header};
    use serde_json::json;

    const SECRET: &str = "test-secret";

    fn sign_with(alg: Algorithm, secret: &str, claims: &serde_json::Value) -> String {
        jsonwebtoken::encode(
            &Header::new(alg),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn sign(claims: serde_json::Value) -> String {
        sign_with(Algorithm::HS256, SECRET, &claims)
    }

    fn verifier() -> AccessTokenVerifier {
        AccessTokenVerifier::new(SECRET, 0).unwrap()
    }

    fn now() -> u64 {
        jsonwebtoken::get_current_timestamp()
    }

    // Assemble a token by hand; jsonwebtoken refuses to produce these.
    fn forge(header: serde_json::Value, claims: serde_json::Value, signature: &[u8]) -> String {
        format!(
            "{}.{}.{}",
            URL_SAFE_NO_PAD.encode(header.to_string()),
            URL_SAFE_NO_PAD.encode(claims.to_string()),
            URL_SAFE_NO_PAD.encode(signature),
        )
    }

    #[test]
    fn valid_token_yields_uid() {
        let identity = verifier().verify(&sign(json!({ "uid": 42 }))).unwrap();
        assert_eq!(identity.uid(), 42);
    }

    #[test]
    fn verification_is_deterministic() {
        let token = sign(json!({ "uid": 7 }));
        let v = verifier();
        assert_eq!(v.verify(&token).unwrap(), v.verify(&token).unwrap());
    }

    #[test]
    fn all_hmac_variants_are_accepted() {
        for alg in [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512] {
            let token = sign_with(alg, SECRET, &json!({ "uid": 5 }));
            assert_eq!(verifier().verify(&token).unwrap().uid(), 5);
        }
    }

    #[test]
    fn max_uid_is_accepted() {
        let identity = verifier().verify(&sign(json!({ "uid": u64::MAX }))).unwrap();
        assert_eq!(identity.uid(), u64::MAX);
    }

    #[test]
    fn integral_float_uid_is_accepted() {
        let identity = verifier().verify(&sign(json!({ "uid": 42.0 }))).unwrap();
        assert_eq!(identity.uid(), 42);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = sign_with(Algorithm::HS256, "other-secret", &json!({ "uid": 42 }));
        assert!(matches!(
            verifier().verify(&token),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let token = sign(json!({ "uid": 42 }));
        let parts: Vec<&str> = token.split('.').collect();
        let tampered = format!(
            "{}.{}.{}",
            parts[0],
            URL_SAFE_NO_PAD.encode(json!({ "uid": 99 }).to_string()),
            parts[2]
        );
        assert!(matches!(
            verifier().verify(&tampered),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn garbage_is_malformed() {
        for token in ["", "not-a-jwt", "a.b.c", "a.b"] {
            assert!(
                matches!(verifier().verify(token), Err(AuthError::MalformedToken(_))),
                "{token:?}"
            );
        }
    }

    #[test]
    fn none_algorithm_is_malformed() {
        let token = forge(
            json!({ "alg": "none", "typ": "JWT" }),
            json!({ "uid": 42 }),
            b"",
        );
        assert!(matches!(
            verifier().verify(&token),
            Err(AuthError::MalformedToken(_))
        ));
    }

    #[test]
    fn asymmetric_algorithm_header_is_malformed() {
        // RS256 header "signed" with the shared secret: the classic key-confusion forgery.
        let token = forge(
            json!({ "alg": "RS256", "typ": "JWT" }),
            json!({ "uid": 42 }),
            b"whatever",
        );
        assert!(matches!(
            verifier().verify(&token),
            Err(AuthError::MalformedToken(_))
        ));
    }

    #[test]
    fn missing_uid_is_missing_claim() {
        let token = sign(json!({ "sub": "42" }));
        assert!(matches!(
            verifier().verify(&token),
            Err(AuthError::MissingClaim)
        ));
    }

    #[test]
    fn non_numeric_uid_is_missing_claim() {
        for uid in [json!("42"), json!(null), json!(true), json!([42]), json!({ "v": 42 })] {
            let token = sign(json!({ "uid": uid }));
            assert!(
                matches!(verifier().verify(&token), Err(AuthError::MissingClaim)),
                "{uid}"
            );
        }
    }

    #[test]
    fn unrepresentable_uid_is_missing_claim() {
        for uid in [json!(-1), json!(1.5), json!(-0.5), json!(1e20)] {
            let token = sign(json!({ "uid": uid }));
            assert!(
                matches!(verifier().verify(&token), Err(AuthError::MissingClaim)),
                "{uid}"
            );
        }
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = sign(json!({ "uid": 42, "exp": now() - 3600 }));
        assert!(matches!(verifier().verify(&token), Err(AuthError::Expired)));
    }

    #[test]
    fn leeway_covers_small_clock_skew() {
        let token = sign(json!({ "uid": 42, "exp": now() - 10 }));
        let lenient = AccessTokenVerifier::new(SECRET, 60).unwrap();
        assert_eq!(lenient.verify(&token).unwrap().uid(), 42);
    }

    #[test]
    fn future_nbf_is_rejected() {
        let token = sign(json!({ "uid": 42, "nbf": now() + 3600 }));
        assert!(matches!(
            verifier().verify(&token),
            Err(AuthError::NotYetValid)
        ));
    }

    #[test]
    fn empty_secret_is_refused() {
        assert!(AccessTokenVerifier::new("", 60).is_err());
    }

    #[test]
    fn debug_does_not_print_key_material() {
        let out = format!("{:?}", verifier());
        assert!(!out.contains(SECRET));
    }
}
