use hmac::{Hmac, Mac};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use crate::constants::PASSWORD_SALT_LEN;

type HmacSha256 = Hmac<Sha256>;

const HASH_SCHEME: &str = "pbkdf2";
const HASH_LEN: usize = 32;

// =============================================================================
// Password Hashing
// =============================================================================

/// Hash a password with a fresh random salt
///
/// # Format
/// `pbkdf2$<rounds>$<salt hex>$<hash hex>` using PBKDF2-HMAC-SHA256, so the
/// round count can be raised later without invalidating stored hashes.
///
/// CPU bound; call from `spawn_blocking` in request handlers.
pub fn hash_password(password: &str, rounds: u32) -> String {
    let mut salt = [0u8; PASSWORD_SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    hash_with_salt(password, &salt, rounds.max(1))
}

fn hash_with_salt(password: &str, salt: &[u8], rounds: u32) -> String {
    let mut out = [0u8; HASH_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, rounds, &mut out);
    format!(
        "{}${}${}${}",
        HASH_SCHEME,
        rounds,
        hex::encode(salt),
        hex::encode(out)
    )
}

/// Verify a password against a stored hash produced by [`hash_password`]
///
/// Unparseable stored hashes never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some(scheme), Some(rounds), Some(salt), Some(expected), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        tracing::warn!("Stored password hash has unexpected format");
        return false;
    };

    if scheme != HASH_SCHEME {
        return false;
    }

    let (Ok(rounds), Ok(salt), Ok(expected)) =
        (rounds.parse::<u32>(), hex::decode(salt), hex::decode(expected))
    else {
        tracing::warn!("Stored password hash has unexpected format");
        return false;
    };

    if rounds == 0 || expected.len() != HASH_LEN {
        return false;
    }

    let mut actual = [0u8; HASH_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, rounds, &mut actual);
    constant_time_eq(&actual, &expected)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

// =============================================================================
// Access Tokens
// =============================================================================

/// Identity carried by an access token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub id: u64,
    pub username: String,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expires at (Unix seconds)
    pub exp: i64,
}

#[derive(Debug, Error, PartialEq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("bad signature")]
    BadSignature,
    #[error("token expired")]
    Expired,
}

fn new_mac(secret: &str) -> Option<HmacSha256> {
    match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => Some(m),
        Err(_) => {
            tracing::error!("Failed to create HMAC instance");
            None
        }
    }
}

/// Compute the hex-encoded HMAC-SHA256 of `data`
pub fn sign_hmac(data: &str, secret: &str) -> String {
    new_mac(secret)
        .map(|mut mac| {
            mac.update(data.as_bytes());
            hex::encode(mac.finalize().into_bytes())
        })
        .unwrap_or_default()
}

/// Verify HMAC-SHA256 signature
///
/// # Arguments
/// * `data` - The data that was signed
/// * `signature` - The hex-encoded HMAC signature
/// * `secret` - The shared secret key (from environment)
pub fn verify_hmac(data: &str, signature: &str, secret: &str) -> bool {
    let Some(mut mac) = new_mac(secret) else {
        return false;
    };

    mac.update(data.as_bytes());

    let sig_bytes = match hex::decode(signature) {
        Ok(bytes) => bytes,
        Err(_) => {
            tracing::warn!("Invalid hex signature format");
            return false;
        }
    };

    mac.verify_slice(&sig_bytes).is_ok()
}

/// Sign claims into a token string
///
/// # Format
/// `hex(claims JSON) "." hex(HMAC-SHA256(secret, hex(claims JSON)))`
pub fn sign_token(claims: &Claims, secret: &str) -> String {
    // Claims contain only integers and strings
    let payload = hex::encode(serde_json::to_vec(claims).unwrap_or_default());
    let signature = sign_hmac(&payload, secret);
    format!("{}.{}", payload, signature)
}

/// Issue a token for a user, valid for `ttl_secs` from `now`
pub fn issue_token(id: u64, username: &str, secret: &str, now: i64, ttl_secs: i64) -> String {
    let claims = Claims {
        id,
        username: username.to_string(),
        iat: now,
        exp: now + ttl_secs,
    };
    sign_token(&claims, secret)
}

/// Verify signature and expiry of a token, returning its claims
pub fn verify_token(token: &str, secret: &str, now: i64) -> Result<Claims, TokenError> {
    let (payload, signature) = token.split_once('.').ok_or(TokenError::Malformed)?;

    if !verify_hmac(payload, signature, secret) {
        return Err(TokenError::BadSignature);
    }

    let bytes = hex::decode(payload).map_err(|_| TokenError::Malformed)?;
    let claims: Claims = serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)?;

    if now >= claims.exp {
        return Err(TokenError::Expired);
    }

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key";

    // =========================================================================
    // Password Tests
    // =========================================================================

    #[test]
    fn test_hash_password_roundtrip() {
        let stored = hash_password("hunter22", 1000);

        assert!(stored.starts_with("pbkdf2$"));
        assert!(verify_password("hunter22", &stored));
        assert!(!verify_password("hunter23", &stored));
    }

    #[test]
    fn test_hash_password_is_salted() {
        let first = hash_password("same-password", 1000);
        let second = hash_password("same-password", 1000);

        // Different salts produce different stored hashes
        assert_ne!(first, second);
        assert!(verify_password("same-password", &first));
        assert!(verify_password("same-password", &second));
    }

    #[test]
    fn test_verify_password_rejects_garbage() {
        assert!(!verify_password("pw", ""));
        assert!(!verify_password("pw", "plaintext"));
        assert!(!verify_password("pw", "bcrypt$10$aa$bb"));
        assert!(!verify_password("pw", "pbkdf2$many$zz$yy"));
        assert!(!verify_password("pw", "pbkdf2$1$$"));
        assert!(!verify_password("pw", "pbkdf2$0$aa$bb"));
    }

    #[test]
    fn test_hash_with_salt_known_rounds() {
        let stored = hash_with_salt("pw", b"salt", 1000);
        let parts: Vec<&str> = stored.split('$').collect();

        assert_eq!(parts.len(), 4);
        assert_eq!(parts[1], "1000");
        assert_eq!(parts[2], hex::encode(b"salt"));
        assert_eq!(parts[3].len(), HASH_LEN * 2);
        assert!(verify_password("pw", &stored));
    }

    // =========================================================================
    // HMAC & Token Tests
    // =========================================================================

    #[test]
    fn test_verify_hmac_valid() {
        let signature = sign_hmac("test data", SECRET);
        assert!(verify_hmac("test data", &signature, SECRET));
    }

    #[test]
    fn test_verify_hmac_wrong_secret() {
        let signature = sign_hmac("test data", SECRET);
        assert!(!verify_hmac("test data", &signature, "wrong-secret"));
        assert!(!verify_hmac("test data", "not-hex", SECRET));
    }

    #[test]
    fn test_token_roundtrip() {
        let now = 1_700_000_000;
        let token = issue_token(7, "a@b.io", SECRET, now, 3600);

        let claims = verify_token(&token, SECRET, now + 10).unwrap();
        assert_eq!(claims.id, 7);
        assert_eq!(claims.username, "a@b.io");
        assert_eq!(claims.exp, now + 3600);
    }

    #[test]
    fn test_token_expired() {
        let now = 1_700_000_000;
        let token = issue_token(7, "a@b.io", SECRET, now, 3600);

        assert_eq!(
            verify_token(&token, SECRET, now + 3600),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_token_tampered() {
        let now = 1_700_000_000;
        let token = issue_token(7, "a@b.io", SECRET, now, 3600);

        // Swap in claims for a different user, keeping the old signature
        let (_, signature) = token.split_once('.').unwrap();
        let forged_claims = Claims {
            id: 1,
            username: "admin@b.io".into(),
            iat: now,
            exp: now + 3600,
        };
        let forged_payload = hex::encode(serde_json::to_vec(&forged_claims).unwrap());
        let forged = format!("{}.{}", forged_payload, signature);

        assert_eq!(
            verify_token(&forged, SECRET, now),
            Err(TokenError::BadSignature)
        );
        assert_eq!(
            verify_token(&token, "other-secret", now),
            Err(TokenError::BadSignature)
        );
        assert_eq!(
            verify_token("no-dot-here", SECRET, now),
            Err(TokenError::Malformed)
        );
    }
}
