//! Compact API token issuance and verification
//!
//! Tokens are HS256-signed JWTs with the header segment stripped. The
//! header is fully determined by configuration (secret + algorithm) and so
//! is constant across all tokens; dropping it halves the token size and
//! hides the encoding. The returned value is `payload ‖ signature` with no
//! separators. HS256 signatures are always 43 base64url characters, so the
//! split point is known at verification time.
//!
//! Example of an issued token:
//!     eyJzdWIiOiI3MTNmOWEyYjQiLCJleHAiOjI1MzQwMjMwMDc5OX0Xb2...g049
//! Where the last 43 characters are the signature and the rest is the
//! claims payload.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use tracing::debug;

use crate::domain::token::{TokenRecord, TokenStore};
use crate::domain::user::UserStore;
use crate::domain::{AuthError, DomainError};

/// Length of a base64url-encoded HMAC-SHA-256 signature
const SIGNATURE_LENGTH: usize = 43;

/// Sentinel expiry for tokens issued without one: 9999-12-31T23:59:59Z
const FAR_FUTURE_TIMESTAMP: i64 = 253_402_300_799;

/// Configuration for the token service
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Secret key for signing tokens
    pub secret: String,
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

/// Result of issuing a new token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// The compact token value (only shown once at creation)
    pub token: String,
    /// Opaque subject identifier embedded in the token
    pub subject_id: String,
    /// SHA-512 hash persisted for lookup
    pub content_hash: String,
    /// Effective expiration instant
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: i64,
}

/// Issues and verifies compact bearer tokens.
///
/// Signing and MAC verification are pure; the persisted record and its
/// owner decide authorization, never the client-presented subject alone.
pub struct TokenService<T, U>
where
    T: TokenStore,
    U: UserStore,
{
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    header_segment: String,
    token_store: Arc<T>,
    user_store: Arc<U>,
}

impl<T: TokenStore, U: UserStore> std::fmt::Debug for TokenService<T, U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .field("token_store", &self.token_store)
            .field("user_store", &self.user_store)
            .finish()
    }
}

impl<T: TokenStore, U: UserStore> TokenService<T, U> {
    pub fn new(config: TokenConfig, token_store: Arc<T>, user_store: Arc<U>) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        // The header depends only on the algorithm, so derive it once from
        // a throwaway signed token instead of hardcoding the encoding.
        let probe = jsonwebtoken::encode(
            &Header::default(),
            &Claims {
                sub: "probe".to_string(),
                exp: FAR_FUTURE_TIMESTAMP,
            },
            &encoding_key,
        )
        .expect("HS256 signing with a symmetric key cannot fail");
        let header_segment = probe
            .split('.')
            .next()
            .expect("signed token always has a header segment")
            .to_string();

        Self {
            encoding_key,
            decoding_key,
            header_segment,
            token_store,
            user_store,
        }
    }

    /// Issue a new token for the given owner.
    ///
    /// Persists only the content hash, never the token itself.
    pub async fn issue(
        &self,
        owner_user_id: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<IssuedToken, DomainError> {
        let subject_id = generate_subject_id();
        let token = self.sign_compact(&subject_id, expires_at)?;
        let content_hash = hash_subject(&subject_id);
        let effective_expiry = expires_at.unwrap_or_else(far_future_expiry);

        debug!(subject_id = %subject_id, "Issued token");

        let record = TokenRecord::new(&subject_id, &content_hash, owner_user_id, effective_expiry);
        self.token_store.create(record).await?;

        Ok(IssuedToken {
            token,
            subject_id,
            content_hash,
            expires_at: effective_expiry,
        })
    }

    /// Verify a compact token and return its subject id.
    ///
    /// Fails with a distinct kind per failure mode: malformed input, bad
    /// signature, expiry, unknown/inactive record, inactive owner.
    pub async fn verify(&self, token: &str) -> Result<String, DomainError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::NotAuthenticated.into());
        }

        let claims = self.decode_compact(token)?;
        if claims.sub.is_empty() {
            return Err(AuthError::Malformed.into());
        }

        let record = self
            .token_store
            .find_by_hash(&hash_subject(&claims.sub))
            .await?
            .ok_or(AuthError::UnknownToken)?;

        if !record.is_active() {
            return Err(AuthError::InactiveToken.into());
        }

        if !self.user_store.is_active(record.owner_user_id()).await? {
            return Err(AuthError::InactiveUser.into());
        }

        debug!(subject_id = %claims.sub, "Verified token");
        Ok(claims.sub)
    }

    /// Sign claims and strip the constant header segment
    fn sign_compact(
        &self,
        subject_id: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<String, DomainError> {
        let claims = Claims {
            sub: subject_id.to_string(),
            exp: expires_at
                .map(|t| t.timestamp())
                .unwrap_or(FAR_FUTURE_TIMESTAMP),
        };

        let signed = jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| DomainError::internal(format!("Failed to sign token: {}", e)))?;

        let mut segments = signed.split('.');
        let (Some(_header), Some(payload), Some(signature)) =
            (segments.next(), segments.next(), segments.next())
        else {
            return Err(DomainError::internal("Signed token has unexpected shape"));
        };

        Ok(format!("{}{}", payload, signature))
    }

    /// Reassemble `header.payload.signature` and run standard validation
    fn decode_compact(&self, token: &str) -> Result<Claims, AuthError> {
        // Shorter than (or exactly) a bare signature cannot hold a payload
        if token.len() <= SIGNATURE_LENGTH {
            return Err(AuthError::Malformed);
        }

        let (payload, signature) = token.split_at(token.len() - SIGNATURE_LENGTH);
        let assembled = format!("{}.{}.{}", self.header_segment, payload, signature);

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        match jsonwebtoken::decode::<Claims>(&assembled, &self.decoding_key, &validation) {
            Ok(data) => Ok(data.claims),
            Err(e) => match e.kind() {
                ErrorKind::ExpiredSignature => Err(AuthError::Expired),
                ErrorKind::InvalidSignature => Err(AuthError::InvalidSignature),
                _ => Err(AuthError::Malformed),
            },
        }
    }
}

/// Generate an opaque subject identifier: a 3-digit numeral prefix plus six
/// random hex characters. An index value, not a secret.
fn generate_subject_id() -> String {
    let mut rng = rand::thread_rng();
    let prefix: u16 = rng.gen_range(100..1000);
    let mut random = [0u8; 3];
    rng.fill_bytes(&mut random);

    format!("{}{}", prefix, hex::encode(random))
}

/// SHA-512 of the subject id; the canonical content hash on both the
/// issuance and verification paths.
pub fn hash_subject(subject_id: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(subject_id.as_bytes());
    hex::encode(hasher.finalize())
}

/// The sentinel expiry used for tokens issued without one
pub fn far_future_expiry() -> DateTime<Utc> {
    Utc.timestamp_opt(FAR_FUTURE_TIMESTAMP, 0)
        .single()
        .expect("sentinel timestamp is valid")
}
