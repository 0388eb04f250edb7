use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("App certificate is not configured.")]
    MissingCertificate,

    #[error("Invalid token request: {0}")]
    InvalidRequest(String),

    #[error("Token lifetime of {0}s is out of range")]
    InvalidTtl(u64),

    #[error("Failed to encode token claims: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Privilege granted by a join credential
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Publisher,
    Subscriber,
}

/// Claims carried inside an issued credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub app_id: String,
    pub channel: String,
    /// 0 lets the holder join under any uid
    pub uid: u32,
    pub role: Role,
    pub issued_at: i64,
    pub expires_at: i64,
}

/// Issues short-lived channel join credentials
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, channel: &str, uid: u32, role: Role) -> Result<String, TokenError>;
}

/// Keyed-digest credential: `base64(claims).base64(sha256(certificate || claims))`
///
/// Vendor-compatible token formats plug in behind [`TokenIssuer`]; this one is
/// opaque to clients and verifiable by anyone holding the certificate.
pub struct SignedTokenIssuer {
    app_id: String,
    certificate: String,
    ttl: Duration,
}

impl SignedTokenIssuer {
    pub fn new(
        app_id: impl Into<String>,
        certificate: impl Into<String>,
        ttl_secs: u64,
    ) -> Result<Self, TokenError> {
        let certificate = certificate.into();
        if certificate.is_empty() {
            return Err(TokenError::MissingCertificate);
        }

        Ok(Self {
            app_id: app_id.into(),
            certificate,
            ttl: i64::try_from(ttl_secs)
                .ok()
                .and_then(Duration::try_seconds)
                .ok_or(TokenError::InvalidTtl(ttl_secs))?,
        })
    }

    fn issue_at(
        &self,
        channel: &str,
        uid: u32,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        if channel.is_empty() {
            return Err(TokenError::InvalidRequest(
                "channel name must not be empty".to_string(),
            ));
        }

        let claims = TokenClaims {
            app_id: self.app_id.clone(),
            channel: channel.to_string(),
            uid,
            role,
            issued_at: now.timestamp(),
            expires_at: now
                .checked_add_signed(self.ttl)
                .ok_or(TokenError::InvalidTtl(self.ttl.num_seconds().unsigned_abs()))?
                .timestamp(),
        };

        let payload = serde_json::to_vec(&claims)?;
        let signature = self.sign(&payload);

        Ok(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(&payload),
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    fn sign(&self, payload: &[u8]) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(self.certificate.as_bytes());
        hasher.update(payload);
        hasher.finalize().to_vec()
    }

    /// Check signature and expiry, returning the claims
    pub fn verify(&self, token: &str) -> Option<TokenClaims> {
        let (payload_b64, signature_b64) = token.split_once('.')?;
        let payload = URL_SAFE_NO_PAD.decode(payload_b64).ok()?;
        let signature = URL_SAFE_NO_PAD.decode(signature_b64).ok()?;

        if self.sign(&payload) != signature {
            return None;
        }

        let claims: TokenClaims = serde_json::from_slice(&payload).ok()?;
        if claims.expires_at <= Utc::now().timestamp() {
            return None;
        }

        Some(claims)
    }
}

impl TokenIssuer for SignedTokenIssuer {
    fn issue(&self, channel: &str, uid: u32, role: Role) -> Result<String, TokenError> {
        self.issue_at(channel, uid, role, Utc::now())
    }
}
