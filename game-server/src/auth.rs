use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use base64::Engine;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use game_types::Player;

/// Public keys used to sign Firebase ID tokens.
pub const FIREBASE_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

const JWKS_CACHE_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirebaseClaims {
    #[serde(default)]
    pub aud: String, // Project id
    #[serde(default)]
    pub iss: String, // https://securetoken.google.com/<project id>
    #[serde(default)]
    pub iat: u64,
    #[serde(default)]
    pub exp: u64,
    pub sub: Option<String>,     // Firebase uid
    pub user_id: Option<String>, // Same uid, older tokens
    pub email: Option<String>,
}

impl FirebaseClaims {
    fn into_player(self) -> Result<Player, AuthError> {
        let uid = self
            .user_id
            .or(self.sub)
            .filter(|uid| !uid.is_empty())
            .ok_or(AuthError::InvalidToken)?;

        Ok(Player {
            uid,
            email: self.email.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwksKey {
    pub kty: String,
    pub alg: Option<String>,
    pub n: Option<String>,
    pub e: Option<String>,
    pub kid: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwksResponse {
    pub keys: Vec<JwksKey>,
}

pub struct AuthService {
    client: Client,
    jwks_cache: Arc<RwLock<HashMap<String, (DecodingKey, SystemTime)>>>,
    project_id: String,
    dev_mode: bool,
}

impl AuthService {
    pub fn new(project_id: String) -> Self {
        Self {
            client: Client::new(),
            jwks_cache: Arc::new(RwLock::new(HashMap::new())),
            project_id,
            dev_mode: false,
        }
    }

    /// Accept unsigned tokens. Never enable outside local development.
    pub fn new_dev_mode() -> Self {
        Self {
            client: Client::new(),
            jwks_cache: Arc::new(RwLock::new(HashMap::new())),
            project_id: "dev".to_string(),
            dev_mode: true,
        }
    }

    pub fn is_dev_mode(&self) -> bool {
        self.dev_mode
    }

    pub async fn validate_token(&self, token: &str) -> Result<Player, AuthError> {
        if self.dev_mode {
            return self.validate_dev_token(token);
        }

        let header = decode_header(token).map_err(|e| {
            tracing::warn!("Failed to decode JWT header: {:?}", e);
            AuthError::InvalidToken
        })?;
        let kid = header.kid.ok_or_else(|| {
            tracing::warn!("JWT header missing 'kid' field");
            AuthError::InvalidToken
        })?;

        let decoding_key = self.get_decoding_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.project_id]);
        validation.set_issuer(&[format!("https://securetoken.google.com/{}", self.project_id)]);

        let token_data = decode::<FirebaseClaims>(token, &decoding_key, &validation)
            .map_err(|e| {
                tracing::warn!("JWT token validation failed: {:?}", e);
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    jsonwebtoken::errors::ErrorKind::InvalidAudience => AuthError::AudienceMismatch,
                    jsonwebtoken::errors::ErrorKind::InvalidIssuer => AuthError::IssuerMismatch,
                    _ => AuthError::InvalidToken,
                }
            })?;

        token_data.claims.into_player()
    }

    async fn get_decoding_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        {
            let cache = self.jwks_cache.read().await;
            if let Some((key, cached_time)) = cache.get(kid) {
                let elapsed = cached_time.elapsed().unwrap_or(JWKS_CACHE_TTL);
                if elapsed < JWKS_CACHE_TTL {
                    return Ok(key.clone());
                }
                tracing::debug!("Cached key for kid '{}' expired, fetching fresh", kid);
            }
        }

        tracing::debug!("Fetching JWKS from {}", FIREBASE_JWKS_URL);
        let response = self
            .client
            .get(FIREBASE_JWKS_URL)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Failed to fetch JWKS: {:?}", e);
                AuthError::JwksFetchError
            })?;

        if !response.status().is_success() {
            tracing::warn!("JWKS fetch returned status: {}", response.status());
            return Err(AuthError::JwksFetchError);
        }

        let jwks: JwksResponse = response.json().await.map_err(|e| {
            tracing::warn!("Failed to parse JWKS JSON: {:?}", e);
            AuthError::JwksFetchError
        })?;

        let jwks_key = jwks.keys.iter().find(|key| key.kid == kid).ok_or_else(|| {
            tracing::warn!("Key with kid '{}' not found in JWKS", kid);
            AuthError::KeyNotFound
        })?;

        let (Some(n), Some(e)) = (&jwks_key.n, &jwks_key.e) else {
            tracing::warn!("JWKS key '{}' has no RSA components", kid);
            return Err(AuthError::InvalidKey);
        };
        let decoding_key = DecodingKey::from_rsa_components(n, e)?;

        self.jwks_cache
            .write()
            .await
            .insert(kid.to_string(), (decoding_key.clone(), SystemTime::now()));

        Ok(decoding_key)
    }

    /// Dev tokens are either the plain form `uid:email` or an unsigned JWT
    /// whose payload is trusted as is.
    fn validate_dev_token(&self, token: &str) -> Result<Player, AuthError> {
        // Base64url never contains ':', so this cannot be a JWT
        if let Some((uid, email)) = token.split_once(':') {
            if uid.is_empty() {
                return Err(AuthError::InvalidToken);
            }
            return Ok(Player {
                uid: uid.to_string(),
                email: email.to_string(),
            });
        }

        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() != 3 {
            return Err(AuthError::InvalidToken);
        }

        let payload = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(parts[1].trim_end_matches('='))
            .map_err(|e| {
                tracing::warn!("Failed to decode JWT payload in dev mode: {:?}", e);
                AuthError::InvalidToken
            })?;

        let claims: FirebaseClaims = serde_json::from_slice(&payload).map_err(|e| {
            tracing::warn!("Failed to parse JWT claims in dev mode: {:?}", e);
            AuthError::InvalidToken
        })?;

        claims.into_player()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Failed to fetch JWKS")]
    JwksFetchError,
    #[error("Key not found")]
    KeyNotFound,
    #[error("Invalid key")]
    InvalidKey,
    #[error("Audience mismatch")]
    AudienceMismatch,
    #[error("Issuer mismatch")]
    IssuerMismatch,
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(_: jsonwebtoken::errors::Error) -> Self {
        AuthError::InvalidKey
    }
}
