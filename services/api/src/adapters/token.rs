//! services/api/src/adapters/token.rs
//!
//! This module contains the bearer-token adapter, which is the concrete
//! implementation of the `TokenService` port from the `core` crate. Tokens are
//! HS256-signed JWTs carrying the caller's identity and role.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use registrar_core::domain::{AuthClaims, Role};
use registrar_core::ports::{TokenError, TokenService};
use serde::{Deserialize, Serialize};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A token adapter that implements the `TokenService` port with signed JWTs.
pub struct JwtTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_hours: i64,
}

impl JwtTokens {
    /// Creates a new `JwtTokens` signer/verifier from a shared secret.
    pub fn new(secret: &[u8], ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl_hours,
        }
    }
}

//=========================================================================================
// "Impure" Wire Claims Struct
//=========================================================================================

/// The serialized claim set. The role travels as its wire string and is parsed
/// back into the domain enum on verification.
#[derive(Serialize, Deserialize)]
struct WireClaims {
    sub: i64,
    name: String,
    email: String,
    role: String,
    iat: i64,
    exp: i64,
}

//=========================================================================================
// `TokenService` Trait Implementation
//=========================================================================================

impl TokenService for JwtTokens {
    fn issue(&self, claims: &AuthClaims) -> Result<String, TokenError> {
        let now = Utc::now();
        let wire = WireClaims {
            sub: claims.user_id,
            name: claims.name.clone(),
            email: claims.email.clone(),
            role: claims.role.as_str().to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.ttl_hours)).timestamp(),
        };
        jsonwebtoken::encode(&Header::default(), &wire, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verifies the signature and expiry. Malformed, tampered, expired and
    /// wrong-key tokens all collapse into `TokenError::Invalid`.
    fn verify(&self, token: &str) -> Result<AuthClaims, TokenError> {
        let data = jsonwebtoken::decode::<WireClaims>(token, &self.decoding, &Validation::default())
            .map_err(|_| TokenError::Invalid)?;
        let role = data
            .claims
            .role
            .parse::<Role>()
            .map_err(|_| TokenError::Invalid)?;
        Ok(AuthClaims {
            user_id: data.claims.sub,
            name: data.claims.name,
            email: data.claims.email,
            role,
        })
    }
}
