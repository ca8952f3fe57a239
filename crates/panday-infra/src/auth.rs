//! Identity-provider session verification.
//!
//! Session tokens are RS256 JWTs signed by the identity provider. The PEM
//! public key comes from `CLERK_JWT_KEY`; when authorized parties are
//! configured the `azp` claim must be one of them.

use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;

use panday_core::identity::session::{Session, SessionVerifier};
use panday_types::error::IdentityError;

use crate::config::ClerkConfig;

#[derive(Debug, Deserialize)]
struct SessionClaims {
    sub: String,
    #[serde(default)]
    sid: Option<String>,
    #[serde(default)]
    azp: Option<String>,
}

pub struct ClerkSessionVerifier {
    key: DecodingKey,
    validation: Validation,
    authorized_parties: Vec<String>,
}

impl ClerkSessionVerifier {
    pub fn from_rsa_pem(pem: &str, authorized_parties: Vec<String>) -> Result<Self, IdentityError> {
        // Keys pasted into env files often carry literal "\n" sequences.
        let pem = pem.replace("\\n", "\n");
        let key = DecodingKey::from_rsa_pem(pem.as_bytes())
            .map_err(|e| IdentityError::InvalidSession(format!("invalid JWT key: {e}")))?;
        Ok(Self::with_key(key, Algorithm::RS256, authorized_parties))
    }

    fn with_key(key: DecodingKey, algorithm: Algorithm, authorized_parties: Vec<String>) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        Self {
            key,
            validation,
            authorized_parties,
        }
    }

    #[cfg(test)]
    fn from_secret(secret: &[u8], authorized_parties: Vec<String>) -> Self {
        Self::with_key(
            DecodingKey::from_secret(secret),
            Algorithm::HS256,
            authorized_parties,
        )
    }
}

impl SessionVerifier for ClerkSessionVerifier {
    fn verify(&self, token: &str) -> Result<Session, IdentityError> {
        let data = decode::<SessionClaims>(token, &self.key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => IdentityError::Expired,
                _ => IdentityError::InvalidSession(e.to_string()),
            }
        })?;
        let claims = data.claims;

        if !self.authorized_parties.is_empty() {
            let authorized = claims
                .azp
                .as_ref()
                .is_some_and(|azp| self.authorized_parties.contains(azp));
            if !authorized {
                return Err(IdentityError::InvalidSession(
                    "unauthorized party".to_string(),
                ));
            }
        }

        Ok(Session {
            user_id: claims.sub,
            session_id: claims.sid,
        })
    }
}

/// Rejects every token. Used when no JWT key is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledSessionVerifier;

impl SessionVerifier for DisabledSessionVerifier {
    fn verify(&self, _token: &str) -> Result<Session, IdentityError> {
        Err(IdentityError::NotConfigured)
    }
}

/// Verifier for the configured identity provider.
///
/// Without `CLERK_JWT_KEY` every session is rejected and protected routes
/// redirect to sign-in.
pub fn session_verifier(clerk: &ClerkConfig) -> Result<Arc<dyn SessionVerifier>, IdentityError> {
    match clerk.jwt_key.as_deref() {
        Some(pem) => Ok(Arc::new(ClerkSessionVerifier::from_rsa_pem(
            pem,
            clerk.authorized_parties.clone(),
        )?)),
        None => {
            tracing::warn!("CLERK_JWT_KEY not set; sessions will not verify");
            Ok(Arc::new(DisabledSessionVerifier))
        }
    }
}
