use jsonwebtoken::{
    decode, encode, get_current_timestamp, Algorithm, DecodingKey, EncodingKey, Header,
    Validation,
};
use log::debug;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{MammoriskError, Result};

/// JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User email
    pub sub: String,
    /// Expiry, seconds since the Unix epoch
    pub exp: u64,
}

/// Issues and verifies HMAC-signed access tokens
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &self.algorithm)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Creates a service from a shared secret
    ///
    /// `algorithm` is a JWT algorithm name; only the HS family is accepted.
    pub fn new(secret: &str, algorithm: &str, ttl: Duration) -> Result<Self> {
        if secret.is_empty() {
            return Err(MammoriskError::ValidationError(
                "token secret must not be empty".to_string(),
            ));
        }
        let algorithm = Algorithm::from_str(algorithm).map_err(|_| {
            MammoriskError::ValidationError(format!("unknown JWT algorithm '{}'", algorithm))
        })?;
        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(MammoriskError::ValidationError(format!(
                "JWT algorithm {:?} needs a key pair, only HS256/HS384/HS512 are supported",
                algorithm
            )));
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            algorithm,
            ttl,
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Signs a token for `subject` expiring after the configured TTL
    pub fn issue(&self, subject: &str) -> Result<String> {
        let claims = Claims {
            sub: subject.to_string(),
            exp: get_current_timestamp() + self.ttl.as_secs(),
        };
        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String> {
        Ok(encode(&Header::new(self.algorithm), claims, &self.encoding)?)
    }

    /// Checks signature and expiry and returns the subject
    pub fn verify(&self, token: &str) -> Result<String> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            debug!("Rejected token: {}", e);
            MammoriskError::AuthError("could not validate credentials".to_string())
        })?;
        if data.claims.sub.is_empty() {
            return Err(MammoriskError::AuthError(
                "could not validate credentials".to_string(),
            ));
        }
        Ok(data.claims.sub)
    }
}
