//! Clerk identity provider: RS256 session tokens and Backend API profiles.

use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::time::Duration;

use super::{ExternalIdentity, IdentityError, IdentityProvider};
use crate::config::Config;
use crate::models::UserProfile;

const PROFILE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct SessionClaims {
    sub: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClerkEmailAddress {
    pub id: String,
    pub email_address: String,
}

/// User object as returned by the Backend API and sent in webhooks.
#[derive(Debug, Clone, Deserialize)]
pub struct ClerkUser {
    pub id: String,
    #[serde(default)]
    pub email_addresses: Vec<ClerkEmailAddress>,
    #[serde(default)]
    pub primary_email_address_id: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl ClerkUser {
    pub fn profile(&self) -> UserProfile {
        let email = self
            .primary_email_address_id
            .as_deref()
            .and_then(|primary| self.email_addresses.iter().find(|e| e.id == primary))
            .or_else(|| self.email_addresses.first())
            .map(|e| e.email_address.clone());

        UserProfile {
            email,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            image_url: self.image_url.clone(),
        }
    }
}

pub struct ClerkIdentity {
    decoding_key: Option<DecodingKey>,
    validation: Validation,
    secret_key: Option<String>,
    api_url: String,
    client: reqwest::Client,
}

impl ClerkIdentity {
    /// `jwt_key` is the PEM public key; literal `\n` sequences are accepted
    /// so the key fits in a single environment variable.
    pub fn new(
        jwt_key: Option<&str>,
        secret_key: Option<String>,
        api_url: &str,
    ) -> Result<Self, IdentityError> {
        let decoding_key = jwt_key
            .map(|pem| DecodingKey::from_rsa_pem(pem.replace("\\n", "\n").as_bytes()))
            .transpose()
            .map_err(|e| IdentityError::Parse(format!("Invalid Clerk JWT key: {}", e)))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_nbf = true;
        validation.validate_aud = false;
        validation.leeway = 5;

        let client = reqwest::Client::builder()
            .timeout(PROFILE_TIMEOUT)
            .build()
            .map_err(|e| IdentityError::Network(e.to_string()))?;

        Ok(Self {
            decoding_key,
            validation,
            secret_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, IdentityError> {
        Self::new(
            config.clerk_jwt_key.as_deref(),
            config.clerk_secret_key.clone(),
            &config.clerk_api_url,
        )
    }
}

#[async_trait]
impl IdentityProvider for ClerkIdentity {
    async fn authenticate(&self, token: &str) -> Result<ExternalIdentity, IdentityError> {
        let key = self
            .decoding_key
            .as_ref()
            .ok_or(IdentityError::NotConfigured)?;

        let data = decode::<SessionClaims>(token, key, &self.validation)
            .map_err(|e| IdentityError::InvalidToken(e.to_string()))?;

        if data.claims.sub.is_empty() {
            return Err(IdentityError::InvalidToken("empty subject".to_string()));
        }
        Ok(ExternalIdentity {
            external_id: data.claims.sub,
        })
    }

    async fn fetch_profile(&self, external_id: &str) -> Result<UserProfile, IdentityError> {
        let secret = self
            .secret_key
            .as_deref()
            .ok_or(IdentityError::NotConfigured)?;

        let response = self
            .client
            .get(format!("{}/users/{}", self.api_url, external_id))
            .bearer_auth(secret)
            .send()
            .await
            .map_err(|e| IdentityError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(IdentityError::UserNotFound(external_id.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IdentityError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let user: ClerkUser = response
            .json()
            .await
            .map_err(|e| IdentityError::Parse(e.to_string()))?;
        Ok(user.profile())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;

    const PRIVATE_KEY: &str = include_str!("testdata/session_private.pem");
    const PUBLIC_KEY: &str = include_str!("testdata/session_public.pem");

    #[derive(Serialize)]
    struct TestClaims<'a> {
        sub: &'a str,
        exp: i64,
        nbf: i64,
        iat: i64,
    }

    fn token(sub: &str, exp_offset: i64) -> String {
        let now = chrono::Utc::now().timestamp();
        encode(
            &Header::new(Algorithm::RS256),
            &TestClaims {
                sub,
                exp: now + exp_offset,
                nbf: now - 10,
                iat: now - 10,
            },
            &EncodingKey::from_rsa_pem(PRIVATE_KEY.as_bytes()).unwrap(),
        )
        .unwrap()
    }

    fn identity() -> ClerkIdentity {
        ClerkIdentity::new(Some(PUBLIC_KEY), None, "http://127.0.0.1:9").unwrap()
    }

    #[tokio::test]
    async fn test_valid_session_token() {
        let identity = identity()
            .authenticate(&token("user_2abc", 300))
            .await
            .unwrap();
        assert_eq!(identity.external_id, "user_2abc");
    }

    #[tokio::test]
    async fn test_expired_session_token() {
        let result = identity().authenticate(&token("user_2abc", -300)).await;
        assert!(matches!(result, Err(IdentityError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn test_garbage_token() {
        let result = identity().authenticate("not-a-jwt").await;
        assert!(matches!(result, Err(IdentityError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn test_unconfigured_provider() {
        let identity = ClerkIdentity::new(None, None, "http://127.0.0.1:9").unwrap();
        assert!(matches!(
            identity.authenticate("x").await,
            Err(IdentityError::NotConfigured)
        ));
        assert!(matches!(
            identity.fetch_profile("user_1").await,
            Err(IdentityError::NotConfigured)
        ));
    }

    #[test]
    fn test_profile_prefers_primary_email() {
        let user: ClerkUser = serde_json::from_value(serde_json::json!({
            "id": "user_1",
            "email_addresses": [
                {"id": "e1", "email_address": "old@example.com"},
                {"id": "e2", "email_address": "main@example.com"}
            ],
            "primary_email_address_id": "e2",
            "first_name": "Ada",
            "last_name": null
        }))
        .unwrap();

        let profile = user.profile();
        assert_eq!(profile.email.as_deref(), Some("main@example.com"));
        assert_eq!(profile.first_name.as_deref(), Some("Ada"));
        assert!(profile.last_name.is_none());
    }
}
