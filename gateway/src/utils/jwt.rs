use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Tenant category a session belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    Hq,
    Company,
    Building,
}

/// Claims carried by a session credential. The same shape is used for the
/// short-lived bearer token and the long-lived cookie credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub sub: i64, // user id
    pub account_id: i64,
    pub account_name: String,
    pub account_type: AccountType,
    pub roles: Vec<String>,
    pub company_id: i64,
    pub company_name: String,
    pub building_id: i64,
    pub building_name: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: i64,
        account_id: i64,
        account_name: String,
        account_type: AccountType,
        roles: Vec<String>,
        company_id: i64,
        company_name: String,
        building_id: i64,
        building_name: String,
        expiration_hours: u64,
    ) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(expiration_hours as i64);

        Self {
            sub: user_id,
            account_id,
            account_name,
            account_type,
            roles,
            company_id,
            company_name,
            building_id,
            building_name,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        }
    }

    pub fn has_any_role(&self, wanted: &[String]) -> bool {
        self.roles.iter().any(|role| wanted.contains(role))
    }
}

/// User profile projected from a verified credential for UI consumption.
/// Only ever derived from claims that passed verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub account_id: String,
    pub account_name: String,
    pub account_type: AccountType,
    pub user_roles: Vec<String>,
    pub company_id: String,
    pub company_name: String,
    pub building_id: String,
    pub building_name: String,
}

impl From<&Claims> for AuthenticatedUser {
    fn from(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub.to_string(),
            account_id: claims.account_id.to_string(),
            account_name: claims.account_name.clone(),
            account_type: claims.account_type,
            user_roles: claims.roles.clone(),
            company_id: claims.company_id.to_string(),
            company_name: claims.company_name.clone(),
            building_id: claims.building_id.to_string(),
            building_name: claims.building_name.clone(),
        }
    }
}

pub fn issue_access_token(claims: &Claims, secret: &str) -> anyhow::Result<String> {
    let token = encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?;

    Ok(token)
}

/// Verifies signature and expiry. Every failure mode collapses into one
/// rejection; callers treat the outcome as a boolean gate.
pub fn verify_access_token(token: &str, secret: &str) -> anyhow::Result<Claims> {
    let mut validation = Validation::default();
    validation.leeway = 0;
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation,
    )?;

    Ok(token_data.claims)
}
