use async_trait::async_trait;

use crate::{
    services::backend::{AuthBackend, BackendError, LoginGrant, RefreshGrant},
    utils::jwt::{AccountType, AuthenticatedUser},
};

pub const MOCK_ACCESS_TOKEN: &str = "mock-access-token";
pub const MOCK_REFRESH_TOKEN: &str = "mock-refresh-token";
pub const MOCK_USER_ID: &str = "admin";
pub const MOCK_PASSWORD: &str = "admin123";

/// In-process stand-in for the real auth backend. Selected via
/// `MOCK_BACKEND=true`; also what the integration suites run against.
#[derive(Debug, Default)]
pub struct MockAuthBackend;

impl MockAuthBackend {
    pub fn new() -> Self {
        Self
    }

    fn admin_user() -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: "1".to_string(),
            account_id: "1".to_string(),
            account_name: "Administrator".to_string(),
            account_type: AccountType::Hq,
            user_roles: vec!["ROLE_ADMIN".to_string()],
            company_id: "1".to_string(),
            company_name: "FacilityHub HQ".to_string(),
            building_id: "1".to_string(),
            building_name: "Headquarters".to_string(),
        }
    }

    fn rejected() -> BackendError {
        BackendError::Rejected {
            code: "E00401".to_string(),
            message: "Invalid user id or password".to_string(),
        }
    }
}

#[async_trait]
impl AuthBackend for MockAuthBackend {
    async fn login(&self, user_id: &str, password: &str) -> Result<LoginGrant, BackendError> {
        if user_id != MOCK_USER_ID || password != MOCK_PASSWORD {
            return Err(Self::rejected());
        }

        Ok(LoginGrant {
            access_token: MOCK_ACCESS_TOKEN.to_string(),
            refresh_token: MOCK_REFRESH_TOKEN.to_string(),
            user: Self::admin_user(),
            is_init_password: false,
            is_agree_privacy: true,
        })
    }

    async fn refresh(&self, credential: &str) -> Result<RefreshGrant, BackendError> {
        if credential != MOCK_REFRESH_TOKEN {
            return Err(BackendError::Rejected {
                code: "E00401".to_string(),
                message: "Refresh credential rejected".to_string(),
            });
        }

        // Always rotate so the cookie-overwrite path gets exercised.
        Ok(RefreshGrant {
            access_token: MOCK_ACCESS_TOKEN.to_string(),
            refresh_token: Some(MOCK_REFRESH_TOKEN.to_string()),
        })
    }

    async fn logout(&self, _credential: &str) -> Result<(), BackendError> {
        Ok(())
    }
}
