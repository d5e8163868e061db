use regex::Regex;
use reqwest::Method;
use serde_json::json;
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::supabase::{ApiError, SupabaseClient};

use crate::models::{AuthError, AuthSession, LoginRequest, RegisterRequest};

const MIN_PASSWORD_LENGTH: usize = 8;

/// Proxies registration and login to the credential service. Credentials are
/// never stored or hashed here; this cell only validates the request shape
/// and forwards it.
pub struct AuthService {
    supabase: SupabaseClient,
}

impl AuthService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<AuthSession, AuthError> {
        validate_email(&request.email)?;
        if request.password.len() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::ValidationError(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }
        if request.role != "patient" && request.role != "doctor" {
            return Err(AuthError::ValidationError(
                "Role must be patient or doctor".to_string(),
            ));
        }

        debug!("Registering {} account for {}", request.role, request.email);

        let body = json!({
            "email": request.email,
            "password": request.password,
            "data": { "role": request.role },
        });

        let session: AuthSession = self
            .supabase
            .request(Method::POST, "/auth/v1/signup", None, Some(body))
            .await
            .map_err(|e| match e.downcast_ref::<ApiError>() {
                Some(api) if api.status == 400 || api.status == 422 => AuthError::EmailTaken,
                _ => AuthError::ExternalService(e.to_string()),
            })?;

        info!("Registered new {} account", request.role);
        Ok(session)
    }

    pub async fn login(&self, request: LoginRequest) -> Result<AuthSession, AuthError> {
        validate_email(&request.email)?;

        debug!("Password grant for {}", request.email);

        let body = json!({
            "email": request.email,
            "password": request.password,
        });

        self.supabase
            .request(
                Method::POST,
                "/auth/v1/token?grant_type=password",
                None,
                Some(body),
            )
            .await
            .map_err(|e| match e.downcast_ref::<ApiError>() {
                Some(api) if api.status == 400 || api.status == 401 => {
                    AuthError::InvalidCredentials
                }
                _ => AuthError::ExternalService(e.to_string()),
            })
    }
}

fn validate_email(email: &str) -> Result<(), AuthError> {
    let email_regex = Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();
    if !email_regex.is_match(email) {
        return Err(AuthError::ValidationError(
            "Invalid email address".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use shared_utils::test_utils::TestConfig;

    #[test]
    fn rejects_malformed_emails() {
        assert_matches!(
            validate_email("not-an-email"),
            Err(AuthError::ValidationError(_))
        );
        assert_matches!(validate_email("a@b"), Err(AuthError::ValidationError(_)));
        assert!(validate_email("ada@example.com").is_ok());
    }

    #[tokio::test]
    async fn rejects_short_passwords_without_calling_out() {
        let service = AuthService::new(&TestConfig::default().to_app_config());
        let result = service
            .register(RegisterRequest {
                email: "ada@example.com".to_string(),
                password: "short".to_string(),
                role: "patient".to_string(),
            })
            .await;
        assert_matches!(result, Err(AuthError::ValidationError(_)));
    }

    #[tokio::test]
    async fn rejects_unknown_roles() {
        let service = AuthService::new(&TestConfig::default().to_app_config());
        let result = service
            .register(RegisterRequest {
                email: "ada@example.com".to_string(),
                password: "long-enough-password".to_string(),
                role: "admin".to_string(),
            })
            .await;
        assert_matches!(result, Err(AuthError::ValidationError(_)));
    }
}
