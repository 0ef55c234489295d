/// Account Routes
///
/// Signup, login, and the identity of the current caller.

use actix_web::{web, HttpResponse};
use secrecy::Secret;
use serde::Deserialize;

use crate::auth::AuthenticatedUser;
use crate::domain::NewUser;
use crate::error::{AppError, AuthError, ValidationError};
use crate::services::AccountService;
use crate::validators::{is_valid_email, is_valid_name, is_valid_password, is_valid_phone};

/// User signup request
#[derive(Deserialize)]
pub struct SignupRequest {
    pub first_name: String,
    pub last_name: String,
    pub password: Secret<String>,
    pub email: String,
    pub phone: String,
}

impl TryFrom<SignupRequest> for NewUser {
    type Error = ValidationError;

    fn try_from(form: SignupRequest) -> Result<Self, Self::Error> {
        is_valid_password(&form.password)?;

        Ok(NewUser {
            first_name: is_valid_name("first_name", &form.first_name)?,
            last_name: is_valid_name("last_name", &form.last_name)?,
            email: is_valid_email(&form.email)?,
            phone: is_valid_phone(&form.phone)?,
            password: form.password,
        })
    }
}

/// User login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: Secret<String>,
}

/// POST /users/signup
///
/// # Errors
/// - 400: Validation errors
/// - 409: Email or phone already registered
/// - 503: Store unavailable or timed out
pub async fn signup(
    form: web::Json<SignupRequest>,
    accounts: web::Data<AccountService>,
) -> Result<HttpResponse, AppError> {
    let new_user = NewUser::try_from(form.into_inner())?;
    let record = accounts.signup(new_user).await?;

    tracing::info!(
        user_id = %record.user_id,
        "Signup completed"
    );

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "successfully signed up"
    })))
}

/// POST /users/login
///
/// Returns the user profile carrying the freshly issued tokens.
///
/// # Errors
/// - 401: Unknown email or wrong password (same response for both)
/// - 503: Store unavailable or timed out
pub async fn login(
    form: web::Json<LoginRequest>,
    accounts: web::Data<AccountService>,
) -> Result<HttpResponse, AppError> {
    let LoginRequest { email, password } = form.into_inner();

    // A malformed email cannot match any account.
    let email = is_valid_email(&email).map_err(|_| AuthError::InvalidCredentials)?;

    let profile = accounts.login(&email, password).await?;

    tracing::info!(
        user_id = %profile.user_id,
        "Login completed"
    );

    Ok(HttpResponse::Ok().json(profile))
}

/// GET /users/me
///
/// Identity extracted by the JWT middleware.
pub async fn current_user(user: web::ReqData<AuthenticatedUser>) -> HttpResponse {
    HttpResponse::Ok().json(user.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::ResponseError;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tracing_subscriber::fmt::MakeWriter;

    use crate::auth::TokenIssuer;
    use crate::configuration::JwtSettings;
    use crate::store::MemoryStore;

    fn request(password: &str) -> SignupRequest {
        SignupRequest {
            first_name: " Ada ".to_string(),
            last_name: "Lovelace".to_string(),
            password: Secret::new(password.to_string()),
            email: "ada@example.com".to_string(),
            phone: "+1 555 0100".to_string(),
        }
    }

    #[test]
    fn test_signup_request_normalized() {
        let user = NewUser::try_from(request("hunter22")).unwrap();
        assert_eq!(user.first_name, "Ada");
        assert_eq!(user.phone, "+15550100");
    }

    #[test]
    fn test_signup_request_short_password() {
        let result = NewUser::try_from(request("12345"));
        assert!(matches!(result, Err(ValidationError::TooShort(_, 6))));
    }

    /// Collects formatted log output in memory
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for LogBuffer {
        type Writer = LogBuffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[tokio::test]
    async fn test_rejected_login_is_logged_once() {
        let buffer = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(buffer.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let jwt = JwtSettings {
            secret: Secret::new("unit-test-secret-at-least-32-characters".to_string()),
            access_token_expiry: 86400,
            refresh_token_expiry: 604800,
            issuer: "test".to_string(),
        };
        let accounts = web::Data::new(AccountService::new(
            Arc::new(MemoryStore::default()),
            Arc::new(TokenIssuer::new(&jwt)),
            4,
            Duration::from_secs(10),
        ));
        let form = web::Json(LoginRequest {
            email: "nobody@example.com".to_string(),
            password: Secret::new("hunter22".to_string()),
        });

        let err = login(form, accounts).await.unwrap_err();
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let logs = buffer.contents();
        assert_eq!(logs.lines().filter(|line| line.contains("WARN")).count(), 1, "{}", logs);
    }
}
