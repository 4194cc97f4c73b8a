use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

use super::password::PasswordHasher;
use super::token::{Claims, TokenIssuer};
use crate::error::ApiError;
use crate::models::{User, UserProfile};
use crate::store::UserStore;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// User Registration Request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "email is required"))]
    #[schema(example = "a@b.com")]
    #[serde(default)]
    pub email: String,
    #[validate(length(min = 1, message = "user_name is required"))]
    #[schema(example = "A")]
    #[serde(default)]
    pub user_name: String,
    #[validate(length(min = 1, message = "password is required"))]
    #[schema(example = "p")]
    #[serde(default)]
    pub password: String,
}

/// User Login Request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "email is required"))]
    #[schema(example = "a@b.com")]
    #[serde(default)]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    #[schema(example = "p")]
    #[serde(default)]
    pub password: String,
}

/// Auth Response (JWT)
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    #[schema(example = true)]
    pub success: bool,
    pub token: String,
    pub user: UserProfile,
}

/// First failing field's message, for a one-line 400 body.
pub(crate) fn validation_message(errors: &validator::ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    fields
        .first()
        .and_then(|(field, errs)| {
            errs.first().map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .unwrap_or_else(|| "Invalid request".to_string())
}

pub struct UserAuthService {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    tokens: TokenIssuer,
}

impl UserAuthService {
    pub fn new(users: Arc<dyn UserStore>, hasher: PasswordHasher, tokens: TokenIssuer) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    /// Register a new user. The email must not be taken.
    pub async fn register(&self, req: RegisterRequest) -> Result<(), ApiError> {
        req.validate()
            .map_err(|e| ApiError::validation(validation_message(&e)))?;

        let password_hash = self
            .hasher
            .hash(&req.password)
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        let user = User {
            email: req.email,
            user_name: req.user_name,
            password_hash,
            created_at: Utc::now(),
        };

        let inserted = self
            .users
            .insert_user(&user)
            .await
            .map_err(ApiError::store("Error saving user"))?;

        if !inserted {
            tracing::warn!("Registration attempt for existing email: {}", user.email);
            return Err(ApiError::Conflict("The email already exists".to_string()));
        }

        tracing::info!("User registered: {}", user.email);
        Ok(())
    }

    /// Login user and issue JWT
    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse, ApiError> {
        req.validate()
            .map_err(|e| ApiError::validation(validation_message(&e)))?;

        let user = self
            .users
            .get_user(&req.email)
            .await
            .map_err(ApiError::store("Error accessing DB"))?;

        // Unknown email and wrong password are indistinguishable to the caller
        let user = match user {
            Some(user) if self.hasher.verify(&req.password, &user.password_hash) => user,
            _ => {
                tracing::warn!("Login failed for {}", req.email);
                return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
            }
        };

        let token = self
            .tokens
            .issue(&user.email)
            .map_err(|e| ApiError::Internal(format!("Failed to generate token: {}", e)))?;

        Ok(AuthResponse {
            success: true,
            token,
            user: UserProfile::from(&user),
        })
    }

    /// Verify JWT token
    pub fn verify_token(&self, token: &str) -> Result<Claims, ApiError> {
        self.tokens
            .verify(token)
            .map_err(|_| ApiError::unauthorized("Invalid or expired token"))
    }

    /// Profile of the token's subject.
    pub async fn current_user(&self, claims: &Claims) -> Result<UserProfile, ApiError> {
        let user = self
            .users
            .get_user(&claims.sub)
            .await
            .map_err(ApiError::store("Error accessing DB"))?
            .ok_or_else(|| ApiError::unauthorized("User no longer exists"))?;
        Ok(UserProfile::from(&user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::Duration;

    fn service() -> UserAuthService {
        UserAuthService::new(
            Arc::new(MemoryStore::new()),
            PasswordHasher::new(1024, 1).unwrap(),
            TokenIssuer::new("test-secret", Duration::hours(1)),
        )
    }

    fn register_req(email: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            user_name: "A".to_string(),
            password: "p".to_string(),
        }
    }

    fn login_req(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_concurrent_register_single_winner() {
        let svc = service();
        let (first, second) = tokio::join!(
            svc.register(register_req("race@b.com")),
            svc.register(register_req("race@b.com"))
        );

        let results = [first, second];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        let conflict = results
            .iter()
            .find_map(|r| r.as_ref().err())
            .expect("one registration should lose");
        assert!(matches!(conflict, ApiError::Conflict(m) if m == "The email already exists"));
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let svc = service();
        svc.register(register_req("a@b.com")).await.unwrap();
        let err = svc.register(register_req("a@b.com")).await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict(ref m) if m == "The email already exists"));
    }

    #[tokio::test]
    async fn test_missing_field_is_validation_error() {
        let svc = service();
        let mut req = register_req("a@b.com");
        req.user_name.clear();
        let err = svc.register(req).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(ref m) if m == "user_name is required"));
    }

    #[tokio::test]
    async fn test_login_success_issues_verifiable_token() {
        let svc = service();
        svc.register(register_req("a@b.com")).await.unwrap();
        let resp = svc.login(login_req("a@b.com", "p")).await.unwrap();
        assert!(resp.success);
        assert_eq!(resp.user.user_name, "A");

        let claims = svc.verify_token(&resp.token).unwrap();
        assert_eq!(claims.sub, "a@b.com");
        assert_eq!(svc.current_user(&claims).await.unwrap().email, "a@b.com");
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_look_the_same() {
        let svc = service();
        svc.register(register_req("a@b.com")).await.unwrap();

        let wrong = svc.login(login_req("a@b.com", "nope")).await.unwrap_err();
        let unknown = svc.login(login_req("x@b.com", "p")).await.unwrap_err();
        assert_eq!(wrong.to_string(), unknown.to_string());
        assert!(matches!(wrong, ApiError::Unauthorized(_)));
    }
}
