//! The auth gate: registration, login, token issue/verify, profile
//! authorization.
//!
//! Tokens are HS256 JWTs carrying the user id and username, valid for
//! one hour with no refresh mechanism. Verification failures are
//! reported uniformly: callers cannot distinguish an expired token
//! from a forged one.

use anyhow::Context;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::{LoginRequest, LoginResponse, RegisterRequest, User};
use tracing::{info, warn};

use crate::domain::error::DomainError;
use crate::storage::{DbConnection, UserRepository, UserRow};

/// Token lifetime in seconds
const TOKEN_TTL_SECS: i64 = 3600;

/// JWT claims embedded in a bearer token
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// The user's system id
    sub: String,
    username: String,
    /// Expiry as a unix timestamp
    exp: i64,
}

/// The verified identity attached to a request after the auth gate.
/// Threaded explicitly through the call chain, never mutated in place.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub username: String,
}

/// Service for user registration, login and token verification
#[derive(Clone)]
pub struct AuthService {
    users: UserRepository,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(db: DbConnection, jwt_secret: impl Into<String>) -> Self {
        Self {
            users: UserRepository::new(db),
            jwt_secret: jwt_secret.into(),
        }
    }

    /// Register a new user. The password is stored only as a bcrypt
    /// hash; the returned profile never includes it.
    pub async fn register(&self, request: RegisterRequest) -> Result<User, DomainError> {
        let username = request.username.trim().to_string();
        let email = request.email.trim().to_lowercase();
        let password = request.password;

        if username.is_empty() || email.is_empty() || password.is_empty() {
            return Err(DomainError::validation("All fields are required."));
        }
        let username_chars = username.chars().count();
        if !(3..=30).contains(&username_chars) {
            return Err(DomainError::validation(
                "Username must be between 3 and 30 characters",
            ));
        }
        if password.len() < 6 {
            return Err(DomainError::validation(
                "Password must be at least 6 characters",
            ));
        }

        if self
            .users
            .find_by_username_or_email(&username, &email)
            .await?
            .is_some()
        {
            return Err(DomainError::validation("Username or email already in use"));
        }

        let password_hash =
            bcrypt::hash(&password, bcrypt::DEFAULT_COST).context("Failed to hash password")?;

        let now = Utc::now().to_rfc3339();
        let row = UserRow {
            id: User::generate_id(),
            username,
            email,
            password_hash,
            created_at: now.clone(),
            updated_at: now,
        };
        self.users.store_user(&row).await?;

        info!("Registered user {} ({})", row.username, row.id);
        Ok(row.to_user())
    }

    /// Verify credentials and issue a token. Unknown email and wrong
    /// password are indistinguishable to the caller.
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, DomainError> {
        let email = request.email.trim().to_lowercase();

        if email.is_empty() || request.password.is_empty() {
            return Err(DomainError::validation("Email and password are required"));
        }

        let Some(user) = self.users.find_by_email(&email).await? else {
            warn!("Login attempt for unknown email");
            return Err(DomainError::Unauthorized(
                "Invalid email or password".to_string(),
            ));
        };

        let matches = bcrypt::verify(&request.password, &user.password_hash)
            .context("Failed to verify password")?;
        if !matches {
            warn!("Failed login for user {}", user.id);
            return Err(DomainError::Unauthorized(
                "Invalid email or password".to_string(),
            ));
        }

        let token = self.issue_token(&user.id, &user.username)?;

        info!("User {} logged in", user.id);
        Ok(LoginResponse {
            token,
            user_id: user.id,
            username: user.username,
        })
    }

    /// Verify a presented token and extract the embedded identity. Any
    /// failure is a uniform Unauthorized.
    pub fn verify_token(&self, token: &str) -> Result<AuthUser, DomainError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| DomainError::Unauthorized("Invalid token".to_string()))?;

        Ok(AuthUser {
            user_id: data.claims.sub,
            username: data.claims.username,
        })
    }

    /// Fetch a user profile. A user may only read their own profile.
    pub async fn get_profile(
        &self,
        requested_user_id: &str,
        identity: &AuthUser,
    ) -> Result<User, DomainError> {
        if requested_user_id != identity.user_id {
            return Err(DomainError::Forbidden("Access denied".to_string()));
        }

        let user = self
            .users
            .get_user(requested_user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User not found"))?;

        Ok(user.to_user())
    }

    fn issue_token(&self, user_id: &str, username: &str) -> Result<String, DomainError> {
        self.encode_claims(&Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            exp: Utc::now().timestamp() + TOKEN_TTL_SECS,
        })
    }

    fn encode_claims(&self, claims: &Claims) -> Result<String, DomainError> {
        let token = encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .context("Failed to sign token")?;
        Ok(token)
    }
}
