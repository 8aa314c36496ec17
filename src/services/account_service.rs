use std::sync::Arc;

use crate::auth::{hash_password, verify_password, JwtError};
use crate::config::SecurityConfig;
use crate::database::models::{NewUser, User};
use crate::database::{Store, StoreError, UserStore};

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("{0}")]
    MissingFields(String),
    #[error("{0}")]
    InvalidEmail(String),
    #[error("User already exists")]
    AlreadyExists,
    #[error("Registration is disabled")]
    RegistrationDisabled,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Password hashing failed: {0}")]
    Hashing(String),
    #[error("Session token error: {0}")]
    Token(#[from] JwtError),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Registration and credential checks for user accounts
pub struct AccountService {
    store: Arc<dyn Store>,
    security: SecurityConfig,
}

impl AccountService {
    pub fn new(store: Arc<dyn Store>, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    /// Create a user from raw registration input
    pub async fn register(
        &self,
        name: Option<String>,
        email: Option<String>,
        password: Option<String>,
    ) -> Result<User, AccountError> {
        if !self.security.allow_registration {
            return Err(AccountError::RegistrationDisabled);
        }

        self.create(name, email, password).await
    }

    /// Create a user regardless of the registration setting (admin path)
    pub async fn create(
        &self,
        name: Option<String>,
        email: Option<String>,
        password: Option<String>,
    ) -> Result<User, AccountError> {
        let (email, password) = required_credentials(email, password)?;
        validate_email_format(&email).map_err(AccountError::InvalidEmail)?;

        if self.store.find_user_by_email(&email).await?.is_some() {
            tracing::warn!("Registration rejected, email already in use: {}", email);
            return Err(AccountError::AlreadyExists);
        }

        let hash = self.hash(password).await?;
        let name = name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());

        let user = self
            .store
            .create_user(NewUser {
                name,
                email,
                password: Some(hash),
            })
            .await
            .map_err(|e| match e {
                // lost a race against a concurrent registration
                StoreError::Conflict(_) => AccountError::AlreadyExists,
                other => AccountError::Store(other),
            })?;

        tracing::info!("Registered user {} ({})", user.id, user.email);
        Ok(user)
    }

    /// Check an email/password pair and return the matching user
    pub async fn authenticate(
        &self,
        email: Option<String>,
        password: Option<String>,
    ) -> Result<User, AccountError> {
        let (email, password) = required_credentials(email, password)?;

        let Some(user) = self.store.find_user_by_email(&email).await? else {
            tracing::warn!("Login failed for unknown email {}", email);
            return Err(AccountError::InvalidCredentials);
        };

        // accounts created through an external provider have no password
        let Some(hash) = user.password.clone() else {
            tracing::warn!("Login failed for password-less user {}", user.id);
            return Err(AccountError::InvalidCredentials);
        };

        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| AccountError::Hashing(e.to_string()))?
            .map_err(|e| AccountError::Hashing(e.to_string()))?;

        if !matches {
            tracing::warn!("Login failed for user {}: wrong password", user.id);
            return Err(AccountError::InvalidCredentials);
        }

        Ok(user)
    }

    async fn hash(&self, password: String) -> Result<String, AccountError> {
        let cost = self.security.bcrypt_cost;
        tokio::task::spawn_blocking(move || hash_password(&password, cost))
            .await
            .map_err(|e| AccountError::Hashing(e.to_string()))?
            .map_err(|e| AccountError::Hashing(e.to_string()))
    }
}

fn required_credentials(
    email: Option<String>,
    password: Option<String>,
) -> Result<(String, String), AccountError> {
    let email = email
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty());
    let password = password.filter(|p| !p.is_empty());

    match (email, password) {
        (Some(email), Some(password)) => Ok((email, password)),
        _ => Err(AccountError::MissingFields(
            "Please provide email and password".to_string(),
        )),
    }
}

/// Basic email format check
pub fn validate_email_format(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }

    if email.chars().any(char::is_whitespace) {
        return Err("Invalid email format".to_string());
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err("Invalid email format".to_string());
    }

    let domain = parts[1];
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}
