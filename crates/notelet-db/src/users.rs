//! User and session repository implementation.
//!
//! Passwords are hashed with Argon2id. Session tokens are opaque random
//! secrets; only their SHA-256 hash is stored, so a database leak does not
//! leak usable tokens.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, SaltString};
use argon2::{Argon2, PasswordVerifier};
use chrono::{Duration, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::{Pool, Postgres, Row};
use tracing::debug;

use notelet_core::{defaults, Error, Result, User};

/// Length of generated session token secrets.
const SESSION_TOKEN_LENGTH: usize = 48;

/// PostgreSQL implementation of the user/session repository.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: Pool<Postgres>,
}

impl PgUserRepository {
    /// Create a new PgUserRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Generate a cryptographically secure random string.
    fn generate_secret(length: usize) -> String {
        const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
        let mut rng = rand::thread_rng();
        (0..length)
            .map(|_| {
                let idx = rng.gen_range(0..CHARSET.len());
                CHARSET[idx] as char
            })
            .collect()
    }

    /// Hash a secret using SHA-256.
    fn hash_secret(secret: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(secret.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Hash a password with Argon2id using a fresh random salt.
    fn hash_password(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| Error::Internal(format!("Password hashing failed: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Register a new user. The username must be unique.
    pub async fn create(&self, username: &str, password: &str) -> Result<User> {
        if username.trim().is_empty() {
            return Err(Error::InvalidInput("Username is required".to_string()));
        }
        if password.is_empty() {
            return Err(Error::InvalidInput("Password is required".to_string()));
        }

        let password_hash = Self::hash_password(password)?;
        let row = sqlx::query(
            "INSERT INTO account (username, password_hash)
             VALUES ($1, $2)
             RETURNING id, username, password_hash, created_at",
        )
        .bind(username)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(User {
            id: row.get("id"),
            username: row.get("username"),
            password_hash: row.get("password_hash"),
            created_at: row.get("created_at"),
        })
    }

    /// Look up a user by username.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, username, password_hash, created_at
             FROM account
             WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(|row| User {
            id: row.get("id"),
            username: row.get("username"),
            password_hash: row.get("password_hash"),
            created_at: row.get("created_at"),
        }))
    }

    /// Verify a password against a user's stored hash.
    pub fn verify_password(user: &User, password: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(&user.password_hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    /// Issue a new session token for a user. Returns the plaintext secret;
    /// only its hash is persisted.
    pub async fn create_session(&self, user_id: i64) -> Result<String> {
        let token = Self::generate_secret(SESSION_TOKEN_LENGTH);
        let token_hash = Self::hash_secret(&token);
        let expires_at = Utc::now() + Duration::hours(defaults::SESSION_TTL_HOURS);

        sqlx::query(
            "INSERT INTO session (token_hash, user_id, expires_at)
             VALUES ($1, $2, $3)",
        )
        .bind(&token_hash)
        .bind(user_id)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "users",
            op = "create_session",
            user_id,
            "Session issued"
        );
        Ok(token)
    }

    /// Resolve a bearer token to a user id. Expired or unknown tokens
    /// resolve to `None`.
    pub async fn resolve_session(&self, token: &str) -> Result<Option<i64>> {
        let token_hash = Self::hash_secret(token);
        let row = sqlx::query(
            "SELECT user_id FROM session
             WHERE token_hash = $1 AND expires_at > now()",
        )
        .bind(&token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(|row| row.get("user_id")))
    }

    /// Delete expired sessions. Returns the number removed.
    pub async fn purge_expired_sessions(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM session WHERE expires_at <= now()")
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected())
    }
}
