//! Admin user management command.

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use secrecy::ExposeSecret;
use sqlx::PgPool;

use sundry_core::Email;

use super::{CommandError, database_url};

/// Create an admin user.
///
/// When no password is given, a random one is generated and printed once.
///
/// # Errors
///
/// Returns an error for an invalid email, a taken email, or database
/// failures.
pub async fn create(
    email: &str,
    name: &str,
    password: Option<String>,
) -> Result<(), CommandError> {
    let email = Email::parse(email).map_err(|e| CommandError::Invalid(e.to_string()))?;

    let (password, generated) = match password {
        Some(p) => (p, false),
        None => (generate_password(), true),
    };

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| CommandError::Invalid(format!("password hashing failed: {e}")))?
        .to_string();

    let url = database_url()?;
    let pool = PgPool::connect(url.expose_secret()).await?;

    let result = sqlx::query(
        "INSERT INTO users (email, password_hash, full_name, role, email_verified)
         VALUES ($1, $2, $3, 'admin', TRUE)",
    )
    .bind(email.as_str())
    .bind(&password_hash)
    .bind(name)
    .execute(&pool)
    .await;

    match result {
        Ok(_) => {
            tracing::info!(email = %email, "Admin user created");
            if generated {
                // The only place the generated password is ever shown
                tracing::info!("Generated password: {password}");
            }
            Ok(())
        }
        Err(e) => {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return Err(CommandError::Invalid(format!(
                    "a user with email {email} already exists"
                )));
            }
            Err(e.into())
        }
    }
}

/// Generate a random 24-character password.
fn generate_password() -> String {
    use argon2::password_hash::rand_core::RngCore;

    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = OsRng;
    (0..24)
        .map(|_| {
            let idx = (rng.next_u32() as usize) % CHARSET.len();
            CHARSET[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_password_shape() {
        let a = generate_password();
        let b = generate_password();
        assert_eq!(a.len(), 24);
        assert_ne!(a, b);
        assert!(a.bytes().all(|c| c.is_ascii_alphanumeric()));
    }
}
