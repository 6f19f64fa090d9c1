//! services/api/src/credentials.rs
//!
//! Password hashing helpers shared by the login handler, the composite
//! student/faculty operations, and the seed binary.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hashes a plaintext password with a fresh OS-random salt. The output is a
/// self-describing PHC string, so no separate salt column is needed.
pub fn hash_password(plain: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    Ok(argon2.hash_password(plain.as_bytes(), &salt)?.to_string())
}

/// Verifies a plaintext password against a stored PHC string. An unparseable
/// stored hash counts as a failed verification rather than an error.
pub fn verify_password(plain: &str, stored_hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed_hash)
        .is_ok()
}
