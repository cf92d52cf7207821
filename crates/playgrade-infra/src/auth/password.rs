//! Account password hashing.
//!
//! Registration and password changes store an Argon2id PHC string in
//! `users.password_hash`. Login and the current-password check on
//! `PATCH /users/{id}/password` verify against it.

use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Argon2, password_hash::rand_core::OsRng};

use playgrade_core::ports::{AuthError, PasswordService};

/// Hashes account passwords with Argon2id and a fresh random salt per hash.
pub struct Argon2PasswordService {
    hasher: Argon2<'static>,
}

impl Argon2PasswordService {
    pub fn new() -> Self {
        Self {
            hasher: Argon2::default(),
        }
    }
}

impl Default for Argon2PasswordService {
    fn default() -> Self {
        Self::new()
    }
}

fn hashing_error(e: password_hash::Error) -> AuthError {
    AuthError::HashingError(e.to_string())
}

impl PasswordService for Argon2PasswordService {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let stored = self
            .hasher
            .hash_password(password.as_bytes(), &salt)
            .map_err(hashing_error)?;
        Ok(stored.to_string())
    }

    /// `Ok(false)` only for a wrong password. A stored value that is not a
    /// usable PHC string is an error, so a corrupted account row surfaces
    /// as a 500 instead of a silent login failure.
    fn verify(&self, password: &str, stored: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(stored).map_err(|e| {
            tracing::error!(error = %e, "Stored password hash is malformed");
            hashing_error(e)
        })?;

        match self.hasher.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(hashing_error(e)),
        }
    }
}
