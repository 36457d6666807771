use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Plain-text password as received from a login or change-password form.
#[derive(Clone)]
pub struct Password(String);

impl Password {
    pub fn new(password: String) -> Self {
        Self(password)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Argon2 PHC string as stored on the admin record.
#[derive(Debug, Clone)]
pub struct PasswordHashString(String);

impl PasswordHashString {
    pub fn new(hash: String) -> Self {
        Self(hash)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Argon2id with a fresh random salt.
pub fn hash_password(password: &Password) -> Result<PasswordHashString, anyhow::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_str().as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
        .to_string();

    Ok(PasswordHashString::new(password_hash))
}

/// `Ok(false)` on mismatch. A malformed stored hash is an error.
pub fn verify_password(
    password: &Password,
    password_hash: &PasswordHashString,
) -> Result<bool, anyhow::Error> {
    let parsed_hash = PasswordHash::new(password_hash.as_str())
        .map_err(|e| anyhow::anyhow!("Invalid password hash format: {}", e))?;

    Ok(Argon2::default()
        .verify_password(password.as_str().as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_only_the_original_password() {
        let password = Password::new("admin123".to_string());
        let hash = hash_password(&password).expect("Failed to hash password");
        assert!(hash.as_str().starts_with("$argon2"));

        assert!(verify_password(&password, &hash).unwrap());
        assert!(!verify_password(&Password::new("admin124".to_string()), &hash).unwrap());
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let password = Password::new("mySecurePassword123".to_string());
        let hash1 = hash_password(&password).expect("Failed to hash password");
        let hash2 = hash_password(&password).expect("Failed to hash password");
        assert_ne!(hash1.as_str(), hash2.as_str());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        let result = verify_password(
            &Password::new("x".to_string()),
            &PasswordHashString::new("not-a-phc-string".to_string()),
        );
        assert!(result.is_err());
    }

    #[test]
    fn debug_never_prints_the_password() {
        let rendered = format!("{:?}", Password::new("hunter2".to_string()));
        assert!(!rendered.contains("hunter2"));
    }
}
