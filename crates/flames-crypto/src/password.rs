use anyhow::{Result, anyhow};
use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::{SaltString, rand_core::OsRng},
};

/// Argon2id cost parameters used when hashing new passwords.
///
/// Verification always uses the parameters embedded in the stored digest, so
/// changing these only affects notes created afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashCost {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl HashCost {
    /// The cheapest parameters Argon2 accepts. Only for tests.
    pub fn minimal() -> Self {
        Self {
            memory_kib: Params::MIN_M_COST,
            iterations: Params::MIN_T_COST,
            parallelism: Params::MIN_P_COST,
        }
    }
}

/// One-way password hashing for note credentials.
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
    /// Digest of a random password at the configured cost. Checked when there
    /// is no real digest, so a miss costs as much as a wrong password.
    decoy_digest: String,
}

impl CredentialHasher {
    pub fn new(cost: HashCost) -> Result<Self> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|e| anyhow!("Invalid Argon2 parameters: {}", e))?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let decoy_digest = hash_with(&argon2, &crate::ids::generate_note_id())?;

        Ok(Self {
            argon2,
            decoy_digest,
        })
    }

    /// Hash with a fresh random salt. Returns a PHC string (`$argon2id$v=19$...`).
    ///
    /// Empty passwords are hashed like any other; length policy is up to the caller.
    pub fn hash(&self, password: &str) -> Result<String> {
        hash_with(&self.argon2, password)
    }

    /// Constant-time check of `password` against a stored digest.
    /// A digest that does not parse never matches.
    pub fn verify(&self, password: &str, digest: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(digest) else {
            return false;
        };
        self.argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    /// Run a full verification against the decoy digest and discard the result.
    ///
    /// For lookups that found no digest, so they take as long as a mismatch.
    pub fn verify_decoy(&self, password: &str) {
        let _ = self.verify(password, &self.decoy_digest);
    }
}

fn hash_with(argon2: &Argon2<'_>, password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("Password hashing failed: {}", e))?;
    Ok(hash.to_string())
}
