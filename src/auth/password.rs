use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        rand_core::{OsRng, RngCore},
    },
};

use crate::config::AuthConfig;
use crate::error::{Error, Result};

const ARGON2_OUTPUT_LEN: usize = 32;
const SALT_BYTES: usize = 16;

/// One-way, salted password digests in PHC string format (argon2id).
pub struct CredentialDigest {
    argon2: Argon2<'static>,
}

impl CredentialDigest {
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self> {
        let params = Params::new(memory_kib, iterations, parallelism, Some(ARGON2_OUTPUT_LEN))
            .map_err(|e| Error::Config(format!("invalid argon2 params: {e}")))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        Self::new(
            config.password_memory_kib,
            config.password_iterations,
            config.password_parallelism,
        )
    }

    /// Hashes a plaintext password with a fresh random salt.
    ///
    /// An entropy failure is reported as `Error::Entropy` and never retried.
    pub fn digest(&self, plaintext: &str) -> Result<String> {
        let mut salt_bytes = [0u8; SALT_BYTES];
        OsRng
            .try_fill_bytes(&mut salt_bytes)
            .map_err(|e| Error::Entropy(e.to_string()))?;
        let salt =
            SaltString::encode_b64(&salt_bytes).map_err(|e| Error::Hashing(e.to_string()))?;

        let hash = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| Error::Hashing(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// Checks `candidate` against a stored digest. A mismatch is `Ok(false)`;
    /// an unparseable digest is an error.
    pub fn verify(&self, digest: &str, candidate: &str) -> Result<bool> {
        let parsed = PasswordHash::new(digest)
            .map_err(|e| Error::CorruptData(format!("invalid password digest: {e}")))?;

        match self.argon2.verify_password(candidate.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(Error::Hashing(e.to_string())),
        }
    }
}
