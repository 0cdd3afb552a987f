//! # Wallet
//!
//! Ed25519 signing identity for chain writes.
//!
//! ## Address Derivation
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  Ed25519 public key (32 bytes)                                  │
//! │            │                                                    │
//! │            ▼                                                    │
//! │  SHA-256 ──► 32-byte digest ──► "0x" + lowercase hex            │
//! │                                                                 │
//! │  Example: 0x58b0c1e3...9a2f                                     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The address is self-certifying: the chain re-derives it from the public
//! key attached to every signed call, so a call claiming a sender address
//! that does not match its key is rejected without any registry lookup.
//!
//! ## Persistence
//!
//! The only durable state this client keeps is the 32-byte signing seed,
//! stored hex-encoded in a key file so the CLI reconnects as the same
//! identity. Everything else lives on the chain.

use std::path::Path;

use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use crate::chain::{signing_bytes, MoveCall, SignedCall};
use crate::error::{Error, Result};
use crate::model::Address;

/// Derive a chain address from an Ed25519 public key.
pub fn derive_address(public_key: &VerifyingKey) -> Address {
    let digest = Sha256::digest(public_key.as_bytes());
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&digest);
    Address::from_bytes(&bytes)
}

/// An Ed25519 wallet: the signing identity behind every chain write.
pub struct Wallet {
    signing_key: SigningKey,
    address: Address,
}

impl Wallet {
    /// Generate a fresh wallet from OS randomness.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        let address = derive_address(&signing_key.verifying_key());
        Self {
            signing_key,
            address,
        }
    }

    /// Reconstruct a wallet from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        let address = derive_address(&signing_key.verifying_key());
        Self {
            signing_key,
            address,
        }
    }

    /// Reconstruct a wallet from a hex-encoded seed.
    pub fn from_seed_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s.trim())
            .map_err(|e| Error::KeyFile(format!("seed is not valid hex: {}", e)))?;
        let seed: [u8; 32] = bytes
            .try_into()
            .map_err(|_| Error::KeyFile("seed must be exactly 32 bytes".to_string()))?;
        Ok(Self::from_seed(&seed))
    }

    /// Load a wallet from the key file at `path`, generating and writing a
    /// new one if the file does not exist.
    pub fn load_or_generate(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .map_err(|e| Error::KeyFile(format!("{}: {}", path.display(), e)))?;
            let wallet = Self::from_seed_hex(&contents)?;
            tracing::info!(address = %wallet.address, "Loaded wallet key file");
            return Ok(wallet);
        }

        let wallet = Self::generate();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::KeyFile(format!("{}: {}", parent.display(), e)))?;
        }
        std::fs::write(path, hex::encode(wallet.signing_key.to_bytes()))
            .map_err(|e| Error::KeyFile(format!("{}: {}", path.display(), e)))?;
        tracing::info!(address = %wallet.address, "Generated new wallet key file");
        Ok(wallet)
    }

    /// This wallet's chain address.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Hex-encoded Ed25519 public key, as carried on signed calls.
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.signing_key.verifying_key().as_bytes())
    }

    /// Sign a contract call, producing the envelope the chain executes.
    pub fn sign_call(&self, call: MoveCall) -> Result<SignedCall> {
        let bytes = signing_bytes(&call)?;
        let signature = self.signing_key.sign(&bytes);
        Ok(SignedCall {
            call,
            sender: self.address.clone(),
            public_key: self.public_key_hex(),
            signature: hex::encode(signature.to_bytes()),
        })
    }
}

impl std::fmt::Debug for Wallet {
    // Never print the signing key.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::CallArg;

    fn test_package() -> Address {
        Address::from_bytes(&[0x02; 32])
    }

    #[test]
    fn test_address_is_deterministic_for_seed() {
        let a = Wallet::from_seed(&[7u8; 32]);
        let b = Wallet::from_seed(&[7u8; 32]);
        assert_eq!(a.address(), b.address());

        let c = Wallet::from_seed(&[8u8; 32]);
        assert_ne!(a.address(), c.address());
    }

    #[test]
    fn test_generated_wallets_are_distinct() {
        assert_ne!(Wallet::generate().address(), Wallet::generate().address());
    }

    #[test]
    fn test_signed_call_verifies() {
        let wallet = Wallet::from_seed(&[1u8; 32]);
        let call = MoveCall {
            package: test_package(),
            module: "todo_list".to_string(),
            function: "new".to_string(),
            args: vec![CallArg::Text {
                value: "groceries".to_string(),
            }],
        };
        let signed = wallet.sign_call(call).unwrap();
        assert!(signed.verify().is_ok());
    }

    #[test]
    fn test_tampered_call_fails_verification() {
        let wallet = Wallet::from_seed(&[1u8; 32]);
        let call = MoveCall {
            package: test_package(),
            module: "todo_list".to_string(),
            function: "new".to_string(),
            args: vec![CallArg::Text {
                value: "groceries".to_string(),
            }],
        };
        let mut signed = wallet.sign_call(call).unwrap();
        signed.call.function = "delete".to_string();
        assert!(signed.verify().is_err());
    }

    #[test]
    fn test_seed_hex_round_trip() {
        let seed = [9u8; 32];
        let wallet = Wallet::from_seed_hex(&hex::encode(seed)).unwrap();
        assert_eq!(wallet.address(), Wallet::from_seed(&seed).address());

        assert!(Wallet::from_seed_hex("not hex").is_err());
        assert!(Wallet::from_seed_hex("aabb").is_err()); // too short
    }

    #[test]
    fn test_load_or_generate_round_trip() {
        let dir = std::env::temp_dir().join(format!("tally-wallet-{}", std::process::id()));
        let path = dir.join("wallet.key");
        let _ = std::fs::remove_file(&path);

        let first = Wallet::load_or_generate(&path).unwrap();
        let second = Wallet::load_or_generate(&path).unwrap();
        assert_eq!(first.address(), second.address());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
