use std::fmt;

use bundler_primitives::{Address, PrimitiveSignature, B256};
use k256::ecdsa::SigningKey;

/// Externally owned account used to sign and to send simulation calls.
#[derive(Clone)]
pub struct Signer {
    signing_key: SigningKey,
    address: Address,
}

impl Signer {
    pub fn new(secret: [u8; 32]) -> anyhow::Result<Self> {
        let signing_key = SigningKey::from_bytes(&secret.into())?;
        let address = Address::from_private_key(&signing_key);
        Ok(Self {
            signing_key,
            address,
        })
    }

    pub fn from_bytes(secret: impl AsRef<[u8]>) -> anyhow::Result<Self> {
        Self::new(secret.as_ref().try_into()?)
    }

    /// Parses a hex encoded secret key, with or without 0x-prefix.
    pub fn from_str(secret: impl AsRef<str>) -> anyhow::Result<Self> {
        let secret = secret.as_ref();
        let secret = secret.strip_prefix("0x").unwrap_or(secret);
        Self::from_bytes(hex::decode(secret)?)
    }

    pub fn sign_prehashed(&self, prehash: B256) -> anyhow::Result<PrimitiveSignature> {
        let (signature, recid) = self.signing_key.sign_prehash_recoverable(prehash.as_slice())?;
        Ok(PrimitiveSignature::from_signature_and_parity(
            signature,
            recid.is_y_odd(),
        ))
    }

    #[inline]
    pub fn address(&self) -> Address {
        self.address
    }

    #[cfg(any(test, feature = "test-helpers"))]
    pub fn random() -> Self {
        loop {
            let secret: [u8; 32] = rand::random();
            if let Ok(signer) = Self::new(secret) {
                return signer;
            }
        }
    }
}

// Secret key must never end up in logs.
impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
