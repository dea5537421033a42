//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{Signature, VerificationKey, pallas::ed25519};
use anyhow::anyhow;
use rand::RngCore;
use std::{fmt, str::FromStr};

/// An ed25519 signing key, either a plain 32-byte seed or a 64-byte extended key (as derived by
/// BIP32-Ed25519 wallets).
pub enum SigningKey {
    Standard(ed25519::SecretKey),
    Extended(ed25519::SecretKeyExtended),
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard(..) => f.write_str("SigningKey::Standard(..)"),
            Self::Extended(..) => f.write_str("SigningKey::Extended(..)"),
        }
    }
}

// ----------------------------------------------------------------------- Using

impl SigningKey {
    pub const SIZE: usize = ed25519::SecretKey::SIZE;

    pub const EXTENDED_SIZE: usize = 64;

    /// Generate a new signing key using available system entropy.
    pub fn new() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self::from(bytes)
    }

    pub fn sign<T>(&self, msg: T) -> Signature
    where
        T: AsRef<[u8]>,
    {
        match self {
            Self::Standard(key) => Signature::from(key.sign(msg)),
            Self::Extended(key) => Signature::from(key.sign(msg)),
        }
    }

    pub fn to_verification_key(&self) -> VerificationKey {
        match self {
            Self::Standard(key) => VerificationKey::from(key.public_key()),
            Self::Extended(key) => VerificationKey::from(key.public_key()),
        }
    }
}

impl Default for SigningKey {
    fn default() -> Self {
        Self::new()
    }
}

// ----------------------------------------------------------- Converting (from)

impl From<[u8; 32]> for SigningKey {
    fn from(bytes: [u8; 32]) -> Self {
        Self::Standard(ed25519::SecretKey::from(bytes))
    }
}

/// Accepts 32-byte keys, 64-byte extended keys, and 128-byte extended keys with their chain code
/// (which is ignored).
impl TryFrom<&[u8]> for SigningKey {
    type Error = anyhow::Error;

    fn try_from(bytes: &[u8]) -> anyhow::Result<Self> {
        match bytes.len() {
            32 => {
                let mut array = [0u8; 32];
                array.copy_from_slice(bytes);
                Ok(Self::from(array))
            }
            64 | 128 => {
                let mut array = [0u8; Self::EXTENDED_SIZE];
                array.copy_from_slice(&bytes[..Self::EXTENDED_SIZE]);
                let key = ed25519::SecretKeyExtended::from_bytes(array)
                    .map_err(|e| anyhow!("invalid extended signing key: {e:?}"))?;
                Ok(Self::Extended(key))
            }
            n => Err(anyhow!(
                "invalid signing key: expected 32, 64 or 128 bytes, got {n}"
            )),
        }
    }
}

impl FromStr for SigningKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let bytes =
            hex::decode(s).map_err(|e| anyhow!(e).context("malformed base16 signing key"))?;
        Self::try_from(bytes.as_slice())
    }
}

impl From<&SigningKey> for VerificationKey {
    fn from(key: &SigningKey) -> Self {
        key.to_verification_key()
    }
}
