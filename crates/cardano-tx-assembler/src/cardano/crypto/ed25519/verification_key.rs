//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{Hash, Signature, cbor, pallas::ed25519};
use anyhow::anyhow;
use std::{cmp, fmt, str::FromStr};

/// A ed25519 verification key (non-extended).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct VerificationKey(ed25519::PublicKey);

impl fmt::Display for VerificationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", hex::encode(self.as_ref()))
    }
}

impl PartialOrd for VerificationKey {
    fn partial_cmp(&self, rhs: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(rhs))
    }
}

impl Ord for VerificationKey {
    fn cmp(&self, rhs: &Self) -> cmp::Ordering {
        self.as_ref().cmp(rhs.as_ref())
    }
}

// ------------------------------------------------------------------ Inspecting

impl VerificationKey {
    pub const SIZE: usize = ed25519::PublicKey::SIZE;

    /// An all-zeroes key; see [`Signature::placeholder`].
    pub fn placeholder() -> Self {
        Self::from([0; Self::SIZE])
    }

    /// Verify a [`Signature`] against the given [`VerificationKey`]. Returns `true` when the
    /// signature is valid.
    pub fn verify<T>(&self, message: T, signature: &Signature) -> bool
    where
        T: AsRef<[u8]>,
    {
        self.0.verify(message, <&ed25519::Signature>::from(signature))
    }

    /// The key hash, as found in required signers and native scripts.
    pub fn hash(&self) -> Hash<28> {
        Hash::blake2b_224(self.as_ref())
    }
}

// ----------------------------------------------------------- Converting (from)

impl From<[u8; 32]> for VerificationKey {
    fn from(bytes: [u8; 32]) -> Self {
        Self(ed25519::PublicKey::from(bytes))
    }
}

impl TryFrom<&[u8]> for VerificationKey {
    type Error = anyhow::Error;

    fn try_from(bytes: &[u8]) -> anyhow::Result<Self> {
        let array = <[u8; 32]>::try_from(bytes).map_err(|_| {
            anyhow!(
                "invalid verification key: expected {} bytes, got {}",
                Self::SIZE,
                bytes.len()
            )
        })?;
        Ok(Self::from(array))
    }
}

impl From<ed25519::PublicKey> for VerificationKey {
    fn from(key: ed25519::PublicKey) -> Self {
        Self(key)
    }
}

impl FromStr for VerificationKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let bytes =
            hex::decode(s).map_err(|e| anyhow!(e).context("malformed base16 verification key"))?;
        Self::try_from(bytes.as_slice())
    }
}

impl<'de> serde::Deserialize<'de> for VerificationKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = <String>::deserialize(deserializer)?;
        Self::from_str(&text).map_err(serde::de::Error::custom)
    }
}

// ------------------------------------------------------------- Converting (to)

impl AsRef<[u8]> for VerificationKey {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

// -------------------------------------------------------------------- Encoding

impl<C> cbor::Encode<C> for VerificationKey {
    fn encode<W: cbor::encode::write::Write>(
        &self,
        e: &mut cbor::Encoder<W>,
        _ctx: &mut C,
    ) -> Result<(), cbor::encode::Error<W::Error>> {
        e.bytes(self.as_ref())?;
        Ok(())
    }
}
