//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{cbor, pallas::ed25519};
use anyhow::anyhow;
use std::{cmp, fmt, str::FromStr};

/// An EdDSA signature on Curve25519.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[repr(transparent)]
pub struct Signature(ed25519::Signature);

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", hex::encode(self.as_ref()))
    }
}

impl PartialOrd for Signature {
    fn partial_cmp(&self, rhs: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(rhs))
    }
}

impl Ord for Signature {
    fn cmp(&self, rhs: &Self) -> cmp::Ordering {
        self.as_ref().cmp(rhs.as_ref())
    }
}

// ------------------------------------------------------------------ Inspecting

impl Signature {
    pub const SIZE: usize = ed25519::Signature::SIZE;

    /// An all-zeroes signature, of the same size as any real one. Only meaningful to measure the
    /// size of a transaction before it is actually signed.
    pub fn placeholder() -> Self {
        Self::from([0; Self::SIZE])
    }
}

// ----------------------------------------------------------- Converting (from)

impl From<[u8; 64]> for Signature {
    fn from(bytes: [u8; 64]) -> Self {
        Self(ed25519::Signature::from(bytes))
    }
}

impl TryFrom<&[u8]> for Signature {
    type Error = anyhow::Error;

    fn try_from(bytes: &[u8]) -> anyhow::Result<Self> {
        let array = <[u8; 64]>::try_from(bytes).map_err(|_| {
            anyhow!("invalid signature: expected {} bytes, got {}", Self::SIZE, bytes.len())
        })?;
        Ok(Self::from(array))
    }
}

impl FromStr for Signature {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let bytes = hex::decode(s).map_err(|e| anyhow!(e).context("malformed base16 signature"))?;
        Self::try_from(bytes.as_slice())
    }
}

impl From<ed25519::Signature> for Signature {
    fn from(sig: ed25519::Signature) -> Self {
        Self(sig)
    }
}

impl<'de> serde::Deserialize<'de> for Signature {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = <String>::deserialize(deserializer)?;
        Self::from_str(&text).map_err(serde::de::Error::custom)
    }
}

// ------------------------------------------------------------- Converting (to)

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl<'a> From<&'a Signature> for &'a ed25519::Signature {
    fn from(sig: &'a Signature) -> Self {
        &sig.0
    }
}

// -------------------------------------------------------------------- Encoding

impl<C> cbor::Encode<C> for Signature {
    fn encode<W: cbor::encode::write::Write>(
        &self,
        e: &mut cbor::Encoder<W>,
        _ctx: &mut C,
    ) -> Result<(), cbor::encode::Error<W::Error>> {
        e.bytes(self.as_ref())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_from_hex() {
        let sig = Signature::from_str(&"ab".repeat(64)).unwrap();
        assert_eq!(sig.as_ref(), [0xab; 64].as_slice());
    }

    #[test]
    fn reject_wrong_size() {
        assert!(Signature::from_str(&"ab".repeat(32)).is_err());
    }

    #[test]
    fn placeholder_is_full_size() {
        assert_eq!(Signature::placeholder().as_ref().len(), Signature::SIZE);
    }
}
