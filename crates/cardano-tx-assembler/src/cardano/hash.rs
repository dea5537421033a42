//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{cbor, pallas};
use anyhow::anyhow;
use std::fmt;

/// A _blake2b_ hash digest; typically 28 or 32 bytes long.
///
/// There are several ways to construct [`Self`], but fundamentally:
///
/// - Conversions from static byte arrays of known sizes are infaillible:
///
///   ```rust
///   # use cardano_tx_assembler::Hash;
///   assert_eq!(
///     <Hash<28>>::from([0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]).to_string(),
///     "00000000000000000000000000000000000000000000000000000000",
///   );
///   ```
///
/// - Conversions from vectors or slices are possible but faillible:
///
///   ```rust
///   # use cardano_tx_assembler::Hash;
///   // Vectors contains exactly 28 elements
///   assert!(
///     <Hash<28>>::try_from(vec![0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0])
///         .is_ok()
///   );
///
///   // Vectors still contains only 28 elements
///   assert!(
///     <Hash<32>>::try_from(vec![0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0])
///         .is_err()
///   );
///   ```
///
/// - Conversions from base16-encoded text strings are also possible:
///
///   ```rust
///   # use cardano_tx_assembler::Hash;
///   // The text string is indeed 56 character-long.
///   assert!(
///     <Hash<28>>::try_from("00000000000000000000000000000000000000000000000000000000")
///         .is_ok()
///   );
///   ```
///
/// - For the latter, we also provide the [`hash!`](crate::hash) macro.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, cbor::Encode, cbor::Decode)]
#[repr(transparent)]
#[cbor(transparent)]
pub struct Hash<const SIZE: usize>(#[n(0)] pallas::Hash<SIZE>);

impl Hash<28> {
    /// Digest arbitrary bytes into a 28-byte _blake2b-224_ hash, as used for key hashes and script
    /// hashes.
    pub fn blake2b_224(bytes: &[u8]) -> Self {
        Self(pallas::hash::Hasher::<224>::hash(bytes))
    }
}

impl Hash<32> {
    /// Digest arbitrary bytes into a 32-byte _blake2b-256_ hash, as used for transaction ids,
    /// datum hashes and the various integrity hashes of a transaction.
    pub fn blake2b_256(bytes: &[u8]) -> Self {
        Self(pallas::hash::Hasher::<256>::hash(bytes))
    }
}

impl<const SIZE: usize> fmt::Display for Hash<SIZE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        self.0.fmt(f)
    }
}

// ----------------------------------------------------------- Converting (from)

impl<const SIZE: usize> TryFrom<&str> for Hash<SIZE> {
    type Error = anyhow::Error;

    fn try_from(s: &str) -> anyhow::Result<Self> {
        let bytes = hex::decode(s).map_err(|e| anyhow!(e))?;
        let fixed_sized_bytes = <[u8; SIZE]>::try_from(bytes).map_err(|_| {
            anyhow!(
                "invalid hex string length; expected {}, got {}",
                2 * SIZE,
                s.len()
            )
        })?;

        Ok(Hash(pallas::Hash::new(fixed_sized_bytes)))
    }
}

impl<const SIZE: usize> TryFrom<Vec<u8>> for Hash<SIZE> {
    type Error = anyhow::Error;

    fn try_from(bytes: Vec<u8>) -> anyhow::Result<Self> {
        let fixed_sized_bytes = <[u8; SIZE]>::try_from(bytes.as_slice()).map_err(|_| {
            anyhow!(
                "invalid bytes sequence length; expected {} bytes, got {} bytes",
                SIZE,
                bytes.len(),
            )
        })?;

        Ok(Hash(pallas::Hash::new(fixed_sized_bytes)))
    }
}

impl<const SIZE: usize> From<[u8; SIZE]> for Hash<SIZE> {
    fn from(hash: [u8; SIZE]) -> Self {
        Self(pallas::Hash::new(hash))
    }
}

// ------------------------------------------------------------- Converting (to)

impl<const SIZE: usize> AsRef<[u8]> for Hash<SIZE> {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl<const SIZE: usize> serde::Serialize for Hash<SIZE> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de, const SIZE: usize> serde::Deserialize<'de> for Hash<SIZE> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::try_from(text.as_str()).map_err(serde::de::Error::custom)
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod tests {
    use crate::Hash;
    use proptest::prelude::*;

    #[test]
    fn blake2b_256_of_empty_input() {
        assert_eq!(
            Hash::blake2b_256(&[]).to_string(),
            "0e5751c026e543b2e8ab2eb06099daa1d1e5df47778f7787faab45cdf12fe3a8",
        );
    }

    #[test]
    fn rejects_hex_of_the_wrong_size() {
        assert!(<Hash<28>>::try_from("00").is_err());
        assert!(<Hash<32>>::try_from("zz").is_err());
    }

    #[test]
    fn equal_hashes_collide_in_hash_sets() {
        let set = std::collections::HashSet::from([
            Hash::<28>::from([1; 28]),
            Hash::<28>::try_from("01".repeat(28).as_str()).unwrap(),
            Hash::<28>::blake2b_224(&[]),
        ]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn serde_through_hex() {
        let hash = Hash::<28>::from([7; 28]);
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{}\"", "07".repeat(28)));
        assert_eq!(serde_json::from_str::<Hash<28>>(&json).unwrap(), hash);
    }

    // -------------------------------------------------------------- Generators

    pub mod generators {
        use super::*;

        pub fn hash28() -> impl Strategy<Value = Hash<28>> {
            any::<[u8; 28]>().prop_map(Hash::from)
        }

        pub fn hash32() -> impl Strategy<Value = Hash<32>> {
            any::<[u8; 32]>().prop_map(Hash::from)
        }
    }
}
