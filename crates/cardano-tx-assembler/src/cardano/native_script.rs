//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{Hash, cbor, cbor::ToCbor};

/// A multi-signature and/or time-lock script, evaluated by the ledger without any execution cost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeScript {
    /// Requires a signature from the key with the given hash.
    Signature(Hash<28>),
    /// Requires every sub-script to hold.
    All(Vec<NativeScript>),
    /// Requires at least one sub-script to hold.
    Any(Vec<NativeScript>),
    /// Requires at least `n` sub-scripts to hold.
    AtLeast(u32, Vec<NativeScript>),
    /// Only valid from the given absolute slot (inclusive).
    InvalidBefore(u64),
    /// Only valid until the given absolute slot (exclusive).
    InvalidHereafter(u64),
}

// ------------------------------------------------------------------ Inspecting

impl NativeScript {
    /// The script hash, also used as the policy id of tokens minted under this script.
    pub fn hash(&self) -> Hash<28> {
        let mut buffer = vec![0x00];
        buffer.extend(self.to_cbor());
        Hash::blake2b_224(&buffer)
    }
}

// -------------------------------------------------------------------- Encoding

impl<C> cbor::Encode<C> for NativeScript {
    fn encode<W: cbor::encode::write::Write>(
        &self,
        e: &mut cbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), cbor::encode::Error<W::Error>> {
        fn encode_scripts<C, W: cbor::encode::write::Write>(
            e: &mut cbor::Encoder<W>,
            scripts: &[NativeScript],
            ctx: &mut C,
        ) -> Result<(), cbor::encode::Error<W::Error>> {
            e.array(scripts.len() as u64)?;
            for script in scripts {
                e.encode_with(script, ctx)?;
            }
            Ok(())
        }

        match self {
            Self::Signature(key_hash) => {
                e.array(2)?.u8(0)?.bytes(key_hash.as_ref())?;
            }
            Self::All(scripts) => {
                e.array(2)?.u8(1)?;
                encode_scripts(e, scripts, ctx)?;
            }
            Self::Any(scripts) => {
                e.array(2)?.u8(2)?;
                encode_scripts(e, scripts, ctx)?;
            }
            Self::AtLeast(n, scripts) => {
                e.array(3)?.u8(3)?.u32(*n)?;
                encode_scripts(e, scripts, ctx)?;
            }
            Self::InvalidBefore(slot) => {
                e.array(2)?.u8(4)?.u64(*slot)?;
            }
            Self::InvalidHereafter(slot) => {
                e.array(2)?.u8(5)?.u64(*slot)?;
            }
        }
        Ok(())
    }
}

impl<'d, C> cbor::Decode<'d, C> for NativeScript {
    fn decode(d: &mut cbor::Decoder<'d>, ctx: &mut C) -> Result<Self, cbor::decode::Error> {
        d.array()?;
        match d.u8()? {
            0 => {
                let key_hash = Hash::try_from(d.bytes()?.to_vec())
                    .map_err(|e| cbor::decode::Error::message(e.to_string()))?;
                Ok(Self::Signature(key_hash))
            }
            1 => Ok(Self::All(cbor::decode_array(d, |d| d.decode_with(ctx))?)),
            2 => Ok(Self::Any(cbor::decode_array(d, |d| d.decode_with(ctx))?)),
            3 => {
                let n = d.u32()?;
                Ok(Self::AtLeast(n, cbor::decode_array(d, |d| d.decode_with(ctx))?))
            }
            4 => Ok(Self::InvalidBefore(d.u64()?)),
            5 => Ok(Self::InvalidHereafter(d.u64()?)),
            t => Err(cbor::decode::Error::message(format!(
                "unknown native script constructor {t}"
            ))),
        }
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod tests {
    use crate::{NativeScript, cbor, cbor::ToCbor, hash};
    use proptest::prelude::*;

    fn key() -> NativeScript {
        NativeScript::Signature(hash!(
            "5c3dbeb9f26fdfb1ca3e16af570ac24c0452f1dc5a783f7384d466ac"
        ))
    }

    #[test]
    fn encode_signature() {
        assert_eq!(
            hex::encode(key().to_cbor()),
            "8200581c5c3dbeb9f26fdfb1ca3e16af570ac24c0452f1dc5a783f7384d466ac",
        );
    }

    #[test]
    fn encode_time_locked_multisig() {
        let script = NativeScript::All(vec![
            NativeScript::AtLeast(1, vec![key()]),
            NativeScript::InvalidHereafter(1000),
        ]);
        assert_eq!(
            hex::encode(script.to_cbor()),
            "8201828303018182 00581c5c3dbeb9f26fdfb1ca3e16af570ac24c0452f1dc5a783f7384d466ac 82051903e8"
                .replace(' ', ""),
        );
    }

    #[test]
    fn hash_is_prefixed_with_native_discriminant() {
        let script = key();
        let mut preimage = vec![0x00];
        preimage.extend(script.to_cbor());
        assert_eq!(script.hash(), crate::Hash::blake2b_224(&preimage));
        assert_ne!(script.hash(), crate::Hash::blake2b_224(&script.to_cbor()));
    }

    proptest! {
        #[test]
        fn cbor_roundtrip(script in generators::native_script()) {
            prop_assert_eq!(cbor::decode::<NativeScript>(&script.to_cbor()).unwrap(), script);
        }
    }

    // -------------------------------------------------------------- Generators

    pub mod generators {
        use super::*;
        use crate::any;

        pub fn native_script() -> impl Strategy<Value = NativeScript> {
            let leaf = prop_oneof![
                any::hash28().prop_map(NativeScript::Signature),
                any::<u64>().prop_map(NativeScript::InvalidBefore),
                any::<u64>().prop_map(NativeScript::InvalidHereafter),
            ];
            leaf.prop_recursive(3, 16, 3, |inner| {
                prop_oneof![
                    prop::collection::vec(inner.clone(), 0..3).prop_map(NativeScript::All),
                    prop::collection::vec(inner.clone(), 0..3).prop_map(NativeScript::Any),
                    (any::<u32>(), prop::collection::vec(inner, 0..3))
                        .prop_map(|(n, scripts)| NativeScript::AtLeast(n, scripts)),
                ]
            })
        }
    }
}
