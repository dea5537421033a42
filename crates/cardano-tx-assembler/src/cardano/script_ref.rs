//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{Error, NativeScript, PlutusScript, PlutusVersion, cbor, cbor::ToCbor};

/// A script stored in an output, so that later transactions may reference it instead of carrying
/// it in their witnesses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptRef {
    Native(NativeScript),
    Plutus(PlutusScript),
    /// An already-serialised `[discriminant, script]` pair.
    Encoded(Vec<u8>),
}

// -------------------------------------------------------------------- Building

impl ScriptRef {
    /// Wrap an already-serialised script reference. The bytes must hold a well-formed
    /// `[discriminant, script]` pair.
    pub fn pre_encoded(bytes: Vec<u8>) -> Result<Self, Error> {
        let mut d = cbor::Decoder::new(&bytes);
        d.skip()
            .map_err(|e| Error::Encoding(format!("malformed script reference: {e}")))?;
        if d.position() != bytes.len() {
            return Err(Error::Encoding(
                "script reference holds trailing bytes".to_string(),
            ));
        }
        Ok(Self::Encoded(bytes))
    }
}

impl From<NativeScript> for ScriptRef {
    fn from(script: NativeScript) -> Self {
        Self::Native(script)
    }
}

impl From<PlutusScript> for ScriptRef {
    fn from(script: PlutusScript) -> Self {
        Self::Plutus(script)
    }
}

// ------------------------------------------------------------------ Inspecting

impl ScriptRef {
    /// The language of the referenced script, if it is a Plutus script.
    pub fn language(&self) -> Option<PlutusVersion> {
        match self {
            Self::Native(..) => None,
            Self::Plutus(script) => Some(script.version()),
            Self::Encoded(bytes) => {
                let mut d = cbor::Decoder::new(bytes);
                d.array().ok()?;
                PlutusVersion::try_from(d.u8().ok()?).ok()
            }
        }
    }

    /// The size of the script itself, as counted by the reference-script fee.
    pub fn size(&self) -> u64 {
        match self {
            Self::Native(script) => script.to_cbor().len() as u64,
            Self::Plutus(script) => script.size(),
            Self::Encoded(bytes) => match plutus_script_size(bytes) {
                Ok(Some(size)) => size as u64,
                _ => bytes.len() as u64,
            },
        }
    }
}

/// Size of the script bytes inside a serialised Plutus script reference; `None` for native
/// scripts.
fn plutus_script_size(bytes: &[u8]) -> Result<Option<usize>, cbor::decode::Error> {
    let mut d = cbor::Decoder::new(bytes);
    d.array()?;
    match d.u8()? {
        0 => Ok(None),
        _ => Ok(Some(d.bytes()?.len())),
    }
}

// -------------------------------------------------------------------- Encoding

impl<C> cbor::Encode<C> for ScriptRef {
    fn encode<W: cbor::encode::write::Write>(
        &self,
        e: &mut cbor::Encoder<W>,
        _ctx: &mut C,
    ) -> Result<(), cbor::encode::Error<W::Error>> {
        // Discriminants are all below 24, so each pair header fits in two bytes.
        let inner = match self {
            Self::Encoded(bytes) => bytes.clone(),
            Self::Native(script) => {
                let mut buffer = vec![0x82, 0x00];
                buffer.extend(script.to_cbor());
                buffer
            }
            Self::Plutus(script) => {
                let mut buffer = vec![0x82, u8::from(script.version())];
                buffer.extend(script.to_cbor());
                buffer
            }
        };
        e.tag(cbor::data::Tag::new(cbor::TAG_ENCODED_CBOR))?;
        e.bytes(&inner)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plutus_script;

    #[test]
    fn plutus_script_ref() {
        let script = plutus_script!(PlutusVersion::V2, "4e4d01000033222220051200120011");
        let script_ref = ScriptRef::from(script.clone());
        assert_eq!(
            hex::encode(script_ref.to_cbor()),
            "d8185282024f4e4d01000033222220051200120011",
        );
        assert_eq!(script_ref.language(), Some(PlutusVersion::V2));
        assert_eq!(script_ref.size(), 15);
    }

    #[test]
    fn native_script_ref() {
        let script_ref = ScriptRef::from(NativeScript::InvalidBefore(1));
        assert_eq!(hex::encode(script_ref.to_cbor()), "d818458200820401");
        assert_eq!(script_ref.language(), None);
        assert_eq!(script_ref.size(), 3);
    }

    #[test]
    fn pre_encoded_script_ref_is_inspected() {
        let script_ref =
            ScriptRef::pre_encoded(hex::decode("82034e4d01000033222220051200120011").unwrap())
                .unwrap();
        assert_eq!(script_ref.language(), Some(PlutusVersion::V3));
        assert_eq!(script_ref.size(), 14);
        assert_eq!(
            hex::encode(script_ref.to_cbor()),
            "d8185182034e4d01000033222220051200120011",
        );
    }

    #[test]
    fn pre_encoded_script_ref_must_be_well_formed() {
        assert!(ScriptRef::pre_encoded(vec![0x82, 0x03]).is_err());
    }
}
