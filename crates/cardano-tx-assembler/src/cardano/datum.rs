//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{Hash, PlutusData, cbor, cbor::ToCbor};

/// The datum attached to an output: nothing, a hash of some data provided later in witnesses, or
/// the data itself.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Datum {
    #[default]
    None,
    Hash(Hash<32>),
    Inline(PlutusData),
}

impl Datum {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl From<Hash<32>> for Datum {
    fn from(hash: Hash<32>) -> Self {
        Self::Hash(hash)
    }
}

impl From<PlutusData> for Datum {
    fn from(data: PlutusData) -> Self {
        Self::Inline(data)
    }
}

// -------------------------------------------------------------------- Encoding

/// Encodes the datum option of an output; [`Datum::None`] is never serialised since the field is
/// then omitted.
impl<C> cbor::Encode<C> for Datum {
    fn encode<W: cbor::encode::write::Write>(
        &self,
        e: &mut cbor::Encoder<W>,
        _ctx: &mut C,
    ) -> Result<(), cbor::encode::Error<W::Error>> {
        match self {
            Self::None => {
                e.null()?;
            }
            Self::Hash(hash) => {
                e.array(2)?.u8(0)?.bytes(hash.as_ref())?;
            }
            Self::Inline(data) => {
                e.array(2)?
                    .u8(1)?
                    .tag(cbor::data::Tag::new(cbor::TAG_ENCODED_CBOR))?
                    .bytes(&data.to_cbor())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Datum;
    use crate::{PlutusData, cbor::ToCbor, hash};

    #[test]
    fn datum_hash() {
        let datum = Datum::from(hash!(
            "0000000000000000000000000000000000000000000000000000000000000000"
        ));
        assert_eq!(
            hex::encode(datum.to_cbor()),
            format!("82005820{}", "00".repeat(32)),
        );
    }

    #[test]
    fn inline_datum_is_wrapped() {
        let data = PlutusData::pre_encoded(hex::decode("d8799f00d87980ff").unwrap()).unwrap();
        assert_eq!(
            hex::encode(Datum::from(data).to_cbor()),
            "8201d81848d8799f00d87980ff",
        );
    }
}
