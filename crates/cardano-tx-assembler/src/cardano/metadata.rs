//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{Error, cbor};
use std::collections::BTreeMap;

/// Transaction metadata: arbitrary values indexed by numeric labels.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Metadata(BTreeMap<u64, Metadatum>);

/// A single metadata value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Metadatum {
    Int(i128),
    Bytes(Vec<u8>),
    Text(String),
    List(Vec<Metadatum>),
    Map(Vec<(Metadatum, Metadatum)>),
}

impl Metadata {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, label: u64) -> Option<&Metadatum> {
        self.0.get(&label)
    }

    pub fn with(mut self, label: u64, value: impl Into<Metadatum>) -> Self {
        self.0.insert(label, value.into());
        self
    }

    pub fn from_cbor(bytes: &[u8]) -> Result<Self, Error> {
        Ok(cbor::decode(bytes)?)
    }
}

impl FromIterator<(u64, Metadatum)> for Metadata {
    fn from_iter<T: IntoIterator<Item = (u64, Metadatum)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<&str> for Metadatum {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<i128> for Metadatum {
    fn from(n: i128) -> Self {
        Self::Int(n)
    }
}

impl From<Vec<u8>> for Metadatum {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

// -------------------------------------------------------------------- Encoding

impl<C> cbor::Encode<C> for Metadata {
    fn encode<W: cbor::encode::write::Write>(
        &self,
        e: &mut cbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), cbor::encode::Error<W::Error>> {
        e.map(self.0.len() as u64)?;
        for (label, value) in &self.0 {
            e.u64(*label)?;
            e.encode_with(value, ctx)?;
        }
        Ok(())
    }
}

impl<C> cbor::Encode<C> for Metadatum {
    fn encode<W: cbor::encode::write::Write>(
        &self,
        e: &mut cbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), cbor::encode::Error<W::Error>> {
        match self {
            Self::Int(n) => cbor::encode_integer(e, *n)?,
            Self::Bytes(bytes) => {
                e.bytes(bytes)?;
            }
            Self::Text(text) => {
                e.str(text)?;
            }
            Self::List(elems) => {
                e.array(elems.len() as u64)?;
                for elem in elems {
                    e.encode_with(elem, ctx)?;
                }
            }
            Self::Map(kvs) => {
                e.map(kvs.len() as u64)?;
                for (k, v) in kvs {
                    e.encode_with(k, ctx)?;
                    e.encode_with(v, ctx)?;
                }
            }
        }
        Ok(())
    }
}

// -------------------------------------------------------------------- Decoding

impl<'d, C> cbor::Decode<'d, C> for Metadata {
    fn decode(d: &mut cbor::Decoder<'d>, ctx: &mut C) -> Result<Self, cbor::decode::Error> {
        let entries = cbor::decode_map(d, |d| Ok((d.u64()?, d.decode_with(ctx)?)))?;
        Ok(Self(entries.into_iter().collect()))
    }
}

impl<'d, C> cbor::Decode<'d, C> for Metadatum {
    fn decode(d: &mut cbor::Decoder<'d>, ctx: &mut C) -> Result<Self, cbor::decode::Error> {
        use cbor::data::Type;

        match d.datatype()? {
            Type::Bytes | Type::BytesIndef => {
                let chunks = d.bytes_iter()?.collect::<Result<Vec<_>, _>>()?;
                Ok(Self::Bytes(chunks.concat()))
            }
            Type::String | Type::StringIndef => {
                let chunks = d.str_iter()?.collect::<Result<Vec<_>, _>>()?;
                Ok(Self::Text(chunks.concat()))
            }
            Type::Array | Type::ArrayIndef => {
                Ok(Self::List(cbor::decode_array(d, |d| d.decode_with(ctx))?))
            }
            Type::Map | Type::MapIndef => Ok(Self::Map(cbor::decode_map(d, |d| {
                Ok((d.decode_with(ctx)?, d.decode_with(ctx)?))
            })?)),
            _ => Ok(Self::Int(cbor::decode_integer(d)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cbor::ToCbor;

    #[test]
    fn labels_are_ordered() {
        let metadata = Metadata::default()
            .with(674, Metadatum::List(vec![Metadatum::from("hello")]))
            .with(1, Metadatum::Int(-1));
        assert_eq!(
            hex::encode(metadata.to_cbor()),
            "a201201902a2816568656c6c6f",
        );
    }

    #[test]
    fn decode_pre_encoded_metadata() {
        let bytes = hex::decode("a11902a2a1636d7367816568656c6c6f").unwrap();
        let metadata = Metadata::from_cbor(&bytes).unwrap();
        assert_eq!(
            metadata.get(674),
            Some(&Metadatum::Map(vec![(
                Metadatum::from("msg"),
                Metadatum::List(vec![Metadatum::from("hello")]),
            )])),
        );
        assert_eq!(metadata.to_cbor(), bytes);
    }

    #[test]
    fn reject_non_map() {
        assert!(Metadata::from_cbor(&[0x80]).is_err());
    }
}
