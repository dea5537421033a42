//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{Error, Hash, cbor, cbor::ToCbor};
use std::fmt;

/// Byte strings longer than this are split into chunks of that size when serialised.
const BYTES_CHUNK_SIZE: usize = 64;

/// Tag of the general constructor form `[constructor, fields]`.
const TAG_GENERAL_CONSTR: u64 = 102;

/// An arbitrary data format used by Plutus smart contracts, for datums and redeemers alike.
///
/// It can be constructed directly using one of the two leaf variants:
///
/// - [`Self::integer`]
/// - [`Self::bytes`]
///
/// And combine to form larger objects using:
///
/// - [`Self::list`]
/// - [`Self::map`]
/// - [`Self::constr`]
///
/// Every node may carry an optional constructor index, serialised as a CBOR tag wrapping the
/// node. Already-serialised values can also be embedded as-is with [`Self::pre_encoded`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlutusData {
    constructor: Option<u64>,
    node: Node,
}

/// The shape of a [`PlutusData`] value, without its constructor index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Integer(i128),
    Bytes(Vec<u8>),
    List(Vec<PlutusData>),
    /// Key/value pairs, kept in construction order.
    Map(Vec<(PlutusData, PlutusData)>),
    /// An opaque, already-serialised CBOR value, emitted verbatim.
    Encoded(Vec<u8>),
}

impl fmt::Display for PlutusData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CBOR({})", hex::encode(self.to_cbor()))
    }
}

// -------------------------------------------------------------------- Building

impl PlutusData {
    /// Construct a data value from an integer.
    ///
    /// # examples
    ///
    /// ```rust
    /// # use cardano_tx_assembler::PlutusData;
    /// assert_eq!(
    ///     format!("{}", PlutusData::integer(42)),
    ///     "CBOR(182a)",
    /// );
    ///
    /// assert_eq!(
    ///     format!("{}", PlutusData::integer(-14)),
    ///     "CBOR(2d)",
    /// );
    ///
    /// assert_eq!(
    ///     format!("{}", PlutusData::integer(u64::MAX as i128 + 1)),
    ///     "CBOR(c249010000000000000000)",
    /// );
    /// ```
    pub fn integer(i: impl Into<i128>) -> Self {
        Self::from(Node::Integer(i.into()))
    }

    /// Construct a byte-array value. Values longer than 64 bytes are serialised as indefinite
    /// byte strings of 64-byte chunks.
    ///
    /// # examples
    ///
    /// ```rust
    /// # use cardano_tx_assembler::PlutusData;
    /// assert_eq!(
    ///     format!("{}", PlutusData::bytes(b"foo")),
    ///     "CBOR(43666f6f)"
    /// );
    /// ```
    pub fn bytes(bytes: impl AsRef<[u8]>) -> Self {
        Self::from(Node::Bytes(bytes.as_ref().to_vec()))
    }

    /// Construct a list of [`self::PlutusData`] values.
    ///
    /// # examples
    ///
    /// ```rust
    /// # use cardano_tx_assembler::PlutusData;
    /// assert_eq!(
    ///     format!("{}", PlutusData::list([])),
    ///     "CBOR(80)"
    /// );
    ///
    /// assert_eq!(
    ///     format!("{}", PlutusData::list([
    ///         PlutusData::bytes(b"foo"),
    ///         PlutusData::bytes(b"bar"),
    ///     ])),
    ///     "CBOR(8243666f6f43626172)"
    /// );
    /// ```
    pub fn list(elems: impl IntoIterator<Item = Self>) -> Self {
        Self::from(Node::List(elems.into_iter().collect()))
    }

    /// Construct a key/value map. Entries are serialised in the given order; they're never
    /// re-sorted.
    ///
    /// # examples
    ///
    /// ```rust
    /// # use cardano_tx_assembler::PlutusData;
    /// assert_eq!(
    ///     format!("{}", PlutusData::map([
    ///         (PlutusData::integer(2), PlutusData::bytes(b"")),
    ///         (PlutusData::integer(1), PlutusData::bytes(b"")),
    ///     ])),
    ///     "CBOR(a202400140)"
    /// );
    /// ```
    pub fn map(kvs: impl IntoIterator<Item = (Self, Self)>) -> Self {
        Self::from(Node::Map(kvs.into_iter().collect()))
    }

    /// Construct a tagged constructor holding a list of fields.
    ///
    /// # examples
    ///
    /// ```rust
    /// # use cardano_tx_assembler::PlutusData;
    /// assert_eq!(
    ///     format!("{}", PlutusData::constr(2, [
    ///         PlutusData::integer(1),
    ///         PlutusData::bytes([0xAB]),
    ///     ])),
    ///     "CBOR(d87b820141ab)"
    /// );
    ///
    /// assert_eq!(
    ///     format!("{}", PlutusData::constr(7, [])),
    ///     "CBOR(d9050080)"
    /// );
    ///
    /// assert_eq!(
    ///     format!("{}", PlutusData::constr(128, [])),
    ///     "CBOR(d86682188080)"
    /// );
    /// ```
    pub fn constr(ix: u64, fields: impl IntoIterator<Item = Self>) -> Self {
        Self::list(fields).with_constructor(ix)
    }

    /// Attach (or replace) the constructor index of any node.
    pub fn with_constructor(mut self, ix: u64) -> Self {
        self.constructor = Some(ix);
        self
    }

    /// Embed an already-serialised value, emitted verbatim when encoding. The bytes must hold
    /// exactly one well-formed CBOR item.
    ///
    /// # examples
    ///
    /// ```rust
    /// # use cardano_tx_assembler::PlutusData;
    /// let data = PlutusData::pre_encoded(hex::decode("d8799f00d87980ff").unwrap()).unwrap();
    /// assert_eq!(format!("{data}"), "CBOR(d8799f00d87980ff)");
    /// ```
    pub fn pre_encoded(bytes: Vec<u8>) -> Result<Self, Error> {
        let mut d = cbor::Decoder::new(&bytes);
        d.skip()
            .map_err(|e| Error::Encoding(format!("malformed pre-encoded data: {e}")))?;
        if d.position() != bytes.len() {
            return Err(Error::Encoding(format!(
                "pre-encoded data holds trailing bytes after position {}",
                d.position()
            )));
        }
        Ok(Self::from(Node::Encoded(bytes)))
    }

    /// Decode a serialised value into its structured form.
    pub fn from_cbor(bytes: &[u8]) -> Result<Self, Error> {
        Ok(cbor::decode(bytes)?)
    }
}

impl From<Node> for PlutusData {
    fn from(node: Node) -> Self {
        Self {
            constructor: None,
            node,
        }
    }
}

// ------------------------------------------------------------------ Inspecting

impl PlutusData {
    pub fn constructor(&self) -> Option<u64> {
        self.constructor
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn as_integer(&self) -> Option<i128> {
        match self.node {
            Node::Integer(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.node {
            Node::Bytes(bytes) => Some(bytes.as_slice()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Self]> {
        match &self.node {
            Node::List(elems) => Some(elems.as_slice()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(Self, Self)]> {
        match &self.node {
            Node::Map(kvs) => Some(kvs.as_slice()),
            _ => None,
        }
    }

    /// The hash of the serialised value, as referenced by outputs carrying a datum hash.
    pub fn hash(&self) -> Hash<32> {
        Hash::blake2b_256(&self.to_cbor())
    }
}

// -------------------------------------------------------------------- Encoding

impl<C> cbor::Encode<C> for PlutusData {
    fn encode<W: cbor::encode::write::Write>(
        &self,
        e: &mut cbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), cbor::encode::Error<W::Error>> {
        if let Node::Encoded(bytes) = &self.node {
            e.writer_mut()
                .write_all(bytes)
                .map_err(cbor::encode::Error::write)?;
            return Ok(());
        }

        match self.constructor {
            None => (),
            Some(ix @ 0..=6) => {
                e.tag(cbor::data::Tag::new(121 + ix))?;
            }
            Some(ix @ 7..=127) => {
                e.tag(cbor::data::Tag::new(1280 + ix - 7))?;
            }
            // The ledger only reserves the compact tags 1280..=1400; higher constructors need the
            // general form.
            Some(ix) => {
                e.tag(cbor::data::Tag::new(TAG_GENERAL_CONSTR))?;
                e.array(2)?;
                e.u64(ix)?;
            }
        }

        match &self.node {
            Node::Integer(i) => cbor::encode_integer(e, *i)?,
            Node::Bytes(bytes) if bytes.len() <= BYTES_CHUNK_SIZE => {
                e.bytes(bytes)?;
            }
            Node::Bytes(bytes) => {
                e.begin_bytes()?;
                for chunk in bytes.chunks(BYTES_CHUNK_SIZE) {
                    e.bytes(chunk)?;
                }
                e.end()?;
            }
            Node::List(elems) => {
                e.array(elems.len() as u64)?;
                for elem in elems {
                    e.encode_with(elem, ctx)?;
                }
            }
            Node::Map(kvs) => {
                e.map(kvs.len() as u64)?;
                for (k, v) in kvs {
                    e.encode_with(k, ctx)?;
                    e.encode_with(v, ctx)?;
                }
            }
            Node::Encoded(..) => unreachable!("pre-encoded data is written verbatim above"),
        }

        Ok(())
    }
}

// -------------------------------------------------------------------- Decoding

impl<'d, C> cbor::Decode<'d, C> for PlutusData {
    fn decode(d: &mut cbor::Decoder<'d>, ctx: &mut C) -> Result<Self, cbor::decode::Error> {
        use cbor::data::{IanaTag, Tag, Type};

        if d.datatype()? == Type::Tag {
            let position = d.position();
            let tag = d.tag()?;
            if tag == Tag::from(IanaTag::PosBignum) || tag == Tag::from(IanaTag::NegBignum) {
                d.set_position(position);
                return Ok(Self::integer(cbor::decode_integer(d)?));
            }
            return match u64::from(tag) {
                tag @ 121..=127 => Ok(Self::decode_node(d, ctx)?.with_constructor(tag - 121)),
                tag @ 1280..=1400 => Ok(Self::decode_node(d, ctx)?.with_constructor(tag - 1273)),
                TAG_GENERAL_CONSTR => {
                    if d.array()? != Some(2) {
                        return Err(cbor::decode::Error::message(
                            "general constructor form must be a 2-element array",
                        ));
                    }
                    let ix = d.u64()?;
                    Ok(Self::decode_node(d, ctx)?.with_constructor(ix))
                }
                tag => Err(cbor::decode::Error::message(format!(
                    "unexpected tag {tag} in plutus data"
                ))),
            };
        }

        Self::decode_node(d, ctx)
    }
}

impl PlutusData {
    fn decode_node<C>(d: &mut cbor::Decoder<'_>, ctx: &mut C) -> Result<Self, cbor::decode::Error> {
        use cbor::data::Type;

        match d.datatype()? {
            Type::U8
            | Type::U16
            | Type::U32
            | Type::U64
            | Type::I8
            | Type::I16
            | Type::I32
            | Type::I64
            | Type::Int => Ok(Self::integer(cbor::decode_integer(d)?)),
            Type::Bytes | Type::BytesIndef => {
                let mut bytes = Vec::new();
                for chunk in d.bytes_iter()? {
                    bytes.extend_from_slice(chunk?);
                }
                Ok(Self::bytes(bytes))
            }
            Type::Array | Type::ArrayIndef => Ok(Self::list(cbor::decode_array(d, |d| {
                d.decode_with(ctx)
            })?)),
            Type::Map | Type::MapIndef => Ok(Self::map(cbor::decode_map(d, |d| {
                Ok((d.decode_with(ctx)?, d.decode_with(ctx)?))
            })?)),
            Type::Tag => {
                // Nested constructors aren't a thing; only bignums may appear here.
                Ok(Self::integer(cbor::decode_integer(d)?))
            }
            other => Err(cbor::decode::Error::message(format!(
                "unexpected {other:?} in plutus data"
            ))),
        }
    }
}

// ----------------------------------------------------------------------- Tests

#[cfg(any(test, feature = "test-utils"))]
pub mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn constructor_tag_offsets() {
        let data = PlutusData::constr(2, [PlutusData::integer(1), PlutusData::bytes([0xAB])]);
        let bytes = data.to_cbor();
        assert_eq!(&bytes[..2], &[0xd8, 123]);

        let decoded = PlutusData::from_cbor(&bytes).unwrap();
        assert_eq!(decoded.constructor(), Some(2));
        assert_eq!(decoded, data);
    }

    #[test]
    fn large_constructors_use_the_extended_range() {
        let data = PlutusData::constr(127, []);
        assert_eq!(hex::encode(data.to_cbor()), "d9057880");
        assert_eq!(PlutusData::from_cbor(&data.to_cbor()).unwrap().constructor(), Some(127));
    }

    #[test]
    fn pre_encoded_is_verbatim() {
        let bytes = hex::decode("d8799f00d87980ff").unwrap();
        let data = PlutusData::pre_encoded(bytes.clone()).unwrap();
        assert_eq!(data.to_cbor(), bytes);
        assert_eq!(
            PlutusData::list([data]).to_cbor(),
            hex::decode("81d8799f00d87980ff").unwrap(),
        );
    }

    #[test]
    fn pre_encoded_must_be_one_item() {
        assert!(matches!(
            PlutusData::pre_encoded(vec![0x01, 0x02]),
            Err(Error::Encoding(..))
        ));
        assert!(matches!(
            PlutusData::pre_encoded(vec![0x82, 0x01]),
            Err(Error::Encoding(..))
        ));
    }

    #[test]
    fn decode_indefinite_forms() {
        let data = PlutusData::from_cbor(&hex::decode("d8799f00d87980ff").unwrap()).unwrap();
        assert_eq!(
            data,
            PlutusData::constr(0, [PlutusData::integer(0), PlutusData::constr(0, [])]),
        );
    }

    #[test]
    fn long_bytes_are_chunked() {
        let data = PlutusData::bytes([0x2a; 65]);
        let bytes = data.to_cbor();
        assert_eq!(&bytes[..3], &[0x5f, 0x58, 0x40]);
        assert_eq!(&bytes[bytes.len() - 3..], &[0x41, 0x2a, 0xff]);
        assert_eq!(PlutusData::from_cbor(&bytes).unwrap(), data);
    }

    #[test]
    fn unknown_tags_are_rejected() {
        assert!(PlutusData::from_cbor(&hex::decode("d81e80").unwrap()).is_err());
    }

    #[test]
    fn maps_keep_construction_order() {
        let data = PlutusData::from_cbor(&hex::decode("a202400140").unwrap()).unwrap();
        let keys = data
            .as_map()
            .unwrap()
            .iter()
            .map(|(k, _)| k.as_integer().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(keys, vec![2, 1]);
    }

    proptest! {
        #[test]
        fn prop_roundtrip(data in generators::plutus_data()) {
            prop_assert_eq!(PlutusData::from_cbor(&data.to_cbor()).unwrap(), data);
        }
    }

    // -------------------------------------------------------------- Generators

    pub mod generators {
        use super::*;

        fn constructor() -> impl Strategy<Value = Option<u64>> {
            prop_oneof![
                Just(None),
                (0..=6u64).prop_map(Some),
                (7..=127u64).prop_map(Some),
                (128..100_000u64).prop_map(Some),
            ]
        }

        fn with_constructor(
            node: impl Strategy<Value = PlutusData>,
        ) -> impl Strategy<Value = PlutusData> {
            (node, constructor()).prop_map(|(data, constructor)| match constructor {
                Some(ix) => data.with_constructor(ix),
                None => data,
            })
        }

        fn leaf() -> impl Strategy<Value = PlutusData> {
            with_constructor(prop_oneof![
                any::<i128>().prop_map(PlutusData::integer),
                any::<i64>().prop_map(PlutusData::integer),
                prop::collection::vec(any::<u8>(), 0..100).prop_map(PlutusData::bytes),
            ])
        }

        pub fn plutus_data() -> impl Strategy<Value = PlutusData> {
            leaf().prop_recursive(3, 32, 4, |inner| {
                with_constructor(prop_oneof![
                    prop::collection::vec(inner.clone(), 0..4).prop_map(PlutusData::list),
                    prop::collection::vec((inner.clone(), inner), 0..4).prop_map(PlutusData::map),
                ])
            })
        }
    }
}
