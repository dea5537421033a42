//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

pub use minicbor::{decode::Decode, encode::Encode};
pub use pallas_codec::minicbor::*;
use std::convert::Infallible;

/// Tag marking a definite set of unique elements, mandatory from the Conway era onwards.
pub const TAG_SET: u64 = 258;

/// Tag wrapping an embedded, already-serialised CBOR value (inline datums, script references).
pub const TAG_ENCODED_CBOR: u64 = 24;

/// Tag wrapping the post-Alonzo auxiliary data map.
pub const TAG_AUXILIARY_DATA: u64 = 259;

/// A trait mostly for convenience, as we often end up writing bytes to CBOR. The original
/// [`minicbor::Encode::encode`] makes room for encoding into any Writer type, and thus provides
/// the ability to fail.
///
/// When writing bytes to a vector, the operation is however Infaillible.
pub trait ToCbor {
    fn to_cbor(&self) -> Vec<u8>;
}

impl<T: Encode<()>> ToCbor for T {
    fn to_cbor(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        let _: Result<(), encode::Error<Infallible>> = encode(self, &mut bytes);
        bytes
    }
}

/// Encode an integer of any size that fits in 128 bits. Values outside of the major types 0 and
/// 1 range fall back to big-endian bignums (tags 2 and 3).
pub fn encode_integer<W: encode::write::Write>(
    e: &mut Encoder<W>,
    n: i128,
) -> Result<(), encode::Error<W::Error>> {
    if let Ok(n) = data::Int::try_from(n) {
        e.int(n)?;
        return Ok(());
    }

    let (tag, magnitude) = if n < 0 {
        (data::IanaTag::NegBignum, (-1 - n) as u128)
    } else {
        (data::IanaTag::PosBignum, n as u128)
    };

    let bytes = magnitude.to_be_bytes();
    let leading_zeroes = bytes.iter().take_while(|b| **b == 0).count();
    e.tag(tag)?.bytes(&bytes[leading_zeroes..])?;
    Ok(())
}

/// Decode an integer, including bignums as long as they fit in 128 bits.
pub fn decode_integer(d: &mut Decoder<'_>) -> Result<i128, decode::Error> {
    match d.datatype()? {
        data::Type::Tag => {
            let tag = d.tag()?;
            let bytes = d.bytes()?;
            if bytes.len() > 16 {
                return Err(decode::Error::message("bignum doesn't fit in 128 bits"));
            }
            let mut buffer = [0u8; 16];
            buffer[16 - bytes.len()..].copy_from_slice(bytes);
            let magnitude = i128::try_from(u128::from_be_bytes(buffer))
                .map_err(|_| decode::Error::message("bignum doesn't fit in 128 bits"))?;
            if tag == data::Tag::from(data::IanaTag::PosBignum) {
                Ok(magnitude)
            } else if tag == data::Tag::from(data::IanaTag::NegBignum) {
                Ok(-1 - magnitude)
            } else {
                Err(decode::Error::message(format!(
                    "unexpected tag {tag:?} in place of an integer"
                )))
            }
        }
        _ => Ok(i128::from(d.int()?)),
    }
}

/// Consume a definite or indefinite array header, and call `each` for every element until the end
/// of the array.
pub fn decode_array<'d, T>(
    d: &mut Decoder<'d>,
    mut each: impl FnMut(&mut Decoder<'d>) -> Result<T, decode::Error>,
) -> Result<Vec<T>, decode::Error> {
    let mut elems = Vec::new();
    match d.array()? {
        Some(len) => {
            for _ in 0..len {
                elems.push(each(d)?);
            }
        }
        None => {
            while d.datatype()? != data::Type::Break {
                elems.push(each(d)?);
            }
            d.set_position(d.position() + 1);
        }
    }
    Ok(elems)
}

/// Like [`decode_array`], but for map entries.
pub fn decode_map<'d, K, V>(
    d: &mut Decoder<'d>,
    mut each: impl FnMut(&mut Decoder<'d>) -> Result<(K, V), decode::Error>,
) -> Result<Vec<(K, V)>, decode::Error> {
    let mut entries = Vec::new();
    match d.map()? {
        Some(len) => {
            for _ in 0..len {
                entries.push(each(d)?);
            }
        }
        None => {
            while d.datatype()? != data::Type::Break {
                entries.push(each(d)?);
            }
            d.set_position(d.position() + 1);
        }
    }
    Ok(entries)
}

/// Skip an optional set tag in front of an array, as found in Conway-era transactions.
pub fn skip_set_tag(d: &mut Decoder<'_>) -> Result<(), decode::Error> {
    if d.datatype()? == data::Type::Tag {
        let tag = d.tag()?;
        if tag != data::Tag::new(TAG_SET) {
            return Err(decode::Error::message(format!("unexpected tag {tag:?}")));
        }
    }
    Ok(())
}

// ----------------------------------------------------------------------- Tests

#[cfg(test)]
mod tests {
    use super::*;

    fn integer(n: i128) -> Vec<u8> {
        let mut bytes = Vec::new();
        encode_integer(&mut Encoder::new(&mut bytes), n).unwrap();
        bytes
    }

    #[test]
    fn small_integers_are_plain() {
        assert_eq!(hex::encode(integer(0)), "00");
        assert_eq!(hex::encode(integer(-1)), "20");
        assert_eq!(hex::encode(integer(500)), "1901f4");
        assert_eq!(hex::encode(integer(u64::MAX as i128)), "1bffffffffffffffff");
    }

    #[test]
    fn large_integers_are_bignums() {
        assert_eq!(hex::encode(integer(1 << 64)), "c249010000000000000000");
        assert_eq!(hex::encode(integer(-(1 << 64) - 1)), "c349010000000000000000");
    }

    #[test]
    fn integers_decode_back() {
        for n in [0, 42, -42, 1 << 64, -(1 << 64) - 1, i128::MAX, i128::MIN] {
            let bytes = integer(n);
            assert_eq!(decode_integer(&mut Decoder::new(&bytes)).unwrap(), n);
        }
    }

    #[test]
    fn arrays_decode_in_both_forms() {
        let definite = hex::decode("83010203").unwrap();
        let indefinite = hex::decode("9f010203ff").unwrap();
        for bytes in [definite, indefinite] {
            let elems = decode_array(&mut Decoder::new(&bytes), |d| d.u8()).unwrap();
            assert_eq!(elems, vec![1, 2, 3]);
        }
    }
}
