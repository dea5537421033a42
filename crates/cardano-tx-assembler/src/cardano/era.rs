//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::cbor;
use std::{fmt, str::FromStr};

/// The ledger era targeted by an assembled transaction. Eras differ in how sets and redeemers are
/// serialised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Era {
    #[default]
    Babbage,
    Conway,
}

impl fmt::Display for Era {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Babbage => "babbage",
            Self::Conway => "conway",
        })
    }
}

impl FromStr for Era {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "babbage" => Ok(Self::Babbage),
            "conway" => Ok(Self::Conway),
            _ => Err(anyhow::anyhow!("unsupported era {s:?}; expected babbage or conway")),
        }
    }
}

// -------------------------------------------------------------------- Encoding

impl Era {
    /// Whether sets are explicitly tagged (258) on the wire.
    pub fn tags_sets(&self) -> bool {
        matches!(self, Self::Conway)
    }

    /// Whether redeemers are serialised as a map keyed by (tag, index) rather than as a list.
    pub fn uses_redeemers_map(&self) -> bool {
        matches!(self, Self::Conway)
    }

    /// Write a set of elements, preceded by the set tag when the era requires it.
    pub fn encode_set<'a, T, C, W>(
        &self,
        e: &mut cbor::Encoder<W>,
        elems: impl ExactSizeIterator<Item = &'a T>,
        ctx: &mut C,
    ) -> Result<(), cbor::encode::Error<W::Error>>
    where
        T: cbor::Encode<C> + 'a,
        W: cbor::encode::write::Write,
    {
        if self.tags_sets() {
            e.tag(cbor::data::Tag::new(cbor::TAG_SET))?;
        }
        e.array(elems.len() as u64)?;
        for elem in elems {
            e.encode_with(elem, ctx)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Era;
    use crate::cbor;

    fn set(era: Era, elems: &[u8]) -> String {
        let mut bytes = Vec::new();
        era.encode_set(&mut cbor::Encoder::new(&mut bytes), elems.iter(), &mut ())
            .unwrap();
        hex::encode(bytes)
    }

    #[test]
    fn babbage_sets_are_plain_arrays() {
        assert_eq!(set(Era::Babbage, &[1, 2]), "820102");
    }

    #[test]
    fn conway_sets_are_tagged() {
        assert_eq!(set(Era::Conway, &[1, 2]), "d90102820102");
    }

    #[test]
    fn parse_era() {
        assert_eq!("Conway".parse::<Era>().unwrap(), Era::Conway);
        assert!("alonzo".parse::<Era>().is_err());
    }
}
