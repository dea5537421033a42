//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{Era, ExecutionUnits, PlutusData, cbor};
use anyhow::anyhow;
use std::{fmt, str::FromStr};

/// The purpose a redeemer is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, cbor::Encode, cbor::Decode)]
#[cbor(index_only)]
pub enum RedeemerTag {
    #[n(0)]
    Spend,
    #[n(1)]
    Mint,
    #[n(2)]
    Cert,
    #[n(3)]
    Reward,
    #[n(4)]
    Vote,
    #[n(5)]
    Propose,
}

impl FromStr for RedeemerTag {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "spend" => Ok(Self::Spend),
            "mint" => Ok(Self::Mint),
            "cert" | "publish" => Ok(Self::Cert),
            "reward" | "withdraw" => Ok(Self::Reward),
            "vote" => Ok(Self::Vote),
            "propose" => Ok(Self::Propose),
            _ => Err(anyhow!("unknown redeemer tag {s:?}")),
        }
    }
}

/// Identifies a redeemer within a transaction: its purpose, and the index of the item it
/// unlocks within the (sorted) collection that purpose refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, cbor::Encode, cbor::Decode)]
#[cbor(array)]
pub struct RedeemerPointer {
    #[n(0)]
    pub tag: RedeemerTag,
    #[n(1)]
    pub index: u32,
}

impl fmt::Display for RedeemerPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}[{}]", self.tag, self.index)
    }
}

impl RedeemerPointer {
    pub fn new(tag: RedeemerTag, index: u32) -> Self {
        Self { tag, index }
    }

    pub fn mint(index: u32) -> Self {
        Self::new(RedeemerTag::Mint, index)
    }

    pub fn spend(index: u32) -> Self {
        Self::new(RedeemerTag::Spend, index)
    }
}

/// A redeemer: argument passed to a script for a given purpose, alongside its execution budget.
///
/// The budget is usually unknown when the transaction is first described; it's then filled by
/// evaluating the transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redeemer {
    pub pointer: RedeemerPointer,
    pub data: PlutusData,
    pub execution_units: Option<ExecutionUnits>,
}

impl Redeemer {
    pub fn new(tag: RedeemerTag, index: u32, data: PlutusData) -> Self {
        Self {
            pointer: RedeemerPointer::new(tag, index),
            data,
            execution_units: None,
        }
    }

    pub fn with_execution_units(mut self, execution_units: ExecutionUnits) -> Self {
        self.execution_units = Some(execution_units);
        self
    }

    pub fn execution_units(&self) -> ExecutionUnits {
        self.execution_units.unwrap_or_default()
    }
}

/// A list of redeemers, serialised the way the target era expects it.
#[derive(Debug, Clone, Copy)]
pub struct Redeemers<'a> {
    era: Era,
    redeemers: &'a [Redeemer],
}

impl<'a> Redeemers<'a> {
    pub fn new(era: Era, redeemers: &'a [Redeemer]) -> Self {
        Self { era, redeemers }
    }
}

// -------------------------------------------------------------------- Encoding

impl<C> cbor::Encode<C> for Redeemers<'_> {
    fn encode<W: cbor::encode::write::Write>(
        &self,
        e: &mut cbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), cbor::encode::Error<W::Error>> {
        if self.era.uses_redeemers_map() {
            e.map(self.redeemers.len() as u64)?;
            for redeemer in self.redeemers {
                e.encode_with(redeemer.pointer, ctx)?;
                e.array(2)?;
                e.encode_with(&redeemer.data, ctx)?;
                e.encode_with(redeemer.execution_units(), ctx)?;
            }
        } else {
            e.array(self.redeemers.len() as u64)?;
            for redeemer in self.redeemers {
                e.array(4)?;
                e.encode_with(redeemer.pointer.tag, ctx)?;
                e.u32(redeemer.pointer.index)?;
                e.encode_with(&redeemer.data, ctx)?;
                e.encode_with(redeemer.execution_units(), ctx)?;
            }
        }
        Ok(())
    }
}

// -------------------------------------------------------------------- Decoding

/// Read redeemers back from their serialised form, in either era's representation.
pub fn decode_redeemers(d: &mut cbor::Decoder<'_>) -> Result<Vec<Redeemer>, cbor::decode::Error> {
    use cbor::data::Type;

    match d.datatype()? {
        Type::Map | Type::MapIndef => cbor::decode_map(d, |d| {
            let pointer: RedeemerPointer = d.decode()?;
            d.array()?;
            let data: PlutusData = d.decode()?;
            let execution_units: ExecutionUnits = d.decode()?;
            Ok((pointer, (data, execution_units)))
        })
        .map(|entries| {
            entries
                .into_iter()
                .map(|(pointer, (data, execution_units))| Redeemer {
                    pointer,
                    data,
                    execution_units: Some(execution_units),
                })
                .collect()
        }),
        _ => cbor::decode_array(d, |d| {
            d.array()?;
            let tag: RedeemerTag = d.decode()?;
            let index = d.u32()?;
            let data: PlutusData = d.decode()?;
            let execution_units: ExecutionUnits = d.decode()?;
            Ok(Redeemer {
                pointer: RedeemerPointer::new(tag, index),
                data,
                execution_units: Some(execution_units),
            })
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cbor::ToCbor;

    fn redeemers() -> Vec<Redeemer> {
        vec![
            Redeemer::new(RedeemerTag::Mint, 0, PlutusData::constr(0, []))
                .with_execution_units(ExecutionUnits::new(10, 20)),
        ]
    }

    #[test]
    fn babbage_redeemers_are_a_list() {
        assert_eq!(
            hex::encode(Redeemers::new(Era::Babbage, &redeemers()).to_cbor()),
            "81840100d8798082 0a14".replace(' ', ""),
        );
    }

    #[test]
    fn conway_redeemers_are_a_map() {
        assert_eq!(
            hex::encode(Redeemers::new(Era::Conway, &redeemers()).to_cbor()),
            "a1820100 82d87980820a14".replace(' ', ""),
        );
    }

    #[test]
    fn decode_both_forms() {
        for era in [Era::Babbage, Era::Conway] {
            let bytes = Redeemers::new(era, &redeemers()).to_cbor();
            let decoded = decode_redeemers(&mut cbor::Decoder::new(&bytes)).unwrap();
            assert_eq!(decoded, redeemers());
        }
    }

    #[test]
    fn parse_tags() {
        assert_eq!("MINT".parse::<RedeemerTag>().unwrap(), RedeemerTag::Mint);
        assert!("nope".parse::<RedeemerTag>().is_err());
    }
}
