//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The script data hash binds redeemers, datums and the cost models scripts run under to a
//! transaction body; so that none can be altered once the body is signed.

use crate::{
    Era, Error, Hash, PlutusData, PlutusVersion, ProtocolParameters, Redeemer, cbor,
    cbor::ToCbor, redeemer::Redeemers,
};
use std::{collections::BTreeSet, convert::Infallible};

/// Language assumed when redeemers are present but no script (witnessed or referenced) tells
/// which one they are for.
pub const DEFAULT_LANGUAGE: PlutusVersion = PlutusVersion::V2;

/// Stands for the redeemers when there are none, in every era; an empty CBOR array.
const EMPTY_REDEEMERS: u8 = 0x80;

/// Stands for the language views when there are no redeemers; an empty CBOR map.
const EMPTY_LANGUAGE_VIEWS: u8 = 0xa0;

/// Compute the script data hash; `None` when there are neither redeemers nor datums.
pub fn script_data_hash(
    era: Era,
    redeemers: &[Redeemer],
    datums: &[PlutusData],
    languages: &BTreeSet<PlutusVersion>,
    params: &ProtocolParameters,
) -> Result<Option<Hash<32>>, Error> {
    if redeemers.is_empty() && datums.is_empty() {
        return Ok(None);
    }

    let mut preimage = Vec::new();

    if redeemers.is_empty() {
        preimage.push(EMPTY_REDEEMERS);
    } else {
        preimage.extend(Redeemers::new(era, redeemers).to_cbor());
    }

    if !datums.is_empty() {
        let _: Result<(), cbor::encode::Error<Infallible>> =
            era.encode_set(&mut cbor::Encoder::new(&mut preimage), datums.iter(), &mut ());
    }

    if redeemers.is_empty() {
        preimage.push(EMPTY_LANGUAGE_VIEWS);
    } else if languages.is_empty() {
        preimage.extend(language_views(&BTreeSet::from([DEFAULT_LANGUAGE]), params)?);
    } else {
        preimage.extend(language_views(languages, params)?);
    }

    Ok(Some(Hash::blake2b_256(&preimage)))
}

/// Serialise the cost models of the given languages, as the ledger expects them in the script
/// data hash.
///
/// PlutusV1 carries historical quirks: its key is the serialised language tag wrapped in a byte
/// string, and its value is an indefinite list, itself wrapped in a byte string.
pub fn language_views(
    languages: &BTreeSet<PlutusVersion>,
    params: &ProtocolParameters,
) -> Result<Vec<u8>, Error> {
    let mut views = Vec::with_capacity(languages.len());
    for language in languages {
        let cost_model = params.cost_model(*language).ok_or_else(|| {
            Error::Precondition(format!("missing cost model for {language}"))
        })?;
        views.push((*language, cost_model));
    }

    // Keys are sorted by their serialised form, shortest first; so V1 comes last.
    views.sort_by_key(|(language, _)| (*language == PlutusVersion::V1, *language));

    Ok(LanguageViews(views).to_cbor())
}

struct LanguageViews<'a>(Vec<(PlutusVersion, &'a [i64])>);

impl<C> cbor::Encode<C> for LanguageViews<'_> {
    fn encode<W: cbor::encode::write::Write>(
        &self,
        e: &mut cbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), cbor::encode::Error<W::Error>> {
        e.map(self.0.len() as u64)?;
        for (language, cost_model) in &self.0 {
            if *language == PlutusVersion::V1 {
                e.bytes(&[0x00])?;
                e.bytes(&IndefiniteCosts(cost_model).to_cbor())?;
            } else {
                e.encode_with(language, ctx)?;
                e.array(cost_model.len() as u64)?;
                for cost in cost_model.iter() {
                    e.i64(*cost)?;
                }
            }
        }
        Ok(())
    }
}

struct IndefiniteCosts<'a>(&'a [i64]);

impl<C> cbor::Encode<C> for IndefiniteCosts<'_> {
    fn encode<W: cbor::encode::write::Write>(
        &self,
        e: &mut cbor::Encoder<W>,
        _ctx: &mut C,
    ) -> Result<(), cbor::encode::Error<W::Error>> {
        e.begin_array()?;
        for cost in self.0 {
            e.i64(*cost)?;
        }
        e.end()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ExecutionUnits, RedeemerTag};

    fn params() -> ProtocolParameters {
        ProtocolParameters::default()
            .with_cost_model(PlutusVersion::V1, vec![1, 2])
            .with_cost_model(PlutusVersion::V2, vec![3])
            .with_cost_model(PlutusVersion::V3, vec![-4])
    }

    fn redeemers() -> Vec<Redeemer> {
        vec![
            Redeemer::new(RedeemerTag::Spend, 0, PlutusData::integer(0))
                .with_execution_units(ExecutionUnits::new(1, 2)),
        ]
    }

    #[test]
    fn nothing_to_hash() {
        let hash = script_data_hash(Era::Babbage, &[], &[], &BTreeSet::new(), &params()).unwrap();
        assert_eq!(hash, None);
    }

    #[test]
    fn views_are_in_canonical_order() {
        let languages = BTreeSet::from([PlutusVersion::V1, PlutusVersion::V2, PlutusVersion::V3]);
        assert_eq!(
            hex::encode(language_views(&languages, &params()).unwrap()),
            "a3 01 8103 02 8123 4100 44 9f0102ff".replace(' ', ""),
        );
    }

    #[test]
    fn missing_cost_model() {
        let languages = BTreeSet::from([PlutusVersion::V3]);
        assert!(matches!(
            language_views(&languages, &ProtocolParameters::default()),
            Err(Error::Precondition(..))
        ));
    }

    #[test]
    fn datums_only_use_empty_sentinels() {
        let datums = vec![PlutusData::integer(42)];
        let hash = script_data_hash(Era::Babbage, &[], &datums, &BTreeSet::new(), &params())
            .unwrap()
            .unwrap();
        let expected = Hash::blake2b_256(&hex::decode("8081182aa0").unwrap());
        assert_eq!(hash, expected);
    }

    #[test]
    fn conway_datums_only_use_the_same_sentinels() {
        let datums = vec![PlutusData::integer(42)];
        let hash = script_data_hash(Era::Conway, &[], &datums, &BTreeSet::new(), &params())
            .unwrap()
            .unwrap();
        let expected = Hash::blake2b_256(&hex::decode("80d9010281182aa0").unwrap());
        assert_eq!(hash, expected);
    }

    #[test]
    fn redeemers_without_known_language_default_to_v2() {
        let hash = script_data_hash(Era::Babbage, &redeemers(), &[], &BTreeSet::new(), &params())
            .unwrap()
            .unwrap();
        let expected = Hash::blake2b_256(&hex::decode("8184000000820102a1018103").unwrap());
        assert_eq!(hash, expected);
    }

    #[test]
    fn conway_redeemers_are_a_map() {
        let languages = BTreeSet::from([PlutusVersion::V3]);
        let hash = script_data_hash(Era::Conway, &redeemers(), &[], &languages, &params())
            .unwrap()
            .unwrap();
        let expected = Hash::blake2b_256(&hex::decode("a18200008200820102a1028123").unwrap());
        assert_eq!(hash, expected);
    }
}
