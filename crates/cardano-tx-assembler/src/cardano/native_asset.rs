//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{Error, Hash, cbor};
use anyhow::anyhow;
use std::{cmp::Ordering, collections::BTreeMap, fmt};

/// Maximum size, in bytes, of an asset name.
pub const MAX_ASSET_NAME_LENGTH: usize = 32;

/// The name of a native asset under a given policy; at most 32 arbitrary bytes.
///
/// Asset names are ordered the way the ledger orders map keys canonically: shorter names come
/// first, and names of equal length compare lexicographically. This ordering is what makes the
/// serialised multi-asset maps hash-stable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct AssetName(Vec<u8>);

impl Ord for AssetName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for AssetName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for AssetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match str::from_utf8(&self.0) {
            Ok(utf8) if !utf8.chars().any(char::is_control) => f.write_str(utf8),
            _ => f.write_str(&hex::encode(&self.0)),
        }
    }
}

impl AsRef<[u8]> for AssetName {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<Vec<u8>> for AssetName {
    type Error = anyhow::Error;

    fn try_from(bytes: Vec<u8>) -> anyhow::Result<Self> {
        if bytes.len() > MAX_ASSET_NAME_LENGTH {
            return Err(anyhow!(
                "asset name too long; expected at most {MAX_ASSET_NAME_LENGTH} bytes, got {}",
                bytes.len()
            ));
        }
        Ok(Self(bytes))
    }
}

impl TryFrom<&[u8]> for AssetName {
    type Error = anyhow::Error;

    fn try_from(bytes: &[u8]) -> anyhow::Result<Self> {
        Self::try_from(bytes.to_vec())
    }
}

impl TryFrom<&str> for AssetName {
    type Error = anyhow::Error;

    /// Parse a base16-encoded asset name.
    fn try_from(s: &str) -> anyhow::Result<Self> {
        Self::try_from(hex::decode(s)?)
    }
}

/// A quantity of a single native asset, identified by its policy and name.
///
/// Amounts are signed so that the same type describes both held assets and mint (or burn)
/// entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeAsset {
    pub policy_id: Hash<28>,
    pub asset_name: AssetName,
    pub amount: i128,
}

impl NativeAsset {
    pub fn new(policy_id: Hash<28>, asset_name: AssetName, amount: i128) -> Self {
        Self {
            policy_id,
            asset_name,
            amount,
        }
    }

    fn key(&self) -> (Hash<28>, &AssetName) {
        (self.policy_id, &self.asset_name)
    }
}

impl fmt::Display for NativeAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}={}", self.policy_id, self.asset_name, self.amount)
    }
}

/// Merge entries referring to the same (policy, name) pair by summing their amounts.
///
/// Unlike [`to_canonical_map`], the result keeps the order of first occurrence and retains null
/// amounts.
pub fn merge_amounts<'a>(
    assets: impl IntoIterator<Item = &'a NativeAsset>,
) -> Result<Vec<NativeAsset>, Error> {
    let mut merged: Vec<NativeAsset> = Vec::new();
    let mut positions: BTreeMap<(Hash<28>, AssetName), usize> = BTreeMap::new();

    for asset in assets {
        match positions.get(&(asset.policy_id, asset.asset_name.clone())) {
            Some(ix) => {
                let total = &mut merged[*ix].amount;
                *total = checked_sum(asset, *total)?;
            }
            None => {
                positions.insert((asset.policy_id, asset.asset_name.clone()), merged.len());
                merged.push(asset.clone());
            }
        }
    }

    Ok(merged)
}

/// Merge and sort assets into their canonical wire form, dropping any entry whose total is null.
pub fn to_canonical_map<'a>(
    assets: impl IntoIterator<Item = &'a NativeAsset>,
) -> Result<MultiAsset, Error> {
    let mut multi_asset = MultiAsset::default();
    for asset in assets {
        multi_asset.insert(asset)?;
    }
    multi_asset.prune();
    Ok(multi_asset)
}

fn checked_sum(asset: &NativeAsset, total: i128) -> Result<i128, Error> {
    total.checked_add(asset.amount).ok_or_else(|| {
        Error::Balance(format!(
            "quantity overflow for asset {}.{}: {total} + {}",
            asset.policy_id, asset.asset_name, asset.amount
        ))
    })
}

/// Native assets grouped by policy, in canonical order.
///
/// The map never holds null quantities once an operation has completed, so that an empty
/// [`MultiAsset`] is indistinguishable from an absent one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MultiAsset(BTreeMap<Hash<28>, BTreeMap<AssetName, i128>>);

// ------------------------------------------------------------------ Inspecting

impl MultiAsset {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn quantity_of(&self, policy_id: &Hash<28>, asset_name: &AssetName) -> i128 {
        self.0
            .get(policy_id)
            .and_then(|assets| assets.get(asset_name))
            .copied()
            .unwrap_or_default()
    }

    /// Flatten back into a list of assets, in canonical order.
    pub fn to_native_assets(&self) -> Vec<NativeAsset> {
        self.iter().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = NativeAsset> + '_ {
        self.0.iter().flat_map(|(policy_id, assets)| {
            assets
                .iter()
                .map(|(asset_name, amount)| NativeAsset::new(*policy_id, asset_name.clone(), *amount))
        })
    }
}

// -------------------------------------------------------------------- Building

impl MultiAsset {
    /// Add a single asset's amount to the map; fails with [`Error::Balance`] when the resulting
    /// quantity no longer fits.
    pub fn insert(&mut self, asset: &NativeAsset) -> Result<&mut Self, Error> {
        let (policy_id, asset_name) = asset.key();
        let quantity = self
            .0
            .entry(policy_id)
            .or_default()
            .entry(asset_name.clone())
            .or_default();
        *quantity = checked_sum(asset, *quantity)?;
        Ok(self)
    }

    pub fn add(&mut self, rhs: &Self) -> Result<&mut Self, Error> {
        for asset in rhs.iter() {
            self.insert(&asset)?;
        }
        self.prune();
        Ok(self)
    }

    /// Subtract `rhs` from `self`, failing when any asset would end up with a negative quantity.
    pub fn checked_sub(&mut self, rhs: &Self) -> Result<&mut Self, Error> {
        for asset in rhs.iter() {
            let available = self.quantity_of(&asset.policy_id, &asset.asset_name);
            let remaining = available
                .checked_sub(asset.amount)
                .filter(|remaining| *remaining >= 0)
                .ok_or_else(|| {
                    Error::Balance(format!(
                        "insufficient quantity of asset {}.{}: available={available}, required={}",
                        asset.policy_id, asset.asset_name, asset.amount,
                    ))
                })?;
            self.0
                .entry(asset.policy_id)
                .or_default()
                .insert(asset.asset_name, remaining);
        }
        self.prune();
        Ok(self)
    }

    fn prune(&mut self) {
        self.0.retain(|_, assets| {
            assets.retain(|_, quantity| *quantity != 0);
            !assets.is_empty()
        });
    }
}

// -------------------------------------------------------------------- Encoding

impl<C> cbor::Encode<C> for MultiAsset {
    fn encode<W: cbor::encode::write::Write>(
        &self,
        e: &mut cbor::Encoder<W>,
        _ctx: &mut C,
    ) -> Result<(), cbor::encode::Error<W::Error>> {
        e.map(self.0.len() as u64)?;
        for (policy_id, assets) in &self.0 {
            e.bytes(policy_id.as_ref())?;
            e.map(assets.len() as u64)?;
            for (asset_name, quantity) in assets {
                e.bytes(asset_name.as_ref())?;
                cbor::encode_integer(e, *quantity)?;
            }
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------- Tests

#[cfg(any(test, feature = "test-utils"))]
pub mod tests {
    use super::*;
    use crate::{asset, cbor::ToCbor};
    use proptest::prelude::*;

    const POLICY: &str = "bce40727b0979ab901007a4969c3177a6cdab005427f4e977776a69b";

    #[test]
    fn duplicates_are_merged_by_sum() {
        let assets = vec![asset!(POLICY, "4141", 5), asset!(POLICY, "4141", 3)];
        assert_eq!(
            to_canonical_map(&assets).unwrap().to_native_assets(),
            vec![asset!(POLICY, "4141", 8)],
        );
    }

    #[test]
    fn names_sort_by_length_first() {
        let assets = vec![
            asset!(POLICY, "414141", 1),
            asset!(POLICY, "42", 1),
            asset!(POLICY, "4142", 1),
            asset!(POLICY, "4141", 1),
        ];
        let names = to_canonical_map(&assets)
            .unwrap()
            .iter()
            .map(|asset| asset.asset_name.to_string())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["B", "AA", "AB", "AAA"]);
    }

    #[test]
    fn null_totals_disappear() {
        let assets = vec![asset!(POLICY, "4141", 5), asset!(POLICY, "4141", -5)];
        assert!(to_canonical_map(&assets).unwrap().is_empty());
        assert_eq!(merge_amounts(&assets).unwrap(), vec![asset!(POLICY, "4141", 0)]);
    }

    #[test]
    fn merge_amounts_keeps_first_occurrence_order() {
        let other = "00000000000000000000000000000000000000000000000000000000";
        let assets = vec![
            asset!(POLICY, "4242", 1),
            asset!(other, "41", 2),
            asset!(POLICY, "4242", 3),
        ];
        assert_eq!(
            merge_amounts(&assets).unwrap(),
            vec![asset!(POLICY, "4242", 4), asset!(other, "41", 2)],
        );
    }

    #[test]
    fn checked_sub_rejects_overdraft() {
        let mut lhs = to_canonical_map(&[asset!(POLICY, "58", 1)]).unwrap();
        let rhs = to_canonical_map(&[asset!(POLICY, "58", 2)]).unwrap();
        assert!(matches!(lhs.checked_sub(&rhs), Err(Error::Balance(..))));
    }

    #[test]
    fn checked_sub_rejects_unknown_assets() {
        let mut lhs = MultiAsset::default();
        let rhs = to_canonical_map(&[asset!(POLICY, "58", 1)]).unwrap();
        assert!(matches!(lhs.checked_sub(&rhs), Err(Error::Balance(..))));
    }

    #[test]
    fn overflowing_quantities_are_rejected() {
        let assets = vec![asset!(POLICY, "41", i128::MAX), asset!(POLICY, "41", 1)];
        assert!(matches!(to_canonical_map(&assets), Err(Error::Balance(..))));
        assert!(matches!(merge_amounts(&assets), Err(Error::Balance(..))));

        let mut lhs = to_canonical_map(&[asset!(POLICY, "41", i128::MAX)]).unwrap();
        let rhs = to_canonical_map(&[asset!(POLICY, "41", 1)]).unwrap();
        assert!(matches!(lhs.add(&rhs), Err(Error::Balance(..))));
    }

    #[test]
    fn checked_sub_of_negative_quantities_does_not_overflow() {
        let mut lhs = to_canonical_map(&[asset!(POLICY, "41", i128::MAX)]).unwrap();
        let rhs = to_canonical_map(&[asset!(POLICY, "41", -1)]).unwrap();
        assert!(matches!(lhs.checked_sub(&rhs), Err(Error::Balance(..))));
    }

    #[test]
    fn asset_names_are_bounded() {
        assert!(AssetName::try_from(vec![0; 32]).is_ok());
        assert!(AssetName::try_from(vec![0; 33]).is_err());
    }

    #[test]
    fn encode_single_asset() {
        assert_eq!(
            hex::encode(to_canonical_map(&[asset!(POLICY, "624e45574d", 543000)]).unwrap().to_cbor()),
            format!("a1581c{POLICY}a145624e45574d1a00084918"),
        );
    }

    proptest! {
        #[test]
        fn prop_canonical_map_ignores_order(
            (assets, shuffled) in generators::native_assets()
                .prop_flat_map(|assets| (Just(assets.clone()), Just(assets).prop_shuffle()))
        ) {
            prop_assert_eq!(to_canonical_map(&assets).unwrap(), to_canonical_map(&shuffled).unwrap());
        }

        #[test]
        fn prop_canonical_map_sums_exactly(assets in generators::native_assets()) {
            let canonical = to_canonical_map(&assets).unwrap();
            for asset in &assets {
                let expected: i128 = assets
                    .iter()
                    .filter(|other| other.key() == asset.key())
                    .map(|other| other.amount)
                    .sum();
                prop_assert_eq!(canonical.quantity_of(&asset.policy_id, &asset.asset_name), expected);
            }
        }
    }

    // -------------------------------------------------------------- Generators

    pub mod generators {
        use super::*;
        use crate::cardano::hash::tests::generators::*;

        pub fn asset_name() -> impl Strategy<Value = AssetName> {
            prop::collection::vec(any::<u8>(), 0..=MAX_ASSET_NAME_LENGTH).prop_map(AssetName)
        }

        prop_compose! {
            pub fn native_asset()(
                policy_id in prop_oneof![Just(Hash::from([0; 28])), hash28()],
                asset_name in prop_oneof![Just(AssetName::default()), asset_name()],
                amount in 1..1_000_000_000i128,
            ) -> NativeAsset {
                NativeAsset::new(policy_id, asset_name, amount)
            }
        }

        pub fn native_assets() -> impl Strategy<Value = Vec<NativeAsset>> {
            prop::collection::vec(native_asset(), 0..8)
        }
    }
}
