//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{Error, MultiAsset, NativeAsset, cbor, native_asset::to_canonical_map};
use std::fmt;

/// A lovelace quantity, possibly accompanied by native assets.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Value {
    lovelace: u64,
    assets: MultiAsset,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug_struct = f.debug_struct("Value");
        debug_struct.field("lovelace", &self.lovelace);
        if !self.assets.is_empty() {
            debug_struct.field(
                "assets",
                &self
                    .assets
                    .iter()
                    .map(|asset| asset.to_string())
                    .collect::<Vec<_>>(),
            );
        }
        debug_struct.finish()
    }
}

// ------------------------------------------------------------------ Inspecting

impl Value {
    pub fn lovelace(&self) -> u64 {
        self.lovelace
    }

    pub fn assets(&self) -> &MultiAsset {
        &self.assets
    }

    pub fn is_empty(&self) -> bool {
        self.lovelace == 0 && self.assets.is_empty()
    }
}

// -------------------------------------------------------------------- Building

impl Value {
    pub fn new(lovelace: u64) -> Self {
        Self {
            lovelace,
            assets: MultiAsset::default(),
        }
    }

    pub fn with_lovelace(mut self, lovelace: u64) -> Self {
        self.lovelace = lovelace;
        self
    }

    /// Add assets to the value; fails with [`Error::Balance`] when a quantity overflows.
    pub fn with_assets<'a>(
        mut self,
        assets: impl IntoIterator<Item = &'a NativeAsset>,
    ) -> Result<Self, Error> {
        self.assets.add(&to_canonical_map(assets)?)?;
        Ok(self)
    }

    pub fn add(&mut self, rhs: &Self) -> Result<&mut Self, Error> {
        self.lovelace = self.lovelace.checked_add(rhs.lovelace).ok_or_else(|| {
            Error::Balance(format!(
                "lovelace overflow: lhs = {}, rhs = {}",
                self.lovelace, rhs.lovelace
            ))
        })?;
        self.assets.add(&rhs.assets)?;
        Ok(self)
    }

    /// Subtract `rhs` from `self`; fails with [`Error::Balance`] when either the lovelace or any
    /// asset quantity would become negative.
    pub fn checked_sub(&mut self, rhs: &Self) -> Result<&mut Self, Error> {
        self.lovelace = self.lovelace.checked_sub(rhs.lovelace).ok_or_else(|| {
            Error::Balance(format!(
                "insufficient lovelace: available = {}, required = {}",
                self.lovelace, rhs.lovelace
            ))
        })?;
        self.assets.checked_sub(&rhs.assets)?;
        Ok(self)
    }
}

// -------------------------------------------------------------------- Encoding

impl<C> cbor::Encode<C> for Value {
    fn encode<W: cbor::encode::write::Write>(
        &self,
        e: &mut cbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), cbor::encode::Error<W::Error>> {
        if self.assets.is_empty() {
            e.u64(self.lovelace)?;
        } else {
            e.array(2)?;
            e.u64(self.lovelace)?;
            e.encode_with(&self.assets, ctx)?;
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------- Tests

#[cfg(test)]
mod tests {
    use super::Value;
    use crate::{Error, asset, cbor::ToCbor};

    const POLICY: &str = "279c909f348e533da5808898f87f9a14bb2c3dfbbacccd631d927a3f";

    #[test]
    fn display_only_lovelace() {
        assert_eq!(Value::new(42).to_string(), "Value { lovelace: 42 }")
    }

    #[test]
    fn display_value_with_assets() {
        let value = Value::new(6687232).with_assets(&[asset!(POLICY, "534e454b", 1376)]).unwrap();
        assert_eq!(
            value.to_string(),
            format!("Value {{ lovelace: 6687232, assets: [\"{POLICY}.SNEK=1376\"] }}"),
        );
    }

    #[test]
    fn encode_lovelace_only_as_bare_integer() {
        assert_eq!(hex::encode(Value::new(5_000_000).to_cbor()), "1a004c4b40");
    }

    #[test]
    fn encode_with_assets_as_pair() {
        let value = Value::new(1).with_assets(&[asset!(POLICY, "", 1)]).unwrap();
        assert_eq!(
            hex::encode(value.to_cbor()),
            format!("8201a1581c{POLICY}a14001"),
        );
    }

    #[test]
    fn checked_sub_insufficient_lovelace() {
        let mut lhs = Value::new(1);
        assert!(matches!(lhs.checked_sub(&Value::new(2)), Err(Error::Balance(..))));
    }

    #[test]
    fn add_then_sub_is_identity() {
        let base = Value::new(10).with_assets(&[asset!(POLICY, "01", 3)]).unwrap();
        let delta = Value::new(5).with_assets(&[asset!(POLICY, "02", 4)]).unwrap();
        let mut value = base.clone();
        value.add(&delta).unwrap();
        value.checked_sub(&delta).unwrap();
        assert_eq!(value, base);
    }
}
