//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{Address, Datum, ScriptRef, Value, cbor, cbor::ToCbor};
use std::fmt;

/// Fixed per-entry overhead accounted for by the ledger when pricing the storage of an output.
const UTXO_ENTRY_OVERHEAD: u64 = 160;

/// Lovelace value used while measuring an output whose final amount isn't known yet. It is large
/// enough to be serialised on as many bytes as any realistic deposit.
const PLACEHOLDER_LOVELACE: u64 = 5_000_000;

/// A transaction output, in the post-Alonzo (map) form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    address: Address,
    value: Value,
    datum: Datum,
    script_ref: Option<ScriptRef>,
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} => {}", self.address, self.value)
    }
}

// -------------------------------------------------------------------- Building

impl Output {
    pub fn new(address: Address, value: Value) -> Self {
        Self {
            address,
            value,
            datum: Datum::None,
            script_ref: None,
        }
    }

    pub fn with_datum(mut self, datum: impl Into<Datum>) -> Self {
        self.datum = datum.into();
        self
    }

    pub fn with_script_ref(mut self, script_ref: impl Into<ScriptRef>) -> Self {
        self.script_ref = Some(script_ref.into());
        self
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = value;
        self
    }

    /// Raise the output's lovelace to the minimum deposit if it falls short of it; outputs already
    /// holding enough are left untouched.
    pub fn with_minimum_deposit(mut self, utxo_cost_per_byte: u64) -> Self {
        let minimum = self.minimum_deposit(utxo_cost_per_byte);
        if self.value.lovelace() < minimum {
            self.value = self.value.with_lovelace(minimum);
        }
        self
    }
}

// ------------------------------------------------------------------ Inspecting

impl Output {
    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn lovelace(&self) -> u64 {
        self.value.lovelace()
    }

    pub fn datum(&self) -> &Datum {
        &self.datum
    }

    pub fn script_ref(&self) -> Option<&ScriptRef> {
        self.script_ref.as_ref()
    }

    /// Minimum lovelace the output must carry to be accepted by the ledger, given the cost of a
    /// byte of storage.
    ///
    /// The measured size is the one of the output holding a placeholder lovelace amount, so that
    /// the result doesn't depend on whatever lovelace the output currently has.
    pub fn minimum_deposit(&self, utxo_cost_per_byte: u64) -> u64 {
        let placeholder = self
            .clone()
            .with_value(self.value.clone().with_lovelace(PLACEHOLDER_LOVELACE));
        (UTXO_ENTRY_OVERHEAD + placeholder.to_cbor().len() as u64) * utxo_cost_per_byte
    }
}

// -------------------------------------------------------------------- Encoding

impl<C> cbor::Encode<C> for Output {
    fn encode<W: cbor::encode::write::Write>(
        &self,
        e: &mut cbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), cbor::encode::Error<W::Error>> {
        let len = 2 + u64::from(!self.datum.is_none()) + u64::from(self.script_ref.is_some());
        e.map(len)?;

        e.u8(0)?;
        e.encode_with(&self.address, ctx)?;

        e.u8(1)?;
        e.encode_with(&self.value, ctx)?;

        if !self.datum.is_none() {
            e.u8(2)?;
            e.encode_with(&self.datum, ctx)?;
        }

        if let Some(script_ref) = &self.script_ref {
            e.u8(3)?;
            e.encode_with(script_ref, ctx)?;
        }

        Ok(())
    }
}

// ----------------------------------------------------------------------- Tests

#[cfg(any(test, feature = "test-utils"))]
pub mod tests {
    use crate::{
        Output, PlutusData, PlutusVersion, Value, address::tests::BASE,
        address::tests::ENTERPRISE, any, asset, cbor::ToCbor, output, plutus_script,
    };
    use proptest::prelude::*;

    const UTXO_COST_PER_BYTE: u64 = 4310;

    const POLICY: &str = "bce40727b0979ab901007a4969c3177a6cdab005427f4e977776a69b";

    // -------------------------------------------------------------- Unit tests

    #[test]
    fn encode_enterprise_output() {
        let output = output!(ENTERPRISE, Value::new(5_000_000));
        assert_eq!(
            hex::encode(output.to_cbor()),
            "a200581d60d452e94d0cfd836d6f51819916b3d5c215c59b3ac3e7429122d2807a011a004c4b40",
        );
    }

    #[test]
    fn encode_output_with_assets() {
        let output = output!(
            BASE,
            Value::new(5_000_000)
                .with_assets(&[asset!(POLICY, "624e45574d", 543000)])
                .unwrap(),
        );
        assert_eq!(
            hex::encode(output.to_cbor()),
            "a2005839005c3dbeb9f26fdfb1ca3e16af570ac24c0452f1dc5a783f7384d466ac3a8c70eba78fb47c5a017e38b04254b4e9545b4619cce2aa6b7143b301821a004c4b40a1581cbce40727b0979ab901007a4969c3177a6cdab005427f4e977776a69ba145624e45574d1a00084918",
        );
    }

    #[test]
    fn encode_output_with_datum_and_script() {
        let output = output!(ENTERPRISE, Value::new(1))
            .with_datum(PlutusData::integer(42))
            .with_script_ref(plutus_script!(PlutusVersion::V2, "4e4d01000033222220051200120011"));
        let bytes = hex::encode(output.to_cbor());
        assert!(bytes.starts_with("a400581d60"));
        assert!(bytes.contains("028201d81842182a"));
        assert!(bytes.ends_with("03d8185282024f4e4d01000033222220051200120011"));
    }

    #[test]
    fn minimum_deposit_enterprise_address() {
        let output = output!(ENTERPRISE, Value::default());
        assert_eq!(output.minimum_deposit(UTXO_COST_PER_BYTE), 857690);
    }

    #[test]
    fn minimum_deposit_base_address() {
        let output = output!(BASE, Value::default());
        assert_eq!(output.minimum_deposit(UTXO_COST_PER_BYTE), 978370);
    }

    #[test]
    fn minimum_deposit_with_native_assets() {
        let output = output!(
            BASE,
            Value::default()
                .with_assets(&[asset!(POLICY, "624e45574d", 543000)])
                .unwrap(),
        );
        assert_eq!(output.minimum_deposit(UTXO_COST_PER_BYTE), 1168010);
    }

    #[test]
    fn minimum_deposit_is_only_ever_raised() {
        let output = output!(ENTERPRISE, Value::new(10_000_000));
        assert_eq!(
            output.clone().with_minimum_deposit(UTXO_COST_PER_BYTE),
            output
        );

        let output = output!(ENTERPRISE, Value::new(1));
        assert_eq!(
            output.with_minimum_deposit(UTXO_COST_PER_BYTE).lovelace(),
            857690
        );
    }

    // -------------------------------------------------------------- Properties

    proptest! {
        #[test]
        fn minimum_deposit_ignores_current_lovelace(lovelace in any::<u64>()) {
            let output = output!(ENTERPRISE, Value::new(lovelace));
            prop_assert_eq!(output.minimum_deposit(UTXO_COST_PER_BYTE), 857690);
        }

        #[test]
        fn minimum_deposit_is_idempotent(assets in any::native_assets(), lovelace in any::<u64>()) {
            let output = output!(BASE, Value::new(lovelace).with_assets(&assets).unwrap());
            let once = output.with_minimum_deposit(UTXO_COST_PER_BYTE);
            let twice = once.clone().with_minimum_deposit(UTXO_COST_PER_BYTE);
            prop_assert!(once.lovelace() >= once.minimum_deposit(UTXO_COST_PER_BYTE));
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn minimum_deposit_grows_with_content(
            assets in any::native_assets(),
            extra in any::native_asset(),
            datum in any::plutus_data(),
        ) {
            let smaller = output!(BASE, Value::default().with_assets(&assets).unwrap());
            let larger = output!(
                BASE,
                Value::default()
                    .with_assets(assets.iter().chain(std::iter::once(&extra)))
                    .unwrap(),
            )
            .with_datum(datum);
            prop_assert!(
                larger.minimum_deposit(UTXO_COST_PER_BYTE)
                    >= smaller.minimum_deposit(UTXO_COST_PER_BYTE)
            );
        }
    }

    // -------------------------------------------------------------- Generators

    pub mod generators {
        use super::*;

        prop_compose! {
            pub fn output()(lovelace in any::<u64>(), assets in any::native_assets()) -> Output {
                output!(ENTERPRISE, Value::new(lovelace).with_assets(&assets).unwrap())
            }
        }
    }
}
