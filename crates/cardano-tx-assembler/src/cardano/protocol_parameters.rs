//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{ExecutionUnits, PlutusVersion};
use anyhow::{Context, anyhow};
use num::rational::Ratio;
use std::{collections::BTreeMap, path::Path};

/// The subset of protocol parameters needed to price and balance a transaction.
///
/// Parameters can be set one by one through the `with_*` builders, taken from the [`Self::mainnet`]
/// or [`Self::preprod`] presets, or loaded from the JSON produced by
/// `cardano-cli query protocol-parameters` (see [`Self::from_json`]).
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(try_from = "CliProtocolParameters")]
pub struct ProtocolParameters {
    /// Multiplier coefficient on fee, in lovelace/bytes
    fee_per_byte: u64,

    /// Flat/fixed fee, in lovelace
    fee_constant: u64,

    /// Cost of storing one byte of output in the UTxO set, in lovelace/bytes
    utxo_cost_per_byte: u64,

    /// Maximum execution budget a single transaction may consume
    max_tx_execution_units: ExecutionUnits,

    /// Price of a single memory execution unit, in lovelace/unit
    price_mem: f64,

    /// Price of a single cpu execution unit, in lovelace/unit
    price_steps: f64,

    /// Percentage of the fee to be pledged as collateral
    collateral_percentage: u64,

    /// Multiplier coefficient on the size of referenced scripts, in lovelace/bytes
    referenced_scripts_base_fee_per_byte: u64,

    /// Multiplier exponentially increasing the cost of reference scripts at each size step.
    ///
    /// NOTE: This isn't an actual protocol parameter and is currently hard-wired in the ledger.
    referenced_scripts_fee_multiplier: Ratio<u64>,

    /// Size of each step after which the cost of referenced script bytes increases, in bytes
    ///
    /// NOTE: This isn't an actual protocol parameter and is currently hard-wired in the ledger.
    referenced_scripts_fee_step_size: u64,

    /// Cost models, per Plutus language
    cost_models: BTreeMap<PlutusVersion, Vec<i64>>,
}

// ------------------------------------------------------------------ Inspecting

impl ProtocolParameters {
    /// Base transaction fee, computed from the size of a serialised transaction.
    pub fn base_fee(&self, size: u64) -> u64 {
        size * self.fee_per_byte + self.fee_constant
    }

    /// According to https://github.com/IntersectMBO/cardano-ledger/blob/master/docs/adr/2024-08-14_009-refscripts-fee-change.md
    pub fn referenced_scripts_fee(&self, mut size: u64) -> u64 {
        let mut cost: Ratio<u64> = Ratio::ZERO;
        let mut fee_per_byte: Ratio<u64> = Ratio::from(self.referenced_scripts_base_fee_per_byte);

        loop {
            if size < self.referenced_scripts_fee_step_size || self.referenced_scripts_fee_step_size == 0 {
                return (cost + fee_per_byte * size).floor().to_integer();
            }

            cost += fee_per_byte * self.referenced_scripts_fee_step_size;
            fee_per_byte *= self.referenced_scripts_fee_multiplier;
            size -= self.referenced_scripts_fee_step_size;
        }
    }

    /// Fee owed for running scripts within the given budget; rounded up to the next lovelace.
    pub fn execution_fee(&self, execution_units: ExecutionUnits) -> u64 {
        (self.price_mem * execution_units.mem() as f64
            + self.price_steps * execution_units.steps() as f64)
            .ceil() as u64
    }

    /// Fee owed for a transaction using its maximum allowed execution budget. Used as an upper
    /// bound until actual costs are known.
    pub fn max_execution_fee(&self) -> u64 {
        self.execution_fee(self.max_tx_execution_units)
    }

    /// Minimum collateral to pledge for a transaction paying the given fee.
    pub fn minimum_collateral(&self, fee: u64) -> u64 {
        (fee * self.collateral_percentage).div_ceil(100)
    }

    pub fn utxo_cost_per_byte(&self) -> u64 {
        self.utxo_cost_per_byte
    }

    pub fn max_tx_execution_units(&self) -> ExecutionUnits {
        self.max_tx_execution_units
    }

    pub fn cost_model(&self, version: PlutusVersion) -> Option<&[i64]> {
        self.cost_models.get(&version).map(Vec::as_slice)
    }
}

// --------------------------------------------------------------------- Building

impl Default for ProtocolParameters {
    fn default() -> Self {
        Self {
            fee_per_byte: 0,
            fee_constant: 0,
            utxo_cost_per_byte: 0,
            max_tx_execution_units: ExecutionUnits::default(),
            price_mem: 0.0,
            price_steps: 0.0,
            collateral_percentage: 0,
            referenced_scripts_base_fee_per_byte: 0,
            referenced_scripts_fee_multiplier: Ratio::ONE,
            referenced_scripts_fee_step_size: 0,
            cost_models: BTreeMap::new(),
        }
    }
}

impl ProtocolParameters {
    pub fn with_fee_per_byte(mut self, fee_per_byte: u64) -> Self {
        self.fee_per_byte = fee_per_byte;
        self
    }

    pub fn with_fee_constant(mut self, fee_constant: u64) -> Self {
        self.fee_constant = fee_constant;
        self
    }

    pub fn with_utxo_cost_per_byte(mut self, utxo_cost_per_byte: u64) -> Self {
        self.utxo_cost_per_byte = utxo_cost_per_byte;
        self
    }

    pub fn with_max_tx_execution_units(mut self, max_tx_execution_units: ExecutionUnits) -> Self {
        self.max_tx_execution_units = max_tx_execution_units;
        self
    }

    pub fn with_execution_price_mem(mut self, price_mem: f64) -> Self {
        self.price_mem = price_mem;
        self
    }

    pub fn with_execution_price_steps(mut self, price_steps: f64) -> Self {
        self.price_steps = price_steps;
        self
    }

    pub fn with_collateral_percentage(mut self, collateral_percentage: u64) -> Self {
        self.collateral_percentage = collateral_percentage;
        self
    }

    pub fn with_referenced_scripts_base_fee_per_byte(
        mut self,
        referenced_scripts_base_fee_per_byte: u64,
    ) -> Self {
        self.referenced_scripts_base_fee_per_byte = referenced_scripts_base_fee_per_byte;
        self
    }

    pub fn with_referenced_scripts_fee_multiplier(
        mut self,
        referenced_scripts_fee_multiplier: Ratio<u64>,
    ) -> Self {
        self.referenced_scripts_fee_multiplier = referenced_scripts_fee_multiplier;
        self
    }

    pub fn with_referenced_scripts_fee_step_size(
        mut self,
        referenced_scripts_fee_step_size: u64,
    ) -> Self {
        self.referenced_scripts_fee_step_size = referenced_scripts_fee_step_size;
        self
    }

    pub fn with_cost_model(mut self, version: PlutusVersion, cost_model: impl Into<Vec<i64>>) -> Self {
        self.cost_models.insert(version, cost_model.into());
        self
    }
}

impl ProtocolParameters {
    /// Mainnet parameters, as of the Conway era. Only the PlutusV3 cost model is included.
    pub fn mainnet() -> Self {
        Self::default()
            .with_fee_per_byte(44)
            .with_fee_constant(155381)
            .with_utxo_cost_per_byte(4310)
            .with_max_tx_execution_units(ExecutionUnits::new(14_000_000, 10_000_000_000))
            .with_collateral_percentage(150)
            .with_referenced_scripts_base_fee_per_byte(15)
            .with_referenced_scripts_fee_multiplier(Ratio::new(12, 10))
            .with_referenced_scripts_fee_step_size(25600)
            .with_execution_price_mem(0.0577)
            .with_execution_price_steps(7.21e-05)
            .with_cost_model(PlutusVersion::V3, PLUTUS_V3_COST_MODEL)
    }

    pub fn preprod() -> Self {
        Self::mainnet()
    }

    /// Load parameters from the JSON output of `cardano-cli query protocol-parameters`.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("invalid protocol parameters")
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read protocol parameters at {}", path.display()))?;
        Self::from_json(&json)
    }
}

// ----------------------------------------------------------- Converting (from)

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct CliProtocolParameters {
    tx_fee_fixed: u64,
    tx_fee_per_byte: u64,
    utxo_cost_per_byte: u64,
    max_tx_execution_units: ExecutionUnits,
    execution_unit_prices: CliExecutionUnitPrices,
    collateral_percentage: u64,
    #[serde(default)]
    cost_models: BTreeMap<String, Vec<i64>>,
    #[serde(default)]
    min_fee_ref_script_cost_per_byte: Option<f64>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct CliExecutionUnitPrices {
    price_memory: f64,
    price_steps: f64,
}

impl TryFrom<CliProtocolParameters> for ProtocolParameters {
    type Error = anyhow::Error;

    fn try_from(params: CliProtocolParameters) -> anyhow::Result<Self> {
        let mut cost_models = BTreeMap::new();
        for (language, cost_model) in params.cost_models {
            cost_models.insert(language.parse::<PlutusVersion>()?, cost_model);
        }

        let referenced_scripts_base_fee_per_byte =
            match params.min_fee_ref_script_cost_per_byte {
                None => 0,
                Some(fee) if fee >= 0.0 && fee.fract() == 0.0 => fee as u64,
                Some(fee) => {
                    return Err(anyhow!(
                        "unsupported fractional reference script fee per byte: {fee}"
                    ));
                }
            };

        Ok(Self {
            fee_per_byte: params.tx_fee_per_byte,
            fee_constant: params.tx_fee_fixed,
            utxo_cost_per_byte: params.utxo_cost_per_byte,
            max_tx_execution_units: params.max_tx_execution_units,
            price_mem: params.execution_unit_prices.price_memory,
            price_steps: params.execution_unit_prices.price_steps,
            collateral_percentage: params.collateral_percentage,
            referenced_scripts_base_fee_per_byte,
            cost_models,
            ..Self::mainnet()
        })
    }
}

const PLUTUS_V3_COST_MODEL: [i64; 297] = [
    100788, 420, 1, 1, 1000, 173, 0, 1, 1000, 59957, 4, 1, 11183, 32, 201305, 8356, 4, 16000, 100,
    16000, 100, 16000, 100, 16000, 100, 16000, 100, 16000, 100, 100, 100, 16000, 100, 94375, 32,
    132994, 32, 61462, 4, 72010, 178, 0, 1, 22151, 32, 91189, 769, 4, 2, 85848, 123203, 7305, -900,
    1716, 549, 57, 85848, 0, 1, 1, 1000, 42921, 4, 2, 24548, 29498, 38, 1, 898148, 27279, 1, 51775,
    558, 1, 39184, 1000, 60594, 1, 141895, 32, 83150, 32, 15299, 32, 76049, 1, 13169, 4, 22100, 10,
    28999, 74, 1, 28999, 74, 1, 43285, 552, 1, 44749, 541, 1, 33852, 32, 68246, 32, 72362, 32, 7243,
    32, 7391, 32, 11546, 32, 85848, 123203, 7305, -900, 1716, 549, 57, 85848, 0, 1, 90434, 519, 0,
    1, 74433, 32, 85848, 123203, 7305, -900, 1716, 549, 57, 85848, 0, 1, 1, 85848, 123203, 7305,
    -900, 1716, 549, 57, 85848, 0, 1, 955506, 213312, 0, 2, 270652, 22588, 4, 1457325, 64566, 4,
    20467, 1, 4, 0, 141992, 32, 100788, 420, 1, 1, 81663, 32, 59498, 32, 20142, 32, 24588, 32,
    20744, 32, 25933, 32, 24623, 32, 43053543, 10, 53384111, 14333, 10, 43574283, 26308, 10, 16000,
    100, 16000, 100, 962335, 18, 2780678, 6, 442008, 1, 52538055, 3756, 18, 267929, 18, 76433006,
    8868, 18, 52948122, 18, 1995836, 36, 3227919, 12, 901022, 1, 166917843, 4307, 36, 284546, 36,
    158221314, 26549, 36, 74698472, 36, 333849714, 1, 254006273, 72, 2174038, 72, 2261318, 64571, 4,
    207616, 8310, 4, 1293828, 28716, 63, 0, 1, 1006041, 43623, 251, 0, 1, 100181, 726, 719, 0, 1,
    100181, 726, 719, 0, 1, 100181, 726, 719, 0, 1, 107878, 680, 0, 1, 95336, 1, 281145, 18848, 0,
    1, 180194, 159, 1, 1, 158519, 8942, 0, 1, 159378, 8813, 0, 1, 107490, 3298, 1, 106057, 655, 1,
    1964219, 24520, 3,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_fee() {
        assert_eq!(ProtocolParameters::mainnet().base_fee(200), 155381 + 44 * 200);
    }

    #[test]
    fn minimum_collateral_rounds_up() {
        let params = ProtocolParameters::default().with_collateral_percentage(150);
        assert_eq!(params.minimum_collateral(100), 150);
        assert_eq!(params.minimum_collateral(101), 152);
        assert_eq!(params.minimum_collateral(0), 0);
    }

    #[test]
    fn execution_fee_rounds_up_once() {
        let params = ProtocolParameters::default()
            .with_execution_price_mem(0.5)
            .with_execution_price_steps(0.25);
        assert_eq!(params.execution_fee(ExecutionUnits::new(1, 2)), 1);
        assert_eq!(params.execution_fee(ExecutionUnits::new(1, 3)), 2);
    }

    #[test]
    fn max_execution_fee_on_mainnet() {
        // 0.0577 * 14e6 + 7.21e-5 * 10e9 = 807800 + 721000
        assert_eq!(ProtocolParameters::mainnet().max_execution_fee(), 1_528_800);
    }

    #[test]
    fn referenced_scripts_fee_is_tiered() {
        let params = ProtocolParameters::mainnet();
        assert_eq!(params.referenced_scripts_fee(0), 0);
        assert_eq!(params.referenced_scripts_fee(1000), 15_000);
        // 25600 * 15 + 400 * 18
        assert_eq!(params.referenced_scripts_fee(26000), 384_000 + 7_200);
    }

    #[test]
    fn load_from_cardano_cli_json() {
        let params = ProtocolParameters::from_json(
            r#"{
                "txFeeFixed": 155381,
                "txFeePerByte": 44,
                "utxoCostPerByte": 4310,
                "maxTxExecutionUnits": { "memory": 14000000, "steps": 10000000000 },
                "executionUnitPrices": { "priceMemory": 0.0577, "priceSteps": 0.0000721 },
                "collateralPercentage": 150,
                "minFeeRefScriptCostPerByte": 15,
                "costModels": { "PlutusV2": [1, 2, 3] },
                "maxBlockBodySize": 90112
            }"#,
        )
        .unwrap();

        assert_eq!(params.utxo_cost_per_byte(), 4310);
        assert_eq!(params.cost_model(PlutusVersion::V2), Some([1, 2, 3].as_slice()));
        assert_eq!(params.cost_model(PlutusVersion::V3), None);
        assert_eq!(params.max_execution_fee(), 1_528_800);
    }

    #[test]
    fn reject_unknown_languages() {
        let result = ProtocolParameters::from_json(
            r#"{
                "txFeeFixed": 1,
                "txFeePerByte": 1,
                "utxoCostPerByte": 1,
                "maxTxExecutionUnits": { "memory": 1, "steps": 1 },
                "executionUnitPrices": { "priceMemory": 1, "priceSteps": 1 },
                "collateralPercentage": 1,
                "costModels": { "PlutusV9": [] }
            }"#,
        );
        assert!(result.is_err());
    }
}
