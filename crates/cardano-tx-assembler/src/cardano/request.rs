//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A serialisable description of a transaction, as handed over by callers that don't link
//! against this crate (e.g. the command-line). Hashes, keys and CBOR payloads are hex-encoded;
//! addresses are bech32; amounts are either JSON numbers or decimal strings.

use crate::{
    Address, Datum, Era, ExecutionUnits, Hash, Input, Metadata, NativeAsset, NativeScript,
    NetworkId, Output, PlutusData, PlutusScript, PlutusVersion, ProtocolParameters, Redeemer,
    RedeemerTag, ScriptRef, SigningKey, TransactionBuilder, Utxo, VKeyWitness, Value, cbor,
    native_asset::AssetName,
};
use anyhow::{Context, anyhow, bail};
use std::{fmt, fs, path::Path};

#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TransactionRequest {
    #[serde(default)]
    era: Era,
    inputs: Vec<UtxoRequest>,
    #[serde(default)]
    outputs: Vec<OutputRequest>,
    #[serde(default)]
    reference_inputs: Vec<UtxoRequest>,
    #[serde(default)]
    collateral_inputs: Vec<UtxoRequest>,
    #[serde(default)]
    signing_keys: Vec<String>,
    #[serde(default)]
    signatures: Vec<VKeyWitness>,
    #[serde(default)]
    required_signers: Vec<Hash<28>>,
    #[serde(default)]
    native_scripts: Vec<String>,
    #[serde(default)]
    plutus_scripts: Vec<ScriptRequest>,
    #[serde(default)]
    auxiliary_native_scripts: Vec<String>,
    #[serde(default)]
    auxiliary_plutus_scripts: Vec<ScriptRequest>,
    #[serde(default)]
    mint: Vec<AssetRequest>,
    #[serde(default)]
    redeemers: Vec<RedeemerRequest>,
    #[serde(default)]
    datums: Vec<String>,
    metadata: Option<String>,
    fee: Option<Quantity>,
    ttl: Option<u64>,
    validity_interval_start: Option<u64>,
    network_id: Option<u8>,
    change_address: Option<Address>,
    collateral_return_address: Option<Address>,
    total_collateral: Option<Quantity>,
    auxiliary_data_hash: Option<Hash<32>>,
    script_data_hash: Option<Hash<32>>,
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct UtxoRequest {
    hash: Hash<32>,
    index: u64,
    lovelace: Quantity,
    #[serde(default)]
    native_assets: Vec<AssetRequest>,
    datum_hash: Option<Hash<32>>,
    inline_datum: Option<String>,
    script_ref: Option<String>,
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct OutputRequest {
    address: Address,
    #[serde(default)]
    lovelace: Quantity,
    #[serde(default)]
    native_assets: Vec<AssetRequest>,
    datum_hash: Option<Hash<32>>,
    inline_datum: Option<String>,
    script_ref: Option<String>,
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct AssetRequest {
    policy_id: Hash<28>,
    #[serde(default)]
    asset_name: String,
    amount: Quantity,
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ScriptRequest {
    version: String,
    script: String,
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RedeemerRequest {
    tag: String,
    index: u32,
    data: String,
    execution_units: Option<ExecutionUnits>,
}

/// An amount given either as a JSON number or as a decimal string, for values beyond what JSON
/// numbers safely carry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Quantity(i128);

impl<'de> serde::Deserialize<'de> for Quantity {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct QuantityVisitor;

        impl serde::de::Visitor<'_> for QuantityVisitor {
            type Value = Quantity;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an integer, or a decimal string")
            }

            fn visit_u64<E: serde::de::Error>(self, n: u64) -> Result<Quantity, E> {
                Ok(Quantity(n as i128))
            }

            fn visit_i64<E: serde::de::Error>(self, n: i64) -> Result<Quantity, E> {
                Ok(Quantity(n as i128))
            }

            fn visit_str<E: serde::de::Error>(self, s: &str) -> Result<Quantity, E> {
                s.trim().parse().map(Quantity).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(QuantityVisitor)
    }
}

impl Quantity {
    fn lovelace(self) -> anyhow::Result<u64> {
        u64::try_from(self.0).with_context(|| format!("invalid lovelace amount {}", self.0))
    }

    /// Held quantities are unsigned 64-bit integers on the ledger.
    fn held(self) -> anyhow::Result<i128> {
        u64::try_from(self.0)
            .map(i128::from)
            .with_context(|| format!("invalid asset quantity {}", self.0))
    }

    /// Minted (or burned) quantities are signed 64-bit integers on the ledger.
    fn minted(self) -> anyhow::Result<i128> {
        i64::try_from(self.0)
            .map(i128::from)
            .with_context(|| format!("invalid mint quantity {}", self.0))
    }
}

// -------------------------------------------------------------------- Loading

impl TransactionRequest {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("invalid transaction request")
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read transaction request {}", path.display()))?;
        Self::from_json(&json)
    }
}

impl<'a> TransactionBuilder<'a> {
    /// Configure a builder from a [`TransactionRequest`]. Everything the request carries is
    /// decoded upfront; errors point at the offending field.
    pub fn from_request(
        params: &'a ProtocolParameters,
        request: TransactionRequest,
    ) -> anyhow::Result<Self> {
        let mut builder = TransactionBuilder::new(params).with_era(request.era);

        for (ix, utxo) in request.inputs.into_iter().enumerate() {
            builder = builder.with_input(Utxo::try_from(utxo).with_context(|| format!("inputs[{ix}]"))?);
        }

        for (ix, utxo) in request.reference_inputs.into_iter().enumerate() {
            builder = builder.with_reference_input(
                Utxo::try_from(utxo).with_context(|| format!("referenceInputs[{ix}]"))?,
            );
        }

        for (ix, utxo) in request.collateral_inputs.into_iter().enumerate() {
            builder = builder.with_collateral_input(
                Utxo::try_from(utxo).with_context(|| format!("collateralInputs[{ix}]"))?,
            );
        }

        for (ix, output) in request.outputs.into_iter().enumerate() {
            builder =
                builder.with_output(Output::try_from(output).with_context(|| format!("outputs[{ix}]"))?);
        }

        for (ix, key) in request.signing_keys.iter().enumerate() {
            let key = key.parse::<SigningKey>().with_context(|| format!("signingKeys[{ix}]"))?;
            builder = builder.with_signer(key);
        }

        for witness in request.signatures {
            builder = builder.with_signature(witness);
        }

        for key_hash in request.required_signers {
            builder = builder.with_required_signer(key_hash);
        }

        for (ix, script) in request.native_scripts.iter().enumerate() {
            builder = builder
                .with_native_script(native_script(script).with_context(|| format!("nativeScripts[{ix}]"))?);
        }

        for (ix, script) in request.plutus_scripts.into_iter().enumerate() {
            builder = builder
                .with_plutus_script(PlutusScript::try_from(script).with_context(|| format!("plutusScripts[{ix}]"))?);
        }

        for (ix, script) in request.auxiliary_native_scripts.iter().enumerate() {
            builder = builder.with_auxiliary_native_script(
                native_script(script).with_context(|| format!("auxiliaryNativeScripts[{ix}]"))?,
            );
        }

        for (ix, script) in request.auxiliary_plutus_scripts.into_iter().enumerate() {
            builder = builder.with_auxiliary_plutus_script(
                PlutusScript::try_from(script).with_context(|| format!("auxiliaryPlutusScripts[{ix}]"))?,
            );
        }

        let mint = request
            .mint
            .into_iter()
            .enumerate()
            .map(|(ix, asset)| {
                native_asset(asset, Quantity::minted).with_context(|| format!("mint[{ix}]"))
            })
            .collect::<anyhow::Result<Vec<NativeAsset>>>()?;
        builder = builder.with_mint(mint);

        for (ix, redeemer) in request.redeemers.into_iter().enumerate() {
            builder = builder
                .with_redeemer(Redeemer::try_from(redeemer).with_context(|| format!("redeemers[{ix}]"))?);
        }

        for (ix, datum) in request.datums.iter().enumerate() {
            builder = builder.with_datum(plutus_data(datum).with_context(|| format!("datums[{ix}]"))?);
        }

        if let Some(metadata) = request.metadata {
            let bytes = hex::decode(&metadata).context("metadata")?;
            builder = builder.with_metadata(Metadata::from_cbor(&bytes).context("metadata")?);
        }

        if let Some(fee) = request.fee {
            builder = builder.with_fee(fee.lovelace().context("fee")?);
        }

        if let Some(slot) = request.ttl {
            builder = builder.with_ttl(slot);
        }

        if let Some(slot) = request.validity_interval_start {
            builder = builder.with_validity_interval_start(slot);
        }

        if let Some(network_id) = request.network_id {
            builder = builder.with_network_id(NetworkId::try_from(network_id).context("networkId")?);
        }

        if let Some(address) = request.change_address {
            builder = builder.with_change_address(address);
        }

        if let Some(address) = request.collateral_return_address {
            builder = builder.with_collateral_return_address(address);
        }

        if let Some(total_collateral) = request.total_collateral {
            builder = builder.with_total_collateral(total_collateral.lovelace().context("totalCollateral")?);
        }

        if let Some(hash) = request.auxiliary_data_hash {
            builder = builder.with_auxiliary_data_hash(hash);
        }

        if let Some(hash) = request.script_data_hash {
            builder = builder.with_script_data_hash(hash);
        }

        Ok(builder)
    }
}

// ----------------------------------------------------------------- Converting

fn plutus_data(hex_str: &str) -> anyhow::Result<PlutusData> {
    let bytes = hex::decode(hex_str).context("invalid hex")?;
    Ok(PlutusData::pre_encoded(bytes)?)
}

fn native_script(hex_str: &str) -> anyhow::Result<NativeScript> {
    let bytes = hex::decode(hex_str).context("invalid hex")?;
    cbor::decode(&bytes).map_err(|e| anyhow!("malformed native script: {e}"))
}

fn datum(datum_hash: Option<Hash<32>>, inline_datum: Option<String>) -> anyhow::Result<Datum> {
    match (datum_hash, inline_datum) {
        (None, None) => Ok(Datum::None),
        (Some(hash), None) => Ok(Datum::from(hash)),
        (None, Some(data)) => Ok(Datum::from(plutus_data(&data).context("inlineDatum")?)),
        (Some(..), Some(..)) => bail!("both a datum hash and an inline datum"),
    }
}

fn script_ref(script_ref: Option<String>) -> anyhow::Result<Option<ScriptRef>> {
    script_ref
        .map(|hex_str| {
            let bytes = hex::decode(&hex_str).context("scriptRef: invalid hex")?;
            Ok(ScriptRef::pre_encoded(bytes)?)
        })
        .transpose()
}

fn value(lovelace: Quantity, native_assets: Vec<AssetRequest>) -> anyhow::Result<Value> {
    let assets = native_assets
        .into_iter()
        .enumerate()
        .map(|(ix, asset)| {
            native_asset(asset, Quantity::held).with_context(|| format!("nativeAssets[{ix}]"))
        })
        .collect::<anyhow::Result<Vec<NativeAsset>>>()?;

    Ok(Value::new(lovelace.lovelace()?).with_assets(&assets)?)
}

fn native_asset(
    asset: AssetRequest,
    amount: impl FnOnce(Quantity) -> anyhow::Result<i128>,
) -> anyhow::Result<NativeAsset> {
    let asset_name = AssetName::try_from(asset.asset_name.as_str())?;
    Ok(NativeAsset::new(asset.policy_id, asset_name, amount(asset.amount)?))
}

impl TryFrom<UtxoRequest> for Utxo {
    type Error = anyhow::Error;

    fn try_from(utxo: UtxoRequest) -> anyhow::Result<Self> {
        let mut result = Utxo::new(
            Input::new(utxo.hash, utxo.index),
            value(utxo.lovelace, utxo.native_assets)?,
        )
        .with_datum(datum(utxo.datum_hash, utxo.inline_datum)?);

        if let Some(script_ref) = script_ref(utxo.script_ref)? {
            result = result.with_script_ref(script_ref);
        }

        Ok(result)
    }
}

impl TryFrom<OutputRequest> for Output {
    type Error = anyhow::Error;

    fn try_from(output: OutputRequest) -> anyhow::Result<Self> {
        let mut result = Output::new(output.address, value(output.lovelace, output.native_assets)?)
            .with_datum(datum(output.datum_hash, output.inline_datum)?);

        if let Some(script_ref) = script_ref(output.script_ref)? {
            result = result.with_script_ref(script_ref);
        }

        Ok(result)
    }
}

impl TryFrom<ScriptRequest> for PlutusScript {
    type Error = anyhow::Error;

    fn try_from(script: ScriptRequest) -> anyhow::Result<Self> {
        let version: PlutusVersion = script.version.parse()?;
        let bytes = hex::decode(&script.script).context("invalid script hex")?;
        Ok(PlutusScript::new(version, bytes))
    }
}

impl TryFrom<RedeemerRequest> for Redeemer {
    type Error = anyhow::Error;

    fn try_from(redeemer: RedeemerRequest) -> anyhow::Result<Self> {
        let tag: RedeemerTag = redeemer.tag.parse()?;
        let mut result = Redeemer::new(tag, redeemer.index, plutus_data(&redeemer.data).context("data")?);
        if let Some(execution_units) = redeemer.execution_units {
            result = result.with_execution_units(execution_units);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, address::tests::ENTERPRISE, cbor::ToCbor, input};

    const TX_ID: &str = "32b5e793d26af181cb837ab7470ba6e10e15ff638088bc6b099bb22b54b4796c";

    const POLICY: &str = "bce40727b0979ab901007a4969c3177a6cdab005427f4e977776a69b";

    fn request(body: &str) -> TransactionRequest {
        TransactionRequest::from_json(body).unwrap()
    }

    #[tokio::test]
    async fn minimal_request() {
        let params = ProtocolParameters::mainnet();
        let request = request(&format!(
            r#"{{
                "inputs": [{{ "hash": "{TX_ID}", "index": 0, "lovelace": "5000000" }}],
                "changeAddress": "{ENTERPRISE}",
                "signingKeys": ["{}"]
            }}"#,
            "2a".repeat(32),
        ));

        let tx = TransactionBuilder::from_request(&params, request)
            .unwrap()
            .build()
            .await
            .unwrap();

        assert_eq!(tx.inputs(), &[input!(TX_ID, 0)]);
        assert_eq!(tx.outputs()[0].lovelace() + tx.fee(), 5_000_000);
    }

    #[tokio::test]
    async fn full_request() {
        let params = ProtocolParameters::mainnet();
        let request = request(&format!(
            r#"{{
                "era": "conway",
                "inputs": [{{
                    "hash": "{TX_ID}",
                    "index": 1,
                    "lovelace": 20000000,
                    "nativeAssets": [{{
                        "policyId": "bce40727b0979ab901007a4969c3177a6cdab005427f4e977776a69b",
                        "assetName": "41",
                        "amount": "10"
                    }}],
                    "inlineDatum": "d87980"
                }}],
                "collateralInputs": [{{ "hash": "{TX_ID}", "index": 2, "lovelace": 5000000 }}],
                "outputs": [{{
                    "address": "{ENTERPRISE}",
                    "lovelace": 2000000,
                    "nativeAssets": [{{
                        "policyId": "bce40727b0979ab901007a4969c3177a6cdab005427f4e977776a69b",
                        "assetName": "41",
                        "amount": 4
                    }}],
                    "datumHash": "{}"
                }}],
                "plutusScripts": [{{ "version": "PlutusV3", "script": "5101010023259800a518a4d136564004ae69" }}],
                "redeemers": [{{
                    "tag": "spend",
                    "index": 0,
                    "data": "d87980",
                    "executionUnits": {{ "memory": 1000, "steps": 2000 }}
                }}],
                "signingKeys": ["{}"],
                "requiredSigners": ["{}"],
                "metadata": "a10263616263",
                "ttl": 1000,
                "networkId": 1,
                "changeAddress": "{ENTERPRISE}",
                "collateralReturnAddress": "{ENTERPRISE}"
            }}"#,
            "00".repeat(32),
            "2a".repeat(32),
            "11".repeat(28),
        ));

        let tx = TransactionBuilder::from_request(&params, request)
            .unwrap()
            .build()
            .await
            .unwrap();

        assert_eq!(tx.body().era, Era::Conway);
        assert_eq!(tx.body().network_id, Some(NetworkId::Mainnet));
        assert_eq!(tx.body().ttl, Some(1_000));
        assert!(tx.body().script_data_hash.is_some());
        assert!(tx.auxiliary_data().is_some());
        assert!(tx.collateral_return().is_some());
        assert_eq!(
            tx.witness_set().redeemers[0].data.to_cbor(),
            hex::decode("d87980").unwrap()
        );
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = TransactionRequest::from_json(r#"{ "inputs": [], "foo": 42 }"#);
        assert!(result.is_err());
    }

    #[test]
    fn negative_lovelace_is_rejected() {
        let request = request(&format!(
            r#"{{ "inputs": [{{ "hash": "{TX_ID}", "index": 0, "lovelace": "-1" }}] }}"#,
        ));
        let params = ProtocolParameters::mainnet();
        let error = TransactionBuilder::from_request(&params, request).err().unwrap();
        assert!(format!("{error:#}").contains("inputs[0]"), "{error:#}");
    }

    #[test]
    fn asset_quantities_are_bounded() {
        let params = ProtocolParameters::mainnet();

        let held = request(&format!(
            r#"{{ "inputs": [{{
                "hash": "{TX_ID}",
                "index": 0,
                "lovelace": 1,
                "nativeAssets": [
                    {{ "policyId": "{POLICY}", "assetName": "41", "amount": "18446744073709551615" }},
                    {{ "policyId": "{POLICY}", "assetName": "41", "amount": "170141183460469231731687303715884105727" }}
                ]
            }}] }}"#,
        ));
        let error = TransactionBuilder::from_request(&params, held).err().unwrap();
        assert!(format!("{error:#}").contains("nativeAssets[1]"), "{error:#}");

        let minted = request(&format!(
            r#"{{
                "inputs": [{{ "hash": "{TX_ID}", "index": 0, "lovelace": 1 }}],
                "mint": [{{ "policyId": "{POLICY}", "assetName": "41", "amount": "-9223372036854775809" }}]
            }}"#,
        ));
        let error = TransactionBuilder::from_request(&params, minted).err().unwrap();
        assert!(format!("{error:#}").contains("mint[0]"), "{error:#}");
    }

    #[test]
    fn conflicting_datums_are_rejected() {
        let request = request(&format!(
            r#"{{ "inputs": [{{
                "hash": "{TX_ID}",
                "index": 0,
                "lovelace": 1,
                "datumHash": "{}",
                "inlineDatum": "00"
            }}] }}"#,
            "00".repeat(32),
        ));
        let params = ProtocolParameters::mainnet();
        assert!(TransactionBuilder::from_request(&params, request).is_err());
    }

    #[tokio::test]
    async fn builder_errors_stay_typed() {
        let params = ProtocolParameters::mainnet();
        let request = request(&format!(
            r#"{{
                "inputs": [{{ "hash": "{TX_ID}", "index": 0, "lovelace": 5000000 }}],
                "changeAddress": "{ENTERPRISE}"
            }}"#,
        ));

        let result = TransactionBuilder::from_request(&params, request)
            .unwrap()
            .build()
            .await;
        assert!(matches!(result, Err(Error::Precondition(..))));
    }
}
