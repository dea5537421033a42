//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{
    Address, AuxiliaryData, Era, Error, ExecutionUnits, ExecutionUnitsEvaluator, Hash, Metadata,
    MultiAsset, NativeAsset, NativeScript, NetworkId, Output, PlutusData, PlutusScript,
    PlutusVersion, ProtocolParameters, Redeemer, Signer, Transaction, TransactionBody,
    Utxo, VKeyWitness, Value, WitnessSet, cbor::ToCbor, native_asset::to_canonical_map,
    script_data_hash::script_data_hash,
};
use itertools::Itertools;
use rand::RngCore;
use std::collections::BTreeSet;

/// Fee declared in the body while measuring a transaction whose fee isn't known yet.
pub const PLACEHOLDER_FEE: u64 = 2_000_000;

/// Total collateral declared in the body while measuring a transaction whose fee isn't known yet.
pub const PLACEHOLDER_TOTAL_COLLATERAL: u64 = 4_000_000;

/// Describes a transaction, then assembles it through [`Self::build`].
///
/// The builder is populated through its `with_*` methods. Any of the fee, total collateral,
/// collateral return, auxiliary data hash or script data hash can be set explicitly; they are
/// otherwise computed. Explicit values are never overridden.
///
/// ```rust
/// # use cardano_tx_assembler::{Address, Input, ProtocolParameters, SigningKey, Transaction, Utxo, Value};
/// # let address: Address = "addr_test1vr29962dpn7cxmt02xqej94n6hppt3vm8tp7ws53ytfgq7shl88ss".parse().unwrap();
/// # let input = Input::new([0; 32].into(), 0);
/// let params = ProtocolParameters::mainnet();
///
/// let tx = tokio_test_block_on(
///     Transaction::builder(&params)
///         .with_input(Utxo::new(input, Value::new(5_000_000)))
///         .with_change_address(address)
///         .with_signer(SigningKey::from([0; 32]))
///         .build(),
/// )
/// .unwrap();
///
/// assert_eq!(tx.outputs()[0].lovelace() + tx.fee(), 5_000_000);
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
pub struct TransactionBuilder<'a> {
    params: &'a ProtocolParameters,
    evaluator: Option<&'a dyn ExecutionUnitsEvaluator>,
    era: Era,

    inputs: Vec<Utxo>,
    outputs: Vec<Output>,
    reference_inputs: Vec<Utxo>,
    collateral_inputs: Vec<Utxo>,

    signers: Vec<Box<dyn Signer + Send + Sync + 'a>>,
    signatures: Vec<VKeyWitness>,
    required_signers: BTreeSet<Hash<28>>,

    native_scripts: Vec<NativeScript>,
    plutus_scripts: Vec<PlutusScript>,
    auxiliary_native_scripts: Vec<NativeScript>,
    auxiliary_plutus_scripts: Vec<PlutusScript>,

    mint: Vec<NativeAsset>,
    redeemers: Vec<Redeemer>,
    datums: Vec<PlutusData>,
    metadata: Metadata,

    fee: Option<u64>,
    ttl: Option<u64>,
    validity_interval_start: Option<u64>,
    network_id: Option<NetworkId>,
    change_address: Option<Address>,
    collateral_return_address: Option<Address>,
    collateral_return: Option<Output>,
    total_collateral: Option<u64>,
    auxiliary_data_hash: Option<Hash<32>>,
    script_data_hash: Option<Hash<32>>,
}

/// What is (re)computed while converging towards the final transaction.
#[derive(Debug, Clone)]
struct Draft {
    outputs: Vec<Output>,
    mint: MultiAsset,
    auxiliary_data_hash: Option<Hash<32>>,
    redeemers: Vec<Redeemer>,
    script_data_hash: Option<Hash<32>>,
    fee: Option<u64>,
    total_collateral: Option<u64>,
}

// -------------------------------------------------------------------- Building

impl<'a> TransactionBuilder<'a> {
    pub fn new(params: &'a ProtocolParameters) -> Self {
        Self {
            params,
            evaluator: None,
            era: Era::default(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            reference_inputs: Vec::new(),
            collateral_inputs: Vec::new(),
            signers: Vec::new(),
            signatures: Vec::new(),
            required_signers: BTreeSet::new(),
            native_scripts: Vec::new(),
            plutus_scripts: Vec::new(),
            auxiliary_native_scripts: Vec::new(),
            auxiliary_plutus_scripts: Vec::new(),
            mint: Vec::new(),
            redeemers: Vec::new(),
            datums: Vec::new(),
            metadata: Metadata::default(),
            fee: None,
            ttl: None,
            validity_interval_start: None,
            network_id: None,
            change_address: None,
            collateral_return_address: None,
            collateral_return: None,
            total_collateral: None,
            auxiliary_data_hash: None,
            script_data_hash: None,
        }
    }

    pub fn with_era(mut self, era: Era) -> Self {
        self.era = era;
        self
    }

    /// Use the given evaluator to compute the execution units of redeemers. Without one,
    /// redeemers keep their declared execution units, or the per-transaction maximum.
    pub fn with_evaluator(mut self, evaluator: &'a dyn ExecutionUnitsEvaluator) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    pub fn with_input(mut self, utxo: Utxo) -> Self {
        self.inputs.push(utxo);
        self
    }

    pub fn with_inputs(mut self, utxos: impl IntoIterator<Item = Utxo>) -> Self {
        self.inputs.extend(utxos);
        self
    }

    pub fn with_output(mut self, output: Output) -> Self {
        self.outputs.push(output);
        self
    }

    pub fn with_outputs(mut self, outputs: impl IntoIterator<Item = Output>) -> Self {
        self.outputs.extend(outputs);
        self
    }

    pub fn with_reference_input(mut self, utxo: Utxo) -> Self {
        self.reference_inputs.push(utxo);
        self
    }

    pub fn with_reference_inputs(mut self, utxos: impl IntoIterator<Item = Utxo>) -> Self {
        self.reference_inputs.extend(utxos);
        self
    }

    pub fn with_collateral_input(mut self, utxo: Utxo) -> Self {
        self.collateral_inputs.push(utxo);
        self
    }

    pub fn with_collateral_inputs(mut self, utxos: impl IntoIterator<Item = Utxo>) -> Self {
        self.collateral_inputs.extend(utxos);
        self
    }

    /// Sign the final transaction id with the given signer.
    pub fn with_signer(mut self, signer: impl Signer + Send + Sync + 'a) -> Self {
        self.signers.push(Box::new(signer));
        self
    }

    /// Add an already-computed signature of the transaction id.
    pub fn with_signature(mut self, witness: VKeyWitness) -> Self {
        self.signatures.push(witness);
        self
    }

    pub fn with_required_signer(mut self, key_hash: Hash<28>) -> Self {
        self.required_signers.insert(key_hash);
        self
    }

    pub fn with_native_script(mut self, script: NativeScript) -> Self {
        self.native_scripts.push(script);
        self
    }

    pub fn with_plutus_script(mut self, script: PlutusScript) -> Self {
        self.plutus_scripts.push(script);
        self
    }

    pub fn with_auxiliary_native_script(mut self, script: NativeScript) -> Self {
        self.auxiliary_native_scripts.push(script);
        self
    }

    pub fn with_auxiliary_plutus_script(mut self, script: PlutusScript) -> Self {
        self.auxiliary_plutus_scripts.push(script);
        self
    }

    /// Mint (positive amounts) or burn (negative amounts) assets. Entries for a same asset add
    /// up.
    pub fn with_mint(mut self, assets: impl IntoIterator<Item = NativeAsset>) -> Self {
        self.mint.extend(assets);
        self
    }

    pub fn with_redeemer(mut self, redeemer: Redeemer) -> Self {
        self.redeemers.push(redeemer);
        self
    }

    pub fn with_datum(mut self, datum: PlutusData) -> Self {
        self.datums.push(datum);
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_fee(mut self, fee: u64) -> Self {
        self.fee = Some(fee);
        self
    }

    pub fn with_ttl(mut self, slot: u64) -> Self {
        self.ttl = Some(slot);
        self
    }

    pub fn with_validity_interval_start(mut self, slot: u64) -> Self {
        self.validity_interval_start = Some(slot);
        self
    }

    pub fn with_network_id(mut self, network_id: NetworkId) -> Self {
        self.network_id = Some(network_id);
        self
    }

    /// Where to send whatever is left once outputs and fee are paid.
    pub fn with_change_address(mut self, address: Address) -> Self {
        self.change_address = Some(address);
        self
    }

    pub fn with_collateral_return_address(mut self, address: Address) -> Self {
        self.collateral_return_address = Some(address);
        self
    }

    pub fn with_collateral_return(mut self, output: Output) -> Self {
        self.collateral_return = Some(output);
        self
    }

    pub fn with_total_collateral(mut self, total_collateral: u64) -> Self {
        self.total_collateral = Some(total_collateral);
        self
    }

    pub fn with_auxiliary_data_hash(mut self, hash: Hash<32>) -> Self {
        self.auxiliary_data_hash = Some(hash);
        self
    }

    pub fn with_script_data_hash(mut self, hash: Hash<32>) -> Self {
        self.script_data_hash = Some(hash);
        self
    }
}

// ------------------------------------------------------------------- Assembling

impl TransactionBuilder<'_> {
    /// Assemble the transaction, computing whatever wasn't set explicitly.
    ///
    /// The size of a transaction depends on its fee, which depends on its size. Unless the fee
    /// is given, a first candidate is measured with placeholder fee, collateral and signatures;
    /// scripts are assumed to use the maximum execution budget. When an evaluator is available,
    /// it is called once on that candidate, and the fee is adjusted to the actual execution
    /// costs before measuring a second candidate. No further iteration happens.
    pub async fn build(self) -> Result<Transaction, Error> {
        self.validate()?;

        let auxiliary_data = self.auxiliary_data();
        let auxiliary_data_hash = self
            .auxiliary_data_hash
            .or_else(|| auxiliary_data.as_ref().map(AuxiliaryData::hash));
        log::debug!("auxiliary data hash: {auxiliary_data_hash:?}");

        let redeemers = self
            .redeemers
            .iter()
            .cloned()
            .map(|mut redeemer| {
                redeemer.execution_units = redeemer
                    .execution_units
                    .or(Some(self.params.max_tx_execution_units()));
                redeemer
            })
            .collect::<Vec<_>>();

        let has_collateral = !self.collateral_inputs.is_empty();

        let mut draft = Draft {
            outputs: self
                .outputs
                .iter()
                .cloned()
                .map(|output| output.with_minimum_deposit(self.params.utxo_cost_per_byte()))
                .collect(),
            mint: to_canonical_map(&self.mint)?,
            auxiliary_data_hash,
            script_data_hash: self.script_data_hash(&redeemers)?,
            redeemers,
            fee: self.fee,
            total_collateral: match self.total_collateral {
                Some(total_collateral) => Some(total_collateral),
                None if has_collateral => Some(
                    self.fee
                        .map(|fee| self.params.minimum_collateral(fee))
                        .unwrap_or(PLACEHOLDER_TOTAL_COLLATERAL),
                ),
                None => None,
            },
        };
        log::debug!("provisional script data hash: {:?}", draft.script_data_hash);

        if self.fee.is_none() {
            let reference_scripts_fee = self
                .params
                .referenced_scripts_fee(self.reference_scripts_size());

            let probe = self.probe(&draft, auxiliary_data.as_ref())?;
            let max_execution_fee = has_collateral.then(|| self.params.max_execution_fee());
            self.update_fee(&mut draft, probe.len(), max_execution_fee, reference_scripts_fee);

            if let Some(evaluator) = self.evaluator
                && has_collateral
            {
                let execution_units = evaluator.evaluate(&probe).await?;
                log::debug!("evaluated execution units: {execution_units:?}");

                for redeemer in draft.redeemers.iter_mut() {
                    if let Some(units) = execution_units.get(&redeemer.pointer) {
                        redeemer.execution_units = Some(*units);
                    }
                }

                let execution_fee = self
                    .params
                    .execution_fee(execution_units.values().copied().sum::<ExecutionUnits>());
                self.update_fee(&mut draft, probe.len(), Some(execution_fee), reference_scripts_fee);

                let probe = self.probe(&draft, auxiliary_data.as_ref())?;
                self.update_fee(&mut draft, probe.len(), Some(execution_fee), reference_scripts_fee);
            }
        }

        if self.script_data_hash.is_none() {
            draft.script_data_hash = self.script_data_hash(&draft.redeemers)?;
        }

        let body = self.body(&draft, false)?;
        let id = body.id();
        let witness_set = self.witness_set(&draft, id.as_ref(), false);
        log::debug!("transaction id: {id}, fee: {}", body.fee);

        Ok(Transaction::new(body, witness_set, auxiliary_data))
    }

    fn validate(&self) -> Result<(), Error> {
        if self.inputs.is_empty() {
            return Err(Error::Precondition("no inputs".to_string()));
        }

        if let Some(utxo) = self.inputs.iter().find(|utxo| utxo.lovelace() == 0) {
            return Err(Error::Precondition(format!("input without lovelace: {}", utxo.input())));
        }

        if self.outputs.is_empty() && self.change_address.is_none() {
            return Err(Error::Precondition(
                "neither outputs nor a change address".to_string(),
            ));
        }

        if self.signers.is_empty() && self.signatures.is_empty() {
            return Err(Error::Precondition(
                "neither signing keys nor signatures".to_string(),
            ));
        }

        if (!self.redeemers.is_empty() || !self.reference_inputs.is_empty())
            && self.collateral_inputs.is_empty()
        {
            return Err(Error::Precondition(
                "scripts are involved, but no collateral inputs were given".to_string(),
            ));
        }

        if let Some(utxo) = self.collateral_inputs.iter().find(|utxo| utxo.lovelace() == 0) {
            return Err(Error::Precondition(format!(
                "collateral input without lovelace: {}",
                utxo.input()
            )));
        }

        Ok(())
    }

    fn auxiliary_data(&self) -> Option<AuxiliaryData> {
        let auxiliary_data = AuxiliaryData::new(
            self.metadata.clone(),
            self.auxiliary_native_scripts.clone(),
            self.auxiliary_plutus_scripts.clone(),
        );
        (!auxiliary_data.is_empty()).then_some(auxiliary_data)
    }

    /// Plutus languages in use: those of witnessed scripts, and of scripts referenced by spent
    /// or reference inputs.
    fn languages(&self) -> BTreeSet<PlutusVersion> {
        self.plutus_scripts
            .iter()
            .map(PlutusScript::version)
            .chain(
                self.inputs
                    .iter()
                    .chain(self.reference_inputs.iter())
                    .filter_map(|utxo| utxo.script_ref()?.language()),
            )
            .collect()
    }

    fn reference_scripts_size(&self) -> u64 {
        self.inputs
            .iter()
            .chain(self.reference_inputs.iter())
            .filter_map(Utxo::script_ref)
            .map(|script_ref| script_ref.size())
            .sum()
    }

    fn script_data_hash(&self, redeemers: &[Redeemer]) -> Result<Option<Hash<32>>, Error> {
        if self.script_data_hash.is_some() {
            return Ok(self.script_data_hash);
        }

        script_data_hash(
            self.era,
            redeemers,
            &self.datums,
            &self.languages(),
            self.params,
        )
    }

    /// Set the fee from the size of a candidate, along with the collateral it requires.
    fn update_fee(
        &self,
        draft: &mut Draft,
        size: usize,
        execution_fee: Option<u64>,
        reference_scripts_fee: u64,
    ) {
        let fee = self.params.base_fee(size as u64)
            + execution_fee.unwrap_or_default()
            + reference_scripts_fee;

        draft.fee = Some(fee);

        if execution_fee.is_some() && self.total_collateral.is_none() {
            draft.total_collateral = Some(self.params.minimum_collateral(fee));
        }

        log::debug!(
            "candidate size: {size}, fee: {fee}, total collateral: {:?}",
            draft.total_collateral
        );
    }

    /// Serialise a candidate transaction, signed over a random id, to measure it.
    fn probe(
        &self,
        draft: &Draft,
        auxiliary_data: Option<&AuxiliaryData>,
    ) -> Result<Vec<u8>, Error> {
        let mut id = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut id);

        let tx = Transaction::new(
            self.body(draft, true)?,
            self.witness_set(draft, &id, true),
            auxiliary_data.cloned(),
        );

        let bytes = tx.to_cbor();
        log::trace!("candidate transaction: {}", hex::encode(&bytes));
        Ok(bytes)
    }

    fn body(&self, draft: &Draft, is_probe: bool) -> Result<TransactionBody, Error> {
        let mut outputs = draft.outputs.clone();
        if let Some(change) = self.change(draft, is_probe)? {
            outputs.push(change);
        }

        let collateral_return = match &self.collateral_return {
            Some(output) => Some(output.clone()),
            None => self.collateral_return(draft.total_collateral, is_probe)?,
        };

        Ok(TransactionBody {
            era: self.era,
            inputs: sorted_inputs(&self.inputs),
            outputs,
            fee: draft.fee.unwrap_or(PLACEHOLDER_FEE),
            ttl: self.ttl,
            auxiliary_data_hash: draft.auxiliary_data_hash,
            validity_interval_start: self.validity_interval_start,
            mint: draft.mint.clone(),
            script_data_hash: draft.script_data_hash,
            collateral: sorted_inputs(&self.collateral_inputs),
            required_signers: self.required_signers.iter().copied().collect(),
            network_id: self.network_id,
            collateral_return,
            total_collateral: draft.total_collateral,
            reference_inputs: sorted_inputs(&self.reference_inputs),
        })
    }

    /// Whatever remains from inputs and mint once outputs and fee are paid; sent to the change
    /// address. An unknown fee counts as zero.
    ///
    /// While probing, leftovers that couldn't be sent anywhere, or that fall short of the minimum
    /// deposit, are tolerated since the fee isn't final yet.
    fn change(&self, draft: &Draft, is_probe: bool) -> Result<Option<Output>, Error> {
        let mut change = Value::default();

        for utxo in &self.inputs {
            change.add(utxo.value())?;
        }

        let (minted, burned): (Vec<_>, Vec<_>) =
            draft.mint.iter().partition(|asset| asset.amount > 0);
        let burned = burned
            .into_iter()
            .map(|asset| match asset.amount.checked_neg() {
                Some(amount) => Ok(NativeAsset { amount, ..asset }),
                None => Err(Error::Balance(format!("burn quantity out of range: {asset}"))),
            })
            .collect::<Result<Vec<_>, _>>()?;
        change.add(&Value::default().with_assets(&minted)?)?;
        change.checked_sub(&Value::default().with_assets(&burned)?)?;

        for output in &draft.outputs {
            change.checked_sub(output.value())?;
        }

        change.checked_sub(&Value::new(draft.fee.unwrap_or_default()))?;

        if change.is_empty() {
            return Ok(None);
        }

        if change.lovelace() == 0 {
            return Err(Error::Balance(format!(
                "no lovelace left to carry remaining assets: {change}"
            )));
        }

        let Some(address) = &self.change_address else {
            if is_probe {
                return Ok(None);
            }
            return Err(Error::Balance(format!(
                "leftover value and no change address: {change}"
            )));
        };

        let output = Output::new(address.clone(), change);
        let minimum_deposit = output.minimum_deposit(self.params.utxo_cost_per_byte());
        if !is_probe && output.lovelace() < minimum_deposit {
            return Err(Error::Balance(format!(
                "change output below minimum deposit: {} < {minimum_deposit}",
                output.lovelace()
            )));
        }

        Ok(Some(output))
    }

    /// All of the collateral inputs' value minus the total collateral, sent back to the
    /// collateral return address.
    ///
    /// While probing, the whole collateral value is returned: the final lovelace can only be
    /// smaller, hence never serialised on more bytes.
    fn collateral_return(
        &self,
        total_collateral: Option<u64>,
        is_probe: bool,
    ) -> Result<Option<Output>, Error> {
        let Some(address) = &self.collateral_return_address else {
            return Ok(None);
        };

        let mut value = Value::default();
        for utxo in &self.collateral_inputs {
            value.add(utxo.value())?;
        }

        if is_probe {
            return Ok(Some(Output::new(address.clone(), value)));
        }

        let total_collateral = total_collateral.unwrap_or_default();
        let lovelace = value.lovelace().checked_sub(total_collateral).ok_or_else(|| {
            Error::Balance(format!(
                "collateral inputs hold less than the total collateral: {} < {total_collateral}",
                value.lovelace(),
            ))
        })?;

        Ok(Some(Output::new(address.clone(), value.with_lovelace(lovelace))))
    }

    /// Signatures of the given transaction id, plus the ones given upfront.
    ///
    /// While probing, required signers that no known key covers get a placeholder witness, so
    /// that the candidate weighs as much as the final transaction.
    fn witness_set(&self, draft: &Draft, transaction_id: &[u8], is_probe: bool) -> WitnessSet {
        let mut vkey_witnesses = self
            .signatures
            .iter()
            .copied()
            .chain(
                self.signers
                    .iter()
                    .map(|signer| VKeyWitness::sign(signer.as_ref(), transaction_id)),
            )
            .collect::<Vec<_>>();

        if is_probe {
            let covered = vkey_witnesses
                .iter()
                .map(|witness| witness.vkey.hash())
                .collect::<BTreeSet<_>>();
            let missing = self.required_signers.difference(&covered).count();
            vkey_witnesses.extend(std::iter::repeat_n(VKeyWitness::placeholder(), missing));
        } else {
            vkey_witnesses = vkey_witnesses.into_iter().sorted().dedup().collect();
        }

        WitnessSet {
            era: self.era,
            vkey_witnesses,
            native_scripts: self.native_scripts.clone(),
            plutus_scripts: self.plutus_scripts.clone(),
            datums: self.datums.clone(),
            redeemers: draft.redeemers.clone(),
        }
    }
}

fn sorted_inputs(utxos: &[Utxo]) -> Vec<crate::Input> {
    utxos.iter().map(|utxo| *utxo.input()).sorted().dedup().collect()
}

// ----------------------------------------------------------------------- Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Datum, Input, PlutusVersion, RedeemerPointer, RedeemerTag, SigningKey,
        TransactionSummary, address::tests::BASE, address::tests::ENTERPRISE, any, asset, cbor,
        evaluator::tests::{FailingEvaluator, FixedEvaluator},
        input, output, plutus_script, utxo,
    };
    use num::rational::Ratio;
    use proptest::prelude::*;
    use std::sync::LazyLock;

    /// Some fixture parameters, simply mimicking Mainnet/PreProd's parameters.
    pub static FIXTURE_PROTOCOL_PARAMETERS: LazyLock<ProtocolParameters> = LazyLock::new(|| {
        ProtocolParameters::default()
            .with_fee_per_byte(44)
            .with_fee_constant(155381)
            .with_utxo_cost_per_byte(4310)
            .with_max_tx_execution_units(ExecutionUnits::new(14_000_000, 10_000_000_000))
            .with_collateral_percentage(150)
            .with_execution_price_mem(0.0577)
            .with_execution_price_steps(7.21e-05)
            .with_referenced_scripts_base_fee_per_byte(15)
            .with_referenced_scripts_fee_multiplier(Ratio::new(12, 10))
            .with_referenced_scripts_fee_step_size(25600)
            .with_cost_model(PlutusVersion::V2, vec![1; 175])
            .with_cost_model(PlutusVersion::V3, vec![2; 297])
    });

    const TX_ID: &str = "32b5e793d26af181cb837ab7470ba6e10e15ff638088bc6b099bb22b54b4796c";

    const POLICY: &str = "bce40727b0979ab901007a4969c3177a6cdab005427f4e977776a69b";

    static ALWAYS_SUCCEED_SCRIPT: LazyLock<PlutusScript> =
        LazyLock::new(|| plutus_script!(PlutusVersion::V3, "5101010023259800a518a4d136564004ae69"));

    fn signer() -> SigningKey {
        SigningKey::from([42; 32])
    }

    fn address(bech32: &str) -> Address {
        Address::try_from(bech32).unwrap()
    }

    fn lovelace_out(tx: &Transaction) -> u64 {
        tx.outputs().iter().map(Output::lovelace).sum()
    }

    // -------------------------------------------------------------- Unit tests

    #[tokio::test]
    async fn single_input_to_change() {
        let tx = Transaction::builder(&FIXTURE_PROTOCOL_PARAMETERS)
            .with_input(utxo!(TX_ID, 0, Value::new(5_000_000)))
            .with_change_address(address(ENTERPRISE))
            .with_signer(signer())
            .build()
            .await
            .unwrap();

        assert_eq!(tx.outputs().len(), 1);
        let change = &tx.outputs()[0];
        assert_eq!(change.lovelace(), 5_000_000 - tx.fee());
        assert!(change.lovelace() >= change.minimum_deposit(4310));
        assert!(tx.fee() >= FIXTURE_PROTOCOL_PARAMETERS.base_fee(tx.size() as u64));
    }

    #[tokio::test]
    async fn explicit_outputs_are_raised_to_minimum_deposit() {
        let tx = Transaction::builder(&FIXTURE_PROTOCOL_PARAMETERS)
            .with_input(utxo!(TX_ID, 0, Value::new(10_000_000)))
            .with_output(output!(BASE, Value::new(1)))
            .with_change_address(address(ENTERPRISE))
            .with_signer(signer())
            .build()
            .await
            .unwrap();

        assert_eq!(tx.outputs()[0].lovelace(), 978370);
        assert_eq!(lovelace_out(&tx) + tx.fee(), 10_000_000);
    }

    #[tokio::test]
    async fn sending_more_assets_than_available() {
        let result = Transaction::builder(&FIXTURE_PROTOCOL_PARAMETERS)
            .with_input(utxo!(
                TX_ID,
                0,
                Value::new(5_000_000).with_assets(&[asset!(POLICY, "58", 10)]).unwrap()
            ))
            .with_output(output!(
                BASE,
                Value::new(2_000_000).with_assets(&[asset!(POLICY, "58", 11)]).unwrap()
            ))
            .with_change_address(address(ENTERPRISE))
            .with_signer(signer())
            .build()
            .await;

        assert!(matches!(result, Err(Error::Balance(..))), "{result:?}");
    }

    #[tokio::test]
    async fn redeemers_without_collateral() {
        let result = Transaction::builder(&FIXTURE_PROTOCOL_PARAMETERS)
            .with_input(utxo!(TX_ID, 0, Value::new(5_000_000)))
            .with_change_address(address(ENTERPRISE))
            .with_signer(signer())
            .with_redeemer(Redeemer::new(RedeemerTag::Spend, 0, PlutusData::integer(0)))
            .build()
            .await;

        assert!(matches!(result, Err(Error::Precondition(..))), "{result:?}");
    }

    #[tokio::test]
    async fn missing_preconditions() {
        let no_inputs = Transaction::builder(&FIXTURE_PROTOCOL_PARAMETERS)
            .with_change_address(address(ENTERPRISE))
            .with_signer(signer())
            .build()
            .await;
        assert!(matches!(no_inputs, Err(Error::Precondition(..))));

        let no_destination = Transaction::builder(&FIXTURE_PROTOCOL_PARAMETERS)
            .with_input(utxo!(TX_ID, 0, Value::new(5_000_000)))
            .with_signer(signer())
            .build()
            .await;
        assert!(matches!(no_destination, Err(Error::Precondition(..))));

        let no_signer = Transaction::builder(&FIXTURE_PROTOCOL_PARAMETERS)
            .with_input(utxo!(TX_ID, 0, Value::new(5_000_000)))
            .with_change_address(address(ENTERPRISE))
            .build()
            .await;
        assert!(matches!(no_signer, Err(Error::Precondition(..))));
    }

    #[tokio::test]
    async fn insufficient_funds_for_fee() {
        let result = Transaction::builder(&FIXTURE_PROTOCOL_PARAMETERS)
            .with_input(utxo!(TX_ID, 0, Value::new(1_000_000)))
            .with_output(output!(ENTERPRISE, Value::new(1_000_000)))
            .with_change_address(address(ENTERPRISE))
            .with_signer(signer())
            .build()
            .await;

        assert!(matches!(result, Err(Error::Balance(..))), "{result:?}");
    }

    #[tokio::test]
    async fn change_below_minimum_deposit() {
        let result = Transaction::builder(&FIXTURE_PROTOCOL_PARAMETERS)
            .with_input(utxo!(TX_ID, 0, Value::new(1_300_000)))
            .with_output(output!(ENTERPRISE, Value::new(1_000_000)))
            .with_change_address(address(ENTERPRISE))
            .with_signer(signer())
            .build()
            .await;

        assert!(matches!(result, Err(Error::Balance(..))), "{result:?}");
    }

    #[tokio::test]
    async fn explicit_fee_yields_deterministic_ids() {
        let build = || {
            Transaction::builder(&FIXTURE_PROTOCOL_PARAMETERS)
                .with_input(utxo!(TX_ID, 1, Value::new(5_000_000)))
                .with_input(utxo!(TX_ID, 0, Value::new(3_000_000)))
                .with_output(output!(BASE, Value::new(2_000_000)))
                .with_change_address(address(ENTERPRISE))
                .with_signer(signer())
                .with_fee(200_000)
                .build()
        };

        let a = build().await.unwrap();
        let b = build().await.unwrap();
        assert_eq!(a.id(), b.id());
        assert_eq!(a.to_cbor(), b.to_cbor());
        assert_eq!(a.fee(), 200_000);
        assert_eq!(a.inputs(), &[input!(TX_ID, 0), input!(TX_ID, 1)]);
        assert_eq!(a.outputs()[1].lovelace(), 8_000_000 - 2_000_000 - 200_000);
    }

    #[tokio::test]
    async fn final_signatures_verify_against_id() {
        let key = signer();
        let vkey = key.to_verification_key();
        let tx = Transaction::builder(&FIXTURE_PROTOCOL_PARAMETERS)
            .with_input(utxo!(TX_ID, 0, Value::new(5_000_000)))
            .with_change_address(address(ENTERPRISE))
            .with_signer(key)
            .with_required_signer(Hash::from([1; 28]))
            .build()
            .await
            .unwrap();

        let witnesses = &tx.witness_set().vkey_witnesses;
        assert_eq!(witnesses.len(), 1);
        assert_eq!(witnesses[0].vkey, vkey);
        assert!(vkey.verify(tx.id(), &witnesses[0].signature));
    }

    #[tokio::test]
    async fn mint_and_burn() {
        let tx = Transaction::builder(&FIXTURE_PROTOCOL_PARAMETERS)
            .with_input(utxo!(
                TX_ID,
                0,
                Value::new(10_000_000).with_assets(&[asset!(POLICY, "41", 10)]).unwrap()
            ))
            .with_mint([asset!(POLICY, "42", 5), asset!(POLICY, "41", -4)])
            .with_native_script(NativeScript::InvalidHereafter(1_000))
            .with_change_address(address(ENTERPRISE))
            .with_signer(signer())
            .build()
            .await
            .unwrap();

        let change = tx.outputs()[0].value().assets();
        assert_eq!(change.to_native_assets(), vec![
            asset!(POLICY, "41", 6),
            asset!(POLICY, "42", 5),
        ]);
        assert_eq!(tx.body().mint.to_native_assets().len(), 2);
    }

    #[tokio::test]
    async fn burning_more_than_available() {
        let result = Transaction::builder(&FIXTURE_PROTOCOL_PARAMETERS)
            .with_input(utxo!(TX_ID, 0, Value::new(10_000_000)))
            .with_mint([asset!(POLICY, "41", -1)])
            .with_change_address(address(ENTERPRISE))
            .with_signer(signer())
            .build()
            .await;

        assert!(matches!(result, Err(Error::Balance(..))), "{result:?}");
    }

    #[tokio::test]
    async fn auxiliary_data_is_hashed() {
        let metadata = Metadata::default().with(674, "hello");
        let tx = Transaction::builder(&FIXTURE_PROTOCOL_PARAMETERS)
            .with_input(utxo!(TX_ID, 0, Value::new(5_000_000)))
            .with_change_address(address(ENTERPRISE))
            .with_signer(signer())
            .with_metadata(metadata)
            .build()
            .await
            .unwrap();

        let auxiliary_data = tx.auxiliary_data().unwrap();
        assert_eq!(tx.body().auxiliary_data_hash, Some(auxiliary_data.hash()));
    }

    #[tokio::test]
    async fn explicit_values_win() {
        let script_data_hash = Hash::from([7; 32]);
        let auxiliary_data_hash = Hash::from([8; 32]);
        let tx = Transaction::builder(&FIXTURE_PROTOCOL_PARAMETERS)
            .with_input(utxo!(TX_ID, 0, Value::new(5_000_000)))
            .with_collateral_input(utxo!(TX_ID, 1, Value::new(5_000_000)))
            .with_change_address(address(ENTERPRISE))
            .with_signer(signer())
            .with_datum(PlutusData::integer(1))
            .with_metadata(Metadata::default().with(1, "x"))
            .with_script_data_hash(script_data_hash)
            .with_auxiliary_data_hash(auxiliary_data_hash)
            .with_total_collateral(1_234_567)
            .build()
            .await
            .unwrap();

        assert_eq!(tx.body().script_data_hash, Some(script_data_hash));
        assert_eq!(tx.body().auxiliary_data_hash, Some(auxiliary_data_hash));
        assert_eq!(tx.total_collateral(), Some(1_234_567));
    }

    #[tokio::test]
    async fn plutus_spend_with_evaluator() {
        let evaluator = FixedEvaluator::new([(
            RedeemerPointer::spend(0),
            ExecutionUnits::new(100_000, 50_000_000),
        )]);

        let tx = Transaction::builder(&FIXTURE_PROTOCOL_PARAMETERS)
            .with_era(Era::Conway)
            .with_evaluator(&evaluator)
            .with_input(utxo!(TX_ID, 0, Value::new(20_000_000)).with_datum(Datum::from(PlutusData::integer(0))))
            .with_collateral_input(utxo!(TX_ID, 1, Value::new(5_000_000)))
            .with_collateral_return_address(address(ENTERPRISE))
            .with_plutus_script(ALWAYS_SUCCEED_SCRIPT.clone())
            .with_redeemer(Redeemer::new(RedeemerTag::Spend, 0, PlutusData::list([])))
            .with_change_address(address(ENTERPRISE))
            .with_signer(signer())
            .build()
            .await
            .unwrap();

        assert_eq!(evaluator.calls(), 1);

        let redeemers = &tx.witness_set().redeemers;
        assert_eq!(redeemers[0].execution_units, Some(ExecutionUnits::new(100_000, 50_000_000)));

        let execution_fee = FIXTURE_PROTOCOL_PARAMETERS
            .execution_fee(ExecutionUnits::new(100_000, 50_000_000));
        assert!(tx.fee() >= FIXTURE_PROTOCOL_PARAMETERS.base_fee(tx.size() as u64) + execution_fee);
        assert!(tx.fee() < FIXTURE_PROTOCOL_PARAMETERS.max_execution_fee());

        let total_collateral = tx.total_collateral().unwrap();
        assert_eq!(total_collateral, FIXTURE_PROTOCOL_PARAMETERS.minimum_collateral(tx.fee()));
        assert_eq!(
            tx.collateral_return().unwrap().lovelace(),
            5_000_000 - total_collateral
        );

        assert_eq!(lovelace_out(&tx) + tx.fee(), 20_000_000);
        assert!(tx.body().script_data_hash.is_some());
    }

    #[tokio::test]
    async fn without_evaluator_assume_maximum_budget() {
        let tx = Transaction::builder(&FIXTURE_PROTOCOL_PARAMETERS)
            .with_input(utxo!(TX_ID, 0, Value::new(20_000_000)))
            .with_collateral_input(utxo!(TX_ID, 1, Value::new(5_000_000)))
            .with_plutus_script(ALWAYS_SUCCEED_SCRIPT.clone())
            .with_redeemer(Redeemer::new(RedeemerTag::Spend, 0, PlutusData::list([])))
            .with_change_address(address(ENTERPRISE))
            .with_signer(signer())
            .build()
            .await
            .unwrap();

        assert_eq!(
            tx.witness_set().redeemers[0].execution_units,
            Some(FIXTURE_PROTOCOL_PARAMETERS.max_tx_execution_units()),
        );
        assert!(tx.fee() > FIXTURE_PROTOCOL_PARAMETERS.max_execution_fee());
    }

    #[tokio::test]
    async fn small_collateral_return_is_fully_priced() {
        let tx = Transaction::builder(&FIXTURE_PROTOCOL_PARAMETERS)
            .with_input(utxo!(TX_ID, 0, Value::new(20_000_000)))
            .with_collateral_input(utxo!(TX_ID, 1, Value::new(3_000_000)))
            .with_collateral_return_address(address(ENTERPRISE))
            .with_plutus_script(ALWAYS_SUCCEED_SCRIPT.clone())
            .with_redeemer(Redeemer::new(RedeemerTag::Spend, 0, PlutusData::list([])))
            .with_change_address(address(ENTERPRISE))
            .with_signer(signer())
            .build()
            .await
            .unwrap();

        let total_collateral = tx.total_collateral().unwrap();
        assert!(total_collateral < PLACEHOLDER_TOTAL_COLLATERAL);
        assert_eq!(
            tx.collateral_return().unwrap().lovelace(),
            3_000_000 - total_collateral
        );
        assert!(
            tx.fee()
                >= FIXTURE_PROTOCOL_PARAMETERS.base_fee(tx.size() as u64)
                    + FIXTURE_PROTOCOL_PARAMETERS.max_execution_fee()
        );
    }

    #[tokio::test]
    async fn evaluator_failures_are_propagated() {
        let result = Transaction::builder(&FIXTURE_PROTOCOL_PARAMETERS)
            .with_evaluator(&FailingEvaluator)
            .with_input(utxo!(TX_ID, 0, Value::new(20_000_000)))
            .with_collateral_input(utxo!(TX_ID, 1, Value::new(5_000_000)))
            .with_plutus_script(ALWAYS_SUCCEED_SCRIPT.clone())
            .with_redeemer(Redeemer::new(RedeemerTag::Spend, 0, PlutusData::list([])))
            .with_change_address(address(ENTERPRISE))
            .with_signer(signer())
            .build()
            .await;

        assert!(matches!(result, Err(Error::Evaluator(..))), "{result:?}");
    }

    #[tokio::test]
    async fn missing_cost_model() {
        let params = ProtocolParameters::default().with_utxo_cost_per_byte(4310);
        let result = Transaction::builder(&params)
            .with_input(utxo!(TX_ID, 0, Value::new(20_000_000)))
            .with_collateral_input(utxo!(TX_ID, 1, Value::new(5_000_000)))
            .with_plutus_script(ALWAYS_SUCCEED_SCRIPT.clone())
            .with_redeemer(Redeemer::new(RedeemerTag::Spend, 0, PlutusData::list([])))
            .with_change_address(address(ENTERPRISE))
            .with_signer(signer())
            .build()
            .await;

        assert!(matches!(result, Err(Error::Precondition(..))), "{result:?}");
    }

    #[tokio::test]
    async fn reference_scripts_are_priced() {
        let script = plutus_script!(PlutusVersion::V3, "00".repeat(1000));
        let build = |with_reference: bool| {
            let mut builder = Transaction::builder(&FIXTURE_PROTOCOL_PARAMETERS)
                .with_input(utxo!(TX_ID, 0, Value::new(20_000_000)))
                .with_collateral_input(utxo!(TX_ID, 1, Value::new(5_000_000)))
                .with_change_address(address(ENTERPRISE))
                .with_signer(signer());
            let reference = utxo!(TX_ID, 2, Value::new(2_000_000));
            builder = if with_reference {
                builder.with_reference_input(reference.with_script_ref(script.clone()))
            } else {
                builder.with_reference_input(reference)
            };
            builder.build()
        };

        let with = build(true).await.unwrap();
        let without = build(false).await.unwrap();
        assert_eq!(with.fee() - without.fee(), 15_000);
    }

    #[tokio::test]
    async fn conway_transaction_decodes() {
        let tx = Transaction::builder(&FIXTURE_PROTOCOL_PARAMETERS)
            .with_era(Era::Conway)
            .with_input(utxo!(TX_ID, 0, Value::new(20_000_000)))
            .with_collateral_input(utxo!(TX_ID, 1, Value::new(5_000_000)))
            .with_plutus_script(ALWAYS_SUCCEED_SCRIPT.clone())
            .with_redeemer(
                Redeemer::new(RedeemerTag::Spend, 0, PlutusData::list([]))
                    .with_execution_units(ExecutionUnits::new(1_000, 2_000)),
            )
            .with_change_address(address(ENTERPRISE))
            .with_signer(signer())
            .with_network_id(NetworkId::Testnet)
            .build()
            .await
            .unwrap();

        let bytes = tx.to_cbor();
        let decoded: pallas_primitives::conway::Tx = cbor::decode(&bytes).unwrap();
        assert_eq!(decoded.transaction_body.fee, tx.fee());

        let summary = TransactionSummary::from_cbor(&bytes).unwrap();
        assert_eq!(summary.id, tx.id());
        assert_eq!(summary.inputs, tx.inputs());
        assert_eq!(summary.fee, tx.fee());
        assert_eq!(summary.total_collateral, tx.total_collateral());
        assert_eq!(summary.redeemers.len(), 1);
        assert_eq!(summary.redeemers[0].pointer, RedeemerPointer::spend(0));
        assert_eq!(
            summary.redeemers[0].execution_units,
            Some(ExecutionUnits::new(1_000, 2_000))
        );
    }

    #[tokio::test]
    async fn babbage_transaction_decodes() {
        let tx = Transaction::builder(&FIXTURE_PROTOCOL_PARAMETERS)
            .with_input(utxo!(TX_ID, 0, Value::new(20_000_000)))
            .with_output(
                output!(BASE, Value::new(3_000_000).with_assets(&[asset!(POLICY, "41", 1)]).unwrap())
                    .with_datum(PlutusData::constr(1, [PlutusData::bytes([1u8, 2, 3])])),
            )
            .with_mint([asset!(POLICY, "41", 1)])
            .with_change_address(address(ENTERPRISE))
            .with_signer(signer())
            .with_ttl(1_000)
            .with_validity_interval_start(10)
            .build()
            .await
            .unwrap();

        let bytes = tx.to_cbor();
        let decoded: pallas_primitives::babbage::Tx = cbor::decode(&bytes).unwrap();
        assert_eq!(decoded.transaction_body.fee, tx.fee());
        assert_eq!(decoded.transaction_body.ttl, Some(1_000));
        assert_eq!(TransactionSummary::from_cbor(&bytes).unwrap().id, tx.id());
    }

    #[tokio::test]
    async fn collateral_inputs_are_deduplicated() {
        let tx = Transaction::builder(&FIXTURE_PROTOCOL_PARAMETERS)
            .with_input(utxo!(TX_ID, 0, Value::new(5_000_000)))
            .with_collateral_input(utxo!(TX_ID, 0, Value::new(5_000_000)))
            .with_collateral_input(utxo!(TX_ID, 0, Value::new(5_000_000)))
            .with_change_address(address(ENTERPRISE))
            .with_signer(signer())
            .build()
            .await
            .unwrap();

        assert_eq!(tx.body().collateral, vec![Input::new(Hash::try_from(TX_ID).unwrap(), 0)]);
    }

    // -------------------------------------------------------------- Properties

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn value_is_conserved(
            lovelace in 5_000_000..1_000_000_000_u64,
            assets in any::native_assets(),
            sent in 1_000_000..4_000_000_u64,
        ) {
            let input = Value::new(lovelace).with_assets(&assets).unwrap();
            let sent_assets = input
                .assets()
                .iter()
                .filter(|asset| asset.amount > 1)
                .map(|asset| NativeAsset { amount: asset.amount / 2, ..asset })
                .collect::<Vec<_>>();

            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let tx = runtime.block_on(
                Transaction::builder(&FIXTURE_PROTOCOL_PARAMETERS)
                    .with_input(utxo!(TX_ID, 0, input.clone()))
                    .with_output(output!(BASE, Value::new(sent).with_assets(&sent_assets).unwrap()))
                    .with_change_address(address(ENTERPRISE))
                    .with_signer(signer())
                    .build(),
            );

            // Large asset bundles may not fit; only check successful builds.
            if let Ok(tx) = tx {
                let mut total_out = Value::new(tx.fee());
                for output in tx.outputs() {
                    total_out.add(output.value()).unwrap();
                }
                prop_assert_eq!(total_out, input);
            }
        }
    }
}
