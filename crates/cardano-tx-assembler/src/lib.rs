//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

pub mod cbor;

mod error;
pub use error::{Error, Result};

mod cardano;
pub use cardano::{
    // Re-export types for easier consumption.
    //
    // NOTE: This main function of this comment is to force the formatter to put one import per
    // line in the following import list; making diffs and extensions easier.
    address::{self, Address},
    auxiliary_data::AuxiliaryData,
    crypto::ed25519::signature::Signature,
    crypto::ed25519::signer::Signer,
    crypto::ed25519::signing_key::SigningKey,
    crypto::ed25519::verification_key::VerificationKey,
    crypto::ed25519::vkey_witness::VKeyWitness,
    datum::Datum,
    era::Era,
    evaluator::{self, EvaluatorError, ExecutionUnitsEvaluator},
    execution_units::ExecutionUnits,
    hash::Hash,
    input::Input,
    metadata::{Metadata, Metadatum},
    native_asset::{self, MultiAsset, NativeAsset},
    native_script::NativeScript,
    network_id::NetworkId,
    output::Output,
    plutus_data::PlutusData,
    plutus_script::PlutusScript,
    plutus_version::PlutusVersion,
    protocol_parameters::ProtocolParameters,
    redeemer::{self, Redeemer, RedeemerPointer, RedeemerTag},
    request::{self, TransactionRequest},
    script_data_hash,
    script_ref::ScriptRef,
    transaction::Transaction,
    transaction::body::TransactionBody,
    transaction::builder::TransactionBuilder,
    transaction::summary::TransactionSummary,
    utxo::Utxo,
    value::Value,
    witness_set::WitnessSet,
};

mod pallas;

/// Property-testing strategies for the crate's main types.
#[cfg(any(test, feature = "test-utils"))]
pub mod any {
    pub use crate::cardano::{
        execution_units::tests::generators::*,
        hash::tests::generators::*,
        input::tests::generators::*,
        native_asset::tests::generators::*,
        native_script::tests::generators::*,
        output::tests::generators::*,
        plutus_data::tests::generators::*,
    };
}
