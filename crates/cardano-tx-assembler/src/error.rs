//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{cbor, evaluator::EvaluatorError};
use thiserror::Error;

/// Everything that can go wrong while assembling a transaction. Any error aborts the build; no
/// partial transaction is ever returned.
#[derive(Debug, Error)]
pub enum Error {
    /// The builder is missing something it needs, or holds inconsistent fields.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// Inputs don't cover outputs, fees or burns; or some quantity would turn negative.
    #[error("unbalanced transaction: {0}")]
    Balance(String),

    /// A value can't be serialised as given.
    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("execution units evaluation failed: {0}")]
    Evaluator(#[from] EvaluatorError),

    #[error("malformed cbor: {0}")]
    Decoding(#[from] cbor::decode::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
