//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{ExecutionUnits, RedeemerPointer};
use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;

/// Failure reported by an [`ExecutionUnitsEvaluator`]; the underlying cause is kept untouched.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct EvaluatorError(#[from] anyhow::Error);

/// Something able to run the scripts of a serialised transaction and report the cost of each
/// redeemer. Typically a local Plutus virtual machine, or a remote node or indexer.
#[async_trait]
pub trait ExecutionUnitsEvaluator: Send + Sync {
    async fn evaluate(
        &self,
        transaction: &[u8],
    ) -> Result<BTreeMap<RedeemerPointer, ExecutionUnits>, EvaluatorError>;
}

#[cfg(any(test, feature = "test-utils"))]
pub mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// An evaluator answering with fixed costs, and counting how many times it was called.
    #[derive(Debug, Default)]
    pub struct FixedEvaluator {
        pub execution_units: BTreeMap<RedeemerPointer, ExecutionUnits>,
        pub calls: AtomicUsize,
    }

    impl FixedEvaluator {
        pub fn new(execution_units: impl IntoIterator<Item = (RedeemerPointer, ExecutionUnits)>) -> Self {
            Self {
                execution_units: execution_units.into_iter().collect(),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ExecutionUnitsEvaluator for FixedEvaluator {
        async fn evaluate(
            &self,
            _transaction: &[u8],
        ) -> Result<BTreeMap<RedeemerPointer, ExecutionUnits>, EvaluatorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.execution_units.clone())
        }
    }

    /// An evaluator that always fails.
    #[derive(Debug, Default)]
    pub struct FailingEvaluator;

    #[async_trait]
    impl ExecutionUnitsEvaluator for FailingEvaluator {
        async fn evaluate(
            &self,
            _transaction: &[u8],
        ) -> Result<BTreeMap<RedeemerPointer, ExecutionUnits>, EvaluatorError> {
            Err(anyhow::anyhow!("script failed: budget exhausted").into())
        }
    }

    #[tokio::test]
    async fn fixed_evaluator_counts_calls() {
        let evaluator = FixedEvaluator::new([(RedeemerPointer::mint(0), ExecutionUnits::new(1, 2))]);
        let units = evaluator.evaluate(&[]).await.unwrap();
        assert_eq!(units.get(&RedeemerPointer::mint(0)), Some(&ExecutionUnits::new(1, 2)));
        assert_eq!(evaluator.calls(), 1);
    }

    #[tokio::test]
    async fn errors_keep_their_message() {
        let error = FailingEvaluator.evaluate(&[]).await.unwrap_err();
        assert_eq!(error.to_string(), "script failed: budget exhausted");
    }
}
