//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{Datum, Input, ScriptRef, Value};
use std::fmt;

/// An unspent output, as known to the caller: a reference to it, alongside what it holds.
///
/// Only the reference ends up in the transaction; the rest is needed to balance it and to price
/// the scripts it may carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utxo {
    input: Input,
    value: Value,
    datum: Datum,
    script_ref: Option<ScriptRef>,
}

impl fmt::Display for Utxo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} => {}", self.input, self.value)
    }
}

// -------------------------------------------------------------------- Building

impl Utxo {
    pub fn new(input: Input, value: Value) -> Self {
        Self {
            input,
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
}

// ------------------------------------------------------------------ Inspecting

impl Utxo {
    pub fn input(&self) -> &Input {
        &self.input
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
}
