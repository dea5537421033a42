//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::cbor;
use anyhow::anyhow;
use std::{fmt, str::FromStr};

/// Plutus language versions. Their CBOR encoding is the ledger's language identifier, used as key
/// in cost models and language views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, cbor::Encode, cbor::Decode)]
#[cbor(index_only)]
pub enum PlutusVersion {
    #[n(0)]
    V1,
    #[n(1)]
    V2,
    #[n(2)]
    V3,
}

impl fmt::Display for PlutusVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlutusV{}", u8::from(*self))
    }
}

// ----------------------------------------------------------- Converting (from)

impl TryFrom<u8> for PlutusVersion {
    type Error = anyhow::Error;

    /// Parse a version from its script-reference and hashing discriminant (1, 2 or 3).
    fn try_from(version: u8) -> anyhow::Result<Self> {
        match version {
            1 => Ok(PlutusVersion::V1),
            2 => Ok(PlutusVersion::V2),
            3 => Ok(PlutusVersion::V3),
            _ => Err(anyhow!(
                "unknown plutus version version={version}; only 1, 2 and 3 are known"
            )),
        }
    }
}

impl FromStr for PlutusVersion {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "PlutusV1" | "plutus:v1" | "v1" => Ok(PlutusVersion::V1),
            "PlutusV2" | "plutus:v2" | "v2" => Ok(PlutusVersion::V2),
            "PlutusV3" | "plutus:v3" | "v3" => Ok(PlutusVersion::V3),
            _ => Err(anyhow!("unknown plutus language {s:?}")),
        }
    }
}

// ------------------------------------------------------------- Converting (to)

impl From<PlutusVersion> for u8 {
    fn from(version: PlutusVersion) -> Self {
        match version {
            PlutusVersion::V1 => 1,
            PlutusVersion::V2 => 2,
            PlutusVersion::V3 => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PlutusVersion;
    use crate::cbor::ToCbor;

    #[test]
    fn language_identifiers() {
        assert_eq!(PlutusVersion::V1.to_cbor(), vec![0x00]);
        assert_eq!(PlutusVersion::V2.to_cbor(), vec![0x01]);
        assert_eq!(PlutusVersion::V3.to_cbor(), vec![0x02]);
    }

    #[test]
    fn parse_cost_model_keys() {
        assert_eq!("PlutusV3".parse::<PlutusVersion>().unwrap(), PlutusVersion::V3);
        assert!("PlutusV4".parse::<PlutusVersion>().is_err());
    }
}
