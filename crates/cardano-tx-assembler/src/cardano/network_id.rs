//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::cbor;
use anyhow::anyhow;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, cbor::Encode, cbor::Decode)]
#[cbor(index_only)]
pub enum NetworkId {
    #[n(0)]
    Testnet,
    #[n(1)]
    Mainnet,
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str(match self {
            Self::Testnet => "testnet",
            Self::Mainnet => "mainnet",
        })
    }
}

// -------------------------------------------------------------------- Building

impl NetworkId {
    pub fn mainnet() -> Self {
        Self::Mainnet
    }

    pub fn testnet() -> Self {
        Self::Testnet
    }
}

// ----------------------------------------------------------- Converting (from)

impl TryFrom<u8> for NetworkId {
    type Error = anyhow::Error;

    fn try_from(i: u8) -> anyhow::Result<Self> {
        match i {
            0 => Ok(Self::Testnet),
            1 => Ok(Self::Mainnet),
            _ => Err(anyhow!("invalid network identifer; expected either 0 or 1")),
        }
    }
}

// ------------------------------------------------------------- Converting (to)

impl From<NetworkId> for u8 {
    fn from(network_id: NetworkId) -> u8 {
        match network_id {
            NetworkId::Testnet => 0,
            NetworkId::Mainnet => 1,
        }
    }
}
