//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{NetworkId, cbor, pallas};
use anyhow::{Context, anyhow};
use std::{fmt, str::FromStr};

/// A destination address, kept in its binary form.
///
/// Addresses are validated upon construction, either from their bech32 text form or from raw
/// bytes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(Vec<u8>);

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match pallas::Address::from_bytes(&self.0).and_then(|address| address.to_bech32()) {
            Ok(text) => f.write_str(&text),
            Err(_) => f.write_str(&hex::encode(&self.0)),
        }
    }
}

// ------------------------------------------------------------------ Inspecting

impl Address {
    /// The network this address belongs to, if it commits to one.
    pub fn network_id(&self) -> Option<NetworkId> {
        match pallas::Address::from_bytes(&self.0).ok()?.network()? {
            pallas_addresses::Network::Mainnet => Some(NetworkId::Mainnet),
            pallas_addresses::Network::Testnet | pallas_addresses::Network::Other(..) => {
                Some(NetworkId::Testnet)
            }
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

// ----------------------------------------------------------- Converting (from)

impl TryFrom<&str> for Address {
    type Error = anyhow::Error;

    fn try_from(text: &str) -> anyhow::Result<Self> {
        let address = pallas::Address::from_bech32(text)
            .map_err(|e| anyhow!("{e}"))
            .with_context(|| format!("invalid address {text:?}"))?;
        Ok(Self(address.to_vec()))
    }
}

impl FromStr for Address {
    type Err = anyhow::Error;

    fn from_str(text: &str) -> anyhow::Result<Self> {
        Self::try_from(text)
    }
}

impl TryFrom<&[u8]> for Address {
    type Error = anyhow::Error;

    fn try_from(bytes: &[u8]) -> anyhow::Result<Self> {
        let address = pallas::Address::from_bytes(bytes)
            .map_err(|e| anyhow!("{e}"))
            .context("invalid address bytes")?;
        Ok(Self(address.to_vec()))
    }
}

impl<'de> serde::Deserialize<'de> for Address {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::try_from(text.as_str()).map_err(serde::de::Error::custom)
    }
}

// ------------------------------------------------------------- Converting (to)

impl From<&Address> for Vec<u8> {
    fn from(address: &Address) -> Self {
        address.0.clone()
    }
}

// -------------------------------------------------------------------- Encoding

impl<C> cbor::Encode<C> for Address {
    fn encode<W: cbor::encode::write::Write>(
        &self,
        e: &mut cbor::Encoder<W>,
        _ctx: &mut C,
    ) -> Result<(), cbor::encode::Error<W::Error>> {
        e.bytes(&self.0)?;
        Ok(())
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod tests {
    use crate::{Address, NetworkId};

    pub const ENTERPRISE: &str = "addr_test1vr29962dpn7cxmt02xqej94n6hppt3vm8tp7ws53ytfgq7shl88ss";

    pub const BASE: &str = "addr_test1qpwrm04e7fhalvw28ct274c2cfxqg5h3m3d8s0mnsn2xdtp633cwhfu0k3795qt78zcyy495a929k3seen3256m3gwes6t2fxt";

    #[test]
    fn bech32_to_bytes() {
        let address = Address::try_from(ENTERPRISE).unwrap();
        assert_eq!(
            hex::encode(address.as_bytes()),
            "60d452e94d0cfd836d6f51819916b3d5c215c59b3ac3e7429122d2807a",
        );
        assert_eq!(address.network_id(), Some(NetworkId::Testnet));
    }

    #[test]
    fn display_as_bech32() {
        assert_eq!(Address::try_from(BASE).unwrap().to_string(), BASE);
    }

    #[test]
    fn reject_garbage() {
        assert!(Address::try_from("addr_test1garbage").is_err());
        assert!(Address::try_from([0xff, 0x00].as_slice()).is_err());
    }
}
