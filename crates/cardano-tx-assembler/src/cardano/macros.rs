//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Shorthands for constructing values from hex-encoded and bech32 literals. They panic on
//! malformed inputs and are meant for tests and fixtures.

#[macro_export]
macro_rules! hash {
    ($hex:expr $(,)?) => {
        <$crate::Hash<_>>::try_from($hex).unwrap()
    };
}

#[macro_export]
macro_rules! input {
    ($tx_hex:expr, $index:expr $(,)?) => {
        $crate::Input::new(<$crate::Hash<32>>::try_from($tx_hex).unwrap(), $index)
    };
}

#[macro_export]
macro_rules! output {
    ($addr:expr, $value:expr $(,)?) => {
        $crate::Output::new($crate::Address::try_from($addr).unwrap(), $value)
    };
}

#[macro_export]
macro_rules! plutus_script {
    ($lang:expr, $bytes:expr $(,)?) => {
        $crate::PlutusScript::new($lang, hex::decode($bytes).unwrap())
    };
}

#[macro_export]
macro_rules! asset {
    ($policy_hex:expr, $asset_name_hex:expr, $amount:expr $(,)?) => {
        $crate::NativeAsset::new(
            <$crate::Hash<28>>::try_from($policy_hex).unwrap(),
            <$crate::native_asset::AssetName>::try_from($asset_name_hex).unwrap(),
            $amount,
        )
    };
}

#[macro_export]
macro_rules! value {
    // Just lovelace
    ($lovelace:expr $(,)?) => {
        $crate::Value::new($lovelace)
    };

    // Lovelace + native assets as triples: (policy_id, asset_name, amount)
    ($lovelace:expr, $( ($policy_hex:expr, $asset_name_hex:expr, $amount:expr $(,)?) ),+ $(,)? ) => {{
        $crate::Value::new($lovelace)
            .with_assets(&[ $( $crate::asset!($policy_hex, $asset_name_hex, $amount) ),+ ])
            .unwrap()
    }};
}

#[macro_export]
macro_rules! utxo {
    ($tx_hex:expr, $index:expr, $value:expr $(,)?) => {
        $crate::Utxo::new($crate::input!($tx_hex, $index), $value)
    };
}
