//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use anyhow::Context;
use cardano_tx_assembler::{ProtocolParameters, TransactionBuilder, TransactionRequest, cbor::ToCbor};
use clap::Parser;
use std::path::PathBuf;

mod env {
    pub const PROTOCOL_PARAMETERS: &str = "PROTOCOL_PARAMETERS";
    pub const TRANSACTION_REQUEST: &str = "TRANSACTION_REQUEST";
}

/// Assemble a balanced and signed transaction from a JSON request, and print it as hex-encoded
/// CBOR.
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
struct Cmd {
    /// Protocol parameters, as given by `cardano-cli query protocol-parameters`. Mainnet's
    /// parameters are assumed when missing.
    #[arg(long, env = env::PROTOCOL_PARAMETERS, value_name = "FILE")]
    protocol_parameters: Option<PathBuf>,

    /// The transaction to assemble.
    #[arg(long, env = env::TRANSACTION_REQUEST, value_name = "FILE")]
    request: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let cmd = Cmd::parse();

    let params = match &cmd.protocol_parameters {
        Some(path) => ProtocolParameters::from_file(path)?,
        None => {
            log::info!("no protocol parameters given; using mainnet's");
            ProtocolParameters::mainnet()
        }
    };

    let request = TransactionRequest::from_file(&cmd.request)?;

    let tx = TransactionBuilder::from_request(&params, request)?
        .build()
        .await
        .context("failed to assemble transaction")?;

    log::info!("assembled {tx}: size={}, fee={}", tx.size(), tx.fee());

    println!("{}", tx.id());
    println!("{}", hex::encode(tx.to_cbor()));

    Ok(())
}
