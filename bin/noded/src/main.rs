/* This file is part of shardbft.
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as
 * published by the Free Software Foundation, either version 3 of the
 * License, or (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use std::sync::Arc;

use log::info;
use simplelog::{ColorChoice, Config as LogConfig, LevelFilter, TermLogger, TerminalMode};
use smol::lock::RwLock;
use structopt_toml::{serde::Deserialize, structopt::StructOpt, StructOptToml};

use shardbft::config::NodeConfig;

mod rpc;
mod rpc_blockchain;

use rpc_blockchain::NodeState;

const CONFIG_FILE_CONTENTS: &str = include_str!("../noded_config.toml");

#[derive(Clone, Debug, Deserialize, StructOpt, StructOptToml)]
#[serde(default)]
#[structopt(name = "noded", about = "Sharded BFT node daemon")]
struct Args {
    #[structopt(short, long)]
    /// Configuration file to use
    config: Option<String>,

    #[structopt(long)]
    /// Enable single-node mode for local testing
    single_node: bool,

    #[structopt(short, parse(from_occurrences))]
    /// Increase verbosity (-vvv supported)
    verbose: u8,
}

fn log_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn main() -> shardbft::Result<()> {
    let args = Args::from_args();
    TermLogger::init(log_level(args.verbose), LogConfig::default(), TerminalMode::Mixed, ColorChoice::Auto)
        .expect("failed to initialize logger");

    let raw = match &args.config {
        Some(path) => std::fs::read_to_string(path).unwrap_or_else(|_| CONFIG_FILE_CONTENTS.to_string()),
        None => CONFIG_FILE_CONTENTS.to_string(),
    };
    let mut node_config: NodeConfig = toml::from_str(&raw).unwrap_or_default();
    node_config.single_node = args.single_node || node_config.single_node;

    smol::block_on(async move {
        info!("Initializing node...");
        let state = Arc::new(RwLock::new(NodeState::new(node_config)));

        let (signal_tx, signal_rx) = smol::channel::bounded::<()>(1);
        let mut signals = signal_hook::iterator::Signals::new([signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM])
            .expect("failed to register signal handler");
        std::thread::spawn(move || {
            if signals.forever().next().is_some() {
                let _ = smol::block_on(signal_tx.send(()));
            }
        });

        info!("Node initialized successfully!");
        let _ = state.read().await;

        signal_rx.recv().await.ok();
        print!("\r");
        info!("Caught termination signal, cleaning up and exiting...");
        Ok(())
    })
}
