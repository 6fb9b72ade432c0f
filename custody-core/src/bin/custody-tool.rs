//! Operator helpers for provisioning shard nodes.

use clap::{Parser, Subcommand};
use custody_core::domain::{ConcatenationScheme, MasterSeedMaterial, ShardScheme};
use custody_core::foundation::{checksum_address, CustodyError, DerivationPath, MASTER_HD_PATH};
use std::io::Read;
use zeroize::Zeroizing;

#[derive(Parser, Debug)]
#[command(name = "custody-tool")]
#[command(about = "Shard provisioning helpers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Split a 24-word phrase into the three node shards
    Split {
        /// The full phrase, quoted
        phrase: String,
    },
    /// Print the address at m/44'/60'/0'/0/0 for a phrase read from stdin
    Address,
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Split { phrase } => split(&phrase),
        Command::Address => address(),
    };
    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn split(phrase: &str) -> Result<(), CustodyError> {
    let scheme = ConcatenationScheme;
    let shards = scheme.split(phrase)?;
    println!("Phrase split into {} shards ({} scheme; every shard is required).\n", shards.len(), scheme.name());
    for (index, shard) in shards.iter().enumerate() {
        println!("node {} shard:\n  {}\n", index + 1, shard.as_str());
    }
    println!("Node environment:\n");
    for (index, shard) in shards.iter().enumerate() {
        println!("# node {}\nCUSTODY_NODE__NODE_ID={}\nCUSTODY_NODE__SHARD=\"{}\"\n", index + 1, index + 1, shard.as_str());
    }
    Ok(())
}

fn address() -> Result<(), CustodyError> {
    let mut phrase = Zeroizing::new(String::new());
    std::io::stdin().read_to_string(&mut phrase)?;
    let material = MasterSeedMaterial::new(phrase.split_whitespace().collect::<Vec<_>>().join(" "));
    let keypair = material.derive_keypair(&MASTER_HD_PATH.parse::<DerivationPath>()?)?;
    println!("Address: {}", checksum_address(&keypair.address()));
    Ok(())
}
