mod adder;
mod config;
mod seal;
mod timing;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;

use crate::adder::keys::ParameterSet;
use crate::config::Files;
use crate::seal::TransportKey;

/// The operand both sides of the addition default to.
const DEFAULT_OPERAND: i32 = 1073741823;

#[derive(Debug, Parser)]
#[command(version, about = "Add two 32-bit integers on an untrusted server under TFHE", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    files: Files,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
enum Command {
    /// Generate the secret key and the cloud key.
    Keygen {
        #[arg(long, value_enum, default_value_t = ParameterSet::Default)]
        params: ParameterSet,
    },
    /// Seal the cloud key with AES-CBC for transport to the cloud.
    SealKey {
        /// AES-128/192/256 key as hex.
        #[arg(long)]
        transport_key: TransportKey,
    },
    /// Restore the cloud key from its sealed copy.
    OpenKey {
        /// AES-128/192/256 key as hex.
        #[arg(long)]
        transport_key: TransportKey,
    },
    /// Encrypt the operands for the cloud. Runs when no subcommand is given.
    Alice(AliceArgs),
    /// Add the encrypted operands with the cloud key.
    Cloud,
    /// Decrypt the cloud's answer.
    Verify,
    /// Fetch the end timestamp from a time server.
    ReceiveTime {
        /// `host:port` of the time server.
        addr: String,
    },
    /// Append the round time to the time log.
    RecordTime,
}

#[derive(Debug, PartialEq, Eq, Args)]
struct AliceArgs {
    #[arg(long, default_value_t = DEFAULT_OPERAND, allow_hyphen_values = true)]
    lhs: i32,

    #[arg(long, default_value_t = DEFAULT_OPERAND, allow_hyphen_values = true)]
    rhs: i32,

    /// Carry-in, 0 or 1.
    #[arg(long, default_value_t = 0)]
    carry: i32,
}

impl Default for AliceArgs {
    fn default() -> Self {
        Self {
            lhs: DEFAULT_OPERAND,
            rhs: DEFAULT_OPERAND,
            carry: 0,
        }
    }
}

impl Cli {
    fn command(self) -> (Command, Files) {
        let command = self
            .command
            .unwrap_or_else(|| Command::Alice(AliceArgs::default()));
        (command, self.files)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let (command, files) = Cli::parse().command();
    let files = &files;

    match command {
        Command::Keygen { params } => adder::keygen(files, params)?,
        Command::SealKey { transport_key } => {
            let times = seal::seal_cloud_key(files, &transport_key)?;
            println!("Encrypting key time: {:.6}", times.encrypt);
        }
        Command::OpenKey { transport_key } => seal::open_cloud_key(files, &transport_key)?,
        Command::Alice(args) => adder::alice(files, args.lhs, args.rhs, args.carry)?,
        Command::Cloud => adder::cloud(files)?,
        Command::Verify => {
            let sum = adder::verify(files)?;
            println!("{}", sum.value);
            if sum.carry_out {
                println!("carry out set");
            }
        }
        Command::ReceiveTime { addr } => {
            info!("connecting to {}", addr);
            let end = timing::receive_timestamp(&addr, &files.end_time)
                .context("receiving end time")?;
            info!("end time {}", end);
        }
        Command::RecordTime => {
            let elapsed = timing::record_round(files)?;
            println!("Total Round Time: {}", elapsed);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn parse(args: &[&str]) -> (Command, Files) {
        Cli::try_parse_from(args).unwrap().command()
    }

    #[test]
    fn bare_invocation_runs_alice_with_defaults() {
        let (command, files) = parse(&["fhe-adder"]);

        assert_eq!(
            command,
            Command::Alice(AliceArgs {
                lhs: 1073741823,
                rhs: 1073741823,
                carry: 0
            })
        );
        assert_eq!(files, Files::default());
        assert_eq!(files.secret_key, PathBuf::from("secret.key"));
        assert_eq!(files.cloud_data, PathBuf::from("cloud.data"));
    }

    #[test]
    fn explicit_alice_matches_bare_invocation() {
        assert_eq!(parse(&["fhe-adder", "alice"]), parse(&["fhe-adder"]));
    }

    #[test]
    fn alice_takes_negative_operands() {
        let (command, _) = parse(&[
            "fhe-adder", "alice", "--lhs", "-5", "--rhs", "7", "--carry", "1",
        ]);
        assert_eq!(
            command,
            Command::Alice(AliceArgs {
                lhs: -5,
                rhs: 7,
                carry: 1
            })
        );
    }

    #[test]
    fn keygen_parameter_sets() {
        let (command, _) = parse(&["fhe-adder", "keygen"]);
        assert_eq!(
            command,
            Command::Keygen {
                params: ParameterSet::Default
            }
        );

        let (command, _) = parse(&["fhe-adder", "keygen", "--params", "tfhe-lib"]);
        assert_eq!(
            command,
            Command::Keygen {
                params: ParameterSet::TfheLib
            }
        );

        assert!(Cli::try_parse_from(["fhe-adder", "keygen", "--params", "tfhe-v1"]).is_err());
    }

    #[test]
    fn file_overrides_work_on_either_side_of_the_subcommand() {
        let (_, before) = parse(&["fhe-adder", "--cloud-data", "in/ops.bin", "cloud"]);
        let (_, after) = parse(&["fhe-adder", "cloud", "--cloud-data", "in/ops.bin"]);

        assert_eq!(before, after);
        assert_eq!(before.cloud_data, PathBuf::from("in/ops.bin"));
        assert_eq!(
            before,
            Files {
                cloud_data: "in/ops.bin".into(),
                ..Files::default()
            }
        );
    }

    #[test]
    fn overrides_apply_to_the_default_alice_run() {
        let (command, files) = parse(&["fhe-adder", "--secret-key", "/keys/alice.key"]);
        assert_eq!(command, Command::Alice(AliceArgs::default()));
        assert_eq!(files.secret_key, PathBuf::from("/keys/alice.key"));
    }

    #[test]
    fn transport_key_is_validated_at_parse_time() {
        let hex = "01".repeat(24);
        let (command, _) = parse(&["fhe-adder", "seal-key", "--transport-key", hex.as_str()]);
        assert_eq!(
            command,
            Command::SealKey {
                transport_key: TransportKey::new(vec![1; 24]).unwrap()
            }
        );

        assert!(Cli::try_parse_from(["fhe-adder", "open-key", "--transport-key", "0102"]).is_err());
        assert!(Cli::try_parse_from(["fhe-adder", "seal-key"]).is_err());
    }
}
