//! Save Slot Tool
//!
//! Lists, decodes, digests and deletes save slots. Pipeline flags must
//! match the ones the game wrote with; the tool does not auto-detect them.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use save_core::{SaveFormat, SaveManager};

#[derive(Parser)]
#[command(name = "save_tool")]
#[command(about = "Inspect and manage game save slots", long_about = None)]
struct Cli {
    /// Save directory
    #[arg(long, default_value = "saves")]
    dir: PathBuf,

    /// Slot format: "json" or "sav"
    #[arg(long, default_value = "json")]
    format: String,

    /// Slots were written with compression enabled
    #[arg(long, default_value = "false")]
    compressed: bool,

    /// Slots were written with encryption enabled
    #[arg(long, default_value = "false")]
    encrypted: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List slot names in the save directory
    List,

    /// Decode one slot and print it as pretty JSON
    Show {
        /// Slot name
        slot: String,
    },

    /// Print the SHA-256 digest of a slot file's raw bytes
    Digest {
        /// Slot name
        slot: String,
    },

    /// Delete one slot file
    Delete {
        /// Slot name
        slot: String,
    },

    /// Delete every file in the save directory
    Wipe,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let format = SaveFormat::from_extension(&cli.format)
        .with_context(|| format!("unknown format {:?} (expected \"json\" or \"sav\")", cli.format))?;

    let mut manager = SaveManager::new(&cli.dir);
    manager.use_compression = cli.compressed;
    manager.use_encryption = cli.encrypted;

    match cli.command {
        Commands::List => {
            let slots = manager.list_slots(format)?;
            if slots.is_empty() {
                println!("no {} slots in {}", format.extension(), cli.dir.display());
            }
            for slot in slots {
                println!("{slot}");
            }
        }

        Commands::Show { slot } => {
            let mut state = match manager.peek(&slot, format)? {
                Some(state) => state,
                None => bail!("slot {slot:?} not found in {}", cli.dir.display()),
            };
            state.sync_all_to_records();
            println!("{}", serde_json::to_string_pretty(&state)?);
        }

        Commands::Digest { slot } => match manager.slot_digest(&slot, format)? {
            Some(digest) => println!("{digest}  {slot}.{}", format.extension()),
            None => bail!("slot {slot:?} not found in {}", cli.dir.display()),
        },

        Commands::Delete { slot } => {
            if manager.delete_slot(&slot, format)? {
                println!("deleted {slot}.{}", format.extension());
            } else {
                println!("nothing to delete for {slot:?}");
            }
        }

        Commands::Wipe => {
            manager.delete_all()?;
            println!("cleared {}", cli.dir.display());
        }
    }

    Ok(())
}
