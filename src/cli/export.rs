//! CLI command for data export

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::{Args, ValueEnum};

use crate::error::{SplitError, SplitResult};
use crate::export::{export_expenses_csv, export_full_json, export_settlements_csv};
use crate::storage::LedgerRepository;

/// What to export
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportKind {
    /// Shared expenses as CSV
    Expenses,
    /// Settlement history as CSV
    Settlements,
    /// The whole ledger as JSON
    Full,
}

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    #[arg(value_enum)]
    pub kind: ExportKind,
    /// Output file, defaults to stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Handle the export command
pub fn handle_export_command(ledger: &LedgerRepository, args: ExportArgs) -> SplitResult<()> {
    match &args.output {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                SplitError::Export(format!("Failed to create file {}: {}", path.display(), e))
            })?;
            let mut writer = BufWriter::new(file);
            write_export(ledger, args.kind, &mut writer)?;
            writer.flush()?;
            println!("Exported {:?} to: {}", args.kind, path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            write_export(ledger, args.kind, &mut handle)?;
            handle.flush()?;
        }
    }
    Ok(())
}

fn write_export<W: Write>(ledger: &LedgerRepository, kind: ExportKind, writer: W) -> SplitResult<()> {
    match kind {
        ExportKind::Expenses => export_expenses_csv(ledger, writer),
        ExportKind::Settlements => export_settlements_csv(ledger, writer),
        ExportKind::Full => export_full_json(ledger, writer),
    }
}
