//! Run summary printing.

use std::io::{self, Write};
use std::path::Path;

use colored::Colorize;

use crate::migration::MigrationReport;

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

pub fn print_summary(report: &MigrationReport, output_dir: &Path) {
    print_summary_to(report, output_dir, &mut io::stdout().lock());
}

/// Print the per-target counts and where the lists went.
pub fn print_summary_to<W: Write>(report: &MigrationReport, output_dir: &Path, writer: &mut W) {
    if report.targets.is_empty() {
        let _ = writeln!(
            writer,
            "{} {}",
            "warning:".bold().yellow(),
            "No source activation keys were mapped, nothing written"
        );
        return;
    }

    for target in &report.targets {
        let _ = writeln!(
            writer,
            "{} {}  {} Windows, {} Linux, {} incompatible ({} source {})",
            SUCCESS_MARK.green(),
            target.target_id.bold(),
            target.windows,
            target.linux,
            target.incompatible,
            target.source_ids.len(),
            if target.source_ids.len() == 1 { "key" } else { "keys" }
        );
    }

    let lists = report.targets.len() * 3;
    let _ = writeln!(
        writer,
        "{}",
        format!(
            "Wrote {} {} ({} {}) to {}",
            lists,
            if lists == 1 { "list" } else { "lists" },
            report.total_assets(),
            if report.total_assets() == 1 { "asset" } else { "assets" },
            output_dir.display()
        )
        .green()
    );
}

pub fn print_error(err: &anyhow::Error) {
    print_error_to(err, &mut io::stderr().lock());
}

pub fn print_error_to<W: Write>(err: &anyhow::Error, writer: &mut W) {
    let _ = writeln!(
        writer,
        "{} {} {:#}",
        FAILURE_MARK.red(),
        "error:".bold().red(),
        err
    );
}
