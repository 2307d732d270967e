use std::fs;
use std::io::Write;

use anyhow::Context;
use rootify_store::{parse_csv, preview_import};

use crate::cli::Command;
use crate::service::RootService;

/// Run one command, writing user-facing output to `out`.
///
/// Returns `Ok(false)` when the command ran but the answer is negative
/// (incomplete translation, nothing to import).
pub fn execute(command: Command, service: &RootService, out: &mut impl Write) -> anyhow::Result<bool> {
    match command {
        Command::List { search, json } => {
            let roots = match search.as_deref() {
                Some(term) => service.store().search(term)?,
                None => service.store().entries()?,
            };
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&roots)?)?;
            } else {
                for root in &roots {
                    writeln!(out, "{}\t{}", root.chinese, root.english)?;
                }
            }
            tracing::info!("Listed {} roots", roots.len());
        }
        Command::Add { chinese, english } => {
            service.add_root(&chinese, &english)?;
            writeln!(out, "{chinese} -> {english}")?;
        }
        Command::Delete { chinese } => {
            if service.delete_root(&chinese)? {
                writeln!(out, "Deleted {chinese}")?;
            } else {
                writeln!(out, "{chinese} not found")?;
            }
        }
        Command::Clear => {
            let removed = service.clear_all_roots()?;
            writeln!(out, "Deleted {removed} roots")?;
        }
        Command::Import { file, dry_run } => {
            let content = fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let rows = parse_csv(&content);
            if rows.is_empty() {
                writeln!(out, "No word roots found in {}", file.display())?;
                return Ok(false);
            }

            if dry_run {
                let existing = service.get_all_roots()?;
                for item in preview_import(&rows, &existing) {
                    writeln!(out, "{}\t{}\t{}", item.action.as_str(), item.chinese, item.english)?;
                }
            } else {
                let applied = service.import_roots(rows)?;
                writeln!(out, "Imported {applied} roots")?;
            }
        }
        Command::Export { output } => {
            let csv = service.export_roots()?;
            match output {
                Some(path) => {
                    fs::write(&path, csv)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    writeln!(out, "Exported to {}", path.display())?;
                }
                None => write!(out, "{csv}")?,
            }
        }
        Command::Segment { text, json } => {
            let segments = service.segment_text(&text)?;
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&segments)?)?;
            } else {
                for segment in &segments {
                    let english = if segment.is_unknown { "?" } else { segment.english.as_str() };
                    writeln!(out, "{}\t{}", segment.chinese, english)?;
                }
            }
        }
        Command::Translate { text } => {
            writeln!(out, "{}", service.translate_text(&text)?)?;
        }
        Command::Check { text } => {
            let complete = service.is_translation_complete(&text)?;
            writeln!(out, "{}", if complete { "complete" } else { "incomplete" })?;
            return Ok(complete);
        }
    }

    Ok(true)
}
