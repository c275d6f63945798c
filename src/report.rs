//! The report assembler (C7): turns an `AnalysisResult` into the three
//! external artifacts -- a structured JSON report, a sorted name-only
//! text list, and a console summary -- and writes the two file outputs
//! atomically (temp file + rename).
//!
//! Grounded in original_source's `report_generator.py`
//! (`generate_json`/`generate_txt`/`print_summary`) and in the teacher's
//! use of `tempfile` for crash-safe output writing.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tempfile::NamedTempFile;

use crate::engine::{AnalysisResult, Reason};
use crate::error::{ErrorKind, ResultExt, Result};
use crate::graph::{Location, SymbolGraph};

#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    pub id: String,
    pub name: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    pub reasons: Vec<Reason>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub total_analyzed: usize,
    pub total_excluded: usize,
    pub excluded: Vec<ReportEntry>,
}

/// Assembles the structured report from an analysis result. Node
/// indices that no longer resolve in the graph are silently dropped, as
/// in the original's `get_results` (which tolerates ids absent from the
/// graph rather than erroring).
pub fn assemble(graph: &SymbolGraph, result: &AnalysisResult) -> Report {
    let mut excluded: Vec<ReportEntry> = result
        .matched_nodes()
        .filter_map(|idx| {
            let node = graph.node(idx)?;
            let reasons = result.reasons_for(idx)?.to_vec();
            Some(ReportEntry {
                id: node.id.clone(),
                name: node.name.clone(),
                kind: node.kind.clone(),
                location: node.location.clone(),
                reasons,
            })
        })
        .collect();

    // Deterministic output regardless of hash-map iteration order.
    excluded.sort_by(|a, b| a.id.cmp(&b.id));

    Report {
        total_analyzed: graph.node_count(),
        total_excluded: excluded.len(),
        excluded,
    }
}

/// The plain name list: excluded symbol names, sorted and de-duplicated.
pub fn name_list(report: &Report) -> Vec<String> {
    let mut names: Vec<String> = report.excluded.iter().map(|e| e.name.clone()).collect();
    names.sort();
    names.dedup();
    names
}

/// Counts of each rule's matches, sorted descending by count (ties
/// broken by declaration order), truncated to the top 5 -- matches
/// `report_generator.py::print_summary`'s "TOP 5 EXCLUSION REASONS".
pub fn top_rules(result: &AnalysisResult, limit: usize) -> Vec<(String, usize)> {
    let mut counts = result.rule_match_counts.clone();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(limit);
    counts
}

/// Renders the console summary text (totals, exclusion rate, top 5
/// rules). The binary is responsible for actually printing this; the
/// library only builds the string so it stays testable without
/// capturing stdout.
pub fn summary(report: &Report, result: &AnalysisResult) -> String {
    let total = report.total_analyzed;
    let excluded = report.total_excluded;
    let safe = total.saturating_sub(excluded);
    let rate = if total == 0 {
        0.0
    } else {
        (excluded as f64 / total as f64) * 100.0
    };

    let mut out = String::new();
    out.push_str(&format!("Symbols analyzed: {}\n", total));
    out.push_str(&format!("Symbols excluded: {}\n", excluded));
    out.push_str(&format!("Symbols safe to obfuscate: {}\n", safe));
    out.push_str(&format!("Exclusion rate: {:.1}%\n", rate));
    out.push_str("Top 5 exclusion reasons:\n");

    for (rank, (rule_id, count)) in top_rules(result, 5).into_iter().enumerate() {
        out.push_str(&format!("  {}. {} ({} symbol(s))\n", rank + 1, rule_id, count));
    }

    out
}

/// Writes `contents` to `path` atomically: a temp file in the same
/// directory, then a rename, so a crash mid-write never leaves a
/// truncated output file behind.
fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());

    let mut tmp = match dir {
        Some(dir) => NamedTempFile::new_in(dir),
        None => NamedTempFile::new(),
    }
    .context(ErrorKind::OutputUnwritable(path.to_path_buf()))?;

    tmp.write_all(contents)
        .context(ErrorKind::OutputUnwritable(path.to_path_buf()))?;

    tmp.persist(path)
        .context(ErrorKind::OutputUnwritable(path.to_path_buf()))?;

    Ok(())
}

/// Writes the structured JSON report to `path`, atomically.
pub fn write_json_report(report: &Report, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)
        .context(ErrorKind::OutputUnwritable(path.to_path_buf()))?;
    write_atomic(path, json.as_bytes())
}

/// Writes the sorted name list, one name per line, atomically.
pub fn write_name_list(names: &[String], path: &Path) -> Result<()> {
    let mut text = names.join("\n");
    if !text.is_empty() {
        text.push('\n');
    }
    write_atomic(path, text.as_bytes())
}
