//! Plain-text rendering of answers and their sources.

use std::fmt::Write;

use ragqa_core::{ScoredSource, Turn};

const RULE: &str = "────────────────────────────────────────";

/// Render the answer followed by a ranked source list.
///
/// Each source shows its confidence, relevance and a preview of its text; with
/// `full` the complete chunk text replaces the preview.
pub fn render_turn(turn: &Turn, full: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}\n", turn.answer);
    if turn.sources.is_empty() {
        let _ = writeln!(out, "(no sources retrieved)");
        return out;
    }
    let _ = writeln!(out, "Sources ({}):", turn.sources.len());
    for source in &turn.sources {
        out.push_str(&render_source(source, full));
    }
    out
}

/// Render a single ranked source.
pub fn render_source(source: &ScoredSource, full: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "  [{}] confidence {:.2}  relevance {:.2}  length {:.2}",
        source.rank, source.confidence, source.relevance_score, source.length_factor
    );
    let body = if full {
        source.chunk.text.clone()
    } else {
        source.preview(ScoredSource::PREVIEW_CHARS)
    };
    for line in body.lines() {
        let _ = writeln!(out, "      {line}");
    }
    let mut metadata: Vec<_> = source.chunk.metadata.iter().collect();
    metadata.sort();
    for (key, value) in metadata {
        let _ = writeln!(out, "      {key}: {value}");
    }
    out
}

/// Render every source of `turn` in full, in the order the retriever returned
/// them, followed by confidence statistics.
pub fn render_analysis(turn: &Turn) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}\nQuestion: {}\n{RULE}", turn.question);
    let mut sources: Vec<&ScoredSource> = turn.sources.iter().collect();
    sources.sort_by_key(|source| source.retrieval_index);
    for source in sources {
        let _ = writeln!(
            out,
            "Source Document {} (rank {})",
            source.retrieval_index + 1,
            source.rank
        );
        out.push_str(&render_source(source, true));
    }
    match turn.confidence_summary() {
        Some(summary) => {
            let _ = writeln!(out, "{RULE}");
            let _ = writeln!(out, "Sources analysed:   {}", summary.source_count);
            let _ = writeln!(out, "Average confidence: {:.2}", summary.average);
            let _ = writeln!(out, "Highest confidence: {:.2}", summary.highest);
            let _ = writeln!(out, "Lowest confidence:  {:.2}", summary.lowest);
        }
        None => {
            let _ = writeln!(out, "(no sources retrieved)");
        }
    }
    out
}
