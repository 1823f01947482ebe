use nayose_core::{MasterCandidateSet, SimilarityResult};
use rayon::prelude::*;
use serde::Serialize;

use crate::csv::{CsvError, LedgerTable};
use crate::ledger::{MasterData, NameKind};
use crate::matcher::NameMatcher;

/// What reconciliation found for one row and one kind of name.
#[derive(Debug, Clone, PartialEq)]
pub enum RowMatch {
    /// Neither the debit nor the credit side carried a name.
    Blank,
    /// The name is already in the master list, verbatim.
    Exact { name: String },
    /// Best fuzzy candidates, best first.
    Suggested {
        name: String,
        candidates: Vec<SimilarityResult>,
    },
}

impl RowMatch {
    pub fn name(&self) -> Option<&str> {
        match self {
            RowMatch::Blank => None,
            RowMatch::Exact { name } | RowMatch::Suggested { name, .. } => Some(name),
        }
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, RowMatch::Exact { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    pub kind: NameKind,
    pub rows: usize,
    pub exact: usize,
    pub suggested: usize,
    pub blank: usize,
}

/// The credit-side name wins when both sides are filled.
///
/// A cell holding only whitespace counts as blank, so a whitespace-only
/// credit cell falls back to the debit side instead of winning as a
/// non-empty string would.
pub fn pick_name<'a>(debit: Option<&'a str>, credit: Option<&'a str>) -> Option<&'a str> {
    let filled = |v: Option<&'a str>| v.filter(|s| !s.trim().is_empty());
    filled(credit).or_else(|| filled(debit))
}

/// Verbatim hits skip fuzzy scoring entirely.
pub fn match_name(
    name: Option<&str>,
    master: &MasterCandidateSet,
    matcher: &NameMatcher,
) -> RowMatch {
    match name {
        None => RowMatch::Blank,
        Some(name) if master.contains(name) => RowMatch::Exact {
            name: name.to_string(),
        },
        Some(name) => RowMatch::Suggested {
            name: name.to_string(),
            candidates: matcher.suggest(name, master),
        },
    }
}

/// Matches one kind of name on every row. Rows are independent and the
/// master set is shared read-only, so the work fans out across threads.
pub fn match_rows(
    table: &LedgerTable,
    kind: NameKind,
    master: &MasterCandidateSet,
    matcher: &NameMatcher,
) -> (Vec<RowMatch>, ReconcileSummary) {
    let (debit, credit) = kind.source_columns();
    let debit_idx = table.column_index(debit);
    let credit_idx = table.column_index(credit);

    let matches: Vec<RowMatch> = table
        .rows()
        .par_iter()
        .map(|row| {
            let cell = |idx: Option<usize>| idx.map(|i| row[i].as_str());
            match_name(pick_name(cell(debit_idx), cell(credit_idx)), master, matcher)
        })
        .collect();

    let mut summary = ReconcileSummary {
        kind,
        rows: matches.len(),
        exact: 0,
        suggested: 0,
        blank: 0,
    };
    for m in &matches {
        match m {
            RowMatch::Blank => summary.blank += 1,
            RowMatch::Exact { .. } => summary.exact += 1,
            RowMatch::Suggested { .. } => summary.suggested += 1,
        }
    }

    (matches, summary)
}

/// Appends the original name, `top_n` suggestion columns and an exact-match
/// flag for every kind whose master list is non-empty.
///
/// Columns left by an earlier run are dropped first, so annotating an
/// annotated export replaces them rather than duplicating headers.
pub fn annotate(
    table: &mut LedgerTable,
    master: &MasterData,
    matcher: &NameMatcher,
) -> Result<Vec<ReconcileSummary>, CsvError> {
    let slots = matcher.config().top_n;
    let mut summaries = Vec::new();

    for kind in NameKind::ALL {
        let names = master.get(kind);
        if names.is_empty() {
            tracing::debug!(%kind, "master list empty, skipping");
            continue;
        }

        let stale = table.retain_columns(|h| !kind.is_output_header(h));
        if stale > 0 {
            tracing::debug!(%kind, columns = stale, "replacing earlier annotation");
        }

        let (matches, summary) = match_rows(table, kind, names, matcher);
        tracing::info!(
            %kind,
            rows = summary.rows,
            exact = summary.exact,
            suggested = summary.suggested,
            blank = summary.blank,
            "reconciled names"
        );

        let originals = matches
            .iter()
            .map(|m| m.name().unwrap_or_default().to_string())
            .collect();
        table.push_column(&kind.original_header(), originals)?;

        for slot in 0..slots {
            let column = matches
                .iter()
                .map(|m| match m {
                    RowMatch::Suggested { candidates, .. } => candidates
                        .get(slot)
                        .map(|c| c.candidate.clone())
                        .unwrap_or_default(),
                    _ => String::new(),
                })
                .collect();
            table.push_column(&kind.candidate_header(slot + 1), column)?;
        }

        let flags = matches
            .iter()
            .map(|m| (if m.is_exact() { "TRUE" } else { "FALSE" }).to_string())
            .collect();
        table.push_column(&kind.exact_header(), flags)?;

        summaries.push(summary);
    }

    Ok(summaries)
}
