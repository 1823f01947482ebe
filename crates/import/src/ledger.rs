//! Column conventions of the two ledger formats.
//!
//! The source export files counterparties under sub-account columns; the
//! target ledger's journal export names them explicitly. Departments use the
//! same column names in both.

use nayose_core::MasterCandidateSet;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::csv::LedgerTable;

/// Sub-account columns in the source export, renamed on load.
pub const SOURCE_RENAMES: &[(&str, &str)] = &[
    ("借方補助科目", "借方取引先"),
    ("貸方補助科目", "貸方取引先"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NameKind {
    Partner,
    Department,
}

impl NameKind {
    pub const ALL: [NameKind; 2] = [NameKind::Partner, NameKind::Department];

    /// `(debit, credit)` columns holding this name in a prepared source table.
    pub fn source_columns(self) -> (&'static str, &'static str) {
        match self {
            NameKind::Partner => ("借方取引先", "貸方取引先"),
            NameKind::Department => ("借方部門", "貸方部門"),
        }
    }

    /// `(debit, credit)` columns holding this name in a target-ledger export.
    pub fn master_columns(self) -> (&'static str, &'static str) {
        match self {
            NameKind::Partner => ("借方取引先名", "貸方取引先名"),
            NameKind::Department => ("借方部門", "貸方部門"),
        }
    }

    fn label(self) -> &'static str {
        match self {
            NameKind::Partner => "取引先",
            NameKind::Department => "部門",
        }
    }

    /// Header for the name that was looked up.
    pub fn original_header(self) -> String {
        format!("元の{}", self.label())
    }

    /// Header for the `rank`-th suggestion, counting from 1.
    pub fn candidate_header(self, rank: usize) -> String {
        format!("{}候補{}", self.label(), rank)
    }

    pub fn exact_header(self) -> String {
        format!("{}完全一致", self.label())
    }

    /// True for any column `annotate` writes for this kind, whatever `top_n`
    /// produced it.
    pub fn is_output_header(self, header: &str) -> bool {
        if header == self.original_header() || header == self.exact_header() {
            return true;
        }
        header
            .strip_prefix(self.label())
            .and_then(|rest| rest.strip_prefix("候補"))
            .is_some_and(|rank| !rank.is_empty() && rank.bytes().all(|b| b.is_ascii_digit()))
    }
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameKind::Partner => write!(f, "partner"),
            NameKind::Department => write!(f, "department"),
        }
    }
}

impl std::str::FromStr for NameKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "partner" | "partners" => Ok(NameKind::Partner),
            "department" | "departments" => Ok(NameKind::Department),
            other => Err(format!("Unknown name kind: '{other}'")),
        }
    }
}

/// Master lists collected from the target ledger's journal exports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MasterData {
    pub partners: MasterCandidateSet,
    pub departments: MasterCandidateSet,
}

impl MasterData {
    pub fn get(&self, kind: NameKind) -> &MasterCandidateSet {
        match kind {
            NameKind::Partner => &self.partners,
            NameKind::Department => &self.departments,
        }
    }
}

/// Renames the source export's sub-account columns to counterparty columns.
pub fn prepare_source(table: &mut LedgerTable) {
    table.rename_columns(SOURCE_RENAMES);
}

/// Unions the non-blank partner and department names across every export.
/// Exports lacking a column simply contribute nothing for it.
pub fn extract_master_data(tables: &[LedgerTable]) -> MasterData {
    let collect = |kind: NameKind| -> MasterCandidateSet {
        let (debit, credit) = kind.master_columns();
        tables
            .iter()
            .flat_map(|t| {
                let debits = t.column(debit).into_iter().flatten();
                let credits = t.column(credit).into_iter().flatten();
                debits.chain(credits)
            })
            .collect()
    };

    MasterData {
        partners: collect(NameKind::Partner),
        departments: collect(NameKind::Department),
    }
}
