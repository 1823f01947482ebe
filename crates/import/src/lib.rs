pub mod csv;
pub mod ledger;
pub mod matcher;
pub mod normalize;
pub mod reconcile;
pub(crate) mod util;

pub use crate::csv::{read_ledger, read_ledger_file, write_ledger, CsvError, LedgerTable};
pub use ledger::{extract_master_data, prepare_source, MasterData, NameKind};
pub use matcher::{edit_distance_score, ngram_similarity, prefix_match_score, NameMatcher};
pub use normalize::{normalize, normalize_opt};
pub use reconcile::{annotate, match_name, match_rows, pick_name, ReconcileSummary, RowMatch};
pub use util::levenshtein_distance;

pub mod import {
    use crate::*;
    use nayose_core::MatcherConfig;

    /// Reads a source-ledger export and renames its sub-account columns.
    pub fn import_source(data: &[u8]) -> Result<LedgerTable, CsvError> {
        let mut table = read_ledger(data)?;
        prepare_source(&mut table);
        Ok(table)
    }

    /// Builds the master lists from any number of target-ledger exports.
    pub fn import_master<'a, I>(exports: I) -> Result<MasterData, CsvError>
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        let tables = exports
            .into_iter()
            .map(read_ledger)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(extract_master_data(&tables))
    }

    pub fn create_matcher(config: MatcherConfig) -> NameMatcher {
        NameMatcher::new(config)
    }
}
