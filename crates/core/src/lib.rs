pub mod config;
pub mod name;
pub mod similarity;

pub use config::{ConfigError, MatcherConfig};
pub use name::{MasterCandidateSet, NormalizedName};
pub use similarity::{RankedCandidateList, SimilarityResult};
