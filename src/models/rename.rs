//! Rename approval data models.

use serde::{Deserialize, Serialize};

use super::media::{MetadataMatch, ParsedTitle};

/// A rename suggested through the AI fallback, waiting for an operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRename {
    /// Catalog video ID.
    pub id: String,
    pub original_name: String,
    pub suggested_name: String,
    /// What the AI extracted from the original name.
    pub parsed_by_ai: ParsedTitle,
    /// What TMDB returned for that extraction.
    pub matched_with_tmdb: MetadataMatch,
}
