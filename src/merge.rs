use std::mem;

use tracing::{debug, warn};

use crate::metadata::QualifyingPages;
use crate::model::{MergeKey, MergedTable, RawTableFragment, TaggedFragment};
use crate::profile::FormatProfile;
use crate::warning::{NormalizeWarning, WarningCode};

/// Run-length merge over fragments in page order.
///
/// Only a fragment whose merge key equals the one immediately before it is
/// appended; any change seals the current table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MergeState {
    #[default]
    Empty,
    Accumulating {
        key: MergeKey,
        table: MergedTable,
    },
}

impl MergeState {
    /// Consumes one fragment and returns the table it sealed, if any.
    pub fn push(&mut self, fragment: TaggedFragment) -> Option<MergedTable> {
        let key = fragment.metadata.merge_key();
        match self {
            Self::Accumulating {
                key: current,
                table,
            } if *current == key => {
                table.pages.push(fragment.page);
                table.table.append(fragment.table);
                None
            }
            _ => {
                let next = Self::Accumulating {
                    key,
                    table: MergedTable {
                        metadata: fragment.metadata,
                        pages: vec![fragment.page],
                        table: fragment.table,
                    },
                };
                mem::replace(self, next).finish()
            }
        }
    }

    /// Seals whatever is accumulated. Empty tables are dropped.
    #[must_use]
    pub fn finish(self) -> Option<MergedTable> {
        match self {
            Self::Empty => None,
            Self::Accumulating { table, .. } => (!table.table.is_empty()).then_some(table),
        }
    }
}

#[must_use]
pub fn merge_fragments(fragments: impl IntoIterator<Item = TaggedFragment>) -> Vec<MergedTable> {
    let mut state = MergeState::Empty;
    let mut merged = fragments
        .into_iter()
        .filter_map(|fragment| state.push(fragment))
        .collect::<Vec<_>>();
    merged.extend(state.finish());
    merged
}

/// Pairs fragments with their page metadata, dropping any without the
/// profile's anchor column.
pub(crate) fn tag_fragments(
    fragments: Vec<RawTableFragment>,
    qualifying: &QualifyingPages,
    profile: &FormatProfile,
    warnings: &mut Vec<NormalizeWarning>,
) -> Vec<TaggedFragment> {
    let mut tagged = Vec::with_capacity(fragments.len());

    for fragment in fragments {
        if !fragment.table.has_column(profile.anchor_column) {
            warn!(
                page = fragment.page,
                anchor = profile.anchor_column,
                "skipping table without anchor column"
            );
            warnings.push(
                NormalizeWarning::new(
                    WarningCode::MissingAnchorColumn,
                    format!("table lacks the '{}' column", profile.anchor_column),
                )
                .with_page(fragment.page),
            );
            continue;
        }

        let Some(metadata) = qualifying.metadata.get(&fragment.page) else {
            debug!(page = fragment.page, "skipping table from a non-qualifying page");
            continue;
        };

        tagged.push(TaggedFragment {
            page: fragment.page,
            metadata: metadata.clone(),
            table: fragment.table,
        });
    }

    tagged
}
