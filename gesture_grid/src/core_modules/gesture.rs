// THEORY:
// A gesture, in this system, is nothing more than an ordered walk across grid
// regions: "start in region 0, end in region 3". The `gesture` module models those
// walks and answers one question about them: how far does the tracker's running
// history agree with this walk?
//
// Key architectural principles:
// 1.  **Capability, not Hierarchy**: Anything that can present an ordered list of
//     region indices is a `Pattern` and gets prefix matching for free. The stock
//     `GesturePattern` covers two-region swipes as well as longer walks.
// 2.  **Strict Prefix Matching**: A pattern is `Complete` only when the history is
//     exactly equal to it. A history that agrees on a leading run is `Partial`; a
//     history whose very first region differs is `None`. A history that runs past
//     the pattern length never completes, even if the pattern appears later on.
// 3.  **Immutable Catalog**: Patterns are built once at setup time and never
//     mutated. Progress lives in the tracker, not in the patterns, so the same
//     catalog can be re-checked against any history.
// 4.  **Declaration Order Matters**: The catalog is an ordered list, and when two
//     patterns would both complete on the same frame the one declared first wins.

use crate::error::ConfigError;
use std::fmt;
use tracing::warn;

/// The outcome of comparing a history against a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchState {
    /// The first visited region is not where the pattern starts.
    None,
    /// The history agrees with the pattern on a leading run of regions.
    Partial,
    /// The history is exactly the pattern.
    Complete,
}

/// An ordered sequence of region indices that can be matched against a history.
pub trait Pattern {
    fn fields(&self) -> &[usize];

    fn check(&self, history: &[usize]) -> MatchState {
        let fields = self.fields();
        if history == fields {
            return MatchState::Complete;
        }

        let matched = history
            .iter()
            .zip(fields)
            .take_while(|(visited, expected)| visited == expected)
            .count();

        if matched == 0 {
            MatchState::None
        } else {
            MatchState::Partial
        }
    }
}

/// A gesture defined by the regions it has to pass through, in order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GesturePattern {
    fields: Vec<usize>,
}

impl GesturePattern {
    pub const MIN_FIELDS: usize = 2;

    pub fn new(fields: Vec<usize>) -> Result<Self, ConfigError> {
        if fields.len() < Self::MIN_FIELDS {
            return Err(ConfigError::PatternTooShort(fields.len()));
        }
        Ok(Self { fields })
    }

    /// A move from region `from` to region `to`.
    pub fn two_region(from: usize, to: usize) -> Self {
        Self {
            fields: vec![from, to],
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Pattern for GesturePattern {
    fn fields(&self) -> &[usize] {
        &self.fields
    }
}

impl fmt::Display for GesturePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gesture {:?}", self.fields)
    }
}

/// How `Catalog::generate_all` bounds the region indices it pairs up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogBound {
    /// Indices `0..region_count`, the regions that actually exist. No pattern
    /// starts at the last region, so a history that begins there matches nothing
    /// and is never collapsed.
    Exact,
    /// Indices `0..=region_count`, one past the last region. The phantom pairs
    /// `[i, region_count]` can never complete, but they keep every real region a
    /// valid gesture start.
    #[default]
    Legacy,
}

/// An ordered list of gesture patterns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    patterns: Vec<GesturePattern>,
}

impl Catalog {
    /// Every two-region gesture over the grid: one pattern per unordered pair of
    /// distinct indices, written lower index first, in lexicographic order.
    pub fn generate_all(fields_in_row: usize, rows: usize, bound: CatalogBound) -> Self {
        let region_count = fields_in_row * rows;
        let upper = match bound {
            CatalogBound::Exact => {
                warn!(
                    region_count,
                    "exact catalog: visits that start in the last region never collapse"
                );
                region_count
            }
            CatalogBound::Legacy => region_count + 1,
        };

        let patterns = (0..upper)
            .flat_map(|from| (from + 1..upper).map(move |to| GesturePattern::two_region(from, to)))
            .collect();
        Self { patterns }
    }

    /// Wraps explicit patterns, checking that every index names a real region.
    pub fn from_patterns(
        patterns: Vec<GesturePattern>,
        region_count: usize,
    ) -> Result<Self, ConfigError> {
        if let Some(&index) = patterns
            .iter()
            .flat_map(|pattern| pattern.fields())
            .find(|&&index| index >= region_count)
        {
            return Err(ConfigError::PatternOutOfRange {
                index,
                region_count,
            });
        }
        Ok(Self { patterns })
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&GesturePattern> {
        self.patterns.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GesturePattern> {
        self.patterns.iter()
    }

    /// Checks every pattern against `history`, in declaration order.
    pub fn evaluate(&self, history: &[usize]) -> Vec<MatchState> {
        self.patterns.iter().map(|pattern| pattern.check(history)).collect()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a GesturePattern;
    type IntoIter = std::slice::Iter<'a, GesturePattern>;

    fn into_iter(self) -> Self::IntoIter {
        self.patterns.iter()
    }
}
