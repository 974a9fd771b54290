use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Placeholder segment used in artifact names when no genre is selected.
pub const NO_GENRES: &str = "None";

/// Extension of every pre-rendered map artifact.
pub const ARTIFACT_EXTENSION: &str = "html";

/// Error returned when a label does not match any known option.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct ParseOptionError {
    pub kind: &'static str,
    pub value: String,
    pub expected: String,
}

/// Implements `label()`, `ALL`, `Display` and `FromStr` for a selection enum.
///
/// Parsing accepts the display label (case-insensitive) or the short alias.
macro_rules! selection_enum {
    ($name:ident, $kind:literal, [$(($variant:ident, $label:literal, $alias:literal)),+ $(,)?]) => {
        impl $name {
            /// All options in the order they are offered to the user.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Label shown to the user; also the segment used in artifact names.
            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            /// Short kebab-case alias, handy on the command line.
            pub fn alias(self) -> &'static str {
                match self {
                    $($name::$variant => $alias),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = ParseOptionError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|o| o.label().eq_ignore_ascii_case(s) || o.alias().eq_ignore_ascii_case(s))
                    .ok_or_else(|| ParseOptionError {
                        kind: $kind,
                        value: s.to_string(),
                        expected: $name::ALL
                            .iter()
                            .map(|o| o.label())
                            .collect::<Vec<_>>()
                            .join(", "),
                    })
            }
        }
    };
}

/// Spatial granularity of the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Geography {
    /// Broadcast range of every radio station.
    #[default]
    StationRange,
    County,
    CensusTract,
}

selection_enum!(Geography, "geography", [
    (StationRange, "Radio Station Broadcast Range", "station"),
    (County, "County", "county"),
    (CensusTract, "Census Tract", "tract"),
]);

/// What the map colors encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExposureMetric {
    /// Concentration of Hip Hop played over radio in 1997.
    #[default]
    Exposure1997,
    /// Year the tract or station was first exposed to Hip Hop.
    InitialExposureYear,
}

selection_enum!(ExposureMetric, "exposure metric", [
    (Exposure1997, "1997 Hip Hop Exposure", "1997"),
    (InitialExposureYear, "Year of Initial Exposure", "initial-year"),
]);

/// Broadcasting & Cable genre counted as "Hip Hop".
///
/// Declaration order is the canonical order used in artifact names.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Genre {
    HipHop,
    Black,
    UrbanContemporary,
}

selection_enum!(Genre, "genre", [
    (HipHop, "Hip Hop", "hip-hop"),
    (Black, "Black", "black"),
    (UrbanContemporary, "Urban Contemporary", "urban-contemporary"),
]);

/// Whether station concentrations are summed or averaged per geography.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Aggregation {
    #[default]
    Average,
    Sum,
}

selection_enum!(Aggregation, "aggregation", [
    (Average, "Average", "average"),
    (Sum, "Sum", "sum"),
]);

/// Whether station concentrations are weighted by station rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Weighting {
    #[default]
    NonWeighted,
    Weighted,
}

selection_enum!(Weighting, "weighting", [
    (NonWeighted, "Non-Weighted", "non-weighted"),
    (Weighted, "Weighted", "weighted"),
]);

/// Duplicate-free set of genres, always iterated in canonical order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GenreSet(BTreeSet<Genre>);

impl GenreSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, genre: Genre) -> bool {
        self.0.contains(&genre)
    }

    /// Returns `true` if the genre was not already present.
    pub fn insert(&mut self, genre: Genre) -> bool {
        self.0.insert(genre)
    }

    pub fn remove(&mut self, genre: Genre) -> bool {
        self.0.remove(&genre)
    }

    /// Add the genre if absent, remove it otherwise.
    pub fn toggle(&mut self, genre: Genre) {
        if !self.0.remove(&genre) {
            self.0.insert(genre);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Genre> + '_ {
        self.0.iter().copied()
    }

    /// Name segment: canonical-order labels joined by `_`, or [`NO_GENRES`].
    pub fn segment(&self) -> String {
        if self.0.is_empty() {
            return NO_GENRES.to_string();
        }
        self.iter().map(Genre::label).collect::<Vec<_>>().join("_")
    }
}

impl FromIterator<Genre> for GenreSet {
    fn from_iter<I: IntoIterator<Item = Genre>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[Genre; N]> for GenreSet {
    fn from(genres: [Genre; N]) -> Self {
        genres.into_iter().collect()
    }
}

/// Everything the user picked; the lookup key for a map artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Selection {
    pub geography: Geography,
    pub exposure: ExposureMetric,
    pub genres: GenreSet,
    pub aggregation: Aggregation,
    pub weighting: Weighting,
}

impl Selection {
    /// Aggregation and weighting only exist for County and Census Tract
    /// maps of the 1997 exposure score.
    pub fn has_score_options(&self) -> bool {
        matches!(self.geography, Geography::County | Geography::CensusTract)
            && self.exposure == ExposureMetric::Exposure1997
    }

    /// Aggregation that actually applies (forced to `Average` when the choice is hidden).
    pub fn effective_aggregation(&self) -> Aggregation {
        if self.has_score_options() {
            self.aggregation
        } else {
            Aggregation::Average
        }
    }

    /// Weighting that actually applies (forced to `Non-Weighted` when the choice is hidden).
    pub fn effective_weighting(&self) -> Weighting {
        if self.has_score_options() {
            self.weighting
        } else {
            Weighting::NonWeighted
        }
    }

    /// Whether the rendered map should carry the three-tier color legend.
    pub fn shows_legend(&self) -> bool {
        self.exposure == ExposureMetric::Exposure1997
    }

    /// Canonical file name of the artifact for this selection.
    ///
    /// ```
    /// use hiphop_map::models::*;
    ///
    /// let sel = Selection {
    ///     geography: Geography::County,
    ///     exposure: ExposureMetric::Exposure1997,
    ///     genres: GenreSet::from([Genre::Black, Genre::HipHop]),
    ///     aggregation: Aggregation::Sum,
    ///     weighting: Weighting::Weighted,
    /// };
    /// assert_eq!(
    ///     sel.artifact_name(),
    ///     "County_1997 Hip Hop Exposure_Hip Hop_Black_Sum_Weighted.html"
    /// );
    /// ```
    pub fn artifact_name(&self) -> String {
        format!(
            "{}_{}_{}_{}_{}.{}",
            self.geography,
            self.exposure,
            self.genres.segment(),
            self.effective_aggregation(),
            self.effective_weighting(),
            ARTIFACT_EXTENSION
        )
    }
}
