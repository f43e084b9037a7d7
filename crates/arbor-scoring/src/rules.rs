use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ScoringError;

/// Scores keyed by normalized answer bucket (e.g. "YES" → 0, "NO" → 4).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BucketScores(pub BTreeMap<String, i64>);

impl BucketScores {
    pub fn score_for(&self, bucket: &str) -> Option<i64> {
        self.0.get(bucket).copied()
    }

    /// The best score obtainable from this mapping.
    pub fn max_score(&self) -> i64 {
        self.0.values().copied().max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One bracket of an age-dependent protocol. Bounds are whole months,
/// closed on both ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AgeBand {
    pub min_months: u32,
    pub max_months: u32,
    pub buckets: BucketScores,
}

impl AgeBand {
    pub fn covers(&self, age_months: u32) -> bool {
        age_months >= self.min_months && age_months <= self.max_months
    }
}

/// The validated shape of a question's `scoring_logic` blob.
///
/// Stored as open-ended JSON; parsed here once and treated as typed data
/// everywhere downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export)]
pub enum ScoringRules {
    /// `{"buckets": {...}}` — one mapping for every age.
    Uniform { buckets: BucketScores },
    /// `{"age_bands": [...]}` — mappings that vary by age bracket.
    ByAge { age_bands: Vec<AgeBand> },
}

impl ScoringRules {
    /// Parse and validate a raw `scoring_logic` blob.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, ScoringError> {
        let rules: ScoringRules =
            serde_json::from_value(value.clone()).map_err(|e| ScoringError::InvalidRules {
                detail: e.to_string(),
            })?;
        rules.validate()?;
        Ok(rules)
    }

    fn validate(&self) -> Result<(), ScoringError> {
        match self {
            ScoringRules::Uniform { buckets } => {
                if buckets.is_empty() {
                    return Err(ScoringError::InvalidRules {
                        detail: "empty bucket mapping".to_string(),
                    });
                }
            }
            ScoringRules::ByAge { age_bands } => {
                if age_bands.is_empty() {
                    return Err(ScoringError::InvalidRules {
                        detail: "no age bands".to_string(),
                    });
                }
                for band in age_bands {
                    if band.min_months > band.max_months {
                        return Err(ScoringError::InvalidRules {
                            detail: format!(
                                "age band {}-{} months is inverted",
                                band.min_months, band.max_months
                            ),
                        });
                    }
                    if band.buckets.is_empty() {
                        return Err(ScoringError::InvalidRules {
                            detail: format!(
                                "empty bucket mapping for age band {}-{} months",
                                band.min_months, band.max_months
                            ),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
