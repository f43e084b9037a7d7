//! Age-protocol resolution.

use crate::rules::{AgeBand, BucketScores, ScoringRules};

/// Resolve the bucket mapping applicable at `age_months`.
///
/// Bands are closed intervals. When an age sits on a shared boundary, the
/// band whose lower bound equals the age wins (lower-inclusive); otherwise
/// the first covering band in declaration order wins. Returns `None` when no
/// band covers the age — an explicit no-coverage outcome, not an error.
pub fn resolve_band(rules: &ScoringRules, age_months: u32) -> Option<&BucketScores> {
    match rules {
        ScoringRules::Uniform { buckets } => Some(buckets),
        ScoringRules::ByAge { age_bands } => {
            resolve_age_band(age_bands, age_months).map(|band| &band.buckets)
        }
    }
}

fn resolve_age_band(bands: &[AgeBand], age_months: u32) -> Option<&AgeBand> {
    let mut chosen: Option<&AgeBand> = None;
    for band in bands.iter().filter(|b| b.covers(age_months)) {
        match chosen {
            None => chosen = Some(band),
            Some(current) => {
                if band.min_months == age_months && current.min_months != age_months {
                    chosen = Some(band);
                }
            }
        }
    }
    chosen
}
