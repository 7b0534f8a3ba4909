//! Landmark comparison.
//!
//! Two landmark sets match when the Euclidean distance between them is
//! strictly below [`MATCH_THRESHOLD`].

use serde::Serialize;

use crate::error::MatchError;

/// Distance below which two landmark sets belong to the same face.
pub const MATCH_THRESHOLD: f64 = 1.0;

/// Result of comparing submitted landmarks with an enrolled profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchOutcome {
    /// Euclidean distance between the two sets.
    pub distance: f64,
    /// Whether the distance is under the threshold.
    pub matched: bool,
}

/// Euclidean norm of `a - b`.
///
/// Both slices must hold the same number of coordinates.
pub fn distance(a: &[f64], b: &[f64]) -> Result<f64, MatchError> {
    if a.len() != b.len() {
        return Err(MatchError::DimensionMismatch {
            stored: a.len(),
            submitted: b.len(),
        });
    }

    let sum: f64 = a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum();
    Ok(sum.sqrt())
}

/// Whether `distance` counts as a match.
pub fn is_match(distance: f64) -> bool {
    distance < MATCH_THRESHOLD
}

/// Compare enrolled landmarks with submitted ones.
pub fn verify(stored: &[f64], submitted: &[f64]) -> Result<MatchOutcome, MatchError> {
    let distance = distance(stored, submitted)?;
    Ok(MatchOutcome {
        distance,
        matched: is_match(distance),
    })
}
