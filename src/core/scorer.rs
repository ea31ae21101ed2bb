/// Confidence scoring for retrieval hits
///
/// Turns a cosine distance into the percentage shown next to a match.

/// Scorer for display confidence
pub struct Scorer;

impl Scorer {
    /// Distance to a display percentage
    ///
    /// `round((1 - distance) * 100)`. Not a probability and not clamped:
    /// distances above 1.0 show as negative percentages.
    ///
    /// # Arguments
    /// * `distance` - Cosine distance, 0.0 for identical direction
    pub fn confidence_percent(distance: f64) -> i64 {
        ((1.0 - distance) * 100.0).round() as i64
    }
}
