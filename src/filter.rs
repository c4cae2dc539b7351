//! Candidate filtering and ranking ahead of scoring.
//!
//! Removes icon-scale images and orders the survivors so the scorer only
//! spends network and model budget on the most promising few.

use crate::harvest::ImageCandidate;

/// Minimum pixel area for the area-based inclusion rule.
const MIN_AREA: u64 = 100;

/// Minimum single-dimension size for the dimension-based inclusion rules.
const MIN_DIMENSION: u32 = 10;

/// Whether a candidate passes any one of the inclusion rules.
///
/// The rules are a true disjunction: a large enough area, or either
/// dimension alone above the threshold, qualifies on its own. Candidates
/// with no known dimensions are kept; their usefulness is decided later
/// by size-based scoring.
fn is_eligible(candidate: &ImageCandidate) -> bool {
    if candidate.area().is_some_and(|area| area > MIN_AREA) {
        return true;
    }
    candidate.width.is_some_and(|w| w > MIN_DIMENSION)
        || candidate.height.is_some_and(|h| h > MIN_DIMENSION)
        || (candidate.width.is_none() && candidate.height.is_none())
}

/// Filter and rank harvested candidates, truncating to `max_candidates`.
///
/// Ordering: known-area candidates first, by area descending; width
/// descending as tiebreak; otherwise the stable harvest order is kept, so
/// dimension-less candidates trail in discovery order.
#[must_use]
pub fn filter(images: Vec<ImageCandidate>, max_candidates: usize) -> Vec<ImageCandidate> {
    let mut eligible: Vec<ImageCandidate> = images.into_iter().filter(is_eligible).collect();

    eligible.sort_by(|a, b| {
        let area_order = match (a.area(), b.area()) {
            (Some(area_a), Some(area_b)) => area_b.cmp(&area_a),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        };
        area_order.then_with(|| match (a.width, b.width) {
            (Some(width_a), Some(width_b)) => width_b.cmp(&width_a),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        })
    });

    eligible.truncate(max_candidates);
    eligible
}
