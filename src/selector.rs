//! Identify which star candidate is most likely Polaris.
//!
//! Polaris has no unmistakable signature in a single frame, so selection is a
//! hand-tuned multi-factor heuristic rather than a catalog match:
//!
//! - it sits in the upper part of a north-facing frame (height score)
//! - it is fairly bright but not necessarily the brightest (brightness score)
//! - its neighborhood is sparsely populated (isolation score)
//!
//! Candidates are pre-filtered to the `top_k` brightest before scoring, and
//! isolation distances are computed only within that subset. The candidate
//! with the strictly greatest weighted score wins; the first one seen keeps
//! the crown on ties.

use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::StarCandidate;

/// Configuration for Polaris selection.
///
/// The three weights form a convex combination and must sum to 1.0, so every
/// total score stays in `[0, 1]`.
#[derive(Debug, Clone)]
pub struct SelectionConfig {
    /// How many of the brightest candidates to score. If more candidates
    /// exist, the rest are dropped before scoring (and before isolation
    /// distances are computed).
    /// Default: 30
    pub top_k: usize,

    /// Weight of the vertical-position score.
    /// Default: 0.4
    pub height_weight: f32,

    /// Weight of the brightness score.
    /// Default: 0.3
    pub brightness_weight: f32,

    /// Weight of the isolation score.
    /// Default: 0.3
    pub isolation_weight: f32,

    /// Number of nearest neighbors averaged for the isolation score. With
    /// fewer neighbors available, all of them are averaged.
    /// Default: 5
    pub isolation_neighbors: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            top_k: 30,
            height_weight: 0.4,
            brightness_weight: 0.3,
            isolation_weight: 0.3,
            isolation_neighbors: 5,
        }
    }
}

/// Per-candidate score record, kept for diagnostics.
///
/// All component scores and the total are in `[0, 1]`.
#[derive(Debug, Clone)]
pub struct ScoreBreakdown {
    pub candidate: StarCandidate,
    /// Rewards vertical position nearer the top of the frame; 0.5 at the
    /// exact vertical center.
    pub height_score: f32,
    /// Mean region brightness normalized by 255.
    pub brightness_score: f32,
    /// Mean distance to the nearest neighbors, normalized by the square
    /// diagonal of the frame.
    pub isolation_score: f32,
    /// Convex-weighted sum of the three components.
    pub total_score: f32,
}

/// Outcome of Polaris selection.
#[derive(Debug, Clone)]
pub struct SelectionResult {
    /// The winning candidate.
    pub chosen: StarCandidate,
    /// The winner's total score.
    pub score: f32,
    /// Number of candidates actually scored (after the top-k pre-filter).
    pub candidate_count: usize,
    /// Score breakdown for every scored candidate, in descending brightness
    /// order (ties keep detection order).
    pub trace: Vec<ScoreBreakdown>,
}

/// Pick the candidate most likely to be Polaris.
///
/// `image_height` is the pixel height of the source frame; it anchors both
/// the vertical-position score and the isolation normalization.
///
/// Fails with [`PipelineError::NoCandidates`] when `candidates` is empty.
pub fn select_polaris(
    candidates: &[StarCandidate],
    image_height: u32,
    config: &SelectionConfig,
) -> Result<SelectionResult> {
    if candidates.is_empty() {
        return Err(PipelineError::NoCandidates { image_height });
    }

    // ── Pre-filter: top-k brightest, stable on ties ──
    let mut subset: Vec<StarCandidate> = candidates.to_vec();
    subset.sort_by(|a, b| {
        b.brightness
            .partial_cmp(&a.brightness)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    subset.truncate(config.top_k);

    let height = image_height as f32;
    // Square-diagonal normalization: the expected maximum neighbor distance
    // uses the frame height for both axes
    let max_neighbor_dist = height.hypot(height);

    let mut trace: Vec<ScoreBreakdown> = Vec::with_capacity(subset.len());
    let mut best_idx = 0usize;
    let mut best_score = -1.0f32;

    for (i, candidate) in subset.iter().enumerate() {
        let vertical_position = (height / 2.0 - candidate.y()) / height;
        let height_score = (vertical_position + 0.5).clamp(0.0, 1.0);

        let brightness_score = (candidate.brightness / 255.0).clamp(0.0, 1.0);

        let isolation_score =
            isolation_score(i, &subset, max_neighbor_dist, config.isolation_neighbors);

        let total_score = config.height_weight * height_score
            + config.brightness_weight * brightness_score
            + config.isolation_weight * isolation_score;

        trace.push(ScoreBreakdown {
            candidate: candidate.clone(),
            height_score,
            brightness_score,
            isolation_score,
            total_score,
        });

        // Strict comparison: the first candidate to reach a score keeps it
        if total_score > best_score {
            best_score = total_score;
            best_idx = i;
        }
    }

    let chosen = subset[best_idx].clone();
    debug!(
        "selected Polaris candidate at ({:.1}, {:.1}) with score {:.3} ({} scored)",
        chosen.x(),
        chosen.y(),
        best_score,
        subset.len()
    );

    Ok(SelectionResult {
        chosen,
        score: best_score,
        candidate_count: subset.len(),
        trace,
    })
}

/// Mean distance to the `k` nearest neighbors within `subset`, normalized and
/// clamped to `[0, 1]`. With fewer than `k` neighbors, all available are
/// averaged; a lone candidate scores 0.
fn isolation_score(idx: usize, subset: &[StarCandidate], max_dist: f32, k: usize) -> f32 {
    let mut distances: Vec<f32> = subset
        .iter()
        .enumerate()
        .filter(|&(j, _)| j != idx)
        .map(|(_, other)| subset[idx].distance_to(other))
        .collect();

    if distances.is_empty() {
        return 0.0;
    }

    let avg = if distances.len() < k {
        distances.iter().sum::<f32>() / distances.len() as f32
    } else {
        distances.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        distances[..k].iter().sum::<f32>() / k as f32
    };

    (avg / max_dist).clamp(0.0, 1.0)
}
