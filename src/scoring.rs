//! Agreement metrics between a parsed ordering and the ground truth.
//!
//! Two numbers per answer: an exact-match score and Kendall's tau-b over the
//! ground-truth ranks of whatever the answer managed to name. Scoring never
//! fails; degenerate inputs map to fixed fallback values.

use serde::{Deserialize, Serialize};
use statrs::function::erf::erfc;
use tracing::warn;

/// Kendall tau-b and its two-sided p-value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankCorrelation {
    pub tau: f64,
    pub p_value: f64,
}

impl RankCorrelation {
    /// Fallback when there is nothing to correlate.
    pub const NO_SIGNAL: RankCorrelation = RankCorrelation {
        tau: 0.0,
        p_value: 1.0,
    };
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CorrelationError {
    #[error("inputs differ in length: {0} vs {1}")]
    LengthMismatch(usize, usize),
    #[error("need at least 2 observations, got {0}")]
    TooFewObservations(usize),
    #[error("non-finite value in input")]
    NonFinite,
    #[error("variance of the test statistic is not positive")]
    DegenerateVariance,
}

/// Per-answer score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderingScore {
    pub binary_score: f64,
    pub kendall_tau: f64,
    pub kendall_p_value: f64,
}

/// Score a parsed ordering against the ground truth.
pub fn score_ordering<T: PartialEq>(parsed: &[T], ground_truth: &[T]) -> OrderingScore {
    let binary_score = if parsed == ground_truth { 1.0 } else { 0.0 };
    let correlation = rank_correlation(parsed, ground_truth, binary_score);
    OrderingScore {
        binary_score,
        kendall_tau: correlation.tau,
        kendall_p_value: correlation.p_value,
    }
}

/// Ground-truth rank of each parsed element, dropping elements that do not
/// occur in the ground truth. Duplicates map to the same rank.
pub fn matched_ranks<T: PartialEq>(parsed: &[T], ground_truth: &[T]) -> Vec<usize> {
    parsed
        .iter()
        .filter_map(|p| ground_truth.iter().position(|t| t == p))
        .collect()
}

/// Kendall tau between the matched ranks of `parsed` and `0..k`.
///
/// - fewer than two matches: tau 0, p 1
/// - tau undefined (all matches tied): tau 1 for an exact match, else 0; p 1
/// - computation failure: logged, tau 0, p 1
pub fn rank_correlation<T: PartialEq>(
    parsed: &[T],
    ground_truth: &[T],
    binary_score: f64,
) -> RankCorrelation {
    let ranks = matched_ranks(parsed, ground_truth);
    if ranks.len() < 2 {
        return RankCorrelation::NO_SIGNAL;
    }

    let observed: Vec<f64> = ranks.iter().map(|&r| r as f64).collect();
    let natural: Vec<f64> = (0..ranks.len()).map(|i| i as f64).collect();

    match kendall_tau(&observed, &natural) {
        Ok(Some(rc)) if rc.tau.is_finite() && rc.p_value.is_finite() => rc,
        Ok(Some(rc)) => {
            warn!(tau = rc.tau, p_value = rc.p_value, "non-finite kendall tau, using fallback");
            RankCorrelation::NO_SIGNAL
        }
        Ok(None) => RankCorrelation {
            tau: if binary_score == 1.0 { 1.0 } else { 0.0 },
            p_value: 1.0,
        },
        Err(err) => {
            warn!(error = %err, "error calculating kendall tau, using fallback");
            RankCorrelation::NO_SIGNAL
        }
    }
}

// =============================================================================
// Kendall tau-b
// =============================================================================

/// Kendall's tau-b with a two-sided p-value.
///
/// Returns `Ok(None)` when tau is undefined because one input is constant.
/// The p-value uses the exact null distribution when neither input has ties
/// and the sample is small (n <= 33) or almost perfectly (dis)ordered;
/// otherwise the tie-corrected normal approximation.
pub fn kendall_tau(x: &[f64], y: &[f64]) -> Result<Option<RankCorrelation>, CorrelationError> {
    let n = x.len();
    if n != y.len() {
        return Err(CorrelationError::LengthMismatch(n, y.len()));
    }
    if n < 2 {
        return Err(CorrelationError::TooFewObservations(n));
    }
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return Err(CorrelationError::NonFinite);
    }

    let mut concordant = 0u64;
    let mut discordant = 0u64;
    for i in 0..n {
        for j in (i + 1)..n {
            let dx = x[i] - x[j];
            let dy = y[i] - y[j];
            if dx == 0.0 || dy == 0.0 {
                continue;
            }
            if (dx > 0.0) == (dy > 0.0) {
                concordant += 1;
            } else {
                discordant += 1;
            }
        }
    }

    let total = (n * (n - 1) / 2) as u64;
    let ties_x = TieStats::of(x);
    let ties_y = TieStats::of(y);
    if ties_x.pairs == total || ties_y.pairs == total {
        return Ok(None);
    }

    let con_minus_dis = concordant as f64 - discordant as f64;
    let denom = ((total - ties_x.pairs) as f64 * (total - ties_y.pairs) as f64).sqrt();
    let tau = (con_minus_dis / denom).clamp(-1.0, 1.0);

    let min_dis = discordant.min(total - discordant);
    let no_ties = ties_x.pairs == 0 && ties_y.pairs == 0;
    let p_value = if no_ties && (n <= 33 || min_dis <= 1) {
        exact_p_value(n, min_dis)
    } else {
        asymptotic_p_value(n, con_minus_dis, &ties_x, &ties_y)?
    };

    Ok(Some(RankCorrelation {
        tau,
        p_value: p_value.clamp(0.0, 1.0),
    }))
}

/// Tie-group sums used by tau-b and its variance.
#[derive(Debug, Clone, Copy, Default)]
struct TieStats {
    /// Σ t(t-1)/2: number of tied pairs.
    pairs: u64,
    /// Σ t(t-1)(t-2)
    v0: f64,
    /// Σ t(t-1)(2t+5)
    v1: f64,
}

impl TieStats {
    fn of(values: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let mut stats = TieStats::default();
        let mut i = 0usize;
        while i < sorted.len() {
            let mut j = i + 1;
            while j < sorted.len() && sorted[j] == sorted[i] {
                j += 1;
            }
            let t = (j - i) as u64;
            if t > 1 {
                let tf = t as f64;
                stats.pairs += t * (t - 1) / 2;
                stats.v0 += tf * (tf - 1.0) * (tf - 2.0);
                stats.v1 += tf * (tf - 1.0) * (2.0 * tf + 5.0);
            }
            i = j;
        }
        stats
    }
}

/// Two-sided exact p-value: probability that a random permutation of `n` has
/// at most `c` (or at least total-`c`) inversions.
fn exact_p_value(n: usize, c: u64) -> f64 {
    let c = c as usize;
    if n <= 2 {
        return 1.0;
    }
    if c == 0 {
        return if n < 171 { 2.0 / factorial(n) } else { 0.0 };
    }
    if c == 1 {
        return if n < 172 { 2.0 / factorial(n - 1) } else { 0.0 };
    }
    if 4 * c == n * (n - 1) {
        return 1.0;
    }
    if n >= 171 {
        // n! overflows f64. kendall_tau only takes the exact path for large n
        // when c <= 1, handled above.
        return 0.0;
    }

    // counts[k] = number of permutations with exactly k inversions, k <= c,
    // built up one element at a time.
    let mut counts = vec![0.0f64; c + 1];
    counts[0] = 1.0;
    counts[1] = 1.0;
    for j in 3..=n {
        let mut running = 0.0;
        for v in counts.iter_mut() {
            running += *v;
            *v = running;
        }
        if j <= c {
            let prefix = counts.clone();
            for k in j..=c {
                counts[k] -= prefix[k - j];
            }
        }
    }

    2.0 * counts.iter().sum::<f64>() / factorial(n)
}

fn asymptotic_p_value(
    n: usize,
    con_minus_dis: f64,
    ties_x: &TieStats,
    ties_y: &TieStats,
) -> Result<f64, CorrelationError> {
    let nf = n as f64;
    let m = nf * (nf - 1.0);
    let mut var = (m * (2.0 * nf + 5.0) - ties_x.v1 - ties_y.v1) / 18.0
        + (2.0 * ties_x.pairs as f64 * ties_y.pairs as f64) / m;
    if n > 2 {
        var += ties_x.v0 * ties_y.v0 / (9.0 * m * (nf - 2.0));
    }
    if !(var > 0.0) {
        return Err(CorrelationError::DegenerateVariance);
    }
    let z = con_minus_dis / var.sqrt();
    Ok(erfc(z.abs() / std::f64::consts::SQRT_2))
}

fn factorial(n: usize) -> f64 {
    (2..=n).fold(1.0, |acc, k| acc * k as f64)
}
