//! Topical grouping of sentence vectors.
//!
//! Runs a seeded k-means over the document's sentence embeddings for every
//! candidate cluster count, scores each partition with a silhouette-style
//! cohesion/separation measure, and keeps the best K. Everything here is
//! deterministic given a fixed seed; re-running at the winning K reproduces
//! the exact assignment found during the search.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::error::ClusterError;

/// Configuration for cluster-count selection.
#[derive(Debug, Clone)]
pub struct ClusterConfig {
    /// Seed for the k-means RNG. Explicit so tests can assert determinism.
    pub seed: u64,
    /// Upper bound on the candidate cluster count (the search range is
    /// `[2, min(max_clusters, N-1)]`).
    pub max_clusters: usize,
    /// Lloyd-iteration cap per k-means run.
    pub max_iterations: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            max_clusters: 9,
            max_iterations: 100,
        }
    }
}

/// A complete cluster assignment: one label per sentence vector.
#[derive(Debug, Clone)]
pub struct ClusterAssignment {
    /// Chosen cluster count.
    pub k: usize,
    /// Cluster label per vector, indexed by sentence position.
    pub labels: Vec<usize>,
    /// Silhouette score of the winning partition (0.0 when K = 1).
    pub score: f64,
}

impl ClusterAssignment {
    /// Group sentence positions by cluster label, in label order.
    pub fn members(&self) -> Vec<Vec<usize>> {
        let mut groups: Vec<Vec<usize>> = vec![Vec::new(); self.k];
        for (idx, &label) in self.labels.iter().enumerate() {
            groups[label].push(idx);
        }
        groups
    }
}

/// Choose the cluster count maximizing silhouette score and produce the
/// final label assignment.
///
/// With two or fewer vectors there is nothing to score, so the whole
/// document becomes a single cluster. Candidate partitions that collapse to
/// fewer than two occupied clusters are skipped; if every candidate
/// collapses the input is degenerate and the request fails rather than
/// guessing a grouping.
pub fn select_clusters(
    vectors: &[Vec<f32>],
    config: &ClusterConfig,
) -> Result<ClusterAssignment, ClusterError> {
    if vectors.is_empty() {
        return Err(ClusterError::NoInput);
    }
    let dim = vectors[0].len();
    for v in vectors {
        if v.len() != dim {
            return Err(ClusterError::DimensionMismatch {
                expected: dim,
                actual: v.len(),
            });
        }
    }

    let n = vectors.len();
    if n <= 2 {
        return Ok(ClusterAssignment {
            k: 1,
            labels: vec![0; n],
            score: 0.0,
        });
    }

    let mut best_k = 0usize;
    let mut best_score = f64::NEG_INFINITY;

    for k in 2..=config.max_clusters.min(n - 1) {
        let labels = kmeans(vectors, k, config.seed, config.max_iterations);
        let occupied = occupied_clusters(&labels, k);
        if occupied < 2 {
            debug!(k, "candidate partition collapsed, skipping");
            continue;
        }
        let score = silhouette(vectors, &labels, k);
        debug!(k, score, "scored candidate partition");
        // Strict > keeps the smallest K on ties.
        if score > best_score {
            best_k = k;
            best_score = score;
        }
    }

    if best_k == 0 {
        return Err(ClusterError::Degenerate);
    }

    // Same seed, same K: reproduces the assignment scored during the search.
    let labels = kmeans(vectors, best_k, config.seed, config.max_iterations);
    debug!(k = best_k, score = best_score, "selected cluster count");
    Ok(ClusterAssignment {
        k: best_k,
        labels,
        score: best_score,
    })
}

// ---------------------------------------------------------------------------
// K-means
// ---------------------------------------------------------------------------

/// Seeded k-means with farthest-point initialization and Lloyd iterations.
///
/// Deterministic given `(vectors, k, seed)`: the first centroid comes from
/// the seeded RNG, the rest by farthest-point selection, and every tie
/// (nearest centroid, farthest point) breaks toward the lowest index.
fn kmeans(vectors: &[Vec<f32>], k: usize, seed: u64, max_iterations: usize) -> Vec<usize> {
    let n = vectors.len();
    let dim = vectors[0].len();
    let mut rng = StdRng::seed_from_u64(seed);

    // Farthest-point seeding: spreads centroids without the sampling noise
    // of full kmeans++, keeping runs reproducible under one seed.
    let mut centroids: Vec<Vec<f64>> = Vec::with_capacity(k);
    let first = rng.gen_range(0..n);
    centroids.push(to_f64(&vectors[first]));
    while centroids.len() < k {
        let mut far_idx = 0;
        let mut far_dist = f64::NEG_INFINITY;
        for (i, v) in vectors.iter().enumerate() {
            let d = centroids
                .iter()
                .map(|c| distance_sq(v, c))
                .fold(f64::INFINITY, f64::min);
            if d > far_dist {
                far_dist = d;
                far_idx = i;
            }
        }
        centroids.push(to_f64(&vectors[far_idx]));
    }

    let mut labels = vec![0usize; n];
    for _ in 0..max_iterations {
        // Assignment step.
        let mut changed = false;
        for (i, v) in vectors.iter().enumerate() {
            let mut best = 0usize;
            let mut best_d = f64::INFINITY;
            for (c, centroid) in centroids.iter().enumerate() {
                let d = distance_sq(v, centroid);
                if d < best_d {
                    best_d = d;
                    best = c;
                }
            }
            if labels[i] != best {
                labels[i] = best;
                changed = true;
            }
        }
        if !changed {
            break;
        }

        // Update step.
        let mut sums = vec![vec![0.0f64; dim]; k];
        let mut counts = vec![0usize; k];
        for (v, &label) in vectors.iter().zip(&labels) {
            counts[label] += 1;
            for (acc, &x) in sums[label].iter_mut().zip(v) {
                *acc += f64::from(x);
            }
        }
        for c in 0..k {
            if counts[c] == 0 {
                // Re-seed an emptied centroid at the point farthest from its
                // current centroid, again lowest-index on ties.
                let mut far_idx = 0;
                let mut far_dist = f64::NEG_INFINITY;
                for (i, v) in vectors.iter().enumerate() {
                    let d = distance_sq(v, &centroids[labels[i]]);
                    if d > far_dist {
                        far_dist = d;
                        far_idx = i;
                    }
                }
                centroids[c] = to_f64(&vectors[far_idx]);
            } else {
                for (j, acc) in sums[c].iter().enumerate() {
                    centroids[c][j] = acc / counts[c] as f64;
                }
            }
        }
    }
    labels
}

/// Number of distinct labels actually used by an assignment.
fn occupied_clusters(labels: &[usize], k: usize) -> usize {
    let mut seen = vec![false; k];
    for &l in labels {
        seen[l] = true;
    }
    seen.iter().filter(|&&s| s).count()
}

// ---------------------------------------------------------------------------
// Silhouette score
// ---------------------------------------------------------------------------

/// Mean silhouette coefficient over all points.
///
/// Per point: `a` = mean distance to same-cluster points, `b` = mean
/// distance to the nearest other cluster, silhouette = `(b - a) / max(a, b)`.
/// Singleton clusters contribute 0 for their point.
fn silhouette(vectors: &[Vec<f32>], labels: &[usize], k: usize) -> f64 {
    let n = vectors.len();
    let mut total = 0.0;

    for i in 0..n {
        let own = labels[i];

        let mut same_sum = 0.0;
        let mut same_count = 0usize;
        let mut other_sum = vec![0.0f64; k];
        let mut other_count = vec![0usize; k];

        for j in 0..n {
            if i == j {
                continue;
            }
            let d = distance(&vectors[i], &vectors[j]);
            if labels[j] == own {
                same_sum += d;
                same_count += 1;
            } else {
                other_sum[labels[j]] += d;
                other_count[labels[j]] += 1;
            }
        }

        if same_count == 0 {
            // Singleton cluster: silhouette defined as 0.
            continue;
        }
        let a = same_sum / same_count as f64;
        let b = (0..k)
            .filter(|&c| c != own && other_count[c] > 0)
            .map(|c| other_sum[c] / other_count[c] as f64)
            .fold(f64::INFINITY, f64::min);
        if !b.is_finite() {
            continue;
        }
        if a.max(b) > 0.0 {
            total += (b - a) / a.max(b);
        }
    }
    total / n as f64
}

// ---------------------------------------------------------------------------
// Distance helpers
// ---------------------------------------------------------------------------

fn to_f64(v: &[f32]) -> Vec<f64> {
    v.iter().map(|&x| f64::from(x)).collect()
}

fn distance_sq(a: &[f32], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| (f64::from(x) - y).powi(2))
        .sum()
}

fn distance(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| (f64::from(x) - f64::from(y)).powi(2))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two tight blobs around orthogonal axes, plus per-point jitter.
    fn two_blobs(per_blob: usize) -> Vec<Vec<f32>> {
        let mut vectors = Vec::new();
        for i in 0..per_blob {
            let eps = i as f32 * 0.01;
            vectors.push(vec![1.0, eps, 0.0]);
        }
        for i in 0..per_blob {
            let eps = i as f32 * 0.01;
            vectors.push(vec![0.0, eps, 1.0]);
        }
        vectors
    }

    #[test]
    fn two_or_fewer_vectors_force_single_cluster() {
        let cfg = ClusterConfig::default();
        for n in 1..=2 {
            let vectors: Vec<Vec<f32>> = (0..n).map(|i| vec![i as f32, 1.0]).collect();
            let a = select_clusters(&vectors, &cfg).unwrap();
            assert_eq!(a.k, 1);
            assert!(a.labels.iter().all(|&l| l == 0));
        }
    }

    #[test]
    fn chosen_k_stays_in_bounds() {
        let cfg = ClusterConfig::default();
        for n in [3usize, 5, 12, 25] {
            let vectors = two_blobs(n.div_ceil(2))[..n].to_vec();
            let a = select_clusters(&vectors, &cfg).unwrap();
            assert!(a.k >= 2);
            assert!(a.k <= 9.min(n - 1), "k={} out of bounds for n={n}", a.k);
            assert_eq!(a.labels.len(), n);
        }
    }

    #[test]
    fn well_separated_blobs_yield_two_clusters() {
        let vectors = two_blobs(6);
        let a = select_clusters(&vectors, &ClusterConfig::default()).unwrap();
        assert_eq!(a.k, 2);
        // Every vector in one blob shares a label, and the blobs differ.
        let first = a.labels[0];
        assert!(a.labels[..6].iter().all(|&l| l == first));
        assert!(a.labels[6..].iter().all(|&l| l != first));
        assert!(a.score > 0.5);
    }

    #[test]
    fn selection_is_deterministic() {
        let vectors = two_blobs(8);
        let cfg = ClusterConfig::default();
        let a = select_clusters(&vectors, &cfg).unwrap();
        let b = select_clusters(&vectors, &cfg).unwrap();
        assert_eq!(a.k, b.k);
        assert_eq!(a.labels, b.labels);
    }

    #[test]
    fn identical_vectors_are_degenerate() {
        let vectors = vec![vec![0.5f32, 0.5]; 6];
        let err = select_clusters(&vectors, &ClusterConfig::default()).unwrap_err();
        assert!(matches!(err, ClusterError::Degenerate));
    }

    #[test]
    fn dimension_mismatch_is_rejected() {
        let vectors = vec![vec![1.0f32, 0.0], vec![1.0f32, 0.0, 0.0]];
        let err = select_clusters(&vectors, &ClusterConfig::default()).unwrap_err();
        assert!(matches!(err, ClusterError::DimensionMismatch { .. }));
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = select_clusters(&[], &ClusterConfig::default()).unwrap_err();
        assert!(matches!(err, ClusterError::NoInput));
    }

    #[test]
    fn members_group_in_label_order() {
        let a = ClusterAssignment {
            k: 2,
            labels: vec![1, 0, 1, 0],
            score: 0.0,
        };
        let groups = a.members();
        assert_eq!(groups[0], vec![1, 3]);
        assert_eq!(groups[1], vec![0, 2]);
    }
}
