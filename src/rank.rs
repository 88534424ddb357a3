//! Intra-cluster sentence ranking by random-walk centrality.
//!
//! Builds a complete weighted similarity graph over one cluster's sentences
//! (edge weight = cosine similarity of their embeddings, no self-loops) and
//! scores each sentence with weighted PageRank: the stationary visitation
//! probability of a random walk that follows edges proportionally to weight,
//! with damped uniform restart. The top sentences by score become that
//! cluster's contribution to the extractive draft.
//!
//! All indices here are WITHIN-cluster: matrix row `i` and graph node `i`
//! correspond to the i-th sentence of the cluster's ordered member list,
//! never to the document-global sentence index.

use petgraph::Undirected;
use petgraph::graph::{Graph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::sentence::Sentence;

/// Configuration for centrality ranking.
#[derive(Debug, Clone)]
pub struct RankConfig {
    /// PageRank damping factor.
    pub damping: f64,
    /// Power-iteration cap.
    pub max_iterations: usize,
    /// Convergence threshold on the L1 score delta.
    pub tolerance: f64,
    /// Maximum sentences kept per cluster.
    pub top_k: usize,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            max_iterations: 100,
            tolerance: 1e-6,
            top_k: 10,
        }
    }
}

/// A cluster member's centrality score.
#[derive(Debug, Clone)]
pub struct RankedSentence {
    /// Index into the cluster's ordered member list.
    pub member_index: usize,
    /// Stationary-distribution centrality; non-negative, sums to ~1
    /// across the cluster.
    pub score: f64,
}

/// Rank one cluster's sentences by centrality, most central first.
///
/// `vectors` must be in within-cluster member order, restricted to this
/// cluster. Ties keep within-cluster order (stable sort). Returns at most
/// `config.top_k` entries.
pub fn rank_cluster(vectors: &[&[f32]], config: &RankConfig) -> Vec<RankedSentence> {
    let n = vectors.len();
    if n == 0 {
        return Vec::new();
    }

    let graph = similarity_graph(vectors);
    let scores = weighted_pagerank(&graph, config);

    let mut ranked: Vec<RankedSentence> = scores
        .into_iter()
        .enumerate()
        .map(|(member_index, score)| RankedSentence {
            member_index,
            score,
        })
        .collect();
    // Stable: equal scores keep within-cluster order.
    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(config.top_k.min(n));
    ranked
}

/// Select the ranked sentences' raw texts, in rank order.
///
/// Rank order intentionally discards original document order: the most
/// central sentence leads the cluster summary.
pub fn ranked_texts(
    members: &[&Sentence],
    ranked: &[RankedSentence],
) -> Vec<String> {
    ranked
        .iter()
        .map(|r| members[r.member_index].text.clone())
        .collect()
}

// ---------------------------------------------------------------------------
// Similarity graph
// ---------------------------------------------------------------------------

/// Complete undirected graph over the cluster, weighted by cosine similarity.
/// Self-loops are omitted; node `i` is the cluster's i-th member.
fn similarity_graph(vectors: &[&[f32]]) -> Graph<(), f64, Undirected> {
    let n = vectors.len();
    let mut graph = Graph::with_capacity(n, n * (n.saturating_sub(1)) / 2);
    let nodes: Vec<NodeIndex> = (0..n).map(|_| graph.add_node(())).collect();
    for i in 0..n {
        for j in (i + 1)..n {
            let w = cosine_similarity(vectors[i], vectors[j]);
            graph.add_edge(nodes[i], nodes[j], w);
        }
    }
    graph
}

/// Cosine similarity; zero vectors yield 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b) {
        dot += f64::from(x) * f64::from(y);
        norm_a += f64::from(x) * f64::from(x);
        norm_b += f64::from(y) * f64::from(y);
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

// ---------------------------------------------------------------------------
// Weighted PageRank
// ---------------------------------------------------------------------------

/// Power-iteration PageRank with weight-proportional transitions.
///
/// A node whose incident weights sum to ≤ 0 is dangling; its mass is
/// redistributed uniformly, which together with the damped restart
/// guarantees convergence. Scores form a probability distribution.
fn weighted_pagerank(graph: &Graph<(), f64, Undirected>, config: &RankConfig) -> Vec<f64> {
    let n = graph.node_count();
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        // Trivial walk: the lone sentence holds all the probability mass.
        return vec![1.0];
    }

    let total_weight: Vec<f64> = graph
        .node_indices()
        .map(|node| {
            graph
                .edges(node)
                .map(|e| e.weight().max(0.0))
                .sum::<f64>()
        })
        .collect();

    let uniform = 1.0 / n as f64;
    let teleport = (1.0 - config.damping) / n as f64;
    let mut scores = vec![uniform; n];
    let mut next = vec![0.0f64; n];

    for _ in 0..config.max_iterations {
        let dangling_mass: f64 = graph
            .node_indices()
            .filter(|&node| total_weight[node.index()] <= 0.0)
            .map(|node| scores[node.index()])
            .sum();
        let dangling_share = config.damping * dangling_mass / n as f64;
        next.fill(teleport + dangling_share);

        for node in graph.node_indices() {
            let i = node.index();
            if total_weight[i] <= 0.0 {
                continue;
            }
            let outgoing = config.damping * scores[i] / total_weight[i];
            for edge in graph.edges(node) {
                let j = edge.target().index();
                next[j] += outgoing * edge.weight().max(0.0);
            }
        }

        let delta: f64 = scores
            .iter()
            .zip(&next)
            .map(|(a, b)| (a - b).abs())
            .sum();
        std::mem::swap(&mut scores, &mut next);
        if delta < config.tolerance {
            break;
        }
    }
    scores
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(components: &[f32]) -> Vec<f32> {
        let norm: f32 = components.iter().map(|v| v * v).sum::<f32>().sqrt();
        components.iter().map(|v| v / norm).collect()
    }

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let v = unit(&[0.3, 0.4, 0.5]);
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-9);
    }

    #[test]
    fn cosine_of_zero_vector_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn scores_form_a_probability_distribution() {
        let vectors: Vec<Vec<f32>> = vec![
            unit(&[1.0, 0.1, 0.0]),
            unit(&[0.9, 0.2, 0.1]),
            unit(&[0.1, 1.0, 0.3]),
            unit(&[0.0, 0.2, 1.0]),
        ];
        let refs: Vec<&[f32]> = vectors.iter().map(Vec::as_slice).collect();
        let ranked = rank_cluster(&refs, &RankConfig::default());
        assert_eq!(ranked.len(), 4);
        let sum: f64 = ranked.iter().map(|r| r.score).sum();
        assert!((sum - 1.0).abs() < 1e-6, "scores sum to {sum}");
        assert!(ranked.iter().all(|r| r.score >= 0.0));
    }

    #[test]
    fn singleton_cluster_scores_exactly_one() {
        let vectors: Vec<Vec<f32>> = vec![unit(&[0.2, 0.8])];
        let refs: Vec<&[f32]> = vectors.iter().map(Vec::as_slice).collect();
        let ranked = rank_cluster(&refs, &RankConfig::default());
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].score, 1.0);
    }

    #[test]
    fn central_sentence_outranks_outlier() {
        // Two near-duplicates and one vector orthogonal to both: the
        // duplicates reinforce each other and outrank the outlier.
        let vectors: Vec<Vec<f32>> = vec![
            unit(&[1.0, 0.05, 0.0]),
            unit(&[1.0, 0.1, 0.0]),
            unit(&[0.0, 0.0, 1.0]),
        ];
        let refs: Vec<&[f32]> = vectors.iter().map(Vec::as_slice).collect();
        let ranked = rank_cluster(&refs, &RankConfig::default());
        let outlier_rank = ranked
            .iter()
            .position(|r| r.member_index == 2)
            .unwrap();
        assert_eq!(outlier_rank, 2, "outlier should rank last");
        // The near-duplicates carry similar mass.
        assert!((ranked[0].score - ranked[1].score).abs() < 0.05);
    }

    #[test]
    fn output_is_capped_at_top_k() {
        let vectors: Vec<Vec<f32>> = (0..15)
            .map(|i| unit(&[1.0, i as f32 * 0.01, (i % 3) as f32 * 0.1]))
            .collect();
        let refs: Vec<&[f32]> = vectors.iter().map(Vec::as_slice).collect();
        let ranked = rank_cluster(&refs, &RankConfig::default());
        assert_eq!(ranked.len(), 10);
    }

    #[test]
    fn empty_cluster_yields_no_ranking() {
        assert!(rank_cluster(&[], &RankConfig::default()).is_empty());
    }

    #[test]
    fn ranked_texts_follow_rank_order() {
        let a = Sentence {
            index: 0,
            text: "First.".into(),
            normalized: "first".into(),
        };
        let b = Sentence {
            index: 1,
            text: "Second.".into(),
            normalized: "second".into(),
        };
        let members = vec![&a, &b];
        let ranked = vec![
            RankedSentence { member_index: 1, score: 0.6 },
            RankedSentence { member_index: 0, score: 0.4 },
        ];
        assert_eq!(ranked_texts(&members, &ranked), vec!["Second.", "First."]);
    }
}
