//! CART decision tree classifier for binary won/lost targets
//!
//! Greedy recursive binary splitting on Gini impurity, bounded by depth.
//! Nodes live in a flat arena; children are referenced by index.

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use super::trainer::TrainerConfig;

/// Values closer than this are treated as equal when placing thresholds
const VALUE_EPSILON: f64 = 1e-10;

/// A single node of the fitted tree
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Feature index used for the split (None for leaves)
    pub feature: Option<usize>,
    /// Samples with `x[feature] <= threshold` go left
    pub threshold: f64,
    /// Training samples per class at this node: `[lost, won]`
    pub class_counts: [usize; 2],
    /// Gini impurity at this node
    pub impurity: f64,
    pub depth: usize,
    pub left: Option<usize>,
    pub right: Option<usize>,
}

impl TreeNode {
    fn new(class_counts: [usize; 2], depth: usize) -> Self {
        Self {
            feature: None,
            threshold: 0.0,
            class_counts,
            impurity: gini_impurity(class_counts[1] as f64, class_counts[0] as f64),
            depth,
            left: None,
            right: None,
        }
    }

    pub fn n_samples(&self) -> usize {
        self.class_counts[0] + self.class_counts[1]
    }

    pub fn is_leaf(&self) -> bool {
        self.feature.is_none()
    }

    /// Majority class; ties resolve to lost
    pub fn predicted_class(&self) -> u8 {
        if self.class_counts[1] > self.class_counts[0] {
            1
        } else {
            0
        }
    }

    /// Fraction of won samples at this node
    pub fn win_probability(&self) -> f64 {
        let n = self.n_samples();
        if n == 0 {
            return 0.0;
        }
        self.class_counts[1] as f64 / n as f64
    }
}

/// Fitted decision tree
#[derive(Debug, Clone)]
pub struct DecisionTree {
    nodes: Vec<TreeNode>,
    n_features: usize,
}

/// Gini impurity for a binary node: `2 * p * (1 - p)` with p the event share
pub fn gini_impurity(events: f64, non_events: f64) -> f64 {
    let total = events + non_events;
    if total == 0.0 {
        return 0.0;
    }
    let p = events / total;
    2.0 * p * (1.0 - p)
}

/// Best threshold for one feature over a node's samples.
///
/// # Arguments
/// * `sorted_pairs` - (value, target) tuples sorted by value
/// * `min_samples_leaf` - Minimum samples required on each side
///
/// # Returns
/// Option of (threshold, left_count, gain), or None when no valid threshold
/// exists. A zero-gain threshold is still returned.
fn find_best_split(sorted_pairs: &[(f64, u8)], min_samples_leaf: usize) -> Option<(f64, usize, f64)> {
    let n = sorted_pairs.len();
    if n < 2 * min_samples_leaf || n < 2 {
        return None;
    }

    let total_events = sorted_pairs.iter().filter(|(_, t)| *t == 1).count() as f64;
    let total_non_events = n as f64 - total_events;
    let parent_gini = gini_impurity(total_events, total_non_events);

    let mut best: Option<(f64, usize, f64)> = None;

    let mut left_events = 0.0f64;
    let mut left_non_events = 0.0f64;

    for i in 0..n - 1 {
        let (value, target) = sorted_pairs[i];
        if target == 1 {
            left_events += 1.0;
        } else {
            left_non_events += 1.0;
        }

        let left_count = i + 1;
        let right_count = n - left_count;
        if left_count < min_samples_leaf || right_count < min_samples_leaf {
            continue;
        }

        // NaN sorts last and always goes right
        let next_value = sorted_pairs[i + 1].0;
        if next_value.is_nan() {
            break;
        }
        // Never split between equal values
        if (next_value - value).abs() < VALUE_EPSILON {
            continue;
        }

        let right_events = total_events - left_events;
        let right_non_events = total_non_events - left_non_events;

        let left_prop = left_count as f64 / n as f64;
        let right_prop = right_count as f64 / n as f64;
        let weighted_child_gini = left_prop * gini_impurity(left_events, left_non_events)
            + right_prop * gini_impurity(right_events, right_non_events);

        let gain = parent_gini - weighted_child_gini;
        if best.map_or(true, |(_, _, best_gain)| gain > best_gain) {
            best = Some((value + (next_value - value) / 2.0, left_count, gain));
        }
    }

    best
}

struct Split {
    feature: usize,
    threshold: f64,
    left: Vec<usize>,
    right: Vec<usize>,
}

impl DecisionTree {
    /// Fit a tree on encoded rows and binary targets.
    ///
    /// Callers are expected to have validated that `x` and `y` are non-empty
    /// and of equal length.
    pub fn fit(x: &[Vec<f64>], y: &[u8], config: &TrainerConfig) -> Self {
        let n_features = x.first().map(|row| row.len()).unwrap_or(0);
        let mut tree = Self {
            nodes: Vec::new(),
            n_features,
        };
        let mut rng = StdRng::seed_from_u64(config.random_state);
        tree.build(x, y, (0..y.len()).collect(), 0, config, &mut rng);
        tree
    }

    fn build(
        &mut self,
        x: &[Vec<f64>],
        y: &[u8],
        indices: Vec<usize>,
        depth: usize,
        config: &TrainerConfig,
        rng: &mut StdRng,
    ) -> usize {
        let won = indices.iter().filter(|&&idx| y[idx] == 1).count();
        let node_idx = self.nodes.len();
        self.nodes.push(TreeNode::new([indices.len() - won, won], depth));

        let node = &self.nodes[node_idx];
        let should_stop = depth >= config.max_depth
            || indices.len() < config.min_samples_split
            || node.class_counts.contains(&0);
        if should_stop {
            return node_idx;
        }

        let Some(split) = self.best_split(x, y, &indices, config.min_samples_leaf, rng) else {
            return node_idx;
        };

        let left = self.build(x, y, split.left, depth + 1, config, rng);
        let right = self.build(x, y, split.right, depth + 1, config, rng);

        let node = &mut self.nodes[node_idx];
        node.feature = Some(split.feature);
        node.threshold = split.threshold;
        node.left = Some(left);
        node.right = Some(right);
        node_idx
    }

    /// Search all features, visited in a seeded random order so that equal
    /// gains resolve to the same feature on every run.
    fn best_split(
        &self,
        x: &[Vec<f64>],
        y: &[u8],
        indices: &[usize],
        min_samples_leaf: usize,
        rng: &mut StdRng,
    ) -> Option<Split> {
        let mut order: Vec<usize> = (0..self.n_features).collect();
        order.shuffle(rng);

        let mut best: Option<(usize, f64, f64)> = None;
        for feature in order {
            let mut pairs: Vec<(f64, u8)> = indices
                .iter()
                .map(|&idx| (x[idx][feature], y[idx]))
                .collect();
            pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

            if let Some((threshold, _, gain)) = find_best_split(&pairs, min_samples_leaf) {
                if best.map_or(true, |(_, _, best_gain)| gain > best_gain) {
                    best = Some((feature, threshold, gain));
                }
            }
        }

        let (feature, threshold, _) = best?;
        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .copied()
            .partition(|&idx| x[idx][feature] <= threshold);
        Some(Split {
            feature,
            threshold,
            left,
            right,
        })
    }

    /// Depth of the deepest node
    pub fn depth(&self) -> usize {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    fn leaf_for(&self, row: &[f64]) -> &TreeNode {
        let mut node = &self.nodes[0];
        while let (Some(feature), Some(left), Some(right)) = (node.feature, node.left, node.right) {
            node = if row[feature] <= node.threshold {
                &self.nodes[left]
            } else {
                &self.nodes[right]
            };
        }
        node
    }

    /// Predicted class for one encoded row
    pub fn predict_row(&self, row: &[f64]) -> u8 {
        self.leaf_for(row).predicted_class()
    }

    /// Probability of won for one encoded row
    pub fn predict_proba_row(&self, row: &[f64]) -> f64 {
        self.leaf_for(row).win_probability()
    }

    /// Normalized weighted impurity decrease per feature.
    ///
    /// Sums to 1 when the tree has at least one split, all zeros otherwise.
    pub fn feature_importances(&self) -> Vec<f64> {
        let mut importances = vec![0.0f64; self.n_features];
        let total_samples = self.nodes.first().map(|n| n.n_samples()).unwrap_or(1) as f64;

        for node in &self.nodes {
            if let (Some(feature), Some(left), Some(right)) = (node.feature, node.left, node.right) {
                let left = &self.nodes[left];
                let right = &self.nodes[right];
                let n = node.n_samples() as f64;

                let decrease = node.impurity
                    - (left.n_samples() as f64 / n) * left.impurity
                    - (right.n_samples() as f64 / n) * right.impurity;
                importances[feature] += (n / total_samples) * decrease;
            }
        }

        let sum: f64 = importances.iter().sum();
        if sum > 0.0 {
            for imp in &mut importances {
                *imp /= sum;
            }
        }
        importances
    }

    /// Render the tree as indented text rules, one line per branch or leaf
    pub fn render(&self, feature_names: &[String]) -> String {
        let mut out = String::new();
        if !self.nodes.is_empty() {
            self.render_node(0, feature_names, &mut out);
        }
        out
    }

    fn render_node(&self, idx: usize, feature_names: &[String], out: &mut String) {
        let node = &self.nodes[idx];
        let indent = "|   ".repeat(node.depth);

        match (node.feature, node.left, node.right) {
            (Some(feature), Some(left), Some(right)) => {
                let name = feature_names
                    .get(feature)
                    .cloned()
                    .unwrap_or_else(|| format!("feature_{}", feature));
                out.push_str(&format!("{}|--- {} <= {:.2}\n", indent, name, node.threshold));
                self.render_node(left, feature_names, out);
                out.push_str(&format!("{}|--- {} >  {:.2}\n", indent, name, node.threshold));
                self.render_node(right, feature_names, out);
            }
            _ => {
                let class = if node.predicted_class() == 1 { "won" } else { "lost" };
                out.push_str(&format!(
                    "{}|--- class: {} (win rate {:.2}, n={})\n",
                    indent,
                    class,
                    node.win_probability(),
                    node.n_samples()
                ));
            }
        }
    }
}
