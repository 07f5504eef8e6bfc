//! Next-move classifier — a random forest over indicator features.
//!
//! Binary Gini trees on bootstrap samples, each split drawing √features
//! candidate columns. Trees are trained in parallel with rayon; tree `i`
//! is seeded with `seed + i`, so results do not depend on thread count.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use siglab_core::features::{extract_samples, latest_features, Sample, N_FEATURES};
use siglab_core::IndicatorFrame;

use crate::config::ClassifierConfig;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassifierError {
    #[error("need at least {required} complete samples to train, have {available}")]
    InsufficientSamples { available: usize, required: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf {
        /// Fraction of training samples labelled "up".
        prob_up: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn predict(&self, x: &[f64; N_FEATURES]) -> f64 {
        match self {
            Node::Leaf { prob_up } => *prob_up,
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if x[*feature] <= *threshold {
                    left.predict(x)
                } else {
                    right.predict(x)
                }
            }
        }
    }

    fn depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

fn gini(ups: usize, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let p = ups as f64 / n as f64;
    2.0 * p * (1.0 - p)
}

#[derive(Debug, Clone, Copy)]
struct TreeParams {
    max_depth: Option<usize>,
    min_samples_split: usize,
    max_features: usize,
}

struct TreeBuilder<'a> {
    samples: &'a [Sample],
    params: TreeParams,
    rng: StdRng,
}

impl TreeBuilder<'_> {
    fn build(&mut self, indices: &[usize], depth: usize) -> Node {
        let n = indices.len();
        let ups = indices.iter().filter(|&&i| self.samples[i].target == 1).count();
        let leaf = Node::Leaf {
            prob_up: if n == 0 { 0.5 } else { ups as f64 / n as f64 },
        };

        let depth_reached = self.params.max_depth.is_some_and(|max| depth >= max);
        if depth_reached || n < self.params.min_samples_split || ups == 0 || ups == n {
            return leaf;
        }

        let Some((feature, threshold)) = self.best_split(indices, ups) else {
            return leaf;
        };

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| self.samples[i].features[feature] <= threshold);

        Node::Split {
            feature,
            threshold,
            left: Box::new(self.build(&left_idx, depth + 1)),
            right: Box::new(self.build(&right_idx, depth + 1)),
        }
    }

    /// Best (feature, threshold) among a random subset of features, or None
    /// when no candidate reduces impurity.
    fn best_split(&mut self, indices: &[usize], ups: usize) -> Option<(usize, f64)> {
        let n = indices.len();
        let parent = gini(ups, n);

        let mut features: Vec<usize> = (0..N_FEATURES).collect();
        features.shuffle(&mut self.rng);
        features.truncate(self.params.max_features);

        let mut best: Option<(usize, f64)> = None;
        let mut best_gain = 0.0;

        for &f in &features {
            let mut column: Vec<(f64, u8)> = indices
                .iter()
                .map(|&i| (self.samples[i].features[f], self.samples[i].target))
                .collect();
            column.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left_ups = 0usize;
            for k in 0..n - 1 {
                left_ups += column[k].1 as usize;
                if column[k].0 == column[k + 1].0 {
                    continue;
                }
                let n_left = k + 1;
                let n_right = n - n_left;
                let weighted = (n_left as f64 * gini(left_ups, n_left)
                    + n_right as f64 * gini(ups - left_ups, n_right))
                    / n as f64;
                let gain = parent - weighted;
                if gain > best_gain {
                    best_gain = gain;
                    best = Some((f, (column[k].0 + column[k + 1].0) / 2.0));
                }
            }
        }
        best
    }
}

/// An ensemble of Gini trees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<Node>,
}

impl RandomForest {
    /// Fit `n_trees` trees on bootstrap resamples of `samples`.
    pub fn fit(samples: &[Sample], config: &ClassifierConfig) -> Self {
        let params = TreeParams {
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split.max(2),
            max_features: ((N_FEATURES as f64).sqrt().ceil() as usize).clamp(1, N_FEATURES),
        };
        let n = samples.len();

        let trees: Vec<Node> = (0..config.n_trees)
            .into_par_iter()
            .map(|i| {
                let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(i as u64));
                let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                let mut builder = TreeBuilder { samples, params, rng };
                builder.build(&bootstrap, 0)
            })
            .collect();

        tracing::debug!(
            trees = trees.len(),
            samples = n,
            max_depth = trees.iter().map(Node::depth).max().unwrap_or(0),
            "random forest fitted"
        );
        Self { trees }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Mean "up" probability across trees.
    pub fn predict_proba(&self, x: &[f64; N_FEATURES]) -> f64 {
        if self.trees.is_empty() {
            return 0.5;
        }
        self.trees.iter().map(|t| t.predict(x)).sum::<f64>() / self.trees.len() as f64
    }

    /// 1 when the forest leans "up", else 0.
    pub fn predict(&self, x: &[f64; N_FEATURES]) -> u8 {
        u8::from(self.predict_proba(x) > 0.5)
    }

    /// Fraction of `samples` predicted correctly (0 for an empty slice).
    pub fn accuracy(&self, samples: &[Sample]) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        let correct = samples.par_iter().filter(|s| self.predict(&s.features) == s.target).count();
        correct as f64 / samples.len() as f64
    }
}

/// Outcome of one training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub train_size: usize,
    pub test_size: usize,
    /// Test-set accuracy in [0, 1].
    pub accuracy: f64,
    /// Forest's "up" probability for the bar after the last one, when the
    /// last bar has every feature defined.
    pub next_up_probability: Option<f64>,
    pub model: RandomForest,
}

/// Extract samples, shuffle-split, fit, and score on the held-out part.
pub fn train_classifier(frame: &IndicatorFrame, config: &ClassifierConfig) -> Result<TrainingReport, ClassifierError> {
    let samples = extract_samples(frame);
    let required = config.min_rows.max(2);
    if samples.len() < required {
        return Err(ClassifierError::InsufficientSamples {
            available: samples.len(),
            required,
        });
    }

    let mut order: Vec<usize> = (0..samples.len()).collect();
    order.shuffle(&mut StdRng::seed_from_u64(config.seed));

    let n = samples.len();
    let test_size = ((n as f64 * config.test_fraction).round() as usize).clamp(1, n - 1);
    let (test_idx, train_idx) = order.split_at(test_size);
    let train: Vec<Sample> = train_idx.iter().map(|&i| samples[i]).collect();
    let test: Vec<Sample> = test_idx.iter().map(|&i| samples[i]).collect();

    let model = RandomForest::fit(&train, config);
    let accuracy = model.accuracy(&test);
    let next_up_probability = latest_features(frame).map(|x| model.predict_proba(&x));

    tracing::info!(
        symbol = %frame.symbol,
        train = train.len(),
        test = test.len(),
        accuracy,
        "classifier trained"
    );

    Ok(TrainingReport {
        train_size: train.len(),
        test_size,
        accuracy,
        next_up_probability,
        model,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use siglab_core::data::{DataProvider, SyntheticProvider};
    use siglab_core::{compute_indicators, IndicatorParams};

    fn separable(n: usize) -> Vec<Sample> {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        (0..n)
            .map(|i| {
                let x = i as f64;
                Sample {
                    date,
                    features: [x, 2.0 * x, x + 5.0, x / 100.0],
                    target: u8::from(i >= n / 2),
                }
            })
            .collect()
    }

    fn small_config() -> ClassifierConfig {
        ClassifierConfig {
            n_trees: 25,
            ..Default::default()
        }
    }

    #[test]
    fn gini_extremes() {
        assert_eq!(gini(0, 10), 0.0);
        assert_eq!(gini(10, 10), 0.0);
        assert!((gini(5, 10) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn learns_a_threshold() {
        let samples = separable(200);
        let forest = RandomForest::fit(&samples, &small_config());
        assert_eq!(forest.n_trees(), 25);
        assert!(forest.accuracy(&samples) >= 0.95);
        assert_eq!(forest.predict(&[10.0, 20.0, 15.0, 0.1]), 0);
        assert_eq!(forest.predict(&[190.0, 380.0, 195.0, 1.9]), 1);
    }

    #[test]
    fn fitting_is_deterministic() {
        let samples = separable(120);
        let a = RandomForest::fit(&samples, &small_config());
        let b = RandomForest::fit(&samples, &small_config());
        let point = [59.5, 119.0, 64.5, 0.595];
        assert_eq!(a.predict_proba(&point), b.predict_proba(&point));
    }

    #[test]
    fn depth_limit_is_respected() {
        let config = ClassifierConfig {
            max_depth: Some(1),
            ..small_config()
        };
        let forest = RandomForest::fit(&separable(100), &config);
        assert!(forest.trees.iter().all(|t| t.depth() <= 2));
    }

    #[test]
    fn refuses_short_history() {
        let series = SyntheticProvider::new(5)
            .fetch_series(
                "SYN",
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            )
            .unwrap();
        let frame = compute_indicators(&series, &IndicatorParams::default());
        let err = train_classifier(&frame, &ClassifierConfig::default()).unwrap_err();
        assert!(matches!(err, ClassifierError::InsufficientSamples { required: 100, .. }));
    }

    #[test]
    fn trains_on_two_years_of_synthetic_data() {
        let series = SyntheticProvider::new(11)
            .fetch_series(
                "SYN",
                NaiveDate::from_ymd_opt(2022, 1, 3).unwrap(),
                NaiveDate::from_ymd_opt(2023, 12, 29).unwrap(),
            )
            .unwrap();
        let frame = compute_indicators(&series, &IndicatorParams::default());
        let config = small_config();
        let report = train_classifier(&frame, &config).unwrap();
        assert!((0.0..=1.0).contains(&report.accuracy));
        assert_eq!(report.train_size + report.test_size, extract_samples(&frame).len());
        let expected_test = (extract_samples(&frame).len() as f64 * 0.2).round() as usize;
        assert_eq!(report.test_size, expected_test);
        assert!(report.next_up_probability.is_some());

        let again = train_classifier(&frame, &config).unwrap();
        assert_eq!(report.accuracy, again.accuracy);
    }
}
