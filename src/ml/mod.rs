//! ML probability refinement
//!
//! An optional RandomForest regressor trained on completed signal outcomes
//! (win = 1.0, loss = 0.0); its prediction reads as a win probability. The
//! scanner blends it 50/50 with the static estimator. When no model is
//! trained (or a prediction fails) the deterministic static formula is the
//! answer, so predictions never block a scan.

pub mod features;

pub use features::{SignalFeatures, FEATURE_COUNT};

use parking_lot::RwLock;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use smartcore::api::{Predictor, SupervisedEstimator};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::errors::ScanError;
use crate::logger::{self, LogTag};
use crate::tracker::SignalTracker;
use crate::utils::{clamp, round2};

/// Minimum completed signals before a model is trained
const MIN_TRAINING_ROWS: usize = 30;
/// Prediction bounds: never certain, never hopeless
const ML_PROB_FLOOR: f64 = 0.35;
const ML_PROB_CEILING: f64 = 0.95;

type ForestModel = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Probability predictor seam consumed by the scanner
pub trait ProbabilityModel: Send + Sync {
    fn model_available(&self) -> bool;

    /// Win probability in [0.35, 0.95]; implementations fall back to the
    /// static formula internally rather than failing.
    fn predict_probability(&self, features: &SignalFeatures) -> f64;
}

/// Deterministic fallback used whenever no trained model is on hand
pub fn static_probability(confluence_score: f64, risk_reward: f64) -> f64 {
    let base = 0.50 + (confluence_score - 7.0) * 0.03;
    let rr_bonus = ((risk_reward - 2.0) * 0.03).min(0.10);
    round2(clamp(base + rr_bonus, 0.35, 0.85))
}

/// RandomForest win-probability model trained from tracker history
pub struct RandomForestPredictor {
    model: RwLock<Option<ForestModel>>,
    trained_rows: RwLock<usize>,
}

impl Default for RandomForestPredictor {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomForestPredictor {
    pub fn new() -> Self {
        Self {
            model: RwLock::new(None),
            trained_rows: RwLock::new(0),
        }
    }

    /// Train from the tracker's completed signals over the last `days`.
    /// Returns the number of rows trained on. Run periodically; the model
    /// lives in memory for the process lifetime.
    pub async fn train_from_tracker(
        &self,
        tracker: &dyn SignalTracker,
        days: u32,
    ) -> Result<usize, ScanError> {
        let completed = tracker.completed_signals(days).await?;

        if completed.len() < MIN_TRAINING_ROWS {
            logger::warning(
                LogTag::Ml,
                &format!(
                    "Insufficient data for training: {} signals (need minimum {})",
                    completed.len(),
                    MIN_TRAINING_ROWS
                ),
            );
            return Err(ScanError::MlPrediction(format!(
                "need at least {} completed signals, have {}",
                MIN_TRAINING_ROWS,
                completed.len()
            )));
        }

        let mut rows: Vec<(Vec<f64>, f64)> = completed
            .iter()
            .map(|signal| {
                let features = SignalFeatures::from_completed(signal).encode();
                let target = if signal.outcome.is_win() { 1.0 } else { 0.0 };
                (features, target)
            })
            .collect();

        // Decorrelate insertion order; fixed seed keeps training reproducible
        let mut rng = StdRng::seed_from_u64(42);
        rows.shuffle(&mut rng);

        let features: Vec<Vec<f64>> = rows.iter().map(|(f, _)| f.clone()).collect();
        let targets: Vec<f64> = rows.iter().map(|(_, t)| *t).collect();

        let matrix = DenseMatrix::from_2d_vec(&features)
            .map_err(|e| ScanError::MlPrediction(format!("feature matrix: {:?}", e)))?;

        let parameters = RandomForestRegressorParameters {
            n_trees: 50,
            max_depth: Some(10),
            min_samples_leaf: 3,
            min_samples_split: 5,
            m: Some(3),
            keep_samples: false,
            seed: 42,
        };

        let model = RandomForestRegressor::fit(&matrix, &targets, parameters)
            .map_err(|e| ScanError::MlPrediction(format!("training failed: {:?}", e)))?;

        *self.model.write() = Some(model);
        *self.trained_rows.write() = rows.len();

        logger::info(
            LogTag::Ml,
            &format!(
                "Probability model trained: {} signals, {} features, 50 trees",
                rows.len(),
                FEATURE_COUNT
            ),
        );

        Ok(rows.len())
    }

    pub fn trained_rows(&self) -> usize {
        *self.trained_rows.read()
    }

    fn predict_internal(&self, features: &SignalFeatures) -> Result<f64, ScanError> {
        let guard = self.model.read();
        let model = guard
            .as_ref()
            .ok_or_else(|| ScanError::MlPrediction("no trained model".to_string()))?;

        let matrix = DenseMatrix::from_2d_vec(&vec![features.encode()])
            .map_err(|e| ScanError::MlPrediction(format!("prediction matrix: {:?}", e)))?;

        let prediction = model
            .predict(&matrix)
            .map_err(|e| ScanError::MlPrediction(format!("prediction failed: {:?}", e)))?;

        prediction
            .first()
            .copied()
            .ok_or_else(|| ScanError::MlPrediction("empty prediction".to_string()))
    }
}

impl ProbabilityModel for RandomForestPredictor {
    fn model_available(&self) -> bool {
        self.model.read().is_some()
    }

    fn predict_probability(&self, features: &SignalFeatures) -> f64 {
        match self.predict_internal(features) {
            Ok(raw) => round2(clamp(raw, ML_PROB_FLOOR, ML_PROB_CEILING)),
            Err(err) => {
                logger::warning(LogTag::Ml, &format!("{}; using static formula", err));
                static_probability(features.confluence_score, features.risk_reward)
            }
        }
    }
}

/// Fixed-output model for tests and dry runs
#[derive(Debug, Clone, Copy)]
pub struct FixedProbability(pub f64);

impl ProbabilityModel for FixedProbability {
    fn model_available(&self) -> bool {
        true
    }

    fn predict_probability(&self, _features: &SignalFeatures) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::TradingSession;
    use crate::tracker::{CompletedSignal, MemorySignalTracker, SignalOutcome};
    use crate::types::Side;
    use chrono::Utc;
    use uuid::Uuid;

    fn completed(score: f64, win: bool) -> CompletedSignal {
        CompletedSignal {
            signal_id: Uuid::new_v4().to_string(),
            symbol: "ETH/USDT".to_string(),
            side: Side::Long,
            outcome: if win {
                SignalOutcome::TpHit
            } else {
                SignalOutcome::SlHit
            },
            completed_at: Utc::now(),
            confluence_score: score,
            risk_reward: 2.0 + score / 10.0,
            volume_ratio: 1.0 + score / 10.0,
            rsi_14: 40.0 + score * 2.0,
            btc_aligned: win,
            pattern_type: Some("breakout".to_string()),
            session: TradingSession::European,
        }
    }

    fn sample_features(score: f64) -> SignalFeatures {
        SignalFeatures {
            confluence_score: score,
            volume_ratio: 1.5,
            btc_aligned: true,
            rsi_14: 60.0,
            risk_reward: 2.5,
            pattern_type: Some("breakout".to_string()),
            session: TradingSession::European,
        }
    }

    #[test]
    fn test_static_probability_formula() {
        // base 0.50 at score 7 / rr 2.0
        assert_eq!(static_probability(7.0, 2.0), 0.50);
        // +0.03 per score point, +0.03 per rr point capped at 0.10
        assert_eq!(static_probability(8.0, 2.0), 0.53);
        assert_eq!(static_probability(7.0, 3.0), 0.53);
        assert_eq!(static_probability(10.0, 10.0), 0.69);
        // Clamped floor
        assert_eq!(static_probability(0.0, 0.0), 0.35);
    }

    #[test]
    fn test_untrained_model_unavailable_and_falls_back() {
        let predictor = RandomForestPredictor::new();
        assert!(!predictor.model_available());
        let p = predictor.predict_probability(&sample_features(8.0));
        assert_eq!(p, static_probability(8.0, 2.5));
    }

    #[tokio::test]
    async fn test_training_requires_minimum_rows() {
        let tracker = MemorySignalTracker::new();
        for i in 0..10 {
            tracker.push_completed(completed(5.0 + (i as f64) * 0.2, i % 2 == 0));
        }
        let predictor = RandomForestPredictor::new();
        assert!(predictor.train_from_tracker(&tracker, 90).await.is_err());
        assert!(!predictor.model_available());
    }

    #[tokio::test]
    async fn test_train_and_predict_bounds() {
        let tracker = MemorySignalTracker::new();
        // High scores win, low scores lose: a learnable gradient
        for i in 0..40 {
            let score = 3.0 + (i as f64) * 0.15;
            tracker.push_completed(completed(score, score > 6.0));
        }
        let predictor = RandomForestPredictor::new();
        let rows = predictor.train_from_tracker(&tracker, 90).await.unwrap();
        assert_eq!(rows, 40);
        assert!(predictor.model_available());

        let strong = predictor.predict_probability(&sample_features(8.5));
        let weak = predictor.predict_probability(&sample_features(3.5));
        assert!((ML_PROB_FLOOR..=ML_PROB_CEILING).contains(&strong));
        assert!((ML_PROB_FLOOR..=ML_PROB_CEILING).contains(&weak));
        assert!(strong >= weak, "strong={} weak={}", strong, weak);
    }

    #[test]
    fn test_fixed_probability() {
        let model = FixedProbability(0.8);
        assert!(model.model_available());
        assert_eq!(model.predict_probability(&sample_features(5.0)), 0.8);
    }
}
