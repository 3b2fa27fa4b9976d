//! Leaderboard assembly: one row per model, best (lowest MAPE) first.

use rayon::prelude::*;
use tracing::{info, instrument};

use crate::domain::{MetricRecord, ModelPredictions, Scores};
use crate::error::MetricError;
use crate::evaluate::metrics::score;

#[derive(Debug, Clone, PartialEq)]
pub struct Leaderboard {
    rows: Vec<MetricRecord>,
}

impl Leaderboard {
    /// Build from `(model, scores)` pairs in encounter order.
    ///
    /// Sorting is stable, so models with equal MAPE keep their input order.
    pub fn from_scores(scores: impl IntoIterator<Item = (String, Scores)>) -> Self {
        let mut rows: Vec<MetricRecord> = scores
            .into_iter()
            .map(|(model, scores)| MetricRecord { model, scores })
            .collect();
        rows.sort_by(|a, b| a.scores.mape.total_cmp(&b.scores.mape));
        Self { rows }
    }

    pub fn rows(&self) -> &[MetricRecord] {
        &self.rows
    }

    pub fn best(&self) -> Option<&MetricRecord> {
        self.rows.first()
    }

    /// Look up a model by exact name, falling back to a trimmed,
    /// case-insensitive match.
    pub fn find(&self, name: &str) -> Option<&MetricRecord> {
        self.rows.iter().find(|r| r.model == name).or_else(|| {
            let wanted = name.trim().to_lowercase();
            self.rows.iter().find(|r| r.model.trim().to_lowercase() == wanted)
        })
    }
}

/// Score every model against `actual` and rank them.
///
/// Models are scored independently (in parallel); results are collected in
/// input order before ranking, so the output is deterministic.
#[instrument(skip_all, fields(models = predictions.len(), n = actual.len()))]
pub fn evaluate_models(actual: &[f64], predictions: &[ModelPredictions]) -> Result<Leaderboard, MetricError> {
    let scored: Vec<(String, Scores)> = predictions
        .par_iter()
        .map(|p| score(actual, &p.values).map(|s| (p.model.clone(), s)))
        .collect::<Result<_, _>>()?;

    for (model, s) in &scored {
        info!(%model, mape = s.mape, rmse = s.rmse, "scored model");
    }
    Ok(Leaderboard::from_scores(scored))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(mape: f64) -> Scores {
        Scores { mape, rmse: 1.0, mae: 1.0 }
    }

    #[test]
    fn sorted_ascending_by_mape() {
        let board = Leaderboard::from_scores(vec![
            ("a".to_string(), scores(12.5)),
            ("b".to_string(), scores(8.0)),
            ("c".to_string(), scores(20.1)),
        ]);
        let order: Vec<&str> = board.rows().iter().map(|r| r.model.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
        assert_eq!(board.best().unwrap().model, "b");
    }

    #[test]
    fn ties_keep_input_order() {
        let board = Leaderboard::from_scores(vec![
            ("first".to_string(), scores(5.0)),
            ("second".to_string(), scores(5.0)),
            ("best".to_string(), scores(1.0)),
        ]);
        let order: Vec<&str> = board.rows().iter().map(|r| r.model.as_str()).collect();
        assert_eq!(order, vec!["best", "first", "second"]);
    }

    #[test]
    fn find_falls_back_to_case_insensitive() {
        let board = Leaderboard::from_scores(vec![("Seasonal-Naive".to_string(), scores(3.0))]);
        assert!(board.find("Seasonal-Naive").is_some());
        assert!(board.find(" seasonal-naive ").is_some());
        assert!(board.find("Prophet").is_none());
    }

    #[test]
    fn evaluate_models_propagates_shape_errors() {
        let preds = vec![
            ModelPredictions { model: "ok".to_string(), values: vec![1.0, 2.0] },
            ModelPredictions { model: "short".to_string(), values: vec![1.0] },
        ];
        assert!(matches!(
            evaluate_models(&[1.0, 2.0], &preds),
            Err(MetricError::Shape { .. })
        ));
    }

    #[test]
    fn evaluate_models_ranks() {
        let preds = vec![
            ModelPredictions { model: "worse".to_string(), values: vec![120.0, 80.0] },
            ModelPredictions { model: "better".to_string(), values: vec![101.0, 99.0] },
        ];
        let board = evaluate_models(&[100.0, 100.0], &preds).unwrap();
        assert_eq!(board.rows()[0].model, "better");
        assert!((board.rows()[1].scores.mape - 20.0).abs() < 1e-12);
    }
}
