use crate::features::FeatureVector;
use serde::Deserialize;
use std::path::Path;

/// Interface for baseline discount sources.
///
/// Implementations never mutate shared state and must be safe to call
/// concurrently from multiple batch workers on the same loaded instance.
pub trait DiscountModel: Send + Sync {
    /// Baseline discount fraction in [0,1]
    fn score(&self, features: &FeatureVector) -> f64;

    /// Model family name
    fn name(&self) -> &str;

    /// Artifact version/id
    fn version(&self) -> &str;
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model artifact unavailable: {0}")]
    Unavailable(String),

    #[error("model artifact malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Versioned linear scoring artifact.
///
/// The artifact is a JSON document with an intercept and per-feature
/// weights; absent features contribute nothing to the score.
#[derive(Debug, Clone, Deserialize)]
pub struct LinearModel {
    pub version: String,
    pub intercept: f64,
    #[serde(default)]
    pub weights: LinearWeights,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinearWeights {
    #[serde(default)]
    pub brand_base_discount: f64,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub inventory_age: f64,
    #[serde(default)]
    pub face_value: f64,
    #[serde(default)]
    pub is_digital: f64,
}

impl LinearModel {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| ModelError::Unavailable(format!("{}: {e}", path.display())))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl DiscountModel for LinearModel {
    fn score(&self, features: &FeatureVector) -> f64 {
        let mut score = self.intercept;
        score += self.weights.brand_base_discount * features.brand_base_discount;
        if let Some(p) = features.popularity {
            score += self.weights.popularity * p;
        }
        if let Some(age) = features.inventory_age {
            score += self.weights.inventory_age * age;
        }
        if let Some(face) = features.face_value {
            score += self.weights.face_value * face;
        }
        if features.is_digital {
            score += self.weights.is_digital;
        }
        score.clamp(0.0, 1.0)
    }

    fn name(&self) -> &str {
        "linear"
    }

    fn version(&self) -> &str {
        &self.version
    }
}

/// Fallback baseline when no artifact is available: the brand's configured
/// base discount. Callers substitute this explicitly and the source shows
/// up in every result's diagnostics.
pub struct HeuristicModel;

impl DiscountModel for HeuristicModel {
    fn score(&self, features: &FeatureVector) -> f64 {
        features.brand_base_discount.clamp(0.0, 1.0)
    }

    fn name(&self) -> &str {
        "heuristic"
    }

    fn version(&self) -> &str {
        "brand-base"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(brand_base: f64) -> FeatureVector {
        FeatureVector {
            brand_base_discount: brand_base,
            unknown_brand: false,
            popularity: Some(0.8),
            inventory_age: Some(0.5),
            face_value: Some(0.2),
            is_digital: false,
            month: None,
            is_weekend: None,
        }
    }

    #[test]
    fn test_linear_model_scores_from_artifact() {
        let artifact = r#"
            {
                "version": "2024.2",
                "intercept": 0.01,
                "weights": {
                    "brand_base_discount": 1.0,
                    "inventory_age": 0.04
                }
            }
        "#;
        let model: LinearModel = serde_json::from_str(artifact).expect("valid artifact");
        assert_eq!(model.version(), "2024.2");

        // 0.01 + 1.0*0.05 + 0.04*0.5
        let score = model.score(&features(0.05));
        assert!((score - 0.08).abs() < 1e-12);
    }

    #[test]
    fn test_linear_model_clamps_to_unit_interval() {
        let model = LinearModel {
            version: "test".to_string(),
            intercept: 5.0,
            weights: LinearWeights::default(),
        };
        assert_eq!(model.score(&features(0.05)), 1.0);

        let model = LinearModel {
            version: "test".to_string(),
            intercept: -5.0,
            weights: LinearWeights::default(),
        };
        assert_eq!(model.score(&features(0.05)), 0.0);
    }

    #[test]
    fn test_missing_features_contribute_nothing() {
        let artifact = r#"
            {
                "version": "2024.2",
                "intercept": 0.0,
                "weights": { "brand_base_discount": 1.0, "popularity": -0.5 }
            }
        "#;
        let model: LinearModel = serde_json::from_str(artifact).expect("valid artifact");

        let mut f = features(0.10);
        f.popularity = None;
        f.inventory_age = None;
        f.face_value = None;
        assert!((model.score(&f) - 0.10).abs() < 1e-12);
    }

    #[test]
    fn test_heuristic_model_returns_brand_base() {
        assert_eq!(HeuristicModel.score(&features(0.12)), 0.12);
        assert_eq!(HeuristicModel.name(), "heuristic");
    }

    #[test]
    fn test_missing_artifact_is_unavailable() {
        let err = LinearModel::from_path("does/not/exist.json").unwrap_err();
        assert!(matches!(err, ModelError::Unavailable(_)));
    }
}
