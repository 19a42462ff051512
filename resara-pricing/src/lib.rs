pub mod bounds;
pub mod features;
pub mod model;
pub mod optimizer;
pub mod price;
pub mod rules;

pub use features::FeatureVector;
pub use model::{DiscountModel, HeuristicModel, LinearModel, ModelError};
pub use optimizer::{Optimizer, RowError};
pub use rules::RuleAdjuster;
