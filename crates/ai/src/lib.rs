//! `vitach-ai`
//!
//! Heuristic "prediction" jobs over read-only snapshots.
//!
//! Kept apart from the domain crates:
//! - jobs take plain snapshots built by callers, never aggregates or stores;
//! - jobs never mutate anything;
//! - they emit insights ([`AiResult`]), not domain events.

pub mod job;
pub mod result;
pub mod stock_forecast;

pub use job::AiJob;
pub use result::{AiError, AiResult};
pub use stock_forecast::{
    OrderedQuantity, RecommendationKind, RecommendationPriority, StockForecastJob, StockLevelSnapshot,
    StockForecastInput, StockRecommendation,
};
