use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::job::AiJob;
use crate::result::{AiError, AiResult};

/// Days of consumption to order when a stock-out is near.
const URGENT_COVER_DAYS: f64 = 30.0;
/// Days of consumption to plan for when the reorder point is near.
const PLANNED_COVER_DAYS: f64 = 21.0;
/// Target holding, in days of consumption.
const OPTIMAL_COVER_DAYS: f64 = 45.0;
const OVERSTOCK_FACTOR: f64 = 1.5;
const URGENT_HORIZON_DAYS: f64 = 7.0;
const WARNING_HORIZON_DAYS: f64 = 14.0;
/// Share of items with active consumption above which a global review is advised.
const GLOBAL_REVIEW_SHARE: f64 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockLevelSnapshot {
    pub item_id: String,
    pub name: String,
    pub quantity: i64,
    pub reorder_threshold: i64,
}

/// One order line counted as consumption of the article it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderedQuantity {
    pub article: String,
    pub quantity: u64,
    pub ordered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    Urgent,
    Warning,
    Optimization,
    System,
}

/// Declared lowest first so that sorting descending puts `High` on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationPriority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecommendation {
    /// Stock item id, or `global` for fleet-wide advice.
    pub item_id: String,
    pub article: String,
    pub kind: RecommendationKind,
    pub priority: RecommendationPriority,
    pub message: String,
    pub recommendation: String,
    pub confidence: f64,
    /// Suggested order size in units, when there is one.
    pub suggested_quantity: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockForecastInput {
    pub items: Vec<StockLevelSnapshot>,
    pub orders: Vec<OrderedQuantity>,
    pub as_of: DateTime<Utc>,
}

/// Consumption-rate heuristics over stock levels and order history.
///
/// Daily rate of an item is the quantity ordered under its name divided by the
/// days since the earliest such order (at least one day).
#[derive(Debug, Clone)]
pub struct StockForecastJob {
    input: StockForecastInput,
}

impl StockForecastJob {
    pub fn new(
        items: Vec<StockLevelSnapshot>,
        orders: Vec<OrderedQuantity>,
        as_of: DateTime<Utc>,
    ) -> Self {
        Self {
            input: StockForecastInput {
                items,
                orders,
                as_of,
            },
        }
    }

    fn daily_rate(&self, item: &StockLevelSnapshot) -> Option<f64> {
        let mut total = 0u64;
        let mut first: Option<DateTime<Utc>> = None;
        for o in self.input.orders.iter().filter(|o| o.article == item.name) {
            total += o.quantity;
            first = Some(first.map_or(o.ordered_at, |f| f.min(o.ordered_at)));
        }
        let first = first?;
        let days = (self.input.as_of - first).num_seconds() as f64 / 86_400.0;
        Some(total as f64 / days.max(1.0))
    }

    /// Recommendations sorted by priority, highest first.
    pub fn recommendations(&self) -> Vec<StockRecommendation> {
        let mut out = Vec::new();
        let mut consuming = 0usize;

        for item in &self.input.items {
            let Some(rate) = self.daily_rate(item) else {
                continue;
            };
            if rate <= 0.0 {
                continue;
            }
            consuming += 1;

            let stock = item.quantity as f64;
            let days_until_empty = stock / rate;
            let days_until_low = (stock - item.reorder_threshold as f64) / rate;

            if days_until_empty < URGENT_HORIZON_DAYS {
                let qty = (rate * URGENT_COVER_DAYS).ceil() as u64;
                out.push(StockRecommendation {
                    item_id: item.item_id.clone(),
                    article: item.name.clone(),
                    kind: RecommendationKind::Urgent,
                    priority: RecommendationPriority::High,
                    message: format!(
                        "Rupture de stock prévue dans {} jours",
                        days_until_empty.round().max(0.0)
                    ),
                    recommendation: format!("Commander immédiatement {qty} unités"),
                    confidence: 0.95,
                    suggested_quantity: Some(qty),
                });
            } else if days_until_low < WARNING_HORIZON_DAYS {
                let qty = (rate * PLANNED_COVER_DAYS).ceil() as u64;
                out.push(StockRecommendation {
                    item_id: item.item_id.clone(),
                    article: item.name.clone(),
                    kind: RecommendationKind::Warning,
                    priority: RecommendationPriority::Medium,
                    message: format!(
                        "Stock faible prévu dans {} jours",
                        days_until_low.round().max(0.0)
                    ),
                    recommendation: format!("Planifier une commande de {qty} unités"),
                    confidence: 0.85,
                    suggested_quantity: Some(qty),
                });
            }

            let optimal = (rate * OPTIMAL_COVER_DAYS).ceil();
            if stock > optimal * OVERSTOCK_FACTOR {
                out.push(StockRecommendation {
                    item_id: item.item_id.clone(),
                    article: item.name.clone(),
                    kind: RecommendationKind::Optimization,
                    priority: RecommendationPriority::Low,
                    message: "Stock excédentaire détecté".to_string(),
                    recommendation: format!(
                        "Réduire les commandes futures. Stock optimal: {optimal} unités"
                    ),
                    confidence: 0.75,
                    suggested_quantity: None,
                });
            }
        }

        if !self.input.items.is_empty()
            && consuming as f64 > self.input.items.len() as f64 * GLOBAL_REVIEW_SHARE
        {
            out.push(StockRecommendation {
                item_id: "global".to_string(),
                article: "Système global".to_string(),
                kind: RecommendationKind::System,
                priority: RecommendationPriority::High,
                message: "Plus de 30% des articles ont des taux de consommation élevés".to_string(),
                recommendation: "Réviser la stratégie d'approvisionnement globale".to_string(),
                confidence: 0.9,
                suggested_quantity: None,
            });
        }

        // Stable sort keeps per-item order within a priority.
        out.sort_by(|a, b| b.priority.cmp(&a.priority));
        out
    }
}

impl AiJob for StockForecastJob {
    type Input = StockForecastInput;

    fn input(&self) -> &Self::Input {
        &self.input
    }

    fn run(&self) -> Result<AiResult, AiError> {
        let recommendations = self.recommendations();
        let confidence = if recommendations.is_empty() {
            1.0
        } else {
            recommendations.iter().map(|r| r.confidence).sum::<f64>() / recommendations.len() as f64
        };

        let payload = serde_json::to_value(&recommendations)
            .map_err(|e| AiError::Encode(e.to_string()))?;

        Ok(AiResult::new(recommendations.len() as f64, confidence)
            .with_explanation(format!(
                "{} recommendation(s) from consumption rates over {} stock item(s) and {} order line(s)",
                recommendations.len(),
                self.input.items.len(),
                self.input.orders.len()
            ))
            .with_metadata(json!({
                "kind": "stock.forecast",
                "as_of": self.input.as_of,
                "recommendations": payload,
            })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn item(id: &str, name: &str, quantity: i64, threshold: i64) -> StockLevelSnapshot {
        StockLevelSnapshot {
            item_id: id.to_string(),
            name: name.to_string(),
            quantity,
            reorder_threshold: threshold,
        }
    }

    fn ordered(article: &str, quantity: u64, at: DateTime<Utc>) -> OrderedQuantity {
        OrderedQuantity {
            article: article.to_string(),
            quantity,
            ordered_at: at,
        }
    }

    #[test]
    fn near_stock_out_is_urgent_with_thirty_days_of_cover() {
        let now = Utc::now();
        // 100 units over 10 days: 10 per day; 20 on hand lasts 2 days.
        let job = StockForecastJob::new(
            vec![item("s1", "Papier A4", 20, 5)],
            vec![ordered("Papier A4", 60, now - Duration::days(10)), ordered("Papier A4", 40, now)],
            now,
        );

        let recs = job.recommendations();
        assert_eq!(recs[0].kind, RecommendationKind::Urgent);
        assert_eq!(recs[0].suggested_quantity, Some(300));
        assert!(recs.iter().any(|r| r.kind == RecommendationKind::System));
    }

    #[test]
    fn approaching_threshold_warns_and_overstock_is_flagged() {
        let now = Utc::now();
        // 1 unit per day over 10 days.
        let orders = vec![ordered("Toner", 10, now - Duration::days(10)), ordered("Stylo", 10, now - Duration::days(10))];
        let job = StockForecastJob::new(
            vec![item("t", "Toner", 15, 5), item("s", "Stylo", 500, 5), item("x", "Agrafes", 3, 5)],
            orders,
            now,
        );

        let recs = job.recommendations();
        let toner = recs.iter().find(|r| r.item_id == "t").unwrap();
        assert_eq!(toner.kind, RecommendationKind::Warning);
        assert_eq!(toner.suggested_quantity, Some(21));

        let stylo = recs.iter().find(|r| r.item_id == "s").unwrap();
        assert_eq!(stylo.kind, RecommendationKind::Optimization);

        assert!(recs.iter().all(|r| r.item_id != "x"));
        assert!(recs.windows(2).all(|w| w[0].priority >= w[1].priority));
    }

    #[test]
    fn run_wraps_recommendations() {
        let now = Utc::now();
        let job = StockForecastJob::new(vec![item("a", "Encre", 50, 5)], vec![], now);
        let result = job.run().unwrap();
        assert_eq!(result.score, 0.0);
        assert_eq!(result.confidence, 1.0);
        assert_eq!(result.metadata["kind"], "stock.forecast");
    }
}
