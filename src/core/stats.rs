//! Statistics for the dashboards.
//!
//! Aggregation happens in memory over the filtered rows; the tables involved stay small
//! (hundreds of orders per month).

use crate::{
    core::{goal, types::OrderState},
    entities::{Distributor, Goal, LeafletOrder, Order, goal as goal_entity, leaflet_order, order},
    errors::{Error, Result},
};
use chrono::{DateTime, Months, NaiveTime, Utc};
use sea_orm::{DatabaseConnection, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Optional half-open time range `[from, to)`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Period {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl Period {
    /// The calendar month named by a `YYYY-MM` string.
    pub fn month(period: &str) -> Result<Self> {
        let start = goal::parse_period(period)?;
        let end = start
            .checked_add_months(Months::new(1))
            .ok_or_else(|| Error::validation(format!("Некорректный период «{period}»")))?;
        Ok(Self {
            from: Some(start.and_time(NaiveTime::MIN).and_utc()),
            to: Some(end.and_time(NaiveTime::MIN).and_utc()),
        })
    }

    fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| at >= from) && self.to.is_none_or(|to| at < to)
    }
}

/// One distributor's share of the leaflet work.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DistributorStats {
    pub distributor_id: i64,
    pub name: String,
    pub orders: u64,
    pub given: i64,
    pub returned: i64,
    pub profit: f64,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DistributionTotals {
    pub orders: u64,
    pub requested: i64,
    pub given: i64,
    pub returned: i64,
    pub profit: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionSummary {
    pub per_distributor: Vec<DistributorStats>,
    pub totals: DistributionTotals,
    pub by_state: BTreeMap<String, u64>,
}

/// Summarises leaflet orders created within `period`.
pub async fn distribution_summary(
    db: &DatabaseConnection,
    period: &Period,
) -> Result<DistributionSummary> {
    let orders: Vec<leaflet_order::Model> = LeafletOrder::find()
        .all(db)
        .await?
        .into_iter()
        .filter(|o| period.contains(o.created_at))
        .collect();

    let names: HashMap<i64, String> = Distributor::find()
        .all(db)
        .await?
        .into_iter()
        .map(|d| (d.id, d.name))
        .collect();

    let mut per_distributor: BTreeMap<i64, DistributorStats> = BTreeMap::new();
    let mut totals = DistributionTotals::default();
    let mut by_state = BTreeMap::new();

    for o in &orders {
        *by_state.entry(o.state.clone()).or_insert(0) += 1;

        let given = o.given.unwrap_or(0);
        let returned = o.returned.unwrap_or(0);

        totals.orders += 1;
        totals.requested += o.quantity;
        totals.given += given;
        totals.returned += returned;
        totals.profit += o.distributor_profit;

        let entry = per_distributor
            .entry(o.distributor_id)
            .or_insert_with(|| DistributorStats {
                distributor_id: o.distributor_id,
                name: names.get(&o.distributor_id).cloned().unwrap_or_default(),
                orders: 0,
                given: 0,
                returned: 0,
                profit: 0.0,
            });
        entry.orders += 1;
        entry.given += given;
        entry.returned += returned;
        entry.profit += o.distributor_profit;
    }

    let mut per_distributor: Vec<_> = per_distributor.into_values().collect();
    per_distributor.sort_by(|a, b| b.profit.total_cmp(&a.profit).then(a.name.cmp(&b.name)));

    Ok(DistributionSummary {
        per_distributor,
        totals,
        by_state,
    })
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub by_state: BTreeMap<String, u64>,
    pub done: u64,
    pub revenue: f64,
}

/// Summarises customer orders scheduled within `period`.
pub async fn order_summary(db: &DatabaseConnection, period: &Period) -> Result<OrderSummary> {
    let orders = Order::find().all(db).await?;

    let mut by_state = BTreeMap::new();
    let mut done = 0;
    let mut revenue = 0.0;
    for o in orders.iter().filter(|o| period.contains(o.scheduled_at)) {
        *by_state.entry(o.state.clone()).or_insert(0) += 1;
        if o.state == OrderState::Done.as_str() {
            done += 1;
            revenue += o.price.unwrap_or(0.0);
        }
    }

    Ok(OrderSummary {
        by_state,
        done,
        revenue,
    })
}

/// A goal together with the revenue earned towards it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    pub goal: goal_entity::Model,
    pub revenue: f64,
    /// Percentage of the target reached; may exceed 100
    pub progress_percent: f64,
    pub progress_bar: String,
}

/// Calculates progress as a percentage of the target.
#[must_use]
pub fn calculate_progress(amount: f64, target: f64) -> f64 {
    if target <= 0.0 {
        return 0.0;
    }
    (amount / target) * 100.0
}

/// Renders a text progress bar like `[████████░░] 80.0%`.
#[must_use]
pub fn format_progress_bar(progress_percent: f64, bar_length: Option<usize>) -> String {
    let length = bar_length.unwrap_or(10);
    let clamped = progress_percent.clamp(0.0, 100.0);

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let filled = ((clamped / 100.0) * length as f64).round() as usize;
    let empty = length.saturating_sub(filled);

    format!(
        "[{}{}] {progress_percent:.1}%",
        "█".repeat(filled),
        "░".repeat(empty)
    )
}

/// Progress of one goal, counting `DONE` orders scheduled in the goal's month.
pub async fn goal_progress(db: &DatabaseConnection, goal_id: i64) -> Result<GoalProgress> {
    let goal = Goal::find_by_id(goal_id)
        .one(db)
        .await?
        .ok_or(Error::GoalNotFound { id: goal_id })?;
    progress_for(db, goal).await
}

/// Progress of every goal, most recent period first.
pub async fn all_goal_progress(db: &DatabaseConnection) -> Result<Vec<GoalProgress>> {
    let mut result = Vec::new();
    for g in goal::get_goals(db).await? {
        result.push(progress_for(db, g).await?);
    }
    Ok(result)
}

async fn progress_for(db: &DatabaseConnection, goal: goal_entity::Model) -> Result<GoalProgress> {
    let period = Period::month(&goal.period)?;
    let revenue: f64 = Order::find()
        .filter(order::Column::State.eq(OrderState::Done.as_str()))
        .all(db)
        .await?
        .iter()
        .filter(|o| period.contains(o.scheduled_at))
        .filter_map(|o| o.price)
        .sum();

    let progress_percent = calculate_progress(revenue, goal.target_amount);
    Ok(GoalProgress {
        progress_bar: format_progress_bar(progress_percent, None),
        goal,
        revenue,
        progress_percent,
    })
}
