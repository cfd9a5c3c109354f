use crate::{
    api::{
        auth::{CurrentUser, Permission},
        state::AppState,
    },
    core::stats::{self, DistributionSummary, GoalProgress, OrderSummary, Period},
    errors::Result,
};
use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Either an explicit `from`/`to` range or a `month` (`YYYY-MM`); `month` wins.
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub month: Option<String>,
}

impl PeriodQuery {
    fn period(&self) -> Result<Period> {
        match &self.month {
            Some(month) => Period::month(month),
            None => Ok(Period {
                from: self.from,
                to: self.to,
            }),
        }
    }
}

/// GET /api/v1/stats/distribution
pub async fn distribution(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<DistributionSummary>> {
    user.require(&[Permission::Stats])?;
    Ok(Json(
        stats::distribution_summary(&state.db, &query.period()?).await?,
    ))
}

/// GET /api/v1/stats/orders
pub async fn orders(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<OrderSummary>> {
    user.require(&[Permission::Stats])?;
    Ok(Json(stats::order_summary(&state.db, &query.period()?).await?))
}

/// GET /api/v1/stats/goals
pub async fn goals(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<GoalProgress>>> {
    user.require(&[Permission::Stats])?;
    Ok(Json(stats::all_goal_progress(&state.db).await?))
}
