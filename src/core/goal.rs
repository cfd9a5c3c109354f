//! Goal business logic - monthly revenue targets.

use crate::{
    core::audit::{self, AuditEvent, RecordKind},
    entities::{Goal, goal},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Deserialize;

/// Editable goal fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalInput {
    pub title: String,
    /// `YYYY-MM`
    pub period: String,
    pub target_amount: f64,
}

/// Parses a `YYYY-MM` period into the first day of that month.
pub fn parse_period(period: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{period}-01"), "%Y-%m-%d")
        .map_err(|_| Error::validation(format!("Некорректный период «{period}», ожидается ГГГГ-ММ")))
}

fn validate(input: &GoalInput) -> Result<()> {
    if input.title.trim().is_empty() {
        return Err(Error::validation("Название цели не может быть пустым"));
    }
    parse_period(&input.period)?;
    if !input.target_amount.is_finite() || input.target_amount <= 0.0 {
        return Err(Error::validation("Цель должна быть положительным числом"));
    }
    Ok(())
}

/// Lists goals, most recent period first.
pub async fn get_goals(db: &DatabaseConnection) -> Result<Vec<goal::Model>> {
    Goal::find()
        .order_by_desc(goal::Column::Period)
        .order_by_asc(goal::Column::Title)
        .all(db)
        .await
        .map_err(Into::into)
}

pub async fn get_goal_by_id(db: &DatabaseConnection, goal_id: i64) -> Result<Option<goal::Model>> {
    Goal::find_by_id(goal_id).one(db).await.map_err(Into::into)
}

pub async fn create_goal(
    db: &DatabaseConnection,
    input: GoalInput,
    who_did: &str,
) -> Result<goal::Model> {
    validate(&input)?;

    let txn = db.begin().await?;
    let created = goal::ActiveModel {
        title: Set(input.title.trim().to_string()),
        period: Set(input.period),
        target_amount: Set(input.target_amount),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    audit::record(
        &txn,
        who_did,
        &AuditEvent::RecordCreated {
            kind: RecordKind::Goal,
            id: created.id,
            name: created.title.clone(),
        },
    )
    .await?;

    txn.commit().await?;
    Ok(created)
}

pub async fn update_goal(
    db: &DatabaseConnection,
    goal_id: i64,
    input: GoalInput,
    who_did: &str,
) -> Result<goal::Model> {
    validate(&input)?;

    let txn = db.begin().await?;
    let mut model: goal::ActiveModel = Goal::find_by_id(goal_id)
        .one(&txn)
        .await?
        .ok_or(Error::GoalNotFound { id: goal_id })?
        .into();
    model.title = Set(input.title.trim().to_string());
    model.period = Set(input.period);
    model.target_amount = Set(input.target_amount);
    let updated = model.update(&txn).await?;

    audit::record(
        &txn,
        who_did,
        &AuditEvent::RecordUpdated {
            kind: RecordKind::Goal,
            id: updated.id,
            name: updated.title.clone(),
        },
    )
    .await?;

    txn.commit().await?;
    Ok(updated)
}

pub async fn delete_goal(db: &DatabaseConnection, goal_id: i64, who_did: &str) -> Result<()> {
    let txn = db.begin().await?;
    let existing = Goal::find_by_id(goal_id)
        .one(&txn)
        .await?
        .ok_or(Error::GoalNotFound { id: goal_id })?;

    audit::record(
        &txn,
        who_did,
        &AuditEvent::RecordDeleted {
            kind: RecordKind::Goal,
            id: existing.id,
            name: existing.title.clone(),
        },
    )
    .await?;
    existing.delete(&txn).await?;

    txn.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    fn input(period: &str, target: f64) -> GoalInput {
        GoalInput {
            title: "Выручка".to_string(),
            period: period.to_string(),
            target_amount: target,
        }
    }

    #[test]
    fn test_parse_period() {
        assert_eq!(
            parse_period("2026-03").unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
        );
        assert!(parse_period("2026-13").is_err());
        assert!(parse_period("март").is_err());
    }

    #[tokio::test]
    async fn test_goal_crud() -> Result<()> {
        let db = setup_test_db().await?;

        let err = create_goal(&db, input("2026-03", 0.0), "admin")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));

        let goal = create_goal(&db, input("2026-03", 100_000.0), "admin").await?;
        create_goal(&db, input("2026-04", 120_000.0), "admin").await?;

        let goals = get_goals(&db).await?;
        assert_eq!(goals.len(), 2);
        assert_eq!(goals[0].period, "2026-04");

        let updated = update_goal(&db, goal.id, input("2026-03", 90_000.0), "admin").await?;
        assert_eq!(updated.target_amount, 90_000.0);

        delete_goal(&db, goal.id, "admin").await?;
        assert!(get_goal_by_id(&db, goal.id).await?.is_none());

        let err = delete_goal(&db, goal.id, "admin").await.unwrap_err();
        assert!(matches!(err, Error::GoalNotFound { .. }));

        Ok(())
    }
}
