//! Query functions for user profiles, roles, and daily availability.

use chrono::NaiveDate;
use firewatch_database_models::{DailyStatusRow, ProfileRow};
use firewatch_fire_models::{AppRole, AvailabilityStatus};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};

use crate::DbError;

/// Fetches one profile by user id, or `None` if it doesn't exist.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn get_profile(db: &dyn Database, user_id: &str) -> Result<Option<ProfileRow>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT * FROM profiles WHERE id = $1",
            &[DatabaseValue::String(user_id.to_string())],
        )
        .await?;

    Ok(rows.first().map(row_to_profile))
}

/// Fetches all profiles, ordered by name.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn list_profiles(db: &dyn Database) -> Result<Vec<ProfileRow>, DbError> {
    let rows = db
        .query_raw_params("SELECT * FROM profiles ORDER BY name", &[])
        .await?;

    Ok(rows.iter().map(row_to_profile).collect())
}

/// Fetches the user ids of all broadcast recipients: every profile
/// except the sender's.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn broadcast_targets(db: &dyn Database, sender_id: &str) -> Result<Vec<String>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id FROM profiles WHERE id <> $1",
            &[DatabaseValue::String(sender_id.to_string())],
        )
        .await?;

    Ok(rows
        .iter()
        .map(|row| row.to_value("id").unwrap_or_default())
        .collect())
}

/// Fetches the application role of a user. Users without a role row
/// default to [`AppRole::User`].
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn get_role(db: &dyn Database, user_id: &str) -> Result<AppRole, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT role FROM user_roles WHERE user_id = $1",
            &[DatabaseValue::String(user_id.to_string())],
        )
        .await?;

    Ok(rows
        .first()
        .and_then(|row| {
            let role: String = row.to_value("role").unwrap_or_default();
            role.parse().ok()
        })
        .unwrap_or(AppRole::User))
}

/// Records a user's availability for one day and syncs the live status
/// on their profile.
///
/// One record per (user, day): a second write for the same day replaces
/// the first.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn set_daily_status(
    db: &dyn Database,
    user_id: &str,
    date: NaiveDate,
    status: AvailabilityStatus,
) -> Result<(), DbError> {
    let date_str = date.format("%Y-%m-%d").to_string();

    let updated = db
        .exec_raw_params(
            "UPDATE daily_status_history SET status = $1 WHERE user_id = $2 AND date = $3",
            &[
                DatabaseValue::String(status.to_string()),
                DatabaseValue::String(user_id.to_string()),
                DatabaseValue::String(date_str.clone()),
            ],
        )
        .await?;

    if updated == 0 {
        db.exec_raw_params(
            "INSERT INTO daily_status_history (id, user_id, date, status)
             VALUES ($1, $2, $3, $4)",
            &[
                DatabaseValue::String(uuid::Uuid::new_v4().to_string()),
                DatabaseValue::String(user_id.to_string()),
                DatabaseValue::String(date_str),
                DatabaseValue::String(status.to_string()),
            ],
        )
        .await?;
    }

    db.exec_raw_params(
        "UPDATE profiles SET current_status = $1, updated_at = $2 WHERE id = $3",
        &[
            DatabaseValue::String(status.to_string()),
            DatabaseValue::String(chrono::Utc::now().to_rfc3339()),
            DatabaseValue::String(user_id.to_string()),
        ],
    )
    .await?;

    Ok(())
}

/// Fetches a user's availability history, newest day first.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn daily_status_history(
    db: &dyn Database,
    user_id: &str,
) -> Result<Vec<DailyStatusRow>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT * FROM daily_status_history WHERE user_id = $1 ORDER BY date DESC",
            &[DatabaseValue::String(user_id.to_string())],
        )
        .await?;

    Ok(rows
        .iter()
        .map(|row| {
            let date: String = row.to_value("date").unwrap_or_default();
            let status: String = row.to_value("status").unwrap_or_default();
            DailyStatusRow {
                user_id: row.to_value("user_id").unwrap_or_default(),
                date: NaiveDate::parse_from_str(&date, "%Y-%m-%d").unwrap_or_default(),
                status: status.parse().unwrap_or(AvailabilityStatus::Unavailable),
            }
        })
        .collect())
}

/// Inserts a profile. Used when a new user registers.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn insert_profile(db: &dyn Database, profile: &ProfileRow) -> Result<(), DbError> {
    db.exec_raw_params(
        "INSERT INTO profiles (id, name, email, operation_center, current_status, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6)",
        &[
            DatabaseValue::String(profile.id.clone()),
            DatabaseValue::String(profile.name.clone()),
            DatabaseValue::String(profile.email.clone()),
            DatabaseValue::String(profile.operation_center.clone()),
            DatabaseValue::String(profile.current_status.to_string()),
            DatabaseValue::String(chrono::Utc::now().to_rfc3339()),
        ],
    )
    .await?;

    Ok(())
}

fn row_to_profile(row: &switchy_database::Row) -> ProfileRow {
    let status: String = row.to_value("current_status").unwrap_or_default();
    ProfileRow {
        id: row.to_value("id").unwrap_or_default(),
        name: row.to_value("name").unwrap_or_default(),
        email: row.to_value("email").unwrap_or_default(),
        operation_center: row.to_value("operation_center").unwrap_or_default(),
        current_status: status.parse().unwrap_or(AvailabilityStatus::Available),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_db;

    fn sample_profile(id: &str, name: &str) -> ProfileRow {
        ProfileRow {
            id: id.to_string(),
            name: name.to_string(),
            email: format!("{name}@firewatch.example"),
            operation_center: "OC-01".to_string(),
            current_status: AvailabilityStatus::Available,
        }
    }

    #[tokio::test]
    async fn broadcast_targets_exclude_sender() {
        let db = test_db().await;
        insert_profile(db.as_ref(), &sample_profile("u1", "alpha"))
            .await
            .unwrap();
        insert_profile(db.as_ref(), &sample_profile("u2", "bravo"))
            .await
            .unwrap();
        insert_profile(db.as_ref(), &sample_profile("u3", "charlie"))
            .await
            .unwrap();

        let mut targets = broadcast_targets(db.as_ref(), "u2").await.unwrap();
        targets.sort();
        assert_eq!(targets, vec!["u1".to_string(), "u3".to_string()]);
    }

    #[tokio::test]
    async fn daily_status_replaces_same_day_and_syncs_profile() {
        let db = test_db().await;
        insert_profile(db.as_ref(), &sample_profile("u1", "alpha"))
            .await
            .unwrap();

        let today = NaiveDate::from_ymd_opt(2025, 11, 2).unwrap();
        set_daily_status(db.as_ref(), "u1", today, AvailabilityStatus::Unavailable)
            .await
            .unwrap();
        set_daily_status(db.as_ref(), "u1", today, AvailabilityStatus::Available)
            .await
            .unwrap();

        let history = daily_status_history(db.as_ref(), "u1").await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, AvailabilityStatus::Available);

        let profile = get_profile(db.as_ref(), "u1").await.unwrap().unwrap();
        assert_eq!(profile.current_status, AvailabilityStatus::Available);
    }

    #[tokio::test]
    async fn role_defaults_to_user() {
        let db = test_db().await;
        assert_eq!(get_role(db.as_ref(), "nobody").await.unwrap(), AppRole::User);

        db.exec_raw_params(
            "INSERT INTO user_roles (id, user_id, role, created_at) VALUES ($1, $2, $3, $4)",
            &[
                DatabaseValue::String(uuid::Uuid::new_v4().to_string()),
                DatabaseValue::String("u1".to_string()),
                DatabaseValue::String("admin".to_string()),
                DatabaseValue::String(chrono::Utc::now().to_rfc3339()),
            ],
        )
        .await
        .unwrap();

        assert_eq!(get_role(db.as_ref(), "u1").await.unwrap(), AppRole::Admin);
    }
}
