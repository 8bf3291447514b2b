//! Query functions for user notifications.
//!
//! Fan-out batches go through [`insert_batch`], which writes every
//! recipient's copy in a single statement so a broadcast is
//! all-or-nothing.

use std::fmt::Write as _;

use firewatch_database_models::{NewNotification, NotificationRow};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};

use crate::{DbError, parse_timestamp};

/// Inserts a batch of notifications in one statement. Returns the
/// number of rows written.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails. Either every
/// notification in the batch lands or none do.
pub async fn insert_batch(
    db: &dyn Database,
    notifications: &[NewNotification],
) -> Result<u64, DbError> {
    if notifications.is_empty() {
        return Ok(0);
    }

    let now = chrono::Utc::now().to_rfc3339();
    let mut sql = String::from(
        "INSERT INTO notifications (id, user_id, sender_id, title, message, type, read, report_id, created_at) VALUES ",
    );
    let mut params: Vec<DatabaseValue> = Vec::with_capacity(notifications.len() * 8);
    let mut param_idx = 1;

    for (i, notification) in notifications.iter().enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        write!(
            sql,
            "(${}, ${}, ${}, ${}, ${}, ${}, FALSE, ${}, ${})",
            param_idx,
            param_idx + 1,
            param_idx + 2,
            param_idx + 3,
            param_idx + 4,
            param_idx + 5,
            param_idx + 6,
            param_idx + 7,
        )
        .map_err(|e| DbError::Conversion {
            message: format!("Failed to build batch insert: {e}"),
        })?;
        param_idx += 8;

        params.push(DatabaseValue::String(uuid::Uuid::new_v4().to_string()));
        params.push(DatabaseValue::String(notification.user_id.clone()));
        params.push(
            notification
                .sender_id
                .as_ref()
                .map_or(DatabaseValue::Null, |v| DatabaseValue::String(v.clone())),
        );
        params.push(DatabaseValue::String(notification.title.clone()));
        params.push(DatabaseValue::String(notification.message.clone()));
        params.push(DatabaseValue::String(notification.kind.clone()));
        params.push(
            notification
                .report_id
                .as_ref()
                .map_or(DatabaseValue::Null, |v| DatabaseValue::String(v.clone())),
        );
        params.push(DatabaseValue::String(now.clone()));
    }

    Ok(db.exec_raw_params(&sql, &params).await?)
}

/// Fetches a user's notifications, newest first.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn list_for_user(
    db: &dyn Database,
    user_id: &str,
) -> Result<Vec<NotificationRow>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT * FROM notifications WHERE user_id = $1 ORDER BY created_at DESC",
            &[DatabaseValue::String(user_id.to_string())],
        )
        .await?;

    Ok(rows.iter().map(row_to_notification).collect())
}

/// Counts a user's unread notifications.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn unread_count(db: &dyn Database, user_id: &str) -> Result<u64, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id FROM notifications WHERE user_id = $1 AND read = FALSE",
            &[DatabaseValue::String(user_id.to_string())],
        )
        .await?;

    Ok(rows.len() as u64)
}

/// Marks one notification read, scoped to its owner.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn mark_read(db: &dyn Database, user_id: &str, id: &str) -> Result<(), DbError> {
    db.exec_raw_params(
        "UPDATE notifications SET read = TRUE WHERE id = $1 AND user_id = $2",
        &[
            DatabaseValue::String(id.to_string()),
            DatabaseValue::String(user_id.to_string()),
        ],
    )
    .await?;

    Ok(())
}

/// Marks all of a user's notifications read.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn mark_all_read(db: &dyn Database, user_id: &str) -> Result<(), DbError> {
    db.exec_raw_params(
        "UPDATE notifications SET read = TRUE WHERE user_id = $1",
        &[DatabaseValue::String(user_id.to_string())],
    )
    .await?;

    Ok(())
}

/// Deletes all of a user's read notifications.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn delete_read(db: &dyn Database, user_id: &str) -> Result<u64, DbError> {
    Ok(db
        .exec_raw_params(
            "DELETE FROM notifications WHERE user_id = $1 AND read = TRUE",
            &[DatabaseValue::String(user_id.to_string())],
        )
        .await?)
}

fn row_to_notification(row: &switchy_database::Row) -> NotificationRow {
    let created_at: String = row.to_value("created_at").unwrap_or_default();
    NotificationRow {
        id: row.to_value("id").unwrap_or_default(),
        user_id: row.to_value("user_id").unwrap_or_default(),
        sender_id: row.to_value("sender_id").unwrap_or_default(),
        title: row.to_value("title").unwrap_or_default(),
        message: row.to_value("message").unwrap_or_default(),
        kind: row.to_value("type").unwrap_or_default(),
        read: row.to_value("read").unwrap_or_default(),
        report_id: row.to_value("report_id").unwrap_or_default(),
        created_at: parse_timestamp(&created_at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_db;

    fn alert(user_id: &str) -> NewNotification {
        NewNotification {
            user_id: user_id.to_string(),
            sender_id: Some("sender-1".to_string()),
            title: "Fire Alert".to_string(),
            message: "New fire report FR-20251102-AB12".to_string(),
            kind: "alert".to_string(),
            report_id: None,
        }
    }

    #[tokio::test]
    async fn batch_insert_writes_all_recipients() {
        let db = test_db().await;
        let batch: Vec<_> = ["u1", "u2", "u3"].iter().map(|u| alert(u)).collect();

        let written = insert_batch(db.as_ref(), &batch).await.unwrap();
        assert_eq!(written, 3);

        let u2 = list_for_user(db.as_ref(), "u2").await.unwrap();
        assert_eq!(u2.len(), 1);
        assert_eq!(u2[0].title, "Fire Alert");
        assert!(!u2[0].read);
    }

    #[tokio::test]
    async fn empty_batch_is_a_noop() {
        let db = test_db().await;
        assert_eq!(insert_batch(db.as_ref(), &[]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn read_lifecycle() {
        let db = test_db().await;
        insert_batch(db.as_ref(), &[alert("u1"), alert("u1"), alert("u1")])
            .await
            .unwrap();
        assert_eq!(unread_count(db.as_ref(), "u1").await.unwrap(), 3);

        let notifications = list_for_user(db.as_ref(), "u1").await.unwrap();
        mark_read(db.as_ref(), "u1", &notifications[0].id)
            .await
            .unwrap();
        assert_eq!(unread_count(db.as_ref(), "u1").await.unwrap(), 2);

        mark_all_read(db.as_ref(), "u1").await.unwrap();
        assert_eq!(unread_count(db.as_ref(), "u1").await.unwrap(), 0);

        let deleted = delete_read(db.as_ref(), "u1").await.unwrap();
        assert_eq!(deleted, 3);
        assert!(list_for_user(db.as_ref(), "u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn mark_read_is_owner_scoped() {
        let db = test_db().await;
        insert_batch(db.as_ref(), &[alert("u1")]).await.unwrap();
        let id = list_for_user(db.as_ref(), "u1").await.unwrap()[0].id.clone();

        mark_read(db.as_ref(), "u2", &id).await.unwrap();
        assert_eq!(unread_count(db.as_ref(), "u1").await.unwrap(), 1);
    }
}
