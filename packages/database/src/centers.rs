//! Query functions for operation centers and their equipment inventory.

use firewatch_database_models::{EquipmentRow, OperationCenterRow, StaffCounts};
use firewatch_fire_models::EquipmentType;
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};

use crate::DbError;

/// Fetches all operation centers, ordered by code.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn list_centers(db: &dyn Database) -> Result<Vec<OperationCenterRow>, DbError> {
    let rows = db
        .query_raw_params("SELECT * FROM operation_centers ORDER BY code", &[])
        .await?;

    Ok(rows.iter().map(row_to_center).collect())
}

/// Fetches one operation center by code, or `None` if it doesn't exist.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn get_center(
    db: &dyn Database,
    code: &str,
) -> Result<Option<OperationCenterRow>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT * FROM operation_centers WHERE code = $1",
            &[DatabaseValue::String(code.to_string())],
        )
        .await?;

    Ok(rows.first().map(row_to_center))
}

/// Inserts a new operation center.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails, including when
/// backend policy rejects the write.
pub async fn insert_center(
    db: &dyn Database,
    center: &OperationCenterRow,
    created_by: Option<&str>,
) -> Result<(), DbError> {
    db.exec_raw_params(
        "INSERT INTO operation_centers
            (code, name, location, latitude, longitude, description, staff_count, created_by, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        &[
            DatabaseValue::String(center.code.clone()),
            DatabaseValue::String(center.name.clone()),
            center
                .location
                .as_ref()
                .map_or(DatabaseValue::Null, |v| DatabaseValue::String(v.clone())),
            center
                .latitude
                .map_or(DatabaseValue::Null, DatabaseValue::Real64),
            center
                .longitude
                .map_or(DatabaseValue::Null, DatabaseValue::Real64),
            center
                .description
                .as_ref()
                .map_or(DatabaseValue::Null, |v| DatabaseValue::String(v.clone())),
            DatabaseValue::Int64(center.staff_count),
            created_by.map_or(DatabaseValue::Null, |v| DatabaseValue::String(v.to_string())),
            DatabaseValue::String(chrono::Utc::now().to_rfc3339()),
        ],
    )
    .await?;

    Ok(())
}

/// Updates an existing operation center's descriptive fields.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails or the center
/// doesn't exist.
pub async fn update_center(db: &dyn Database, center: &OperationCenterRow) -> Result<(), DbError> {
    let updated = db
        .exec_raw_params(
            "UPDATE operation_centers SET
                name = $1,
                location = $2,
                latitude = $3,
                longitude = $4,
                description = $5,
                staff_count = $6
             WHERE code = $7",
            &[
                DatabaseValue::String(center.name.clone()),
                center
                    .location
                    .as_ref()
                    .map_or(DatabaseValue::Null, |v| DatabaseValue::String(v.clone())),
                center
                    .latitude
                    .map_or(DatabaseValue::Null, DatabaseValue::Real64),
                center
                    .longitude
                    .map_or(DatabaseValue::Null, DatabaseValue::Real64),
                center
                    .description
                    .as_ref()
                    .map_or(DatabaseValue::Null, |v| DatabaseValue::String(v.clone())),
                DatabaseValue::Int64(center.staff_count),
                DatabaseValue::String(center.code.clone()),
            ],
        )
        .await?;

    if updated == 0 {
        return Err(DbError::Conversion {
            message: format!("Operation center not found: {}", center.code),
        });
    }

    Ok(())
}

/// Deletes an operation center. Equipment rows cascade.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn delete_center(db: &dyn Database, code: &str) -> Result<(), DbError> {
    db.exec_raw_params(
        "DELETE FROM operation_centers WHERE code = $1",
        &[DatabaseValue::String(code.to_string())],
    )
    .await?;

    Ok(())
}

/// Fetches all equipment rows for one operation center.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn list_equipment(
    db: &dyn Database,
    operation_center: &str,
) -> Result<Vec<EquipmentRow>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT * FROM equipment WHERE operation_center = $1 ORDER BY equipment_type",
            &[DatabaseValue::String(operation_center.to_string())],
        )
        .await?;

    Ok(rows
        .iter()
        .map(|row| {
            let equipment_type: String = row.to_value("equipment_type").unwrap_or_default();
            EquipmentRow {
                operation_center: row.to_value("operation_center").unwrap_or_default(),
                equipment_type: equipment_type.parse().unwrap_or(EquipmentType::Knife),
                quantity: row.to_value("quantity").unwrap_or(0),
            }
        })
        .collect())
}

/// Sets the quantity of one equipment type at one center, creating the
/// row on first write.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn upsert_equipment(
    db: &dyn Database,
    operation_center: &str,
    equipment_type: EquipmentType,
    quantity: i64,
) -> Result<(), DbError> {
    let now = chrono::Utc::now().to_rfc3339();

    let updated = db
        .exec_raw_params(
            "UPDATE equipment SET quantity = $1, updated_at = $2
             WHERE operation_center = $3 AND equipment_type = $4",
            &[
                DatabaseValue::Int64(quantity),
                DatabaseValue::String(now.clone()),
                DatabaseValue::String(operation_center.to_string()),
                DatabaseValue::String(equipment_type.to_string()),
            ],
        )
        .await?;

    if updated == 0 {
        db.exec_raw_params(
            "INSERT INTO equipment (id, operation_center, equipment_type, quantity, updated_at)
             VALUES ($1, $2, $3, $4, $5)",
            &[
                DatabaseValue::String(uuid::Uuid::new_v4().to_string()),
                DatabaseValue::String(operation_center.to_string()),
                DatabaseValue::String(equipment_type.to_string()),
                DatabaseValue::Int64(quantity),
                DatabaseValue::String(now),
            ],
        )
        .await?;
    }

    Ok(())
}

/// Counts available and total officers assigned to one center, from the
/// live profile table.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn staff_counts(
    db: &dyn Database,
    operation_center: &str,
) -> Result<StaffCounts, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT current_status FROM profiles WHERE operation_center = $1",
            &[DatabaseValue::String(operation_center.to_string())],
        )
        .await?;

    let mut counts = StaffCounts::default();
    for row in &rows {
        counts.total += 1;
        let status: String = row.to_value("current_status").unwrap_or_default();
        if status == "available" {
            counts.available += 1;
        }
    }

    Ok(counts)
}

fn row_to_center(row: &switchy_database::Row) -> OperationCenterRow {
    OperationCenterRow {
        code: row.to_value("code").unwrap_or_default(),
        name: row.to_value("name").unwrap_or_default(),
        location: row.to_value("location").unwrap_or_default(),
        latitude: row.to_value("latitude").unwrap_or_default(),
        longitude: row.to_value("longitude").unwrap_or_default(),
        description: row.to_value("description").unwrap_or_default(),
        staff_count: row.to_value("staff_count").unwrap_or(0),
    }
}
