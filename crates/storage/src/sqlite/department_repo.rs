use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{department_id_from_i64, id_i64, ser};
use crate::repository::{DepartmentRecord, DepartmentRepository, StorageError};

#[async_trait::async_trait]
impl DepartmentRepository for SqliteRepository {
    async fn upsert_department(&self, department: &DepartmentRecord) -> Result<(), StorageError> {
        let id = id_i64("department_id", department.id.value())?;
        sqlx::query(
            r"
                INSERT INTO departments (id, name)
                VALUES (?1, ?2)
                ON CONFLICT(id) DO UPDATE SET name = excluded.name
            ",
        )
        .bind(id)
        .bind(&department.name)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(())
    }

    async fn list_departments(&self) -> Result<Vec<DepartmentRecord>, StorageError> {
        let rows = sqlx::query("SELECT id, name FROM departments ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter()
            .map(|row| {
                Ok(DepartmentRecord {
                    id: department_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
                    name: row.try_get("name").map_err(ser)?,
                })
            })
            .collect()
    }
}
