//! Repository for the `units` table.

use fitout_core::types::DbId;
use sqlx::PgPool;

use crate::models::unit::{NewUnit, Unit, UpdateUnit};

const COLUMNS: &str = "id, project_id, unit_type_id, unit_number, status, username, \
    password_hash, portal_token, floor_plan_path, floor_plan_content_type, created_at, updated_at";

pub struct UnitRepo;

impl UnitRepo {
    /// Insert a unit with pre-generated credentials and add it to every
    /// sales list of the project that covers all units, in one transaction.
    ///
    /// Duplicate unit numbers within a project fail with the
    /// `uq_units_project_unit_number` constraint.
    pub async fn create(pool: &PgPool, input: &NewUnit) -> Result<Unit, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO units
                (project_id, unit_type_id, unit_number, status, username, password_hash, portal_token)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        let unit = sqlx::query_as::<_, Unit>(&query)
            .bind(input.project_id)
            .bind(input.unit_type_id)
            .bind(input.unit_number.trim())
            .bind(&input.status)
            .bind(&input.username)
            .bind(&input.password_hash)
            .bind(&input.portal_token)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO sales_list_units (sales_list_id, unit_id)
             SELECT id, $1 FROM sales_lists
             WHERE project_id = $2 AND includes_all_units",
        )
        .bind(unit.id)
        .bind(unit.project_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(unit)
    }

    /// Find a unit scoped to its project.
    pub async fn find_by_id(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
    ) -> Result<Option<Unit>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM units WHERE id = $1 AND project_id = $2");
        sqlx::query_as::<_, Unit>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a unit by id alone (client portal, where the token names the unit).
    pub async fn find_by_id_unscoped(pool: &PgPool, id: DbId) -> Result<Option<Unit>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM units WHERE id = $1");
        sqlx::query_as::<_, Unit>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<Unit>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM units WHERE username = LOWER($1)");
        sqlx::query_as::<_, Unit>(&query)
            .bind(username.trim())
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_project(pool: &PgPool, project_id: DbId) -> Result<Vec<Unit>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM units WHERE project_id = $1 ORDER BY unit_number, id"
        );
        sqlx::query_as::<_, Unit>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Whether `unit_number` is already taken in the project, optionally
    /// ignoring the unit being renamed.
    pub async fn exists_unit_number(
        pool: &PgPool,
        project_id: DbId,
        unit_number: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS (
                SELECT 1 FROM units
                WHERE project_id = $1 AND unit_number = $2 AND ($3::BIGINT IS NULL OR id <> $3)
             )",
        )
        .bind(project_id)
        .bind(unit_number.trim())
        .bind(exclude_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Whether a username is taken (usernames are global).
    pub async fn exists_username(pool: &PgPool, username: &str) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM units WHERE username = $1)")
            .bind(username)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    /// Count how many of `ids` belong to `project_id`.
    pub async fn count_in_project(
        pool: &PgPool,
        project_id: DbId,
        ids: &[DbId],
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM units WHERE project_id = $1 AND id = ANY($2)")
                .bind(project_id)
                .bind(ids)
                .fetch_one(pool)
                .await?;
        Ok(row.0)
    }

    pub async fn update(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
        input: &UpdateUnit,
    ) -> Result<Option<Unit>, sqlx::Error> {
        let query = format!(
            "UPDATE units SET
                unit_number = COALESCE($3, unit_number),
                unit_type_id = COALESCE($4, unit_type_id),
                status = COALESCE($5, status)
             WHERE id = $1 AND project_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Unit>(&query)
            .bind(id)
            .bind(project_id)
            .bind(input.unit_number.as_deref().map(str::trim))
            .bind(input.unit_type_id)
            .bind(&input.status)
            .fetch_optional(pool)
            .await
    }

    /// Replace the stored password hash.
    pub async fn set_password_hash(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE units SET password_hash = $3 WHERE id = $1 AND project_id = $2")
                .bind(id)
                .bind(project_id)
                .bind(password_hash)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record the stored floor-plan file. Returns the previous path, if any.
    pub async fn set_floor_plan(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
        path: &str,
        content_type: &str,
    ) -> Result<Option<Option<String>>, sqlx::Error> {
        let row: Option<(Option<String>,)> = sqlx::query_as(
            "UPDATE units u SET floor_plan_path = $3, floor_plan_content_type = $4
             FROM (SELECT floor_plan_path FROM units WHERE id = $1 AND project_id = $2 FOR UPDATE) prev
             WHERE u.id = $1 AND u.project_id = $2
             RETURNING prev.floor_plan_path",
        )
        .bind(id)
        .bind(project_id)
        .bind(path)
        .bind(content_type)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|r| r.0))
    }

    pub async fn delete(pool: &PgPool, project_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM units WHERE id = $1 AND project_id = $2")
            .bind(id)
            .bind(project_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
