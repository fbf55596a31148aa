//! Repository for the `unit_types` table.

use fitout_core::types::DbId;
use sqlx::PgPool;

use crate::models::unit_type::{CreateUnitType, UnitType, UpdateUnitType};

const COLUMNS: &str =
    "id, project_id, name, bedrooms, bathrooms, size_sqm, description, created_at, updated_at";

pub struct UnitTypeRepo;

impl UnitTypeRepo {
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        input: &CreateUnitType,
    ) -> Result<UnitType, sqlx::Error> {
        let query = format!(
            "INSERT INTO unit_types (project_id, name, bedrooms, bathrooms, size_sqm, description)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UnitType>(&query)
            .bind(project_id)
            .bind(input.name.trim())
            .bind(input.bedrooms)
            .bind(input.bathrooms)
            .bind(input.size_sqm)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    /// Find a unit type, scoped to its project.
    pub async fn find_by_id(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
    ) -> Result<Option<UnitType>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM unit_types WHERE id = $1 AND project_id = $2");
        sqlx::query_as::<_, UnitType>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<UnitType>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM unit_types WHERE project_id = $1 ORDER BY name, id");
        sqlx::query_as::<_, UnitType>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Count how many of `ids` belong to `project_id`.
    pub async fn count_in_project(
        pool: &PgPool,
        project_id: DbId,
        ids: &[DbId],
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM unit_types WHERE project_id = $1 AND id = ANY($2)",
        )
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
        input: &UpdateUnitType,
    ) -> Result<Option<UnitType>, sqlx::Error> {
        let query = format!(
            "UPDATE unit_types SET
                name = COALESCE($3, name),
                bedrooms = COALESCE($4, bedrooms),
                bathrooms = COALESCE($5, bathrooms),
                size_sqm = COALESCE($6, size_sqm),
                description = COALESCE($7, description)
             WHERE id = $1 AND project_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UnitType>(&query)
            .bind(id)
            .bind(project_id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(input.bedrooms)
            .bind(input.bathrooms)
            .bind(input.size_sqm)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    /// Delete a unit type. Catalog join rows cascade and units fall back to
    /// no type, so no client-facing list keeps a dangling id.
    ///
    /// Schemes and upgrades limited to this type alone are deactivated first;
    /// losing their last link would otherwise offer them to every unit.
    pub async fn delete(pool: &PgPool, project_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let deactivated_schemes = sqlx::query(
            "UPDATE color_schemes cs SET is_active = FALSE
             FROM color_scheme_unit_types j
             WHERE j.color_scheme_id = cs.id AND j.unit_type_id = $1 AND cs.project_id = $2
               AND NOT EXISTS (
                   SELECT 1 FROM color_scheme_unit_types o
                   WHERE o.color_scheme_id = cs.id AND o.unit_type_id <> $1
               )",
        )
        .bind(id)
        .bind(project_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let deactivated_upgrades = sqlx::query(
            "UPDATE upgrade_options u SET is_active = FALSE
             FROM upgrade_option_unit_types j
             WHERE j.upgrade_option_id = u.id AND j.unit_type_id = $1 AND u.project_id = $2
               AND NOT EXISTS (
                   SELECT 1 FROM upgrade_option_unit_types o
                   WHERE o.upgrade_option_id = u.id AND o.unit_type_id <> $1
               )",
        )
        .bind(id)
        .bind(project_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let result = sqlx::query("DELETE FROM unit_types WHERE id = $1 AND project_id = $2")
            .bind(id)
            .bind(project_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        if deactivated_schemes + deactivated_upgrades > 0 {
            tracing::info!(
                unit_type_id = id,
                deactivated_schemes,
                deactivated_upgrades,
                "Deactivated catalog items left without a unit type"
            );
        }
        Ok(result.rows_affected() > 0)
    }
}
