//! Repository for the `color_schemes` table and its unit-type join.

use fitout_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::color_scheme::{ColorScheme, CreateColorScheme, UpdateColorScheme};

/// Select list including the aggregated unit type ids.
const SELECT: &str = "SELECT cs.id, cs.project_id, cs.name, cs.description, cs.materials, cs.is_active, \
    ARRAY(SELECT j.unit_type_id FROM color_scheme_unit_types j \
          WHERE j.color_scheme_id = cs.id ORDER BY j.unit_type_id) AS unit_type_ids, \
    cs.created_at, cs.updated_at \
    FROM color_schemes cs";

pub struct ColorSchemeRepo;

impl ColorSchemeRepo {
    /// Insert a scheme and its unit-type links in one transaction.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        input: &CreateColorScheme,
    ) -> Result<ColorScheme, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let (id,): (DbId,) = sqlx::query_as(
            "INSERT INTO color_schemes (project_id, name, description, materials, is_active)
             VALUES ($1, $2, $3, $4, COALESCE($5, TRUE))
             RETURNING id",
        )
        .bind(project_id)
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(&input.materials)
        .bind(input.is_active)
        .fetch_one(&mut *tx)
        .await?;

        Self::replace_unit_types(&mut tx, id, &input.unit_type_ids).await?;

        let query = format!("{SELECT} WHERE cs.id = $1");
        let scheme = sqlx::query_as::<_, ColorScheme>(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(scheme)
    }

    pub async fn find_by_id(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
    ) -> Result<Option<ColorScheme>, sqlx::Error> {
        let query = format!("{SELECT} WHERE cs.id = $1 AND cs.project_id = $2");
        sqlx::query_as::<_, ColorScheme>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<ColorScheme>, sqlx::Error> {
        let query = format!("{SELECT} WHERE cs.project_id = $1 ORDER BY cs.name, cs.id");
        sqlx::query_as::<_, ColorScheme>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Active schemes offered to a unit of the given type. Schemes linked to
    /// no unit type are offered to every unit.
    pub async fn list_for_unit_type(
        pool: &PgPool,
        project_id: DbId,
        unit_type_id: Option<DbId>,
    ) -> Result<Vec<ColorScheme>, sqlx::Error> {
        let query = format!(
            "{SELECT} WHERE cs.project_id = $1 AND cs.is_active AND (
                NOT EXISTS (SELECT 1 FROM color_scheme_unit_types j WHERE j.color_scheme_id = cs.id)
                OR EXISTS (
                    SELECT 1 FROM color_scheme_unit_types j
                    WHERE j.color_scheme_id = cs.id AND j.unit_type_id = $2::BIGINT
                )
             )
             ORDER BY cs.name, cs.id"
        );
        sqlx::query_as::<_, ColorScheme>(&query)
            .bind(project_id)
            .bind(unit_type_id)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
        input: &UpdateColorScheme,
    ) -> Result<Option<ColorScheme>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let updated: Option<(DbId,)> = sqlx::query_as(
            "UPDATE color_schemes SET
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                materials = COALESCE($5, materials),
                is_active = COALESCE($6, is_active)
             WHERE id = $1 AND project_id = $2
             RETURNING id",
        )
        .bind(id)
        .bind(project_id)
        .bind(input.name.as_deref().map(str::trim))
        .bind(&input.description)
        .bind(&input.materials)
        .bind(input.is_active)
        .fetch_optional(&mut *tx)
        .await?;

        if updated.is_none() {
            return Ok(None);
        }

        if let Some(unit_type_ids) = &input.unit_type_ids {
            Self::replace_unit_types(&mut tx, id, unit_type_ids).await?;
        }

        let query = format!("{SELECT} WHERE cs.id = $1");
        let scheme = sqlx::query_as::<_, ColorScheme>(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(scheme))
    }

    /// Delete a scheme; its unit-type links cascade and submissions keep the
    /// flattened scheme name.
    pub async fn delete(pool: &PgPool, project_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM color_schemes WHERE id = $1 AND project_id = $2")
            .bind(id)
            .bind(project_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn replace_unit_types(
        tx: &mut Transaction<'_, Postgres>,
        scheme_id: DbId,
        unit_type_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM color_scheme_unit_types WHERE color_scheme_id = $1")
            .bind(scheme_id)
            .execute(&mut **tx)
            .await?;
        sqlx::query(
            "INSERT INTO color_scheme_unit_types (color_scheme_id, unit_type_id)
             SELECT $1, UNNEST($2::BIGINT[])
             ON CONFLICT DO NOTHING",
        )
        .bind(scheme_id)
        .bind(unit_type_ids)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}
