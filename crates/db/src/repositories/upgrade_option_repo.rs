//! Repository for the `upgrade_options` table and its unit-type join.

use fitout_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::upgrade_option::{CreateUpgradeOption, UpdateUpgradeOption, UpgradeOption};

const SELECT: &str = "SELECT u.id, u.project_id, u.name, u.category, u.description, u.price, \
    u.max_quantity, u.is_active, \
    ARRAY(SELECT j.unit_type_id FROM upgrade_option_unit_types j \
          WHERE j.upgrade_option_id = u.id ORDER BY j.unit_type_id) AS unit_type_ids, \
    u.created_at, u.updated_at \
    FROM upgrade_options u";

pub struct UpgradeOptionRepo;

impl UpgradeOptionRepo {
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        input: &CreateUpgradeOption,
    ) -> Result<UpgradeOption, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let (id,): (DbId,) = sqlx::query_as(
            "INSERT INTO upgrade_options
                (project_id, name, category, description, price, max_quantity, is_active)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, 1), COALESCE($7, TRUE))
             RETURNING id",
        )
        .bind(project_id)
        .bind(input.name.trim())
        .bind(input.category.trim())
        .bind(&input.description)
        .bind(input.price)
        .bind(input.max_quantity)
        .bind(input.is_active)
        .fetch_one(&mut *tx)
        .await?;

        Self::replace_unit_types(&mut tx, id, &input.unit_type_ids).await?;

        let query = format!("{SELECT} WHERE u.id = $1");
        let option = sqlx::query_as::<_, UpgradeOption>(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(option)
    }

    pub async fn find_by_id(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
    ) -> Result<Option<UpgradeOption>, sqlx::Error> {
        let query = format!("{SELECT} WHERE u.id = $1 AND u.project_id = $2");
        sqlx::query_as::<_, UpgradeOption>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<UpgradeOption>, sqlx::Error> {
        let query = format!("{SELECT} WHERE u.project_id = $1 ORDER BY u.category, u.name, u.id");
        sqlx::query_as::<_, UpgradeOption>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Active options offered to a unit of the given type. Options linked to
    /// no unit type are offered to every unit.
    pub async fn list_for_unit_type(
        pool: &PgPool,
        project_id: DbId,
        unit_type_id: Option<DbId>,
    ) -> Result<Vec<UpgradeOption>, sqlx::Error> {
        let query = format!(
            "{SELECT} WHERE u.project_id = $1 AND u.is_active AND (
                NOT EXISTS (SELECT 1 FROM upgrade_option_unit_types j WHERE j.upgrade_option_id = u.id)
                OR EXISTS (
                    SELECT 1 FROM upgrade_option_unit_types j
                    WHERE j.upgrade_option_id = u.id AND j.unit_type_id = $2::BIGINT
                )
             )
             ORDER BY u.category, u.name, u.id"
        );
        sqlx::query_as::<_, UpgradeOption>(&query)
            .bind(project_id)
            .bind(unit_type_id)
            .fetch_all(pool)
            .await
    }

    /// Case-insensitive name check within a project.
    pub async fn exists_name(
        pool: &PgPool,
        project_id: DbId,
        name: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS (
                SELECT 1 FROM upgrade_options
                WHERE project_id = $1 AND LOWER(name) = LOWER($2)
                  AND ($3::BIGINT IS NULL OR id <> $3)
             )",
        )
        .bind(project_id)
        .bind(name.trim())
        .bind(exclude_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    pub async fn update(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
        input: &UpdateUpgradeOption,
    ) -> Result<Option<UpgradeOption>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let updated: Option<(DbId,)> = sqlx::query_as(
            "UPDATE upgrade_options SET
                name = COALESCE($3, name),
                category = COALESCE($4, category),
                description = COALESCE($5, description),
                price = COALESCE($6, price),
                max_quantity = COALESCE($7, max_quantity),
                is_active = COALESCE($8, is_active)
             WHERE id = $1 AND project_id = $2
             RETURNING id",
        )
        .bind(id)
        .bind(project_id)
        .bind(input.name.as_deref().map(str::trim))
        .bind(input.category.as_deref().map(str::trim))
        .bind(&input.description)
        .bind(input.price)
        .bind(input.max_quantity)
        .bind(input.is_active)
        .fetch_optional(&mut *tx)
        .await?;

        if updated.is_none() {
            return Ok(None);
        }

        if let Some(unit_type_ids) = &input.unit_type_ids {
            Self::replace_unit_types(&mut tx, id, unit_type_ids).await?;
        }

        let query = format!("{SELECT} WHERE u.id = $1");
        let option = sqlx::query_as::<_, UpgradeOption>(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(option))
    }

    pub async fn delete(pool: &PgPool, project_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM upgrade_options WHERE id = $1 AND project_id = $2")
            .bind(id)
            .bind(project_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn replace_unit_types(
        tx: &mut Transaction<'_, Postgres>,
        option_id: DbId,
        unit_type_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM upgrade_option_unit_types WHERE upgrade_option_id = $1")
            .bind(option_id)
            .execute(&mut **tx)
            .await?;
        sqlx::query(
            "INSERT INTO upgrade_option_unit_types (upgrade_option_id, unit_type_id)
             SELECT $1, UNNEST($2::BIGINT[])
             ON CONFLICT DO NOTHING",
        )
        .bind(option_id)
        .bind(unit_type_ids)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}
