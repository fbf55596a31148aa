//! Repository for sales-list versions.
//!
//! A version copies every `sales_list_units` row of its list at save time.
//! Saving and restoring both lock the list row, so concurrent saves cannot
//! allocate the same version number and a restore never interleaves with a
//! save.

use fitout_core::types::DbId;
use fitout_core::versioning::next_version_number;
use sqlx::{PgConnection, PgPool};

use crate::models::sales_list_version::{
    RestoreOutcome, SalesListVersion, SalesListVersionDetail, SalesListVersionUnit,
};

const SELECT: &str = "SELECT v.id, v.sales_list_id, v.version_number, v.label, v.notes, v.created_by, \
    (SELECT COUNT(*) FROM sales_list_version_units vu WHERE vu.version_id = v.id) AS unit_count, \
    v.created_at \
    FROM sales_list_versions v";

const UNIT_COLUMNS: &str =
    "id, version_id, unit_id, unit_number, list_price, sold_price, sale_status, client_id, notes";

pub struct SalesListVersionRepo;

impl SalesListVersionRepo {
    /// Save the list's current state as the next version.
    pub async fn create_snapshot(
        pool: &PgPool,
        list_id: DbId,
        label: &str,
        notes: Option<&str>,
        created_by: Option<&str>,
    ) -> Result<SalesListVersion, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let version = snapshot(&mut tx, list_id, label, notes, created_by).await?;
        tx.commit().await?;
        Ok(version)
    }

    /// Versions of a list, newest first.
    pub async fn list_by_list(
        pool: &PgPool,
        list_id: DbId,
    ) -> Result<Vec<SalesListVersion>, sqlx::Error> {
        let query = format!("{SELECT} WHERE v.sales_list_id = $1 ORDER BY v.version_number DESC");
        sqlx::query_as::<_, SalesListVersion>(&query)
            .bind(list_id)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        list_id: DbId,
        id: DbId,
    ) -> Result<Option<SalesListVersion>, sqlx::Error> {
        let query = format!("{SELECT} WHERE v.id = $1 AND v.sales_list_id = $2");
        sqlx::query_as::<_, SalesListVersion>(&query)
            .bind(id)
            .bind(list_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_with_units(
        pool: &PgPool,
        list_id: DbId,
        id: DbId,
    ) -> Result<Option<SalesListVersionDetail>, sqlx::Error> {
        let Some(version) = Self::find_by_id(pool, list_id, id).await? else {
            return Ok(None);
        };
        let units = Self::snapshot_rows(pool, id).await?;
        Ok(Some(SalesListVersionDetail { version, units }))
    }

    /// Rows captured by a version, ordered by unit number.
    pub async fn snapshot_rows(
        pool: &PgPool,
        version_id: DbId,
    ) -> Result<Vec<SalesListVersionUnit>, sqlx::Error> {
        let query = format!(
            "SELECT {UNIT_COLUMNS} FROM sales_list_version_units
             WHERE version_id = $1
             ORDER BY unit_number, unit_id"
        );
        sqlx::query_as::<_, SalesListVersionUnit>(&query)
            .bind(version_id)
            .fetch_all(pool)
            .await
    }

    /// Overwrite the live list with a version's rows.
    ///
    /// Rows for units absent from the version are deleted; captured rows are
    /// upserted. Units deleted since the version was saved are skipped, and
    /// captured clients that no longer exist are cleared. Returns `None` when
    /// the version does not belong to the list.
    pub async fn restore(
        pool: &PgPool,
        list_id: DbId,
        version_id: DbId,
        save_current: bool,
        created_by: Option<&str>,
    ) -> Result<Option<RestoreOutcome>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        lock_list(&mut tx, list_id).await?;

        let query = format!("{SELECT} WHERE v.id = $1 AND v.sales_list_id = $2");
        let Some(restored) = sqlx::query_as::<_, SalesListVersion>(&query)
            .bind(version_id)
            .bind(list_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let backup = if save_current {
            let label = format!("Before restoring version {}", restored.version_number);
            Some(snapshot(&mut tx, list_id, &label, None, created_by).await?)
        } else {
            None
        };

        sqlx::query(
            "DELETE FROM sales_list_units
             WHERE sales_list_id = $1
               AND unit_id NOT IN (SELECT unit_id FROM sales_list_version_units WHERE version_id = $2)",
        )
        .bind(list_id)
        .bind(version_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO sales_list_units
                (sales_list_id, unit_id, list_price, sold_price, sale_status, client_id, notes)
             SELECT $1, vu.unit_id, vu.list_price, vu.sold_price, vu.sale_status, c.id, vu.notes
             FROM sales_list_version_units vu
             JOIN units u ON u.id = vu.unit_id
             LEFT JOIN clients c ON c.id = vu.client_id
             WHERE vu.version_id = $2
             ON CONFLICT (sales_list_id, unit_id) DO UPDATE SET
                list_price = EXCLUDED.list_price,
                sold_price = EXCLUDED.sold_price,
                sale_status = EXCLUDED.sale_status,
                client_id = EXCLUDED.client_id,
                notes = EXCLUDED.notes",
        )
        .bind(list_id)
        .bind(version_id)
        .execute(&mut *tx)
        .await?;

        let skipped: Vec<(DbId,)> = sqlx::query_as(
            "SELECT vu.unit_id FROM sales_list_version_units vu
             WHERE vu.version_id = $1
               AND NOT EXISTS (SELECT 1 FROM units u WHERE u.id = vu.unit_id)
             ORDER BY vu.unit_id",
        )
        .bind(version_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        if !skipped.is_empty() {
            tracing::warn!(
                list_id,
                version_id,
                skipped = skipped.len(),
                "Restored version references deleted units"
            );
        }

        Ok(Some(RestoreOutcome {
            restored,
            backup,
            skipped_unit_ids: skipped.into_iter().map(|(id,)| id).collect(),
        }))
    }
}

/// Lock the list row for the rest of the transaction. Fails with
/// `RowNotFound` if the list is gone.
async fn lock_list(conn: &mut PgConnection, list_id: DbId) -> Result<(), sqlx::Error> {
    sqlx::query_as::<_, (DbId,)>("SELECT id FROM sales_lists WHERE id = $1 FOR UPDATE")
        .bind(list_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;
    Ok(())
}

async fn snapshot(
    conn: &mut PgConnection,
    list_id: DbId,
    label: &str,
    notes: Option<&str>,
    created_by: Option<&str>,
) -> Result<SalesListVersion, sqlx::Error> {
    lock_list(conn, list_id).await?;

    let (current_max,): (Option<i32>,) =
        sqlx::query_as("SELECT MAX(version_number) FROM sales_list_versions WHERE sales_list_id = $1")
            .bind(list_id)
            .fetch_one(&mut *conn)
            .await?;

    let (version_id,): (DbId,) = sqlx::query_as(
        "INSERT INTO sales_list_versions (sales_list_id, version_number, label, notes, created_by)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id",
    )
    .bind(list_id)
    .bind(next_version_number(current_max))
    .bind(label.trim())
    .bind(notes)
    .bind(created_by)
    .fetch_one(&mut *conn)
    .await?;

    sqlx::query(
        "INSERT INTO sales_list_version_units
            (version_id, unit_id, unit_number, list_price, sold_price, sale_status, client_id, notes)
         SELECT $1, slu.unit_id, u.unit_number, slu.list_price, slu.sold_price,
                slu.sale_status, slu.client_id, slu.notes
         FROM sales_list_units slu
         JOIN units u ON u.id = slu.unit_id
         WHERE slu.sales_list_id = $2",
    )
    .bind(version_id)
    .bind(list_id)
    .execute(&mut *conn)
    .await?;

    let query = format!("{SELECT} WHERE v.id = $1");
    let version = sqlx::query_as::<_, SalesListVersion>(&query)
        .bind(version_id)
        .fetch_one(&mut *conn)
        .await?;

    tracing::info!(
        list_id,
        version_number = version.version_number,
        units = version.unit_count,
        "Sales list version saved"
    );
    Ok(version)
}
