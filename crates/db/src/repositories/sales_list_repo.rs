//! Repository for the `sales_lists` and `sales_list_units` tables.

use fitout_core::types::DbId;
use fitout_core::versioning::UnitPriceRow;
use sqlx::{PgConnection, PgPool};

use crate::models::sales_list::{
    CreateSalesList, SalesList, SalesListUnit, UpdateSalesList, UpdateSalesListUnit,
};

const SELECT: &str = "SELECT sl.id, sl.project_id, sl.name, sl.description, sl.includes_all_units, \
    (SELECT COUNT(*) FROM sales_list_units slu WHERE slu.sales_list_id = sl.id) AS unit_count, \
    sl.created_at, sl.updated_at \
    FROM sales_lists sl";

const UNIT_SELECT: &str = "SELECT slu.id, slu.sales_list_id, slu.unit_id, u.unit_number, \
    slu.list_price, slu.sold_price, slu.sale_status, slu.client_id, slu.notes, slu.updated_at \
    FROM sales_list_units slu JOIN units u ON u.id = slu.unit_id";

pub struct SalesListRepo;

impl SalesListRepo {
    /// Create a list and seed its unit rows in one transaction: every unit of
    /// the project when `includes_all_units`, otherwise the given subset.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        input: &CreateSalesList,
    ) -> Result<SalesList, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let (id,): (DbId,) = sqlx::query_as(
            "INSERT INTO sales_lists (project_id, name, description, includes_all_units)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(project_id)
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.includes_all_units)
        .fetch_one(&mut *tx)
        .await?;

        if input.includes_all_units {
            sqlx::query(
                "INSERT INTO sales_list_units (sales_list_id, unit_id)
                 SELECT $1, id FROM units WHERE project_id = $2",
            )
            .bind(id)
            .bind(project_id)
            .execute(&mut *tx)
            .await?;
        } else {
            insert_units(&mut tx, id, project_id, &input.unit_ids).await?;
        }

        let query = format!("{SELECT} WHERE sl.id = $1");
        let list = sqlx::query_as::<_, SalesList>(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(list)
    }

    pub async fn find_by_id(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
    ) -> Result<Option<SalesList>, sqlx::Error> {
        let query = format!("{SELECT} WHERE sl.id = $1 AND sl.project_id = $2");
        sqlx::query_as::<_, SalesList>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<SalesList>, sqlx::Error> {
        let query = format!("{SELECT} WHERE sl.project_id = $1 ORDER BY sl.created_at DESC, sl.id DESC");
        sqlx::query_as::<_, SalesList>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
        input: &UpdateSalesList,
    ) -> Result<Option<SalesList>, sqlx::Error> {
        let updated: Option<(DbId,)> = sqlx::query_as(
            "UPDATE sales_lists SET
                name = COALESCE($3, name),
                description = COALESCE($4, description)
             WHERE id = $1 AND project_id = $2
             RETURNING id",
        )
        .bind(id)
        .bind(project_id)
        .bind(input.name.as_deref().map(str::trim))
        .bind(&input.description)
        .fetch_optional(pool)
        .await?;

        match updated {
            Some(_) => Self::find_by_id(pool, project_id, id).await,
            None => Ok(None),
        }
    }

    pub async fn delete(pool: &PgPool, project_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sales_lists WHERE id = $1 AND project_id = $2")
            .bind(id)
            .bind(project_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Unit rows of a list, ordered by unit number.
    pub async fn list_units(pool: &PgPool, list_id: DbId) -> Result<Vec<SalesListUnit>, sqlx::Error> {
        let query = format!("{UNIT_SELECT} WHERE slu.sales_list_id = $1 ORDER BY u.unit_number, slu.id");
        sqlx::query_as::<_, SalesListUnit>(&query)
            .bind(list_id)
            .fetch_all(pool)
            .await
    }

    /// The live pricing state, in the shape versions capture.
    pub async fn current_rows(pool: &PgPool, list_id: DbId) -> Result<Vec<UnitPriceRow>, sqlx::Error> {
        let units = Self::list_units(pool, list_id).await?;
        Ok(units.iter().map(SalesListUnit::to_price_row).collect())
    }

    /// Add project units to a list. Units already present are left alone.
    /// Returns the number of rows inserted.
    pub async fn add_units(
        pool: &PgPool,
        project_id: DbId,
        list_id: DbId,
        unit_ids: &[DbId],
    ) -> Result<u64, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        insert_units(&mut conn, list_id, project_id, unit_ids).await
    }

    /// Apply several row updates atomically. A unit missing from the list
    /// aborts the whole batch with `RowNotFound`.
    pub async fn bulk_update_units(
        pool: &PgPool,
        list_id: DbId,
        updates: &[UpdateSalesListUnit],
    ) -> Result<Vec<SalesListUnit>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut rows = Vec::with_capacity(updates.len());
        for update in updates {
            let row = update_unit_row(&mut tx, list_id, update)
                .await?
                .ok_or(sqlx::Error::RowNotFound)?;
            rows.push(row);
        }
        tx.commit().await?;
        Ok(rows)
    }

    pub async fn remove_unit(pool: &PgPool, list_id: DbId, unit_id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM sales_list_units WHERE sales_list_id = $1 AND unit_id = $2")
                .bind(list_id)
                .bind(unit_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Insert rows for the given units, ignoring ids outside the project and
/// units already on the list.
async fn insert_units(
    conn: &mut PgConnection,
    list_id: DbId,
    project_id: DbId,
    unit_ids: &[DbId],
) -> Result<u64, sqlx::Error> {
    if unit_ids.is_empty() {
        return Ok(0);
    }
    let result = sqlx::query(
        "INSERT INTO sales_list_units (sales_list_id, unit_id)
         SELECT $1, id FROM units WHERE project_id = $2 AND id = ANY($3)
         ON CONFLICT (sales_list_id, unit_id) DO NOTHING",
    )
    .bind(list_id)
    .bind(project_id)
    .bind(unit_ids)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected())
}

async fn update_unit_row(
    conn: &mut PgConnection,
    list_id: DbId,
    input: &UpdateSalesListUnit,
) -> Result<Option<SalesListUnit>, sqlx::Error> {
    let updated: Option<(DbId,)> = sqlx::query_as(
        "UPDATE sales_list_units SET
            list_price = COALESCE($3, list_price),
            sold_price = COALESCE($4, sold_price),
            sale_status = COALESCE($5, sale_status),
            client_id = CASE WHEN $6 THEN NULL ELSE COALESCE($7, client_id) END,
            notes = COALESCE($8, notes)
         WHERE sales_list_id = $1 AND unit_id = $2
         RETURNING id",
    )
    .bind(list_id)
    .bind(input.unit_id)
    .bind(input.list_price)
    .bind(input.sold_price)
    .bind(&input.sale_status)
    .bind(input.clear_client)
    .bind(input.client_id)
    .bind(&input.notes)
    .fetch_optional(&mut *conn)
    .await?;

    let Some((id,)) = updated else {
        return Ok(None);
    };

    let query = format!("{UNIT_SELECT} WHERE slu.id = $1");
    sqlx::query_as::<_, SalesListUnit>(&query)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
}
