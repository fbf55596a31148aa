//! Repository for the `clients` and `unit_clients` tables.

use fitout_core::types::DbId;
use sqlx::PgPool;

use crate::models::client::{Client, CreateClient, LinkUnit, UnitClient, UpdateClient};

const COLUMNS: &str = "id, project_id, name, email, phone, created_at, updated_at";

const LINK_SELECT: &str = "SELECT uc.id, uc.unit_id, u.unit_number, uc.client_id, uc.role, \
    uc.reserved_at, uc.purchased_at, uc.deposit, uc.notes, uc.created_at \
    FROM unit_clients uc JOIN units u ON u.id = uc.unit_id";

pub struct ClientRepo;

impl ClientRepo {
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        input: &CreateClient,
    ) -> Result<Client, sqlx::Error> {
        let query = format!(
            "INSERT INTO clients (project_id, name, email, phone)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Client>(&query)
            .bind(project_id)
            .bind(input.name.trim())
            .bind(input.email.as_deref().map(str::trim))
            .bind(&input.phone)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
    ) -> Result<Option<Client>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM clients WHERE id = $1 AND project_id = $2");
        sqlx::query_as::<_, Client>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_project(pool: &PgPool, project_id: DbId) -> Result<Vec<Client>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM clients WHERE project_id = $1 ORDER BY name, id");
        sqlx::query_as::<_, Client>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// The purchaser linked to a unit, earliest link first.
    pub async fn find_purchaser_for_unit(
        pool: &PgPool,
        unit_id: DbId,
    ) -> Result<Option<Client>, sqlx::Error> {
        let query = format!(
            "SELECT c.id, c.project_id, c.name, c.email, c.phone, c.created_at, c.updated_at
             FROM clients c JOIN unit_clients uc ON uc.client_id = c.id
             WHERE uc.unit_id = $1 AND uc.role = 'purchaser'
             ORDER BY uc.created_at, uc.id
             LIMIT 1"
        );
        sqlx::query_as::<_, Client>(&query)
            .bind(unit_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
        input: &UpdateClient,
    ) -> Result<Option<Client>, sqlx::Error> {
        let query = format!(
            "UPDATE clients SET
                name = COALESCE($3, name),
                email = COALESCE($4, email),
                phone = COALESCE($5, phone)
             WHERE id = $1 AND project_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Client>(&query)
            .bind(id)
            .bind(project_id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(input.email.as_deref().map(str::trim))
            .bind(&input.phone)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, project_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1 AND project_id = $2")
            .bind(id)
            .bind(project_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Link a client to a unit, or update the existing link's details.
    pub async fn link_unit(
        pool: &PgPool,
        client_id: DbId,
        input: &LinkUnit,
    ) -> Result<UnitClient, sqlx::Error> {
        let (id,): (DbId,) = sqlx::query_as(
            "INSERT INTO unit_clients (unit_id, client_id, role, reserved_at, purchased_at, deposit, notes)
             VALUES ($1, $2, COALESCE($3, 'purchaser'), $4, $5, $6, $7)
             ON CONFLICT (unit_id, client_id) DO UPDATE SET
                role = EXCLUDED.role,
                reserved_at = EXCLUDED.reserved_at,
                purchased_at = EXCLUDED.purchased_at,
                deposit = EXCLUDED.deposit,
                notes = EXCLUDED.notes
             RETURNING id",
        )
        .bind(input.unit_id)
        .bind(client_id)
        .bind(&input.role)
        .bind(input.reserved_at)
        .bind(input.purchased_at)
        .bind(input.deposit)
        .bind(&input.notes)
        .fetch_one(pool)
        .await?;

        let query = format!("{LINK_SELECT} WHERE uc.id = $1");
        sqlx::query_as::<_, UnitClient>(&query)
            .bind(id)
            .fetch_one(pool)
            .await
    }

    pub async fn unlink_unit(pool: &PgPool, client_id: DbId, unit_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM unit_clients WHERE client_id = $1 AND unit_id = $2")
            .bind(client_id)
            .bind(unit_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_units_for_client(
        pool: &PgPool,
        client_id: DbId,
    ) -> Result<Vec<UnitClient>, sqlx::Error> {
        let query = format!("{LINK_SELECT} WHERE uc.client_id = $1 ORDER BY u.unit_number, uc.id");
        sqlx::query_as::<_, UnitClient>(&query)
            .bind(client_id)
            .fetch_all(pool)
            .await
    }
}
