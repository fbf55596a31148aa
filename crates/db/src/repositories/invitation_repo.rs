//! Repository for the `invitations` table.

use fitout_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::invitation::Invitation;

const SELECT: &str = "SELECT i.id, i.client_id, c.name AS client_name, i.unit_id, u.unit_number, \
    i.token, i.expires_at, i.accepted_at, i.revoked_at, i.created_at \
    FROM invitations i \
    JOIN clients c ON c.id = i.client_id \
    JOIN units u ON u.id = i.unit_id";

pub struct InvitationRepo;

impl InvitationRepo {
    pub async fn create(
        pool: &PgPool,
        client_id: DbId,
        unit_id: DbId,
        token: &str,
        expires_at: Timestamp,
    ) -> Result<Invitation, sqlx::Error> {
        let (id,): (DbId,) = sqlx::query_as(
            "INSERT INTO invitations (client_id, unit_id, token, expires_at)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(client_id)
        .bind(unit_id)
        .bind(token)
        .bind(expires_at)
        .fetch_one(pool)
        .await?;

        let query = format!("{SELECT} WHERE i.id = $1");
        sqlx::query_as::<_, Invitation>(&query)
            .bind(id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_token(pool: &PgPool, token: &str) -> Result<Option<Invitation>, sqlx::Error> {
        let query = format!("{SELECT} WHERE i.token = $1");
        sqlx::query_as::<_, Invitation>(&query)
            .bind(token)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<Invitation>, sqlx::Error> {
        let query = format!("{SELECT} WHERE u.project_id = $1 ORDER BY i.created_at DESC, i.id DESC");
        sqlx::query_as::<_, Invitation>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Stamp first acceptance. Later acceptances keep the original time.
    pub async fn mark_accepted(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE invitations SET accepted_at = COALESCE(accepted_at, NOW()) WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Revoke an invitation of the given project. Returns `true` if a
    /// not-yet-revoked row was updated.
    pub async fn revoke(pool: &PgPool, project_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE invitations i SET revoked_at = NOW()
             FROM units u
             WHERE i.id = $1 AND u.id = i.unit_id AND u.project_id = $2 AND i.revoked_at IS NULL",
        )
        .bind(id)
        .bind(project_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
