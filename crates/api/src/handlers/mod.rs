pub mod auth;
pub mod client;
pub mod color_scheme;
pub mod invitation;
pub mod portal;
pub mod project;
pub mod sales_list;
pub mod sales_list_version;
pub mod submission;
pub mod unit;
pub mod unit_type;
pub mod upgrade_option;

use fitout_core::error::CoreError;
use fitout_core::types::DbId;
use fitout_db::models::project::Project;
use fitout_db::repositories::{ProjectRepo, UnitTypeRepo};
use fitout_db::DbPool;

use crate::error::{AppError, AppResult};

/// Load the project named in the path, or 404.
pub(crate) async fn load_project(pool: &DbPool, project_id: DbId) -> AppResult<Project> {
    ProjectRepo::find_by_id(pool, project_id)
        .await?
        .ok_or(AppError::not_found("Project", project_id))
}

/// Reject unit-type ids that do not belong to the project. Returns the
/// deduplicated list.
pub(crate) async fn check_unit_types(
    pool: &DbPool,
    project_id: DbId,
    ids: &[DbId],
) -> AppResult<Vec<DbId>> {
    let mut unique = ids.to_vec();
    unique.sort_unstable();
    unique.dedup();
    if unique.is_empty() {
        return Ok(unique);
    }
    let found = UnitTypeRepo::count_in_project(pool, project_id, &unique).await?;
    if found != unique.len() as i64 {
        return Err(AppError::Core(CoreError::Validation(
            "One or more unit types do not belong to this project".into(),
        )));
    }
    Ok(unique)
}
