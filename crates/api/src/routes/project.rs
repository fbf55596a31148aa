//! Route definitions for projects and everything scoped to a project.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{
    client, color_scheme, invitation, project, sales_list, sales_list_version, submission, unit,
    unit_type, upgrade_option,
};
use crate::state::AppState;

/// Routes mounted at `/projects`. All require an admin token.
///
/// ```text
/// GET    /                                         -> list
/// POST   /                                         -> create
/// GET    /{id}                                     -> get_by_id
/// PUT    /{id}                                     -> update
/// DELETE /{id}                                     -> delete
///
/// /{project_id}/unit-types[/{id}]                  unit type CRUD
///
/// /{project_id}/units[/{id}]                       unit CRUD
/// POST   /{project_id}/units/{id}/credentials      -> reset_credentials
/// POST   /{project_id}/units/{id}/floor-plan       -> upload_floor_plan
/// GET    /{project_id}/units/{id}/floor-plan       -> download_floor_plan
///
/// /{project_id}/color-schemes[/{id}]               colour scheme CRUD
/// /{project_id}/upgrade-options[/{id}]             upgrade option CRUD
///
/// /{project_id}/clients[/{id}]                     client CRUD
/// GET    /{project_id}/clients/{id}/units          -> list_units
/// POST   /{project_id}/clients/{id}/units          -> link_unit
/// DELETE /{project_id}/clients/{id}/units/{unit_id} -> unlink_unit
///
/// /{project_id}/sales-lists[/{id}]                 sales list CRUD
/// GET    /{project_id}/sales-lists/{id}/units      -> list_units
/// POST   /{project_id}/sales-lists/{id}/units      -> add_units
/// PUT    /{project_id}/sales-lists/{id}/units      -> bulk_update_units
/// DELETE /{project_id}/sales-lists/{id}/units/{unit_id} -> remove_unit
/// GET    /{project_id}/sales-lists/{id}/versions   -> list
/// POST   /{project_id}/sales-lists/{id}/versions   -> save
/// GET    /{project_id}/sales-lists/{id}/versions/compare?from=&to= -> compare
/// GET    /{project_id}/sales-lists/{id}/versions/{version_id}      -> get_by_id
/// POST   /{project_id}/sales-lists/{id}/versions/{version_id}/restore -> restore
///
/// GET    /{project_id}/invitations                 -> list_by_project
/// POST   /{project_id}/invitations                 -> create
/// DELETE /{project_id}/invitations/{id}            -> revoke
///
/// GET    /{project_id}/submissions                 -> list_by_project
/// GET    /{project_id}/submissions/export.zip      -> export_zip
/// GET    /{project_id}/submissions/{id}            -> get_by_id
/// GET    /{project_id}/submissions/{id}/pdf        -> summary_pdf
/// GET    /{project_id}/submissions/{id}/floor-plan.pdf -> floor_plan_pdf
/// ```
pub fn router() -> Router<AppState> {
    let unit_type_routes = Router::new()
        .route(
            "/",
            get(unit_type::list_by_project).post(unit_type::create),
        )
        .route(
            "/{id}",
            get(unit_type::get_by_id)
                .put(unit_type::update)
                .delete(unit_type::delete),
        );

    let unit_routes = Router::new()
        .route("/", get(unit::list_by_project).post(unit::create))
        .route(
            "/{id}",
            get(unit::get_by_id).put(unit::update).delete(unit::delete),
        )
        .route("/{id}/credentials", post(unit::reset_credentials))
        .route(
            "/{id}/floor-plan",
            get(unit::download_floor_plan).post(unit::upload_floor_plan),
        );

    let color_scheme_routes = Router::new()
        .route(
            "/",
            get(color_scheme::list_by_project).post(color_scheme::create),
        )
        .route(
            "/{id}",
            get(color_scheme::get_by_id)
                .put(color_scheme::update)
                .delete(color_scheme::delete),
        );

    let upgrade_option_routes = Router::new()
        .route(
            "/",
            get(upgrade_option::list_by_project).post(upgrade_option::create),
        )
        .route(
            "/{id}",
            get(upgrade_option::get_by_id)
                .put(upgrade_option::update)
                .delete(upgrade_option::delete),
        );

    let client_routes = Router::new()
        .route("/", get(client::list_by_project).post(client::create))
        .route(
            "/{id}",
            get(client::get_by_id)
                .put(client::update)
                .delete(client::delete),
        )
        .route(
            "/{id}/units",
            get(client::list_units).post(client::link_unit),
        )
        .route("/{id}/units/{unit_id}", delete(client::unlink_unit));

    let sales_list_routes = Router::new()
        .route(
            "/",
            get(sales_list::list_by_project).post(sales_list::create),
        )
        .route(
            "/{id}",
            get(sales_list::get_by_id)
                .put(sales_list::update)
                .delete(sales_list::delete),
        )
        .route(
            "/{id}/units",
            get(sales_list::list_units)
                .post(sales_list::add_units)
                .put(sales_list::bulk_update_units),
        )
        .route("/{id}/units/{unit_id}", delete(sales_list::remove_unit))
        .route(
            "/{id}/versions",
            get(sales_list_version::list).post(sales_list_version::save),
        )
        .route("/{id}/versions/compare", get(sales_list_version::compare))
        .route(
            "/{id}/versions/{version_id}",
            get(sales_list_version::get_by_id),
        )
        .route(
            "/{id}/versions/{version_id}/restore",
            post(sales_list_version::restore),
        );

    let invitation_routes = Router::new()
        .route(
            "/",
            get(invitation::list_by_project).post(invitation::create),
        )
        .route("/{id}", delete(invitation::revoke));

    let submission_routes = Router::new()
        .route("/", get(submission::list_by_project))
        .route("/export.zip", get(submission::export_zip))
        .route("/{id}", get(submission::get_by_id))
        .route("/{id}/pdf", get(submission::summary_pdf))
        .route("/{id}/floor-plan.pdf", get(submission::floor_plan_pdf));

    Router::new()
        .route("/", get(project::list).post(project::create))
        .route(
            "/{id}",
            get(project::get_by_id)
                .put(project::update)
                .delete(project::delete),
        )
        .nest("/{project_id}/unit-types", unit_type_routes)
        .nest("/{project_id}/units", unit_routes)
        .nest("/{project_id}/color-schemes", color_scheme_routes)
        .nest("/{project_id}/upgrade-options", upgrade_option_routes)
        .nest("/{project_id}/clients", client_routes)
        .nest("/{project_id}/sales-lists", sales_list_routes)
        .nest("/{project_id}/invitations", invitation_routes)
        .nest("/{project_id}/submissions", submission_routes)
}
