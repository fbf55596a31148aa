pub mod auth;
pub mod health;
pub mod invitation;
pub mod portal;
pub mod project;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/admin/login                                admin login (public)
/// /auth/client/login                               unit login (public)
/// /auth/me                                         current session (requires auth)
///
/// /invitations/accept                              exchange invitation token (public)
///
/// /projects                                        list, create (admin)
/// /projects/{id}                                   get, update, delete
/// /projects/{project_id}/unit-types                unit type CRUD
/// /projects/{project_id}/units                     unit CRUD, credentials, floor plan
/// /projects/{project_id}/color-schemes             colour scheme CRUD
/// /projects/{project_id}/upgrade-options           upgrade option CRUD
/// /projects/{project_id}/clients                   client CRUD, unit links
/// /projects/{project_id}/sales-lists               lists, unit pricing, versions
/// /projects/{project_id}/invitations               issue, list, revoke
/// /projects/{project_id}/submissions               list, get, PDF and zip export
///
/// /portal/unit                                     client's unit (client)
/// /portal/options                                  schemes and upgrades on offer
/// /portal/selection                                get, save draft
/// /portal/wizard/advance                           validate and step forward
/// /portal/wizard/back                              step back
/// /portal/submit                                   finalize selection
/// /portal/submission/pdf                           own summary PDF
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/invitations", invitation::router())
        .nest("/projects", project::router())
        .nest("/portal", portal::router())
}
