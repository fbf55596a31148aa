//! Client portal handlers: unit info, options, the selection wizard, and
//! final submission.
//!
//! Every request is scoped to the unit named in the portal token. Prices,
//! categories and maximum quantities always come from the database; the
//! client only sends ids, quantities and floor-plan points.

use std::collections::HashMap;

use axum::extract::State;
use axum::response::Response;
use axum::Json;
use fitout_core::error::CoreError;
use fitout_core::pricing::PriceSummary;
use fitout_core::status::SubmissionStatus;
use fitout_core::types::{DbId, Timestamp};
use fitout_core::wizard::{
    can_advance, next_step, previous_step, requires_floor_plan, validate_complete,
    validate_draft, validate_step, validate_transition, FloorPlanPoint, SelectedUpgrade,
    WizardSelection, WizardStep,
};
use fitout_db::models::color_scheme::ColorScheme;
use fitout_db::models::project::Project;
use fitout_db::models::submission::{Submission, SubmissionSnapshot};
use fitout_db::models::unit::Unit;
use fitout_db::models::unit_type::UnitType;
use fitout_db::models::upgrade_option::UpgradeOption;
use fitout_db::repositories::{
    ClientRepo, ColorSchemeRepo, SubmissionRepo, UnitRepo, UnitTypeRepo, UpgradeOptionRepo,
};
use serde::{Deserialize, Serialize};

use super::auth::ensure_unit_active;
use crate::error::{AppError, AppResult};
use crate::export::{self, attachment};
use crate::middleware::rbac::{PortalSession, RequireClient};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// One upgrade as chosen by the client.
#[derive(Debug, Clone, Deserialize)]
pub struct UpgradeChoice {
    pub upgrade_option_id: DbId,
    pub quantity: i32,
    #[serde(default)]
    pub points: Vec<FloorPlanPoint>,
}

/// The client's raw choices, before prices are attached.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelectionInput {
    pub color_scheme_id: Option<DbId>,
    #[serde(default)]
    pub upgrades: Vec<UpgradeChoice>,
}

/// Body of `PUT /portal/selection`.
#[derive(Debug, Deserialize)]
pub struct SaveSelectionRequest {
    pub current_step: u8,
    #[serde(flatten)]
    pub selection: SelectionInput,
}

/// Body of the wizard navigation endpoints.
#[derive(Debug, Deserialize)]
pub struct WizardMoveRequest {
    pub current_step: u8,
    #[serde(default)]
    pub selection: SelectionInput,
}

#[derive(Debug, Serialize)]
pub struct AdvanceResponse {
    pub next_step: u8,
    pub step_label: &'static str,
    pub requires_floor_plan: bool,
    pub summary: PriceSummary,
}

#[derive(Debug, Serialize)]
pub struct BackResponse {
    pub previous_step: u8,
    pub step_label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct PortalUnit {
    pub unit: Unit,
    pub unit_type: Option<UnitType>,
    pub project: Project,
}

#[derive(Debug, Serialize)]
pub struct PortalOptions {
    pub color_schemes: Vec<ColorScheme>,
    pub upgrade_options: Vec<UpgradeOption>,
}

/// The unit's saved selection, or an empty one at step 1.
#[derive(Debug, Serialize)]
pub struct PortalSelection {
    pub status: SubmissionStatus,
    pub current_step: u8,
    pub step_label: &'static str,
    pub color_scheme_id: Option<DbId>,
    pub color_scheme_name: Option<String>,
    pub upgrades: Vec<SelectedUpgrade>,
    pub requires_floor_plan: bool,
    /// Whether the stored step is complete enough to move forward.
    pub can_advance: bool,
    pub summary: PriceSummary,
    pub submitted_at: Option<Timestamp>,
}

impl PortalSelection {
    fn empty() -> Self {
        let step = WizardStep::ColorScheme;
        Self {
            status: SubmissionStatus::Draft,
            current_step: step.to_number(),
            step_label: step.label(),
            color_scheme_id: None,
            color_scheme_name: None,
            upgrades: Vec::new(),
            requires_floor_plan: false,
            can_advance: false,
            summary: PriceSummary::from_lines::<SelectedUpgrade>(&[]),
            submitted_at: None,
        }
    }

    fn from_submission(submission: &Submission) -> AppResult<Self> {
        let upgrades = export::decode_upgrades(submission)?;
        let step = stored_step(submission);
        let selection = WizardSelection {
            color_scheme_id: submission.color_scheme_id,
            upgrades,
        };
        Ok(Self {
            status: SubmissionStatus::from_str_db(&submission.status)?,
            current_step: step.to_number(),
            step_label: step.label(),
            color_scheme_id: submission.color_scheme_id,
            color_scheme_name: submission.color_scheme_name.clone(),
            requires_floor_plan: requires_floor_plan(&selection),
            can_advance: can_advance(step, &selection),
            upgrades: selection.upgrades,
            summary: PriceSummary {
                subtotal: submission.upgrade_total,
                gst: submission.gst,
                total: submission.total_incl_gst,
            },
            submitted_at: submission.submitted_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The session's unit, provided it is still active.
async fn session_unit(state: &AppState, session: PortalSession) -> AppResult<Unit> {
    let unit = UnitRepo::find_by_id_unscoped(&state.pool, session.unit_id)
        .await?
        .ok_or(AppError::not_found("Unit", session.unit_id))?;
    ensure_unit_active(&unit)?;
    Ok(unit)
}

async fn unit_options(state: &AppState, unit: &Unit) -> AppResult<PortalOptions> {
    let color_schemes =
        ColorSchemeRepo::list_for_unit_type(&state.pool, unit.project_id, unit.unit_type_id)
            .await?;
    let upgrade_options =
        UpgradeOptionRepo::list_for_unit_type(&state.pool, unit.project_id, unit.unit_type_id)
            .await?;
    Ok(PortalOptions {
        color_schemes,
        upgrade_options,
    })
}

/// A hydrated selection plus the chosen scheme's name.
struct Hydrated {
    selection: WizardSelection,
    color_scheme_name: Option<String>,
}

/// Attach database prices and limits to the client's choices, rejecting
/// anything not offered for this unit.
fn hydrate(input: &SelectionInput, options: &PortalOptions) -> Result<Hydrated, CoreError> {
    let color_scheme_name = match input.color_scheme_id {
        Some(id) => Some(
            options
                .color_schemes
                .iter()
                .find(|s| s.id == id)
                .map(|s| s.name.clone())
                .ok_or_else(|| {
                    CoreError::Validation(format!(
                        "Colour scheme {id} is not available for this unit"
                    ))
                })?,
        ),
        None => None,
    };

    let offered: HashMap<DbId, &UpgradeOption> = options
        .upgrade_options
        .iter()
        .map(|o| (o.id, o))
        .collect();

    let upgrades = input
        .upgrades
        .iter()
        .map(|choice| -> Result<SelectedUpgrade, CoreError> {
            let option = offered.get(&choice.upgrade_option_id).ok_or_else(|| {
                CoreError::Validation(format!(
                    "Upgrade option {} is not available for this unit",
                    choice.upgrade_option_id
                ))
            })?;
            Ok(SelectedUpgrade {
                upgrade_option_id: option.id,
                name: option.name.clone(),
                category: option.category.clone(),
                price: option.price,
                max_quantity: option.max_quantity,
                quantity: choice.quantity,
                points: choice.points.clone(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Hydrated {
        selection: WizardSelection {
            color_scheme_id: input.color_scheme_id,
            upgrades,
        },
        color_scheme_name,
    })
}

fn stored_step(submission: &Submission) -> WizardStep {
    u8::try_from(submission.current_step)
        .ok()
        .and_then(|n| WizardStep::from_number(n).ok())
        .unwrap_or(WizardStep::ColorScheme)
}

fn already_submitted() -> AppError {
    AppError::Core(CoreError::Conflict(
        "This selection has already been submitted".into(),
    ))
}

/// Build the row written by draft saves and submission.
async fn snapshot(
    state: &AppState,
    session: PortalSession,
    unit: &Unit,
    hydrated: Hydrated,
    step: WizardStep,
) -> AppResult<SubmissionSnapshot> {
    let client_id = match session.client_id {
        Some(id) => Some(id),
        None => ClientRepo::find_purchaser_for_unit(&state.pool, unit.id)
            .await?
            .map(|c| c.id),
    };

    let prices = PriceSummary::from_lines(&hydrated.selection.upgrades);
    let selected_upgrades = serde_json::to_value(&hydrated.selection.upgrades)
        .map_err(|e| AppError::InternalError(format!("Failed to encode upgrades: {e}")))?;

    Ok(SubmissionSnapshot {
        token: unit.portal_token.clone(),
        unit_id: unit.id,
        client_id,
        color_scheme_id: hydrated.selection.color_scheme_id,
        color_scheme_name: hydrated.color_scheme_name,
        selected_upgrades,
        upgrade_total: prices.subtotal,
        gst: prices.gst,
        total_incl_gst: prices.total,
        current_step: i16::from(step.to_number()),
    })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/portal/unit
pub async fn get_unit(
    RequireClient(session): RequireClient,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<PortalUnit>>> {
    let unit = session_unit(&state, session).await?;
    let project = super::load_project(&state.pool, unit.project_id).await?;
    let unit_type = match unit.unit_type_id {
        Some(id) => UnitTypeRepo::find_by_id(&state.pool, unit.project_id, id).await?,
        None => None,
    };
    Ok(Json(DataResponse {
        data: PortalUnit {
            unit,
            unit_type,
            project,
        },
    }))
}

/// GET /api/v1/portal/options
///
/// Colour schemes and active upgrades offered for the unit's type. Items
/// not linked to any unit type are offered to every unit.
pub async fn get_options(
    RequireClient(session): RequireClient,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<PortalOptions>>> {
    let unit = session_unit(&state, session).await?;
    let options = unit_options(&state, &unit).await?;
    Ok(Json(DataResponse { data: options }))
}

/// GET /api/v1/portal/selection
pub async fn get_selection(
    RequireClient(session): RequireClient,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<PortalSelection>>> {
    let unit = session_unit(&state, session).await?;
    let selection = match SubmissionRepo::find_by_token(&state.pool, &unit.portal_token).await? {
        Some(submission) => PortalSelection::from_submission(&submission)?,
        None => PortalSelection::empty(),
    };
    Ok(Json(DataResponse { data: selection }))
}

/// PUT /api/v1/portal/selection
///
/// Save a draft at `current_step`. Quantities and point counts are checked on
/// every save. Moving forward from the stored step also requires the stored
/// step to be complete; staying or moving back does not.
pub async fn save_selection(
    RequireClient(session): RequireClient,
    State(state): State<AppState>,
    Json(input): Json<SaveSelectionRequest>,
) -> AppResult<Json<DataResponse<PortalSelection>>> {
    let unit = session_unit(&state, session).await?;
    let target = WizardStep::from_number(input.current_step)?;
    if target == WizardStep::Confirmation {
        return Err(AppError::Core(CoreError::Validation(
            "Use submit to confirm a selection".into(),
        )));
    }

    let existing = SubmissionRepo::find_by_token(&state.pool, &unit.portal_token).await?;
    let from = match &existing {
        Some(s) if s.status == SubmissionStatus::Submitted.as_str() => {
            return Err(already_submitted())
        }
        Some(s) => stored_step(s),
        None => WizardStep::ColorScheme,
    };

    let options = unit_options(&state, &unit).await?;
    let hydrated = hydrate(&input.selection, &options)?;
    validate_draft(&hydrated.selection)?;
    validate_transition(from, target, &hydrated.selection)?;

    let row = snapshot(&state, session, &unit, hydrated, target).await?;
    let saved = SubmissionRepo::upsert_draft(&state.pool, &row)
        .await?
        .ok_or_else(already_submitted)?;

    tracing::debug!(unit_id = unit.id, step = target.to_number(), "Draft saved");
    Ok(Json(DataResponse {
        data: PortalSelection::from_submission(&saved)?,
    }))
}

/// POST /api/v1/portal/wizard/advance
///
/// Validate the current step and report where the wizard goes next.
pub async fn advance(
    RequireClient(session): RequireClient,
    State(state): State<AppState>,
    Json(input): Json<WizardMoveRequest>,
) -> AppResult<Json<DataResponse<AdvanceResponse>>> {
    let unit = session_unit(&state, session).await?;
    let current = WizardStep::from_number(input.current_step)?;
    let options = unit_options(&state, &unit).await?;
    let hydrated = hydrate(&input.selection, &options)?;

    validate_step(current, &hydrated.selection)?;
    let next = next_step(current, &hydrated.selection)?;

    Ok(Json(DataResponse {
        data: AdvanceResponse {
            next_step: next.to_number(),
            step_label: next.label(),
            requires_floor_plan: requires_floor_plan(&hydrated.selection),
            summary: PriceSummary::from_lines(&hydrated.selection.upgrades),
        },
    }))
}

/// POST /api/v1/portal/wizard/back
pub async fn back(
    RequireClient(session): RequireClient,
    State(state): State<AppState>,
    Json(input): Json<WizardMoveRequest>,
) -> AppResult<Json<DataResponse<BackResponse>>> {
    let unit = session_unit(&state, session).await?;
    let current = WizardStep::from_number(input.current_step)?;
    let options = unit_options(&state, &unit).await?;
    let hydrated = hydrate(&input.selection, &options)?;

    let previous = previous_step(current, &hydrated.selection)?;
    Ok(Json(DataResponse {
        data: BackResponse {
            previous_step: previous.to_number(),
            step_label: previous.label(),
        },
    }))
}

/// POST /api/v1/portal/submit
///
/// Finalize the selection. Totals are recomputed from current database
/// prices; a submitted selection can no longer change.
pub async fn submit(
    RequireClient(session): RequireClient,
    State(state): State<AppState>,
    Json(input): Json<SelectionInput>,
) -> AppResult<Json<DataResponse<PortalSelection>>> {
    let unit = session_unit(&state, session).await?;
    let options = unit_options(&state, &unit).await?;
    let hydrated = hydrate(&input, &options)?;
    validate_complete(&hydrated.selection)?;

    let row = snapshot(&state, session, &unit, hydrated, WizardStep::Confirmation).await?;
    let submitted = SubmissionRepo::submit(&state.pool, &row)
        .await?
        .ok_or_else(already_submitted)?;

    tracing::info!(
        unit_id = unit.id,
        submission_id = submitted.id,
        total = %submitted.total_incl_gst,
        "Selection submitted"
    );
    Ok(Json(DataResponse {
        data: PortalSelection::from_submission(&submitted)?,
    }))
}

/// GET /api/v1/portal/submission/pdf
pub async fn submission_pdf(
    RequireClient(session): RequireClient,
    State(state): State<AppState>,
) -> AppResult<Response> {
    let unit = session_unit(&state, session).await?;
    let submission = SubmissionRepo::find_by_token(&state.pool, &unit.portal_token)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(
                "No selection has been saved for this unit yet".into(),
            ))
        })?;
    let project = super::load_project(&state.pool, unit.project_id).await?;
    let ctx = export::load_context(&state.pool, &project, &submission).await?;

    let filename = format!("{}-summary.pdf", export::file_stem(&unit.unit_number));
    Ok(attachment(
        export::summary_pdf(&ctx, &submission),
        "application/pdf",
        &filename,
    ))
}
