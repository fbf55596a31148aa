//! PDF and zip export of client submissions.

use std::collections::HashSet;
use std::io::{Cursor, Write};

use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use fitout_core::credentials::slugify;
use fitout_core::materials::{material_rows, parse_materials, MaterialRow};
use fitout_core::pdf::{render_floor_plan, render_selection_summary, SelectionSummary};
use fitout_core::pricing::PriceSummary;
use fitout_core::types::DbId;
use fitout_core::wizard::SelectedUpgrade;
use fitout_db::models::project::Project;
use fitout_db::models::submission::Submission;
use fitout_db::models::unit::Unit;
use fitout_db::repositories::{ClientRepo, ColorSchemeRepo, UnitRepo};
use fitout_db::DbPool;
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

use crate::error::{AppError, AppResult};

/// Everything needed to render one submission.
#[derive(Debug)]
pub struct ExportContext {
    pub project: Project,
    pub unit: Unit,
    pub client_name: Option<String>,
    pub materials: Vec<MaterialRow>,
    pub upgrades: Vec<SelectedUpgrade>,
}

/// Gather unit, client, scheme materials and upgrades for a submission.
///
/// A scheme deleted after submission leaves the stored scheme name and no
/// material rows.
pub async fn load_context(
    pool: &DbPool,
    project: &Project,
    submission: &Submission,
) -> AppResult<ExportContext> {
    let unit = UnitRepo::find_by_id(pool, project.id, submission.unit_id)
        .await?
        .ok_or(AppError::not_found("Unit", submission.unit_id))?;

    let client_name = match submission.client_id {
        Some(client_id) => ClientRepo::find_by_id(pool, project.id, client_id)
            .await?
            .map(|c| c.name),
        None => None,
    };

    let materials = match submission.color_scheme_id {
        Some(scheme_id) => match ColorSchemeRepo::find_by_id(pool, project.id, scheme_id).await? {
            Some(scheme) => match parse_materials(&scheme.materials) {
                Ok(parsed) => material_rows(&parsed),
                Err(e) => {
                    tracing::warn!(scheme_id, error = %e, "Stored materials failed to parse");
                    Vec::new()
                }
            },
            None => Vec::new(),
        },
        None => Vec::new(),
    };

    let upgrades = decode_upgrades(submission)?;

    Ok(ExportContext {
        project: project.clone(),
        unit,
        client_name,
        materials,
        upgrades,
    })
}

/// Decode the stored `selected_upgrades` JSON.
pub fn decode_upgrades(submission: &Submission) -> AppResult<Vec<SelectedUpgrade>> {
    serde_json::from_value(submission.selected_upgrades.clone()).map_err(|e| {
        AppError::InternalError(format!(
            "Submission {} has malformed upgrades: {e}",
            submission.id
        ))
    })
}

/// Selection summary PDF, priced from the stored totals.
pub fn summary_pdf(ctx: &ExportContext, submission: &Submission) -> Vec<u8> {
    let summary = SelectionSummary {
        project_name: &ctx.project.name,
        unit_number: &ctx.unit.unit_number,
        client_name: ctx.client_name.as_deref(),
        status: &submission.status,
        submitted_at: submission.submitted_at,
        color_scheme_name: submission.color_scheme_name.as_deref(),
        materials: &ctx.materials,
        upgrades: &ctx.upgrades,
        prices: PriceSummary {
            subtotal: submission.upgrade_total,
            gst: submission.gst,
            total: submission.total_incl_gst,
        },
    };
    render_selection_summary(&summary)
}

pub fn floor_plan_pdf(ctx: &ExportContext) -> Vec<u8> {
    render_floor_plan(&ctx.project.name, &ctx.unit.unit_number, &ctx.upgrades)
}

/// `unit-12b` style file stem for a unit.
pub fn file_stem(unit_number: &str) -> String {
    let slug = slugify(unit_number);
    if slug.is_empty() {
        "unit".to_string()
    } else {
        format!("unit-{slug}")
    }
}

/// One file stem per `(unit_id, unit_number)`, distinct within the archive.
///
/// Unit numbers that only differ by case or punctuation slugify alike; later
/// ones get their unit id appended.
pub fn archive_stems<'a>(units: impl IntoIterator<Item = (DbId, &'a str)>) -> Vec<String> {
    let mut used = HashSet::new();
    units
        .into_iter()
        .map(|(unit_id, unit_number)| {
            let stem = file_stem(unit_number);
            let mut candidate = stem.clone();
            let mut n = 1;
            while !used.insert(candidate.clone()) {
                candidate = if n == 1 {
                    format!("{stem}-{unit_id}")
                } else {
                    format!("{stem}-{unit_id}-{n}")
                };
                n += 1;
            }
            candidate
        })
        .collect()
}

/// Pack named files into an in-memory zip archive.
pub fn build_zip(entries: &[(String, Vec<u8>)]) -> Result<Vec<u8>, zip::result::ZipError> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, bytes) in entries {
        writer.start_file(name.as_str(), options)?;
        writer.write_all(bytes)?;
    }

    Ok(writer.finish()?.into_inner())
}

/// Binary download response with an attachment filename.
pub fn attachment(bytes: Vec<u8>, content_type: &str, filename: &str) -> Response {
    (
        [
            (CONTENT_TYPE, content_type.to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}
