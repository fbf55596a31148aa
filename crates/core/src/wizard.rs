//! Client selection wizard: step definitions, skip rules, and validation.
//!
//! The wizard is a linear flow. The floor-plan step only exists for a
//! selection containing at least one Electrical or Lighting upgrade; every
//! other transition is a single step forward or back.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::pricing::{validate_quantity, PricedLine};
use crate::types::{DbId, Money};

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// The five wizard steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    ColorScheme,
    Upgrades,
    FloorPlan,
    Review,
    Confirmation,
}

/// Minimum step number (1-based).
pub const MIN_STEP: u8 = 1;

/// Maximum step number (1-based).
pub const MAX_STEP: u8 = 5;

impl WizardStep {
    /// Convert a 1-based step number to a `WizardStep`.
    pub fn from_number(n: u8) -> Result<Self, CoreError> {
        match n {
            1 => Ok(Self::ColorScheme),
            2 => Ok(Self::Upgrades),
            3 => Ok(Self::FloorPlan),
            4 => Ok(Self::Review),
            5 => Ok(Self::Confirmation),
            _ => Err(CoreError::Validation(format!(
                "Invalid step number {n}. Must be between {MIN_STEP} and {MAX_STEP}"
            ))),
        }
    }

    /// Convert to a 1-based step number.
    pub fn to_number(self) -> u8 {
        match self {
            Self::ColorScheme => 1,
            Self::Upgrades => 2,
            Self::FloorPlan => 3,
            Self::Review => 4,
            Self::Confirmation => 5,
        }
    }

    /// Human-readable label for the step.
    pub fn label(self) -> &'static str {
        match self {
            Self::ColorScheme => "Colour Scheme",
            Self::Upgrades => "Upgrades",
            Self::FloorPlan => "Floor Plan",
            Self::Review => "Review & Submit",
            Self::Confirmation => "Confirmation",
        }
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Upgrade categories whose items must be placed on the floor plan.
pub const FLOOR_PLAN_CATEGORIES: &[&str] = &["electrical", "lighting"];

/// A point placed on the floor plan, in normalized page coordinates (0..=1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorPlanPoint {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// One upgrade chosen by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedUpgrade {
    pub upgrade_option_id: DbId,
    pub name: String,
    pub category: String,
    pub price: Money,
    pub max_quantity: i32,
    pub quantity: i32,
    #[serde(default)]
    pub points: Vec<FloorPlanPoint>,
}

impl SelectedUpgrade {
    /// Whether this upgrade must be placed on the floor plan.
    pub fn needs_placement(&self) -> bool {
        is_floor_plan_category(&self.category)
    }
}

impl PricedLine for SelectedUpgrade {
    fn unit_price(&self) -> Money {
        self.price
    }

    fn quantity(&self) -> i32 {
        self.quantity
    }
}

/// Everything the client has chosen so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WizardSelection {
    pub color_scheme_id: Option<DbId>,
    #[serde(default)]
    pub upgrades: Vec<SelectedUpgrade>,
}

/// Case-insensitive category check against [`FLOOR_PLAN_CATEGORIES`].
pub fn is_floor_plan_category(category: &str) -> bool {
    let normalized = category.trim().to_lowercase();
    FLOOR_PLAN_CATEGORIES.contains(&normalized.as_str())
}

/// True iff any selected upgrade is Electrical or Lighting.
pub fn requires_floor_plan(selection: &WizardSelection) -> bool {
    selection.upgrades.iter().any(SelectedUpgrade::needs_placement)
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

/// The step after `current`, skipping the floor plan when it is not needed.
pub fn next_step(current: WizardStep, selection: &WizardSelection) -> Result<WizardStep, CoreError> {
    match current {
        WizardStep::ColorScheme => Ok(WizardStep::Upgrades),
        WizardStep::Upgrades if requires_floor_plan(selection) => Ok(WizardStep::FloorPlan),
        WizardStep::Upgrades => Ok(WizardStep::Review),
        WizardStep::FloorPlan => Ok(WizardStep::Review),
        WizardStep::Review => Ok(WizardStep::Confirmation),
        WizardStep::Confirmation => Err(CoreError::Validation(
            "Confirmation is the final step".to_string(),
        )),
    }
}

/// The step before `current`, skipping the floor plan when it is not needed.
pub fn previous_step(
    current: WizardStep,
    selection: &WizardSelection,
) -> Result<WizardStep, CoreError> {
    match current {
        WizardStep::ColorScheme => Err(CoreError::Validation(
            "Colour scheme is the first step".to_string(),
        )),
        WizardStep::Upgrades => Ok(WizardStep::ColorScheme),
        WizardStep::FloorPlan => Ok(WizardStep::Upgrades),
        WizardStep::Review if requires_floor_plan(selection) => Ok(WizardStep::FloorPlan),
        WizardStep::Review => Ok(WizardStep::Upgrades),
        WizardStep::Confirmation => Err(CoreError::Validation(
            "A submitted selection cannot go back".to_string(),
        )),
    }
}

/// Validate a move from `from` to `to`.
///
/// Staying on the same step is always allowed (saving a draft). Moving
/// forward requires the current step to be complete; moving back does not.
pub fn validate_transition(
    from: WizardStep,
    to: WizardStep,
    selection: &WizardSelection,
) -> Result<(), CoreError> {
    if from == to {
        return Ok(());
    }
    if next_step(from, selection).ok() == Some(to) {
        return validate_step(from, selection);
    }
    if previous_step(from, selection).ok() == Some(to) {
        return Ok(());
    }
    Err(CoreError::Validation(format!(
        "Cannot move from '{}' to '{}'",
        from.label(),
        to.label()
    )))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate that `step` is complete for `selection`.
pub fn validate_step(step: WizardStep, selection: &WizardSelection) -> Result<(), CoreError> {
    match step {
        WizardStep::ColorScheme => validate_color_scheme(selection),
        WizardStep::Upgrades => validate_upgrades(selection),
        WizardStep::FloorPlan => validate_placements(selection),
        WizardStep::Review | WizardStep::Confirmation => validate_complete(selection),
    }
}

/// Boolean form of [`validate_step`].
pub fn can_advance(step: WizardStep, selection: &WizardSelection) -> bool {
    step != WizardStep::Confirmation && validate_step(step, selection).is_ok()
}

/// Every step that precedes submission is complete.
pub fn validate_complete(selection: &WizardSelection) -> Result<(), CoreError> {
    validate_color_scheme(selection)?;
    validate_upgrades(selection)?;
    validate_placements(selection)
}

fn validate_color_scheme(selection: &WizardSelection) -> Result<(), CoreError> {
    if selection.color_scheme_id.is_none() {
        return Err(CoreError::Validation(
            "A colour scheme must be chosen".to_string(),
        ));
    }
    Ok(())
}

fn validate_upgrades(selection: &WizardSelection) -> Result<(), CoreError> {
    let mut seen = HashSet::new();
    for upgrade in &selection.upgrades {
        if !seen.insert(upgrade.upgrade_option_id) {
            return Err(CoreError::Validation(format!(
                "Upgrade '{}' is selected more than once",
                upgrade.name
            )));
        }
        validate_quantity(&upgrade.name, upgrade.quantity, upgrade.max_quantity)?;
    }
    Ok(())
}

/// Each Electrical/Lighting upgrade needs exactly `quantity` in-bounds points;
/// other upgrades carry none.
pub fn validate_placements(selection: &WizardSelection) -> Result<(), CoreError> {
    check_placements(selection, true)
}

/// Checks that hold for every saved draft, whatever step it is on: upgrade
/// quantities within bounds and no more points than each upgrade allows.
pub fn validate_draft(selection: &WizardSelection) -> Result<(), CoreError> {
    validate_upgrades(selection)?;
    check_placements(selection, false)
}

fn check_placements(selection: &WizardSelection, exact: bool) -> Result<(), CoreError> {
    for upgrade in &selection.upgrades {
        if !upgrade.needs_placement() {
            if !upgrade.points.is_empty() {
                return Err(CoreError::Validation(format!(
                    "Upgrade '{}' is not placed on the floor plan",
                    upgrade.name
                )));
            }
            continue;
        }

        let placed = upgrade.points.len();
        let required = usize::try_from(upgrade.quantity).unwrap_or(0);
        if placed > required || (exact && placed != required) {
            return Err(CoreError::Validation(format!(
                "Upgrade '{}' needs {required} point(s) on the floor plan, {placed} placed",
                upgrade.name
            )));
        }

        for point in &upgrade.points {
            if !in_unit_range(point.x) || !in_unit_range(point.y) {
                return Err(CoreError::Validation(format!(
                    "Point ({}, {}) for '{}' is outside the floor plan",
                    point.x, point.y, upgrade.name
                )));
            }
        }
    }
    Ok(())
}

fn in_unit_range(v: f64) -> bool {
    v.is_finite() && (0.0..=1.0).contains(&v)
}
