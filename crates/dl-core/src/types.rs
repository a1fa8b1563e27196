//! Panel data types for DiDLab
//!
//! A [`Panel`] is a row-oriented table over Unit × TimePeriod. The period set
//! is fixed at `{-3, -2, -1, 0, 1}` with `1` as the only post-treatment period.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Ordered set of time periods in every panel.
pub const PERIODS: [i64; 5] = [-3, -2, -1, 0, 1];

/// Number of periods per unit.
pub const N_PERIODS: usize = PERIODS.len();

/// The single post-treatment period.
pub const POST_PERIOD: i64 = 1;

/// One (unit, period) observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanelRow {
    /// Unit identifier in `[0, N)`.
    pub unit: usize,
    /// Treatment group: 1 = treated, 0 = control. Fixed per unit.
    pub treat: u8,
    /// Time period, one of [`PERIODS`].
    pub time_period: i64,
    /// 1 iff `time_period == POST_PERIOD`.
    pub time_indicator: u8,
    /// Unit-level heterogeneity draw (diagnostic; absent for external panels).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_baseline_effect: Option<f64>,
    /// Period-level common shock (diagnostic; absent for external panels).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_effect: Option<f64>,
    /// Observed outcome.
    pub outcome: f64,
}

/// Treated / control unit counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSizes {
    /// Number of distinct treated units.
    pub n_treated: usize,
    /// Number of distinct control units.
    pub n_control: usize,
}

/// Mean outcome of one (treat, time_period) cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupMean {
    /// Treatment group (0 or 1).
    pub treat: u8,
    /// Time period.
    pub time_period: i64,
    /// Mean outcome over the cell.
    pub mean_outcome: f64,
    /// Number of rows in the cell.
    pub n_obs: usize,
}

#[derive(Deserialize)]
struct PanelRows {
    rows: Vec<PanelRow>,
}

impl TryFrom<PanelRows> for Panel {
    type Error = Error;

    fn try_from(value: PanelRows) -> Result<Self> {
        Panel::from_rows(value.rows)
    }
}

/// Immutable panel table.
///
/// Rows produced by the simulator are ordered unit-major, period-minor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PanelRows")]
pub struct Panel {
    rows: Vec<PanelRow>,
}

impl Panel {
    /// Build a panel from rows, validating column domains.
    ///
    /// Checks `treat`/`time_indicator` ∈ {0,1}, `time_period` ∈ [`PERIODS`],
    /// `time_indicator == (time_period == POST_PERIOD)`, a finite outcome and
    /// a constant `treat` per unit and at most one row per `(unit, time_period)`.
    /// Group balance is not checked here.
    pub fn from_rows(rows: Vec<PanelRow>) -> Result<Self> {
        let mut unit_treat: HashMap<usize, u8> = HashMap::new();
        let mut seen: HashSet<(usize, i64)> = HashSet::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            if row.treat > 1 {
                return Err(Error::Validation(format!(
                    "row {}: treat must be 0 or 1, got {}",
                    i, row.treat
                )));
            }
            if !PERIODS.contains(&row.time_period) {
                return Err(Error::Validation(format!(
                    "row {}: time_period must be one of {:?}, got {}",
                    i, PERIODS, row.time_period
                )));
            }
            let expected = u8::from(row.time_period == POST_PERIOD);
            if row.time_indicator != expected {
                return Err(Error::Validation(format!(
                    "row {}: time_indicator must be {} for time_period {}, got {}",
                    i, expected, row.time_period, row.time_indicator
                )));
            }
            if !row.outcome.is_finite() {
                return Err(Error::Validation(format!("row {}: outcome must be finite", i)));
            }
            let prev = *unit_treat.entry(row.unit).or_insert(row.treat);
            if prev != row.treat {
                return Err(Error::Validation(format!(
                    "unit {} changes treatment status across rows",
                    row.unit
                )));
            }
            if !seen.insert((row.unit, row.time_period)) {
                return Err(Error::Validation(format!(
                    "row {}: duplicate observation for unit {} in period {}",
                    i, row.unit, row.time_period
                )));
            }
        }
        Ok(Self { rows })
    }

    /// All rows.
    pub fn rows(&self) -> &[PanelRow] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// `true` if the panel has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of distinct units.
    pub fn n_units(&self) -> usize {
        let sizes = self.group_sizes();
        sizes.n_treated + sizes.n_control
    }

    /// Distinct unit counts per treatment group.
    pub fn group_sizes(&self) -> GroupSizes {
        let mut units: BTreeMap<usize, u8> = BTreeMap::new();
        for row in &self.rows {
            units.insert(row.unit, row.treat);
        }
        let n_treated = units.values().filter(|&&t| t == 1).count();
        GroupSizes { n_treated, n_control: units.len() - n_treated }
    }

    /// Mean outcome per (treat, time_period) cell, control first, periods ascending.
    ///
    /// Empty cells are omitted.
    pub fn group_means(&self) -> Vec<GroupMean> {
        let mut cells: BTreeMap<(u8, i64), (f64, usize)> = BTreeMap::new();
        for row in &self.rows {
            let cell = cells.entry((row.treat, row.time_period)).or_insert((0.0, 0));
            cell.0 += row.outcome;
            cell.1 += 1;
        }
        cells
            .into_iter()
            .map(|((treat, time_period), (sum, n))| GroupMean {
                treat,
                time_period,
                mean_outcome: sum / n as f64,
                n_obs: n,
            })
            .collect()
    }
}
