//! Post-extract cleaning of raw field values.
//!
//! Runs after extraction, before analysis: derives age at recruitment
//! from the month-resolution birth and registration fields, then drops
//! records matching the standard exclusion codes. Every step applies
//! only when its columns are present, so the same pass works on any
//! extract regardless of which fields were requested.

use chrono::NaiveDate;

use crate::metadata::RawTable;

/// Column produced by [`derive_age_at_recruitment`].
pub const AGE_COLUMN: &str = "age_at_recruitment";

const REGISTRATION_YEAR: &str = "participant.registration_year";
const REGISTRATION_MONTH: &str = "participant.registration_month";
const BIRTH_YEAR: &str = "participant.birth_year";
const BIRTH_MONTH: &str = "participant.birth_month";

/// Drop records whose column value matches one of the excluded codes.
#[derive(Debug, Clone, PartialEq)]
pub struct ExclusionRule {
    pub column: String,
    pub excluded_codes: Vec<f64>,
    /// Also drop records where the value is missing or unparseable.
    pub reject_missing: bool,
}

impl ExclusionRule {
    pub fn new(column: &str, excluded_codes: &[f64], reject_missing: bool) -> Self {
        Self {
            column: column.to_string(),
            excluded_codes: excluded_codes.to_vec(),
            reject_missing,
        }
    }

    fn keeps(&self, cell: &str) -> bool {
        match parse_number(cell) {
            Some(value) => !self.excluded_codes.iter().any(|code| *code == value),
            None => !self.reject_missing,
        }
    }
}

/// The standard exclusion set: birth-year sentinel, coded refusals for
/// sex, ethnicity and income, and the minimum-age cut.
pub fn standard_exclusions() -> Vec<ExclusionRule> {
    vec![
        ExclusionRule::new(BIRTH_YEAR, &[-999.0], false),
        ExclusionRule::new("participant.demog_sex_2_1", &[3.0, -3.0], true),
        ExclusionRule::new("participant.demog_ethnicity_1_1", &[19.0, -3.0], false),
        ExclusionRule::new("questionnaire.housing_income_1_1", &[-1.0, -3.0], true),
    ]
}

/// Minimum age applied when [`AGE_COLUMN`] is present.
pub const MINIMUM_AGE: f64 = 18.0;

fn parse_number(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

fn month_date(year: f64, month: f64) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year as i32, month as u32, 1)
}

/// Append an age-at-recruitment column derived from the birth and
/// registration year/month fields, at month resolution.
///
/// Skipped (with a warning) when any required column is absent. Records
/// with unparseable dates get an empty age cell.
pub fn derive_age_at_recruitment(table: &mut RawTable) {
    let required = [
        REGISTRATION_YEAR,
        REGISTRATION_MONTH,
        BIRTH_YEAR,
        BIRTH_MONTH,
    ];
    let indexes: Option<Vec<usize>> = required
        .iter()
        .map(|name| table.column_index(name))
        .collect();

    let indexes = match indexes {
        Some(indexes) => indexes,
        None => {
            tracing::warn!("skipping age derivation: required columns not found");
            return;
        }
    };

    tracing::info!("deriving age from birth and registration dates");
    table.columns.push(AGE_COLUMN.to_string());

    for row in &mut table.rows {
        let values: Option<Vec<f64>> = indexes.iter().map(|&i| parse_number(&row[i])).collect();

        let age = values.and_then(|v| {
            let registration = month_date(v[0], v[1])?;
            let birth = month_date(v[2], v[3])?;
            let days = (registration - birth).num_days();
            Some(days as f64 / 365.25)
        });

        row.push(match age {
            Some(age) => format!("{:.2}", age),
            None => String::new(),
        });
    }
}

/// Drop records matching the exclusion rules, preserving row order.
///
/// Each rule applies only when its column exists in the table; when no
/// rule applies at all, the table passes through with a warning.
pub fn apply_exclusions(table: &mut RawTable, rules: &[ExclusionRule]) {
    let applicable: Vec<(usize, &ExclusionRule)> = rules
        .iter()
        .filter_map(|rule| table.column_index(&rule.column).map(|idx| (idx, rule)))
        .collect();

    let age_index = table.column_index(AGE_COLUMN);

    if applicable.is_empty() && age_index.is_none() {
        tracing::warn!("no applicable exclusions applied");
        return;
    }

    tracing::info!(rules = applicable.len(), "applying exclusion filters");
    let before = table.rows.len();

    table.rows.retain(|row| {
        let coded_ok = applicable.iter().all(|(idx, rule)| rule.keeps(&row[*idx]));
        // A missing derived age cannot clear the minimum-age cut.
        let age_ok = match age_index {
            Some(idx) => parse_number(&row[idx]).map(|age| age >= MINIMUM_AGE).unwrap_or(false),
            None => true,
        };
        coded_ok && age_ok
    });

    tracing::info!(
        dropped = before - table.rows.len(),
        kept = table.rows.len(),
        "exclusions applied"
    );
}

/// The full cleaning pass: derive age, then apply the standard
/// exclusions.
pub fn process(table: &mut RawTable) {
    derive_age_at_recruitment(table);
    apply_exclusions(table, &standard_exclusions());
}
