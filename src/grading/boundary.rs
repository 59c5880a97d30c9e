//! Ordered cut points over the score range.
//!
//! A `BoundarySet` owns `N` values bound to the fixed labels of its
//! [`Variant`]. The only invariant that matters is ordering:
//! `values[i] <= values[i + 1]` for every `i`, with every value inside the
//! score range. All mutation goes through [`BoundarySet::propose_move`] and
//! [`BoundarySet::reset`], both of which are all-or-nothing.

use serde::Serialize;
use tracing::debug;

use crate::domain::{Band, ScoreRange, Variant};
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundarySet {
    variant: Variant,
    range: ScoreRange,
    values: Vec<f64>,
    /// Bumped on every commit that changes at least one value.
    version: u64,
}

impl BoundarySet {
    /// Build a boundary set from explicit values.
    pub fn new(variant: Variant, range: ScoreRange, values: &[f64]) -> Result<Self, AppError> {
        validate(variant, range, values)?;
        Ok(Self {
            variant,
            range,
            values: values.to_vec(),
            version: 0,
        })
    }

    /// Build a boundary set from the variant defaults.
    ///
    /// Defaults are expressed on a 0..100 scale and mapped linearly onto
    /// `range`, so they stay ordered and in range for any valid range.
    pub fn with_defaults(variant: Variant, range: ScoreRange) -> Self {
        Self {
            variant,
            range,
            values: scaled_defaults(variant, range),
            version: 0,
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn range(&self) -> ScoreRange {
        self.range
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn handle_label(&self, index: usize) -> Option<&'static str> {
        self.variant.handle_labels().get(index).copied()
    }

    /// Whether handle `index` bounds no band and only caps its lower neighbour.
    ///
    /// In the nine-band layout A runs from A-'s cut to the range maximum, so
    /// the top handle never changes a grade.
    pub fn is_cap_only(&self, index: usize) -> bool {
        self.variant == Variant::Nine && index + 1 == self.values.len()
    }

    /// Defaults for this set's variant and range.
    pub fn defaults(&self) -> Vec<f64> {
        scaled_defaults(self.variant, self.range)
    }

    /// The interval position `index` may occupy: its neighbours, with the
    /// range endpoints standing in at either end.
    pub fn limits(&self, index: usize) -> Option<(f64, f64)> {
        if index >= self.values.len() {
            return None;
        }
        let lo = if index == 0 { self.range.min } else { self.values[index - 1] };
        let hi = self
            .values
            .get(index + 1)
            .copied()
            .unwrap_or(self.range.max);
        Some((lo, hi))
    }

    /// Clamp `new_value` between the neighbours of `index` and commit it.
    ///
    /// Returns the value actually applied. Calling this again with the same
    /// arguments leaves the set unchanged.
    pub fn propose_move(&mut self, index: usize, new_value: f64) -> Result<f64, AppError> {
        let (lo, hi) = self.limits(index).ok_or_else(|| {
            AppError::invalid_input(format!(
                "Boundary index {index} out of range (0..{}).",
                self.values.len()
            ))
        })?;
        if !new_value.is_finite() {
            return Err(AppError::invalid_input(format!(
                "Boundary value must be a finite number, got {new_value}."
            )));
        }

        let applied = new_value.clamp(lo, hi);
        if applied != self.values[index] {
            self.values[index] = applied;
            self.version += 1;
            debug!(index, requested = new_value, applied, version = self.version, "boundary moved");
        }
        Ok(applied)
    }

    /// Replace every value at once.
    ///
    /// `values` must have the variant's length, lie inside the range and be
    /// non-decreasing; otherwise the set is left untouched.
    pub fn reset(&mut self, values: &[f64]) -> Result<(), AppError> {
        validate(self.variant, self.range, values)?;
        if self.values != values {
            self.values = values.to_vec();
            self.version += 1;
        }
        debug!(version = self.version, "boundaries reset");
        Ok(())
    }

    /// Derive the bands this set partitions the range into, lowest first.
    pub fn bands(&self) -> Vec<Band> {
        let labels = self.variant.band_labels();
        let (min, max) = (self.range.min, self.range.max);
        let v = &self.values;

        match self.variant {
            Variant::Nine => labels
                .iter()
                .enumerate()
                .map(|(i, &label)| {
                    let top = i + 1 == labels.len();
                    if i == 0 {
                        Band { label, lower: min, upper: v[0], lower_closed: true, upper_closed: true }
                    } else {
                        Band {
                            label,
                            lower: v[i - 1],
                            upper: if top { max } else { v[i] },
                            lower_closed: false,
                            upper_closed: true,
                        }
                    }
                })
                .collect(),
            Variant::Four => labels
                .iter()
                .enumerate()
                .map(|(i, &label)| {
                    let top = i + 1 == labels.len();
                    Band {
                        label,
                        lower: if i == 0 { min } else { v[i - 1] },
                        upper: if top { max } else { v[i] },
                        lower_closed: true,
                        upper_closed: top,
                    }
                })
                .collect(),
        }
    }
}

/// Parse a comma-separated list of boundary values.
pub fn parse_boundary_list(s: &str) -> Result<Vec<f64>, AppError> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<f64>()
                .map_err(|_| AppError::invalid_input(format!("Invalid boundary value '{part}'.")))
        })
        .collect()
}

fn scaled_defaults(variant: Variant, range: ScoreRange) -> Vec<f64> {
    variant
        .default_boundaries()
        .iter()
        .map(|d| range.clamp(range.min + d / 100.0 * range.span()))
        .collect()
}

fn validate(variant: Variant, range: ScoreRange, values: &[f64]) -> Result<(), AppError> {
    let expected = variant.boundary_count();
    if values.len() != expected {
        return Err(AppError::invalid_configuration(format!(
            "The {} layout needs {expected} boundaries, got {}.",
            variant.display_name(),
            values.len()
        )));
    }
    if let Some(bad) = values.iter().find(|v| !v.is_finite() || !range.contains(**v)) {
        return Err(AppError::invalid_configuration(format!(
            "Boundary {bad} lies outside the score range [{}, {}].",
            range.min, range.max
        )));
    }
    if let Some(i) = values.windows(2).position(|w| w[0] > w[1]) {
        return Err(AppError::invalid_configuration(format!(
            "Boundaries must be non-decreasing: {} > {} at positions {i} and {}.",
            values[i],
            values[i + 1],
            i + 1
        )));
    }
    Ok(())
}
