//! Numeric parameters of the leg model.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LimbError, Result};

/// Segment lengths, mass-center offsets, masses, central inertias about the
/// joint axis, and gravity. SI units.
///
/// Missing fields fall back to the defaults, which describe a standing adult.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegParameters {
    pub lower_leg_length: f64,
    pub lower_leg_com_length: f64,
    pub lower_leg_mass: f64,
    pub lower_leg_inertia: f64,
    pub upper_leg_length: f64,
    pub upper_leg_com_length: f64,
    pub upper_leg_mass: f64,
    pub upper_leg_inertia: f64,
    pub torso_com_length: f64,
    pub torso_mass: f64,
    pub torso_inertia: f64,
    pub gravity: f64,
}

impl Default for LegParameters {
    fn default() -> Self {
        Self {
            lower_leg_length: 0.611,
            lower_leg_com_length: 0.387,
            lower_leg_mass: 6.769,
            lower_leg_inertia: 0.101,
            upper_leg_length: 0.424,
            upper_leg_com_length: 0.193,
            upper_leg_mass: 17.01,
            upper_leg_inertia: 0.282,
            torso_com_length: 0.305,
            torso_mass: 32.44,
            torso_inertia: 1.485,
            gravity: 9.81,
        }
    }
}

impl LegParameters {
    pub fn from_json(json: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Masses, lengths, inertias and gravity must be positive and finite;
    /// mass-center offsets non-negative.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("lower_leg_length", self.lower_leg_length),
            ("lower_leg_mass", self.lower_leg_mass),
            ("lower_leg_inertia", self.lower_leg_inertia),
            ("upper_leg_length", self.upper_leg_length),
            ("upper_leg_mass", self.upper_leg_mass),
            ("upper_leg_inertia", self.upper_leg_inertia),
            ("torso_mass", self.torso_mass),
            ("torso_inertia", self.torso_inertia),
            ("gravity", self.gravity),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(LimbError::InvalidParameter(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        let offsets = [
            ("lower_leg_com_length", self.lower_leg_com_length),
            ("upper_leg_com_length", self.upper_leg_com_length),
            ("torso_com_length", self.torso_com_length),
        ];
        for (name, value) in offsets {
            if !(value.is_finite() && value >= 0.0) {
                return Err(LimbError::InvalidParameter(format!(
                    "{name} must be non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Values in the order of [`crate::LegSymbols::constants`].
    pub fn values(&self) -> [f64; 12] {
        [
            self.lower_leg_length,
            self.lower_leg_com_length,
            self.lower_leg_mass,
            self.lower_leg_inertia,
            self.upper_leg_length,
            self.upper_leg_com_length,
            self.upper_leg_mass,
            self.upper_leg_inertia,
            self.torso_com_length,
            self.torso_mass,
            self.torso_inertia,
            self.gravity,
        ]
    }
}
