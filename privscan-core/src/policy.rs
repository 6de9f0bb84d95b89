//! Scoring policy
//!
//! A single policy object carries the dimension weights and the per-unit
//! increments used by the graded evaluators. Policies loaded from disk are
//! validated before the aggregator accepts them.

use crate::error::{AuditError, Result};
use crate::model::Dimension;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const WEIGHT_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub transport: f64,
    pub cookies: f64,
    pub transparency: f64,
    pub trackers: f64,
}

impl Weights {
    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Transport => self.transport,
            Dimension::Cookies => self.cookies,
            Dimension::Transparency => self.transparency,
            Dimension::Trackers => self.trackers,
        }
    }

    pub fn sum(&self) -> f64 {
        Dimension::ALL.iter().map(|d| self.get(*d)).sum()
    }

    pub fn validate(&self) -> Result<()> {
        for dimension in Dimension::ALL {
            let weight = self.get(dimension);
            if !weight.is_finite() || weight < 0.0 {
                return Err(AuditError::InvalidPolicy(format!(
                    "weight for {} must be a non-negative number, got {}",
                    dimension, weight
                )));
            }
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(AuditError::InvalidPolicy(format!(
                "weights must sum to 1.0, got {}",
                sum
            )));
        }
        Ok(())
    }
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            transport: 0.30,
            cookies: 0.20,
            transparency: 0.25,
            trackers: 0.25,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskPolicy {
    pub weights: Weights,
    /// Risk added per first-party cookie
    pub first_party_cookie_risk: f64,
    /// Risk added per third-party cookie
    pub third_party_cookie_risk: f64,
    /// Risk added per distinct tracker destination
    pub tracker_risk: f64,
}

impl Default for RiskPolicy {
    fn default() -> Self {
        Self {
            weights: Weights::default(),
            first_party_cookie_risk: 0.05,
            third_party_cookie_risk: 0.1,
            tracker_risk: 0.2,
        }
    }
}

impl RiskPolicy {
    pub fn from_json(json: &str) -> Result<Self> {
        let policy: RiskPolicy = serde_json::from_str(json)?;
        policy.validate()?;
        Ok(policy)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.weights.validate()?;

        let increments = [
            ("first_party_cookie_risk", self.first_party_cookie_risk),
            ("third_party_cookie_risk", self.third_party_cookie_risk),
            ("tracker_risk", self.tracker_risk),
        ];
        for (name, value) in increments {
            if !(0.0..=1.0).contains(&value) {
                return Err(AuditError::InvalidPolicy(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}
