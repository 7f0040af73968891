//! Value-with-unit conveniences
//!
//! A thin layer over the resolver: carry a numeric value together with its
//! unit handle, convert between commensurable units, and interpret time
//! quantities as [`Duration`]s.

use crate::error::{Error, Result};
use crate::system::{Unit, UnitSystem};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub value: f64,
    pub unit: Unit,
}

impl Measurement {
    pub fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    /// The same quantity expressed in `unit`.
    pub fn convert_to(&self, unit: &Unit) -> Result<Measurement> {
        let conversion = self.unit.conversion_to(Some(unit))?;
        Ok(Measurement {
            value: conversion.apply(self.value),
            unit: unit.clone(),
        })
    }

    /// Interpret this quantity as a [`Duration`] under `system`.
    pub fn to_duration(&self, system: &UnitSystem) -> Result<Duration> {
        system.duration(self.value, &self.unit)
    }
}

impl UnitSystem {
    /// Interpret `value` of `unit` as a [`Duration`].
    pub fn duration(&self, value: f64, unit: &Unit) -> Result<Duration> {
        let seconds = self
            .resolver()
            .dictionary()
            .get("s")
            .cloned()
            .ok_or_else(|| Error::NotATimeUnit(unit.text().to_string()))?;
        let conversion = unit
            .info()
            .conversion_to(&seconds)
            .map_err(|_| Error::NotATimeUnit(unit.text().to_string()))?;
        let seconds_value = conversion.apply(value);
        if !seconds_value.is_finite() || seconds_value < 0.0 {
            return Err(Error::NegativeDuration);
        }
        Ok(Duration::from_secs_f64(seconds_value))
    }
}
