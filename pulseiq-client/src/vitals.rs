//! Simulated vital signs: bounds, random walk and severity bands

use std::ops::RangeInclusive;

use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VitalField {
    Glucose,
    Systolic,
    Diastolic,
    HeartRate,
    Cholesterol,
    Spo2,
    Bmi,
}

/// Clamp range, walk step and severity bands of one vital
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VitalSpec {
    pub min: i32,
    pub max: i32,
    pub step: i32,
    pub warning: RangeInclusive<i32>,
    pub danger: RangeInclusive<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Normal,
    Warning,
    Danger,
}

impl VitalField {
    pub const ALL: [VitalField; 7] = [
        VitalField::Glucose,
        VitalField::Systolic,
        VitalField::Diastolic,
        VitalField::HeartRate,
        VitalField::Cholesterol,
        VitalField::Spo2,
        VitalField::Bmi,
    ];

    pub fn spec(self) -> VitalSpec {
        let (min, max, step, warning, danger) = match self {
            VitalField::Glucose => (80, 250, 8, 140..=180, 181..=999),
            VitalField::Systolic => (100, 180, 5, 120..=139, 140..=300),
            VitalField::Diastolic => (60, 120, 3, 80..=89, 90..=200),
            VitalField::HeartRate => (50, 160, 7, 100..=120, 121..=300),
            VitalField::Cholesterol => (150, 330, 7, 200..=239, 240..=600),
            VitalField::Spo2 => (85, 100, 1, 94..=96, 0..=93),
            VitalField::Bmi => (18, 35, 1, 25..=29, 30..=60),
        };
        VitalSpec { min, max, step, warning, danger }
    }

    pub fn label(self) -> &'static str {
        match self {
            VitalField::Glucose => "Glucose",
            VitalField::Systolic => "Systolic BP",
            VitalField::Diastolic => "Diastolic BP",
            VitalField::HeartRate => "Heart Rate",
            VitalField::Cholesterol => "Cholesterol",
            VitalField::Spo2 => "SpO2",
            VitalField::Bmi => "BMI",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            VitalField::Glucose | VitalField::Cholesterol => "mg/dL",
            VitalField::Systolic | VitalField::Diastolic => "mmHg",
            VitalField::HeartRate => "BPM",
            VitalField::Spo2 => "%",
            VitalField::Bmi => "kg/m2",
        }
    }

    /// Danger is checked before warning
    pub fn classify(self, value: i32) -> Severity {
        let spec = self.spec();
        if spec.danger.contains(&value) {
            Severity::Danger
        } else if spec.warning.contains(&value) {
            Severity::Warning
        } else {
            Severity::Normal
        }
    }
}

/// One reading of every vital; the wire shape the collector expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VitalsSnapshot {
    pub glucose: i32,
    pub systolic: i32,
    pub diastolic: i32,
    pub heart_rate: i32,
    pub cholesterol: i32,
    pub spo2: i32,
    pub bmi: i32,
}

impl Default for VitalsSnapshot {
    fn default() -> Self {
        Self {
            glucose: 100,
            systolic: 145,
            diastolic: 92,
            heart_rate: 110,
            cholesterol: 240,
            spo2: 92,
            bmi: 27,
        }
    }
}

impl VitalsSnapshot {
    pub fn get(&self, field: VitalField) -> i32 {
        match field {
            VitalField::Glucose => self.glucose,
            VitalField::Systolic => self.systolic,
            VitalField::Diastolic => self.diastolic,
            VitalField::HeartRate => self.heart_rate,
            VitalField::Cholesterol => self.cholesterol,
            VitalField::Spo2 => self.spo2,
            VitalField::Bmi => self.bmi,
        }
    }

    fn slot(&mut self, field: VitalField) -> &mut i32 {
        match field {
            VitalField::Glucose => &mut self.glucose,
            VitalField::Systolic => &mut self.systolic,
            VitalField::Diastolic => &mut self.diastolic,
            VitalField::HeartRate => &mut self.heart_rate,
            VitalField::Cholesterol => &mut self.cholesterol,
            VitalField::Spo2 => &mut self.spo2,
            VitalField::Bmi => &mut self.bmi,
        }
    }

    /// Copy with `field` set, clamped into its range
    pub fn with(mut self, field: VitalField, value: i32) -> Self {
        let spec = field.spec();
        *self.slot(field) = value.clamp(spec.min, spec.max);
        self
    }

    /// Next step of the bounded random walk
    ///
    /// Each field moves by an integer drawn uniformly from `[-step, step)`
    /// and is clamped into `[min, max]`. Depends on `self` only.
    pub fn perturbed<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        let mut next = *self;
        for field in VitalField::ALL {
            let spec = field.spec();
            let change = rng.gen_range(-spec.step..spec.step);
            let slot = next.slot(field);
            *slot = slot.saturating_add(change).clamp(spec.min, spec.max);
        }
        next
    }

    pub fn within_bounds(&self) -> bool {
        VitalField::ALL.iter().all(|field| {
            let spec = field.spec();
            (spec.min..=spec.max).contains(&self.get(*field))
        })
    }

    pub fn severities(&self) -> Vec<(VitalField, i32, Severity)> {
        VitalField::ALL
            .iter()
            .map(|field| (*field, self.get(*field), field.classify(self.get(*field))))
            .collect()
    }

    /// Highest severity across all fields
    pub fn overall(&self) -> Severity {
        VitalField::ALL
            .iter()
            .map(|field| field.classify(self.get(*field)))
            .max()
            .unwrap_or(Severity::Normal)
    }
}
