use std::fmt;

/// Imperial BMI factor (lbs / in²).
const IMPERIAL_FACTOR: f64 = 703.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BmiCategory {
    Underweight,
    NormalWeight,
    Overweight,
    Obese,
}

impl BmiCategory {
    /// Closed-open bands: `[18.5, 25)` is normal, `[25, 30)` overweight.
    pub fn classify(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::NormalWeight
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::NormalWeight => "Normal weight",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        }
    }
}

impl fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bmi {
    /// Rounded to one decimal.
    pub value: f64,
    pub category: BmiCategory,
}

/// BMI from weight in pounds and height in inches.
///
/// Returns `None` when either input is missing, non-positive or not finite,
/// which callers treat as "clear the derived fields". The category is taken
/// from the unrounded value so the band never shifts because of display
/// rounding.
pub fn calculate_bmi(weight_lbs: Option<f64>, height_in: Option<f64>) -> Option<Bmi> {
    let weight = weight_lbs.filter(|w| w.is_finite() && *w > 0.0)?;
    let height = height_in.filter(|h| h.is_finite() && *h > 0.0)?;
    let raw = weight / (height * height) * IMPERIAL_FACTOR;
    if !raw.is_finite() {
        return None;
    }
    Some(Bmi {
        value: round1(raw),
        category: BmiCategory::classify(raw),
    })
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
