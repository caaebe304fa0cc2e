use serde::{Deserialize, Serialize};

use crate::measurements::{MeasurementError, Measurements};

/// Default tolerance band (±10%).
///
/// Chest and hips within 10% of each other count as near-equal, so 90/70/95
/// is an hourglass rather than a triangle.
pub const DEFAULT_TOLERANCE: f64 = 0.10;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShapeCategory {
    Triangle,
    InvertedTriangle,
    Hourglass,
    Oval,
    Rectangle,
}

impl ShapeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeCategory::Triangle => "TRIANGLE",
            ShapeCategory::InvertedTriangle => "INVERTED_TRIANGLE",
            ShapeCategory::Hourglass => "HOURGLASS",
            ShapeCategory::Oval => "OVAL",
            ShapeCategory::Rectangle => "RECTANGLE",
        }
    }
}

/// Ordered decision tree over chest/waist/hips ratios.
///
/// Rules are evaluated in this order and the first match wins (`t` is the
/// tolerance):
///
/// 1. `hips > chest·(1+t)` → Triangle
/// 2. `chest > hips·(1+t)` → InvertedTriangle
/// 3. `waist < chest·(1−t)` and `waist < hips·(1−t)` → Hourglass
/// 4. `waist > chest·(1+t)` and `waist > hips·(1+t)` → Oval
/// 5. `max ≤ min·(1+t)` → Rectangle
/// 6. otherwise → Rectangle
///
/// The order decides boundary cases; keep it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BodyShapeClassifier {
    tolerance: f64,
}

impl Default for BodyShapeClassifier {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl BodyShapeClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(tolerance: f64) -> Result<Self, MeasurementError> {
        if !(tolerance.is_finite() && (0.0..0.5).contains(&tolerance)) {
            return Err(MeasurementError::Tolerance(tolerance));
        }
        Ok(Self { tolerance })
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn classify(&self, m: &Measurements) -> Result<ShapeCategory, MeasurementError> {
        m.validate()?;
        let Measurements { chest, waist, hips } = *m;
        let up = 1.0 + self.tolerance;
        let down = 1.0 - self.tolerance;

        if hips > chest * up {
            return Ok(ShapeCategory::Triangle);
        }
        if chest > hips * up {
            return Ok(ShapeCategory::InvertedTriangle);
        }
        if waist < chest * down && waist < hips * down {
            return Ok(ShapeCategory::Hourglass);
        }
        if waist > chest * up && waist > hips * up {
            return Ok(ShapeCategory::Oval);
        }

        // Near-equal (max ≤ min·(1+t)) and any leftover spread both land here.
        Ok(ShapeCategory::Rectangle)
    }
}
