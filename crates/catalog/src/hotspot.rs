//! Image hotspots: where a dimension's marker sits on the product image.

use serde::{Deserialize, Serialize};

use configurator_core::{PropertyId, ValueObject};

/// Normalized position on the canonical product image, both axes in `[0, 1]`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl ValueObject for Coordinate {}

impl Coordinate {
    pub const CENTER: Coordinate = Coordinate { x: 0.5, y: 0.5 };

    /// Clamp into the unit square. Non-finite input falls back to the center.
    pub fn normalized(x: f64, y: f64) -> Self {
        if !(x.is_finite() && y.is_finite()) {
            return Self::CENTER;
        }
        Self {
            x: x.clamp(0.0, 1.0),
            y: y.clamp(0.0, 1.0),
        }
    }
}

impl Default for Coordinate {
    fn default() -> Self {
        Self::CENTER
    }
}

/// A marker bound to one property of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    pub property_id: PropertyId,
    #[serde(default = "center_axis")]
    pub relative_x: f64,
    #[serde(default = "center_axis")]
    pub relative_y: f64,
}

fn center_axis() -> f64 {
    0.5
}

impl Hotspot {
    pub fn new(property_id: PropertyId, relative_x: f64, relative_y: f64) -> Self {
        Self {
            property_id,
            relative_x,
            relative_y,
        }
    }

    /// Hotspot placed at the image center.
    pub fn centered(property_id: PropertyId) -> Self {
        Self::new(property_id, Coordinate::CENTER.x, Coordinate::CENTER.y)
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::normalized(self.relative_x, self.relative_y)
    }
}
