//! Build plate descriptor.

use u_arrange_core::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tolerance used when testing containment against the plate edges.
const EDGE_EPS: f64 = 1e-9;

/// A rectangular build plate.
///
/// Every plate of a run shares the same descriptor; plate `k` is simply the
/// `k`-th copy of it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bed2D {
    /// Lower-left corner.
    origin: (f64, f64),

    /// Width along X.
    width: f64,

    /// Height along Y.
    height: f64,
}

impl Bed2D {
    /// Creates a rectangular plate with its lower-left corner at the origin.
    pub fn rectangle(width: f64, height: f64) -> Self {
        Self {
            origin: (0.0, 0.0),
            width,
            height,
        }
    }

    /// Moves the lower-left corner.
    pub fn with_origin(mut self, x: f64, y: f64) -> Self {
        self.origin = (x, y);
        self
    }

    /// Returns the lower-left corner.
    pub fn origin(&self) -> (f64, f64) {
        self.origin
    }

    /// Returns the width.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Returns the height.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Returns the plate area.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Returns the plate extent as ([min_x, min_y], [max_x, max_y]).
    pub fn aabb(&self) -> ([f64; 2], [f64; 2]) {
        let (x, y) = self.origin;
        ([x, y], [x + self.width, y + self.height])
    }

    /// Returns true if the box `[min_x, min_y, max_x, max_y]` lies on the plate.
    pub fn contains_box(&self, aabb: [f64; 4]) -> bool {
        let (min, max) = self.aabb();
        aabb[0] >= min[0] - EDGE_EPS
            && aabb[1] >= min[1] - EDGE_EPS
            && aabb[2] <= max[0] + EDGE_EPS
            && aabb[3] <= max[1] + EDGE_EPS
    }

    /// Checks that the plate has a positive, finite extent.
    pub fn validate(&self) -> Result<()> {
        let (x, y) = self.origin;
        if !(x.is_finite() && y.is_finite() && self.width.is_finite() && self.height.is_finite()) {
            return Err(Error::InvalidBoundary(
                "Plate coordinates must be finite".into(),
            ));
        }

        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(Error::InvalidBoundary(
                "Width and height must be positive".into(),
            ));
        }

        Ok(())
    }
}
