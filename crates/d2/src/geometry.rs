//! 2D geometry types.

use geo::{Area, Coord, LineString, Point, Polygon as GeoPolygon, Rotate, Translate};
use u_arrange_core::{Error, Result, Shape};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Rigid placement of a polygon: rotation about the origin, then translation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Transform2D {
    /// X translation.
    pub tx: f64,
    /// Y translation.
    pub ty: f64,
    /// Rotation angle in radians.
    pub angle: f64,
}

impl Transform2D {
    /// Creates a transform from a translation and a rotation (radians).
    pub fn new(tx: f64, ty: f64, angle: f64) -> Self {
        Self { tx, ty, angle }
    }

    /// Creates a pure translation.
    pub fn translation(tx: f64, ty: f64) -> Self {
        Self::new(tx, ty, 0.0)
    }

    /// Applies the transform to a point.
    pub fn apply(&self, (x, y): (f64, f64)) -> (f64, f64) {
        let (sin_r, cos_r) = self.angle.sin_cos();
        (
            x * cos_r - y * sin_r + self.tx,
            x * sin_r + y * cos_r + self.ty,
        )
    }
}

/// A polygon shape with optional holes.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Polygon2D {
    /// Outer boundary of the polygon.
    exterior: Vec<(f64, f64)>,

    /// Interior holes (if any).
    holes: Vec<Vec<(f64, f64)>>,

    /// Cached area.
    #[cfg_attr(feature = "serde", serde(skip))]
    cached_area: Option<f64>,
}

impl PartialEq for Polygon2D {
    fn eq(&self, other: &Self) -> bool {
        self.exterior == other.exterior && self.holes == other.holes
    }
}

impl Default for Polygon2D {
    fn default() -> Self {
        Self::new()
    }
}

impl Polygon2D {
    /// Creates an empty polygon.
    pub fn new() -> Self {
        Self {
            exterior: Vec::new(),
            holes: Vec::new(),
            cached_area: None,
        }
    }

    /// Sets the polygon from a list of (x, y) vertices.
    pub fn with_polygon(mut self, vertices: Vec<(f64, f64)>) -> Self {
        self.exterior = vertices;
        self.refresh_cache();
        self
    }

    /// Adds an interior hole.
    pub fn with_hole(mut self, vertices: Vec<(f64, f64)>) -> Self {
        self.holes.push(vertices);
        self.refresh_cache();
        self
    }

    /// Creates a rectangle with its lower-left corner at the origin.
    pub fn rectangle(width: f64, height: f64) -> Self {
        Self::new().with_polygon(vec![
            (0.0, 0.0),
            (width, 0.0),
            (width, height),
            (0.0, height),
        ])
    }

    /// Creates a circle approximation with n vertices.
    pub fn circle(radius: f64, n: usize) -> Self {
        let n = n.max(8);
        let step = std::f64::consts::TAU / n as f64;
        let vertices: Vec<(f64, f64)> = (0..n)
            .map(|i| {
                let angle = i as f64 * step;
                (radius * angle.cos() + radius, radius * angle.sin() + radius)
            })
            .collect();
        Self::new().with_polygon(vertices)
    }

    /// Creates an L-shaped polygon.
    pub fn l_shape(width: f64, height: f64, notch_width: f64, notch_height: f64) -> Self {
        Self::new().with_polygon(vec![
            (0.0, 0.0),
            (width, 0.0),
            (width, notch_height),
            (notch_width, notch_height),
            (notch_width, height),
            (0.0, height),
        ])
    }

    /// Returns the exterior vertices.
    pub fn exterior(&self) -> &[(f64, f64)] {
        &self.exterior
    }

    /// Returns the interior holes.
    pub fn holes(&self) -> &[Vec<(f64, f64)>] {
        &self.holes
    }

    /// Converts to a geo crate Polygon.
    pub fn to_geo_polygon(&self) -> GeoPolygon<f64> {
        let holes: Vec<LineString<f64>> = self.holes.iter().map(|hole| to_ring(hole)).collect();
        GeoPolygon::new(to_ring(&self.exterior), holes)
    }

    /// Builds a polygon from a geo crate Polygon.
    pub fn from_geo_polygon(polygon: &GeoPolygon<f64>) -> Self {
        let mut result = Self::new().with_polygon(from_ring(polygon.exterior()));
        for hole in polygon.interiors() {
            result = result.with_hole(from_ring(hole));
        }
        result
    }

    /// Checks that the polygon is usable as an item outline.
    pub fn validate(&self) -> Result<()> {
        self.check_finite()?;

        if self.exterior.len() < 3 {
            return Err(Error::InvalidItem(
                "Polygon must have at least 3 vertices".into(),
            ));
        }
        if self.area() <= 0.0 {
            return Err(Error::InvalidItem("Polygon has zero area".into()));
        }

        Ok(())
    }

    /// Rejects NaN and infinite coordinates.
    pub fn check_finite(&self) -> Result<()> {
        let finite = self
            .exterior
            .iter()
            .chain(self.holes.iter().flatten())
            .all(|&(x, y)| x.is_finite() && y.is_finite());

        if finite {
            Ok(())
        } else {
            Err(Error::InvalidItem(
                "Polygon coordinates must be finite".into(),
            ))
        }
    }

    /// Returns the axis-aligned bounding box as ([min_x, min_y], [max_x, max_y]).
    pub fn aabb(&self) -> ([f64; 2], [f64; 2]) {
        self.aabb_at_rotation(0.0)
    }

    /// Computes the AABB of the polygon at a given rotation angle (in radians).
    pub fn aabb_at_rotation(&self, rotation: f64) -> ([f64; 2], [f64; 2]) {
        if self.exterior.is_empty() {
            return ([0.0, 0.0], [0.0, 0.0]);
        }

        let (sin_r, cos_r) = rotation.sin_cos();

        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;

        for &(x, y) in &self.exterior {
            let rx = x * cos_r - y * sin_r;
            let ry = x * sin_r + y * cos_r;
            min_x = min_x.min(rx);
            min_y = min_y.min(ry);
            max_x = max_x.max(rx);
            max_y = max_y.max(ry);
        }

        ([min_x, min_y], [max_x, max_y])
    }

    /// Returns the width and height of the AABB at a given rotation.
    pub fn dimensions_at_rotation(&self, rotation: f64) -> (f64, f64) {
        let (min, max) = self.aabb_at_rotation(rotation);
        (max[0] - min[0], max[1] - min[1])
    }

    fn refresh_cache(&mut self) {
        self.cached_area = Some(self.calculate_area());
    }

    fn calculate_area(&self) -> f64 {
        if self.exterior.len() < 3 {
            return 0.0;
        }
        self.to_geo_polygon().unsigned_area()
    }
}

impl Shape for Polygon2D {
    type Transform = Transform2D;

    fn area(&self) -> f64 {
        self.cached_area.unwrap_or_else(|| self.calculate_area())
    }

    fn transformed(&self, transform: &Transform2D) -> Self {
        if self.exterior.is_empty() {
            return self.clone();
        }

        let placed = self
            .to_geo_polygon()
            .rotate_around_point(transform.angle.to_degrees(), Point::new(0.0, 0.0))
            .translate(transform.tx, transform.ty);
        Self::from_geo_polygon(&placed)
    }
}

fn to_ring(vertices: &[(f64, f64)]) -> LineString<f64> {
    LineString::from(
        vertices
            .iter()
            .map(|&(x, y)| Coord { x, y })
            .collect::<Vec<_>>(),
    )
}

fn from_ring(ring: &LineString<f64>) -> Vec<(f64, f64)> {
    let mut vertices: Vec<(f64, f64)> = ring.coords().map(|c| (c.x, c.y)).collect();
    if vertices.len() > 1 && vertices.first() == vertices.last() {
        vertices.pop();
    }
    vertices
}
