use serde::{Deserialize, Serialize};

/// Smallest swath width the polygon builder accepts.
pub const MIN_SWATH_WIDTH: f64 = 0.1;

/// Tolerance used when deciding whether a point sits on a polygon edge.
const EDGE_EPS: f64 = 1e-9;

/// Normalizes an angle in degrees into `[0, 360)`.
pub fn angle360(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Projects a point `range` meters from the origin along `bearing`
/// (degrees clockwise from north).
pub fn project_point(bearing: f64, range: f64, origin_x: f64, origin_y: f64) -> (f64, f64) {
    let radians = angle360(bearing).to_radians();
    (
        origin_x + range * radians.sin(),
        origin_y + range * radians.cos(),
    )
}

/// Half-angle (degrees) and corner range of the swath footprint.
///
/// `tan(phi) = length / width` and `hypot = width / cos(phi)`.
pub fn swath_geometry(swath_width: f64, swath_length: f64) -> (f64, f64) {
    let width = swath_width.max(MIN_SWATH_WIDTH);
    let phi = (swath_length / width).atan();
    let hypot = width / phi.cos();
    (phi.to_degrees(), hypot)
}

/// Closed polygon in field coordinates. Vertices are stored without the
/// repeated closing vertex.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    vertices: Vec<(f64, f64)>,
}

impl Polygon {
    pub fn new(vertices: Vec<(f64, f64)>) -> Self {
        Self { vertices }
    }

    pub fn vertices(&self) -> &[(f64, f64)] {
        &self.vertices
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.len() < 3
    }

    /// Edge-inclusive point containment using ray casting.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        if self.is_empty() {
            return false;
        }

        let n = self.vertices.len();
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let (xi, yi) = self.vertices[i];
            let (xj, yj) = self.vertices[j];

            if on_segment((xj, yj), (xi, yi), (x, y)) {
                return true;
            }

            if ((yi > y) != (yj > y)) && (x < (xj - xi) * (y - yi) / (yj - yi) + xi) {
                inside = !inside;
            }
            j = i;
        }

        inside
    }
}

fn on_segment(a: (f64, f64), b: (f64, f64), p: (f64, f64)) -> bool {
    let cross = (b.0 - a.0) * (p.1 - a.1) - (b.1 - a.1) * (p.0 - a.0);
    let scale = (b.0 - a.0).abs().max((b.1 - a.1).abs()).max(1.0);
    if cross.abs() > EDGE_EPS * scale {
        return false;
    }
    p.0 >= a.0.min(b.0) - EDGE_EPS
        && p.0 <= a.0.max(b.0) + EDGE_EPS
        && p.1 >= a.1.min(b.1) - EDGE_EPS
        && p.1 <= a.1.max(b.1) + EDGE_EPS
}

/// Builds the sensor footprint for a vehicle at `(x, y)` on `heading`.
//
//        |----  swath_width  ----|
//        +-----------------------+  ---
//        |  \               /    |   | swath_length
//        |-------- o ------------|   |
//        |  /               \    |   |
//        +-----------------------+  ---
//
// Corners sit at bearings heading + 90 -/+ phi and their opposites,
// each `hypot` meters from the vehicle.
pub fn build_swath_polygon(
    x: f64,
    y: f64,
    heading: f64,
    swath_width: f64,
    swath_length: f64,
) -> Polygon {
    let (phi, hypot) = swath_geometry(swath_width, swath_length);

    let bearings = [
        angle360(heading + (90.0 - phi)),
        angle360(heading + (90.0 + phi)),
        angle360(heading + (90.0 - phi) + 180.0),
        angle360(heading + (90.0 + phi) + 180.0),
    ];

    Polygon::new(
        bearings
            .iter()
            .map(|&bearing| project_point(bearing, hypot, x, y))
            .collect(),
    )
}
