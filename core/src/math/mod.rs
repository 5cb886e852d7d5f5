pub mod dice;
pub mod geometry;

pub use dice::{threshold, ScriptedDice, SeededDice};
pub use geometry::{build_swath_polygon, project_point, Polygon};
