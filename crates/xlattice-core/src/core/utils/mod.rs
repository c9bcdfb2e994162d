pub mod geometry;
pub mod tolerance;
