//! Geometric primitives for jess: 3D vectors and matrices, the region algebra,
//! a static kd-tree, and the RMSD-optimal superposition solver.

mod kdtree;
mod matrix3;
mod region;
mod superposition;
mod vec3;

pub use kdtree::{KdTree, RegionQuery};
pub use matrix3::Matrix3x3;
pub use region::{region_volume, Annulus, Join, JoinMode, Region};
pub use superposition::Superposition;
pub use vec3::Vec3;
