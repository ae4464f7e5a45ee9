//! Rendering support
//!
//! Turns a composed scene plus a frame pose into lit, GPU-ready triangle
//! lists. Drawing them is left to the host runtime.

pub mod mesh;
pub mod vertex;

pub use mesh::{FrameMesh, build_frame_mesh, segments_for, tessellate};
pub use vertex::Vertex;
