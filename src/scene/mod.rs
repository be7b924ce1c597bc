pub mod mesh;
pub mod primitives;
mod quad;

pub use mesh::{Mesh, Vertex};
pub use quad::{Quad, QuadEdge, QuadSide, QuadTopology};
