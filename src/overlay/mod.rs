//! Chart overlay description and diffing.
//!
//! Layout turns an evaluation into desired objects; state diffing turns
//! consecutive layouts into the minimal draw commands a renderer needs.

pub mod dashboard;
pub mod diff;
pub mod layout;
pub mod objects;

// Re-exports for convenience
pub use dashboard::{price_lines, range_lines};
pub use diff::OverlayState;
pub use layout::build_layout;
pub use objects::{
    DrawCommand, LinePattern, LineStyleSpec, ObjectGroup, ObjectKey, ObjectPart, OverlayObject,
    ScreenCorner, TextStyle,
};
