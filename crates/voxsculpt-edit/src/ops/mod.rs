//! Edit algorithms independent of any backend.

pub mod access;
pub mod blend;
pub mod blur;
pub mod chunked;
pub mod grow;
pub mod paste;
pub mod shapes;

pub use access::{BlockAccess, BlockAccessMut};
pub use blend::{paint_texture, sdf_blend, sdf_blend_with_strength};
pub use blur::box_blur;
pub use chunked::DoShapeChunked;
pub use grow::grow_sphere;
pub use paste::{copy_to_buffer, paste_from_buffer, PasteFilter, PasteMask};
pub use shapes::{sphere_box, BoxFill, RoundConeShape, SdfBufferShape, Shape, SphereShape};
