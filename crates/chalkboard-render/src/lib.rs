//! Chalkboard Render Library
//!
//! Renderer abstraction for Chalkboard boards. The bundled implementation
//! records an immediate-mode display list that hosts replay on their own
//! 2D backend.

mod display_list;
mod renderer;

pub use display_list::{DisplayList, DisplayListRenderer, DrawCommand, Layer};
pub use renderer::{RenderContext, RenderResult, Renderer, RendererError};
