//! This module contains the thin wrappers over OpenGL objects used by the view,
//! including application setup, shader management and vertex buffers.

pub mod app;
pub mod buffer;
#[cfg(test)]
pub mod fake;
pub mod gl;
pub mod shader;

pub use app::*;
pub use buffer::*;
pub use gl::*;
pub use shader::*;
