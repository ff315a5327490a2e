//! Vertex buffer management.
//!
//! This module defines the [`VertexBuffer`] struct, a static array buffer of tightly packed
//! float vertices, and [`AttribLayout`], the attribute pointer that reads it.

use std::sync::Arc;

use thiserror::Error;

use crate::abs::GlApi;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("could not create vertex buffer: {0}")]
pub struct BufferError(pub String);

/// Where and how a float attribute is read from the bound buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttribLayout {
    pub location: u32,
    pub components: i32,
    pub stride: i32,
    pub offset: i32,
}

impl AttribLayout {
    /// `components` floats per vertex, tightly packed from the start of the buffer.
    pub const fn packed(location: u32, components: i32) -> Self {
        Self {
            location,
            components,
            stride: 0,
            offset: 0,
        }
    }
}

/// Represents vertex data stored on the GPU side.
pub struct VertexBuffer<G: GlApi> {
    gl: Arc<G>,
    vbo: G::Buffer,
    layout: AttribLayout,
    vertex_count: i32,
}

impl<G: GlApi> VertexBuffer<G> {
    /// Uploads `vertices` once; the buffer is left unbound.
    pub fn new(gl: &Arc<G>, vertices: &[f32], layout: AttribLayout) -> Result<Self, BufferError> {
        let vbo = gl.create_buffer().map_err(BufferError)?;
        gl.bind_array_buffer(Some(vbo));
        gl.array_buffer_data(vertices);
        gl.bind_array_buffer(None);

        Ok(Self {
            gl: Arc::clone(gl),
            vbo,
            layout,
            vertex_count: vertices.len() as i32 / layout.components.max(1),
        })
    }

    pub fn bind(&self) {
        self.gl.bind_array_buffer(Some(self.vbo));
    }

    /// Records the attribute pointer for this buffer and enables the array.
    ///
    /// The pointer captures the buffer bound at the time of the call, so this binds first.
    pub fn configure_attribute(&self) {
        self.bind();
        self.gl.vertex_attrib_pointer(
            self.layout.location,
            self.layout.components,
            self.layout.stride,
            self.layout.offset,
        );
        self.gl.enable_vertex_attrib_array(self.layout.location);
    }

    pub fn vertex_count(&self) -> i32 {
        self.vertex_count
    }

    pub fn layout(&self) -> AttribLayout {
        self.layout
    }
}

impl<G: GlApi> Drop for VertexBuffer<G> {
    fn drop(&mut self) {
        self.gl.delete_buffer(self.vbo);
    }
}
