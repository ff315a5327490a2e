//! The triangle view.
//!
//! [`GlView`] is the [`GlCallbacks`] implementation the demo host installs on its render
//! surface: one shader program, one static vertex buffer holding a single triangle, and a
//! [`FrameRenderer`] that draws it.

use std::sync::Arc;

use log::{error, info};
use thiserror::Error;

use crate::abs::{AttribLayout, GlApi, ProgramError, ShaderProgram, ShaderSource, VertexBuffer};
use crate::render::{AttribSetup, ClearColor, FrameRenderer, Viewport};
use crate::surface::{GlCallbacks, InitError};

/// A single triangle in normalized device coordinates, three floats per vertex.
pub const TRIANGLE: [f32; 9] = [0.0, 0.5, 0.0, -0.5, -0.5, 0.0, 0.5, -0.5, 0.0];

/// Location `vPosition` is bound to.
pub const POSITION_LOCATION: u32 = 0;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RebuildError {
    #[error("view has no live GL resources")]
    NotLive,
    #[error(transparent)]
    Program(#[from] ProgramError),
}

struct Resources<G: GlApi> {
    program: ShaderProgram<G>,
    vertices: VertexBuffer<G>,
}

pub struct GlView<G: GlApi> {
    source: ShaderSource,
    renderer: FrameRenderer,
    resources: Option<Resources<G>>,
}

impl<G: GlApi> Default for GlView<G> {
    fn default() -> Self {
        Self::new(
            ShaderSource::triangle(),
            FrameRenderer::new(ClearColor::default(), AttribSetup::Once),
        )
    }
}

impl<G: GlApi> GlView<G> {
    pub fn new(source: ShaderSource, renderer: FrameRenderer) -> Self {
        Self {
            source,
            renderer,
            resources: None,
        }
    }

    /// Whether a program and vertex buffer are currently alive.
    pub fn is_live(&self) -> bool {
        self.resources.is_some()
    }

    pub fn program(&self) -> Option<&ShaderProgram<G>> {
        self.resources.as_ref().map(|r| &r.program)
    }

    pub fn renderer(&self) -> &FrameRenderer {
        &self.renderer
    }

    /// Swaps in a program built from `source`.
    ///
    /// The current program keeps drawing if the new one fails to build. A view that was
    /// never initialized or is already terminated makes no GL calls.
    pub fn rebuild(&mut self, gl: &Arc<G>, source: ShaderSource) -> Result<(), RebuildError> {
        let Some(resources) = self.resources.as_mut() else {
            return Err(RebuildError::NotLive);
        };
        resources.program = ShaderProgram::from_source(gl, &source)?;
        self.source = source;
        info!("shader program rebuilt");
        Ok(())
    }
}

impl<G: GlApi> GlCallbacks<G> for GlView<G> {
    fn init(&mut self, gl: &Arc<G>) -> Result<(), InitError> {
        let program = ShaderProgram::from_source(gl, &self.source).inspect_err(|e| {
            error!("could not build shader program: {e}");
        })?;
        let layout = AttribLayout::packed(POSITION_LOCATION, 3);
        let vertices = VertexBuffer::new(gl, &TRIANGLE, layout)?;
        if self.renderer.attrib_setup() == AttribSetup::Once {
            vertices.configure_attribute();
        }

        self.resources = Some(Resources { program, vertices });
        info!("triangle view ready");
        Ok(())
    }

    fn render_frame(&mut self, gl: &G, viewport: Viewport) -> bool {
        match &self.resources {
            Some(r) => self.renderer.render_frame(gl, &r.program, viewport, &r.vertices),
            None => false,
        }
    }

    fn terminate(&mut self) {
        if self.resources.take().is_some() {
            info!("triangle view released after {} frames", self.renderer.frames());
        }
    }
}
