//! Per-frame drawing.
//!
//! [`FrameRenderer`] clears the colour buffer and draws the view's vertex buffer with its
//! program. The clear colour is either constant or a frame-driven fade ([`FadeCycle`]).

use glam::Vec4;
use log::{trace, warn};
use serde::{Deserialize, Serialize};

use crate::abs::{GlApi, ShaderProgram, VertexBuffer};
use crate::render::Viewport;

/// Upper bound on error codes drained per frame; a lost context can report forever.
const MAX_DRAINED_ERRORS: usize = 16;

/// When the vertex attribute pointer is supplied to the driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttribSetup {
    /// Recorded once at init; the context keeps it between draws.
    #[default]
    Once,
    /// Restated before every draw.
    EveryFrame,
}

/// Brightness cycle that steps from 1.0 down to 0.0 by 0.01 per frame, then restarts.
///
/// Driven only by the number of frames rendered, never by elapsed time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FadeCycle {
    frame: u32,
}

impl FadeCycle {
    /// Frames from full brightness to black.
    pub const STEPS: u32 = 100;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn brightness(&self) -> f32 {
        (Self::STEPS - self.frame) as f32 / Self::STEPS as f32
    }

    /// Moves one frame forward, wrapping to full brightness where the next value would go
    /// negative.
    pub fn advance(&mut self) {
        self.frame = if self.frame >= Self::STEPS {
            0
        } else {
            self.frame + 1
        };
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClearColor {
    Constant(Vec4),
    Fade(FadeCycle),
}

impl Default for ClearColor {
    fn default() -> Self {
        ClearColor::Constant(Vec4::ONE)
    }
}

impl ClearColor {
    /// Returns the colour for this frame and steps the fade, if any.
    pub fn next_frame(&mut self) -> Vec4 {
        match self {
            ClearColor::Constant(rgba) => *rgba,
            ClearColor::Fade(cycle) => {
                let b = cycle.brightness();
                cycle.advance();
                Vec4::new(b, b, b, 1.0)
            }
        }
    }
}

/// Issues the clear and draw calls for one frame.
#[derive(Debug, Clone)]
pub struct FrameRenderer {
    clear: ClearColor,
    attrib_setup: AttribSetup,
    check_errors: bool,
    frames: u64,
}

impl FrameRenderer {
    pub fn new(clear: ClearColor, attrib_setup: AttribSetup) -> Self {
        Self {
            clear,
            attrib_setup,
            check_errors: cfg!(debug_assertions),
            frames: 0,
        }
    }

    /// Drains `glGetError` after each draw and logs what it finds.
    pub fn with_error_checks(mut self, enabled: bool) -> Self {
        self.check_errors = enabled;
        self
    }

    pub fn attrib_setup(&self) -> AttribSetup {
        self.attrib_setup
    }

    /// Frames drawn so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Draws one frame and returns whether the draw call was issued.
    pub fn render_frame<G: GlApi>(
        &mut self,
        gl: &G,
        program: &ShaderProgram<G>,
        viewport: Viewport,
        vertices: &VertexBuffer<G>,
    ) -> bool {
        let rgba = self.clear.next_frame();
        gl.clear_color(rgba.x, rgba.y, rgba.z, rgba.w);

        let (x, y, w, h) = viewport.gl_rect();
        gl.viewport(x, y, w, h);
        gl.clear_color_buffer();

        program.use_program();
        match self.attrib_setup {
            AttribSetup::Once => vertices.bind(),
            AttribSetup::EveryFrame => vertices.configure_attribute(),
        }
        gl.draw_triangles(0, vertices.vertex_count());

        self.frames += 1;
        trace!("frame {} drawn at {}x{}", self.frames, viewport.width, viewport.height);

        if self.check_errors {
            drain_errors(gl, self.frames);
        }
        true
    }
}

fn drain_errors<G: GlApi>(gl: &G, frame: u64) {
    for _ in 0..MAX_DRAINED_ERRORS {
        match gl.error() {
            0 => return,
            code => warn!("GL error 0x{code:04X} after frame {frame}"),
        }
    }
}
