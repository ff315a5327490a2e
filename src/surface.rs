//! The render surface the host windowing layer drives.
//!
//! A [`RenderSurface`] owns the lifecycle of one GL view: it forwards the host's init,
//! render, resize and terminate notifications to an injected [`GlCallbacks`]
//! implementation, and guarantees that rendering only happens between a successful init
//! and termination.
//!
//! ```text
//! Uninitialized --init ok--> ProgramBuilt --render--> Rendering --terminate--> Terminated
//!       |
//!       +--init failed--> Degraded --terminate--> Terminated
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, error, info, trace};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::abs::{BufferError, GlApi, ProgramError};
use crate::render::{SharedViewport, Viewport};

/// Value returned to the host from every render tick.
pub const RENDER_OK: i32 = 1;

/// Why a view could not set up its GPU resources.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InitError {
    #[error(transparent)]
    Program(#[from] ProgramError),
    #[error(transparent)]
    Buffer(#[from] BufferError),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("surface initialization failed: {0}")]
    Init(#[from] InitError),
    #[error("cannot {action} a surface that is {state}")]
    InvalidTransition {
        action: &'static str,
        state: SurfaceState,
    },
}

/// The application side of a render surface.
pub trait GlCallbacks<G: GlApi> {
    /// Creates every GPU resource the view needs. Called at most once per surface.
    fn init(&mut self, gl: &Arc<G>) -> Result<(), InitError>;

    /// Draws one frame into `viewport`; returns whether anything was drawn.
    fn render_frame(&mut self, gl: &G, viewport: Viewport) -> bool;

    /// Releases every GPU resource created by `init`.
    fn terminate(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceState {
    Uninitialized,
    ProgramBuilt,
    Rendering,
    /// Init failed; nothing is drawn until the surface is terminated.
    Degraded,
    Terminated,
}

impl SurfaceState {
    fn can_render(self) -> bool {
        matches!(self, SurfaceState::ProgramBuilt | SurfaceState::Rendering)
    }
}

impl fmt::Display for SurfaceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SurfaceState::Uninitialized => "uninitialized",
            SurfaceState::ProgramBuilt => "initialized",
            SurfaceState::Rendering => "rendering",
            SurfaceState::Degraded => "degraded",
            SurfaceState::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// When the host should call [`RenderSurface::on_render_frame`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderingMode {
    /// Every display tick.
    #[default]
    Continuous,
    /// Only after a render was requested, the view was resized or init succeeded.
    OnDemand,
}

/// The part of a surface that may be used from any thread.
#[derive(Debug, Clone)]
pub struct ResizeHandle {
    viewport: SharedViewport,
    pending: Arc<AtomicBool>,
}

impl ResizeHandle {
    pub fn resize(&self, width: i32, height: i32) {
        let viewport = Viewport::from_host(width, height);
        self.viewport.store(viewport);
        self.pending.store(true, Ordering::Release);
        debug!("viewport resized to {}x{}", viewport.width, viewport.height);
    }

    pub fn request_render(&self) {
        self.pending.store(true, Ordering::Release);
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport.load()
    }
}

pub struct RenderSurface<G: GlApi, C: GlCallbacks<G>> {
    gl: Arc<G>,
    callbacks: C,
    state: SurfaceState,
    mode: RenderingMode,
    handle: ResizeHandle,
}

impl<G: GlApi, C: GlCallbacks<G>> RenderSurface<G, C> {
    pub fn new(gl: &Arc<G>, callbacks: C, mode: RenderingMode) -> Self {
        Self {
            gl: Arc::clone(gl),
            callbacks,
            state: SurfaceState::Uninitialized,
            mode,
            handle: ResizeHandle {
                viewport: SharedViewport::default(),
                pending: Arc::new(AtomicBool::new(false)),
            },
        }
    }

    /// Runs the callbacks' init. Only valid once, on a fresh surface.
    pub fn on_init(&mut self) -> Result<(), SurfaceError> {
        if self.state != SurfaceState::Uninitialized {
            return Err(SurfaceError::InvalidTransition {
                action: "initialize",
                state: self.state,
            });
        }

        match self.callbacks.init(&self.gl) {
            Ok(()) => {
                self.state = SurfaceState::ProgramBuilt;
                self.handle.request_render();
                info!("render surface initialized");
                Ok(())
            }
            Err(e) => {
                self.state = SurfaceState::Degraded;
                error!("render surface initialization failed: {e}");
                Err(e.into())
            }
        }
    }

    /// Draws a frame if the surface is live. Always returns [`RENDER_OK`].
    pub fn on_render_frame(&mut self) -> i32 {
        if !self.state.can_render() {
            trace!("skipping frame: surface is {}", self.state);
            return RENDER_OK;
        }

        self.state = SurfaceState::Rendering;
        self.handle.pending.store(false, Ordering::Release);
        let viewport = self.handle.viewport.load();
        if !self.callbacks.render_frame(&self.gl, viewport) {
            trace!("frame produced no draw");
        }
        RENDER_OK
    }

    pub fn on_resize(&self, width: i32, height: i32) {
        self.handle.resize(width, height);
    }

    /// Releases the view's GPU resources. Later calls do nothing.
    pub fn on_terminate(&mut self) {
        if self.state == SurfaceState::Terminated {
            return;
        }
        self.callbacks.terminate();
        self.state = SurfaceState::Terminated;
        info!("render surface terminated");
    }

    pub fn request_render(&self) {
        self.handle.request_render();
    }

    /// Whether the host should render on this tick.
    pub fn needs_render(&self) -> bool {
        if !self.state.can_render() {
            return false;
        }
        match self.mode {
            RenderingMode::Continuous => true,
            RenderingMode::OnDemand => self.handle.pending.load(Ordering::Acquire),
        }
    }

    pub fn resize_handle(&self) -> ResizeHandle {
        self.handle.clone()
    }

    pub fn viewport(&self) -> Viewport {
        self.handle.viewport()
    }

    pub fn state(&self) -> SurfaceState {
        self.state
    }

    pub fn mode(&self) -> RenderingMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: RenderingMode) {
        self.mode = mode;
    }

    pub fn callbacks(&self) -> &C {
        &self.callbacks
    }

    pub fn callbacks_mut(&mut self) -> &mut C {
        &mut self.callbacks
    }

    pub fn gl(&self) -> &Arc<G> {
        &self.gl
    }
}

impl<G: GlApi, C: GlCallbacks<G>> Drop for RenderSurface<G, C> {
    fn drop(&mut self) {
        self.on_terminate();
    }
}
