//! Viewport size shared between the resize and render callbacks.
//!
//! The host may deliver resize notifications on a different thread than render ticks.
//! [`SharedViewport`] packs both halves into one atomic word so a reader always sees a
//! width and height that came from the same resize.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// The pixel rectangle the renderer rasterizes into, anchored at the origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Builds a viewport from host-reported sizes, clamping negatives to zero.
    pub fn from_host(width: i32, height: i32) -> Self {
        Self::new(width.max(0) as u32, height.max(0) as u32)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// `(x, y, width, height)` as passed to `glViewport`.
    pub fn gl_rect(&self) -> (i32, i32, i32, i32) {
        (
            0,
            0,
            self.width.min(i32::MAX as u32) as i32,
            self.height.min(i32::MAX as u32) as i32,
        )
    }

    fn pack(self) -> u64 {
        (u64::from(self.width) << 32) | u64::from(self.height)
    }

    fn unpack(bits: u64) -> Self {
        Self::new((bits >> 32) as u32, bits as u32)
    }
}

/// A cloneable, thread-safe snapshot cell for the current [`Viewport`].
#[derive(Debug, Clone, Default)]
pub struct SharedViewport {
    bits: Arc<AtomicU64>,
}

impl SharedViewport {
    pub fn new(initial: Viewport) -> Self {
        Self {
            bits: Arc::new(AtomicU64::new(initial.pack())),
        }
    }

    pub fn store(&self, viewport: Viewport) {
        self.bits.store(viewport.pack(), Ordering::Release);
    }

    pub fn load(&self) -> Viewport {
        Viewport::unpack(self.bits.load(Ordering::Acquire))
    }
}
