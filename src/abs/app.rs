//! SDL2 and OpenGL ES application management.
//!
//! This module defines the [`App`] struct which encapsulates the SDL2 window and the
//! OpenGL ES 2.0 context the demo host renders into.

use std::sync::Arc;

use thiserror::Error;

use crate::config::WindowConfig;

/// SDL reports its failures as strings; this keeps which step failed.
#[derive(Debug, Error)]
#[error("{step} failed: {message}")]
pub struct AppError {
    pub step: &'static str,
    pub message: String,
}

trait Step<T> {
    fn step(self, step: &'static str) -> Result<T, AppError>;
}

impl<T, E: ToString> Step<T> for Result<T, E> {
    fn step(self, step: &'static str) -> Result<T, AppError> {
        self.map_err(|e| AppError {
            step,
            message: e.to_string(),
        })
    }
}

/// The [`App`] struct encapsulates the SDL2 and OpenGL ES context.
pub struct App {
    pub sdl: sdl2::Sdl,
    pub video_subsystem: sdl2::VideoSubsystem,
    pub window: sdl2::video::Window,
    pub gl_context: sdl2::video::GLContext,
    pub gl: Arc<glow::Context>,
    pub event_pump: sdl2::EventPump,
}

impl App {
    /// Opens a resizable window with a current GLES 2.0 context.
    /// The width and height options are ignored if `fullscreen` is set to `true`.
    pub fn new(config: &WindowConfig) -> Result<Self, AppError> {
        let sdl = sdl2::init().step("SDL init")?;
        let video_subsystem = sdl.video().step("video subsystem")?;
        let gl_attr = video_subsystem.gl_attr();
        gl_attr.set_context_profile(sdl2::video::GLProfile::GLES);
        gl_attr.set_context_version(2, 0);
        gl_attr.set_red_size(8);
        gl_attr.set_green_size(8);
        gl_attr.set_blue_size(8);
        gl_attr.set_alpha_size(8);
        gl_attr.set_depth_size(24);
        gl_attr.set_stencil_size(8);

        let (width, height) = if config.fullscreen {
            let mode = video_subsystem
                .current_display_mode(0)
                .step("display mode query")?;
            (mode.w as u32, mode.h as u32)
        } else {
            (config.width, config.height)
        };
        let mut window = video_subsystem
            .window(&config.title, width, height)
            .opengl()
            .resizable()
            .build()
            .step("window creation")?;
        window
            .set_fullscreen(if config.fullscreen {
                sdl2::video::FullscreenType::Desktop
            } else {
                sdl2::video::FullscreenType::Off
            })
            .step("fullscreen switch")?;

        let gl_context = window.gl_create_context().step("GL context creation")?;
        window.gl_make_current(&gl_context).step("GL make current")?;
        let interval = if config.vsync {
            sdl2::video::SwapInterval::VSync
        } else {
            sdl2::video::SwapInterval::Immediate
        };
        if let Err(e) = video_subsystem.gl_set_swap_interval(interval) {
            log::warn!("could not set swap interval: {e}");
        }

        let gl = unsafe {
            glow::Context::from_loader_function(|s| {
                video_subsystem.gl_get_proc_address(s) as *const _
            })
        };
        let event_pump = sdl.event_pump().step("event pump")?;

        Ok(Self {
            sdl,
            video_subsystem,
            window,
            gl_context,
            gl: Arc::new(gl),
            event_pump,
        })
    }

    /// The drawable size in pixels, as `i32` the way resize events report it.
    pub fn drawable_size(&self) -> (i32, i32) {
        let (w, h) = self.window.drawable_size();
        (w as i32, h as i32)
    }
}
