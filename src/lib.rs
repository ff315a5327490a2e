//! An OpenGL ES 2.0 render surface.
//!
//! The host windowing layer drives a [`surface::RenderSurface`] through init, render,
//! resize and terminate notifications. The surface forwards them to a
//! [`surface::GlCallbacks`] implementation; [`view::GlView`] is the one shipped here, which
//! builds a shader program and draws a single triangle every frame.
//!
//! All GL access goes through [`abs::GlApi`], implemented for [`glow::Context`].

pub mod abs;
pub mod config;
pub mod logging;
pub mod render;
pub mod surface;
pub mod view;
