use std::path::PathBuf;
use std::process::ExitCode;

use log::{error, info};
use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::Keycode;

use glview::abs::{App, ShaderSource};
use glview::config::Config;
use glview::surface::RenderSurface;
use glview::view::GlView;

/// How long to wait for input when an on-demand surface has nothing to draw.
const IDLE_WAIT_MS: u32 = 100;

fn main() -> ExitCode {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = match Config::load(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("glview: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = glview::logging::init(&config.log_level) {
        eprintln!("glview: could not install logger: {e}");
    }

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::new(&config.window)?;

    let view = GlView::new(ShaderSource::triangle(), config.render.frame_renderer());
    let mut surface = RenderSurface::new(&app.gl, view, config.render.mode);
    let (width, height) = app.drawable_size();
    surface.on_resize(width, height);
    surface.on_init()?;

    let mut taps = 0usize;

    'running: loop {
        let mut events: Vec<Event> = Vec::new();
        if !surface.needs_render() {
            events.extend(app.event_pump.wait_event_timeout(IDLE_WAIT_MS));
        }
        events.extend(app.event_pump.poll_iter());

        for event in events {
            match event {
                Event::Quit { .. } => break 'running,
                Event::KeyDown {
                    keycode: Some(Keycode::Escape | Keycode::AcBack),
                    ..
                } => break 'running,
                Event::Window {
                    win_event: WindowEvent::SizeChanged(..) | WindowEvent::Resized(..),
                    ..
                } => {
                    let (w, h) = app.drawable_size();
                    surface.on_resize(w, h);
                }
                Event::MouseButtonUp { .. } | Event::FingerUp { .. } => {
                    if config.toggle_sizes.is_empty() {
                        continue;
                    }
                    let (w, h) = config.toggle_sizes[taps % config.toggle_sizes.len()];
                    taps += 1;
                    if let Err(e) = app.window.set_size(w, h) {
                        error!("could not resize window to {w}x{h}: {e}");
                    } else {
                        info!("tap {taps}: view resized to {w}x{h}");
                    }
                }
                _ => {}
            }
        }

        if surface.needs_render() {
            surface.on_render_frame();
            app.window.gl_swap_window();
        }
    }

    surface.on_terminate();
    Ok(())
}
