//! Logger setup for the demo binary.

use std::sync::Once;

use log::LevelFilter;

/// Environment variable that overrides the configured level.
pub const LOG_ENV: &str = "GLVIEW_LOG";

static INIT: Once = Once::new();

pub fn parse_level(level: &str) -> LevelFilter {
    level.trim().parse().unwrap_or(LevelFilter::Info)
}

/// Picks the `GLVIEW_LOG` value when it names a level, otherwise the configured one.
pub fn resolve_level(env: Option<&str>, configured: &str) -> LevelFilter {
    env.and_then(|v| v.trim().parse().ok())
        .unwrap_or_else(|| parse_level(configured))
}

/// Installs a stderr logger once; later calls are ignored.
///
/// `level` is used unless `GLVIEW_LOG` holds a valid level.
pub fn init(level: &str) -> Result<(), log::SetLoggerError> {
    let mut result = Ok(());
    INIT.call_once(|| {
        let env = std::env::var(LOG_ENV).ok();
        let level = resolve_level(env.as_deref(), level);

        result = fern::Dispatch::new()
            .format(|out, message, record| {
                out.finish(format_args!(
                    "[{} {} {}] {}",
                    chrono::Local::now().format("%H:%M:%S%.3f"),
                    record.level(),
                    record.target(),
                    message
                ))
            })
            .level(level)
            .chain(std::io::stderr())
            .apply();

        if result.is_ok() {
            log::debug!("logging initialized at {level}");
        }
    });
    result
}
