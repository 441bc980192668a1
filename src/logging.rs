//! `log` backend writing to the browser console, built on `fern`.

use std::fmt;

use log::{Level, LevelFilter};

/// Install the console logger. Later calls are no-ops.
pub fn init(level: LevelFilter) {
    let installed = fern::Dispatch::new()
        .level(level)
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}",
                format_line(record.level(), record.target(), message)
            ))
        })
        .chain(fern::Output::call(|record| {
            write_console(record.level(), &record.args().to_string())
        }))
        .apply();
    if installed.is_err() {
        log::debug!("console logger already installed");
    }
}

fn format_line(level: Level, target: &str, args: &fmt::Arguments) -> String {
    format!("[{}] {}: {}", level, target, args)
}

#[cfg(target_arch = "wasm32")]
fn write_console(level: Level, line: &str) {
    match level {
        Level::Error => web_sys::console::error_1(&line.into()),
        Level::Warn => web_sys::console::warn_1(&line.into()),
        Level::Info => web_sys::console::info_1(&line.into()),
        Level::Debug | Level::Trace => web_sys::console::debug_1(&line.into()),
    }
}

// Native builds only run tests; there is no console to write to.
#[cfg(not(target_arch = "wasm32"))]
fn write_console(_level: Level, _line: &str) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_carries_level_and_target() {
        let line = format_line(Level::Warn, "idle_clicker::save", &format_args!("bad {}", 7));
        assert_eq!(line, "[WARN] idle_clicker::save: bad 7");
    }

    #[test]
    fn init_twice_is_harmless() {
        init(LevelFilter::Info);
        init(LevelFilter::Debug);
        log::info!("still fine");
        assert_eq!(log::max_level(), LevelFilter::Info);
    }
}
