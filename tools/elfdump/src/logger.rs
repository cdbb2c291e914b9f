use eyre::{eyre, Result};
use log::{Level, LevelFilter, Metadata, Record};
use std::io::Write;

static LOGGER: Logger = Logger;

pub fn init(verbosity: u32) -> Result<()> {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    log::set_logger(&LOGGER)
        .map(|_| log::set_max_level(level))
        .map_err(|err| eyre!("Failed to install logger: {}", err))
}

struct Logger;

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let color = match record.metadata().level() {
                Level::Trace => "\x1b[36m",
                Level::Debug => "\x1b[34m",
                Level::Info => "\x1b[32m",
                Level::Warn => "\x1b[33m",
                Level::Error => "\x1b[31m",
            };
            let _ = writeln!(
                std::io::stderr().lock(),
                "[{}{:5}\x1b[0m] {}: {}",
                color,
                record.level(),
                record.module_path().unwrap_or(""),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}
