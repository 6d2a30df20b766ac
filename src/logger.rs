//! Minimal stderr sink for the `log` facade

use log::{LevelFilter, Log, Metadata, Record};

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{:<5} {}] {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

pub fn init(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_reported() {
        let _ = init(LevelFilter::Debug);
        let err = init(LevelFilter::Debug)
            .map_err(|e| anyhow::anyhow!("failed to install logger: {}", e))
            .unwrap_err();
        assert!(err.to_string().starts_with("failed to install logger"));
        assert_eq!(log::max_level(), LevelFilter::Debug);
    }
}
