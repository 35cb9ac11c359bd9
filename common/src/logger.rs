use log::{Level, LevelFilter, Metadata, Record};
use std::io::{stdout, Write};
use std::time::Instant;

/// A logger that logs to stdout with the time elapsed since startup
pub struct MyLog {
    start: Instant,
    level: LevelFilter,
}

impl MyLog {
    fn new(level: LevelFilter) -> Self {
        Self {
            start: Instant::now(),
            level,
        }
    }

    pub fn init() {
        Self::init_with_level(LevelFilter::Debug)
    }

    pub fn init_with_level(level: LevelFilter) {
        let leaked = Box::leak(Box::new(MyLog::new(level)));
        crate::unwrap_orr!(log::set_logger(leaked), return);
        log::set_max_level(level);
        log_panics::init();
    }
}

impl log::Log for MyLog {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, r: &Record<'_>) {
        if r.target() == "panic" {
            println!("{}", r.args());
            self.flush();
            return;
        }

        if !self.enabled(r.metadata()) {
            return;
        }

        let time = self.start.elapsed().as_micros();
        if r.level() > Level::Warn {
            let module_path = r.module_path_static().unwrap_or_else(|| r.target());
            println!("[{:9} {:5} {:12}] {}", time, r.level(), module_path, r.args());
        } else {
            println!(
                "[{:9} {:5} {}:{}] {}",
                time,
                r.level(),
                r.file().unwrap_or_default(),
                r.line().unwrap_or_default(),
                r.args()
            );
        }
    }

    fn flush(&self) {
        let _ = stdout().flush();
    }
}
