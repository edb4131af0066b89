// Structured logging with multiple output targets and profiling.

use core::fmt;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use alloc::boxed::Box;
use alloc::collections::VecDeque;
use spin::Mutex;
use lazy_static::lazy_static;

/// Log levels for structured logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }

    pub fn color_code(&self) -> &'static str {
        match self {
            LogLevel::Trace => "\x1b[37m",
            LogLevel::Debug => "\x1b[36m",
            LogLevel::Info => "\x1b[32m",
            LogLevel::Warn => "\x1b[33m",
            LogLevel::Error => "\x1b[31m",
            LogLevel::Fatal => "\x1b[35m",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Log entry structure
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: u64,
    pub level: LogLevel,
    pub module: String,
    pub message: String,
    pub file: Option<String>,
    pub line: Option<u32>,
}

impl LogEntry {
    pub fn new(level: LogLevel, module: &str, message: String) -> Self {
        Self {
            timestamp: crate::time::get_system_time_ms(),
            level,
            module: module.to_string(),
            message,
            file: None,
            line: None,
        }
    }

    pub fn with_location(mut self, file: &str, line: u32) -> Self {
        self.file = Some(file.to_string());
        self.line = Some(line);
        self
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let uptime_ms = crate::time::uptime_ms();
        let uptime_sec = uptime_ms / 1000;
        let uptime_ms_part = uptime_ms % 1000;

        write!(f, "[{:6}.{:03}] ", uptime_sec, uptime_ms_part)?;
        write!(f, "{}{:5}\x1b[0m ", self.level.color_code(), self.level)?;
        write!(f, "{:12} ", self.module)?;

        if let Some(ref file) = self.file {
            if let Some(line) = self.line {
                write!(f, "{}:{} ", file, line)?;
            }
        }

        write!(f, "{}", self.message)
    }
}

/// Blanket-implemented downcasting helper, so `Logger::get_memory_logs` can
/// recover the concrete `MemoryLogOutput` behind a `dyn LogOutput`.
pub trait AsAny {
    fn as_any(&self) -> &dyn core::any::Any;
}

impl<T: 'static> AsAny for T {
    fn as_any(&self) -> &dyn core::any::Any {
        self
    }
}

/// Log output targets
pub trait LogOutput: Send + Sync + AsAny {
    fn write_log(&mut self, entry: &LogEntry);
    fn flush(&mut self);
    fn name(&self) -> &str;
}

/// Serial port log output
pub struct SerialLogOutput {
    name: String,
}

impl SerialLogOutput {
    pub fn new() -> Self {
        Self {
            name: "Serial".to_string(),
        }
    }
}

impl LogOutput for SerialLogOutput {
    fn write_log(&mut self, entry: &LogEntry) {
        crate::serial_println!("{}", entry);
    }

    fn flush(&mut self) {}

    fn name(&self) -> &str {
        &self.name
    }
}

/// Memory buffer log output for debugging
pub struct MemoryLogOutput {
    name: String,
    buffer: VecDeque<LogEntry>,
    max_entries: usize,
}

impl MemoryLogOutput {
    pub fn new(max_entries: usize) -> Self {
        Self {
            name: "Memory".to_string(),
            buffer: VecDeque::with_capacity(max_entries),
            max_entries,
        }
    }

    pub fn get_entries(&self) -> Vec<LogEntry> {
        self.buffer.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl LogOutput for MemoryLogOutput {
    fn write_log(&mut self, entry: &LogEntry) {
        if self.buffer.len() >= self.max_entries {
            self.buffer.pop_front();
        }
        self.buffer.push_back(entry.clone());
    }

    fn flush(&mut self) {}

    fn name(&self) -> &str {
        &self.name
    }
}

/// Main logging system
pub struct Logger {
    outputs: Vec<Box<dyn LogOutput>>,
    min_level: LogLevel,
    enabled: bool,
}

impl Logger {
    pub fn new() -> Self {
        Self {
            outputs: Vec::new(),
            min_level: LogLevel::Info,
            enabled: true,
        }
    }

    pub fn add_output(&mut self, output: Box<dyn LogOutput>) {
        self.outputs.push(output);
    }

    pub fn set_min_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn log(&mut self, entry: LogEntry) {
        if !self.enabled || entry.level < self.min_level {
            return;
        }

        for output in &mut self.outputs {
            output.write_log(&entry);
        }
    }

    pub fn flush(&mut self) {
        for output in &mut self.outputs {
            output.flush();
        }
    }

    pub fn get_memory_logs(&self) -> Vec<LogEntry> {
        for output in &self.outputs {
            if output.name() == "Memory" {
                if let Some(memory_output) = output.as_any().downcast_ref::<MemoryLogOutput>() {
                    return memory_output.get_entries();
                }
            }
        }
        Vec::new()
    }
}

lazy_static! {
    pub static ref LOGGER: Mutex<Logger> = Mutex::new(Logger::new());
}

/// Initialize the logging system
pub fn init_logging() {
    let mut logger = LOGGER.lock();

    logger.add_output(Box::new(SerialLogOutput::new()));
    logger.add_output(Box::new(MemoryLogOutput::new(1000)));
    logger.set_min_level(LogLevel::Debug);

    crate::serial_println!("Logging system initialized");
}

/// Log a message with specified level
pub fn log(level: LogLevel, module: &str, message: String) {
    let entry = LogEntry::new(level, module, message);
    LOGGER.lock().log(entry);
}

/// Log a message with location information
pub fn log_with_location(level: LogLevel, module: &str, message: String, file: &str, line: u32) {
    let entry = LogEntry::new(level, module, message).with_location(file, line);
    LOGGER.lock().log(entry);
}

/// Set minimum log level
pub fn set_log_level(level: LogLevel) {
    LOGGER.lock().set_min_level(level);
}

/// Enable or disable logging
pub fn set_logging_enabled(enabled: bool) {
    LOGGER.lock().set_enabled(enabled);
}

/// Get recent log entries from memory buffer
pub fn get_recent_logs() -> Vec<LogEntry> {
    LOGGER.lock().get_memory_logs()
}

/// Flush all log outputs
pub fn flush_logs() {
    LOGGER.lock().flush();
}

#[macro_export]
macro_rules! log_trace {
    ($module:expr, $($arg:tt)*) => {
        $crate::logging::log_with_location(
            $crate::logging::LogLevel::Trace,
            $module,
            alloc::format!($($arg)*),
            file!(),
            line!()
        );
    };
}

#[macro_export]
macro_rules! log_debug {
    ($module:expr, $($arg:tt)*) => {
        $crate::logging::log_with_location(
            $crate::logging::LogLevel::Debug,
            $module,
            alloc::format!($($arg)*),
            file!(),
            line!()
        );
    };
}

#[macro_export]
macro_rules! log_info {
    ($module:expr, $($arg:tt)*) => {
        $crate::logging::log_with_location(
            $crate::logging::LogLevel::Info,
            $module,
            alloc::format!($($arg)*),
            file!(),
            line!()
        );
    };
}

#[macro_export]
macro_rules! log_warn {
    ($module:expr, $($arg:tt)*) => {
        $crate::logging::log_with_location(
            $crate::logging::LogLevel::Warn,
            $module,
            alloc::format!($($arg)*),
            file!(),
            line!()
        );
    };
}

#[macro_export]
macro_rules! log_error {
    ($module:expr, $($arg:tt)*) => {
        $crate::logging::log_with_location(
            $crate::logging::LogLevel::Error,
            $module,
            alloc::format!($($arg)*),
            file!(),
            line!()
        );
    };
}

#[macro_export]
macro_rules! log_fatal {
    ($module:expr, $($arg:tt)*) => {
        $crate::logging::log_with_location(
            $crate::logging::LogLevel::Fatal,
            $module,
            alloc::format!($($arg)*),
            file!(),
            line!()
        );
    };
}

/// Performance monitoring and profiling
pub mod profiling {
    use super::*;
    use alloc::collections::BTreeMap;

    /// Performance counter
    #[derive(Debug, Clone)]
    pub struct PerfCounter {
        pub name: String,
        pub count: u64,
        pub total_time_ns: u64,
        pub min_time_ns: u64,
        pub max_time_ns: u64,
        pub avg_time_ns: u64,
    }

    impl PerfCounter {
        pub fn new(name: String) -> Self {
            Self {
                name,
                count: 0,
                total_time_ns: 0,
                min_time_ns: u64::MAX,
                max_time_ns: 0,
                avg_time_ns: 0,
            }
        }

        pub fn record(&mut self, time_ns: u64) {
            self.count += 1;
            self.total_time_ns += time_ns;
            self.min_time_ns = self.min_time_ns.min(time_ns);
            self.max_time_ns = self.max_time_ns.max(time_ns);
            self.avg_time_ns = self.total_time_ns / self.count;
        }
    }

    lazy_static! {
        static ref PERF_COUNTERS: Mutex<BTreeMap<String, PerfCounter>> =
            Mutex::new(BTreeMap::new());
    }

    /// Performance measurement timer
    pub struct PerfTimer {
        name: String,
        start_time: crate::time::Timer,
    }

    impl PerfTimer {
        pub fn new(name: String) -> Self {
            Self {
                name,
                start_time: crate::time::Timer::new(),
            }
        }

        pub fn finish(self) {
            let elapsed_ns = self.start_time.elapsed_ns();
            let mut counters = PERF_COUNTERS.lock();

            let counter = counters
                .entry(self.name.clone())
                .or_insert_with(|| PerfCounter::new(self.name));

            counter.record(elapsed_ns);
        }
    }

    pub fn start_measurement(name: &str) -> PerfTimer {
        PerfTimer::new(name.to_string())
    }

    pub fn get_perf_stats() -> Vec<PerfCounter> {
        PERF_COUNTERS.lock().values().cloned().collect()
    }

    pub fn reset_perf_stats() {
        PERF_COUNTERS.lock().clear();
    }

    pub fn display_perf_stats() {
        let stats = get_perf_stats();

        log_info!("profiling", "=== PERFORMANCE STATISTICS ===");
        for stat in stats {
            log_info!(
                "profiling",
                "{:<30} {:>8} {:>12} {:>12} {:>12} {:>12}",
                stat.name,
                stat.count,
                stat.total_time_ns / 1000,
                stat.min_time_ns / 1000,
                stat.max_time_ns / 1000,
                stat.avg_time_ns / 1000
            );
        }
        log_info!("profiling", "=== END PERFORMANCE STATISTICS ===");
    }
}
