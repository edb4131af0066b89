// Kernel error handling and recovery.
// Trimmed to the error domains this kernel still has a subsystem for:
// memory, filesystem (VFS) and general system errors.

use core::fmt;
use alloc::string::String;
use alloc::vec::Vec;
use spin::{Mutex, RwLock};
use lazy_static::lazy_static;

use crate::vfs::VfsError;

#[derive(Debug, Clone)]
pub enum KernelError {
    Memory(MemoryError),
    FileSystem(FileSystemError),
    System(SystemError),
}

#[derive(Debug, Clone)]
pub enum MemoryError {
    OutOfMemory,
    InvalidAddress,
    MappingFailed,
    PermissionDenied,
    Fragmentation,
    CorruptionDetected,
    PageFaultUnrecoverable,
}

#[derive(Debug, Clone)]
pub enum FileSystemError {
    FileNotFound,
    PermissionDenied,
    DiskFull,
    CorruptedData,
    InvalidPath,
    DeviceError,
    QuotaExceeded,
}

impl From<VfsError> for FileSystemError {
    fn from(e: VfsError) -> Self {
        match e {
            VfsError::NotFound => FileSystemError::FileNotFound,
            VfsError::PermissionDenied => FileSystemError::PermissionDenied,
            VfsError::NoSpace => FileSystemError::DiskFull,
            VfsError::IoError => FileSystemError::CorruptedData,
            VfsError::Fault
            | VfsError::NameTooLong
            | VfsError::InvalidArgument
            | VfsError::InvalidSeek => FileSystemError::InvalidPath,
            VfsError::CrossDevice | VfsError::ReadOnly => FileSystemError::DeviceError,
            _ => FileSystemError::CorruptedData,
        }
    }
}

#[derive(Debug, Clone)]
pub enum SystemError {
    ResourceExhausted,
    ServiceUnavailable,
    ConfigurationError,
    InternalError,
    NotImplemented,
    Timeout,
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
    Fatal,
}

/// Recovery action types
#[derive(Debug, Clone)]
pub enum RecoveryAction {
    Retry,
    Fallback,
    Restart,
    Isolate,
    Shutdown,
    None,
}

/// Error context with recovery information
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub error: KernelError,
    pub severity: ErrorSeverity,
    pub location: &'static str,
    pub message: String,
    pub recovery_action: RecoveryAction,
    pub retry_count: u32,
    pub timestamp: u64,
}

impl ErrorContext {
    pub fn new(
        error: KernelError,
        severity: ErrorSeverity,
        location: &'static str,
        message: String,
    ) -> Self {
        Self {
            error,
            severity,
            location,
            message,
            recovery_action: RecoveryAction::None,
            retry_count: 0,
            timestamp: crate::time::monotonic_ms(),
        }
    }

    pub fn with_recovery(mut self, action: RecoveryAction) -> Self {
        self.recovery_action = action;
        self
    }

    pub fn increment_retry(&mut self) {
        self.retry_count += 1;
    }
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelError::Memory(e) => write!(f, "Memory Error: {:?}", e),
            KernelError::FileSystem(e) => write!(f, "FileSystem Error: {:?}", e),
            KernelError::System(e) => write!(f, "System Error: {:?}", e),
        }
    }
}

/// Global error recovery manager
pub struct ErrorRecoveryManager {
    error_history: Vec<ErrorContext>,
    recovery_strategies: RwLock<Vec<RecoveryStrategy>>,
    health_monitor: HealthMonitor,
}

#[derive(Clone)]
pub struct RecoveryStrategy {
    pub error_pattern: fn(&KernelError) -> bool,
    pub recovery_fn: fn(&mut ErrorContext) -> Result<(), KernelError>,
    pub max_retries: u32,
    pub cooldown_ms: u64,
}

/// Rolling error-rate health score, one counter per `KernelError` domain.
pub struct HealthMonitor {
    error_counts: [u32; 3],
    last_error_time: [u64; 3],
    system_health_score: u8,
}

impl HealthMonitor {
    pub fn new() -> Self {
        Self {
            error_counts: [0; 3],
            last_error_time: [0; 3],
            system_health_score: 100,
        }
    }

    fn index_of(error: &KernelError) -> usize {
        match error {
            KernelError::Memory(_) => 0,
            KernelError::FileSystem(_) => 1,
            KernelError::System(_) => 2,
        }
    }

    pub fn record_error(&mut self, error: &KernelError) {
        let index = Self::index_of(error);
        self.error_counts[index] += 1;
        self.last_error_time[index] = crate::time::monotonic_ms();
        self.update_health_score();
    }

    fn update_health_score(&mut self) {
        let now = crate::time::monotonic_ms();
        for i in 0..self.error_counts.len() {
            if now.saturating_sub(self.last_error_time[i]) > 60_000 {
                self.error_counts[i] = self.error_counts[i].saturating_sub(1);
            }
        }
        let total: u32 = self.error_counts.iter().sum();
        self.system_health_score = if total == 0 {
            100
        } else {
            (100 - (total * 10).min(100)) as u8
        };
    }

    pub fn is_system_healthy(&self) -> bool {
        self.system_health_score > 50
    }

    pub fn get_health_score(&self) -> u8 {
        self.system_health_score
    }
}

impl ErrorRecoveryManager {
    pub fn new() -> Self {
        Self {
            error_history: Vec::new(),
            recovery_strategies: RwLock::new(Vec::new()),
            health_monitor: HealthMonitor::new(),
        }
    }

    pub fn handle_error(&mut self, mut context: ErrorContext) -> Result<(), KernelError> {
        self.health_monitor.record_error(&context.error);
        self.log_error(&context);

        match context.severity {
            ErrorSeverity::Info | ErrorSeverity::Warning => Ok(()),
            ErrorSeverity::Error => self.attempt_recovery(&mut context),
            ErrorSeverity::Critical => self.attempt_recovery(&mut context).or_else(|_| {
                crate::serial_println!("CRITICAL ERROR: {}", context.error);
                Err(context.error.clone())
            }),
            ErrorSeverity::Fatal => self.handle_fatal_error(&context),
        }
    }

    fn attempt_recovery(&mut self, context: &mut ErrorContext) -> Result<(), KernelError> {
        let strategies = self.recovery_strategies.read();
        for strategy in strategies.iter() {
            if (strategy.error_pattern)(&context.error) && context.retry_count < strategy.max_retries {
                context.increment_retry();
                match (strategy.recovery_fn)(context) {
                    Ok(()) => {
                        crate::serial_println!("Recovery successful for error: {}", context.error);
                        return Ok(());
                    }
                    Err(e) => {
                        crate::serial_println!("Recovery attempt failed: {}", e);
                        continue;
                    }
                }
            }
        }
        Err(context.error.clone())
    }

    fn handle_fatal_error(&mut self, context: &ErrorContext) -> Result<(), KernelError> {
        crate::serial_println!("FATAL ERROR: System cannot continue");
        crate::serial_println!("Error: {}", context.error);
        crate::serial_println!("Location: {}", context.location);
        crate::serial_println!("Message: {}", context.message);
        loop {
            unsafe { core::arch::asm!("hlt"); }
        }
    }

    fn log_error(&mut self, context: &ErrorContext) {
        self.error_history.push(context.clone());
        if self.error_history.len() > 100 {
            self.error_history.remove(0);
        }

        crate::serial_println!(
            "[{}] {} at {}: {}",
            match context.severity {
                ErrorSeverity::Info => "INFO",
                ErrorSeverity::Warning => "WARN",
                ErrorSeverity::Error => "ERROR",
                ErrorSeverity::Critical => "CRITICAL",
                ErrorSeverity::Fatal => "FATAL",
            },
            context.error,
            context.location,
            context.message
        );
    }

    pub fn register_recovery_strategy(&mut self, strategy: RecoveryStrategy) {
        self.recovery_strategies.write().push(strategy);
    }

    pub fn get_system_health(&self) -> u8 {
        self.health_monitor.get_health_score()
    }

    pub fn get_error_history(&self) -> &[ErrorContext] {
        &self.error_history
    }
}

lazy_static! {
    pub static ref ERROR_MANAGER: Mutex<ErrorRecoveryManager> =
        Mutex::new(ErrorRecoveryManager::new());
}

#[macro_export]
macro_rules! kernel_error {
    ($error:expr, $severity:expr, $msg:expr) => {
        $crate::error::ErrorContext::new(
            $error,
            $severity,
            concat!(file!(), ":", line!()),
            alloc::format!($msg),
        )
    };
    ($error:expr, $severity:expr, $msg:expr, $($arg:tt)*) => {
        $crate::error::ErrorContext::new(
            $error,
            $severity,
            concat!(file!(), ":", line!()),
            alloc::format!($msg, $($arg)*),
        )
    };
}

#[macro_export]
macro_rules! handle_error {
    ($error_context:expr) => {
        match $crate::error::ERROR_MANAGER.lock().handle_error($error_context) {
            Ok(()) => {},
            Err(e) => {
                crate::serial_println!("Unrecoverable error: {}", e);
                return Err(e);
            }
        }
    };
}

/// Initialize the error handling system with its default recovery strategies.
pub fn init_error_handling() {
    crate::serial_println!("Initializing error handling and recovery system");

    let mut manager = ERROR_MANAGER.lock();

    manager.register_recovery_strategy(RecoveryStrategy {
        error_pattern: |e| matches!(e, KernelError::Memory(MemoryError::OutOfMemory)),
        recovery_fn: |_| {
            crate::serial_println!("Memory recovery: cleanup not yet implemented");
            Ok(())
        },
        max_retries: 3,
        cooldown_ms: 1000,
    });

    crate::serial_println!("Error handling system initialized");
}
