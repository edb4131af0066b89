//! Monotonic clock.
//!
//! Trimmed down from a full PIT/HPET/APIC timer subsystem to just what the
//! rest of the kernel needs: a calibrated TSC-based monotonic clock for
//! inode timestamps, log entries and error-recovery bookkeeping. HPET and
//! APIC timer sources are out of scope now that there is no scheduler to
//! drive off their interrupts; PIT is kept only as the TSC calibration
//! reference, matching the original's preferred calibration source.

use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use x86_64::instructions::port::Port;

const PIT_FREQUENCY: u64 = 1_193_182;

static TSC_FREQUENCY: AtomicU64 = AtomicU64::new(0);
static BOOT_TSC: AtomicU64 = AtomicU64::new(0);
static BOOT_TIME_MS: AtomicU64 = AtomicU64::new(0);
static TIMER_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Read the Time Stamp Counter.
pub fn read_tsc() -> u64 {
    unsafe { core::arch::x86_64::_rdtsc() }
}

pub fn get_tsc_frequency() -> Option<u64> {
    let freq = TSC_FREQUENCY.load(Ordering::Relaxed);
    if freq > 0 {
        Some(freq)
    } else {
        None
    }
}

/// Calibrate TSC frequency against the PIT's channel 2 one-shot countdown.
fn calibrate_tsc_with_pit() {
    let calibration_ms: u64 = 50;

    unsafe {
        let mut cmd = Port::<u8>::new(0x43);
        let mut data = Port::<u8>::new(0x42);

        cmd.write(0xB0); // channel 2, lobyte/hibyte, one-shot
        let pit_ticks = ((PIT_FREQUENCY * calibration_ms) / 1000) as u16;
        data.write((pit_ticks & 0xFF) as u8);
        data.write((pit_ticks >> 8) as u8);

        let mut port61 = Port::<u8>::new(0x61);
        let val = port61.read();
        port61.write((val & 0xFD) | 0x01);
    }

    let start_tsc = read_tsc();
    unsafe {
        let port61 = Port::<u8>::new(0x61);
        while (port61.read() & 0x20) == 0 {
            core::hint::spin_loop();
        }
    }
    let end_tsc = read_tsc();

    let tsc_delta = end_tsc.saturating_sub(start_tsc);
    if tsc_delta > 0 {
        let freq = (tsc_delta * 1000) / calibration_ms;
        TSC_FREQUENCY.store(freq, Ordering::Relaxed);
    }
}

pub fn init() -> Result<(), &'static str> {
    calibrate_tsc_with_pit();
    if TSC_FREQUENCY.load(Ordering::Relaxed) == 0 {
        return Err("TSC calibration failed");
    }

    BOOT_TSC.store(read_tsc(), Ordering::Relaxed);
    BOOT_TIME_MS.store(0, Ordering::Relaxed);
    TIMER_INITIALIZED.store(true, Ordering::Relaxed);
    Ok(())
}

pub fn is_initialized() -> bool {
    TIMER_INITIALIZED.load(Ordering::Relaxed)
}

fn ticks_since_boot() -> u64 {
    read_tsc().saturating_sub(BOOT_TSC.load(Ordering::Relaxed))
}

pub fn uptime_ns() -> u64 {
    match get_tsc_frequency() {
        Some(freq) if freq > 0 => (ticks_since_boot() as u128 * 1_000_000_000 / freq as u128) as u64,
        _ => 0,
    }
}

pub fn uptime_us() -> u64 {
    uptime_ns() / 1_000
}

pub fn uptime_ms() -> u64 {
    uptime_ns() / 1_000_000
}

/// Wall-clock-style monotonic millisecond counter, used for timestamps
/// where the caller only needs relative ordering, not uptime semantics.
pub fn monotonic_ms() -> u64 {
    BOOT_TIME_MS.load(Ordering::Relaxed) + uptime_ms()
}

pub fn get_system_time_ms() -> u64 {
    monotonic_ms()
}

pub fn sleep_ms(ms: u64) {
    if ms == 0 {
        return;
    }
    let target = uptime_ms() + ms;
    while uptime_ms() < target {
        core::hint::spin_loop();
    }
}

pub fn sleep_us(us: u64) {
    if us == 0 {
        return;
    }
    let target = uptime_us() + us;
    while uptime_us() < target {
        core::hint::spin_loop();
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TimerStats {
    pub tsc_frequency_hz: u64,
    pub uptime_ms: u64,
}

pub fn get_timer_stats() -> TimerStats {
    TimerStats {
        tsc_frequency_hz: TSC_FREQUENCY.load(Ordering::Relaxed),
        uptime_ms: uptime_ms(),
    }
}

/// A stopwatch for ad hoc profiling, matching the logging subsystem's
/// `start_time: Timer` field.
pub struct Timer {
    start_tsc: u64,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start_tsc: read_tsc(),
        }
    }

    pub fn elapsed_ns(&self) -> u64 {
        match get_tsc_frequency() {
            Some(freq) if freq > 0 => {
                let delta = read_tsc().saturating_sub(self.start_tsc);
                (delta as u128 * 1_000_000_000 / freq as u128) as u64
            }
            _ => 0,
        }
    }

    pub fn elapsed_us(&self) -> u64 {
        self.elapsed_ns() / 1_000
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ns() / 1_000_000
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_case]
    fn timer_stats_report_zero_before_init() {
        // Calibration requires real hardware ports; under the test harness
        // the frequency is whatever the previous test left it at, so this
        // only asserts the accessor doesn't panic.
        let _ = get_timer_stats();
    }

    #[test_case]
    fn sleep_zero_returns_immediately() {
        sleep_ms(0);
        sleep_us(0);
    }
}
