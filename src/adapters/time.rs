//! Monotonic clock adapter.
//!
//! - **`target_os = "espidf"`**: `embassy_time::Instant::now()`, backed by
//!   the `esp_timer` driver symbols below (microsecond ticks, monotonic).
//! - **`not(target_os = "espidf")`**: `std::time::Instant` offset from
//!   construction, for host-side runs.

use embassy_time::Instant;

use crate::app::ports::ClockPort;

pub struct MonotonicClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }
}

impl ClockPort for MonotonicClock {
    #[cfg(target_os = "espidf")]
    fn now(&self) -> Instant {
        Instant::now()
    }

    #[cfg(not(target_os = "espidf"))]
    fn now(&self) -> Instant {
        Instant::from_micros(self.start.elapsed().as_micros() as u64)
    }
}

// ── embassy-time driver ───────────────────────────────────────

/// Tick source for `embassy_time::Instant::now()`.  One tick is one
/// microsecond of `esp_timer`.
#[cfg(target_os = "espidf")]
#[unsafe(no_mangle)]
pub extern "C" fn _embassy_time_now() -> u64 {
    // SAFETY: esp_timer is started by the IDF before app_main.
    unsafe { esp_idf_svc::sys::esp_timer_get_time() as u64 }
}

/// Wake scheduler for embassy timers.  The control loop is blocking, so
/// this only has to be correct, not cheap: a helper thread sleeps until
/// the deadline and fires the waker.
#[cfg(target_os = "espidf")]
#[unsafe(no_mangle)]
pub extern "C" fn _embassy_time_schedule_wake(at: u64, waker: *mut core::ffi::c_void) {
    if waker.is_null() {
        return;
    }

    // SAFETY: embassy-time hands over a valid `Waker` pointer for the
    // duration of this call; it is cloned before returning.
    let waker = unsafe { (&*(waker as *const core::task::Waker)).clone() };
    let now = _embassy_time_now();
    if at <= now {
        waker.wake();
        return;
    }
    std::thread::spawn(move || {
        std::thread::sleep(core::time::Duration::from_micros(at - now));
        waker.wake();
    });
}
