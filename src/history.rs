//! In-memory irrigation history and rolling statistics.
//!
//! Keeps the last [`HISTORY_SLOTS`] completed bursts in a fixed-capacity
//! ring and accumulates per-window moisture / temperature figures that the
//! application service flushes into a `Summary` event.  Nothing here is
//! persisted; a reboot starts from empty.

use embassy_time::{Duration, Instant};
use heapless::Deque;

use crate::fsm::context::StopReason;

pub const HISTORY_SLOTS: usize = 16;

/// One completed pump burst.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IrrigationRecord {
    pub started_at: Instant,
    pub duration: Duration,
    pub moisture_before: u8,
    pub moisture_at_stop: u8,
    /// Reading at the end of the absorption analysis; `None` until then
    /// (and forever if the burst was cut by the safety stop).
    pub settled_moisture: Option<u8>,
    pub stop_reason: StopReason,
}

#[derive(Debug, Clone, Copy)]
struct OpenBurst {
    started_at: Instant,
    moisture_before: u8,
}

/// Ring of recent bursts.
#[derive(Default)]
pub struct IrrigationHistory {
    records: Deque<IrrigationRecord, HISTORY_SLOTS>,
    open: Option<OpenBurst>,
    total_bursts: u32,
}

impl IrrigationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pump turned on.
    pub fn burst_started(&mut self, at: Instant, moisture: u8) {
        self.open = Some(OpenBurst {
            started_at: at,
            moisture_before: moisture,
        });
    }

    /// Pump turned off.  Ignored if no burst is open.
    pub fn burst_stopped(&mut self, at: Instant, moisture: u8, reason: StopReason) {
        let Some(open) = self.open.take() else {
            return;
        };

        let record = IrrigationRecord {
            started_at: open.started_at,
            duration: at.saturating_duration_since(open.started_at),
            moisture_before: open.moisture_before,
            moisture_at_stop: moisture,
            settled_moisture: None,
            stop_reason: reason,
        };

        if self.records.is_full() {
            self.records.pop_front();
        }
        // Cannot fail: a slot was freed above.
        let _ = self.records.push_back(record);
        self.total_bursts = self.total_bursts.saturating_add(1);
    }

    /// Analysis finished; attach the settled reading to the latest burst.
    pub fn analysis_completed(&mut self, moisture: u8) {
        if let Some(last) = self.records.back_mut() {
            if last.settled_moisture.is_none() {
                last.settled_moisture = Some(moisture);
            }
        }
    }

    pub fn latest(&self) -> Option<&IrrigationRecord> {
        self.records.back()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &IrrigationRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Bursts completed since boot, including ones evicted from the ring.
    pub fn total_bursts(&self) -> u32 {
        self.total_bursts
    }

    /// Mean absorbed gain (settled minus before) over records that have a
    /// settled reading.
    pub fn average_gain(&self) -> Option<f32> {
        let (sum, n) = self
            .records
            .iter()
            .filter_map(|r| r.settled_moisture.map(|s| i32::from(s) - i32::from(r.moisture_before)))
            .fold((0i32, 0u32), |(s, n), g| (s + g, n + 1));
        (n > 0).then(|| sum as f32 / n as f32)
    }
}

// ---------------------------------------------------------------------------
// Rolling window statistics
// ---------------------------------------------------------------------------

/// Figures for one summary window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowSummary {
    pub cycles: u32,
    pub moisture_min: u8,
    pub moisture_max: u8,
    pub moisture_avg: f32,
    /// Mean over valid readings only.
    pub temperature_avg: Option<f32>,
    pub activations: u32,
    pub total_activations: u32,
    /// Mean absorbed gain over the burst ring; filled in by the service.
    pub average_gain: Option<f32>,
}

#[derive(Debug, Default)]
pub struct CycleStatistics {
    cycles: u32,
    moisture_min: u8,
    moisture_max: u8,
    moisture_sum: u32,
    temperature_sum: f32,
    temperature_samples: u32,
    activations: u32,
    total_activations: u32,
}

impl CycleStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one cycle into the current window.
    pub fn record(&mut self, moisture: u8, temperature_c: Option<f32>, pump_started: bool) {
        if self.cycles == 0 {
            self.moisture_min = moisture;
            self.moisture_max = moisture;
        } else {
            self.moisture_min = self.moisture_min.min(moisture);
            self.moisture_max = self.moisture_max.max(moisture);
        }
        self.cycles += 1;
        self.moisture_sum += u32::from(moisture);

        if let Some(t) = temperature_c.filter(|t| !t.is_nan()) {
            self.temperature_sum += t;
            self.temperature_samples += 1;
        }

        if pump_started {
            self.activations += 1;
            self.total_activations = self.total_activations.saturating_add(1);
        }
    }

    pub fn cycles_in_window(&self) -> u32 {
        self.cycles
    }

    pub fn total_activations(&self) -> u32 {
        self.total_activations
    }

    /// Close the current window and start a fresh one.  Returns `None` if
    /// no cycle was recorded.
    pub fn take_window(&mut self) -> Option<WindowSummary> {
        if self.cycles == 0 {
            return None;
        }

        let summary = WindowSummary {
            cycles: self.cycles,
            moisture_min: self.moisture_min,
            moisture_max: self.moisture_max,
            moisture_avg: self.moisture_sum as f32 / self.cycles as f32,
            temperature_avg: (self.temperature_samples > 0)
                .then(|| self.temperature_sum / self.temperature_samples as f32),
            activations: self.activations,
            total_activations: self.total_activations,
            average_gain: None,
        };

        *self = Self {
            total_activations: self.total_activations,
            ..Self::default()
        };
        Some(summary)
    }
}
