//! Character-LCD display adapter.
//!
//! Implements [`DisplayPort`] on an `ag_lcd` HD44780 display.  Readiness
//! is decided once, after the whole init sequence has gone out: any bus
//! failure during it leaves the display dark, every `show` then reports
//! `NotInitialised` and the service logs and carries on.

use ag_lcd::{Blink, Cursor, Lines};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::warn;

use crate::app::ports::DisplayPort;
use crate::app::presenter::Frame;
use crate::drivers::lcd::{BusHealth, COLS};
use crate::error::DisplayError;

type Hd44780<T, D> = ag_lcd::LcdDisplay<T, D>;

pub struct LcdDisplay<'h, T: OutputPin, D: DelayNs> {
    lcd: Hd44780<T, D>,
    health: &'h BusHealth,
    ready: bool,
}

impl<'h, T: OutputPin, D: DelayNs> LcdDisplay<'h, T, D> {
    /// Configure and run the init sequence on an unbuilt `ag_lcd` display.
    /// A failure is logged, not returned.
    pub fn new(lcd: Hd44780<T, D>, health: &'h BusHealth) -> Self {
        let before = health.failures();
        let mut lcd = lcd
            .with_display(ag_lcd::Display::On)
            .with_cursor(Cursor::Off)
            .with_blink(Blink::Off)
            .with_lines(Lines::TwoLines)
            .build();
        lcd.backlight_on();

        let failed = health.failures() - before;
        if failed > 0 {
            warn!("Display: LCD init failed ({} bus errors)", failed);
        }
        Self {
            lcd,
            health,
            ready: failed == 0,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    fn write_row(&mut self, row: u8, text: &str) {
        self.lcd.set_position(0, row);
        self.lcd.print(text);
        for _ in text.len()..COLS {
            self.lcd.write(b' ');
        }
    }
}

impl<T: OutputPin, D: DelayNs> DisplayPort for LcdDisplay<'_, T, D> {
    fn show(&mut self, frame: &Frame) -> Result<(), DisplayError> {
        if !self.ready {
            return Err(DisplayError::NotInitialised);
        }
        let before = self.health.failures();
        self.write_row(0, &frame.top);
        self.write_row(1, &frame.bottom);
        if self.health.failures() != before {
            return Err(DisplayError::Bus);
        }
        Ok(())
    }
}
