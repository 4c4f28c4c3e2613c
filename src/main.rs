//! Irrigator Firmware: Main Entry Point
//!
//! Hexagonal architecture around a single blocking control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter    LcdDisplay     LogEventSink   Monotonic-   │
//! │  (Sensor+Actuator)  (Display)      (EventSink)    Clock        │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Safety · FSM · History · Presenter                    │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_svc::hal::delay::{Ets, FreeRtos};
use esp_idf_svc::hal::gpio::PinDriver;
use esp_idf_svc::hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::units::Hertz;
use embedded_hal::delay::DelayNs;
use log::{error, info};
use port_expander::Pcf8574;

use irrigator::adapters::display::LcdDisplay;
use irrigator::adapters::hardware::HardwareAdapter;
use irrigator::adapters::log_sink::LogEventSink;
use irrigator::adapters::time::MonotonicClock;
use irrigator::app::ports::ClockPort;
use irrigator::app::service::AppService;
use irrigator::config::IrrigationConfig;
use irrigator::drivers::hw_init;
use irrigator::drivers::lcd::{self, BusHealth, MonitoredBus};
use irrigator::drivers::pump::PumpRelay;
use irrigator::drivers::watchdog::Watchdog;
use irrigator::error::Error;
use irrigator::fsm::StateId;
use irrigator::pins;
use irrigator::sensors::dht11::Dht11;
use irrigator::sensors::moisture::{Calibration, MoistureSensor};
use irrigator::sensors::temperature::TemperatureSensor;
use irrigator::sensors::SensorHub;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Irrigator v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = IrrigationConfig::default();
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("{}", Error::from(e)))?;
    match serde_json::to_string(&config) {
        Ok(json) => info!("Config: {}", json),
        Err(e) => log::warn!("Config could not be serialised: {}", e),
    }

    // Subscribe before any init step that may halt, so a halt resets.
    let watchdog = Watchdog::new(config.watchdog_timeout_ms);

    // ── 3. Relay first, so the pump is off before anything else ──
    let off_level = PumpRelay::off_level(config.relay_active_low);
    if let Err(e) = hw_init::init_peripherals(off_level) {
        // No relay or ADC means no safe operation.  Halt and let the
        // watchdog reset the device.
        error!("{}, halting", Error::from(e));
        halt();
    }
    let pump = match PumpRelay::new(config.relay_active_low) {
        Ok(p) => p,
        Err(e) => {
            error!("{}, halting", Error::from(e));
            halt();
        }
    };

    // ── 4. Bus peripherals ────────────────────────────────────
    let peripherals = Peripherals::take()?;

    let i2c_cfg = I2cConfig::new().baudrate(Hertz(pins::I2C_FREQ_HZ));
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio14,
        peripherals.pins.gpio15,
        &i2c_cfg,
    )?;
    let lcd_health = BusHealth::new();
    let (a0, a1, a2) = lcd::address_pins(pins::LCD_I2C_ADDR);
    let mut expander = Pcf8574::new(MonitoredBus::new(i2c, &lcd_health), a0, a1, a2);
    let mut display = LcdDisplay::new(
        ag_lcd::LcdDisplay::new_pcf8574(&mut expander, Ets),
        &lcd_health,
    );
    if !display.is_ready() {
        log::warn!("Display unavailable, continuing headless");
    }

    let mut dht_pin = PinDriver::input_output_od(peripherals.pins.gpio9)?;
    dht_pin.set_high()?;
    let dht = Dht11::new(dht_pin, Ets);

    // ── 5. Adapters ───────────────────────────────────────────
    let calibration = Calibration {
        dry_raw: config.moisture_dry_raw,
        wet_raw: config.moisture_wet_raw,
    };
    let sensor_hub = SensorHub::new(MoistureSensor::new(calibration), TemperatureSensor::new(dht));
    let mut hw = HardwareAdapter::new(sensor_hub, pump);
    let clock = MonotonicClock::new();
    let mut log_sink = LogEventSink::new();
    let mut delay = FreeRtos;
    let cycle_period_ms = config.cycle_period_ms;

    // ── 6. Application service ────────────────────────────────
    let mut app = AppService::new(config);
    app.start(&mut hw, &mut log_sink);
    app.show_splash(&mut display, &mut delay);
    watchdog.feed();

    info!("Entering control loop ({} ms cycle period)", cycle_period_ms);

    // ── 7. Control loop ───────────────────────────────────────
    loop {
        let report = app.tick(&mut hw, &clock, &mut log_sink);
        if app.state() == StateId::Active {
            // Tick again at the burst limit so the relay is not held
            // through the view sequence.
            app.present_status(&mut display, &clock, &report);
            let left = app
                .burst_remaining(clock.now())
                .map_or(0, |d| d.as_millis() as u32);
            delay.delay_ms(left.max(1));
        } else {
            app.present(&mut display, &mut delay, &clock, &report);
            delay.delay_ms(cycle_period_ms);
        }
        watchdog.feed();
    }
}

fn halt() -> ! {
    loop {
        FreeRtos::delay_ms(1_000);
    }
}
