//! One-shot hardware peripheral initialization.
//!
//! Configures the moisture ADC channel and the pump relay GPIO using raw
//! ESP-IDF sys calls.  Called once from `main()` before the control loop
//! starts.  The DHT11 pin and the LCD I²C bus are owned by esp-idf-hal
//! drivers and set up in `main` instead.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use crate::error::{ActuatorError, InitError, SensorError};

#[cfg(target_os = "espidf")]
use log::info;

use crate::pins;

/// Configure the ADC and the relay output.  The relay pin is driven to
/// `relay_off_level` before anything else so the pump never twitches at
/// boot.
#[cfg(target_os = "espidf")]
pub fn init_peripherals(relay_off_level: bool) -> Result<(), InitError> {
    // SAFETY: Called once from main() before the control loop; single-threaded.
    unsafe {
        init_relay_output(relay_off_level)?;
        init_adc()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals(relay_off_level: bool) -> Result<(), InitError> {
    // The host latch cannot fail.
    let _ = gpio_write(pins::PUMP_RELAY_GPIO, relay_off_level);
    log::info!("hw_init(sim): ADC skipped, relay latched at level={relay_off_level}");
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only from the single-threaded init path or the
/// control-loop read path.  `init_adc()` completes before the loop starts.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<(), InitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 {
        return Err(InitError::AdcInitFailed(ret));
    }

    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };
    let ret = unsafe {
        adc_oneshot_config_channel(adc1_handle(), pins::MOISTURE_ADC_CHANNEL, &chan_cfg)
    };
    if ret != ESP_OK as i32 {
        return Err(InitError::AdcInitFailed(ret));
    }

    info!(
        "hw_init: ADC1 CH{} configured for moisture probe (GPIO {})",
        pins::MOISTURE_ADC_CHANNEL,
        pins::MOISTURE_ADC_GPIO
    );
    Ok(())
}

/// One 12-bit sample from an ADC1 channel.
#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> Result<u16, SensorError> {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract, control-loop access only.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return Err(SensorError::AdcReadFailed(ret));
    }
    Ok(raw.clamp(0, 4095) as u16)
}

#[cfg(not(target_os = "espidf"))]
pub fn adc1_read(_channel: u32) -> Result<u16, SensorError> {
    Ok(0)
}

// ── GPIO Outputs ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_relay_output(off_level: bool) -> Result<(), InitError> {
    let pin = pins::PUMP_RELAY_GPIO;
    // Latch the idle level first so the pin comes up inactive.
    unsafe { gpio_set_level(pin, u32::from(off_level)) };

    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pin,
        mode: gpio_mode_t_GPIO_MODE_OUTPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 {
        return Err(InitError::GpioConfigFailed(ret));
    }
    unsafe { gpio_set_level(pin, u32::from(off_level)) };

    info!("hw_init: relay GPIO {pin} configured, idle level={off_level}");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) -> Result<(), ActuatorError> {
    // SAFETY: gpio_set_level writes to an already-configured output pin;
    // control-loop only.
    let ret = unsafe { gpio_set_level(pin, u32::from(high)) };
    if ret != ESP_OK as i32 {
        return Err(ActuatorError::GpioWriteFailed(ret));
    }
    Ok(())
}

/// Host-side output latch, one bit per GPIO.
#[cfg(not(target_os = "espidf"))]
static SIM_GPIO_LEVELS: core::sync::atomic::AtomicU64 = core::sync::atomic::AtomicU64::new(0);

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(pin: i32, high: bool) -> Result<(), ActuatorError> {
    use core::sync::atomic::Ordering;
    let mask = 1u64 << (pin as u32 & 63);
    if high {
        SIM_GPIO_LEVELS.fetch_or(mask, Ordering::Relaxed);
    } else {
        SIM_GPIO_LEVELS.fetch_and(!mask, Ordering::Relaxed);
    }
    Ok(())
}

/// Last level written to `pin` through [`gpio_write`].
#[cfg(not(target_os = "espidf"))]
pub fn sim_gpio_level(pin: i32) -> bool {
    let mask = 1u64 << (pin as u32 & 63);
    SIM_GPIO_LEVELS.load(core::sync::atomic::Ordering::Relaxed) & mask != 0
}

#[cfg(all(test, not(target_os = "espidf")))]
mod tests {
    use super::*;

    #[test]
    fn sim_init_latches_relay_idle_level() {
        init_peripherals(true).unwrap();
        assert!(sim_gpio_level(pins::PUMP_RELAY_GPIO));
        assert_eq!(adc1_read(pins::MOISTURE_ADC_CHANNEL), Ok(0));
    }
}
