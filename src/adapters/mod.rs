//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements    | Connects to                  |
//! |-------------|---------------|------------------------------|
//! | `hardware`  | SensorPort    | moisture ADC, DHT11          |
//! |             | ActuatorPort  | pump relay GPIO              |
//! | `display`   | DisplayPort   | 16x2 LCD over I²C            |
//! | `log_sink`  | EventSink     | Serial log output            |
//! | `time`      | ClockPort     | ESP32 system timer           |

pub mod display;
pub mod hardware;
pub mod log_sink;
pub mod time;
