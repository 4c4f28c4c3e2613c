//! Fuzz target: `dht11::decode_frame`
//!
//! Feeds arbitrary 5-byte frames to the DHT11 decoder and asserts that
//! it never panics and that every accepted frame is in the sensor's
//! physical range with a valid checksum.
//!
//! cargo fuzz run fuzz_dht11_frame

#![no_main]

use irrigator::sensors::dht11::decode_frame;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: [u8; 5]| {
    if let Ok(m) = decode_frame(data) {
        let sum = data[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
        assert_eq!(sum, data[4], "accepted a frame with a bad checksum");
        assert!(m.temperature.is_finite());
        assert!((-20.0..=60.0).contains(&m.temperature));
        assert!((0.0..=100.0).contains(&m.humidity));
    }
});
