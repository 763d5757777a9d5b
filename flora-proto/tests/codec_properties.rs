//! Property tests for the response codec and the firmware gate.

use flora_proto::ble::{REALTIME_FIRMWARE_THRESHOLD, requires_realtime_enable};
use flora_proto::{DecodeError, FirmwareInfo, SensorReading};
use proptest::prelude::*;

proptest! {
    /// Any record of three or more bytes decodes: battery is byte 0 and the
    /// version is the text from offset 2 onward.
    #[test]
    fn firmware_fields(
        battery in any::<u8>(),
        separator in any::<u8>(),
        version in "[ -~]{1,16}",
    ) {
        let mut data = vec![battery, separator];
        data.extend_from_slice(version.as_bytes());

        let fw = FirmwareInfo::from_bytes(&data).unwrap();
        prop_assert_eq!(fw.battery, battery);
        prop_assert_eq!(fw.version, version);
    }

    #[test]
    fn firmware_short_is_malformed(data in proptest::collection::vec(any::<u8>(), 0..3)) {
        let is_malformed = matches!(
            FirmwareInfo::from_bytes(&data),
            Err(DecodeError::MalformedResponse { .. })
        );
        prop_assert!(is_malformed);
    }

    /// Any record of ten or more bytes decodes with the documented
    /// little-endian field layout.
    #[test]
    fn sensor_fields(data in proptest::collection::vec(any::<u8>(), 10..=20)) {
        let reading = SensorReading::from_bytes(&data).unwrap();

        let temperature = f64::from(i16::from_le_bytes([data[0], data[1]])) / 10.0;
        prop_assert_eq!(reading.temperature, temperature);
        prop_assert_eq!(reading.light, u16::from_le_bytes([data[3], data[4]]));
        prop_assert_eq!(reading.moisture, data[7]);
        prop_assert_eq!(reading.conductivity, u16::from_le_bytes([data[8], data[9]]));
    }

    #[test]
    fn sensor_short_is_malformed(data in proptest::collection::vec(any::<u8>(), 0..10)) {
        prop_assert_eq!(
            SensorReading::from_bytes(&data),
            Err(DecodeError::MalformedResponse {
                what: "sensor",
                expected: 10,
                actual: data.len(),
            })
        );
    }

    /// The gate is a plain string comparison against the threshold.
    #[test]
    fn gate_matches_string_order(version in "[0-9.]{0,8}") {
        prop_assert_eq!(
            requires_realtime_enable(&version),
            version.as_str() >= REALTIME_FIRMWARE_THRESHOLD
        );
    }
}
