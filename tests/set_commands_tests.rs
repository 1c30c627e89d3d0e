use drs_validator::frame::{validate_frame, FrameError, VALID_HEX_LENGTHS};
use drs_validator::set_commands::*;

#[test]
fn test_working_mode_frames() {
    let wideband = working_mode(WorkingMode::Wideband).unwrap();
    assert_eq!(wideband.to_hex(), "7E070000800001016CE77E");
    assert_eq!(wideband.to_hex().len(), 22);

    let channel = working_mode(WorkingMode::Channel).unwrap();
    assert_eq!(channel.to_hex(), "7E070000800001004DF77E");
    assert!(validate_frame(&channel.to_hex()));
}

#[test]
fn test_attenuation_frame_and_limits() {
    let frame = attenuation(10, 15, DeviceType::Dmu).unwrap();
    assert_eq!(frame.to_hex(), "7E070000E700020A0F84EB7E");

    assert!(attenuation(30, 30, DeviceType::Dmu).is_ok());
    assert_eq!(
        attenuation(31, 0, DeviceType::Dmu),
        Err(FrameError::AttenuationOutOfRange { value: 31, max: 30, device: "dmu" })
    );

    assert!(attenuation(20, 20, DeviceType::Dru).is_ok());
    assert_eq!(
        attenuation(5, 21, DeviceType::Dru),
        Err(FrameError::AttenuationOutOfRange { value: 21, max: 20, device: "dru" })
    );
}

#[test]
fn test_channel_activation_mask() {
    let mut flags = [false; CHANNEL_COUNT];
    for flag in flags.iter_mut().take(8) {
        *flag = true;
    }
    let frame = channel_activation(&flags).unwrap();
    assert_eq!(
        frame.to_hex(),
        "7E07000041001001010101010101010000000000000000C3777E"
    );
    assert_eq!(frame.to_hex().len(), 52);

    assert_eq!(
        channel_activation(&[true; 4]),
        Err(FrameError::ChannelCount { expected: 16, actual: 4 })
    );
}

#[test]
fn test_frequency_plans_span_their_band() {
    for plan in [FrequencyPlan::Vhf, FrequencyPlan::P25, FrequencyPlan::Tetra400] {
        let (low, high) = plan.band_hz();
        let freqs = plan.frequencies();
        assert_eq!(freqs[0].hz(), low);
        assert!(freqs[CHANNEL_COUNT - 1].hz() <= high);
        assert!(freqs.windows(2).all(|w| w[0] < w[1]), "{:?} not ascending", plan);

        let frame = frequency_plan(plan).unwrap();
        assert_eq!(frame.to_hex().len(), 148);
        assert!(validate_frame(&frame.to_hex()));
        assert_eq!(frame.opcode(), OP_SET_CHANNEL_FREQUENCIES);
    }
}

#[test]
fn test_vhf_plan_endpoints() {
    let freqs = FrequencyPlan::Vhf.frequencies();
    assert_eq!(freqs[0].mhz(), 145.0);
    assert_eq!(freqs[15].mhz(), 160.0);
    assert_eq!(freqs[1].mhz(), 146.0);
}

#[test]
fn test_channel_frequency_wire_format() {
    let freq = ChannelFrequency::from_raw(123_456);
    assert_eq!(freq.to_wire(), [0x40, 0xE2, 0x01, 0x00]);
    assert_eq!(freq.mhz(), 12.3456);
    assert_eq!(ChannelFrequency::from_wire([0x40, 0xE2, 0x01, 0x00]), freq);
    assert_eq!(ChannelFrequency::from_hz(12_345_699).raw(), 123_456);
}

#[test]
fn test_single_channel_frame_is_builder_only() {
    let frame = single_channel_frequency(3, ChannelFrequency::from_hz(123_456_000)).unwrap();
    assert_eq!(frame.to_hex(), "7E0700003700050380D61200B76A7E");
    assert_eq!(frame.to_hex().len(), 30);
    assert!(!VALID_HEX_LENGTHS.contains(&30));
    assert!(!validate_frame(&frame.to_hex()));

    assert_eq!(
        single_channel_frequency(16, ChannelFrequency::from_raw(0)),
        Err(FrameError::ChannelOutOfRange(16))
    );
}

#[test]
fn test_bulk_frequencies_require_sixteen_entries() {
    let freqs = vec![ChannelFrequency::from_raw(1); 15];
    assert_eq!(
        channel_frequencies(&freqs),
        Err(FrameError::ChannelCount { expected: 16, actual: 15 })
    );
}
