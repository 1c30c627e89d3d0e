use drs_validator::decoder::*;
use drs_validator::frame::{build_frame, decode_hex};

fn response(opcode: u8, payload: &[u8]) -> Vec<u8> {
    build_frame(opcode, payload).unwrap().as_bytes().to_vec()
}

#[test]
fn test_device_id() {
    let values = decode_response("device_id", &response(0x97, &[0x0A, 0x0E]));
    assert_eq!(values["device_id"].as_i64(), Some(3594));
    assert_eq!(values["decoder"].as_str(), Some("decode_device_id"));
    assert_eq!(values["command_hex"].as_str(), Some("0x97"));
    assert_eq!(values["frame_length"].as_i64(), Some(12));
    assert_eq!(values["body_length"].as_i64(), Some(2));
}

#[test]
fn test_temperature() {
    let values = decode_response("temperature", &response(0x02, &[0xC7, 0x01]));
    assert_eq!(values["temperature"].as_f64(), Some(45.5));

    let cold = decode_response("temperature", &response(0x02, &[0xF6, 0xFF]));
    assert_eq!(cold["temperature"].as_f64(), Some(-1.0));
}

#[test]
fn test_power_sign_extension() {
    let values = decode_response("input_and_output_power", &response(0xF3, &[0x80, 0xE6, 0x40, 0x25]));
    assert_eq!(values["input_power_dbm"].as_f64(), Some(-25.5));
    assert_eq!(values["output_power_dbm"].as_f64(), Some(37.25));
    assert!(values["input_power_dbm"].as_f64().unwrap() < 0.0);
}

#[test]
fn test_channel_switch_mask() {
    let values = decode_response("channel_switch", &response(0x42, &[0x0F, 0x00]));
    assert_eq!(values["channel_mask"].as_str(), Some("0x000F"));
    assert_eq!(values["active_channel_count"].as_i64(), Some(4));
    assert_eq!(
        values["active_channels"],
        DecodedValue::List((1..=4i64).map(DecodedValue::Int).collect())
    );
}

#[test]
fn test_frequencies_and_bandwidth() {
    let central = decode_response("central_frequency_point", &response(0xEB, &[0x40, 0xE2, 0x01, 0x00]));
    assert_eq!(central["central_frequency_mhz"].as_f64(), Some(12.3456));

    let bw = decode_response("subband_bandwidth", &response(0xED, &[0xE8, 0x03, 0xF4, 0x01]));
    assert_eq!(bw["uplink_bandwidth_khz"].as_i64(), Some(1000));
    assert_eq!(bw["downlink_bandwidth_khz"].as_i64(), Some(500));
}

#[test]
fn test_switches_and_attenuation() {
    let mode = decode_response("broadband_switching", &response(0x81, &[0x01]));
    assert_eq!(mode["working_mode"].as_str(), Some("wideband"));
    assert_eq!(mode["wideband"].as_bool(), Some(true));

    let port = decode_response("optical_port_switch", &response(0x91, &[0x00]));
    assert_eq!(port["optical_port_enabled"].as_bool(), Some(false));

    let datt = decode_response("datt", &response(0x09, &[0x0A, 0x0F]));
    assert_eq!(datt["uplink_attenuation_db"].as_i64(), Some(10));
    assert_eq!(datt["downlink_attenuation_db"].as_i64(), Some(15));

    let devices = decode_response("optical_port_devices_connected_3", &response(0xFA, &[0x03, 0x00]));
    assert_eq!(devices["devices_connected"].as_i64(), Some(3));
}

#[test]
fn test_optical_port_status_passthrough() {
    let values = decode_response("optical_port_status", &response(0x9A, &[0x03, 0xAB]));
    assert_eq!(values["port_data"].as_str(), Some("03AB"));
    assert_eq!(values["data_length"].as_i64(), Some(2));
}

#[test]
fn test_short_input_never_panics() {
    // shorter than the 9 byte minimum
    let values = decode_response("device_id", &[0x7E, 0x07]);
    assert!(values.contains_key(KEY_DECODE_ERROR));
    assert_eq!(values[KEY_RAW_HEX].as_str(), Some("7E07"));

    // valid frame, payload too short for the decoder
    let values = decode_response("input_and_output_power", &response(0xF3, &[0x01]));
    assert!(values.contains_key(KEY_DECODE_ERROR));

    let values = decode_response("temperature", &[]);
    assert!(values.contains_key(KEY_DECODE_ERROR));
}

#[test]
fn test_unmapped_heuristics() {
    let power = decode_response("reflected_power", &response(0x55, &[0x00, 0x01, 0x00, 0x02]));
    assert_eq!(power["input_power_dbm"].as_f64(), Some(1.0));
    assert_eq!(power["output_power_dbm"].as_f64(), Some(2.0));
    assert_eq!(power["decoder"].as_str(), Some("heuristic"));

    let port = decode_response("optical_port_alarm", &response(0x56, &[0x07]));
    assert_eq!(port["port_data"].as_str(), Some("07"));

    let generic = decode_response("mystery", &[0x01, 0x02]);
    assert_eq!(generic[KEY_RAW_HEX].as_str(), Some("0102"));
    assert_eq!(generic["length"].as_i64(), Some(2));
    assert_eq!(generic["decoder"].as_str(), Some("generic"));
}

#[test]
fn test_decode_payload_without_frame() {
    let values = decode_payload("device_id", &[0x0A, 0x0E]).unwrap();
    assert_eq!(values["device_id"].as_i64(), Some(3594));
    assert!(!values.contains_key("decoder"));
    assert!(decode_payload("mystery", &[0x00]).is_none());
}

#[test]
fn test_set_acknowledgement() {
    let ack = set_acknowledgement("remote_set_attenuation_12_18");
    assert_eq!(ack["set_command_ack"].as_bool(), Some(true));
    assert_eq!(ack["configuration_applied"].as_bool(), Some(true));
    assert_eq!(ack["set_operation"].as_str(), Some("Attenuation 12 18"));
    assert_eq!(operation_label("set_working_mode_wideband"), "Working Mode Wideband");
}

#[test]
fn test_set_reply_decodes_to_acknowledgement() {
    let ack = decode_hex("7E07000000E700002F427E").unwrap();
    let values = decode_response("set_attenuation_10_15", &ack);
    assert_eq!(values["set_command_ack"].as_bool(), Some(true));
    assert_eq!(values["set_status"].as_str(), Some("success"));
    assert_eq!(values["set_operation"].as_str(), Some("Attenuation 10 15"));
    assert!(!values.contains_key("raw_hex"));

    let remote = decode_response("remote_set_working_mode_channel", &ack);
    assert_eq!(remote["set_operation"].as_str(), Some("Working Mode Channel"));

    // An unregistered set_ name still falls through to the generic record.
    let unknown = decode_response("set_flux_capacitor", &ack);
    assert_eq!(unknown["decoder"].as_str(), Some("generic"));
    assert!(!unknown.contains_key("set_command_ack"));
}

#[test]
fn test_decoder_mapping() {
    assert_eq!(decoder_for("datt"), Some(DecoderKind::Attenuation));
    assert_eq!(decoder_for("broadband_switching"), Some(DecoderKind::WorkingMode));
    assert_eq!(decoder_for("set_working_mode_channel"), None);
}
