use drs_validator::frame::encode_hex;
use drs_validator::mock::{MockReply, MockResponseStore, GENERIC_SET_ACK_HEX};
use drs_validator::registry::{CommandRegistry, DeviceRole};

#[test]
fn test_mock_store_replies() {
    let store = MockResponseStore::global();
    let reply = store.reply(DeviceRole::Master, "temperature", false);
    assert!(matches!(reply, MockReply::Recorded(ref bytes) if bytes.len() == 12));

    assert_eq!(store.reply(DeviceRole::Remote, "unknown", false), MockReply::Missing);
    match store.reply(DeviceRole::Master, "set_channel_frequencies_p25", true) {
        MockReply::GenericAck(bytes) => {
            assert_eq!(encode_hex(&bytes), GENERIC_SET_ACK_HEX)
        }
        other => panic!("expected generic ack, got {:?}", other),
    }

    // Remote units have no port 3 answer.
    assert!(store.get_response(DeviceRole::Remote, "optical_port_devices_connected_3").is_none());
    assert!(store.get_response(DeviceRole::Master, "optical_port_devices_connected_3").is_some());
}

#[test]
fn test_mock_store_answers_raw_requests() {
    let store = MockResponseStore::global();
    let registry = CommandRegistry::global();
    let request = [0x7E, 0x07, 0x00, 0x00, 0x97, 0x00, 0x00, 0xE8, 0x35, 0x7E];
    let reply = store.answer_request(registry, DeviceRole::Master, &request).unwrap();
    assert_eq!(&reply[7..9], &[0x0A, 0x0E]);

    assert!(store.answer_request(registry, DeviceRole::Master, &[0x00, 0x01]).is_none());
    assert!(store.reply_for_opcode(registry, DeviceRole::Master, 0xAA).is_none());
}
