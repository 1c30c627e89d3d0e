use drs_validator::frame::*;

#[test]
fn test_build_zero_body_frame_matches_device_query() {
    let frame = build_frame(0x02, &[]).unwrap();
    assert_eq!(frame.to_hex(), "7E07000002000021A67E");
    assert_eq!(frame.len(), 10);
    assert_eq!(frame.opcode(), 0x02);
    assert!(frame.body().is_empty());
    assert_eq!(frame.checksum(), 0xA621);
}

#[test]
fn test_build_frame_with_body() {
    let frame = build_frame(0x97, &[0x0A, 0x0E]).unwrap();
    assert_eq!(frame.to_hex(), "7E0700009700020A0E23E67E");
    assert_eq!(frame.body(), &[0x0A, 0x0E]);
    assert_eq!(frame.as_bytes()[6], 2);
}

#[test]
fn test_body_limit() {
    let max = vec![0u8; MAX_BODY_LEN];
    let frame = build_frame(0x35, &max).unwrap();
    assert_eq!(frame.len(), MAX_FRAME_LEN);

    let too_big = vec![0u8; MAX_BODY_LEN + 1];
    assert_eq!(
        build_frame(0x35, &too_big),
        Err(FrameError::FrameTooLarge { len: 256 })
    );
}

#[test]
fn test_validate_accepts_known_lengths() {
    assert!(validate_frame("7E07000002000021A67E"));
    assert!(validate_frame("7e07000002000021a67e"));
    // 22 chars, working mode
    assert!(validate_frame("7E070000800001016CE77E"));
    // 24 chars, attenuation
    assert!(validate_frame("7E070000E700020A0F84EB7E"));
}

#[test]
fn test_validate_rejects_structural_errors() {
    // wrong length
    assert!(!validate_frame("7E0700000200007E"));
    assert!(!validate_frame(""));
    // bad start flag
    assert!(!validate_frame("7F07000002000021A67E"));
    // bad end flag
    assert!(!validate_frame("7E07000002000021A67F"));
    // bad module function
    assert!(!validate_frame("7E08000002000021A67E"));
    // bad module address
    assert!(!validate_frame("7E07010002000021A67E"));
}

#[test]
fn test_validate_does_not_check_checksum() {
    // Structurally fine, checksum bytes are garbage.
    assert!(validate_frame("7E07000002000000007E"));
}

#[test]
fn test_response_payload_extraction() {
    let response = build_frame(0x02, &[0xC7, 0x01]).unwrap();
    assert_eq!(response_payload(response.as_bytes()).unwrap(), &[0xC7, 0x01]);

    let ten = build_frame(0x02, &[]).unwrap();
    assert!(response_payload(ten.as_bytes()).unwrap().is_empty());

    assert_eq!(
        response_payload(&[0x7E, 0x07, 0x00]),
        Err(FrameError::ResponseTooShort { len: 3 })
    );
}

#[test]
fn test_hex_helpers() {
    assert_eq!(encode_hex(&[0x7E, 0x0a, 0xff]), "7E0AFF");
    assert_eq!(decode_hex("7e 0a FF").unwrap(), vec![0x7E, 0x0A, 0xFF]);
    assert!(matches!(decode_hex("7E0"), Err(FrameError::InvalidHex(_))));
    assert!(matches!(decode_hex("+F"), Err(FrameError::InvalidHex(_))));
    assert!(matches!(decode_hex("ZZ"), Err(FrameError::InvalidHex(_))));
}

#[test]
fn test_crc_is_deterministic() {
    let data = [0x07, 0x00, 0x00, 0x80, 0x00, 0x01, 0x01];
    assert_eq!(crc16(&data), crc16(&data));
    assert_eq!(crc16(&data), 0xE76C);
    assert_eq!(crc16(&[]), 0);
}
