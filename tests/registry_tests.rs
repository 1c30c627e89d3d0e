use drs_validator::decoder::has_decoder;
use drs_validator::frame::{validate_frame, VALID_HEX_LENGTHS};
use drs_validator::registry::*;

#[test]
fn test_table_sizes() {
    let registry = CommandRegistry::global();
    assert_eq!(registry.definitions(Category::MasterGet).len(), 15);
    assert_eq!(registry.definitions(Category::RemoteGet).len(), 13);
    assert_eq!(registry.definitions(Category::MasterSet).len(), 11);
    assert_eq!(registry.definitions(Category::RemoteSet).len(), 4);
    assert_eq!(registry.role_size(DeviceRole::Master), 26);
    assert_eq!(registry.role_size(DeviceRole::Remote), 17);
}

#[test]
fn test_every_get_frame_is_a_valid_query() {
    let registry = CommandRegistry::global();
    for category in [Category::MasterGet, Category::RemoteGet] {
        for def in registry.definitions(category) {
            assert_eq!(def.frame_hex.len(), 20, "{}", def.name);
            assert!(validate_frame(&def.frame_hex), "{}", def.name);
            assert!(!def.is_set_command);
            assert!(def.decoder.is_some(), "{} has no decoder", def.name);
            assert!(has_decoder(def.name));
            // opcode is byte 4 of the frame
            assert_eq!(&def.frame_hex[8..10], format!("{:02X}", def.opcode));
        }
    }
}

#[test]
fn test_every_set_frame_is_accepted_by_validation() {
    let registry = CommandRegistry::global();
    for category in [Category::MasterSet, Category::RemoteSet] {
        for def in registry.definitions(category) {
            assert!(def.is_set_command, "{}", def.name);
            assert!(def.decoder.is_none());
            assert!(VALID_HEX_LENGTHS.contains(&def.frame_hex.len()), "{}", def.name);
            assert!(validate_frame(&def.frame_hex), "{}", def.name);
        }
    }
}

#[test]
fn test_master_get_order() {
    let names = CommandRegistry::global().all_command_names(Category::MasterGet);
    assert_eq!(names[0], "optical_port_devices_connected_1");
    assert_eq!(names[4], "input_and_output_power");
    assert_eq!(names[12], "temperature");
    assert_eq!(names[14], "datt");
}

#[test]
fn test_remote_excludes_ports_three_and_four_and_channel_programming() {
    let registry = CommandRegistry::global();
    let names = registry.role_command_names(DeviceRole::Remote);
    assert!(!names.contains(&"optical_port_devices_connected_3"));
    assert!(!names.contains(&"optical_port_devices_connected_4"));
    assert!(names.iter().filter(|n| n.starts_with("remote_set_")).count() == 4);
    assert!(!names.iter().any(|n| n.contains("channels") || n.contains("frequencies")));
}

#[test]
fn test_role_commands_list_queries_before_sets() {
    let names = CommandRegistry::global().role_command_names(DeviceRole::Master);
    let first_set = names.iter().position(|n| n.starts_with("set_")).unwrap();
    assert_eq!(first_set, 15);
    assert!(names[first_set..].iter().all(|n| n.starts_with("set_")));
}

#[test]
fn test_lookups() {
    let registry = CommandRegistry::global();
    assert_eq!(registry.frame(Category::MasterGet, "device_id"), Some("7E070000970000E8357E"));
    assert_eq!(registry.frame(Category::MasterGet, "no_such_command"), None);
    assert_eq!(registry.opcode_of("temperature"), Some(0x02));
    assert_eq!(registry.opcode_of("set_working_mode_wideband"), Some(0x80));
    assert_eq!(registry.opcode_of("remote_set_attenuation_8_16"), Some(0xE7));
    assert_eq!(registry.opcode_of("bogus"), None);
    assert!(registry.is_set_command("set_attenuation_10_15"));
    assert!(registry.is_set_command("remote_set_attenuation_8_16"));
    assert!(!registry.is_set_command("temperature"));
    assert!(!registry.is_set_command("set_bogus"));
}

#[test]
fn test_resolve_falls_back_to_set_table() {
    let registry = CommandRegistry::global();
    let get = registry.resolve(DeviceRole::Master, "temperature").unwrap();
    assert_eq!(get.category, Category::MasterGet);

    let set = registry.resolve(DeviceRole::Master, "set_channels_all_on").unwrap();
    assert_eq!(set.category, Category::MasterSet);
    assert_eq!(set.frame_hex.len(), 52);

    // Master SET commands are not visible to a remote unit.
    assert!(registry.resolve(DeviceRole::Remote, "set_channels_all_on").is_none());
    assert!(registry.resolve(DeviceRole::Remote, "optical_port_devices_connected_3").is_none());
}

#[test]
fn test_legacy_channel_frequency_frame() {
    let registry = CommandRegistry::global();
    let def = registry
        .definition(Category::MasterSet, "set_channel_frequency_configuration")
        .unwrap();
    assert_eq!(def.frame_hex.len(), 148);
    // First channel carries 0x12345678 little-endian.
    assert_eq!(&def.frame_hex[14..22], "78563412");
}

#[test]
fn test_role_and_category_parsing() {
    assert_eq!(DeviceRole::parse("MASTER"), Some(DeviceRole::Master));
    assert_eq!(DeviceRole::parse(" remote "), Some(DeviceRole::Remote));
    assert_eq!(DeviceRole::parse("gateway"), None);
    assert_eq!(Category::MasterSet.role(), DeviceRole::Master);
    assert!(Category::RemoteSet.is_set());
    assert_eq!(Category::RemoteGet.to_string(), "REMOTE_GET");
}
