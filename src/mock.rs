//! Canned device answers used by mock batches and the simulator.

use crate::frame::{decode_hex, Frame, FrameError, COMMAND_OFFSET, START_FLAG};
use crate::registry::{CommandRegistry, DeviceRole};
use crate::set_commands::{FrequencyPlan, CHANNEL_COUNT};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Reply sent for a SET command with no recorded acknowledgement.
pub const GENERIC_SET_ACK_HEX: &str = "7E0700000000007E";

const ACK_WORKING_MODE: &str = "7E070000800000C2D37E";
const ACK_ATTENUATION: &str = "7E07000000E700002F427E";
const ACK_CHANNEL_ACTIVATION: &str = "7E070000410000A1CA7E";
const ACK_CHANNEL_FREQUENCIES: &str = "7E070000350000D5EE7E";

const MASTER_SET_ACKS: [(&str, &str); 8] = [
    ("set_working_mode_wideband", ACK_WORKING_MODE),
    ("set_working_mode_channel", ACK_WORKING_MODE),
    ("set_attenuation_10_15", ACK_ATTENUATION),
    ("set_attenuation_5_20", ACK_ATTENUATION),
    ("set_channels_all_on", ACK_CHANNEL_ACTIVATION),
    ("set_channels_all_off", ACK_CHANNEL_ACTIVATION),
    ("set_channels_first_8_on", ACK_CHANNEL_ACTIVATION),
    ("set_channel_frequencies_vhf", ACK_CHANNEL_FREQUENCIES),
];

const REMOTE_SET_ACKS: [(&str, &str); 4] = [
    ("remote_set_working_mode_wideband", ACK_WORKING_MODE),
    ("remote_set_working_mode_channel", ACK_WORKING_MODE),
    ("remote_set_attenuation_12_18", ACK_ATTENUATION),
    ("remote_set_attenuation_8_16", ACK_ATTENUATION),
];

/// Payload a healthy unit returns for each query.
pub fn canned_payload(command: &str) -> Option<Vec<u8>> {
    let payload = match command {
        "device_id" => vec![0x0A, 0x0E],
        "temperature" => vec![0xC7, 0x01],
        "input_and_output_power" => vec![0x80, 0xE6, 0x40, 0x25],
        "optical_port_devices_connected_1" => vec![0x03, 0x00],
        "optical_port_devices_connected_2" => vec![0x02, 0x00],
        "optical_port_devices_connected_3" => vec![0x01, 0x00],
        "optical_port_devices_connected_4" => vec![0x00, 0x00],
        "optical_port_status" => vec![0x03],
        "optical_port_switch" => vec![0x01],
        "channel_switch" => vec![0x0F, 0x00],
        "central_frequency_point" => vec![0x40, 0xE2, 0x01, 0x00],
        "subband_bandwidth" => vec![0xE8, 0x03, 0xF4, 0x01],
        "broadband_switching" => vec![0x01],
        "datt" => vec![0x0A, 0x0F],
        "channel_frequency_configuration" => {
            let mut body = Vec::with_capacity(CHANNEL_COUNT * 4);
            for freq in FrequencyPlan::Vhf.frequencies() {
                body.extend_from_slice(&freq.to_wire());
            }
            body
        }
        _ => return None,
    };
    Some(payload)
}

/// Response frame for a query: the request header echoed with the payload.
pub fn canned_query_response(opcode: u8, command: &str) -> Option<Result<Frame, FrameError>> {
    canned_payload(command).map(|payload| Frame::build(opcode, &payload))
}

#[derive(Debug, Clone, Default)]
struct RoleResponses {
    get: HashMap<String, Vec<u8>>,
    set: HashMap<String, Vec<u8>>,
}

/// What the store holds for a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockReply {
    Recorded(Vec<u8>),
    /// SET command without a recorded acknowledgement.
    GenericAck(Vec<u8>),
    /// GET command without a canned response.
    Missing,
}

static GLOBAL_STORE: Lazy<Arc<MockResponseStore>> =
    Lazy::new(|| Arc::new(MockResponseStore::from_registry(CommandRegistry::global())));

#[derive(Debug, Clone, Default)]
pub struct MockResponseStore {
    master: RoleResponses,
    remote: RoleResponses,
}

impl MockResponseStore {
    /// Store with no recorded answers; every GET misses and every SET gets the generic ack.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_registry(registry: &CommandRegistry) -> Self {
        let mut store = Self::default();

        for role in [DeviceRole::Master, DeviceRole::Remote] {
            for def in registry.definitions(role.get_category()) {
                match canned_query_response(def.opcode, def.name) {
                    Some(Ok(frame)) => store.insert_get(role, def.name, frame.as_bytes().to_vec()),
                    Some(Err(e)) => {
                        warn!(command = def.name, error = %e, "Canned response did not encode")
                    }
                    None => {}
                }
            }
        }

        let acks = [
            (DeviceRole::Master, &MASTER_SET_ACKS[..]),
            (DeviceRole::Remote, &REMOTE_SET_ACKS[..]),
        ];
        for (role, table) in acks {
            for &(name, hex) in table {
                match decode_hex(hex) {
                    Ok(bytes) => store.insert_set(role, name, bytes),
                    Err(e) => warn!(command = name, error = %e, "Bad canned acknowledgement"),
                }
            }
        }

        store
    }

    /// Shared store seeded from the global registry.
    pub fn global() -> Arc<MockResponseStore> {
        Arc::clone(&GLOBAL_STORE)
    }

    fn role(&self, role: DeviceRole) -> &RoleResponses {
        match role {
            DeviceRole::Master => &self.master,
            DeviceRole::Remote => &self.remote,
        }
    }

    fn role_mut(&mut self, role: DeviceRole) -> &mut RoleResponses {
        match role {
            DeviceRole::Master => &mut self.master,
            DeviceRole::Remote => &mut self.remote,
        }
    }

    pub fn insert_get(&mut self, role: DeviceRole, command: &str, response: Vec<u8>) {
        self.role_mut(role).get.insert(command.to_string(), response);
    }

    pub fn insert_set(&mut self, role: DeviceRole, command: &str, response: Vec<u8>) {
        self.role_mut(role).set.insert(command.to_string(), response);
    }

    pub fn get_response(&self, role: DeviceRole, command: &str) -> Option<&[u8]> {
        self.role(role).get.get(command).map(Vec::as_slice)
    }

    pub fn set_response(&self, role: DeviceRole, command: &str) -> Option<&[u8]> {
        self.role(role).set.get(command).map(Vec::as_slice)
    }

    pub fn reply(&self, role: DeviceRole, command: &str, is_set_command: bool) -> MockReply {
        if is_set_command {
            match self.set_response(role, command) {
                Some(bytes) => MockReply::Recorded(bytes.to_vec()),
                None => MockReply::GenericAck(generic_set_ack()),
            }
        } else {
            self.get_response(role, command)
                .map_or(MockReply::Missing, |bytes| MockReply::Recorded(bytes.to_vec()))
        }
    }

    /// Answer for a raw request opcode, as a device of `role` would give it.
    /// Unknown opcodes get `None`.
    pub fn reply_for_opcode(&self, registry: &CommandRegistry, role: DeviceRole, opcode: u8) -> Option<Vec<u8>> {
        let def = registry.role_commands(role).find(|d| d.opcode == opcode)?;
        match self.reply(role, def.name, def.is_set_command) {
            MockReply::Recorded(bytes) | MockReply::GenericAck(bytes) => Some(bytes),
            MockReply::Missing => None,
        }
    }

    /// Answer a raw request frame. Requests too short to carry an opcode, or
    /// not starting with the flag byte, get `None`.
    pub fn answer_request(&self, registry: &CommandRegistry, role: DeviceRole, request: &[u8]) -> Option<Vec<u8>> {
        if request.first() != Some(&START_FLAG) {
            return None;
        }
        let opcode = *request.get(COMMAND_OFFSET)?;
        self.reply_for_opcode(registry, role, opcode)
    }
}

fn generic_set_ack() -> Vec<u8> {
    decode_hex(GENERIC_SET_ACK_HEX).unwrap_or_default()
}
