//! Response decoding into engineering values.
//!
//! Every GET command in the registry has a [`DecoderKind`] that reads
//! fixed-width fields out of the response payload. Names without a mapping go
//! through a name-based heuristic. Decoding never fails outright: short or
//! malformed responses come back as a `decode_error` entry next to the raw hex,
//! so one bad reply never stops a batch.

use crate::frame::{encode_hex, response_payload, COMMAND_OFFSET};
use crate::registry::CommandRegistry;
use crate::set_commands::{ChannelFrequency, WorkingMode, CHANNEL_COUNT};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const KEY_DECODE_ERROR: &str = "decode_error";
pub const KEY_RAW_HEX: &str = "raw_hex";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DecodedValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<DecodedValue>),
}

impl DecodedValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DecodedValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DecodedValue::Float(v) => Some(*v),
            DecodedValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DecodedValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DecodedValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl core::fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DecodedValue::Bool(v) => write!(f, "{}", v),
            DecodedValue::Int(v) => write!(f, "{}", v),
            DecodedValue::Float(v) => write!(f, "{}", v),
            DecodedValue::Text(v) => write!(f, "{}", v),
            DecodedValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<bool> for DecodedValue {
    fn from(v: bool) -> Self {
        DecodedValue::Bool(v)
    }
}

impl From<i64> for DecodedValue {
    fn from(v: i64) -> Self {
        DecodedValue::Int(v)
    }
}

impl From<u16> for DecodedValue {
    fn from(v: u16) -> Self {
        DecodedValue::Int(i64::from(v))
    }
}

impl From<u8> for DecodedValue {
    fn from(v: u8) -> Self {
        DecodedValue::Int(i64::from(v))
    }
}

impl From<usize> for DecodedValue {
    fn from(v: usize) -> Self {
        DecodedValue::Int(v as i64)
    }
}

impl From<f64> for DecodedValue {
    fn from(v: f64) -> Self {
        DecodedValue::Float(v)
    }
}

impl From<&str> for DecodedValue {
    fn from(v: &str) -> Self {
        DecodedValue::Text(v.to_string())
    }
}

impl From<String> for DecodedValue {
    fn from(v: String) -> Self {
        DecodedValue::Text(v)
    }
}

pub type DecodedValues = BTreeMap<String, DecodedValue>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecoderKind {
    DeviceId,
    Temperature,
    InputOutputPower,
    DevicesConnected,
    OpticalPortStatus,
    OpticalPortSwitch,
    ChannelSwitch,
    ChannelFrequencies,
    CentralFrequency,
    SubbandBandwidth,
    WorkingMode,
    Attenuation,
}

impl DecoderKind {
    pub fn method_name(self) -> &'static str {
        match self {
            DecoderKind::DeviceId => "decode_device_id",
            DecoderKind::Temperature => "decode_temperature",
            DecoderKind::InputOutputPower => "decode_input_output_power",
            DecoderKind::DevicesConnected => "decode_devices_connected",
            DecoderKind::OpticalPortStatus => "decode_optical_port_status",
            DecoderKind::OpticalPortSwitch => "decode_optical_port_switch",
            DecoderKind::ChannelSwitch => "decode_channel_switch",
            DecoderKind::ChannelFrequencies => "decode_channel_frequencies",
            DecoderKind::CentralFrequency => "decode_central_frequency",
            DecoderKind::SubbandBandwidth => "decode_subband_bandwidth",
            DecoderKind::WorkingMode => "decode_working_mode",
            DecoderKind::Attenuation => "decode_attenuation",
        }
    }

    /// Bytes of payload the decoder reads.
    pub fn min_payload_len(self) -> usize {
        match self {
            DecoderKind::DeviceId
            | DecoderKind::Temperature
            | DecoderKind::DevicesConnected
            | DecoderKind::ChannelSwitch
            | DecoderKind::Attenuation => 2,
            DecoderKind::InputOutputPower
            | DecoderKind::CentralFrequency
            | DecoderKind::SubbandBandwidth
            | DecoderKind::ChannelFrequencies => 4,
            DecoderKind::OpticalPortSwitch | DecoderKind::WorkingMode => 1,
            DecoderKind::OpticalPortStatus => 0,
        }
    }
}

/// Decoder mapping for GET commands, keyed by command name.
pub fn decoder_for(command: &str) -> Option<DecoderKind> {
    let kind = match command {
        "device_id" => DecoderKind::DeviceId,
        "temperature" => DecoderKind::Temperature,
        "input_and_output_power" => DecoderKind::InputOutputPower,
        "optical_port_devices_connected_1"
        | "optical_port_devices_connected_2"
        | "optical_port_devices_connected_3"
        | "optical_port_devices_connected_4" => DecoderKind::DevicesConnected,
        "optical_port_status" => DecoderKind::OpticalPortStatus,
        "optical_port_switch" => DecoderKind::OpticalPortSwitch,
        "channel_switch" => DecoderKind::ChannelSwitch,
        "channel_frequency_configuration" => DecoderKind::ChannelFrequencies,
        "central_frequency_point" => DecoderKind::CentralFrequency,
        "subband_bandwidth" => DecoderKind::SubbandBandwidth,
        "broadband_switching" => DecoderKind::WorkingMode,
        "datt" => DecoderKind::Attenuation,
        _ => return None,
    };
    Some(kind)
}

pub fn has_decoder(command: &str) -> bool {
    decoder_for(command).is_some()
}

/// Decode a complete response frame for `command`. Registered SET commands
/// yield their acknowledgement record.
pub fn decode_response(command: &str, response: &[u8]) -> DecodedValues {
    if let Some(kind) = decoder_for(command) {
        return decode_mapped(kind, response);
    }
    if CommandRegistry::global().is_set_command(command) {
        return set_acknowledgement(command);
    }
    decode_unmapped(command, response)
}

/// Decode a bare payload with the mapped decoder, skipping frame handling.
/// Returns `None` for unmapped commands.
pub fn decode_payload(command: &str, payload: &[u8]) -> Option<DecodedValues> {
    let kind = decoder_for(command)?;
    let mut values = DecodedValues::new();
    if let Err(message) = decode_fields(kind, payload, &mut values) {
        values.insert(KEY_DECODE_ERROR.into(), message.into());
        values.insert(KEY_RAW_HEX.into(), encode_hex(payload).into());
    }
    Some(values)
}

/// Acknowledgement record for a SET command. The device reply carries no
/// physical value, so nothing is read from it.
pub fn set_acknowledgement(command: &str) -> DecodedValues {
    let mut values = DecodedValues::new();
    values.insert("set_command_ack".into(), true.into());
    values.insert("configuration_applied".into(), true.into());
    values.insert("set_status".into(), "success".into());
    values.insert("set_operation".into(), operation_label(command).into());
    values
}

/// `remote_set_attenuation_12_18` becomes `Attenuation 12 18`.
pub fn operation_label(command: &str) -> String {
    let trimmed = command
        .strip_prefix("remote_set_")
        .or_else(|| command.strip_prefix("set_"))
        .unwrap_or(command);

    trimmed
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn decode_mapped(kind: DecoderKind, response: &[u8]) -> DecodedValues {
    let mut values = DecodedValues::new();

    let payload = match response_payload(response) {
        Ok(payload) => payload,
        Err(e) => return decode_failure(e.to_string(), response),
    };

    if let Err(message) = decode_fields(kind, payload, &mut values) {
        return decode_failure(message, response);
    }

    values.insert("decoder".into(), kind.method_name().into());
    values.insert(
        "command_hex".into(),
        format!("0x{:02x}", response[COMMAND_OFFSET]).into(),
    );
    values.insert("frame_length".into(), response.len().into());
    values.insert("body_length".into(), payload.len().into());
    values
}

fn decode_fields(kind: DecoderKind, payload: &[u8], values: &mut DecodedValues) -> Result<(), String> {
    let needed = kind.min_payload_len();
    if payload.len() < needed {
        return Err(format!(
            "payload of {} bytes, {} needs {}",
            payload.len(),
            kind.method_name(),
            needed
        ));
    }

    match kind {
        DecoderKind::DeviceId => {
            values.insert("device_id".into(), le_u16(payload, 0).into());
        }
        DecoderKind::Temperature => {
            // Tenths of a degree Celsius.
            let raw = le_i16(payload, 0);
            values.insert("temperature".into(), round2(f64::from(raw) / 10.0).into());
        }
        DecoderKind::InputOutputPower => {
            values.insert("input_power_dbm".into(), power_dbm(payload, 0).into());
            values.insert("output_power_dbm".into(), power_dbm(payload, 2).into());
        }
        DecoderKind::DevicesConnected => {
            values.insert("devices_connected".into(), le_u16(payload, 0).into());
        }
        DecoderKind::OpticalPortStatus => {
            values.insert("port_data".into(), encode_hex(payload).into());
            values.insert("data_length".into(), payload.len().into());
        }
        DecoderKind::OpticalPortSwitch => {
            values.insert("optical_port_enabled".into(), (payload[0] != 0).into());
            values.insert("optical_port_state".into(), payload[0].into());
        }
        DecoderKind::ChannelSwitch => {
            let mask = le_u16(payload, 0);
            let active: Vec<DecodedValue> = (0..CHANNEL_COUNT)
                .filter(|ch| mask & (1 << ch) != 0)
                .map(|ch| DecodedValue::from(ch + 1))
                .collect();
            values.insert("channel_mask".into(), format!("0x{:04X}", mask).into());
            values.insert("active_channel_count".into(), active.len().into());
            values.insert("active_channels".into(), DecodedValue::List(active));
        }
        DecoderKind::ChannelFrequencies => {
            let freqs: Vec<DecodedValue> = payload
                .chunks_exact(4)
                .take(CHANNEL_COUNT)
                .map(|c| {
                    let freq = ChannelFrequency::from_wire([c[0], c[1], c[2], c[3]]);
                    DecodedValue::from(round4(freq.mhz()))
                })
                .collect();
            values.insert("channel_count".into(), freqs.len().into());
            values.insert("channel_frequencies_mhz".into(), DecodedValue::List(freqs));
        }
        DecoderKind::CentralFrequency => {
            let freq = ChannelFrequency::from_wire([payload[0], payload[1], payload[2], payload[3]]);
            values.insert("central_frequency_mhz".into(), round4(freq.mhz()).into());
        }
        DecoderKind::SubbandBandwidth => {
            values.insert("uplink_bandwidth_khz".into(), le_u16(payload, 0).into());
            values.insert("downlink_bandwidth_khz".into(), le_u16(payload, 2).into());
        }
        DecoderKind::WorkingMode => {
            let mode = WorkingMode::from_wire(payload[0]);
            values.insert("working_mode".into(), mode.label().into());
            values.insert("wideband".into(), (mode == WorkingMode::Wideband).into());
        }
        DecoderKind::Attenuation => {
            values.insert("uplink_attenuation_db".into(), payload[0].into());
            values.insert("downlink_attenuation_db".into(), payload[1].into());
        }
    }

    Ok(())
}

fn decode_unmapped(command: &str, response: &[u8]) -> DecodedValues {
    let mut values = DecodedValues::new();

    if command.contains("power") || command.contains("optical_port") {
        let payload = match response_payload(response) {
            Ok(payload) => payload,
            Err(e) => return decode_failure(e.to_string(), response),
        };

        if command.contains("power") {
            if payload.len() < 4 {
                return decode_failure(
                    format!("power payload of {} bytes, needs 4", payload.len()),
                    response,
                );
            }
            values.insert("input_power_dbm".into(), power_dbm(payload, 0).into());
            values.insert("output_power_dbm".into(), power_dbm(payload, 2).into());
        } else {
            values.insert("port_data".into(), encode_hex(payload).into());
            values.insert("data_length".into(), payload.len().into());
        }
        values.insert("decoder".into(), "heuristic".into());
        return values;
    }

    values.insert(KEY_RAW_HEX.into(), encode_hex(response).into());
    values.insert("length".into(), response.len().into());
    values.insert("decoder".into(), "generic".into());
    values
}

fn decode_failure(message: String, response: &[u8]) -> DecodedValues {
    let mut values = DecodedValues::new();
    values.insert(KEY_DECODE_ERROR.into(), message.into());
    values.insert(KEY_RAW_HEX.into(), encode_hex(response).into());
    values
}

fn le_u16(payload: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([payload[offset], payload[offset + 1]])
}

fn le_i16(payload: &[u8], offset: usize) -> i16 {
    i16::from_le_bytes([payload[offset], payload[offset + 1]])
}

/// 1/256 dBm steps, two's complement.
fn power_dbm(payload: &[u8], offset: usize) -> f64 {
    round2(f64::from(le_i16(payload, offset)) / 256.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
