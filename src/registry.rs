//! Command registry: name → (category, opcode, frame, decoder).
//!
//! The GET tables are the pre-built query frames captured from the units. SET
//! tables are synthesised once through [`crate::set_commands`]. Everything is
//! built on first use and never mutated, so a single [`CommandRegistry`] is
//! shared by every batch in the process.

use crate::decoder::{decoder_for, DecoderKind};
use crate::frame::{Frame, FrameError};
use crate::set_commands::{
    self, ChannelFrequency, DeviceType, FrequencyPlan, WorkingMode, CHANNEL_COUNT,
};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Device role a batch is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceRole {
    Master,
    Remote,
}

impl DeviceRole {
    pub fn get_category(self) -> Category {
        match self {
            DeviceRole::Master => Category::MasterGet,
            DeviceRole::Remote => Category::RemoteGet,
        }
    }

    pub fn set_category(self) -> Category {
        match self {
            DeviceRole::Master => Category::MasterSet,
            DeviceRole::Remote => Category::RemoteSet,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeviceRole::Master => "master",
            DeviceRole::Remote => "remote",
        }
    }

    /// Case-insensitive; `None` for anything but master/remote.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "master" => Some(DeviceRole::Master),
            "remote" => Some(DeviceRole::Remote),
            _ => None,
        }
    }
}

impl core::fmt::Display for DeviceRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    MasterGet,
    RemoteGet,
    MasterSet,
    RemoteSet,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::MasterGet,
        Category::RemoteGet,
        Category::MasterSet,
        Category::RemoteSet,
    ];

    pub fn role(self) -> DeviceRole {
        match self {
            Category::MasterGet | Category::MasterSet => DeviceRole::Master,
            Category::RemoteGet | Category::RemoteSet => DeviceRole::Remote,
        }
    }

    pub fn is_set(self) -> bool {
        matches!(self, Category::MasterSet | Category::RemoteSet)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::MasterGet => "MASTER_GET",
            Category::RemoteGet => "REMOTE_GET",
            Category::MasterSet => "MASTER_SET",
            Category::RemoteSet => "REMOTE_SET",
        }
    }
}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub category: Category,
    pub opcode: u8,
    pub frame_hex: String,
    pub is_set_command: bool,
    pub decoder: Option<DecoderKind>,
}

impl CommandDefinition {
    fn query(name: &'static str, category: Category, opcode: u8, frame_hex: &str) -> Self {
        Self {
            name,
            category,
            opcode,
            frame_hex: frame_hex.to_string(),
            is_set_command: false,
            decoder: decoder_for(name),
        }
    }

    fn configuration(name: &'static str, category: Category, frame: &Frame) -> Self {
        Self {
            name,
            category,
            opcode: frame.opcode(),
            frame_hex: frame.to_hex(),
            is_set_command: true,
            decoder: None,
        }
    }
}

/// Zero-body query frames captured from Master units, in catalogue order.
const MASTER_GET_FRAMES: [(&str, u8, &str); 15] = [
    ("optical_port_devices_connected_1", 0xF8, "7E070000F80000B2827E"),
    ("optical_port_devices_connected_2", 0xF9, "7E070000F9000082B57E"),
    ("optical_port_devices_connected_3", 0xFA, "7E070000FA0000D2EC7E"),
    ("optical_port_devices_connected_4", 0xFB, "7E070000FB0000E2DB7E"),
    ("input_and_output_power", 0xF3, "7E070000F3000043727E"),
    ("channel_switch", 0x42, "7E0700004200008CBB7E"),
    ("channel_frequency_configuration", 0x36, "7E07000036000044BF7E"),
    ("central_frequency_point", 0xEB, "7E070000EB000081987E"),
    ("subband_bandwidth", 0xED, "7E070000ED0000212A7E"),
    ("broadband_switching", 0x81, "7E0700008100002BC47E"),
    ("optical_port_switch", 0x91, "7E07000091000048877E"),
    ("optical_port_status", 0x9A, "7E0700009A0000B9777E"),
    ("temperature", 0x02, "7E07000002000021A67E"),
    ("device_id", 0x97, "7E070000970000E8357E"),
    ("datt", 0x09, "7E070000090000D0567E"),
];

/// Remote units answer the same queries minus optical ports 3 and 4.
const REMOTE_GET_FRAMES: [(&str, u8, &str); 13] = [
    ("temperature", 0x02, "7E07000002000021A67E"),
    ("device_id", 0x97, "7E070000970000E8357E"),
    ("datt", 0x09, "7E070000090000D0567E"),
    ("input_and_output_power", 0xF3, "7E070000F3000043727E"),
    ("channel_switch", 0x42, "7E0700004200008CBB7E"),
    ("channel_frequency_configuration", 0x36, "7E07000036000044BF7E"),
    ("central_frequency_point", 0xEB, "7E070000EB000081987E"),
    ("subband_bandwidth", 0xED, "7E070000ED0000212A7E"),
    ("broadband_switching", 0x81, "7E0700008100002BC47E"),
    ("optical_port_switch", 0x91, "7E07000091000048877E"),
    ("optical_port_status", 0x9A, "7E0700009A0000B9777E"),
    ("optical_port_devices_connected_1", 0xF8, "7E070000F80000B2827E"),
    ("optical_port_devices_connected_2", 0xF9, "7E070000F9000082B57E"),
];

/// Raw word programmed by `set_channel_frequency_configuration` on every channel.
pub const DEFAULT_CHANNEL_FREQUENCY: ChannelFrequency = ChannelFrequency::from_raw(0x1234_5678);

/// Parameters of a registered SET command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetTemplate {
    WorkingMode(WorkingMode),
    Attenuation { uplink_db: u8, downlink_db: u8, device: DeviceType },
    ChannelActivation { active_channels: usize },
    FrequencyPlan(FrequencyPlan),
    UniformFrequency(ChannelFrequency),
}

impl SetTemplate {
    pub fn build(self) -> Result<Frame, FrameError> {
        match self {
            SetTemplate::WorkingMode(mode) => set_commands::working_mode(mode),
            SetTemplate::Attenuation { uplink_db, downlink_db, device } => {
                set_commands::attenuation(uplink_db, downlink_db, device)
            }
            SetTemplate::ChannelActivation { active_channels } => {
                // The first `active_channels` channels on, the rest off.
                let mut flags = [false; CHANNEL_COUNT];
                for flag in flags.iter_mut().take(active_channels) {
                    *flag = true;
                }
                set_commands::channel_activation(&flags)
            }
            SetTemplate::FrequencyPlan(plan) => set_commands::frequency_plan(plan),
            SetTemplate::UniformFrequency(freq) => {
                set_commands::channel_frequencies(&[freq; CHANNEL_COUNT])
            }
        }
    }
}

const MASTER_SET_TEMPLATES: [(&str, SetTemplate); 11] = [
    ("set_working_mode_wideband", SetTemplate::WorkingMode(WorkingMode::Wideband)),
    ("set_working_mode_channel", SetTemplate::WorkingMode(WorkingMode::Channel)),
    (
        "set_attenuation_10_15",
        SetTemplate::Attenuation { uplink_db: 10, downlink_db: 15, device: DeviceType::Dmu },
    ),
    (
        "set_attenuation_5_20",
        SetTemplate::Attenuation { uplink_db: 5, downlink_db: 20, device: DeviceType::Dmu },
    ),
    ("set_channels_all_on", SetTemplate::ChannelActivation { active_channels: 16 }),
    ("set_channels_all_off", SetTemplate::ChannelActivation { active_channels: 0 }),
    ("set_channels_first_8_on", SetTemplate::ChannelActivation { active_channels: 8 }),
    ("set_channel_frequencies_vhf", SetTemplate::FrequencyPlan(FrequencyPlan::Vhf)),
    ("set_channel_frequencies_p25", SetTemplate::FrequencyPlan(FrequencyPlan::P25)),
    ("set_channel_frequencies_tetra400", SetTemplate::FrequencyPlan(FrequencyPlan::Tetra400)),
    ("set_channel_frequency_configuration", SetTemplate::UniformFrequency(DEFAULT_CHANNEL_FREQUENCY)),
];

// Remote units take no bulk channel programming.
const REMOTE_SET_TEMPLATES: [(&str, SetTemplate); 4] = [
    ("remote_set_working_mode_wideband", SetTemplate::WorkingMode(WorkingMode::Wideband)),
    ("remote_set_working_mode_channel", SetTemplate::WorkingMode(WorkingMode::Channel)),
    (
        "remote_set_attenuation_12_18",
        SetTemplate::Attenuation { uplink_db: 12, downlink_db: 18, device: DeviceType::Dru },
    ),
    (
        "remote_set_attenuation_8_16",
        SetTemplate::Attenuation { uplink_db: 8, downlink_db: 16, device: DeviceType::Dru },
    ),
];

static GLOBAL_REGISTRY: Lazy<CommandRegistry> = Lazy::new(CommandRegistry::new);

#[derive(Debug, Clone)]
pub struct CommandRegistry {
    master_get: Vec<CommandDefinition>,
    remote_get: Vec<CommandDefinition>,
    master_set: Vec<CommandDefinition>,
    remote_set: Vec<CommandDefinition>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            master_get: query_table(Category::MasterGet, &MASTER_GET_FRAMES),
            remote_get: query_table(Category::RemoteGet, &REMOTE_GET_FRAMES),
            master_set: configuration_table(Category::MasterSet, &MASTER_SET_TEMPLATES),
            remote_set: configuration_table(Category::RemoteSet, &REMOTE_SET_TEMPLATES),
        }
    }

    /// Process-wide registry, built on first access.
    pub fn global() -> &'static CommandRegistry {
        &GLOBAL_REGISTRY
    }

    pub fn definitions(&self, category: Category) -> &[CommandDefinition] {
        match category {
            Category::MasterGet => &self.master_get,
            Category::RemoteGet => &self.remote_get,
            Category::MasterSet => &self.master_set,
            Category::RemoteSet => &self.remote_set,
        }
    }

    pub fn definition(&self, category: Category, name: &str) -> Option<&CommandDefinition> {
        self.definitions(category).iter().find(|d| d.name == name)
    }

    pub fn frame(&self, category: Category, name: &str) -> Option<&str> {
        self.definition(category, name).map(|d| d.frame_hex.as_str())
    }

    pub fn all_command_names(&self, category: Category) -> Vec<&'static str> {
        self.definitions(category).iter().map(|d| d.name).collect()
    }

    /// First opcode registered under `name` in any category.
    pub fn opcode_of(&self, name: &str) -> Option<u8> {
        Category::ALL
            .iter()
            .find_map(|&c| self.definition(c, name))
            .map(|d| d.opcode)
    }

    /// True when `name` is registered in a SET table of either role.
    pub fn is_set_command(&self, name: &str) -> bool {
        Category::ALL
            .iter()
            .filter(|c| c.is_set())
            .any(|&c| self.definition(c, name).is_some())
    }

    /// Resolve a command for a role: GET table first, then the SET sub-table.
    pub fn resolve(&self, role: DeviceRole, name: &str) -> Option<&CommandDefinition> {
        self.definition(role.get_category(), name)
            .or_else(|| self.definition(role.set_category(), name))
    }

    /// Full command set for a role, GET commands then SET commands.
    pub fn role_commands(&self, role: DeviceRole) -> impl Iterator<Item = &CommandDefinition> {
        self.definitions(role.get_category())
            .iter()
            .chain(self.definitions(role.set_category()))
    }

    pub fn role_command_names(&self, role: DeviceRole) -> Vec<&'static str> {
        self.role_commands(role).map(|d| d.name).collect()
    }

    pub fn role_size(&self, role: DeviceRole) -> usize {
        self.definitions(role.get_category()).len() + self.definitions(role.set_category()).len()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn query_table(category: Category, rows: &[(&'static str, u8, &str)]) -> Vec<CommandDefinition> {
    rows.iter()
        .map(|&(name, opcode, hex)| CommandDefinition::query(name, category, opcode, hex))
        .collect()
}

fn configuration_table(category: Category, rows: &[(&'static str, SetTemplate)]) -> Vec<CommandDefinition> {
    rows.iter()
        .filter_map(|&(name, template)| match template.build() {
            Ok(frame) => Some(CommandDefinition::configuration(name, category, &frame)),
            Err(e) => {
                warn!(command = name, error = %e, "Skipping SET command with unbuildable frame");
                None
            }
        })
        .collect()
}
