//! Configuration (SET) frame synthesis.
//!
//! GET queries are fixed 20-character frames, but SET frames carry a body and
//! are generated here with the same checksum used for the query tables.

use crate::frame::{Frame, FrameError};
use serde::{Deserialize, Serialize};

pub const CHANNEL_COUNT: usize = 16;

pub const OP_SET_CHANNEL_FREQUENCIES: u8 = 0x35;
pub const OP_SET_SINGLE_CHANNEL_FREQUENCY: u8 = 0x37;
pub const OP_SET_CHANNEL_ACTIVATION: u8 = 0x41;
pub const OP_SET_WORKING_MODE: u8 = 0x80;
pub const OP_SET_ATTENUATION: u8 = 0xE7;

/// Frequencies travel as u32 little-endian counts of this many hertz.
pub const FREQUENCY_UNIT_HZ: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkingMode {
    Wideband,
    Channel,
}

impl WorkingMode {
    pub fn wire_value(self) -> u8 {
        match self {
            WorkingMode::Wideband => 0x01,
            WorkingMode::Channel => 0x00,
        }
    }

    pub fn from_wire(value: u8) -> Self {
        if value == 0x01 {
            WorkingMode::Wideband
        } else {
            WorkingMode::Channel
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WorkingMode::Wideband => "wideband",
            WorkingMode::Channel => "channel",
        }
    }
}

/// Unit type an attenuation command is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    /// Master-side unit.
    Dmu,
    /// Remote unit.
    Dru,
}

impl DeviceType {
    pub fn max_attenuation_db(self) -> u8 {
        match self {
            DeviceType::Dmu => 30,
            DeviceType::Dru => 20,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DeviceType::Dmu => "dmu",
            DeviceType::Dru => "dru",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChannelFrequency(u32);

impl ChannelFrequency {
    pub const fn from_raw(units: u32) -> Self {
        Self(units)
    }

    /// Rounds down to the nearest 100 Hz. Saturates above ~429 GHz.
    pub fn from_hz(hz: u64) -> Self {
        Self((hz / FREQUENCY_UNIT_HZ).min(u64::from(u32::MAX)) as u32)
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn hz(self) -> u64 {
        u64::from(self.0) * FREQUENCY_UNIT_HZ
    }

    pub fn mhz(self) -> f64 {
        self.hz() as f64 / 1_000_000.0
    }

    pub fn to_wire(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }

    pub fn from_wire(bytes: [u8; 4]) -> Self {
        Self(u32::from_le_bytes(bytes))
    }
}

/// Named 16-channel frequency plans, evenly spread across each band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrequencyPlan {
    /// 145 to 160 MHz
    Vhf,
    /// 851 to 869 MHz
    P25,
    /// 427 to 430 MHz
    Tetra400,
}

impl FrequencyPlan {
    pub fn band_hz(self) -> (u64, u64) {
        match self {
            FrequencyPlan::Vhf => (145_000_000, 160_000_000),
            FrequencyPlan::P25 => (851_000_000, 869_000_000),
            FrequencyPlan::Tetra400 => (427_000_000, 430_000_000),
        }
    }

    pub fn frequencies(self) -> [ChannelFrequency; CHANNEL_COUNT] {
        let (low, high) = self.band_hz();
        let step = (high - low) / (CHANNEL_COUNT as u64 - 1);
        let mut plan = [ChannelFrequency::from_raw(0); CHANNEL_COUNT];
        for (i, slot) in plan.iter_mut().enumerate() {
            *slot = ChannelFrequency::from_hz(low + step * i as u64);
        }
        plan
    }

    pub fn label(self) -> &'static str {
        match self {
            FrequencyPlan::Vhf => "vhf",
            FrequencyPlan::P25 => "p25",
            FrequencyPlan::Tetra400 => "tetra400",
        }
    }
}

pub fn working_mode(mode: WorkingMode) -> Result<Frame, FrameError> {
    Frame::build(OP_SET_WORKING_MODE, &[mode.wire_value()])
}

pub fn attenuation(uplink_db: u8, downlink_db: u8, device: DeviceType) -> Result<Frame, FrameError> {
    let max = device.max_attenuation_db();
    for value in [uplink_db, downlink_db] {
        if value > max {
            return Err(FrameError::AttenuationOutOfRange {
                value,
                max,
                device: device.label(),
            });
        }
    }
    Frame::build(OP_SET_ATTENUATION, &[uplink_db, downlink_db])
}

/// One byte per channel, `01` active and `00` inactive.
pub fn channel_activation(active: &[bool]) -> Result<Frame, FrameError> {
    if active.len() != CHANNEL_COUNT {
        return Err(FrameError::ChannelCount {
            expected: CHANNEL_COUNT,
            actual: active.len(),
        });
    }
    let mut body = [0u8; CHANNEL_COUNT];
    for (slot, &on) in body.iter_mut().zip(active) {
        *slot = u8::from(on);
    }
    Frame::build(OP_SET_CHANNEL_ACTIVATION, &body)
}

pub fn single_channel_frequency(channel: usize, frequency: ChannelFrequency) -> Result<Frame, FrameError> {
    if channel >= CHANNEL_COUNT {
        return Err(FrameError::ChannelOutOfRange(channel));
    }
    let mut body = [0u8; 5];
    body[0] = channel as u8;
    body[1..].copy_from_slice(&frequency.to_wire());
    Frame::build(OP_SET_SINGLE_CHANNEL_FREQUENCY, &body)
}

pub fn channel_frequencies(frequencies: &[ChannelFrequency]) -> Result<Frame, FrameError> {
    if frequencies.len() != CHANNEL_COUNT {
        return Err(FrameError::ChannelCount {
            expected: CHANNEL_COUNT,
            actual: frequencies.len(),
        });
    }
    let mut body = [0u8; CHANNEL_COUNT * 4];
    for (chunk, freq) in body.chunks_exact_mut(4).zip(frequencies) {
        chunk.copy_from_slice(&freq.to_wire());
    }
    Frame::build(OP_SET_CHANNEL_FREQUENCIES, &body)
}

pub fn frequency_plan(plan: FrequencyPlan) -> Result<Frame, FrameError> {
    channel_frequencies(&plan.frequencies())
}
