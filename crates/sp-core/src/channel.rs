//! Speaker channel identity.

use crate::CoreError;

/// One of the eight fixed speaker positions the engine understands, plus the
/// `Absent` sentinel for a position that doesn't exist on the current device.
///
/// Indices are stable and are used directly to index render-block buffers;
/// a renderer's channel count bounds which indices are valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Channel {
    L,
    R,
    C,
    Sw,
    Sbl,
    Sbr,
    Sl,
    Sr,
    Absent,
}

/// All eight real speaker positions, in stable index order.
pub const ALL_CHANNELS: [Channel; 8] = [
    Channel::L,
    Channel::R,
    Channel::C,
    Channel::Sw,
    Channel::Sbl,
    Channel::Sbr,
    Channel::Sl,
    Channel::Sr,
];

impl Channel {
    /// Stable index of this channel, used to address render-block buffers.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Channel::L => 0,
            Channel::R => 1,
            Channel::C => 2,
            Channel::Sw => 3,
            Channel::Sbl => 4,
            Channel::Sbr => 5,
            Channel::Sl => 6,
            Channel::Sr => 7,
            Channel::Absent => usize::MAX,
        }
    }

    #[inline]
    pub fn from_index(index: usize) -> Option<Channel> {
        ALL_CHANNELS.get(index).copied()
    }

    /// Parse a channel name as used in configuration documents (case
    /// insensitive, e.g. "SBL", "sbl").
    pub fn from_name(name: &str) -> Result<Channel, CoreError> {
        match name.to_ascii_uppercase().as_str() {
            "L" => Ok(Channel::L),
            "R" => Ok(Channel::R),
            "C" => Ok(Channel::C),
            "SW" => Ok(Channel::Sw),
            "SBL" => Ok(Channel::Sbl),
            "SBR" => Ok(Channel::Sbr),
            "SL" => Ok(Channel::Sl),
            "SR" => Ok(Channel::Sr),
            other => Err(CoreError::UnknownChannel(other.to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Channel::L => "L",
            Channel::R => "R",
            Channel::C => "C",
            Channel::Sw => "SW",
            Channel::Sbl => "SBL",
            Channel::Sbr => "SBR",
            Channel::Sl => "SL",
            Channel::Sr => "SR",
            Channel::Absent => "ABSENT",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_name() {
        for channel in ALL_CHANNELS {
            assert_eq!(Channel::from_name(channel.name()).unwrap(), channel);
        }
    }

    #[test]
    fn indices_are_stable_and_contiguous() {
        for (i, channel) in ALL_CHANNELS.iter().enumerate() {
            assert_eq!(channel.index(), i);
        }
    }

    #[test]
    fn unknown_name_errors() {
        assert!(Channel::from_name("XX").is_err());
    }
}
