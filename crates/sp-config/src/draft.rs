//! The shape both the basic and advanced parsers build before the compiler
//! turns it into `sp_graph` types.

use crate::document::FilterSpec;
use sp_core::Channel;

/// One path from a capture channel to a render channel, not yet turned into
/// DSP objects.
#[derive(Debug, Clone)]
pub struct RouteDraft {
    pub destination: Channel,
    pub gain_db: f64,
    pub invert: bool,
    pub delay_ms: Option<f64>,
    pub filters: Vec<FilterSpec>,
    /// `Some(guard)` attaches a SILENT condition on `guard`.
    pub condition: Option<Channel>,
}

impl RouteDraft {
    pub fn direct(destination: Channel) -> RouteDraft {
        RouteDraft {
            destination,
            gain_db: 0.0,
            invert: false,
            delay_ms: None,
            filters: Vec::new(),
            condition: None,
        }
    }

    pub fn with_gain(destination: Channel, gain_db: f64) -> RouteDraft {
        RouteDraft {
            gain_db,
            ..RouteDraft::direct(destination)
        }
    }
}
