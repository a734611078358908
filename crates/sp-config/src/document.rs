//! Raw, `#ref`-free shape of a configuration document, as deserialized
//! directly from the resolved JSON value.

use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDocument {
    pub description: Option<String>,
    #[serde(default)]
    pub hide: bool,
    #[serde(default)]
    pub minimize: bool,
    #[serde(default)]
    pub start_with_os: bool,
    #[serde(default)]
    pub debug: bool,
    pub devices: Devices,
    pub basic: Option<BasicSpec>,
    pub advanced: Option<HashMap<String, Vec<AdvancedRouteSpec>>>,
    #[serde(default)]
    pub outputs: Vec<OutputSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Devices {
    /// Absent on a first-run document; the caller resolves the host's
    /// default device and persists the choice back (see
    /// `persist_device_selection`).
    #[serde(default)]
    pub capture: Option<String>,
    #[serde(default)]
    pub render: Option<String>,
    #[serde(default)]
    pub render_asio: Option<String>,
    #[serde(default)]
    pub asio_buffer_size: Option<u32>,
    #[serde(default)]
    pub asio_num_channels: Option<u32>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum SpeakerType {
    Large,
    Small,
    Sub,
    Off,
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub struct CrossoverSpec {
    #[serde(default)]
    pub crossover_type: Option<sp_dsp::CrossoverFamily>,
    pub freq: f64,
    pub order: u8,
    #[serde(default)]
    pub q: Option<Vec<f64>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BasicSpec {
    pub front: Option<SpeakerType>,
    pub subwoofer: Option<SpeakerType>,
    pub center: Option<SpeakerType>,
    pub surround: Option<SpeakerType>,
    pub surround_back: Option<SpeakerType>,
    #[serde(default)]
    pub stereo_bass: bool,
    #[serde(default)]
    pub expand_surround: bool,
    #[serde(default)]
    pub lfe_gain: f64,
    #[serde(default)]
    pub center_gain: f64,
    pub low_pass: Option<CrossoverSpec>,
    pub high_pass: Option<CrossoverSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum DelaySpec {
    Plain(f64),
    WithUnit { value: f64, unit: sp_dsp::DelayUnit },
}

impl DelaySpec {
    pub fn millis(&self) -> f64 {
        match self {
            DelaySpec::Plain(ms) => *ms,
            DelaySpec::WithUnit { value, unit } => sp_dsp::to_millis(*value, *unit),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IfSpec {
    pub silent: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedRouteSpec {
    pub out: String,
    #[serde(default)]
    pub gain: f64,
    #[serde(default)]
    pub invert: bool,
    pub delay: Option<DelaySpec>,
    #[serde(default)]
    pub filters: Vec<FilterSpec>,
    #[serde(rename = "if")]
    pub condition: Option<IfSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationSpec {
    pub freq: f64,
    #[serde(default)]
    pub gain: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionSpec {
    pub threshold: f64,
    pub ratio: f64,
    pub attack: f64,
    pub release: f64,
    pub window: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ChannelSelector {
    One(String),
    Many(Vec<String>),
}

impl ChannelSelector {
    pub fn names(&self) -> Vec<String> {
        match self {
            ChannelSelector::One(name) => vec![name.clone()],
            ChannelSelector::Many(names) => names.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct OutputSpec {
    pub channel: Option<String>,
    pub channels: Option<Vec<String>>,
    #[serde(default)]
    pub mute: bool,
    #[serde(default)]
    pub gain: f64,
    #[serde(default)]
    pub invert: bool,
    pub delay: Option<DelaySpec>,
    #[serde(default)]
    pub filters: Vec<FilterSpec>,
    pub cancellation: Option<CancellationSpec>,
    pub compression: Option<CompressionSpec>,
}

impl OutputSpec {
    pub fn channel_names(&self) -> Vec<String> {
        if let Some(one) = &self.channel {
            vec![one.clone()]
        } else if let Some(many) = &self.channels {
            many.clone()
        } else {
            Vec::new()
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct BiquadValue {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    #[serde(default = "one")]
    pub a0: f64,
    pub a1: f64,
    pub a2: f64,
}

fn one() -> f64 {
    1.0
}

#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterSpec {
    LowPass {
        freq: f64,
        #[serde(default, rename = "crossoverType")]
        crossover_type: Option<sp_dsp::CrossoverFamily>,
        #[serde(default = "default_order")]
        order: u8,
        #[serde(default)]
        q: Option<Vec<f64>>,
    },
    HighPass {
        freq: f64,
        #[serde(default, rename = "crossoverType")]
        crossover_type: Option<sp_dsp::CrossoverFamily>,
        #[serde(default = "default_order")]
        order: u8,
        #[serde(default)]
        q: Option<Vec<f64>>,
    },
    LowShelf {
        freq: f64,
        gain: f64,
        #[serde(default = "default_q")]
        q: f64,
    },
    HighShelf {
        freq: f64,
        gain: f64,
        #[serde(default = "default_q")]
        q: f64,
    },
    Peq {
        freq: f64,
        q: f64,
        gain: f64,
    },
    BandPass {
        freq: f64,
        bandwidth: f64,
        #[serde(default)]
        gain: f64,
    },
    Notch {
        freq: f64,
        bandwidth: f64,
        #[serde(default)]
        gain: f64,
    },
    LinkwitzTransform {
        f0: f64,
        q0: f64,
        fp: f64,
        qp: f64,
    },
    Biquad {
        values: Vec<BiquadValue>,
    },
    Fir {
        file: String,
    },
}

fn default_order() -> u8 {
    2
}

fn default_q() -> f64 {
    std::f64::consts::FRAC_1_SQRT_2
}
