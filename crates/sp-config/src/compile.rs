//! Top-level configuration compiler: turns a resolved configuration
//! document into `sp_graph::Input`/`Output` sequences.

use crate::basic::compile_basic;
use crate::advanced::compile_advanced;
use crate::document::{ConfigDocument, FilterSpec, OutputSpec};
use crate::draft::RouteDraft;
use crate::error::{ConfigError, DspBuildError};
use crate::filters::build_filter;
use crate::levels;
use sp_core::Channel;
use sp_dsp::{BiquadCascade, DelayLine, Filter, Gain};
use sp_graph::{Condition, Input, Output, Route};
use std::collections::{HashMap, HashSet};
use std::path::Path;

pub struct CompiledConfig {
    pub inputs: Vec<Input>,
    pub outputs: Vec<Output>,
}

/// Compile a resolved (ref-free) document against a known device topology.
/// `auto_gain` is enabled exactly when the document used `basic` mode
/// (advanced-mode configurations are expected to manage their own levels).
pub fn compile(
    doc: &ConfigDocument,
    sample_rate: f64,
    capture_channels: &HashSet<Channel>,
    render_channels: &HashSet<Channel>,
    config_dir: &Path,
) -> Result<CompiledConfig, ConfigError> {
    if doc.basic.is_some() && doc.advanced.is_some() {
        return Err(ConfigError::invalid("", "basic and advanced are mutually exclusive"));
    }

    let (route_drafts, needs_lp, needs_hp, low_pass, high_pass) = if let Some(basic) = &doc.basic {
        let plan = compile_basic(basic, capture_channels, render_channels)?;
        (plan.routes, plan.needs_lp, plan.needs_hp, Some(plan.low_pass), Some(plan.high_pass))
    } else if let Some(advanced) = &doc.advanced {
        (compile_advanced(advanced)?, HashSet::new(), HashSet::new(), None, None)
    } else {
        // Pass-through: one direct route per overlapping channel.
        let mut routes: HashMap<Channel, Vec<RouteDraft>> = HashMap::new();
        for &channel in capture_channels.intersection(render_channels) {
            routes.insert(channel, vec![RouteDraft::direct(channel)]);
        }
        (routes, HashSet::new(), HashSet::new(), None, None)
    };
    let auto_gain = doc.basic.is_some();

    let mut inputs = Vec::new();
    for &channel in capture_channels {
        let drafts = route_drafts.get(&channel).cloned().unwrap_or_default();
        let mut routes = Vec::with_capacity(drafts.len());
        for (i, draft) in drafts.iter().enumerate() {
            let path = format!("routes/{}/{}", channel.name(), i);
            routes.push(build_route(draft, &path, sample_rate, config_dir)?);
        }
        inputs.push(Input::new(channel, routes));
    }

    let mut output_specs_by_channel: HashMap<Channel, &OutputSpec> = HashMap::new();
    for spec in &doc.outputs {
        for name in spec.channel_names() {
            let channel = Channel::from_name(&name)?;
            output_specs_by_channel.insert(channel, spec);
        }
    }

    let mut outputs = Vec::new();
    for &channel in render_channels {
        let spec = output_specs_by_channel.get(&channel).copied();
        let mut filters = Vec::new();

        let user_filters = spec.map(|s| s.filters.as_slice()).unwrap_or(&[]);
        if needs_hp.contains(&channel) && !user_filters.iter().any(|f| matches!(f, FilterSpec::HighPass { .. })) {
            if let Some(hp) = &high_pass {
                push_crossover(&mut filters, hp, false, sample_rate)?;
            }
        }
        if needs_lp.contains(&channel) && !user_filters.iter().any(|f| matches!(f, FilterSpec::LowPass { .. })) {
            if let Some(lp) = &low_pass {
                push_crossover(&mut filters, lp, true, sample_rate)?;
            }
        }

        let mut route_gain_sums: Vec<f64> = Vec::new();
        if let Some(drafts_for_channel) = route_drafts_feeding(&route_drafts, channel) {
            route_gain_sums = drafts_for_channel
                .iter()
                .map(|d| sp_core::db_to_gain(d.gain_db))
                .collect();
        }

        let mut own_gain_db = 0.0;
        let mut invert = false;
        let mut delay_ms = None;
        if let Some(spec) = spec {
            own_gain_db = spec.gain;
            invert = spec.invert;
            delay_ms = spec.delay.as_ref().map(|d| d.millis());
        }
        append_gain_delay(&mut filters, own_gain_db, invert, delay_ms, sample_rate)?;

        if let Some(spec) = spec {
            for (i, filter_spec) in spec.filters.iter().enumerate() {
                let path = format!("outputs/{}/filters/{}", channel.name(), i);
                filters.push(build_filter(filter_spec, &path, sample_rate, config_dir)?);
            }
            if let Some(cancellation) = &spec.cancellation {
                let cancel = sp_dsp::Cancellation::new(cancellation.freq, cancellation.gain, sample_rate)
                    .map_err(|e| ConfigError::Dsp {
                        path: format!("outputs/{}/cancellation", channel.name()),
                        source: DspBuildError::Delay(e),
                    })?;
                filters.push(Filter::Cancellation(cancel));
            }
            if let Some(compression) = &spec.compression {
                filters.push(Filter::Compression(sp_dsp::Compression::new(
                    compression.threshold,
                    compression.ratio,
                    compression.attack,
                    compression.release,
                    compression.window,
                    sample_rate,
                )));
            }
        }

        let own_gain_linear = sp_core::db_to_gain(own_gain_db);
        let expected_level = levels::expected_level(&route_gain_sums, own_gain_linear);
        let ok = levels::apply_auto_gain(&mut filters, expected_level, auto_gain);
        if !ok {
            log::warn!(
                "output {:?}: sum of routed channel levels is above 0dBFS ({:.3}); clipping can occur",
                channel,
                expected_level
            );
        }

        let muted = spec.map(|s| s.mute).unwrap_or(false);
        outputs.push(Output::new(channel, filters, muted));
    }

    Ok(CompiledConfig { inputs, outputs })
}

fn route_drafts_feeding(
    route_drafts: &HashMap<Channel, Vec<RouteDraft>>,
    destination: Channel,
) -> Option<Vec<RouteDraft>> {
    let matches: Vec<RouteDraft> = route_drafts
        .values()
        .flatten()
        .filter(|d| d.destination == destination)
        .cloned()
        .collect();
    if matches.is_empty() {
        None
    } else {
        Some(matches)
    }
}

fn push_crossover(
    filters: &mut Vec<Filter>,
    spec: &crate::document::CrossoverSpec,
    lowpass: bool,
    sample_rate: f64,
) -> Result<(), ConfigError> {
    let family = spec.crossover_type.unwrap_or(sp_dsp::CrossoverFamily::Butterworth);
    let q_values = match family {
        sp_dsp::CrossoverFamily::Custom => spec
            .q
            .clone()
            .ok_or_else(|| ConfigError::invalid("", "custom crossover requires an explicit q list"))?,
        other => sp_dsp::q_table(other, spec.order).map_err(|e| ConfigError::Dsp {
            path: "auto-crossover".to_string(),
            source: DspBuildError::Crossover(e),
        })?,
    };
    let mut cascade = BiquadCascade::new();
    if lowpass {
        cascade.add_lowpass_crossover(spec.freq, &q_values, 0.0, sample_rate);
    } else {
        cascade.add_highpass_crossover(spec.freq, &q_values, 0.0, sample_rate);
    }
    filters.push(Filter::Biquad(cascade));
    Ok(())
}

fn append_gain_delay(
    filters: &mut Vec<Filter>,
    gain_db: f64,
    invert: bool,
    delay_ms: Option<f64>,
    sample_rate: f64,
) -> Result<(), ConfigError> {
    if let Some(ms) = delay_ms {
        if ms > 0.0 {
            let delay = DelayLine::from_ms(ms, sample_rate).map_err(|e| ConfigError::Dsp {
                path: "delay".to_string(),
                source: DspBuildError::Delay(e),
            })?;
            filters.push(Filter::Delay(delay));
        }
    }
    if !Gain::is_no_op(gain_db, invert) {
        filters.push(Filter::Gain(Gain::new(gain_db, invert)));
    }
    Ok(())
}

fn build_route(
    draft: &RouteDraft,
    path: &str,
    sample_rate: f64,
    config_dir: &Path,
) -> Result<Route, ConfigError> {
    let mut filters = Vec::new();
    append_gain_delay(&mut filters, draft.gain_db, draft.invert, draft.delay_ms, sample_rate)?;
    for (i, filter_spec) in draft.filters.iter().enumerate() {
        let filter_path = format!("{path}/filters/{i}");
        filters.push(build_filter(filter_spec, &filter_path, sample_rate, config_dir)?);
    }
    let conditions = draft
        .condition
        .map(|guard| vec![Condition::Silent(guard)])
        .unwrap_or_default();
    Ok(Route::new(draft.destination, filters, conditions))
}
