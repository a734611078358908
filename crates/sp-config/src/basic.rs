//! Declarative bass-management ("basic" mode) compiler.
//!
//! Mirrors the reference implementation's channel-typing and bass-routing
//! algorithm: each of the eight canonical speaker positions is assigned a
//! `SpeakerType`, full-range-but-small speakers get their low end rerouted
//! to whatever subwoofers exist (or, lacking a subwoofer, to the front pair),
//! and the front/sub channels that end up carrying rerouted bass are marked
//! so the compiler can inject the matching crossover on the output side.

use crate::document::{BasicSpec, CrossoverSpec, SpeakerType};
use crate::draft::RouteDraft;
use crate::error::ConfigError;
use sp_core::Channel;
use std::collections::{HashMap, HashSet};

const PHANTOM_CENTER_GAIN: f64 = -3.0;
const LFE_GAIN_BOOST: f64 = 10.0;
const BASS_TO_STEREO_GAIN: f64 = -6.0;

fn default_low_pass() -> CrossoverSpec {
    CrossoverSpec {
        crossover_type: Some(sp_dsp::CrossoverFamily::Butterworth),
        freq: 80.0,
        order: 5,
        q: None,
    }
}

fn default_high_pass() -> CrossoverSpec {
    CrossoverSpec {
        crossover_type: Some(sp_dsp::CrossoverFamily::Butterworth),
        freq: 80.0,
        order: 3,
        q: None,
    }
}

/// Output of compiling a `basic` block: one route list per capture channel,
/// plus which output channels need an auto-injected LP/HP crossover.
pub struct BasicPlan {
    pub routes: HashMap<Channel, Vec<RouteDraft>>,
    pub needs_lp: HashSet<Channel>,
    pub needs_hp: HashSet<Channel>,
    pub low_pass: CrossoverSpec,
    pub high_pass: CrossoverSpec,
}

/// Downmix target order for channels whose type resolves to `Off`. The
/// first candidate whose own type is not `Off` wins.
fn downmix_candidates(channel: Channel) -> &'static [Channel] {
    match channel {
        Channel::Sl => &[Channel::Sbl, Channel::L],
        Channel::Sbl => &[Channel::Sl, Channel::L],
        Channel::Sr => &[Channel::Sbr, Channel::R],
        Channel::Sbr => &[Channel::Sr, Channel::R],
        _ => &[],
    }
}

pub fn compile_basic(
    spec: &BasicSpec,
    capture_channels: &HashSet<Channel>,
    render_channels: &HashSet<Channel>,
) -> Result<BasicPlan, ConfigError> {
    let front = spec.front.unwrap_or(SpeakerType::Large);
    let subwoofer_default = if render_channels.contains(&Channel::Sw) {
        SpeakerType::Sub
    } else {
        SpeakerType::Off
    };
    let subwoofer = spec.subwoofer.unwrap_or(subwoofer_default);
    let center = spec.center.unwrap_or(SpeakerType::Large);
    let surround = spec.surround.unwrap_or(SpeakerType::Large);
    let surround_back = spec.surround_back.unwrap_or(SpeakerType::Large);

    let mut types: HashMap<Channel, SpeakerType> = HashMap::new();
    types.insert(Channel::L, front);
    types.insert(Channel::R, front);
    types.insert(Channel::C, center);
    types.insert(Channel::Sw, subwoofer);
    types.insert(Channel::Sl, surround);
    types.insert(Channel::Sr, surround);
    types.insert(Channel::Sbl, surround_back);
    types.insert(Channel::Sbr, surround_back);

    // Step 1: demote to OFF anything absent from the render device.
    for (channel, kind) in types.iter_mut() {
        if !render_channels.contains(channel) && *kind != SpeakerType::Off {
            log::warn!("basic: {:?} has no render channel, demoting to OFF", channel);
            *kind = SpeakerType::Off;
        }
    }

    let sub_targets: Vec<Channel> = [Channel::C, Channel::Sw, Channel::Sl, Channel::Sr, Channel::Sbl, Channel::Sbr]
        .into_iter()
        .filter(|c| types.get(c) == Some(&SpeakerType::Sub))
        .collect();
    let has_subs = !sub_targets.is_empty();
    let has_smalls = types.values().any(|t| *t == SpeakerType::Small);

    let left_subs: Vec<Channel> = sub_targets
        .iter()
        .copied()
        .filter(|c| matches!(c, Channel::C | Channel::Sl | Channel::Sbl))
        .collect();
    let right_subs: Vec<Channel> = sub_targets
        .iter()
        .copied()
        .filter(|c| matches!(c, Channel::Sw | Channel::Sr | Channel::Sbr))
        .collect();

    if spec.stereo_bass && has_subs && left_subs.len() != right_subs.len() {
        return Err(ConfigError::invalid(
            "basic/stereoBass",
            "can't use stereo bass unless the left and right subwoofer groups are symmetric",
        ));
    }
    if !has_subs && front == SpeakerType::Small {
        return Err(ConfigError::invalid(
            "basic/front",
            "can't use small front speakers with no subwoofer",
        ));
    }
    if !has_subs && spec.stereo_bass {
        log::warn!("basic: stereoBass has no effect with no subwoofer present");
    }

    let lfe_gain_effective = if has_subs && !has_smalls {
        0.0
    } else {
        spec.lfe_gain + LFE_GAIN_BOOST
    };

    let mut routes: HashMap<Channel, Vec<RouteDraft>> = HashMap::new();
    let mut needs_lp: HashSet<Channel> = HashSet::new();
    let mut needs_hp: HashSet<Channel> = HashSet::new();

    let bass_gain_for = |channel: Channel| -> f64 {
        match channel {
            Channel::Sw => lfe_gain_effective,
            Channel::C => spec.center_gain,
            _ => 0.0,
        }
    };

    let bass_targets_for = |channel: Channel| -> Vec<Channel> {
        if !spec.stereo_bass {
            return sub_targets.clone();
        }
        if matches!(channel, Channel::C | Channel::Sl | Channel::Sbl) {
            left_subs.clone()
        } else {
            right_subs.clone()
        }
    };

    for &channel in &[
        Channel::L,
        Channel::R,
        Channel::C,
        Channel::Sw,
        Channel::Sl,
        Channel::Sr,
        Channel::Sbl,
        Channel::Sbr,
    ] {
        if !capture_channels.contains(&channel) {
            continue;
        }
        let kind = types[&channel];
        let mut drafts = Vec::new();
        match kind {
            SpeakerType::Large => {
                drafts.push(RouteDraft::direct(channel));
            }
            SpeakerType::Small => {
                drafts.push(RouteDraft::direct(channel));
                needs_hp.insert(channel);
                add_bass_routes(channel, has_subs, bass_gain_for(channel), &bass_targets_for(channel), &mut drafts, &mut needs_lp);
            }
            SpeakerType::Sub => {
                if channel == Channel::Sw {
                    add_bass_routes(channel, has_subs, bass_gain_for(channel), &bass_targets_for(channel), &mut drafts, &mut needs_lp);
                } else if let Some(&target) = downmix_candidates(channel)
                    .iter()
                    .find(|c| types.get(c) != Some(&SpeakerType::Off))
                {
                    drafts.push(RouteDraft::with_gain(target, 0.0));
                    if types[&target] == SpeakerType::Small {
                        needs_hp.insert(target);
                        add_bass_routes(channel, has_subs, bass_gain_for(channel), &bass_targets_for(target), &mut drafts, &mut needs_lp);
                    }
                } else if channel == Channel::C {
                    let gain = PHANTOM_CENTER_GAIN + spec.center_gain;
                    if types.get(&Channel::L) != Some(&SpeakerType::Off) {
                        drafts.push(RouteDraft::with_gain(Channel::L, gain));
                    }
                    if types.get(&Channel::R) != Some(&SpeakerType::Off) {
                        drafts.push(RouteDraft::with_gain(Channel::R, gain));
                    }
                }
                // Other-channel SUB with no downmix candidate contributes nothing.
            }
            SpeakerType::Off => {
                if let Some(&target) = downmix_candidates(channel)
                    .iter()
                    .find(|c| types.get(c) != Some(&SpeakerType::Off))
                {
                    drafts.push(RouteDraft::with_gain(target, 0.0));
                    if types[&target] == SpeakerType::Small {
                        needs_hp.insert(target);
                        add_bass_routes(channel, has_subs, bass_gain_for(channel), &bass_targets_for(target), &mut drafts, &mut needs_lp);
                    }
                } else if channel == Channel::C {
                    let gain = PHANTOM_CENTER_GAIN + spec.center_gain;
                    if types.get(&Channel::L) != Some(&SpeakerType::Off) {
                        drafts.push(RouteDraft::with_gain(Channel::L, gain));
                    }
                    if types.get(&Channel::R) != Some(&SpeakerType::Off) {
                        drafts.push(RouteDraft::with_gain(Channel::R, gain));
                    }
                }
                // SW with type OFF (and anything else with no candidate):
                // contributes nothing.
            }
        }
        if !drafts.is_empty() {
            routes.entry(channel).or_default().extend(drafts);
        }
    }

    if spec.expand_surround {
        let all_surround_are_speakers = [Channel::Sl, Channel::Sr, Channel::Sbl, Channel::Sbr]
            .iter()
            .all(|c| types.get(c).map(|t| matches!(t, SpeakerType::Large | SpeakerType::Small)).unwrap_or(false));
        if !all_surround_are_speakers {
            return Err(ConfigError::invalid(
                "basic/expandSurround",
                "expandSurround requires SL, SR, SBL and SBR to all be speakers",
            ));
        }
        if capture_channels.contains(&Channel::Sl) {
            routes.entry(Channel::Sl).or_default().push(RouteDraft {
                condition: Some(Channel::Sbl),
                ..RouteDraft::direct(Channel::Sbl)
            });
        }
        if capture_channels.contains(&Channel::Sr) {
            routes.entry(Channel::Sr).or_default().push(RouteDraft {
                condition: Some(Channel::Sbr),
                ..RouteDraft::direct(Channel::Sbr)
            });
        }
    }

    Ok(BasicPlan {
        routes,
        needs_lp,
        needs_hp,
        low_pass: default_low_pass(),
        high_pass: default_high_pass(),
    })
}

fn add_bass_routes(
    source: Channel,
    has_subs: bool,
    bass_gain: f64,
    targets: &[Channel],
    drafts: &mut Vec<RouteDraft>,
    needs_lp: &mut HashSet<Channel>,
) {
    if has_subs {
        for &target in targets {
            drafts.push(RouteDraft::with_gain(target, bass_gain));
            needs_lp.insert(target);
        }
        return;
    }
    // No subwoofer at all: redirect bass to the front pair instead.
    let gain = bass_gain + BASS_TO_STEREO_GAIN;
    match source {
        Channel::Sl | Channel::Sbl => {
            drafts.push(RouteDraft::with_gain(Channel::L, gain));
            needs_lp.insert(Channel::L);
        }
        Channel::Sr | Channel::Sbr => {
            drafts.push(RouteDraft::with_gain(Channel::R, gain));
            needs_lp.insert(Channel::R);
        }
        _ => {
            drafts.push(RouteDraft::with_gain(Channel::L, gain));
            drafts.push(RouteDraft::with_gain(Channel::R, gain));
            needs_lp.insert(Channel::L);
            needs_lp.insert(Channel::R);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_channels() -> HashSet<Channel> {
        sp_core::ALL_CHANNELS.into_iter().collect()
    }

    #[test]
    fn default_basic_is_all_large_pass_through_with_sw_as_bass_source() {
        let spec = BasicSpec::default();
        let plan = compile_basic(&spec, &all_channels(), &all_channels()).unwrap();
        assert!(plan.needs_hp.is_empty());
        // SW defaults to SUB when rendered, so it still acts as its own bass
        // source and picks up the LP crossover even with no SMALL speakers.
        assert_eq!(plan.needs_lp, [Channel::Sw].into_iter().collect());
        for &c in &[Channel::L, Channel::R, Channel::C] {
            assert_eq!(plan.routes[&c].len(), 1);
            assert_eq!(plan.routes[&c][0].destination, c);
        }
        let sw_routes = &plan.routes[&Channel::Sw];
        assert_eq!(sw_routes.len(), 1);
        assert_eq!(sw_routes[0].destination, Channel::Sw);
    }

    #[test]
    fn mono_bass_management_routes_small_fronts_to_sub() {
        let spec = BasicSpec {
            front: Some(SpeakerType::Small),
            subwoofer: Some(SpeakerType::Sub),
            ..BasicSpec::default()
        };
        let plan = compile_basic(&spec, &all_channels(), &all_channels()).unwrap();
        assert!(plan.needs_hp.contains(&Channel::L));
        assert!(plan.needs_hp.contains(&Channel::R));
        assert!(plan.needs_lp.contains(&Channel::Sw));
        let l_routes = &plan.routes[&Channel::L];
        assert_eq!(l_routes.len(), 2);
        assert_eq!(l_routes[1].destination, Channel::Sw);
    }

    #[test]
    fn stereo_bass_with_asymmetric_subs_fails_to_compile() {
        let spec = BasicSpec {
            front: Some(SpeakerType::Small),
            center: Some(SpeakerType::Small),
            subwoofer: Some(SpeakerType::Sub),
            stereo_bass: true,
            ..BasicSpec::default()
        };
        let render: HashSet<Channel> = [Channel::L, Channel::R, Channel::C, Channel::Sw].into_iter().collect();
        let result = compile_basic(&spec, &render, &render);
        assert!(result.is_err());
    }

    #[test]
    fn no_subwoofer_with_small_front_is_rejected() {
        let spec = BasicSpec {
            front: Some(SpeakerType::Small),
            subwoofer: Some(SpeakerType::Off),
            ..BasicSpec::default()
        };
        assert!(compile_basic(&spec, &all_channels(), &all_channels()).is_err());
    }

    #[test]
    fn expand_surround_adds_conditional_route() {
        let spec = BasicSpec {
            surround: Some(SpeakerType::Large),
            surround_back: Some(SpeakerType::Large),
            expand_surround: true,
            ..BasicSpec::default()
        };
        let plan = compile_basic(&spec, &all_channels(), &all_channels()).unwrap();
        let sl_routes = &plan.routes[&Channel::Sl];
        assert_eq!(sl_routes.len(), 2);
        assert_eq!(sl_routes[1].destination, Channel::Sbl);
        assert_eq!(sl_routes[1].condition, Some(Channel::Sbl));
    }

    #[test]
    fn off_surround_downmixes_to_surround_back() {
        let spec = BasicSpec {
            surround: Some(SpeakerType::Off),
            surround_back: Some(SpeakerType::Large),
            ..BasicSpec::default()
        };
        let plan = compile_basic(&spec, &all_channels(), &all_channels()).unwrap();
        let sl_routes = &plan.routes[&Channel::Sl];
        assert_eq!(sl_routes.len(), 1);
        assert_eq!(sl_routes[0].destination, Channel::Sbl);
    }
}
