//! Crate-level scenarios from spec.md §8: compile a document with
//! `sp_config::compile_document_text` and drive the resulting
//! `sp_graph::Input`/`Output` graph the way the capture loop would, to
//! check the whole pipeline rather than one compiler stage in isolation.

use std::collections::HashSet;
use std::f64::consts::PI;
use std::path::Path;

use approx::assert_abs_diff_eq;
use sp_core::Channel;
use sp_graph::{ConditionRegistry, Output};

fn stereo() -> HashSet<Channel> {
    [Channel::L, Channel::R].into_iter().collect()
}

fn all_channels() -> HashSet<Channel> {
    sp_core::ALL_CHANNELS.into_iter().collect()
}

fn render_block() -> [f64; 8] {
    [0.0; 8]
}

/// Drive `output` with a steady sine at `freq` and return the settled peak
/// amplitude in dB, relative to the unit-amplitude input. `Output` exposes
/// no filter introspection (the hot path only ever calls `process`), so the
/// response is measured the same way scenario 6's cancellation test
/// measures cancellation: by actually running samples through it.
fn measured_response_db(output: &mut Output, freq: f64, sample_rate: f64) -> f64 {
    let per_cycle = (sample_rate / freq) as usize;
    let settle = per_cycle * 10;
    let measure = per_cycle * 5;
    let mut peak = 0.0_f64;
    for i in 0..(settle + measure) {
        let t = i as f64 / sample_rate;
        let x = (2.0 * PI * freq * t).sin();
        let y = output.process(x);
        if i >= settle {
            peak = peak.max(y.abs());
        }
    }
    20.0 * peak.log10()
}

/// Scenario 1: pass-through. No basic/advanced/outputs, capture and render
/// both carry L/R; a capture frame is emitted unchanged and no output clips.
#[test]
fn pass_through_forwards_the_frame_unchanged() {
    let text = r#"{
        "devices": {"capture": "Speakers", "render": "Speakers"},
        "outputs": []
    }"#;
    let lr = stereo();
    let mut compiled = sp_config::compile_document_text(text, 48_000.0, &lr, &lr, Path::new(".")).unwrap();

    let mut block = render_block();
    for input in &mut compiled.inputs {
        let sample = if input.channel() == Channel::L { 0.5 } else { -0.25 };
        input.process(sample, &mut block);
    }

    for output in &mut compiled.outputs {
        let mixed = block[output.channel().index()];
        let rendered = output.process(mixed);
        let expected = if output.channel() == Channel::L { 0.5 } else { -0.25 };
        assert_eq!(rendered, expected);
        assert_eq!(output.peak_clip(), 0.0);
    }
}

/// Scenario 2 (DSP half): mono bass management puts a matching 3rd-order
/// Butterworth high-pass on L and a 5th-order low-pass on SW, both at
/// 80 Hz; each is -3dB at the crossover frequency relative to its own
/// pass-band.
#[test]
fn mono_bass_management_crossovers_meet_at_minus_3db() {
    let text = r#"{
        "devices": {"capture": "Speakers", "render": "Speakers"},
        "basic": {"front": "SMALL", "subwoofer": "SUB"}
    }"#;
    let channels = all_channels();
    let compiled = sp_config::compile_document_text(text, 48_000.0, &channels, &channels, Path::new(".")).unwrap();
    let sample_rate = 48_000.0;

    let mut l_out = compiled.outputs.iter().find(|o| o.channel() == Channel::L).unwrap().clone();
    let l_passband_db = measured_response_db(&mut l_out, 2_000.0, sample_rate);
    let mut l_out = compiled.outputs.iter().find(|o| o.channel() == Channel::L).unwrap().clone();
    let l_crossover_db = measured_response_db(&mut l_out, 80.0, sample_rate);
    assert_abs_diff_eq!(l_passband_db - l_crossover_db, 3.0, epsilon = 0.3);

    let mut sw_out = compiled.outputs.iter().find(|o| o.channel() == Channel::Sw).unwrap().clone();
    let sw_passband_db = measured_response_db(&mut sw_out, 20.0, sample_rate);
    let mut sw_out = compiled.outputs.iter().find(|o| o.channel() == Channel::Sw).unwrap().clone();
    let sw_crossover_db = measured_response_db(&mut sw_out, 80.0, sample_rate);
    assert_abs_diff_eq!(sw_passband_db - sw_crossover_db, 3.0, epsilon = 0.3);
}

/// Scenario 4: expand-surround conditional routing. SL always feeds SL;
/// when SBL is silent it additionally feeds SBL, and stops once SBL is
/// reported active again.
#[test]
fn expand_surround_routes_to_surround_back_only_while_it_is_silent() {
    let text = r#"{
        "devices": {"capture": "Speakers", "render": "Speakers"},
        "basic": {"surround": "LARGE", "surroundBack": "LARGE", "expandSurround": true}
    }"#;
    let channels = all_channels();
    let mut compiled = sp_config::compile_document_text(text, 48_000.0, &channels, &channels, Path::new(".")).unwrap();

    let sl_input = compiled.inputs.iter_mut().find(|i| i.channel() == Channel::Sl).unwrap();

    // SBL starts silent (a fresh registry defaults every channel to silent).
    let mut registry = ConditionRegistry::new(sp_core::ALL_CHANNELS.len());
    sl_input.eval_conditions(&registry);
    let mut block = render_block();
    sl_input.process(0.6, &mut block);
    assert_eq!(block[Channel::Sl.index()], 0.6);
    assert_eq!(block[Channel::Sbl.index()], 0.6);

    // SBL becomes active: the conditional route to SBL stops contributing.
    registry.set_silent(Channel::Sbl, false);
    sl_input.eval_conditions(&registry);
    let mut block = render_block();
    sl_input.process(0.6, &mut block);
    assert_eq!(block[Channel::Sl.index()], 0.6);
    assert_eq!(block[Channel::Sbl.index()], 0.0);
}

/// Scenario 5: a configured PEQ has unity gain at DC and passes a settled
/// DC step at (approximately) unit amplitude, the same invariant
/// `Biquad::magnitude_db` checks at the coefficient level, now exercised
/// through the full compiled output chain.
#[test]
fn configured_peq_passes_a_settled_dc_step_near_unity() {
    let text = r#"{
        "devices": {"capture": "Speakers", "render": "Speakers"},
        "outputs": [{
            "channel": "L",
            "filters": [{"type": "PEQ", "freq": 1000, "q": 1.0, "gain": 6.0}]
        }]
    }"#;
    let lr = stereo();
    let compiled = sp_config::compile_document_text(text, 48_000.0, &lr, &lr, Path::new(".")).unwrap();
    let mut l_out = compiled.outputs.into_iter().find(|o| o.channel() == Channel::L).unwrap();

    let mut settled = 0.0;
    for _ in 0..200 {
        settled = l_out.process(1.0);
    }
    assert_abs_diff_eq!(settled, 1.0, epsilon = 0.02);
}

/// Boundary: a zero-gain, non-inverted gain spec is dropped at build time,
/// so an output with nothing else configured is a bare pass-through.
#[test]
fn zero_gain_output_has_no_filters_to_process() {
    let text = r#"{
        "devices": {"capture": "Speakers", "render": "Speakers"},
        "outputs": [{"channel": "L", "gain": 0.0}]
    }"#;
    let lr = stereo();
    let compiled = sp_config::compile_document_text(text, 48_000.0, &lr, &lr, Path::new(".")).unwrap();
    let mut l_out = compiled.outputs.into_iter().find(|o| o.channel() == Channel::L).unwrap();
    assert_eq!(l_out.process(0.37), 0.37);
}

/// Boundary: stereo-bass with an asymmetric subwoofer layout fails to
/// compile end-to-end, the same as it fails inside the basic-mode compiler.
#[test]
fn stereo_bass_asymmetric_subs_fails_the_full_compile() {
    let text = r#"{
        "devices": {"capture": "Speakers", "render": "Speakers"},
        "basic": {"front": "SMALL", "center": "SMALL", "subwoofer": "SUB", "stereoBass": true}
    }"#;
    let channels: HashSet<Channel> = [Channel::L, Channel::R, Channel::C, Channel::Sw].into_iter().collect();
    assert!(sp_config::compile_document_text(text, 48_000.0, &channels, &channels, Path::new(".")).is_err());
}
