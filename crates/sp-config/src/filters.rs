//! Turning a parsed `FilterSpec` into a concrete `sp_dsp::Filter`.

use crate::document::{BiquadValue, FilterSpec};
use crate::error::{ConfigError, DspBuildError};
use sp_dsp::{BiquadCascade, BiquadCoeffs, CrossoverFamily, Filter, Fir};
use std::path::Path;

fn crossover_q(
    crossover_type: Option<CrossoverFamily>,
    order: u8,
    explicit_q: &Option<Vec<f64>>,
    path: &str,
) -> Result<Vec<f64>, ConfigError> {
    let family = crossover_type.unwrap_or(CrossoverFamily::Butterworth);
    match family {
        CrossoverFamily::Custom => {
            let q = explicit_q
                .clone()
                .ok_or_else(|| ConfigError::invalid(path, "custom crossover requires an explicit q list"))?;
            sp_dsp::validate_custom_q(&q, order).map_err(|e| ConfigError::Dsp {
                path: path.to_string(),
                source: DspBuildError::Crossover(e),
            })?;
            Ok(q)
        }
        other => sp_dsp::q_table(other, order).map_err(|e| ConfigError::Dsp {
            path: path.to_string(),
            source: DspBuildError::Crossover(e),
        }),
    }
}

fn biquad_value_coeffs(v: &BiquadValue) -> BiquadCoeffs {
    BiquadCoeffs {
        b0: v.b0 / v.a0,
        b1: v.b1 / v.a0,
        b2: v.b2 / v.a0,
        a1: v.a1 / v.a0,
        a2: v.a2 / v.a0,
    }
}

/// Build the DSP filter a spec describes. `path` is the JSON path this spec
/// was read from, used only for error attribution. `config_dir` anchors
/// relative FIR file paths.
pub fn build_filter(
    spec: &FilterSpec,
    path: &str,
    sample_rate: f64,
    config_dir: &Path,
) -> Result<Filter, ConfigError> {
    let filter = match spec {
        FilterSpec::LowPass {
            freq,
            crossover_type,
            order,
            q,
        } => {
            let q_values = crossover_q(*crossover_type, *order, q, path)?;
            let mut cascade = BiquadCascade::new();
            cascade.add_lowpass_crossover(*freq, &q_values, 0.0, sample_rate);
            Filter::Biquad(cascade)
        }
        FilterSpec::HighPass {
            freq,
            crossover_type,
            order,
            q,
        } => {
            let q_values = crossover_q(*crossover_type, *order, q, path)?;
            let mut cascade = BiquadCascade::new();
            cascade.add_highpass_crossover(*freq, &q_values, 0.0, sample_rate);
            Filter::Biquad(cascade)
        }
        FilterSpec::LowShelf { freq, gain, q } => {
            let mut cascade = BiquadCascade::new();
            cascade.push(BiquadCoeffs::low_shelf(*freq, *gain, *q, sample_rate));
            Filter::Biquad(cascade)
        }
        FilterSpec::HighShelf { freq, gain, q } => {
            let mut cascade = BiquadCascade::new();
            cascade.push(BiquadCoeffs::high_shelf(*freq, *gain, *q, sample_rate));
            Filter::Biquad(cascade)
        }
        FilterSpec::Peq { freq, q, gain } => {
            let mut cascade = BiquadCascade::new();
            cascade.push(BiquadCoeffs::peaking(*freq, *gain, *q, sample_rate));
            Filter::Biquad(cascade)
        }
        FilterSpec::BandPass { freq, bandwidth, gain } => {
            let mut cascade = BiquadCascade::new();
            cascade.push(BiquadCoeffs::band_pass(*freq, *bandwidth, *gain, sample_rate));
            Filter::Biquad(cascade)
        }
        FilterSpec::Notch { freq, bandwidth, gain } => {
            let mut cascade = BiquadCascade::new();
            cascade.push(BiquadCoeffs::notch(*freq, *bandwidth, *gain, sample_rate));
            Filter::Biquad(cascade)
        }
        FilterSpec::LinkwitzTransform { f0, q0, fp, qp } => {
            let mut cascade = BiquadCascade::new();
            cascade.push(BiquadCoeffs::linkwitz_transform(*f0, *q0, *fp, *qp, sample_rate));
            Filter::Biquad(cascade)
        }
        FilterSpec::Biquad { values } => {
            let mut cascade = BiquadCascade::new();
            for v in values {
                cascade.push(biquad_value_coeffs(v));
            }
            Filter::Biquad(cascade)
        }
        FilterSpec::Fir { file } => {
            let file_path = config_dir.join(file);
            let taps = crate::fir::load_taps(&file_path, sample_rate as u32)?;
            Filter::Fir(Fir::new(taps))
        }
    };
    Ok(filter)
}
