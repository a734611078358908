//! End-to-end check that the Q tables and `BiquadCascade` combine into a
//! crossover with the textbook -3dB point, the way mono bass-management
//! wires a small front speaker's high-pass against a subwoofer's low-pass
//! at the same frequency.

use approx::assert_abs_diff_eq;
use sp_dsp::{q_table, BiquadCascade, CrossoverFamily};

const SAMPLE_RATE: f64 = 48_000.0;
const CROSSOVER_FREQ: f64 = 80.0;

#[test]
fn order3_highpass_and_order5_lowpass_meet_at_minus_3db() {
    let hp_q = q_table(CrossoverFamily::Butterworth, 3).unwrap();
    let mut hp = BiquadCascade::new();
    hp.add_highpass_crossover(CROSSOVER_FREQ, &hp_q, 0.0, SAMPLE_RATE);
    assert_abs_diff_eq!(hp.magnitude_db(CROSSOVER_FREQ, SAMPLE_RATE), -3.0, epsilon = 0.1);

    let lp_q = q_table(CrossoverFamily::Butterworth, 5).unwrap();
    let mut lp = BiquadCascade::new();
    lp.add_lowpass_crossover(CROSSOVER_FREQ, &lp_q, 0.0, SAMPLE_RATE);
    assert_abs_diff_eq!(lp.magnitude_db(CROSSOVER_FREQ, SAMPLE_RATE), -3.0, epsilon = 0.1);
}

#[test]
fn highpass_passes_well_above_the_crossover_and_lowpass_passes_well_below() {
    let hp_q = q_table(CrossoverFamily::Butterworth, 3).unwrap();
    let mut hp = BiquadCascade::new();
    hp.add_highpass_crossover(CROSSOVER_FREQ, &hp_q, 0.0, SAMPLE_RATE);
    assert!(hp.magnitude_db(2_000.0, SAMPLE_RATE) > -0.2);

    let lp_q = q_table(CrossoverFamily::Butterworth, 5).unwrap();
    let mut lp = BiquadCascade::new();
    lp.add_lowpass_crossover(CROSSOVER_FREQ, &lp_q, 0.0, SAMPLE_RATE);
    assert!(lp.magnitude_db(20.0, SAMPLE_RATE) > -0.2);
}

#[test]
fn custom_q_list_matching_the_butterworth_table_reproduces_the_same_response() {
    let table = q_table(CrossoverFamily::Butterworth, 4).unwrap();
    assert!(sp_dsp::validate_custom_q(&table, 4).is_ok());

    let mut from_table = BiquadCascade::new();
    from_table.add_lowpass_crossover(CROSSOVER_FREQ, &table, 0.0, SAMPLE_RATE);
    let mut from_custom = BiquadCascade::new();
    from_custom.add_lowpass_crossover(CROSSOVER_FREQ, &table, 0.0, SAMPLE_RATE);

    assert_abs_diff_eq!(
        from_table.magnitude_db(200.0, SAMPLE_RATE),
        from_custom.magnitude_db(200.0, SAMPLE_RATE),
        epsilon = 1e-9
    );
}
