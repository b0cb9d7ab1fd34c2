//! Decay-time accuracy of the full reverberator.
//!
//! Renders impulse responses and measures T30 on the energy decay curve
//! summed over all channels. The 8 kHz rate keeps the renders short.

use reverblab_analysis::ImpulseResponse;
use reverblab_core::{DecayReference, ReverbConfig, Reverberator};

const SAMPLE_RATE: f32 = 8000.0;

fn measured_t30(config: ReverbConfig) -> f32 {
    let mut reverb: Reverberator<8, 5> = Reverberator::new(config);
    reverb.configure(SAMPLE_RATE, 64).unwrap();

    let secs = config.rt60 * 1.2 + 0.3;
    let ir = ImpulseResponse::render(&mut reverb, (secs * SAMPLE_RATE) as usize).unwrap();
    let estimate = ir.estimate_rt60().expect("response should decay");
    estimate.t30_seconds.expect("response should reach -35 dB")
}

#[test]
fn rt60_within_ten_percent_of_target() {
    for room_size_ms in [30.0, 50.0] {
        for rt60 in [0.5f32, 2.0, 5.0] {
            for seed in [0, 7] {
                let t30 = measured_t30(ReverbConfig {
                    room_size_ms,
                    rt60,
                    seed,
                    ..ReverbConfig::default()
                });
                let ratio = t30 / rt60;
                assert!(
                    (0.9..=1.1).contains(&ratio),
                    "room {room_size_ms} ms, rt60 {rt60} s, seed {seed}: measured {t30:.3} s (ratio {ratio:.3})"
                );
            }
        }
    }
}

#[test]
fn minus_45_reference_lengthens_decay() {
    let base = ReverbConfig {
        room_size_ms: 50.0,
        rt60: 1.0,
        ..ReverbConfig::default()
    };
    let t60 = measured_t30(base);
    let t45 = measured_t30(ReverbConfig {
        decay_reference: DecayReference::Minus45Db,
        ..base
    });
    // Reaching -45 dB in rt60 means reaching -60 dB in 4/3 * rt60
    let ratio = t45 / t60;
    assert!((1.2..=1.45).contains(&ratio), "ratio {ratio:.3}");
}

#[test]
fn longer_rt60_decays_slower() {
    let config = |rt60| ReverbConfig {
        room_size_ms: 50.0,
        rt60,
        ..ReverbConfig::default()
    };
    assert!(measured_t30(config(1.0)) < measured_t30(config(3.0)));
}
