//! Impulse response rendering and decay measurement.

use super::common::{build_effect, describe_params, load_preset, progress_bar};
use crate::wav::{StereoSamples, WavSpec, write_wav_stereo};
use clap::Args;
use reverblab_analysis::{ImpulseResponse, SpectrumAnalyzer, Window, spectral_centroid};
use reverblab_config::parse_param_assignment;
use reverblab_fx::ParamId;
use std::path::PathBuf;

/// Analysis window for the spectral centroid.
const CENTROID_FFT_SIZE: usize = 4096;

#[derive(Args)]
pub struct ImpulseArgs {
    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Preset name or TOML file
    #[arg(short, long, default_value = "init")]
    preset: String,

    /// Parameter override (e.g., "rt60=3.5"); repeatable
    #[arg(long, value_parser = parse_param_assignment, number_of_values = 1)]
    param: Vec<(ParamId, f32)>,

    /// Sample rate in Hz
    #[arg(long, default_value = "48000")]
    sample_rate: u32,

    /// Length in seconds (default: 1.5 x RT60 plus two room lengths)
    #[arg(long)]
    seconds: Option<f32>,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "32")]
    bit_depth: u16,
}

pub fn run(args: ImpulseArgs) -> anyhow::Result<()> {
    // The response is wet only
    let mut overrides = args.param;
    overrides.push((ParamId::DryWetMix, 100.0));
    let preset = load_preset(&args.preset, &overrides)?;

    println!("Preset: {}", preset.name);
    for line in describe_params(&preset) {
        println!("{line}");
    }

    let rt60 = preset.param(ParamId::Rt60);
    let secs = args.seconds.unwrap_or_else(|| {
        rt60 * 1.5 + 2.0 * preset.param(ParamId::RoomSize) * 0.001
    });
    let sample_rate = args.sample_rate as f32;
    let frames = (secs.max(0.0) * sample_rate) as usize;
    if frames == 0 {
        anyhow::bail!("impulse response length must be positive");
    }

    let block_size = 512;
    let mut fx = build_effect(&preset, sample_rate, block_size)?;
    let mut left = vec![0.0f32; frames];
    let mut right = vec![0.0f32; frames];
    left[0] = 1.0;
    right[0] = 1.0;

    println!("\nRendering {frames} frames ({secs:.2}s)...");
    let pb = progress_bar(frames as u64)?;
    let mut done = 0;
    for (l, r) in left.chunks_mut(block_size).zip(right.chunks_mut(block_size)) {
        fx.process(l, r, false);
        done += l.len();
        pb.set_position(done as u64);
    }
    pb.finish_with_message("done");

    let samples = StereoSamples::new(left, right);
    let spec = WavSpec {
        channels: 2,
        sample_rate: args.sample_rate,
        bits_per_sample: args.bit_depth,
    };
    write_wav_stereo(&args.output, &samples, spec)?;
    println!("Wrote {}", args.output.display());

    let ir = ImpulseResponse::new(sample_rate, vec![samples.left, samples.right]);
    let reference_db = preset.engine.decay_reference_db;
    // Reaching `reference_db` in rt60 seconds means reaching -60 dB later
    let expected = rt60 * 60.0 / reference_db.unsigned_abs() as f32;

    println!("\nDecay:");
    println!("  Requested RT60: {rt60:.2}s (reference {reference_db} dB)");
    if reference_db != -60 {
        println!("  Expected T60:   {expected:.2}s");
    }
    match ir.estimate_rt60() {
        Some(est) => {
            println!("  Measured RT60:  {:.2}s", est.rt60_seconds);
            println!("  EDT:            {:.2}s", est.edt_seconds);
            println!("  T20:            {:.2}s", est.t20_seconds);
            match est.t30_seconds {
                Some(t30) => println!("  T30:            {t30:.2}s"),
                None => println!("  T30:            n/a (response too short)"),
            }
            println!("  EDC linearity:  {:.3}", est.correlation);
            println!(
                "  Error:          {:+.1}%",
                (est.rt60_seconds / expected - 1.0) * 100.0
            );
        }
        None => println!("  Measured RT60:  n/a (no 25 dB decay in the rendered length)"),
    }

    if let Some(channel) = ir.channel(0)
        && channel.len() >= 2 * CENTROID_FFT_SIZE
    {
        let mut analyzer = SpectrumAnalyzer::new(CENTROID_FFT_SIZE, Window::Hann);
        let early = spectral_centroid(&analyzer.magnitude(channel), sample_rate);
        let late_start = channel.len() / 2;
        let late = spectral_centroid(&analyzer.magnitude(&channel[late_start..]), sample_rate);
        println!("\nSpectral centroid:");
        println!("  Start:          {early:.0} Hz");
        println!(
            "  At {:.2}s:       {late:.0} Hz",
            late_start as f32 / sample_rate
        );
    }

    Ok(())
}
