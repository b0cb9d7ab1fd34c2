//! File-based reverb processing command.

use super::common::{build_effect, load_preset, peak_db, progress_bar, rms_db};
use crate::wav::{WavSpec, read_wav_stereo, write_wav_stereo};
use clap::Args;
use reverblab_config::parse_param_assignment;
use reverblab_fx::ParamId;
use std::path::PathBuf;

#[derive(Args)]
pub struct ProcessArgs {
    /// Input WAV file (mono is upmixed to stereo)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file (always stereo)
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Preset name or TOML file
    #[arg(short, long, default_value = "init")]
    preset: String,

    /// Parameter override (e.g., "rt60=3.5"); repeatable
    #[arg(long, value_parser = parse_param_assignment, number_of_values = 1)]
    param: Vec<(ParamId, f32)>,

    /// Processing block size
    #[arg(long, default_value = "512")]
    block_size: usize,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "32")]
    bit_depth: u16,

    /// Stop at the end of the input instead of appending the reverb tail
    #[arg(long)]
    no_tail: bool,
}

pub fn run(args: ProcessArgs) -> anyhow::Result<()> {
    if args.block_size == 0 {
        anyhow::bail!("block size must be at least 1");
    }

    println!("Reading {}...", args.input.display());
    let (input, spec) = read_wav_stereo(&args.input)?;
    println!(
        "  {} frames, {} channel(s), {} Hz, {:.2}s",
        input.len(),
        spec.channels,
        spec.sample_rate,
        input.duration_secs(spec.sample_rate)
    );

    let preset = load_preset(&args.preset, &args.param)?;
    println!("Preset: {}", preset.name);
    let sample_rate = spec.sample_rate as f32;
    let mut fx = build_effect(&preset, sample_rate, args.block_size)?;

    let tail = if args.no_tail { 0 } else { fx.tail_frames() };
    let total = input.len() + tail;
    let mut output = input.clone();
    output.left.resize(total, 0.0);
    output.right.resize(total, 0.0);

    tracing::debug!(frames = input.len(), tail, "processing");
    let pb = progress_bar(total as u64)?;
    let mut done = 0;
    for (left, right) in output
        .left
        .chunks_mut(args.block_size)
        .zip(output.right.chunks_mut(args.block_size))
    {
        let input_finished = done >= input.len();
        if !input_finished && done + left.len() > input.len() {
            // Block straddles the end of the input
            let split = input.len() - done;
            let (live_l, tail_l) = left.split_at_mut(split);
            let (live_r, tail_r) = right.split_at_mut(split);
            fx.process(live_l, live_r, false);
            fx.process(tail_l, tail_r, true);
        } else {
            fx.process(left, right, input_finished);
        }
        done += left.len();
        pb.set_position(done as u64);
    }
    pb.finish_with_message("done");

    println!("\nStats:");
    for (label, samples) in [("Input", &input), ("Output", &output)] {
        println!(
            "  {label:<7} L: RMS {:.1} dB, Peak {:.1} dB | R: RMS {:.1} dB, Peak {:.1} dB",
            rms_db(&samples.left),
            peak_db(&samples.left),
            rms_db(&samples.right),
            peak_db(&samples.right),
        );
    }

    let out_spec = WavSpec {
        channels: 2,
        sample_rate: spec.sample_rate,
        bits_per_sample: args.bit_depth,
    };
    println!("\nWriting {}...", args.output.display());
    write_wav_stereo(&args.output, &output, out_spec)?;
    println!("Done!");

    Ok(())
}
