use std::fs;
use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use clap::{Parser, Subcommand};
use codec::DecodeLimits;
use tools::LevelSummary;

#[derive(Parser)]
#[command(
    name = "ldec-tools",
    version,
    about = "Level file inspection and transform tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode a level and report its name, counts, and metadata.
    Info {
        /// Path to the level file.
        level_path: PathBuf,
        /// Emit the summary as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Decode a level, rewrite its geometry, and encode it again.
    Transform {
        /// Path to the input level file.
        input: PathBuf,
        /// Path the transformed level is written to.
        output: PathBuf,
        /// Scale the level up by an integer factor.
        #[arg(long, default_value_t = 1)]
        upscale: u32,
        /// Shift the level horizontally, in pixels.
        #[arg(long, default_value_t = 0.0)]
        translate_x: f64,
        /// Shift the level vertically, in pixels.
        #[arg(long, default_value_t = 0.0)]
        translate_y: f64,
    },
}

fn main() -> Result<()> {
    match Cli::parse().command {
        Command::Info { level_path, json } => {
            let level = load_level(&level_path)?;
            let summary = tools::inspect(&level);
            if json {
                let rendered =
                    serde_json::to_string_pretty(&summary).context("serialize summary")?;
                println!("{rendered}");
            } else {
                print_summary(&summary);
            }
        }
        Command::Transform {
            input,
            output,
            upscale,
            translate_x,
            translate_y,
        } => {
            ensure!(upscale >= 1, "upscale factor must be at least 1");
            let mut level = load_level(&input)?;
            tools::upscale(&mut level, upscale);
            if translate_x != 0.0 || translate_y != 0.0 {
                tools::translate(&mut level, translate_x, translate_y);
            }
            let bytes = codec::encode_level(&mut level)
                .with_context(|| format!("encode level {}", output.display()))?;
            fs::write(&output, bytes)
                .with_context(|| format!("write level {}", output.display()))?;
        }
    }
    Ok(())
}

fn load_level(path: &PathBuf) -> Result<level::Level> {
    let bytes = fs::read(path).with_context(|| format!("read level {}", path.display()))?;
    codec::decode_level(&bytes, &DecodeLimits::default())
        .with_context(|| format!("decode level {}", path.display()))
}

fn print_summary(summary: &LevelSummary) {
    println!("name: {}", summary.name);
    println!(
        "type: {} virtual_character: {}",
        summary.level_type, summary.virtual_character
    );
    println!("tiles: {}", summary.tiles);
    for (layer, count) in &summary.tiles_by_layer {
        println!("  layer {layer}: {count}");
    }
    println!(
        "entities: {} props: {} variables: {}",
        summary.entities, summary.props, summary.variables
    );
    println!("thumbnail: {} bytes", summary.thumbnail_bytes);
    println!(
        "backdrop: {} tiles, {} props",
        summary.backdrop_tiles, summary.backdrop_props
    );
}
