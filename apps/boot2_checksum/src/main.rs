//! Computes the checksum for the RP2040 second stage bootloader (boot2) and
//! writes the padded image out as assembly. The RP2040 won't boot if the
//! checksum is missing or incorrect.
//!
//! Same job as the `pad_checksum` script of the Raspberry Pi Pico SDK.

mod boot2;
mod crc32;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about = "Pad and checksum an RP2040 boot2 image")]
struct Args {
    /// Raw boot2 binary, at most 252 bytes
    input: PathBuf,
    /// Assembly file to write
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let args = Args::parse();

    let input = std::fs::read(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    log::debug!("read {} bytes from {}", input.len(), args.input.display());

    let image = boot2::pad_and_checksum(&input)?;
    log::info!(
        "checksum {:02x?} over {} bytes",
        &image[boot2::MAX_INPUT_LEN..],
        boot2::MAX_INPUT_LEN
    );

    let source = std::fs::canonicalize(&args.input).unwrap_or_else(|_| args.input.clone());
    let asm = boot2::render_asm(&image, &source);

    std::fs::write(&args.output, asm)
        .with_context(|| format!("writing {}", args.output.display()))?;
    log::info!("wrote {}", args.output.display());

    Ok(())
}
