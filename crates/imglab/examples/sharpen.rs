//! Example: unsharp-style sharpening of a grayscale PNG.
//!
//! Loads the input, runs a 3x3 sharpen kernel through the convolution
//! engine and writes the result next to the input. Only the eroded ROI is
//! written; the one-pixel border stays black.
//!
//! Run from the workspace root:
//!   cargo run -p imglab --example sharpen -- --input data/frame.png

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use image::{GrayImage, ImageReader};
use imglab::{Img, Kernel, Point, Size, convolve};

#[derive(Parser, Debug)]
#[command(about = "Sharpen a grayscale PNG with the imglab filter engine")]
struct Args {
    /// Path to the input PNG
    #[arg(long, default_value = "data/frame.png")]
    input: String,

    /// Output PNG path (default: <input stem>_sharp.png next to input)
    #[arg(long)]
    out: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let gray = ImageReader::open(&args.input)
        .with_context(|| format!("open {}", args.input))?
        .decode()
        .context("decode input image")?
        .to_luma8();
    let (w, h) = gray.dimensions();

    let src = Img::from_planes(Size::new(w as usize, h as usize), vec![gray.into_raw()])
        .context("wrap input plane")?;
    let mut dst = Img::<u8>::with_channels(Size::new(1, 1), 1).context("allocate destination")?;

    let kernel = Kernel::from_i32(
        Size::new(3, 3),
        Point::new(1, 1),
        vec![0, -1, 0, -1, 5, -1, 0, -1, 0],
        1,
    )
    .context("build sharpen kernel")?;

    let started = Instant::now();
    convolve(&src, &mut dst, &kernel).context("convolve")?;
    println!(
        "sharpened {}x{} in {:.2} ms",
        w,
        h,
        started.elapsed().as_secs_f64() * 1e3
    );

    let out_path = args.out.unwrap_or_else(|| {
        let stem = args.input.trim_end_matches(".png");
        format!("{stem}_sharp.png")
    });
    let out = GrayImage::from_raw(w, h, dst.channel(0).to_vec())
        .context("assemble output image")?;
    out.save(&out_path).with_context(|| format!("save {out_path}"))?;
    println!("wrote {out_path}");

    Ok(())
}
