use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use image::{GrayImage, ImageReader, RgbImage};
use serde::Serialize;

use il_core::{Img, Rect, ScaleMode, Size};
use il_filter::{
    CmpOp, Kernel, and, and_const, close, compare_const, convolve, dilate, erode, median, not,
    open, or, or_const, xor, xor_const,
};

#[derive(Parser, Debug)]
#[command(name = "il_gallery")]
#[command(about = "Run imglab filters on external PNG fixtures")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convolve with a preset kernel.
    Convolve(ConvolveArgs),
    /// Median filter.
    Median(WindowArgs),
    /// Grayscale morphology.
    Morphology(MorphologyArgs),
    /// Bitwise logic against a second image or a constant.
    Logical(LogicalArgs),
    /// Threshold against a constant, writing a binary mask.
    Threshold(ThresholdArgs),
    /// Resample to a new size.
    Scale(ScaleArgs),
    /// Min/max statistics as JSON.
    Stats(CommonArgs),
}

#[derive(Args, Debug, Clone)]
struct CommonArgs {
    #[arg(long, required = true)]
    input: PathBuf,
    #[arg(long, default_value = "out")]
    out: PathBuf,
    /// Restrict processing to `x,y,w,h` of the input.
    #[arg(long)]
    roi: Option<String>,
}

#[derive(Args, Debug, Clone)]
struct ConvolveArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// One of: identity, box3, gauss3, sobel_x, sobel_y, laplace
    #[arg(long, default_value = "gauss3")]
    kernel: String,
}

#[derive(Args, Debug, Clone)]
struct WindowArgs {
    #[command(flatten)]
    common: CommonArgs,
    #[arg(long, default_value_t = 3)]
    width: usize,
    #[arg(long, default_value_t = 3)]
    height: usize,
}

#[derive(Args, Debug, Clone)]
struct MorphologyArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// One of: erode, dilate, open, close
    #[arg(long, default_value = "open")]
    op: String,
    #[arg(long, default_value_t = 3)]
    width: usize,
    #[arg(long, default_value_t = 3)]
    height: usize,
}

#[derive(Args, Debug, Clone)]
struct LogicalArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// One of: and, or, xor, not
    #[arg(long, default_value = "and")]
    op: String,
    /// Second operand image; mutually exclusive with --value.
    #[arg(long, conflicts_with = "value")]
    with: Option<PathBuf>,
    /// Constant operand for and/or/xor.
    #[arg(long)]
    value: Option<u8>,
}

#[derive(Args, Debug, Clone)]
struct ThresholdArgs {
    #[command(flatten)]
    common: CommonArgs,
    #[arg(long, default_value_t = 128)]
    level: u8,
}

#[derive(Args, Debug, Clone)]
struct ScaleArgs {
    #[command(flatten)]
    common: CommonArgs,
    #[arg(long, required = true)]
    width: usize,
    #[arg(long, required = true)]
    height: usize,
    /// One of: nearest, bilinear
    #[arg(long, default_value = "bilinear")]
    mode: String,
}

#[derive(Serialize)]
struct ChannelStats {
    channel: usize,
    min: u8,
    max: u8,
    roi_min: u8,
    roi_max: u8,
}

#[derive(Serialize)]
struct StatsReport {
    input: String,
    width: usize,
    height: usize,
    channels: usize,
    roi: Rect,
    per_channel: Vec<ChannelStats>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.cmd {
        Command::Convolve(args) => run_convolve(args),
        Command::Median(args) => run_median(args),
        Command::Morphology(args) => run_morphology(args),
        Command::Logical(args) => run_logical(args),
        Command::Threshold(args) => run_threshold(args),
        Command::Scale(args) => run_scale(args),
        Command::Stats(args) => run_stats(args),
    }
}

fn load_image(common: &CommonArgs) -> Result<Img<u8>> {
    let decoded = ImageReader::open(&common.input)
        .with_context(|| format!("open {}", common.input.display()))?
        .decode()
        .context("decode input image")?;

    let rgb = decoded.to_rgb8();
    let (w, h) = rgb.dimensions();
    let size = Size::new(w as usize, h as usize);

    let mut planes = vec![Vec::with_capacity(size.area()); 3];
    for px in rgb.pixels() {
        planes[0].push(px.0[0]);
        planes[1].push(px.0[1]);
        planes[2].push(px.0[2]);
    }

    let mut img = Img::from_planes(size, planes).context("wrap input planes")?;
    if let Some(spec) = &common.roi {
        img.set_roi(Some(parse_roi(spec)?))
            .context("apply --roi")?;
    }
    Ok(img)
}

fn parse_roi(spec: &str) -> Result<Rect> {
    let parts: Vec<usize> = spec
        .split(',')
        .map(|p| p.trim().parse::<usize>())
        .collect::<Result<_, _>>()
        .with_context(|| format!("parse roi '{spec}'"))?;
    if parts.len() != 4 {
        bail!("--roi expects x,y,w,h, got '{spec}'");
    }
    Ok(Rect::new(parts[0], parts[1], parts[2], parts[3]))
}

fn save_image(img: &Img<u8>, out_dir: &Path, name: &str) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("create {}", out_dir.display()))?;
    let path = out_dir.join(format!("{name}.png"));

    let size = img.size();
    let (w, h) = (size.width as u32, size.height as u32);
    match img.channel_count() {
        1 => {
            let gray = GrayImage::from_raw(w, h, img.channel(0).to_vec())
                .context("assemble gray output")?;
            gray.save(&path)?;
        }
        3 => {
            let r = img.channel(0).read();
            let g = img.channel(1).read();
            let b = img.channel(2).read();
            let mut interleaved = Vec::with_capacity(size.area() * 3);
            for i in 0..size.area() {
                interleaved.extend_from_slice(&[r[i], g[i], b[i]]);
            }
            let rgb =
                RgbImage::from_raw(w, h, interleaved).context("assemble rgb output")?;
            rgb.save(&path)?;
        }
        n => bail!("cannot save an image with {n} channels as PNG"),
    }

    println!("wrote {}", path.display());
    Ok(path)
}

fn run_convolve(args: ConvolveArgs) -> Result<()> {
    let kernel = match args.kernel.as_str() {
        "identity" => Kernel::identity(Size::new(3, 3))?,
        "box3" => Kernel::box_blur(Size::new(3, 3))?,
        "gauss3" => Kernel::gauss3(),
        "sobel_x" => Kernel::sobel_x(),
        "sobel_y" => Kernel::sobel_y(),
        "laplace" => Kernel::laplace(),
        other => bail!("unknown kernel '{other}'"),
    };

    let src = load_image(&args.common)?;
    let mut dst = Img::<u8>::with_channels(Size::new(1, 1), 1)?;
    convolve(&src, &mut dst, &kernel).context("convolve")?;
    save_image(&dst, &args.common.out, &format!("convolve_{}", args.kernel))?;
    Ok(())
}

fn run_median(args: WindowArgs) -> Result<()> {
    let src = load_image(&args.common)?;
    let mut dst = Img::<u8>::with_channels(Size::new(1, 1), 1)?;
    median(&src, &mut dst, Size::new(args.width, args.height)).context("median")?;
    save_image(
        &dst,
        &args.common.out,
        &format!("median_{}x{}", args.width, args.height),
    )?;
    Ok(())
}

fn run_morphology(args: MorphologyArgs) -> Result<()> {
    let src = load_image(&args.common)?;
    let mut dst = Img::<u8>::with_channels(Size::new(1, 1), 1)?;
    let mask = Size::new(args.width, args.height);

    match args.op.as_str() {
        "erode" => erode(&src, &mut dst, mask).context("erode")?,
        "dilate" => dilate(&src, &mut dst, mask).context("dilate")?,
        "open" => open(&src, &mut dst, mask).context("open")?,
        "close" => close(&src, &mut dst, mask).context("close")?,
        other => bail!("unknown morphology op '{other}'"),
    }
    save_image(&dst, &args.common.out, &format!("morph_{}", args.op))?;
    Ok(())
}

fn run_logical(args: LogicalArgs) -> Result<()> {
    let src = load_image(&args.common)?;
    let mut dst = Img::<u8>::with_channels(Size::new(1, 1), 1)?;

    match (args.op.as_str(), &args.with, args.value) {
        ("not", None, None) => not(&src, &mut dst).context("not")?,
        (op, Some(path), None) => {
            let mut other = args.common.clone();
            other.input = path.clone();
            let b = load_image(&other)?;
            match op {
                "and" => and(&src, &b, &mut dst).context("and")?,
                "or" => or(&src, &b, &mut dst).context("or")?,
                "xor" => xor(&src, &b, &mut dst).context("xor")?,
                other => bail!("unknown logical op '{other}'"),
            }
        }
        (op, None, Some(value)) => match op {
            "and" => and_const(&src, value, &mut dst).context("and_const")?,
            "or" => or_const(&src, value, &mut dst).context("or_const")?,
            "xor" => xor_const(&src, value, &mut dst).context("xor_const")?,
            other => bail!("unknown logical op '{other}'"),
        },
        ("not", _, _) => bail!("'not' takes no second operand"),
        _ => bail!("logical needs exactly one of --with or --value"),
    }
    save_image(&dst, &args.common.out, &format!("logical_{}", args.op))?;
    Ok(())
}

fn run_threshold(args: ThresholdArgs) -> Result<()> {
    let src = load_image(&args.common)?;
    let mut mask = Img::<u8>::with_channels(Size::new(1, 1), 1)?;
    compare_const(&src, args.level, CmpOp::GtEq, &mut mask).context("threshold")?;
    save_image(&mask, &args.common.out, &format!("threshold_{}", args.level))?;
    Ok(())
}

fn run_scale(args: ScaleArgs) -> Result<()> {
    let mode = match args.mode.as_str() {
        "nearest" => ScaleMode::Nearest,
        "bilinear" => ScaleMode::Bilinear,
        other => bail!("unknown scale mode '{other}'"),
    };

    let src = load_image(&args.common)?;
    let mut dst = Img::<u8>::with_channels(Size::new(args.width, args.height), 1)?;
    src.scaled_copy_into(&mut dst, mode).context("scale")?;
    save_image(
        &dst,
        &args.common.out,
        &format!("scale_{}x{}_{}", args.width, args.height, args.mode),
    )?;
    Ok(())
}

fn run_stats(args: CommonArgs) -> Result<()> {
    let img = load_image(&args)?;

    let mut per_channel = Vec::new();
    for ch in 0..img.channel_count() {
        let (min, max) = img.min_max(ch)?;
        let (roi_min, roi_max) = img.min_max_roi(ch)?;
        per_channel.push(ChannelStats {
            channel: ch,
            min,
            max,
            roi_min,
            roi_max,
        });
    }

    let report = StatsReport {
        input: args.input.display().to_string(),
        width: img.width(),
        height: img.height(),
        channels: img.channel_count(),
        roi: img.roi(),
        per_channel,
    };

    fs::create_dir_all(&args.out).with_context(|| format!("create {}", args.out.display()))?;
    let path = args.out.join("stats.json");
    fs::write(&path, serde_json::to_string_pretty(&report)?)
        .with_context(|| format!("write {}", path.display()))?;
    println!("wrote {}", path.display());
    Ok(())
}
