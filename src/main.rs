//! camfilter CLI
//!
//! Command-line interface for converting and grading raw camera frames.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use camfilter::{
    lut::{parse_cube, read_table},
    ColorCube, Config, FilterContext, FilterRegistry, FrameProcessor, Resolution,
    Rotation, TableFormat, YuvFrame, YuvLayout, CUBE_SIZE,
};

/// Raw input layout for CLI
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum Layout {
    /// Y, U, V planes back to back
    #[default]
    I420,
    /// Y plane then interleaved UV
    Nv12,
    /// Y plane then interleaved VU (Android camera)
    Nv21,
}

impl From<Layout> for YuvLayout {
    fn from(l: Layout) -> Self {
        match l {
            Layout::I420 => YuvLayout::I420,
            Layout::Nv12 => YuvLayout::Nv12,
            Layout::Nv21 => YuvLayout::Nv21,
        }
    }
}

#[derive(Parser)]
#[command(name = "camfilter")]
#[command(about = "Camera frame YUV to RGBA conversion with 3D LUT filters")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show library information
    Info,

    /// List filters from a catalog
    Filters {
        /// Configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Convert a raw YUV frame to raw RGBA
    Process {
        /// Raw YUV input file
        input: PathBuf,

        /// Raw RGBA output file
        #[arg(short, long)]
        output: PathBuf,

        /// Frame width
        #[arg(long)]
        width: u32,

        /// Frame height
        #[arg(long)]
        height: u32,

        /// Input layout (i420, nv12, nv21)
        #[arg(short, long, value_enum, default_value = "i420")]
        layout: Layout,

        /// Configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Filter to activate (overrides the configured default)
        #[arg(short, long)]
        filter: Option<String>,

        /// Clockwise rotation in degrees (0, 90, 180, 270)
        #[arg(short, long)]
        rotate: Option<u32>,

        /// Mirror horizontally after rotating
        #[arg(short, long)]
        mirror: bool,
    },

    /// Convert a .cube table to the binary table format
    Pack {
        /// Input .cube file
        input: PathBuf,

        /// Output binary table
        output: PathBuf,
    },

    /// Run conversion benchmark
    Bench {
        /// Number of frames to process
        #[arg(short, long, default_value = "120")]
        frames: u32,

        /// Resolution (e.g., 1920x1080)
        #[arg(short, long, default_value = "1920x1080")]
        resolution: String,

        /// Table to grade through (identity cube when omitted)
        #[arg(short, long)]
        table: Option<PathBuf>,

        /// Skip the color table entirely
        #[arg(long)]
        no_filter: bool,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("camfilter=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Info => cmd_info(),
        Commands::Filters { config } => cmd_filters(config),
        Commands::Process {
            input,
            output,
            width,
            height,
            layout,
            config,
            filter,
            rotate,
            mirror,
        } => cmd_process(
            input, output, width, height, layout, config, filter, rotate, mirror,
        ),
        Commands::Pack { input, output } => cmd_pack(input, output),
        Commands::Bench {
            frames,
            resolution,
            table,
            no_filter,
        } => cmd_bench(frames, resolution, table, no_filter),
    }
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load(&path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(Config::default()),
    }
}

fn parse_resolution(text: &str) -> anyhow::Result<Resolution> {
    let (w, h) = text
        .split_once('x')
        .with_context(|| format!("resolution must look like 1920x1080, got {}", text))?;
    Ok(Resolution::new(w.trim().parse()?, h.trim().parse()?))
}

fn cmd_info() -> anyhow::Result<()> {
    println!("camfilter {}", camfilter::VERSION);
    println!("==============\n");

    println!("=== Conversion ===");
    println!("Matrix: BT.601 limited range (8.8 fixed point)");
    println!("Subsampling: 4:2:0");
    println!("Layouts: {}, {}, {}", YuvLayout::I420, YuvLayout::Nv12, YuvLayout::Nv21);

    println!("\n=== Color Table ===");
    println!("Lattice: {0}x{0}x{0}", CUBE_SIZE);
    println!("Interpolation: trilinear");
    println!("Formats: .cube, binary (f32 little-endian)");

    println!("\n=== Output Sizes ===");
    for res in [
        Resolution::VGA,
        Resolution::HD_720P,
        Resolution::FHD_1080P,
        Resolution::UHD_4K,
    ] {
        println!(
            "  {:<10} I420 {:>9} bytes -> RGBA {:>9} bytes",
            res.to_string(),
            YuvLayout::I420.frame_size(res.width, res.height),
            res.rgba_len()
        );
    }

    Ok(())
}

fn cmd_filters(config: Option<PathBuf>) -> anyhow::Result<()> {
    let config = load_config(config)?;
    let context = config.build_context()?;
    let active = context.active_name();

    println!("Available Filters");
    println!("=================\n");

    for name in context.registry().names() {
        let marker = if name == active { "*" } else { " " };
        let source = config
            .filters
            .catalog
            .iter()
            .rev()
            .find(|e| e.name == name)
            .map(|e| e.path.display().to_string())
            .unwrap_or_else(|| "identity".to_string());
        println!("  {} {:<16} {}", marker, name, source);
    }

    println!("\nUsage: camfilter process --filter <name> ...");

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_process(
    input: PathBuf,
    output: PathBuf,
    width: u32,
    height: u32,
    layout: Layout,
    config: Option<PathBuf>,
    filter: Option<String>,
    rotate: Option<u32>,
    mirror: bool,
) -> anyhow::Result<()> {
    let mut config = load_config(config)?;
    if let Some(degrees) = rotate {
        config.processor.orientation.rotation = Rotation::try_from(degrees)?;
    }
    if mirror {
        config.processor.orientation.mirror = true;
    }

    let processor = config.build_processor()?;
    if let Some(name) = &filter {
        let registry = processor.context().registry();
        if !registry.contains(name) {
            let available: Vec<&str> = registry.names().collect();
            anyhow::bail!("unknown filter '{}' (available: {})", name, available.join(", "));
        }
        processor.context().activate(name)?;
    }

    let data = std::fs::read(&input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let frame = YuvFrame::from_packed(&data, layout.into(), width, height)?;

    let image = processor.process(&frame)?;
    let resolution = image.resolution();
    let size = image.size_bytes();
    std::fs::write(&output, image.into_raw())
        .with_context(|| format!("failed to write {}", output.display()))?;

    let layout = YuvLayout::from(layout);
    println!("Processed frame:");
    println!(
        "  Input: {} {} {:?} ({} bytes)",
        frame.resolution(),
        layout,
        layout.chroma_layout(),
        data.len()
    );
    println!("  Filter: {}", processor.context().active_name());
    println!("  Output: {} RGBA ({} bytes)", resolution, size);
    println!("  Time: {:.2} ms", processor.stats().avg_frame_ms);

    Ok(())
}

fn cmd_pack(input: PathBuf, output: PathBuf) -> anyhow::Result<()> {
    let file = std::fs::File::open(&input)
        .with_context(|| format!("failed to open {}", input.display()))?;
    let cube = parse_cube(std::io::BufReader::new(file))?;
    let bytes = cube.to_bytes();
    std::fs::write(&output, &bytes)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!("Packed {} -> {} ({} bytes)", input.display(), output.display(), bytes.len());
    Ok(())
}

/// Synthetic NV21 frame: luma gradient with slowly drifting chroma
fn synthetic_frame(res: Resolution, seq: u32) -> Vec<u8> {
    let layout = YuvLayout::Nv21;
    let w = res.width as usize;
    let h = res.height as usize;
    let mut data = Vec::with_capacity(layout.frame_size(res.width, res.height));

    for j in 0..h {
        data.extend((0..w).map(|i| ((i + j + seq as usize) % 220 + 16) as u8));
    }
    let chroma = layout.frame_size(res.width, res.height) - data.len();
    data.extend((0..chroma).map(|k| (k as u32 + seq).wrapping_mul(7) as u8));
    data
}

fn cmd_bench(
    frames: u32,
    resolution: String,
    table: Option<PathBuf>,
    no_filter: bool,
) -> anyhow::Result<()> {
    println!("camfilter Conversion Benchmark");
    println!("==============================\n");

    let res = parse_resolution(&resolution)?;

    let mut builder = FilterRegistry::builder();
    let filter_name = if no_filter {
        None
    } else {
        let cube = match &table {
            Some(path) => read_table(path, TableFormat::from_path(path))?,
            None => ColorCube::identity(),
        };
        builder = builder.register("Bench", cube)?;
        Some("Bench")
    };

    let context = Arc::new(FilterContext::new(builder.build()));
    if let Some(name) = filter_name {
        context.activate(name)?;
    }
    let processor = FrameProcessor::new(context);

    println!("Frames: {}", frames);
    println!("Resolution: {}", res);
    println!("Filter: {}", processor.context().active_name());
    println!();

    println!("Running benchmark...\n");

    // Producer stands in for the camera callback thread
    let (tx, rx) = crossbeam_channel::bounded::<Vec<u8>>(4);
    let producer = std::thread::spawn(move || {
        for seq in 0..frames {
            if tx.send(synthetic_frame(res, seq)).is_err() {
                break;
            }
        }
    });

    let start = Instant::now();
    let mut output_bytes = 0usize;
    for data in rx.iter() {
        let frame = YuvFrame::from_packed(&data, YuvLayout::Nv21, res.width, res.height)?;
        output_bytes += processor.process(&frame)?.size_bytes();
    }
    let elapsed = start.elapsed();

    if producer.join().is_err() {
        anyhow::bail!("frame producer thread panicked");
    }

    let stats = processor.stats();
    let fps = stats.frames_processed as f64 / elapsed.as_secs_f64();

    println!("Results:");
    println!("  Total time: {:.2}s", elapsed.as_secs_f64());
    println!("  Processing FPS: {:.1}", fps);
    println!("  ms/frame: {:.2}", stats.avg_frame_ms);
    println!(
        "  Realtime capable (30fps): {}",
        if fps >= 30.0 { "Yes" } else { "No" }
    );
    println!(
        "  Realtime capable (60fps): {}",
        if fps >= 60.0 { "Yes" } else { "No" }
    );

    println!("\nProcessor Stats:");
    println!("  Frames processed: {}", stats.frames_processed);
    println!("  Frames failed: {}", stats.frames_failed);
    println!("  Bytes output: {}", output_bytes);

    Ok(())
}
