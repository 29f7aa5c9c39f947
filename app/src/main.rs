mod obj;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use env_logger::Builder;
use log::LevelFilter;
use serde::Serialize;

use pcd_core::pointcloud::{
    cloud::AsprCloud,
    field::FieldKind,
    gradient::Gradient,
    histogram::Histogram,
    metadata::{Header, VlrMap},
    point::BoundingVolume,
};
use pcd_crop::CropIndex;
use pcd_parser::{materialize, open_cloud, ImportOptions};

#[derive(Parser, Debug)]
#[command(
    name = "siteread",
    about = "Inspect, subsample, crop and filter LAS/LAZ point clouds",
    version
)]
struct Cli {
    /// Log debug messages
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the header and VLRs of a LAS/LAZ file
    Info {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(long)]
        json: bool,
    },
    /// Decode points, then optionally color, filter and export them
    Import(ImportArgs),
    /// List the gradient names accepted by --gradient
    Gradients,
}

#[derive(Args, Debug)]
struct ImportArgs {
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Fraction of points to keep: 0.1, 0.2, ... 1.0
    #[arg(short, long, default_value_t = 1.0)]
    density: f32,

    /// Closed OBJ mesh to crop with, may be repeated
    #[arg(long = "crop", value_name = "OBJ")]
    crop: Vec<PathBuf>,

    /// Keep the points outside the crop meshes instead of inside
    #[arg(long)]
    outside: bool,

    /// Field to color by: 0 intensity, 1 red, 2 green, 3 blue,
    /// 4 classification, 5 number of returns
    #[arg(short, long)]
    field: Option<i32>,

    #[arg(short, long, default_value = "rainbow")]
    gradient: String,

    /// Lower bound of the normalized field range to keep
    #[arg(long, requires = "field")]
    low: Option<f32>,

    /// Upper bound of the normalized field range to keep
    #[arg(long, requires = "field")]
    high: Option<f32>,

    /// Print the histogram of the selected field
    #[arg(long, requires = "field")]
    histogram: bool,

    /// Color points with the RGB stored in the file
    #[arg(long, conflicts_with = "field")]
    rgb: bool,

    /// Move the cloud so the header minimum sits at the XY origin
    #[arg(long)]
    origin: bool,

    /// Write the result to a .las, .laz or .csv file
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct InfoReport<'a> {
    path: &'a Path,
    header: &'a Header,
    vlrs: &'a VlrMap,
}

#[derive(Serialize)]
struct ImportReport {
    path: PathBuf,
    density: f32,
    points: usize,
    bounding_volume: Option<BoundingVolume>,
    field: Option<FieldKind>,
    histogram: Option<Histogram>,
    output: Option<PathBuf>,
}

fn init_logger(verbose: bool) {
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(
            None,
            if verbose {
                LevelFilter::Debug
            } else {
                LevelFilter::Info
            },
        )
        .init();
}

fn info(file: &Path, json: bool) -> Result<()> {
    let cloud = open_cloud(file).with_context(|| format!("cannot read {}", file.display()))?;
    let source = cloud
        .source()
        .context("opened cloud has no LAS source")?;

    if json {
        let report = InfoReport {
            path: &source.path,
            header: &source.header,
            vlrs: &source.vlrs,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", file.display());
    for line in summary_lines(&source.header) {
        println!("  {}", line);
    }
    println!("Header:");
    for line in cloud.header_lines() {
        println!("  {}", line);
    }
    println!("VLRs:");
    for line in cloud.vlr_lines() {
        println!("  {}", line);
    }
    Ok(())
}

fn summary_lines(header: &Header) -> Vec<String> {
    vec![
        format!("points: {}", header.point_count()),
        format!("min: {:?}", header.min_point()),
        format!("max: {:?}", header.max_point()),
        format!("point format: {}", header.point_format()),
    ]
}

fn load_crop_index(paths: &[PathBuf]) -> Result<Option<CropIndex>> {
    let meshes = paths
        .iter()
        .map(|path| obj::load_obj(path))
        .collect::<Result<Vec<_>>>()?;
    Ok(CropIndex::build(&meshes))
}

fn import(args: ImportArgs) -> Result<()> {
    let start = std::time::Instant::now();
    let options = ImportOptions {
        density: args.density,
        inside: !args.outside,
    };
    let crop = load_crop_index(&args.crop)?;

    let mut cloud: AsprCloud =
        open_cloud(&args.file).with_context(|| format!("cannot read {}", args.file.display()))?;
    materialize(&mut cloud, &options, crop.as_ref())
        .with_context(|| format!("cannot decode points of {}", args.file.display()))?;
    log::info!("{} (density {})", cloud, options.density);

    if args.origin {
        if let Some(offset) = cloud.origin_offset() {
            log::info!("translating by {:?}", offset);
            cloud = cloud.translated(offset);
        }
    }

    if args.rgb {
        cloud.apply_rgb_colors()?;
    }

    let mut field = None;
    let mut histogram = None;
    if let Some(selection) = args.field {
        let kind = FieldKind::try_from(selection)?;
        let gradient = Gradient::from_name(&args.gradient)?;
        cloud.apply_field(kind, &gradient.table())?;
        log::info!("colored by {} with the {} gradient", kind, gradient);

        if args.low.is_some() || args.high.is_some() {
            let low = args.low.unwrap_or(0.0);
            let high = args.high.unwrap_or(1.0);
            cloud = cloud.filter_by_range(low, high)?;
            log::info!("{} in [{}, {}]: {}", kind, low, high, cloud);
        }
        if args.histogram {
            histogram = Some(cloud.histogram()?);
        }
        field = Some(kind);
    }

    if let Some(output) = &args.output {
        pcd_exporter::export(&cloud, output)
            .with_context(|| format!("cannot write {}", output.display()))?;
    }

    let report = ImportReport {
        path: args.file,
        density: cloud.display_density(),
        points: cloud.len(),
        bounding_volume: cloud.bounding_volume(),
        field,
        histogram,
        output: args.output,
    };
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", cloud);
        if let Some(bv) = &report.bounding_volume {
            println!("  min: {:?}", bv.min);
            println!("  max: {:?}", bv.max);
        }
        if let Some(histogram) = &report.histogram {
            for (value, count) in histogram.iter() {
                println!("  {:>3} {}", value, count);
            }
        }
    }

    log::info!("Elapsed: {:?}", start.elapsed());
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Info { file, json } => info(&file, json),
        Command::Import(args) => import(args),
        Command::Gradients => {
            for name in Gradient::names() {
                println!("{}", name);
            }
            Ok(())
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    if let Err(e) = run(cli) {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}
