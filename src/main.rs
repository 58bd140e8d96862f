use clap::{Parser, Subcommand};
use rayon::prelude::*;
use site_image::config::{self, ImagingConfig};
use site_image::imaging::{
    BytesSource, Format, ImageError, ImageHandle, TransformProcessor, TransformSpec,
};
use site_image::naming;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "site-image")]
#[command(about = "Image resources for static site builds")]
#[command(long_about = "\
Image resources for static site builds

Reads image dimensions lazily from the header, and produces resized, filled,
fitted and rotated variants encoded as JPEG, PNG, GIF, TIFF or BMP.

Transform specs are an action followed by options:

  resize 600x            width 600, height from the aspect ratio
  fill 300x200 smart     crop to 300x200 around the most detailed region
  fill 300x200 TopLeft   crop anchored at the top-left corner
  fit 800x800 q90 png    shrink to fit inside 800x800, PNG output
  resize x400 r90        rotate 90 degrees counter-clockwise, then scale

Defaults come from imaging.toml next to the source image, or --config.
Run 'site-image gen-config' to generate a documented imaging.toml.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print format and dimensions, reading only the image header
    Identify {
        /// Image file
        file: PathBuf,
    },
    /// Apply one or more transforms to an image
    Process {
        /// Source image file
        file: PathBuf,

        /// Transform as "<action> <options>", repeatable
        #[arg(long = "spec", required = true)]
        specs: Vec<String>,

        /// Output directory
        #[arg(long, default_value = "processed")]
        output: PathBuf,

        /// Config file (default: imaging.toml next to the source)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print a stock imaging.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Identify { file } => {
            let handle = ImageHandle::open(&file)?;
            let dims = handle.dimensions()?;
            println!(
                "{}: {} {} ({})",
                file.display(),
                handle.format(),
                dims,
                handle.format().mime_type()
            );
        }
        Command::Process {
            file,
            specs,
            output,
            config,
        } => {
            let imaging_config = match config {
                Some(path) => config::load_config_file(&path)?,
                None => config::load_config(file.parent().unwrap_or(Path::new(".")))?,
            };
            process(&file, &specs, &output, imaging_config)?;
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install a stderr subscriber; `RUST_LOG` overrides the default level.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Run every spec against one shared handle on a pool sized by config.
fn process(
    file: &Path,
    raw_specs: &[String],
    output: &Path,
    imaging_config: ImagingConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let threads = config::effective_threads(&imaging_config.processing);
    let processor = TransformProcessor::new(imaging_config);

    let specs = raw_specs
        .iter()
        .map(|raw| {
            let raw = raw.trim();
            let (action, options) = raw.split_once(char::is_whitespace).unwrap_or((raw, ""));
            processor.parse_spec(action, options)
        })
        .collect::<Result<Vec<TransformSpec>, _>>()?;

    let bytes = fs::read(file)?;
    let digest = naming::source_digest(&bytes);
    let format = Format::from_path(file)?;
    let handle = ImageHandle::from_spec(format, Arc::new(BytesSource::new(bytes)));
    let stem = file
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");

    fs::create_dir_all(output)?;
    let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
    tracing::info!(source = %file.display(), specs = specs.len(), threads, "processing");

    let written = pool.install(|| {
        specs
            .par_iter()
            .map(|spec| -> Result<(PathBuf, String), ImageError> {
                // Every worker reads the same cached header.
                let source_dims = handle.dimensions()?;
                let processed = processor.process(&handle, spec)?;
                let name = naming::processed_file_name(stem, &digest, spec, processed.format());
                let path = output.join(name);

                let mut out = BufWriter::new(File::create(&path)?);
                processed.encode(&mut out)?;
                out.flush()?;

                tracing::debug!(spec = %spec.key(), %source_dims, "wrote {}", path.display());
                Ok((path, processed.handle.dimensions()?.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()
    })?;

    for (path, dims) in written {
        println!("{} ({dims})", path.display());
    }
    Ok(())
}
