//! braille: generate 3D-printable braille plates.
//!
//! Lines may be Unicode braille (`⠓⠑⠇⠇⠕`) or plain text, which is
//! transliterated letter by letter. Plate settings come from an optional
//! JSON file; every missing key takes its default.
//!
//! # Logging
//!
//! - `RUST_LOG=braille_mesh=debug` - Stage and compositor progress
//! - `RUST_LOG=braille_mesh::timing=info` - Stage timing
//!
//! # Example
//!
//! ```bash
//! braille --line ⠁⠃ --settings plate.json --mode counter --format ascii --out build/
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use braille_mesh::compositor::CompositorConfig;
use braille_mesh::export::{download_filename, write_stl, StlFormat};
use braille_mesh::service::{PlateRequest, PlateService};
use braille_mesh::spec::{CounterFill, PlateMode, PlateSpec};
use braille_mesh::translate::{Grade, PassthroughTranslator};
use braille_mesh::Diagnostics;
use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Generate a braille plate as an STL file.
#[derive(Debug, Parser)]
#[command(name = "braille")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// One plate row; repeat for more rows
    #[arg(long = "line", short = 'l', value_name = "TEXT")]
    lines: Vec<String>,

    /// JSON plate settings
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Override the plate mode from the settings
    #[arg(long, value_enum)]
    mode: Option<Mode>,

    /// Counter plates: recess every cell, not just the text
    #[arg(long)]
    all_cells: bool,

    /// STL flavour
    #[arg(long, value_enum, default_value = "binary")]
    format: Format,

    /// Output directory
    #[arg(long, short, default_value = ".")]
    out: PathBuf,

    /// Jitter seed
    #[arg(long)]
    seed: Option<u64>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Raised dots
    Emboss,
    /// Recessed dots
    Counter,
}

impl From<Mode> for PlateMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Emboss => PlateMode::Emboss,
            Mode::Counter => PlateMode::Counter,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Binary,
    Ascii,
}

impl From<Format> for StlFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Binary => StlFormat::Binary,
            Format::Ascii => StlFormat::Ascii,
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        })
    });
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

fn load_spec(cli: &Cli) -> Result<PlateSpec> {
    let mut spec = match &cli.settings {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading settings {}", path.display()))?;
            PlateSpec::from_json(&json)
                .with_context(|| format!("parsing settings {}", path.display()))?
        }
        None => PlateSpec::default(),
    };
    if let Some(mode) = cli.mode {
        spec = spec.with_mode(mode.into());
    }
    if cli.all_cells {
        spec = spec.with_counter_fill(CounterFill::AllCells);
    }
    Ok(spec)
}

/// Generates the plate and writes it into `cli.out`.
async fn run(cli: &Cli) -> Result<(PathBuf, Diagnostics)> {
    let spec = load_spec(cli)?;
    let mut config = CompositorConfig::default();
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }

    let service = PlateService::new(PassthroughTranslator, config);
    let request = PlateRequest {
        spec,
        text: cli.lines.clone(),
        grade: Grade::Grade1,
    };
    let result = service
        .generate(request, CancellationToken::new())
        .await
        .context("generating plate")?;

    let path = cli.out.join(download_filename(&cli.lines, spec.mode));
    write_plate(&path, &result.mesh, cli.format.into())?;
    info!(
        path = %path.display(),
        triangles = result.diagnostics.triangle_count,
        "plate written"
    );
    Ok((path, result.diagnostics))
}

fn write_plate(path: &Path, mesh: &braille_mesh::Mesh, format: StlFormat) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    let name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("braille");
    write_stl(&mut writer, mesh, format, name)
        .with_context(|| format!("writing {}", path.display()))?;
    writer.flush().context("flushing STL")?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let (_, diagnostics) = run(&cli).await?;
    println!("{}", serde_json::to_string_pretty(&diagnostics)?);
    Ok(())
}
