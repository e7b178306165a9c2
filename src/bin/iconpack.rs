//! `iconpack`: turn a logo into platform icon sets.
//!
//! ```text
//! iconpack logo.png -o out/ --size 1024 --padding 0.1 --radius 0.2 --background '#ffffff'
//! iconpack logo.png -o out/ --preset chrome --preset web
//! ```

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use iconpack_renderer::{
    AssetSink, Background, DirectorySink, IconPackPipeline, IconSetGenerator, PresetCatalog,
    PresetSelection, ProcessorConfig, Result,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Source logo (PNG, JPEG, WebP, ...)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    input: PathBuf,

    /// Directory the icon pack is written to
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    output: PathBuf,

    /// Edge length of the master composite in pixels
    #[arg(long, default_value_t = 1024)]
    size: u32,

    /// Margin on each side as a fraction of the size (0.0-0.5)
    #[arg(long, default_value_t = 0.1)]
    padding: f32,

    /// Corner radius as a fraction of the size (0.0-0.5)
    #[arg(long, default_value_t = 0.2)]
    radius: f32,

    /// Background: "transparent", a hex color or a CSS color name
    #[arg(long, default_value = "transparent")]
    background: Background,

    /// Preset id to export; repeat for several. Omit to export all
    #[arg(long = "preset", value_name = "ID")]
    presets: Vec<String>,

    /// JSON file with a custom preset catalog
    #[arg(long = "presets", value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    catalog: Option<PathBuf>,

    /// Skip the traced icon.svg
    #[arg(long)]
    no_svg: bool,
}

impl Cli {
    fn config(&self) -> ProcessorConfig {
        ProcessorConfig::new(self.size)
            .with_padding(self.padding)
            .with_border_radius(self.radius)
            .with_background(self.background)
    }

    fn catalog(&self) -> Result<PresetCatalog> {
        match &self.catalog {
            Some(path) => PresetCatalog::from_json(&fs::read_to_string(path)?),
            None => Ok(PresetCatalog::builtin()),
        }
    }

    fn pipeline(&self) -> Result<IconPackPipeline> {
        let pipeline = IconPackPipeline::new(IconSetGenerator::default(), self.catalog()?);
        if self.no_svg {
            return Ok(pipeline);
        }

        #[cfg(feature = "vtracer")]
        let pipeline = pipeline.with_tracer(iconpack_renderer::VtracerTracer::default());
        #[cfg(not(feature = "vtracer"))]
        log::info!("built without the vtracer feature, icon.svg is not generated");

        Ok(pipeline)
    }
}

fn run(cli: &Cli) -> Result<usize> {
    let bytes = fs::read(&cli.input)?;
    let selection = PresetSelection::from_ids(cli.presets.iter().cloned());
    let assets = cli.pipeline()?.run(&bytes, &cli.config(), &selection)?;

    let mut sink = DirectorySink::new(&cli.output);
    sink.write_all(&assets)?;
    Ok(assets.len())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(count) => {
            log::info!("wrote {} files to {}", count, cli.output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
