use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::{Result, bail};
use clap::{Parser, ValueEnum};
use log::{info, warn};
use quadcopter_dash::{
    client::SimulationClient,
    config::DashboardConfig,
    export::write_bundle_csv,
    parameters::ParameterMap,
    presets::Preset,
    render::{LogRenderer, Renderer, RerunRenderer, RerunSink},
    session::{ApplyOutcome, Session},
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Output {
    /// Summaries in the log only
    Log,
    /// Spawn a Rerun viewer
    Spawn,
    /// Connect to a running Rerun viewer
    Connect,
    /// Save .rrd recordings to the output directory
    Save,
}

#[derive(Parser, Debug)]
#[command(version, about = "Runs one LQR quadcopter simulation and shows the results", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "config/params.toml")]
    config: PathBuf,

    /// Weight preset, overrides the one in the config file
    #[arg(short, long)]
    preset: Option<Preset>,

    /// Simulation service endpoint, overrides the one in the config file
    #[arg(short, long)]
    url: Option<String>,

    #[arg(short, long, value_enum, default_value_t = Output::Log)]
    output: Output,

    /// Show the LQR gain matrix
    #[arg(short, long)]
    matrix: bool,

    /// Write the chart series and metrics as CSV
    #[arg(short, long)]
    export: bool,

    #[arg(long, default_value = "out")]
    out_dir: PathBuf,
}

fn main() -> Result<()> {
    // Default log level to "info"
    if env::var("RUST_LOG").is_err() {
        unsafe { env::set_var("RUST_LOG", "info") }
    }

    pretty_env_logger::init();

    let args = Args::parse();

    let mut config = load_config(&args.config, args.preset)?;
    if let Some(url) = args.url {
        config.service_url = url;
    }

    info!("Service: {}, preset: {}", config.service_url, config.preset);

    let mut out_dir = args.out_dir;
    out_dir.push(chrono::Local::now().format("%Y_%m_%d_%H-%M-%S").to_string());

    let renderer: Box<dyn Renderer> = match args.output {
        Output::Log => Box::new(LogRenderer),
        Output::Spawn => Box::new(RerunRenderer::new(RerunSink::Spawn)),
        Output::Connect => Box::new(RerunRenderer::new(RerunSink::Connect)),
        Output::Save => {
            std::fs::create_dir_all(&out_dir)?;
            Box::new(RerunRenderer::new(RerunSink::Save(out_dir.clone())))
        }
    };

    let mut session = Session::new(SimulationClient::http(&config.service_url), renderer);

    session.submit(config.to_request())?;

    match session.wait()? {
        ApplyOutcome::Applied => {}
        ApplyOutcome::Failed(err) => return Err(err.into()),
        ApplyOutcome::Stale => bail!("Response to the latest request was discarded"),
    }

    if args.matrix {
        session.show_matrix()?;
    }

    if args.export {
        if let Some(run) = session.current() {
            write_bundle_csv(&out_dir, session.charts().bundle(), &run.metrics)?;
        }
    }

    Ok(())
}

fn load_config(path: &Path, preset: Option<Preset>) -> Result<DashboardConfig> {
    if path.exists() {
        return DashboardConfig::from_file(path, preset);
    }

    warn!("Config file '{}' not found, using defaults", path.display());

    Ok(DashboardConfig::from_params(&ParameterMap::default(), preset)?)
}
