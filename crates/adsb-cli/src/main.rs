use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use adsb_feed::{doctor as feed_doctor, HttpTransport, ReplayTransport, Transport};
use adsb_render::{doctor as render_doctor, DrawSink, Layout, NameRegistry, RenderEngine};

mod config;
mod sink;
mod station;

use config::{load_config, Config, SinkKind};
use sink::{AnySink, JsonFrameSink, LogSink};
use station::Station;

#[derive(Debug, Parser)]
#[command(name = "adsb-display", version, about = "Nearby aircraft and local weather on an e-paper panel")]
struct Cli {
    #[arg(long)]
    config: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate the config without touching the network.
    Doctor,
    /// Poll and redraw until Ctrl-C.
    Run,
    /// Fetch both feeds once, draw one frame and exit.
    Once,
    /// Draw recorded feed payloads offline.
    Replay {
        #[arg(long)]
        aircraft: PathBuf,
        #[arg(long)]
        weather: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let cfg = load_config(&cli.config)?;

    match cli.cmd {
        Command::Doctor => doctor(&cfg)?,
        Command::Run => run(&cfg).await?,
        Command::Once => once(&cfg).await?,
        Command::Replay { aircraft, weather } => replay(&cfg, &aircraft, weather.as_deref()).await?,
    }
    Ok(())
}

fn doctor(cfg: &Config) -> Result<()> {
    info!("doctor: starting");

    feed_doctor::check_observer(&cfg.observer)?;
    feed_doctor::check_poll(&cfg.poll_config())?;
    feed_doctor::check_url("feed.base_url", &cfg.feed.base_url)?;
    feed_doctor::check_url("weather.base_url", &cfg.weather.base_url)?;
    anyhow::ensure!(cfg.feed.timeout_s >= 1, "feed.timeout_s must be >= 1");

    render_doctor::check_cadence(cfg.display.full_refresh_every)?;
    let tz = render_doctor::check_timezone(&cfg.display.timezone)?;
    render_doctor::check_layout(&Layout::for_kind(cfg.display.layout))?;
    render_doctor::check_names(&load_names(cfg)?)?;

    if cfg.display.sink == SinkKind::Json {
        let path = cfg.display.frame_path.as_deref().context("display.frame_path missing (sink = \"json\")")?;
        let dir = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
        anyhow::ensure!(dir.is_dir(), "display.frame_path directory {} does not exist", dir.display());
    }

    info!("doctor: OK (layout {:?}, timezone {})", cfg.display.layout, tz);
    Ok(())
}

fn load_names(cfg: &Config) -> Result<NameRegistry> {
    match cfg.display.names_path.as_deref() {
        Some(p) => NameRegistry::load(Path::new(p)),
        None => Ok(NameRegistry::builtin()),
    }
}

fn build_engine(cfg: &Config) -> Result<RenderEngine> {
    let tz = render_doctor::check_timezone(&cfg.display.timezone)?;
    Ok(RenderEngine::new(Layout::for_kind(cfg.display.layout), load_names(cfg)?, tz, cfg.display.full_refresh_every))
}

fn build_sink(cfg: &Config) -> Result<AnySink> {
    Ok(match cfg.display.sink {
        SinkKind::Log => AnySink::Log(LogSink::default()),
        SinkKind::Json => {
            let path = cfg.display.frame_path.as_deref().context("display.frame_path missing (sink = \"json\")")?;
            AnySink::Json(JsonFrameSink::new(path))
        }
    })
}

fn build_station<T: Transport, S: DrawSink>(cfg: &Config, transport: Arc<T>, sink: S) -> Result<Station<T, S>> {
    Ok(Station::new(
        cfg.observer,
        transport,
        &cfg.feed.base_url,
        &cfg.weather.base_url,
        cfg.poll_config(),
        build_engine(cfg)?,
        sink,
    ))
}

fn http_transport(cfg: &Config) -> Result<Arc<HttpTransport>> {
    let t = HttpTransport::new(&cfg.feed.base_url, Duration::from_secs(cfg.feed.timeout_s))?;
    Ok(Arc::new(t))
}

async fn run(cfg: &Config) -> Result<()> {
    info!(
        "run: starting, observer {:.4},{:.4} r={}nm, layout {:?}",
        cfg.observer.lat, cfg.observer.lon, cfg.observer.radius_nm, cfg.display.layout
    );

    let mut station = build_station(cfg, http_transport(cfg)?, build_sink(cfg)?)?;
    station.start()?;

    let tick = cfg.tick();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        match station.tick(Instant::now()).await {
            Ok(r) if r.rendered.is_some() => info!("run: tick {:?}", r),
            Ok(_) => {}
            Err(e) => warn!("run: tick failed: {:#}", e),
        }

        tokio::select! {
            _ = &mut ctrl_c => {
                info!("run: ctrl-c, stopping");
                break;
            }
            _ = tokio::time::sleep(tick) => {}
        }
    }
    Ok(())
}

async fn once(cfg: &Config) -> Result<()> {
    let mut station = build_station(cfg, http_transport(cfg)?, build_sink(cfg)?)?;
    let r = station.tick(Instant::now()).await?;
    anyhow::ensure!(r.link_ok, "network unreachable");
    info!("once: {} aircraft, weather valid={}, rendered {:?}", station.aircraft().len(), station.weather().valid, r.rendered);
    Ok(())
}

async fn replay(cfg: &Config, aircraft: &Path, weather: Option<&Path>) -> Result<()> {
    let t = Arc::new(ReplayTransport::new());
    let body = std::fs::read(aircraft).with_context(|| format!("read {}", aircraft.display()))?;
    t.push_body(&cfg.feed.base_url, body);
    if let Some(w) = weather {
        let body = std::fs::read(w).with_context(|| format!("read {}", w.display()))?;
        t.push_body(&cfg.weather.base_url, body);
    }

    let mut station = build_station(cfg, t, build_sink(cfg)?)?;
    let r = station.tick(Instant::now()).await?;
    anyhow::ensure!(r.aircraft_ok, "recorded aircraft payload did not parse");
    info!("replay: rendered {} aircraft", station.aircraft().len());
    Ok(())
}
