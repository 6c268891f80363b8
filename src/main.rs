mod shared;
mod tui;
mod audio_api;
mod audio;
mod compose;
mod middle;
mod offline;
mod pipeline;

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use anyhow::Context;
use crossterm::terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use audio::Voicing;
use middle::Middle;
use pipeline::config::Config;
use pipeline::persistence;
use shared::{InputEvent, FRAME_INTERVAL_MS};

const LOG_FILE: &str = "pentadrift.log";

const USAGE: &str = "usage: pentadrift [--config PATH] [--seed N] [--percussion] [--render OUT.wav] [--seconds S]";

#[derive(Debug, Default, PartialEq)]
struct Args {
    config: Option<PathBuf>,
    seed: Option<u64>,
    percussion: bool,
    render: Option<PathBuf>,
    seconds: Option<f64>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> anyhow::Result<Args> {
    let mut out = Args::default();
    let mut it = args.into_iter();
    while let Some(arg) = it.next() {
        let mut value = |name: &str| it.next().with_context(|| format!("{name} needs a value\n{USAGE}"));
        match arg.as_str() {
            "--config" => out.config = Some(PathBuf::from(value("--config")?)),
            "--seed" => out.seed = Some(value("--seed")?.parse().context("--seed must be an integer")?),
            "--percussion" => out.percussion = true,
            "--render" => out.render = Some(PathBuf::from(value("--render")?)),
            "--seconds" => out.seconds = Some(value("--seconds")?.parse().context("--seconds must be a number")?),
            other => anyhow::bail!("unknown argument '{other}'\n{USAGE}"),
        }
    }
    Ok(out)
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let args = parse_args(std::env::args().skip(1))?;
    let cwd = std::env::current_dir().unwrap_or_default();

    match &args.render {
        Some(_) => init_logging(None)?,
        None => init_logging(Some(&cwd.join(LOG_FILE)))?,
    }

    let mut config = persistence::resolve_config(args.config.as_deref(), &cwd)?;
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    config.percussion |= args.percussion;
    // pin a seed so the synth's own randomness is reproducible alongside the composition
    let seed = config.seed.unwrap_or_else(rand::random);
    config.seed = Some(seed);
    info!(seed, "seeded");

    match args.render {
        Some(path) => render_offline(&config, &path, args.seconds.unwrap_or(30.0)),
        None => run_live(&config),
    }
}

// The terminal belongs to the TUI while live, so logs go to a file then.
fn init_logging(file: Option<&Path>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("creating log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn voicings(config: &Config) -> Vec<Voicing> {
    config.parts.iter().map(Voicing::from).collect()
}

fn render_offline(config: &Config, path: &Path, seconds: f64) -> anyhow::Result<()> {
    let mut middle = Middle::new(config)?;
    let mut engine = audio::Engine::new(
        offline::SAMPLE_RATE,
        &voicings(config),
        middle.seconds_per_step(),
        config.seed.unwrap_or_default(),
    );
    offline::render_to_wav(&mut middle, &mut engine, seconds, path)?;
    Ok(())
}

fn run_live(config: &Config) -> anyhow::Result<()> {
    let mut middle = Middle::new(config)?;
    let layout = tui::view::DisplayLayout::from_config(config);
    let audio = audio::start_audio(&voicings(config), middle.seconds_per_step(), config.seed.unwrap_or_default())?;

    terminal::enable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), terminal::EnterAlternateScreen)?;
    let _guard = RawModeGuard; // auto drops when out of scope

    let backend = CrosstermBackend::new(std::io::stdout());
    let mut term = Terminal::new(backend)?;
    term.clear()?;
    info!("started");

    let frame_interval = Duration::from_millis(FRAME_INTERVAL_MS);
    let mut last_tick = Instant::now();
    let mut last_frame: Option<Instant> = None;

    loop {
        // redraw at the frame rate; between steps this repaints the same snapshot
        if last_frame.is_none_or(|t| t.elapsed() >= frame_interval) {
            let ds = middle.display_state();
            term.draw(|frame| {
                tui::view::render(frame, frame.area(), ds, &layout);
            })?;
            last_frame = Some(Instant::now());
        }

        // don't sleep through a due step
        let timeout = frame_interval.min(middle.until_next_tick());
        let events = tui::input::poll_input(timeout)?;
        for event in events {
            if event == InputEvent::Quit {
                info!("quit");
                drop(term);
                drop(audio);
                return Ok(());
            }
            middle.handle_input(event);
        }

        let elapsed = last_tick.elapsed().as_secs_f64();
        last_tick = Instant::now();
        let cmds = middle.tick(elapsed);
        for cmd in cmds {
            audio.send(cmd);
        }
    }
}

struct RawModeGuard;
impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = crossterm::execute!(std::io::stdout(), terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}
