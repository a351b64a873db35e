use std::env;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Instant;

use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;
mod event_loop;
mod settings;
mod startup;

pub use commands::{Command, SettingsChange};
pub use event_loop::LoopEvent;

/// Logs go to stderr so stdout stays free for command replies.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warbell=info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let settings = settings::load_settings();

    let mut import_dir: Option<PathBuf> = None;
    for arg in env::args().skip(1) {
        if arg == "--print-config" {
            print!("{}", toml::to_string_pretty(&settings)?);
            return Ok(());
        }
        import_dir = Some(PathBuf::from(arg));
    }

    let (tx, rx) = mpsc::channel::<event_loop::LoopEvent>();
    let mut orch = startup::build_orchestrator(&settings, &tx);
    orch.start(Instant::now());

    if let Some(dir) = import_dir {
        let added = orch.import_directory(&dir, &settings.library, Instant::now());
        info!(dir = %dir.display(), added, "imported from command line");
    }

    commands::spawn_stdin_reader(tx);

    info!(tracks = orch.tracks().len(), "ready");
    event_loop::run(&mut orch, &settings, &rx)
}
