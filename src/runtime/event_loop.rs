use std::path::Path;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::alerts::CombatEvent;
use crate::config;
use crate::device::DeviceEvent;
use crate::library::Track;
use crate::orchestrator::Orchestrator;

use super::commands::{Command, SettingsChange};

/// Everything the loop can be woken up by.
#[derive(Debug)]
pub enum LoopEvent {
    Device(DeviceEvent),
    Command(Command),
    /// A line that did not parse; carries the reason.
    Invalid(String),
    InputClosed,
}

impl From<DeviceEvent> for LoopEvent {
    fn from(event: DeviceEvent) -> Self {
        Self::Device(event)
    }
}

/// How long to block before the next timer could be due.
fn wait_for(orch: &Orchestrator, now: Instant, tick: Duration) -> Duration {
    match orch.next_deadline() {
        Some(at) => at.saturating_duration_since(now).min(tick),
        None => tick,
    }
}

/// Main event loop: fires due timers, then blocks on the channel until the
/// next deadline. Returns when `quit` is read or stdin closes.
pub fn run(
    orch: &mut Orchestrator,
    settings: &config::Settings,
    rx: &Receiver<LoopEvent>,
) -> Result<(), Box<dyn std::error::Error>> {
    let tick = settings.engine.tick();
    loop {
        let now = Instant::now();
        for alert in orch.tick(now) {
            println!("alert {} expired", alert.id);
        }

        let event = match rx.recv_timeout(wait_for(orch, now, tick)) {
            Ok(event) => event,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => return Ok(()),
        };

        match event {
            LoopEvent::Device(ev) => {
                if let Err(e) = orch.handle_device_event(ev) {
                    warn!(error = %e, "device reported a failure");
                    println!("error: {e}");
                }
            }
            LoopEvent::Command(Command::Quit) | LoopEvent::InputClosed => {
                debug!("shutting down");
                orch.stop();
                return Ok(());
            }
            LoopEvent::Command(cmd) => handle_command(orch, settings, cmd),
            LoopEvent::Invalid(msg) => println!("error: {msg}"),
        }
    }
}

fn print_status(orch: &Orchestrator) {
    let state = orch.playback_state();
    let music = orch.music_settings();
    let title = orch
        .current_track()
        .map(Track::display)
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{:?} #{} {} | volume {:.2} shuffle {} repeat {}",
        state.status,
        state.current_track_index,
        title,
        music.volume,
        if music.shuffle { "on" } else { "off" },
        music.repeat,
    );
}

fn report(ok: bool, what: &str) {
    if !ok {
        println!("{what}: ignored");
    }
}

fn handle_command(orch: &mut Orchestrator, settings: &config::Settings, cmd: Command) {
    let now = Instant::now();
    match cmd {
        Command::Play(index) => report(orch.play(index), "play"),
        Command::Pause => report(orch.pause(), "pause"),
        Command::Stop => orch.stop(),
        Command::Next => report(orch.next(), "next"),
        Command::Prev => report(orch.previous(), "prev"),
        Command::Add { source, title } => {
            let title = title.unwrap_or_else(|| {
                Path::new(&source)
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_else(|| source.clone())
            });
            let track = Track::new(title, source).added_by("console");
            let id = track.id.clone();
            match orch.add_track(track, now) {
                Ok(()) => println!("added {id}"),
                Err(e) => println!("error: {e}"),
            }
        }
        Command::Import(dir) => {
            let added = orch.import_directory(&dir, &settings.library, now);
            println!("imported {added} track(s)");
        }
        Command::Remove(id) => match orch.remove_track(&id) {
            Some(track) => println!("removed {}", track.display()),
            None => println!("error: no track with id {id}"),
        },
        Command::List => {
            let current = orch.current_track().map(|t| t.id.clone());
            for (i, track) in orch.tracks().iter().enumerate() {
                let marker = if current.as_deref() == Some(track.id.as_str()) {
                    '>'
                } else {
                    ' '
                };
                println!("{marker} {i:>3} {} {}", track.id, track.display());
            }
        }
        Command::Status => print_status(orch),
        Command::Alerts => {
            for alert in orch.alerts() {
                println!("{} {} {}", alert.id, alert.timestamp.to_rfc3339(), alert.message());
            }
        }
        Command::Combat { attacker, defender } => {
            match orch.on_combat(CombatEvent::new(attacker, defender), now) {
                Some(id) => println!("alert {id} raised"),
                None => println!("combat: alerts are disabled"),
            }
        }
        Command::Dismiss(id) => report(orch.dismiss_alert(id), "dismiss"),
        Command::Set(change) => {
            let res = match change {
                SettingsChange::Music(u) => orch.update_music_settings(u),
                SettingsChange::Alerts(u) => orch.update_alert_settings(u),
            };
            if let Err(e) = res {
                println!("error: {e}");
            }
        }
        Command::Quit => {}
    }
}
