//! Line-oriented command surface read from stdin.
//!
//! One command per line, words separated by whitespace. Free-text arguments
//! (titles, country names) may be wrapped in double quotes.

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::mpsc::Sender;
use std::thread;

use tracing::debug;

use crate::alerts::AlertId;
use crate::settings::{AlertSettingsUpdate, MusicSettingsUpdate, RepeatMode};

use super::event_loop::LoopEvent;

#[derive(Debug)]
pub enum SettingsChange {
    Music(MusicSettingsUpdate),
    Alerts(AlertSettingsUpdate),
}

#[derive(Debug)]
pub enum Command {
    Play(Option<usize>),
    Pause,
    Stop,
    Next,
    Prev,
    Add { source: String, title: Option<String> },
    Import(PathBuf),
    Remove(String),
    List,
    Status,
    Alerts,
    Combat { attacker: String, defender: String },
    Dismiss(AlertId),
    Set(SettingsChange),
    Quit,
}

/// Split a line into words, keeping double-quoted runs together.
fn split_words(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut cur = String::new();
    let mut quoted = false;
    let mut has_word = false;

    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                has_word = true;
            }
            c if c.is_whitespace() && !quoted => {
                if has_word {
                    words.push(std::mem::take(&mut cur));
                    has_word = false;
                }
            }
            c => {
                cur.push(c);
                has_word = true;
            }
        }
    }
    if has_word {
        words.push(cur);
    }
    words
}

fn parse_bool(v: &str) -> Result<bool, String> {
    match v.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => Err(format!("expected on/off, got {v:?}")),
    }
}

fn parse_volume(v: &str) -> Result<f32, String> {
    v.parse::<f32>()
        .map_err(|_| format!("expected a number, got {v:?}"))
}

fn parse_setting(key: &str, value: &str) -> Result<SettingsChange, String> {
    let change = match key {
        "music.enabled" => SettingsChange::Music(MusicSettingsUpdate {
            enabled: Some(parse_bool(value)?),
            ..Default::default()
        }),
        "music.auto_play" => SettingsChange::Music(MusicSettingsUpdate {
            auto_play: Some(parse_bool(value)?),
            ..Default::default()
        }),
        "music.volume" => SettingsChange::Music(MusicSettingsUpdate {
            volume: Some(parse_volume(value)?),
            ..Default::default()
        }),
        "music.shuffle" => SettingsChange::Music(MusicSettingsUpdate {
            shuffle: Some(parse_bool(value)?),
            ..Default::default()
        }),
        "music.repeat" => SettingsChange::Music(MusicSettingsUpdate {
            repeat: Some(RepeatMode::from_str(value).map_err(|e| e.to_string())?),
            ..Default::default()
        }),
        "alerts.enabled" => SettingsChange::Alerts(AlertSettingsUpdate {
            enabled: Some(parse_bool(value)?),
            ..Default::default()
        }),
        "alerts.sound" => SettingsChange::Alerts(AlertSettingsUpdate {
            sound: Some(Some(value.to_string()).filter(|v| v != "none")),
            ..Default::default()
        }),
        "alerts.volume" => SettingsChange::Alerts(AlertSettingsUpdate {
            volume: Some(parse_volume(value)?),
            ..Default::default()
        }),
        "alerts.show_visual" => SettingsChange::Alerts(AlertSettingsUpdate {
            show_visual: Some(parse_bool(value)?),
            ..Default::default()
        }),
        "alerts.duration" => SettingsChange::Alerts(AlertSettingsUpdate {
            duration_secs: Some(
                value
                    .parse()
                    .map_err(|_| format!("expected whole seconds, got {value:?}"))?,
            ),
            ..Default::default()
        }),
        other => return Err(format!("unknown setting {other:?}")),
    };
    Ok(change)
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words = split_words(line);
        let Some((verb, args)) = words.split_first() else {
            return Err("empty command".to_string());
        };
        let arg = |i: usize, what: &str| -> Result<String, String> {
            args.get(i).cloned().ok_or_else(|| format!("{verb}: missing {what}"))
        };

        let cmd = match verb.to_ascii_lowercase().as_str() {
            "play" => match args.first() {
                Some(n) => Command::Play(Some(
                    n.parse().map_err(|_| format!("play: bad index {n:?}"))?,
                )),
                None => Command::Play(None),
            },
            "pause" => Command::Pause,
            "stop" => Command::Stop,
            "next" => Command::Next,
            "prev" | "previous" => Command::Prev,
            "add" => Command::Add {
                source: arg(0, "source")?,
                title: args.get(1).cloned(),
            },
            "import" => Command::Import(PathBuf::from(arg(0, "directory")?)),
            "remove" | "rm" => Command::Remove(arg(0, "track id")?),
            "list" | "ls" => Command::List,
            "status" => Command::Status,
            "alerts" => Command::Alerts,
            "combat" => Command::Combat {
                attacker: arg(0, "attacker")?,
                defender: arg(1, "defender")?,
            },
            "dismiss" => {
                let id = arg(0, "alert id")?;
                Command::Dismiss(id.parse().map_err(|_| format!("dismiss: bad id {id:?}"))?)
            }
            "set" => Command::Set(parse_setting(&arg(0, "key")?, &arg(1, "value")?)?),
            "quit" | "exit" => Command::Quit,
            other => return Err(format!("unknown command {other:?}")),
        };
        Ok(cmd)
    }
}

/// Read stdin on a background thread, forwarding parsed commands.
pub fn spawn_stdin_reader(tx: Sender<LoopEvent>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if line.trim().is_empty() || line.trim_start().starts_with('#') {
                continue;
            }
            let event = match line.parse::<Command>() {
                Ok(cmd) => LoopEvent::Command(cmd),
                Err(msg) => LoopEvent::Invalid(msg),
            };
            if tx.send(event).is_err() {
                return;
            }
        }
        debug!("stdin closed");
        let _ = tx.send(LoopEvent::InputClosed);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_words_keeps_quoted_runs_together() {
        assert_eq!(
            split_words(r#"combat "Holy Roman Empire" France"#),
            vec!["combat", "Holy Roman Empire", "France"]
        );
        assert_eq!(split_words("  next  "), vec!["next"]);
        assert_eq!(split_words(r#"add "" x"#), vec!["add", "", "x"]);
    }

    #[test]
    fn parses_playback_commands() {
        assert!(matches!("play".parse::<Command>(), Ok(Command::Play(None))));
        assert!(matches!("play 3".parse::<Command>(), Ok(Command::Play(Some(3)))));
        assert!(matches!("PREV".parse::<Command>(), Ok(Command::Prev)));
        assert!("play x".parse::<Command>().is_err());
    }

    #[test]
    fn parses_combat_and_dismiss() {
        match r#"combat "Gran Colombia" Peru"#.parse::<Command>() {
            Ok(Command::Combat { attacker, defender }) => {
                assert_eq!(attacker, "Gran Colombia");
                assert_eq!(defender, "Peru");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            "dismiss 7".parse::<Command>(),
            Ok(Command::Dismiss(AlertId(7)))
        ));
        assert!("combat Peru".parse::<Command>().is_err());
    }

    #[test]
    fn parses_settings_and_rejects_bad_values() {
        match "set music.repeat one".parse::<Command>() {
            Ok(Command::Set(SettingsChange::Music(u))) => {
                assert_eq!(u.repeat, Some(RepeatMode::One));
                assert!(u.volume.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
        match "set alerts.sound none".parse::<Command>() {
            Ok(Command::Set(SettingsChange::Alerts(u))) => assert_eq!(u.sound, Some(None)),
            other => panic!("unexpected {other:?}"),
        }
        assert!("set music.repeat twice".parse::<Command>().is_err());
        assert!("set alerts.duration soon".parse::<Command>().is_err());
        assert!("set music.colour red".parse::<Command>().is_err());
    }

    #[test]
    fn unknown_and_empty_commands_are_errors() {
        assert!("dance".parse::<Command>().is_err());
        assert!("   ".parse::<Command>().is_err());
    }
}
