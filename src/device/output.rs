//! rodio-backed [`PlaybackDevice`] running on a dedicated audio thread.
//!
//! The engine side only ever sends commands; the thread decodes, plays and
//! reports completion and end-of-track back through a `DeviceEvent` channel.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, error, warn};

use super::sink::create_sink;
use super::{Channel, DeviceEvent, LoadTicket, PlaybackDevice};

#[derive(Debug)]
enum DeviceCmd {
    Load(LoadTicket, String),
    Resume,
    Pause,
    Stop,
    SetVolume(f32),
    Quit,
}

/// Delivers events on the caller's channel from outside the audio thread.
type Report = Box<dyn Fn(DeviceEvent) + Send>;

pub struct RodioDevice {
    channel: Channel,
    tx: Sender<DeviceCmd>,
    join: Option<JoinHandle<()>>,
    report: Report,
}

impl RodioDevice {
    /// Spawn the audio thread for `channel`. Events go to `events`.
    pub fn spawn<E>(channel: Channel, events: Sender<E>) -> Self
    where
        E: From<DeviceEvent> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<DeviceCmd>();
        let thread_events = events.clone();
        let join = thread::Builder::new()
            .name(format!("warbell-{channel:?}").to_lowercase())
            .spawn(move || audio_thread(channel, rx, thread_events))
            .map_err(|e| error!(?channel, error = %e, "failed to spawn audio thread"))
            .ok();
        Self {
            channel,
            tx,
            join,
            report: reporter(events),
        }
    }

    fn send(&self, cmd: DeviceCmd) -> bool {
        if self.tx.send(cmd).is_err() {
            warn!(channel = ?self.channel, "audio thread is gone; dropping command");
            return false;
        }
        true
    }
}

fn reporter<E>(events: Sender<E>) -> Report
where
    E: From<DeviceEvent> + Send + 'static,
{
    Box::new(move |event| {
        let _ = events.send(event.into());
    })
}

impl PlaybackDevice for RodioDevice {
    fn load(&mut self, ticket: LoadTicket, source: &str) {
        // Every load must resolve, even with no thread left to run it.
        if !self.send(DeviceCmd::Load(ticket, source.to_string())) {
            (self.report)(DeviceEvent::Loaded {
                channel: self.channel,
                ticket,
                result: Err("audio output is not running".to_string()),
            });
        }
    }

    fn resume(&mut self) {
        self.send(DeviceCmd::Resume);
    }

    fn pause(&mut self) {
        self.send(DeviceCmd::Pause);
    }

    fn stop(&mut self) {
        self.send(DeviceCmd::Stop);
    }

    fn set_volume(&mut self, volume: f32) {
        self.send(DeviceCmd::SetVolume(volume));
    }
}

impl Drop for RodioDevice {
    fn drop(&mut self) {
        let _ = self.tx.send(DeviceCmd::Quit);
        if let Some(h) = self.join.take() {
            let _ = h.join();
        }
    }
}

struct Current {
    sink: Sink,
    ticket: LoadTicket,
    paused: bool,
}

fn audio_thread<E: From<DeviceEvent>>(channel: Channel, rx: Receiver<DeviceCmd>, events: Sender<E>) {
    let stream = match OutputStreamBuilder::open_default_stream() {
        Ok(mut s) => {
            // rodio logs to stderr when the stream is dropped.
            s.log_on_drop(false);
            Some(s)
        }
        Err(e) => {
            error!(?channel, error = %e, "no audio output device");
            None
        }
    };

    let mut current: Option<Current> = None;
    let mut volume: f32 = 1.0;

    loop {
        match rx.recv_timeout(Duration::from_millis(200)) {
            Ok(cmd) => match cmd {
                DeviceCmd::Load(ticket, source) => {
                    if let Some(old) = current.take() {
                        old.sink.stop();
                    }
                    let result = start(stream.as_ref(), &source, volume).map(|sink| {
                        debug!(?channel, ?ticket, %source, "source started");
                        current = Some(Current {
                            sink,
                            ticket,
                            paused: false,
                        });
                    });
                    let _ = events.send(
                        DeviceEvent::Loaded {
                            channel,
                            ticket,
                            result,
                        }
                        .into(),
                    );
                }
                DeviceCmd::Resume => {
                    if let Some(c) = current.as_mut() {
                        c.sink.play();
                        c.paused = false;
                    }
                }
                DeviceCmd::Pause => {
                    if let Some(c) = current.as_mut() {
                        c.sink.pause();
                        c.paused = true;
                    }
                }
                DeviceCmd::Stop => {
                    if let Some(c) = current.take() {
                        c.sink.stop();
                    }
                }
                DeviceCmd::SetVolume(v) => {
                    volume = v;
                    if let Some(c) = current.as_ref() {
                        c.sink.set_volume(v);
                    }
                }
                DeviceCmd::Quit => {
                    if let Some(c) = current.take() {
                        c.sink.stop();
                    }
                    break;
                }
            },
            Err(RecvTimeoutError::Timeout) => {
                // periodic check for end of source
                let ended = current.as_ref().is_some_and(|c| !c.paused && c.sink.empty());
                if ended {
                    if let Some(c) = current.take() {
                        let _ = events.send(
                            DeviceEvent::Ended {
                                channel,
                                ticket: c.ticket,
                            }
                            .into(),
                        );
                    }
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

fn start(stream: Option<&OutputStream>, source: &str, volume: f32) -> Result<Sink, String> {
    let stream = stream.ok_or_else(|| "no audio output device".to_string())?;
    let sink = create_sink(stream, source)?;
    sink.set_volume(volume);
    sink.play();
    Ok(sink)
}
