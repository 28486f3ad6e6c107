use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use eframe::egui;
use log::{info, warn};
use rodio::{Decoder, OutputStream, Sink, Source};

const MUSIC_VOLUME: f32 = 0.1;

/// Looping background track, started by the first key or pointer press.
pub struct MusicPlayer {
    track: Option<PathBuf>,
    started: bool,
    // Playback stops when the stream is dropped.
    stream: Option<OutputStream>,
}

impl MusicPlayer {
    pub fn new(track: Option<PathBuf>) -> Self {
        Self {
            track,
            started: false,
            stream: None,
        }
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn is_playing(&self) -> bool {
        self.stream.is_some()
    }

    /// Check this frame's input and start the track on the first interaction.
    pub fn poll(&mut self, ctx: &egui::Context) {
        if self.started {
            return;
        }
        let interacted = ctx.input(|input| input.events.iter().any(is_user_interaction));
        self.observe(interacted);
    }

    fn observe(&mut self, interacted: bool) {
        if self.started || !interacted {
            return;
        }
        self.started = true;
        let Some(track) = self.track.as_deref() else {
            return;
        };
        match start_playback(track) {
            Ok(stream) => {
                info!("music: playing {}", track.display());
                self.stream = Some(stream);
            }
            Err(err) => warn!("music: {err}"),
        }
    }
}

fn is_user_interaction(event: &egui::Event) -> bool {
    matches!(
        event,
        egui::Event::PointerButton { pressed: true, .. } | egui::Event::Key { pressed: true, .. }
    )
}

fn start_playback(track: &Path) -> Result<OutputStream, String> {
    let file = File::open(track).map_err(|e| format!("unable to open {}: {e}", track.display()))?;
    let source = Decoder::new(BufReader::new(file))
        .map_err(|e| format!("unable to decode {}: {e}", track.display()))?;
    let (stream, handle) =
        OutputStream::try_default().map_err(|e| format!("no audio output available: {e}"))?;
    let sink = Sink::try_new(&handle).map_err(|e| format!("unable to open audio sink: {e}"))?;
    sink.set_volume(MUSIC_VOLUME);
    sink.append(source.repeat_infinite());
    sink.detach();
    Ok(stream)
}
