//! `rodio` backed engine for local files.
//!
//! Sources are plain paths or `file://` URLs; `%XX` escapes in URLs are
//! decoded, plain paths are used as written. Streaming mode decodes lazily
//! from a buffered file reader; otherwise the whole file is read into memory
//! before the sink is built. Both modes hand the decoder the byte length so
//! seeking works in either direction.

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::{Path, PathBuf};
use std::time::Duration;

use lofty::prelude::AudioFile;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use tracing::{debug, warn};

use crate::error::{Error, Result};

use super::engine::{AudioEngine, EngineFactory};
use super::types::{EngineEvent, EngineOptions, EventSink};

/// Decode `%XX` escapes in a URL path. Malformed escapes are kept as written.
fn percent_decode(path: &str) -> Result<String> {
    let bytes = path.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(b) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(b);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8(out).map_err(|_| Error::Engine(format!("file URL is not valid UTF-8: {path}")))
}

/// Map a source locator to a local path. Only plain paths and `file://` URLs are playable.
pub(super) fn resolve_source(src: &str) -> Result<PathBuf> {
    if let Some(rest) = src.strip_prefix("file://") {
        // `file:///music/a.mp3` and `file://localhost/music/a.mp3` both name `/music/a.mp3`.
        let rest = rest.strip_prefix("localhost").unwrap_or(rest);
        if rest.is_empty() {
            return Err(Error::Engine(format!("empty file URL: {src}")));
        }
        return Ok(PathBuf::from(percent_decode(rest)?));
    }
    if let Some((scheme, _)) = src.split_once("://") {
        return Err(Error::Engine(format!("unsupported source scheme `{scheme}`: {src}")));
    }
    if src.trim().is_empty() {
        return Err(Error::Engine("empty source".to_string()));
    }
    Ok(PathBuf::from(src))
}

/// Owns the output stream every engine's sink is connected to.
pub struct RodioFactory {
    stream: OutputStream,
}

impl RodioFactory {
    pub fn open_default() -> Result<Self> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| Error::Engine(format!("no audio output device: {e}")))?;
        // rodio logs to stderr when OutputStream is dropped; keep quiet.
        stream.log_on_drop(false);
        Ok(Self { stream })
    }

    /// Open `path` and queue it on a fresh, paused sink. Returns the sink and the length in seconds.
    fn open_sink(&self, path: &Path, streaming: bool) -> Result<(Sink, f64)> {
        let file = File::open(path)?;
        let byte_len = file.metadata()?.len();
        let sink = Sink::connect_new(self.stream.mixer());

        let total = if streaming {
            let source = decoder_for(BufReader::new(file), byte_len, path)?;
            let total = source.total_duration();
            sink.append(source);
            total
        } else {
            let mut bytes = Vec::with_capacity(byte_len as usize);
            BufReader::new(file).read_to_end(&mut bytes)?;
            let len = bytes.len() as u64;
            let source = decoder_for(Cursor::new(bytes), len, path)?;
            let total = source.total_duration();
            sink.append(source);
            total
        };
        sink.pause();

        // Streamed formats often cannot report their length up front; fall back to the tag reader.
        let total = total.or_else(|| {
            lofty::read_from_path(path)
                .ok()
                .map(|tagged| tagged.properties().duration())
        });

        Ok((sink, total.map_or(0.0, |d| d.as_secs_f64())))
    }
}

/// Seekable decoder over `data`. Without the length and the seekable flag
/// symphonia treats the source as forward-only.
pub(super) fn decoder_for<R>(data: R, byte_len: u64, path: &Path) -> Result<Decoder<R>>
where
    R: Read + Seek + Send + Sync + 'static,
{
    let mut builder = Decoder::builder()
        .with_data(data)
        .with_byte_len(byte_len)
        .with_seekable(true);
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        builder = builder.with_hint(ext);
    }
    builder
        .build()
        .map_err(|e| Error::Engine(format!("failed to decode {}: {e}", path.display())))
}

impl EngineFactory for RodioFactory {
    type Engine = RodioEngine;

    fn create(&mut self, options: EngineOptions, events: EventSink) -> Result<RodioEngine> {
        let mut last_err = Error::Engine("no sources given".to_string());

        for src in &options.sources {
            let opened = resolve_source(src).and_then(|p| self.open_sink(&p, options.streaming));
            match opened {
                Ok((sink, duration)) => {
                    debug!(%src, duration, streaming = options.streaming, session = %events.session(), "source loaded");
                    events.emit(EngineEvent::Load);
                    return Ok(RodioEngine {
                        sink,
                        duration,
                        events,
                        stopped: false,
                        ended: false,
                    });
                }
                Err(e) => {
                    warn!(%src, error = %e, "cannot open source");
                    last_err = e;
                }
            }
        }

        Err(last_err)
    }
}

pub struct RodioEngine {
    sink: Sink,
    duration: f64,
    events: EventSink,
    stopped: bool,
    ended: bool,
}

impl AudioEngine for RodioEngine {
    fn play(&mut self) {
        if self.stopped || self.ended {
            return;
        }
        self.sink.play();
        self.events.emit(EngineEvent::Play);
    }

    fn pause(&mut self) {
        if self.stopped || self.ended {
            return;
        }
        self.sink.pause();
        self.events.emit(EngineEvent::Pause);
    }

    fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        self.sink.stop();
        self.events.emit(EngineEvent::Stop);
    }

    fn is_playing(&self) -> bool {
        !self.stopped && !self.ended && !self.sink.is_paused() && !self.sink.empty()
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn position(&self) -> f64 {
        self.sink.get_pos().as_secs_f64()
    }

    fn seek(&mut self, secs: f64) {
        if self.stopped || !secs.is_finite() {
            return;
        }
        let target = Duration::from_secs_f64(secs.max(0.0));
        match self.sink.try_seek(target) {
            Ok(()) => self.events.emit(EngineEvent::Seek),
            Err(e) => warn!(secs, error = %e, "seek failed"),
        }
    }

    fn poll(&mut self) {
        if !self.stopped && !self.ended && !self.sink.is_paused() && self.sink.empty() {
            self.ended = true;
            self.events.emit(EngineEvent::End);
        }
    }
}

impl Drop for RodioEngine {
    fn drop(&mut self) {
        self.sink.stop();
    }
}
