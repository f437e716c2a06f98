use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use rodio::Source;

use super::rodio_engine::{decoder_for, resolve_source};
use super::*;

/// Mono 16-bit PCM WAV of `secs` seconds of silence at 8 kHz.
fn silent_wav(secs: u32) -> Vec<u8> {
    let rate: u32 = 8_000;
    let data_len = rate * secs * 2;
    let mut wav = Vec::with_capacity(44 + data_len as usize);
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_len).to_le_bytes());
    wav.extend_from_slice(b"WAVEfmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&1u16.to_le_bytes()); // mono
    wav.extend_from_slice(&rate.to_le_bytes());
    wav.extend_from_slice(&(rate * 2).to_le_bytes());
    wav.extend_from_slice(&2u16.to_le_bytes());
    wav.extend_from_slice(&16u16.to_le_bytes());
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    wav.resize(44 + data_len as usize, 0);
    wav
}

#[test]
fn resolve_source_accepts_plain_paths_and_file_urls() {
    assert_eq!(
        resolve_source("/music/a.mp3").unwrap(),
        PathBuf::from("/music/a.mp3")
    );
    assert_eq!(
        resolve_source("file:///music/a.mp3").unwrap(),
        PathBuf::from("/music/a.mp3")
    );
    assert_eq!(
        resolve_source("file://localhost/music/a.mp3").unwrap(),
        PathBuf::from("/music/a.mp3")
    );
    assert_eq!(resolve_source("songs/b.ogg").unwrap(), PathBuf::from("songs/b.ogg"));
}

#[test]
fn resolve_source_percent_decodes_file_urls() {
    assert_eq!(
        resolve_source("file:///music/My%20Song%21.mp3").unwrap(),
        PathBuf::from("/music/My Song!.mp3")
    );
    assert_eq!(
        resolve_source("file:///music/caf%C3%A9.ogg").unwrap(),
        PathBuf::from("/music/café.ogg")
    );
    // Plain paths are taken literally.
    assert_eq!(
        resolve_source("/music/100%20.mp3").unwrap(),
        PathBuf::from("/music/100%20.mp3")
    );
    // A stray `%` is not an escape.
    assert_eq!(
        resolve_source("file:///music/50%.mp3").unwrap(),
        PathBuf::from("/music/50%.mp3")
    );
    assert!(resolve_source("file:///music/%FF.mp3").is_err());
}

#[test]
fn decoder_reports_length_and_seeks_backwards() {
    let wav = silent_wav(2);
    let len = wav.len() as u64;
    let mut decoder = decoder_for(Cursor::new(wav), len, Path::new("silence.wav")).unwrap();

    let total = decoder.total_duration().unwrap();
    assert!((total.as_secs_f64() - 2.0).abs() < 0.01, "{total:?}");

    decoder.try_seek(Duration::from_millis(1_500)).unwrap();
    decoder.try_seek(Duration::from_millis(250)).unwrap();
    assert!(decoder.next().is_some());
}

#[test]
fn decoder_rejects_garbage() {
    let junk = vec![0x5a_u8; 256];
    let len = junk.len() as u64;
    assert!(decoder_for(Cursor::new(junk), len, Path::new("junk.mp3")).is_err());
}

#[test]
fn resolve_source_rejects_remote_and_empty_locators() {
    assert!(resolve_source("https://example.com/a.mp3").is_err());
    assert!(resolve_source("file://").is_err());
    assert!(resolve_source("   ").is_err());
}

#[test]
fn event_sink_tags_events_with_its_session() {
    let (tx, rx) = mpsc::channel();
    let first = EventSink::new(SessionId(1), tx.clone());
    let second = EventSink::new(SessionId(2), tx);

    first.emit(EngineEvent::Load);
    second.emit(EngineEvent::Play);

    assert_eq!(rx.try_recv().unwrap(), (SessionId(1), EngineEvent::Load));
    assert_eq!(rx.try_recv().unwrap(), (SessionId(2), EngineEvent::Play));
    assert!(rx.try_recv().is_err());
}

#[test]
fn event_sink_ignores_closed_receiver() {
    let (tx, rx) = mpsc::channel();
    let sink = EventSink::new(SessionId(7), tx);
    drop(rx);
    sink.emit(EngineEvent::Stop);
    assert_eq!(sink.session().to_string(), "session#7");
}
