use std::{
    fs::File,
    io::Cursor,
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Receiver, SyncSender, TryRecvError},
        Arc, Mutex,
    },
    thread,
    time::Duration,
};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use symphonia::{
    core::{
        audio::SampleBuffer,
        codecs::{Decoder, DecoderOptions},
        errors::Error as SymphoniaError,
        formats::{FormatOptions, FormatReader},
        io::{MediaSource, MediaSourceStream},
        meta::MetadataOptions,
        probe::Hint,
    },
    default,
};

use crate::engine::lock_state;
use crate::frames::FrameCursor;
use crate::{AudioEngine, AudioError, AudioHandle, AudioResult, AudioSource, AudioState};

/// Decoded chunks buffered ahead of the output callback.
const CHUNK_BACKLOG: usize = 32;

/// Audio engine backed by cpal + symphonia.
///
/// Decoding runs on its own thread and feeds the output stream through a
/// bounded channel, so a whole track is never held in memory.
#[derive(Debug, Default, Clone, Copy)]
pub struct CpalAudioEngine;

struct Decoding {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    channels: usize,
    sample_rate: u32,
}

/// Flags shared by the output callback, the decoder and the handle.
#[derive(Clone)]
struct Shared {
    state: Arc<Mutex<AudioState>>,
    stop: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
}

impl AudioEngine for CpalAudioEngine {
    fn play(&self, source: AudioSource) -> AudioResult<AudioHandle> {
        let decoding = open(source)?;
        let shared = Shared {
            state: Arc::new(Mutex::new(AudioState::Playing)),
            stop: Arc::new(AtomicBool::new(false)),
            finished: Arc::new(AtomicBool::new(false)),
        };

        let (chunks_tx, chunks_rx) = mpsc::sync_channel(CHUNK_BACKLOG);
        let channels = decoding.channels;
        let sample_rate = decoding.sample_rate;
        thread::Builder::new()
            .name("trackdeck-decode".into())
            .spawn({
                let stop = shared.stop.clone();
                move || decode_into(decoding, chunks_tx, &stop)
            })
            .map_err(|e| AudioError::Backend(e.to_string()))?;

        // cpal streams are not Send, so the stream lives and dies on this thread.
        let (ready_tx, ready_rx) = mpsc::channel();
        let join = thread::Builder::new()
            .name("trackdeck-output".into())
            .spawn({
                let shared = shared.clone();
                move || {
                    let stream = match open_stream(chunks_rx, channels, sample_rate, &shared) {
                        Ok(stream) => stream,
                        Err(err) => {
                            shared.stop.store(true, Ordering::SeqCst);
                            let _ = ready_tx.send(Err(err));
                            return;
                        }
                    };
                    let _ = ready_tx.send(Ok(()));
                    while !shared.stop.load(Ordering::SeqCst) {
                        thread::sleep(Duration::from_millis(20));
                    }
                    drop(stream);
                    let mut state = lock_state(&shared.state);
                    if *state == AudioState::Playing {
                        *state = if shared.finished.load(Ordering::SeqCst) {
                            AudioState::Completed
                        } else {
                            AudioState::Stopped
                        };
                    }
                }
            })
            .map_err(|e| AudioError::Backend(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(AudioHandle::from_parts(shared.state, shared.stop, join)),
            Ok(Err(err)) => {
                let _ = join.join();
                Err(err)
            }
            Err(_) => Err(AudioError::Backend("audio output thread exited".into())),
        }
    }
}

fn open(source: AudioSource) -> AudioResult<Decoding> {
    let mut hint = Hint::new();
    let media: Box<dyn MediaSource> = match source {
        AudioSource::Memory { bytes, extension } => {
            if let Some(ext) = &extension {
                hint.with_extension(ext);
            }
            Box::new(Cursor::new(bytes))
        }
        AudioSource::File(path) => {
            if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
                hint.with_extension(ext);
            }
            Box::new(File::open(&path).map_err(|e| AudioError::Io(e.to_string()))?)
        }
    };
    let mss = MediaSourceStream::new(media, Default::default());

    let opened = default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AudioError::Decode(e.to_string()))?;
    let format = opened.format;
    let track = format
        .default_track()
        .ok_or_else(|| AudioError::Decode("no playable track".into()))?;
    let track_id = track.id;
    let codec_params = track.codec_params.clone();
    let decoder = default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::Decode(e.to_string()))?;

    Ok(Decoding {
        format,
        decoder,
        track_id,
        channels: codec_params.channels.map(|c| c.count()).unwrap_or(2),
        sample_rate: codec_params.sample_rate.unwrap_or(44_100),
    })
}

/// Decodes packets until the source ends, the receiver goes away or playback stops.
fn decode_into(mut decoding: Decoding, chunks: SyncSender<Vec<f32>>, stop: &AtomicBool) {
    while !stop.load(Ordering::SeqCst) {
        let packet = match decoding.format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(_)) | Err(SymphoniaError::ResetRequired) => break,
            Err(err) => {
                tracing::warn!(error = %err, "audio stream unreadable");
                break;
            }
        };
        if packet.track_id() != decoding.track_id {
            continue;
        }
        let buffer = match decoding.decoder.decode(&packet) {
            Ok(buffer) => buffer,
            Err(SymphoniaError::DecodeError(err)) => {
                tracing::debug!(error = err, "skipping corrupt audio frame");
                continue;
            }
            Err(err) => {
                tracing::warn!(error = %err, "audio decoding failed");
                break;
            }
        };
        let spec = *buffer.spec();
        let mut samples = SampleBuffer::<f32>::new(buffer.capacity() as u64, spec);
        samples.copy_interleaved_ref(buffer);
        if chunks.send(samples.samples().to_vec()).is_err() {
            break;
        }
    }
}

fn open_stream(
    chunks: Receiver<Vec<f32>>,
    channels: usize,
    sample_rate: u32,
    shared: &Shared,
) -> AudioResult<cpal::Stream> {
    let device = cpal::default_host()
        .default_output_device()
        .ok_or_else(|| AudioError::Backend("no output device".into()))?;
    let config = device
        .default_output_config()
        .map_err(|e| AudioError::Backend(e.to_string()))?;
    if config.sample_format() != cpal::SampleFormat::F32 {
        return Err(AudioError::Backend(format!(
            "unsupported sample format: {:?}",
            config.sample_format()
        )));
    }
    let output_channels = usize::from(config.channels()).max(1);
    let mut cursor = FrameCursor::new(channels, sample_rate, config.sample_rate().0);
    tracing::debug!(
        channels,
        sample_rate,
        output_channels,
        output_rate = config.sample_rate().0,
        "opening audio output"
    );

    let data_flags = shared.clone();
    let error_flags = shared.clone();
    let stream = device
        .build_output_stream(
            &config.config(),
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                for frame in data.chunks_mut(output_channels) {
                    if data_flags.stop.load(Ordering::SeqCst) {
                        frame.fill(0.0);
                        continue;
                    }
                    let mut drained = false;
                    let next = cursor.next_frame(|| match chunks.try_recv() {
                        Ok(chunk) => Some(chunk),
                        Err(TryRecvError::Empty) => None,
                        Err(TryRecvError::Disconnected) => {
                            drained = true;
                            None
                        }
                    });
                    match next {
                        Some(source) => FrameCursor::spread(source, frame),
                        None => {
                            frame.fill(0.0);
                            if drained {
                                data_flags.finished.store(true, Ordering::SeqCst);
                                data_flags.stop.store(true, Ordering::SeqCst);
                            }
                        }
                    }
                }
            },
            move |err| {
                tracing::error!(error = %err, "audio output failed");
                *lock_state(&error_flags.state) = AudioState::Error;
                error_flags.stop.store(true, Ordering::SeqCst);
            },
            None,
        )
        .map_err(|e| AudioError::Backend(e.to_string()))?;
    stream
        .play()
        .map_err(|e| AudioError::Backend(e.to_string()))?;
    Ok(stream)
}
