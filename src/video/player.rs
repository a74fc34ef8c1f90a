// Video player for in-app playback using ffmpeg-next
use anyhow::{anyhow, Result};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

extern crate ffmpeg_next as ffmpeg;

/// Frames wider than this are scaled down before reaching the UI
const MAX_DISPLAY_WIDTH: u32 = 1280;

/// Playback pacing (30 FPS)
const FRAME_INTERVAL: Duration = Duration::from_nanos(1_000_000_000 / 30);

/// Idle poll interval while paused
const PAUSED_POLL: Duration = Duration::from_millis(16);

/// One decoded RGBA frame
pub struct VideoFrame {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Playback position shared with the decode thread
#[derive(Debug, Clone, Copy, Default)]
struct Clock {
    playing: bool,
    position: f64,
    duration: f64,
}

enum Command {
    Play,
    Pause,
    Seek(f64),
    Stop,
}

/// Plays one video reference (file path or URL) on a background decode thread
pub struct VideoPlayer {
    clock: Arc<Mutex<Clock>>,
    frames: Receiver<VideoFrame>,
    commands: Sender<Command>,
    worker: Option<JoinHandle<()>>,
}

impl VideoPlayer {
    /// Open `source` and start the decode thread, paused
    pub fn open(source: &str) -> Result<Self> {
        ffmpeg::init()?;

        // Probe up front so an unplayable source fails here rather than silently
        let duration = DecodeStream::open(source)?.duration;

        let clock = Arc::new(Mutex::new(Clock {
            duration,
            ..Clock::default()
        }));
        let (frame_tx, frames) = crossbeam_channel::bounded(2);
        let (commands, command_rx) = crossbeam_channel::unbounded();

        let source = source.to_string();
        let worker_clock = Arc::clone(&clock);
        let worker = thread::Builder::new()
            .name("video-player".to_string())
            .spawn(move || run_decoder(&source, &worker_clock, &frame_tx, &command_rx))?;

        Ok(Self {
            clock,
            frames,
            commands,
            worker: Some(worker),
        })
    }

    pub fn play(&mut self) {
        lock(&self.clock).playing = true;
        let _ = self.commands.send(Command::Play);
    }

    pub fn pause(&mut self) {
        lock(&self.clock).playing = false;
        let _ = self.commands.send(Command::Pause);
    }

    pub fn toggle_playback(&mut self) {
        if self.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    pub fn is_playing(&self) -> bool {
        lock(&self.clock).playing
    }

    /// Seek to a fraction (0.0 to 1.0) of the duration
    pub fn seek(&mut self, fraction: f64) {
        let target = fraction.clamp(0.0, 1.0) * self.duration();
        lock(&self.clock).position = target;
        let _ = self.commands.send(Command::Seek(target));
    }

    /// Current position as a fraction (0.0 to 1.0)
    pub fn progress(&self) -> f64 {
        let clock = lock(&self.clock);
        if clock.duration > 0.0 {
            (clock.position / clock.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Current position in seconds
    pub fn position(&self) -> f64 {
        lock(&self.clock).position
    }

    /// Total duration in seconds
    pub fn duration(&self) -> f64 {
        lock(&self.clock).duration
    }

    /// Most recent decoded frame, if any arrived since the last call
    pub fn latest_frame(&mut self) -> Option<VideoFrame> {
        self.frames.try_iter().last()
    }
}

impl Drop for VideoPlayer {
    fn drop(&mut self) {
        let _ = self.commands.send(Command::Stop);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn lock(clock: &Mutex<Clock>) -> MutexGuard<'_, Clock> {
    clock.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Demuxer, decoder and RGBA scaler for the best video stream of a source
struct DecodeStream {
    input: ffmpeg::format::context::Input,
    stream_index: usize,
    seconds_per_tick: f64,
    decoder: ffmpeg::decoder::Video,
    scaler: ffmpeg::software::scaling::Context,
    width: u32,
    height: u32,
    duration: f64,
}

impl DecodeStream {
    fn open(source: &str) -> Result<Self> {
        let input = ffmpeg::format::input(source)?;
        let stream = input
            .streams()
            .best(ffmpeg::media::Type::Video)
            .ok_or_else(|| anyhow!("No video stream in {}", source))?;

        let stream_index = stream.index();
        let time_base = stream.time_base();
        let seconds_per_tick = f64::from(time_base.numerator()) / f64::from(time_base.denominator());

        let duration = if input.duration() > 0 {
            input.duration() as f64 / f64::from(ffmpeg::ffi::AV_TIME_BASE)
        } else if stream.duration() > 0 {
            stream.duration() as f64 * seconds_per_tick
        } else {
            0.0
        };

        let decoder = ffmpeg::codec::context::Context::from_parameters(stream.parameters())?
            .decoder()
            .video()?;

        let width = decoder.width().min(MAX_DISPLAY_WIDTH).max(1);
        let height = ((decoder.height() as f64 * width as f64 / decoder.width().max(1) as f64) as u32).max(1);

        let scaler = ffmpeg::software::scaling::Context::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            ffmpeg::format::Pixel::RGBA,
            width,
            height,
            ffmpeg::software::scaling::Flags::BILINEAR,
        )?;

        Ok(Self {
            input,
            stream_index,
            seconds_per_tick,
            decoder,
            scaler,
            width,
            height,
            duration,
        })
    }

    fn seek(&mut self, seconds: f64) {
        let timestamp = (seconds * f64::from(ffmpeg::ffi::AV_TIME_BASE)) as i64;
        if let Err(e) = self.input.seek(timestamp, ..timestamp) {
            debug!("Seek to {:.1}s failed: {}", seconds, e);
        }
        self.decoder.flush();
    }

    /// Decode the next frame of the video stream with its timestamp in seconds
    fn next_frame(&mut self) -> Option<(VideoFrame, f64)> {
        let mut decoded = ffmpeg::frame::Video::empty();
        let mut scaled = ffmpeg::frame::Video::empty();

        for (stream, packet) in self.input.packets() {
            if stream.index() != self.stream_index || self.decoder.send_packet(&packet).is_err() {
                continue;
            }

            while self.decoder.receive_frame(&mut decoded).is_ok() {
                if self.scaler.run(&decoded, &mut scaled).is_err() {
                    continue;
                }

                let timestamp = decoded.pts().unwrap_or(0) as f64 * self.seconds_per_tick;
                let frame = VideoFrame {
                    rgba: copy_rgba(&scaled, self.width, self.height),
                    width: self.width,
                    height: self.height,
                };
                return Some((frame, timestamp));
            }
        }

        None
    }
}

/// Copy the RGBA plane, dropping row padding
fn copy_rgba(frame: &ffmpeg::frame::Video, width: u32, height: u32) -> Vec<u8> {
    let data = frame.data(0);
    let stride = frame.stride(0);
    let row_bytes = width as usize * 4;

    let mut rgba = Vec::with_capacity(row_bytes * height as usize);
    for row in data.chunks(stride).take(height as usize) {
        rgba.extend_from_slice(&row[..row_bytes]);
    }
    rgba
}

fn run_decoder(
    source: &str,
    clock: &Mutex<Clock>,
    frame_tx: &Sender<VideoFrame>,
    command_rx: &Receiver<Command>,
) {
    let mut stream = match DecodeStream::open(source) {
        Ok(stream) => stream,
        Err(e) => {
            warn!("Decode thread could not open video: {}", e);
            lock(clock).playing = false;
            return;
        }
    };

    let mut playing = false;
    let mut last_frame = Instant::now();

    loop {
        while let Ok(command) = command_rx.try_recv() {
            match command {
                Command::Play => playing = true,
                Command::Pause => playing = false,
                Command::Stop => return,
                Command::Seek(seconds) => {
                    stream.seek(seconds);
                    lock(clock).position = seconds;
                }
            }
        }

        if !playing {
            thread::sleep(PAUSED_POLL);
            continue;
        }

        let elapsed = last_frame.elapsed();
        if elapsed < FRAME_INTERVAL {
            thread::sleep(FRAME_INTERVAL - elapsed);
        }
        last_frame = Instant::now();

        match stream.next_frame() {
            Some((frame, timestamp)) => {
                lock(clock).position = timestamp;
                match frame_tx.try_send(frame) {
                    // UI is behind; it only ever shows the newest frame
                    Ok(()) | Err(TrySendError::Full(_)) => {}
                    Err(TrySendError::Disconnected(_)) => return,
                }
            }
            None => {
                // End of stream
                playing = false;
                lock(clock).playing = false;
            }
        }
    }
}
