//! Landmark sources — an external detector process, a JSON stream on stdin,
//! or the keyboard/mouse simulator.
//!
//! The public interface is [`SourceEvent`] delivered over a `mpsc` channel.
//! The main loop doesn't need to know whether frames came from a real
//! detector or from the simulated hand.

use std::io::{self, BufRead, BufReader};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info, warn};

use hand_pose::{synth, Hand, Landmark, LANDMARK_COUNT};

use crate::session::FrameInput;

// ════════════════════════════════════════════════════════════════════════════
// SourceEvent
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub enum SourceEvent {
    /// One detector result, possibly with zero hands.
    Frame(FrameInput),
    /// Something the user should see in the status bar.
    Status(String),
    /// The source has stopped and will send nothing more.
    Closed,
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkSource trait — unified interface for detector and sim
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`SourceEvent`]s over a channel.
pub trait LandmarkSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>);
}

/// Spawn a landmark source on its own thread and return the receiving end.
pub fn spawn_landmark_source<S: LandmarkSource>(source: S) -> Receiver<SourceEvent> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// Detector wire format
// ════════════════════════════════════════════════════════════════════════════

fn full_score() -> f32 { 1.0 }

#[derive(Deserialize, Debug)]
struct HandJson {
    #[serde(default)]
    handedness: String,
    #[serde(default = "full_score")]
    score:      f32,
    landmarks:  Vec<Landmark>,
}

#[derive(Deserialize, Debug)]
struct DetectionJson {
    #[serde(default)]
    hands: Vec<HandJson>,
    #[serde(default)]
    error: Option<String>,
}

/// One decoded detector line.
#[derive(Clone, Debug, PartialEq)]
pub enum Detection {
    Hands(FrameInput),
    /// The detector reported a failure for this frame.
    Error(String),
}

/// Decode one JSON line.  Hands scoring below `min_confidence` are dropped;
/// hands with the wrong landmark count are passed through and left to the
/// session, which ignores them.
pub fn parse_detection(line: &str, min_confidence: f32) -> serde_json::Result<Detection> {
    let result: DetectionJson = serde_json::from_str(line)?;
    if let Some(error) = result.error {
        return Ok(Detection::Error(error));
    }

    let mut frame = FrameInput::default();
    for hand in result.hands {
        if hand.score < min_confidence {
            debug!("dropping {} hand (score {:.2})", hand.handedness, hand.score);
            continue;
        }
        if hand.landmarks.len() != LANDMARK_COUNT {
            warn!("expected {} landmarks, got {}", LANDMARK_COUNT, hand.landmarks.len());
        }
        frame.hands.push(hand.landmarks);
    }
    Ok(Detection::Hands(frame))
}

// ════════════════════════════════════════════════════════════════════════════
// JsonLineSource — newline-delimited detector output
// ════════════════════════════════════════════════════════════════════════════

/// Reads one detection per line from any buffered reader.
pub struct JsonLineSource<R> {
    reader:         R,
    min_confidence: f32,
}

impl<R: BufRead + Send + 'static> JsonLineSource<R> {
    pub fn new(reader: R, min_confidence: f32) -> Self {
        JsonLineSource { reader, min_confidence }
    }
}

/// Detector results arriving on our own stdin.
pub fn stdin_source(min_confidence: f32) -> JsonLineSource<BufReader<io::Stdin>> {
    JsonLineSource::new(BufReader::new(io::stdin()), min_confidence)
}

impl<R: BufRead + Send + 'static> LandmarkSource for JsonLineSource<R> {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>) {
        let JsonLineSource { reader, min_confidence } = *self;
        for line in reader.lines() {
            let line = match line {
                Ok(l)  => l,
                Err(e) => {
                    warn!("detector stream read failed: {e}");
                    break;
                }
            };
            if line.trim().is_empty() { continue; }

            let events = match parse_detection(&line, min_confidence) {
                Ok(Detection::Hands(frame)) => vec![SourceEvent::Frame(frame)],
                Ok(Detection::Error(msg))   => {
                    warn!("detector error: {msg}");
                    vec![
                        SourceEvent::Status(format!("detector: {msg}")),
                        SourceEvent::Frame(FrameInput::default()),
                    ]
                }
                Err(e) => {
                    warn!("skipping malformed detector line: {e}");
                    continue;
                }
            };
            for event in events {
                if tx.send(event).is_err() { return; }
            }
        }
        info!("detector stream closed");
        let _ = tx.send(SourceEvent::Closed);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// External detector process
// ════════════════════════════════════════════════════════════════════════════

/// Owns the detector child process; dropping it stops the detector, which in
/// turn ends the reader thread at EOF.
pub struct DetectorHandle {
    child: Child,
}

impl Drop for DetectorHandle {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        debug!("detector process stopped");
    }
}

fn shell(command: &str) -> Command {
    #[cfg(windows)]
    {
        let mut c = Command::new("cmd");
        c.args(["/C", command]);
        c
    }
    #[cfg(not(windows))]
    {
        let mut c = Command::new("sh");
        c.args(["-c", command]);
        c
    }
}

/// Detector stdout: a `READY` handshake line, then JSON detections.
///
/// The handshake is read on the source thread, so a detector that never
/// becomes ready leaves the window running with a status message instead of
/// blocking startup.
pub struct DetectorSource<R> {
    reader:         R,
    min_confidence: f32,
}

impl<R: BufRead + Send + 'static> DetectorSource<R> {
    pub fn new(reader: R, min_confidence: f32) -> Self {
        DetectorSource { reader, min_confidence }
    }
}

impl<R: BufRead + Send + 'static> LandmarkSource for DetectorSource<R> {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>) {
        let DetectorSource { mut reader, min_confidence } = *self;

        let mut ready = String::new();
        let failure = match reader.read_line(&mut ready) {
            Ok(_) if ready.trim() == "READY" => None,
            Ok(0)  => Some("detector exited before signalling ready".to_string()),
            Ok(_)  => Some(format!("detector did not signal ready, got: {:?}", ready.trim())),
            Err(e) => Some(format!("failed to read detector handshake: {e}")),
        };
        if let Some(msg) = failure {
            warn!("{msg}");
            let _ = tx.send(SourceEvent::Status(msg));
            let _ = tx.send(SourceEvent::Closed);
            return;
        }

        info!("detector ready");
        if tx.send(SourceEvent::Status("Detector ready".to_string())).is_err() { return; }
        Box::new(JsonLineSource::new(reader, min_confidence)).run(tx);
    }
}

/// Start the detector from a shell command.  Only spawning happens here; the
/// `READY` handshake is left to the returned source.
pub fn launch_detector(
    command:        &str,
    min_confidence: f32,
) -> Result<(DetectorHandle, DetectorSource<BufReader<ChildStdout>>)> {
    info!("starting detector: {command}");
    let mut child = shell(command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .with_context(|| format!("failed to start detector `{command}`"))?;

    let stdout = child.stdout.take().context("detector stdout not captured")?;
    let handle = DetectorHandle { child };
    Ok((handle, DetectorSource::new(BufReader::new(stdout), min_confidence)))
}

// ════════════════════════════════════════════════════════════════════════════
// SimLandmarkSource — keyboard/mouse simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Pose held by the simulated hand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SimPose {
    #[default]
    Relaxed,
    Pinch,
    Point,
    Peace,
    OpenPalm,
    Zoom,
}

/// Raw input event from the simulation window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    /// Mouse position as a fraction of the window, the held pose and the
    /// zoom spread (fraction of the window width between index tips).
    Sample { x: f32, y: f32, pose: SimPose, spread: f32 },
    Quit,
}

/// Thumb–index gap of the simulated pinch.
const SIM_PINCH_GAP: f32 = 0.02;

/// Hands whose index tip lands under the window point `(x, y)` once the
/// session projects them.  With `mirror` on the detector frame is flipped,
/// so the hands are generated at `1 - x`.
pub fn sim_hands(x: f32, y: f32, pose: SimPose, spread: f32, mirror: bool) -> Vec<Hand> {
    let tip_x = if mirror { 1.0 - x } else { x };
    // synth puts the index tip at (cx - 0.03, cy - 0.115).
    let (cx, cy) = (tip_x + 0.03, y + 0.115);
    match pose {
        SimPose::Relaxed  => vec![synth::fist(cx, cy)],
        SimPose::Pinch    => vec![synth::pinch(cx, cy, SIM_PINCH_GAP)],
        SimPose::Point    => vec![synth::pointing(cx, cy)],
        SimPose::Peace    => vec![synth::peace(cx, cy)],
        SimPose::OpenPalm => vec![synth::open_palm(cx, cy)],
        SimPose::Zoom     => synth::zoom_pair(cx, cy, spread).to_vec(),
    }
}

/// Landmark source driven by [`SimInput`] events from the visualizer window.
pub struct SimLandmarkSource {
    pub rx:     Receiver<SimInput>,
    pub mirror: bool,
}

impl LandmarkSource for SimLandmarkSource {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>) {
        for input in self.rx {
            let event = match input {
                SimInput::Sample { x, y, pose, spread } => {
                    let hands = sim_hands(x, y, pose, spread, self.mirror);
                    SourceEvent::Frame(FrameInput::from_hands(&hands))
                }
                SimInput::Quit => break,
            };
            if tx.send(event).is_err() { return; }
        }
        let _ = tx.send(SourceEvent::Closed);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
