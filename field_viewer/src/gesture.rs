//! Hand detectors for the viewer, both from LeapMotion hardware and pointer
//! simulation.
//!
//! Both implement [`HandDetector`].  The simulation is fed [`PointerSample`]s
//! over an `mpsc` channel by the visualizer, so the frame loop doesn't need to
//! know whether the hand came from hardware or the mouse.

use std::sync::mpsc::{Receiver, TryRecvError};

use glam::Vec2;
use hand_pose::synth::synthetic_hand;
use hand_pose::{CoverTransform, DetectorError, HandDetector, HandInput, HandPose};

/// Virtual camera the simulated hand is normalized against.
pub const SIM_VIDEO: Vec2 = Vec2::new(1280.0, 720.0);

/// Simulated palm length in normalized video units.
const SIM_PALM: f32 = 0.12;

// ════════════════════════════════════════════════════════════════════════════
// PointerSample
// ════════════════════════════════════════════════════════════════════════════

/// Raw pointer state from the simulation window, one per frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerSample {
    /// Window pixels; `None` when the pointer is outside the window.
    pub pos:    Option<Vec2>,
    pub window: Vec2,
    pub pose:   HandPose,
}

// ════════════════════════════════════════════════════════════════════════════
// SimHandDetector: pointer simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Places a synthetic hand under the pointer.
///
/// The particle layer is shown mirrored, so the hand is put at the mirrored
/// x to land under the pointer on screen.
pub struct SimHandDetector {
    rx: Receiver<PointerSample>,
}

impl SimHandDetector {
    pub fn new(rx: Receiver<PointerSample>) -> Self {
        SimHandDetector { rx }
    }

    /// The hand for one pointer sample.
    pub fn hand_for(sample: &PointerSample) -> HandInput {
        let Some(pos) = sample.pos else { return HandInput::Absent };
        let cover  = CoverTransform::compute(SIM_VIDEO.x, SIM_VIDEO.y, sample.window.x, sample.window.y);
        let screen = Vec2::new(sample.window.x - pos.x, pos.y);
        match cover.to_normalized(screen) {
            Some(center) => HandInput::Present(synthetic_hand(center, SIM_PALM, sample.pose)),
            None         => HandInput::Absent,
        }
    }
}

impl HandDetector for SimHandDetector {
    fn name(&self) -> &str { "pointer simulation" }

    fn init(&mut self) -> Result<(), DetectorError> { Ok(()) }

    fn video_size(&self) -> Vec2 { SIM_VIDEO }

    /// Uses the newest queued sample; no sample means nothing new this frame.
    fn detect(&mut self, _now_ms: u64) -> Result<HandInput, DetectorError> {
        let mut latest = None;
        loop {
            match self.rx.try_recv() {
                Ok(sample)                      => latest = Some(sample),
                Err(TryRecvError::Empty)        => break,
                Err(TryRecvError::Disconnected) => {
                    if latest.is_none() {
                        return Err(DetectorError::Disconnected);
                    }
                    break;
                }
            }
        }
        Ok(latest.as_ref().map_or(HandInput::Unchanged, Self::hand_for))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LeapHandDetector: real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Width of the tracking area, in millimetres, that maps onto the virtual
/// camera.
#[cfg(any(feature = "leap", test))]
const LEAP_SPAN_MM: f32 = 400.0;

/// Project device-space joints (`x` right, `z` toward the user, in mm) onto
/// the virtual camera, top-down, and validate them as one hand.
#[cfg(any(feature = "leap", test))]
fn top_down_hand(
    joints_mm: &[Vec2],
    confidence: f32,
) -> Result<hand_pose::HandObservation, DetectorError> {
    let keypoints: Vec<Vec2> = joints_mm
        .iter()
        .map(|j| Vec2::splat(0.5) + *j / LEAP_SPAN_MM)
        .collect();
    hand_pose::HandObservation::from_slice(&keypoints, confidence)
        .map_err(|e| DetectorError::Frame(e.to_string()))
}

/// Hand detector backed by a real LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
#[cfg(feature = "leap")]
pub struct LeapHandDetector {
    connection: Option<leaprs::Connection>,
}

#[cfg(feature = "leap")]
impl LeapHandDetector {
    pub fn new() -> Self {
        LeapHandDetector { connection: None }
    }
}

#[cfg(feature = "leap")]
impl Default for LeapHandDetector {
    fn default() -> Self { Self::new() }
}

#[cfg(feature = "leap")]
impl HandDetector for LeapHandDetector {
    fn name(&self) -> &str { "LeapMotion" }

    fn init(&mut self) -> Result<(), DetectorError> {
        use leaprs::*;

        let mut connection = Connection::create(ConnectionConfig::default())
            .map_err(|e| DetectorError::Init(format!("LeapC connection: {:?}", e)))?;
        connection
            .open()
            .map_err(|e| DetectorError::Init(format!("LeapMotion device: {:?}", e)))?;
        self.connection = Some(connection);
        Ok(())
    }

    fn video_size(&self) -> Vec2 { SIM_VIDEO }

    fn detect(&mut self, _now_ms: u64) -> Result<HandInput, DetectorError> {
        use hand_pose::LANDMARK_COUNT;
        use leaprs::*;

        let connection = self.connection.as_mut().ok_or(DetectorError::Disconnected)?;
        let msg = connection
            .poll(1)
            .map_err(|e| DetectorError::Frame(format!("{:?}", e)))?;

        let Event::Tracking(frame) = msg.event() else { return Ok(HandInput::Unchanged) };
        let Some(hand) = frame.hands().next() else { return Ok(HandInput::Absent) };

        let mut joints = Vec::with_capacity(LANDMARK_COUNT);
        let wrist = hand.arm().next_joint();
        joints.push(Vec2::new(wrist.x, wrist.z));

        // Four joints per digit, thumb → pinky, starting at landmark 1
        for digit in hand.digits().take(5) {
            for j in [
                digit.proximal().prev_joint(),
                digit.intermediate().prev_joint(),
                digit.distal().prev_joint(),
                digit.distal().next_joint(),
            ] {
                joints.push(Vec2::new(j.x, j.z));
            }
        }

        Ok(HandInput::Present(top_down_hand(&joints, hand.confidence())?))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_pose::landmark::MIDDLE_MCP;
    use hand_pose::{classify, GestureState, Thresholds};
    use std::sync::mpsc;

    const WINDOW: Vec2 = Vec2::new(1280.0, 720.0);

    fn sample(pos: Option<Vec2>, pose: HandPose) -> PointerSample {
        PointerSample { pos, window: WINDOW, pose }
    }

    #[test]
    fn no_sample_is_unchanged() {
        let (_tx, rx) = mpsc::channel();
        let mut d = SimHandDetector::new(rx);
        assert_eq!(d.detect(0).unwrap(), HandInput::Unchanged);
    }

    #[test]
    fn pointer_outside_is_absent() {
        let (tx, rx) = mpsc::channel();
        let mut d = SimHandDetector::new(rx);
        tx.send(sample(None, HandPose::Relaxed)).unwrap();
        assert_eq!(d.detect(0).unwrap(), HandInput::Absent);
    }

    #[test]
    fn newest_sample_wins() {
        let (tx, rx) = mpsc::channel();
        let mut d = SimHandDetector::new(rx);
        tx.send(sample(None, HandPose::Relaxed)).unwrap();
        tx.send(sample(Some(Vec2::new(100.0, 100.0)), HandPose::Splayed)).unwrap();
        assert!(matches!(d.detect(0).unwrap(), HandInput::Present(_)));
        assert_eq!(d.detect(1).unwrap(), HandInput::Unchanged);
    }

    #[test]
    fn hand_lands_at_mirrored_pointer() {
        let cover = CoverTransform::compute(SIM_VIDEO.x, SIM_VIDEO.y, WINDOW.x, WINDOW.y);
        let input = SimHandDetector::hand_for(&sample(Some(Vec2::new(200.0, 300.0)), HandPose::Relaxed));
        let HandInput::Present(hand) = input else { panic!("expected a hand") };
        let anchor = cover.to_screen(hand.point(MIDDLE_MCP));
        assert!((anchor - Vec2::new(1080.0, 300.0)).length() < 1e-2);
    }

    #[test]
    fn poses_classify_as_intended() {
        let cover = CoverTransform::compute(SIM_VIDEO.x, SIM_VIDEO.y, WINDOW.x, WINDOW.y);
        let t = Thresholds::default();
        for (pose, want) in [
            (HandPose::Pinched, GestureState::Gather),
            (HandPose::Relaxed, GestureState::Idle),
            (HandPose::Splayed, GestureState::Scatter),
        ] {
            let input = SimHandDetector::hand_for(&sample(Some(Vec2::new(640.0, 360.0)), pose));
            assert_eq!(classify(&input, &cover, &t).unwrap().state, want);
        }
    }

    #[test]
    fn top_down_projection_centres_the_device() {
        let joints = vec![Vec2::ZERO; 21];
        let hand = top_down_hand(&joints, 0.8).unwrap();
        assert_eq!(hand.point(0), Vec2::splat(0.5));
        assert_eq!(hand.confidence, 0.8);

        let mut joints = joints;
        joints[MIDDLE_MCP] = Vec2::new(100.0, -200.0);
        let hand = top_down_hand(&joints, 0.8).unwrap();
        assert_eq!(hand.point(MIDDLE_MCP), Vec2::new(0.75, 0.0));
    }

    #[test]
    fn incomplete_tracking_frame_is_a_frame_error() {
        let short = vec![Vec2::ZERO; 17];
        assert!(matches!(top_down_hand(&short, 1.0), Err(DetectorError::Frame(_))));

        let mut bad = vec![Vec2::ZERO; 21];
        bad[4] = Vec2::new(f32::NAN, 0.0);
        assert!(matches!(top_down_hand(&bad, 1.0), Err(DetectorError::Frame(_))));
    }

    #[test]
    fn dropped_sender_is_disconnected() {
        let (tx, rx) = mpsc::channel::<PointerSample>();
        let mut d = SimHandDetector::new(rx);
        drop(tx);
        assert!(matches!(d.detect(0), Err(DetectorError::Disconnected)));
    }
}
