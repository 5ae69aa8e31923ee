//! Integration tests for track invariants under long edit sequences
//!
//! These tests verify that:
//! - Keyframes stay sorted and frame-unique after any mix of inserts/removals
//! - Exact keyframe frames always evaluate to the stored value
//! - The cached value always matches a fresh evaluation after an edit
//! - Link back-references never point at two links

use hitframe_animation::{InterpolationMode, KeyframeableValue, PendingSpan};
use hitframe_core::{EntityId, Frame, Value};
use pretty_assertions::assert_eq;

/// Small deterministic generator so failures reproduce
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn frame(&mut self) -> Frame {
        (self.next() % 60) as Frame
    }

    fn mode(&mut self) -> InterpolationMode {
        let modes = InterpolationMode::ALL;
        modes[(self.next() as usize) % modes.len()]
    }
}

fn assert_invariants(track: &KeyframeableValue) {
    let frames: Vec<Frame> = track.keyframes().map(|kf| kf.frame).collect();
    let mut sorted = frames.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(frames, sorted, "keyframes must be sorted and unique");

    for link in track.links() {
        for member in link.members() {
            let kf = track.keyframe(*member).expect("link member must exist");
            assert_eq!(kf.link(), Some(link.id()));
        }
    }
    for id in track.keyframe_ids() {
        if let Some(link) = track.keyframe(*id).and_then(|kf| kf.link()) {
            assert!(track.link(link).unwrap().contains(*id));
        }
    }

    assert_eq!(track.cached_value(), track.sample(track.cursor()).value);
}

#[test]
fn test_random_edit_sequences_keep_invariants() {
    let mut rng = Lcg(0x5eed);
    let mut track = KeyframeableValue::new(EntityId::default(), "rotation", Value::Float(0.0));
    track.cache_value(17);

    for step in 0..500 {
        match rng.next() % 6 {
            0 | 1 => {
                let frame = rng.frame();
                track
                    .set_value_at_frame(frame, Value::Float(step as f32))
                    .unwrap();
            }
            2 => {
                if !track.is_empty() {
                    let index = (rng.next() as usize) % track.len();
                    track.remove_at(index);
                }
            }
            3 => {
                let a = rng.frame();
                let b = rng.frame();
                let members = track.ids_in_range(a.min(b)..=a.max(b));
                let mode = rng.mode();
                let _ = track.add_link(&members, mode);
            }
            4 => {
                let first = track.links().next().map(|link| link.id());
                if let Some(id) = first {
                    track.remove_link(id);
                }
            }
            _ => {
                track.prune_links();
            }
        }
        assert_invariants(&track);
    }
}

#[test]
fn test_exact_frames_return_stored_values_in_every_mode() {
    for mode in InterpolationMode::ALL {
        let mut track = KeyframeableValue::new(EntityId::default(), "x", Value::Float(0.0));
        for (frame, value) in [(0, 3.0), (5, -1.0), (9, 8.0), (30, 2.5)] {
            track.set_value_at_frame(frame, Value::Float(value)).unwrap();
        }
        track.add_link_at_frames(&[0, 5, 9, 30], mode).unwrap();

        let stored: Vec<(Frame, Value)> = track.keyframes().map(|kf| (kf.frame, kf.value)).collect();
        for (frame, value) in stored {
            assert_eq!(track.interpolate(frame).value, value, "{mode} at {frame}");
        }
    }
}

#[test]
fn test_boundaries_never_extrapolate() {
    let mut track = KeyframeableValue::new(EntityId::default(), "x", Value::Float(0.0));
    track.set_value_at_frame(10, Value::Float(1.0)).unwrap();
    track.set_value_at_frame(20, Value::Float(4.0)).unwrap();
    track
        .add_link_at_frames(&[10, 20], InterpolationMode::EaseOutBack)
        .unwrap();

    for frame in -20..10 {
        assert_eq!(track.sample(frame).value, Value::Float(1.0));
    }
    for frame in 20..50 {
        assert_eq!(track.sample(frame).value, Value::Float(4.0));
    }
}

#[test]
fn test_pending_span_then_batch_retime() {
    let mut track = KeyframeableValue::new(EntityId::default(), "x", Value::Float(0.0));
    track.set_value_at_frame(0, Value::Float(0.0)).unwrap();
    track.set_value_at_frame(10, Value::Float(10.0)).unwrap();
    track.cache_value(10);

    let mut span = PendingSpan::begin(0, InterpolationMode::Linear);
    span.drag_to(8);
    span.nudge(2);
    let link = span.commit(&mut track).unwrap().unwrap();
    assert_eq!(track.sample(5).value, Value::Float(5.0));

    track.batch().scale_time(2.0);
    assert_eq!(track.member_frames(link), Some(vec![0, 20]));
    assert_eq!(track.sample(5).value, Value::Float(2.5));
    assert_eq!(track.cached_value(), Value::Float(5.0));
}
