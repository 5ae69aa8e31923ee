//! Playback
//!
//! The [`Animator`] owns the shared frame counter and the playback state. It
//! does not own any property data: every operation that needs keyframes
//! takes the scene to query as an [`Animated`] implementor.
//!
//! Each time the frame changes, every track in the scene recomputes its cache
//! at the new frame and the registered frame listeners are notified.

use crate::track::KeyframeableValue;
use hitframe_core::Frame;
use slotmap::{new_key_type, SlotMap};
use std::fmt;
use tracing::{debug, trace};

new_key_type! {
    /// Handle to a registered frame-change listener
    pub struct ListenerId;
}

/// Callback invoked with the new frame after every frame change
pub type FrameListener = Box<dyn FnMut(Frame)>;

/// Anything that exposes keyframeable tracks to the animator
pub trait Animated {
    fn for_each_track(&self, f: &mut dyn FnMut(&KeyframeableValue));

    fn for_each_track_mut(&mut self, f: &mut dyn FnMut(&mut KeyframeableValue));
}

impl Animated for KeyframeableValue {
    fn for_each_track(&self, f: &mut dyn FnMut(&KeyframeableValue)) {
        f(self);
    }

    fn for_each_track_mut(&mut self, f: &mut dyn FnMut(&mut KeyframeableValue)) {
        f(self);
    }
}

impl<T: Animated> Animated for [T] {
    fn for_each_track(&self, f: &mut dyn FnMut(&KeyframeableValue)) {
        for item in self {
            item.for_each_track(f);
        }
    }

    fn for_each_track_mut(&mut self, f: &mut dyn FnMut(&mut KeyframeableValue)) {
        for item in self {
            item.for_each_track_mut(f);
        }
    }
}

impl<T: Animated> Animated for Vec<T> {
    fn for_each_track(&self, f: &mut dyn FnMut(&KeyframeableValue)) {
        self.as_slice().for_each_track(f);
    }

    fn for_each_track_mut(&mut self, f: &mut dyn FnMut(&mut KeyframeableValue)) {
        self.as_mut_slice().for_each_track_mut(f);
    }
}

impl<K: slotmap::Key, T: Animated> Animated for SlotMap<K, T> {
    fn for_each_track(&self, f: &mut dyn FnMut(&KeyframeableValue)) {
        for item in self.values() {
            item.for_each_track(f);
        }
    }

    fn for_each_track_mut(&mut self, f: &mut dyn FnMut(&mut KeyframeableValue)) {
        for item in self.values_mut() {
            item.for_each_track_mut(f);
        }
    }
}

/// First and last keyframe frame across every track of a scene
pub fn timeline_bounds<S: Animated + ?Sized>(scene: &S) -> Option<(Frame, Frame)> {
    let mut bounds: Option<(Frame, Frame)> = None;
    scene.for_each_track(&mut |track| {
        if let (Some(first), Some(last)) = (track.first_frame(), track.last_frame()) {
            bounds = Some(match bounds {
                Some((lo, hi)) => (lo.min(first), hi.max(last)),
                None => (first, last),
            });
        }
    });
    bounds
}

/// Playback state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Stopped,
    PlayingForward,
    PlayingBackward,
}

/// Drives the shared frame counter
pub struct Animator {
    current_frame: Frame,
    fps: u32,
    state: PlaybackState,
    looping: bool,
    /// Seconds accumulated towards the next frame step
    accumulator: f32,
    listeners: SlotMap<ListenerId, FrameListener>,
}

impl Animator {
    pub const DEFAULT_FPS: u32 = 60;

    pub fn new() -> Self {
        Self::with_fps(Self::DEFAULT_FPS)
    }

    pub fn with_fps(fps: u32) -> Self {
        Self {
            current_frame: 0,
            fps: fps.max(1),
            state: PlaybackState::Stopped,
            looping: true,
            accumulator: 0.0,
            listeners: SlotMap::with_key(),
        }
    }

    pub fn current_frame(&self) -> Frame {
        self.current_frame
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Set the playback rate. Clamped to at least one frame per second.
    pub fn set_fps(&mut self, fps: u32) {
        self.fps = fps.max(1);
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state != PlaybackState::Stopped
    }

    pub fn looping(&self) -> bool {
        self.looping
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    /// Toggle forward playback. Clears backward playback.
    pub fn play_forward(&mut self) {
        self.state = match self.state {
            PlaybackState::PlayingForward => PlaybackState::Stopped,
            _ => PlaybackState::PlayingForward,
        };
        debug!(state = ?self.state, "playback toggled");
    }

    /// Toggle backward playback. Clears forward playback.
    pub fn play_backward(&mut self) {
        self.state = match self.state {
            PlaybackState::PlayingBackward => PlaybackState::Stopped,
            _ => PlaybackState::PlayingBackward,
        };
        debug!(state = ?self.state, "playback toggled");
    }

    pub fn stop(&mut self) {
        self.state = PlaybackState::Stopped;
        self.accumulator = 0.0;
    }

    /// Advance playback by `dt` seconds.
    ///
    /// Steps one frame per whole `1 / fps` accumulated. When looping and the
    /// scene has keyframes, the frame wraps within the timeline bounds.
    /// Returns true if the frame changed.
    pub fn update<S: Animated + ?Sized>(&mut self, dt: f32, scene: &mut S) -> bool {
        let step = match self.state {
            PlaybackState::Stopped => return false,
            PlaybackState::PlayingForward => 1,
            PlaybackState::PlayingBackward => -1,
        };

        self.accumulator += dt;
        let frame_time = 1.0 / self.fps as f32;
        let bounds = if self.looping {
            timeline_bounds(&*scene)
        } else {
            None
        };

        let start = self.current_frame;
        while self.accumulator >= frame_time {
            self.accumulator -= frame_time;
            self.current_frame = self.current_frame.saturating_add(step);

            if let Some((first, last)) = bounds {
                if self.current_frame > last || self.current_frame < first {
                    self.current_frame = if step > 0 { first } else { last };
                }
            }
        }

        if self.current_frame == start {
            return false;
        }
        trace!(from = start, to = self.current_frame, "frame advanced");
        self.frame_changed(scene);
        true
    }

    /// Jump to `frame`, refreshing caches and notifying listeners
    pub fn set_frame<S: Animated + ?Sized>(&mut self, frame: Frame, scene: &mut S) {
        self.current_frame = frame;
        self.frame_changed(scene);
    }

    /// Timeline bounds of the scene
    pub fn bounds<S: Animated + ?Sized>(&self, scene: &S) -> Option<(Frame, Frame)> {
        timeline_bounds(scene)
    }

    /// Nearest keyframe frame strictly before the current frame on any
    /// track, clamped to the timeline bounds
    pub fn previous_frame<S: Animated + ?Sized>(&self, scene: &S) -> Frame {
        let Some((first, last)) = timeline_bounds(scene) else {
            return self.current_frame;
        };
        let current = self.current_frame;
        let mut best: Option<Frame> = None;
        scene.for_each_track(&mut |track| {
            if let Some(frame) = track.previous_frame(current) {
                best = Some(best.map_or(frame, |b| b.max(frame)));
            }
        });
        best.unwrap_or(first).clamp(first, last)
    }

    /// Nearest keyframe frame strictly after the current frame on any track,
    /// clamped to the timeline bounds
    pub fn next_frame<S: Animated + ?Sized>(&self, scene: &S) -> Frame {
        let Some((first, last)) = timeline_bounds(scene) else {
            return self.current_frame;
        };
        let current = self.current_frame;
        let mut best: Option<Frame> = None;
        scene.for_each_track(&mut |track| {
            if let Some(frame) = track.next_frame(current) {
                best = Some(best.map_or(frame, |b| b.min(frame)));
            }
        });
        best.unwrap_or(last).clamp(first, last)
    }

    pub fn jump_to_previous<S: Animated + ?Sized>(&mut self, scene: &mut S) -> Frame {
        let frame = self.previous_frame(&*scene);
        self.set_frame(frame, scene);
        frame
    }

    pub fn jump_to_next<S: Animated + ?Sized>(&mut self, scene: &mut S) -> Frame {
        let frame = self.next_frame(&*scene);
        self.set_frame(frame, scene);
        frame
    }

    /// Register a callback fired after every frame change
    pub fn on_frame_changed<F: FnMut(Frame) + 'static>(&mut self, listener: F) -> ListenerId {
        self.listeners.insert(Box::new(listener))
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id).is_some()
    }

    fn frame_changed<S: Animated + ?Sized>(&mut self, scene: &mut S) {
        let frame = self.current_frame;
        scene.for_each_track_mut(&mut |track| {
            track.cache_value(frame);
        });
        for listener in self.listeners.values_mut() {
            listener(frame);
        }
    }
}

impl Default for Animator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Animator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animator")
            .field("current_frame", &self.current_frame)
            .field("fps", &self.fps)
            .field("state", &self.state)
            .field("looping", &self.looping)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
