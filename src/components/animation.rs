//! Animation definitions, playback state and the rule-based animation router.
//!
//! An entity keeps a table of [`AnimationResource`] definitions keyed by name.
//! Its [`AnimationController`] is consulted once per fixed step to pick the
//! desired key from the entity's [`Signals`](crate::components::signals::Signals);
//! the [`Animation`] playback state then advances once per render frame.

use serde::{Deserialize, Serialize};

/// Immutable data describing a frame-based animation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationResource {
    /// Number of frames in the animation.
    pub frame_count: usize,
    /// Frames per second playback speed.
    pub fps: f64,
    /// Whether the animation restarts after the last frame.
    pub looped: bool,
}

impl AnimationResource {
    pub fn new(frame_count: usize, fps: f64, looped: bool) -> Self {
        Self {
            frame_count,
            fps,
            looped,
        }
    }
}

/// Playback state of the active animation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    pub animation_key: String,
    pub frame_index: usize,
    pub elapsed_time: f64,
    pub ended: bool,
}

impl Animation {
    pub fn new(animation_key: impl Into<String>) -> Self {
        Self {
            animation_key: animation_key.into(),
            frame_index: 0,
            elapsed_time: 0.0,
            ended: false,
        }
    }
}

// Generic, data-driven conditions over Signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    ScalarCmp {
        key: String,
        op: CmpOp,
        value: f64,
    },
    ScalarRange {
        key: String,
        min: f64,
        max: f64,
        inclusive: bool,
    },
    IntegerCmp {
        key: String,
        op: CmpOp,
        value: i32,
    },
    IntegerRange {
        key: String,
        min: i32,
        max: i32,
        inclusive: bool,
    },
    HasFlag {
        key: String,
    },
    LacksFlag {
        key: String,
    },
    All(Vec<Condition>),
    Any(Vec<Condition>),
    Not(Box<Condition>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimRule {
    pub when: Condition,
    pub set_key: String,
}

/// Ordered rules; the first satisfied rule wins, otherwise `fallback_key`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationController {
    pub rules: Vec<AnimRule>,
    pub fallback_key: String,
}

impl AnimationController {
    pub fn new(fallback_key: impl Into<String>) -> Self {
        Self {
            rules: Vec::new(),
            fallback_key: fallback_key.into(),
        }
    }

    pub fn with_rule(mut self, when: Condition, set_key: impl Into<String>) -> Self {
        self.rules.push(AnimRule {
            when,
            set_key: set_key.into(),
        });
        self
    }

    /// Every key this controller can produce.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rules
            .iter()
            .map(|r| r.set_key.as_str())
            .chain(std::iter::once(self.fallback_key.as_str()))
    }
}
