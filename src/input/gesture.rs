//! Horizontal swipe recognition on article rows.
//!
//! One touch cycle is `idle → tracking → idle`. While tracking, the row
//! follows the finger once the displacement leaves the dead zone and fades
//! out with distance. On release the displacement is classified:
//!
//! | displacement      | outcome                    |
//! |-------------------|----------------------------|
//! | `d < -80`         | swipe left: toggle read    |
//! | `d > 80`          | swipe right: toggle saved  |
//! | `-80 <= d <= 80`  | nothing                    |
//!
//! Exactly ±80 px does not trigger.

use crate::page::{ArticleId, Transition};
use std::time::Duration;

/// Displacement below which the row does not move.
pub const DEAD_ZONE_PX: f64 = 30.0;
/// Displacement that must be exceeded for a swipe to trigger.
pub const SWIPE_THRESHOLD_PX: f64 = 80.0;
/// Displacement at which drag feedback stops following the finger.
pub const MAX_FEEDBACK_PX: f64 = 150.0;
/// Distance past the dead zone over which opacity fades from 1 to 0.
pub const FADE_SPAN_PX: f64 = 200.0;
/// Ease-back transition applied on release.
pub const RESET_TRANSITION: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swipe {
    None,
    /// Toggle read/unread.
    Left,
    /// Toggle saved.
    Right,
}

/// Inline style the row should show while being dragged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragFeedback {
    pub offset_px: f64,
    pub opacity: f64,
}

impl DragFeedback {
    /// Style on release: back to rest with an ease transition.
    pub const RESET: DragFeedback = DragFeedback {
        offset_px: 0.0,
        opacity: 1.0,
    };

    pub fn reset_transition() -> Transition {
        Transition::Ease(RESET_TRANSITION)
    }
}

/// Transient state of one touch cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSession {
    pub article_id: ArticleId,
    pub start_x: f64,
    pub current_x: f64,
    pub swiping: bool,
}

impl GestureSession {
    pub fn displacement(&self) -> f64 {
        self.current_x - self.start_x
    }
}

/// Classify a final displacement. The left swipe is checked first.
pub fn classify(displacement: f64) -> Swipe {
    if displacement < -SWIPE_THRESHOLD_PX {
        Swipe::Left
    } else if displacement > SWIPE_THRESHOLD_PX {
        Swipe::Right
    } else {
        Swipe::None
    }
}

/// Drag feedback for a displacement, or `None` inside the dead zone and past
/// the feedback window (the row keeps its last style there).
pub fn feedback(displacement: f64) -> Option<DragFeedback> {
    let distance = displacement.abs();
    if distance <= DEAD_ZONE_PX || distance >= MAX_FEEDBACK_PX {
        return None;
    }
    let offset_px = if displacement > 0.0 {
        displacement - DEAD_ZONE_PX
    } else {
        displacement + DEAD_ZONE_PX
    };
    let opacity = (1.0 - (distance - DEAD_ZONE_PX) / FADE_SPAN_PX).clamp(0.0, 1.0);
    Some(DragFeedback { offset_px, opacity })
}

/// Tracks at most one touch cycle at a time.
#[derive(Debug, Default)]
pub struct GestureRecognizer {
    session: Option<GestureSession>,
}

impl GestureRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&GestureSession> {
        self.session.as_ref()
    }

    pub fn is_tracking(&self) -> bool {
        self.session.is_some_and(|s| s.swiping)
    }

    /// Begin tracking. A touch on another row replaces any unfinished cycle.
    pub fn touch_start(&mut self, article_id: ArticleId, x: f64) {
        self.session = Some(GestureSession {
            article_id,
            start_x: x,
            current_x: x,
            swiping: true,
        });
    }

    /// Update the finger position. Returns feedback to apply to the row.
    pub fn touch_move(&mut self, article_id: ArticleId, x: f64) -> Option<DragFeedback> {
        let session = self.session.as_mut()?;
        if !session.swiping || session.article_id != article_id {
            return None;
        }
        session.current_x = x;
        feedback(session.displacement())
    }

    /// Finish the cycle and classify it. Returns `None` if no cycle was being
    /// tracked for `article_id`; the session is always cleared.
    pub fn touch_end(&mut self, article_id: ArticleId) -> Option<Swipe> {
        let session = self.session.take()?;
        if !session.swiping || session.article_id != article_id {
            return None;
        }
        let swipe = classify(session.displacement());
        tracing::trace!(article_id = %article_id, displacement = session.displacement(), ?swipe, "Touch cycle ended");
        Some(swipe)
    }
}
