//! Pointer event state machine
//!
//! Converts the raw press/move/release stream coming from the interactive
//! surface into draw model mutations. The tracker is a two-state machine:
//! Idle and Pressed. Anything other than a press while Idle is ignored.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::model::DrawModel;
use crate::types::Point;

/// A normalized pointer event from the interactive surface
///
/// Move events may carry coalesced historical positions when the source
/// batches several movements into one event; all of them are forwarded
/// to the stroke, oldest first, so fast motion does not collapse into a
/// straight line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Press {
        pos: Point,
        timestamp_ms: u64,
    },
    Move {
        pos: Point,
        #[serde(default)]
        history: Vec<Point>,
        timestamp_ms: u64,
    },
    Release {
        pos: Point,
        timestamp_ms: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum TrackerState {
    #[default]
    Idle,
    Pressed,
}

/// Press/move/release tracker feeding a [`DrawModel`]
#[derive(Debug, Default)]
pub struct PointerTracker {
    state: TrackerState,
}

impl PointerTracker {
    /// Create a tracker in the Idle state
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the pointer is currently pressed
    pub fn is_pressed(&self) -> bool {
        self.state == TrackerState::Pressed
    }

    /// Apply one pointer event to the draw model
    pub fn handle(&mut self, model: &mut DrawModel, event: &PointerEvent) {
        match (self.state, event) {
            (TrackerState::Idle, PointerEvent::Press { pos, .. }) => {
                trace!("tracker: press at ({:.1}, {:.1})", pos.x, pos.y);
                model.begin_stroke(*pos);
                self.state = TrackerState::Pressed;
            }
            (TrackerState::Pressed, PointerEvent::Move { pos, history, .. }) => {
                for point in history {
                    model.extend_stroke(*point);
                }
                model.extend_stroke(*pos);
            }
            (TrackerState::Pressed, PointerEvent::Release { .. }) => {
                trace!("tracker: release");
                model.end_stroke();
                self.state = TrackerState::Idle;
            }
            // Repeated press while drawing or move/release while Idle
            (_, event) => {
                trace!("tracker: ignoring {:?} in {:?}", event, self.state);
            }
        }
    }
}
