//! Per-tick execution record of a movement.

use crate::cell::CellPos;
use crate::input::{ControlIntent, Input, InputSet, ItemRequest, MovementTarget};
use crate::rotation::Rotation;

/// Execution phase of a movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MovementStatus {
    /// Clearing obstructions before the movement can begin.
    #[default]
    Prepping,
    /// Obstructions cleared; running starts next tick.
    Waiting,
    /// The movement is in progress.
    Running,
    /// The agent arrived.
    Success,
    /// The agent left every position the movement considers valid, or the
    /// movement cannot proceed from where it is.
    Unreachable,
    /// The movement ran out of time.
    Failed,
}

impl MovementStatus {
    /// Whether the status is terminal.
    #[must_use]
    pub const fn is_complete(self) -> bool {
        matches!(self, Self::Success | Self::Unreachable | Self::Failed)
    }
}

/// The phase plus the control intent being assembled for the current tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovementState {
    status: MovementStatus,
    intent: ControlIntent,
}

impl MovementState {
    /// Current phase.
    #[must_use]
    pub const fn status(&self) -> MovementStatus {
        self.status
    }

    /// The look target requested so far this tick.
    #[must_use]
    pub const fn target(&self) -> Option<MovementTarget> {
        self.intent.target
    }

    /// Inputs requested so far this tick.
    #[must_use]
    pub const fn inputs(&self) -> InputSet {
        self.intent.inputs
    }

    pub(crate) fn set_status(&mut self, status: MovementStatus) {
        self.status = status;
    }

    pub(crate) fn set_target(&mut self, rotation: Rotation, forced: bool) {
        self.intent.target = Some(MovementTarget { rotation, forced });
    }

    pub(crate) fn set_input(&mut self, input: Input, held: bool) {
        self.intent.inputs.set(input, held);
    }

    pub(crate) fn click_left(&mut self, cell: CellPos) {
        self.intent.inputs.set(Input::ClickLeft, true);
        self.intent.break_target = Some(cell);
    }

    pub(crate) fn click_right(&mut self, cell: CellPos) {
        self.intent.inputs.set(Input::ClickRight, true);
        self.intent.place_target = Some(cell);
    }

    pub(crate) fn request_item(&mut self, item: ItemRequest) {
        self.intent.item = Some(item);
    }

    /// Hands over this tick's intent and starts the next one empty.
    pub(crate) fn take_intent(&mut self) -> ControlIntent {
        std::mem::take(&mut self.intent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taking_the_intent_clears_it() {
        let mut state = MovementState::default();
        state.set_input(Input::Jump, true);
        state.click_left(CellPos::new(1, 2, 3));
        let intent = state.take_intent();
        assert!(intent.holds(Input::Jump));
        assert!(intent.holds(Input::ClickLeft));
        assert_eq!(intent.break_target, Some(CellPos::new(1, 2, 3)));
        assert!(state.take_intent().is_idle());
        assert_eq!(state.status(), MovementStatus::Prepping);
    }

    #[test]
    fn only_success_unreachable_and_failed_are_terminal() {
        use MovementStatus::*;
        for status in [Prepping, Waiting, Running] {
            assert!(!status.is_complete());
        }
        for status in [Success, Unreachable, Failed] {
            assert!(status.is_complete());
        }
    }
}
