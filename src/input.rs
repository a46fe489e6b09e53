//! Control inputs a movement asks the executor to apply for one tick.

use crate::block::BlockState;
use crate::cell::CellPos;
use crate::rotation::Rotation;

/// A single control input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Input {
    /// Walk forwards.
    MoveForward,
    /// Walk backwards.
    MoveBack,
    /// Strafe left.
    MoveLeft,
    /// Strafe right.
    MoveRight,
    /// Jump.
    Jump,
    /// Sneak.
    Sneak,
    /// Sprint.
    Sprint,
    /// Primary click: break.
    ClickLeft,
    /// Secondary click: place or use.
    ClickRight,
}

impl Input {
    /// Every input.
    pub const ALL: [Self; 9] = [
        Self::MoveForward,
        Self::MoveBack,
        Self::MoveLeft,
        Self::MoveRight,
        Self::Jump,
        Self::Sneak,
        Self::Sprint,
        Self::ClickLeft,
        Self::ClickRight,
    ];

    const fn bit(self) -> u16 {
        1 << (self as u8)
    }
}

/// The inputs held for a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct InputSet(u16);

impl InputSet {
    /// No inputs held.
    pub const EMPTY: Self = Self(0);

    /// Holds or releases `input`.
    pub fn set(&mut self, input: Input, held: bool) {
        if held {
            self.0 |= input.bit();
        } else {
            self.0 &= !input.bit();
        }
    }

    /// Whether `input` is held.
    #[must_use]
    pub const fn contains(self, input: Input) -> bool {
        self.0 & input.bit() != 0
    }

    /// Whether nothing is held.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// The held inputs.
    pub fn iter(self) -> impl Iterator<Item = Input> {
        Input::ALL.into_iter().filter(move |input| self.contains(*input))
    }
}

impl FromIterator<Input> for InputSet {
    fn from_iter<I: IntoIterator<Item = Input>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for input in iter {
            set.set(input, true);
        }
        set
    }
}

/// The item a movement needs in hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemRequest {
    /// Any throwaway block.
    Throwaway,
    /// The fastest tool for breaking the given block.
    BestToolFor(BlockState),
    /// A filled water bucket.
    WaterBucket,
    /// An empty bucket, to pick water back up.
    EmptyBucket,
}

/// Where the agent should look this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementTarget {
    /// The rotation to look at.
    pub rotation: Rotation,
    /// Whether the executor must apply the rotation exactly rather than
    /// smoothing towards it.
    pub forced: bool,
}

/// Everything the executor should do for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControlIntent {
    /// Inputs to hold.
    pub inputs: InputSet,
    /// Where to look.
    pub target: Option<MovementTarget>,
    /// Block to strike with the primary click.
    pub break_target: Option<CellPos>,
    /// Cell the secondary click should fill or use.
    pub place_target: Option<CellPos>,
    /// Item to hold.
    pub item: Option<ItemRequest>,
}

impl ControlIntent {
    /// Whether `input` is held.
    #[must_use]
    pub const fn holds(&self, input: Input) -> bool {
        self.inputs.contains(input)
    }

    /// Whether the intent asks for nothing.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.inputs.is_empty()
            && self.target.is_none()
            && self.break_target.is_none()
            && self.place_target.is_none()
            && self.item.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inputs_toggle_independently() {
        let mut set = InputSet::EMPTY;
        set.set(Input::Jump, true);
        set.set(Input::Sprint, true);
        set.set(Input::Jump, false);
        assert!(!set.contains(Input::Jump));
        assert!(set.contains(Input::Sprint));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Input::Sprint]);
    }

    #[test]
    fn default_intent_is_idle() {
        assert!(ControlIntent::default().is_idle());
    }
}
