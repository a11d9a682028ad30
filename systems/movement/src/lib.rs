#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure movement system translating player intent into roomba commands.

use roomba_cleanup_core::{Command, Direction, Event, GameStatus};

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlayerInput {
    /// Direction requested by the player on this frame, if any.
    pub direction: Option<Direction>,
    /// Indicates whether the player pressed the restart key on this frame.
    pub restart: bool,
}

impl PlayerInput {
    /// Creates a new input descriptor with explicit field values.
    #[must_use]
    pub const fn new(direction: Option<Direction>, restart: bool) -> Self {
        Self { direction, restart }
    }
}

/// Movement system that emits at most one roomba command per frame.
#[derive(Clone, Debug)]
pub struct Movement {
    status: GameStatus,
}

impl Default for Movement {
    fn default() -> Self {
        Self {
            status: GameStatus::Playing,
        }
    }
}

impl Movement {
    /// Creates a new movement system instance.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            status: GameStatus::Playing,
        }
    }

    /// Consumes world events and adapter-derived input to emit roomba commands.
    ///
    /// While a round is in play only the direction is honoured; once it ends
    /// only the restart request is.
    pub fn handle(&mut self, events: &[Event], input: PlayerInput, out: &mut Vec<Command>) {
        for event in events {
            if let Event::StatusChanged { status } = event {
                self.status = *status;
            }
        }

        if self.status.is_over() {
            if input.restart {
                log::debug!("restart requested after {:?}", self.status);
                out.push(Command::Restart);
            }
            return;
        }

        if let Some(direction) = input.direction {
            out.push(Command::MoveRoomba { direction });
        }
    }
}
