/// Events emitted during a simulation step.
/// The presentation layer consumes these for the message banner and sound.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameEvent {
    /// A non-final checkpoint was claimed with the player standing at it.
    CheckpointReached { id: u32 },
    /// The last checkpoint was claimed. The course is frozen from here on.
    CourseComplete { id: u32 },
}

impl GameEvent {
    pub fn message(&self) -> &'static str {
        match self {
            GameEvent::CheckpointReached { .. } => "You reached a checkpoint!",
            GameEvent::CourseComplete { .. } => "You reached the final checkpoint!",
        }
    }

    /// Should the banner hide itself after the message interval?
    /// The completion message stays up for good.
    pub fn auto_dismiss(&self) -> bool {
        matches!(self, GameEvent::CheckpointReached { .. })
    }
}
