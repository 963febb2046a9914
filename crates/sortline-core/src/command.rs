//! Commands forwarded from the UI/input collaborator into the simulation.

use crate::mode::SensorMode;

/// A request delivered to the line from outside the tick loop.
///
/// Commands are applied synchronously in the tick that receives them,
/// after the spawn check and before any package moves.
///
/// # Examples
///
/// ```
/// use sortline_core::{Command, SensorMode};
///
/// let cmd = Command::SetMode(SensorMode::Color);
/// assert_eq!(cmd, Command::SetMode("color".parse().unwrap()));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Replace the active classification mode and move the actuator to
    /// the new mode's decision zone. Packages already past the window
    /// keep their lane.
    SetMode(SensorMode),
}
