//! Turbine command enum for [`crate::Client::send_command`] (§4.7).

/// A command written to the controller's command data point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Start the turbine.
    Start,
    /// Stop the turbine.
    Stop,
    /// Reset a latched fault.
    Reset,
    /// Force a manual start, bypassing automatic wind-speed gating.
    ManualStart,
}

impl Command {
    /// The raw `u32` value written to [`mnet_proto::datapoint::COMMAND_BASE_ID`].
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::Start => 1,
            Self::Stop => 2,
            Self::Reset => 3,
            Self::ManualStart => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let codes = [Command::Start.code(), Command::Stop.code(), Command::Reset.code(), Command::ManualStart.code()];
        for (i, a) in codes.iter().enumerate() {
            for (j, b) in codes.iter().enumerate() {
                assert!(i == j || a != b);
            }
        }
    }
}
