use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the simulation core and its loaders.
///
/// Failing operations leave the particle set and the event queue exactly as they
/// were before the call.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid constructor or API parameter.
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// A new particle would start in contact with an existing one.
    #[error("particle {particle} overlaps with existing particle {existing}")]
    Overlap { particle: String, existing: String },

    /// The first step found no particles to simulate.
    #[error("simulation can not be launched with 0 particles")]
    EmptySimulation,

    /// Particles can only be added before the first step.
    #[error("particles can not be added once the simulation is running")]
    AlreadyRunning,

    /// The event queue emptied without reaching a refresh event.
    #[error("event queue drained before the next refresh")]
    QueueDrained,

    /// A particle list line is malformed or out of range.
    #[error("line {line}: {msg}")]
    Config { line: usize, msg: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_carries_line_number() {
        let e = Error::Config {
            line: 7,
            msg: "Mass can not be greater than 100".to_string(),
        };
        let msg = format!("{e}");
        assert!(msg.starts_with("line 7"));
        assert!(msg.contains("Mass"));
    }

    #[test]
    fn empty_simulation_is_informative() {
        assert!(Error::EmptySimulation.to_string().contains("0 particles"));
    }
}
