use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            /// Freshly generated identifier, unique within a session.
            pub fn fresh() -> Self {
                Self(Uuid::new_v4().to_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

id_newtype!(ParticipantId);
id_newtype!(SessionId);

/// Display status of a timer, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerPhase {
    Overtime,
    Running,
    Paused,
}

/// One participant's countdown record.
///
/// `remaining_seconds` is signed: negative values measure how far past the
/// limit the participant has spoken. `overtime` latches true on the first
/// crossing to zero or below while running and is cleared only by a reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantTimer {
    pub id: ParticipantId,
    pub name: String,
    pub remaining_seconds: i64,
    pub running: bool,
    pub overtime: bool,
}

impl ParticipantTimer {
    pub fn new(id: ParticipantId, name: impl Into<String>, remaining_seconds: i64) -> Self {
        Self {
            id,
            name: name.into(),
            remaining_seconds,
            running: false,
            overtime: false,
        }
    }

    pub fn phase(&self) -> TimerPhase {
        if self.overtime {
            TimerPhase::Overtime
        } else if self.running {
            TimerPhase::Running
        } else {
            TimerPhase::Paused
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub default_seconds: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        // Three minutes, the host-facing default of the add-on.
        Self {
            default_seconds: 180,
        }
    }
}

/// Renders seconds as `MM:SS`, with a leading `-` once in overtime.
pub fn format_clock(seconds: i64) -> String {
    let abs = seconds.abs();
    let formatted = format!("{:02}:{:02}", abs / 60, abs % 60);
    if seconds < 0 {
        format!("-{formatted}")
    } else {
        formatted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_seconds_zero_padded() {
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(600), "10:00");
    }

    #[test]
    fn formats_negative_seconds_with_leading_sign() {
        assert_eq!(format_clock(-5), "-00:05");
        assert_eq!(format_clock(-61), "-01:01");
    }

    #[test]
    fn phase_prefers_overtime_over_running() {
        let mut timer = ParticipantTimer::new(ParticipantId::fresh(), "Ana", 0);
        timer.running = true;
        timer.overtime = true;
        assert_eq!(timer.phase(), TimerPhase::Overtime);
        timer.overtime = false;
        assert_eq!(timer.phase(), TimerPhase::Running);
        timer.running = false;
        assert_eq!(timer.phase(), TimerPhase::Paused);
    }

    #[test]
    fn fresh_ids_are_unique() {
        assert_ne!(ParticipantId::fresh(), ParticipantId::fresh());
    }
}
