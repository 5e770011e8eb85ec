//! Status helper enums mapping to SMALLSERIAL/SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding lookup table. Rows may be added to the tables but
//! never renumbered.

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Return the seed-data label for this variant.
            pub fn label(self) -> &'static str {
                match self {
                    $( $name::$variant => $label ),+
                }
            }

            /// Resolve a database status ID back to the enum.
            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( $val => Some($name::$variant), )+
                    _ => None,
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Persisted (advisory) node fleet status.
    NodeStatus {
        Offline = 1 => "offline",
        Online = 2 => "online",
        Busy = 3 => "busy",
    }
}

define_status_enum! {
    /// Execution request lifecycle status. Transitions are monotonic:
    /// queued -> claimed -> done | failed.
    RequestStatus {
        Queued = 1 => "queued",
        Claimed = 2 => "claimed",
        Done = 3 => "done",
        Failed = 4 => "failed",
    }
}

define_status_enum! {
    /// Execution run status. A run is immutable once it leaves Running.
    RunStatus {
        Running = 1 => "running",
        Success = 2 => "success",
        Failed = 3 => "failed",
    }
}

define_status_enum! {
    /// Run log severity level.
    LogLevel {
        Debug = 1 => "debug",
        Info = 2 => "info",
        Warn = 3 => "warn",
        Error = 4 => "error",
    }
}

define_status_enum! {
    /// Execution request priority.
    RequestPriority {
        Low = 1 => "low",
        Medium = 2 => "medium",
        High = 3 => "high",
        Urgent = 4 => "urgent",
    }
}

impl RequestPriority {
    /// Parse a priority from its label, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "low" => Some(RequestPriority::Low),
            "medium" => Some(RequestPriority::Medium),
            "high" => Some(RequestPriority::High),
            "urgent" => Some(RequestPriority::Urgent),
            _ => None,
        }
    }
}

impl LogLevel {
    /// Parse a log level from its label, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

impl RunStatus {
    /// Parse a terminal run status from a completion report.
    ///
    /// Only `success` and `failed` are accepted; a node cannot report a run
    /// back into `running`.
    pub fn parse_terminal(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "success" => Some(RunStatus::Success),
            "failed" => Some(RunStatus::Failed),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_status_ids_match_seed_data() {
        assert_eq!(NodeStatus::Offline.id(), 1);
        assert_eq!(NodeStatus::Online.id(), 2);
        assert_eq!(NodeStatus::Busy.id(), 3);
    }

    #[test]
    fn request_status_ids_match_seed_data() {
        assert_eq!(RequestStatus::Queued.id(), 1);
        assert_eq!(RequestStatus::Claimed.id(), 2);
        assert_eq!(RequestStatus::Done.id(), 3);
        assert_eq!(RequestStatus::Failed.id(), 4);
    }

    #[test]
    fn run_status_ids_match_seed_data() {
        assert_eq!(RunStatus::Running.id(), 1);
        assert_eq!(RunStatus::Success.id(), 2);
        assert_eq!(RunStatus::Failed.id(), 3);
    }

    #[test]
    fn status_into_status_id() {
        let id: StatusId = RequestStatus::Queued.into();
        assert_eq!(id, 1);
    }

    #[test]
    fn labels_round_trip_through_from_id() {
        for status in [RunStatus::Running, RunStatus::Success, RunStatus::Failed] {
            assert_eq!(RunStatus::from_id(status.id()), Some(status));
        }
        assert_eq!(RunStatus::from_id(99), None);
    }

    #[test]
    fn priority_parse_is_case_insensitive() {
        assert_eq!(RequestPriority::parse("MEDIUM"), Some(RequestPriority::Medium));
        assert_eq!(RequestPriority::parse("urgent"), Some(RequestPriority::Urgent));
        assert_eq!(RequestPriority::parse("whenever"), None);
    }

    #[test]
    fn terminal_run_status_rejects_running() {
        assert_eq!(RunStatus::parse_terminal("SUCCESS"), Some(RunStatus::Success));
        assert_eq!(RunStatus::parse_terminal("failed"), Some(RunStatus::Failed));
        assert_eq!(RunStatus::parse_terminal("running"), None);
    }
}
