//! Fleet status derivation.
//!
//! A node's persisted status column is advisory bookkeeping; what the portal
//! shows is derived fresh on every read from two facts: how recently the
//! node heartbeated and whether it currently holds a run. Silence always
//! wins: a node that stopped heartbeating is OFFLINE even if a run is still
//! attributed to it.

use serde::Serialize;

use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Heartbeat age beyond which a node is reported OFFLINE.
pub const DEFAULT_HEARTBEAT_THRESHOLD_SECS: i64 = 60;

// ---------------------------------------------------------------------------
// Derived status
// ---------------------------------------------------------------------------

/// Fleet status as shown to administrators, recomputed on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DerivedNodeStatus {
    Offline,
    Online,
    Busy,
}

impl DerivedNodeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DerivedNodeStatus::Offline => "offline",
            DerivedNodeStatus::Online => "online",
            DerivedNodeStatus::Busy => "busy",
        }
    }
}

/// Derive a node's fleet status from heartbeat recency and occupancy.
///
/// Rules, in order:
/// - No heartbeat ever recorded, or the last one is older than
///   `threshold_secs`: OFFLINE, regardless of any attributed run.
/// - Heartbeat fresh and a run is held: BUSY.
/// - Heartbeat fresh and idle: ONLINE.
///
/// A heartbeat aged exactly `threshold_secs` still counts as fresh.
pub fn derive_node_status(
    last_heartbeat_at: Option<Timestamp>,
    current_run_id: Option<DbId>,
    now: Timestamp,
    threshold_secs: i64,
) -> DerivedNodeStatus {
    let fresh = match last_heartbeat_at {
        None => false,
        Some(last) => (now - last).num_seconds() <= threshold_secs,
    };
    if !fresh {
        return DerivedNodeStatus::Offline;
    }
    if current_run_id.is_some() {
        DerivedNodeStatus::Busy
    } else {
        DerivedNodeStatus::Online
    }
}

/// Whole minutes elapsed since the node last heartbeated.
///
/// `None` when the node has never heartbeated. Clock skew that puts the
/// heartbeat in the future clamps to zero.
pub fn minutes_since_heartbeat(
    last_heartbeat_at: Option<Timestamp>,
    now: Timestamp,
) -> Option<i64> {
    last_heartbeat_at.map(|last| (now - last).num_minutes().max(0))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn ago(secs: i64) -> Timestamp {
        Utc::now() - Duration::seconds(secs)
    }

    // -- derive_node_status ------------------------------------------------

    #[test]
    fn never_heartbeated_is_offline() {
        let now = Utc::now();
        assert_eq!(
            derive_node_status(None, None, now, 60),
            DerivedNodeStatus::Offline
        );
    }

    #[test]
    fn never_heartbeated_with_run_is_still_offline() {
        let now = Utc::now();
        assert_eq!(
            derive_node_status(None, Some(7), now, 60),
            DerivedNodeStatus::Offline
        );
    }

    #[test]
    fn fresh_and_idle_is_online() {
        let now = Utc::now();
        assert_eq!(
            derive_node_status(Some(ago(10)), None, now, 60),
            DerivedNodeStatus::Online
        );
    }

    #[test]
    fn fresh_and_occupied_is_busy() {
        let now = Utc::now();
        assert_eq!(
            derive_node_status(Some(ago(10)), Some(7), now, 60),
            DerivedNodeStatus::Busy
        );
    }

    #[test]
    fn stale_and_idle_is_offline() {
        let now = Utc::now();
        assert_eq!(
            derive_node_status(Some(ago(120)), None, now, 60),
            DerivedNodeStatus::Offline
        );
    }

    #[test]
    fn stale_and_occupied_is_offline() {
        // Silence wins over occupancy.
        let now = Utc::now();
        assert_eq!(
            derive_node_status(Some(ago(120)), Some(7), now, 60),
            DerivedNodeStatus::Offline
        );
    }

    #[test]
    fn heartbeat_exactly_at_threshold_is_fresh() {
        let now = Utc::now();
        let last = now - Duration::seconds(60);
        assert_eq!(
            derive_node_status(Some(last), None, now, 60),
            DerivedNodeStatus::Online
        );
    }

    #[test]
    fn heartbeat_one_second_past_threshold_is_offline() {
        let now = Utc::now();
        let last = now - Duration::seconds(61);
        assert_eq!(
            derive_node_status(Some(last), None, now, 60),
            DerivedNodeStatus::Offline
        );
    }

    // -- minutes_since_heartbeat -------------------------------------------

    #[test]
    fn minutes_none_when_never_heartbeated() {
        assert_eq!(minutes_since_heartbeat(None, Utc::now()), None);
    }

    #[test]
    fn minutes_floor_whole_minutes() {
        let now = Utc::now();
        assert_eq!(minutes_since_heartbeat(Some(ago(359)), now), Some(5));
    }

    #[test]
    fn minutes_zero_for_recent_heartbeat() {
        let now = Utc::now();
        assert_eq!(minutes_since_heartbeat(Some(ago(30)), now), Some(0));
    }

    #[test]
    fn minutes_clamp_future_heartbeat_to_zero() {
        let now = Utc::now();
        let future = now + Duration::seconds(90);
        assert_eq!(minutes_since_heartbeat(Some(future), now), Some(0));
    }
}
