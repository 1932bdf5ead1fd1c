//! Booking statuses, actor roles and the two tables that govern how a
//! booking may move between statuses.
//!
//! ```text
//!   pending → confirmed → assigned → in_progress → completed
//!      │          │           │            │
//!      └──────────┴───────────┴────────────┴──→ cancelled
//! ```
//!
//! `TRANSITIONS` is the lifecycle graph. `GRANTS` says which of its edges each
//! role may request. Adding a status or a role is an edit to these tables.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Assigned,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Staff,
    Admin,
}

use BookingStatus::*;

/// Directed edges of the lifecycle, keyed by source status.
const TRANSITIONS: &[(BookingStatus, &[BookingStatus])] = &[
    (Pending, &[Confirmed, Cancelled]),
    (Confirmed, &[Assigned, Cancelled]),
    (Assigned, &[InProgress, Cancelled]),
    (InProgress, &[Completed, Cancelled]),
    (Completed, &[]),
    (Cancelled, &[]),
];

/// Edges each role may request, keyed by `(role, source status)`.
/// Every entry must be a subset of `TRANSITIONS`.
const GRANTS: &[(Role, BookingStatus, &[BookingStatus])] = &[
    (Role::Staff, Assigned, &[InProgress]),
    (Role::Staff, InProgress, &[Completed]),
    (Role::Admin, Pending, &[Confirmed, Cancelled]),
    (Role::Admin, Confirmed, &[Assigned, Cancelled]),
    (Role::Admin, Assigned, &[InProgress, Cancelled]),
    (Role::Admin, InProgress, &[Completed, Cancelled]),
];

impl BookingStatus {
    pub const ALL: [BookingStatus; 6] = [Pending, Confirmed, Assigned, InProgress, Completed, Cancelled];

    /// Statuses reachable in one step, regardless of who asks.
    pub fn allowed_targets(self) -> &'static [BookingStatus] {
        TRANSITIONS
            .iter()
            .find(|(from, _)| *from == self)
            .map(|(_, targets)| *targets)
            .unwrap_or(&[])
    }

    pub fn can_transition_to(self, target: BookingStatus) -> bool {
        self.allowed_targets().contains(&target)
    }

    /// Whether any status leads here. `pending` is only ever an initial state.
    pub fn has_incoming_edge(self) -> bool {
        TRANSITIONS.iter().any(|(_, targets)| targets.contains(&self))
    }

    pub fn is_terminal(self) -> bool {
        self.allowed_targets().is_empty()
    }

    /// Shown in the staff view's "active jobs" list.
    pub fn is_active_job(self) -> bool {
        matches!(self, Assigned | InProgress)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Pending => "pending",
            Confirmed => "confirmed",
            Assigned => "assigned",
            InProgress => "in_progress",
            Completed => "completed",
            Cancelled => "cancelled",
        }
    }

    /// Human label, e.g. `in progress`.
    pub fn label(self) -> String {
        self.as_str().replace('_', " ")
    }
}

impl Role {
    /// Targets this role may request from `from`.
    pub fn permitted_targets(self, from: BookingStatus) -> &'static [BookingStatus] {
        GRANTS
            .iter()
            .find(|(role, source, _)| *role == self && *source == from)
            .map(|(_, _, targets)| *targets)
            .unwrap_or(&[])
    }

    pub fn may_request(self, from: BookingStatus, to: BookingStatus) -> bool {
        self.permitted_targets(from).contains(&to)
    }

    /// Whether the role may ever move a booking into `target`, from any status.
    pub fn may_ever_request(self, target: BookingStatus) -> bool {
        GRANTS
            .iter()
            .any(|(role, _, targets)| *role == self && targets.contains(&target))
    }

    /// Only staff and admin drive transitions at all.
    pub fn may_transition(self) -> bool {
        GRANTS.iter().any(|(role, _, _)| *role == self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Staff => "staff",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookingStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Invalid booking status: {}", s))
    }
}

impl TryFrom<i64> for BookingStatus {
    type Error = anyhow::Error;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Pending),
            1 => Ok(Confirmed),
            2 => Ok(Assigned),
            3 => Ok(InProgress),
            4 => Ok(Completed),
            5 => Ok(Cancelled),
            _ => Err(anyhow::anyhow!("Invalid BookingStatus value: {}", value)),
        }
    }
}

impl From<BookingStatus> for i64 {
    fn from(status: BookingStatus) -> Self {
        match status {
            Pending => 0,
            Confirmed => 1,
            Assigned => 2,
            InProgress => 3,
            Completed => 4,
            Cancelled => 5,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Role::Customer),
            "staff" => Ok(Role::Staff),
            "admin" => Ok(Role::Admin),
            _ => Err(anyhow::anyhow!("Invalid role: {}", s)),
        }
    }
}

impl TryFrom<i64> for Role {
    type Error = anyhow::Error;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Role::Customer),
            1 => Ok(Role::Staff),
            2 => Ok(Role::Admin),
            _ => Err(anyhow::anyhow!("Invalid Role value: {}", value)),
        }
    }
}

impl From<Role> for i64 {
    fn from(role: Role) -> Self {
        match role {
            Role::Customer => 0,
            Role::Staff => 1,
            Role::Admin => 2,
        }
    }
}
