//! Typed query predicates over tasks.
//!
//! Instead of ad hoc filter-object merging, read and mutation scopes are
//! expressed as an explicit predicate tree (conjunctions and disjunctions
//! over field constraints). The store evaluates the tree directly; a
//! different persistence engine would translate it to its native query
//! language instead.

use chrono::{DateTime, Utc};

use crate::task::Task;
use crate::user::UserId;
use crate::visibility;
use crate::window::{self, DateWindow, Period};

/// A composable predicate selecting tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Matches when every child matches. Empty conjunction matches all.
    All(Vec<Predicate>),
    /// Matches when at least one child matches.
    Any(Vec<Predicate>),
    /// Matches tasks created by the user.
    Creator(UserId),
    /// Matches tasks with the user among the assignees.
    Assignee(UserId),
    /// Matches tasks shared with the user.
    SharedWith(UserId),
    /// Matches tasks whose due date falls inside the window.
    DueWithin(DateWindow),
    /// Matches tasks without a due date.
    DueUnset,
}

impl Predicate {
    /// Evaluates the predicate against a task.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Self::All(children) => children.iter().all(|p| p.matches(task)),
            Self::Any(children) => children.iter().any(|p| p.matches(task)),
            Self::Creator(user_id) => task.creator == *user_id,
            Self::Assignee(user_id) => task.assignees.contains(user_id),
            Self::SharedWith(user_id) => task.shared_with.contains(user_id),
            Self::DueWithin(dw) => task.due_date.is_some_and(|due| dw.contains(due)),
            Self::DueUnset => task.due_date.is_none(),
        }
    }
}

/// Builds the due-date constraint for a period.
///
/// Tasks without a due date are perpetually due, so the constraint is
/// `due_date in window OR due_date unset`.
#[must_use]
pub fn due_filter(period: Period, reference: DateTime<Utc>) -> Predicate {
    Predicate::Any(vec![
        Predicate::DueWithin(window::window_for(period, reference)),
        Predicate::DueUnset,
    ])
}

/// Builds the read query for one user: visibility, optionally narrowed by
/// a date window. `period` of `None` (absent or unrecognized filter token)
/// leaves the due date unconstrained.
#[must_use]
pub fn visible_tasks(
    user_id: UserId,
    period: Option<Period>,
    reference: DateTime<Utc>,
) -> Predicate {
    match period {
        Some(p) => Predicate::All(vec![
            visibility::visible_to(user_id),
            due_filter(p, reference),
        ]),
        None => visibility::visible_to(user_id),
    }
}

/// Orders tasks newest-first by creation time, task id as tiebreaker.
pub fn sort_newest_first(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}
