//! The task visibility rule.
//!
//! A task is visible to a user iff the user is its creator, one of its
//! assignees, or among the users it was shared with. Every read and every
//! visibility-scoped mutation is filtered through this predicate, so an
//! unauthorized caller observes "not found" rather than "forbidden".

use crate::query::Predicate;
use crate::user::UserId;

/// Builds the visibility predicate for a user.
///
/// Pure function of the user id; the id is assumed to have been
/// authenticated upstream.
#[must_use]
pub fn visible_to(user_id: UserId) -> Predicate {
    Predicate::Any(vec![
        Predicate::Creator(user_id),
        Predicate::Assignee(user_id),
        Predicate::SharedWith(user_id),
    ])
}

/// Builds the ownership predicate for creator-only operations
/// (sharing grants and revokes).
#[must_use]
pub fn owned_by(user_id: UserId) -> Predicate {
    Predicate::Creator(user_id)
}
