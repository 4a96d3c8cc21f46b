//! Property-based tests for the visibility rule, checklist toggling, and
//! date windows.
//!
//! Uses proptest to verify:
//! 1. A task is visible to a user exactly when the user is its creator,
//!    an assignee, or a shared-with member.
//! 2. Toggling a checklist item twice restores its completion state.
//! 3. The `today` window always contains its reference instant and never
//!    an instant 24h past the reference's midnight.
//! 4. Sharing is idempotent under set union; unsharing a non-member is a
//!    no-op.

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use taskhub_core::task::{ChecklistItem, Priority, Status, Task, TaskId};
use taskhub_core::user::UserId;
use taskhub_core::visibility;
use taskhub_core::window::{self, Period};
use uuid::Uuid;

/// Strategy for generating arbitrary `UserId` values.
fn arb_user_id() -> impl Strategy<Value = UserId> {
    any::<u128>().prop_map(|n| UserId::from_uuid(Uuid::from_u128(n)))
}

/// Strategy for generating small user-id sets.
fn arb_user_ids(max: usize) -> impl Strategy<Value = Vec<UserId>> {
    prop::collection::hash_set(any::<u128>(), 0..max)
        .prop_map(|set| set.into_iter().map(|n| UserId::from_uuid(Uuid::from_u128(n))).collect())
}

/// Strategy for generating arbitrary checklists.
fn arb_checklist() -> impl Strategy<Value = Vec<ChecklistItem>> {
    prop::collection::vec(("[a-z ]{1,32}", any::<bool>()), 0..8).prop_map(|entries| {
        entries
            .into_iter()
            .map(|(text, is_completed)| {
                let mut item = ChecklistItem::new(text);
                item.is_completed = is_completed;
                item
            })
            .collect()
    })
}

/// Strategy for a task with arbitrary membership and checklist.
fn arb_task() -> impl Strategy<Value = Task> {
    (arb_user_id(), arb_user_ids(4), arb_user_ids(4), arb_checklist()).prop_map(
        |(creator, assignees, shared_with, checklist)| {
            let now = Utc::now();
            Task {
                id: TaskId::new(),
                title: "Task".to_string(),
                priority: Priority::Moderate,
                status: Status::default(),
                due_date: None,
                checklist,
                assignees,
                creator,
                shared_with,
                collapsed: false,
                created_at: now,
                updated_at: now,
            }
        },
    )
}

/// Strategy for UTC instants between 1970 and ~2200.
fn arb_instant() -> impl Strategy<Value = chrono::DateTime<Utc>> {
    (0i64..7_258_118_400).prop_map(|secs| {
        Utc.timestamp_opt(secs, 0)
            .single()
            .unwrap_or_else(Utc::now)
    })
}

proptest! {
    /// Visibility holds exactly for creator, assignees, and shared-with.
    #[test]
    fn visibility_iff_membership(task in arb_task(), candidate in arb_user_id()) {
        let member = candidate == task.creator
            || task.assignees.contains(&candidate)
            || task.shared_with.contains(&candidate);
        prop_assert_eq!(visibility::visible_to(candidate).matches(&task), member);
    }

    /// The creator is always visible; ownership implies visibility.
    #[test]
    fn creator_is_always_visible(task in arb_task()) {
        prop_assert!(visibility::visible_to(task.creator).matches(&task));
        prop_assert!(visibility::owned_by(task.creator).matches(&task));
    }

    /// Toggling any checklist item twice restores the original task.
    #[test]
    fn double_toggle_is_identity(task in arb_task(), index in any::<prop::sample::Index>()) {
        prop_assume!(!task.checklist.is_empty());
        let item_id = task.checklist[index.index(task.checklist.len())].id;

        let mut toggled = task.clone();
        toggled.toggle_item(item_id).unwrap();
        toggled.toggle_item(item_id).unwrap();
        prop_assert_eq!(toggled.checklist, task.checklist);
    }

    /// A single toggle flips exactly the targeted item.
    #[test]
    fn single_toggle_flips_only_target(task in arb_task(), index in any::<prop::sample::Index>()) {
        prop_assume!(!task.checklist.is_empty());
        let target = index.index(task.checklist.len());
        let item_id = task.checklist[target].id;

        let mut toggled = task.clone();
        toggled.toggle_item(item_id).unwrap();

        for (i, (before, after)) in task.checklist.iter().zip(&toggled.checklist).enumerate() {
            if i == target {
                prop_assert_ne!(before.is_completed, after.is_completed);
            } else {
                prop_assert_eq!(before.is_completed, after.is_completed);
            }
        }
    }

    /// The today window contains its reference and excludes midnight + 24h.
    #[test]
    fn today_window_brackets_reference(reference in arb_instant()) {
        let window = window::window_for(Period::Today, reference);
        prop_assert!(window.contains(reference));
        prop_assert!(!window.contains(window.start + Duration::days(1)));
        prop_assert!(!window.contains(window.start - Duration::seconds(1)));
    }

    /// Every window contains its reference instant.
    #[test]
    fn all_windows_contain_reference(reference in arb_instant()) {
        for period in [Period::Today, Period::Week, Period::Month] {
            prop_assert!(window::window_for(period, reference).contains(reference));
        }
    }

    /// Sharing the same users twice equals sharing them once.
    #[test]
    fn share_union_is_idempotent(task in arb_task(), grant in arb_user_ids(4)) {
        let mut once = task.clone();
        once.share_with(&grant);

        let mut twice = task.clone();
        twice.share_with(&grant);
        twice.share_with(&grant);

        prop_assert_eq!(&once.shared_with, &twice.shared_with);

        // No duplicates ever appear.
        for (i, id) in once.shared_with.iter().enumerate() {
            prop_assert!(!once.shared_with[i + 1..].contains(id));
        }
    }

    /// Unsharing a user who is not a member changes nothing.
    #[test]
    fn unshare_non_member_is_noop(task in arb_task(), outsider in arb_user_id()) {
        prop_assume!(!task.shared_with.contains(&outsider));
        let mut after = task.clone();
        after.unshare(outsider);
        prop_assert_eq!(after.shared_with, task.shared_with);
    }
}
