//! Domain model for `TaskHub`: task entities, the visibility rules that
//! decide which users may see or mutate a task, date-window filtering,
//! and the typed query predicates the server translates into store reads.

pub mod error;
pub mod query;
pub mod task;
pub mod user;
pub mod visibility;
pub mod window;
