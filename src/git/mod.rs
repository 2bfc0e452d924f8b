//! Git integration layer.
//!
//! This module wraps the actual backend implementation (`git2_backend`)
//! and re-exports the operations publishing and cloning are built from.
//! Other modules should use these instead of depending directly on `git2_backend`.

mod git2_backend;

pub use git2_backend::{
    checkout_branch, clone_into, commit, ensure_remote, open_or_init, push_branch, stage_all,
};
