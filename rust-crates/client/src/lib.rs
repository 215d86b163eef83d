//! The mutation/query synchronization layer of the Tamagosui client: a keyed
//! cache of ledger read-views with explicit invalidation, one wrapper per
//! contract action running submit → confirm → invalidate, a reversible
//! optimistic update for listing cancellation, and the local sleep-time stat
//! simulation.

pub mod actions;

pub mod cache;

pub mod error;

pub mod optimistic;

pub mod queries;

pub mod rules;

pub mod sleep;
