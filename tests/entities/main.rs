//! Entity store integration tests.

mod changes;
mod concurrency;
mod ordering;
mod persistence;
mod typed;
