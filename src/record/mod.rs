//! Recording, one module per metric kind.
//!
//! Each kind is an `impl TrapMetrics` block. All of them go through
//! `Store::update`, so the combine rule of a kind runs under the store lock
//! and a sample is either fully applied or not at all.

mod counter;
mod gauge;
mod histogram;
mod text;

pub use self::text::sanitize;
