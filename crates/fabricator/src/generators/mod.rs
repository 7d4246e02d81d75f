//! Standalone primitive value generators.
//!
//! These are the building blocks the fabricator draws defaults from, and
//! they are exposed directly for override functions and test authors. Every
//! generator is generic over `rand::Rng + ?Sized`, so callers can pass a
//! seeded `StdRng` (or any mock RNG) for deterministic output.

pub mod numeric;
pub mod strings;
pub mod temporal;
pub mod uuid;

pub use self::numeric::{decimal_with_precision, float_in_range, int_in_range};
pub use self::strings::{coin_toss, random_alphanumeric, random_alphanumeric_bounded};
pub use self::temporal::{date_in_window, datetime_between, datetime_in_window};
pub use self::uuid::random_uuid;
