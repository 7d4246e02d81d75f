//! String value generators.

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Generate a random alphanumeric string of exactly `length` characters.
pub fn random_alphanumeric<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    (0..length).map(|_| rng.sample(Alphanumeric) as char).collect()
}

/// Generate a random alphanumeric string whose length is uniform in
/// `[1, max_length]`.
pub fn random_alphanumeric_bounded<R: Rng + ?Sized>(rng: &mut R, max_length: usize) -> String {
    let length = rng.gen_range(1..=max_length.max(1));
    random_alphanumeric(rng, length)
}

/// Pick uniformly between exactly two supplied outcomes.
pub fn coin_toss<R: Rng + ?Sized, T>(rng: &mut R, heads: T, tails: T) -> T {
    if rng.gen() {
        heads
    } else {
        tails
    }
}
