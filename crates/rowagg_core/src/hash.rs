use ahash::RandomState;

/// State used for all hashing of group keys.
///
/// Fixed seeds keep hash table iteration reproducible across runs.
pub const HASH_RANDOM_STATE: RandomState = RandomState::with_seeds(0, 0, 0, 0);
