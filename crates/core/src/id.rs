//! Random identifier generation.

use rand::Rng;
use rand::distributions::Alphanumeric;

/// Source of fresh identifiers for items and templates.
///
/// Generated ids only need to be unique within their scope; the storage layer
/// checks for collisions and asks again.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Generates [`crate::ID_LENGTH`]-character ids from `[A-Za-z0-9]`.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn generate(&self) -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(crate::ID_LENGTH)
            .map(char::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_id_shape() {
        let id = RandomIdGenerator.generate();
        assert_eq!(id.len(), crate::ID_LENGTH);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_random_ids_differ() {
        let ids: std::collections::HashSet<_> =
            (0..64).map(|_| RandomIdGenerator.generate()).collect();
        assert_eq!(ids.len(), 64);
    }
}
