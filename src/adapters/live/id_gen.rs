//! UUID-backed adapter for the `IdGenerator` port.

use uuid::Uuid;

use crate::ports::IdGenerator;

/// Produces random v4 UUIDs for `RUN_ID`.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_hyphenated_uuids_and_unique() {
        let first = UuidGenerator.generate_id();
        let second = UuidGenerator.generate_id();

        assert_ne!(first, second);
        assert_eq!(first.len(), 36);
        assert!(Uuid::parse_str(&first).is_ok());
    }
}
