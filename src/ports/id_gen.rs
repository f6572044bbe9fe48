//! ID generator port for producing unique run identifiers.

/// Generates unique identifiers.
///
/// Device-cloud runs carry a fresh `RUN_ID`; abstracting generation keeps
/// command construction deterministic under test.
pub trait IdGenerator: Send + Sync {
    /// Generates a new unique identifier string.
    fn generate_id(&self) -> String;
}
