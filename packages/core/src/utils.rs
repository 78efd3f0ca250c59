// ABOUTME: Shared utility functions for AutoHub
// ABOUTME: Prefixed id generation used by every storage layer

/// Generate a prefixed unique id, e.g. `veh-V1StGXR8_Z5jdHi6B-myT`
pub fn generate_id(prefix: &str) -> String {
    format!("{}-{}", prefix, nanoid::nanoid!())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id() {
        let id1 = generate_id("veh");
        let id2 = generate_id("veh");

        assert!(id1.starts_with("veh-"));
        assert_ne!(id1, id2);
        // nanoid default length is 21
        assert_eq!(id1.len(), "veh-".len() + 21);
    }
}
