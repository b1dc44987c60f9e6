//! UUID utilities

use uuid::Uuid;

/// Generate a new UUIDv4
pub fn generate() -> Uuid {
    Uuid::new_v4()
}

/// Generate a snapshot identifier (hyphenated UUIDv4 string)
pub fn generate_snapshot_id() -> String {
    generate().hyphenated().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_snapshot_id_is_parseable_v4() {
        let id = generate_snapshot_id();
        let parsed = Uuid::parse_str(&id).expect("snapshot id should be a UUID");
        assert_eq!(parsed.get_version_num(), 4);
    }

    #[test]
    fn test_snapshot_ids_do_not_collide() {
        let ids: HashSet<String> = (0..1000).map(|_| generate_snapshot_id()).collect();
        assert_eq!(ids.len(), 1000);
    }
}
