//! Shared primitive type aliases for the domain model.

/// Opaque server-assigned node identifier (uuid v4, simple hex form).
///
/// Shared by entities, concepts, and relationships; unique within a project.
pub type NodeId = String;

/// Project identifier (uuid v4, simple hex form).
pub type ProjectId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Generate a fresh [`NodeId`].
pub fn new_node_id() -> NodeId {
    uuid::Uuid::new_v4().simple().to_string()
}
