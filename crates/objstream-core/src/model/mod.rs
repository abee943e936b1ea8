pub mod change_set;
pub mod path;
pub mod schema;

pub use change_set::ChangeSet;
pub use path::FieldPath;
pub use schema::{ScalarKind, SchemaDescriptor};

/// The current, possibly partial, value of the streamed object.
///
/// Absence (nothing received yet) is modelled as `Option<Snapshot>::None`;
/// a JSON `null` is a present value.
pub type Snapshot = serde_json::Value;
