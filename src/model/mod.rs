//! # Raw Property Graph Model
//!
//! DTOs exactly as the remote store hands them over: nodes, relationships,
//! paths and the path segments a traversal yields.
//!
//! Design rule: nothing here knows about node kinds, display labels or the
//! local graph. This module is pure data with no I/O and no async.

pub mod node;
pub mod relationship;
pub mod path;
pub mod value;
pub mod property_map;

pub use node::{Node, NodeId, BUSINESS_ID_KEY};
pub use relationship::{Relationship, RelId, Direction};
pub use path::{Path, PathSegment};
pub use value::Value;
pub use property_map::{PropertyMap, from_json_object, from_pairs};
