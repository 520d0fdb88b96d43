//! Bundle access: paths, merging, tagged record arrays and the positional
//! address layout
//!
//! The bundle is the nested registration record exchanged with the backend.
//! Nothing here keeps state between calls; every function works on values it is
//! handed.

pub mod address;
pub mod merge;
pub mod path;
pub mod tagged;

pub use address::{find_address, upsert_address, Address, AddressComponent, AddressLine};
pub use merge::{deep_merge, is_present, merged};
pub use path::{BundlePath, PathSegment};
pub use tagged::{find_tagged, upsert_tagged};
