pub mod node_index;

pub use node_index::{DocumentIndex, IndexBuilder, IndexedNode};
