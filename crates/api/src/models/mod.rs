pub mod location;
pub mod symbol;
pub mod syntax;

pub use location::*;
pub use symbol::*;
pub use syntax::*;
