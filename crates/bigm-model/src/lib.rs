pub mod format;
pub mod program;

pub use format::{parse, write, ParseError};
pub use program::{LinearProgram, ModelError, Relation, Side};
