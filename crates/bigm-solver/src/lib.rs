mod simplex;
mod tableau;

pub use simplex::{Simplex, SolveStatus};
pub use tableau::ColumnKind;
