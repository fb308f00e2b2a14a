//! Address Lookup Table account state and program instructions

pub mod instruction;
pub mod state;

pub use instruction::{LookupTableInstruction, LookupTableProgram};
pub use state::{KeyedLookupTable, LookupTableState, UiLookupTable};
