pub mod basic;
pub mod guard;

pub use basic::*;
pub use guard::*;
