pub mod form;
pub mod observations;
pub mod remarks;
pub mod status;
pub mod students;
pub mod teachers;

pub use observations::*;
pub use remarks::*;
pub use status::*;
pub use students::*;
pub use teachers::*;
