pub mod classes;
pub mod credentials;
pub mod observations;
pub mod remarks;
pub mod schema;
pub mod students;
pub mod teachers;

pub use classes::*;
pub use credentials::*;
pub use observations::*;
pub use remarks::*;
pub use schema::*;
pub use students::*;
pub use teachers::*;
