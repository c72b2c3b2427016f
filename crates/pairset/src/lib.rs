pub mod schema;
pub mod validate;
pub mod source;
pub mod tokenize;
pub mod manifest;

pub use schema::*;
pub use validate::*;
pub use source::*;
pub use tokenize::*;
pub use manifest::*;
