pub mod id;
pub mod prelude;
pub mod records;
pub mod subject;
pub mod validate;
