pub mod ability;
pub mod authn;
pub mod errors;
pub mod model;
pub mod prelude;
pub mod resolver;
pub mod token;
