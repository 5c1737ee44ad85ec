//! Staged request pipeline.
//!
//! Every route runs the same ordered loop: context init, schema guard,
//! authentication, permission gate, then the handler. A stage either passes
//! the request on, fails with a typed error, or short-circuits with a
//! finished response. The adapter at the edge is the only place an error is
//! turned into wire bytes.

pub mod adapters;
pub mod context;
pub mod envelope;
pub mod errors;
pub mod prelude;
pub mod schema;
pub mod stages;
