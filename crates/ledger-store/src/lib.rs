pub mod billing;
pub mod errors;
pub mod identity;
pub mod ledger;
pub mod memory;
pub mod prelude;
