pub mod pipeline;
pub mod router;
pub mod state;
