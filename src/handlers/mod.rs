// Handler modules
pub mod eval;
pub mod run;
pub mod support;

pub use eval::handle_eval;
pub use run::{RunOptions, handle_run};
pub use support::handle_support;
