mod ledger;
mod sync;

pub use ledger::*;
pub use sync::*;
