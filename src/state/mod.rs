// Pure domain state shared by the contract modules. Everything here is
// env-free: timestamps come in as arguments and token transfers stay with
// the callers, so the state machines can be unit tested directly.

pub mod position;
pub mod sale;

pub use position::*;
pub use sale::*;
