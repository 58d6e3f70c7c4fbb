pub mod amount;
pub mod common;

pub use amount::{mul_div, share_bps};
pub use common::{TryAdd, TryDiv, TryMul, TrySub};
pub use common::{BPS_DENOMINATOR, MILLIS_PER_DAY, MILLIS_PER_SECOND, SCALE, WAD};
