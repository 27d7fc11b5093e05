pub mod errors;
pub mod latency;
pub mod shutdown;
pub mod time;

pub use errors::*;
pub use latency::{Operation, SimulatedLatency};
pub use shutdown::ShutdownSignal;
pub use time::{Clock, FixedClock, SharedClock, SystemClock};
