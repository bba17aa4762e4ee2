pub mod clock;
pub mod elapsed;
pub mod format;
pub mod schedule;

pub use clock::{Clock, RuntimeClock, SystemClock};
pub use elapsed::{DEFAULT_TICK, ElapsedReading, ElapsedTimer, TimerHandle};
pub use format::{elapsed_ms, format_elapsed};
pub use schedule::PeriodicTask;
