pub mod rng;
pub mod time;

pub use rng::Dice;
pub use time::{DebounceTimer, RepeatingTimer};
