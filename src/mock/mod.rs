mod clock;
mod display;
mod source;

pub use clock::{FixedClock, SystemClock};
pub use display::{RecordingDisplay, TerminalDisplay};
pub use source::{FixtureSource, SyntheticSource};
