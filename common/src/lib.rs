pub mod tracer;

/// Floating point type used for all times, voltages and charges.
pub type Real = f64;

/// Identifies a channel by the name of its dataset in a persisted batch, e.g. `channel1`.
pub type ChannelName = String;

/// Externally supplied identifier of an acquisition run.
pub type RunNumber = u32;

/// Load impedance of the digitiser input, in ohms.
pub const LOAD_IMPEDANCE_OHMS: Real = 50.0;

/// Number of nanoseconds in a second.
pub const NANOSECONDS_PER_SECOND: Real = 1e9;
