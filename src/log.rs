//! Thin wrappers so the engine can log through `defmt` without pulling it in
//! unconditionally — the rest of the crate never checks `cfg(feature =
//! "defmt")` directly.

macro_rules! log_trace {
    ($($arg:tt)*) => {
        #[cfg(feature = "defmt")]
        defmt::trace!($($arg)*);
    };
}

macro_rules! log_warn {
    ($($arg:tt)*) => {
        #[cfg(feature = "defmt")]
        defmt::warn!($($arg)*);
    };
}

macro_rules! log_error {
    ($($arg:tt)*) => {
        #[cfg(feature = "defmt")]
        defmt::error!($($arg)*);
    };
}

pub(crate) use log_error;
pub(crate) use log_trace;
pub(crate) use log_warn;
