//! Error taxonomy for the ring engine.

use core::fmt;

/// Everything that can go wrong while driving a [`crate::RingFs`].
///
/// Variants mirror the error taxonomy of the on-flash state machine: a
/// [`Error::Flash`] failure is whatever the injected [`crate::Flash`]
/// capability reported, the rest are consistency failures detected by the
/// engine itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The flash capability returned a failure from `sector_erase`,
    /// `program`, or `read`.
    Flash(E),
    /// A sector header carries a status word that is neither `FREE` nor
    /// `IN_USE` after half-erased sectors have been repaired.
    Corruption {
        /// Index of the offending sector.
        sector: u32,
    },
    /// A sector's `version` word does not match the instance's configured
    /// version.
    VersionMismatch {
        /// Index of the offending sector.
        sector: u32,
        /// Version word actually found on flash.
        found: u32,
    },
    /// A sector is still in the `FORMATTING` state: a prior [`crate::RingFs::format`]
    /// was interrupted and the partition cannot be recovered by `scan`.
    PartialFormat {
        /// Index of the offending sector.
        sector: u32,
    },
    /// No sector on the partition carries `FREE` status; invariant 1 is
    /// violated.
    NoFreeSector,
    /// `append`/`fetch` was called with a buffer whose length does not equal
    /// the configured `object_size`.
    ObjectSizeMismatch {
        /// Configured object size.
        expected: u32,
        /// Actual buffer length supplied by the caller.
        actual: u32,
    },
    /// The configured geometry leaves no room for even one slot per sector.
    GeometryTooSmall,
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Flash(e) => write!(f, "flash capability failure: {e:?}"),
            Error::Corruption { sector } => write!(f, "corrupted sector {sector}"),
            Error::VersionMismatch { sector, found } => write!(
                f,
                "incompatible version 0x{found:08x} on sector {sector}"
            ),
            Error::PartialFormat { sector } => {
                write!(f, "partially formatted partition at sector {sector}")
            }
            Error::NoFreeSector => write!(f, "invariant violated: no FREE sector found"),
            Error::ObjectSizeMismatch { expected, actual } => write!(
                f,
                "object buffer length {actual} does not match configured object_size {expected}"
            ),
            Error::GeometryTooSmall => {
                write!(f, "sector_size too small to hold even one slot")
            }
        }
    }
}
