//! Sector header format and status transitions.

use crate::error::Error;
use crate::flash::Flash;
use crate::geometry::Geometry;

/// Sector status, encoded so that every legal forward transition only
/// clears bits — safe to re-apply after a crash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Status {
    /// Raw post-erase state.
    Erased,
    /// Erased and stamped with the partition version; available for writing.
    Free,
    /// Contains committed or reserved slots.
    InUse,
    /// Reclamation started; erase may have been interrupted.
    Erasing,
    /// Whole-partition format in progress.
    Formatting,
}

impl Status {
    const ERASED: u32 = 0xFFFF_FFFF;
    const FREE: u32 = 0xFFFF_FF00;
    const IN_USE: u32 = 0xFFFF_0000;
    const ERASING: u32 = 0xFF00_0000;
    const FORMATTING: u32 = 0x0000_0000;

    fn encode(self) -> u32 {
        match self {
            Status::Erased => Self::ERASED,
            Status::Free => Self::FREE,
            Status::InUse => Self::IN_USE,
            Status::Erasing => Self::ERASING,
            Status::Formatting => Self::FORMATTING,
        }
    }

    fn decode(word: u32) -> Option<Status> {
        match word {
            Self::ERASED => Some(Status::Erased),
            Self::FREE => Some(Status::Free),
            Self::IN_USE => Some(Status::InUse),
            Self::ERASING => Some(Status::Erasing),
            Self::FORMATTING => Some(Status::Formatting),
            _ => None,
        }
    }
}

/// Read-then-decode the status word of `sector`.
///
/// Returns `None` for a word that doesn't match any of the five known
/// encodings; the caller treats that as corruption.
pub(crate) fn read_status<F: Flash>(
    flash: &mut F,
    geometry: &Geometry,
    sector: u32,
) -> Result<Option<Status>, Error<F::Error>> {
    let mut buf = [0u8; 4];
    flash
        .read(geometry.sector_addr(sector), &mut buf)
        .map_err(Error::Flash)?;
    Ok(Status::decode(u32::from_le_bytes(buf)))
}

/// Read-then-decode the version word of `sector`.
pub(crate) fn read_version<F: Flash>(
    flash: &mut F,
    geometry: &Geometry,
    sector: u32,
) -> Result<u32, Error<F::Error>> {
    let mut buf = [0u8; 4];
    flash
        .read(geometry.sector_addr(sector) + 4, &mut buf)
        .map_err(Error::Flash)?;
    Ok(u32::from_le_bytes(buf))
}

/// Program a new status word onto `sector`. Safe to call repeatedly with
/// the same `status`: NOR programming only clears bits, so a retried write
/// after a crash mid-program converges to the same result.
pub(crate) fn set_status<F: Flash>(
    flash: &mut F,
    geometry: &Geometry,
    sector: u32,
    status: Status,
) -> Result<(), Error<F::Error>> {
    flash
        .program(geometry.sector_addr(sector), &status.encode().to_le_bytes())
        .map_err(Error::Flash)?;
    Ok(())
}

/// Bring `sector` to the `FREE` state: mark it erasing, physically erase
/// it, stamp the current version, then mark it free.
///
/// A crash at any point in steps 1-3 is safe: a later call to this same
/// function (triggered by `scan` observing `Erased`/`Erasing`) re-runs the
/// whole procedure and converges on `FREE`.
pub(crate) fn free<F: Flash>(
    flash: &mut F,
    geometry: &Geometry,
    sector: u32,
) -> Result<(), Error<F::Error>> {
    set_status(flash, geometry, sector, Status::Erasing)?;
    flash
        .sector_erase(geometry.sector_addr(sector))
        .map_err(Error::Flash)?;
    flash
        .program(geometry.sector_addr(sector) + 4, &geometry.version.to_le_bytes())
        .map_err(Error::Flash)?;
    set_status(flash, geometry, sector, Status::Free)?;
    Ok(())
}
