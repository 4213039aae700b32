//! Slot header format and the three-phase commit protocol.

use crate::error::Error;
use crate::flash::Flash;
use crate::geometry::Geometry;
use crate::loc::Location;

/// Slot status, same monotonic `1->0` encoding discipline as [`crate::sector::Status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Status {
    /// Unused.
    Erased,
    /// Write started, payload may be partial.
    Reserved,
    /// Payload fully committed.
    Valid,
    /// Logically consumed, storage not yet reclaimed.
    Garbage,
}

impl Status {
    const ERASED: u32 = 0xFFFF_FFFF;
    const RESERVED: u32 = 0xFFFF_FF00;
    const VALID: u32 = 0xFFFF_0000;
    const GARBAGE: u32 = 0xFF00_0000;

    fn encode(self) -> u32 {
        match self {
            Status::Erased => Self::ERASED,
            Status::Reserved => Self::RESERVED,
            Status::Valid => Self::VALID,
            Status::Garbage => Self::GARBAGE,
        }
    }

    fn decode(word: u32) -> Option<Status> {
        match word {
            Self::ERASED => Some(Status::Erased),
            Self::RESERVED => Some(Status::Reserved),
            Self::VALID => Some(Status::Valid),
            Self::GARBAGE => Some(Status::Garbage),
            _ => None,
        }
    }
}

/// Read-then-decode the status word at `loc`. Unlike sector status, an
/// unrecognized slot word is not itself fatal here — callers treat it the
/// same as `Garbage`/non-`Erased` for the purposes of skipping past it,
/// since only sector-level corruption is defined as fatal by spec.
pub(crate) fn read_status<F: Flash>(
    flash: &mut F,
    geometry: &Geometry,
    loc: Location,
) -> Result<Option<Status>, Error<F::Error>> {
    let mut buf = [0u8; 4];
    flash
        .read(geometry.slot_addr(loc), &mut buf)
        .map_err(Error::Flash)?;
    Ok(Status::decode(u32::from_le_bytes(buf)))
}

fn set_status<F: Flash>(
    flash: &mut F,
    geometry: &Geometry,
    loc: Location,
    status: Status,
) -> Result<(), Error<F::Error>> {
    flash
        .program(geometry.slot_addr(loc), &status.encode().to_le_bytes())
        .map_err(Error::Flash)?;
    Ok(())
}

/// Three-phase commit: reserve, write payload, commit. A crash between
/// steps leaves the slot `Reserved`, which `scan`/`fetch` treat as
/// logically dead but not erased.
pub(crate) fn write<F: Flash>(
    flash: &mut F,
    geometry: &Geometry,
    loc: Location,
    object: &[u8],
) -> Result<(), Error<F::Error>> {
    set_status(flash, geometry, loc, Status::Reserved)?;
    flash
        .program(geometry.payload_addr(loc), object)
        .map_err(Error::Flash)?;
    set_status(flash, geometry, loc, Status::Valid)?;
    Ok(())
}

/// Mark the slot at `loc` as logically consumed. The payload is not
/// re-read afterwards.
pub(crate) fn discard<F: Flash>(
    flash: &mut F,
    geometry: &Geometry,
    loc: Location,
) -> Result<(), Error<F::Error>> {
    set_status(flash, geometry, loc, Status::Garbage)
}

pub(crate) fn read_payload<F: Flash>(
    flash: &mut F,
    geometry: &Geometry,
    loc: Location,
    object: &mut [u8],
) -> Result<(), Error<F::Error>> {
    flash
        .read(geometry.payload_addr(loc), object)
        .map_err(Error::Flash)?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn status_roundtrips_through_known_encodings() {
        for status in [
            Status::Erased,
            Status::Reserved,
            Status::Valid,
            Status::Garbage,
        ] {
            assert_eq!(Status::decode(status.encode()), Some(status));
        }
    }
}
