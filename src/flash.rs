//! The flash capability contract.
//!
//! This engine never talks to hardware directly. It is generic over a
//! [`Flash`] implementation supplied by the caller, the same way the
//! `embedded-storage` crate family expresses a NOR-flash contract as a
//! trait rather than a concrete driver.

/// Geometry and raw I/O operations a NOR-flash-like device must provide.
///
/// All addresses passed to [`Flash::sector_erase`], [`Flash::program`], and
/// [`Flash::read`] are byte offsets relative to the start of the
/// *underlying device*, not the partition — the engine adds
/// `sector_offset * sector_size` itself before calling out.
///
/// Implementations must treat `program` as NOR-style: it may only clear
/// bits that are currently set, and programming the same bytes to the same
/// address twice must be a no-op rather than an error. The engine relies on
/// this to safely re-apply status-word writes during crash recovery.
pub trait Flash {
    /// Error type returned by a failed erase/program/read.
    type Error: core::fmt::Debug;

    /// Size of one erase unit, in bytes.
    fn sector_size(&self) -> u32;
    /// Number of sectors of the underlying device that precede the partition.
    fn sector_offset(&self) -> u32;
    /// Number of sectors in the partition.
    fn sector_count(&self) -> u32;

    /// Erase the sector containing `addr`.
    fn sector_erase(&mut self, addr: u32) -> Result<(), Self::Error>;
    /// AND `data` into the bytes starting at `addr`. Returns the number of
    /// bytes programmed, which must equal `data.len()` on success.
    fn program(&mut self, addr: u32, data: &[u8]) -> Result<usize, Self::Error>;
    /// Fill `buf` with bytes starting at `addr`. Returns the number of bytes
    /// read, which must equal `buf.len()` on success.
    fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<usize, Self::Error>;
}
