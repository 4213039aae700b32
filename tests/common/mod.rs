//! A byte-vector-backed NOR flash for host-side testing, grounded in the
//! original `flashsim.c` companion used to test the C `ringfs` this crate's
//! spec distills.

use ringfs::Flash;

/// In-memory NOR flash: a flat `Vec<u8>` with sector-aligned erase and AND
/// (NOR-style) programming semantics.
pub struct MockFlash {
    data: Vec<u8>,
    sector_size: u32,
    sector_offset: u32,
    sector_count: u32,
}

impl MockFlash {
    /// Build a flash of `sector_count` sectors of `sector_size` bytes each,
    /// fully erased (all `0xFF`), preceded by `sector_offset` sectors that
    /// belong to some other partition.
    pub fn new(sector_size: u32, sector_offset: u32, sector_count: u32) -> Self {
        let total = (sector_offset + sector_count) * sector_size;
        MockFlash {
            data: vec![0xFF; total as usize],
            sector_size,
            sector_offset,
            sector_count,
        }
    }

    /// Raw backing bytes, for crash-truncation testing: bytes beyond a
    /// chosen offset are reset to the post-erase value to simulate a write
    /// that never reached the device.
    pub fn truncate_from(&mut self, addr: u32) {
        for byte in &mut self.data[addr as usize..] {
            *byte = 0xFF;
        }
    }

    /// Total length of the backing store, for driving truncation sweeps.
    pub fn len(&self) -> u32 {
        self.data.len() as u32
    }
}

impl Flash for MockFlash {
    type Error = core::convert::Infallible;

    fn sector_size(&self) -> u32 {
        self.sector_size
    }

    fn sector_offset(&self) -> u32 {
        self.sector_offset
    }

    fn sector_count(&self) -> u32 {
        self.sector_count
    }

    fn sector_erase(&mut self, addr: u32) -> Result<(), Self::Error> {
        let start = (addr - addr % self.sector_size) as usize;
        let end = start + self.sector_size as usize;
        for byte in &mut self.data[start..end] {
            *byte = 0xFF;
        }
        Ok(())
    }

    fn program(&mut self, addr: u32, bytes: &[u8]) -> Result<usize, Self::Error> {
        let start = addr as usize;
        for (existing, new) in self.data[start..start + bytes.len()].iter_mut().zip(bytes) {
            *existing &= new;
        }
        Ok(bytes.len())
    }

    fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let start = addr as usize;
        buf.copy_from_slice(&self.data[start..start + buf.len()]);
        Ok(buf.len())
    }
}
