//! The ring engine: `format`, `scan`, `append`, `fetch`, `discard`, `rewind`,
//! and counting, tying the sector and slot layers together into the
//! crash-consistent `(read, write, cursor)` state machine.

use crate::error::Error;
use crate::flash::Flash;
use crate::geometry::Geometry;
use crate::loc::Location;
use crate::log::{log_error, log_trace, log_warn};
use crate::sector;
use crate::slot;

/// A ring-buffer instance bound to one flash partition.
///
/// Construct with [`RingFs::new`], then either [`RingFs::format`] a fresh
/// partition or [`RingFs::scan`] an existing one before calling `append`,
/// `fetch`, `discard`, or `rewind`.
pub struct RingFs<F: Flash> {
    flash: F,
    geometry: Geometry,
    read: Location,
    write: Location,
    cursor: Location,
}

impl<F: Flash> RingFs<F> {
    /// Bind `flash`'s geometry (read via [`Flash::sector_size`] etc.) to a
    /// new instance. Performs no I/O; the instance is not usable until
    /// [`RingFs::format`] or [`RingFs::scan`] is called.
    pub fn new(flash: F, version: u32, object_size: u32) -> Result<Self, Error<F::Error>> {
        let geometry = Geometry::new(
            flash.sector_size(),
            flash.sector_offset(),
            flash.sector_count(),
            version,
            object_size,
        )?;
        Ok(RingFs {
            flash,
            geometry,
            read: Location::ORIGIN,
            write: Location::ORIGIN,
            cursor: Location::ORIGIN,
        })
    }

    /// Number of slots available to a stored object.
    pub fn object_size(&self) -> u32 {
        self.geometry.object_size
    }

    /// Reclaim ownership of the underlying flash capability, discarding the
    /// cached geometry and location state. Useful for re-binding a fresh
    /// instance to the same backing store, e.g. across a simulated reset.
    pub fn into_flash(self) -> F {
        self.flash
    }

    /// Bring the whole partition to a known empty state. Destroys any
    /// existing data.
    ///
    /// Every sector is first marked `FORMATTING` so that a crash partway
    /// through is unambiguously detectable by a later [`RingFs::scan`],
    /// then every sector is freed (erased, stamped, marked `FREE`).
    pub fn format(&mut self) -> Result<(), Error<F::Error>> {
        for sector in 0..self.geometry.sector_count {
            sector::set_status(&mut self.flash, &self.geometry, sector, sector::Status::Formatting)?;
        }
        for sector in 0..self.geometry.sector_count {
            sector::free(&mut self.flash, &self.geometry, sector)?;
        }

        self.read = Location::ORIGIN;
        self.write = Location::ORIGIN;
        self.cursor = Location::ORIGIN;

        Ok(())
    }

    /// Reconstruct `(read, write, cursor)` from on-disk state alone, after
    /// an arbitrary crash or on first mount of an existing partition.
    pub fn scan(&mut self) -> Result<(), Error<F::Error>> {
        let sector_count = self.geometry.sector_count;

        let mut previous_status = Some(sector::Status::Free);
        let mut read_sector = 0;
        let mut write_sector = sector_count - 1;
        let mut free_seen = false;
        // Tracks whether any `IN_USE` sector was observed. The original C
        // source never sets this, which forces `write_sector` back to 0
        // unconditionally at the end of every scan; see SPEC_FULL.md §4.6
        // for why that's a bug this implementation fixes rather than ports.
        let mut used_seen = false;

        for sector in 0..sector_count {
            let mut status = sector::read_status(&mut self.flash, &self.geometry, sector)?;

            if status == Some(sector::Status::Formatting) {
                log_error!("ringfs: partially formatted partition at sector {}", sector);
                return Err(Error::PartialFormat { sector });
            }

            if status == Some(sector::Status::Erased) || status == Some(sector::Status::Erasing) {
                log_trace!("ringfs: repairing half-erased sector {}", sector);
                sector::free(&mut self.flash, &self.geometry, sector)?;
                status = Some(sector::Status::Free);
            }

            if status != Some(sector::Status::Free) && status != Some(sector::Status::InUse) {
                log_error!("ringfs: corrupted sector {}", sector);
                return Err(Error::Corruption { sector });
            }

            let version = sector::read_version(&mut self.flash, &self.geometry, sector)?;
            if version != self.geometry.version {
                log_error!("ringfs: incompatible version on sector {}", sector);
                return Err(Error::VersionMismatch {
                    sector,
                    found: version,
                });
            }

            if status == Some(sector::Status::Free) {
                free_seen = true;
            }
            if status == Some(sector::Status::InUse) {
                used_seen = true;
                if previous_status == Some(sector::Status::Free) {
                    read_sector = sector;
                }
            }
            if status == Some(sector::Status::Free) && previous_status == Some(sector::Status::InUse) {
                write_sector = sector - 1;
            }

            previous_status = status;
        }

        if !free_seen {
            log_error!("ringfs: invariant violated, no FREE sector found");
            return Err(Error::NoFreeSector);
        }

        if !used_seen {
            write_sector = 0;
        }

        // Scan the write sector and skip all occupied slots at the start.
        let mut write = Location {
            sector: write_sector,
            slot: 0,
        };
        while write.sector == write_sector {
            let status = slot::read_status(&mut self.flash, &self.geometry, write)?;
            if status == Some(slot::Status::Erased) {
                break;
            }
            write.advance_slot(&self.geometry);
        }

        // Position the read head at the start of the first IN_USE sector,
        // then skip garbage/reserved/valid slots until something erased is
        // found or the write head is reached.
        let mut read = Location {
            sector: read_sector,
            slot: 0,
        };
        while read != write {
            let status = slot::read_status(&mut self.flash, &self.geometry, read)?;
            if status == Some(slot::Status::Erased) {
                break;
            }
            read.advance_slot(&self.geometry);
        }

        self.write = write;
        self.read = read;
        self.cursor = read;

        Ok(())
    }

    /// Append `object` (exactly [`RingFs::object_size`] bytes) to the ring.
    /// Reclaims the oldest sector if the one ahead of the write head is not
    /// already `FREE`.
    pub fn append(&mut self, object: &[u8]) -> Result<(), Error<F::Error>> {
        self.check_object_len(object.len())?;

        let next_sector = (self.write.sector + 1) % self.geometry.sector_count;
        let next_status = sector::read_status(&mut self.flash, &self.geometry, next_sector)?;
        if next_status != Some(sector::Status::Free) {
            log_warn!("ringfs: reclaiming sector {}", next_sector);

            if self.read.sector == next_sector {
                self.read.advance_sector(&self.geometry);
            }
            if self.cursor.sector == next_sector {
                self.cursor.advance_sector(&self.geometry);
            }

            sector::free(&mut self.flash, &self.geometry, next_sector)?;
        }

        let write_status = sector::read_status(&mut self.flash, &self.geometry, self.write.sector)?;
        match write_status {
            Some(sector::Status::Free) => {
                sector::set_status(&mut self.flash, &self.geometry, self.write.sector, sector::Status::InUse)?;
            }
            Some(sector::Status::InUse) => {}
            _ => {
                log_error!("ringfs: corrupted filesystem at sector {}", self.write.sector);
                return Err(Error::Corruption {
                    sector: self.write.sector,
                });
            }
        }

        slot::write(&mut self.flash, &self.geometry, self.write, object)?;
        self.write.advance_slot(&self.geometry);

        Ok(())
    }

    /// Fetch the next not-yet-delivered record, oldest first. Returns
    /// `Ok(false)` without touching `object` if there is nothing left
    /// between the cursor and the write head — this is spec's "empty"
    /// outcome, not an error. Never mutates flash.
    pub fn fetch(&mut self, object: &mut [u8]) -> Result<bool, Error<F::Error>> {
        self.check_object_len(object.len())?;

        while self.cursor != self.write {
            let status = slot::read_status(&mut self.flash, &self.geometry, self.cursor)?;
            if status == Some(slot::Status::Valid) {
                slot::read_payload(&mut self.flash, &self.geometry, self.cursor, object)?;
                self.cursor.advance_slot(&self.geometry);
                return Ok(true);
            }
            self.cursor.advance_slot(&self.geometry);
        }

        Ok(false)
    }

    /// Mark every slot in `[read, cursor)` as `GARBAGE` and move `read` up
    /// to `cursor`. A no-op when `read == cursor`.
    pub fn discard(&mut self) -> Result<(), Error<F::Error>> {
        while self.read != self.cursor {
            slot::discard(&mut self.flash, &self.geometry, self.read)?;
            self.read.advance_slot(&self.geometry);
        }
        Ok(())
    }

    /// Reset the read cursor back to `read`, making every fetched-but-not-
    /// discarded record re-deliverable. Pure location reset; no I/O.
    pub fn rewind(&mut self) {
        self.cursor = self.read;
    }

    /// Maximum number of records the ring can hold.
    pub fn capacity(&self) -> u32 {
        self.geometry.capacity()
    }

    /// O(1) upper bound on the number of stored records: the ring distance
    /// from `read` to `write`, which over-counts any `GARBAGE`/`RESERVED`
    /// slots still sitting in that range.
    pub fn count_estimate(&self) -> u32 {
        self.read.distance_to(self.write, &self.geometry)
    }

    /// O(n) exact count of `VALID` slots between `read` and `write`.
    pub fn count_exact(&mut self) -> Result<u32, Error<F::Error>> {
        let mut count = 0;
        let mut loc = self.read;
        while loc != self.write {
            if slot::read_status(&mut self.flash, &self.geometry, loc)? == Some(slot::Status::Valid) {
                count += 1;
            }
            loc.advance_slot(&self.geometry);
        }
        Ok(count)
    }

    fn check_object_len(&self, len: usize) -> Result<(), Error<F::Error>> {
        if len as u32 != self.geometry.object_size {
            return Err(Error::ObjectSizeMismatch {
                expected: self.geometry.object_size,
                actual: len as u32,
            });
        }
        Ok(())
    }
}
