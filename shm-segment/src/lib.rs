//! Own at most one named POSIX shared memory segment and access it as an array of bytes.
//!
//! A [`SharedSegment`] starts out unopened. [`SharedSegment::create`] makes a new named object of
//! the requested size, [`SharedSegment::open`] attaches to one that some other process created.
//! Either first releases whatever the segment held before, and leaves it unopened if acquiring
//! the new object fails. Dropping the segment releases the mapping exactly like
//! [`SharedSegment::close`].
//!
//! ## Bounds
//!
//! Single byte access is lenient: [`SharedSegment::read_byte`] answers `None` and
//! [`SharedSegment::write_byte`] does nothing when the offset is not inside the segment. Buffered
//! access is strict about its start: an offset past [`SharedSegment::size`] is an error, while
//! the length is clamped to what remains. An offset exactly at the end transfers zero bytes.
//!
//! Buffered access to an unopened segment yields [`Access::Unavailable`], which callers can tell
//! apart from a successful transfer of zero bytes.
//!
//! ## Sharing
//!
//! The named object is visible to other processes and outlives this one until it is removed with
//! [`SharedSegment::unlink`]. No synchronization is provided; coordinating concurrent writers is
//! left to the processes involved.
#![cfg(target_family = "unix")]
mod error;
mod mapping;
mod os;


pub use error::SegmentError;

use mapping::Mapping;
use os::ShmName;

/// The outcome of a buffered access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access<T> {
    /// No segment is opened, nothing was transferred.
    Unavailable,
    /// The access went through.
    Done(T),
}

impl<T> Access<T> {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Access::Unavailable)
    }

    pub fn done(self) -> Option<T> {
        match self {
            Access::Unavailable => None,
            Access::Done(val) => Some(val),
        }
    }
}

/// A handle to zero or one mapped shared memory segment.
#[derive(Debug, Default)]
pub struct SharedSegment {
    mapping: Option<Mapping>,
}

impl SharedSegment {
    pub fn new() -> Self {
        SharedSegment::default()
    }

    /// Create a new named segment of exactly `size` bytes and map all of it.
    ///
    /// Fails if the name already exists. A `size` of zero is accepted but yields a segment
    /// through which nothing can be transferred.
    pub fn create(&mut self, name: &str, size: u32) -> Result<(), SegmentError> {
        let name = ShmName::new(name)?;
        self.close();
        self.mapping = Some(Mapping::create(name, size)?);
        Ok(())
    }

    /// Attach to an existing named segment and map its first `size` bytes.
    ///
    /// The caller's `size` defines the bounds of all later accesses. It must not exceed the
    /// current length of the object, a larger object is only partially visible.
    pub fn open(&mut self, name: &str, size: u32) -> Result<(), SegmentError> {
        let name = ShmName::new(name)?;
        self.close();
        self.mapping = Some(Mapping::open(name, size)?);
        Ok(())
    }

    /// Release the mapping, if any.
    pub fn close(&mut self) {
        self.mapping = None;
    }

    /// Remove a name from the system.
    ///
    /// Existing mappings of the object, in this or other processes, stay valid until closed.
    pub fn unlink(name: &str) -> Result<(), SegmentError> {
        let name = ShmName::new(name)?;
        os::unlink(&name).map_err(|err| SegmentError::os("shm_unlink", &name, err))
    }

    pub fn is_opened(&self) -> bool {
        self.mapping.is_some()
    }

    pub fn size(&self) -> u32 {
        self.mapping.as_ref().map_or(0, Mapping::size)
    }

    /// The normalized name of the mapped segment.
    pub fn name(&self) -> Option<&str> {
        self.mapping.as_ref().map(Mapping::name)
    }

    /// Read one byte, `None` if unopened or `offset` is not inside the segment.
    pub fn read_byte(&self, offset: u32) -> Option<u8> {
        let mapping = self.mapping.as_ref()?;
        if offset >= mapping.size() {
            return None;
        }

        let mut byte = [0];
        mapping.read(offset, &mut byte);
        Some(byte[0])
    }

    /// Write one byte, silently ignored if unopened or `offset` is not inside the segment.
    pub fn write_byte(&mut self, offset: u32, data: u8) {
        match &self.mapping {
            Some(mapping) if offset < mapping.size() => mapping.write(offset, &[data]),
            _ => {}
        }
    }

    /// Read up to `length` bytes starting at `offset`.
    ///
    /// The returned vector holds exactly the bytes that were read.
    pub fn read_buffer(&self, offset: u32, length: u32) -> Result<Access<Vec<u8>>, SegmentError> {
        let count = self.remaining(offset)?.min(length);

        let Some(mapping) = &self.mapping else {
            return Ok(Access::Unavailable);
        };

        let mut buffer = vec![0; count as usize];
        mapping.read(offset, &mut buffer);
        Ok(Access::Done(buffer))
    }

    /// Read up to `buf.len()` bytes starting at `offset` into `buf`, returning the count.
    pub fn read_into(&self, offset: u32, buf: &mut [u8]) -> Result<Access<u32>, SegmentError> {
        let count = self.remaining(offset)?.min(clamp_len(buf.len()));

        let Some(mapping) = &self.mapping else {
            return Ok(Access::Unavailable);
        };

        mapping.read(offset, &mut buf[..count as usize]);
        Ok(Access::Done(count))
    }

    /// Write up to `length` bytes from the start of `data` at `offset`, returning the count.
    ///
    /// Only the prefix of `data` that fits before the end of the segment is written.
    pub fn write_buffer(
        &mut self,
        offset: u32,
        data: &[u8],
        length: u32,
    ) -> Result<Access<u32>, SegmentError> {
        let count = self
            .remaining(offset)?
            .min(length)
            .min(clamp_len(data.len()));

        let Some(mapping) = &self.mapping else {
            return Ok(Access::Unavailable);
        };

        mapping.write(offset, &data[..count as usize]);
        Ok(Access::Done(count))
    }

    /// Bytes between `offset` and the end, or an error if `offset` is past the end.
    fn remaining(&self, offset: u32) -> Result<u32, SegmentError> {
        let size = self.size();
        size.checked_sub(offset)
            .ok_or(SegmentError::OffsetOutOfRange { offset, size })
    }
}

fn clamp_len(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}
