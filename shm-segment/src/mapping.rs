//! Owns a shared memory object together with its mapped view.
use std::fs::File;
use std::ptr;

use memmap2::{MmapOptions, MmapRaw};

use crate::os::{self, ShmName};
use crate::SegmentError;

/// A mapped view and the object it maps, acquired and released as one.
///
/// Fields drop in declaration order, so the view is unmapped before the descriptor is closed.
#[derive(Debug)]
pub(crate) struct Mapping {
    view: MmapRaw,
    #[allow(dead_code)]
    handle: File,
    name: ShmName,
    /// The logical length, never more than the view.
    size: u32,
}

impl Mapping {
    pub(crate) fn create(name: ShmName, size: u32) -> Result<Self, SegmentError> {
        Self::create_with(name, size, |handle, name, size| {
            match handle.set_len(u64::from(size)) {
                Ok(()) => Self::map(handle, name, size),
                Err(err) => Err(SegmentError::os("ftruncate", &name, err)),
            }
        })
    }

    /// Create the object, then size and map it with `acquire`.
    fn create_with(
        name: ShmName,
        size: u32,
        acquire: impl FnOnce(File, ShmName, u32) -> Result<Self, SegmentError>,
    ) -> Result<Self, SegmentError> {
        let handle = os::create(&name).map_err(|err| SegmentError::os("shm_open", &name, err))?;
        let mapping = acquire(handle, name.clone(), size);

        if mapping.is_err() {
            // We created the name, do not leave a half-made object behind.
            let _ = os::unlink(&name);
        }

        mapping
    }

    pub(crate) fn open(name: ShmName, size: u32) -> Result<Self, SegmentError> {
        let handle = os::open(&name).map_err(|err| SegmentError::os("shm_open", &name, err))?;

        // Touching a page past the end of the object raises SIGBUS, refuse such views.
        let actual = handle
            .metadata()
            .map_err(|err| SegmentError::os("fstat", &name, err))?
            .len();

        if actual < u64::from(size) {
            return Err(SegmentError::RegionTooSmall {
                name: name.as_str().to_owned(),
                requested: size,
                actual,
            });
        }

        Self::map(handle, name, size)
    }

    fn map(handle: File, name: ShmName, size: u32) -> Result<Self, SegmentError> {
        let view = MmapOptions::new()
            .len(size as usize)
            .map_raw(&handle)
            .map_err(|err| SegmentError::os("mmap", &name, err))?;

        Ok(Mapping {
            view,
            handle,
            name,
            size,
        })
    }

    pub(crate) fn name(&self) -> &str {
        self.name.as_str()
    }

    pub(crate) fn size(&self) -> u32 {
        self.size
    }

    /// Copy `buf.len()` bytes starting at `offset` out of the view.
    ///
    /// The caller has clamped the range to `size`.
    pub(crate) fn read(&self, offset: u32, buf: &mut [u8]) {
        let offset = offset as usize;
        assert!(offset + buf.len() <= self.size as usize);

        // Safety: in bounds of the view as asserted. Other processes may write concurrently so we
        // never form a reference to the mapped bytes, only copy through the raw pointer.
        unsafe {
            let src = self.view.as_ptr().add(offset);
            ptr::copy_nonoverlapping(src, buf.as_mut_ptr(), buf.len());
        }
    }

    /// Copy all of `data` into the view at `offset`.
    ///
    /// The caller has clamped the range to `size`.
    pub(crate) fn write(&self, offset: u32, data: &[u8]) {
        let offset = offset as usize;
        assert!(offset + data.len() <= self.size as usize);

        // Safety: in bounds of the view as asserted, and the view is mapped writable.
        unsafe {
            let dst = self.view.as_mut_ptr().add(offset);
            ptr::copy_nonoverlapping(data.as_ptr(), dst, data.len());
        }
    }
}
