//! Interact with `shm_open`, `shm_unlink` and related calls.
use std::ffi::{CStr, CString};
use std::fs::File;
use std::io;
use std::os::fd::FromRawFd;

use crate::SegmentError;

/// Permission bits of objects we create.
const CREATE_MODE: libc::mode_t = 0o644;

/// A validated object name, carrying the leading slash POSIX asks for.
#[derive(Debug, Clone)]
pub(crate) struct ShmName {
    name: String,
    c_name: CString,
}

impl ShmName {
    pub(crate) fn new(name: &str) -> Result<Self, SegmentError> {
        if name.is_empty() {
            return Err(SegmentError::InvalidName {
                name: name.to_owned(),
                reason: "name is empty",
            });
        }

        let full = if name.starts_with('/') {
            name.to_owned()
        } else {
            format!("/{name}")
        };

        let Ok(c_name) = CString::new(full.as_bytes()) else {
            return Err(SegmentError::InvalidName {
                name: name.to_owned(),
                reason: "name contains a NUL byte",
            });
        };

        Ok(ShmName { name: full, c_name })
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.name
    }

    fn as_c_str(&self) -> &CStr {
        &self.c_name
    }
}

/// Create a new object, failing if the name is already taken.
pub(crate) fn create(name: &ShmName) -> io::Result<File> {
    shm_open(name, libc::O_RDWR | libc::O_CREAT | libc::O_EXCL)
}

/// Open an existing object for reading and writing.
pub(crate) fn open(name: &ShmName) -> io::Result<File> {
    shm_open(name, libc::O_RDWR)
}

pub(crate) fn unlink(name: &ShmName) -> io::Result<()> {
    match unsafe { libc::shm_unlink(name.as_c_str().as_ptr()) } {
        -1 => Err(io::Error::last_os_error()),
        _ => Ok(()),
    }
}

fn shm_open(name: &ShmName, oflag: libc::c_int) -> io::Result<File> {
    // The variadic declaration on Apple targets wants the promoted type.
    #[cfg(target_vendor = "apple")]
    let mode = CREATE_MODE as libc::c_uint;
    #[cfg(not(target_vendor = "apple"))]
    let mode = CREATE_MODE;

    match unsafe { libc::shm_open(name.as_c_str().as_ptr(), oflag, mode) } {
        -1 => Err(io::Error::last_os_error()),
        // Safety: a fresh descriptor that nothing else owns. POSIX sets FD_CLOEXEC on it.
        fd => Ok(unsafe { File::from_raw_fd(fd) }),
    }
}

#[cfg(test)]
mod tests {
    use super::ShmName;

    #[test]
    fn names_get_a_leading_slash() {
        assert_eq!(ShmName::new("seg1").unwrap().as_str(), "/seg1");
        assert_eq!(ShmName::new("/seg1").unwrap().as_str(), "/seg1");
    }

    #[test]
    fn names_are_validated() {
        assert!(ShmName::new("").is_err());
        assert!(ShmName::new("bad\0name").is_err());
    }
}
