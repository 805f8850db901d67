use std::io;

use crate::os::ShmName;

/// An error returned by operations of a [`SharedSegment`](crate::SharedSegment).
///
/// `InvalidName` and `OffsetOutOfRange` are raised before the operating system or the mapped
/// memory is touched, see [`SegmentError::is_precondition`]. The other variants report the state
/// of the named object itself.
#[derive(Debug, thiserror::Error)]
pub enum SegmentError {
    #[error("invalid shared memory name `{name}`: {reason}")]
    InvalidName { name: String, reason: &'static str },
    #[error("offset is over range: {offset} > {size}")]
    OffsetOutOfRange { offset: u32, size: u32 },
    /// A call into the operating system failed, `source` holds its `errno`.
    #[error("{op} failed for `{name}`")]
    Os {
        op: &'static str,
        name: String,
        #[source]
        source: io::Error,
    },
    /// The existing object is shorter than the view that was asked for.
    #[error("shared memory `{name}` holds {actual} bytes, cannot map {requested}")]
    RegionTooSmall {
        name: String,
        requested: u32,
        actual: u64,
    },
}

impl SegmentError {
    pub(crate) fn os(op: &'static str, name: &ShmName, source: io::Error) -> Self {
        SegmentError::Os {
            op,
            name: name.as_str().to_owned(),
            source,
        }
    }

    /// Whether this error rejected the arguments of a call, as opposed to a failure of the
    /// operating system.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            SegmentError::InvalidName { .. } | SegmentError::OffsetOutOfRange { .. }
        )
    }

    /// The underlying OS error, if any.
    pub fn os_error(&self) -> Option<&io::Error> {
        match self {
            SegmentError::Os { source, .. } => Some(source),
            _ => None,
        }
    }
}
