//! Bounds-checked buffer views.
//!
//! Callers describe a region as `(buffer, offset, len)` where the buffer may be
//! absent and the offset and length are signed, mirroring a native boundary
//! call. [`check_range`] turns such a description into a slice range or the
//! canonical error for the first check that fails.

use std::ops::Range;

use crate::{message, CryptoError, Result};

/// The message set used by [`check_range`] for one kind of buffer.
#[derive(Debug, Clone, Copy)]
pub struct BoundsMessages {
    pub null: &'static str,
    pub offset_negative: &'static str,
    pub len_negative: &'static str,
    pub too_short: &'static str,
}

impl BoundsMessages {
    pub const INPUT: BoundsMessages = BoundsMessages {
        null: message::INPUT_NULL,
        offset_negative: message::INPUT_OFFSET_NEGATIVE,
        len_negative: message::INPUT_LEN_NEGATIVE,
        too_short: message::INPUT_RANGE,
    };

    pub const OUTPUT: BoundsMessages = BoundsMessages {
        null: message::OUTPUT_NULL,
        offset_negative: message::OUTPUT_OFFSET_NEGATIVE,
        len_negative: message::OUTPUT_LEN_NEGATIVE,
        too_short: message::OUTPUT_RANGE,
    };

    pub const DIGEST_INPUT: BoundsMessages = BoundsMessages {
        null: message::INPUT_NULL,
        offset_negative: message::DIGEST_OFFSET_NEGATIVE,
        len_negative: message::DIGEST_LEN_NEGATIVE,
        too_short: message::DIGEST_INPUT_RANGE,
    };
}

/// Validates `(buf_len, offset, len)` in the fixed order null, offset, length,
/// range and returns the selected range.
///
/// `buf_len` is `None` when the buffer itself is absent.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidBuffer`] with the matching message from
/// `messages`.
pub fn check_range(
    buf_len: Option<usize>,
    offset: isize,
    len: isize,
    messages: &BoundsMessages,
) -> Result<Range<usize>> {
    let buf_len = buf_len.ok_or(CryptoError::InvalidBuffer(messages.null))?;
    let start =
        usize::try_from(offset).map_err(|_| CryptoError::InvalidBuffer(messages.offset_negative))?;
    let len =
        usize::try_from(len).map_err(|_| CryptoError::InvalidBuffer(messages.len_negative))?;
    match start.checked_add(len) {
        Some(end) if end <= buf_len => Ok(start..end),
        _ => Err(CryptoError::InvalidBuffer(messages.too_short)),
    }
}

/// A read-only `(buffer, offset, len)` region. The buffer may be absent.
#[derive(Debug, Clone, Copy)]
pub struct BufferView<'a> {
    buf: Option<&'a [u8]>,
    offset: isize,
    len: isize,
}

impl<'a> BufferView<'a> {
    pub fn new(buf: &'a [u8], offset: isize, len: isize) -> Self {
        Self {
            buf: Some(buf),
            offset,
            len,
        }
    }

    /// An absent buffer with the given declared length.
    pub fn null(len: isize) -> Self {
        Self {
            buf: None,
            offset: 0,
            len,
        }
    }

    /// Any combination, including an absent buffer with a non-zero offset.
    pub fn raw(buf: Option<&'a [u8]>, offset: isize, len: isize) -> Self {
        Self { buf, offset, len }
    }

    pub fn is_null(&self) -> bool {
        self.buf.is_none()
    }

    pub fn offset(&self) -> isize {
        self.offset
    }

    pub fn declared_len(&self) -> isize {
        self.len
    }

    /// Resolves the view into a slice, reporting failures with `messages`.
    pub fn resolve(&self, messages: &BoundsMessages) -> Result<&'a [u8]> {
        let range = check_range(self.buf.map(<[u8]>::len), self.offset, self.len, messages)?;
        match self.buf {
            Some(buf) => Ok(&buf[range]),
            None => Err(CryptoError::InvalidBuffer(messages.null)),
        }
    }
}

impl<'a> From<&'a [u8]> for BufferView<'a> {
    fn from(buf: &'a [u8]) -> Self {
        Self {
            buf: Some(buf),
            offset: 0,
            len: buf.len() as isize,
        }
    }
}

/// A writable `(buffer, offset, len)` region. The buffer may be absent.
#[derive(Debug)]
pub struct BufferViewMut<'a> {
    buf: Option<&'a mut [u8]>,
    offset: isize,
    len: isize,
}

impl<'a> BufferViewMut<'a> {
    pub fn new(buf: &'a mut [u8], offset: isize, len: isize) -> Self {
        Self {
            buf: Some(buf),
            offset,
            len,
        }
    }

    pub fn null(len: isize) -> Self {
        Self {
            buf: None,
            offset: 0,
            len,
        }
    }

    pub fn raw(buf: Option<&'a mut [u8]>, offset: isize, len: isize) -> Self {
        Self { buf, offset, len }
    }

    pub fn is_null(&self) -> bool {
        self.buf.is_none()
    }

    pub fn offset(&self) -> isize {
        self.offset
    }

    pub fn declared_len(&self) -> isize {
        self.len
    }

    /// Resolves the view into a mutable slice, consuming the view.
    pub fn resolve(self, messages: &BoundsMessages) -> Result<&'a mut [u8]> {
        let range = check_range(
            self.buf.as_deref().map(<[u8]>::len),
            self.offset,
            self.len,
            messages,
        )?;
        match self.buf {
            Some(buf) => Ok(&mut buf[range]),
            None => Err(CryptoError::InvalidBuffer(messages.null)),
        }
    }
}

impl<'a> From<&'a mut [u8]> for BufferViewMut<'a> {
    fn from(buf: &'a mut [u8]) -> Self {
        let len = buf.len() as isize;
        Self {
            buf: Some(buf),
            offset: 0,
            len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn err(r: Result<Range<usize>>) -> &'static str {
        r.unwrap_err().message()
    }

    #[test]
    fn check_order_null_first() {
        assert_eq!(
            err(check_range(None, -1, -1, &BoundsMessages::INPUT)),
            "input was null"
        );
    }

    #[test]
    fn check_order_offset_before_len() {
        assert_eq!(
            err(check_range(Some(4), -1, -1, &BoundsMessages::INPUT)),
            "input offset is negative"
        );
        assert_eq!(
            err(check_range(Some(4), 0, -1, &BoundsMessages::OUTPUT)),
            "output len is negative"
        );
    }

    #[test]
    fn range_past_end() {
        assert_eq!(
            err(check_range(Some(4), 2, 3, &BoundsMessages::INPUT)),
            "input buffer too short for offset + length"
        );
        assert_eq!(
            err(check_range(Some(4), 5, 0, &BoundsMessages::DIGEST_INPUT)),
            "array too short for offset + len"
        );
        assert_eq!(
            err(check_range(Some(4), isize::MAX, isize::MAX, &BoundsMessages::INPUT)),
            "input buffer too short for offset + length"
        );
    }

    #[test]
    fn exact_fit_is_accepted() {
        assert_eq!(check_range(Some(4), 1, 3, &BoundsMessages::INPUT).unwrap(), 1..4);
        assert_eq!(check_range(Some(4), 4, 0, &BoundsMessages::INPUT).unwrap(), 4..4);
    }

    #[test]
    fn views_resolve_to_slices() {
        let data = [1u8, 2, 3, 4, 5];
        let view = BufferView::new(&data, 1, 3);
        assert_eq!(view.resolve(&BoundsMessages::INPUT).unwrap(), &[2, 3, 4]);

        let mut out = [0u8; 5];
        let view = BufferViewMut::new(&mut out, 2, 2);
        view.resolve(&BoundsMessages::OUTPUT)
            .unwrap()
            .copy_from_slice(&[9, 9]);
        assert_eq!(out, [0, 0, 9, 9, 0]);
    }

    #[test]
    fn null_views() {
        let view = BufferView::null(0);
        assert!(view.is_null());
        assert_eq!(
            view.resolve(&BoundsMessages::INPUT).unwrap_err().message(),
            "input was null"
        );
        let view = BufferViewMut::null(0);
        assert_eq!(
            view.resolve(&BoundsMessages::OUTPUT).unwrap_err().message(),
            "output was null"
        );
    }
}
