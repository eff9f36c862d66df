use std::io::Read;

use crate::error::BodyError;

/// Sanitized body bytes, materialized at most once.
///
/// Two states: pending (`None`) and ready (`Some`). Once ready, the bytes
/// never change and serve every later read.
#[derive(Debug, Default)]
pub(crate) struct BufferedBody {
    bytes: Option<Box<[u8]>>,
}

impl BufferedBody {
    /// Returns the buffered bytes, if materialized.
    pub(crate) fn get(&self) -> Option<&[u8]> {
        self.bytes.as_deref()
    }

    pub(crate) fn is_ready(&self) -> bool {
        self.bytes.is_some()
    }

    /// Returns the buffered bytes, running `fill` first if still pending.
    ///
    /// A failing `fill` leaves the buffer pending.
    pub(crate) fn get_or_try_fill<E>(
        &mut self,
        fill: impl FnOnce() -> Result<Vec<u8>, E>,
    ) -> Result<&[u8], E> {
        match self.bytes {
            Some(ref bytes) => Ok(bytes),
            None => Ok(self.bytes.insert(fill()?.into_boxed_slice())),
        }
    }
}

/// Reads `reader` to exhaustion, failing once more than `limit` bytes arrive.
pub(crate) fn read_to_limit<R: Read>(reader: R, limit: Option<usize>) -> Result<Vec<u8>, BodyError> {
    let mut buf = Vec::new();
    match limit {
        None => {
            let mut reader = reader;
            reader.read_to_end(&mut buf).map_err(BodyError::Transport)?;
        }
        Some(limit) => {
            // One byte past the limit is enough to detect overflow.
            let cap = u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1);
            reader
                .take(cap)
                .read_to_end(&mut buf)
                .map_err(BodyError::Transport)?;
            if buf.len() > limit {
                return Err(BodyError::TooLarge { limit });
            }
        }
    }
    Ok(buf)
}
