use anyhow::Result;
use tracing::warn;

/// Platform side of a query: a forward-only cursor that holds resources on the
/// peer until it is closed.
pub trait QueryCursor<T> {
    fn has_next(&self) -> bool;
    fn next(&mut self) -> Result<T>;
    fn close(&mut self) -> Result<()>;
}

/// Single-pass iterator over query results.
///
/// The underlying cursor is closed exactly once: either by an explicit call to
/// [`ResultsIterator::close`] or, on any other exit path, when the iterator is
/// dropped.
pub struct ResultsIterator<'a, T> {
    cursor: Box<dyn QueryCursor<T> + 'a>,
    closed: bool,
}

impl<'a, T> ResultsIterator<'a, T> {
    pub fn new(cursor: Box<dyn QueryCursor<T> + 'a>) -> Self {
        ResultsIterator {
            cursor,
            closed: false,
        }
    }

    pub fn has_next(&self) -> bool {
        !self.closed && self.cursor.has_next()
    }

    /// Closes the cursor and reports a failure to do so.
    pub fn close(mut self) -> Result<()> {
        self.closed = true;
        self.cursor.close()
    }
}

impl<T> Iterator for ResultsIterator<'_, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.has_next() {
            return None;
        }
        Some(self.cursor.next())
    }
}

impl<T> Drop for ResultsIterator<'_, T> {
    fn drop(&mut self) {
        if !self.closed {
            self.closed = true;
            if let Err(e) = self.cursor.close() {
                warn!("Failed to close query iterator: {:#}", e);
            }
        }
    }
}
