use thiserror::Error;

/// Errors reported by [`SList`](crate::SList) positional operations
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SListError {
    /// `insert_after` was given `end()`, or `erase_after` was given `end()`
    /// or a position without successor
    #[error("{op}: invalid position")]
    InvalidPosition { op: &'static str },
}

pub type Result<T> = std::result::Result<T, SListError>;

impl SListError {
    #[inline]
    pub(crate) fn invalid_position(op: &'static str) -> Self {
        log::debug!("{op}: rejected invalid position");
        SListError::InvalidPosition { op }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_display() {
        let err = SListError::invalid_position("SList::insert_after");
        assert_eq!(err.to_string(), "SList::insert_after: invalid position");
        assert_eq!(
            err,
            SListError::InvalidPosition {
                op: "SList::insert_after"
            }
        );
    }
}
