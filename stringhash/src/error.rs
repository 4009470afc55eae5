use thiserror::Error;

/// Errors that can occur when building or filling a hash index
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashIndexError {
    /// Every slot was visited by the probe sequence and none was empty
    #[error("hash index is full ({capacity} slots)")]
    TableFull { capacity: usize },

    /// The requested capacity cannot back a table: zero slots, or
    /// more slots than fit in addressable memory
    #[error("invalid capacity: {0}")]
    InvalidCapacity(usize),
}

pub type Result<T> = std::result::Result<T, HashIndexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            HashIndexError::TableFull { capacity: 4 }.to_string(),
            "hash index is full (4 slots)"
        );
        assert_eq!(
            HashIndexError::InvalidCapacity(0).to_string(),
            "invalid capacity: 0"
        );
    }
}
