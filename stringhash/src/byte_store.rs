/// Fixed-size backing memory for the slot array.
///
/// The index never grows, so a store only has to hand out its bytes and be
/// able to wipe them back to the all-empty state.
pub trait ByteStore: AsRef<[u8]> + AsMut<[u8]> {
    /// Zero every byte of the store
    fn reset(&mut self) {
        self.as_mut().fill(0);
    }
}

impl ByteStore for Vec<u8> {}

impl ByteStore for Box<[u8]> {}

impl<const N: usize> ByteStore for [u8; N] {}

impl ByteStore for &mut [u8] {}

/// Allocates a zeroed heap store of exactly `len` bytes in a single allocation.
pub(crate) fn zeroed_boxed(len: usize) -> Box<[u8]> {
    vec![0u8; len].into_boxed_slice()
}
