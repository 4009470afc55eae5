use std::{
    marker::PhantomData,
    ops::{Deref, DerefMut},
};

use bytemuck::Pod;

use crate::byte_store::ByteStore;

/// A fixed-length array backed by a ByteStore that only accepts types `T` which are Pod
/// (Plain Old Data) and can be represented as a slice of bytes.
///
/// The length is decided once from the size of the store; trailing bytes that
/// cannot hold a whole `T` are ignored.
pub struct FixedVec<T, S: ByteStore> {
    store: S,
    len: usize,
    _marker: PhantomData<T>,
}

impl<T, S> FixedVec<T, S>
where
    T: Pod,
    S: ByteStore,
{
    /// Lays a `[T]` over the whole store.
    pub fn new(store: S) -> Self {
        debug_assert!(std::mem::size_of::<T>() > 0);
        let len = store.as_ref().len() / std::mem::size_of::<T>();
        Self {
            store,
            len,
            _marker: PhantomData,
        }
    }

    fn byte_len(&self) -> usize {
        self.len * std::mem::size_of::<T>()
    }

    fn inner(&self) -> &[T] {
        let end = self.byte_len();
        bytemuck::cast_slice(&self.store.as_ref()[..end])
    }

    fn inner_mut(&mut self) -> &mut [T] {
        let end = self.byte_len();
        bytemuck::cast_slice_mut(&mut self.store.as_mut()[..end])
    }

    /// Returns the number of elements, fixed at construction.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns whether the store was too small to hold a single element.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T: Pod, S: ByteStore> Deref for FixedVec<T, S> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        self.inner()
    }
}

impl<T: Pod, S: ByteStore> DerefMut for FixedVec<T, S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.inner_mut()
    }
}
