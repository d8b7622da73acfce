use crate::{DeepClone, Error};
use alloc::{boxed::Box, collections::VecDeque, vec::Vec};
use core::{
    fmt,
    iter::{self, FusedIterator},
    ops::Range,
    slice,
};

/// Fixed-capacity circular buffer with overwrite-oldest semantics.
///
/// Storage is allocated once at construction and never resized. The live
/// elements are the `len()` slots starting at the tail cursor and walking
/// forward, oldest first. The element count is tracked explicitly, so a
/// full buffer and an empty buffer are never confused even though both
/// have `head == tail`.
///
/// Enqueueing into a full buffer evicts the oldest element and hands it
/// back to the caller; enqueue never fails.
///
/// # Example
///
/// ```
/// use vessel::RingBuffer;
///
/// let mut buffer = RingBuffer::new(3);
/// for value in 1..=4 {
///     buffer.enqueue(value);
/// }
///
/// assert_eq!(buffer.iter().copied().collect::<Vec<_>>(), [2, 3, 4]);
/// assert_eq!(buffer.dequeue(), Some(2));
/// assert_eq!(buffer.len(), 2);
/// ```
///
/// # Thread Safety
///
/// Not synchronized. Share it across threads only behind a lock or by
/// confining it to one owner.
#[derive(Clone)]
pub struct RingBuffer<T> {
    // Live slots are always `Some`. Slots outside the live range may still
    // hold stale values after `clear` or `discard_from_tail`.
    storage: Box<[Option<T>]>,
    head: usize,
    tail: usize,
    count: usize,
}

fn vacant_storage<T>(capacity: usize) -> Box<[Option<T>]> {
    iter::repeat_with(|| None).take(capacity).collect()
}

impl<T> RingBuffer<T> {
    /// Creates an empty buffer that holds at most `capacity` elements.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero. Use [`Self::try_new`] to get an error
    /// instead.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring buffer capacity must be non-zero");
        RingBuffer {
            storage: vacant_storage(capacity),
            head: 0,
            tail: 0,
            count: 0,
        }
    }

    /// Creates an empty buffer, or fails with [`Error::ZeroCapacity`].
    pub fn try_new(capacity: usize) -> Result<Self, Error> {
        if capacity == 0 {
            return Err(Error::ZeroCapacity);
        }
        Ok(Self::new(capacity))
    }

    /// Builds a buffer preloaded with the elements of `items`.
    ///
    /// Without an explicit `capacity` the buffer is sized exactly to the
    /// input and starts out full. With one, elements are loaded from slot 0
    /// onwards and anything beyond `capacity` is left unread.
    ///
    /// Fails with [`Error::ZeroCapacity`] when `capacity` is `Some(0)`, or
    /// when it is `None` and `items` is empty.
    pub fn from_iter_with_capacity<I>(items: I, capacity: Option<usize>) -> Result<Self, Error>
    where
        I: IntoIterator<Item = T>,
    {
        match capacity {
            Some(capacity) => {
                let mut buffer = Self::try_new(capacity)?;
                for item in items.into_iter().take(capacity) {
                    buffer.enqueue(item);
                }
                Ok(buffer)
            }
            None => {
                let storage: Box<[Option<T>]> = items.into_iter().map(Some).collect();
                if storage.is_empty() {
                    return Err(Error::ZeroCapacity);
                }
                let count = storage.len();
                Ok(RingBuffer {
                    storage,
                    head: 0,
                    tail: 0,
                    count,
                })
            }
        }
    }

    /// Number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` when there are no live elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns `true` when the next enqueue will evict the oldest element.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.count == self.capacity()
    }

    /// Maximum number of live elements, fixed at construction.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    #[inline(always)]
    fn wrap(&self, index: usize, distance: usize) -> usize {
        (index + distance) % self.capacity()
    }

    /// Appends `item` as the newest element.
    ///
    /// If the buffer was full, the oldest element is evicted and returned;
    /// otherwise returns `None`.
    pub fn enqueue(&mut self, item: T) -> Option<T> {
        let previous = self.storage[self.head].replace(item);
        self.head = self.wrap(self.head, 1);
        if self.count == self.capacity() {
            // The slot just written was the oldest one.
            self.tail = self.head;
            previous
        } else {
            self.count += 1;
            None
        }
    }

    /// Removes and returns the oldest element, or `None` when empty.
    pub fn dequeue(&mut self) -> Option<T> {
        if self.count == 0 {
            return None;
        }
        let item = self.storage[self.tail].take();
        self.tail = self.wrap(self.tail, 1);
        self.count -= 1;
        item
    }

    /// Like [`Self::dequeue`], but reports emptiness as [`Error::EmptyQueue`].
    pub fn try_dequeue(&mut self) -> Result<T, Error> {
        self.dequeue().ok_or(Error::EmptyQueue)
    }

    /// Returns the oldest element without removing it.
    pub fn peek(&self) -> Option<&T> {
        if self.count == 0 {
            return None;
        }
        self.storage[self.tail].as_ref()
    }

    /// Like [`Self::peek`], but reports emptiness as [`Error::EmptyQueue`].
    pub fn try_peek(&self) -> Result<&T, Error> {
        self.peek().ok_or(Error::EmptyQueue)
    }

    /// Returns the most recently enqueued element without removing it.
    pub fn peek_newest(&self) -> Option<&T> {
        if self.count == 0 {
            return None;
        }
        let newest = self.wrap(self.head, self.capacity() - 1);
        self.storage[newest].as_ref()
    }

    /// Returns the element `index` positions after the oldest one.
    ///
    /// Out-of-range indices yield `None`; stale slots are never exposed.
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.count {
            return None;
        }
        self.storage[self.wrap(self.tail, index)].as_ref()
    }

    /// Mutable counterpart of [`Self::get`].
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index >= self.count {
            return None;
        }
        let slot = self.wrap(self.tail, index);
        self.storage[slot].as_mut()
    }

    /// Like [`Self::get`], but reports a bad index as [`Error::InvalidIndex`].
    pub fn try_get(&self, index: usize) -> Result<&T, Error> {
        self.get(index).ok_or(Error::InvalidIndex {
            index,
            len: self.count,
        })
    }

    /// Linear scan of the live elements for one equal to `value`.
    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.iter().any(|item| item == value)
    }

    /// Forgets every live element in O(1).
    ///
    /// Storage is not touched: old values stay in their slots until they
    /// are overwritten. Use [`Self::clear_with`] to release them.
    pub fn clear(&mut self) {
        self.tail = self.head;
        self.count = 0;
    }

    /// Forgets every live element and overwrites every slot with `fill`.
    pub fn clear_with(&mut self, fill: T)
    where
        T: Clone,
    {
        self.clear();
        for slot in self.storage.iter_mut() {
            *slot = Some(fill.clone());
        }
    }

    /// Drops up to `distance` of the oldest elements without reading them.
    ///
    /// Returns how many elements were discarded. The head cursor does not
    /// move.
    pub fn discard_from_tail(&mut self, distance: usize) -> usize {
        let discarded = distance.min(self.count);
        self.tail = self.wrap(self.tail, discarded);
        self.count -= discarded;
        discarded
    }

    /// Iterates over the live elements, oldest first.
    ///
    /// Each iterator carries its own cursor and count, so calling `iter`
    /// again always starts over from the oldest element.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            storage: &self.storage,
            pos: self.tail,
            remaining: self.count,
        }
    }

    /// Iterates mutably over the live elements, oldest first.
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        let remaining = self.count;
        let (first, second) = self.live_ranges();
        let (wrapped, unwrapped) = self.storage.split_at_mut(first.start);
        IterMut {
            inner: unwrapped[..first.len()]
                .iter_mut()
                .chain(wrapped[second].iter_mut()),
            remaining,
        }
    }

    /// Removes the live elements in FIFO order.
    ///
    /// Elements not consumed by the time the iterator is dropped are
    /// dequeued and dropped as well.
    pub fn drain(&mut self) -> Drain<'_, T> {
        Drain { buffer: self }
    }

    // Physical ranges holding the live elements: the run from the tail and,
    // if the live region wraps, the run from slot 0.
    fn live_ranges(&self) -> (Range<usize>, Range<usize>) {
        let end = self.tail + self.count;
        if end <= self.capacity() {
            (self.tail..end, 0..0)
        } else {
            (self.tail..self.capacity(), 0..end - self.capacity())
        }
    }
}

impl<T> Extend<T> for RingBuffer<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, items: I) {
        for item in items {
            self.enqueue(item);
        }
    }
}

impl<T> TryFrom<Vec<T>> for RingBuffer<T> {
    type Error = Error;

    /// Converts a vector into a full buffer of the same length.
    fn try_from(items: Vec<T>) -> Result<Self, Self::Error> {
        Self::from_iter_with_capacity(items, None)
    }
}

impl<T> TryFrom<VecDeque<T>> for RingBuffer<T> {
    type Error = Error;

    /// Converts a queue into a full buffer of the same length, keeping its
    /// front as the oldest element.
    fn try_from(items: VecDeque<T>) -> Result<Self, Self::Error> {
        Self::from_iter_with_capacity(items, None)
    }
}

impl<T: DeepClone> DeepClone for RingBuffer<T> {
    fn deep_clone(&self) -> Self {
        RingBuffer {
            storage: self.storage.iter().map(DeepClone::deep_clone).collect(),
            head: self.head,
            tail: self.tail,
            count: self.count,
        }
    }

    fn try_deep_clone(&self) -> Result<Self, Error> {
        Ok(RingBuffer {
            storage: self
                .storage
                .iter()
                .map(DeepClone::try_deep_clone)
                .collect::<Result<_, _>>()?,
            head: self.head,
            tail: self.tail,
            count: self.count,
        })
    }
}

impl<T: fmt::Debug> fmt::Debug for RingBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingBuffer")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("items", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

/// Borrowing iterator over the live elements of a [`RingBuffer`].
pub struct Iter<'a, T> {
    storage: &'a [Option<T>],
    pos: usize,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let item = self.storage[self.pos].as_ref();
        self.pos = (self.pos + 1) % self.storage.len();
        self.remaining -= 1;
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let last = (self.pos + self.remaining) % self.storage.len();
        self.storage[last].as_ref()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            storage: self.storage,
            pos: self.pos,
            remaining: self.remaining,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, T> IntoIterator for &'a RingBuffer<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Mutable iterator over the live elements of a [`RingBuffer`].
pub struct IterMut<'a, T> {
    inner: iter::Chain<slice::IterMut<'a, Option<T>>, slice::IterMut<'a, Option<T>>>,
    remaining: usize,
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.inner.next()?.as_mut();
        self.remaining -= 1;
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for IterMut<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let item = self.inner.next_back()?.as_mut();
        self.remaining -= 1;
        item
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}
impl<T> FusedIterator for IterMut<'_, T> {}

impl<T> fmt::Debug for IterMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterMut")
            .field("remaining", &self.remaining)
            .finish()
    }
}

impl<'a, T> IntoIterator for &'a mut RingBuffer<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// Owning iterator that dequeues a [`RingBuffer`] until it is empty.
pub struct IntoIter<T> {
    buffer: RingBuffer<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.buffer.dequeue()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.buffer.len(), Some(self.buffer.len()))
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}
impl<T> FusedIterator for IntoIter<T> {}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.buffer).finish()
    }
}

impl<T> IntoIterator for RingBuffer<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { buffer: self }
    }
}

/// Draining iterator returned by [`RingBuffer::drain`].
pub struct Drain<'a, T> {
    buffer: &'a mut RingBuffer<T>,
}

impl<T> Iterator for Drain<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.buffer.dequeue()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.buffer.len(), Some(self.buffer.len()))
    }
}

impl<T> ExactSizeIterator for Drain<'_, T> {}
impl<T> FusedIterator for Drain<'_, T> {}

impl<T> Drop for Drain<'_, T> {
    fn drop(&mut self) {
        while self.buffer.dequeue().is_some() {}
    }
}

impl<T: fmt::Debug> fmt::Debug for Drain<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Drain").field(&self.buffer).finish()
    }
}
