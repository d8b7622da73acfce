use crate::{DeepClone, DefaultAllocator, Error, PoolAllocator, RingBuffer, TemplateAllocator};
use alloc::rc::Rc;
use core::{
    cell::{Ref, RefCell, RefMut},
    fmt,
};
use hashbrown::HashMap;
use rustc_hash::FxBuildHasher;
use tracing::{debug, trace};

/// Handle to an instance managed by a [`ReusePool`].
///
/// Handles are cheap to clone and all clones refer to the same instance.
/// The pool tells instances apart by identity, never by value, so two
/// structurally equal instances are never confused.
pub struct Pooled<T>(Rc<RefCell<T>>);

impl<T> Pooled<T> {
    fn new(obj: T) -> Self {
        Pooled(Rc::new(RefCell::new(obj)))
    }

    // Address of the shared allocation. Stable and unique while any handle
    // to the instance is alive, which the pool guarantees for every
    // instance it tracks.
    #[inline(always)]
    fn key(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    /// Immutably borrows the instance.
    ///
    /// # Panics
    ///
    /// Panics if the instance is currently mutably borrowed.
    pub fn borrow(&self) -> Ref<'_, T> {
        self.0.borrow()
    }

    /// Mutably borrows the instance.
    ///
    /// # Panics
    ///
    /// Panics if the instance is currently borrowed.
    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.0.borrow_mut()
    }

    /// Returns `true` if both handles refer to the same instance.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Clone for Pooled<T> {
    fn clone(&self) -> Self {
        Pooled(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for Pooled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pooled").field(&*self.0).finish()
    }
}

impl<T> fmt::Pointer for Pooled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Pointer::fmt(&Rc::as_ptr(&self.0), f)
    }
}

/// A bounded pool of reusable instances.
///
/// Free instances wait in a [`RingBuffer`]; instances handed out are
/// tracked in a checked-out set until they are recycled. The pool never
/// has more than `max_size` instances checked out at once, and the free
/// and checked-out instances together never exceed `max_size`.
///
/// When the free list is empty, checkout manufactures a new instance with
/// the pool's [`PoolAllocator`].
///
/// # Example
///
/// ```
/// use vessel::ReusePool;
///
/// let mut pool: ReusePool<_, Vec<u8>> = ReusePool::new(2, false);
/// let first = pool.checkout().unwrap();
/// let second = pool.checkout().unwrap();
/// assert!(pool.checkout().is_none());
///
/// assert!(pool.recycle(first.clone()));
/// let again = pool.checkout().unwrap();
/// assert!(again.ptr_eq(&first));
/// # drop(second);
/// ```
#[derive(Debug)]
pub struct ReusePool<P, T> {
    allocator: P,
    free: RingBuffer<Pooled<T>>,
    checked_out: HashMap<usize, Pooled<T>, FxBuildHasher>,
}

impl<T: Default> ReusePool<DefaultAllocator, T> {
    /// Creates a pool of at most `max_size` default-constructed instances.
    ///
    /// With `fill` set, `max_size` instances are created up front.
    ///
    /// # Panics
    ///
    /// Panics if `max_size` is zero.
    pub fn new(max_size: usize, fill: bool) -> Self {
        Self::with_allocator(max_size, fill, DefaultAllocator)
    }
}

impl<T: DeepClone> ReusePool<TemplateAllocator<T>, T> {
    /// Creates a pool whose new instances are deep clones of `template`.
    ///
    /// With `fill` set, `max_size` clones are created up front.
    ///
    /// # Panics
    ///
    /// Panics if `max_size` is zero.
    pub fn with_template(max_size: usize, fill: bool, template: T) -> Self {
        Self::with_allocator(max_size, fill, TemplateAllocator::new(template))
    }
}

impl<P: PoolAllocator<T>, T> ReusePool<P, T> {
    /// Creates a pool of at most `max_size` instances made by `allocator`.
    ///
    /// Unless `fill` is set, instances are only created on demand.
    ///
    /// # Panics
    ///
    /// Panics if `max_size` is zero.
    pub fn with_allocator(max_size: usize, fill: bool, allocator: P) -> Self {
        let mut free = RingBuffer::new(max_size);
        if fill {
            for _ in 0..max_size {
                free.enqueue(Pooled::new(allocator.allocate()));
            }
        }
        ReusePool {
            allocator,
            free,
            checked_out: HashMap::with_capacity_and_hasher(max_size, FxBuildHasher),
        }
    }

    /// Adopts pre-built `instances` as the free list.
    ///
    /// The pool's maximum size is the number of instances. `allocator` is
    /// only consulted if instances are later lost, for example after
    /// [`Self::clear`].
    ///
    /// Fails with [`Error::ZeroCapacity`] if `instances` is empty.
    pub fn from_instances<I>(instances: I, allocator: P) -> Result<Self, Error>
    where
        I: IntoIterator<Item = T>,
    {
        let free =
            RingBuffer::from_iter_with_capacity(instances.into_iter().map(Pooled::new), None)?;
        let max_size = free.capacity();
        Ok(ReusePool {
            allocator,
            free,
            checked_out: HashMap::with_capacity_and_hasher(max_size, FxBuildHasher),
        })
    }

    /// Checks out an instance, or returns `None` when `max_size` instances
    /// are already checked out.
    ///
    /// A free instance is reused if there is one (after the allocator's
    /// reset hook runs on it); otherwise a new one is allocated. The reset
    /// hook is skipped if a caller still borrows the reused instance
    /// through a handle it kept.
    pub fn checkout(&mut self) -> Option<Pooled<T>> {
        if self.checked_out.len() >= self.max_size() {
            debug!(max_size = self.max_size(), "pool exhausted, refusing checkout");
            return None;
        }
        let instance = match self.free.dequeue() {
            Some(instance) => {
                match instance.0.try_borrow_mut() {
                    Ok(mut obj) => self.allocator.reset(&mut obj),
                    Err(_) => trace!("reused instance is still borrowed, skipping reset"),
                }
                instance
            }
            None => {
                trace!(
                    in_use = self.checked_out.len(),
                    "free list empty, allocating a new instance"
                );
                Pooled::new(self.allocator.allocate())
            }
        };
        self.checked_out.insert(instance.key(), instance.clone());
        Some(instance)
    }

    /// Like [`Self::checkout`], but reports exhaustion as
    /// [`Error::PoolExhausted`].
    pub fn try_checkout(&mut self) -> Result<Pooled<T>, Error> {
        self.checkout().ok_or(Error::PoolExhausted {
            max_size: self.max_size(),
        })
    }
}

impl<P, T> ReusePool<P, T> {
    /// Returns a checked-out instance to the free list.
    ///
    /// Instances this pool did not hand out, or that were already recycled,
    /// are ignored. Returns `true` if the instance was taken back.
    pub fn recycle(&mut self, instance: Pooled<T>) -> bool {
        match self.checked_out.remove(&instance.key()) {
            Some(tracked) => {
                debug_assert!(!self.free.is_full());
                debug_assert!(!self.is_available(&tracked));
                self.free.enqueue(tracked);
                true
            }
            None => {
                trace!("ignoring recycle of an instance that is not checked out");
                false
            }
        }
    }

    /// Moves every checked-out instance back to the free list.
    ///
    /// Returns how many instances were recycled.
    pub fn recycle_all(&mut self) -> usize {
        let recycled = self.checked_out.len();
        for (_, instance) in self.checked_out.drain() {
            debug_assert!(!self.free.is_full());
            self.free.enqueue(instance);
        }
        recycled
    }

    /// Forgets every instance, free or checked out.
    ///
    /// Callers keep the handles they hold, but recycling them afterwards is
    /// a no-op.
    pub fn clear(&mut self) {
        self.free.drain().for_each(drop);
        self.checked_out.clear();
    }

    /// Returns `true` if `instance` is currently checked out of this pool.
    pub fn is_checked_out(&self, instance: &Pooled<T>) -> bool {
        self.checked_out.contains_key(&instance.key())
    }

    /// Returns `true` if `instance` is waiting in this pool's free list.
    ///
    /// An instance is never both available and checked out.
    pub fn is_available(&self, instance: &Pooled<T>) -> bool {
        self.free.iter().any(|free| free.ptr_eq(instance))
    }

    /// Gets the number of instances ready to be checked out without
    /// allocating.
    pub fn available(&self) -> usize {
        self.free.len()
    }

    /// Gets the number of instances currently checked out.
    pub fn in_use(&self) -> usize {
        self.checked_out.len()
    }

    /// Gets the maximum number of instances that may be checked out at once.
    pub fn max_size(&self) -> usize {
        self.free.capacity()
    }

    /// Returns the allocator new instances are made with.
    pub fn allocator(&self) -> &P {
        &self.allocator
    }
}
