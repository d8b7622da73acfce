use crate::DeepClone;

/// A trait defining how a [`ReusePool`](crate::ReusePool) manufactures
/// instances on a free-list miss.
///
/// It also provides a hook for preparing a recycled instance before it is
/// handed out again.
pub trait PoolAllocator<T> {
    /// Resets the state of a recycled object before it is checked out again.
    ///
    /// By default, this method does nothing. Override this method to provide
    /// custom reset logic.
    #[inline(always)]
    fn reset(&self, _obj: &mut T) {}

    /// Creates a new object of type T.
    fn allocate(&self) -> T;
}

/// Allocator that default-constructs every new instance.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DefaultAllocator;

impl<T: Default> PoolAllocator<T> for DefaultAllocator {
    #[inline(always)]
    fn allocate(&self) -> T {
        T::default()
    }
}

/// Allocator that deep-clones a template for every new instance.
#[derive(Debug, Clone)]
pub struct TemplateAllocator<T> {
    template: T,
}

impl<T> TemplateAllocator<T> {
    /// Creates an allocator that copies `template`.
    pub fn new(template: T) -> Self {
        TemplateAllocator { template }
    }

    /// The exemplar new instances are copied from.
    pub fn template(&self) -> &T {
        &self.template
    }
}

impl<T: DeepClone> PoolAllocator<T> for TemplateAllocator<T> {
    fn allocate(&self) -> T {
        self.template.deep_clone()
    }
}
