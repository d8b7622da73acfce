use crate::Error;
use alloc::{
    boxed::Box,
    collections::{BTreeMap, VecDeque},
    rc::Rc,
    string::String,
    sync::Arc,
    vec::Vec,
};
use core::{
    any::type_name,
    cell::{Cell, RefCell},
    ops::{Deref, DerefMut},
};
use tracing::warn;

/// A trait for producing structurally independent copies of a value.
///
/// Unlike [`Clone`], which is free to share state behind pointers, a deep
/// clone never shares anything with its source: `Rc` and `Arc` fields get
/// fresh allocations holding deep clones of their contents.
///
/// Composite types implement both methods field by field, so a field
/// that refuses a strict copy is reported to the nearest `Rc` or `Arc`,
/// which then falls back to sharing:
///
/// ```
/// use vessel::{DeepClone, Error};
///
/// struct Particle {
///     position: (f32, f32),
///     trail: Vec<(f32, f32)>,
/// }
///
/// impl DeepClone for Particle {
///     fn deep_clone(&self) -> Self {
///         Particle {
///             position: self.position.deep_clone(),
///             trail: self.trail.deep_clone(),
///         }
///     }
///
///     fn try_deep_clone(&self) -> Result<Self, Error> {
///         Ok(Particle {
///             position: self.position.try_deep_clone()?,
///             trail: self.trail.try_deep_clone()?,
///         })
///     }
/// }
/// ```
pub trait DeepClone: Sized {
    /// Returns a deep copy of `self`.
    ///
    /// This is best effort: a shared pointer whose contents cannot be copied
    /// right now (for instance a `RefCell` that is mutably borrowed) is
    /// shared with the source instead, and the rest of the value is still
    /// copied.
    fn deep_clone(&self) -> Self;

    /// Returns a deep copy of `self`, or fails with
    /// [`Error::CloneFieldUnsupported`] instead of falling back to sharing.
    ///
    /// Must not panic: implementations call `try_deep_clone` on every field
    /// and propagate the first error.
    fn try_deep_clone(&self) -> Result<Self, Error>;
}

macro_rules! impl_by_copy {
    ($($ty:ty),* $(,)?) => {
        $(
            impl DeepClone for $ty {
                #[inline(always)]
                fn deep_clone(&self) -> Self {
                    *self
                }

                #[inline(always)]
                fn try_deep_clone(&self) -> Result<Self, Error> {
                    Ok(*self)
                }
            }
        )*
    };
}

impl_by_copy!(
    (),
    bool,
    char,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    f32,
    f64,
    &'static str,
);

impl DeepClone for String {
    fn deep_clone(&self) -> Self {
        self.clone()
    }

    fn try_deep_clone(&self) -> Result<Self, Error> {
        Ok(self.clone())
    }
}

impl<T: DeepClone> DeepClone for Option<T> {
    fn deep_clone(&self) -> Self {
        self.as_ref().map(DeepClone::deep_clone)
    }

    fn try_deep_clone(&self) -> Result<Self, Error> {
        self.as_ref().map(DeepClone::try_deep_clone).transpose()
    }
}

impl<T: DeepClone> DeepClone for Box<T> {
    fn deep_clone(&self) -> Self {
        Box::new((**self).deep_clone())
    }

    fn try_deep_clone(&self) -> Result<Self, Error> {
        Ok(Box::new((**self).try_deep_clone()?))
    }
}

impl<T: DeepClone> DeepClone for Vec<T> {
    fn deep_clone(&self) -> Self {
        self.iter().map(DeepClone::deep_clone).collect()
    }

    fn try_deep_clone(&self) -> Result<Self, Error> {
        self.iter().map(DeepClone::try_deep_clone).collect()
    }
}

impl<T: DeepClone> DeepClone for VecDeque<T> {
    fn deep_clone(&self) -> Self {
        self.iter().map(DeepClone::deep_clone).collect()
    }

    fn try_deep_clone(&self) -> Result<Self, Error> {
        self.iter().map(DeepClone::try_deep_clone).collect()
    }
}

impl<K: DeepClone + Ord, V: DeepClone> DeepClone for BTreeMap<K, V> {
    fn deep_clone(&self) -> Self {
        self.iter()
            .map(|(key, value)| (key.deep_clone(), value.deep_clone()))
            .collect()
    }

    fn try_deep_clone(&self) -> Result<Self, Error> {
        self.iter()
            .map(|(key, value)| -> Result<_, Error> {
                Ok((key.try_deep_clone()?, value.try_deep_clone()?))
            })
            .collect()
    }
}

impl<T: DeepClone, const N: usize> DeepClone for [T; N] {
    fn deep_clone(&self) -> Self {
        core::array::from_fn(|i| self[i].deep_clone())
    }

    fn try_deep_clone(&self) -> Result<Self, Error> {
        let mut copies = Vec::with_capacity(N);
        for item in self {
            copies.push(item.try_deep_clone()?);
        }
        copies
            .try_into()
            .map_err(|_| Error::CloneFieldUnsupported {
                type_name: type_name::<Self>(),
            })
    }
}

macro_rules! impl_for_tuple {
    ($($name:ident: $idx:tt),+) => {
        impl<$($name: DeepClone),+> DeepClone for ($($name,)+) {
            fn deep_clone(&self) -> Self {
                ($(self.$idx.deep_clone(),)+)
            }

            fn try_deep_clone(&self) -> Result<Self, Error> {
                Ok(($(self.$idx.try_deep_clone()?,)+))
            }
        }
    };
}

impl_for_tuple!(A: 0);
impl_for_tuple!(A: 0, B: 1);
impl_for_tuple!(A: 0, B: 1, C: 2);
impl_for_tuple!(A: 0, B: 1, C: 2, D: 3);

impl<T: Copy> DeepClone for Cell<T> {
    fn deep_clone(&self) -> Self {
        Cell::new(self.get())
    }

    fn try_deep_clone(&self) -> Result<Self, Error> {
        Ok(Cell::new(self.get()))
    }
}

impl<T: DeepClone> DeepClone for RefCell<T> {
    /// # Panics
    ///
    /// Panics if the value is currently mutably borrowed, like
    /// [`RefCell::clone`] does.
    fn deep_clone(&self) -> Self {
        RefCell::new(self.borrow().deep_clone())
    }

    fn try_deep_clone(&self) -> Result<Self, Error> {
        let inner = self.try_borrow().map_err(|_| Error::CloneFieldUnsupported {
            type_name: type_name::<Self>(),
        })?;
        Ok(RefCell::new(inner.try_deep_clone()?))
    }
}

impl<T: DeepClone> DeepClone for Rc<T> {
    fn deep_clone(&self) -> Self {
        match (**self).try_deep_clone() {
            Ok(copy) => Rc::new(copy),
            Err(err) => {
                warn!(%err, "falling back to a shared copy of `{}`", type_name::<Self>());
                Rc::clone(self)
            }
        }
    }

    fn try_deep_clone(&self) -> Result<Self, Error> {
        Ok(Rc::new((**self).try_deep_clone()?))
    }
}

impl<T: DeepClone> DeepClone for Arc<T> {
    fn deep_clone(&self) -> Self {
        match (**self).try_deep_clone() {
            Ok(copy) => Arc::new(copy),
            Err(err) => {
                warn!(%err, "falling back to a shared copy of `{}`", type_name::<Self>());
                Arc::clone(self)
            }
        }
    }

    fn try_deep_clone(&self) -> Result<Self, Error> {
        Ok(Arc::new((**self).try_deep_clone()?))
    }
}

/// Wrapper that opts a field out of deep copying.
///
/// Its deep clone is a plain [`Clone`], so an `Rc` inside stays shared
/// between the source and the copy.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Shallow<T>(pub T);

impl<T: Clone> DeepClone for Shallow<T> {
    #[inline(always)]
    fn deep_clone(&self) -> Self {
        Shallow(self.0.clone())
    }

    #[inline(always)]
    fn try_deep_clone(&self) -> Result<Self, Error> {
        Ok(Shallow(self.0.clone()))
    }
}

impl<T> Deref for Shallow<T> {
    type Target = T;

    #[inline(always)]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for Shallow<T> {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}
