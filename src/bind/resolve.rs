//! Indirection layers and the types resolving to no target at all.

#[cfg(target_has_atomic = "ptr")]
use alloc::sync::Arc;
use alloc::{boxed::Box, collections::BTreeMap, rc::Rc};
use core::{any::type_name, str::FromStr};

use super::{BoxError, Decode, DecodeText, Shape, Target};

impl<T: Decode + Default> Decode for Option<T> {
    fn shape(&self) -> Shape {
        match self {
            Some(value) => value.shape(),
            None => T::default().shape(),
        }
    }

    fn target(&mut self) -> Target<'_> {
        self.get_or_insert_with(T::default).target()
    }
}

/// Boxes resolve through the value they hold, so a `Box<dyn Decode>`
/// decodes as its concrete type.
impl<T: Decode + ?Sized> Decode for Box<T> {
    fn shape(&self) -> Shape {
        (**self).shape()
    }

    fn target(&mut self) -> Target<'_> {
        (**self).target()
    }

    fn type_name(&self) -> &'static str {
        (**self).type_name()
    }
}

/// Shared values are writable only while uniquely owned.
impl<T: Decode + ?Sized> Decode for Rc<T> {
    fn shape(&self) -> Shape {
        if Rc::strong_count(self) == 1 && Rc::weak_count(self) == 0 {
            (**self).shape()
        } else {
            Shape::ReadOnly
        }
    }

    fn target(&mut self) -> Target<'_> {
        match Rc::get_mut(self) {
            Some(value) => value.target(),
            None => Target::ReadOnly,
        }
    }

    fn type_name(&self) -> &'static str {
        (**self).type_name()
    }
}

#[cfg(target_has_atomic = "ptr")]
impl<T: Decode + ?Sized> Decode for Arc<T> {
    fn shape(&self) -> Shape {
        if Arc::strong_count(self) == 1 && Arc::weak_count(self) == 0 {
            (**self).shape()
        } else {
            Shape::ReadOnly
        }
    }

    fn target(&mut self) -> Target<'_> {
        match Arc::get_mut(self) {
            Some(value) => value.target(),
            None => Target::ReadOnly,
        }
    }

    fn type_name(&self) -> &'static str {
        (**self).type_name()
    }
}

macro_rules! unsupported {
    ($($ty:ty $(where $($param:ident),+)?;)*) => {
        $(
            impl$(<$($param),+>)? Decode for $ty {
                fn shape(&self) -> Shape {
                    Shape::Unsupported
                }

                fn target(&mut self) -> Target<'_> {
                    Target::Unsupported
                }
            }
        )*
    };
}

unsupported! {
    ();
    bool;
    BTreeMap<K, V> where K, V;
}

#[cfg(feature = "std")]
unsupported! {
    std::collections::HashMap<K, V, S> where K, V, S;
}

/// Decodes any [`FromStr`] type from a node's trimmed text rendering.
///
/// ```
/// #[derive(Debug, Default, Decode)]
/// struct Release {
///     #[query("time/@datetime")]
///     published: Parsed<Date>,
/// }
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Parsed<T>(pub T);

impl<T> DecodeText for Parsed<T>
where
    T: FromStr,
    T::Err: core::error::Error + Send + Sync + 'static,
{
    fn decode_text(&mut self, text: &str) -> Result<(), BoxError> {
        self.0 = text.trim().parse()?;
        Ok(())
    }
}

impl<T> Decode for Parsed<T>
where
    T: FromStr,
    T::Err: core::error::Error + Send + Sync + 'static,
{
    fn shape(&self) -> Shape {
        Shape::Hook
    }

    fn target(&mut self) -> Target<'_> {
        Target::Text(self)
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }
}
