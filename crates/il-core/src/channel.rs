use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use crate::error::Error;
use crate::geom::Size;
use crate::pixel::Pixel;

/// One reference-counted, type-homogeneous pixel plane (row-major,
/// `width * height` elements).
///
/// `Clone` is shallow: both handles alias the same pixels and a mutation
/// through one is visible through every other holder. Exclusive ownership
/// is only ever established by an explicit [`ChannelBuffer::detach`] —
/// copy-on-write happens by request, never automatically, because channel
/// composition (`append`, `replace_channel`) intentionally relies on cheap
/// aliasing.
///
/// The handle is `Rc`-based and therefore single-threaded; handing a
/// shared plane across a thread boundary is a compile error rather than a
/// data race. Callers that need an isolated plane call `detach` first.
#[derive(Debug, Clone)]
pub struct ChannelBuffer<T> {
    size: Size,
    data: Rc<RefCell<Box<[T]>>>,
}

impl<T: Pixel> ChannelBuffer<T> {
    /// Zero-filled plane.
    pub fn new(size: Size) -> Self {
        Self {
            size,
            data: Rc::new(RefCell::new(
                vec![T::default(); size.area()].into_boxed_slice(),
            )),
        }
    }

    /// Adopts caller-provided pixels; the length must match `size`.
    pub fn from_vec(size: Size, data: Vec<T>) -> Result<Self, Error> {
        if data.len() != size.area() {
            return Err(Error::SizeMismatch {
                expected: size.area(),
                actual: data.len(),
            });
        }
        Ok(Self {
            size,
            data: Rc::new(RefCell::new(data.into_boxed_slice())),
        })
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn len(&self) -> usize {
        self.size.area()
    }

    pub fn is_empty(&self) -> bool {
        self.size.is_empty()
    }

    /// Read guard over the pixels.
    ///
    /// Panics if a write guard on the same plane is live; container and
    /// filter entry points reject aliased source/destination pairs before
    /// taking guards.
    pub fn read(&self) -> Ref<'_, [T]> {
        Ref::map(self.data.borrow(), |b| &b[..])
    }

    /// Write guard over the pixels.
    pub fn write(&self) -> RefMut<'_, [T]> {
        RefMut::map(self.data.borrow_mut(), |b| &mut b[..])
    }

    /// Replaces the shared allocation with a private deep copy.
    ///
    /// Always copies, even when this handle is already the only holder;
    /// detecting that case is a caller optimization, not part of the
    /// contract.
    pub fn detach(&mut self) {
        let copy = self.data.borrow().clone();
        self.data = Rc::new(RefCell::new(copy));
    }

    /// True when at least one other handle aliases this plane.
    pub fn is_shared(&self) -> bool {
        Rc::strong_count(&self.data) > 1
    }

    /// True when both handles point at the same allocation.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.data, &b.data)
    }

    /// Address of the shared allocation. Stable across clones and changed
    /// by [`ChannelBuffer::detach`]; usable for alias checks between
    /// planes of different element types.
    pub fn data_ptr(&self) -> *const () {
        Rc::as_ptr(&self.data) as *const ()
    }

    pub fn fill(&self, value: T) {
        for v in self.write().iter_mut() {
            *v = value;
        }
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.read().to_vec()
    }

    /// Independent deep copy, leaving this handle untouched.
    pub fn duplicate(&self) -> Self {
        Self {
            size: self.size,
            data: Rc::new(RefCell::new(self.data.borrow().clone())),
        }
    }
}
