use std::{fmt, marker::PhantomData, ptr};

use crate::snode::{SLink, SNode};

/// A position in an [`SList`](crate::SList)
///
/// Either the sentinel (`before_begin()`), an element, or the end (`end()`).
/// A position never owns the node it refers to: it is a plain copyable
/// address, `IS_CONST` selects read-only ([`ConstPosition`]) or read-write
/// ([`Position`]) access to the element.
///
/// A position referring to a node is invalidated when that node is erased,
/// or when its list is dropped, cleared, moved from or moved in memory
/// (`before_begin()` lives inside the list value). Using an invalidated
/// position is undefined behavior, hence the `unsafe` accessors.
///
/// Once the list has been borrowed mutably, a `before_begin()` position may
/// only be compared or handed back to that list (`insert_after`,
/// `erase_after`), take a fresh one to walk from the sentinel.
pub struct Pos<T, const IS_CONST: bool> {
    pub(crate) link: *mut SLink,
    _marker: PhantomData<*const T>,
}

/// Read-write position
pub type Position<T> = Pos<T, false>;
/// Read-only position
pub type ConstPosition<T> = Pos<T, true>;

impl<T, const IS_CONST: bool> Pos<T, IS_CONST> {
    #[inline(always)]
    pub(crate) const fn from_link(link: *mut SLink) -> Self {
        Self {
            link,
            _marker: PhantomData,
        }
    }

    /// The end position, shared by every list of `T`
    #[inline(always)]
    pub const fn end() -> Self {
        Self::from_link(ptr::null_mut())
    }

    /// Returns `true` when `self` is the end position
    #[inline(always)]
    pub fn is_end(&self) -> bool {
        self.link.is_null()
    }

    /// Returns a reference to the element at `self`
    ///
    /// # Safety
    ///  `self` must be a live element: not `end()`, not `before_begin()`,
    ///  not erased. The lifetime `'a` is chosen by the caller and must not
    ///  outlive the element nor overlap a mutable access to it.
    #[inline(always)]
    pub unsafe fn as_ref<'a>(&self) -> &'a T {
        debug_assert!(!self.is_end());
        SNode::<T>::value_ref(self.link)
    }

    /// Moves `self` to its successor (prefix increment)
    ///
    /// # Safety
    ///  `self` must not be `end()` and must still be valid
    #[inline(always)]
    pub unsafe fn advance(&mut self) -> &mut Self {
        debug_assert!(!self.is_end());
        self.link = (*self.link).get_next();
        self
    }

    /// Moves `self` to its successor and returns the previous position
    /// (postfix increment)
    ///
    /// # Safety
    ///  Same as [`Pos::advance`]
    #[inline(always)]
    pub unsafe fn post_advance(&mut self) -> Self {
        let old = *self;
        self.advance();
        old
    }

    /// Returns the successor of `self`
    ///
    /// # Safety
    ///  Same as [`Pos::advance`]
    #[inline(always)]
    pub unsafe fn next(mut self) -> Self {
        self.advance();
        self
    }
}

impl<T> Position<T> {
    /// Returns a mutable reference to the element at `self`
    ///
    /// # Safety
    ///  Same as [`Pos::as_ref`], and no other reference to the element may
    ///  exist during `'a`
    #[inline(always)]
    pub unsafe fn as_mut<'a>(&self) -> &'a mut T {
        debug_assert!(!self.is_end());
        SNode::<T>::value_mut(self.link)
    }

    /// Converts to a read-only position referring to the same node
    #[inline(always)]
    pub fn to_const(self) -> ConstPosition<T> {
        ConstPosition::from_link(self.link)
    }
}

impl<T> From<Position<T>> for ConstPosition<T> {
    #[inline(always)]
    fn from(pos: Position<T>) -> Self {
        pos.to_const()
    }
}

impl<T, const IS_CONST: bool> Clone for Pos<T, IS_CONST> {
    #[inline(always)]
    fn clone(&self) -> Self {
        *self
    }
}
impl<T, const IS_CONST: bool> Copy for Pos<T, IS_CONST> {}

impl<T, const A: bool, const B: bool> PartialEq<Pos<T, B>> for Pos<T, A> {
    #[inline(always)]
    fn eq(&self, other: &Pos<T, B>) -> bool {
        ptr::eq(self.link, other.link)
    }
}
impl<T, const IS_CONST: bool> Eq for Pos<T, IS_CONST> {}

impl<T, const IS_CONST: bool> fmt::Debug for Pos<T, IS_CONST> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = if IS_CONST { "ConstPosition" } else { "Position" };
        if self.is_end() {
            write!(f, "{name}(end)")
        } else {
            write!(f, "{name}({:p})", self.link)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    // 1 -> 2 -> end
    fn chain() -> (*mut SLink, *mut SLink) {
        let second = SNode::alloc(2, ptr::null_mut());
        let first = SNode::alloc(1, second);
        (first, second)
    }

    fn free_chain((first, second): (*mut SLink, *mut SLink)) {
        unsafe {
            SNode::<i32>::free(first);
            SNode::<i32>::free(second);
        }
    }

    #[test]
    fn test_end() {
        let end = Position::<i32>::end();
        assert!(end.is_end());
        assert_eq!(end, Position::<i32>::end());
        assert_eq!(end, ConstPosition::<i32>::end());
        assert_eq!(format!("{end:?}"), "Position(end)");
        assert_eq!(format!("{:?}", end.to_const()), "ConstPosition(end)");
    }

    #[test]
    fn test_walk() {
        let nodes = chain();
        let mut it = Position::<i32>::from_link(nodes.0);
        unsafe {
            assert_eq!(*it.as_ref(), 1);
            let old = it.post_advance();
            assert_eq!(*old.as_ref(), 1);
            assert_eq!(*it.as_ref(), 2);
            assert_eq!(old.next(), it);
            *it.as_mut() = 20;
            assert_eq!(*old.next().as_ref(), 20);
            assert!(it.advance().is_end());
        }
        assert_eq!(it, Position::end());
        free_chain(nodes);
    }

    #[test]
    fn test_conversion() {
        let nodes = chain();
        let it = Position::<i32>::from_link(nodes.0);
        let cit: ConstPosition<i32> = it.into();
        assert_eq!(cit, it);
        assert_eq!(it, cit);
        assert_ne!(cit, ConstPosition::end());
        unsafe {
            assert_eq!(*cit.as_ref(), 1);
            assert_eq!(cit.next(), it.next());
        }
        let copy = cit;
        assert_eq!(copy, cit);
        free_chain(nodes);
    }
}
