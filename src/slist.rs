use std::{cell::UnsafeCell, fmt, iter::FusedIterator, marker::PhantomData, ptr};

use crate::{
    error::{Result, SListError},
    position::{ConstPosition, Position},
    snode::{SLink, SNode},
};

/// A singly linked list with a "before the first element" sentinel
///
/// The sentinel is stored inline; every element lives in its own node,
/// exclusively owned by the list. Positions ([`Position`],
/// [`ConstPosition`]) address nodes for `insert_after`/`erase_after`, the
/// safe iterators ([`SList::iter`], [`SList::iter_mut`]) cover plain
/// traversal.
pub struct SList<T> {
    // Accessed through `head.get()` only: `before_begin()` positions hold that address.
    head: UnsafeCell<SLink>,
    _phantom: PhantomData<Box<SNode<T>>>,
}

unsafe impl<T: Send> Send for SList<T> {}
unsafe impl<T: Sync> Sync for SList<T> {}

impl<T> Drop for SList<T> {
    #[inline]
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T> Default for SList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SList<T> {
    /// Returns a new empty list
    pub const fn new() -> Self {
        Self {
            head: UnsafeCell::new(SLink::new()),
            _phantom: PhantomData,
        }
    }

    #[inline(always)]
    fn sentinel(&self) -> *mut SLink {
        self.head.get()
    }

    #[inline(always)]
    fn first(&self) -> *mut SLink {
        unsafe { (*self.sentinel()).get_next() }
    }

    /// Returns `true` if the list is empty
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.cbegin() == self.cend()
    }

    /// Position of the sentinel, never dereferenceable
    #[inline(always)]
    pub fn before_begin(&self) -> Position<T> {
        Position::from_link(self.sentinel())
    }
    #[inline(always)]
    pub fn cbefore_begin(&self) -> ConstPosition<T> {
        ConstPosition::from_link(self.sentinel())
    }

    /// Position of the first element, `end()` when empty
    #[inline(always)]
    pub fn begin(&self) -> Position<T> {
        Position::from_link(self.first())
    }
    #[inline(always)]
    pub fn cbegin(&self) -> ConstPosition<T> {
        ConstPosition::from_link(self.first())
    }

    #[inline(always)]
    pub fn end(&self) -> Position<T> {
        Position::end()
    }
    #[inline(always)]
    pub fn cend(&self) -> ConstPosition<T> {
        ConstPosition::end()
    }

    /// Maps a sentinel address held by a position to a pointer derived from
    /// the current borrow of `self`, other links are returned as is
    #[inline(always)]
    fn resolve(&self, link: *mut SLink) -> *mut SLink {
        if ptr::eq(link, self.sentinel()) {
            self.sentinel()
        } else {
            link
        }
    }

    // Link helpers take `&self` and write through `head.get()`. No `&mut self`
    // reborrow may sit between deriving a sentinel pointer and using it.

    /// Links a new node holding `value` right after `at`
    ///
    /// # Safety
    ///  `at` must be the sentinel (as returned by `resolve`) or a live node of `self`
    #[inline]
    unsafe fn link_after(&self, at: *mut SLink, value: T) -> *mut SLink {
        let node = SNode::alloc(value, (*at).get_next());
        (*at).set_next(node);
        node
    }

    /// Unlinks the node following `at` and returns its value with the new
    /// successor of `at`
    ///
    /// # Safety
    ///  `at` must be the sentinel (as returned by `resolve`) or a live node of
    ///  `self`, and must have a successor
    #[inline]
    unsafe fn unlink_after(&self, at: *mut SLink) -> (T, *mut SLink) {
        let victim = (*at).get_next();
        debug_assert!(!victim.is_null());
        let next = (*victim).take_next();
        (*at).set_next(next);
        (SNode::<T>::free(victim), next)
    }

    #[inline]
    unsafe fn erase_after_unchecked(&self, pos: ConstPosition<T>) -> Position<T> {
        let (value, next) = self.unlink_after(pos.link);
        drop(value);
        Position::from_link(next)
    }

    fn take_front(&mut self) -> Option<T> {
        if self.is_empty() {
            None
        } else {
            Some(unsafe { self.unlink_after(self.sentinel()) }.0)
        }
    }

    fn last_link(&self) -> *mut SLink {
        let mut it = self.sentinel();
        unsafe {
            while !(*it).is_last() {
                it = (*it).get_next();
            }
        }
        it
    }

    /// Returns `true` when `pos` is `before_begin()`, an element of `self` or `end()`
    fn owns(&self, pos: ConstPosition<T>) -> bool {
        let mut it = self.cbefore_begin();
        loop {
            if it == pos {
                return true;
            }
            if it.is_end() {
                return false;
            }
            unsafe { it.advance() };
        }
    }

    /// Inserts `value` right after `pos`
    ///
    /// # Returns
    ///  * `Ok(position)` of the new element, whose successor is the former successor of `pos`
    ///  * `Err(SListError::InvalidPosition)` when `pos == end()`, nothing is inserted
    /// # Safety
    ///  `pos` must be `end()`, `before_begin()` or a live element of `self`
    /// # Complexity
    ///  * O(1)
    pub unsafe fn insert_after(
        &mut self,
        pos: impl Into<ConstPosition<T>>,
        value: T,
    ) -> Result<Position<T>> {
        let pos = pos.into();
        if pos.is_end() {
            return Err(SListError::invalid_position("SList::insert_after"));
        }
        debug_assert!(self.owns(pos), "SList::insert_after: foreign position");
        let at = self.resolve(pos.link);
        Ok(Position::from_link(self.link_after(at, value)))
    }

    /// Removes the element right after `pos`
    ///
    /// Only positions on the removed element are invalidated.
    ///
    /// # Returns
    ///  * `Ok(position)` of the element now following `pos`
    ///  * `Err(SListError::InvalidPosition)` when `pos == end()` or `pos` has no
    ///    successor, nothing is removed
    /// # Safety
    ///  `pos` must be `end()`, `before_begin()` or a live element of `self`
    /// # Complexity
    ///  * O(1)
    pub unsafe fn erase_after(&mut self, pos: impl Into<ConstPosition<T>>) -> Result<Position<T>> {
        let pos = pos.into();
        if pos.is_end() {
            return Err(SListError::invalid_position("SList::erase_after"));
        }
        debug_assert!(self.owns(pos), "SList::erase_after: foreign position");
        let pos = ConstPosition::from_link(self.resolve(pos.link));
        if (*pos.link).is_last() {
            return Err(SListError::invalid_position("SList::erase_after"));
        }
        Ok(self.erase_after_unchecked(pos))
    }

    /// Adds `value` at the front of the list
    ///
    /// # Complexity
    ///  * O(1)
    pub fn push_front(&mut self, value: T) -> Position<T> {
        Position::from_link(unsafe { self.link_after(self.sentinel(), value) })
    }

    /// Removes the front element
    ///
    /// # Returns
    ///  * `Ok(position)` of the new front (`end()` when the list became empty)
    ///  * `Err(SListError::InvalidPosition)` when `self.is_empty()`
    /// # Complexity
    ///  * O(1)
    pub fn pop_front(&mut self) -> Result<Position<T>> {
        unsafe { self.erase_after(self.cbefore_begin()) }
    }

    pub fn front(&self) -> Option<&T> {
        let first = self.cbegin();
        if first.is_end() {
            None
        } else {
            Some(unsafe { first.as_ref() })
        }
    }

    pub fn front_mut(&mut self) -> Option<&mut T> {
        let first = self.begin();
        if first.is_end() {
            None
        } else {
            Some(unsafe { first.as_mut() })
        }
    }

    /// Removes every element
    ///
    /// # Complexity
    ///  * O(n)
    pub fn clear(&mut self) {
        while self.take_front().is_some() {}
    }

    /// Moves the whole chain out of `self` into a new list, `self` is left empty
    ///
    /// # Complexity
    ///  * O(1)
    pub fn take(&mut self) -> SList<T> {
        let list = SList::new();
        unsafe { (*list.sentinel()).set_next((*self.sentinel()).take_next()) };
        list
    }

    /// Drops the elements of `self` then takes over the chain of `src`,
    /// `src` is left empty
    ///
    /// # Complexity
    ///  * O(n) in the length of `self`, O(1) in the length of `src`
    pub fn move_from(&mut self, src: &mut SList<T>) {
        if !self.is_empty() {
            log::trace!("SList::move_from: dropping previous elements");
            self.clear();
        }
        unsafe { (*self.sentinel()).set_next((*src.sentinel()).take_next()) };
    }

    /// Exchanges the elements of `self` and `other`
    ///
    /// # Complexity
    ///  * O(1)
    pub fn swap(&mut self, other: &mut SList<T>) {
        unsafe { ptr::swap(self.sentinel(), other.sentinel()) };
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            pos: self.first(),
            _phantom: PhantomData,
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut {
            pos: self.first(),
            _phantom: PhantomData,
        }
    }
}

impl<T: PartialEq> SList<T> {
    /// Returns the position of the first element equal to `value`, `end()` if none
    ///
    /// # Complexity
    ///  * O(n)
    pub fn find(&self, value: &T) -> Position<T> {
        let mut it = self.begin();
        while !it.is_end() {
            if unsafe { it.as_ref() } == value {
                break;
            }
            unsafe { it.advance() };
        }
        it
    }

    pub fn cfind(&self, value: &T) -> ConstPosition<T> {
        self.find(value).to_const()
    }

    /// Same as [`SList::find`]: the scan starts at `begin()` whatever `_from` is
    pub fn find_from(&self, value: &T, _from: impl Into<ConstPosition<T>>) -> Position<T> {
        self.find(value)
    }

    pub fn contains(&self, value: &T) -> bool {
        self.iter().any(|element| element == value)
    }

    /// Removes every element equal to `value`
    ///
    /// # Returns
    ///  * the number of removed elements
    /// # Complexity
    ///  * O(n)
    pub fn erase_by_value(&mut self, value: &T) -> usize {
        let mut erased = 0;
        let mut it = self.cbefore_begin();
        let mut next = unsafe { it.next() };
        while !next.is_end() {
            if unsafe { next.as_ref() } == value {
                next = unsafe { self.erase_after_unchecked(it) }.to_const();
                erased += 1;
            } else {
                unsafe {
                    it.advance();
                    next.advance();
                }
            }
        }
        erased
    }
}

impl<T: Clone> SList<T> {
    /// Makes `self` a copy of `src`, reusing the nodes `self` already owns
    ///
    /// Elements present on both sides are overwritten in place
    /// (`T::clone_from`), then the tail of `self` is either extended with the
    /// remaining elements of `src` or truncated.
    ///
    /// # Complexity
    ///  * O(max(n, m)) with only |n - m| allocations or frees
    pub fn assign_from(&mut self, src: &SList<T>) {
        let (mut reused, mut allocated, mut freed) = (0usize, 0usize, 0usize);
        let mut lit = self.before_begin();
        let mut rit = src.cbefore_begin();
        unsafe {
            while !lit.next().is_end() && !rit.next().is_end() {
                lit.advance();
                rit.advance();
                lit.as_mut().clone_from(rit.as_ref());
                reused += 1;
            }
            rit.advance();
            if !rit.is_end() {
                while !rit.is_end() {
                    lit = Position::from_link(self.link_after(lit.link, rit.as_ref().clone()));
                    rit.advance();
                    allocated += 1;
                }
            } else {
                while !lit.next().is_end() {
                    self.erase_after_unchecked(lit.to_const());
                    freed += 1;
                }
            }
        }
        log::trace!("SList::assign_from: {reused} reused, {allocated} allocated, {freed} freed");
    }
}

impl<T: Clone> Clone for SList<T> {
    fn clone(&self) -> Self {
        let copy = SList::new();
        let mut tail = copy.sentinel();
        for value in self.iter() {
            tail = unsafe { copy.link_after(tail, value.clone()) };
        }
        copy
    }

    fn clone_from(&mut self, source: &Self) {
        self.assign_from(source);
    }
}

impl<T> Extend<T> for SList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let mut tail = self.last_link();
        for value in iter {
            tail = unsafe { self.link_after(tail, value) };
        }
    }
}

impl<T> FromIterator<T> for SList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = SList::new();
        list.extend(iter);
        list
    }
}

impl<T: PartialEq> PartialEq for SList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}
impl<T: Eq> Eq for SList<T> {}

impl<T: fmt::Debug> fmt::Debug for SList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

pub struct Iter<'a, T> {
    pos: *const SLink,
    _phantom: PhantomData<&'a T>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos.is_null() {
            None
        } else {
            let current = self.pos;
            unsafe {
                self.pos = (*current).get_next();
                Some(SNode::<T>::value_ref(current))
            }
        }
    }
}
impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            pos: self.pos,
            _phantom: PhantomData,
        }
    }
}

pub struct IterMut<'a, T> {
    pos: *mut SLink,
    _phantom: PhantomData<&'a mut T>,
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos.is_null() {
            None
        } else {
            let current = self.pos;
            unsafe {
                self.pos = (*current).get_next();
                Some(SNode::<T>::value_mut(current))
            }
        }
    }
}
impl<T> FusedIterator for IterMut<'_, T> {}

pub struct IntoIter<T>(SList<T>);

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.take_front()
    }
}
impl<T> FusedIterator for IntoIter<T> {}

impl<T> IntoIterator for SList<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter(self)
    }
}

impl<'a, T> IntoIterator for &'a SList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut SList<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
