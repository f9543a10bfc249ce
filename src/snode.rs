use std::ptr;

/// Link-only node
///
/// Used as the list sentinel (owned by value by [`SList`](crate::SList)) and
/// as the header of every [`SNode`]. A null `next` is the end of the chain.
pub(crate) struct SLink {
    next: *mut SLink,
}

impl SLink {
    pub(crate) const fn new() -> SLink {
        Self {
            next: ptr::null_mut(),
        }
    }

    #[inline(always)]
    pub(crate) fn get_next(&self) -> *mut SLink {
        self.next
    }

    #[inline(always)]
    pub(crate) fn set_next(&mut self, next: *mut SLink) {
        self.next = next;
    }

    /// Detaches and returns the whole chain following `self`
    #[inline(always)]
    pub(crate) fn take_next(&mut self) -> *mut SLink {
        std::mem::replace(&mut self.next, ptr::null_mut())
    }

    /// Returns `true` when `self` is the last link of its chain
    #[inline(always)]
    pub(crate) fn is_last(&self) -> bool {
        self.next.is_null()
    }
}

/// A value node: an [`SLink`] header followed by one element
///
/// `repr(C)` keeps the link at offset 0 so a `*mut SLink` obtained from
/// [`SNode::alloc`] can be cast back to its node.
#[repr(C)]
pub(crate) struct SNode<T> {
    link: SLink,
    value: T,
}

impl<T> SNode<T> {
    /// Allocates a node holding `value` and linked to `next`
    ///
    /// # Returns
    ///  * the address of the node's link, owned by the caller
    #[inline]
    pub(crate) fn alloc(value: T, next: *mut SLink) -> *mut SLink {
        let node = Box::into_raw(Box::new(SNode {
            link: SLink { next },
            value,
        }));
        on_alloc();
        node.cast::<SLink>()
    }

    /// Frees a node and returns its value
    ///
    /// # Safety
    ///  `link` must come from [`SNode::<T>::alloc`], be unlinked and not freed yet
    #[inline]
    pub(crate) unsafe fn free(link: *mut SLink) -> T {
        debug_assert!(!link.is_null());
        let node = Box::from_raw(link.cast::<SNode<T>>());
        on_free();
        node.value
    }

    /// # Safety
    ///  `link` must be the link of a live `SNode<T>`, borrow rules are handled by the caller
    #[inline(always)]
    pub(crate) unsafe fn value_ref<'a>(link: *const SLink) -> &'a T {
        &(*link.cast::<SNode<T>>()).value
    }

    /// # Safety
    ///  `link` must be the link of a live `SNode<T>`, borrow rules are handled by the caller
    #[inline(always)]
    pub(crate) unsafe fn value_mut<'a>(link: *mut SLink) -> &'a mut T {
        &mut (*link.cast::<SNode<T>>()).value
    }
}

cfg_if::cfg_if! {
    if #[cfg(any(test, feature = "alloc-stats"))] {
        use std::cell::Cell;

        thread_local! {
            static ALLOCATED: Cell<usize> = const { Cell::new(0) };
            static FREED: Cell<usize> = const { Cell::new(0) };
        }

        #[inline(always)]
        fn on_alloc() {
            ALLOCATED.with(|count| count.set(count.get() + 1));
        }
        #[inline(always)]
        fn on_free() {
            FREED.with(|count| count.set(count.get() + 1));
        }

        /// Node allocation counters of the calling thread
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct AllocStats {
            /// Nodes allocated since the thread started
            pub allocated: usize,
            /// Nodes freed since the thread started
            pub freed: usize,
        }

        impl AllocStats {
            /// Nodes currently alive on this thread
            pub fn live(&self) -> usize {
                self.allocated.saturating_sub(self.freed)
            }

            /// Counter deltas between `earlier` and `self`, zero when `earlier`
            /// was taken after `self`
            pub fn since(&self, earlier: &AllocStats) -> AllocStats {
                AllocStats {
                    allocated: self.allocated.saturating_sub(earlier.allocated),
                    freed: self.freed.saturating_sub(earlier.freed),
                }
            }
        }

        /// Returns the node allocation counters of the calling thread
        pub fn alloc_stats() -> AllocStats {
            AllocStats {
                allocated: ALLOCATED.with(Cell::get),
                freed: FREED.with(Cell::get),
            }
        }
    } else {
        #[inline(always)]
        fn on_alloc() {}
        #[inline(always)]
        fn on_free() {}
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_alloc_free() {
        let before = alloc_stats();
        let b = SNode::alloc(String::from("b"), ptr::null_mut());
        let a = SNode::alloc(String::from("a"), b);

        unsafe {
            assert_eq!((*a).get_next(), b);
            assert!((*b).is_last());
            assert_eq!(SNode::<String>::value_ref(a), "a");
            SNode::<String>::value_mut(b).push('!');
            assert_eq!(SNode::<String>::value_ref(b), "b!");
        }
        assert_eq!(alloc_stats().since(&before).allocated, 2);

        unsafe {
            assert_eq!((*a).take_next(), b);
            assert!((*a).is_last());
            assert_eq!(SNode::<String>::free(a), "a");
            assert_eq!(SNode::<String>::free(b), "b!");
        }
        let delta = alloc_stats().since(&before);
        assert_eq!(delta, AllocStats { allocated: 2, freed: 2 });
        assert_eq!(delta.live(), 0);
    }

    #[test]
    fn test_since_order() {
        let before = alloc_stats();
        let node = SNode::alloc(1u32, ptr::null_mut());
        let after = alloc_stats();
        assert_eq!(before.since(&after), AllocStats::default());
        assert_eq!(after.since(&before).allocated, 1);
        assert_eq!(unsafe { SNode::<u32>::free(node) }, 1);
    }

    #[test]
    fn test_sentinel() {
        let mut sentinel = SLink::new();
        assert!(sentinel.is_last());
        let node = SNode::alloc(7u8, ptr::null_mut());
        sentinel.set_next(node);
        assert!(!sentinel.is_last());
        let node = sentinel.take_next();
        assert!(sentinel.is_last());
        assert_eq!(unsafe { SNode::<u8>::free(node) }, 7);
    }
}
