//! Depth-first traversal of lexical scopes.
//!
//! The visitor keeps the chain of entries from the unit root down to the
//! current entry as stack-allocated links, so asking "which scopes contain
//! this entry" costs no heap until a match is found and the chain is copied
//! out.

use crate::die::Die;
use crate::error::{Error, ErrorKind};

/// Steering decision returned by visitor callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Descend into the entry's children.
    Continue,
    /// Skip this entry's subtree, continue with its siblings.
    SkipChildren,
    /// Stop the whole traversal immediately.
    Abort,
}

/// One link of the parent chain handed to visitor callbacks.
///
/// `parent` walks towards the unit root; the root link has no parent.
pub struct DieChain<'c, 'a, 'data> {
    pub die: Die<'a, 'data>,
    pub parent: Option<&'c DieChain<'c, 'a, 'data>>,
}

impl<'c, 'a, 'data> DieChain<'c, 'a, 'data> {
    /// Number of links from here up to and including the root.
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut link = self.parent;
        while let Some(chain) = link {
            depth += 1;
            link = chain.parent;
        }
        depth
    }
}

/// Visits the children of `root.die` depth-first.
///
/// `pre` runs when an entry is reached and steers the traversal; `post`, if
/// given, runs after the entry's subtree. `depth` is the chain length handed
/// to callbacks for `root`'s direct children and grows by one per level.
/// Returns whether a callback aborted; the abort unwinds without further
/// callback invocations.
pub fn visit_scopes<'a, 'data>(
    depth: usize,
    root: &DieChain<'_, 'a, 'data>,
    pre: &mut dyn FnMut(usize, &DieChain<'_, 'a, 'data>) -> Result<Visit, Error>,
    post: Option<&mut dyn FnMut(usize, &DieChain<'_, 'a, 'data>) -> Result<Visit, Error>>,
) -> Result<bool, Error> {
    // The callback is reborrowed anew on every loop iteration (both for the
    // recursive descent and for the post-order call below), which the borrow
    // checker cannot verify is sound for a self-recursive function taking a
    // `&mut dyn Trait` parameter (rust-lang/rust#54663). We know each reborrow
    // is used and dropped before the next is created, so we thread the
    // callback through as a raw pointer and reconstitute the `&mut` on each
    // use; this has no effect on behavior, only on what the borrow checker
    // can see.
    let post_ptr: Option<*mut (dyn FnMut(usize, &DieChain<'_, 'a, 'data>) -> Result<Visit, Error> + '_)> =
        post.map(|callback| callback as *mut _);

    let mut child = match root.die.first_child() {
        Ok(die) => die,
        Err(err) if err.kind() == ErrorKind::NoEntry => return Ok(false),
        Err(err) => return Err(err),
    };

    loop {
        let link = DieChain {
            die: child.clone(),
            parent: Some(root),
        };

        match pre(depth, &link)? {
            Visit::Abort => return Ok(true),
            Visit::SkipChildren => {}
            Visit::Continue => {
                let reborrowed = post_ptr.map(|callback| unsafe { &mut *callback });
                if visit_scopes(depth + 1, &link, pre, reborrowed)? {
                    return Ok(true);
                }
            }
        }

        if let Some(callback) = post_ptr {
            if unsafe { (&mut *callback)(depth, &link) }? == Visit::Abort {
                return Ok(true);
            }
        }

        child = match link.die.next_sibling() {
            Ok(die) => die,
            Err(err) if err.kind() == ErrorKind::NoEntry => return Ok(false),
            Err(err) => return Err(err),
        };
    }
}

impl<'a, 'data> Die<'a, 'data> {
    /// Collects the scope entries containing this entry, innermost first;
    /// the unit root is the last element.
    ///
    /// Reports `NoEntry` when the entry is not reachable from its unit
    /// root (including the root itself, which has no containing scope
    /// chain).
    pub fn scopes(&self) -> Result<Vec<Die<'a, 'data>>, Error> {
        let root = DieChain {
            die: self.cu_die(),
            parent: None,
        };
        let target = self.offset();

        let mut found: Option<Vec<Die<'a, 'data>>> = None;
        let mut pre = |depth: usize, chain: &DieChain<'_, 'a, 'data>| {
            if chain.die.offset() != target {
                return Ok(Visit::Continue);
            }
            let mut scopes = Vec::with_capacity(depth);
            let mut link = Some(chain);
            while let Some(current) = link {
                scopes.push(current.die.clone());
                link = current.parent;
            }
            debug_assert_eq!(scopes.len(), depth);
            found = Some(scopes);
            Ok(Visit::Abort)
        };

        visit_scopes(2, &root, &mut pre, None)?;
        found.ok_or_else(|| ErrorKind::NoEntry.into())
    }
}
