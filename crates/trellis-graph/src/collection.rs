//! Validated collections: sets with vetoable mutation and post-mutation hooks.
//!
//! A [`ValidatedCollection`] is a uniqueness-by-identity set whose `add` and
//! `delete` run in three phases:
//!
//! 1. every `before_*` callback, in registration order, until one rejects;
//! 2. the structural change;
//! 3. every `after_*` callback, in registration order.
//!
//! Callbacks receive `&mut C`, the host that owns the collection (for node
//! adjacency this is the whole [`Graph`](crate::Graph)), so they may inspect
//! or mutate anything reachable from it. Because the collection lives inside
//! its host, mutation is driven through a [`Locate`] projection rather than
//! `&mut self`: the protocol re-locates the collection between callbacks and
//! never holds a borrow across one.

use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use indexmap::{IndexMap, IndexSet};
use trellis_core::{Channel, ReentrancyPolicy};

use crate::error::{GraphError, Result};

/// Reason reported when an add is vetoed without an explicit reason.
pub const DEFAULT_ADD_REJECTION: &str =
    "Failed to add item to set: validation failed on one of the callbacks";

/// Reason reported when a delete is vetoed without an explicit reason.
pub const DEFAULT_DELETE_REJECTION: &str =
    "Failed to delete item from set: validation failed on one of the callbacks";

/// Outcome of a `before_*` callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    /// Veto with the collection's default reason.
    Reject,
    /// Veto with a descriptive reason.
    RejectWith(String),
}

impl Verdict {
    pub fn reject(reason: impl Into<String>) -> Self {
        Self::RejectWith(reason.into())
    }

    pub fn is_accept(&self) -> bool {
        matches!(self, Self::Accept)
    }

    fn into_result(self, default_reason: &str) -> Result<()> {
        match self {
            Self::Accept => Ok(()),
            Self::Reject => Err(GraphError::Validation {
                reason: default_reason.to_string(),
            }),
            Self::RejectWith(reason) => Err(GraphError::Validation { reason }),
        }
    }
}

impl From<bool> for Verdict {
    fn from(allowed: bool) -> Self {
        if allowed {
            Self::Accept
        } else {
            Self::Reject
        }
    }
}

/// A `before_*` callback.
pub type ValidateHook<T, C> = Rc<dyn Fn(&mut C, &T) -> Verdict>;

/// An `after_*` callback.
pub type NotifyHook<T, C> = Rc<dyn Fn(&mut C, &T)>;

/// Token returned by registration; pass it to [`ValidatedCollection::off`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookHandle {
    channel: Channel,
    id: u64,
}

impl HookHandle {
    pub fn channel(&self) -> Channel {
        self.channel
    }
}

/// Projects a collection out of its host context.
///
/// Implemented for every `Fn(&mut C) -> &mut ValidatedCollection<T, C>`, so
/// a plain function such as `fn items(host: &mut Host) -> &mut ...` works.
pub trait Locate<T, C> {
    fn locate<'a>(&self, ctx: &'a mut C) -> &'a mut ValidatedCollection<T, C>;
}

impl<T, C, F> Locate<T, C> for F
where
    F: Fn(&mut C) -> &mut ValidatedCollection<T, C>,
{
    fn locate<'a>(&self, ctx: &'a mut C) -> &'a mut ValidatedCollection<T, C> {
        self(ctx)
    }
}

/// Uniqueness-by-identity set with interceptable add/remove.
pub struct ValidatedCollection<T, C> {
    members: IndexSet<T>,
    before_add: IndexMap<u64, ValidateHook<T, C>>,
    after_add: IndexMap<u64, NotifyHook<T, C>>,
    before_delete: IndexMap<u64, ValidateHook<T, C>>,
    after_delete: IndexMap<u64, NotifyHook<T, C>>,
    next_hook: u64,
    policy: ReentrancyPolicy,
    depth: usize,
}

impl<T, C> ValidatedCollection<T, C>
where
    T: Clone + Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_policy(ReentrancyPolicy::default())
    }

    pub fn with_policy(policy: ReentrancyPolicy) -> Self {
        Self {
            members: IndexSet::new(),
            before_add: IndexMap::new(),
            after_add: IndexMap::new(),
            before_delete: IndexMap::new(),
            after_delete: IndexMap::new(),
            next_hook: 0,
            policy,
            depth: 0,
        }
    }

    // ── Mutation protocol ────────────────────────────────────────

    /// Add `value` to the collection located inside `ctx`.
    ///
    /// Fails with [`GraphError::Validation`] if a `before_add` callback
    /// rejects; the collection is then untouched. On success `after_add`
    /// callbacks run even when `value` was already a member.
    pub fn add<L>(ctx: &mut C, locate: L, value: T) -> Result<()>
    where
        L: Locate<T, C>,
    {
        locate.locate(ctx).enter("add")?;
        let result = Self::add_in_flight(ctx, &locate, value);
        locate.locate(ctx).leave();
        result
    }

    /// Delete `value` from the collection located inside `ctx`.
    ///
    /// Returns whether membership changed. `after_delete` callbacks only run
    /// when it did.
    pub fn delete<L>(ctx: &mut C, locate: L, value: &T) -> Result<bool>
    where
        L: Locate<T, C>,
    {
        locate.locate(ctx).enter("delete")?;
        let result = Self::delete_in_flight(ctx, &locate, value);
        locate.locate(ctx).leave();
        result
    }

    fn add_in_flight<L: Locate<T, C>>(ctx: &mut C, locate: &L, value: T) -> Result<()> {
        let validators: Vec<_> = locate.locate(ctx).before_add.values().cloned().collect();
        for hook in validators {
            hook(ctx, &value).into_result(DEFAULT_ADD_REJECTION)?;
        }

        locate.locate(ctx).members.insert(value.clone());

        let notifiers: Vec<_> = locate.locate(ctx).after_add.values().cloned().collect();
        for hook in notifiers {
            hook(ctx, &value);
        }
        Ok(())
    }

    fn delete_in_flight<L: Locate<T, C>>(ctx: &mut C, locate: &L, value: &T) -> Result<bool> {
        let validators: Vec<_> = locate.locate(ctx).before_delete.values().cloned().collect();
        for hook in validators {
            hook(ctx, value).into_result(DEFAULT_DELETE_REJECTION)?;
        }

        let removed = locate.locate(ctx).members.shift_remove(value);

        if removed {
            let notifiers: Vec<_> = locate.locate(ctx).after_delete.values().cloned().collect();
            for hook in notifiers {
                hook(ctx, value);
            }
        }
        Ok(removed)
    }

    fn enter(&mut self, operation: &'static str) -> Result<()> {
        if self.policy == ReentrancyPolicy::Reject && self.depth > 0 {
            return Err(GraphError::Reentrant { operation });
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Whether an add or delete on this collection is currently running.
    pub fn is_in_flight(&self) -> bool {
        self.depth > 0
    }

    // ── Raw access for compensation ──────────────────────────────

    /// Insert without running any callback.
    pub(crate) fn insert_raw(&mut self, value: T) -> bool {
        self.members.insert(value)
    }

    /// Remove without running any callback.
    pub(crate) fn remove_raw(&mut self, value: &T) -> bool {
        self.members.shift_remove(value)
    }

    pub(crate) fn after_add_hooks(&self) -> Vec<NotifyHook<T, C>> {
        self.after_add.values().cloned().collect()
    }

    pub(crate) fn after_delete_hooks(&self) -> Vec<NotifyHook<T, C>> {
        self.after_delete.values().cloned().collect()
    }

    // ── Registration ─────────────────────────────────────────────

    pub fn on_before_add<F>(&mut self, hook: F) -> HookHandle
    where
        F: Fn(&mut C, &T) -> Verdict + 'static,
    {
        let id = self.next_id();
        self.before_add.insert(id, Rc::new(hook));
        HookHandle {
            channel: Channel::BeforeAdd,
            id,
        }
    }

    pub fn on_after_add<F>(&mut self, hook: F) -> HookHandle
    where
        F: Fn(&mut C, &T) + 'static,
    {
        let id = self.next_id();
        self.after_add.insert(id, Rc::new(hook));
        HookHandle {
            channel: Channel::AfterAdd,
            id,
        }
    }

    pub fn on_before_delete<F>(&mut self, hook: F) -> HookHandle
    where
        F: Fn(&mut C, &T) -> Verdict + 'static,
    {
        let id = self.next_id();
        self.before_delete.insert(id, Rc::new(hook));
        HookHandle {
            channel: Channel::BeforeDelete,
            id,
        }
    }

    pub fn on_after_delete<F>(&mut self, hook: F) -> HookHandle
    where
        F: Fn(&mut C, &T) + 'static,
    {
        let id = self.next_id();
        self.after_delete.insert(id, Rc::new(hook));
        HookHandle {
            channel: Channel::AfterDelete,
            id,
        }
    }

    /// Unregister a callback. Returns `false` if it was already removed.
    pub fn off(&mut self, handle: HookHandle) -> bool {
        match handle.channel {
            Channel::BeforeAdd => self.before_add.shift_remove(&handle.id).is_some(),
            Channel::AfterAdd => self.after_add.shift_remove(&handle.id).is_some(),
            Channel::BeforeDelete => self.before_delete.shift_remove(&handle.id).is_some(),
            Channel::AfterDelete => self.after_delete.shift_remove(&handle.id).is_some(),
        }
    }

    /// Drop every callback on every channel.
    pub(crate) fn clear_hooks(&mut self) {
        self.before_add.clear();
        self.after_add.clear();
        self.before_delete.clear();
        self.after_delete.clear();
    }

    /// Number of callbacks registered on a channel.
    pub fn hook_count(&self, channel: Channel) -> usize {
        match channel {
            Channel::BeforeAdd => self.before_add.len(),
            Channel::AfterAdd => self.after_add.len(),
            Channel::BeforeDelete => self.before_delete.len(),
            Channel::AfterDelete => self.after_delete.len(),
        }
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_hook;
        self.next_hook += 1;
        id
    }

    // ── Set views ────────────────────────────────────────────────

    pub fn contains(&self, value: &T) -> bool {
        self.members.contains(value)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> indexmap::set::Iter<'_, T> {
        self.members.iter()
    }

    /// Owned copy of the current members, stable against later mutation.
    pub fn snapshot(&self) -> Vec<T> {
        self.members.iter().cloned().collect()
    }
}

impl<T, C> Default for ValidatedCollection<T, C>
where
    T: Clone + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T, C> IntoIterator for &'a ValidatedCollection<T, C>
where
    T: Clone + Eq + Hash,
{
    type Item = &'a T;
    type IntoIter = indexmap::set::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, C> fmt::Debug for ValidatedCollection<T, C>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatedCollection")
            .field("members", &self.members)
            .field("before_add", &self.before_add.len())
            .field("after_add", &self.after_add.len())
            .field("before_delete", &self.before_delete.len())
            .field("after_delete", &self.after_delete.len())
            .field("policy", &self.policy)
            .finish()
    }
}
