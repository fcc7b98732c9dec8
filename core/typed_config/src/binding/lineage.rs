/*
 * Licensed to the Apache Software Foundation (ASF) under one
 * or more contributor license agreements.  See the NOTICE file
 * distributed with this work for additional information
 * regarding copyright ownership.  The ASF licenses this file
 * to you under the Apache License, Version 2.0 (the
 * "License"); you may not use this file except in compliance
 * with the License.  You may obtain a copy of the License at
 *
 *   http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing,
 * software distributed under the License is distributed on an
 * "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
 * KIND, either express or implied.  See the License for the
 * specific language governing permissions and limitations
 * under the License.
 */

//! The chain of enclosing instances a nested config was constructed under.

use std::any::{Any, TypeId, type_name};
use std::fmt::{self, Debug};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, Weak};

type SharedInstance = Weak<dyn Any + Send + Sync>;
type Deferred = Box<dyn FnOnce() + Send>;

/// Write-once slot filled with a weak reference to the instance once its
/// construction has completed.
#[derive(Clone, Default)]
pub(crate) struct InstanceSlot(Arc<OnceLock<SharedInstance>>);

impl InstanceSlot {
    pub(crate) fn publish<T: Any + Send + Sync>(&self, instance: &Arc<T>) {
        let weak: Weak<T> = Arc::downgrade(instance);
        let weak: SharedInstance = weak;
        let _ = self.0.set(weak);
    }

    fn upgrade<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.0.get()?.upgrade()?.downcast::<T>().ok()
    }

    fn is_published(&self) -> bool {
        self.0.get().is_some()
    }
}

struct Link {
    type_id: TypeId,
    type_name: &'static str,
    slot: InstanceSlot,
    parent: Option<Arc<Link>>,
    depth: usize,
}

/// Immutable, singly-linked list of the instances under construction, the
/// innermost first.
///
/// Every lineage extended from the same root shares one queue of deferred
/// work, run once the outermost instance has been published.
#[derive(Clone, Default)]
pub struct Lineage {
    head: Option<Arc<Link>>,
    deferred: Arc<Mutex<Vec<Deferred>>>,
}

impl Lineage {
    pub fn root() -> Self {
        Self::default()
    }

    /// Number of instances in the chain.
    pub fn depth(&self) -> usize {
        self.head.as_ref().map_or(0, |link| link.depth)
    }

    /// Extends the chain with an instance of `T` about to be constructed.
    pub(crate) fn enter<T: Any>(&self) -> (Lineage, InstanceSlot) {
        let slot = InstanceSlot::default();
        let link = Link {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            slot: slot.clone(),
            parent: self.head.clone(),
            depth: self.depth() + 1,
        };
        (
            Lineage {
                head: Some(Arc::new(link)),
                deferred: Arc::clone(&self.deferred),
            },
            slot,
        )
    }

    /// The chain without its innermost instance.
    pub fn enclosing(&self) -> Lineage {
        Lineage {
            head: self.head.as_ref().and_then(|link| link.parent.clone()),
            deferred: Arc::clone(&self.deferred),
        }
    }

    /// Queues `work` until [`Lineage::run_deferred`] is called on any lineage
    /// sharing this root.
    pub(crate) fn defer(&self, work: impl FnOnce() + Send + 'static) {
        self.queue().push(Box::new(work));
    }

    /// Runs queued work in the order it was queued, including work queued
    /// while running.
    pub(crate) fn run_deferred(&self) {
        loop {
            let batch = std::mem::take(&mut *self.queue());
            if batch.is_empty() {
                return;
            }
            for work in batch {
                work();
            }
        }
    }

    fn queue(&self) -> MutexGuard<'_, Vec<Deferred>> {
        self.deferred.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn links(&self) -> impl Iterator<Item = &Link> {
        std::iter::successors(self.head.as_deref(), |link| link.parent.as_deref())
    }

    fn find<T: Any>(&self) -> Option<InstanceSlot> {
        let wanted = TypeId::of::<T>();
        self.links()
            .find(|link| link.type_id == wanted)
            .map(|link| link.slot.clone())
    }

    /// Type names in the chain, innermost first.
    pub fn type_names(&self) -> Vec<&'static str> {
        self.links().map(|link| link.type_name).collect()
    }
}

impl Debug for Lineage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.type_names()).finish()
    }
}

/// Non-owning reference to the nearest enclosing instance of `T`.
///
/// Absent when the config was not constructed under a `T`. The instance is
/// readable once its own materialization has completed, and only while
/// something else keeps it alive.
pub struct Parent<T> {
    slot: Option<InstanceSlot>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> Parent<T> {
    pub fn absent() -> Self {
        Self {
            slot: None,
            _marker: PhantomData,
        }
    }

    /// Finds the nearest `T` in `lineage`, starting at its innermost entry.
    pub fn resolve(lineage: &Lineage) -> Self {
        Self {
            slot: lineage.find::<T>(),
            _marker: PhantomData,
        }
    }

    pub fn get(&self) -> Option<Arc<T>> {
        self.slot.as_ref()?.upgrade()
    }

    /// True when an enclosing `T` exists in the chain, even if it is not yet
    /// readable.
    pub fn is_linked(&self) -> bool {
        self.slot.is_some()
    }
}

impl<T> Clone for Parent<T> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Any + Send + Sync> Default for Parent<T> {
    fn default() -> Self {
        Self::absent()
    }
}

impl<T> Debug for Parent<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.slot {
            None => "absent",
            Some(slot) if slot.is_published() => "linked",
            Some(_) => "pending",
        };
        write!(f, "Parent<{}>({state})", type_name::<T>())
    }
}

// Back-references never take part in equality or hashing of the owner.
impl<T> PartialEq for Parent<T> {
    fn eq(&self, _: &Self) -> bool {
        true
    }
}

impl<T> Eq for Parent<T> {}

impl<T> Hash for Parent<T> {
    fn hash<H: Hasher>(&self, _: &mut H) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Root;
    struct Child;

    #[test]
    fn finds_the_nearest_enclosing_type() {
        let (root_lineage, root_slot) = Lineage::root().enter::<Root>();
        let (child_lineage, _) = root_lineage.enter::<Child>();
        assert_eq!(child_lineage.depth(), 2);
        assert_eq!(child_lineage.type_names().len(), 2);

        let parent = Parent::<Root>::resolve(&child_lineage.enclosing());
        assert!(parent.is_linked());
        assert!(parent.get().is_none());

        let root = Arc::new(Root);
        root_slot.publish(&root);
        let found = parent.get().expect("root published");
        assert!(Arc::ptr_eq(&found, &root));
    }

    #[test]
    fn deferred_work_is_shared_across_the_chain() {
        let (root_lineage, _) = Lineage::root().enter::<Root>();
        let (child_lineage, _) = root_lineage.enter::<Child>();
        let order = Arc::new(Mutex::new(Vec::new()));

        let first = Arc::clone(&order);
        child_lineage.defer(move || first.lock().expect("lock").push("child"));
        let second = Arc::clone(&order);
        root_lineage.defer(move || second.lock().expect("lock").push("root"));

        assert!(order.lock().expect("lock").is_empty());
        root_lineage.run_deferred();
        assert_eq!(*order.lock().expect("lock"), vec!["child", "root"]);
    }

    #[test]
    fn missing_ancestor_is_absent() {
        let (lineage, _) = Lineage::root().enter::<Child>();
        let parent = Parent::<Root>::resolve(&lineage.enclosing());
        assert!(!parent.is_linked());
        assert!(parent.get().is_none());
    }

    #[test]
    fn dropped_ancestor_is_no_longer_readable() {
        let (lineage, slot) = Lineage::root().enter::<Root>();
        let parent = Parent::<Root>::resolve(&lineage);
        let root = Arc::new(Root);
        slot.publish(&root);
        drop(root);
        assert!(parent.get().is_none());
    }
}
