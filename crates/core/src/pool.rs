// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource pool with a FIFO wait list
//!
//! A [`Pool`] hands out [`Pooled`] guards. Dropping a guard returns the
//! resource; if requesters are waiting, the resource goes straight to the
//! oldest one instead of the free list. The pool is the only structure
//! mutated by several flows, so every allocate/free/wait step runs under its
//! lock.

use std::collections::VecDeque;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, MutexGuard};

type Waiter<R> = Box<dyn FnOnce(Pooled<R>) + Send>;

struct PoolState<R> {
    free: Vec<R>,
    waiters: VecDeque<Waiter<R>>,
}

struct PoolInner<R> {
    name: String,
    capacity: usize,
    state: Mutex<PoolState<R>>,
}

/// A shared pool of reusable resources
pub struct Pool<R> {
    inner: Arc<PoolInner<R>>,
}

impl<R> Clone for Pool<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Outcome of an allocation that may have to wait
pub enum Allocation<R, M> {
    /// A resource was free; the item comes back untouched
    Ready(Pooled<R>, M),
    /// The item now sits on the wait list with its continuation
    Queued,
}

impl<R: Send + 'static> Pool<R> {
    pub fn new(name: impl Into<String>, resources: impl IntoIterator<Item = R>) -> Self {
        let free: Vec<R> = resources.into_iter().collect();
        Self {
            inner: Arc::new(PoolInner {
                name: name.into(),
                capacity: free.len(),
                state: Mutex::new(PoolState {
                    free,
                    waiters: VecDeque::new(),
                }),
            }),
        }
    }

    /// Take a free resource without waiting
    pub fn try_allocate(&self) -> Option<Pooled<R>> {
        let resource = self.lock().free.pop()?;
        tracing::trace!(pool = %self.inner.name, "allocated");
        Some(Pooled::new(resource, self.clone()))
    }

    /// Allocate immediately, or park `item` with `resume` on the wait list.
    ///
    /// The free-list check and the enqueue are one atomic step, so a release
    /// can never slip between them and leave the waiter stranded.
    pub fn allocate_or_wait<M, F>(&self, item: M, resume: F) -> Allocation<R, M>
    where
        M: Send + 'static,
        F: FnOnce(Pooled<R>, M) + Send + 'static,
    {
        let mut state = self.lock();
        if let Some(resource) = state.free.pop() {
            drop(state);
            tracing::trace!(pool = %self.inner.name, "allocated");
            return Allocation::Ready(Pooled::new(resource, self.clone()), item);
        }
        state
            .waiters
            .push_back(Box::new(move |resource| resume(resource, item)));
        tracing::debug!(
            pool = %self.inner.name,
            waiting = state.waiters.len(),
            "pool exhausted, request queued"
        );
        Allocation::Queued
    }

    /// Register a continuation that runs as soon as a resource is available.
    ///
    /// Runs `waiter` right away when a resource is already free.
    pub fn enqueue_waiter(&self, waiter: impl FnOnce(Pooled<R>) + Send + 'static) {
        if let Allocation::Ready(resource, waiter) =
            self.allocate_or_wait(waiter, |resource, waiter| waiter(resource))
        {
            waiter(resource);
        }
    }
}

impl<R> Pool<R> {
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Resources currently on the free list
    pub fn available(&self) -> usize {
        self.lock().free.len()
    }

    /// Requesters queued for a resource
    pub fn waiting(&self) -> usize {
        self.lock().waiters.len()
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    fn release(&self, resource: R) {
        let mut state = self.lock();
        match state.waiters.pop_front() {
            Some(waiter) => {
                drop(state);
                tracing::debug!(pool = %self.inner.name, "resource handed to waiter");
                waiter(Pooled::new(resource, self.clone()));
            }
            None => {
                state.free.push(resource);
                tracing::trace!(pool = %self.inner.name, "resource returned");
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, PoolState<R>> {
        self.inner.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<R> fmt::Debug for Pool<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("name", &self.inner.name)
            .field("capacity", &self.inner.capacity)
            .finish()
    }
}

/// An allocated resource; dropping it gives the resource back to its pool
pub struct Pooled<R> {
    // Only taken in `drop`
    resource: Option<R>,
    pool: Pool<R>,
}

impl<R> Pooled<R> {
    fn new(resource: R, pool: Pool<R>) -> Self {
        Self {
            resource: Some(resource),
            pool,
        }
    }

    /// Name of the pool this resource returns to
    pub fn pool_name(&self) -> &str {
        self.pool.name()
    }
}

impl<R> Deref for Pooled<R> {
    type Target = R;

    fn deref(&self) -> &R {
        match &self.resource {
            Some(resource) => resource,
            None => unreachable!("pooled resource accessed after release"),
        }
    }
}

impl<R> DerefMut for Pooled<R> {
    fn deref_mut(&mut self) -> &mut R {
        match &mut self.resource {
            Some(resource) => resource,
            None => unreachable!("pooled resource accessed after release"),
        }
    }
}

impl<R> Drop for Pooled<R> {
    fn drop(&mut self) {
        if let Some(resource) = self.resource.take() {
            self.pool.release(resource);
        }
    }
}

impl<R: fmt::Debug> fmt::Debug for Pooled<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pooled").field(&self.resource).finish()
    }
}

/// Payloads that can receive a resource from `allocate_and_call`
pub trait Attach<R> {
    fn attach(&mut self, resource: Pooled<R>);
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
