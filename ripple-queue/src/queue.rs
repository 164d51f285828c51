use std::fmt;
use thiserror::Error;

/// Stable handle to a node in an [`OrderedQueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    /// Slot index. Reused after removal.
    pub fn index(self) -> u32 {
        self.index
    }

    /// Generation of the slot when this handle was issued.
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}@{}", self.index, self.generation)
    }
}

/// Queue errors.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// The handle does not name a node currently in the queue.
    #[error("node {0} is not in the queue")]
    StaleNode(NodeId),
}

struct Node<T> {
    value: T,
    prev: Option<u32>,
    next: Option<u32>,
}

struct Slot<T> {
    generation: u32,
    node: Option<Node<T>>,
}

/// Active-pass token returned by [`OrderedQueue::start_pass`].
///
/// Must be handed back to [`OrderedQueue::finish_pass`].
#[derive(Debug)]
#[must_use = "a pass must be finished with `finish_pass`"]
pub struct Pass {
    slot: usize,
}

/// Ordered sequence with O(1) insert-before, append and remove by [`NodeId`].
pub struct OrderedQueue<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    head: Option<u32>,
    tail: Option<u32>,
    len: usize,
    // Per active pass: `Some(next)` where `next` is the node the pass visits
    // next; `None` once the pass finished.
    cursors: Vec<Option<Option<u32>>>,
}

impl<T> OrderedQueue<T> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
            cursors: Vec::new(),
        }
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the queue has no nodes.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// First node, or `None` if empty.
    pub fn head(&self) -> Option<NodeId> {
        self.head.map(|index| self.id_at(index))
    }

    /// Last node, or `None` if empty.
    pub fn tail(&self) -> Option<NodeId> {
        self.tail.map(|index| self.id_at(index))
    }

    /// Whether `id` names a node currently in the queue.
    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// The value stored at `id`.
    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.node(id).map(|n| &n.value)
    }

    /// The node after `id`.
    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.next.map(|index| self.id_at(index))
    }

    /// The node before `id`.
    pub fn prev(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.prev.map(|index| self.id_at(index))
    }

    /// Append at the tail.
    pub fn append(&mut self, value: T) -> NodeId {
        let index = self.alloc(value);
        self.link_before(index, None);
        self.id_at(index)
    }

    /// Insert immediately before `reference`, or at the tail when `reference`
    /// is `None`.
    pub fn insert_before(
        &mut self,
        value: T,
        reference: Option<NodeId>,
    ) -> Result<NodeId, QueueError> {
        let before = match reference {
            Some(id) => {
                self.node(id).ok_or(QueueError::StaleNode(id))?;
                Some(id.index)
            }
            None => None,
        };
        let index = self.alloc(value);
        self.link_before(index, before);
        Ok(self.id_at(index))
    }

    /// Unlink `id` and return its value. The slot's generation is bumped, so
    /// `id` is stale afterwards.
    pub fn remove(&mut self, id: NodeId) -> Result<T, QueueError> {
        self.node(id).ok_or(QueueError::StaleNode(id))?;
        let slot = &mut self.slots[id.index as usize];
        let Some(node) = slot.node.take() else {
            return Err(QueueError::StaleNode(id));
        };
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);

        match node.prev {
            Some(prev) => self.node_at_mut(prev).next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => self.node_at_mut(next).prev = node.prev,
            None => self.tail = node.prev,
        }
        for cursor in self.cursors.iter_mut().flatten() {
            if *cursor == Some(id.index) {
                *cursor = node.next;
            }
        }
        self.len -= 1;
        Ok(node.value)
    }

    /// Iterate head to tail. Borrows the queue, so nothing can be removed
    /// while iterating; use a [`Pass`] for that.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            queue: self,
            next: self.head,
            remaining: self.len,
        }
    }

    /// Visit every value head to tail.
    pub fn for_each_in_order(&self, mut f: impl FnMut(NodeId, &T)) {
        for (id, value) in self.iter() {
            f(id, value);
        }
    }

    /// Begin a mutation-tolerant pass starting at the current head.
    pub fn start_pass(&mut self) -> Pass {
        let cursor = Some(self.head);
        let slot = match self.cursors.iter().position(Option::is_none) {
            Some(slot) => {
                self.cursors[slot] = cursor;
                slot
            }
            None => {
                self.cursors.push(cursor);
                self.cursors.len() - 1
            }
        };
        tracing::trace!(pass = slot, len = self.len, "ripple.queue.pass.start");
        Pass { slot }
    }

    /// Step a pass: return the node it is on and move its cursor to that
    /// node's successor. Returns `None` once the tail has been passed.
    ///
    /// Between two calls the queue may be mutated freely. Nodes removed before
    /// the pass reaches them are never returned, and nodes inserted ahead of
    /// the node the cursor is on are not visited by this pass.
    pub fn advance(&mut self, pass: &Pass) -> Option<(NodeId, &T)> {
        let index = self.cursors.get(pass.slot).copied().flatten().flatten()?;
        let next = self.slots[index as usize].node.as_ref()?.next;
        self.cursors[pass.slot] = Some(next);
        let id = self.id_at(index);
        self.slots[index as usize]
            .node
            .as_ref()
            .map(|node| (id, &node.value))
    }

    /// End a pass and release its cursor.
    pub fn finish_pass(&mut self, pass: Pass) {
        if let Some(cursor) = self.cursors.get_mut(pass.slot) {
            *cursor = None;
        }
        while matches!(self.cursors.last(), Some(None)) {
            self.cursors.pop();
        }
        tracing::trace!(pass = pass.slot, "ripple.queue.pass.finish");
    }

    fn node(&self, id: NodeId) -> Option<&Node<T>> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    // Only called with indices of linked nodes.
    fn node_at_mut(&mut self, index: u32) -> &mut Node<T> {
        match self.slots[index as usize].node.as_mut() {
            Some(node) => node,
            None => unreachable!("linked index {index} points at a vacant slot"),
        }
    }

    fn id_at(&self, index: u32) -> NodeId {
        NodeId {
            index,
            generation: self.slots[index as usize].generation,
        }
    }

    fn alloc(&mut self, value: T) -> u32 {
        let node = Node {
            value,
            prev: None,
            next: None,
        };
        match self.free.pop() {
            Some(index) => {
                self.slots[index as usize].node = Some(node);
                index
            }
            None => {
                let index = u32::try_from(self.slots.len())
                    .unwrap_or_else(|_| panic!("ordered queue exceeded u32::MAX slots"));
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                index
            }
        }
    }

    fn link_before(&mut self, index: u32, before: Option<u32>) {
        let prev = match before {
            Some(before) => {
                let prev = self.node_at_mut(before).prev;
                self.node_at_mut(before).prev = Some(index);
                prev
            }
            None => {
                let prev = self.tail;
                self.tail = Some(index);
                prev
            }
        };
        match prev {
            Some(prev) => self.node_at_mut(prev).next = Some(index),
            None => self.head = Some(index),
        }
        let node = self.node_at_mut(index);
        node.prev = prev;
        node.next = before;
        self.len += 1;
    }
}

impl<T> Default for OrderedQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for OrderedQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter().map(|(_, v)| v)).finish()
    }
}

/// Head-to-tail iterator over `(NodeId, &T)`.
pub struct Iter<'a, T> {
    queue: &'a OrderedQueue<T>,
    next: Option<u32>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (NodeId, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.next?;
        let node = self.queue.slots[index as usize].node.as_ref()?;
        self.next = node.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some((self.queue.id_at(index), &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> IntoIterator for &'a OrderedQueue<T> {
    type Item = (NodeId, &'a T);
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
