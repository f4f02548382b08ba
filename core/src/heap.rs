//! Fibonacci heap with decrease-key handles.
//!
//! Arena-backed: nodes live in a `Vec<Slot<K, V>>` and are addressed by
//! index rather than by `Rc<RefCell<_>>` pointers, trading pointer chasing
//! for a stable integer that survives any amount of internal tree
//! restructuring. A [`Handle`] is such an index; it is cleared to a
//! sentinel on extraction.

use std::fmt;

/// A stable reference to a live heap entry. `Copy` — handles are cheap to
/// carry around and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handle(usize);

/// Misuse of the handle API: a stale/extracted handle, or an attempted
/// key increase via `decrease_key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapError {
    /// The handle refers to a slot that has already been extracted.
    StaleHandle,
    /// `decrease_key` was called with a key greater than the current one.
    KeyNotDecreasing { current: f64, requested: f64 },
    /// `insert`/`decrease_key` was given a `NaN` key.
    NotANumber,
}

impl fmt::Display for HeapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaleHandle => write!(f, "handle refers to an already-extracted entry"),
            Self::KeyNotDecreasing { current, requested } => write!(
                f,
                "decrease_key requires requested <= current, got current={current} requested={requested}"
            ),
            Self::NotANumber => write!(f, "NaN is not a valid heap key"),
        }
    }
}

impl std::error::Error for HeapError {}

struct Slot<V> {
    key: f64,
    value: Option<V>,
    parent: Option<usize>,
    child: Option<usize>,
    left: usize,
    right: usize,
    degree: u32,
    mark: bool,
    alive: bool,
}

/// A collection of heap-ordered trees with marks, amortised O(1) insert
/// and decrease-key, O(log n) extract-min.
pub struct FibonacciHeap<V> {
    slots: Vec<Slot<V>>,
    min: Option<usize>,
    size: usize,
}

impl<V> Default for FibonacciHeap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> FibonacciHeap<V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            min: None,
            size: 0,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Insert `value` with the given key. Degenerate keys: `NaN` is
    /// rejected; `+inf`/`-inf` are admitted.
    pub fn insert(&mut self, key: f64, value: V) -> Result<Handle, HeapError> {
        if key.is_nan() {
            return Err(HeapError::NotANumber);
        }
        let idx = self.slots.len();
        self.slots.push(Slot {
            key,
            value: Some(value),
            parent: None,
            child: None,
            left: idx,
            right: idx,
            degree: 0,
            mark: false,
            alive: true,
        });
        self.splice_into_root_list(idx);
        self.size += 1;
        match self.min {
            None => self.min = Some(idx),
            Some(m) if key < self.slots[m].key => self.min = Some(idx),
            Some(_) => {}
        }
        tracing::trace!(key, "fibonacci heap insert");
        Ok(Handle(idx))
    }

    /// Lower the key of a live entry. Fails if `new_key` is greater than
    /// the current key or the handle is stale.
    pub fn decrease_key(&mut self, handle: Handle, new_key: f64) -> Result<(), HeapError> {
        if new_key.is_nan() {
            return Err(HeapError::NotANumber);
        }
        let idx = handle.0;
        let slot = self
            .slots
            .get(idx)
            .filter(|s| s.alive)
            .ok_or(HeapError::StaleHandle)?;
        if new_key > slot.key {
            return Err(HeapError::KeyNotDecreasing {
                current: slot.key,
                requested: new_key,
            });
        }
        self.slots[idx].key = new_key;
        let parent = self.slots[idx].parent;
        if let Some(p) = parent {
            if new_key < self.slots[p].key {
                self.cut(idx, p);
                self.cascading_cut(p);
            }
        }
        if let Some(m) = self.min {
            if new_key < self.slots[m].key {
                self.min = Some(idx);
            }
        }
        tracing::trace!(new_key, "fibonacci heap decrease_key");
        Ok(())
    }

    /// Remove and return the entry with the smallest key. `None` when
    /// empty.
    pub fn extract_min(&mut self) -> Option<(f64, V)> {
        let z = self.min?;
        // Promote every child of z to the root list.
        if let Some(mut c) = self.slots[z].child {
            loop {
                let next = self.slots[c].right;
                self.slots[c].parent = None;
                self.remove_from_list(c);
                self.splice_into_root_list(c);
                if next == c || Some(next) == self.slots[z].child {
                    break;
                }
                c = next;
            }
        }
        let z_right = self.slots[z].right;
        self.remove_from_list(z);
        self.slots[z].alive = false;
        let value = self.slots[z].value.take();
        self.size -= 1;

        if self.size == 0 {
            self.min = None;
        } else {
            let start = if z_right != z { z_right } else { self.first_live_root() };
            self.min = start;
            self.consolidate();
        }
        let key = self.slots[z].key;
        tracing::trace!(key, "fibonacci heap extract_min");
        value.map(|v| (key, v))
    }

    fn first_live_root(&self) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.alive && s.parent.is_none())
    }

    /// Merge roots of equal degree using an auxiliary array sized by
    /// `ceil(log_phi(size))`.
    fn consolidate(&mut self) {
        let Some(start) = self.min else { return };
        let max_degree = (self.size as f64).ln() / 1.618_f64.ln();
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        let table_size = max_degree.ceil() as usize + 2;
        let mut degree_table: Vec<Option<usize>> = vec![None; table_size];

        let mut roots = Vec::new();
        let mut cur = start;
        loop {
            roots.push(cur);
            cur = self.slots[cur].right;
            if cur == start {
                break;
            }
        }

        for mut x in roots {
            let mut d = self.slots[x].degree as usize;
            while let Some(y) = degree_table[d] {
                let (mut a, mut b) = (x, y);
                if self.slots[b].key < self.slots[a].key {
                    std::mem::swap(&mut a, &mut b);
                }
                self.link(b, a);
                degree_table[d] = None;
                x = a;
                d = self.slots[x].degree as usize;
                if d >= degree_table.len() {
                    degree_table.resize(d + 1, None);
                }
            }
            if d >= degree_table.len() {
                degree_table.resize(d + 1, None);
            }
            degree_table[d] = Some(x);
        }

        self.min = None;
        for slot in degree_table.into_iter().flatten() {
            match self.min {
                None => self.min = Some(slot),
                Some(m) if self.slots[slot].key < self.slots[m].key => self.min = Some(slot),
                Some(_) => {}
            }
        }
    }

    /// Make `child` a child of `parent` (both currently roots).
    fn link(&mut self, child: usize, parent: usize) {
        self.remove_from_list(child);
        self.slots[child].left = child;
        self.slots[child].right = child;
        self.slots[child].parent = Some(parent);
        self.slots[child].mark = false;
        match self.slots[parent].child {
            None => {
                self.slots[parent].child = Some(child);
            }
            Some(existing) => {
                self.insert_into_list(child, existing);
            }
        }
        self.slots[parent].degree += 1;
    }

    fn cut(&mut self, x: usize, parent: usize) {
        if self.slots[parent].child == Some(x) {
            let right = self.slots[x].right;
            self.slots[parent].child = if right == x { None } else { Some(right) };
        }
        self.slots[parent].degree = self.slots[parent].degree.saturating_sub(1);
        self.remove_from_list(x);
        self.slots[x].parent = None;
        self.slots[x].mark = false;
        self.slots[x].left = x;
        self.slots[x].right = x;
        let min = self.min.expect("cut only called on a non-empty heap");
        self.splice_into_root_list_at(x, min);
    }

    fn cascading_cut(&mut self, x: usize) {
        if let Some(parent) = self.slots[x].parent {
            if self.slots[x].mark {
                self.cut(x, parent);
                self.cascading_cut(parent);
            } else {
                self.slots[x].mark = true;
            }
        }
    }

    fn splice_into_root_list(&mut self, idx: usize) {
        match self.min {
            None => {
                self.slots[idx].left = idx;
                self.slots[idx].right = idx;
            }
            Some(m) => self.splice_into_root_list_at(idx, m),
        }
    }

    fn splice_into_root_list_at(&mut self, idx: usize, existing: usize) {
        self.insert_into_list(idx, existing);
    }

    /// Insert `idx` (a singleton circular list of one) into the circular
    /// list that `existing` belongs to.
    fn insert_into_list(&mut self, idx: usize, existing: usize) {
        let existing_left = self.slots[existing].left;
        self.slots[idx].right = existing;
        self.slots[idx].left = existing_left;
        self.slots[existing_left].right = idx;
        self.slots[existing].left = idx;
    }

    /// Remove `idx` from whatever circular doubly-linked list it is in.
    fn remove_from_list(&mut self, idx: usize) {
        let (left, right) = (self.slots[idx].left, self.slots[idx].right);
        if left == idx && right == idx {
            return;
        }
        self.slots[left].right = right;
        self.slots[right].left = left;
    }
}
