use std::collections::HashMap;

/// Immutable per-class descriptor, fixed at load time.
#[derive(Debug, Clone)]
pub struct PiClassDescriptor {
    pub pid: i32,
    pub cost: i64,
    pub care_lits: Vec<i32>,
    pub qform: String,
    pub has_const: u32,
    pub has_all_const: bool,
}

impl PiClassDescriptor {
    pub fn new(
        pid: i32,
        cost: i64,
        care_lits: Vec<i32>,
        qform: String,
        has_const: u32,
        has_all_const: bool,
    ) -> Result<Self, String> {
        if pid <= 0 {
            return Err(format!("pid must be positive, got {pid}"));
        }
        if cost <= 0 {
            return Err(format!("cost must be positive, got {cost}"));
        }
        if care_lits.is_empty() {
            return Err("care_lits must be non-empty".to_string());
        }
        if care_lits.iter().any(|&l| l == 0) {
            return Err("care_lits must not contain 0".to_string());
        }
        Ok(PiClassDescriptor {
            pid,
            cost,
            care_lits,
            qform,
            has_const,
            has_all_const,
        })
    }
}

/// `val` of §3: which half of the cover a class currently occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    NotSelected,
    Unassigned,
    Selected,
}

/// Mutable per-class state, touched by inference rules, `decide`, and
/// `backtrack`.
#[derive(Debug, Clone)]
pub struct PiClassState {
    pub val: Assignment,
    pub decided: bool,
    pub coverage: u64,
}

/// Holds every class's immutable descriptor plus its mutable state,
/// indexed both by load order and by `pid`.
#[derive(Default)]
pub struct PiClassStore {
    descriptors: Vec<PiClassDescriptor>,
    state: Vec<PiClassState>,
    index_of_pid: HashMap<i32, usize>,
    max_care: i32,
}

impl PiClassStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a class, returning its store index. Fails on a duplicate pid.
    pub fn push(&mut self, descriptor: PiClassDescriptor) -> Result<usize, String> {
        if self.index_of_pid.contains_key(&descriptor.pid) {
            return Err(format!("duplicate pid {}", descriptor.pid));
        }
        let max_lit = descriptor.care_lits.iter().map(|l| l.unsigned_abs() as i32).max().unwrap_or(0);
        self.max_care = self.max_care.max(max_lit);
        let idx = self.descriptors.len();
        self.index_of_pid.insert(descriptor.pid, idx);
        self.state.push(PiClassState {
            val: Assignment::Unassigned,
            decided: false,
            coverage: descriptor.cost as u64,
        });
        self.descriptors.push(descriptor);
        Ok(idx)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Largest literal magnitude across every class's `care_lits`; the
    /// external propagator observes variables `1..=max_care`.
    pub fn max_care(&self) -> i32 {
        self.max_care
    }

    pub fn index_of(&self, pid: i32) -> Option<usize> {
        self.index_of_pid.get(&pid).copied()
    }

    pub fn descriptor(&self, idx: usize) -> &PiClassDescriptor {
        &self.descriptors[idx]
    }

    pub fn state(&self, idx: usize) -> &PiClassState {
        &self.state[idx]
    }

    pub fn state_mut(&mut self, idx: usize) -> &mut PiClassState {
        &mut self.state[idx]
    }

    pub fn indices(&self) -> impl Iterator<Item = usize> {
        0..self.descriptors.len()
    }

    pub fn total_cost(&self) -> i64 {
        self.descriptors.iter().map(|d| d.cost).sum()
    }
}
