use std::collections::HashSet;

/// Allocates names that are unique within one set.
///
/// A taken name gets the first free numeric suffix appended, so requesting
/// `aaa` three times yields `aaa`, `aaa0`, `aaa1`.
#[derive(Debug, Clone, Default)]
pub struct UniqueNames {
    taken: HashSet<String>,
}

impl UniqueNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `name`, or the first suffixed variant not yet taken.
    pub fn reserve(&mut self, name: &str) -> String {
        let mut candidate = name.to_string();
        let mut suffix = 0usize;
        while self.taken.contains(&candidate) {
            candidate = format!("{name}{suffix}");
            suffix += 1;
        }
        self.taken.insert(candidate.clone());
        candidate
    }

    pub fn contains(&self, name: &str) -> bool {
        self.taken.contains(name)
    }
}
