use std::collections::HashMap;

pub type PersonId = u32;

/// Usernames issued during one run, each mapped to the order it was issued in.
pub struct UsernameRegistry {
    map: HashMap<String, PersonId>,
}

impl UsernameRegistry {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: HashMap::with_capacity(capacity),
        }
    }

    /// Claims `username` for this run. Returns `None` when it was already taken
    /// or the id space is used up.
    pub fn try_register(&mut self, username: &str) -> Option<PersonId> {
        if self.map.contains_key(username) {
            return None;
        }
        let next = self.map.len();
        if next >= PersonId::MAX as usize {
            return None;
        }
        self.map.insert(username.to_string(), next as PersonId);
        Some(next as PersonId)
    }

    pub fn get(&self, username: &str) -> Option<PersonId> {
        self.map.get(username).copied()
    }

    pub fn contains(&self, username: &str) -> bool {
        self.map.contains_key(username)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl Default for UsernameRegistry {
    fn default() -> Self {
        Self::new()
    }
}
