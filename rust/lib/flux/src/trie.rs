use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Pattern trie used both for subscriptions and request routing.
///
/// Levels are separated by `/`. Two wildcards are understood:
/// - `+` consumes exactly one level
/// - `#` consumes every remaining level, including none; it must be last
///
/// ```ignore
/// let trie = Trie::new();
/// trie.insert("comments/+", 1);
/// trie.insert("#", 2);
/// assert_eq!(trie.match_topic("comments/p1"), vec![1, 2]);
/// ```
pub struct Trie<T> {
    root: RwLock<Node<T>>,
}

struct Node<T> {
    children: HashMap<String, Node<T>>,
    one: Option<Box<Node<T>>>,
    rest: Vec<T>,
    values: Vec<T>,
}

impl<T> Default for Node<T> {
    fn default() -> Self {
        Self {
            children: HashMap::new(),
            one: None,
            rest: Vec::new(),
            values: Vec::new(),
        }
    }
}

impl<T: Clone> Trie<T> {
    pub fn new() -> Self {
        Self {
            root: RwLock::new(Node::default()),
        }
    }

    pub fn insert(&self, pattern: &str, value: T) {
        let mut root = self.root.write().unwrap_or_else(PoisonError::into_inner);
        root.insert(pattern, value);
    }

    /// All values whose pattern matches the concrete `topic`.
    ///
    /// Order: exact branches first, then `+`, then `#`, depth-first.
    pub fn match_topic(&self, topic: &str) -> Vec<T> {
        let root = self.root.read().unwrap_or_else(PoisonError::into_inner);
        let mut out = Vec::new();
        root.collect(topic, &mut out);
        out
    }

    /// Drop the values stored under exactly `pattern` that satisfy `pred`.
    pub fn remove<F>(&self, pattern: &str, pred: F) -> bool
    where
        F: Fn(&T) -> bool,
    {
        let mut root = self.root.write().unwrap_or_else(PoisonError::into_inner);
        match root.slot_mut(pattern) {
            Some(slot) => {
                let before = slot.len();
                slot.retain(|v| !pred(v));
                slot.len() < before
            }
            None => false,
        }
    }

    /// True if a value is registered under exactly `pattern`.
    pub fn has_pattern(&self, pattern: &str) -> bool {
        let root = self.root.read().unwrap_or_else(PoisonError::into_inner);
        root.slot(pattern).is_some_and(|slot| !slot.is_empty())
    }
}

impl<T: Clone> Default for Trie<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Node<T> {
    fn insert(&mut self, pattern: &str, value: T) {
        if pattern.is_empty() {
            self.values.push(value);
            return;
        }
        let (head, tail) = split_level(pattern);
        match head {
            "#" => self.rest.push(value),
            "+" => self.one.get_or_insert_with(Box::default).insert(tail, value),
            seg => self
                .children
                .entry(seg.to_string())
                .or_default()
                .insert(tail, value),
        }
    }

    fn collect(&self, topic: &str, out: &mut Vec<T>) {
        if topic.is_empty() {
            out.extend(self.values.iter().cloned());
            out.extend(self.rest.iter().cloned());
            return;
        }
        let (head, tail) = split_level(topic);
        if let Some(child) = self.children.get(head) {
            child.collect(tail, out);
        }
        if let Some(one) = &self.one {
            one.collect(tail, out);
        }
        out.extend(self.rest.iter().cloned());
    }

    fn slot(&self, pattern: &str) -> Option<&Vec<T>> {
        if pattern.is_empty() {
            return Some(&self.values);
        }
        let (head, tail) = split_level(pattern);
        match head {
            "#" => Some(&self.rest),
            "+" => self.one.as_ref()?.slot(tail),
            seg => self.children.get(seg)?.slot(tail),
        }
    }

    fn slot_mut(&mut self, pattern: &str) -> Option<&mut Vec<T>> {
        if pattern.is_empty() {
            return Some(&mut self.values);
        }
        let (head, tail) = split_level(pattern);
        match head {
            "#" => Some(&mut self.rest),
            "+" => self.one.as_mut()?.slot_mut(tail),
            seg => self.children.get_mut(seg)?.slot_mut(tail),
        }
    }
}

fn split_level(path: &str) -> (&str, &str) {
    path.split_once('/').unwrap_or((path, ""))
}
