// history.rs

use std::num::NonZeroUsize;

/// One recorded command line and the identifier it was given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub id: u64,
    pub command: String,
}

/// Fixed-capacity FIFO of recently accepted command lines.
///
/// Identifiers start at 1 and are never reused. Once the ring is full every
/// append overwrites the oldest slot.
pub struct History {
    slots: Vec<HistoryEntry>,
    capacity: usize,
    // Slot holding the oldest entry once the ring has wrapped. Always 0 before.
    oldest: usize,
    next_id: u64,
}

impl History {
    pub fn new(capacity: NonZeroUsize) -> Self {
        let capacity = capacity.get();
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            oldest: 0,
            next_id: 1,
        }
    }

    pub fn add(&mut self, command: String) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        let entry = HistoryEntry { id, command };
        if self.slots.len() < self.capacity {
            self.slots.push(entry);
        } else {
            self.slots[self.oldest] = entry;
            self.oldest = (self.oldest + 1) % self.capacity;
        }
        id
    }

    /// Entries oldest to newest.
    pub fn all(&self) -> impl Iterator<Item = &HistoryEntry> + '_ {
        let (newer, older) = self.slots.split_at(self.oldest);
        older.iter().chain(newer.iter())
    }

    pub fn get(&self, id: u64) -> Option<&HistoryEntry> {
        self.all().find(|entry| entry.id == id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(capacity: usize) -> History {
        History::new(NonZeroUsize::new(capacity).unwrap())
    }

    fn ids(history: &History) -> Vec<u64> {
        history.all().map(|e| e.id).collect()
    }

    fn filled(capacity: usize, count: usize) -> History {
        let mut history = ring(capacity);
        for i in 1..=count {
            history.add(format!("cmd {i}"));
        }
        history
    }

    #[test]
    fn starts_empty() {
        let history = ring(10);
        assert_eq!(history.len(), 0);
        assert_eq!(history.capacity(), 10);
        assert!(history.all().next().is_none());
        assert!(history.get(1).is_none());
    }

    #[test]
    fn below_capacity_keeps_everything_in_order() {
        for count in 0..=10 {
            let history = filled(10, count);
            assert_eq!(history.len(), count);
            assert_eq!(ids(&history), (1..=count as u64).collect::<Vec<_>>());
            let commands: Vec<_> = history.all().map(|e| e.command.clone()).collect();
            let expected: Vec<_> = (1..=count).map(|i| format!("cmd {i}")).collect();
            assert_eq!(commands, expected);
        }
    }

    #[test]
    fn above_capacity_keeps_the_newest_window() {
        for count in 11..=35 {
            let history = filled(10, count);
            assert_eq!(history.len(), 10);
            let first = (count - 10 + 1) as u64;
            assert_eq!(ids(&history), (first..=count as u64).collect::<Vec<_>>());
        }
    }

    #[test]
    fn add_returns_monotonic_ids() {
        let mut history = ring(2);
        assert_eq!(history.add("a".into()), 1);
        assert_eq!(history.add("b".into()), 2);
        assert_eq!(history.add("c".into()), 3);
        assert_eq!(history.add("a".into()), 4);
        assert_eq!(ids(&history), vec![3, 4]);
    }

    #[test]
    fn twelve_into_ten() {
        let history = filled(10, 12);
        assert_eq!(ids(&history), (3..=12).collect::<Vec<_>>());
        assert!(history.get(2).is_none());
        assert!(history.get(1).is_none());
        assert_eq!(history.get(12).map(|e| e.command.as_str()), Some("cmd 12"));
        assert_eq!(history.get(3).map(|e| e.command.as_str()), Some("cmd 3"));
        assert!(history.get(13).is_none());
        assert!(history.get(0).is_none());
    }

    #[test]
    fn capacity_one_holds_only_the_latest() {
        let history = filled(1, 5);
        assert_eq!(ids(&history), vec![5]);
        assert!(history.get(4).is_none());
    }

    #[test]
    fn duplicates_get_distinct_ids() {
        let mut history = ring(10);
        history.add("history".into());
        history.add("history".into());
        assert_eq!(ids(&history), vec![1, 2]);
        assert_eq!(history.get(2).map(|e| e.command.as_str()), Some("history"));
    }
}
