//! Snapshot-based undo/redo.

use crate::shapes::Drawable;

/// Default maximum number of retained snapshots.
pub const DEFAULT_HISTORY_CAP: usize = 50;

/// A bounded list of scene snapshots with a cursor.
///
/// `snapshots[step]` always equals the live scene after a commit, undo or
/// redo. Snapshots are deep copies and never mutated once pushed.
#[derive(Debug, Clone)]
pub struct History {
    snapshots: Vec<Vec<Drawable>>,
    step: usize,
    cap: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(Vec::new(), DEFAULT_HISTORY_CAP)
    }
}

impl History {
    /// Start a history whose base state is `initial`.
    pub fn new(initial: Vec<Drawable>, cap: usize) -> Self {
        Self {
            snapshots: vec![initial],
            step: 0,
            cap: cap.max(1),
        }
    }

    /// Drop everything and start over from `initial`.
    pub fn reset(&mut self, initial: Vec<Drawable>) {
        self.snapshots.clear();
        self.snapshots.push(initial);
        self.step = 0;
    }

    /// Record a completed action.
    ///
    /// Discards any redo states, appends the snapshot and evicts the oldest
    /// one once the cap is exceeded.
    pub fn save_state(&mut self, snapshot: Vec<Drawable>) {
        self.snapshots.truncate(self.step + 1);
        self.snapshots.push(snapshot);
        if self.snapshots.len() > self.cap {
            let excess = self.snapshots.len() - self.cap;
            self.snapshots.drain(..excess);
        }
        self.step = self.snapshots.len() - 1;
        log::debug!("history: saved step {} of {}", self.step, self.snapshots.len());
    }

    /// Step back, returning the snapshot to restore.
    pub fn undo(&mut self) -> Option<&[Drawable]> {
        if !self.can_undo() {
            return None;
        }
        self.step -= 1;
        Some(&self.snapshots[self.step])
    }

    /// Step forward, returning the snapshot to restore.
    pub fn redo(&mut self) -> Option<&[Drawable]> {
        if !self.can_redo() {
            return None;
        }
        self.step += 1;
        Some(&self.snapshots[self.step])
    }

    pub fn can_undo(&self) -> bool {
        self.step > 0
    }

    pub fn can_redo(&self) -> bool {
        self.step + 1 < self.snapshots.len()
    }

    /// Current cursor position.
    pub fn step(&self) -> usize {
        self.step
    }

    /// Number of retained snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Shape, ShapeKind};
    use kurbo::Point;

    fn scene_with(n: usize) -> Vec<Drawable> {
        (0..n)
            .map(|i| {
                let x = i as f64 * 10.0;
                Drawable::Shape(Shape::new(
                    ShapeKind::Rectangle,
                    Point::new(x, 0.0),
                    Point::new(x + 5.0, 5.0),
                ))
            })
            .collect()
    }

    #[test]
    fn test_undo_empty_history() {
        let mut history = History::default();
        assert!(!history.can_undo());
        assert!(history.undo().is_none());
        assert!(!history.can_redo());
        assert!(history.redo().is_none());
    }

    #[test]
    fn test_undo_redo() {
        let mut history = History::default();
        let one = scene_with(1);
        history.save_state(one.clone());

        assert_eq!(history.undo().map(<[Drawable]>::len), Some(0));
        assert!(history.can_redo());
        assert_eq!(history.redo(), Some(one.as_slice()));
    }

    #[test]
    fn test_save_clears_redo() {
        let mut history = History::default();
        history.save_state(scene_with(1));
        history.undo();
        assert!(history.can_redo());

        history.save_state(scene_with(2));
        assert!(!history.can_redo());
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let mut history = History::new(Vec::new(), 5);
        for n in 1..=8 {
            history.save_state(scene_with(n));
        }
        assert_eq!(history.len(), 5);
        assert_eq!(history.step(), 4);

        let mut last = None;
        while let Some(snapshot) = history.undo() {
            last = Some(snapshot.len());
        }
        // Oldest retained snapshot is the scene after the fourth action
        assert_eq!(last, Some(4));
        assert_eq!(history.step(), 0);
    }
}
