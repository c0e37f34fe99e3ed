//! Label partition used to drive per-class pair enumeration.

use rand::seq::SliceRandom;
use rand::Rng;

/// Partition of batch positions by class label.
///
/// Classes appear in first-occurrence order of their label in the input, so
/// the round-robin walk over classes is deterministic given the labels. The
/// member list of each class is shuffled once at build time with the caller's
/// RNG; pair enumeration then walks the shuffled order, which randomizes
/// anchor-positive pairs without any per-pair draws.
///
/// Every position lands in exactly one class, including positions carrying a
/// background label. Background filtering happens later, when choosing which
/// classes may contribute anchors and positives; background items stay
/// eligible as negatives.
#[derive(Debug, Clone)]
pub struct ClassIndex {
    labels: Vec<i32>,
    members: Vec<Vec<usize>>,
}

impl ClassIndex {
    /// Groups positions by label and shuffles each class's member list.
    pub fn build<R: Rng>(labels: &[i32], rng: &mut R) -> Self {
        let mut class_labels: Vec<i32> = Vec::new();
        let mut members: Vec<Vec<usize>> = Vec::new();

        for (pos, &label) in labels.iter().enumerate() {
            match class_labels.iter().position(|&l| l == label) {
                Some(slot) => members[slot].push(pos),
                None => {
                    class_labels.push(label);
                    members.push(vec![pos]);
                }
            }
        }

        for list in &mut members {
            list.shuffle(rng);
        }

        Self {
            labels: class_labels,
            members,
        }
    }

    /// Number of distinct classes in the batch.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.labels.len()
    }

    /// Class labels in first-occurrence order.
    #[must_use]
    pub fn class_labels(&self) -> &[i32] {
        &self.labels
    }

    /// Shuffled member positions of one class, or None for an absent label.
    #[must_use]
    pub fn members(&self, label: i32) -> Option<&[usize]> {
        self.labels
            .iter()
            .position(|&l| l == label)
            .map(|slot| self.members[slot].as_slice())
    }

    /// Labels eligible to contribute anchors and positives.
    ///
    /// Filters out the background label, if one is configured. Classes with a
    /// single member are kept; their pair cursors are born exhausted and
    /// retire on first use.
    #[must_use]
    pub fn foreground_labels(&self, background: Option<i32>) -> Vec<i32> {
        self.labels
            .iter()
            .copied()
            .filter(|&l| Some(l) != background)
            .collect()
    }
}
