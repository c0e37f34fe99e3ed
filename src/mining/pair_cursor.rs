//! Exhaustible cursor over ordered anchor-positive pairs of one class.

/// Walks all ordered pairs (anchor, positive) of a class's member list,
/// anchor-major, skipping the anchor itself. A list of `k` members yields
/// exactly `k * (k - 1)` pairs and then reports exhaustion forever; a list
/// with fewer than two members is born exhausted.
///
/// State is O(1) beyond the member list: two cursor positions. Because the
/// member list was shuffled at [`ClassIndex`](super::ClassIndex) build time,
/// walking it in order still visits pairs in randomized order.
#[derive(Debug, Clone)]
pub struct PairCursor {
    members: Vec<usize>,
    anchor_pos: usize,
    positive_pos: usize,
}

impl PairCursor {
    /// Creates a cursor over a class's member positions.
    #[must_use]
    pub fn new(members: &[usize]) -> Self {
        Self {
            members: members.to_vec(),
            anchor_pos: 0,
            positive_pos: 0,
        }
    }

    /// Next anchor-positive pair, or None once all pairs are consumed.
    pub fn next_pair(&mut self) -> Option<(usize, usize)> {
        let k = self.members.len();
        if k < 2 {
            return None;
        }
        loop {
            if self.anchor_pos >= k {
                return None;
            }
            let a = self.anchor_pos;
            let p = self.positive_pos;

            self.positive_pos += 1;
            if self.positive_pos >= k {
                self.positive_pos = 0;
                self.anchor_pos += 1;
            }

            if a != p {
                return Some((self.members[a], self.members[p]));
            }
        }
    }

    /// True once every pair has been handed out.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.members.len() < 2 || self.anchor_pos >= self.members.len()
    }
}
