use std::collections::HashMap;
use types::{ClassSession, StudentId};

/// Symmetric "cannot overlap in time" relation between sessions of one campus.
///
/// Two sessions clash when they share a (non-null) teacher or at least one
/// enrolled student. Stored as a dense bit matrix indexed by catalogue
/// position; the relation is irreflexive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClashIndex {
    n: usize,
    words: usize,
    bits: Vec<u64>,
    pairs: usize,
}

impl ClashIndex {
    pub fn empty(n: usize) -> Self {
        let words = n.div_ceil(64);
        Self {
            n,
            words,
            bits: vec![0; n * words],
            pairs: 0,
        }
    }

    pub fn build(sessions: &[ClassSession]) -> Self {
        let n = sessions.len();
        let mut idx = Self::empty(n);

        for i in 0..n {
            let Some(ti) = &sessions[i].teacher else {
                continue;
            };
            for j in (i + 1)..n {
                if sessions[j].teacher.as_ref() == Some(ti) {
                    idx.mark(i, j);
                }
            }
        }

        // Group sessions per student so the student pass is proportional to
        // enrolment sizes rather than set intersections over every pair.
        let mut by_student: HashMap<&StudentId, Vec<usize>> = HashMap::new();
        for (i, s) in sessions.iter().enumerate() {
            for st in &s.students {
                by_student.entry(st).or_default().push(i);
            }
        }
        for members in by_student.values() {
            for (a, &i) in members.iter().enumerate() {
                for &j in &members[a + 1..] {
                    idx.mark(i, j);
                }
            }
        }
        idx
    }

    fn set_bit(&mut self, i: usize, j: usize) -> bool {
        let w = i * self.words + j / 64;
        let mask = 1u64 << (j % 64);
        let was = self.bits[w] & mask != 0;
        self.bits[w] |= mask;
        !was
    }

    /// Records `i` and `j` as clashing. Self-pairs are ignored.
    pub fn mark(&mut self, i: usize, j: usize) {
        if i == j {
            return;
        }
        if self.set_bit(i, j) {
            self.set_bit(j, i);
            self.pairs += 1;
        }
    }

    #[inline]
    pub fn clashes(&self, i: usize, j: usize) -> bool {
        if i >= self.n || j >= self.n {
            return false;
        }
        self.bits[i * self.words + j / 64] & (1u64 << (j % 64)) != 0
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Number of unordered clashing pairs.
    pub fn pair_count(&self) -> usize {
        self.pairs
    }

    /// Unordered pairs `(i, j)` with `i < j`.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.n).flat_map(move |i| {
            ((i + 1)..self.n)
                .filter(move |&j| self.clashes(i, j))
                .map(move |j| (i, j))
        })
    }
}
