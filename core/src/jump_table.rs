//! Jump tables for control-flow test programs
//!
//! The loop body of a jump or branch test holds `N` instructions, instruction `i` sitting at label
//! `.label<i>`, followed by the exit label `.label<N>`.  The targets form a single random path
//! `0 -> t1 -> t2 -> ... -> N` that visits every instruction once, so every instruction is reached
//! when the jumps are taken, and the body falls through in order when they are not.

use rand::{seq::SliceRandom, Rng};

/// One control transfer of the loop body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hop {
    /// Index of the instruction
    pub source: usize,
    /// Index of the label it transfers to
    pub target: usize,
}

/// Control-flow layout of a loop body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JumpTable {
    hops: Vec<Hop>,
}

impl JumpTable {
    /// Builds a random path through `count` instructions ending at the exit label `count`
    pub fn new<R: Rng>(count: usize, rng: &mut R) -> JumpTable {
        let mut targets: Vec<usize> = (1..count).collect();
        targets.shuffle(rng);
        if count > 0 {
            targets.push(count);
        }

        let mut hops = vec![Hop { source: 0, target: 0 }; count];
        let mut curr = 0;
        for target in targets {
            hops[curr] = Hop { source: curr, target };
            curr = target;
        }

        JumpTable { hops }
    }

    /// Hops ordered by source index
    pub fn hops(&self) -> &[Hop] {
        &self.hops
    }

    /// Index of the exit label
    pub fn exit(&self) -> usize {
        self.hops.len()
    }

    /// Name of the label at the given index
    pub fn label(index: usize) -> String {
        format!(".label{index}")
    }
}
