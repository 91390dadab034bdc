use super::level::{Level, LevelCounts};
use super::parser::ParsedReply;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use std::collections::VecDeque;

/// A level whose reply held fewer usable comments than students.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortfall {
    pub level: Level,
    pub needed: usize,
    pub available: usize,
}

impl Shortfall {
    pub fn repeated(&self) -> usize {
        self.needed - self.available
    }
}

/// Pads `candidates` up to `need` with random repeats (or `filler` when there
/// is nothing to repeat) and shuffles the result.
pub fn build_pool<R: Rng + ?Sized>(
    level: Level,
    candidates: &[String],
    need: usize,
    filler: &str,
    rng: &mut R,
) -> (Vec<String>, Option<Shortfall>) {
    let mut pool = candidates.to_vec();

    let shortfall = (pool.len() < need).then(|| Shortfall {
        level,
        needed: need,
        available: pool.len(),
    });

    while pool.len() < need {
        let repeat = candidates
            .choose(rng)
            .cloned()
            .unwrap_or_else(|| filler.to_string());
        pool.push(repeat);
    }

    pool.shuffle(rng);
    (pool, shortfall)
}

/// One FIFO queue of comments per level. Each comment leaves its queue the
/// moment it is handed out.
#[derive(Debug, Clone, Default)]
pub struct CommentPools {
    queues: [VecDeque<String>; 3],
}

impl CommentPools {
    pub fn from_reply<R: Rng + ?Sized>(
        parsed: &ParsedReply,
        counts: &LevelCounts,
        filler: &str,
        rng: &mut R,
    ) -> (Self, Vec<Shortfall>) {
        let mut pools = Self::default();
        let mut shortfalls = Vec::new();

        for level in Level::all() {
            let (pool, shortfall) =
                build_pool(level, parsed.get(level), counts.get(level), filler, rng);
            pools.queues[level.index()] = pool.into();
            shortfalls.extend(shortfall);
        }

        (pools, shortfalls)
    }

    pub fn pop(&mut self, level: Level) -> Option<String> {
        self.queues[level.index()].pop_front()
    }

    pub fn remaining(&self, level: Level) -> usize {
        self.queues[level.index()].len()
    }

    pub fn iter(&self, level: Level) -> impl Iterator<Item = &String> {
        self.queues[level.index()].iter()
    }
}
