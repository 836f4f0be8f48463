//! Tick-driven animation sequencing for player entities.
//!
//! A [`Sequencer`] steps through the indices of one sprite-sheet clip at a
//! fixed number of simulation ticks per index. Gameplay-relevant frames are
//! marked at construction time; [`Sequencer::advance`] reports arrival at a
//! marked index as a return value instead of running a hidden callback, so
//! the owning entity decides what the frame means.

use std::collections::HashMap;

/// Sprite-sheet columns per row; each clip occupies one row.
const SHEET_COLUMNS: u32 = 8;

/// Punch clips strike on this index, not on the input that started them.
pub const PUNCH_CONTACT_INDEX: usize = 3;

/// Identifies one animation clip of a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClipId {
    IdleRight,
    IdleLeft,
    WalkRight,
    WalkLeft,
    PunchRight,
    PunchLeft,
    HurtRight,
    HurtLeft,
}

impl ClipId {
    /// Clip name as published in snapshots.
    pub fn name(self) -> &'static str {
        match self {
            ClipId::IdleRight => "idle_right",
            ClipId::IdleLeft => "idle_left",
            ClipId::WalkRight => "walk_right",
            ClipId::WalkLeft => "walk_left",
            ClipId::PunchRight => "punch_right",
            ClipId::PunchLeft => "punch_left",
            ClipId::HurtRight => "hurt_right",
            ClipId::HurtLeft => "hurt_left",
        }
    }

    /// Sprite-sheet row this clip occupies.
    fn row(self) -> u32 {
        match self {
            ClipId::IdleRight => 0,
            ClipId::IdleLeft => 1,
            ClipId::WalkRight => 2,
            ClipId::WalkLeft => 3,
            ClipId::PunchRight => 4,
            ClipId::PunchLeft => 5,
            ClipId::HurtRight => 6,
            ClipId::HurtLeft => 7,
        }
    }

    pub fn idle(facing_right: bool) -> ClipId {
        if facing_right {
            ClipId::IdleRight
        } else {
            ClipId::IdleLeft
        }
    }

    pub fn walk(facing_right: bool) -> ClipId {
        if facing_right {
            ClipId::WalkRight
        } else {
            ClipId::WalkLeft
        }
    }

    pub fn punch(facing_right: bool) -> ClipId {
        if facing_right {
            ClipId::PunchRight
        } else {
            ClipId::PunchLeft
        }
    }

    pub fn hurt(facing_right: bool) -> ClipId {
        if facing_right {
            ClipId::HurtRight
        } else {
            ClipId::HurtLeft
        }
    }
}

/// Steps through the indices of a single clip, one simulation tick at a time.
#[derive(Debug, Clone)]
pub struct Sequencer {
    clip: ClipId,
    base_frame: u32,
    index_count: usize,
    ticks_per_index: u32,
    looping: bool,
    sub_frame: u32,
    index: usize,
    done: bool,
    pause_left: u32,
    marked_index: Option<usize>,
}

impl Sequencer {
    pub fn new(clip: ClipId, index_count: usize, ticks_per_index: u32, looping: bool) -> Self {
        Self {
            clip,
            base_frame: clip.row() * SHEET_COLUMNS,
            index_count,
            ticks_per_index,
            looping,
            sub_frame: 0,
            index: 0,
            done: false,
            pause_left: 0,
            marked_index: None,
        }
    }

    /// Marks an index whose arrival is reported by [`Sequencer::advance`].
    pub fn with_mark(mut self, index: usize) -> Self {
        self.marked_index = Some(index);
        self
    }

    /// Advances the clip by one simulation tick.
    ///
    /// Returns `Some(index)` when the clip arrives at its marked index this
    /// tick (once per arrival, including across loop iterations). Held
    /// ticks (pause counter), sub-frame ticks, and finished clips return
    /// None.
    pub fn advance(&mut self) -> Option<usize> {
        if self.done {
            return None;
        }
        if self.pause_left > 0 {
            self.pause_left -= 1;
            return None;
        }

        self.sub_frame += 1;
        if self.sub_frame < self.ticks_per_index {
            return None;
        }
        self.sub_frame = 0;
        self.index += 1;

        if self.index >= self.index_count {
            if self.looping {
                self.index = 0;
            } else {
                self.index = self.index_count - 1;
                self.done = true;
                return None;
            }
        }

        if self.marked_index == Some(self.index) {
            Some(self.index)
        } else {
            None
        }
    }

    /// Holds the clip in place for the next `ticks` advances.
    pub fn pause(&mut self, ticks: u32) {
        self.pause_left = ticks;
    }

    /// Rewinds the clip to its initial state without reallocating.
    pub fn reset(&mut self) {
        self.sub_frame = 0;
        self.index = 0;
        self.done = false;
        self.pause_left = 0;
    }

    /// Absolute sprite-sheet frame to render.
    pub fn current_frame(&self) -> u32 {
        self.base_frame + self.index as u32
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn clip(&self) -> ClipId {
        self.clip
    }
}

/// Builds the full clip table a player owns for its whole lifetime.
pub fn standard_clips() -> HashMap<ClipId, Sequencer> {
    let mut clips = HashMap::new();
    for facing_right in [true, false] {
        clips.insert(
            ClipId::idle(facing_right),
            Sequencer::new(ClipId::idle(facing_right), 6, 4, true),
        );
        clips.insert(
            ClipId::walk(facing_right),
            Sequencer::new(ClipId::walk(facing_right), 6, 3, true),
        );
        clips.insert(
            ClipId::punch(facing_right),
            Sequencer::new(ClipId::punch(facing_right), 6, 3, false).with_mark(PUNCH_CONTACT_INDEX),
        );
        clips.insert(
            ClipId::hurt(facing_right),
            Sequencer::new(ClipId::hurt(facing_right), 4, 4, false),
        );
    }
    clips
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_shot_finishes_after_exact_tick_count() {
        // 3 ticks per index, 6 indices, no loop: done on the 18th advance
        let mut seq = Sequencer::new(ClipId::PunchRight, 6, 3, false);

        for _ in 0..17 {
            seq.advance();
            assert!(!seq.is_done());
        }
        seq.advance();
        assert!(seq.is_done());
        assert_eq!(seq.index(), 5);

        // frozen thereafter
        let frame = seq.current_frame();
        for _ in 0..10 {
            assert_eq!(seq.advance(), None);
            assert_eq!(seq.current_frame(), frame);
        }
    }

    #[test]
    fn test_pause_holds_exactly_n_ticks() {
        let mut seq = Sequencer::new(ClipId::WalkRight, 6, 1, true);
        seq.pause(5);

        for _ in 0..5 {
            assert_eq!(seq.advance(), None);
            assert_eq!(seq.index(), 0);
        }

        // sixth advance behaves like the first real tick
        seq.advance();
        assert_eq!(seq.index(), 1);
    }

    #[test]
    fn test_looping_wraps_to_start() {
        let mut seq = Sequencer::new(ClipId::IdleRight, 3, 1, true);
        seq.advance();
        seq.advance();
        assert_eq!(seq.index(), 2);
        seq.advance();
        assert_eq!(seq.index(), 0);
        assert!(!seq.is_done());
    }

    #[test]
    fn test_marked_index_fires_once_per_arrival() {
        let mut seq = Sequencer::new(ClipId::PunchRight, 4, 1, true).with_mark(2);

        let mut hits = 0;
        for _ in 0..8 {
            if seq.advance().is_some() {
                hits += 1;
            }
        }
        // two full loop iterations pass index 2 twice
        assert_eq!(hits, 2);
    }

    #[test]
    fn test_marked_index_respects_sub_frames() {
        let mut seq = Sequencer::new(ClipId::PunchRight, 6, 3, false).with_mark(PUNCH_CONTACT_INDEX);

        let mut contact_at = None;
        for tick in 1..=18 {
            if seq.advance().is_some() {
                contact_at = Some(tick);
            }
        }
        // index 3 is reached on the 9th advance at 3 ticks per index
        assert_eq!(contact_at, Some(9));
    }

    #[test]
    fn test_reset_clears_all_counters() {
        let mut seq = Sequencer::new(ClipId::HurtRight, 4, 4, false);
        for _ in 0..16 {
            seq.advance();
        }
        assert!(seq.is_done());

        seq.pause(3);
        seq.reset();
        assert!(!seq.is_done());
        assert_eq!(seq.index(), 0);

        // pause counter is gone too
        seq.advance();
        seq.advance();
        seq.advance();
        seq.advance();
        assert_eq!(seq.index(), 1);
    }

    #[test]
    fn test_current_frame_includes_base_offset() {
        let mut idle_left = Sequencer::new(ClipId::IdleLeft, 6, 1, true);
        assert_eq!(idle_left.current_frame(), 8);
        idle_left.advance();
        assert_eq!(idle_left.current_frame(), 9);
    }

    #[test]
    fn test_standard_clips_cover_both_facings() {
        let clips = standard_clips();
        assert_eq!(clips.len(), 8);
        assert!(clips.contains_key(&ClipId::PunchLeft));
        assert!(clips.contains_key(&ClipId::HurtLeft));
    }
}
