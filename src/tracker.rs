use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::{
    error::TrackerError, movement::RecordedMove, oracle::IndexableBoard, square::Square,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PieceId(usize);

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementSummary {
    pub total_moves: u8,
    /// Keyed by the square each moved piece currently stands on.
    pub per_piece_move_counts: FxHashMap<Square, u8>,
}

/// Bookkeeping of the blind sequence: the move log and how many times each
/// piece has moved.
///
/// A piece is identified by where it stands, so a piece that went e2, e4, e5
/// is the same piece on all three squares. `residents` follows that chain
/// without rescanning the log. Promotion does not break the chain.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PieceTracker {
    log: Vec<RecordedMove>,
    residents: FxHashMap<Square, PieceId>,
    counts: Vec<u8>,
}
impl PieceTracker {
    pub fn new() -> Self {
        PieceTracker::default()
    }
    pub fn reset(&mut self) {
        self.log.clear();
        self.residents.clear();
        self.counts.clear();
    }
    /// Records an already validated move. No legality is checked here.
    pub fn record_move(
        &mut self,
        position_after_move: &impl IndexableBoard,
        from: Square,
        to: Square,
        san_notation: String,
        sequence_index: u32,
    ) -> Result<(), TrackerError> {
        let expected = self.next_sequence_index();
        if sequence_index != expected {
            return Err(TrackerError::SequenceGap {
                expected,
                found: sequence_index,
            });
        }
        if position_after_move.piece_on(to).is_none() {
            return Err(TrackerError::EmptyDestination(to));
        }
        let id = self.residents.remove(&from).unwrap_or_else(|| {
            self.counts.push(0);
            PieceId(self.counts.len() - 1)
        });
        // a captured piece's identity is overwritten here
        self.residents.insert(to, id);
        self.counts[id.0] = self.counts[id.0].saturating_add(1);
        self.log.push(RecordedMove {
            from,
            to,
            san_notation,
            sequence_index,
        });
        Ok(())
    }
    pub fn piece_move_count(&self, square: Square) -> u8 {
        self.residents
            .get(&square)
            .map_or(0, |id| self.counts[id.0])
    }
    pub fn movement_summary(&self) -> MovementSummary {
        MovementSummary {
            total_moves: self.total_moves(),
            per_piece_move_counts: self
                .residents
                .iter()
                .map(|(square, id)| (*square, self.counts[id.0]))
                .collect(),
        }
    }
    /// Saturates at `u8::MAX`; the engine's caps keep real sequences far below.
    pub fn total_moves(&self) -> u8 {
        u8::try_from(self.log.len()).unwrap_or(u8::MAX)
    }
    pub fn next_sequence_index(&self) -> u32 {
        u32::try_from(self.log.len()).map_or(u32::MAX, |len| len.saturating_add(1))
    }
    pub fn log(&self) -> &[RecordedMove] {
        &self.log
    }
    pub fn last_move(&self) -> Option<&RecordedMove> {
        self.log.last()
    }
}
