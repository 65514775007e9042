//! One player's blind phase: drops, undo, reset, submission and replay.
//!
//! Both players move "first" during the blind phase, each on a board that only
//! shows their own moves. The oracle alternates turns like any chess game, so
//! every position it hands back gets its side to move forced back to the local
//! color before it is stored.

use std::time::Instant;

use crate::{
    color::Color,
    config::{BlindConfig, SessionTiming},
    engine::{BlindEngine, IllegalReason, ValidationVerdict, Violation},
    error::{PerspectiveError, ReplayError, StoreError},
    feedback::{self, SquareFeedback},
    movement::{Move, RecordedMove},
    oracle::{IndexableBoard, Oracle},
    piece::{ColoredPieceKind, PieceKind},
    square::Square,
    store::Store,
    tracker::MovementSummary,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// No color assigned yet.
    Uninitialized,
    Fresh,
    InProgress,
    ReadyToSubmit,
    Submitting,
    Submitted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SubmitState {
    attempt: u64,
    in_flight: bool,
    cooldown_until: Option<Instant>,
}

pub struct BlindSession<O, S>
where
    O: Oracle,
{
    engine: BlindEngine<O>,
    store: S,
    timing: SessionTiming,
    color: Option<Color>,
    position: Option<O::Position>,
    submitted: bool,
    submit: SubmitState,
    drop_guard_until: Option<Instant>,
    last_verdict: Option<ValidationVerdict>,
}
impl<O, S> BlindSession<O, S>
where
    O: Oracle,
    S: Store,
{
    pub fn new(oracle: O, store: S, config: BlindConfig, timing: SessionTiming) -> Self {
        BlindSession {
            engine: BlindEngine::new(oracle, config),
            store,
            timing,
            color: None,
            position: None,
            submitted: false,
            submit: SubmitState {
                attempt: 0,
                in_flight: false,
                cooldown_until: None,
            },
            drop_guard_until: None,
            last_verdict: None,
        }
    }
    /// Called whenever matchmaking reports the local color. A different color
    /// throws away everything done so far, the store's log included, since
    /// moves made under a guessed color cannot be trusted. The first color
    /// leaves the store alone so its log can still be replayed.
    pub fn assign_color(&mut self, color: Color) -> Result<(), PerspectiveError> {
        if self.color == Some(color) {
            return Ok(());
        }
        if self.submitted {
            log::debug!("ignoring color change to {color} after submission");
            return Ok(());
        }
        log::info!("playing the blind phase as {color}");
        let fresh = self.fresh_position(color)?;
        if self.color.is_some() {
            if let Err(err) = self.store.clear_all_moves() {
                warn_store("clear moves of the previous color", &err);
            }
            // any outcome still pending belongs to the discarded sequence
            self.submit = SubmitState {
                attempt: self.submit.attempt + 1,
                in_flight: false,
                cooldown_until: None,
            };
        }
        self.color = Some(color);
        self.start_over(fresh);
        Ok(())
    }
    /// Rebuilds everything from a persisted log, in sequence order.
    ///
    /// Stops at the first move that cannot be replayed, leaving the state of
    /// the last move that could.
    pub fn replay(&mut self, log: &[RecordedMove]) -> Result<(), ReplayError> {
        let color = self.color.ok_or(ReplayError::NoColor)?;
        let fresh = self.fresh_position(color)?;
        self.start_over(fresh);

        let mut ordered: Vec<&RecordedMove> = log.iter().collect();
        ordered.sort_by_key(|recorded| recorded.sequence_index);
        for recorded in ordered {
            if let Err(err) = self.replay_move(color, recorded) {
                log::error!("replay halted: {err}");
                return Err(err);
            }
        }
        log::debug!("replayed {} moves", log.len());
        Ok(())
    }
    fn replay_move(&mut self, color: Color, recorded: &RecordedMove) -> Result<(), ReplayError> {
        let sequence_index = recorded.sequence_index;
        let position = self.position.as_ref().ok_or(ReplayError::NoColor)?;
        let piece = position.piece_on(recorded.from);
        let movement = Move {
            from: recorded.from,
            to: recorded.to,
            promotion: promotion_in_san(&recorded.san_notation),
        };
        let movement = promote_by_default(piece, movement);
        let (next, san) = self
            .advance(color, position, movement)
            .map_err(|verdict| ReplayError::Rejected {
                sequence_index,
                movement,
                verdict,
            })?;
        self.engine
            .process_move(&next, movement, san, sequence_index)
            .map_err(|source| ReplayError::Tracker {
                sequence_index,
                source,
            })?;
        self.position = Some(next);
        Ok(())
    }
    /// Tries a drag and drop of `piece` from `from` to `to`.
    ///
    /// Returns `true` when the move was accepted and applied locally. Saving
    /// it is attempted afterwards; a failed save is logged and the move stays.
    pub fn handle_drop(
        &mut self,
        from: Square,
        to: Square,
        piece: ColoredPieceKind,
        now: Instant,
    ) -> bool {
        self.drop_move(Move::new(from, to), piece, now)
    }
    /// [`Self::handle_drop`] with an explicit promotion choice.
    pub fn handle_drop_with_promotion(
        &mut self,
        from: Square,
        to: Square,
        piece: ColoredPieceKind,
        promotion: PieceKind,
        now: Instant,
    ) -> bool {
        self.drop_move(Move::new(from, to).promoting(promotion), piece, now)
    }
    fn drop_move(&mut self, movement: Move, piece: ColoredPieceKind, now: Instant) -> bool {
        let Move { from, to, .. } = movement;
        let (Some(color), Some(position)) = (self.color, self.position.as_ref()) else {
            log::debug!("drop ignored: no color assigned");
            return false;
        };
        if self.drop_guard_until.is_some_and(|until| now < until) {
            log::debug!("drop ignored: previous move still processing");
            return false;
        }
        if self.submitted || self.is_submitting(now) {
            log::debug!("drop ignored: moves already submitted");
            return false;
        }
        if piece.color() != color {
            log::debug!("drop ignored: {piece} does not belong to {color}");
            return false;
        }
        if position.piece_on(from) != Some(piece) {
            log::debug!("drop ignored: {piece} is not on {from}");
            return false;
        }
        let movement = promote_by_default(Some(piece), movement);
        let (next, san) = match self.advance(color, position, movement) {
            Ok(advanced) => advanced,
            Err(verdict) => {
                log::debug!("{movement} rejected: {verdict}");
                self.last_verdict = Some(verdict);
                return false;
            }
        };
        let sequence_index = self.engine.tracker().next_sequence_index();
        if let Err(err) = self
            .engine
            .process_move(&next, movement, san.clone(), sequence_index)
        {
            log::error!("could not record {movement}: {err}");
            return false;
        }
        self.position = Some(next);
        self.last_verdict = None;
        self.drop_guard_until = Some(now + self.timing.drop_guard());
        log::info!("move {sequence_index}: {san}");

        let recorded = RecordedMove {
            from,
            to,
            san_notation: san,
            sequence_index,
        };
        match self.store.save_move(&recorded) {
            Ok(true) => {}
            Ok(false) => log::warn!("store declined move {sequence_index}; keeping it locally"),
            Err(err) => warn_store("save move", &err),
        }
        true
    }
    /// Asks the store to drop the latest move. Local state follows on the next
    /// [`Self::replay`].
    pub fn handle_undo(&mut self) -> bool {
        if self.submitted || self.engine.tracker().total_moves() == 0 {
            return false;
        }
        if let Err(err) = self.store.undo_last_move() {
            warn_store("undo", &err);
        }
        true
    }
    /// Asks the store to drop every move. Local state follows on the next
    /// [`Self::replay`].
    pub fn handle_reset(&mut self) -> bool {
        if self.submitted {
            return false;
        }
        if let Err(err) = self.store.clear_all_moves() {
            warn_store("reset", &err);
        }
        true
    }
    /// Submits the sequence. Whatever the outcome, submitting stays disabled
    /// until the cooldown has passed.
    pub fn handle_submit(&mut self, now: Instant) -> bool {
        if self.engine.tracker().total_moves() == 0 || self.submitted || self.is_submitting(now) {
            return false;
        }
        self.submit.attempt += 1;
        self.submit.in_flight = true;
        self.submit.cooldown_until = Some(now + self.timing.submit_cooldown());
        let attempt = self.submit.attempt;
        log::info!("submitting {} moves", self.engine.tracker().total_moves());
        let outcome = self.store.submit_moves();
        self.settle_submit(attempt, outcome);
        true
    }
    fn settle_submit(&mut self, attempt: u64, outcome: Result<bool, StoreError>) {
        if attempt != self.submit.attempt {
            log::debug!("discarding the outcome of stale submission {attempt}");
            return;
        }
        self.submit.in_flight = false;
        match outcome {
            Ok(true) => {
                log::info!("blind moves submitted");
                self.submitted = true;
            }
            Ok(false) => log::warn!("store declined the submission"),
            Err(err) => warn_store("submit", &err),
        }
    }
    /// Restores a submission the store already knows about, e.g. after a
    /// reload.
    pub fn mark_submitted(&mut self) {
        self.submitted = true;
        self.submit.in_flight = false;
    }

    fn fresh_position(&self, color: Color) -> Result<O::Position, PerspectiveError> {
        let oracle = self.engine.oracle();
        oracle
            .with_side_to_move(&oracle.starting_position(), color)
            .ok_or(PerspectiveError(color))
    }
    fn start_over(&mut self, fresh: O::Position) {
        self.engine.reset();
        self.position = Some(fresh);
        self.last_verdict = None;
        self.drop_guard_until = None;
    }
    /// Validates `movement` and computes the position after it, with the turn
    /// handed back to `color`.
    fn advance(
        &self,
        color: Color,
        position: &O::Position,
        movement: Move,
    ) -> Result<(O::Position, String), ValidationVerdict> {
        let verdict = self.engine.validate_move(position, movement);
        if !verdict.is_valid() {
            return Err(verdict);
        }
        let oracle = self.engine.oracle();
        let applied = oracle.apply_move(position, movement).map_err(|_| {
            ValidationVerdict::rejected(Violation::IllegalMove {
                reason: IllegalReason::NotLegal,
            })
        })?;
        let next = oracle
            .with_side_to_move(&applied.position, color)
            .ok_or_else(|| {
                ValidationVerdict::rejected(Violation::IllegalMove {
                    reason: IllegalReason::ChecksOpponent,
                })
            })?;
        Ok((next, applied.san))
    }

    pub fn phase(&self, now: Instant) -> Phase {
        if self.color.is_none() {
            Phase::Uninitialized
        } else if self.submitted {
            Phase::Submitted
        } else if self.is_submitting(now) {
            Phase::Submitting
        } else if self.engine.tracker().total_moves() == 0 {
            Phase::Fresh
        } else if self.engine.is_complete() {
            Phase::ReadyToSubmit
        } else {
            Phase::InProgress
        }
    }
    pub fn is_submitting(&self, now: Instant) -> bool {
        self.submit.in_flight || self.submit.cooldown_until.is_some_and(|until| now < until)
    }
    pub fn is_submit_disabled(&self, now: Instant) -> bool {
        self.engine.tracker().total_moves() == 0 || self.submitted || self.is_submitting(now)
    }
    pub fn is_submitted(&self) -> bool {
        self.submitted
    }
    pub fn summary(&self) -> MovementSummary {
        self.engine.summary()
    }
    pub fn remaining_moves(&self) -> u8 {
        self.engine.remaining_moves()
    }
    pub fn is_complete(&self) -> bool {
        self.engine.is_complete()
    }
    /// Why the latest rejected drop was rejected; cleared by an accepted one.
    pub fn last_verdict(&self) -> Option<&ValidationVerdict> {
        self.last_verdict.as_ref()
    }
    pub fn color(&self) -> Option<Color> {
        self.color
    }
    pub fn position(&self) -> Option<&O::Position> {
        self.position.as_ref()
    }
    pub fn engine(&self) -> &BlindEngine<O> {
        &self.engine
    }
    pub fn store(&self) -> &S {
        &self.store
    }
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
    pub fn feedback(&self) -> Vec<SquareFeedback> {
        match (&self.position, self.color) {
            (Some(position), Some(color)) => feedback::annotate(
                position,
                color,
                self.engine.tracker(),
                self.engine.config(),
            ),
            _ => Vec::new(),
        }
    }
}

/// A pawn reaching its last rank without a promotion choice becomes a queen.
fn promote_by_default(piece: Option<ColoredPieceKind>, movement: Move) -> Move {
    match piece {
        Some(piece)
            if piece.piece() == PieceKind::Pawn
                && movement.promotion.is_none()
                && movement.to.rank() == piece.color().promotion_rank() =>
        {
            movement.promoting(PieceKind::Queen)
        }
        _ => movement,
    }
}
/// The piece named after `=` in a SAN such as `e8=N+`. Records carry no
/// separate promotion field.
fn promotion_in_san(san: &str) -> Option<PieceKind> {
    let (_, rest) = san.split_once('=')?;
    let piece = PieceKind::from_fen(rest.chars().next()?).ok()?;
    PieceKind::PROMOTION_CHOICES.contains(&piece).then_some(piece)
}
fn warn_store(action: &str, err: &StoreError) {
    log::warn!("could not {action}: {err}; local state is kept as is");
}
