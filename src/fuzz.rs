use std::time::Instant;

use rand::{Rng, SeedableRng, rngs::SmallRng};

use crate::{
    color::Color,
    config::Settings,
    movement::Move,
    oracle::{ChessOracle, IndexableBoard},
    session::BlindSession,
    square::Square,
    store::MemoryStore,
};

type Session = BlindSession<ChessOracle, MemoryStore>;

fn new_session(settings: Settings, color: Color) -> Session {
    let mut session = BlindSession::new(
        ChessOracle,
        MemoryStore::new(),
        settings.limits,
        settings.timing,
    );
    if let Err(err) = session.assign_color(color) {
        panic!("cannot start a session: {err}");
    }
    session
}
fn check_caps(session: &Session, game: u32) {
    let config = session.engine().config();
    let summary = session.summary();
    assert!(
        summary.total_moves <= config.max_moves,
        "game {game}: {} moves made, cap is {}",
        summary.total_moves,
        config.max_moves
    );
    for (square, count) in &summary.per_piece_move_counts {
        assert!(
            *count <= config.max_per_piece,
            "game {game}: piece on {square} moved {count} times, cap is {}",
            config.max_per_piece
        );
        let position = session.position().unwrap();
        let owner = IndexableBoard::piece_on(position, *square).map(|piece| piece.color());
        assert_eq!(
            owner,
            session.color(),
            "game {game}: a count is kept for {square} but none of our pieces is there"
        );
    }
    assert_eq!(
        session.store().moves(),
        session.engine().tracker().log(),
        "game {game}: store and tracker disagree"
    );
}
fn check_replay(settings: Settings, session: &Session, game: u32) {
    let color = session.color().unwrap();
    let mut reloaded = new_session(settings, color);
    if let Err(err) = reloaded.replay(session.store().moves()) {
        panic!("game {game}: replay failed: {err}");
    }
    assert!(
        reloaded.engine().tracker() == session.engine().tracker()
            && reloaded.position() == session.position(),
        "game {game}: replay diverged\nlive:     {:?}\nreplayed: {:?}",
        session.summary(),
        reloaded.summary()
    );
}
fn random_move(rng: &mut SmallRng, position: &chess::Board) -> Option<Move> {
    if rng.random_ratio(1, 8) {
        let squares: Box<[_]> = Square::all().collect();
        let from = squares[rng.random_range(0..squares.len())];
        let to = squares[rng.random_range(0..squares.len())];
        return Some(Move::new(from, to));
    }
    let moves: Box<[_]> = chess::MoveGen::new_legal(position).collect();
    if moves.is_empty() {
        return None;
    }
    Some(moves[rng.random_range(0..moves.len())].into())
}

/// Plays `games` random blind phases, checking after every step that no cap
/// is exceeded and that replaying the saved log reproduces the live state.
/// Panics on the first broken invariant.
pub fn fuzz(settings: Settings, games: u32, seed: u64) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut now = Instant::now();
    for game in 0..games {
        let color = if rng.random_bool(0.5) {
            Color::White
        } else {
            Color::Black
        };
        let mut session = new_session(settings, color);
        let attempts = u32::from(settings.limits.max_moves) * 4;
        for _ in 0..attempts {
            now += settings.timing.drop_guard();
            if rng.random_ratio(1, 10) {
                if session.handle_undo() {
                    let log = session.store().moves().to_vec();
                    if let Err(err) = session.replay(&log) {
                        panic!("game {game}: replay after undo failed: {err}");
                    }
                }
                check_caps(&session, game);
                continue;
            }
            let position = *session.position().unwrap();
            let Some(movement) = random_move(&mut rng, &position) else {
                break;
            };
            let Some(piece) = IndexableBoard::piece_on(&position, movement.from) else {
                continue;
            };
            let before = session.summary().total_moves;
            let accepted = session.handle_drop(movement.from, movement.to, piece, now);
            let after = session.summary().total_moves;
            assert_eq!(
                after,
                before + u8::from(accepted),
                "game {game}: {movement} accepted={accepted} but total went {before} -> {after}"
            );
            check_caps(&session, game);
        }
        check_replay(settings, &session, game);

        now += settings.timing.submit_cooldown();
        let made = session.summary().total_moves;
        assert_eq!(session.handle_submit(now), made > 0);
        assert_eq!(session.is_submitted(), made > 0);
        assert_eq!(session.store().is_submitted(), made > 0);
        log::info!("game {game}: {made} moves as {color}");
    }
}
#[cfg(test)]
mod test {
    use crate::{
        config::{BlindConfig, Settings},
        fuzz::fuzz,
    };

    #[test]
    fn seeded_games_keep_their_invariants() {
        fuzz(Settings::default(), 40, 0x5eed);
    }
    #[test]
    fn seeded_games_with_wider_limits() {
        let settings = Settings {
            limits: BlindConfig {
                max_moves: 12,
                max_per_piece: 3,
            },
            ..Settings::default()
        };
        fuzz(settings, 20, 7);
    }
}
