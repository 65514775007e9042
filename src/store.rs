use crate::{error::StoreError, movement::RecordedMove};

/// The persistence collaborator holding the authoritative move log.
///
/// The session never rolls its local state back when one of these fails; it
/// logs the failure and relies on [`crate::session::BlindSession::replay`] to
/// resync from whatever the store ends up holding.
pub trait Store {
    /// `Ok(false)` when the store declined the move.
    fn save_move(&mut self, movement: &RecordedMove) -> Result<bool, StoreError>;
    fn undo_last_move(&mut self) -> Result<(), StoreError>;
    fn clear_all_moves(&mut self) -> Result<(), StoreError>;
    /// `Ok(false)` when the store declined the submission.
    fn submit_moves(&mut self) -> Result<bool, StoreError>;
}

/// In-process [`Store`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemoryStore {
    moves: Vec<RecordedMove>,
    submitted: bool,
}
impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
    pub fn moves(&self) -> &[RecordedMove] {
        &self.moves
    }
    pub fn is_submitted(&self) -> bool {
        self.submitted
    }
    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(&self.moves)?)
    }
    pub fn from_json(src: &str) -> Result<Self, StoreError> {
        Ok(MemoryStore {
            moves: serde_json::from_str(src)?,
            submitted: false,
        })
    }
}
impl Store for MemoryStore {
    fn save_move(&mut self, movement: &RecordedMove) -> Result<bool, StoreError> {
        if self.submitted {
            return Ok(false);
        }
        self.moves.push(movement.clone());
        Ok(true)
    }
    fn undo_last_move(&mut self) -> Result<(), StoreError> {
        if !self.submitted {
            self.moves.pop();
        }
        Ok(())
    }
    fn clear_all_moves(&mut self) -> Result<(), StoreError> {
        if !self.submitted {
            self.moves.clear();
        }
        Ok(())
    }
    fn submit_moves(&mut self) -> Result<bool, StoreError> {
        if self.moves.is_empty() {
            return Ok(false);
        }
        self.submitted = true;
        Ok(true)
    }
}
#[cfg(test)]
mod test {
    use crate::{
        movement::RecordedMove,
        store::{MemoryStore, Store},
    };

    #[test]
    fn submitted_logs_are_frozen() {
        let mut store = MemoryStore::new();
        assert!(!store.submit_moves().unwrap());
        let movement = RecordedMove {
            from: square!("e2"),
            to: square!("e4"),
            san_notation: "e4".to_string(),
            sequence_index: 1,
        };
        assert!(store.save_move(&movement).unwrap());
        assert!(store.submit_moves().unwrap());
        assert!(!store.save_move(&movement).unwrap());
        store.clear_all_moves().unwrap();
        assert_eq!(store.moves(), [movement]);
    }
    #[test]
    fn logs_load_from_json() {
        let store = MemoryStore::from_json(
            r#"[
                {"from": "e2", "to": "e4", "sanNotation": "e4", "sequenceIndex": 1},
                {"from": "d2", "to": "d4", "sanNotation": "d4", "sequenceIndex": 2}
            ]"#,
        )
        .unwrap();
        assert_eq!(store.moves().len(), 2);
        assert_eq!(store.moves()[1].to, square!("d4"));
        assert!(MemoryStore::from_json("[{\"from\": \"z9\"}]").is_err());
    }
}
