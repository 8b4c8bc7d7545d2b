//! Change notifications emitted after store mutations.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BoardChangeEvent {
    BoardCreated {
        board_id: String,
    },
    BoardChanged {
        board_id: String,
    },
    BoardDeleted {
        board_id: String,
    },
    CardMoved {
        board_id: String,
        card_id: String,
        from_list_id: String,
        to_list_id: String,
        position: usize,
    },
    StoreReloaded,
    PersistFailed {
        message: String,
    },
}
