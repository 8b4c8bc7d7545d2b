pub mod local;
pub mod memory;

use crate::positions;
use crate::types::{KanbanBoard, KanbanList};

/// Persistence port for the board snapshot.
///
/// A slot holds exactly one serialized value: the whole board collection.
/// Implementations: FileSlot (JSON file on disk), MemorySlot (in-process).
pub trait SnapshotSlot: Send + Sync {
    /// Read the stored snapshot. `Ok(None)` when nothing was ever written.
    fn read(&self) -> Result<Option<String>, StorageError>;

    /// Overwrite the stored snapshot.
    fn write(&self, snapshot: &str) -> Result<(), StorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { needed: usize, quota: usize },

    #[error("Snapshot changed since it was last read (expected {expected}, found {found})")]
    StaleSnapshot { expected: String, found: String },
}

pub const DEFAULT_BOARD_ID: &str = "default-board";
pub const DEFAULT_BOARD_TITLE: &str = "我的看板";

/// Fixed (id, title) pairs of the lists on the synthesized default board.
pub const DEFAULT_LISTS: [(&str, &str); 4] = [
    ("list-inbox", "收件箱"),
    ("list-today", "今天"),
    ("list-week", "本周"),
    ("list-done", "已完成"),
];

/// The board created when the slot is empty or unreadable.
pub fn default_board() -> KanbanBoard {
    let now = crate::dates::now();
    KanbanBoard {
        id: DEFAULT_BOARD_ID.to_string(),
        title: DEFAULT_BOARD_TITLE.to_string(),
        description: None,
        lists: DEFAULT_LISTS
            .iter()
            .enumerate()
            .map(|(position, (id, title))| KanbanList {
                id: id.to_string(),
                title: title.to_string(),
                position,
                board_id: DEFAULT_BOARD_ID.to_string(),
                cards: Vec::new(),
                wip_limit: None,
                archived: false,
                created_at: Some(now),
                updated_at: Some(now),
            })
            .collect(),
        created_at: Some(now),
        updated_at: Some(now),
        is_public: false,
        members: Vec::new(),
    }
}

/// Serialize the full collection.
pub fn encode_boards(boards: &[KanbanBoard]) -> Result<String, StorageError> {
    Ok(serde_json::to_string(boards)?)
}

/// Deserialize a snapshot. Dates that do not parse come back as `None`;
/// structural damage is an error. Lists, cards and checklist items are
/// renumbered to match their array order.
pub fn decode_boards(snapshot: &str) -> Result<Vec<KanbanBoard>, StorageError> {
    let mut boards: Vec<KanbanBoard> = serde_json::from_str(snapshot)?;
    for board in &mut boards {
        positions::reindex(&mut board.lists);
        for list in &mut board.lists {
            positions::reindex(&mut list.cards);
            for card in &mut list.cards {
                positions::reindex(&mut card.checklist);
            }
        }
    }
    Ok(boards)
}

/// Load the collection from a slot.
///
/// Empty or corrupt slots are replaced with the default board, which is
/// written back immediately. A failure of that write-back is returned
/// alongside the boards so the caller can surface it.
pub fn load_boards(slot: &dyn SnapshotSlot) -> (Vec<KanbanBoard>, Option<StorageError>) {
    let existing = match slot.read() {
        Ok(Some(snapshot)) => match decode_boards(&snapshot) {
            Ok(boards) => Some(boards),
            Err(e) => {
                log::warn!("[brain.storage] Stored boards unreadable, starting fresh: {}", e);
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            log::warn!("[brain.storage] Failed to read board snapshot: {}", e);
            None
        }
    };

    if let Some(boards) = existing {
        return (boards, None);
    }

    let boards = vec![default_board()];
    let error = save_boards(slot, &boards).err();
    if let Some(e) = &error {
        log::error!("[brain.storage] Failed to persist default board: {}", e);
    } else {
        log::info!("[brain.storage] Created default board");
    }
    (boards, error)
}

/// Overwrite the slot with the full collection.
pub fn save_boards(slot: &dyn SnapshotSlot, boards: &[KanbanBoard]) -> Result<(), StorageError> {
    let snapshot = encode_boards(boards)?;
    slot.write(&snapshot)
}

#[cfg(test)]
mod tests {
    use super::memory::MemorySlot;
    use super::*;
    use crate::dates::parse_iso;
    use crate::types::{CardAttachment, CardComment, ChecklistItem, KanbanCard, Priority};

    fn sample_boards() -> Vec<KanbanBoard> {
        let mut board = default_board();
        board.id = "b1".to_string();
        board.created_at = parse_iso("2024-01-02T03:04:05.006Z");
        board.updated_at = parse_iso("2024-02-03T04:05:06.007Z");
        let card = KanbanCard {
            id: "c1".to_string(),
            title: "Plan trip".to_string(),
            description: Some("flights + hotel".to_string()),
            list_id: "list-inbox".to_string(),
            board_id: "b1".to_string(),
            position: 0,
            completed: false,
            due_date: parse_iso("2024-03-01T00:00:00.000Z"),
            start_date: parse_iso("2024-02-20T09:00:00.000Z"),
            end_date: parse_iso("2024-02-28T18:00:00.000Z"),
            completed_at: None,
            labels: Vec::new(),
            checklist: vec![ChecklistItem {
                id: "i1".to_string(),
                text: "Book flight".to_string(),
                completed: true,
                position: 0,
            }],
            comments: vec![CardComment {
                id: "m1".to_string(),
                text: "prefer morning".to_string(),
                author_id: "u1".to_string(),
                created_at: parse_iso("2024-02-21T10:11:12.013Z"),
            }],
            attachments: vec![CardAttachment {
                id: "a1".to_string(),
                name: "itinerary.pdf".to_string(),
                url: "/files/itinerary.pdf".to_string(),
                size: Some(2048),
                uploaded_at: parse_iso("2024-02-22T00:00:00.500Z"),
            }],
            members: vec!["u1".to_string()],
            priority: Priority::High,
            tags: vec!["travel".to_string()],
            created_at: parse_iso("2024-02-19T00:00:00.000Z"),
            updated_at: parse_iso("2024-02-22T00:00:00.000Z"),
        };
        board.lists[0].cards.push(card);
        vec![board]
    }

    #[test]
    fn test_round_trip_preserves_all_dates() {
        let boards = sample_boards();
        let slot = MemorySlot::new();
        save_boards(&slot, &boards).unwrap();

        let (loaded, error) = load_boards(&slot);
        assert!(error.is_none());
        assert_eq!(loaded, boards);

        let snapshot = slot.read().unwrap().unwrap();
        assert!(snapshot.contains("\"dueDate\":\"2024-03-01T00:00:00.000Z\""));
        assert!(snapshot.contains("\"createdAt\":\"2024-02-21T10:11:12.013Z\""));
        assert!(snapshot.contains("\"uploadedAt\":\"2024-02-22T00:00:00.500Z\""));
    }

    #[test]
    fn test_empty_slot_synthesizes_default_board() {
        let slot = MemorySlot::new();
        let (boards, error) = load_boards(&slot);
        assert!(error.is_none());
        assert_eq!(boards.len(), 1);
        let board = &boards[0];
        assert_eq!(board.id, DEFAULT_BOARD_ID);
        let titles: Vec<&str> = board.lists.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["收件箱", "今天", "本周", "已完成"]);
        assert_eq!(board.all_cards().count(), 0);

        // Persisted immediately
        let stored = decode_boards(&slot.read().unwrap().unwrap()).unwrap();
        assert_eq!(stored, boards);
    }

    #[test]
    fn test_corrupt_slot_falls_back_to_default() {
        let slot = MemorySlot::with_contents("{not json");
        let (boards, error) = load_boards(&slot);
        assert!(error.is_none());
        assert_eq!(boards.len(), 1);
        assert_eq!(boards[0].id, DEFAULT_BOARD_ID);
    }

    #[test]
    fn test_malformed_nested_dates_become_none() {
        let slot = MemorySlot::with_contents(
            r#"[{"id":"b1","title":"B","createdAt":"yesterday","lists":[
                {"id":"l1","title":"L","boardId":"b1","cards":[
                    {"id":"c1","title":"C","listId":"l1","boardId":"b1",
                     "dueDate":"2024-02-30T00:00:00Z",
                     "comments":[{"id":"m1","text":"hi","createdAt":null}]}
                ]}
            ]}]"#,
        );
        let (boards, _) = load_boards(&slot);
        assert_eq!(boards[0].id, "b1");
        assert!(boards[0].created_at.is_none());
        let card = &boards[0].lists[0].cards[0];
        assert!(card.due_date.is_none());
        assert!(card.comments[0].created_at.is_none());
    }

    #[test]
    fn test_loaded_positions_renumbered() {
        let slot = MemorySlot::with_contents(
            r#"[{"id":"b1","title":"B","lists":[
                {"id":"l1","title":"L1","boardId":"b1","position":5,"cards":[
                    {"id":"c1","title":"C1","listId":"l1","boardId":"b1","position":3},
                    {"id":"c2","title":"C2","listId":"l1","boardId":"b1","position":9,
                     "checklist":[{"id":"i1","text":"x","position":7}]}
                ]},
                {"id":"l2","title":"L2","boardId":"b1","position":5}
            ]}]"#,
        );
        let (boards, error) = load_boards(&slot);
        assert!(error.is_none());
        let board = &boards[0];
        let lists: Vec<usize> = board.lists.iter().map(|l| l.position).collect();
        assert_eq!(lists, vec![0, 1]);
        let cards: Vec<(&str, usize)> = board.lists[0]
            .cards
            .iter()
            .map(|c| (c.id.as_str(), c.position))
            .collect();
        assert_eq!(cards, vec![("c1", 0), ("c2", 1)]);
        assert_eq!(board.lists[0].cards[1].checklist[0].position, 0);
    }

    #[test]
    fn test_default_board_write_failure_reported() {
        let slot = MemorySlot::with_quota(10);
        let (boards, error) = load_boards(&slot);
        assert_eq!(boards.len(), 1);
        assert!(matches!(error, Some(StorageError::QuotaExceeded { .. })));
    }
}
