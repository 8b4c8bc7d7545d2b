//! In-memory board repository with whole-snapshot persistence.
//!
//! Every successful mutation rewrites the complete collection through the
//! injected slot. Operations addressing an unknown board, list, card or
//! checklist item do nothing and persist nothing; they report `false`/`None`.
//!
//! A failed write does not roll back memory. The failure is logged and kept
//! as `last_error` until a later write succeeds or the store is reloaded.
use crate::dates;
use crate::ids::generate_id;
use crate::positions;
use crate::storage::{self, SnapshotSlot};
use crate::types::*;

pub struct BoardStore {
    slot: Box<dyn SnapshotSlot>,
    boards: Vec<KanbanBoard>,
    last_error: Option<String>,
}

impl BoardStore {
    /// Load the collection from `slot`, creating the default board when empty.
    pub fn open(slot: Box<dyn SnapshotSlot>) -> Self {
        let (boards, error) = storage::load_boards(slot.as_ref());
        Self {
            slot,
            boards,
            last_error: error.map(|e| e.to_string()),
        }
    }

    pub fn boards(&self) -> &[KanbanBoard] {
        &self.boards
    }

    pub fn board(&self, board_id: &str) -> Option<&KanbanBoard> {
        self.boards.iter().find(|b| b.id == board_id)
    }

    pub fn board_infos(&self) -> Vec<BoardInfo> {
        self.boards.iter().map(BoardInfo::from).collect()
    }

    /// The last persistence failure, if memory and storage may have diverged.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Discard in-memory state and re-read the slot.
    pub fn reload(&mut self) {
        let (boards, error) = storage::load_boards(self.slot.as_ref());
        self.boards = boards;
        self.last_error = error.map(|e| e.to_string());
        log::info!("[brain.store] Reloaded {} boards", self.boards.len());
    }

    fn persist(&mut self) {
        match storage::save_boards(self.slot.as_ref(), &self.boards) {
            Ok(()) => self.last_error = None,
            Err(e) => {
                log::error!("[brain.store] Failed to save boards: {}", e);
                self.last_error = Some(e.to_string());
            }
        }
    }

    fn board_mut(&mut self, board_id: &str) -> Option<&mut KanbanBoard> {
        self.boards.iter_mut().find(|b| b.id == board_id)
    }

    // ── Boards ──────────────────────────────────────────────────────────

    pub fn create_board(&mut self, new: NewBoard) -> String {
        let now = dates::now();
        let id = generate_id("board");
        self.boards.push(KanbanBoard {
            id: id.clone(),
            title: new.title,
            description: new.description,
            lists: Vec::new(),
            created_at: Some(now),
            updated_at: Some(now),
            is_public: new.is_public,
            members: Vec::new(),
        });
        self.persist();
        id
    }

    pub fn update_board(&mut self, board_id: &str, update: BoardUpdate) -> bool {
        let Some(board) = self.board_mut(board_id) else {
            return false;
        };
        if let Some(title) = update.title {
            board.title = title;
        }
        if let Some(description) = update.description {
            board.description = description;
        }
        if let Some(is_public) = update.is_public {
            board.is_public = is_public;
        }
        if let Some(members) = update.members {
            board.members = members;
        }
        board.updated_at = Some(dates::now());
        self.persist();
        true
    }

    pub fn delete_board(&mut self, board_id: &str) -> bool {
        let before = self.boards.len();
        self.boards.retain(|b| b.id != board_id);
        if self.boards.len() == before {
            return false;
        }
        self.persist();
        true
    }

    // ── Lists ───────────────────────────────────────────────────────────

    pub fn create_list(&mut self, board_id: &str, new: NewList) -> Option<String> {
        let board = self.board_mut(board_id)?;
        let now = dates::now();
        let id = generate_id("list");
        board.lists.push(KanbanList {
            id: id.clone(),
            title: new.title,
            position: board.lists.len(),
            board_id: board_id.to_string(),
            cards: Vec::new(),
            wip_limit: new.wip_limit,
            archived: false,
            created_at: Some(now),
            updated_at: Some(now),
        });
        board.updated_at = Some(now);
        self.persist();
        Some(id)
    }

    pub fn update_list(&mut self, board_id: &str, list_id: &str, update: ListUpdate) -> bool {
        let Some(board) = self.board_mut(board_id) else {
            return false;
        };
        let Some(list) = board.list_mut(list_id) else {
            return false;
        };
        let now = dates::now();
        if let Some(title) = update.title {
            list.title = title;
        }
        if let Some(wip_limit) = update.wip_limit {
            list.wip_limit = wip_limit;
        }
        if let Some(archived) = update.archived {
            list.archived = archived;
        }
        list.updated_at = Some(now);
        board.updated_at = Some(now);
        self.persist();
        true
    }

    /// Delete a list together with its cards.
    pub fn delete_list(&mut self, board_id: &str, list_id: &str) -> bool {
        let Some(board) = self.board_mut(board_id) else {
            return false;
        };
        if positions::remove_where(&mut board.lists, |l| l.id == list_id).is_none() {
            return false;
        }
        board.updated_at = Some(dates::now());
        self.persist();
        true
    }

    /// Reorder a list within its board. Positions past the end clamp to the end.
    pub fn move_list(&mut self, board_id: &str, list_id: &str, new_position: usize) -> bool {
        let Some(board) = self.board_mut(board_id) else {
            return false;
        };
        let Some(list) = positions::remove_where(&mut board.lists, |l| l.id == list_id) else {
            return false;
        };
        positions::insert_clamped(&mut board.lists, new_position, list);
        board.updated_at = Some(dates::now());
        self.persist();
        true
    }

    // ── Cards ───────────────────────────────────────────────────────────

    /// Append a card to the end of a list.
    pub fn create_card(&mut self, board_id: &str, list_id: &str, new: NewCard) -> Option<String> {
        let board = self.board_mut(board_id)?;
        let list = board.list_mut(list_id)?;
        let now = dates::now();
        let id = generate_id("card");
        list.cards.push(KanbanCard {
            id: id.clone(),
            title: new.title,
            description: new.description,
            list_id: list_id.to_string(),
            board_id: board_id.to_string(),
            position: list.cards.len(),
            completed: false,
            due_date: new.due_date,
            start_date: new.start_date,
            end_date: new.end_date,
            completed_at: None,
            labels: new.labels,
            checklist: Vec::new(),
            comments: Vec::new(),
            attachments: Vec::new(),
            members: Vec::new(),
            priority: new.priority,
            tags: new.tags,
            created_at: Some(now),
            updated_at: Some(now),
        });
        board.updated_at = Some(now);
        self.persist();
        Some(id)
    }

    pub fn update_card(&mut self, board_id: &str, card_id: &str, update: CardUpdate) -> bool {
        let Some(board) = self.board_mut(board_id) else {
            return false;
        };
        let now = dates::now();
        let Some(card) = board.card_mut(card_id) else {
            return false;
        };

        if let Some(title) = update.title {
            card.title = title;
        }
        if let Some(description) = update.description {
            card.description = description;
        }
        if let Some(completed) = update.completed {
            if completed && !card.completed {
                card.completed_at = Some(now);
            } else if !completed {
                card.completed_at = None;
            }
            card.completed = completed;
        }
        if let Some(due_date) = update.due_date {
            card.due_date = due_date;
        }
        if let Some(start_date) = update.start_date {
            card.start_date = start_date;
        }
        if let Some(end_date) = update.end_date {
            card.end_date = end_date;
        }
        if let Some(labels) = update.labels {
            card.labels = labels;
        }
        if let Some(mut checklist) = update.checklist {
            positions::reindex(&mut checklist);
            card.checklist = checklist;
        }
        if let Some(attachments) = update.attachments {
            card.attachments = attachments;
        }
        if let Some(members) = update.members {
            card.members = members;
        }
        if let Some(priority) = update.priority {
            card.priority = priority;
        }
        if let Some(tags) = update.tags {
            card.tags = tags;
        }
        card.updated_at = Some(now);
        board.updated_at = Some(now);
        self.persist();
        true
    }

    pub fn delete_card(&mut self, board_id: &str, card_id: &str) -> bool {
        let Some(board) = self.board_mut(board_id) else {
            return false;
        };
        let removed = board
            .lists
            .iter_mut()
            .find_map(|list| positions::remove_where(&mut list.cards, |c| c.id == card_id));
        if removed.is_none() {
            return false;
        }
        board.updated_at = Some(dates::now());
        self.persist();
        true
    }

    /// Move a card between (or within) lists.
    ///
    /// The card is taken out of the source list, which is renumbered, then
    /// inserted into the target at `new_position` and the target renumbered.
    /// `new_position` past the end lands at the end. Missing lists, or a card
    /// not in the source list, make this a no-op.
    pub fn move_card(
        &mut self,
        board_id: &str,
        card_id: &str,
        source_list_id: &str,
        target_list_id: &str,
        new_position: usize,
    ) -> bool {
        let Some(board) = self.board_mut(board_id) else {
            return false;
        };
        let source = board.lists.iter().position(|l| l.id == source_list_id);
        let target = board.lists.iter().position(|l| l.id == target_list_id);
        let (Some(source), Some(target)) = (source, target) else {
            return false;
        };

        let Some(mut card) =
            positions::remove_where(&mut board.lists[source].cards, |c| c.id == card_id)
        else {
            return false;
        };

        let now = dates::now();
        card.list_id = target_list_id.to_string();
        card.updated_at = Some(now);
        let landed = positions::insert_clamped(&mut board.lists[target].cards, new_position, card);
        board.updated_at = Some(now);

        log::debug!(
            "[brain.store] Moved card {} from {} to {} at {}",
            card_id,
            source_list_id,
            target_list_id,
            landed
        );
        self.persist();
        true
    }

    // ── Card details ────────────────────────────────────────────────────

    pub fn add_comment(
        &mut self,
        board_id: &str,
        card_id: &str,
        text: &str,
        author_id: &str,
    ) -> Option<String> {
        let board = self.board_mut(board_id)?;
        let card = board.card_mut(card_id)?;
        let now = dates::now();
        let id = generate_id("comment");
        card.comments.push(CardComment {
            id: id.clone(),
            text: text.to_string(),
            author_id: author_id.to_string(),
            created_at: Some(now),
        });
        card.updated_at = Some(now);
        board.updated_at = Some(now);
        self.persist();
        Some(id)
    }

    pub fn add_checklist_item(&mut self, board_id: &str, card_id: &str, text: &str) -> Option<String> {
        let board = self.board_mut(board_id)?;
        let card = board.card_mut(card_id)?;
        let now = dates::now();
        let id = generate_id("check");
        card.checklist.push(ChecklistItem {
            id: id.clone(),
            text: text.to_string(),
            completed: false,
            position: card.checklist.len(),
        });
        card.updated_at = Some(now);
        board.updated_at = Some(now);
        self.persist();
        Some(id)
    }

    /// Flip a checklist item. Returns its new completed state.
    pub fn toggle_checklist_item(&mut self, board_id: &str, card_id: &str, item_id: &str) -> Option<bool> {
        let board = self.board_mut(board_id)?;
        let card = board.card_mut(card_id)?;
        let item = card.checklist.iter_mut().find(|i| i.id == item_id)?;
        item.completed = !item.completed;
        let completed = item.completed;
        let now = dates::now();
        card.updated_at = Some(now);
        board.updated_at = Some(now);
        self.persist();
        Some(completed)
    }

    pub fn remove_checklist_item(&mut self, board_id: &str, card_id: &str, item_id: &str) -> bool {
        let Some(board) = self.board_mut(board_id) else {
            return false;
        };
        let now = dates::now();
        let Some(card) = board.card_mut(card_id) else {
            return false;
        };
        if positions::remove_where(&mut card.checklist, |i| i.id == item_id).is_none() {
            return false;
        }
        card.updated_at = Some(now);
        board.updated_at = Some(now);
        self.persist();
        true
    }
}
