use std::collections::{BTreeMap, HashMap};

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use super::{day_of, percent};
use crate::types::{KanbanBoard, Priority};

const DUE_SOON_DAYS: i64 = 7;
const TOP_TAGS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListStats {
    pub list_id: String,
    pub title: String,
    pub card_count: usize,
    pub completed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wip_limit: Option<u32>,
    pub over_wip_limit: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSummary {
    pub board_id: String,
    pub total_cards: usize,
    pub completed_cards: usize,
    pub completion_percent: f64,
    pub overdue_cards: usize,
    /// Open cards due within the next week, today included.
    pub due_soon_cards: usize,
    pub by_priority: BTreeMap<Priority, usize>,
    pub lists: Vec<ListStats>,
    /// Most used tags and label names, most frequent first.
    pub top_tags: Vec<(String, usize)>,
}

/// Dashboard figures for one board. Archived lists are left out.
pub fn summarize(board: &KanbanBoard, today: NaiveDate) -> BoardSummary {
    let lists: Vec<_> = board.lists.iter().filter(|l| !l.archived).collect();
    let cards: Vec<_> = lists.iter().flat_map(|l| l.cards.iter()).collect();

    let completed_cards = cards.iter().filter(|c| c.completed).count();
    let soon = today + Duration::days(DUE_SOON_DAYS);
    let open_due: Vec<NaiveDate> = cards
        .iter()
        .filter(|c| !c.completed)
        .filter_map(|c| c.due_date.as_ref().map(day_of))
        .collect();
    let overdue_cards = open_due.iter().filter(|d| **d < today).count();
    let due_soon_cards = open_due.iter().filter(|d| **d >= today && **d < soon).count();

    let mut by_priority = BTreeMap::new();
    for card in &cards {
        *by_priority.entry(card.priority).or_insert(0) += 1;
    }

    let mut tag_counts: HashMap<String, usize> = HashMap::new();
    for card in &cards {
        let names = card
            .tags
            .iter()
            .map(|t| t.trim().trim_start_matches('#'))
            .chain(card.labels.iter().map(|l| l.name.trim()))
            .filter(|t| !t.is_empty());
        for name in names {
            *tag_counts.entry(name.to_lowercase()).or_insert(0) += 1;
        }
    }
    let mut top_tags: Vec<(String, usize)> = tag_counts.into_iter().collect();
    top_tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    top_tags.truncate(TOP_TAGS);

    BoardSummary {
        board_id: board.id.clone(),
        total_cards: cards.len(),
        completed_cards,
        completion_percent: percent(completed_cards, cards.len()),
        overdue_cards,
        due_soon_cards,
        by_priority,
        lists: lists
            .iter()
            .map(|l| ListStats {
                list_id: l.id.clone(),
                title: l.title.clone(),
                card_count: l.cards.len(),
                completed: l.cards.iter().filter(|c| c.completed).count(),
                wip_limit: l.wip_limit,
                over_wip_limit: l.is_over_wip_limit(),
            })
            .collect(),
        top_tags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::parse_iso;
    use crate::stats::fixtures::card;
    use crate::storage::default_board;
    use crate::types::CardLabel;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_empty_board() {
        let summary = summarize(&default_board(), day(2024, 1, 1));
        assert_eq!(summary.total_cards, 0);
        assert_eq!(summary.completion_percent, 0.0);
        assert_eq!(summary.lists.len(), 4);
        assert!(summary.top_tags.is_empty());
    }

    #[test]
    fn test_counts() {
        let mut board = default_board();
        let inbox = board.lists[0].id.clone();

        let mut overdue = card("overdue", &inbox);
        overdue.due_date = parse_iso("2024-01-05T00:00:00Z");
        overdue.priority = Priority::High;
        overdue.tags = vec!["#Work".to_string()];

        let mut soon = card("soon", &inbox);
        soon.due_date = parse_iso("2024-01-12T00:00:00Z");
        soon.tags = vec!["work".to_string(), "home".to_string()];

        let mut done = card("done", &inbox);
        done.completed = true;
        done.due_date = parse_iso("2024-01-01T00:00:00Z");
        done.labels = vec![CardLabel {
            id: "lb1".to_string(),
            name: "Work".to_string(),
            color: "red".to_string(),
        }];

        board.lists[0].cards = vec![overdue, soon, done];
        board.lists[0].wip_limit = Some(2);
        board.lists[3].archived = true;

        let summary = summarize(&board, day(2024, 1, 10));
        assert_eq!(summary.total_cards, 3);
        assert_eq!(summary.completed_cards, 1);
        assert_eq!(summary.overdue_cards, 1);
        assert_eq!(summary.due_soon_cards, 1);
        assert_eq!(summary.by_priority.get(&Priority::High), Some(&1));
        assert_eq!(summary.by_priority.get(&Priority::Medium), Some(&2));
        assert_eq!(summary.lists.len(), 3);
        assert!(summary.lists[0].over_wip_limit);
        assert_eq!(summary.top_tags[0], ("work".to_string(), 3));
        assert_eq!(summary.top_tags[1], ("home".to_string(), 1));
    }
}
