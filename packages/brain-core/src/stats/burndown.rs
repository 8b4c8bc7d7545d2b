use chrono::{Duration, NaiveDate};
use serde::Serialize;

use super::{day_of, gantt, percent};
use crate::types::{KanbanBoard, KanbanCard};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BurndownPoint {
    pub date: NaiveDate,
    /// Open cards at the end of this day; `None` for days after `today`.
    pub remaining: Option<usize>,
    /// The straight line from `total_work` on day one to 0 on the last day.
    pub ideal: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Burndown {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub total_work: usize,
    pub completed_work: usize,
    pub remaining_work: usize,
    pub completion_percent: f64,
    /// Average cards completed per elapsed day.
    pub velocity: f64,
    pub projected_completion: Option<NaiveDate>,
    pub points: Vec<BurndownPoint>,
}

/// Longest window a burndown covers, about ten years. Longer windows keep
/// their last `MAX_WINDOW_DAYS` days.
pub const MAX_WINDOW_DAYS: i64 = 3660;

/// Burndown of `cards` over the inclusive window `start..=end`.
///
/// A completed card counts from its completion day; cards completed without
/// any recorded date count from the first day.
pub fn burndown<'a>(
    cards: impl IntoIterator<Item = &'a KanbanCard>,
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
) -> Burndown {
    let end = end.max(start);
    let start = if (end - start).num_days() >= MAX_WINDOW_DAYS {
        end - Duration::days(MAX_WINDOW_DAYS - 1)
    } else {
        start
    };

    let mut total_work = 0;
    let mut completion_days: Vec<NaiveDate> = Vec::new();
    for card in cards {
        total_work += 1;
        if card.completed {
            completion_days.push(card.completion_date().map(|d| day_of(&d)).unwrap_or(start));
        }
    }
    completion_days.sort_unstable();
    let completed_work = completion_days.len();
    let remaining_work = total_work - completed_work;

    let days = (end - start).num_days() + 1;
    let points = (0..days)
        .map(|i| {
            let date = start + Duration::days(i);
            let ideal = if days > 1 {
                total_work as f64 * (1.0 - i as f64 / (days - 1) as f64)
            } else {
                0.0
            };
            let remaining = (date <= today)
                .then(|| total_work - completion_days.partition_point(|d| *d <= date));
            BurndownPoint {
                date,
                remaining,
                ideal,
            }
        })
        .collect();

    let elapsed = ((today.min(end) - start).num_days() + 1).max(1);
    let velocity = completed_work as f64 / elapsed as f64;

    let projected_completion = if total_work > 0 && remaining_work == 0 {
        completion_days.last().copied()
    } else if remaining_work > 0 && velocity > 0.0 {
        project(today, remaining_work as f64 / velocity)
    } else {
        None
    };

    Burndown {
        start,
        end,
        total_work,
        completed_work,
        remaining_work,
        completion_percent: percent(completed_work, total_work),
        velocity,
        projected_completion,
        points,
    }
}

/// `today` plus `days_left` rounded up, or `None` past the calendar range.
fn project(today: NaiveDate, days_left: f64) -> Option<NaiveDate> {
    let days = days_left.ceil();
    if !days.is_finite() || days > i64::MAX as f64 {
        return None;
    }
    Duration::try_days(days as i64).and_then(|d| today.checked_add_signed(d))
}

/// Burndown over a board's project window: the Gantt window when cards are
/// dated, otherwise from the earliest creation date up to today.
pub fn board_burndown(board: &KanbanBoard, today: NaiveDate) -> Burndown {
    let (start, end) = match gantt(board.all_cards(), today) {
        Some(chart) => (chart.start, chart.end),
        None => {
            let start = board
                .all_cards()
                .filter_map(|c| c.created_at)
                .chain(board.created_at)
                .map(|d| day_of(&d))
                .min()
                .unwrap_or(today);
            (start, today.max(start))
        }
    };
    burndown(board.all_cards(), start, end, today)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::fixtures::{card, done_on};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_zero_cards() {
        let cards: Vec<KanbanCard> = Vec::new();
        let b = burndown(&cards, day(2024, 1, 1), day(2024, 1, 5), day(2024, 1, 3));
        assert_eq!(b.total_work, 0);
        assert_eq!(b.completion_percent, 0.0);
        assert!(!b.completion_percent.is_nan());
        assert_eq!(b.velocity, 0.0);
        assert_eq!(b.projected_completion, None);
        assert_eq!(b.points.len(), 5);
        assert_eq!(b.points[0].remaining, Some(0));
        assert_eq!(b.points[4].remaining, None);
    }

    #[test]
    fn test_remaining_per_day_and_ideal_line() {
        let cards = vec![
            done_on(card("a", "l1"), "2024-01-02T10:00:00Z"),
            done_on(card("b", "l1"), "2024-01-03T10:00:00Z"),
            card("c", "l1"),
            card("d", "l1"),
        ];
        let b = burndown(&cards, day(2024, 1, 1), day(2024, 1, 5), day(2024, 1, 4));
        let remaining: Vec<Option<usize>> = b.points.iter().map(|p| p.remaining).collect();
        assert_eq!(remaining, vec![Some(4), Some(3), Some(2), Some(2), None]);
        assert_eq!(b.points[0].ideal, 4.0);
        assert_eq!(b.points[2].ideal, 2.0);
        assert_eq!(b.points[4].ideal, 0.0);
        assert_eq!(b.completion_percent, 50.0);
        // 2 cards over 4 elapsed days
        assert_eq!(b.velocity, 0.5);
        assert_eq!(b.projected_completion, Some(day(2024, 1, 8)));
    }

    #[test]
    fn test_all_done_projects_last_completion() {
        let cards = vec![
            done_on(card("a", "l1"), "2024-01-02T00:00:00Z"),
            done_on(card("b", "l1"), "2024-01-04T00:00:00Z"),
        ];
        let b = burndown(&cards, day(2024, 1, 1), day(2024, 1, 10), day(2024, 1, 6));
        assert_eq!(b.completion_percent, 100.0);
        assert_eq!(b.projected_completion, Some(day(2024, 1, 4)));
    }

    #[test]
    fn test_single_day_window() {
        let cards = vec![card("a", "l1")];
        let b = burndown(&cards, day(2024, 1, 1), day(2024, 1, 1), day(2024, 1, 1));
        assert_eq!(b.points.len(), 1);
        assert_eq!(b.points[0].ideal, 0.0);
        assert_eq!(b.projected_completion, None);
    }

    #[test]
    fn test_distant_start_projects_without_overflow() {
        let mut cards = vec![done_on(card("done", "l1"), "2026-10-01T00:00:00Z")];
        cards.extend((0..200).map(|i| card(&format!("open-{}", i), "l1")));
        let today = day(2026, 10, 18);

        let b = burndown(&cards, day(1, 1, 1), today, today);
        assert_eq!(b.end, today);
        assert_eq!(b.points.len() as i64, MAX_WINDOW_DAYS);
        assert_eq!(b.remaining_work, 200);
        assert!(b.velocity > 0.0);
        assert!(b.projected_completion.unwrap() > today);
    }

    #[test]
    fn test_projection_past_calendar_is_none() {
        assert_eq!(project(day(2026, 1, 1), 1.0e12), None);
        assert_eq!(project(day(2026, 1, 1), f64::INFINITY), None);
        assert_eq!(project(day(2026, 1, 1), 1.5), Some(day(2026, 1, 3)));
    }

    #[test]
    fn test_window_capped_to_last_days() {
        let cards = vec![card("a", "l1")];
        let end = day(2024, 1, 1);
        let b = burndown(&cards, day(1900, 1, 1), end, end);
        assert_eq!(b.points.len() as i64, MAX_WINDOW_DAYS);
        assert_eq!(b.points.last().unwrap().date, end);
        assert_eq!(b.start, end - Duration::days(MAX_WINDOW_DAYS - 1));
    }

    #[test]
    fn test_board_burndown_empty_board() {
        let board: KanbanBoard =
            serde_json::from_str(r#"{"id":"b1","title":"Empty","createdAt":"2024-01-01T00:00:00Z"}"#)
                .unwrap();
        let b = board_burndown(&board, day(2024, 1, 3));
        assert_eq!(b.start, day(2024, 1, 1));
        assert_eq!(b.end, day(2024, 1, 3));
        assert_eq!(b.total_work, 0);
        assert_eq!(b.completion_percent, 0.0);
    }
}
