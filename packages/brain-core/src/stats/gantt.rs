use chrono::NaiveDate;
use serde::Serialize;

use super::day_of;
use crate::types::KanbanCard;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GanttBar {
    pub card_id: String,
    pub title: String,
    pub list_id: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Days from the chart start to the bar start.
    pub offset_days: i64,
    /// Length in days, both ends inclusive.
    pub duration_days: i64,
    pub completed: bool,
    pub overdue: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GanttChart {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub total_days: i64,
    pub bars: Vec<GanttBar>,
}

/// The (start, end) days a card occupies, if it carries any date.
/// Start falls back to due then end; end falls back to due then start.
fn card_span(card: &KanbanCard) -> Option<(NaiveDate, NaiveDate)> {
    let start = card.start_date.or(card.due_date).or(card.end_date)?;
    let end = card.end_date.or(card.due_date).unwrap_or(start);
    let (start, end) = (day_of(&start), day_of(&end));
    Some((start, end.max(start)))
}

/// Lay out dated cards on a shared timeline. `None` when no card has a date.
pub fn gantt<'a>(
    cards: impl IntoIterator<Item = &'a KanbanCard>,
    today: NaiveDate,
) -> Option<GanttChart> {
    let spans: Vec<(&KanbanCard, NaiveDate, NaiveDate)> = cards
        .into_iter()
        .filter_map(|card| card_span(card).map(|(s, e)| (card, s, e)))
        .collect();

    let start = spans.iter().map(|(_, s, _)| *s).min()?;
    let end = spans.iter().map(|(_, _, e)| *e).max()?;

    let mut bars: Vec<GanttBar> = spans
        .into_iter()
        .map(|(card, s, e)| GanttBar {
            card_id: card.id.clone(),
            title: card.title.clone(),
            list_id: card.list_id.clone(),
            start: s,
            end: e,
            offset_days: (s - start).num_days(),
            duration_days: (e - s).num_days() + 1,
            completed: card.completed,
            overdue: !card.completed && e < today,
        })
        .collect();
    bars.sort_by(|a, b| a.start.cmp(&b.start).then(a.end.cmp(&b.end)));

    Some(GanttChart {
        start,
        end,
        total_days: (end - start).num_days() + 1,
        bars,
    })
}
