use serde::{Deserialize, Deserializer, Serialize};

use crate::dates::{self, Timestamp};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" | "normal" => Some(Self::Medium),
            "high" => Some(Self::High),
            "urgent" => Some(Self::Urgent),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardLabel {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardComment {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub author_id: String,
    #[serde(default, with = "dates::lenient", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardAttachment {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, with = "dates::lenient", skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardMember {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default = "default_member_role")]
    pub role: String,
}

fn default_member_role() -> String {
    "member".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KanbanCard {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub list_id: String,
    pub board_id: String,
    #[serde(default)]
    pub position: usize,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, with = "dates::lenient", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Timestamp>,
    #[serde(default, with = "dates::lenient", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Timestamp>,
    #[serde(default, with = "dates::lenient", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Timestamp>,
    /// When the card last moved to completed. Cleared when reopened.
    #[serde(default, with = "dates::lenient", skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
    #[serde(default)]
    pub labels: Vec<CardLabel>,
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
    #[serde(default)]
    pub comments: Vec<CardComment>,
    #[serde(default)]
    pub attachments: Vec<CardAttachment>,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, with = "dates::lenient", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(default, with = "dates::lenient", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl KanbanCard {
    /// When the card counts as done for statistics.
    pub fn completion_date(&self) -> Option<Timestamp> {
        if !self.completed {
            return None;
        }
        self.completed_at.or(self.updated_at)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KanbanList {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub position: usize,
    pub board_id: String,
    #[serde(default)]
    pub cards: Vec<KanbanCard>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wip_limit: Option<u32>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default, with = "dates::lenient", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(default, with = "dates::lenient", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl KanbanList {
    pub fn is_over_wip_limit(&self) -> bool {
        self.wip_limit
            .map_or(false, |limit| self.cards.len() > limit as usize)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KanbanBoard {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub lists: Vec<KanbanList>,
    #[serde(default, with = "dates::lenient", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(default, with = "dates::lenient", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub members: Vec<BoardMember>,
}

impl KanbanBoard {
    pub fn list(&self, list_id: &str) -> Option<&KanbanList> {
        self.lists.iter().find(|l| l.id == list_id)
    }

    pub fn list_mut(&mut self, list_id: &str) -> Option<&mut KanbanList> {
        self.lists.iter_mut().find(|l| l.id == list_id)
    }

    /// All cards on the board, in list order then card order.
    pub fn all_cards(&self) -> impl Iterator<Item = &KanbanCard> {
        self.lists.iter().flat_map(|list| list.cards.iter())
    }

    pub fn card(&self, card_id: &str) -> Option<&KanbanCard> {
        self.all_cards().find(|c| c.id == card_id)
    }

    pub fn card_mut(&mut self, card_id: &str) -> Option<&mut KanbanCard> {
        self.lists
            .iter_mut()
            .flat_map(|list| list.cards.iter_mut())
            .find(|c| c.id == card_id)
    }
}

/// Summary info for a board in list responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardInfo {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    pub lists: Vec<ListSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSummary {
    pub id: String,
    pub position: usize,
    pub title: String,
    pub card_count: usize,
}

impl From<&KanbanBoard> for BoardInfo {
    fn from(board: &KanbanBoard) -> Self {
        Self {
            id: board.id.clone(),
            title: board.title.clone(),
            updated_at: board.updated_at.as_ref().map(dates::format_iso),
            lists: board
                .lists
                .iter()
                .filter(|l| !l.archived)
                .map(|l| ListSummary {
                    id: l.id.clone(),
                    position: l.position,
                    title: l.title.clone(),
                    card_count: l.cards.len(),
                })
                .collect(),
        }
    }
}

// ── Creation inputs and shallow-merge updates ───────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBoard {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_public: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewList {
    pub title: String,
    #[serde(default)]
    pub wip_limit: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCard {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, with = "dates::lenient")]
    pub due_date: Option<Timestamp>,
    #[serde(default, with = "dates::lenient")]
    pub start_date: Option<Timestamp>,
    #[serde(default, with = "dates::lenient")]
    pub end_date: Option<Timestamp>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub labels: Vec<CardLabel>,
}

/// Fields left as `None` are not touched. For clearable fields the outer
/// `Option` marks presence and the inner one the new value (`null` clears).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardUpdate {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    pub is_public: Option<bool>,
    pub members: Option<Vec<BoardMember>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUpdate {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub wip_limit: Option<Option<u32>>,
    pub archived: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardUpdate {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
    #[serde(default, deserialize_with = "present_date")]
    pub due_date: Option<Option<Timestamp>>,
    #[serde(default, deserialize_with = "present_date")]
    pub start_date: Option<Option<Timestamp>>,
    #[serde(default, deserialize_with = "present_date")]
    pub end_date: Option<Option<Timestamp>>,
    pub labels: Option<Vec<CardLabel>>,
    pub checklist: Option<Vec<ChecklistItem>>,
    pub attachments: Option<Vec<CardAttachment>>,
    pub members: Option<Vec<String>>,
    pub priority: Option<Priority>,
    pub tags: Option<Vec<String>>,
}

fn present<'de, T, D>(d: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(d).map(Some)
}

fn present_date<'de, D>(d: D) -> Result<Option<Option<Timestamp>>, D::Error>
where
    D: Deserializer<'de>,
{
    dates::lenient::deserialize(d).map(Some)
}
