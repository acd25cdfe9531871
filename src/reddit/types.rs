use serde::{Deserialize, Serialize};
use std::fmt;

/// Ranking horizon of a "top" listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    Hour,
    Day,
    #[default]
    Week,
    Month,
    Year,
    All,
}

impl TimeWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::Hour => "hour",
            TimeWindow::Day => "day",
            TimeWindow::Week => "week",
            TimeWindow::Month => "month",
            TimeWindow::Year => "year",
            TimeWindow::All => "all",
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One post eligible to be sent as a reply.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Candidate {
    #[serde(rename = "subreddit")]
    pub channel: String,
    pub title: String,
    pub url: String,
}

impl Candidate {
    /// Reply text sent to the chat.
    pub fn to_reply(&self) -> String {
        format!("/r/{}: {} {}", self.channel, self.title, self.url)
    }
}

// Listing envelope: {"data": {"children": [{"data": {...}}]}}
#[derive(Debug, Deserialize)]
pub(crate) struct ListingResponse {
    pub data: ListingData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListingData {
    #[serde(default)]
    pub children: Vec<ListingChild>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListingChild {
    pub data: Candidate,
}

impl ListingResponse {
    pub fn into_candidates(self) -> Vec<Candidate> {
        self.data.children.into_iter().map(|c| c.data).collect()
    }
}
