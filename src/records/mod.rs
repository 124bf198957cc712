//! Paginated CRUD cache over the `/records` resource.
//!
//! The server is the source of truth; this store holds the currently loaded
//! page. `list` replaces the page wholesale, while `create`/`update`/`delete`
//! patch the cache optimistically from the server's canonical response
//! without re-fetching. A record mutated on the server but absent from the
//! loaded page leaves the cache untouched until the next `list`.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::client::{HttpClient, Result};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Direction of money movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Income,
    Expense,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Income => "income",
            RecordKind::Expense => "expense",
        }
    }
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "income" => Ok(RecordKind::Income),
            "expense" => Ok(RecordKind::Expense),
            other => Err(format!(
                "invalid record type '{other}', expected 'income' or 'expense'"
            )),
        }
    }
}

/// A single income or expense record, as the server returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub amount: f64,
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub record_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a record.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecord {
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub amount: f64,
    pub category: String,
    pub description: String,
    pub record_date: NaiveDate,
}

/// Partial update; unset fields are left untouched by the server.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPatch {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<RecordKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_date: Option<NaiveDate>,
}

impl RecordPatch {
    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.amount.is_none()
            && self.category.is_none()
            && self.description.is_none()
            && self.record_date.is_none()
    }
}

/// Server-side filters for `list`.
#[derive(Debug, Clone, Default)]
pub struct RecordFilters {
    pub kind: Option<RecordKind>,
    pub category: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl RecordFilters {
    fn apply(&self, query: &mut Vec<(&'static str, String)>) {
        if let Some(kind) = self.kind {
            query.push(("type", kind.as_str().to_string()));
        }
        if let Some(category) = &self.category {
            query.push(("category", category.clone()));
        }
        if let Some(date) = self.start_date {
            query.push(("start_date", date.to_string()));
        }
        if let Some(date) = self.end_date {
            query.push(("end_date", date.to_string()));
        }
    }
}

#[derive(Debug, Deserialize)]
struct RecordListData {
    records: Vec<Record>,
    total: u64,
    page: u32,
}

/// Aggregates over the currently loaded page, not the full dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    pub income: f64,
    pub expense: f64,
    pub balance: f64,
    pub count: usize,
}

struct PageState {
    records: Vec<Record>,
    total: u64,
    current_page: u32,
    page_size: u32,
}

pub struct RecordStore {
    client: HttpClient,
    state: RwLock<PageState>,
}

impl RecordStore {
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            state: RwLock::new(PageState {
                records: Vec::new(),
                total: 0,
                current_page: 1,
                page_size: DEFAULT_PAGE_SIZE,
            }),
        }
    }

    /// Fetch a page of records, replacing the cached page wholesale.
    pub async fn list(&self, filters: &RecordFilters) -> Result<Vec<Record>> {
        let mut query = {
            let state = self.state.read();
            vec![
                ("page", state.current_page.to_string()),
                ("page_size", state.page_size.to_string()),
            ]
        };
        filters.apply(&mut query);

        let data: RecordListData = self.client.get_query("/records", &query).await?;

        let mut state = self.state.write();
        state.records = data.records;
        state.total = data.total;
        state.current_page = data.page;
        Ok(state.records.clone())
    }

    /// Create a record and prepend the server's canonical copy to the loaded
    /// page. No re-fetch.
    pub async fn create(&self, record: &NewRecord) -> Result<Record> {
        let created: Record = self.client.post("/records", record).await?;
        let mut state = self.state.write();
        state.records.insert(0, created.clone());
        state.total += 1;
        Ok(created)
    }

    /// Update a record; the cached copy is replaced in place when present.
    pub async fn update(&self, id: &str, patch: &RecordPatch) -> Result<Record> {
        let updated: Record = self
            .client
            .put(&format!("/records/{id}"), patch)
            .await?;
        let mut state = self.state.write();
        if let Some(pos) = state.records.iter().position(|r| r.id == id) {
            state.records[pos] = updated.clone();
        }
        Ok(updated)
    }

    /// Delete a record; the cached copy and the total are adjusted only when
    /// the record was on the loaded page.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete::<()>(&format!("/records/{id}")).await?;
        let mut state = self.state.write();
        if let Some(pos) = state.records.iter().position(|r| r.id == id) {
            state.records.remove(pos);
            state.total = state.total.saturating_sub(1);
        }
        Ok(())
    }

    /// Fetch one record without touching the cache.
    pub async fn get_one(&self, id: &str) -> Result<Record> {
        self.client.get(&format!("/records/{id}")).await
    }

    /// Currently loaded page.
    pub fn records(&self) -> Vec<Record> {
        self.state.read().records.clone()
    }

    pub fn total(&self) -> u64 {
        self.state.read().total
    }

    pub fn current_page(&self) -> u32 {
        self.state.read().current_page
    }

    pub fn page_size(&self) -> u32 {
        self.state.read().page_size
    }

    pub fn total_pages(&self) -> u32 {
        let state = self.state.read();
        page_count(state.total, state.page_size)
    }

    /// Aggregates over the loaded page only; callers must not read these as
    /// dataset-wide totals.
    pub fn statistics(&self) -> Statistics {
        let state = self.state.read();
        let income: f64 = state
            .records
            .iter()
            .filter(|r| r.kind == RecordKind::Income)
            .map(|r| r.amount)
            .sum();
        let expense: f64 = state
            .records
            .iter()
            .filter(|r| r.kind == RecordKind::Expense)
            .map(|r| r.amount)
            .sum();
        Statistics {
            income,
            expense,
            balance: income - expense,
            count: state.records.len(),
        }
    }

    /// Position the cursor without fetching; used before an explicit `list`.
    pub fn set_page(&self, page: u32) {
        self.state.write().current_page = page.max(1);
    }

    /// Jump to `page` and re-fetch. Out-of-range pages are a no-op.
    pub async fn go_to_page(&self, page: u32) -> Result<()> {
        let in_range = {
            let state = self.state.read();
            page >= 1 && page <= page_count(state.total, state.page_size)
        };
        if !in_range {
            return Ok(());
        }
        self.state.write().current_page = page;
        self.list(&RecordFilters::default()).await?;
        Ok(())
    }

    pub async fn next_page(&self) -> Result<()> {
        let next = self.current_page() + 1;
        self.go_to_page(next).await
    }

    pub async fn prev_page(&self) -> Result<()> {
        let current = self.current_page();
        if current > 1 {
            self.go_to_page(current - 1).await?;
        }
        Ok(())
    }
}

fn page_count(total: u64, page_size: u32) -> u32 {
    let page_size = u64::from(page_size.max(1));
    ((total + page_size - 1) / page_size) as u32
}
