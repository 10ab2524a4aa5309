//! Implements the `Sheet` trait using in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without using Google Sheets. The tabs live in a process-global map keyed by
//! spreadsheet id, so separate `TestSheet` instances (and separate commands) see the same data.

use crate::api::Sheet;
use crate::Result;
use anyhow::{bail, Context};
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

/// The tabs of one spreadsheet, first tab first.
pub(crate) type Tabs = Vec<(String, Vec<Vec<String>>)>;

fn store() -> &'static Mutex<HashMap<String, Tabs>> {
    static STORE: OnceLock<Mutex<HashMap<String, Tabs>>> = OnceLock::new();
    STORE.get_or_init(|| Mutex::new(HashMap::new()))
}

#[cfg(test)]
/// Returns a copy of all tabs of the spreadsheet `spreadsheet_id`.
pub(crate) fn get_state(spreadsheet_id: &str) -> Tabs {
    store()
        .lock()
        .map(|map| map.get(spreadsheet_id).cloned().unwrap_or_default())
        .unwrap_or_default()
}

#[cfg(test)]
/// Replaces all tabs of the spreadsheet `spreadsheet_id`.
pub(crate) fn set_state(spreadsheet_id: &str, tabs: Tabs) {
    if let Ok(mut map) = store().lock() {
        map.insert(spreadsheet_id.to_string(), tabs);
    }
}

/// An implementation of the `Sheet` trait that does not use Google sheets.
#[derive(Debug, Clone)]
pub(crate) struct TestSheet {
    spreadsheet_id: String,
}

impl TestSheet {
    pub(crate) fn new(spreadsheet_id: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
        }
    }

    /// Runs `f` against the tabs of this spreadsheet while holding the lock.
    fn with_tabs<T>(&self, f: impl FnOnce(&mut Tabs) -> Result<T>) -> Result<T> {
        let mut map = match store().lock() {
            Ok(map) => map,
            Err(_) => bail!("The in-memory sheet store is poisoned"),
        };
        f(map.entry(self.spreadsheet_id.clone()).or_default())
    }
}

fn tab<'a>(tabs: &'a mut Tabs, name: &str) -> Result<&'a mut Vec<Vec<String>>> {
    tabs.iter_mut()
        .find(|(title, _)| title == name)
        .map(|(_, rows)| rows)
        .with_context(|| format!("Sheet '{name}' not found"))
}

#[async_trait::async_trait]
impl Sheet for TestSheet {
    async fn exists(&mut self, name: &str) -> Result<bool> {
        self.with_tabs(|tabs| Ok(tabs.iter().any(|(title, _)| title == name)))
    }

    async fn create(&mut self, name: &str, header: &[String]) -> Result<()> {
        self.with_tabs(|tabs| {
            if tabs.iter().any(|(title, _)| title == name) {
                bail!("A sheet with the name \"{name}\" already exists");
            }
            tabs.insert(0, (name.to_string(), vec![header.to_vec()]));
            Ok(())
        })
    }

    async fn get(&mut self, name: &str) -> Result<Vec<Vec<String>>> {
        self.with_tabs(|tabs| Ok(tab(tabs, name)?.clone()))
    }

    async fn last_row(&mut self, name: &str) -> Result<usize> {
        self.with_tabs(|tabs| Ok(tab(tabs, name)?.len()))
    }

    async fn get_row(&mut self, name: &str, row: usize) -> Result<Vec<String>> {
        self.with_tabs(|tabs| {
            let rows = tab(tabs, name)?;
            Ok(row
                .checked_sub(1)
                .and_then(|index| rows.get(index))
                .cloned()
                .unwrap_or_default())
        })
    }

    async fn write_row(&mut self, name: &str, row: usize, values: &[String]) -> Result<()> {
        self.with_tabs(|tabs| {
            let rows = tab(tabs, name)?;
            let index = row.checked_sub(1).context("Row numbers start at 1")?;
            if rows.len() <= index {
                rows.resize(index + 1, Vec::new());
            }
            rows[index] = values.to_vec();
            Ok(())
        })
    }

    async fn delete_row(&mut self, name: &str, row: usize) -> Result<()> {
        self.with_tabs(|tabs| {
            let rows = tab(tabs, name)?;
            let index = row.checked_sub(1).context("Row numbers start at 1")?;
            if index >= rows.len() {
                bail!("Row {row} of '{name}' does not exist");
            }
            rows.remove(index);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_create_write_delete() {
        let id = uuid::Uuid::new_v4().to_string();
        let mut sheet = TestSheet::new(&id);
        assert!(!sheet.exists("a").await.unwrap());

        sheet.create("a", &strings(&["h1", "h2"])).await.unwrap();
        sheet.create("b", &strings(&["h1", "h2"])).await.unwrap();
        assert!(sheet.exists("a").await.unwrap());
        assert!(sheet.create("a", &[]).await.is_err());

        let titles: Vec<String> = get_state(&id).into_iter().map(|(t, _)| t).collect();
        assert_eq!(titles, vec!["b", "a"]);

        sheet.write_row("a", 2, &strings(&["x", "1"])).await.unwrap();
        sheet.write_row("a", 3, &strings(&["y", "2"])).await.unwrap();
        assert_eq!(sheet.last_row("a").await.unwrap(), 3);
        assert_eq!(sheet.get_row("a", 3).await.unwrap(), strings(&["y", "2"]));

        sheet.delete_row("a", 2).await.unwrap();
        assert_eq!(
            sheet.get("a").await.unwrap(),
            vec![strings(&["h1", "h2"]), strings(&["y", "2"])]
        );
        assert!(sheet.delete_row("a", 9).await.is_err());
        assert!(sheet.get("missing").await.is_err());
    }

    #[tokio::test]
    async fn test_state_is_shared() {
        let id = uuid::Uuid::new_v4().to_string();
        set_state(&id, vec![("t".to_string(), vec![strings(&["h"])])]);
        let mut sheet = TestSheet::new(&id);
        assert_eq!(sheet.last_row("t").await.unwrap(), 1);
        assert_eq!(sheet.get_row("t", 5).await.unwrap(), Vec::<String>::new());
    }
}
