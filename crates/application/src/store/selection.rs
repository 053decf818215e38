//! Transient selection state. Never persisted or synced.

use courier_domain::{Environment, Request};
use serde_json::{Map, Value};

use super::LocalStore;

/// What the user is currently looking at or editing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    /// Environment being edited in the environment dialog.
    pub editing_environment: Environment,
    /// Request loaded into the request editor.
    pub selected_request: Option<Request>,
    /// Editor options that came with the selected request.
    pub selected_request_options: Map<String, Value>,
    /// Request being edited in the save dialog.
    pub editing_request: Option<Request>,
    /// Pre-request script of the selected request.
    pub pre_request_script: String,
}

impl LocalStore {
    /// Loads a request into the request editor.
    pub fn select_request(&mut self, request: Request, options: Map<String, Value>) {
        self.selection.selected_request = Some(request);
        self.selection.selected_request_options = options;
    }

    /// Sets the pre-request script.
    pub fn select_pre_request_script(&mut self, script: impl Into<String>) {
        self.selection.pre_request_script = script.into();
    }

    /// Sets the request shown in the save dialog.
    pub fn set_editing_request(&mut self, request: Option<Request>) {
        self.selection.editing_request = request;
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{empty_state, store_with};
    use super::*;
    use serde_json::json;

    #[test]
    fn selection_is_independent_of_state() {
        let (mut store, _) = store_with(empty_state());
        let mut options = Map::new();
        options.insert("tab".to_string(), json!("headers"));

        store.select_request(Request::new("ping"), options);
        store.select_pre_request_script("pw.env.set('a', 1)");
        store.set_editing_request(Some(Request::new("draft")));

        let selection = store.selection();
        assert_eq!(selection.selected_request, Some(Request::new("ping")));
        assert_eq!(selection.selected_request_options["tab"], json!("headers"));
        assert_eq!(selection.pre_request_script, "pw.env.set('a', 1)");
        assert_eq!(selection.editing_request, Some(Request::new("draft")));
        assert_eq!(store.state(), &empty_state());
    }
}
