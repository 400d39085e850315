// Tenant Directory state
//
// Loaded once at startup. A failure takes over the whole view and the only
// way out is a full reload.

use crate::client::ApiError;
use crate::model::Tenant;

#[derive(Debug, Clone, PartialEq)]
pub enum DirectoryState {
    Loading,
    Failed { message: String },
    Loaded { tenants: Vec<Tenant> },
}

#[derive(Debug, Clone)]
pub struct TenantDirectory {
    state: DirectoryState,
    cursor: usize,
}

impl Default for TenantDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl TenantDirectory {
    pub fn new() -> Self {
        Self {
            state: DirectoryState::Loading,
            cursor: 0,
        }
    }

    pub fn state(&self) -> &DirectoryState {
        &self.state
    }

    pub fn begin_load(&mut self) {
        self.state = DirectoryState::Loading;
        self.cursor = 0;
    }

    /// Store the fetched tenants in server order, or switch to the error view.
    pub fn apply(&mut self, result: Result<Vec<Tenant>, ApiError>) {
        self.cursor = 0;
        self.state = match result {
            Ok(tenants) => DirectoryState::Loaded { tenants },
            Err(e) => DirectoryState::Failed {
                message: e.to_string(),
            },
        };
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, DirectoryState::Loading)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.state, DirectoryState::Failed { .. })
    }

    pub fn tenants(&self) -> &[Tenant] {
        match &self.state {
            DirectoryState::Loaded { tenants } => tenants,
            _ => &[],
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Tenant under the cursor
    pub fn highlighted(&self) -> Option<&Tenant> {
        self.tenants().get(self.cursor)
    }

    pub fn next(&mut self) {
        let len = self.tenants().len();
        if len > 0 && self.cursor < len - 1 {
            self.cursor += 1;
        }
    }

    pub fn previous(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn first(&mut self) {
        self.cursor = 0;
    }

    pub fn last(&mut self) {
        self.cursor = self.tenants().len().saturating_sub(1);
    }
}
