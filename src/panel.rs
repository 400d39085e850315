// Ledger Panel state machine
//
//   Closed --open--> Loading --ok--> Loaded
//                       |  ^
//                     err  retry
//                       v  |
//                      Error
//
// Every fetch is tagged with a RequestId. Only the result carrying the id
// the panel is currently waiting for is applied; anything else is stale.

use crate::client::ApiError;
use crate::ledger::{Ledger, LedgerTotals};
use crate::model::{Tenant, TenantId, Transaction};
use std::fmt;

/// Monotonically increasing tag for ledger fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelState {
    Closed,
    Loading { tenant: Tenant, request: RequestId },
    Error { tenant: Tenant, message: String },
    Loaded { tenant: Tenant, ledger: Ledger },
}

/// Display mode without the payload, handy for assertions and status text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelMode {
    Closed,
    Loading,
    Error,
    Loaded,
}

/// What happened to a fetch result handed to [`LedgerPanel::apply`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// Superseded by a newer request, or the panel was closed meanwhile
    Stale,
}

#[derive(Debug, Clone)]
pub struct LedgerPanel {
    state: PanelState,
    last_request: u64,
    scroll: usize,
}

impl Default for LedgerPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerPanel {
    pub fn new() -> Self {
        Self {
            state: PanelState::Closed,
            last_request: 0,
            scroll: 0,
        }
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    pub fn mode(&self) -> PanelMode {
        match self.state {
            PanelState::Closed => PanelMode::Closed,
            PanelState::Loading { .. } => PanelMode::Loading,
            PanelState::Error { .. } => PanelMode::Error,
            PanelState::Loaded { .. } => PanelMode::Loaded,
        }
    }

    pub fn is_open(&self) -> bool {
        self.mode() != PanelMode::Closed
    }

    pub fn tenant(&self) -> Option<&Tenant> {
        match &self.state {
            PanelState::Closed => None,
            PanelState::Loading { tenant, .. }
            | PanelState::Error { tenant, .. }
            | PanelState::Loaded { tenant, .. } => Some(tenant),
        }
    }

    /// Request id of the fetch currently awaited, if any
    pub fn pending(&self) -> Option<RequestId> {
        match self.state {
            PanelState::Loading { request, .. } => Some(request),
            _ => None,
        }
    }

    pub fn ledger(&self) -> Option<&Ledger> {
        match &self.state {
            PanelState::Loaded { ledger, .. } => Some(ledger),
            _ => None,
        }
    }

    /// Totals exist only in the loaded state
    pub fn totals(&self) -> Option<&LedgerTotals> {
        self.ledger().map(Ledger::totals)
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// Select a tenant: drop whatever was shown and wait for a new fetch.
    pub fn open(&mut self, tenant: Tenant) -> RequestId {
        self.last_request += 1;
        let request = RequestId(self.last_request);
        self.scroll = 0;
        self.state = PanelState::Loading { tenant, request };
        request
    }

    /// Re-issue the fetch for the tenant whose load failed.
    ///
    /// Only meaningful in the error state; returns the new request id and the
    /// tenant to fetch.
    pub fn retry(&mut self) -> Option<(RequestId, TenantId)> {
        let tenant = match &self.state {
            PanelState::Error { tenant, .. } => tenant.clone(),
            _ => return None,
        };
        let tenant_id = tenant.id;
        Some((self.open(tenant), tenant_id))
    }

    pub fn close(&mut self) {
        self.state = PanelState::Closed;
        self.scroll = 0;
    }

    pub fn apply(
        &mut self,
        request: RequestId,
        result: Result<Vec<Transaction>, ApiError>,
    ) -> ApplyOutcome {
        let tenant = match &self.state {
            PanelState::Loading { tenant, request: pending } if *pending == request => {
                tenant.clone()
            }
            _ => return ApplyOutcome::Stale,
        };

        self.state = match result {
            Ok(transactions) => PanelState::Loaded {
                tenant,
                ledger: Ledger::new(transactions),
            },
            Err(e) => PanelState::Error {
                tenant,
                message: e.to_string(),
            },
        };
        ApplyOutcome::Applied
    }

    pub fn scroll_down(&mut self) {
        let len = self.ledger().map(Ledger::len).unwrap_or(0);
        if self.scroll + 1 < len {
            self.scroll += 1;
        }
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll = self.ledger().map(Ledger::len).unwrap_or(0).saturating_sub(1);
    }
}
