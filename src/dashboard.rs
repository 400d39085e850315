// Dashboard controller
//
// `Dashboard` owns every piece of view state (the tenant directory, the
// ledger panel) and is the only thing that mutates it. Fetches run as tokio
// tasks and report back through an `AppEvent` channel; the event loop
// feeds those events into `Dashboard::handle_event`.

use crate::client::{ApiError, LedgerApi};
use crate::directory::TenantDirectory;
use crate::model::{Tenant, TenantId, Transaction};
use crate::panel::{ApplyOutcome, LedgerPanel, RequestId};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Results of background fetches
#[derive(Debug)]
pub enum AppEvent {
    TenantsLoaded(Result<Vec<Tenant>, ApiError>),
    LedgerLoaded {
        request: RequestId,
        tenant_id: TenantId,
        result: Result<Vec<Transaction>, ApiError>,
    },
}

/// User intents, independent of the input device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Up,
    Down,
    First,
    Last,
    Open,
    Retry,
    Close,
    Quit,
}

pub struct Dashboard {
    api: Arc<dyn LedgerApi>,
    events: UnboundedSender<AppEvent>,
    directory: TenantDirectory,
    panel: LedgerPanel,
    directory_task: Option<JoinHandle<()>>,
    ledger_task: Option<JoinHandle<()>>,
    running: bool,
}

impl Dashboard {
    /// Build a controller and the receiving end of its event channel.
    pub fn new(api: Arc<dyn LedgerApi>) -> (Self, UnboundedReceiver<AppEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let dashboard = Self {
            api,
            events,
            directory: TenantDirectory::new(),
            panel: LedgerPanel::new(),
            directory_task: None,
            ledger_task: None,
            running: true,
        };
        (dashboard, rx)
    }

    pub fn directory(&self) -> &TenantDirectory {
        &self.directory
    }

    pub fn panel(&self) -> &LedgerPanel {
        &self.panel
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Initial mount: request the tenant list.
    pub fn start(&mut self) {
        self.load_tenants();
    }

    /// Full-view retry: close the ledger and fetch the tenant list again.
    pub fn reload(&mut self) {
        info!("Reloading dashboard");
        self.close_ledger();
        self.load_tenants();
    }

    fn load_tenants(&mut self) {
        self.directory.begin_load();
        if let Some(task) = self.directory_task.take() {
            task.abort();
        }

        let api = Arc::clone(&self.api);
        let events = self.events.clone();
        debug!("Fetching tenant list");
        self.directory_task = Some(tokio::spawn(async move {
            let result = api.list_tenants().await;
            let _ = events.send(AppEvent::TenantsLoaded(result));
        }));
    }

    /// Open the ledger for `tenant`, superseding any fetch in flight.
    pub fn select_tenant(&mut self, tenant: Tenant) {
        let tenant_id = tenant.id;
        let request = self.panel.open(tenant);
        self.spawn_ledger_fetch(request, tenant_id);
    }

    pub fn open_highlighted(&mut self) {
        if let Some(tenant) = self.directory.highlighted().cloned() {
            self.select_tenant(tenant);
        }
    }

    pub fn retry_ledger(&mut self) {
        if let Some((request, tenant_id)) = self.panel.retry() {
            self.spawn_ledger_fetch(request, tenant_id);
        }
    }

    pub fn close_ledger(&mut self) {
        if let Some(task) = self.ledger_task.take() {
            task.abort();
        }
        self.panel.close();
    }

    fn spawn_ledger_fetch(&mut self, request: RequestId, tenant_id: TenantId) {
        if let Some(task) = self.ledger_task.take() {
            task.abort();
        }

        let api = Arc::clone(&self.api);
        let events = self.events.clone();
        debug!(%request, tenant_id, "Fetching ledger");
        self.ledger_task = Some(tokio::spawn(async move {
            let result = api.list_transactions(tenant_id).await;
            let _ = events.send(AppEvent::LedgerLoaded {
                request,
                tenant_id,
                result,
            });
        }));
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::TenantsLoaded(result) => {
                self.directory_task = None;
                match &result {
                    Ok(tenants) => info!("Loaded {} tenants", tenants.len()),
                    Err(e) => warn!("Error fetching tenants: {}", e),
                }
                self.directory.apply(result);
            }
            AppEvent::LedgerLoaded {
                request,
                tenant_id,
                result,
            } => {
                if let Err(e) = &result {
                    warn!(%request, tenant_id, "Error fetching ledger: {}", e);
                }
                match self.panel.apply(request, result) {
                    ApplyOutcome::Applied => {
                        self.ledger_task = None;
                        debug!(%request, tenant_id, "Ledger applied");
                    }
                    ApplyOutcome::Stale => {
                        debug!(%request, tenant_id, "Dropping stale ledger response");
                    }
                }
            }
        }
    }

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::Retry if self.directory.is_failed() => self.reload(),
            Action::Retry => self.retry_ledger(),
            Action::Close => self.close_ledger(),
            Action::Open => self.open_highlighted(),
            Action::Up if self.panel.ledger().is_some() => self.panel.scroll_up(),
            Action::Down if self.panel.ledger().is_some() => self.panel.scroll_down(),
            Action::First if self.panel.ledger().is_some() => self.panel.scroll_to_top(),
            Action::Last if self.panel.ledger().is_some() => self.panel.scroll_to_bottom(),
            Action::Up => self.directory.previous(),
            Action::Down => self.directory.next(),
            Action::First => self.directory.first(),
            Action::Last => self.directory.last(),
        }
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        for task in [self.directory_task.take(), self.ledger_task.take()]
            .into_iter()
            .flatten()
        {
            task.abort();
        }
    }
}
