// Tenant Ledger - Core Library
// Exposes all modules for use in the dashboard, the CLI, the fixture server, and tests

pub mod client;
pub mod config;
pub mod dashboard;
pub mod directory;
pub mod ledger;
pub mod logging;
pub mod model;
pub mod panel;
pub mod report;

// Fixture API served by `ledger-server`
#[cfg(feature = "server")]
pub mod fixture;

// Terminal dashboard
#[cfg(feature = "tui")]
pub mod ui;

// Re-export commonly used types
pub use client::{ApiError, HttpLedgerClient, LedgerApi};
pub use config::{ApiConfig, Config, ConfigError, LoggingConfig};
pub use dashboard::{Action, AppEvent, Dashboard};
pub use directory::{DirectoryState, TenantDirectory};
pub use ledger::{aggregate, format_currency, format_date, FormatOptions, Ledger, LedgerTotals};
pub use model::{RecordError, Tenant, TenantId, Transaction, TransactionKind};
pub use panel::{LedgerPanel, PanelMode, PanelState, RequestId};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
