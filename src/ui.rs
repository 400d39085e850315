use crate::dashboard::{Action, AppEvent, Dashboard};
use crate::directory::DirectoryState;
use crate::ledger::{amount_tone, format_currency, format_date, FormatOptions, Ledger, Tone};
use crate::model::{Tenant, Transaction, TransactionKind};
use crate::panel::{LedgerPanel, PanelMode, PanelState};
use crate::report::unclassified_note;
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

const WARNING: Color = Color::Red;
const SUCCESS: Color = Color::Green;

pub async fn run_ui(mut dashboard: Dashboard, mut events: UnboundedReceiver<AppEvent>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, &mut dashboard, &mut events).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    dashboard: &mut Dashboard,
    events: &mut UnboundedReceiver<AppEvent>,
) -> Result<()> {
    dashboard.start();

    while dashboard.is_running() {
        while let Ok(fetched) = events.try_recv() {
            dashboard.handle_event(fetched);
        }

        terminal.draw(|f| ui(f, dashboard))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(action) = map_key(key) {
                        dashboard.apply(action);
                    }
                }
            }
        }

        // Let fetch tasks make progress between frames
        tokio::task::yield_now().await;
    }

    Ok(())
}

pub fn map_key(key: KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }

    match key.code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::Down),
        KeyCode::Home => Some(Action::First),
        KeyCode::End => Some(Action::Last),
        KeyCode::Enter => Some(Action::Open),
        KeyCode::Char('r') => Some(Action::Retry),
        KeyCode::Esc | KeyCode::Char('x') => Some(Action::Close),
        _ => None,
    }
}

pub fn ui(f: &mut Frame, dashboard: &Dashboard) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], dashboard);

    // Content area with a split for the ledger panel
    if dashboard.panel().is_open() {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(40), // Tenant directory
                Constraint::Percentage(60), // Ledger panel
            ])
            .split(chunks[1]);

        render_directory(f, content_chunks[0], dashboard);
        render_ledger_panel(f, content_chunks[1], dashboard.panel());
    } else {
        render_directory(f, chunks[1], dashboard);
    }

    render_status_bar(f, chunks[2], dashboard);
}

fn render_directory(f: &mut Frame, area: Rect, dashboard: &Dashboard) {
    match dashboard.directory().state() {
        DirectoryState::Loading => render_message(f, area, " Tenant Directory ", "Loading tenants...", Color::Yellow),
        DirectoryState::Failed { message } => render_directory_error(f, area, message),
        DirectoryState::Loaded { tenants } if tenants.is_empty() => {
            render_message(f, area, " Tenant Directory ", "No tenants found.", Color::DarkGray)
        }
        DirectoryState::Loaded { tenants } => {
            render_tenants(f, area, tenants, dashboard.directory().cursor())
        }
    }
}

fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Negative => WARNING,
        Tone::Positive => SUCCESS,
    }
}

fn render_header(f: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let mut spans = vec![Span::styled(
        "Property Management Dashboard",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];

    let count = dashboard.directory().tenants().len();
    if count > 0 {
        spans.push(Span::raw("  |  "));
        spans.push(Span::styled(
            format!("Tenants: {}", count),
            Style::default().fg(Color::White),
        ));
    }

    let header = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_message(f: &mut Frame, area: Rect, title: &str, message: &str, color: Color) {
    let paragraph = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), Style::default().fg(color))),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(title.to_string()),
    );

    f.render_widget(paragraph, area);
}

fn render_directory_error(f: &mut Frame, area: Rect, message: &str) {
    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Error Loading Tenants",
            Style::default().fg(WARNING).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::raw(message.to_string())),
        Line::from(""),
        Line::from(vec![
            Span::raw("Press "),
            Span::styled("r", Style::default().fg(Color::Yellow)),
            Span::raw(" to retry"),
        ]),
    ];

    let paragraph = Paragraph::new(content)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(WARNING))
                .title(" Tenant Directory "),
        );

    f.render_widget(paragraph, area);
}

fn render_tenants(f: &mut Frame, area: Rect, tenants: &[Tenant], cursor: usize) {
    let header_cells = ["ID", "Name", "Unit", "Action"].iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = tenants.iter().map(|tenant| {
        Row::new(vec![
            Cell::from(format!("#{}", tenant.id)),
            Cell::from(tenant.name.clone()).style(Style::default().add_modifier(Modifier::BOLD)),
            Cell::from(format!("[{}]", tenant.unit)).style(Style::default().fg(Color::Cyan)),
            Cell::from("Enter: View Ledger").style(Style::default().fg(Color::DarkGray)),
        ])
        .height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(8),
            Constraint::Min(20),
            Constraint::Length(12),
            Constraint::Length(20),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Tenant Directory "),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    let mut state = TableState::default();
    state.select(Some(cursor));
    f.render_stateful_widget(table, area, &mut state);
}

fn render_ledger_panel(f: &mut Frame, area: Rect, panel: &LedgerPanel) {
    let state = panel.state();
    let (tenant, border) = match state {
        PanelState::Closed => return,
        PanelState::Loading { tenant, .. } | PanelState::Loaded { tenant, .. } => (tenant, Color::Yellow),
        PanelState::Error { tenant, .. } => (tenant, WARNING),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(format!(" Ledger for {} (Unit {}) ", tenant.name, tenant.unit));
    let inner = block.inner(area);
    f.render_widget(block, area);

    match state {
        PanelState::Closed => {}
        PanelState::Loading { .. } => {
            let loading = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled("Loading transactions...", Style::default().fg(Color::Yellow))),
            ])
            .alignment(Alignment::Center);
            f.render_widget(loading, inner);
        }
        PanelState::Error { message, .. } => {
            let error = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    format!("Error loading ledger: {}", message),
                    Style::default().fg(WARNING),
                )),
                Line::from(""),
                Line::from(vec![
                    Span::raw("Press "),
                    Span::styled("r", Style::default().fg(Color::Yellow)),
                    Span::raw(" to retry"),
                ]),
            ])
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
            f.render_widget(error, inner);
        }
        PanelState::Loaded { ledger, .. } if ledger.is_empty() => {
            let empty = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "No transactions found for this tenant.",
                    Style::default().fg(Color::DarkGray),
                )),
            ])
            .alignment(Alignment::Center);
            f.render_widget(empty, inner);
        }
        PanelState::Loaded { ledger, .. } => render_ledger(f, inner, ledger, panel.scroll()),
    }
}

fn render_ledger(f: &mut Frame, area: Rect, ledger: &Ledger, scroll: usize) {
    let totals = ledger.totals();
    let summary_height = if totals.unclassified > 0 { 5 } else { 4 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(summary_height), Constraint::Min(0)])
        .split(area);

    let mut summary = vec![
        Line::from(vec![
            Span::styled("  Total Payments   ", Style::default().fg(Color::Cyan)),
            Span::styled(
                format_currency(totals.total_payments, FormatOptions::default()),
                Style::default().fg(SUCCESS),
            ),
        ]),
        Line::from(vec![
            Span::styled("  Total Charges    ", Style::default().fg(Color::Cyan)),
            Span::styled(
                format_currency(totals.total_charges, FormatOptions::default()),
                Style::default().fg(WARNING),
            ),
        ]),
        Line::from(vec![
            Span::styled(
                "  Current Balance  ",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format_currency(totals.balance, FormatOptions::signed()),
                Style::default()
                    .fg(tone_color(amount_tone(totals.balance)))
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
    ];
    if totals.unclassified > 0 {
        summary.push(Line::from(Span::styled(
            format!("  {}", unclassified_note(totals.unclassified)),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }
    f.render_widget(Paragraph::new(summary), chunks[0]);

    let header_cells = ["Date", "Description", "Type", "Amount"].iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });
    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = ledger
        .transactions()
        .iter()
        .skip(scroll)
        .map(transaction_row);

    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Min(16),
            Constraint::Length(8),
            Constraint::Length(14),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::TOP).title(format!(" Transactions ({}) ", ledger.len())));

    f.render_widget(table, chunks[1]);
}

fn transaction_row(tx: &Transaction) -> Row<'static> {
    let badge_color = match tx.kind {
        TransactionKind::Charge => WARNING,
        TransactionKind::Payment => SUCCESS,
        TransactionKind::Other(_) => Color::Magenta,
    };

    Row::new(vec![
        Cell::from(format_date(tx.date)),
        Cell::from(truncate(&tx.description, 32)),
        Cell::from(tx.badge()).style(Style::default().fg(badge_color).add_modifier(Modifier::BOLD)),
        Cell::from(format_currency(tx.amount, FormatOptions::default()))
            .style(Style::default().fg(tone_color(amount_tone(tx.amount)))),
    ])
    .height(1)
}

fn render_status_bar(f: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));

    let mut spans = Vec::new();
    if dashboard.directory().is_failed() {
        spans.extend([key("r"), Span::raw(" Retry | ")]);
    } else if dashboard.panel().is_open() {
        if dashboard.panel().ledger().is_some() {
            spans.extend([key("↑/↓ Home/End"), Span::raw(" Scroll | ")]);
        }
        if dashboard.panel().mode() == PanelMode::Error {
            spans.extend([key("r"), Span::raw(" Retry | ")]);
        }
        spans.extend([key("Esc"), Span::raw(" Close | ")]);
    } else {
        spans.extend([
            key("↑/↓"),
            Span::raw(" Select | "),
            key("Enter"),
            Span::raw(" View Ledger | "),
        ]);
    }
    spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
