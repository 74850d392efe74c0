//! Interactive terminal dashboard: entry forms on the left, the ledger and
//! derived stock views on the right, banners in the status bar.

use std::io;
use std::path::Path;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};

use crate::{
    io::{load_transactions, IngestReport},
    ops::{low_stock, summarize, LOW_STOCK_THRESHOLD},
    types::{ItemName, Ledger, MemoryLedger, Quantity, SummaryRow, Transaction, TransactionType},
};

/// Which dashboard control currently receives keyboard input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Path entry for bulk imports
    FilePath,
    /// Item-name field of the manual form
    ItemName,
    /// Quantity stepper of the manual form
    Quantity,
    /// Bought/Sold selector of the manual form
    EntryType,
    /// Ledger table scrolling
    LedgerTable,
}

impl Focus {
    /// The control after this one in Tab order
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Focus::FilePath => Focus::ItemName,
            Focus::ItemName => Focus::Quantity,
            Focus::Quantity => Focus::EntryType,
            Focus::EntryType => Focus::LedgerTable,
            Focus::LedgerTable => Focus::FilePath,
        }
    }

    /// The control before this one in Tab order
    #[must_use]
    pub fn previous(self) -> Self {
        match self {
            Focus::FilePath => Focus::LedgerTable,
            Focus::ItemName => Focus::FilePath,
            Focus::Quantity => Focus::ItemName,
            Focus::EntryType => Focus::Quantity,
            Focus::LedgerTable => Focus::EntryType,
        }
    }
}

/// Feedback from the last action, shown in the status bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    /// The action succeeded
    Success(String),
    /// The action was refused or only partially succeeded
    Warning(String),
}

/// Dashboard state: the session ledger plus all form and navigation state
pub struct App {
    /// The session's transaction ledger
    pub ledger: MemoryLedger,
    /// Scroll/selection state of the ledger table
    pub ledger_state: TableState,
    /// Control receiving keyboard input
    pub focus: Focus,
    /// Import-path field contents
    pub file_input: String,
    /// Item-name field contents
    pub item_input: String,
    /// Quantity stepper value; the stepper never drops below 1
    pub quantity_input: u32,
    /// Currently selected transaction type
    pub entry_type: TransactionType,
    /// Feedback from the last action, if any
    pub banner: Option<Banner>,
    /// Set when the user asks to leave the dashboard
    pub should_quit: bool,
}

impl App {
    /// Creates the dashboard over a (usually fresh) session ledger
    #[must_use]
    pub fn new(ledger: MemoryLedger) -> Self {
        Self {
            ledger,
            ledger_state: TableState::default(),
            focus: Focus::ItemName,
            file_input: String::new(),
            item_input: String::new(),
            quantity_input: 1,
            entry_type: TransactionType::Bought,
            banner: None,
            should_quit: false,
        }
    }

    /// Submits the manual-entry form.
    ///
    /// A valid name appends exactly one record and resets the form for the
    /// next entry. An empty name appends nothing and raises a warning banner
    /// instead.
    pub fn submit_manual_entry(&mut self) {
        let item = match ItemName::new(&self.item_input) {
            Ok(item) => item,
            Err(_) => {
                self.banner = Some(Banner::Warning(
                    "Item name is empty, nothing was added".to_string(),
                ));
                return;
            }
        };
        let quantity = match Quantity::new(self.quantity_input) {
            Ok(quantity) => quantity,
            Err(_) => {
                self.banner = Some(Banner::Warning(
                    "Quantity must be at least 1".to_string(),
                ));
                return;
            }
        };
        self.ledger
            .append(Transaction::new(item, quantity, self.entry_type));
        self.banner = Some(Banner::Success(format!(
            "Stock entry added ({} {})",
            quantity,
            self.entry_type.label()
        )));
        self.item_input.clear();
        self.quantity_input = 1;
    }

    /// Runs a bulk import from the path typed into the file field. The
    /// outcome lands in the banner either way; import failures never end the
    /// session.
    pub fn submit_import(&mut self) {
        let path = self.file_input.trim().to_string();
        if path.is_empty() {
            self.banner = Some(Banner::Warning(
                "Enter a file path to import".to_string(),
            ));
            return;
        }
        match load_transactions(Path::new(&path), &mut self.ledger) {
            Ok(report) => {
                self.banner = Some(report_banner(&report));
                self.file_input.clear();
            }
            Err(err) => {
                self.banner = Some(Banner::Warning(format!("Import failed: {err}")));
            }
        }
    }

    /// Applies one keystroke to the dashboard state
    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab => {
                self.focus = if key.modifiers.contains(KeyModifiers::SHIFT) {
                    self.focus.previous()
                } else {
                    self.focus.next()
                };
            }
            KeyCode::BackTab => self.focus = self.focus.previous(),
            KeyCode::Enter => match self.focus {
                Focus::FilePath => self.submit_import(),
                Focus::ItemName | Focus::Quantity | Focus::EntryType => self.submit_manual_entry(),
                Focus::LedgerTable => {}
            },
            KeyCode::Up => match self.focus {
                Focus::Quantity => self.quantity_input = self.quantity_input.saturating_add(1),
                Focus::LedgerTable => self.table_previous(),
                _ => {}
            },
            KeyCode::Down => match self.focus {
                Focus::Quantity => {
                    if self.quantity_input > 1 {
                        self.quantity_input -= 1;
                    }
                }
                Focus::LedgerTable => self.table_next(),
                _ => {}
            },
            KeyCode::Left | KeyCode::Right => {
                if self.focus == Focus::EntryType {
                    self.entry_type = self.entry_type.toggled();
                }
            }
            KeyCode::Backspace => match self.focus {
                Focus::FilePath => {
                    self.file_input.pop();
                }
                Focus::ItemName => {
                    self.item_input.pop();
                }
                _ => {}
            },
            KeyCode::Char(c) => match self.focus {
                Focus::FilePath => self.file_input.push(c),
                Focus::ItemName => self.item_input.push(c),
                _ => {}
            },
            _ => {}
        }
    }

    fn table_next(&mut self) {
        let len = self.ledger.len();
        if len == 0 {
            return;
        }
        let i = match self.ledger_state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.ledger_state.select(Some(i));
    }

    fn table_previous(&mut self) {
        let len = self.ledger.len();
        if len == 0 {
            return;
        }
        let i = match self.ledger_state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.ledger_state.select(Some(i));
    }
}

/// Folds an import report into the banner the status bar shows
#[must_use]
pub fn report_banner(report: &IngestReport) -> Banner {
    if report.rejected.is_empty() {
        Banner::Success(format!(
            "File imported: {} record(s) added",
            report.appended
        ))
    } else {
        let first = &report.rejected[0];
        Banner::Warning(format!(
            "File imported: {} record(s) added, {} row(s) rejected (first: line {}, {})",
            report.appended,
            report.rejected.len(),
            first.line,
            first.reason
        ))
    }
}

/// Runs the dashboard until the user quits, taking over the terminal for the
/// duration and restoring it on the way out
pub fn run_ui(app: &mut App) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            app.handle_key(key);
        }
        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    // The summary is recomputed from the full ledger on every draw; nothing
    // is cached between refreshes
    let mut summary = summarize(app.ledger.records());
    summary.sort_by(|a, b| a.item().as_str().cmp(b.item().as_str()));
    let warnings = low_stock(&summary, LOW_STOCK_THRESHOLD);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with session totals
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app, &summary, &warnings);

    let content = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(38), // Entry forms
            Constraint::Min(0),     // Ledger and derived views
        ])
        .split(chunks[1]);

    render_sidebar(f, content[0], app);
    render_main(f, content[1], app, &summary, &warnings);

    render_status_bar(f, chunks[2], app);
}

fn render_header(
    f: &mut Frame,
    area: Rect,
    app: &App,
    summary: &[SummaryRow],
    warnings: &[SummaryRow],
) {
    let mut spans = vec![
        Span::styled(
            "Stock Movement Dashboard",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  │  "),
        Span::styled(
            format!("Records: {}", app.ledger.len()),
            Style::default().fg(Color::White),
        ),
        Span::raw("  "),
        Span::styled(
            format!("Items: {}", summary.len()),
            Style::default().fg(Color::White),
        ),
        Span::raw("  "),
    ];
    if warnings.is_empty() {
        spans.push(Span::styled(
            "All stocked",
            Style::default().fg(Color::Green),
        ));
    } else {
        spans.push(Span::styled(
            format!("Low stock: {}", warnings.len()),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }

    let header = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

fn render_sidebar(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Import form
            Constraint::Length(9), // Manual-entry form
            Constraint::Min(0),    // Key help
        ])
        .split(area);

    render_import_form(f, chunks[0], app);
    render_entry_form(f, chunks[1], app);
    render_help(f, chunks[2]);
}

fn render_import_form(f: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus == Focus::FilePath;
    let lines = vec![
        Line::from(input_span(&app.file_input, focused)),
        Line::from(Span::styled(
            "Enter imports the file",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Import Stock File (.csv / .xlsx) ")
        .border_style(border_style(focused));
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_entry_form(f: &mut Frame, area: Rect, app: &App) {
    let label = |text: &'static str| Span::styled(text, Style::default().fg(Color::DarkGray));
    let lines = vec![
        Line::from(vec![
            label("Item name: "),
            input_span(&app.item_input, app.focus == Focus::ItemName),
        ]),
        Line::from(""),
        Line::from(vec![
            label("Quantity:  "),
            stepper_span(app.quantity_input, app.focus == Focus::Quantity),
        ]),
        Line::from(""),
        Line::from(vec![
            label("Type:      "),
            selector_span(app.entry_type, app.focus == Focus::EntryType),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "Enter adds the entry",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let focused = matches!(
        app.focus,
        Focus::ItemName | Focus::Quantity | Focus::EntryType
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Add Stock Manually ")
        .border_style(border_style(focused));
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_help(f: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from("Tab        next control"),
        Line::from("Shift-Tab  previous control"),
        Line::from("Enter      submit"),
        Line::from("↑/↓        step / scroll"),
        Line::from("←/→        switch type"),
        Line::from("Esc        quit"),
    ];
    let help = Paragraph::new(lines)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL).title(" Keys "));
    f.render_widget(help, area);
}

fn render_main(
    f: &mut Frame,
    area: Rect,
    app: &mut App,
    summary: &[SummaryRow],
    warnings: &[SummaryRow],
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45), // Raw ledger
            Constraint::Percentage(30), // Stock summary
            Constraint::Percentage(25), // Restock recommendations
        ])
        .split(area);

    render_ledger_table(f, chunks[0], app);
    render_summary_table(f, chunks[1], summary);
    render_recommendations(f, chunks[2], warnings);
}

fn render_ledger_table(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["#", "Item", "Quantity", "Type"].iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });
    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.ledger.records().iter().enumerate().map(|(i, tx)| {
        let color = match tx.transaction_type() {
            TransactionType::Bought => Color::Green,
            TransactionType::Sold => Color::Red,
        };
        let cells = vec![
            Cell::from((i + 1).to_string()),
            Cell::from(tx.item().as_str().to_string()),
            Cell::from(tx.quantity().to_string()),
            Cell::from(tx.transaction_type().label()).style(Style::default().fg(color)),
        ];
        Row::new(cells).height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Min(20),
            Constraint::Length(10),
            Constraint::Length(8),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Inventory Records ")
            .border_style(border_style(app.focus == Focus::LedgerTable)),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.ledger_state);
}

fn render_summary_table(f: &mut Frame, area: Rect, summary: &[SummaryRow]) {
    let header_cells = ["Item", "Bought", "Sold", "Remaining"].iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });
    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = summary.iter().map(|row| {
        let remaining_color = if row.is_low_stock(LOW_STOCK_THRESHOLD) {
            Color::Red
        } else {
            Color::Green
        };
        let cells = vec![
            Cell::from(row.item().as_str().to_string()),
            Cell::from(row.bought().to_string()),
            Cell::from(row.sold().to_string()),
            Cell::from(row.remaining().to_string()).style(Style::default().fg(remaining_color)),
        ];
        Row::new(cells).height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Min(20),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(11),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Stock Summary "),
    );

    f.render_widget(table, area);
}

fn render_recommendations(f: &mut Frame, area: Rect, warnings: &[SummaryRow]) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Recommendations ");

    if warnings.is_empty() {
        let all_clear = Paragraph::new(Span::styled(
            "All items are sufficiently stocked.",
            Style::default().fg(Color::Green),
        ))
        .block(block);
        f.render_widget(all_clear, area);
        return;
    }

    let lines: Vec<Line> = warnings
        .iter()
        .map(|row| {
            Line::from(Span::styled(
                format!(
                    "Consider restocking: {} (Remaining: {})",
                    row.item(),
                    row.remaining()
                ),
                Style::default().fg(Color::Yellow),
            ))
        })
        .collect();
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let line = match &app.banner {
        Some(Banner::Success(message)) => Line::from(Span::styled(
            message.clone(),
            Style::default().fg(Color::Green),
        )),
        Some(Banner::Warning(message)) => Line::from(Span::styled(
            message.clone(),
            Style::default().fg(Color::Yellow),
        )),
        None => Line::from(Span::styled(
            "Tab moves between controls, Enter submits, Esc quits",
            Style::default().fg(Color::DarkGray),
        )),
    };
    let status = Paragraph::new(line)
        .block(Block::default().borders(Borders::ALL).title(" Status "));
    f.render_widget(status, area);
}

fn input_span(value: &str, focused: bool) -> Span<'_> {
    if focused {
        Span::styled(format!("{value}█"), Style::default().fg(Color::Yellow))
    } else {
        Span::raw(value)
    }
}

fn stepper_span(value: u32, focused: bool) -> Span<'static> {
    let text = if focused {
        format!("‹ {value} ›")
    } else {
        value.to_string()
    };
    Span::styled(text, field_style(focused))
}

fn selector_span(entry_type: TransactionType, focused: bool) -> Span<'static> {
    let text = if focused {
        format!("‹ {} ›", entry_type.label())
    } else {
        entry_type.label().to_string()
    };
    Span::styled(text, field_style(focused))
}

fn field_style(focused: bool) -> Style {
    if focused {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    use crate::errors::RowError;
    use crate::io::RejectedRow;

    use super::*;

    fn app() -> App {
        App::new(MemoryLedger::new())
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn test_each_submission_appends_one_record() {
        let mut app = app();
        for name in ["Widget", "Gadget", "Widget"] {
            app.item_input = name.to_string();
            app.submit_manual_entry();
        }
        assert_eq!(app.ledger.len(), 3);
        assert!(matches!(app.banner, Some(Banner::Success(_))));
    }

    #[test]
    fn test_empty_name_is_refused_with_a_warning() {
        let mut app = app();
        app.submit_manual_entry();
        assert!(app.ledger.is_empty());
        assert!(matches!(app.banner, Some(Banner::Warning(_))));
    }

    #[test]
    fn test_submission_resets_the_form() {
        let mut app = app();
        app.item_input = "Widget".to_string();
        app.quantity_input = 7;
        app.entry_type = TransactionType::Sold;
        app.submit_manual_entry();

        assert!(app.item_input.is_empty());
        assert_eq!(app.quantity_input, 1);
        let record = &app.ledger.records()[0];
        assert_eq!(record.quantity().get(), 7);
        assert_eq!(record.transaction_type(), TransactionType::Sold);
    }

    #[test]
    fn test_quantity_stepper_never_drops_below_one() {
        let mut app = app();
        app.focus = Focus::Quantity;
        press(&mut app, KeyCode::Down);
        assert_eq!(app.quantity_input, 1);
        press(&mut app, KeyCode::Up);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.quantity_input, 3);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.quantity_input, 2);
    }

    #[test]
    fn test_arrow_keys_switch_entry_type() {
        let mut app = app();
        app.focus = Focus::EntryType;
        assert_eq!(app.entry_type, TransactionType::Bought);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.entry_type, TransactionType::Sold);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.entry_type, TransactionType::Bought);
    }

    #[test]
    fn test_typing_lands_in_the_focused_field() {
        let mut app = app();
        app.focus = Focus::ItemName;
        press(&mut app, KeyCode::Char('W'));
        press(&mut app, KeyCode::Char('i'));
        assert_eq!(app.item_input, "Wi");
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.item_input, "W");
        assert!(app.file_input.is_empty());
    }

    #[test]
    fn test_tab_cycles_focus_both_ways() {
        let mut app = app();
        assert_eq!(app.focus, Focus::ItemName);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, Focus::Quantity);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.focus, Focus::ItemName);
        app.handle_key(KeyEvent::new(KeyCode::Tab, KeyModifiers::SHIFT));
        assert_eq!(app.focus, Focus::FilePath);
    }

    #[test]
    fn test_import_with_unknown_extension_warns_and_keeps_running() {
        let mut app = app();
        app.focus = Focus::FilePath;
        app.file_input = "stock.pdf".to_string();
        app.submit_import();
        assert!(matches!(app.banner, Some(Banner::Warning(_))));
        assert!(app.ledger.is_empty());
        assert!(!app.should_quit);
    }

    #[test]
    fn test_import_with_blank_path_warns() {
        let mut app = app();
        app.submit_import();
        assert!(matches!(app.banner, Some(Banner::Warning(_))));
    }

    #[test]
    fn test_esc_requests_quit() {
        let mut app = app();
        press(&mut app, KeyCode::Esc);
        assert!(app.should_quit);
    }

    #[test]
    fn test_report_banner_mentions_rejected_rows() {
        let clean = IngestReport {
            appended: 3,
            rejected: vec![],
        };
        assert!(matches!(report_banner(&clean), Banner::Success(_)));

        let partial = IngestReport {
            appended: 2,
            rejected: vec![RejectedRow {
                line: 4,
                reason: RowError::UnknownType("Returned".to_string()),
            }],
        };
        match report_banner(&partial) {
            Banner::Warning(message) => {
                assert!(message.contains("2 record(s) added"));
                assert!(message.contains("1 row(s) rejected"));
                assert!(message.contains("line 4"));
            }
            Banner::Success(_) => panic!("Partial imports should warn"),
        }
    }
}
