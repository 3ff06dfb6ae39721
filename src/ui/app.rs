use std::mem;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use tracing::debug;

use crate::catalog::{add_book, list_available_books, list_books, parse_quantity, search_books};
use crate::error::{LibraryError, LibraryResult};
use crate::loans::{borrow_book, member_loans, overdue_loans, return_book};
use crate::members::{borrowed_books, list_members, register_member};
use crate::report::generate_report;
use crate::store::Store;

use super::forms::{FormKind, PromptForm};
use super::helpers::{centered_rect, surface_error};
use super::screens::{loan_lines, MenuAction, MenuScreen, OutputScreen, INVALID_CHOICE, MENU};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Lines moved by PageUp/PageDown on output screens.
const PAGE_LINES: i32 = 10;

/// Top-level screens. Every action result is shown on `Output` until the user
/// acknowledges it, then the menu is redrawn.
enum Screen {
    Menu,
    Output(OutputScreen),
}

/// Modal state layered over the current screen.
enum Mode {
    Normal,
    Prompt(PromptForm),
}

/// What a submitted prompt leads to.
enum Submitted {
    Show(OutputScreen),
    Next(PromptForm),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

fn prompt(kind: FormKind) -> Mode {
    Mode::Prompt(PromptForm::new(kind))
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Central application state shared across the TUI.
pub struct App {
    store: Store,
    menu: MenuScreen,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
    today: fn() -> NaiveDate,
}

impl App {
    pub fn new(store: Store) -> Self {
        Self::with_clock(store, local_today)
    }

    /// Build an app whose notion of "today" comes from `today`, used for
    /// borrow dates and the overdue computation.
    pub fn with_clock(store: Store, today: fn() -> NaiveDate) -> Self {
        Self {
            store,
            menu: MenuScreen::default(),
            screen: Screen::Menu,
            mode: Mode::Normal,
            status: None,
            today,
        }
    }

    /// Feed one key press through the state machine. Returns `true` once the
    /// user chose to exit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::Prompt(form) => self.handle_prompt(code, form)?,
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        if let Screen::Output(output) = &mut self.screen {
            match code {
                KeyCode::Enter | KeyCode::Esc => {
                    self.screen = Screen::Menu;
                    self.clear_status();
                }
                KeyCode::Up => output.scroll_by(-1),
                KeyCode::Down => output.scroll_by(1),
                KeyCode::PageUp => output.scroll_by(-PAGE_LINES),
                KeyCode::PageDown => output.scroll_by(PAGE_LINES),
                _ => {}
            }
            return Ok(Mode::Normal);
        }

        match code {
            KeyCode::Esc | KeyCode::Char('q') => *exit = true,
            KeyCode::Up => self.menu.move_selection(-1),
            KeyCode::Down => self.menu.move_selection(1),
            KeyCode::Backspace => {
                self.menu.choice.pop();
            }
            KeyCode::Char(ch) => {
                if !self.menu.push_digit(ch) {
                    self.set_status(INVALID_CHOICE, StatusKind::Error);
                }
            }
            KeyCode::Enter => match self.menu.take_action() {
                Some(action) => return self.dispatch(action, exit),
                None => self.set_status(INVALID_CHOICE, StatusKind::Error),
            },
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn dispatch(&mut self, action: MenuAction, exit: &mut bool) -> Result<Mode> {
        debug!(?action, "menu action");
        self.clear_status();

        match action {
            MenuAction::Exit => *exit = true,
            MenuAction::ListBooks => {
                let result = list_books(&self.store).map(|books| {
                    OutputScreen::books(
                        "All Books in Library",
                        &books,
                        true,
                        "No books in the library.",
                    )
                });
                self.show_result("All Books in Library", result);
            }
            MenuAction::ListAvailable => {
                let result = list_available_books(&self.store).map(|books| {
                    OutputScreen::books(
                        "Available Books in Library",
                        &books,
                        false,
                        "No books currently available.",
                    )
                });
                self.show_result("Available Books in Library", result);
            }
            MenuAction::ListMembers => {
                let result = list_members(&self.store).map(|members| OutputScreen::members(&members));
                self.show_result("All Registered Members", result);
            }
            MenuAction::Overdue => {
                let result = overdue_loans(&self.store, (self.today)())
                    .map(|overdue| OutputScreen::overdue(&overdue));
                self.show_result("Overdue Books Report", result);
            }
            MenuAction::Report => {
                let result = generate_report(&self.store, (self.today)())
                    .map(|report| OutputScreen::report(&report));
                self.show_result("Library Report", result);
            }
            MenuAction::Search => return Ok(prompt(FormKind::Search)),
            MenuAction::Borrow => return Ok(prompt(FormKind::Borrow)),
            MenuAction::Return => return Ok(prompt(FormKind::ReturnMember)),
            MenuAction::MemberLoans => return Ok(prompt(FormKind::MemberLoans)),
            MenuAction::AddBook => return Ok(prompt(FormKind::AddBook)),
            MenuAction::RegisterMember => return Ok(prompt(FormKind::RegisterMember)),
        }
        Ok(Mode::Normal)
    }

    fn handle_prompt(&mut self, code: KeyCode, mut form: PromptForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status(format!("{} cancelled.", form.title()), StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => {
                form.backspace();
                form.error = None;
            }
            KeyCode::Enter => {
                if form.on_last_field() {
                    return Ok(self.submit(form));
                }
                form.next_field();
            }
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                } else if let Some(message) = form.reject_message() {
                    form.error = Some(message.to_string());
                }
            }
            _ => {}
        }
        Ok(Mode::Prompt(form))
    }

    /// Run the operation behind a completed prompt. Validation problems keep
    /// the prompt open; every other failure is reported on an output screen.
    fn submit(&mut self, mut form: PromptForm) -> Mode {
        match self.run_form(&form) {
            Ok(Submitted::Show(output)) => {
                self.show(output);
                Mode::Normal
            }
            Ok(Submitted::Next(next)) => Mode::Prompt(next),
            Err(LibraryError::InvalidInput(message)) => {
                form.error = Some(message.clone());
                self.set_status(message, StatusKind::Error);
                Mode::Prompt(form)
            }
            Err(err) => {
                self.show_result(form.title(), Err(err));
                Mode::Normal
            }
        }
    }

    fn run_form(&self, form: &PromptForm) -> LibraryResult<Submitted> {
        let today = (self.today)();
        let output = match &form.kind {
            FormKind::Search => {
                let term = form.value(0);
                let books = search_books(&self.store, term)?;
                OutputScreen::search_results(term, &books)
            }
            FormKind::Borrow => {
                let member_id = form.require(0)?;
                let book_id = form.require(1)?;
                OutputScreen::borrowed(&borrow_book(&self.store, member_id, book_id, today)?)
            }
            FormKind::ReturnMember => {
                let (member, loans) = member_loans(&self.store, form.require(0)?)?;
                if loans.is_empty() {
                    return Err(LibraryError::NoActiveLoans {
                        member_id: member.id,
                        name: member.name,
                    });
                }
                return Ok(Submitted::Next(PromptForm::new(FormKind::ReturnBook {
                    member,
                    loans,
                })));
            }
            FormKind::ReturnBook { member, .. } => {
                let book_id = form.require(0)?;
                OutputScreen::returned(&return_book(&self.store, &member.id, book_id, today)?)
            }
            FormKind::MemberLoans => {
                let (member, loans) = borrowed_books(&self.store, form.require(0)?)?;
                OutputScreen::member_loans(&member, &loans)
            }
            FormKind::AddBook => {
                let title = form.require(0)?;
                let quantity = parse_quantity(form.value(3))?;
                let book = add_book(&self.store, title, form.value(1), form.value(2), quantity)?;
                OutputScreen::message(
                    "Add New Book",
                    [format!(
                        "Book '{}' added successfully with ID: {}.",
                        book.title, book.id
                    )],
                )
            }
            FormKind::RegisterMember => {
                let name = form.require(0)?;
                let member = register_member(&self.store, name, form.value(1))?;
                OutputScreen::message(
                    "Register New Member",
                    [format!(
                        "Member '{}' registered successfully with ID: {}.",
                        member.name, member.id
                    )],
                )
            }
        };
        Ok(Submitted::Show(output))
    }

    fn show(&mut self, output: OutputScreen) {
        self.screen = Screen::Output(output);
    }

    /// Show either the produced screen or the error, which also goes to the
    /// footer.
    fn show_result(&mut self, title: &str, result: LibraryResult<OutputScreen>) {
        match result {
            Ok(output) => self.show(output),
            Err(err) => {
                let message = surface_error(&err);
                self.set_status(message.clone(), StatusKind::Error);
                self.show(OutputScreen::failure(title, &message));
            }
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match &self.screen {
            Screen::Menu => self.draw_menu(frame, content_area),
            Screen::Output(output) => self.draw_output(frame, content_area, output),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        if let Mode::Prompt(form) = &self.mode {
            self.draw_form(frame, area, form);
        }
    }

    fn draw_menu(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(area);

        let banner = Paragraph::new(Span::styled(
            "LIBRARY MANAGEMENT SYSTEM",
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(banner, chunks[0]);

        let items: Vec<ListItem> = MENU
            .iter()
            .map(|(number, label, _)| ListItem::new(format!("{number:>2}. {label}")))
            .collect();
        let list = List::new(items)
            .block(Block::default().borders(Borders::LEFT | Borders::RIGHT))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        let mut state = ListState::default().with_selected(Some(self.menu.selected));
        frame.render_stateful_widget(list, chunks[1], &mut state);

        let prompt_label = "Enter your choice (0-11): ";
        let block = Block::default().borders(Borders::ALL);
        let inner = block.inner(chunks[2]);
        let prompt = Paragraph::new(Line::from(vec![
            Span::raw(prompt_label),
            Span::styled(self.menu.choice.clone(), Style::default().fg(Color::Yellow)),
        ]))
        .block(block);
        frame.render_widget(prompt, chunks[2]);

        if matches!(self.mode, Mode::Normal) && inner.height > 0 {
            let cursor_x = inner.x + prompt_label.len() as u16 + self.menu.choice.len() as u16;
            frame.set_cursor_position((cursor_x, inner.y));
        }
    }

    fn draw_output(&self, frame: &mut Frame, area: Rect, output: &OutputScreen) {
        let block = Block::default()
            .title(output.title.clone())
            .borders(Borders::ALL);
        let paragraph = Paragraph::new(output.lines.clone())
            .block(block)
            .scroll((output.scroll, 0));
        frame.render_widget(paragraph, area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        match (&self.screen, &self.mode) {
            (_, Mode::Prompt(_)) => Line::from(vec![
                Span::styled("[Enter]", key_style),
                Span::raw(" Next / Submit   "),
                Span::styled("[Tab]", key_style),
                Span::raw(" Switch Field   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Cancel"),
            ]),
            (Screen::Output(_), _) => Line::from(vec![
                Span::styled("[Enter]", key_style),
                Span::raw(" Continue   "),
                Span::styled("[↑↓]", key_style),
                Span::raw(" Scroll   "),
                Span::styled("[PgUp/PgDn]", key_style),
                Span::raw(" Page"),
            ]),
            (Screen::Menu, _) => Line::from(vec![
                Span::styled("[0-11]", key_style),
                Span::raw(" Choose   "),
                Span::styled("[↑↓]", key_style),
                Span::raw(" Move   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Open   "),
                Span::styled("[q]", key_style),
                Span::raw(" Quit"),
            ]),
        }
    }

    fn draw_form(&self, frame: &mut Frame, area: Rect, form: &PromptForm) {
        let mut lines = match &form.kind {
            FormKind::ReturnBook { member, loans } => {
                let mut lines = loan_lines(member, loans);
                lines.push(Line::from(""));
                lines
            }
            _ => Vec::new(),
        };
        let field_offset = lines.len() as u16;
        let popup_area = if field_offset > 0 {
            centered_rect(80, 70, area)
        } else {
            centered_rect(60, 40, area)
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(form.title()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        lines.extend((0..form.fields.len()).map(|idx| form.build_line(idx)));
        lines.push(Line::from(""));

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter for next field or submit • Tab to switch • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
        frame.render_widget(paragraph, inner);

        let cursor_y = inner.y + field_offset + form.active as u16;
        if cursor_y < inner.y + inner.height {
            let prefix = form.prefix(form.active).chars().count() as u16;
            let cursor_x = inner.x + prefix + form.value_len(form.active) as u16;
            frame.set_cursor_position((cursor_x, cursor_y));
        }
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }
}
