use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::loans::LoanReceipt;
use crate::models::{Book, Member, MemberLoan, OverdueLoan};
use crate::report::LibraryReport;

use super::helpers::columns;

/// Everything the main menu can trigger.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum MenuAction {
    ListBooks,
    ListAvailable,
    ListMembers,
    Search,
    Borrow,
    Return,
    MemberLoans,
    Overdue,
    Report,
    AddBook,
    RegisterMember,
    Exit,
}

/// Menu entries in display order: the number typed to pick them, the label,
/// and the action.
pub(crate) const MENU: [(u8, &str, MenuAction); 12] = [
    (1, "Display All Books", MenuAction::ListBooks),
    (2, "Display Available Books", MenuAction::ListAvailable),
    (3, "Display All Members", MenuAction::ListMembers),
    (4, "Search Books", MenuAction::Search),
    (5, "Borrow a Book", MenuAction::Borrow),
    (6, "Return a Book", MenuAction::Return),
    (7, "View Member's Borrowed Books", MenuAction::MemberLoans),
    (8, "View Overdue Books", MenuAction::Overdue),
    (9, "Library Report", MenuAction::Report),
    (10, "Add New Book", MenuAction::AddBook),
    (11, "Register New Member", MenuAction::RegisterMember),
    (0, "Exit", MenuAction::Exit),
];

pub(crate) const INVALID_CHOICE: &str = "Invalid choice. Please enter a number between 0 and 11.";

/// Highlighted entry plus the digits typed so far.
#[derive(Default)]
pub(crate) struct MenuScreen {
    pub(crate) selected: usize,
    pub(crate) choice: String,
}

impl MenuScreen {
    pub(crate) fn move_selection(&mut self, offset: isize) {
        let len = MENU.len() as isize;
        self.selected = (self.selected as isize + offset).rem_euclid(len) as usize;
        self.choice.clear();
    }

    /// Collect a typed digit; choices never need more than two.
    pub(crate) fn push_digit(&mut self, ch: char) -> bool {
        if ch.is_ascii_digit() && self.choice.len() < 2 {
            self.choice.push(ch);
            true
        } else {
            false
        }
    }

    /// Resolve the typed choice, or the highlighted entry when nothing was
    /// typed. Consumes the typed digits either way.
    pub(crate) fn take_action(&mut self) -> Option<MenuAction> {
        let choice = std::mem::take(&mut self.choice);
        if choice.is_empty() {
            return Some(MENU[self.selected].2);
        }
        let number = choice.parse::<u8>().ok()?;
        let (idx, entry) = MENU
            .iter()
            .enumerate()
            .find(|(_, (num, _, _))| *num == number)?;
        self.selected = idx;
        Some(entry.2)
    }
}

/// Result screen shown after an action. It stays up until acknowledged.
pub(crate) struct OutputScreen {
    pub(crate) title: String,
    pub(crate) lines: Vec<Line<'static>>,
    pub(crate) scroll: u16,
}

const BOOK_COLUMNS: [(&str, usize); 6] = [
    ("ID", 5),
    ("Title", 30),
    ("Author", 20),
    ("ISBN", 15),
    ("Qty", 5),
    ("Avail", 5),
];
const OVERDUE_COLUMNS: [(&str, usize); 5] = [
    ("Member ID", 10),
    ("Member Name", 20),
    ("Book Title", 30),
    ("Borrowed Date", 15),
    ("Overdue By (days)", 20),
];

fn heading(text: impl Into<String>) -> Line<'static> {
    Line::from(Span::styled(
        text.into(),
        Style::default().add_modifier(Modifier::BOLD),
    ))
}

fn header_row(cells: &[(&str, usize)]) -> Vec<Line<'static>> {
    let header = columns(cells);
    let rule = "-".repeat(header.chars().count());
    vec![
        Line::from(Span::styled(header, Style::default().fg(Color::Cyan))),
        Line::from(rule),
    ]
}

fn row(cells: &[&str], layout: &[(&str, usize)]) -> Line<'static> {
    let paired: Vec<(&str, usize)> = cells
        .iter()
        .zip(layout)
        .map(|(text, (_, width))| (*text, *width))
        .collect();
    Line::from(columns(&paired))
}

fn book_rows(books: &[Book], with_quantity: bool) -> Vec<Line<'static>> {
    let layout: Vec<(&str, usize)> = BOOK_COLUMNS
        .iter()
        .copied()
        .filter(|(name, _)| with_quantity || *name != "Qty")
        .collect();
    let mut lines = header_row(&layout);
    for book in books {
        let quantity = book.quantity.to_string();
        let available = book.available.to_string();
        let mut cells = vec![
            book.id.as_str(),
            book.title.as_str(),
            book.author.as_str(),
            book.isbn.as_str(),
        ];
        if with_quantity {
            cells.push(&quantity);
        }
        cells.push(&available);
        lines.push(row(&cells, &layout));
    }
    lines
}

fn overdue_rows(overdue: &[OverdueLoan]) -> Vec<Line<'static>> {
    let mut lines = header_row(&OVERDUE_COLUMNS);
    for item in overdue {
        let borrowed = item.borrowed_on.to_string();
        let days = item.overdue_days.to_string();
        lines.push(row(
            &[
                item.member_id.as_str(),
                item.member_name.as_str(),
                item.book_title.as_str(),
                borrowed.as_str(),
                days.as_str(),
            ],
            &OVERDUE_COLUMNS,
        ));
    }
    lines
}

impl OutputScreen {
    pub(crate) fn new(title: impl Into<String>, lines: Vec<Line<'static>>) -> Self {
        Self {
            title: title.into(),
            lines,
            scroll: 0,
        }
    }

    /// Plain status text, one line per message.
    pub(crate) fn message<I, S>(title: &str, messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lines = messages
            .into_iter()
            .map(|text| Line::from(Into::<String>::into(text)))
            .collect();
        Self::new(title, lines)
    }

    pub(crate) fn failure(title: &str, message: &str) -> Self {
        Self::new(
            title,
            vec![Line::from(Span::styled(
                message.to_string(),
                Style::default().fg(Color::Red),
            ))],
        )
    }

    pub(crate) fn books(title: &str, books: &[Book], with_quantity: bool, empty: &str) -> Self {
        if books.is_empty() {
            return Self::message(title, [empty]);
        }
        Self::new(title, book_rows(books, with_quantity))
    }

    pub(crate) fn search_results(term: &str, books: &[Book]) -> Self {
        if books.is_empty() {
            return Self::message(
                "Search Books",
                [format!("No books found matching '{term}'.")],
            );
        }
        let mut lines = vec![heading(format!("Books matching '{term}':")), Line::from("")];
        lines.extend(book_rows(books, true));
        Self::new("Search Books", lines)
    }

    pub(crate) fn members(members: &[Member]) -> Self {
        let title = "All Registered Members";
        if members.is_empty() {
            return Self::message(title, ["No members registered yet."]);
        }
        let layout = [("ID", 5), ("Name", 30), ("Contact", 25)];
        let mut lines = header_row(&layout);
        for member in members {
            lines.push(row(
                &[
                    member.id.as_str(),
                    member.name.as_str(),
                    member.contact.as_str(),
                ],
                &layout,
            ));
        }
        Self::new(title, lines)
    }

    pub(crate) fn member_loans(member: &Member, loans: &[MemberLoan]) -> Self {
        Self::new("View Member's Borrowed Books", loan_lines(member, loans))
    }

    pub(crate) fn borrowed(receipt: &LoanReceipt) -> Self {
        Self::message(
            "Borrow a Book",
            [
                format!(
                    "Book '{}' borrowed by '{}' successfully.",
                    receipt.book.title, receipt.member.name
                ),
                format!("New available quantity: {}", receipt.book.available),
            ],
        )
    }

    pub(crate) fn returned(receipt: &LoanReceipt) -> Self {
        Self::message(
            "Return a Book",
            [
                format!(
                    "Book '{}' returned by '{}' successfully.",
                    receipt.book.title, receipt.member.name
                ),
                format!("New available quantity: {}", receipt.book.available),
            ],
        )
    }

    pub(crate) fn overdue(overdue: &[OverdueLoan]) -> Self {
        let title = "Overdue Books Report";
        if overdue.is_empty() {
            return Self::message(title, ["No overdue books found."]);
        }
        Self::new(title, overdue_rows(overdue))
    }

    pub(crate) fn report(report: &LibraryReport) -> Self {
        let mut lines = vec![
            heading("--- Book Summary ---"),
            Line::from(format!("Total Unique Books: {}", report.total_titles)),
            Line::from(format!("Total Book Copies: {}", report.total_copies)),
            Line::from(format!("Total Available Books: {}", report.total_available)),
            Line::from(format!(
                "Total Books Currently Borrowed: {}",
                report.total_borrowed
            )),
            Line::from(""),
            heading("--- Member Summary ---"),
            Line::from(format!("Total Registered Members: {}", report.total_members)),
            Line::from(format!(
                "Members with Books Currently Borrowed: {}",
                report.members_with_loans
            )),
            Line::from(format!(
                "Total Books Borrowed (counting multiple books per member): {}",
                report.active_loans
            )),
        ];
        if !report.skipped_members.is_empty() {
            lines.push(Line::from(Span::styled(
                format!(
                    "Skipped members with unreadable loan lists: {}",
                    report.skipped_members.join(", ")
                ),
                Style::default().fg(Color::Red),
            )));
        }
        lines.extend([Line::from(""), heading("--- Overdue Books ---")]);
        if report.overdue.is_empty() {
            lines.push(Line::from("No overdue books found."));
        } else {
            lines.extend(overdue_rows(&report.overdue));
        }
        Self::new("Library Report", lines)
    }

    pub(crate) fn scroll_by(&mut self, offset: i32) {
        let max = self.lines.len().saturating_sub(1) as i32;
        self.scroll = (self.scroll as i32 + offset).clamp(0, max) as u16;
    }

    /// Screen text without styling, one string per line.
    pub(crate) fn plain_lines(&self) -> Vec<String> {
        self.lines
            .iter()
            .map(|line| line.spans.iter().map(|span| &*span.content).collect())
            .collect()
    }
}

/// Table of a member's active loans, shared by the loans view and the second
/// step of the return prompt.
pub(crate) fn loan_lines(member: &Member, loans: &[MemberLoan]) -> Vec<Line<'static>> {
    if loans.is_empty() {
        return vec![Line::from(format!(
            "Member '{}' has no books currently borrowed.",
            member.name
        ))];
    }
    let layout = [("Book ID", 10), ("Title", 30), ("Author", 20), ("Borrowed Date", 15)];
    let mut lines = vec![
        heading(format!("Borrowed books by {} (ID: {}):", member.name, member.id)),
        Line::from(""),
    ];
    lines.extend(header_row(&layout));
    for loan in loans {
        let borrowed = loan.borrowed_on.to_string();
        lines.push(row(
            &[
                loan.book.id.as_str(),
                loan.book.title.as_str(),
                loan.book.author.as_str(),
                borrowed.as_str(),
            ],
            &layout,
        ));
    }
    lines
}
