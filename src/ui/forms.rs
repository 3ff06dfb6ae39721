use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::error::{LibraryError, LibraryResult};
use crate::models::{Member, MemberLoan};

const QUANTITY_HINT: &str = "Invalid quantity. Please enter a non-negative number.";

/// Which operation a prompt collects input for.
#[derive(Clone, Debug)]
pub(crate) enum FormKind {
    Search,
    Borrow,
    /// First step of a return: pick the member.
    ReturnMember,
    /// Second step of a return: the member's loans are shown and a book id is
    /// asked for.
    ReturnBook {
        member: Member,
        loans: Vec<MemberLoan>,
    },
    MemberLoans,
    AddBook,
    RegisterMember,
}

/// Input rules for a single field.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum FieldKind {
    Optional,
    Required,
    /// Only ASCII digits are accepted while typing.
    Digits,
}

#[derive(Clone, Debug)]
pub(crate) struct FormField {
    pub(crate) label: &'static str,
    pub(crate) value: String,
    pub(crate) kind: FieldKind,
}

impl FormField {
    fn new(label: &'static str, kind: FieldKind) -> Self {
        Self {
            label,
            value: String::new(),
            kind,
        }
    }
}

/// Modal prompt state: the fields, which one has focus, and the last
/// validation message.
#[derive(Clone, Debug)]
pub(crate) struct PromptForm {
    pub(crate) kind: FormKind,
    pub(crate) fields: Vec<FormField>,
    pub(crate) active: usize,
    pub(crate) error: Option<String>,
}

impl PromptForm {
    pub(crate) fn new(kind: FormKind) -> Self {
        use FieldKind::{Digits, Optional, Required};

        let fields = match &kind {
            FormKind::Search => vec![FormField::new("Title or author", Optional)],
            FormKind::Borrow => vec![
                FormField::new("Member ID", Required),
                FormField::new("Book ID", Required),
            ],
            FormKind::ReturnMember | FormKind::MemberLoans => {
                vec![FormField::new("Member ID", Required)]
            }
            FormKind::ReturnBook { .. } => vec![FormField::new("Book ID to return", Required)],
            FormKind::AddBook => vec![
                FormField::new("Title", Required),
                FormField::new("Author", Optional),
                FormField::new("ISBN", Optional),
                FormField::new("Quantity", Digits),
            ],
            FormKind::RegisterMember => vec![
                FormField::new("Name", Required),
                FormField::new("Contact", Optional),
            ],
        };

        Self {
            kind,
            fields,
            active: 0,
            error: None,
        }
    }

    pub(crate) fn title(&self) -> &'static str {
        match self.kind {
            FormKind::Search => "Search Books",
            FormKind::Borrow => "Borrow a Book",
            FormKind::ReturnMember | FormKind::ReturnBook { .. } => "Return a Book",
            FormKind::MemberLoans => "View Member's Borrowed Books",
            FormKind::AddBook => "Add New Book",
            FormKind::RegisterMember => "Register New Member",
        }
    }

    pub(crate) fn next_field(&mut self) {
        self.active = (self.active + 1) % self.fields.len();
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = (self.active + self.fields.len() - 1) % self.fields.len();
    }

    pub(crate) fn on_last_field(&self) -> bool {
        self.active + 1 == self.fields.len()
    }

    /// Append a character to the active field, validating allowed input.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        let field = &mut self.fields[self.active];
        let accepted = match field.kind {
            FieldKind::Digits => ch.is_ascii_digit(),
            FieldKind::Optional | FieldKind::Required => !ch.is_control(),
        };
        if accepted {
            field.value.push(ch);
        }
        accepted
    }

    /// Message to show when `push_char` refused a character.
    pub(crate) fn reject_message(&self) -> Option<&'static str> {
        (self.fields[self.active].kind == FieldKind::Digits).then_some(QUANTITY_HINT)
    }

    pub(crate) fn backspace(&mut self) {
        self.fields[self.active].value.pop();
    }

    /// Trimmed value of a field; blank when the index is out of range.
    pub(crate) fn value(&self, idx: usize) -> &str {
        self.fields
            .get(idx)
            .map(|field| field.value.trim())
            .unwrap_or("")
    }

    /// Like [`value`](Self::value) but rejects blanks.
    pub(crate) fn require(&self, idx: usize) -> LibraryResult<&str> {
        let value = self.value(idx);
        if value.is_empty() {
            let label = self.fields.get(idx).map(|field| field.label).unwrap_or("Value");
            return Err(LibraryError::invalid_input(format!("{label} is required.")));
        }
        Ok(value)
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, idx: usize) -> Line<'static> {
        let field = &self.fields[idx];
        let is_active = idx == self.active;
        let placeholder = match field.kind {
            FieldKind::Optional => "<optional>",
            FieldKind::Required => "<required>",
            FieldKind::Digits => "<number>",
        };

        let display = if field.value.is_empty() {
            placeholder.to_string()
        } else {
            field.value.clone()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if field.value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(self.prefix(idx)),
            Span::styled(display, style),
        ])
    }

    /// Label text preceding the value, used for cursor placement as well.
    pub(crate) fn prefix(&self, idx: usize) -> String {
        format!("{}: ", self.fields[idx].label)
    }

    pub(crate) fn value_len(&self, idx: usize) -> usize {
        self.fields[idx].value.chars().count()
    }
}
