use std::path::PathBuf;

use anyhow::{anyhow, Result};
use directories::BaseDirs;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::classify::{classify_link, ClassifiedLink, LinkRejected};
use crate::models::ItemId;

/// Quote characters trimmed from pasted paths.
const QUOTES: &[char] = &['"', '\''];

/// Single-line text input used for titles, the trip subtitle, and file paths.
#[derive(Default, Clone)]
pub(crate) struct TextForm {
    pub(crate) value: String,
    pub(crate) error: Option<String>,
}

impl TextForm {
    pub(crate) fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            error: None,
        }
    }

    /// Append a printable character.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.value.push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.value.pop();
    }

    /// Trimmed value, or an error naming the missing field.
    pub(crate) fn required(&self, field_name: &str) -> Result<String> {
        let value = self.value.trim();
        if value.is_empty() {
            Err(anyhow!("{field_name} is required."))
        } else {
            Ok(value.to_string())
        }
    }

    /// Interpret the value as a file path. Surrounding quotes (added by some
    /// terminals on drag and drop) are dropped and a leading `~` expands to the
    /// home directory.
    pub(crate) fn parse_path(&self) -> Result<PathBuf> {
        let raw = self.required("File path")?;
        let unquoted = raw
            .strip_prefix(QUOTES)
            .and_then(|rest| rest.strip_suffix(QUOTES))
            .unwrap_or(raw.as_str());

        if let Some(rest) = unquoted.strip_prefix("~/") {
            let base_dirs =
                BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
            return Ok(base_dirs.home_dir().join(rest));
        }
        Ok(PathBuf::from(unquoted))
    }

    pub(crate) fn build_line(&self, field_name: &str) -> Line<'static> {
        input_line(field_name, &self.value, true)
    }

    pub(crate) fn value_len(&self) -> usize {
        self.value.chars().count()
    }
}

/// Fields within the link form.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub(crate) enum LinkField {
    #[default]
    Title,
    Url,
}

/// Manual link entry: a title plus a URL.
#[derive(Default, Clone)]
pub(crate) struct LinkForm {
    pub(crate) title: String,
    pub(crate) url: String,
    pub(crate) active: LinkField,
    pub(crate) error: Option<String>,
}

impl LinkForm {
    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            LinkField::Title => LinkField::Url,
            LinkField::Url => LinkField::Title,
        };
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            LinkField::Title => self.title.push(ch),
            LinkField::Url => self.url.push(ch),
        }
        true
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            LinkField::Title => {
                self.title.pop();
            }
            LinkField::Url => {
                self.url.pop();
            }
        }
    }

    /// Run the link through the classifier. A rejection moves focus to the
    /// field that needs filling in.
    pub(crate) fn submit(&mut self) -> Result<ClassifiedLink, LinkRejected> {
        classify_link(&self.title, &self.url).inspect_err(|rejection| {
            self.active = match rejection {
                LinkRejected::MissingTitle => LinkField::Title,
                LinkRejected::MissingUrl => LinkField::Url,
            };
        })
    }

    pub(crate) fn build_line(&self, field_name: &str, field: LinkField) -> Line<'static> {
        let value = match field {
            LinkField::Title => &self.title,
            LinkField::Url => &self.url,
        };
        input_line(field_name, value, self.active == field)
    }

    pub(crate) fn value_len(&self, field: LinkField) -> usize {
        match field {
            LinkField::Title => self.title.chars().count(),
            LinkField::Url => self.url.chars().count(),
        }
    }
}

/// Render `Name: value` with the active field highlighted.
fn input_line(field_name: &str, value: &str, is_active: bool) -> Line<'static> {
    let display = if value.is_empty() {
        "<required>".to_string()
    } else {
        value.to_string()
    };

    let style = if is_active {
        Style::default().fg(Color::Yellow)
    } else if value.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::raw(format!("{field_name}: ")),
        Span::styled(display, style),
    ])
}

/// Pending confirmation for deleting an item.
#[derive(Clone)]
pub(crate) struct ConfirmItemDelete {
    pub(crate) id: ItemId,
    pub(crate) title: String,
}
