use std::mem;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use crossterm::event::KeyCode;
use open::that as open_link;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;
use tracing::{info, warn};

use crate::classify::{classify_file, Classified, ClassifiedFile, FileDescriptor};
use crate::content::{DecodePoll, PendingDecode};
use crate::models::{BinderItem, Content, FileType, ItemId};
use crate::store::BinderStore;

use super::forms::{ConfirmItemDelete, LinkField, LinkForm, TextForm};
use super::helpers::{
    build_item_card_lines, centered_rect, format_size, format_timestamp, kind_label,
    surface_error, type_color,
};
use super::screens::{row_count, DetailScroll, GridCursor, GRID_COLUMNS};

/// Space reserved for the app name and trip subtitle.
const HEADER_HEIGHT: u16 = 3;
/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Height of one row of item cards.
const CARD_HEIGHT: u16 = 7;
/// Rows scrolled by PageUp/PageDown in the preview pane.
const PAGE_SCROLL: i32 = 10;

/// Where the content of a picked file should go.
#[derive(Clone)]
enum FileTarget {
    NewItem,
    Replace(ItemId),
}

/// Which files a path prompt accepts.
#[derive(Clone, Copy, PartialEq, Eq)]
enum FilePicker {
    AnyFile,
    /// Photos and videos only.
    Gallery,
}

impl FilePicker {
    fn accepts(self, mime_type: &str) -> bool {
        match self {
            FilePicker::AnyFile => true,
            FilePicker::Gallery => mime_type.starts_with("image/") || mime_type.starts_with("video/"),
        }
    }
}

/// Modal states layered over the grid or the detail screen. Which of those two
/// is visible follows the store's selection.
enum Mode {
    Normal,
    ChoosingSource,
    EnteringPath {
        target: FileTarget,
        picker: FilePicker,
        form: TextForm,
    },
    EnteringLink(LinkForm),
    Decoding { pending: PendingDecode, target: FileTarget },
    EditingTitle { id: ItemId, form: TextForm },
    EditingSubtitle(TextForm),
    ConfirmDelete(ConfirmItemDelete),
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

/// Central application state: the store plus everything the screens need to
/// render and react to keys.
pub struct App {
    store: BinderStore,
    subtitle: String,
    viewing_dir: PathBuf,
    cursor: GridCursor,
    detail: DetailScroll,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(store: BinderStore, subtitle: String, viewing_dir: PathBuf) -> Self {
        Self {
            store,
            subtitle,
            viewing_dir,
            cursor: GridCursor::default(),
            detail: DetailScroll::default(),
            mode: Mode::Normal,
            status: None,
        }
    }

    pub fn store(&self) -> &BinderStore {
        &self.store
    }

    pub fn subtitle(&self) -> &str {
        &self.subtitle
    }

    /// Dispatch one key press. Returns `true` when the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::ChoosingSource => self.handle_choose_source(code),
            Mode::EnteringPath {
                target,
                picker,
                form,
            } => self.handle_path_input(code, target, picker, form),
            Mode::EnteringLink(form) => self.handle_link_input(code, form),
            Mode::Decoding { pending, target } => self.handle_decoding_key(code, pending, target),
            Mode::EditingTitle { id, form } => self.handle_edit_title(code, id, form),
            Mode::EditingSubtitle(form) => self.handle_edit_subtitle(code, form),
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm),
        };

        Ok(exit)
    }

    /// Check on background work between key presses. A finished text decode is
    /// applied here, exactly once.
    pub fn tick(&mut self) -> Result<()> {
        if !matches!(self.mode, Mode::Decoding { .. }) {
            return Ok(());
        }
        let Mode::Decoding { pending, target } = mem::replace(&mut self.mode, Mode::Normal) else {
            return Ok(());
        };

        match pending.poll() {
            DecodePoll::Pending(pending) => self.mode = Mode::Decoding { pending, target },
            DecodePoll::Ready(Ok(decoded)) => {
                if let Err(err) = self.apply_file(target, decoded.into()) {
                    self.set_status(surface_error(&err), StatusKind::Error);
                }
            }
            DecodePoll::Ready(Err(err)) => {
                warn!(error = %err, "text decode failed");
                let err = anyhow::Error::from(err);
                self.set_status(
                    format!("Could not read file: {}", surface_error(&err)),
                    StatusKind::Error,
                );
            }
        }
        Ok(())
    }

    /// Whether a text file is still being read.
    pub fn is_decoding(&self) -> bool {
        matches!(self.mode, Mode::Decoding { .. })
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        if self.store.selected().is_some() {
            return self.handle_detail_key(code, exit);
        }

        let len = self.store.len();
        match code {
            KeyCode::Char('q') | KeyCode::Esc => *exit = true,
            KeyCode::Left => self.cursor.move_horizontal(-1, len),
            KeyCode::Right => self.cursor.move_horizontal(1, len),
            KeyCode::Up => self.cursor.move_vertical(-1, len),
            KeyCode::Down => self.cursor.move_vertical(1, len),
            KeyCode::Home => self.cursor.select_first(),
            KeyCode::End => self.cursor.select_last(len),
            KeyCode::Enter => self.open_detail(),
            KeyCode::Char('+') | KeyCode::Char('a') | KeyCode::Char('A') => {
                self.clear_status();
                return Mode::ChoosingSource;
            }
            KeyCode::Char('t') | KeyCode::Char('T') => {
                self.clear_status();
                return Mode::EditingSubtitle(TextForm::with_value(self.subtitle.clone()));
            }
            _ => {}
        }
        Mode::Normal
    }

    fn handle_detail_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        let Some(item) = self.store.selected() else {
            return Mode::Normal;
        };
        let id = item.id.clone();
        let title = item.title.clone();

        match code {
            KeyCode::Char('q') => *exit = true,
            KeyCode::Esc | KeyCode::Backspace => {
                self.store.clear_selection();
                self.clear_status();
            }
            KeyCode::Enter | KeyCode::Char('o') | KeyCode::Char('O') => self.open_item(&id),
            KeyCode::Char('e') | KeyCode::Char('E') => {
                self.clear_status();
                return Mode::EditingTitle {
                    id,
                    form: TextForm::with_value(title),
                };
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.clear_status();
                return Mode::EnteringPath {
                    target: FileTarget::Replace(id),
                    picker: FilePicker::AnyFile,
                    form: TextForm::default(),
                };
            }
            KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Char('-') | KeyCode::Delete => {
                self.clear_status();
                return Mode::ConfirmDelete(ConfirmItemDelete { id, title });
            }
            KeyCode::Up => self.detail.scroll(-1),
            KeyCode::Down => self.detail.scroll(1),
            KeyCode::PageUp => self.detail.scroll(-PAGE_SCROLL),
            KeyCode::PageDown => self.detail.scroll(PAGE_SCROLL),
            KeyCode::Tab | KeyCode::Right => self.open_relative_item(1),
            KeyCode::BackTab | KeyCode::Left => self.open_relative_item(-1),
            _ => {}
        }
        Mode::Normal
    }

    fn handle_choose_source(&mut self, code: KeyCode) -> Mode {
        match code {
            KeyCode::Char('f') | KeyCode::Char('F') => Mode::EnteringPath {
                target: FileTarget::NewItem,
                picker: FilePicker::AnyFile,
                form: TextForm::default(),
            },
            KeyCode::Char('g') | KeyCode::Char('G') => Mode::EnteringPath {
                target: FileTarget::NewItem,
                picker: FilePicker::Gallery,
                form: TextForm::default(),
            },
            KeyCode::Char('l') | KeyCode::Char('L') => Mode::EnteringLink(LinkForm::default()),
            KeyCode::Esc => {
                self.set_status("Add cancelled.", StatusKind::Info);
                Mode::Normal
            }
            _ => Mode::ChoosingSource,
        }
    }

    fn handle_path_input(
        &mut self,
        code: KeyCode,
        target: FileTarget,
        picker: FilePicker,
        mut form: TextForm,
    ) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.submit_file(target.clone(), picker, &form) {
                Ok(mode) => return mode,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Mode::EnteringPath {
            target,
            picker,
            form,
        }
    }

    fn handle_link_input(&mut self, code: KeyCode, mut form: LinkForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Add link cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Tab | KeyCode::BackTab => form.toggle_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match form.submit() {
                Ok(link) => {
                    let file_type = link.file_type();
                    let id = self.store.add(link.title.clone(), file_type, link.url.into());
                    self.focus_item(&id);
                    self.set_status(format!("Added {}.", link.title), StatusKind::Info);
                    return Mode::Normal;
                }
                Err(rejection) => {
                    form.error = Some(rejection.to_string());
                    self.set_status(rejection.to_string(), StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Mode::EnteringLink(form)
    }

    fn handle_decoding_key(
        &mut self,
        code: KeyCode,
        pending: PendingDecode,
        target: FileTarget,
    ) -> Mode {
        if code == KeyCode::Esc {
            let name = pending.file_name().to_string();
            pending.cancel();
            self.set_status(format!("Stopped reading {name}."), StatusKind::Info);
            Mode::Normal
        } else {
            Mode::Decoding { pending, target }
        }
    }

    fn handle_edit_title(&mut self, code: KeyCode, id: ItemId, mut form: TextForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Edit cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_title(&id, &form) {
                Ok(()) => return Mode::Normal,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Mode::EditingTitle { id, form }
    }

    fn handle_edit_subtitle(&mut self, code: KeyCode, mut form: TextForm) -> Mode {
        match code {
            KeyCode::Esc => return Mode::Normal,
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => {
                self.subtitle = form.value.trim().to_string();
                self.set_status("Trip name updated.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Char(ch) => {
                form.push_char(ch);
            }
            _ => {}
        }
        Mode::EditingSubtitle(form)
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmItemDelete) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.store.remove(&confirm.id) {
                    Ok(()) => {
                        self.cursor.clamp(self.store.len());
                        self.set_status(format!("Deleted {}.", confirm.title), StatusKind::Info);
                    }
                    Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
                }
                Mode::Normal
            }
            _ => Mode::ConfirmDelete(confirm),
        }
    }

    /// Classify the file at the entered path. Text files switch to the
    /// decoding mode; everything else is applied right away.
    fn submit_file(
        &mut self,
        target: FileTarget,
        picker: FilePicker,
        form: &TextForm,
    ) -> Result<Mode> {
        let path = form.parse_path()?;
        if !path.is_file() {
            bail!("{} is not a file.", path.display());
        }
        let file = FileDescriptor::from_path(&path)?;
        if !picker.accepts(&file.mime_type) {
            bail!("{} is not a photo or video.", file.name);
        }

        match classify_file(self.store.registry(), file)? {
            Classified::Ready(file) => {
                self.apply_file(target, file)?;
                Ok(Mode::Normal)
            }
            Classified::Pending(pending) => {
                self.set_status(format!("Reading {}...", pending.file_name()), StatusKind::Info);
                Ok(Mode::Decoding { pending, target })
            }
        }
    }

    /// Store a classified file, either as a new item or over an existing one.
    fn apply_file(&mut self, target: FileTarget, file: ClassifiedFile) -> Result<()> {
        let ClassifiedFile {
            title,
            file_type,
            content,
        } = file;

        match target {
            FileTarget::NewItem => {
                let id = self.store.add(title.clone(), file_type, content);
                self.focus_item(&id);
                self.set_status(format!("Added {title}."), StatusKind::Info);
            }
            FileTarget::Replace(id) => {
                self.store
                    .update(&id, title.clone(), Some(content), Some(file_type))?;
                self.detail.reset();
                self.set_status(format!("Replaced with {title}."), StatusKind::Info);
            }
        }
        Ok(())
    }

    fn save_title(&mut self, id: &ItemId, form: &TextForm) -> Result<()> {
        let title = form.required("Title")?;
        self.store.update(id, title.clone(), None, None)?;
        self.set_status(format!("Renamed to {title}."), StatusKind::Info);
        Ok(())
    }

    fn open_detail(&mut self) {
        let Some(id) = self.current_item().map(|item| item.id.clone()) else {
            self.set_status("No item selected.", StatusKind::Error);
            return;
        };
        self.store.select(&id);
        self.detail.reset();
        self.clear_status();
    }

    /// Step the detail screen to a neighbouring item, wrapping at the ends.
    fn open_relative_item(&mut self, offset: isize) {
        let len = self.store.len();
        let Some(current) = self
            .store
            .selected()
            .and_then(|selected| self.store.list().iter().position(|item| item.id == selected.id))
        else {
            return;
        };

        let next = (current as isize + offset).rem_euclid(len as isize) as usize;
        let id = self.store.list()[next].id.clone();
        self.store.select(&id);
        self.cursor.selected = next;
        self.detail.reset();
        self.clear_status();
    }

    fn open_item(&mut self, id: &ItemId) {
        match self.launch_item(id) {
            Ok(message) => self.set_status(message, StatusKind::Info),
            Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
        }
    }

    /// Hand the item to the desktop: URLs go to the browser, content
    /// references are exported to the viewing directory first.
    fn launch_item(&self, id: &ItemId) -> Result<String> {
        let item = self
            .store
            .get(id)
            .ok_or_else(|| anyhow!("Item no longer exists."))?;

        match &item.content {
            Content::Reference(reference) => {
                let path = self
                    .store
                    .registry()
                    .export(reference.handle(), &self.viewing_dir)?;
                open_link(&path).with_context(|| format!("failed to open {}", path.display()))?;
                info!(path = %path.display(), "opened exported content");
                Ok(format!("Opened {}.", item.title))
            }
            Content::Inline(_) if item.file_type.is_text() => {
                bail!("Text notes are shown here; there is nothing to open.")
            }
            Content::Inline(url) => {
                open_link(url).with_context(|| format!("failed to open {url}"))?;
                info!(%url, "opened link");
                Ok(format!("Opened {url}."))
            }
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT.min(area.height)),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_header(frame, chunks[0]);
        match self.store.selected() {
            Some(item) => self.draw_detail(frame, chunks[1], item),
            None => self.draw_grid(frame, chunks[1]),
        }
        self.draw_footer(frame, chunks[2]);

        match &self.mode {
            Mode::Normal => {}
            Mode::ChoosingSource => self.draw_choose_source(frame, area),
            Mode::EnteringPath {
                target,
                picker,
                form,
            } => {
                let title = match (target, picker) {
                    (FileTarget::Replace(_), _) => "Replace File",
                    (FileTarget::NewItem, FilePicker::Gallery) => "Add from Gallery",
                    (FileTarget::NewItem, FilePicker::AnyFile) => "Add File",
                };
                self.draw_text_form(frame, area, title, "Path", form);
            }
            Mode::EnteringLink(form) => self.draw_link_form(frame, area, form),
            Mode::Decoding { pending, .. } => self.draw_decoding(frame, area, pending),
            Mode::EditingTitle { form, .. } => {
                self.draw_text_form(frame, area, "Edit Title", "Title", form)
            }
            Mode::EditingSubtitle(form) => {
                self.draw_text_form(frame, area, "Trip Name", "Trip", form)
            }
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
        }
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::BOTTOM);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let count = self.store.len();
        let noun = if count == 1 { "item" } else { "items" };
        let subtitle = if self.subtitle.is_empty() {
            Span::styled("Press t to name this trip", Style::default().fg(Color::DarkGray))
        } else {
            Span::styled(self.subtitle.clone(), Style::default().fg(Color::Gray))
        };

        let lines = vec![
            Line::from(vec![
                Span::styled("Trip Binder", Style::default().add_modifier(Modifier::BOLD)),
                Span::styled(format!("  {count} {noun}"), Style::default().fg(Color::DarkGray)),
            ]),
            Line::from(subtitle),
        ];
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn draw_grid(&self, frame: &mut Frame, area: Rect) {
        let items = self.store.list();
        if items.is_empty() {
            let message = Paragraph::new(vec![
                Line::from("No items yet."),
                Line::from("Press '+' to add files."),
            ])
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(message, area);
            return;
        }

        let visible_rows = (area.height / CARD_HEIGHT).max(1) as usize;
        let first_row = self.cursor.first_visible_row(visible_rows);
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Length(CARD_HEIGHT); visible_rows])
            .split(area);

        for (offset, row_area) in rows.iter().enumerate() {
            let row_idx = first_row + offset;
            if row_idx >= row_count(items.len()) {
                break;
            }
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(vec![Constraint::Ratio(1, GRID_COLUMNS as u32); GRID_COLUMNS])
                .split(*row_area);

            for (col_idx, cell) in columns.iter().enumerate() {
                let index = row_idx * GRID_COLUMNS + col_idx;
                let Some(item) = items.get(index) else {
                    continue;
                };
                let selected = index == self.cursor.selected;
                let mut block = Block::default()
                    .borders(Borders::ALL)
                    .title(Line::from(format!(" {} ", item.file_type.badge())).right_aligned());
                if selected {
                    block = block.style(Style::default().fg(Color::Yellow));
                }
                let lines = build_item_card_lines(
                    item,
                    cell.width.saturating_sub(2),
                    cell.height.saturating_sub(2),
                    selected,
                );
                frame.render_widget(Paragraph::new(lines).block(block), *cell);
            }
        }
    }

    fn draw_detail(&self, frame: &mut Frame, area: Rect, item: &BinderItem) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0)])
            .split(area);

        let accent = Style::default().fg(type_color(item.file_type));
        let summary = vec![
            Line::from(vec![
                Span::styled(item.title.clone(), Style::default().add_modifier(Modifier::BOLD)),
                Span::raw("  "),
                Span::styled(format!("[{}]", item.file_type.badge()), accent),
            ]),
            Line::from(Span::styled(
                format!(
                    "{} · added {}",
                    kind_label(item.file_type),
                    format_timestamp(item.timestamp)
                ),
                Style::default().fg(Color::Gray),
            )),
        ];
        frame.render_widget(
            Paragraph::new(summary).block(Block::default().borders(Borders::ALL).title("Item")),
            chunks[0],
        );

        let preview = Paragraph::new(self.preview_lines(item))
            .block(Block::default().borders(Borders::ALL).title("Preview"))
            .wrap(Wrap { trim: false })
            .scroll((self.detail.offset, 0));
        frame.render_widget(preview, chunks[1]);
    }

    /// Per-kind preview body for the detail screen.
    fn preview_lines(&self, item: &BinderItem) -> Vec<Line<'static>> {
        let hint_style = Style::default().fg(Color::DarkGray);
        let link_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::UNDERLINED);

        let mut lines: Vec<Line<'static>> = match (item.file_type, &item.content) {
            (FileType::Txt, content) => content
                .as_str()
                .lines()
                .map(|line| Line::from(line.to_string()))
                .collect(),
            (FileType::Link, content) => vec![
                Line::from(Span::styled(content.as_str().to_string(), link_style)),
                Line::from(""),
                Line::from(Span::styled("Press Enter to open in the browser.", hint_style)),
            ],
            (_, Content::Reference(reference)) => {
                match self.store.registry().metadata(reference.handle()) {
                    Ok(Some(metadata)) => {
                        let mime = if metadata.mime_type.is_empty() {
                            "unknown".to_string()
                        } else {
                            metadata.mime_type
                        };
                        vec![
                            Line::from(format!("File: {}", metadata.file_name)),
                            Line::from(format!("Format: {mime}")),
                            Line::from(format!("Size: {}", format_size(metadata.size))),
                            Line::from(Span::styled(reference.handle().to_string(), hint_style)),
                            Line::from(""),
                            Line::from(Span::styled(
                                "Press Enter to open with the default viewer.",
                                hint_style,
                            )),
                        ]
                    }
                    Ok(None) => vec![Line::from(Span::styled(
                        "This content is no longer available.",
                        Style::default().fg(Color::Red),
                    ))],
                    Err(err) => vec![Line::from(Span::styled(
                        surface_error(&err),
                        Style::default().fg(Color::Red),
                    ))],
                }
            }
            (_, Content::Inline(url)) => vec![
                Line::from("Hosted at"),
                Line::from(Span::styled(url.clone(), link_style)),
                Line::from(""),
                Line::from(Span::styled("Press Enter to open in the browser.", hint_style)),
            ],
        };

        if let Some(thumbnail) = &item.thumbnail {
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::raw("Thumbnail: "),
                Span::styled(thumbnail.clone(), link_style),
            ]));
        }
        lines
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
        let keys: &[(&str, &str)] = match (&self.mode, self.store.selected().is_some()) {
            (Mode::ChoosingSource, _) => &[
                ("[f]", "File"),
                ("[g]", "Gallery"),
                ("[l]", "Link"),
                ("[Esc]", "Cancel"),
            ],
            (Mode::EnteringLink(_), _) => {
                &[("[Tab]", "Switch"), ("[Enter]", "Save"), ("[Esc]", "Cancel")]
            }
            (Mode::EnteringPath { .. }, _)
            | (Mode::EditingTitle { .. }, _)
            | (Mode::EditingSubtitle(_), _) => &[("[Enter]", "Save"), ("[Esc]", "Cancel")],
            (Mode::Decoding { .. }, _) => &[("[Esc]", "Stop reading")],
            (Mode::ConfirmDelete(_), _) => &[("[y]", "Delete"), ("[n]", "Keep")],
            (Mode::Normal, true) => &[
                ("[Enter]", "Open"),
                ("[e]", "Rename"),
                ("[r]", "Replace"),
                ("[d]", "Delete"),
                ("[Tab]", "Next"),
                ("[Esc]", "Back"),
            ],
            (Mode::Normal, false) => &[
                ("[←↑↓→]", "Navigate"),
                ("[Enter]", "View"),
                ("[+]", "Add"),
                ("[t]", "Trip name"),
                ("[q]", "Quit"),
            ],
        };

        let spans = keys
            .iter()
            .flat_map(|(key, label)| {
                [
                    Span::styled(key.to_string(), key_style),
                    Span::raw(format!(" {label}   ")),
                ]
            })
            .collect::<Vec<_>>();
        Line::from(spans)
    }

    fn draw_choose_source(&self, frame: &mut Frame, area: Rect) {
        let popup_area = centered_rect(50, 30, area);
        frame.render_widget(Clear, popup_area);

        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let lines = vec![
            Line::from(vec![
                Span::styled("[f]", key_style),
                Span::raw(" File from disk (photo, video, audio, PDF, office, text)"),
            ]),
            Line::from(vec![
                Span::styled("[g]", key_style),
                Span::raw(" Gallery (photos and videos)"),
            ]),
            Line::from(vec![
                Span::styled("[l]", key_style),
                Span::raw(" Web link"),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "Esc to cancel",
                Style::default().fg(Color::Gray),
            )),
        ];
        let paragraph = Paragraph::new(lines)
            .block(Block::default().title("Add to Binder").borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);
    }

    fn draw_text_form(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        field_name: &str,
        form: &TextForm,
    ) {
        let popup_area = centered_rect(70, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![form.build_line(field_name), Line::from("")];
        lines.push(form_hint(form.error.as_deref(), "Enter to save • Esc to cancel"));
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

        let prefix = format!("{field_name}: ").chars().count() as u16;
        frame.set_cursor_position((inner.x + prefix + form.value_len() as u16, inner.y));
    }

    fn draw_link_form(&self, frame: &mut Frame, area: Rect, form: &LinkForm) {
        let popup_area = centered_rect(70, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Add Link").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            form.build_line("Title", LinkField::Title),
            form.build_line("URL", LinkField::Url),
            Line::from(""),
            form_hint(
                form.error.as_deref(),
                "Enter to save • Tab to switch • Esc to cancel",
            ),
        ];
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

        let (prefix, row) = match form.active {
            LinkField::Title => ("Title: ".len() as u16, 0),
            LinkField::Url => ("URL: ".len() as u16, 1),
        };
        frame.set_cursor_position((
            inner.x + prefix + form.value_len(form.active) as u16,
            inner.y + row,
        ));
    }

    fn draw_decoding(&self, frame: &mut Frame, area: Rect, pending: &PendingDecode) {
        let popup_area = centered_rect(50, 20, area);
        frame.render_widget(Clear, popup_area);

        let lines = vec![
            Line::from(format!("Reading {}...", pending.file_name())),
            Line::from(""),
            Line::from(Span::styled(
                "Esc to stop",
                Style::default().fg(Color::Gray),
            )),
        ];
        let paragraph = Paragraph::new(lines)
            .block(Block::default().title("Please Wait").borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmItemDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Delete Item").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!("Delete '{}'?", confirm.title)),
            Line::from("Its content will be released."),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn current_item(&self) -> Option<&BinderItem> {
        self.store.list().get(self.cursor.selected)
    }

    fn focus_item(&mut self, id: &ItemId) {
        if let Some(index) = self.store.list().iter().position(|item| &item.id == id) {
            self.cursor.selected = index;
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

/// Red error text when the form was rejected, otherwise the key hint.
fn form_hint(error: Option<&str>, hint: &'static str) -> Line<'static> {
    match error {
        Some(error) => Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red),
        )),
        None => Line::from(Span::styled(hint, Style::default().fg(Color::Gray))),
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use crate::content::ContentRegistry;
    use crate::seed::default_items;

    use super::*;

    fn seeded_app() -> App {
        let registry = ContentRegistry::open_in_memory().unwrap();
        let store = BinderStore::seeded(registry, default_items()).unwrap();
        App::new(store, "Trip to N.Y.".to_string(), std::env::temp_dir())
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch)).unwrap();
        }
    }

    #[test]
    fn adding_a_link_through_the_modal() {
        let mut app = seeded_app();
        app.handle_key(KeyCode::Char('+')).unwrap();
        app.handle_key(KeyCode::Char('l')).unwrap();
        type_text(&mut app, "Hotel");
        app.handle_key(KeyCode::Tab).unwrap();
        type_text(&mut app, "hotel.example");
        app.handle_key(KeyCode::Enter).unwrap();

        let last = app.store().list().last().unwrap();
        assert_eq!(last.title, "Hotel");
        assert_eq!(last.file_type, FileType::Link);
        assert_eq!(last.content.as_str(), "https://hotel.example");
        assert_eq!(app.cursor.selected, app.store().len() - 1);
    }

    #[test]
    fn incomplete_link_keeps_the_form_open() {
        let mut app = seeded_app();
        app.handle_key(KeyCode::Char('+')).unwrap();
        app.handle_key(KeyCode::Char('l')).unwrap();
        type_text(&mut app, "Hotel");
        app.handle_key(KeyCode::Enter).unwrap();

        assert_eq!(app.store().len(), default_items().len());
        assert!(matches!(app.mode, Mode::EnteringLink(_)));
    }

    #[test]
    fn deleting_from_the_detail_screen_returns_to_the_grid() {
        let mut app = seeded_app();
        app.handle_key(KeyCode::Enter).unwrap();
        assert_eq!(app.store().selected().unwrap().title, "Passport");

        app.handle_key(KeyCode::Char('d')).unwrap();
        app.handle_key(KeyCode::Char('y')).unwrap();

        assert!(app.store().selected().is_none());
        assert!(app.store().get(&ItemId::from("1")).is_none());
        assert_eq!(app.store().len(), default_items().len() - 1);
    }

    #[test]
    fn renaming_keeps_content() {
        let mut app = seeded_app();
        app.handle_key(KeyCode::Enter).unwrap();
        app.handle_key(KeyCode::Char('e')).unwrap();
        for _ in 0.."Passport".len() {
            app.handle_key(KeyCode::Backspace).unwrap();
        }
        type_text(&mut app, "Passport (scan)");
        app.handle_key(KeyCode::Enter).unwrap();

        let item = app.store().get(&ItemId::from("1")).unwrap();
        assert_eq!(item.title, "Passport (scan)");
        assert_eq!(item.content.as_str(), "https://picsum.photos/id/103/600/800");
    }

    #[test]
    fn replacing_with_a_text_file_decodes_before_updating() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("visa-notes.txt");
        std::fs::write(&path, "Valid until March").unwrap();

        let mut app = seeded_app();
        app.handle_key(KeyCode::Right).unwrap();
        app.handle_key(KeyCode::Enter).unwrap();
        app.handle_key(KeyCode::Char('r')).unwrap();
        type_text(&mut app, &path.display().to_string());
        app.handle_key(KeyCode::Enter).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while app.is_decoding() {
            assert!(Instant::now() < deadline, "decode never finished");
            std::thread::sleep(Duration::from_millis(5));
            app.tick().unwrap();
        }

        let item = app.store().get(&ItemId::from("2")).unwrap();
        assert_eq!(item.title, "visa-notes.txt");
        assert_eq!(item.file_type, FileType::Txt);
        assert_eq!(item.content.as_str(), "Valid until March");
    }

    #[test]
    fn adding_a_binary_file_stores_a_reference() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("boarding.pdf");
        std::fs::write(&path, b"%PDF-1.7").unwrap();

        let mut app = seeded_app();
        app.handle_key(KeyCode::Char('+')).unwrap();
        app.handle_key(KeyCode::Char('f')).unwrap();
        type_text(&mut app, &path.display().to_string());
        app.handle_key(KeyCode::Enter).unwrap();

        let last = app.store().list().last().unwrap();
        assert_eq!(last.title, "boarding.pdf");
        assert_eq!(last.file_type, FileType::Pdf);
        assert!(matches!(last.content, Content::Reference(_)));
        assert_eq!(app.store().registry().live_count().unwrap(), 1);
    }

    #[test]
    fn gallery_rejects_documents_and_accepts_photos() {
        let dir = tempfile::tempdir().unwrap();
        let document = dir.path().join("itinerary.pdf");
        let photo = dir.path().join("beach.jpg");
        std::fs::write(&document, b"%PDF-1.7").unwrap();
        std::fs::write(&photo, b"\xFF\xD8\xFF").unwrap();

        let mut app = seeded_app();
        app.handle_key(KeyCode::Char('+')).unwrap();
        app.handle_key(KeyCode::Char('g')).unwrap();
        type_text(&mut app, &document.display().to_string());
        app.handle_key(KeyCode::Enter).unwrap();

        assert!(matches!(
            app.mode,
            Mode::EnteringPath {
                picker: FilePicker::Gallery,
                ..
            }
        ));
        assert_eq!(app.store().len(), default_items().len());
        assert_eq!(app.store().registry().live_count().unwrap(), 0);

        for _ in 0..document.display().to_string().chars().count() {
            app.handle_key(KeyCode::Backspace).unwrap();
        }
        type_text(&mut app, &photo.display().to_string());
        app.handle_key(KeyCode::Enter).unwrap();

        let last = app.store().list().last().unwrap();
        assert_eq!(last.title, "beach.jpg");
        assert_eq!(last.file_type, FileType::Image);
        assert!(matches!(app.mode, Mode::Normal));
    }

    #[test]
    fn missing_path_reports_an_error() {
        let mut app = seeded_app();
        app.handle_key(KeyCode::Char('+')).unwrap();
        app.handle_key(KeyCode::Char('f')).unwrap();
        type_text(&mut app, "/definitely/not/here.png");
        app.handle_key(KeyCode::Enter).unwrap();

        assert!(matches!(app.mode, Mode::EnteringPath { .. }));
        assert_eq!(app.store().len(), default_items().len());
    }

    #[test]
    fn grid_and_detail_render() {
        let mut app = seeded_app();
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();

        app.handle_key(KeyCode::Down).unwrap();
        app.handle_key(KeyCode::Enter).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        assert_eq!(app.store().selected().unwrap().title, "To Do List");
    }
}
