use arboard::Clipboard;
use ratatui::crossterm::event::KeyEvent;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

use crate::dataset::Dataset;
use crate::domain::{CMDMode, Message, TSConfig, TSError};
use crate::inputter::{InputResult, Inputter};
use crate::notify::Notifications;
use crate::progress::UploadProgress;
use crate::search::{SearchQuery, SearchResultSet};

#[derive(Debug, PartialEq)]
pub enum Status {
    READY,
    LOADING,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    MAIN,
    POPUP,
    CMDINPUT,
}

/// What the results area currently shows.
#[derive(Debug, PartialEq)]
pub enum ResultsView {
    Cleared,
    NoResults,
    Matches(SearchResultSet),
}

/// One matching row, ready to be rendered as a card.
#[derive(Debug, PartialEq)]
pub struct ResultCard<'a> {
    pub row: usize,
    pub fields: Vec<(&'a str, &'a str)>,
}

pub const HEADER_HEIGHT: u16 = 3;
pub const BANNER_HEIGHT: u16 = 3;
pub const PROGRESS_HEIGHT: u16 = 1;
pub const SEARCH_HEIGHT: u16 = 3;
pub const STATUSLINE_HEIGHT: u16 = 1;
pub const RESULTS_BORDER: u16 = 2;
pub const CARD_BORDER: u16 = 2;

#[derive(Default, Clone, Debug)]
pub struct UILayout {
    pub width: usize,
    pub height: usize,
}

impl UILayout {
    /// Number of result cards with `ncols` fields that fit below the fixed rows.
    pub fn results_capacity(&self, ncols: usize, banner: bool) -> usize {
        let mut chrome =
            HEADER_HEIGHT + PROGRESS_HEIGHT + SEARCH_HEIGHT + STATUSLINE_HEIGHT + RESULTS_BORDER;
        if banner {
            chrome += BANNER_HEIGHT;
        }
        let card_height = ncols + CARD_BORDER as usize;
        std::cmp::max(1, self.height.saturating_sub(chrome as usize) / card_height)
    }
}

pub struct Model {
    config: TSConfig,
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    dataset: Option<Dataset>,
    results: ResultsView,
    selected: usize,
    offset: usize,
    progress: Option<UploadProgress>,
    notifications: Notifications,
    query_input: Inputter,
    path_input: Inputter,
    cmd_mode: Option<CMDMode>,
    uilayout: UILayout,
    clipboard: Option<Clipboard>,
}

impl Model {
    pub fn init(config: &TSConfig, ui_width: usize, ui_height: usize) -> Self {
        Self {
            config: config.clone(),
            status: Status::READY,
            modus: Modus::MAIN,
            previous_modus: Modus::MAIN,
            dataset: None,
            results: ResultsView::Cleared,
            selected: 0,
            offset: 0,
            progress: None,
            notifications: Notifications::new(Duration::from_millis(config.toast_duration)),
            query_input: Inputter::default(),
            path_input: Inputter::default(),
            cmd_mode: None,
            uilayout: UILayout {
                width: ui_width,
                height: ui_height,
            },
            clipboard: None,
        }
    }

    // ---------------------------- Accessors ---------------------------- //

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn delete_enabled(&self) -> bool {
        self.dataset.is_some()
    }

    pub fn results(&self) -> &ResultsView {
        &self.results
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn progress(&self) -> Option<&UploadProgress> {
        self.progress.as_ref()
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn query_input(&self) -> InputResult {
        self.query_input.get()
    }

    pub fn path_input(&self) -> InputResult {
        self.path_input.get()
    }

    pub fn cmd_mode(&self) -> Option<CMDMode> {
        self.cmd_mode
    }

    pub fn show_help(&self) -> bool {
        self.modus == Modus::POPUP
    }

    /// True while a prompt consumes the raw key events.
    pub fn raw_keyevents(&self) -> bool {
        self.modus == Modus::CMDINPUT
    }

    pub fn result_card(&self, idx: usize) -> Option<ResultCard<'_>> {
        let ResultsView::Matches(set) = &self.results else {
            return None;
        };
        let row = *set.rows().get(idx)?;
        let fields = self.dataset.as_ref()?.row(row)?;
        Some(ResultCard { row, fields })
    }

    pub fn nresults(&self) -> usize {
        match &self.results {
            ResultsView::Matches(set) => set.len(),
            _ => 0,
        }
    }

    // ---------------------------- Operations ---------------------------- //

    /// Validates the selected file and starts the upload progress.
    pub fn request_upload(&mut self, path: Option<PathBuf>) -> Result<(), TSError> {
        let path = match path {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => return Err(TSError::NoFileSelected),
        };
        if !Dataset::is_csv(&path) {
            return Err(TSError::UnknownFileType);
        }

        info!("Uploading {:?} ...", path);
        self.progress = Some(UploadProgress::start(
            path,
            Duration::from_millis(self.config.progress_step_time),
        ));
        self.status = Status::LOADING;
        Ok(())
    }

    /// Like `request_upload`, but failures end up as notifications.
    pub fn upload(&mut self, path: Option<PathBuf>) {
        let res = self.request_upload(path);
        self.report(res, "Error loading CSV");
    }

    /// Parses the file and replaces the dataset. The previous dataset is kept on failure.
    pub fn load_dataset(&mut self, path: PathBuf) -> Result<(), TSError> {
        let dataset = Dataset::load(path)?;
        info!(
            "Loaded {:?} with {} rows and {} columns",
            dataset.path().unwrap_or(Path::new(dataset.name())),
            dataset.nrows(),
            dataset.ncols()
        );
        debug!("Columns: {:?}", dataset.column_names().collect::<Vec<_>>());
        self.dataset = Some(dataset);
        self.clear_results();
        self.notifications
            .success("File uploaded and loaded successfully!");
        Ok(())
    }

    pub fn delete(&mut self) -> Result<(), TSError> {
        let Some(dataset) = self.dataset.take() else {
            return Err(TSError::NothingToDelete);
        };
        info!("Removed {}", dataset.name());
        self.clear_results();
        self.query_input.clear();
        self.notifications.info("File removed successfully!");
        Ok(())
    }

    /// Searches the dataset for the text of the search field.
    pub fn search(&mut self) -> Result<(), TSError> {
        let Some(dataset) = self.dataset.as_ref() else {
            return Err(TSError::NoDataLoaded);
        };
        let query = SearchQuery::parse(self.query_input.value())?;
        let set = dataset.search(&query)?;

        debug!("Search for \"{}\" found {} rows", query.as_str(), set.len());
        self.selected = 0;
        self.offset = 0;
        self.results = if set.is_empty() {
            ResultsView::NoResults
        } else {
            ResultsView::Matches(set)
        };
        Ok(())
    }

    pub fn set_query(&mut self, query: &str) {
        self.query_input.set(query);
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    fn clear_results(&mut self) {
        self.results = ResultsView::Cleared;
        self.selected = 0;
        self.offset = 0;
    }

    fn report(&mut self, res: Result<(), TSError>, context: &str) {
        if let Err(e) = res {
            let message = if e.is_user_error() {
                e.to_string()
            } else {
                format!("{context}: {e}")
            };
            self.notifications.error(message);
        }
    }

    fn tick(&mut self, now: Instant) {
        self.notifications.expire(now);

        if self.progress.as_ref().is_some_and(|p| p.is_complete()) {
            if let Some(progress) = self.progress.take() {
                self.status = Status::READY;
                let res = self.load_dataset(progress.into_path());
                self.report(res, "Error loading CSV");
            }
        } else if let Some(progress) = self.progress.as_mut() {
            if progress.advance(now) {
                trace!("Upload step {} at {}%", progress.steps(), progress.percent());
            }
        }
    }

    fn ui_resize(&mut self, width: usize, height: usize) {
        trace!(
            "UI was resized! w:{}->{}, h:{}->{}",
            self.uilayout.width, width, self.uilayout.height, height
        );
        self.uilayout = UILayout { width, height };
        self.keep_selection_visible();
    }

    pub fn update(&mut self, message: Option<Message>) -> Result<(), TSError> {
        let Some(msg) = message else {
            return Ok(());
        };

        match msg {
            Message::Quit => self.quit(),
            Message::Tick => self.tick(Instant::now()),
            Message::Resize(width, height) => self.ui_resize(width, height),
            msg if self.status == Status::LOADING => trace!("Ignoring {msg:?} while loading"),
            msg => match self.modus {
                Modus::MAIN => match msg {
                    Message::Upload => self.enter_cmd_mode(CMDMode::UploadPath),
                    Message::Delete => {
                        let res = self.delete();
                        self.report(res, "Error deleting file");
                    }
                    Message::EditQuery => self.enter_cmd_mode(CMDMode::SearchQuery),
                    Message::Search => {
                        let res = self.search();
                        self.report(res, "Error during search");
                    }
                    Message::MoveUp => self.move_selection_up(1),
                    Message::MoveDown => self.move_selection_down(1),
                    Message::MovePageUp => self.move_selection_up(self.cards_per_page()),
                    Message::MovePageDown => self.move_selection_down(self.cards_per_page()),
                    Message::MoveBeginning => self.move_selection_beginning(),
                    Message::MoveEnd => self.move_selection_end(),
                    Message::CopyResult => {
                        let res = self.copy_selected_result();
                        self.report(res, "Error copying result");
                    }
                    Message::Help => self.open_help(),
                    Message::Exit => self.notifications.dismiss(),
                    _ => (),
                },
                Modus::POPUP => match msg {
                    Message::Exit | Message::Help => self.close_help(),
                    _ => (),
                },
                Modus::CMDINPUT => {
                    if let Message::RawKey(key) = msg {
                        self.raw_input(key)
                    }
                }
            },
        }
        Ok(())
    }

    // -------------------- Control handling functions ---------------------- //

    fn open_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::POPUP;
    }

    fn close_help(&mut self) {
        trace!("Close popup ...");
        self.modus = self.previous_modus;
        self.previous_modus = Modus::POPUP;
    }

    fn enter_cmd_mode(&mut self, mode: CMDMode) {
        trace!("Entering command mode {mode:?} ...");
        self.previous_modus = self.modus;
        self.modus = Modus::CMDINPUT;
        self.cmd_mode = Some(mode);
        match mode {
            CMDMode::UploadPath => self.path_input.clear(),
            CMDMode::SearchQuery => self.query_input.resume(),
        }
    }

    fn raw_input(&mut self, key: KeyEvent) {
        let Some(mode) = self.cmd_mode else {
            return;
        };
        let input = match mode {
            CMDMode::UploadPath => self.path_input.read(key),
            CMDMode::SearchQuery => self.query_input.read(key),
        };
        if input.finished {
            self.handle_cmd_input(mode, input);
        }
    }

    fn handle_cmd_input(&mut self, mode: CMDMode, input: InputResult) {
        trace!("Handle cmd input {mode:?} \"{}\"", input.input);
        self.modus = self.previous_modus;
        self.previous_modus = Modus::CMDINPUT;
        self.cmd_mode = None;

        match mode {
            CMDMode::UploadPath => {
                if input.canceled {
                    self.upload(None);
                    return;
                }
                let res = Self::expand_path(&input.input)
                    .and_then(|path| self.request_upload(path));
                self.report(res, "Error loading CSV");
            }
            CMDMode::SearchQuery => {
                self.query_input.resume();
                if !input.canceled {
                    let res = self.search();
                    self.report(res, "Error during search");
                }
            }
        }
    }

    fn expand_path(raw: &str) -> Result<Option<PathBuf>, TSError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        let expanded = shellexpand::full(raw)
            .map_err(|e| TSError::LoadingFailed(e.to_string()))?;
        Ok(Some(PathBuf::from(expanded.as_ref())))
    }

    fn cards_per_page(&self) -> usize {
        let ncols = self.dataset.as_ref().map(|d| d.ncols()).unwrap_or(0);
        let banner = self.notifications.banner().is_some();
        self.uilayout.results_capacity(ncols, banner)
    }

    fn keep_selection_visible(&mut self) {
        let page = self.cards_per_page();
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + page {
            self.offset = self.selected + 1 - page;
        }
    }

    fn move_selection_up(&mut self, size: usize) {
        self.selected = self.selected.saturating_sub(size);
        self.keep_selection_visible();
    }

    fn move_selection_down(&mut self, size: usize) {
        let n = self.nresults();
        if n > 0 {
            self.selected = std::cmp::min(self.selected + size, n - 1);
            self.keep_selection_visible();
        }
    }

    fn move_selection_beginning(&mut self) {
        self.selected = 0;
        self.offset = 0;
    }

    fn move_selection_end(&mut self) {
        self.selected = self.nresults().saturating_sub(1);
        self.keep_selection_visible();
    }

    fn copy_selected_result(&mut self) -> Result<(), TSError> {
        let Some(card) = self.result_card(self.selected) else {
            trace!("Nothing selected to copy");
            return Ok(());
        };
        let line = row_as_csv_line(&card.fields);
        trace!("Row content: {}", line);

        if self.clipboard.is_none() {
            self.clipboard =
                Some(Clipboard::new().map_err(|e| TSError::Clipboard(e.to_string()))?);
        }
        if let Some(clipboard) = self.clipboard.as_mut() {
            clipboard
                .set_text(line)
                .map_err(|e| TSError::Clipboard(e.to_string()))?;
        }
        self.notifications.info("Copied result to clipboard.");
        self.keep_selection_visible();
        Ok(())
    }
}

fn wrap_cell_content(c: &str) -> String {
    let needs_escaping = c.contains('"');
    let needs_wrapping = needs_escaping || c.chars().any(|c| c == ' ' || c == '\t' || c == ',');
    let mut out = String::from(c);

    if needs_escaping {
        out = out.replace('"', "\"\"");
    }
    if needs_wrapping {
        out = format!("\"{out}\"");
    }
    out
}

/// Cell values of a row joined into a single csv line.
pub fn row_as_csv_line(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(_, value)| wrap_cell_content(value))
        .collect::<Vec<String>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Column;
    use crate::notify::NoticeKind;
    use crate::progress::PROGRESS_STEPS;
    use ratatui::crossterm::event::{KeyCode, KeyModifiers};
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    fn csv_file(content: &str) -> NamedTempFile {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn model() -> Model {
        let cfg = TSConfig::default().progress_step_time(0);
        Model::init(&cfg, 80, 40)
    }

    /// Ticks until the upload has finished, returns the progress values seen.
    fn finish_upload(model: &mut Model) -> Vec<u16> {
        let mut seen = Vec::new();
        while model.status == Status::LOADING {
            model.update(Some(Message::Tick)).unwrap();
            if let Some(p) = model.progress() {
                seen.push(p.percent());
            }
        }
        seen
    }

    fn loaded(content: &str) -> (Model, NamedTempFile) {
        let file = csv_file(content);
        let mut model = model();
        model.upload(Some(file.path().to_path_buf()));
        finish_upload(&mut model);
        assert!(model.dataset().is_some());
        (model, file)
    }

    fn last_error(model: &Model) -> Option<&str> {
        model
            .notifications()
            .toasts()
            .last()
            .map(|t| t.message.as_str())
    }

    fn type_keys(model: &mut Model, s: &str) {
        for c in s.chars() {
            model
                .update(Some(Message::RawKey(KeyEvent::new(
                    KeyCode::Char(c),
                    KeyModifiers::NONE,
                ))))
                .unwrap();
        }
    }

    fn press(model: &mut Model, code: KeyCode) {
        model
            .update(Some(Message::RawKey(KeyEvent::new(code, KeyModifiers::NONE))))
            .unwrap();
    }

    #[test]
    fn upload_without_file() {
        let mut model = model();
        model.upload(None);
        assert_eq!(last_error(&model), Some("No file selected."));
        assert!(model.dataset().is_none());
        assert_eq!(model.status, Status::READY);
    }

    #[test]
    fn upload_wrong_extension_keeps_dataset() {
        let (mut model, _file) = loaded("a,b\n1,2\n");
        let other = Builder::new().suffix(".txt").tempfile().unwrap();
        model.upload(Some(other.path().to_path_buf()));
        assert_eq!(
            last_error(&model),
            Some("Invalid file type. Please upload a CSV file.")
        );
        assert_eq!(model.status, Status::READY);
        assert_eq!(model.dataset().unwrap().nrows(), 1);
    }

    #[test]
    fn upload_simple_csv() {
        let file = csv_file("a,b\n1,2\n");
        let mut model = model();
        assert!(!model.delete_enabled());
        model.upload(Some(file.path().to_path_buf()));
        assert_eq!(model.status, Status::LOADING);
        assert!(model.dataset().is_none());

        let seen = finish_upload(&mut model);
        assert_eq!(seen.len(), PROGRESS_STEPS as usize);
        assert_eq!(seen.first(), Some(&0));
        assert_eq!(seen.last(), Some(&100));
        assert!(model.progress().is_none());

        let ds = model.dataset().unwrap();
        assert_eq!(ds.row(0).unwrap(), vec![("a", "1"), ("b", "2")]);
        assert_eq!(ds.nrows(), 1);
        assert!(model.delete_enabled());
        let banner = model.notifications().banner().unwrap();
        assert_eq!(banner.kind, NoticeKind::Success);
        assert_eq!(banner.message, "File uploaded and loaded successfully!");
    }

    #[test]
    fn input_is_ignored_while_uploading() {
        let file = csv_file("a,b\n1,2\n");
        let mut model = model();
        model.upload(Some(file.path().to_path_buf()));
        model.update(Some(Message::Delete)).unwrap();
        model.update(Some(Message::Search)).unwrap();
        assert!(model.notifications().toasts().is_empty());
        finish_upload(&mut model);
        assert!(model.dataset().is_some());
    }

    #[test]
    fn failed_parse_keeps_previous_dataset() {
        let (mut model, _file) = loaded("a,b\n1,2\n");
        let broken = csv_file("a,b\n1,2,3,4\n");
        model.upload(Some(broken.path().to_path_buf()));
        finish_upload(&mut model);
        assert!(last_error(&model).unwrap().starts_with("Error loading CSV: "));
        let ds = model.dataset().unwrap();
        assert_eq!(ds.row(0).unwrap(), vec![("a", "1"), ("b", "2")]);
        assert!(model.delete_enabled());
    }

    #[test]
    fn missing_file_is_reported_after_progress() {
        let dir = tempfile::tempdir().unwrap();
        let mut model = model();
        model.upload(Some(dir.path().join("gone.csv")));
        finish_upload(&mut model);
        assert_eq!(last_error(&model), Some("Error loading CSV: file not found"));
        assert!(model.dataset().is_none());
    }

    #[test]
    fn new_upload_replaces_dataset_and_results() {
        let (mut model, _file) = loaded("a,b\n1,2\n");
        model.set_query("1");
        model.search().unwrap();
        assert_eq!(model.nresults(), 1);

        let second = csv_file("x\nfoo\nbar\n");
        model.upload(Some(second.path().to_path_buf()));
        finish_upload(&mut model);
        let ds = model.dataset().unwrap();
        assert_eq!(ds.column_names().collect::<Vec<_>>(), vec!["x"]);
        assert_eq!(ds.nrows(), 2);
        assert_eq!(model.results(), &ResultsView::Cleared);
    }

    #[test]
    fn delete_without_dataset() {
        let mut model = model();
        assert!(matches!(model.delete(), Err(TSError::NothingToDelete)));
        model.update(Some(Message::Delete)).unwrap();
        assert_eq!(last_error(&model), Some("No file to delete!"));
    }

    #[test]
    fn delete_resets_everything() {
        let (mut model, _file) = loaded("a,b\n1,2\n");
        model.set_query("2");
        model.search().unwrap();
        assert_eq!(model.nresults(), 1);

        model.update(Some(Message::Delete)).unwrap();
        assert!(model.dataset().is_none());
        assert!(!model.delete_enabled());
        assert_eq!(model.results(), &ResultsView::Cleared);
        assert_eq!(model.query_input().input, "");
        let banner = model.notifications().banner().unwrap();
        assert_eq!(banner.kind, NoticeKind::Info);
        assert_eq!(banner.message, "File removed successfully!");
    }

    #[test]
    fn search_without_dataset() {
        let mut model = model();
        model.set_query("foo");
        model.update(Some(Message::Search)).unwrap();
        assert_eq!(last_error(&model), Some("Please upload a CSV file first!"));
        assert_eq!(model.results(), &ResultsView::Cleared);
    }

    #[test]
    fn search_with_blank_query() {
        let (mut model, _file) = loaded("a,b\n1,2\n");
        model.set_query("   ");
        model.update(Some(Message::Search)).unwrap();
        assert_eq!(last_error(&model), Some("Search query cannot be empty!"));
        assert_eq!(model.results(), &ResultsView::Cleared);
    }

    #[test]
    fn search_finds_single_row() {
        let (mut model, _file) = loaded("name,city\nAlice,Vienna\nBob,Graz\nCarol,Linz\n");
        model.set_query("raz");
        model.search().unwrap();
        assert_eq!(model.nresults(), 1);
        let card = model.result_card(0).unwrap();
        assert_eq!(card.row, 1);
        assert_eq!(card.fields, vec![("name", "Bob"), ("city", "Graz")]);
        assert!(model.result_card(1).is_none());
    }

    #[test]
    fn search_ignores_case() {
        let (mut model, _file) = loaded("id,text\n1,foo bar\n2,baz\n");
        model.set_query("FOO");
        model.search().unwrap();
        assert_eq!(model.result_card(0).unwrap().row, 0);
        assert_eq!(model.nresults(), 1);
    }

    #[test]
    fn search_without_match() {
        let (mut model, _file) = loaded("id,text\n1,foo bar\n");
        model.set_query("nothing");
        model.search().unwrap();
        assert_eq!(model.results(), &ResultsView::NoResults);
        assert!(model.result_card(0).is_none());
    }

    #[test]
    fn search_is_idempotent() {
        let (mut model, _file) = loaded("id,text\n1,foo\n2,bar\n3,food\n");
        model.set_query("fo");
        model.search().unwrap();
        let rows: Vec<usize> = (0..model.nresults())
            .filter_map(|i| model.result_card(i).map(|c| c.row))
            .collect();
        model.search().unwrap();
        let again: Vec<usize> = (0..model.nresults())
            .filter_map(|i| model.result_card(i).map(|c| c.row))
            .collect();
        assert_eq!(rows, vec![0, 2]);
        assert_eq!(rows, again);
        assert_eq!(model.query_input().input, "fo");
    }

    #[test]
    fn search_reports_malformed_data() {
        let mut model = model();
        model.dataset = Some(Dataset::from_columns_unchecked(
            "ragged",
            vec![
                Column::new("a", vec!["1".into(), "2".into()]),
                Column::new("b", vec!["x".into()]),
            ],
            2,
        ));
        model.set_query("1");
        model.update(Some(Message::Search)).unwrap();
        let err = last_error(&model).unwrap();
        assert!(err.starts_with("Error during search: malformed data"), "{err}");
        assert_eq!(model.results(), &ResultsView::Cleared);
        assert_eq!(model.status, Status::READY);
    }

    #[test]
    fn search_through_prompt() {
        let (mut model, _file) = loaded("id,text\n1,foo\n2,bar\n");
        model.update(Some(Message::EditQuery)).unwrap();
        assert!(model.raw_keyevents());
        type_keys(&mut model, " BAR ");
        press(&mut model, KeyCode::Enter);
        assert!(!model.raw_keyevents());
        assert_eq!(model.nresults(), 1);
        assert_eq!(model.result_card(0).unwrap().row, 1);
        assert_eq!(model.query_input().input, " BAR ");
    }

    #[test]
    fn escape_leaves_query_prompt_without_search() {
        let (mut model, _file) = loaded("id,text\n1,foo\n");
        model.update(Some(Message::EditQuery)).unwrap();
        type_keys(&mut model, "foo");
        press(&mut model, KeyCode::Esc);
        assert!(!model.raw_keyevents());
        assert_eq!(model.results(), &ResultsView::Cleared);
        assert_eq!(model.query_input().input, "foo");
    }

    #[test]
    fn upload_through_prompt() {
        let file = csv_file("a\nx\n");
        let mut model = model();
        model.update(Some(Message::Upload)).unwrap();
        assert_eq!(model.cmd_mode(), Some(CMDMode::UploadPath));
        type_keys(&mut model, &file.path().to_string_lossy());
        press(&mut model, KeyCode::Enter);
        assert_eq!(model.status, Status::LOADING);
        finish_upload(&mut model);
        assert_eq!(model.dataset().unwrap().nrows(), 1);
    }

    #[test]
    fn canceled_upload_prompt_selects_no_file() {
        let mut model = model();
        model.update(Some(Message::Upload)).unwrap();
        type_keys(&mut model, "half/typed.csv");
        press(&mut model, KeyCode::Esc);
        assert_eq!(last_error(&model), Some("No file selected."));
        assert_eq!(model.status, Status::READY);
    }

    #[test]
    fn empty_upload_prompt_selects_no_file() {
        let mut model = model();
        model.update(Some(Message::Upload)).unwrap();
        press(&mut model, KeyCode::Enter);
        assert_eq!(last_error(&model), Some("No file selected."));
    }

    #[test]
    fn selection_stays_in_results() {
        let mut content = String::from("n\n");
        for i in 0..30 {
            content.push_str(&format!("row{i}\n"));
        }
        let (mut model, _file) = loaded(&content);
        model.set_query("row");
        model.search().unwrap();
        assert_eq!(model.nresults(), 30);

        model.update(Some(Message::MoveUp)).unwrap();
        assert_eq!(model.selected(), 0);
        model.update(Some(Message::MoveEnd)).unwrap();
        assert_eq!(model.selected(), 29);
        assert!(model.offset() <= 29);
        model.update(Some(Message::MoveDown)).unwrap();
        assert_eq!(model.selected(), 29);
        model.update(Some(Message::MoveBeginning)).unwrap();
        assert_eq!((model.selected(), model.offset()), (0, 0));

        let page = model.cards_per_page();
        model.update(Some(Message::MovePageDown)).unwrap();
        assert_eq!(model.selected(), page);
        assert!(model.selected() >= model.offset());
        assert!(model.selected() < model.offset() + page);
    }

    #[test]
    fn capacity_accounts_for_chrome_and_card_borders() {
        let layout = UILayout {
            width: 80,
            height: 40,
        };
        assert_eq!(layout.results_capacity(1, false), 10);
        assert_eq!(layout.results_capacity(1, true), 9);
        assert_eq!(layout.results_capacity(13, false), 2);
        let tiny = UILayout {
            width: 80,
            height: 5,
        };
        assert_eq!(tiny.results_capacity(3, true), 1);
    }

    #[test]
    fn help_popup_opens_and_closes() {
        let mut model = model();
        model.update(Some(Message::Help)).unwrap();
        assert!(model.show_help());
        model.update(Some(Message::Delete)).unwrap();
        assert!(model.notifications().toasts().is_empty());
        model.update(Some(Message::Exit)).unwrap();
        assert!(!model.show_help());
    }

    #[test]
    fn exit_dismisses_notifications() {
        let mut model = model();
        model.upload(None);
        assert!(!model.notifications().is_empty());
        model.update(Some(Message::Exit)).unwrap();
        assert!(model.notifications().is_empty());
    }

    #[test]
    fn quit_sets_status() {
        let mut model = model();
        model.update(Some(Message::Quit)).unwrap();
        assert_eq!(model.status, Status::QUITTING);
    }

    #[test]
    fn csv_line_quoting() {
        let fields = vec![
            ("a", "plain"),
            ("b", "with space"),
            ("c", "say \"hi\""),
            ("d", "1,5"),
        ];
        assert_eq!(
            row_as_csv_line(&fields),
            "plain,\"with space\",\"say \"\"hi\"\"\",\"1,5\""
        );
    }
}
