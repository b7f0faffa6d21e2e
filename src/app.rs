// app.rs

use crate::api::TodoApi;
use crate::error::{ApiError, DraftError};
use crate::todo::{DraftField, NewTodoDraft, TodoItem, normalize_day};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

pub const FETCH_FAILED: &str = "Failed to fetch todos. Please try again later.";
pub const ADD_FAILED: &str = "Failed to add todo. Please try again later.";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Tab {
    All,
    ByDay,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    EditingDraft(DraftField),
    EditingDay,
    ViewingItem,
}

/// A finished request on its way back to the UI thread.
enum Inbound {
    All(Result<Vec<TodoItem>, ApiError>),
    ByDay {
        day: String,
        result: Result<Vec<TodoItem>, ApiError>,
    },
    Created(Result<TodoItem, ApiError>),
}

/// State of the todo list view. Owned by the UI thread; requests run on
/// worker threads and are folded back in by `drain_inbound`.
pub struct App {
    api: Arc<dyn TodoApi>,
    inbound_tx: Sender<Inbound>,
    inbound_rx: Receiver<Inbound>,
    in_flight: usize,

    pub todos: Vec<TodoItem>,
    pub day_todos: Vec<TodoItem>,
    /// Day the last successful filtered fetch was for.
    pub day_todos_for: Option<String>,
    pub filter_day: Option<String>,
    pub tab: Tab,

    pub draft: NewTodoDraft,
    /// Form contents at the time of the in-flight create, if any.
    pending_draft: Option<NewTodoDraft>,
    pub input_mode: InputMode,
    pub input_day: String,

    pub selected: Option<String>,
    pub error_message: Option<String>,
    /// Blocking message; must be dismissed before anything else.
    pub alert: Option<String>,
}

impl App {
    pub fn new(api: Arc<dyn TodoApi>) -> Self {
        let (inbound_tx, inbound_rx) = mpsc::channel();
        Self {
            api,
            inbound_tx,
            inbound_rx,
            in_flight: 0,
            todos: Vec::new(),
            day_todos: Vec::new(),
            day_todos_for: None,
            filter_day: None,
            tab: Tab::All,
            draft: NewTodoDraft::default(),
            pending_draft: None,
            input_mode: InputMode::Normal,
            input_day: String::new(),
            selected: None,
            error_message: None,
            alert: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    fn dispatch<F>(&mut self, job: F)
    where
        F: FnOnce(&dyn TodoApi) -> Inbound + Send + 'static,
    {
        self.in_flight += 1;
        let api = Arc::clone(&self.api);
        let tx = self.inbound_tx.clone();
        thread::spawn(move || {
            if tx.send(job(api.as_ref())).is_err() {
                log::debug!("request finished after the view was dropped");
            }
        });
    }

    pub fn load_all(&mut self) {
        self.dispatch(|api| Inbound::All(api.fetch_all()));
    }

    pub fn load_by_day(&mut self, day: &str) {
        let day = day.to_string();
        self.dispatch(move |api| {
            let result = api.fetch_by_day(&day);
            Inbound::ByDay { day, result }
        });
    }

    /// Sends the draft if it has a name and a day. Nothing goes out otherwise.
    pub fn submit_new(&mut self) -> Result<(), DraftError> {
        if self.pending_draft.is_some() {
            return Err(DraftError::AlreadySending);
        }
        if self.draft.name.trim().is_empty() {
            return Err(DraftError::MissingName);
        }
        let day = normalize_day(&self.draft.day);
        if day.is_empty() {
            return Err(DraftError::MissingDay);
        }
        let draft = NewTodoDraft {
            day,
            ..self.draft.clone()
        };
        self.pending_draft = Some(self.draft.clone());
        self.dispatch(move |api| Inbound::Created(api.create(&draft)));
        Ok(())
    }

    /// Re-fetches whatever the active tab shows.
    pub fn reload(&mut self) {
        match (self.tab, self.filter_day.clone()) {
            (Tab::All, _) => self.load_all(),
            (Tab::ByDay, Some(day)) => self.load_by_day(&day),
            (Tab::ByDay, None) => {}
        }
    }

    pub fn switch_tab(&mut self, tab: Tab) {
        if self.tab == tab {
            return;
        }
        self.tab = tab;
        self.reload();
    }

    pub fn toggle_tab(&mut self) {
        let next = match self.tab {
            Tab::All => Tab::ByDay,
            Tab::ByDay => Tab::All,
        };
        self.switch_tab(next);
    }

    /// Picks the filter day and shows it. Blank input is ignored.
    pub fn set_filter_day(&mut self, input: &str) {
        let day = normalize_day(input);
        if day.is_empty() {
            return;
        }
        self.filter_day = Some(day.clone());
        self.tab = Tab::ByDay;
        self.load_by_day(&day);
    }

    pub fn visible(&self) -> &[TodoItem] {
        match self.tab {
            Tab::All => &self.todos,
            Tab::ByDay => &self.day_todos,
        }
    }

    pub fn selected_index(&self) -> Option<usize> {
        let id = self.selected.as_deref()?;
        self.visible().iter().position(|t| t.id == id)
    }

    pub fn selected_item(&self) -> Option<&TodoItem> {
        self.selected_index().map(|i| &self.visible()[i])
    }

    pub fn select(&mut self, id: &str) {
        if self.visible().iter().any(|t| t.id == id) {
            self.selected = Some(id.to_string());
        }
    }

    pub fn select_next(&mut self) {
        let next = match self.selected_index() {
            Some(i) if i + 1 < self.visible().len() => i + 1,
            Some(i) => i,
            None => 0,
        };
        if let Some(id) = self.visible().get(next).map(|t| t.id.clone()) {
            self.select(&id);
        }
    }

    pub fn select_prev(&mut self) {
        let prev = match self.selected_index() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        if let Some(id) = self.visible().get(prev).map(|t| t.id.clone()) {
            self.select(&id);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn open_detail(&mut self) {
        if self.selected_item().is_some() {
            self.input_mode = InputMode::ViewingItem;
        }
    }

    pub fn close_detail(&mut self) {
        self.input_mode = InputMode::Normal;
        self.clear_selection();
    }

    pub fn drain_inbound(&mut self) {
        while let Ok(msg) = self.inbound_rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            self.apply(msg);
        }
        self.close_stale_detail();
    }

    /// Leaves the detail view once a refetch drops the item it showed.
    fn close_stale_detail(&mut self) {
        if self.input_mode == InputMode::ViewingItem && self.selected_item().is_none() {
            self.close_detail();
        }
    }

    /// Blocks until every request sent so far has been applied.
    #[cfg(test)]
    pub fn settle(&mut self) {
        while self.in_flight > 0 {
            match self.inbound_rx.recv() {
                Ok(msg) => {
                    self.in_flight -= 1;
                    self.apply(msg);
                }
                Err(_) => break,
            }
        }
        self.close_stale_detail();
    }

    fn apply(&mut self, msg: Inbound) {
        match msg {
            Inbound::All(Ok(items)) => {
                log::info!("fetched {} todos", items.len());
                self.todos = items;
                self.error_message = None;
            }
            Inbound::ByDay {
                day,
                result: Ok(items),
            } => {
                log::info!("fetched {} todos for {}", items.len(), day);
                self.day_todos = items;
                self.day_todos_for = Some(day);
                self.error_message = None;
            }
            Inbound::All(Err(e)) => {
                log::error!("GET /todos failed: {}", e);
                self.error_message = Some(FETCH_FAILED.to_string());
            }
            Inbound::ByDay { day, result: Err(e) } => {
                log::error!("GET /todos/{} failed: {}", day, e);
                self.error_message = Some(FETCH_FAILED.to_string());
            }
            Inbound::Created(Ok(item)) => {
                log::info!("created todo {} ({})", item.id, item.name);
                if self.day_todos_for.as_deref() == Some(item.day.as_str()) {
                    self.day_todos.push(item.clone());
                }
                self.todos.push(item);
                // keep anything typed while the request was out
                if self.pending_draft.take().as_ref() == Some(&self.draft) {
                    self.draft.clear();
                }
                self.error_message = None;
            }
            Inbound::Created(Err(e)) => {
                log::error!("POST /todos failed: {}", e);
                self.pending_draft = None;
                self.error_message = Some(ADD_FAILED.to_string());
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use reqwest::StatusCode;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    pub(crate) fn item(id: &str, name: &str, day: &str) -> TodoItem {
        TodoItem {
            id: id.to_string(),
            name: name.to_string(),
            description: format!("{} details", name),
            day: day.to_string(),
            complete: false,
        }
    }

    /// In-memory stand-in for the todo service.
    #[derive(Default)]
    pub(crate) struct FakeApi {
        pub todos: Mutex<Vec<TodoItem>>,
        pub fail: AtomicBool,
        pub calls: AtomicUsize,
        pub days_asked: Mutex<Vec<String>>,
    }

    impl FakeApi {
        pub(crate) fn with(todos: Vec<TodoItem>) -> Arc<Self> {
            Arc::new(Self {
                todos: Mutex::new(todos),
                ..Self::default()
            })
        }

        fn failure(&self) -> Option<ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.fail
                .load(Ordering::SeqCst)
                .then_some(ApiError::Status(StatusCode::INTERNAL_SERVER_ERROR))
        }
    }

    impl TodoApi for FakeApi {
        fn fetch_all(&self) -> Result<Vec<TodoItem>, ApiError> {
            match self.failure() {
                Some(e) => Err(e),
                None => Ok(self.todos.lock().unwrap().clone()),
            }
        }

        fn fetch_by_day(&self, day: &str) -> Result<Vec<TodoItem>, ApiError> {
            self.days_asked.lock().unwrap().push(day.to_string());
            match self.failure() {
                Some(e) => Err(e),
                None => Ok(self
                    .todos
                    .lock()
                    .unwrap()
                    .iter()
                    .filter(|t| t.day == day)
                    .cloned()
                    .collect()),
            }
        }

        fn create(&self, draft: &NewTodoDraft) -> Result<TodoItem, ApiError> {
            if let Some(e) = self.failure() {
                return Err(e);
            }
            let mut todos = self.todos.lock().unwrap();
            let created = TodoItem {
                id: format!("new-{}", todos.len() + 1),
                name: draft.name.clone(),
                description: draft.description.clone(),
                day: draft.day.clone(),
                complete: draft.complete,
            };
            todos.push(created.clone());
            Ok(created)
        }
    }

    pub(crate) fn loaded_app(api: &Arc<FakeApi>) -> App {
        let mut app = App::new(api.clone());
        app.load_all();
        app.settle();
        app
    }

    #[test]
    fn load_all_replaces_the_collection() {
        let api = FakeApi::with(vec![item("1", "a", "Monday"), item("2", "b", "Tuesday")]);
        let mut app = App::new(api.clone());
        app.load_all();
        assert!(app.is_loading());
        app.settle();
        assert!(!app.is_loading());
        assert_eq!(app.visible().len(), 2);

        api.todos.lock().unwrap().truncate(1);
        app.load_all();
        app.settle();
        assert_eq!(app.todos, vec![item("1", "a", "Monday")]);
    }

    #[test]
    fn failed_fetch_keeps_previous_collection() {
        let api = FakeApi::with(vec![item("1", "a", "Monday")]);
        let mut app = loaded_app(&api);

        api.fail.store(true, Ordering::SeqCst);
        app.load_all();
        app.settle();
        assert_eq!(app.todos.len(), 1);
        assert_eq!(app.error_message.as_deref(), Some(FETCH_FAILED));

        api.fail.store(false, Ordering::SeqCst);
        app.load_all();
        app.settle();
        assert_eq!(app.error_message, None);
    }

    #[test]
    fn failed_day_fetch_keeps_previous_day_collection() {
        let api = FakeApi::with(vec![item("1", "a", "Monday")]);
        let mut app = App::new(api.clone());
        app.set_filter_day("mon");
        app.settle();
        assert_eq!(app.day_todos.len(), 1);

        api.fail.store(true, Ordering::SeqCst);
        app.set_filter_day("tuesday");
        app.settle();
        assert_eq!(app.day_todos, vec![item("1", "a", "Monday")]);
        assert_eq!(app.day_todos_for.as_deref(), Some("Monday"));
        assert_eq!(app.error_message.as_deref(), Some(FETCH_FAILED));
    }

    #[test]
    fn incomplete_draft_is_never_sent() {
        let api = FakeApi::with(Vec::new());
        let mut app = App::new(api.clone());

        app.draft.day = "Monday".into();
        assert_eq!(app.submit_new(), Err(DraftError::MissingName));

        app.draft.name = "Laundry".into();
        app.draft.day = "   ".into();
        assert_eq!(app.submit_new(), Err(DraftError::MissingDay));

        assert!(!app.is_loading());
        assert_eq!(api.calls.load(Ordering::SeqCst), 0);
        assert_eq!(app.draft.name, "Laundry");
    }

    #[test]
    fn successful_submit_appends_and_clears_the_draft() {
        let api = FakeApi::with(vec![item("1", "a", "Friday")]);
        let mut app = App::new(api.clone());
        app.set_filter_day("Friday");
        app.settle();
        app.load_all();
        app.settle();

        app.draft = NewTodoDraft {
            name: "Gym".into(),
            description: "legs".into(),
            day: "fri".into(),
            complete: false,
        };
        app.submit_new().unwrap();
        app.settle();

        assert!(app.draft.is_empty());
        let last = app.todos.last().unwrap();
        assert_eq!(last.name, "Gym");
        assert_eq!(last.day, "Friday");
        assert_eq!(app.todos.len(), 2);
        assert_eq!(app.day_todos.len(), 2);
    }

    #[test]
    fn created_item_for_another_day_stays_out_of_the_filter() {
        let api = FakeApi::with(Vec::new());
        let mut app = App::new(api.clone());
        app.set_filter_day("Monday");
        app.settle();

        app.draft.name = "Gym".into();
        app.draft.day = "Tuesday".into();
        app.submit_new().unwrap();
        app.settle();
        assert!(app.day_todos.is_empty());
        assert_eq!(app.todos.len(), 1);
    }

    #[test]
    fn typing_during_a_create_survives_the_response() {
        let api = FakeApi::with(Vec::new());
        let mut app = App::new(api.clone());
        app.draft.name = "First".into();
        app.draft.day = "Monday".into();
        app.submit_new().unwrap();

        app.draft.clear();
        app.draft.name = "Second".into();
        assert_eq!(app.submit_new(), Err(DraftError::AlreadySending));
        app.settle();

        assert_eq!(app.draft.name, "Second");
        assert_eq!(app.todos.len(), 1);
        assert_eq!(app.todos[0].name, "First");
        assert_eq!(api.calls.load(Ordering::SeqCst), 1);

        // the next submit goes through once the first one landed
        app.draft.day = "Tuesday".into();
        app.submit_new().unwrap();
        app.settle();
        assert!(app.draft.is_empty());
        assert_eq!(app.todos.len(), 2);
    }

    #[test]
    fn failed_submit_keeps_the_draft() {
        let api = FakeApi::with(Vec::new());
        let mut app = App::new(api.clone());
        api.fail.store(true, Ordering::SeqCst);

        app.draft.name = "Gym".into();
        app.draft.day = "Monday".into();
        app.submit_new().unwrap();
        app.settle();

        assert_eq!(app.draft.name, "Gym");
        assert!(app.todos.is_empty());
        assert_eq!(app.error_message.as_deref(), Some(ADD_FAILED));

        // a failed create does not block the retry
        api.fail.store(false, Ordering::SeqCst);
        app.submit_new().unwrap();
        app.settle();
        assert_eq!(app.todos.len(), 1);
    }

    #[test]
    fn tab_switches_refetch() {
        let api = FakeApi::with(vec![item("1", "a", "Monday"), item("2", "b", "Sunday")]);
        let mut app = App::new(api.clone());

        // no day chosen yet: nothing to fetch
        app.switch_tab(Tab::ByDay);
        assert!(!app.is_loading());
        assert!(app.visible().is_empty());

        app.set_filter_day("sun");
        app.settle();
        assert_eq!(*api.days_asked.lock().unwrap(), vec!["Sunday".to_string()]);
        assert_eq!(app.visible(), &[item("2", "b", "Sunday")]);

        app.switch_tab(Tab::All);
        app.settle();
        assert_eq!(app.visible().len(), 2);

        app.toggle_tab();
        app.settle();
        assert_eq!(app.tab, Tab::ByDay);
        assert_eq!(api.days_asked.lock().unwrap().len(), 2);
        assert_eq!(api.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn selection_moves_and_clears() {
        let api = FakeApi::with(vec![
            item("1", "a", "Monday"),
            item("2", "b", "Monday"),
            item("3", "c", "Monday"),
        ]);
        let mut app = loaded_app(&api);

        app.select_next();
        assert_eq!(app.selected.as_deref(), Some("1"));
        app.select("3");
        assert_eq!(app.selected_index(), Some(2));
        app.select_next();
        assert_eq!(app.selected.as_deref(), Some("3"));
        app.select_prev();
        assert_eq!(app.selected.as_deref(), Some("2"));

        app.select("missing");
        assert_eq!(app.selected.as_deref(), Some("2"));

        app.clear_selection();
        assert_eq!(app.selected_item(), None);
    }

    #[test]
    fn closing_the_detail_clears_selection() {
        let api = FakeApi::with(vec![item("1", "a", "Monday")]);
        let mut app = loaded_app(&api);

        app.open_detail();
        assert_eq!(app.input_mode, InputMode::Normal);

        app.select("1");
        app.open_detail();
        assert_eq!(app.input_mode, InputMode::ViewingItem);
        app.close_detail();
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.selected, None);
    }

    #[test]
    fn refetch_dropping_the_open_item_closes_the_detail() {
        let api = FakeApi::with(vec![item("1", "a", "Monday"), item("2", "b", "Monday")]);
        let mut app = loaded_app(&api);
        app.select("1");
        app.open_detail();

        api.todos.lock().unwrap().retain(|t| t.id != "1");
        app.load_all();
        app.settle();
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.selected, None);

        // an item that survives the refetch keeps its detail open
        app.select("2");
        app.open_detail();
        app.load_all();
        app.settle();
        assert_eq!(app.input_mode, InputMode::ViewingItem);
    }
}
