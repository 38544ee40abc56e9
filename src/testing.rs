//! In-memory host for driving pages without a browser.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::Duration;

use minus3_core::ics::CalendarFile;
use minus3_core::loader::DataSource;
use minus3_core::{Event, EventCatalog, PastItem, SiteError, SiteResult};

use crate::dom::{Dom, Downloads, NavHandles};

/// State of one element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub html: String,
    pub text: String,
    pub attributes: BTreeMap<String, String>,
    pub hidden: bool,
    /// Markup the element was replaced with
    pub outer_html: Option<String>,
}

/// A document holding a fixed set of elements, plus a fake clock for
/// download release timers.
#[derive(Default)]
pub struct MemoryDom {
    elements: RefCell<BTreeMap<String, Element>>,
    params: HashMap<String, String>,

    refuse_downloads: bool,
    next_handle: Cell<u32>,
    resources: RefCell<BTreeMap<String, CalendarFile>>,
    downloads: RefCell<Vec<CalendarFile>>,
    pending_releases: RefCell<Vec<(Duration, String)>>,
    now: Cell<Duration>,

    header_classes: RefCell<BTreeSet<String>>,
    toggle_expanded: RefCell<Option<String>>,
}

impl MemoryDom {
    pub fn new() -> Self {
        Self::default()
    }

    /// A document containing elements with the given ids
    pub fn with_elements(ids: &[&str]) -> Self {
        let dom = Self::default();
        dom.elements
            .borrow_mut()
            .extend(ids.iter().map(|id| (id.to_string(), Element::default())));
        dom
    }

    /// Add a query parameter to the page URL
    pub fn with_param(mut self, key: &str, value: &str) -> Self {
        self.params.insert(key.to_string(), value.to_string());
        self
    }

    /// Make every resource creation fail
    pub fn refusing_downloads(mut self) -> Self {
        self.refuse_downloads = true;
        self
    }

    pub fn element(&self, id: &str) -> Option<Element> {
        self.elements.borrow().get(id).cloned()
    }

    pub fn html(&self, id: &str) -> String {
        self.element(id).map(|e| e.html).unwrap_or_default()
    }

    pub fn text(&self, id: &str) -> String {
        self.element(id).map(|e| e.text).unwrap_or_default()
    }

    pub fn attribute(&self, id: &str, name: &str) -> Option<String> {
        self.element(id).and_then(|e| e.attributes.get(name).cloned())
    }

    pub fn outer_html(&self, id: &str) -> Option<String> {
        self.element(id).and_then(|e| e.outer_html)
    }

    pub fn is_hidden(&self, id: &str) -> bool {
        self.element(id).is_some_and(|e| e.hidden)
    }

    /// True when no element received any content
    pub fn is_untouched(&self) -> bool {
        self.elements.borrow().values().all(|e| *e == Element::default())
    }

    /// Files whose download was triggered, in order
    pub fn downloads(&self) -> Vec<CalendarFile> {
        self.downloads.borrow().clone()
    }

    /// Handles of resources that have not been released yet
    pub fn live_resources(&self) -> Vec<String> {
        self.resources.borrow().keys().cloned().collect()
    }

    /// Move the clock forward, running every release that falls due
    pub fn advance(&self, elapsed: Duration) {
        let now = self.now.get() + elapsed;
        self.now.set(now);

        let mut pending = self.pending_releases.borrow_mut();
        let mut resources = self.resources.borrow_mut();
        pending.retain(|(due, handle)| {
            if *due <= now {
                resources.remove(handle);
                false
            } else {
                true
            }
        });
    }

    pub fn header_has_class(&self, class: &str) -> bool {
        self.header_classes.borrow().contains(class)
    }

    pub fn toggle_expanded(&self) -> Option<String> {
        self.toggle_expanded.borrow().clone()
    }

    fn with_element(&self, id: &str, f: impl FnOnce(&mut Element)) {
        if let Some(element) = self.elements.borrow_mut().get_mut(id) {
            f(element);
        }
    }
}

impl Dom for MemoryDom {
    fn has_element(&self, id: &str) -> bool {
        self.elements.borrow().contains_key(id)
    }

    fn set_html(&self, id: &str, html: &str) {
        self.with_element(id, |e| e.html = html.to_string());
    }

    fn append_html(&self, id: &str, html: &str) {
        self.with_element(id, |e| e.html.push_str(html));
    }

    fn set_text(&self, id: &str, text: &str) {
        self.with_element(id, |e| e.text = text.to_string());
    }

    fn set_attribute(&self, id: &str, name: &str, value: &str) {
        self.with_element(id, |e| {
            e.attributes.insert(name.to_string(), value.to_string());
        });
    }

    fn hide(&self, id: &str) {
        self.with_element(id, |e| e.hidden = true);
    }

    fn replace_element(&self, id: &str, html: &str) {
        self.with_element(id, |e| {
            *e = Element {
                outer_html: Some(html.to_string()),
                ..Element::default()
            };
        });
    }

    fn query_param(&self, key: &str) -> Option<String> {
        self.params.get(key).cloned()
    }
}

impl Downloads for MemoryDom {
    fn create_resource(&self, file: &CalendarFile) -> SiteResult<String> {
        if self.refuse_downloads {
            return Err(SiteError::Download("resource creation refused".into()));
        }

        let n = self.next_handle.get() + 1;
        self.next_handle.set(n);

        let handle = format!("blob:memory/{n}");
        self.resources
            .borrow_mut()
            .insert(handle.clone(), file.clone());
        Ok(handle)
    }

    fn trigger_download(&self, handle: &str, filename: &str) {
        if let Some(file) = self.resources.borrow().get(handle) {
            let mut file = file.clone();
            file.filename = filename.to_string();
            self.downloads.borrow_mut().push(file);
        }
    }

    fn release_after(&self, handle: String, delay: Duration) {
        let due = self.now.get() + delay;
        self.pending_releases.borrow_mut().push((due, handle));
    }
}

impl NavHandles for MemoryDom {
    fn set_header_class(&self, class: &str, on: bool) {
        let mut classes = self.header_classes.borrow_mut();
        if on {
            classes.insert(class.to_string());
        } else {
            classes.remove(class);
        }
    }

    fn set_toggle_expanded(&self, expanded: bool) {
        *self.toggle_expanded.borrow_mut() = Some(expanded.to_string());
    }
}

/// Data source serving fixed records, or failing like an unreachable server
#[derive(Default)]
pub struct StaticSource {
    events: Vec<Event>,
    past: Vec<PastItem>,
    status: Option<u16>,
}

impl StaticSource {
    pub fn new(events: Vec<Event>, past: Vec<PastItem>) -> Self {
        StaticSource {
            events,
            past,
            status: None,
        }
    }

    /// Every load fails with the given HTTP status
    pub fn failing(status: u16) -> Self {
        StaticSource {
            status: Some(status),
            ..Self::default()
        }
    }

    fn check(&self, path: &str) -> SiteResult<()> {
        match self.status {
            Some(status) => Err(SiteError::Load {
                path: path.to_string(),
                status,
            }),
            None => Ok(()),
        }
    }
}

impl DataSource for StaticSource {
    async fn load_events(&self) -> SiteResult<EventCatalog> {
        let path = "data/events.json";
        self.check(path)?;
        EventCatalog::new(path, self.events.clone())
    }

    async fn load_past(&self) -> SiteResult<Vec<PastItem>> {
        self.check("data/past.json")?;
        Ok(self.past.clone())
    }
}
