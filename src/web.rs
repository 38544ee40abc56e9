//! Browser binding: implements the host traits on top of `web-sys` and wires
//! every view to its DOM events.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use url::Url;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Blob, BlobPropertyBag, Document, Element, EventTarget, HtmlAnchorElement, HtmlElement,
    HtmlInputElement, HtmlSelectElement, KeyboardEvent, Window,
};

use minus3_core::ics::CalendarFile;
use minus3_core::loader::DataLoader;
use minus3_core::{SiteConfig, SiteError, SiteResult};

use crate::dom::{Dom, Downloads, NavHandles, ids, timer_millis};
use crate::nav::{NavController, NavInput};
use crate::views::{DetailOutcome, EventDetailView, GalleryView, ProgramView};

const SITE_CONFIG: &str = include_str!("../site.toml");

struct WebDom {
    window: Window,
    document: Document,
}

impl WebDom {
    fn element(&self, id: &str) -> Option<Element> {
        let element = self.document.get_element_by_id(id);
        if element.is_none() {
            tracing::debug!("No element #{}", id);
        }
        element
    }

    fn viewport_width(&self) -> u32 {
        self.window
            .inner_width()
            .ok()
            .and_then(|w| w.as_f64())
            .map(|w| w as u32)
            .unwrap_or(0)
    }
}

impl Dom for WebDom {
    fn has_element(&self, id: &str) -> bool {
        self.document.get_element_by_id(id).is_some()
    }

    fn set_html(&self, id: &str, html: &str) {
        if let Some(el) = self.element(id) {
            el.set_inner_html(html);
        }
    }

    fn append_html(&self, id: &str, html: &str) {
        if let Some(el) = self.element(id) {
            if let Err(e) = el.insert_adjacent_html("beforeend", html) {
                tracing::warn!("Appending to #{} failed: {:?}", id, e);
            }
        }
    }

    fn set_text(&self, id: &str, text: &str) {
        if let Some(el) = self.element(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_attribute(&self, id: &str, name: &str, value: &str) {
        if let Some(el) = self.element(id) {
            if let Err(e) = el.set_attribute(name, value) {
                tracing::warn!("Setting {} on #{} failed: {:?}", name, id, e);
            }
        }
    }

    fn hide(&self, id: &str) {
        if let Some(el) = self.element(id).and_then(|el| el.dyn_into::<HtmlElement>().ok()) {
            if let Err(e) = el.style().set_property("display", "none") {
                tracing::warn!("Hiding #{} failed: {:?}", id, e);
            }
        }
    }

    fn replace_element(&self, id: &str, html: &str) {
        if let Some(el) = self.element(id) {
            el.set_outer_html(html);
        }
    }

    fn query_param(&self, key: &str) -> Option<String> {
        let href = self.window.location().href().ok()?;
        let url = Url::parse(&href).ok()?;
        url.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }
}

impl Downloads for WebDom {
    fn create_resource(&self, file: &CalendarFile) -> SiteResult<String> {
        let parts = js_sys::Array::of1(&JsValue::from_str(&file.body));
        let options = BlobPropertyBag::new();
        options.set_type(file.mime);

        let blob = Blob::new_with_str_sequence_and_options(&parts, &options).map_err(js_error)?;
        web_sys::Url::create_object_url_with_blob(&blob).map_err(js_error)
    }

    fn trigger_download(&self, handle: &str, filename: &str) {
        let anchor = self
            .document
            .create_element("a")
            .ok()
            .and_then(|el| el.dyn_into::<HtmlAnchorElement>().ok());

        if let Some(a) = anchor {
            a.set_href(handle);
            a.set_download(filename);
            a.click();
        }
    }

    fn release_after(&self, handle: String, delay: Duration) {
        let release = Closure::once_into_js(move || {
            if let Err(e) = web_sys::Url::revoke_object_url(&handle) {
                tracing::warn!("Releasing {} failed: {:?}", handle, e);
            }
        });
        let timeout = timer_millis(delay);
        if let Err(e) = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(release.unchecked_ref(), timeout)
        {
            tracing::warn!("Scheduling resource release failed: {:?}", e);
        }
    }
}

struct WebNav {
    header: Element,
    toggle: Element,
}

impl NavHandles for WebNav {
    fn set_header_class(&self, class: &str, on: bool) {
        if let Err(e) = self.header.class_list().toggle_with_force(class, on) {
            tracing::warn!("Toggling header class {} failed: {:?}", class, e);
        }
    }

    fn set_toggle_expanded(&self, expanded: bool) {
        let value = if expanded { "true" } else { "false" };
        if let Err(e) = self.toggle.set_attribute("aria-expanded", value) {
            tracing::warn!("Setting aria-expanded failed: {:?}", e);
        }
    }
}

fn js_error(value: JsValue) -> SiteError {
    SiteError::Download(value.as_string().unwrap_or_else(|| format!("{value:?}")))
}

/// Register a listener for the lifetime of the page
fn listen(target: &EventTarget, kind: &str, handler: impl FnMut(web_sys::Event) + 'static) {
    let closure = Closure::<dyn FnMut(web_sys::Event)>::new(handler);
    if let Err(e) = target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref()) {
        tracing::warn!("Listening for {} failed: {:?}", kind, e);
    }
    closure.forget();
}

#[wasm_bindgen(start)]
pub fn start() {
    // Make sure panics are logged using `console.error`.
    console_error_panic_hook::set_once();

    // Redirect tracing to console.log and friends:
    tracing_wasm::set_as_global_default();

    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };

    let config = match SiteConfig::from_toml(SITE_CONFIG) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            SiteConfig::default()
        }
    };

    let dom = Rc::new(WebDom { window, document });
    attach_nav(&dom, &config);

    wasm_bindgen_futures::spawn_local(async move {
        if let Err(e) = init_pages(dom, config).await {
            tracing::error!("{}", e);
        }
    });
}

fn attach_nav(dom: &Rc<WebDom>, config: &SiteConfig) {
    let doc = &dom.document;
    let (Ok(Some(header)), Ok(Some(toggle)), Ok(Some(menu))) = (
        doc.query_selector(".site-header"),
        doc.query_selector(".nav-toggle"),
        doc.query_selector(".site-header nav"),
    ) else {
        return;
    };

    let nav = Rc::new(RefCell::new(NavController::attach(
        WebNav {
            header,
            toggle: toggle.clone(),
        },
        &config.nav,
    )));

    let n = nav.clone();
    listen(&toggle, "click", move |_| {
        n.borrow_mut().handle(NavInput::ToggleClick);
    });

    let (n, d) = (nav.clone(), dom.clone());
    listen(&dom.window, "resize", move |_| {
        n.borrow_mut().handle(NavInput::Resize {
            width: d.viewport_width(),
        });
    });

    let (n, d) = (nav.clone(), dom.clone());
    listen(&menu, "click", move |event| {
        let on_link = event
            .target()
            .and_then(|t| t.dyn_into::<Element>().ok())
            .and_then(|el| el.closest("a").ok().flatten())
            .is_some();
        if on_link {
            n.borrow_mut().handle(NavInput::MenuLinkClick {
                width: d.viewport_width(),
            });
        }
    });

    listen(&dom.document, "keydown", move |event| {
        if let Some(key) = event.dyn_ref::<KeyboardEvent>().map(|k| k.key()) {
            nav.borrow_mut().handle(NavInput::Key(key));
        }
    });
}

async fn init_pages(dom: Rc<WebDom>, config: SiteConfig) -> SiteResult<()> {
    let href = dom
        .window
        .location()
        .href()
        .map_err(|e| SiteError::Config(format!("{e:?}")))?;
    let base = Url::parse(&href).map_err(|e| SiteError::Config(e.to_string()))?;
    let loader = DataLoader::new(base, config.data.clone());

    if let Some(view) = ProgramView::init(&*dom, &loader, &config).await? {
        wire_program(&dom, view);
    }

    if let DetailOutcome::Shown(view) = EventDetailView::init(&*dom, &loader, &config).await? {
        wire_calendar_link(&dom, view);
    }

    GalleryView::init(&*dom, &loader, &config).await?;

    Ok(())
}

fn wire_program(dom: &Rc<WebDom>, view: ProgramView) {
    let view = Rc::new(RefCell::new(view));

    if let Some(search) = dom.element(ids::SEARCH) {
        let (v, d) = (view.clone(), dom.clone());
        listen(&search, "input", move |event| {
            if let Some(input) = event
                .target()
                .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
            {
                v.borrow_mut().on_search_input(&*d, &input.value());
            }
        });
    }

    if let Some(select) = dom.element(ids::MONTH_FILTER) {
        let d = dom.clone();
        listen(&select, "change", move |event| {
            if let Some(select) = event
                .target()
                .and_then(|t| t.dyn_into::<HtmlSelectElement>().ok())
            {
                view.borrow_mut().on_month_change(&*d, &select.value());
            }
        });
    }
}

fn wire_calendar_link(dom: &Rc<WebDom>, view: EventDetailView) {
    let Some(link) = dom.element(ids::CAL_LINK) else {
        return;
    };

    let d = dom.clone();
    listen(&link, "click", move |event| {
        event.prevent_default();
        if let Err(e) = view.on_calendar_click(&*d) {
            tracing::error!("Calendar export failed: {}", e);
        }
    });
}
