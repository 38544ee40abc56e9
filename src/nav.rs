//! Mobile navigation menu.

use minus3_core::config::NavConfig;

use crate::dom::NavHandles;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    Open,
    Closed,
}

/// UI events the menu reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum NavInput {
    /// The hamburger button was clicked
    ToggleClick,
    /// The viewport was resized to `width` px
    Resize { width: u32 },
    /// A link inside the menu was clicked while the viewport was `width` px wide
    MenuLinkClick { width: u32 },
    /// A key was pressed anywhere on the page
    Key(String),
}

/// Open/closed state of the header menu, reflected on the header class and
/// the toggle's `aria-expanded`.
pub struct NavController<H> {
    handles: H,
    state: NavState,
    breakpoint: u32,
    open_class: String,
}

impl<H: NavHandles> NavController<H> {
    /// Take over the menu. It starts closed; the document is left untouched
    /// until the first input.
    pub fn attach(handles: H, config: &NavConfig) -> Self {
        NavController {
            handles,
            state: NavState::Closed,
            breakpoint: config.breakpoint,
            open_class: config.open_class.clone(),
        }
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    pub fn handle(&mut self, input: NavInput) -> NavState {
        match input {
            NavInput::ToggleClick => match self.state {
                NavState::Open => self.close(),
                NavState::Closed => self.open(),
            },
            NavInput::Resize { width } if width > self.breakpoint => self.close(),
            NavInput::MenuLinkClick { width } if width <= self.breakpoint => self.close(),
            NavInput::Key(key) if is_escape(&key) => self.close(),
            _ => {}
        }
        self.state
    }

    fn open(&mut self) {
        self.set(NavState::Open);
    }

    fn close(&mut self) {
        self.set(NavState::Closed);
    }

    fn set(&mut self, state: NavState) {
        if state != self.state {
            tracing::debug!("Navigation {:?} -> {:?}", self.state, state);
        }
        self.state = state;

        let open = state == NavState::Open;
        self.handles.set_header_class(&self.open_class, open);
        self.handles.set_toggle_expanded(open);
    }
}

fn is_escape(key: &str) -> bool {
    key == "Escape" || key == "Esc"
}
