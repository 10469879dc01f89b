//! The page surface the controller drives.
//!
//! [`ChatView`] abstracts the handful of DOM operations the widget needs.
//! The browser implementation lives in `dom`; [`HeadlessView`] records the
//! same operations in memory so the controller can run without a page.

use std::cell::RefCell;
use std::rc::Rc;

use crate::message::Bubble;

/// DOM operations used by the controller.
///
/// All methods take `&self`: page elements are shared handles, and the
/// controller itself is shared between event listeners.
pub trait ChatView {
    /// Current value of the input field.
    fn input_value(&self) -> String;

    /// Replace the value of the input field.
    fn set_input_value(&self, value: &str);

    /// Enable or disable the input field and the submit control together.
    fn set_input_enabled(&self, enabled: bool);

    /// Move keyboard focus to the input field.
    fn focus_input(&self);

    /// Show `message` in the status indicator. An empty string clears it.
    fn set_status(&self, message: &str);

    /// Append a bubble to the log and scroll the log to its bottom.
    fn append_bubble(&self, bubble: &Bubble);

    /// Remove every bubble from the log.
    fn clear_log(&self);

    /// Ask the user a yes/no question.
    fn confirm(&self, prompt: &str) -> bool;

    /// Tell the user something modally.
    fn alert(&self, message: &str);

    /// Label of the clear control, or `None` when the page has none.
    fn clear_control_label(&self) -> Option<String>;

    /// Update the clear control. No-op when the page has none.
    fn set_clear_control(&self, enabled: bool, label: &str);
}

/// Snapshot of the clear control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlState {
    pub enabled: bool,
    pub label: String,
}

#[derive(Debug)]
struct HeadlessState {
    input: String,
    input_enabled: bool,
    input_focused: bool,
    status: String,
    log: Vec<Bubble>,
    scrolled_to_bottom: bool,
    confirm_answer: bool,
    prompts: Vec<String>,
    alerts: Vec<String>,
    clear_control: Option<ControlState>,
}

/// In-memory [`ChatView`].
///
/// Cloning yields another handle to the same state, so a caller can keep a
/// handle while the controller owns the other.
#[derive(Debug, Clone)]
pub struct HeadlessView {
    state: Rc<RefCell<HeadlessState>>,
}

impl Default for HeadlessView {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessView {
    /// A page without a clear control whose confirmations are accepted.
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(HeadlessState {
                input: String::new(),
                input_enabled: true,
                input_focused: false,
                status: String::new(),
                log: Vec::new(),
                scrolled_to_bottom: true,
                confirm_answer: true,
                prompts: Vec::new(),
                alerts: Vec::new(),
                clear_control: None,
            })),
        }
    }

    /// Add a clear control with the given label.
    #[must_use]
    pub fn with_clear_control(self, label: &str) -> Self {
        self.state.borrow_mut().clear_control = Some(ControlState {
            enabled: true,
            label: label.to_string(),
        });
        self
    }

    /// Answer every following confirmation with `answer`.
    pub fn answer_confirm(&self, answer: bool) {
        self.state.borrow_mut().confirm_answer = answer;
    }

    /// Type into the input field.
    pub fn type_input(&self, value: &str) {
        self.set_input_value(value);
    }

    pub fn input(&self) -> String {
        self.state.borrow().input.clone()
    }

    pub fn input_enabled(&self) -> bool {
        self.state.borrow().input_enabled
    }

    pub fn input_focused(&self) -> bool {
        self.state.borrow().input_focused
    }

    pub fn status(&self) -> String {
        self.state.borrow().status.clone()
    }

    /// Bubbles currently in the log, oldest first.
    pub fn bubbles(&self) -> Vec<Bubble> {
        self.state.borrow().log.clone()
    }

    pub fn scrolled_to_bottom(&self) -> bool {
        self.state.borrow().scrolled_to_bottom
    }

    /// Confirmation prompts shown so far.
    pub fn prompts(&self) -> Vec<String> {
        self.state.borrow().prompts.clone()
    }

    /// Alerts shown so far.
    pub fn alerts(&self) -> Vec<String> {
        self.state.borrow().alerts.clone()
    }

    pub fn clear_control(&self) -> Option<ControlState> {
        self.state.borrow().clear_control.clone()
    }

    /// Simulate the user scrolling up in the log.
    pub fn scroll_up(&self) {
        self.state.borrow_mut().scrolled_to_bottom = false;
    }
}

impl ChatView for HeadlessView {
    fn input_value(&self) -> String {
        self.input()
    }

    fn set_input_value(&self, value: &str) {
        self.state.borrow_mut().input = value.to_string();
    }

    fn set_input_enabled(&self, enabled: bool) {
        let mut state = self.state.borrow_mut();
        state.input_enabled = enabled;
        // Disabled elements drop focus.
        if !enabled {
            state.input_focused = false;
        }
    }

    fn focus_input(&self) {
        let mut state = self.state.borrow_mut();
        state.input_focused = state.input_enabled;
    }

    fn set_status(&self, message: &str) {
        self.state.borrow_mut().status = message.to_string();
    }

    fn append_bubble(&self, bubble: &Bubble) {
        let mut state = self.state.borrow_mut();
        state.log.push(bubble.clone());
        state.scrolled_to_bottom = true;
    }

    fn clear_log(&self) {
        self.state.borrow_mut().log.clear();
    }

    fn confirm(&self, prompt: &str) -> bool {
        let mut state = self.state.borrow_mut();
        state.prompts.push(prompt.to_string());
        state.confirm_answer
    }

    fn alert(&self, message: &str) {
        self.state.borrow_mut().alerts.push(message.to_string());
    }

    fn clear_control_label(&self) -> Option<String> {
        self.state
            .borrow()
            .clear_control
            .as_ref()
            .map(|c| c.label.clone())
    }

    fn set_clear_control(&self, enabled: bool, label: &str) {
        if let Some(control) = self.state.borrow_mut().clear_control.as_mut() {
            control.enabled = enabled;
            control.label = label.to_string();
        }
    }
}
