//! Browser binding.
//!
//! [`DomView`] implements [`ChatView`] over the page elements, and [`mount`]
//! wires the form, the clear control and the suggestion controls to a
//! [`ChatController`]. The module-level `start` function runs when the wasm
//! module is instantiated.

use std::rc::Rc;

use tracing::{debug, error, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    Document, Element, Event, HtmlButtonElement, HtmlFormElement, HtmlInputElement,
    HtmlTextAreaElement, Window,
};

use crate::backend::HttpChatBackend;
use crate::config::{ElementConfig, WidgetConfig};
use crate::controller::ChatController;
use crate::error::{Result, WidgetError};
use crate::message::{BUBBLE_CLASS, Bubble, BubbleContent};
use crate::telemetry;
use crate::view::ChatView;

/// Attribute on the form holding JSON configuration overrides.
pub const CONFIG_ATTRIBUTE: &str = "data-ai-chat-config";

type DomController = ChatController<HttpChatBackend, DomView>;

fn js_error(value: &JsValue) -> WidgetError {
    WidgetError::Dom(value.as_string().unwrap_or_else(|| format!("{value:?}")))
}

/// The chat input may be a single-line input or a textarea.
#[derive(Debug)]
enum InputField {
    Line(HtmlInputElement),
    Area(HtmlTextAreaElement),
}

impl InputField {
    fn from_element(element: Element) -> Result<Self> {
        let element = match element.dyn_into::<HtmlInputElement>() {
            Ok(input) => return Ok(Self::Line(input)),
            Err(element) => element,
        };
        element
            .dyn_into::<HtmlTextAreaElement>()
            .map(Self::Area)
            .map_err(|el| {
                WidgetError::Dom(format!(
                    "#{} is a <{}>, expected input or textarea",
                    el.id(),
                    el.tag_name().to_lowercase()
                ))
            })
    }

    fn value(&self) -> String {
        match self {
            Self::Line(el) => el.value(),
            Self::Area(el) => el.value(),
        }
    }

    fn set_value(&self, value: &str) {
        match self {
            Self::Line(el) => el.set_value(value),
            Self::Area(el) => el.set_value(value),
        }
    }

    fn set_disabled(&self, disabled: bool) {
        match self {
            Self::Line(el) => el.set_disabled(disabled),
            Self::Area(el) => el.set_disabled(disabled),
        }
    }

    fn focus(&self) {
        let focused = match self {
            Self::Line(el) => el.focus(),
            Self::Area(el) => el.focus(),
        };
        if let Err(err) = focused {
            debug!(error = ?err, "Input focus failed");
        }
    }
}

/// [`ChatView`] over live page elements.
#[derive(Debug)]
pub struct DomView {
    window: Window,
    document: Document,
    input: InputField,
    log: Element,
    status: Option<Element>,
    submit: Option<HtmlButtonElement>,
    clear_button: Option<HtmlButtonElement>,
}

impl DomView {
    /// Look up the widget elements. Input and log are required; the status
    /// indicator, submit button and clear button are optional.
    pub fn bind(
        window: &Window,
        document: &Document,
        form: &HtmlFormElement,
        ids: &ElementConfig,
    ) -> Result<Self> {
        let required = |id: &str| {
            document
                .get_element_by_id(id)
                .ok_or_else(|| WidgetError::Dom(format!("missing element #{id}")))
        };

        let input = InputField::from_element(required(&ids.input)?)?;
        let log = required(&ids.log)?;
        let status = document.get_element_by_id(&ids.status);
        let submit = form
            .query_selector("button[type=\"submit\"]")
            .map_err(|e| js_error(&e))?
            .and_then(|el| el.dyn_into::<HtmlButtonElement>().ok());
        let clear_button = document
            .get_element_by_id(&ids.clear_button)
            .and_then(|el| el.dyn_into::<HtmlButtonElement>().ok());

        Ok(Self {
            window: window.clone(),
            document: document.clone(),
            input,
            log,
            status,
            submit,
            clear_button,
        })
    }

    pub fn clear_button(&self) -> Option<&HtmlButtonElement> {
        self.clear_button.as_ref()
    }

    fn build_bubble(&self, bubble: &Bubble) -> Result<Element> {
        let wrapper = self.document.create_element("div").map_err(|e| js_error(&e))?;
        wrapper.set_class_name(&bubble.wrapper_class());

        let inner = self.document.create_element("div").map_err(|e| js_error(&e))?;
        inner.set_class_name(BUBBLE_CLASS);
        match &bubble.content {
            BubbleContent::Html(html) => inner.set_inner_html(html),
            BubbleContent::Text(text) => inner.set_text_content(Some(text)),
        }

        wrapper.append_child(&inner).map_err(|e| js_error(&e))?;
        Ok(wrapper)
    }
}

impl ChatView for DomView {
    fn input_value(&self) -> String {
        self.input.value()
    }

    fn set_input_value(&self, value: &str) {
        self.input.set_value(value);
    }

    fn set_input_enabled(&self, enabled: bool) {
        self.input.set_disabled(!enabled);
        if let Some(submit) = &self.submit {
            submit.set_disabled(!enabled);
        }
    }

    fn focus_input(&self) {
        self.input.focus();
    }

    fn set_status(&self, message: &str) {
        if let Some(status) = &self.status {
            status.set_text_content(Some(message));
        }
    }

    fn append_bubble(&self, bubble: &Bubble) {
        let appended = self
            .build_bubble(bubble)
            .and_then(|node| self.log.append_child(&node).map_err(|e| js_error(&e)));
        if let Err(err) = appended {
            warn!(error = %err, "Could not append chat bubble");
            return;
        }
        self.log.set_scroll_top(self.log.scroll_height());
    }

    fn clear_log(&self) {
        self.log.set_inner_html("");
    }

    fn confirm(&self, prompt: &str) -> bool {
        self.window.confirm_with_message(prompt).unwrap_or(false)
    }

    fn alert(&self, message: &str) {
        if let Err(err) = self.window.alert_with_message(message) {
            debug!(error = ?err, "Alert failed");
        }
    }

    fn clear_control_label(&self) -> Option<String> {
        self.clear_button
            .as_ref()
            .map(|btn| btn.text_content().unwrap_or_default())
    }

    fn set_clear_control(&self, enabled: bool, label: &str) {
        if let Some(btn) = &self.clear_button {
            btn.set_disabled(!enabled);
            btn.set_text_content(Some(label));
        }
    }
}

/// Bind the widget to the page described by `config`.
///
/// Returns `Ok(false)` without touching the page when the form is absent.
pub fn mount(config: &WidgetConfig) -> Result<bool> {
    let window = web_sys::window().ok_or_else(|| WidgetError::Dom("no window".into()))?;
    let document = window
        .document()
        .ok_or_else(|| WidgetError::Dom("no document".into()))?;
    mount_in(&window, &document, config)
}

/// [`mount`] against an explicit window and document.
pub fn mount_in(window: &Window, document: &Document, config: &WidgetConfig) -> Result<bool> {
    let Some(form) = document.get_element_by_id(&config.elements.form) else {
        return Ok(false);
    };
    let form = form.dyn_into::<HtmlFormElement>().map_err(|el| {
        WidgetError::Dom(format!(
            "#{} is a <{}>, expected a form",
            el.id(),
            el.tag_name().to_lowercase()
        ))
    })?;

    let view = DomView::bind(window, document, &form, &config.elements)?;
    let origin = window.location().origin().map_err(|e| js_error(&e))?;
    let backend = HttpChatBackend::new(origin, &config.endpoints)?;
    let controller = Rc::new(ChatController::from_config(backend, view, config));

    // Listeners live as long as the page, so their closures are leaked.
    listen_submit(&form, &controller)?;
    listen_clear(&controller)?;
    let suggestions = listen_suggestions(document, &controller, &config.elements)?;

    info!(
        markdown = controller.renders_markdown(),
        clear = controller.view().clear_button().is_some(),
        suggestions,
        "Chat widget mounted"
    );
    Ok(true)
}

/// JSON overrides carried by the default form's [`CONFIG_ATTRIBUTE`], if any.
pub fn page_overrides(document: &Document) -> Option<String> {
    document
        .get_element_by_id(&WidgetConfig::default().elements.form)
        .and_then(|form| form.get_attribute(CONFIG_ATTRIBUTE))
}

fn listen_submit(form: &HtmlFormElement, controller: &Rc<DomController>) -> Result<()> {
    let controller = Rc::clone(controller);
    let on_submit = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        event.prevent_default();
        let controller = Rc::clone(&controller);
        spawn_local(async move {
            let outcome = controller.submit().await;
            debug!(?outcome, "Submit handled");
        });
    });
    form.add_event_listener_with_callback("submit", on_submit.as_ref().unchecked_ref())
        .map_err(|e| js_error(&e))?;
    on_submit.forget();
    Ok(())
}

fn listen_clear(controller: &Rc<DomController>) -> Result<()> {
    let Some(button) = controller.view().clear_button().cloned() else {
        return Ok(());
    };

    let controller = Rc::clone(controller);
    let on_click = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
        let controller = Rc::clone(&controller);
        spawn_local(async move {
            let outcome = controller.clear_history().await;
            debug!(?outcome, "Clear handled");
        });
    });
    button
        .add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())
        .map_err(|e| js_error(&e))?;
    on_click.forget();
    Ok(())
}

fn listen_suggestions(
    document: &Document,
    controller: &Rc<DomController>,
    ids: &ElementConfig,
) -> Result<u32> {
    let nodes = document
        .query_selector_all(&format!(".{}", ids.suggestion_class))
        .map_err(|e| js_error(&e))?;

    let mut bound = 0;
    for index in 0..nodes.length() {
        let Some(element) = nodes.get(index).and_then(|n| n.dyn_into::<Element>().ok()) else {
            continue;
        };

        let controller = Rc::clone(controller);
        let source = element.clone();
        let attribute = ids.suggestion_attribute.clone();
        let on_click = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
            let question = source.get_attribute(&attribute).unwrap_or_default();
            controller.select_suggestion(&question);
        });
        element
            .add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())
            .map_err(|e| js_error(&e))?;
        on_click.forget();
        bound += 1;
    }
    Ok(bound)
}

/// Entry point run when the wasm module is instantiated.
///
/// Reads overrides from the form's [`CONFIG_ATTRIBUTE`] and mounts the widget.
/// Setup failures are logged; the page is left as it was.
#[wasm_bindgen(start)]
pub fn start() {
    if let Err(err) = telemetry::init_tracing("ai_chat_widget=info") {
        debug!(error = %err, "Tracing subscriber already installed");
    }

    let overrides = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| page_overrides(&d));

    let mounted = WidgetConfig::load(overrides.as_deref()).and_then(|config| mount(&config));
    match mounted {
        Ok(true) => {}
        Ok(false) => debug!("No chat form on this page"),
        Err(err) => error!(error = %err, "Chat widget setup failed"),
    }
}
