//! Dialog overlay.

use larder_core::{
    component, h, Callback, Child, EventHandler, Hooks, IntoChildren, PropValue, Props, VNode,
};

#[derive(Clone, Debug, PartialEq)]
pub struct ModalOptions {
    pub open: bool,
    pub title: String,
    /// Prefix of the ids given to the dialog and its title.
    pub id: String,
    /// Called when the user asks to dismiss the dialog: the close button,
    /// the Escape key, or a click on the backdrop.
    pub on_close: Option<Callback>,
    /// Whether a click on the backdrop itself counts as a close request.
    pub close_on_backdrop: bool,
}

impl Default for ModalOptions {
    fn default() -> Self {
        Self {
            open: false,
            title: String::new(),
            id: "modal".to_string(),
            on_close: None,
            close_on_backdrop: true,
        }
    }
}

/// Creates a modal dialog. Renders nothing while closed.
///
/// The dialog does not close itself. It reports close requests through
/// `on_close` and the owner decides by re-rendering with `open: false`.
pub fn Modal(options: ModalOptions, children: impl IntoChildren) -> VNode {
    let props = Props::new()
        .with("open", options.open)
        .with("title", options.title)
        .with("id", options.id)
        .with("onClose", options.on_close)
        .with("closeOnBackdrop", options.close_on_backdrop);
    h(component(modal), props, children)
}

struct ModalHandlers {
    backdrop_click: EventHandler,
    key_down: EventHandler,
    close_click: EventHandler,
}

impl ModalHandlers {
    fn new(on_close: Option<Callback>, close_on_backdrop: bool) -> Self {
        let close = move || match &on_close {
            Some(callback) => callback.call(PropValue::Null),
            None => Ok(()),
        };
        let from_backdrop = close.clone();
        let from_key = close.clone();
        Self {
            backdrop_click: EventHandler::new(move |event| {
                if close_on_backdrop && event.target() == event.current_target() {
                    from_backdrop()
                } else {
                    Ok(())
                }
            }),
            key_down: EventHandler::new(move |event| {
                if event.key() == Some("Escape") {
                    event.stop_propagation();
                    from_key()
                } else {
                    Ok(())
                }
            }),
            close_click: EventHandler::new(move |_| close()),
        }
    }
}

fn modal(hooks: &mut Hooks<'_>, props: &Props) -> VNode {
    let on_close = props.callback("onClose").cloned();
    let close_on_backdrop = props.get_bool("closeOnBackdrop").unwrap_or(true);
    let handlers = hooks.use_memo((on_close.clone(), close_on_backdrop), move || {
        ModalHandlers::new(on_close, close_on_backdrop)
    });
    let open = props.get_bool("open").unwrap_or(false);
    hooks.use_effect(open, move |scope| {
        if open {
            log::debug!("modal opened in container {}", scope.root().container());
        }
        scope.done()
    });
    if !open {
        return VNode::Empty;
    }

    let id = props.get_str("id").unwrap_or("modal");
    let title_id = format!("{id}-title");
    h(
        "div",
        Props::new()
            .class("modal-backdrop")
            .on_handler("click", handlers.backdrop_click.clone())
            .on_handler("keydown", handlers.key_down.clone()),
        h(
            "div",
            Props::new()
                .id(id)
                .class("modal")
                .with("role", "dialog")
                .with("aria-modal", "true")
                .with("aria-labelledby", title_id.as_str())
                .with("tabindex", -1),
            (
                h(
                    "header",
                    Props::new().class("modal-header"),
                    (
                        h(
                            "h2",
                            Props::new().id(title_id.as_str()),
                            props.get_str("title").unwrap_or_default(),
                        ),
                        h(
                            "button",
                            Props::new()
                                .with("type", "button")
                                .class("modal-close")
                                .with("aria-label", "Close")
                                .on_handler("click", handlers.close_click.clone()),
                            "\u{00d7}",
                        ),
                    ),
                ),
                h(
                    "div",
                    Props::new().class("modal-body"),
                    Child::list(props.children().to_vec()),
                ),
            ),
        ),
    )
}
