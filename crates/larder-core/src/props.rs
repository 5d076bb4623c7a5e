//! Property values carried by element descriptions.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::element::VNode;
use crate::error::EventResult;
use crate::hooks::NodeRef;
use crate::host::EventHandler;

/// Reserved property that carries the flattened children of a component.
pub const CHILDREN: &str = "children";
/// Reserved property lifted into [`Element::key`](crate::Element::key).
pub const KEY: &str = "key";
/// Reserved property that binds a [`NodeRef`] to the mounted node.
pub const REF: &str = "ref";

/// Callback a widget uses to hand a value back to its owner.
#[derive(Clone)]
pub struct Callback(Rc<dyn Fn(PropValue) -> EventResult>);

impl Callback {
    pub fn new(callback: impl Fn(PropValue) -> EventResult + 'static) -> Self {
        Self(Rc::new(callback))
    }

    pub fn call(&self, value: impl Into<PropValue>) -> EventResult {
        (self.0)(value.into())
    }

    pub fn ptr_eq(&self, other: &Callback) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

/// Inline style declarations, applied field by field.
///
/// Field names may be given in camelCase (`backgroundColor`); they are
/// converted to CSS property names when applied.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Style {
    fields: IndexMap<String, String>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Converts `backgroundColor` to `background-color`. Names that already
/// contain a dash (including custom properties) pass through unchanged.
pub fn css_property_name(field: &str) -> String {
    if field.contains('-') {
        return field.to_string();
    }
    let mut out = String::with_capacity(field.len() + 4);
    for ch in field.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

#[derive(Clone)]
pub enum PropValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    Style(Style),
    Handler(EventHandler),
    Callback(Callback),
    Ref(NodeRef),
    Children(Vec<VNode>),
    List(Vec<PropValue>),
    /// Opaque payload handed in by the application, compared by identity.
    Data(Rc<dyn Any>),
}

impl PropValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[PropValue]> {
        match self {
            PropValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// JavaScript-style truthiness used for boolean attributes.
    pub fn is_truthy(&self) -> bool {
        match self {
            PropValue::Null => false,
            PropValue::Bool(b) => *b,
            PropValue::Int(i) => *i != 0,
            PropValue::Float(f) => *f != 0.0 && !f.is_nan(),
            PropValue::Str(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// Text written into a generic attribute. `None` means "remove it".
    pub fn attribute_text(&self) -> Option<String> {
        match self {
            PropValue::Null | PropValue::Bool(false) => None,
            PropValue::Bool(true) => Some(String::new()),
            PropValue::Int(i) => Some(i.to_string()),
            PropValue::Float(f) => Some(f.to_string()),
            PropValue::Str(s) => Some(s.to_string()),
            PropValue::List(items) => Some(
                items
                    .iter()
                    .filter_map(PropValue::attribute_text)
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
            _ => None,
        }
    }
}

impl PartialEq for PropValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PropValue::Null, PropValue::Null) => true,
            (PropValue::Bool(a), PropValue::Bool(b)) => a == b,
            (PropValue::Int(a), PropValue::Int(b)) => a == b,
            (PropValue::Float(a), PropValue::Float(b)) => a == b,
            (PropValue::Str(a), PropValue::Str(b)) => a == b,
            (PropValue::Style(a), PropValue::Style(b)) => a == b,
            (PropValue::Handler(a), PropValue::Handler(b)) => a.ptr_eq(b),
            (PropValue::Callback(a), PropValue::Callback(b)) => a.ptr_eq(b),
            (PropValue::Ref(a), PropValue::Ref(b)) => a.ptr_eq(b),
            (PropValue::Children(a), PropValue::Children(b)) => a == b,
            (PropValue::List(a), PropValue::List(b)) => a == b,
            (PropValue::Data(a), PropValue::Data(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Null => f.write_str("Null"),
            PropValue::Bool(b) => write!(f, "Bool({b})"),
            PropValue::Int(i) => write!(f, "Int({i})"),
            PropValue::Float(x) => write!(f, "Float({x})"),
            PropValue::Str(s) => write!(f, "Str({s:?})"),
            PropValue::Style(style) => write!(f, "Style({style:?})"),
            PropValue::Handler(h) => write!(f, "{h:?}"),
            PropValue::Callback(c) => write!(f, "{c:?}"),
            PropValue::Ref(r) => write!(f, "{r:?}"),
            PropValue::Children(children) => write!(f, "Children({})", children.len()),
            PropValue::List(items) => f.debug_list().entries(items).finish(),
            PropValue::Data(data) => write!(f, "Data({:p})", Rc::as_ptr(data) as *const ()),
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Str(Rc::from(value))
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Str(Rc::from(value))
    }
}

impl From<&String> for PropValue {
    fn from(value: &String) -> Self {
        PropValue::Str(Rc::from(value.as_str()))
    }
}

impl From<Rc<str>> for PropValue {
    fn from(value: Rc<str>) -> Self {
        PropValue::Str(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

macro_rules! int_prop_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for PropValue {
                fn from(value: $ty) -> Self {
                    PropValue::Int(value as i64)
                }
            }
        )*
    };
}

int_prop_value!(i32, i64, u32, u8, usize);

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Float(value)
    }
}

impl From<Style> for PropValue {
    fn from(value: Style) -> Self {
        PropValue::Style(value)
    }
}

impl From<EventHandler> for PropValue {
    fn from(value: EventHandler) -> Self {
        PropValue::Handler(value)
    }
}

impl From<Callback> for PropValue {
    fn from(value: Callback) -> Self {
        PropValue::Callback(value)
    }
}

impl From<NodeRef> for PropValue {
    fn from(value: NodeRef) -> Self {
        PropValue::Ref(value)
    }
}

impl From<Vec<PropValue>> for PropValue {
    fn from(value: Vec<PropValue>) -> Self {
        PropValue::List(value)
    }
}

impl From<Vec<String>> for PropValue {
    fn from(value: Vec<String>) -> Self {
        PropValue::List(value.into_iter().map(PropValue::from).collect())
    }
}

impl<T: Into<PropValue>> From<Option<T>> for PropValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(PropValue::Null, Into::into)
    }
}

/// Ordered property map of an element description.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Props {
    entries: IndexMap<String, PropValue>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.entries.insert(name.into(), value.into());
        self
    }

    /// Installs a listener for `event` (`"click"` becomes `onClick`).
    pub fn on(
        self,
        event: &str,
        handler: impl Fn(&crate::Event) -> EventResult + 'static,
    ) -> Self {
        self.on_handler(event, EventHandler::new(handler))
    }

    /// Like [`Props::on`] with an existing, possibly memoized, handler.
    pub fn on_handler(self, event: &str, handler: EventHandler) -> Self {
        let mut chars = event.chars();
        let name = match chars.next() {
            Some(first) => format!("on{}{}", first.to_ascii_uppercase(), chars.as_str()),
            None => "on".to_string(),
        };
        self.with(name, handler)
    }

    pub fn class(self, class_name: impl Into<String>) -> Self {
        self.with("className", class_name.into())
    }

    pub fn id(self, id: impl Into<String>) -> Self {
        self.with("id", id.into())
    }

    pub fn style(self, style: Style) -> Self {
        self.with("style", style)
    }

    pub fn node_ref(self, node_ref: NodeRef) -> Self {
        self.with(REF, node_ref)
    }

    pub fn key(self, key: impl Into<PropValue>) -> Self {
        self.with(KEY, key)
    }

    /// Attaches a typed payload readable with [`Props::data`].
    pub fn data<T: 'static>(self, name: impl Into<String>, value: Rc<T>) -> Self {
        self.with(name, PropValue::Data(value))
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<PropValue>) {
        self.entries.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<PropValue> {
        self.entries.shift_remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(PropValue::as_str)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(PropValue::as_bool)
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(PropValue::as_int)
    }

    pub fn get_list(&self, name: &str) -> Option<&[PropValue]> {
        self.get(name).and_then(PropValue::as_list)
    }

    /// String entries of a list property, skipping anything else.
    pub fn get_strings(&self, name: &str) -> Vec<String> {
        self.get_list(name)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn handler(&self, name: &str) -> Option<&EventHandler> {
        match self.get(name) {
            Some(PropValue::Handler(handler)) => Some(handler),
            _ => None,
        }
    }

    pub fn callback(&self, name: &str) -> Option<&Callback> {
        match self.get(name) {
            Some(PropValue::Callback(callback)) => Some(callback),
            _ => None,
        }
    }

    pub fn data_as<T: 'static>(&self, name: &str) -> Option<Rc<T>> {
        match self.get(name) {
            Some(PropValue::Data(data)) => Rc::clone(data).downcast::<T>().ok(),
            _ => None,
        }
    }

    /// Children injected by [`h`](crate::h) for component elements.
    pub fn children(&self) -> &[VNode] {
        match self.get(CHILDREN) {
            Some(PropValue::Children(children)) => children,
            _ => &[],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<()> for Props {
    fn from(_: ()) -> Self {
        Props::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn on_prefixes_and_capitalizes_event_name() {
        let props = Props::new().on("click", |_| Ok(()));
        assert!(props.handler("onClick").is_some());
    }

    #[test]
    fn camel_case_style_fields_become_css_names() {
        assert_eq!(css_property_name("backgroundColor"), "background-color");
        assert_eq!(css_property_name("--accent"), "--accent");
        assert_eq!(css_property_name("color"), "color");
    }

    #[test]
    fn handlers_compare_by_identity() {
        let handler = EventHandler::new(|_| Ok(()));
        let same = PropValue::Handler(handler.clone());
        let other = PropValue::Handler(EventHandler::new(|_| Ok(())));
        assert_eq!(PropValue::Handler(handler), same);
        assert_ne!(same, other);
    }

    #[test]
    fn boolean_attributes_serialize_as_valueless() {
        assert_eq!(PropValue::Bool(true).attribute_text(), Some(String::new()));
        assert_eq!(PropValue::Bool(false).attribute_text(), None);
        assert_eq!(PropValue::Null.attribute_text(), None);
    }

    #[test]
    fn typed_data_round_trips_through_props() {
        let props = Props::new().data("items", Rc::new(vec![1, 2, 3]));
        let items = props.data_as::<Vec<i32>>("items").expect("payload");
        assert_eq!(items.len(), 3);
        assert!(props.data_as::<String>("items").is_none());

        let shared = Props::new().with("items", props.get("items").cloned().expect("items"));
        assert_eq!(shared, props);
        assert_ne!(Props::new().data("items", Rc::new(vec![1, 2, 3])), props);
    }
}
