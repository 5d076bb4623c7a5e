//! Immutable element descriptions and the `h` builder.

use std::any::TypeId;
use std::fmt;
use std::rc::Rc;

use crate::hash::hash_key;
use crate::hooks::Hooks;
use crate::props::{PropValue, Props, CHILDREN, KEY};
use crate::Key;

/// Text content of a description: a string or a number.
#[derive(Clone, Debug)]
pub enum Primitive {
    Str(Rc<str>),
    Int(i64),
    Float(f64),
}

impl Primitive {
    /// Same variant and same value. A string never matches a number, even
    /// when both print the same.
    pub fn same_as(&self, other: &Primitive) -> bool {
        match (self, other) {
            (Primitive::Str(a), Primitive::Str(b)) => a == b,
            (Primitive::Int(a), Primitive::Int(b)) => a == b,
            (Primitive::Float(a), Primitive::Float(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl PartialEq for Primitive {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Str(s) => f.write_str(s),
            Primitive::Int(i) => write!(f, "{i}"),
            Primitive::Float(x) => write!(f, "{x}"),
        }
    }
}

type RenderFn = dyn Fn(&mut Hooks<'_>, &Props) -> VNode;

/// Reference to a component function.
///
/// Identity is the function's type: every `fn` item and every closure
/// expression has its own, so reconciliation can tell "same component at this
/// position" from "different component" without comparing pointers.
#[derive(Clone)]
pub struct ComponentRef {
    id: TypeId,
    name: &'static str,
    render: Rc<RenderFn>,
}

impl ComponentRef {
    pub fn new<F>(render: F) -> Self
    where
        F: Fn(&mut Hooks<'_>, &Props) -> VNode + 'static,
    {
        Self {
            id: TypeId::of::<F>(),
            name: std::any::type_name::<F>(),
            render: Rc::new(render),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn invoke(&self, hooks: &mut Hooks<'_>, props: &Props) -> VNode {
        (self.render)(hooks, props)
    }
}

impl PartialEq for ComponentRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ComponentRef {}

impl fmt::Debug for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentRef({})", self.name)
    }
}

/// Shorthand for [`ComponentRef::new`].
pub fn component<F>(render: F) -> ComponentRef
where
    F: Fn(&mut Hooks<'_>, &Props) -> VNode + 'static,
{
    ComponentRef::new(render)
}

#[derive(Clone, Debug, PartialEq)]
pub enum Kind {
    /// Intrinsic document element such as `div`.
    Tag(Rc<str>),
    Component(ComponentRef),
}

impl Kind {
    pub fn tag(&self) -> Option<&str> {
        match self {
            Kind::Tag(tag) => Some(tag),
            Kind::Component(_) => None,
        }
    }
}

impl From<&str> for Kind {
    fn from(tag: &str) -> Self {
        Kind::Tag(Rc::from(tag))
    }
}

impl From<String> for Kind {
    fn from(tag: String) -> Self {
        Kind::Tag(Rc::from(tag))
    }
}

impl From<ComponentRef> for Kind {
    fn from(component: ComponentRef) -> Self {
        Kind::Component(component)
    }
}

/// Description of one element or component invocation.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    kind: Kind,
    props: Props,
    children: Vec<VNode>,
    key: Option<Key>,
}

impl Element {
    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    pub fn children(&self) -> &[VNode] {
        &self.children
    }

    pub fn key(&self) -> Option<Key> {
        self.key
    }
}

/// A node of a description tree.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum VNode {
    /// Renders nothing (an empty text node once mounted).
    #[default]
    Empty,
    Text(Primitive),
    Element(Rc<Element>),
}

impl VNode {
    pub fn text(value: impl Into<Primitive>) -> Self {
        VNode::Text(value.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, VNode::Empty)
    }

    pub fn as_element(&self) -> Option<&Rc<Element>> {
        match self {
            VNode::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn key(&self) -> Option<Key> {
        self.as_element().and_then(|element| element.key)
    }

    /// Whether an existing node built from `self` can be patched into `next`
    /// rather than remounted.
    pub(crate) fn is_compatible(&self, next: &VNode) -> bool {
        match (self, next) {
            (VNode::Empty, VNode::Empty) => true,
            (VNode::Text(a), VNode::Text(b)) => a.same_as(b),
            (VNode::Element(a), VNode::Element(b)) => a.kind == b.kind,
            _ => false,
        }
    }
}

impl From<&str> for Primitive {
    fn from(value: &str) -> Self {
        Primitive::Str(Rc::from(value))
    }
}

impl From<String> for Primitive {
    fn from(value: String) -> Self {
        Primitive::Str(Rc::from(value))
    }
}

impl From<i64> for Primitive {
    fn from(value: i64) -> Self {
        Primitive::Int(value)
    }
}

impl From<f64> for Primitive {
    fn from(value: f64) -> Self {
        Primitive::Float(value)
    }
}

impl From<Element> for VNode {
    fn from(element: Element) -> Self {
        VNode::Element(Rc::new(element))
    }
}

impl From<&str> for VNode {
    fn from(value: &str) -> Self {
        VNode::Text(value.into())
    }
}

impl From<String> for VNode {
    fn from(value: String) -> Self {
        VNode::Text(value.into())
    }
}

impl From<&String> for VNode {
    fn from(value: &String) -> Self {
        VNode::Text(value.as_str().into())
    }
}

macro_rules! int_vnode {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for VNode {
                fn from(value: $ty) -> Self {
                    VNode::Text(Primitive::Int(value as i64))
                }
            }
        )*
    };
}

int_vnode!(i32, i64, u32, usize);

impl From<f64> for VNode {
    fn from(value: f64) -> Self {
        VNode::Text(Primitive::Float(value))
    }
}

impl<T: Into<VNode>> From<Option<T>> for VNode {
    fn from(value: Option<T>) -> Self {
        value.map_or(VNode::Empty, Into::into)
    }
}

/// One entry of a child list before flattening.
#[derive(Clone, Debug)]
pub enum Child {
    Node(VNode),
    List(Vec<Child>),
}

impl<T: Into<VNode>> From<T> for Child {
    fn from(value: T) -> Self {
        Child::Node(value.into())
    }
}

impl Child {
    pub fn list<T: Into<Child>>(items: impl IntoIterator<Item = T>) -> Self {
        Child::List(items.into_iter().map(Into::into).collect())
    }

    fn flatten_into(self, out: &mut Vec<VNode>) {
        match self {
            Child::Node(VNode::Empty) => {}
            Child::Node(node) => out.push(node),
            Child::List(items) => {
                for item in items {
                    item.flatten_into(out);
                }
            }
        }
    }
}

/// Anything that can stand in the children position of [`h`].
pub trait IntoChildren {
    fn into_children(self) -> Vec<Child>;
}

impl IntoChildren for () {
    fn into_children(self) -> Vec<Child> {
        Vec::new()
    }
}

impl IntoChildren for Child {
    fn into_children(self) -> Vec<Child> {
        vec![self]
    }
}

impl<T: Into<Child>> IntoChildren for Vec<T> {
    fn into_children(self) -> Vec<Child> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T: Into<Child>, const N: usize> IntoChildren for [T; N] {
    fn into_children(self) -> Vec<Child> {
        self.into_iter().map(Into::into).collect()
    }
}

macro_rules! single_child {
    ($($ty:ty),*) => {
        $(
            impl IntoChildren for $ty {
                fn into_children(self) -> Vec<Child> {
                    vec![Child::from(self)]
                }
            }
        )*
    };
}

single_child!(VNode, Element, String, i32, i64, u32, usize, f64);

impl<'a> IntoChildren for &'a str {
    fn into_children(self) -> Vec<Child> {
        vec![Child::from(self)]
    }
}

impl<T: Into<VNode>> IntoChildren for Option<T> {
    fn into_children(self) -> Vec<Child> {
        vec![Child::from(self)]
    }
}

macro_rules! tuple_children {
    ($($name:ident),+) => {
        impl<$($name: Into<Child>),+> IntoChildren for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_children(self) -> Vec<Child> {
                let ($($name,)+) = self;
                vec![$($name.into()),+]
            }
        }
    };
}

tuple_children!(A);
tuple_children!(A, B);
tuple_children!(A, B, C);
tuple_children!(A, B, C, D);
tuple_children!(A, B, C, D, E);
tuple_children!(A, B, C, D, E, F);
tuple_children!(A, B, C, D, E, F, G);
tuple_children!(A, B, C, D, E, F, G, H);

fn key_from_prop(value: &PropValue) -> Option<Key> {
    match value {
        PropValue::Str(s) => Some(hash_key(&**s)),
        PropValue::Int(i) => Some(hash_key(i)),
        _ => None,
    }
}

/// Builds an element description.
///
/// Children are flattened at every depth and empty entries are dropped. A
/// `key` property is lifted into [`Element::key`]. For components, non-empty
/// children are also exposed through the `children` property.
pub fn h(kind: impl Into<Kind>, props: impl Into<Props>, children: impl IntoChildren) -> VNode {
    let kind = kind.into();
    let mut props = props.into();
    let mut flat = Vec::new();
    for child in children.into_children() {
        child.flatten_into(&mut flat);
    }
    let key = props.remove(KEY).as_ref().and_then(key_from_prop);
    if matches!(kind, Kind::Component(_)) && !flat.is_empty() {
        props.insert(CHILDREN, PropValue::Children(flat.clone()));
    }
    VNode::Element(Rc::new(Element {
        kind,
        props,
        children: flat,
        key,
    }))
}
