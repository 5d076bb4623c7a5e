use anyhow::{anyhow, Context, Result};
use larder_core::{Event, HostDocument, MemoryDocument, NodeId, Runtime};
use pantry_demo::app::pantry_root;

/// Scripted user driving the pantry screen in an in-memory document.
struct Session {
    runtime: Runtime<MemoryDocument>,
    container: NodeId,
}

impl Session {
    fn start() -> Result<Self> {
        let (document, container) = MemoryDocument::with_container("app");
        let runtime = Runtime::new(document);
        runtime
            .render(pantry_root(), container)
            .context("initial render")?;
        Ok(Self { runtime, container })
    }

    fn node(&self, id: &str) -> Result<NodeId> {
        self.runtime
            .document()
            .find_by_attribute(self.container, "id", id)
            .ok_or_else(|| anyhow!("no element with id {id:?}"))
    }

    fn type_into(&self, id: &str, text: &str) -> Result<()> {
        let node = self.node(id)?;
        self.runtime.document_mut().edit_value(node, text, None)?;
        self.runtime
            .dispatch_event(&Event::new("input", node).with_value(text))
            .with_context(|| format!("typing into #{id}"))
    }

    fn choose(&self, id: &str, value: &str) -> Result<()> {
        let node = self.node(id)?;
        self.runtime.document_mut().edit_value(node, value, None)?;
        self.runtime
            .dispatch_event(&Event::new("change", node).with_value(value))
            .with_context(|| format!("choosing {value:?} in #{id}"))
    }

    fn tick(&self, id: &str) -> Result<()> {
        let node = self.node(id)?;
        let checked = self.runtime.document_mut().toggle_checked(node)?;
        self.runtime
            .dispatch_event(&Event::new("change", node).with_checked(checked))
            .with_context(|| format!("ticking #{id}"))
    }

    fn submit(&self, id: &str) -> Result<()> {
        let form = self.node(id)?;
        let event = Event::new("submit", form);
        self.runtime.dispatch_event(&event).context("submitting")?;
        if !event.default_prevented() {
            log::warn!("form #{id} would have navigated away");
        }
        Ok(())
    }

    fn dump(&self) -> String {
        self.runtime.document().dump_tree(self.container)
    }
}

fn main() -> Result<()> {
    #[cfg(feature = "logging")]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    println!("=== Larder Pantry Demo ===");
    println!("A scripted session adds two items through the form.");
    println!();

    let session = Session::start()?;

    session.submit("add-item")?;
    println!("Submitting an empty form:");
    println!("{}", session.dump());

    session.type_into("field-name", "Flour")?;
    session.type_into("field-quantity", "2.5")?;
    session.choose("field-unit", "kg")?;
    session.tick("field-location-shelf")?;
    session.submit("add-item")?;

    session.type_into("field-name", "Eggs")?;
    session.type_into("field-quantity", "12")?;
    session.tick("field-location-fridge")?;
    session.submit("add-item")?;

    println!("After adding two items:");
    println!("{}", session.dump());
    println!(
        "render passes: {}",
        session.runtime.render_passes(session.container)
    );
    Ok(())
}
