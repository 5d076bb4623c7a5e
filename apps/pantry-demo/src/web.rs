use wasm_bindgen::prelude::*;

/// Browser entry point: mounts the pantry screen into `#app`.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    let runtime = larder_platform_web::start("app", crate::app::pantry_root())
        .map_err(|err| JsValue::from_str(&err.to_string()))?;
    // Listeners call back into the runtime for the lifetime of the page.
    std::mem::forget(runtime);
    Ok(())
}
