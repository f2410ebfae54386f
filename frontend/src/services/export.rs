use js_sys::{Object, Promise, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Element, HtmlAnchorElement, HtmlCanvasElement};

// DOM-to-canvas rasterizer, loaded globally from index.html.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = html2canvas)]
    fn html2canvas(element: &Element, options: &JsValue) -> Promise;
}

/// Upscale factor applied when rasterizing the pass card.
const EXPORT_SCALE: f64 = 3.0;

/// Download filename for a pass, derived from its ID.
pub fn pass_filename(pass_id: &str) -> String {
    format!("RGShireworld_Pass_{}.png", pass_id)
}

/// Rasterize a rendered card element into a PNG data URL.
///
/// Requests a transparent background so the card's own rounded corners
/// survive the export.
pub async fn rasterize_card(element: &Element) -> Result<String, String> {
    let options = Object::new();
    Reflect::set(&options, &"scale".into(), &JsValue::from_f64(EXPORT_SCALE))
        .map_err(|e| format!("Failed to build rasterizer options: {:?}", e))?;
    Reflect::set(&options, &"backgroundColor".into(), &JsValue::NULL)
        .map_err(|e| format!("Failed to build rasterizer options: {:?}", e))?;
    Reflect::set(&options, &"logging".into(), &JsValue::FALSE)
        .map_err(|e| format!("Failed to build rasterizer options: {:?}", e))?;

    let canvas = JsFuture::from(html2canvas(element, &options))
        .await
        .map_err(|e| format!("Rasterization failed: {:?}", e))?;
    let canvas = canvas
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| "Rasterizer did not return a canvas".to_string())?;
    canvas
        .to_data_url_with_type("image/png")
        .map_err(|e| format!("Failed to encode the card as PNG: {:?}", e))
}

/// Trigger a client-side save of the image bytes under the given name.
pub fn trigger_download(data_url: &str, filename: &str) -> Result<(), String> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| "No document available".to_string())?;
    let anchor = document
        .create_element("a")
        .map_err(|e| format!("Failed to create download link: {:?}", e))?
        .dyn_into::<HtmlAnchorElement>()
        .map_err(|_| "Download link has the wrong type".to_string())?;
    anchor.set_href(data_url);
    anchor.set_download(filename);
    anchor.click();
    Ok(())
}

/// Full export flow: look up the mounted card, rasterize it, and save it
/// as `RGShireworld_Pass_<id>.png`.
///
/// Every failure is returned as a message for the user; the caller's pass
/// record is untouched and the export can simply be retried.
pub async fn export_pass_card(element_id: &str, pass_id: &str) -> Result<(), String> {
    let element = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(element_id))
        .ok_or_else(|| "The pass card is not currently displayed".to_string())?;
    let data_url = rasterize_card(&element).await?;
    trigger_download(&data_url, &pass_filename(pass_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_filename() {
        assert_eq!(
            pass_filename("RGS123456"),
            "RGShireworld_Pass_RGS123456.png"
        );
    }
}
