use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    HtmlCanvasElement, HtmlVideoElement, MediaStream, MediaStreamConstraints,
    MediaStreamTrack, MediaTrackConstraints,
};

/// Request access to the device's front-facing camera.
///
/// Resolves to a live stream that the caller owns and must release with
/// [`stop_stream`] on every exit path.
pub async fn request_user_camera() -> Result<MediaStream, String> {
    let window = web_sys::window().ok_or_else(|| "No window available".to_string())?;
    let devices = window
        .navigator()
        .media_devices()
        .map_err(|e| format!("Camera is not available: {:?}", e))?;

    let video = MediaTrackConstraints::new();
    video.set_facing_mode(&JsValue::from_str("user"));
    let constraints = MediaStreamConstraints::new();
    constraints.set_video(&JsValue::from(video));

    let promise = devices
        .get_user_media_with_constraints(&constraints)
        .map_err(|e| format!("Camera request was rejected: {:?}", e))?;
    let stream = JsFuture::from(promise)
        .await
        .map_err(|e| format!("Camera access denied: {:?}", e))?;
    stream
        .dyn_into::<MediaStream>()
        .map_err(|_| "Camera did not return a media stream".to_string())
}

/// Stop every track of the stream, turning the camera indicator off.
pub fn stop_stream(stream: &MediaStream) {
    for track in stream.get_tracks().iter() {
        if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
            track.stop();
        }
    }
}

/// Rasterize the current video frame into a PNG data URL.
pub fn capture_frame(video: &HtmlVideoElement) -> Result<String, String> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| "No document available".to_string())?;
    let canvas = document
        .create_element("canvas")
        .map_err(|e| format!("Failed to create canvas: {:?}", e))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| "Canvas element has the wrong type".to_string())?;

    canvas.set_width(video.video_width());
    canvas.set_height(video.video_height());

    let context = canvas
        .get_context("2d")
        .map_err(|e| format!("Failed to get 2d context: {:?}", e))?
        .ok_or_else(|| "Canvas has no 2d context".to_string())?
        .dyn_into::<web_sys::CanvasRenderingContext2d>()
        .map_err(|_| "2d context has the wrong type".to_string())?;

    context
        .draw_image_with_html_video_element(video, 0.0, 0.0)
        .map_err(|e| format!("Failed to draw video frame: {:?}", e))?;
    canvas
        .to_data_url_with_type("image/png")
        .map_err(|e| format!("Failed to encode frame as PNG: {:?}", e))
}
