use shared::{CameraFlow, DraftPass, PassRecord};
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlVideoElement, MediaStream};
use yew::prelude::*;

use crate::services::camera;
use crate::services::logging::Logger;

#[derive(Properties, PartialEq)]
pub struct PassFormProps {
    /// Mount-time seed for the date field (YYYY-MM-DD)
    pub initial_date: String,
    /// Mount-time seed for the time field (24-hour HH:MM)
    pub initial_time: String,
    /// Receives the finalized record on each successful submission
    pub on_generate: Callback<PassRecord>,
}

/// Visitor details form with the camera/photo acquisition sub-flow.
///
/// The `CameraFlow` machine lives in a mutable ref so that async
/// completions (permission grants, file decodes) always see the current
/// phase; `camera_version` only exists to trigger re-renders after a
/// transition. The media stream handle is held next to it and released
/// whenever a transition out of `Live` says so, including component
/// teardown.
#[function_component(PassForm)]
pub fn pass_form(props: &PassFormProps) -> Html {
    let name = use_state(String::new);
    let date = use_state(|| props.initial_date.clone());
    let time = use_state(|| props.initial_time.clone());
    let phone = use_state(String::new);

    let camera_ref = use_mut_ref(CameraFlow::new);
    let camera_version = use_state(|| 0u32);
    let stream_ref = use_mut_ref(|| Option::<MediaStream>::None);
    let video_ref = use_node_ref();

    let form_error = use_state(|| Option::<String>::None);
    let form_success = use_state(|| false);

    // Release the camera if the form unmounts mid-capture
    use_effect_with((), {
        let stream_ref = stream_ref.clone();
        move |_| {
            move || {
                if let Some(stream) = stream_ref.borrow_mut().take() {
                    camera::stop_stream(&stream);
                }
            }
        }
    });

    let on_name_change = {
        let name = name.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            name.set(input.value());
        })
    };

    let on_date_change = {
        let date = date.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            date.set(input.value());
        })
    };

    let on_time_change = {
        let time = time.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            time.set(input.value());
        })
    };

    let on_phone_change = {
        let phone = phone.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            phone.set(input.value());
        })
    };

    let on_start_camera = {
        let camera_ref = camera_ref.clone();
        let camera_version = camera_version.clone();
        let stream_ref = stream_ref.clone();
        let video_ref = video_ref.clone();
        let form_error = form_error.clone();

        Callback::from(move |_: MouseEvent| {
            if camera_ref.borrow_mut().start_request().is_err() {
                return;
            }
            form_error.set(None);
            camera_version.set(*camera_version + 1);

            let camera_ref = camera_ref.clone();
            let camera_version = camera_version.clone();
            let stream_ref = stream_ref.clone();
            let video_ref = video_ref.clone();
            let form_error = form_error.clone();

            spawn_local(async move {
                match camera::request_user_camera().await {
                    Ok(stream) => {
                        let attached = camera_ref.borrow_mut().stream_granted().is_ok();
                        if attached {
                            if let Some(video) = video_ref.cast::<HtmlVideoElement>() {
                                video.set_src_object(Some(&stream));
                            }
                            *stream_ref.borrow_mut() = Some(stream);
                        } else {
                            // The user cancelled before the permission
                            // prompt resolved; the stream must not stay open.
                            camera::stop_stream(&stream);
                        }
                        camera_version.set(*camera_version + 1);
                    }
                    Err(e) => {
                        Logger::error_with_component("pass-form", &e);
                        // Surface the failure only when the request was
                        // still pending; a cancelled request already settled.
                        if camera_ref.borrow_mut().stream_denied().is_ok() {
                            form_error.set(Some(
                                "Unable to access camera. Please check permissions.".to_string(),
                            ));
                        }
                        camera_version.set(*camera_version + 1);
                    }
                }
            });
        })
    };

    let on_capture = {
        let camera_ref = camera_ref.clone();
        let camera_version = camera_version.clone();
        let stream_ref = stream_ref.clone();
        let video_ref = video_ref.clone();
        let form_error = form_error.clone();

        Callback::from(move |_: MouseEvent| {
            let Some(video) = video_ref.cast::<HtmlVideoElement>() else {
                return;
            };
            match camera::capture_frame(&video) {
                Ok(data_url) => {
                    let captured = camera_ref.borrow_mut().capture_frame(data_url).is_ok();
                    if captured {
                        if let Some(stream) = stream_ref.borrow_mut().take() {
                            camera::stop_stream(&stream);
                        }
                        form_error.set(None);
                        camera_version.set(*camera_version + 1);
                    }
                }
                Err(e) => {
                    Logger::error_with_component("pass-form", &e);
                    form_error.set(Some(
                        "Could not capture a frame from the camera.".to_string(),
                    ));
                }
            }
        })
    };

    let on_cancel_camera = {
        let camera_ref = camera_ref.clone();
        let camera_version = camera_version.clone();
        let stream_ref = stream_ref.clone();

        Callback::from(move |_: MouseEvent| {
            let stream_held = camera_ref.borrow_mut().cancel();
            if stream_held {
                if let Some(stream) = stream_ref.borrow_mut().take() {
                    camera::stop_stream(&stream);
                }
            }
            camera_version.set(*camera_version + 1);
        })
    };

    let on_upload = {
        let camera_ref = camera_ref.clone();
        let camera_version = camera_version.clone();
        let form_error = form_error.clone();

        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let file = input.files().and_then(|files| files.get(0));
            // Reset so re-selecting the same file fires another change event
            input.set_value("");
            let Some(file) = file else {
                return;
            };
            let file = gloo::file::File::from(file);

            let camera_ref = camera_ref.clone();
            let camera_version = camera_version.clone();
            let form_error = form_error.clone();

            spawn_local(async move {
                match gloo::file::futures::read_as_data_url(&file).await {
                    Ok(data_url) => {
                        if camera_ref.borrow_mut().set_photo(data_url).is_ok() {
                            form_error.set(None);
                            camera_version.set(*camera_version + 1);
                        }
                    }
                    Err(e) => {
                        Logger::error_with_component("pass-form", &e.to_string());
                        form_error.set(Some("Could not read the selected image.".to_string()));
                    }
                }
            });
        })
    };

    let on_clear_photo = {
        let camera_ref = camera_ref.clone();
        let camera_version = camera_version.clone();

        Callback::from(move |_: MouseEvent| {
            camera_ref.borrow_mut().clear_photo();
            camera_version.set(*camera_version + 1);
        })
    };

    let on_submit = {
        let name = name.clone();
        let date = date.clone();
        let time = time.clone();
        let phone = phone.clone();
        let camera_ref = camera_ref.clone();
        let form_error = form_error.clone();
        let form_success = form_success.clone();
        let on_generate = props.on_generate.clone();

        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();

            let draft = DraftPass {
                name: (*name).clone(),
                date: (*date).clone(),
                time: (*time).clone(),
                phone: (*phone).clone(),
                camera: camera_ref.borrow().clone(),
            };

            match draft.submit(js_sys::Math::random()) {
                Ok(record) => {
                    Logger::info_with_component(
                        "pass-form",
                        &format!("Generated pass {}", record.id),
                    );
                    form_error.set(None);
                    form_success.set(true);
                    on_generate.emit(record);

                    // Clear success message after 3 seconds
                    let form_success_clear = form_success.clone();
                    spawn_local(async move {
                        gloo::timers::future::TimeoutFuture::new(3000).await;
                        form_success_clear.set(false);
                    });
                }
                Err(e) => {
                    form_error.set(Some(e.to_string()));
                }
            }
        })
    };

    let flow = camera_ref.borrow().clone();

    html! {
        <div class="pass-form">
            <div class="pass-form-intro">
                <h2>{"Visitor Pass Generator"}</h2>
                <p>{"Fill in the details to generate a pass"}</p>
            </div>

            {if let Some(error) = (*form_error).as_ref() {
                html! {
                    <div class="form-message error">
                        {error}
                    </div>
                }
            } else { html! {} }}

            {if *form_success {
                html! {
                    <div class="form-message success">
                        {"Pass generated! The preview is ready to download."}
                    </div>
                }
            } else { html! {} }}

            <form class="pass-form-fields" onsubmit={on_submit}>
                <div class="form-group">
                    <label for="visitor-name">{"Visitor Name"}</label>
                    <input
                        type="text"
                        id="visitor-name"
                        placeholder="Enter visitor name"
                        value={(*name).clone()}
                        onchange={on_name_change}
                        required=true
                    />
                </div>

                <div class="form-row">
                    <div class="form-group">
                        <label for="visit-date">{"Date"}</label>
                        <input
                            type="date"
                            id="visit-date"
                            value={(*date).clone()}
                            onchange={on_date_change}
                            required=true
                        />
                    </div>

                    <div class="form-group">
                        <label for="visit-time">{"Time"}</label>
                        <input
                            type="time"
                            id="visit-time"
                            value={(*time).clone()}
                            onchange={on_time_change}
                            required=true
                        />
                    </div>
                </div>

                <div class="form-group">
                    <label for="visitor-phone">{"Phone Number"}</label>
                    <input
                        type="tel"
                        id="visitor-phone"
                        placeholder="Enter phone number"
                        value={(*phone).clone()}
                        onchange={on_phone_change}
                        required=true
                    />
                </div>

                <div class="form-group">
                    <label>{"Photo"}</label>

                    {if !flow.is_busy() {
                        html! {
                            <div class="photo-actions">
                                <button
                                    type="button"
                                    class="btn btn-secondary"
                                    onclick={on_start_camera}
                                >
                                    {"Take Photo"}
                                </button>
                                <label class="btn btn-secondary upload-label">
                                    {"Upload"}
                                    <input
                                        type="file"
                                        accept="image/*"
                                        class="hidden-input"
                                        onchange={on_upload}
                                    />
                                </label>
                            </div>
                        }
                    } else {
                        html! {
                            <div class="camera-session">
                                <div class="camera-view">
                                    <video
                                        ref={video_ref.clone()}
                                        autoplay=true
                                        playsinline=true
                                        muted=true
                                    />
                                </div>
                                <div class="photo-actions">
                                    <button
                                        type="button"
                                        class="btn btn-primary"
                                        onclick={on_capture}
                                        disabled={!flow.is_live()}
                                    >
                                        {if flow.is_live() { "Capture" } else { "Starting camera..." }}
                                    </button>
                                    <button
                                        type="button"
                                        class="btn btn-secondary"
                                        onclick={on_cancel_camera}
                                    >
                                        {"Cancel"}
                                    </button>
                                </div>
                            </div>
                        }
                    }}

                    {if let (Some(photo), false) = (flow.photo(), flow.is_busy()) {
                        html! {
                            <div class="photo-ready">
                                <img src={photo.to_string()} alt="Preview" />
                                <span class="photo-ready-text">{"Photo ready"}</span>
                                <button
                                    type="button"
                                    class="photo-clear-btn"
                                    onclick={on_clear_photo}
                                    title="Remove photo"
                                >
                                    {"✕"}
                                </button>
                            </div>
                        }
                    } else { html! {} }}
                </div>

                <button type="submit" class="btn btn-primary generate-btn">
                    {"Generate Pass"}
                </button>
            </form>
        </div>
    }
}
