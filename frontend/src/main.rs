use shared::PassRecord;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

mod components;
mod services;

use components::pass_card::PassCard;
use components::pass_form::PassForm;
use services::export;
use services::logging::Logger;

/// Top-level coordinator.
///
/// Owns the current pass record (at most one; each submission replaces
/// it) and runs the rasterize-and-download flow. Export failures are
/// reported inline and leave the record available for retry.
#[function_component(App)]
fn app() -> Html {
    let pass_record = use_state(|| Option::<PassRecord>::None);
    let is_exporting = use_state(|| false);
    let export_error = use_state(|| Option::<String>::None);

    // The form's date/time defaults are read from the clock once, here,
    // and handed to the form as construction inputs.
    let initial_date = use_state(services::date_utils::current_date);
    let initial_time = use_state(services::date_utils::current_time_hhmm);

    let on_generate = {
        let pass_record = pass_record.clone();
        let export_error = export_error.clone();
        Callback::from(move |record: PassRecord| {
            export_error.set(None);
            pass_record.set(Some(record));
        })
    };

    let on_download = {
        let pass_record = pass_record.clone();
        let is_exporting = is_exporting.clone();
        let export_error = export_error.clone();

        Callback::from(move |_: MouseEvent| {
            let Some(record) = (*pass_record).clone() else {
                return;
            };
            is_exporting.set(true);
            export_error.set(None);

            let is_exporting = is_exporting.clone();
            let export_error = export_error.clone();

            spawn_local(async move {
                match export::export_pass_card("visitor-pass", &record.id).await {
                    Ok(()) => {
                        Logger::debug_with_component(
                            "app",
                            &format!("Exported pass {}", record.id),
                        );
                    }
                    Err(e) => {
                        Logger::error_with_component("app", &e);
                        export_error.set(Some(
                            "Failed to download pass. Please try again.".to_string(),
                        ));
                    }
                }
                is_exporting.set(false);
            });
        })
    };

    html! {
        <div class="app">
            <header class="app-header">
                <h1>{"RGShireworld"}</h1>
                <p>{"Professional Visitor Pass Management System"}</p>
            </header>

            <main class="app-main">
                <section class="form-section">
                    <PassForm
                        initial_date={(*initial_date).clone()}
                        initial_time={(*initial_time).clone()}
                        on_generate={on_generate}
                    />
                </section>

                <section class="preview-section">
                    <h3>{"Pass Preview"}</h3>
                    <PassCard pass={(*pass_record).clone()} />

                    {if let Some(error) = (*export_error).as_ref() {
                        html! {
                            <div class="form-message error">
                                {error}
                            </div>
                        }
                    } else { html! {} }}

                    {if pass_record.is_some() {
                        html! {
                            <button
                                class="btn btn-primary download-btn"
                                onclick={on_download}
                                disabled={*is_exporting}
                            >
                                {if *is_exporting { "Preparing download..." } else { "Download Pass" }}
                            </button>
                        }
                    } else { html! {} }}
                </section>
            </main>

            <footer class="app-footer">
                <p>{"© 2026 RGShireworld Technologies. All rights reserved."}</p>
            </footer>
        </div>
    }
}

fn main() {
    yew::Renderer::<App>::new().render();
}
