use shared::PassRecord;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct PassCardProps {
    /// The finalized pass, or None for the empty placeholder card
    pub pass: Option<PassRecord>,
}

/// Field text for the card: "-" stands in for anything absent or empty.
fn display_field(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "-".to_string(),
    }
}

/// Fixed-layout visual card for a pass record.
///
/// Pure projection: no state, no side effects, total over partial input.
/// The root element carries `id="visitor-pass"` so the export flow can
/// find the mounted card.
#[function_component(PassCard)]
pub fn pass_card(props: &PassCardProps) -> Html {
    let pass = props.pass.as_ref();
    let id = display_field(pass.map(|p| p.id.as_str()));
    let name = display_field(pass.map(|p| p.name.as_str()));
    let date = display_field(pass.map(|p| p.date.as_str()));
    let time = display_field(pass.map(|p| p.time.as_str()));
    let photo = pass.and_then(|p| p.photo.clone());

    html! {
        <div id="visitor-pass" class="pass-card">
            <div class="pass-header">
                <div class="pass-branding">
                    <h3 class="pass-org">{"RGSHIREWORLD"}</h3>
                    <p class="pass-subtitle">{"VISITOR ACCESS PASS"}</p>
                </div>
                <div class="pass-id-badge">
                    <p class="pass-id-label">{"ID"}</p>
                    <p class="pass-id-value">{id}</p>
                </div>
            </div>

            <div class="pass-body">
                <div class="pass-details">
                    <InfoRow label="Name" value={name} />
                    <InfoRow label="Organization" value="RGShireworld Pvt Ltd" />
                    <InfoRow label="Building" value="Main Office" />
                    <InfoRow label="To Meet" value="Admin" />
                    <div class="pass-footer">
                        <p>{"Powered by RGShireworld Technologies"}</p>
                    </div>
                </div>

                <div class="pass-side">
                    <div class="pass-photo">
                        {if let Some(photo) = photo {
                            html! { <img src={photo} alt="Visitor" /> }
                        } else {
                            html! {
                                <svg class="pass-photo-placeholder" fill="currentColor" viewBox="0 0 20 20" xmlns="http://www.w3.org/2000/svg">
                                    <path fill-rule="evenodd" d="M10 9a3 3 0 100-6 3 3 0 000 6zm-7 9a7 7 0 1114 0H3z" clip-rule="evenodd"/>
                                </svg>
                            }
                        }}
                    </div>
                    <div class="pass-datetime">
                        <div>
                            <p class="pass-datetime-label">{"DATE"}</p>
                            <p class="pass-datetime-value">{date}</p>
                        </div>
                        <div>
                            <p class="pass-datetime-label">{"TIME"}</p>
                            <p class="pass-datetime-value">{time}</p>
                        </div>
                    </div>
                </div>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct InfoRowProps {
    pub label: AttrValue,
    pub value: AttrValue,
}

#[function_component(InfoRow)]
fn info_row(props: &InfoRowProps) -> Html {
    html! {
        <div class="pass-info-row">
            <span class="pass-info-label">{format!("{}:", props.label)}</span>
            <span class="pass-info-value">{props.value.clone()}</span>
        </div>
    }
}
