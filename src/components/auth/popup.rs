/// Landing page for the social sign-in popup.
use leptos::prelude::*;

/// Hands whatever the provider put in the URL fragment back to the window that opened the popup.
#[component]
pub fn PopupCallback() -> impl IntoView {
    let stuck = RwSignal::new(false);

    // Effects only run in the browser.
    Effect::new(move || hand_back(stuck));

    view! {
        <Show
            when=move || stuck.get()
            fallback=|| view! { <p>"Finishing sign-in…"</p> }
        >
            <p>"Sign-in couldn't be completed from this window. You can close it and try again."</p>
        </Show>
    }
}

#[cfg(feature = "browser")]
fn hand_back(stuck: RwSignal<bool>) {
    if let Err(err) = crate::identity::popup::forward_to_opener() {
        leptos::logging::warn!("Couldn't hand the sign-in result back to the opener: {err:?}");
        stuck.set(true);
    }
}

#[cfg(not(feature = "browser"))]
fn hand_back(_stuck: RwSignal<bool>) {}
