use leptos::prelude::*;
use leptos_meta::{Body, Stylesheet, Title, provide_meta_context};
use leptos_router::{
    StaticSegment, WildcardSegment,
    components::{Route, Router, Routes},
};

use crate::components::auth::AuthRoutes;
use crate::components::ui::*;

#[component]
pub fn App() -> impl IntoView {
    // Provides context that manages stylesheets, titles, meta tags, etc.
    provide_meta_context();

    view! {
        // id=leptos means cargo-leptos will hot-reload this stylesheet
        <Stylesheet id="leptos" href="/pkg/tickerdesk.css" />

        <Title text="Tickerdesk" />

        <Router>
            <nav class="flex gap-2 justify-start">
                <div>
                    <ANorm href="/">Home</ANorm>
                </div>
                <div>
                    <ANorm href="/auth">Sign in</ANorm>
                </div>
            </nav>
            <main>
                <Routes fallback=move || "Not found.">
                    <Route path=StaticSegment("") view=HomePage />
                    <AuthRoutes />
                    <Route path=WildcardSegment("any") view=NotFound />
                </Routes>
                <Body {..} class="p-4 mx-auto max-w-7xl" />
            </main>
        </Router>
    }
}

/// Where a successful sign-in lands.
#[component]
fn HomePage() -> impl IntoView {
    view! {
        <h1 class="text-xl font-bold">"Tickerdesk"</h1>
        <p>
            "Live prices and history. "
            <ANorm href="/auth">"Sign in"</ANorm>
            " to get started."
        </p>
    }
}

/// 404 - Not Found
#[component]
fn NotFound() -> impl IntoView {
    // The status code can only be set during the initial server-side render.
    #[cfg(feature = "ssr")]
    {
        let resp = expect_context::<leptos_actix::ResponseOptions>();
        resp.set_status(actix_web::http::StatusCode::NOT_FOUND);
    }

    view! { <h1>"Not Found"</h1> }
}
