/// Common UI building blocks.
use leptos::prelude::*;
use leptos_router::components::*;

/// Normal link.
#[component]
pub fn ANorm<H>(href: H, children: Children) -> impl IntoView
where
    H: ToHref + Send + Sync + 'static,
{
    view! {
        <A href=href>
            <span class="text-blue-600 hover:text-blue-400 hover:underline">{children()}</span>
        </A>
    }
}

#[component]
pub fn Spinner() -> impl IntoView {
    view! {
        <span
            class="inline-block w-4 h-4 rounded-full border-2 animate-spin border-slate-500 border-t-transparent"
            role="status"
            aria-label="Loading"
        ></span>
    }
}

/// Most recent failure, if any. There's no dismiss; the next attempt clears it.
#[component]
pub fn ErrorBanner(#[prop(into)] message: Signal<Option<String>>) -> impl IntoView {
    view! {
        <Show when=move || message.with(Option::is_some)>
            <div class="p-2 mb-2 text-red-800 bg-red-100 border border-red-400" role="alert">
                {move || message.get().unwrap_or_default()}
            </div>
        </Show>
    }
}
