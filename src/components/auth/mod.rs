/// All authentication-related components.
use leptos::prelude::*;
use leptos_router::components::*;
use leptos_router::*;

mod popup;
mod sign_in;

pub use sign_in::SignIn;

/// Visual wrapper around all auth views.
#[component]
fn AuthWrapper() -> impl IntoView {
    view! {
        <div class="py-4">
            <Outlet />
        </div>
    }
}

/// Route definitions for /auth subtree.
#[component(transparent)]
pub fn AuthRoutes() -> impl MatchNestedRoutes + Clone {
    view! {
        <ParentRoute path=path!("auth") view=AuthWrapper>
            <Route path=path!("") view=sign_in::SignIn />
            <Route path=path!("popup") view=popup::PopupCallback />
        </ParentRoute>
    }
    .into_inner()
}
