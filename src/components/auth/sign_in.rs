/// Email/password and social sign-in form.
use crate::auth::{
    AuthError, AuthRequest, FederatedProvider, FormState, HOME_PATH, Identity, Navigator, Trigger,
    authenticate, prepare,
};
use crate::components::ui::*;
use crate::identity::{IdentityHandle, use_identity_provider};

use leptos::ev::SubmitEvent;
use leptos::logging::log;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

const INPUT_CLASS: &str =
    "px-2 py-1 w-full bg-gray-200 border border-gray-500 invalid:border-red-500";
const SUBMIT_CLASS: &str =
    "px-2 py-1 w-full font-bold bg-green-200 hover:bg-green-300 disabled:opacity-50";
const SOCIAL_CLASS: &str = "px-2 py-1 w-full bg-slate-200 hover:bg-slate-300 disabled:opacity-50";

/// Claim the form for a new attempt and run its synchronous part.
///
/// `None` when another attempt is pending or the view has been torn down.
fn start(
    form: RwSignal<FormState>,
    identity: StoredValue<IdentityHandle>,
    trigger: Trigger,
) -> Option<(IdentityHandle, AuthRequest)> {
    let identity = identity.try_get_value()?;
    let request = form.try_update(|form| form.begin(trigger)).flatten()?;
    prepare(identity.as_ref(), &request);
    Some((identity, request))
}

/// Feed a finished attempt back into the form. Returns whether it navigated.
///
/// Results that arrive after the form or the router is gone are dropped.
fn settle<N>(
    form: RwSignal<FormState>,
    navigate: StoredValue<N, LocalStorage>,
    outcome: Result<Identity, AuthError>,
) -> bool
where
    N: Navigator + 'static,
{
    let Some(Some(signed_in)) = form.try_update(|form| form.complete(outcome)) else {
        return false;
    };
    log!("Signed in {} via {}", signed_in.uid, signed_in.provider_id);
    navigate
        .try_with_value(|navigate| navigate.navigate_to(HOME_PATH))
        .is_some()
}

#[component]
pub fn SignIn() -> impl IntoView {
    let form = RwSignal::new(FormState::default());
    let identity = StoredValue::new(use_identity_provider());
    let router = use_navigate();
    let navigate =
        StoredValue::new_local(move |path: &str| router(path, NavigateOptions::default()));

    // One attempt per trigger. Anything fired while an attempt is pending is dropped by `begin`.
    let dispatch = move |trigger: Trigger| {
        let Some((identity, request)) = start(form, identity, trigger) else {
            return;
        };
        spawn_local(async move {
            let outcome = authenticate(identity.as_ref(), &request).await;
            settle(form, navigate, outcome);
        });
    };

    let mode = move || form.with(FormState::mode);
    let pending = move || form.with(FormState::is_pending);
    let error = Signal::derive(move || form.with(|form| form.error().map(str::to_owned)));

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        dispatch(Trigger::Submit);
    };

    let social_buttons = FederatedProvider::ALL
        .into_iter()
        .map(move |provider| {
            view! {
                <button
                    type="button"
                    class=SOCIAL_CLASS
                    disabled=pending
                    on:click=move |_| dispatch(Trigger::Federated(provider))
                >
                    {format!("Continue with {provider}")}
                </button>
            }
        })
        .collect_view();

    view! {
        <div class="p-4 mx-auto max-w-md border-2 border-slate-500">
            <h2 class="text-2xl font-bold">{move || mode().title()}</h2>
            <p class="mb-4">"Sign in to access live prices and history"</p>

            <ErrorBanner message=error />

            <form on:submit=on_submit class="flex flex-col gap-2">
                <input
                    type="email"
                    name="email"
                    placeholder="Email Address"
                    class=INPUT_CLASS
                    required
                    prop:value=move || form.with(|form| form.email().to_owned())
                    on:input=move |ev| form.update(|form| form.set_email(event_target_value(&ev)))
                />
                <input
                    type="password"
                    name="password"
                    placeholder="Password"
                    class=INPUT_CLASS
                    required
                    prop:value=move || form.with(|form| form.password().to_owned())
                    on:input=move |ev| {
                        form.update(|form| form.set_password(event_target_value(&ev)))
                    }
                />
                <div class="flex gap-2 items-center">
                    <button
                        type="submit"
                        class=SUBMIT_CLASS
                        disabled=pending
                    >
                        {move || mode().submit_label()}
                    </button>
                    <Show when=pending>
                        <Spinner />
                    </Show>
                </div>
            </form>

            <div class="my-4 text-center text-slate-500">
                <span>"OR"</span>
            </div>

            <div class="flex flex-col gap-2">{social_buttons}</div>

            <p class="mt-4 text-center">
                {move || mode().toggle_prompt().0}
                " "
                <button
                    type="button"
                    class="text-blue-600 hover:text-blue-400 hover:underline"
                    on:click=move |_| form.update(FormState::toggle_mode)
                >
                    {move || mode().toggle_prompt().1}
                </button>
            </p>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;

    struct Answer(Result<Identity, AuthError>);

    #[async_trait(?Send)]
    impl crate::auth::IdentityProvider for Answer {
        async fn sign_in_with_federated(
            &self,
            _provider: FederatedProvider,
        ) -> Result<Identity, AuthError> {
            self.0.clone()
        }

        async fn sign_in_with_password(
            &self,
            _email: &str,
            _password: &str,
        ) -> Result<Identity, AuthError> {
            self.0.clone()
        }

        async fn create_account_with_password(
            &self,
            _email: &str,
            _password: &str,
        ) -> Result<Identity, AuthError> {
            self.0.clone()
        }
    }

    fn identity() -> Identity {
        Identity {
            uid: "uid-7".to_string(),
            email: Some("a@b.com".to_string()),
            display_name: None,
            provider_id: "password".to_string(),
        }
    }

    type Visited = Rc<RefCell<Vec<String>>>;

    fn mounted(
        answer: Result<Identity, AuthError>,
    ) -> (
        RwSignal<FormState>,
        StoredValue<IdentityHandle>,
        StoredValue<impl Fn(&str) + 'static, LocalStorage>,
        Visited,
    ) {
        Owner::new().set();
        let visited = Visited::default();
        let record = visited.clone();
        let provider: IdentityHandle = Arc::new(Answer(answer));
        (
            RwSignal::new(FormState::default()),
            StoredValue::new(provider),
            StoredValue::new_local(move |path: &str| record.borrow_mut().push(path.to_string())),
            visited,
        )
    }

    #[tokio::test]
    async fn test_success_navigates_home_once() {
        let (form, identity, navigate, visited) = mounted(Ok(identity()));

        let (provider, request) = start(form, identity, Trigger::Submit).unwrap();
        let outcome = authenticate(provider.as_ref(), &request).await;

        assert!(settle(form, navigate, outcome));
        assert_eq!(*visited.borrow(), vec!["/".to_string()]);
        assert!(!form.with_untracked(FormState::is_pending));
    }

    #[tokio::test]
    async fn test_result_after_unmount_is_dropped() {
        let (form, identity, navigate, visited) = mounted(Ok(identity()));

        let (provider, request) = start(form, identity, Trigger::Submit).unwrap();
        form.dispose();
        let outcome = authenticate(provider.as_ref(), &request).await;

        assert!(!settle(form, navigate, outcome));
        assert!(visited.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_result_after_router_is_gone_does_not_navigate() {
        let (form, identity, navigate, visited) = mounted(Ok(identity()));

        let (provider, request) = start(form, identity, Trigger::Submit).unwrap();
        navigate.dispose();
        let outcome = authenticate(provider.as_ref(), &request).await;

        assert!(!settle(form, navigate, outcome));
        assert!(visited.borrow().is_empty());
        assert!(!form.with_untracked(FormState::is_pending));
    }

    #[tokio::test]
    async fn test_failure_shows_message_and_stays() {
        let (form, identity, navigate, visited) =
            mounted(Err(AuthError::Rejected("Invalid credentials".to_string())));

        let (provider, request) = start(form, identity, Trigger::Submit).unwrap();
        let outcome = authenticate(provider.as_ref(), &request).await;

        assert!(!settle(form, navigate, outcome));
        assert!(visited.borrow().is_empty());
        assert_eq!(
            form.with_untracked(|form| form.error().map(str::to_owned)),
            Some("Invalid credentials".to_string())
        );
    }

    #[test]
    fn test_missing_provider_leaves_form_idle() {
        let (form, identity, _navigate, _visited) = mounted(Ok(identity()));
        identity.dispose();

        assert!(start(form, identity, Trigger::Submit).is_none());
        assert!(!form.with_untracked(FormState::is_pending));
    }

    #[test]
    fn test_second_trigger_while_pending_is_dropped() {
        let (form, identity, _navigate, _visited) = mounted(Ok(identity()));

        assert!(start(form, identity, Trigger::Submit).is_some());
        assert!(start(form, identity, Trigger::Federated(FederatedProvider::Apple)).is_none());
        assert!(form.with_untracked(FormState::is_pending));
    }
}
