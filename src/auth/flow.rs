/// Dispatching one attempt to the identity provider and settling its outcome.
use crate::auth::form::{AuthRequest, FormState, Trigger};
use crate::auth::provider::{AuthError, HOME_PATH, Identity, IdentityProvider, Navigator};

/// Make the single provider call a request stands for.
pub async fn authenticate<P>(provider: &P, request: &AuthRequest) -> Result<Identity, AuthError>
where
    P: IdentityProvider + ?Sized,
{
    match request {
        AuthRequest::Federated(federated) => provider.sign_in_with_federated(*federated).await,
        AuthRequest::SignIn { email, password } => {
            provider.sign_in_with_password(email, password).await
        }
        AuthRequest::SignUp { email, password } => {
            provider.create_account_with_password(email, password).await
        }
    }
}

/// Synchronous part of an attempt; call it before the first `.await`.
pub fn prepare<P>(provider: &P, request: &AuthRequest)
where
    P: IdentityProvider + ?Sized,
{
    if let AuthRequest::Federated(federated) = request {
        provider.prepare_federated(*federated);
    }
}

/// How a trigger ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Another attempt was still pending.
    Ignored,
    Navigated(Identity),
    Failed,
}

/// The form together with the capabilities it drives, outside of any view.
pub struct SignInFlow<P, N> {
    pub form: FormState,
    provider: P,
    navigator: N,
}

impl<P, N> SignInFlow<P, N>
where
    P: IdentityProvider,
    N: Navigator,
{
    pub fn new(provider: P, navigator: N) -> Self {
        Self {
            form: FormState::default(),
            provider,
            navigator,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    /// Run one attempt to completion.
    pub async fn trigger(&mut self, trigger: Trigger) -> Outcome {
        let Some(request) = self.form.begin(trigger) else {
            return Outcome::Ignored;
        };

        prepare(&self.provider, &request);
        let outcome = authenticate(&self.provider, &request).await;
        match self.form.complete(outcome) {
            Some(identity) => {
                self.navigator.navigate_to(HOME_PATH);
                Outcome::Navigated(identity)
            }
            None => Outcome::Failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::form::AuthMode;
    use crate::auth::provider::FederatedProvider;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Clone, Debug, PartialEq, Eq)]
    enum Call {
        Prepare(FederatedProvider),
        Federated(FederatedProvider),
        SignIn(String, String),
        SignUp(String, String),
    }

    /// Answers every call with the same result and records what was asked.
    struct StubProvider {
        result: Result<Identity, AuthError>,
        calls: Mutex<Vec<Call>>,
    }

    impl StubProvider {
        fn succeeding() -> Self {
            Self {
                result: Ok(Identity {
                    uid: "uid-42".to_string(),
                    email: Some("a@b.com".to_string()),
                    display_name: None,
                    provider_id: "password".to_string(),
                }),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn rejecting(message: &str) -> Self {
            Self {
                result: Err(AuthError::Rejected(message.to_string())),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn answer(&self, call: Call) -> Result<Identity, AuthError> {
            self.calls.lock().unwrap().push(call);
            self.result.clone()
        }
    }

    #[async_trait(?Send)]
    impl IdentityProvider for StubProvider {
        fn prepare_federated(&self, provider: FederatedProvider) {
            self.calls.lock().unwrap().push(Call::Prepare(provider));
        }

        async fn sign_in_with_federated(
            &self,
            provider: FederatedProvider,
        ) -> Result<Identity, AuthError> {
            self.answer(Call::Federated(provider))
        }

        async fn sign_in_with_password(
            &self,
            email: &str,
            password: &str,
        ) -> Result<Identity, AuthError> {
            self.answer(Call::SignIn(email.to_string(), password.to_string()))
        }

        async fn create_account_with_password(
            &self,
            email: &str,
            password: &str,
        ) -> Result<Identity, AuthError> {
            self.answer(Call::SignUp(email.to_string(), password.to_string()))
        }
    }

    #[derive(Default)]
    struct RecordingNavigator {
        visited: Mutex<Vec<String>>,
    }

    impl RecordingNavigator {
        fn visited(&self) -> Vec<String> {
            self.visited.lock().unwrap().clone()
        }
    }

    impl Navigator for RecordingNavigator {
        fn navigate_to(&self, path: &str) {
            self.visited.lock().unwrap().push(path.to_string());
        }
    }

    fn flow(provider: StubProvider) -> SignInFlow<StubProvider, RecordingNavigator> {
        SignInFlow::new(provider, RecordingNavigator::default())
    }

    #[tokio::test]
    async fn test_social_success_navigates_home_once() {
        for federated in FederatedProvider::ALL {
            let mut flow = flow(StubProvider::succeeding());

            let outcome = flow.trigger(Trigger::Federated(federated)).await;

            assert!(matches!(outcome, Outcome::Navigated(_)));
            assert_eq!(flow.navigator().visited(), vec!["/".to_string()]);
            assert_eq!(flow.form.error(), None);
            assert_eq!(
                flow.provider().calls(),
                vec![Call::Prepare(federated), Call::Federated(federated)]
            );
        }
    }

    #[tokio::test]
    async fn test_social_failure_shows_message_without_navigation() {
        let mut flow = flow(StubProvider::rejecting("Popup closed by user"));

        let outcome = flow
            .trigger(Trigger::Federated(FederatedProvider::Microsoft))
            .await;

        assert_eq!(outcome, Outcome::Failed);
        assert_eq!(flow.form.error(), Some("Popup closed by user"));
        assert!(flow.navigator().visited().is_empty());
        assert!(!flow.form.is_pending());
    }

    #[tokio::test]
    async fn test_sign_up_submit_only_creates_account() {
        let mut flow = flow(StubProvider::succeeding());
        flow.form.toggle_mode();
        flow.form.set_email("new@b.com");
        flow.form.set_password("hunter22");

        flow.trigger(Trigger::Submit).await;

        assert_eq!(
            flow.provider().calls(),
            vec![Call::SignUp("new@b.com".to_string(), "hunter22".to_string())]
        );
    }

    #[tokio::test]
    async fn test_sign_in_submit_only_signs_in() {
        let mut flow = flow(StubProvider::succeeding());
        flow.form.set_email("old@b.com");
        flow.form.set_password("hunter22");

        flow.trigger(Trigger::Submit).await;

        assert_eq!(
            flow.provider().calls(),
            vec![Call::SignIn("old@b.com".to_string(), "hunter22".to_string())]
        );
    }

    #[tokio::test]
    async fn test_invalid_credentials_scenario() {
        let mut flow = flow(StubProvider::rejecting("Invalid credentials"));
        flow.form.set_email("a@b.com");
        flow.form.set_password("secret");

        let outcome = flow.trigger(Trigger::Submit).await;

        assert_eq!(outcome, Outcome::Failed);
        assert_eq!(flow.form.error(), Some("Invalid credentials"));
        assert!(flow.navigator().visited().is_empty());
        assert_eq!(flow.form.mode(), AuthMode::SignIn);
    }

    #[tokio::test]
    async fn test_sign_up_success_scenario() {
        let mut flow = flow(StubProvider::succeeding());
        flow.form.toggle_mode();
        flow.form.set_email("a@b.com");
        flow.form.set_password("secret");

        let outcome = flow.trigger(Trigger::Submit).await;

        assert!(matches!(outcome, Outcome::Navigated(_)));
        assert_eq!(flow.navigator().visited(), vec!["/".to_string()]);
        assert_eq!(flow.form.error(), None);
    }

    #[tokio::test]
    async fn test_retry_replaces_previous_error() {
        let mut flow = flow(StubProvider::rejecting("First failure"));
        flow.trigger(Trigger::Submit).await;
        flow.provider.result = Err(AuthError::PopupBlocked);

        flow.trigger(Trigger::Federated(FederatedProvider::Google)).await;

        assert_eq!(
            flow.form.error(),
            Some("The sign-in popup was blocked by the browser.")
        );
    }

    #[tokio::test]
    async fn test_pending_attempt_ignores_new_trigger() {
        let mut flow = flow(StubProvider::succeeding());
        flow.form.begin(Trigger::Federated(FederatedProvider::Apple));

        let outcome = flow.trigger(Trigger::Submit).await;

        assert_eq!(outcome, Outcome::Ignored);
        assert!(flow.provider().calls().is_empty());
        assert!(flow.navigator().visited().is_empty());
    }

    #[tokio::test]
    async fn test_request_is_captured_before_mode_changes() {
        let provider = StubProvider::succeeding();
        let mut form = FormState::default();
        form.set_email("a@b.com");
        form.set_password("secret");

        let request = form.begin(Trigger::Submit).unwrap();
        form.toggle_mode();
        form.set_password("changed");
        authenticate(&provider, &request).await.unwrap();

        assert_eq!(
            provider.calls(),
            vec![Call::SignIn("a@b.com".to_string(), "secret".to_string())]
        );
    }

    #[tokio::test]
    async fn test_submit_needs_no_preparation() {
        let mut flow = flow(StubProvider::succeeding());

        flow.trigger(Trigger::Submit).await;

        assert!(
            !flow
                .provider()
                .calls()
                .iter()
                .any(|call| matches!(call, Call::Prepare(_)))
        );
    }

    #[tokio::test]
    async fn test_ignored_trigger_prepares_nothing() {
        let mut flow = flow(StubProvider::succeeding());
        flow.form.begin(Trigger::Submit);

        flow.trigger(Trigger::Federated(FederatedProvider::Google)).await;

        assert!(flow.provider().calls().is_empty());
    }
}
