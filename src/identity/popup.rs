/// Popup window sign-in.
///
/// The opener opens a blank named popup during the click and points it at the provider's
/// authorize URL once the server has produced one. The provider redirects the
/// popup to [`POPUP_PATH`](super::POPUP_PATH) on our origin, which posts its URL fragment back to
/// the opener and closes itself.
use crate::auth::AuthError;

#[cfg(feature = "browser")]
pub use window::{discard, forward_to_opener, open_placeholder, redirect_uri, run};

/// What the provider put in the popup's URL fragment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PopupReply {
    pub state: Option<String>,
    pub id_token: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl PopupReply {
    /// `None` when the reply belongs to some other attempt.
    pub fn into_result(self, expected_state: &str) -> Option<Result<String, AuthError>> {
        if self.state.as_deref() != Some(expected_state) {
            return None;
        }

        if let Some(error) = self.error {
            let message = self
                .error_description
                .filter(|description| !description.is_empty())
                .unwrap_or(error);
            return Some(Err(AuthError::Rejected(message)));
        }

        Some(
            self.id_token
                .filter(|token| !token.is_empty())
                .ok_or_else(|| {
                    AuthError::Rejected(
                        "The sign-in response didn't include an identity token.".to_string(),
                    )
                }),
        )
    }
}

/// Everything that touches `window`. Only compiled for the browser.
#[cfg(feature = "browser")]
mod window {
    use super::PopupReply;
    use crate::auth::AuthError;
    use crate::identity::POPUP_PATH;

    use futures::StreamExt;
    use futures::channel::mpsc;
    use futures::future::{self, Either};
    use gloo_timers::future::TimeoutFuture;
    use std::cell::RefCell;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{MessageEvent, UrlSearchParams, Window};

    const POPUP_NAME: &str = "tickerdesk-auth";
    const POPUP_FEATURES: &str = "popup,width=500,height=640";
    const CLOSED_POLL_MS: u32 = 500;
    /// A popup that posts its reply and then closes can be seen closed before the reply is
    /// delivered, so it has to be seen closed this many polls in a row.
    const CLOSED_POLLS_BEFORE_GIVING_UP: u32 = 2;

    thread_local! {
        /// Opened during the click, pointed at the provider once the server has answered.
        static PLACEHOLDER: RefCell<Option<Window>> = const { RefCell::new(None) };
    }

    impl PopupReply {
        pub fn parse(fragment: &str) -> Option<Self> {
            let params = UrlSearchParams::new_with_str(fragment.trim_start_matches('#')).ok()?;
            Some(Self {
                state: params.get("state"),
                id_token: params.get("id_token"),
                error: params.get("error"),
                error_description: params.get("error_description"),
            })
        }
    }

    fn open(url: &str) -> Option<Window> {
        web_sys::window()?
            .open_with_url_and_target_and_features(url, POPUP_NAME, POPUP_FEATURES)
            .ok()
            .flatten()
    }

    /// Open an empty popup while the click is still being handled.
    pub fn open_placeholder() {
        let popup = open("about:blank");
        if popup.is_none() {
            leptos::logging::warn!("The browser refused to open the sign-in popup");
        }
        PLACEHOLDER.with(|slot| *slot.borrow_mut() = popup);
    }

    /// Close the placeholder of an attempt that never got as far as [`run`].
    pub fn discard() {
        if let Some(popup) = PLACEHOLDER.with(|slot| slot.take()) {
            let _ = popup.close();
        }
    }

    /// Absolute URL of the popup landing page on the current origin.
    pub fn redirect_uri() -> Option<String> {
        let origin = web_sys::window()?.location().origin().ok()?;
        Some(format!("{origin}{POPUP_PATH}"))
    }

    /// Point the popup at the authorize URL and wait for the ID token it comes back with.
    ///
    /// Reuses the placeholder from [`open_placeholder`]; opening a fresh popup here only works
    /// when the browser still treats the call as part of the click.
    pub async fn run(authorize_url: &str, state: &str) -> Result<String, AuthError> {
        let window = web_sys::window().ok_or(AuthError::PopupBlocked)?;
        let origin = window
            .location()
            .origin()
            .map_err(|_| AuthError::PopupBlocked)?;
        let popup = match PLACEHOLDER.with(|slot| slot.take()) {
            Some(popup) if !popup.closed().unwrap_or(true) => {
                if popup.location().set_href(authorize_url).is_err() {
                    let _ = popup.close();
                    return Err(AuthError::PopupBlocked);
                }
                popup
            }
            Some(_) => return Err(AuthError::PopupClosed),
            None => open(authorize_url).ok_or(AuthError::PopupBlocked)?,
        };

        let (sender, mut replies) = mpsc::unbounded::<String>();
        let listener = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
            if event.origin() != origin {
                return;
            }
            if let Some(fragment) = event.data().as_string() {
                let _ = sender.unbounded_send(fragment);
            }
        });
        if window
            .add_event_listener_with_callback("message", listener.as_ref().unchecked_ref())
            .is_err()
        {
            let _ = popup.close();
            return Err(AuthError::PopupBlocked);
        }

        let result = wait_for_reply(&popup, &mut replies, state).await;

        let _ =
            window.remove_event_listener_with_callback("message", listener.as_ref().unchecked_ref());
        if !popup.closed().unwrap_or(true) {
            let _ = popup.close();
        }
        result
    }

    async fn wait_for_reply(
        popup: &Window,
        replies: &mut mpsc::UnboundedReceiver<String>,
        state: &str,
    ) -> Result<String, AuthError> {
        let mut closed_polls = 0;
        loop {
            match future::select(replies.next(), TimeoutFuture::new(CLOSED_POLL_MS)).await {
                Either::Left((Some(fragment), _)) => {
                    match PopupReply::parse(&fragment).and_then(|reply| reply.into_result(state)) {
                        Some(result) => return result,
                        None => {
                            leptos::logging::warn!("Ignoring sign-in reply for another attempt")
                        }
                    }
                }
                Either::Left((None, _)) => return Err(AuthError::PopupClosed),
                Either::Right(_) => {
                    if popup.closed().unwrap_or(true) {
                        closed_polls += 1;
                        if closed_polls >= CLOSED_POLLS_BEFORE_GIVING_UP {
                            return Err(AuthError::PopupClosed);
                        }
                    } else {
                        closed_polls = 0;
                    }
                }
            }
        }
    }

    /// Runs inside the popup: hand the fragment to the opener on the same origin, then close.
    pub fn forward_to_opener() -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let location = window.location();
        let fragment = location.hash()?;
        let origin = location.origin()?;
        let opener: Window = window.opener()?.dyn_into()?;

        opener.post_message(&JsValue::from_str(fragment.trim_start_matches('#')), &origin)?;
        window.close()
    }
}
