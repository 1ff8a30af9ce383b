//! Feed signup: subscribe a GitHub user to a mailed issue feed.
//!
//! The nickname is verified against GitHub before submitting; a missing
//! user is a field-level message on the input, not a fetch failure.

use dioxus::prelude::*;
use dioxus_logger::tracing::warn;

use crate::api::{self, FeedGenerateRequest};

/// Loose shape check: something@domain.tld, no whitespace. The backend
/// does the real validation.
pub fn email_looks_valid(email: &str) -> bool {
    if email.contains(char::is_whitespace) {
        return false;
    }
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        _ => false,
    }
}

#[derive(Clone, Copy)]
pub struct FeedSignup {
    pub nickname: Signal<String>,
    pub email: Signal<String>,
    pub nickname_error: Signal<Option<String>>,
    pub email_error: Signal<Option<String>>,
    pub checking_nickname: Signal<bool>,
    pub submitting: Signal<bool>,
    pub submitted: Signal<bool>,
    pub submit_error: Signal<Option<String>>,
    pub set_nickname: Callback<String>,
    pub set_email: Callback<String>,
    pub verify_nickname: Callback<()>,
    pub submit: Callback<()>,
}

pub fn use_feed_signup() -> FeedSignup {
    let mut nickname = use_signal(String::new);
    let mut email = use_signal(String::new);
    let mut nickname_error = use_signal(|| None);
    let mut email_error = use_signal(|| None);
    let mut checking_nickname = use_signal(|| false);
    let mut submitting = use_signal(|| false);
    let mut submitted = use_signal(|| false);
    let mut submit_error = use_signal(|| None);

    let set_nickname = use_callback(move |value: String| {
        nickname.set(value);
        nickname_error.set(None);
    });

    let set_email = use_callback(move |value: String| {
        if !value.trim().is_empty() && !email_looks_valid(&value) {
            email_error.set(Some("Please enter a valid email address".to_string()));
        } else {
            email_error.set(None);
        }
        email.set(value);
    });

    let verify_nickname = use_callback(move |_: ()| {
        let name = nickname.peek().trim().to_string();
        if name.is_empty() || *checking_nickname.peek() {
            return;
        }
        checking_nickname.set(true);
        spawn(async move {
            match api::check_github_user_exists(&name).await {
                Ok(true) => nickname_error.set(None),
                Ok(false) => {
                    nickname_error.set(Some(format!("GitHub user '{name}' does not exist")))
                }
                Err(err) => {
                    warn!("nickname verification failed: {err:#}");
                    nickname_error.set(Some("Could not verify the GitHub user".to_string()));
                }
            }
            checking_nickname.set(false);
        });
    });

    let submit = use_callback(move |_: ()| {
        if *submitting.peek() {
            return;
        }
        let name = nickname.peek().trim().to_string();
        let address = email.peek().trim().to_string();
        if name.is_empty() {
            nickname_error.set(Some("Nickname is required".to_string()));
            return;
        }
        if !email_looks_valid(&address) {
            email_error.set(Some("Please enter a valid email address".to_string()));
            return;
        }
        if nickname_error.peek().is_some() || email_error.peek().is_some() {
            return;
        }
        submitting.set(true);
        submit_error.set(None);
        spawn(async move {
            let request = FeedGenerateRequest {
                nickname: name,
                email: address,
            };
            match api::generate_feed(&request).await {
                Ok(_) => submitted.set(true),
                Err(err) => {
                    warn!("feed signup failed: {err:#}");
                    submit_error.set(Some("Subscription failed. Please try again.".to_string()));
                }
            }
            submitting.set(false);
        });
    });

    FeedSignup {
        nickname,
        email,
        nickname_error,
        email_error,
        checking_nickname,
        submitting,
        submitted,
        submit_error,
        set_nickname,
        set_email,
        verify_nickname,
        submit,
    }
}

#[component]
pub fn FeedPage() -> Element {
    let form = use_feed_signup();

    rsx! {
        div { style: "max-width:30rem;margin:2rem auto;",
            h2 { "Issue feed" }
            p { "Get issues matching your GitHub profile mailed to you." }

            if *form.submitted.read() {
                p { "Subscribed. The first feed arrives with the next sync." }
            } else {
                div {
                    label { r#for: "feed_nickname", "GitHub nickname" }
                    input {
                        id: "feed_nickname",
                        value: "{form.nickname}",
                        oninput: move |evt| form.set_nickname.call(evt.value()),
                        onblur: move |_| form.verify_nickname.call(()),
                    }
                    if *form.checking_nickname.read() {
                        span { "checking..." }
                    }
                    {form.nickname_error.read().clone().map(|message| rsx! {
                        p { style: "color:#b00;", "{message}" }
                    })}
                }
                div {
                    label { r#for: "feed_email", "Email" }
                    input {
                        id: "feed_email",
                        r#type: "email",
                        value: "{form.email}",
                        oninput: move |evt| form.set_email.call(evt.value()),
                    }
                    {form.email_error.read().clone().map(|message| rsx! {
                        p { style: "color:#b00;", "{message}" }
                    })}
                }
                button {
                    disabled: *form.submitting.read(),
                    onclick: move |_| form.submit.call(()),
                    if *form.submitting.read() { "Subscribing..." } else { "Subscribe" }
                }
                {form.submit_error.read().clone().map(|message| rsx! {
                    p { style: "color:#b00;", "{message}" }
                })}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape_check() {
        assert!(email_looks_valid("a@b.co"));
        assert!(email_looks_valid("first.last+tag@sub.domain.org"));
        assert!(!email_looks_valid(""));
        assert!(!email_looks_valid("no-at-sign"));
        assert!(!email_looks_valid("two@@signs.com"));
        assert!(!email_looks_valid("spaces in@name.com"));
        assert!(!email_looks_valid("nodot@domain"));
        assert!(!email_looks_valid("dot@.leading"));
    }
}
