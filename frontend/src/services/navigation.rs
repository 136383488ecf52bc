use js_sys::encode_uri_component;

fn with_return_url(page: &str, return_path: &str) -> String {
    format!("{}?returnUrl={}", page, String::from(encode_uri_component(return_path)))
}

pub fn login_url(return_path: &str) -> String {
    with_return_url("/login", return_path)
}

pub fn register_url(return_path: &str) -> String {
    with_return_url("/register", return_path)
}

pub fn add_child_url(return_path: &str) -> String {
    with_return_url("/parent/children/new", return_path)
}

/// Path of the current page, `/` when unavailable
pub fn current_path() -> String {
    web_sys::window()
        .and_then(|window| window.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

/// Value of `name` in the current query string
pub fn query_param(name: &str) -> Option<String> {
    let search = web_sys::window()?.location().search().ok()?;
    search
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

/// Full page navigation; the draft in storage survives it
pub fn navigate(url: &str) {
    let Some(window) = web_sys::window() else {
        return;
    };
    if let Err(e) = window.location().set_href(url) {
        log::error!("Navigation to {} failed: {:?}", url, e);
    }
}
