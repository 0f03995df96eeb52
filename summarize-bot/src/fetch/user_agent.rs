//! Browser user agents for page fetches.

use rand::seq::SliceRandom;

/// Used when `USER_AGENT_POOL` is unset or empty.
const BROWSER_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0",
];

/// Choose a user agent from `pool`, or a built-in browser one.
pub fn choose_user_agent(pool: Option<&[String]>) -> &str {
    let mut rng = rand::thread_rng();

    pool.filter(|agents| !agents.is_empty())
        .and_then(|agents| agents.choose(&mut rng).map(String::as_str))
        .or_else(|| BROWSER_USER_AGENTS.choose(&mut rng).copied())
        .unwrap_or(BROWSER_USER_AGENTS[0])
}
