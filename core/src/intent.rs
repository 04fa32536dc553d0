/// What a free-text query is asking for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Weather { city: String },
    Joke,
    Unknown,
}

/// Keyword match on the lower-cased query. "weather" is checked before "joke".
pub fn classify(query: &str) -> Intent {
    let lower = query.to_lowercase();

    if lower.contains("weather") {
        Intent::Weather { city: extract_city(query) }
    } else if lower.contains("joke") {
        Intent::Joke
    } else {
        Intent::Unknown
    }
}

/// Alphabetic characters of whatever follows the last `in`.
///
/// This is a plain substring match, so "Berlin" ends in `in` and yields an
/// empty city. Without any `in` the whole query is used.
pub fn extract_city(query: &str) -> String {
    let tail = query.rsplit("in").next().unwrap_or(query);
    tail.chars().filter(|c| c.is_alphabetic()).collect()
}
