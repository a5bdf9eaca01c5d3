//! Deterministic clean-up of generated replies.
//!
//! Runs after the styler. Removes assistant-speak fillers and markdown that
//! messengers render literally, then fixes spacing, the first letter and the
//! final punctuation mark.

use once_cell::sync::Lazy;
use regex::Regex;

static FILLER_PHRASES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:как (?:ии|искусственный интеллект|языковая модель|виртуальный ассистент)[^.!?]*[.!?]?|(?:отличный|хороший|прекрасный) вопрос[!.,]?|надеюсь, это (?:поможет|помогло)[!.]?|(?:я )?(?:рад|рада|буду рад|буду рада) помочь[!.]?|обращайтесь, если (?:возникнут|появятся|будут) (?:ещё |еще )?вопросы[!.]?)",
    )
    .expect("filler regex is valid")
});

static MARKDOWN_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\((?:[^)]+)\)").expect("link regex is valid"));

static MARKDOWN_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*#{1,6}[ \t]*").expect("header regex is valid"));

static MARKDOWN_BULLET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*(?:[-*•]|\d+\.)[ \t]+").expect("bullet regex is valid"));

static EMPHASIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*{1,3}|_{2,3}|`+|~~").expect("emphasis regex is valid"));

static STRAY_SYMBOLS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[<>\[\]|^#]").expect("symbol regex is valid"));

static INLINE_SPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]+").expect("space regex is valid"));

static SPACE_BEFORE_PUNCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r" +([,.!?;:])").expect("punctuation regex is valid"));

static BLANK_LINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("blank line regex is valid"));

static LEADING_GREETING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(?:здравствуйте|приветствую|привет|добрый (?:день|вечер)|доброе утро|доброй ночи|hello|hi)(?:[ ,]+\p{L}+)?\s*[!.,]+\s*",
    )
    .expect("greeting regex is valid")
});

/// Full clean-up pass.
pub fn sanitize(text: &str) -> String {
    let text = FILLER_PHRASES.replace_all(text, "");
    let text = MARKDOWN_LINK.replace_all(&text, "$1");
    let text = MARKDOWN_HEADER.replace_all(&text, "");
    let text = MARKDOWN_BULLET.replace_all(&text, "");
    let text = EMPHASIS.replace_all(&text, "");
    let text = STRAY_SYMBOLS.replace_all(&text, "");
    let text = normalize_whitespace(&text);
    capitalize_first(&ensure_terminal_punctuation(&text))
}

/// Drops an opening greeting; used once the conversation has already been greeted.
///
/// Text that is nothing but a greeting is returned unchanged.
pub fn strip_duplicate_greeting(text: &str) -> String {
    let stripped = LEADING_GREETING.replace(text, "");
    if stripped.trim().is_empty() || stripped.len() == text.len() {
        return text.to_string();
    }
    capitalize_first(stripped.trim_start())
}

fn normalize_whitespace(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    let lines: Vec<String> = text
        .lines()
        .map(|line| INLINE_SPACE.replace_all(line.trim(), " ").into_owned())
        .map(|line| SPACE_BEFORE_PUNCT.replace_all(&line, "$1").into_owned())
        .collect();
    BLANK_LINES
        .replace_all(lines.join("\n").trim(), "\n\n")
        .into_owned()
}

fn ensure_terminal_punctuation(text: &str) -> String {
    match text.chars().last() {
        Some(c) if c.is_alphanumeric() => format!("{}.", text),
        _ => text.to_string(),
    }
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
