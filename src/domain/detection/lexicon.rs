//! Keyword lists and patterns used by the detectors.
//!
//! All lists are matched against [`normalize`]d text: lowercase, `ё` folded
//! to `е`, whitespace collapsed. Entries are stems, so one entry covers the
//! usual Russian inflections.

use once_cell::sync::Lazy;
use regex::Regex;

/// Lowercases, folds `ё`, and collapses whitespace.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .replace('ё', "е")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Every entry of `phrases` contained in `normalized`, in list order.
pub fn find_phrases(normalized: &str, phrases: &[&str]) -> Vec<String> {
    phrases
        .iter()
        .filter(|p| normalized.contains(*p))
        .map(|p| p.to_string())
        .collect()
}

/// Every non-overlapping match of `re` in `text`.
pub fn find_matches(re: &Regex, text: &str) -> Vec<String> {
    re.find_iter(text).map(|m| m.as_str().to_string()).collect()
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace()
        .filter(|w| w.chars().any(char::is_alphanumeric))
        .count()
}

// ---------------------------------------------------------------------------
// AI probing
// ---------------------------------------------------------------------------

pub static PROBING_DIRECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:ты|вы)\s+(?:бот|робот|ии|ai|нейросеть|нейронка|программа|chatgpt|gpt|гпт|автоответчик|(?:живой\s+)?человек)\b|\b(?:это|с)\s+бот(?:ом)?\b|искусственный интеллект|\bare you (?:a )?(?:bot|robot|human|ai)\b",
    )
    .expect("direct probing pattern")
});

pub const PROBING_INDIRECT: &[&str] = &[
    "слишком быстро отвечае",
    "быстро отвечаешь",
    "шаблонн",
    "как робот",
    "как бот",
    "как машина",
    "автоматическ",
    "заготовк",
    "копипаст",
    "кто мне отвечает",
    "кто со мной переписывается",
    "с кем я общаюсь",
    "с кем я разговариваю",
    "с кем я переписываюсь",
    "настоящий человек",
    "реальный человек",
];

pub const PROBING_TECHNICAL: &[&str] = &[
    "промпт",
    "prompt",
    "системн инструкц",
    "системные инструкц",
    "языковая модель",
    "языковой модел",
    "language model",
    "llm",
    "openai",
    "gpt-",
    "нейросет",
    "какая модель",
    "на какой модели",
    "токен",
];

// ---------------------------------------------------------------------------
// Complexity
// ---------------------------------------------------------------------------

pub const COMPLEXITY_KEYWORDS: &[&str] = &[
    "сравн",
    "несколько офис",
    "договор",
    "юридическ",
    "налог",
    "бухгалтер",
    "индивидуальн",
    "скидк",
    "корпоративн",
    "условия оплаты",
    "рассрочк",
    "ндс",
];

pub const MULTI_STEP_CONNECTIVES: &[&str] = &[
    "а также",
    "и еще",
    "кроме того",
    "во-первых",
    "во-вторых",
    "после этого",
    "а затем",
    "а потом",
];

pub const CALCULATION_PHRASES: &[&str] = &[
    "посчита",
    "рассчита",
    "сколько будет",
    "итого",
    "в сумме",
    "в месяц за",
];

pub static CALCULATION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+\s*[x×*+]\s*\d+").expect("calculation pattern"));

pub const EXTERNAL_DATA_PHRASES: &[&str] = &[
    "курс валют",
    "курс доллар",
    "курс евро",
    "погод",
    "пробк",
    "новост",
    "котировк",
];

pub static EVENT_FOR_PEOPLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:мероприят|событи|конференц|семинар|тренинг|вечеринк|праздник|корпоратив|презентаци)\w*\D{0,40}?\d+\s*(?:человек|чел|гост|участник|персон)",
    )
    .expect("event pattern")
});

pub const PRICE_WORDS: &[&str] = &["стоит", "цена", "цену", "стоимост", "сколько за"];

pub const VIEWING_TIME_WORDS: &[&str] = &[
    "сегодня",
    "завтра",
    "понедельник",
    "вторник",
    "сред",
    "четверг",
    "пятниц",
    "суббот",
    "воскресень",
    "утром",
    "вечером",
];

// ---------------------------------------------------------------------------
// Emotions
// ---------------------------------------------------------------------------

pub const ANGRY_KEYWORDS: &[&str] = &[
    "безобраз",
    "возмутительн",
    "отвратительн",
    "ужасн",
    "достали",
    "бесит",
    "хамств",
    "обман",
    "мошенни",
    "развод",
    "буду жаловаться",
    "жалоб",
    "позор",
    "кошмар",
    "в суд",
];

pub const FRUSTRATED_KEYWORDS: &[&str] = &[
    "не понимаю",
    "непонятно",
    "сколько можно",
    "опять",
    "до сих пор",
    "который раз",
    "никто не отвечает",
    "не работает",
    "неудобно",
    "разочарован",
    "надоел",
    "долго жду",
];

pub const POSITIVE_KEYWORDS: &[&str] = &[
    "спасибо",
    "благодар",
    "отлично",
    "супер",
    "замечательн",
    "прекрасн",
    "здорово",
    "круто",
    "понравил",
];

pub const ANGRY_EMOJI: &[&str] = &["😡", "🤬", "😠", "👿"];
pub const FRUSTRATED_EMOJI: &[&str] = &["😤", "😒", "🙄", "😞", "😔"];
pub const POSITIVE_EMOJI: &[&str] = &["😊", "🙂", "😀", "😃", "👍", "❤", "🙏", "😍"];

pub static CAPS_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\p{Lu}{5,}").expect("caps pattern"));

// ---------------------------------------------------------------------------
// Confidence
// ---------------------------------------------------------------------------

/// Subjects the desk is expected to answer about.
pub const TOPIC_KEYWORDS: &[&str] = &[
    "офис",
    "аренд",
    "помещени",
    "стоит",
    "цен",
    "стоимост",
    "метр",
    "площад",
    "переговорн",
    "коворкинг",
    "рабоч",
    "адрес",
    "парковк",
    "интернет",
    "мебел",
    "бизнес-центр",
    "бц",
    "этаж",
    "свобод",
];

/// Topics where a confident-sounding wrong answer costs the most.
pub const HALLUCINATION_RISK_KEYWORDS: &[&str] = &[
    "гарантир",
    "точно",
    "юридическ",
    "налог",
    "закон",
    "штраф",
    "прогноз",
    "судеб",
    "лиценз",
];

// ---------------------------------------------------------------------------
// Binary detectors
// ---------------------------------------------------------------------------

pub static PROFANITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:бля|хуй|хуе|хуя|пизд|ебан|ебат|ебал|заеб|выеб|отъеб|нахуй|нахер|охуе|сука|суки|сучк|мудак|мудил|пидор|гандон|fuck|shit)\w*",
    )
    .expect("profanity pattern")
});

pub const PROMPT_INJECTION: &[&str] = &[
    "игнорируй предыдущ",
    "игнорируй все",
    "забудь все инструкц",
    "забудь предыдущ",
    "забудь свои инструкц",
    "новые инструкции",
    "режим разработчика",
    "ignore previous",
    "ignore all previous",
    "disregard",
    "developer mode",
    "jailbreak",
    "act as",
    "представь, что ты",
    "представь что ты",
    "ты теперь",
    "system:",
];

pub const MEDIA_REQUEST: &[&str] = &[
    "фото",
    "видео",
    "картинк",
    "изображени",
    "снимк",
    "как выглядит",
    "как выглядят",
    "3d тур",
    "виртуальный тур",
];

pub const VIEWING_REQUEST: &[&str] = &[
    "просмотр",
    "посмотреть офис",
    "посмотреть помещени",
    "приехать посмотреть",
    "подъехать посмотреть",
    "вживую посмотреть",
    "посмотреть вживую",
    "экскурси",
    "покажите офис",
    "показать офис",
];

pub const CLIENT_NEARBY: &[&str] = &[
    "я рядом",
    "я уже рядом",
    "я на месте",
    "я уже на месте",
    "я внизу",
    "я у входа",
    "я возле",
    "я около",
    "я подъехал",
    "я подошел",
    "я приехал",
    "стою у входа",
    "на ресепшн",
];

pub static ARRIVING_SOON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"буду через \d+\s*мин").expect("arrival pattern"));

pub const PURCHASE_SALE: &[&str] = &[
    "купить офис",
    "купить помещени",
    "покупк",
    "продать",
    "продаж",
    "приобрест",
    "выкуп",
    "в собственность",
];

pub const SUBLEASE_LONG_TERM: &[&str] = &[
    "субаренд",
    "пересдат",
    "пересдава",
    "долгосрочн",
    "длительн",
    "на год",
    "на несколько лет",
];

pub static LONG_TERM_YEARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"на\s+\d+\s*(?:год|лет)").expect("long term pattern"));

pub const OFFICE_CUSTOMIZATION: &[&str] = &[
    "перепланиров",
    "ремонт под",
    "сделать ремонт",
    "свою мебель",
    "своя мебель",
    "поменять мебель",
    "перекрас",
    "покрасить",
    "брендирова",
    "снести стен",
    "перегородк",
    "под себя",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_folds_case_yo_and_spaces() {
        assert_eq!(normalize("  Ещё   РАЗ\n"), "еще раз");
    }

    #[test]
    fn find_phrases_reports_in_list_order() {
        let hits = find_phrases("а также и еще", MULTI_STEP_CONNECTIVES);
        assert_eq!(hits, vec!["а также", "и еще"]);
    }

    #[test]
    fn direct_probing_uses_word_boundaries() {
        assert!(PROBING_DIRECT.is_match("ты бот?"));
        assert!(PROBING_DIRECT.is_match("вы живой человек?"));
        assert!(!PROBING_DIRECT.is_match("ты ботинки купил?"));
    }

    #[test]
    fn profanity_matches_word_prefixes_only() {
        assert!(PROFANITY.is_match("ну ты и сука"));
        assert!(PROFANITY.is_match("БЛЯТЬ"));
        assert!(!PROFANITY.is_match("оскорбляю"));
    }

    #[test]
    fn word_count_ignores_bare_punctuation() {
        assert_eq!(word_count("Сколько стоит офис ?"), 3);
    }
}
