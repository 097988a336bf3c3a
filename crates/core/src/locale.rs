use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    #[default]
    En,
    Uk,
    Ru,
}

/// Every user-facing reply the bot can produce.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Message {
    SomethingWentWrong { detail: Option<String> },
    CancelSelection,
    VariantCountRange { low: usize, high: usize },
    PlaceCountRange { low: usize, high: usize },
    TotalPlacesCeiling { value: usize },
    SeparatorInText,
    AlreadySelected,
    NoFreePlaces,
    NothingSelected,
    Ok,
    Help,
}

impl Locale {
    /// Picks a locale from a language tag such as `uk-UA`, falling back to `default`.
    pub fn from_language_code(code: Option<&str>, default: Locale) -> Locale {
        code.and_then(|code| code.split(['-', '_']).next())
            .and_then(|language| language.parse().ok())
            .unwrap_or(default)
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Uk => "uk",
            Self::Ru => "ru",
        }
    }

    pub fn render(&self, message: &Message) -> String {
        let translated = match self {
            Self::En => None,
            Self::Uk => ukrainian(message),
            Self::Ru => russian(message),
        };
        translated.unwrap_or_else(|| english(message))
    }
}

impl std::str::FromStr for Locale {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "uk" => Ok(Self::Uk),
            "ru" => Ok(Self::Ru),
            other => Err(ConfigError::Validation(format!(
                "unsupported locale `{other}` (expected en|uk|ru)"
            ))),
        }
    }
}

fn english(message: &Message) -> String {
    match message {
        Message::SomethingWentWrong { detail } => {
            format!(":( {}", detail.as_deref().unwrap_or("Something went wrong..."))
        }
        Message::CancelSelection => "Cancel selection".to_owned(),
        Message::VariantCountRange { low, high } => {
            format!("Count of the variants should be between {low} and {high}.")
        }
        Message::PlaceCountRange { low, high } => {
            format!("Count of places in every variant should be between {low} and {high}.")
        }
        Message::TotalPlacesCeiling { value } => format!(
            "Count of the variants (a) and the places (b) should not be too high (a * b <= {value})."
        ),
        Message::SeparatorInText => {
            "The caption and the description may not contain a line of dashes.".to_owned()
        }
        Message::AlreadySelected => "You have already selected one of the variants.".to_owned(),
        Message::NoFreePlaces => "This variant has no free places.".to_owned(),
        Message::NothingSelected => "You have not selected any variant.".to_owned(),
        Message::Ok => "xD Ok".to_owned(),
        Message::Help => "*Usage*\n• `/select <count>[x<places>] [caption]` posts a sign-up sheet; \
             lines after the caption become its description\n• `/variants <count>+<offset>[/<limit>]` \
             prints a rotation table"
            .to_owned(),
    }
}

fn ukrainian(message: &Message) -> Option<String> {
    let text = match message {
        Message::SomethingWentWrong { detail } => {
            format!(":( {}", detail.as_deref().unwrap_or("Щось пішло не так..."))
        }
        Message::CancelSelection => "Скасувати вибір".to_owned(),
        Message::VariantCountRange { low, high } => {
            format!("Кількість варіантів вибору повинна бути в межах від {low} до {high}.")
        }
        Message::PlaceCountRange { low, high } => {
            format!("Кількість місць в варіанті вибору повинна бути в межах від {low} до {high}.")
        }
        Message::TotalPlacesCeiling { value } => format!(
            "Кількість варіантів (a) та місць (b) не повинна бути занадто великою (a * b <= {value})."
        ),
        Message::AlreadySelected => "Ви вже вибрали один із варіантів.".to_owned(),
        Message::NoFreePlaces => "В цьому варіанті більше немає вільних місць.".to_owned(),
        Message::NothingSelected => "Ви не вибрали жоден із варіантів.".to_owned(),
        Message::Ok => ":D Ok".to_owned(),
        Message::SeparatorInText | Message::Help => return None,
    };
    Some(text)
}

fn russian(message: &Message) -> Option<String> {
    let text = match message {
        Message::SomethingWentWrong { detail } => {
            format!(":( {}", detail.as_deref().unwrap_or("Что-то пошло не так..."))
        }
        Message::CancelSelection => "Отменить выбор".to_owned(),
        Message::VariantCountRange { low, high } => {
            format!("Количество вариантов выбора должно находится между {low} и {high}.")
        }
        Message::PlaceCountRange { low, high } => format!(
            "Количество мест в каждом варианте выбора должно находиться между {low} и {high}."
        ),
        Message::TotalPlacesCeiling { value } => format!(
            "Количество вариантов (a) и мест (b) не должно быть слишком большим (a * b <= {value})."
        ),
        Message::AlreadySelected => "Вы уже выбрали один из вариантов.".to_owned(),
        Message::NoFreePlaces => "В этом варианте больше нет свободных мест.".to_owned(),
        Message::NothingSelected => "Вы не выбрали ни один из вариантов.".to_owned(),
        Message::Ok => "%) Ok".to_owned(),
        Message::SeparatorInText | Message::Help => return None,
    };
    Some(text)
}
