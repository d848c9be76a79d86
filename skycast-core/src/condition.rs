//! Weather-code categories and the strategies that turn them into icons.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

/// Display category of a WMO weather code.
///
/// See: https://open-meteo.com/en/docs#weathervariables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCategory {
    Clear,
    Cloudy,
    FogWind,
    Rain,
    Snow,
    Storm,
    /// A code outside the mapped vocabulary, kept for diagnostics.
    Unknown(i32),
}

impl WeatherCategory {
    /// Total over `i32`: unmapped codes become [`WeatherCategory::Unknown`].
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Clear,
            1..=3 => Self::Cloudy,
            45 | 48 => Self::FogWind,
            51 | 53 | 55 | 61 | 63 | 65 => Self::Rain,
            71 | 73 | 75 | 85 | 86 => Self::Snow,
            95 | 96 | 99 => Self::Storm,
            other => Self::Unknown(other),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "Sunny",
            Self::Cloudy => "Cloudy",
            Self::FogWind => "Windy",
            Self::Rain => "Rainy",
            Self::Snow => "Snowy",
            Self::Storm => "Stormy",
            Self::Unknown(_) => "Unknown",
        }
    }
}

/// How a category is drawn on screen.
pub trait IconRenderer: Send + Sync + Debug {
    fn render_icon(&self, category: WeatherCategory) -> String;
}

/// Named image assets with their alt text, e.g. `[sun.png Sunny]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageIcons;

impl ImageIcons {
    fn asset(category: WeatherCategory) -> &'static str {
        match category {
            WeatherCategory::Clear => "sun.png",
            WeatherCategory::Cloudy => "cloudy.png",
            WeatherCategory::FogWind => "wind.png",
            WeatherCategory::Rain => "cloudy-rain.png",
            WeatherCategory::Snow => "snowy.png",
            WeatherCategory::Storm => "storm.png",
            WeatherCategory::Unknown(_) => "",
        }
    }
}

impl IconRenderer for ImageIcons {
    fn render_icon(&self, category: WeatherCategory) -> String {
        if let WeatherCategory::Unknown(code) = category {
            return unknown_code(code);
        }
        format!("[{} {}]", Self::asset(category), category.description())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EmojiIcons;

impl IconRenderer for EmojiIcons {
    fn render_icon(&self, category: WeatherCategory) -> String {
        let emoji = match category {
            WeatherCategory::Clear => "☀️",
            WeatherCategory::Cloudy => "☁️",
            WeatherCategory::FogWind => "🌬️",
            WeatherCategory::Rain => "🌧️",
            WeatherCategory::Snow => "❄️",
            WeatherCategory::Storm => "⛈️",
            WeatherCategory::Unknown(code) => return unknown_code(code),
        };
        emoji.to_string()
    }
}

fn unknown_code(code: i32) -> String {
    format!("{code}--")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IconStyle {
    #[default]
    Image,
    Emoji,
}

impl IconStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            IconStyle::Image => "image",
            IconStyle::Emoji => "emoji",
        }
    }

    pub const fn all() -> &'static [IconStyle] {
        &[IconStyle::Image, IconStyle::Emoji]
    }

    pub fn renderer(&self) -> Box<dyn IconRenderer> {
        match self {
            IconStyle::Image => Box::new(ImageIcons),
            IconStyle::Emoji => Box::new(EmojiIcons),
        }
    }
}

impl std::fmt::Display for IconStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for IconStyle {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "image" => Ok(IconStyle::Image),
            "emoji" => Ok(IconStyle::Emoji),
            _ => Err(anyhow::anyhow!(
                "Unknown icon style '{value}'. Supported styles: image, emoji."
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAPPED: [(i32, WeatherCategory); 20] = [
        (0, WeatherCategory::Clear),
        (1, WeatherCategory::Cloudy),
        (2, WeatherCategory::Cloudy),
        (3, WeatherCategory::Cloudy),
        (45, WeatherCategory::FogWind),
        (48, WeatherCategory::FogWind),
        (51, WeatherCategory::Rain),
        (53, WeatherCategory::Rain),
        (55, WeatherCategory::Rain),
        (61, WeatherCategory::Rain),
        (63, WeatherCategory::Rain),
        (65, WeatherCategory::Rain),
        (71, WeatherCategory::Snow),
        (73, WeatherCategory::Snow),
        (75, WeatherCategory::Snow),
        (85, WeatherCategory::Snow),
        (86, WeatherCategory::Snow),
        (95, WeatherCategory::Storm),
        (96, WeatherCategory::Storm),
        (99, WeatherCategory::Storm),
    ];

    #[test]
    fn mapped_codes_have_stable_categories() {
        for (code, expected) in MAPPED {
            assert_eq!(WeatherCategory::from_code(code), expected, "code {code}");
        }
    }

    #[test]
    fn unmapped_codes_fall_back_to_raw_code() {
        for code in [-1, 4, 44, 56, 66, 77, 80, 82, 100, i32::MAX, i32::MIN] {
            assert_eq!(WeatherCategory::from_code(code), WeatherCategory::Unknown(code));
        }
    }

    #[test]
    fn both_renderers_surface_unknown_code() {
        let unknown = WeatherCategory::from_code(77);
        assert_eq!(ImageIcons.render_icon(unknown), "77--");
        assert_eq!(EmojiIcons.render_icon(unknown), "77--");
    }

    #[test]
    fn image_icons_name_asset_and_alt_text() {
        assert_eq!(ImageIcons.render_icon(WeatherCategory::Clear), "[sun.png Sunny]");
        assert_eq!(ImageIcons.render_icon(WeatherCategory::Storm), "[storm.png Stormy]");
    }

    #[test]
    fn emoji_icons_render_known_categories() {
        assert_eq!(EmojiIcons.render_icon(WeatherCategory::Snow), "❄️");
        assert_eq!(EmojiIcons.render_icon(WeatherCategory::Rain), "🌧️");
    }

    #[test]
    fn icon_style_as_str_roundtrip() {
        for style in IconStyle::all() {
            let parsed = IconStyle::try_from(style.as_str()).expect("roundtrip should succeed");
            assert_eq!(*style, parsed);
        }
        assert!(IconStyle::try_from("ascii").is_err());
    }
}
