//! Visual styles and the mood/season selections offered to users
//!
//! Each selection is a closed enum that resolves to the text fragment used in
//! prompt composition. Unknown ids are rejected rather than defaulted.

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Fixed set of visual styles, one image is generated per style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageStyle {
    Minimalist,
    Photorealistic,
    Animated,
}

impl ImageStyle {
    /// Styles in the order their images appear in a response.
    pub const ALL: [ImageStyle; 3] = [
        ImageStyle::Minimalist,
        ImageStyle::Photorealistic,
        ImageStyle::Animated,
    ];

    pub fn descriptor(&self) -> &'static str {
        match self {
            ImageStyle::Minimalist => {
                "Minimalist illustration style with pastel tones, featuring a simple and clean composition with soft shading"
            }
            ImageStyle::Photorealistic => {
                "Highly detailed and realistic photographic style, a high-resolution image with vivid realism and fine detail"
            }
            ImageStyle::Animated => {
                "Animation style with bright and vibrant colors, presenting characters and background in a simplified form"
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ImageStyle::Minimalist => "minimalist",
            ImageStyle::Photorealistic => "photorealistic",
            ImageStyle::Animated => "animated",
        }
    }
}

impl fmt::Display for ImageStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mood {
    Joyful,
    Calm,
    Romantic,
    Festive,
    Grateful,
    Elegant,
}

impl Mood {
    pub fn describe(&self) -> &'static str {
        match self {
            Mood::Joyful => "joyful and cheerful, with a bright and uplifting atmosphere",
            Mood::Calm => "calm and peaceful, with a quiet and relaxed atmosphere",
            Mood::Romantic => "romantic and tender, with a warm and affectionate atmosphere",
            Mood::Festive => "festive and lively, with a celebratory atmosphere",
            Mood::Grateful => "grateful and heartfelt, with a gentle and sincere atmosphere",
            Mood::Elegant => "elegant and refined, with a sophisticated and graceful atmosphere",
        }
    }
}

impl FromStr for Mood {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "JOYFUL" => Ok(Mood::Joyful),
            "CALM" => Ok(Mood::Calm),
            "ROMANTIC" => Ok(Mood::Romantic),
            "FESTIVE" => Ok(Mood::Festive),
            "GRATEFUL" => Ok(Mood::Grateful),
            "ELEGANT" => Ok(Mood::Elegant),
            _ => Err(Error::Validation(format!("Unknown mood id '{}'", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub fn describe(&self) -> &'static str {
        match self {
            Season::Spring => "spring, with fresh light greens and soft blossom pinks",
            Season::Summer => "summer, with clear sky blues and sunny warm yellows",
            Season::Autumn => "autumn, with warm oranges and deep maple reds",
            Season::Winter => "winter, with snowy whites and cool icy blues",
        }
    }
}

impl FromStr for Season {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SPRING" => Ok(Season::Spring),
            "SUMMER" => Ok(Season::Summer),
            "AUTUMN" | "FALL" => Ok(Season::Autumn),
            "WINTER" => Ok(Season::Winter),
            _ => Err(Error::Validation(format!("Unknown season id '{}'", s))),
        }
    }
}
