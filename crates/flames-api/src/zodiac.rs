use std::fmt;

use axum::{Json, response::IntoResponse};

use flames_types::api::{ZodiacRequest, ZodiacResponse};

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element {
    Fire,
    Earth,
    Air,
    Water,
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Element::Fire => "Fire",
            Element::Earth => "Earth",
            Element::Air => "Air",
            Element::Water => "Water",
        };
        f.write_str(name)
    }
}

const SIGNS: [(&str, Element); 12] = [
    ("Aries", Element::Fire),
    ("Taurus", Element::Earth),
    ("Gemini", Element::Air),
    ("Cancer", Element::Water),
    ("Leo", Element::Fire),
    ("Virgo", Element::Earth),
    ("Libra", Element::Air),
    ("Scorpio", Element::Water),
    ("Sagittarius", Element::Fire),
    ("Capricorn", Element::Earth),
    ("Aquarius", Element::Air),
    ("Pisces", Element::Water),
];

/// Canonical sign name and its element, matched case-insensitively.
pub fn lookup_sign(sign: &str) -> Option<(&'static str, Element)> {
    let sign = sign.trim();
    SIGNS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(sign))
        .copied()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compatibility {
    pub score: u8,
    pub vibe: &'static str,
    pub insight: String,
}

/// Element-pair reading. Symmetric in its arguments.
pub fn element_compatibility(a: Element, b: Element) -> Compatibility {
    use Element::*;

    let (score, vibe, insight) = match (a, b) {
        (Fire, Fire) | (Earth, Earth) | (Air, Air) | (Water, Water) => (
            90,
            "Kindred Spirits",
            format!("Two {} signs speak the same language and understand each other without trying.", a),
        ),
        (Fire, Air) | (Air, Fire) => (
            85,
            "Electric Chemistry",
            "Air feeds Fire: ideas turn into adventures when you two get going.".to_string(),
        ),
        (Earth, Water) | (Water, Earth) => (
            85,
            "Deep Roots",
            "Water nourishes Earth: a steady, caring bond that grows stronger with time.".to_string(),
        ),
        (Fire, Earth) | (Earth, Fire) => (
            50,
            "Slow Burn",
            "Fire wants to leap while Earth wants to plan; patience turns friction into warmth.".to_string(),
        ),
        (Air, Water) | (Water, Air) => (
            50,
            "Mixed Signals",
            "Air thinks and Water feels, so talking things through is what bridges the gap.".to_string(),
        ),
        (Earth, Air) | (Air, Earth) => (
            45,
            "Grounded Dreamers",
            "Earth keeps Air's head out of the clouds, and Air keeps Earth from standing still.".to_string(),
        ),
        (Fire, Water) | (Water, Fire) => (
            40,
            "Steam Heat",
            "Fire and Water make steam: intense and passionate, sometimes overwhelming.".to_string(),
        ),
    };

    Compatibility {
        score,
        vibe,
        insight,
    }
}

/// POST /zodiac-check
pub async fn zodiac_check(Json(req): Json<ZodiacRequest>) -> Result<impl IntoResponse, ApiError> {
    let (sign1, element1) = lookup_sign(&req.sign1)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown zodiac sign: {}", req.sign1)))?;
    let (sign2, element2) = lookup_sign(&req.sign2)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown zodiac sign: {}", req.sign2)))?;

    let reading = element_compatibility(element1, element2);
    Ok(Json(ZodiacResponse {
        sign1: sign1.to_string(),
        element1: element1.to_string(),
        sign2: sign2.to_string(),
        element2: element2.to_string(),
        score: reading.score,
        vibe: reading.vibe.to_string(),
        insight: reading.insight,
    }))
}
