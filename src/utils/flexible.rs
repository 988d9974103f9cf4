//! Lenient deserializers for backend fields whose JSON type drifts between
//! endpoints (numbers sent as strings, booleans sent as 0/1, numeric ids).

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

pub fn id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Loose::deserialize(deserializer)? {
        Loose::String(s) => Ok(s),
        Loose::Int(i) => Ok(i.to_string()),
        Loose::Float(f) if f.fract() == 0.0 => Ok(format!("{}", f as i64)),
        _ => Err(serde::de::Error::custom("expected a string or integer id")),
    }
}

pub fn opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrap(#[serde(deserialize_with = "id")] String);

    Ok(Option::<Wrap>::deserialize(deserializer)?.map(|Wrap(s)| s))
}

pub fn bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Loose::deserialize(deserializer)? {
        Loose::Bool(b) => Ok(b),
        Loose::Int(i) => Ok(i != 0),
        Loose::Float(f) => Ok(f != 0.0),
        Loose::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" | "" => Ok(false),
            _ => Err(serde::de::Error::custom(format!("Invalid boolean string: {}", s))),
        },
    }
}

pub fn opt_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrap(#[serde(deserialize_with = "bool")] bool);

    Ok(Option::<Wrap>::deserialize(deserializer)?.map(|Wrap(b)| b))
}

pub fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Loose>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Loose::Int(i)) => Ok(Some(i as f64)),
        Some(Loose::Float(f)) => Ok(Some(f)),
        Some(Loose::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Loose::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("Invalid number: {}", s))),
        Some(Loose::Bool(_)) => Err(serde::de::Error::custom("expected a number")),
    }
}

pub fn opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match opt_f64(deserializer)? {
        None => Ok(None),
        Some(f) if f.fract() == 0.0 => Ok(Some(f as i64)),
        Some(f) => Err(serde::de::Error::custom(format!("expected a whole number, got {}", f))),
    }
}
