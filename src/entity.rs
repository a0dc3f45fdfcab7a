use std::borrow::Cow;

use crate::error::Error;

/// A piece of character data: literal text, or a reference to an entity
/// that is not predefined and stays unexpanded.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Content<'a> {
    Text(Cow<'a, str>),
    EntityRef(String),
}

fn predefined(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "apos" => Some('\''),
        "gt" => Some('>'),
        "lt" => Some('<'),
        "quot" => Some('"'),
        _ => None,
    }
}

fn char_reference(entity: &str) -> Option<char> {
    let digits = entity.strip_prefix('#')?;
    let code = if let Some(hex) = digits.strip_prefix('x') {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        digits.parse::<u32>().ok()?
    };
    char::from_u32(code)
}

// the entity name after `&`, up to and excluding `;`
fn take_entity(chars: &mut std::str::Chars) -> Result<String, Error> {
    let mut entity = String::new();
    for c in chars.by_ref() {
        if c == ';' {
            return Ok(entity);
        }
        entity.push(c);
    }
    Err(Error::UnclosedEntity(entity))
}

/// Expand the predefined entities and character references in text
/// content. Other entities become [`Content::EntityRef`] pieces.
pub(crate) fn parse_text_content(content: &str) -> Result<Vec<Content>, Error> {
    if !content.contains('&') {
        return Ok(vec![Content::Text(content.into())]);
    }
    let mut result = Vec::new();
    let mut text = String::new();
    let mut chars = content.chars();
    while let Some(c) = chars.next() {
        if c != '&' {
            text.push(c);
            continue;
        }
        let entity = take_entity(&mut chars)?;
        if let Some(c) = predefined(&entity).or_else(|| char_reference(&entity)) {
            text.push(c);
        } else if entity.starts_with('#') {
            return Err(Error::InvalidEntity(entity));
        } else {
            if !text.is_empty() {
                result.push(Content::Text(std::mem::take(&mut text).into()));
            }
            result.push(Content::EntityRef(entity));
        }
    }
    if !text.is_empty() {
        result.push(Content::Text(text.into()));
    }
    Ok(result)
}

/// Expand the predefined entities and character references in an
/// attribute value. Any other entity is an error.
pub(crate) fn parse_attribute(content: Cow<str>) -> Result<Cow<str>, Error> {
    if !content.contains('&') {
        return Ok(content);
    }
    let mut result = String::new();
    let mut chars = content.chars();
    while let Some(c) = chars.next() {
        if c == '&' {
            let entity = take_entity(&mut chars)?;
            match predefined(&entity).or_else(|| char_reference(&entity)) {
                Some(c) => result.push(c),
                None => return Err(Error::InvalidEntity(entity)),
            }
        } else {
            result.push(c);
        }
    }
    Ok(result.into())
}

fn escape<'a>(content: &'a str, needs_escape: impl Fn(char) -> Option<&'static str>) -> Cow<'a, str> {
    if !content.chars().any(|c| needs_escape(c).is_some()) {
        return content.into();
    }
    let mut result = String::with_capacity(content.len() + 8);
    for c in content.chars() {
        match needs_escape(c) {
            Some(escaped) => result.push_str(escaped),
            None => result.push(c),
        }
    }
    result.into()
}

/// Escape text content.
pub(crate) fn serialize_text(content: &str) -> Cow<str> {
    escape(content, |c| match c {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        _ => None,
    })
}

/// Escape an attribute value for use between double quotes.
pub(crate) fn serialize_attribute(content: &str) -> Cow<str> {
    escape(content, |c| match c {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '"' => Some("&quot;"),
        '\n' => Some("&#10;"),
        '\r' => Some("&#13;"),
        '\t' => Some("&#9;"),
        _ => None,
    })
}

/// CDATA cannot contain `]]>`; split the section around it.
pub(crate) fn serialize_cdata(content: &str) -> String {
    format!("<![CDATA[{}]]>", content.replace("]]>", "]]]]><![CDATA[>"))
}
