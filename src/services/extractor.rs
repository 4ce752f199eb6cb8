use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::domain::FieldMap;

const ABOUT_MAX_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    #[error("NoDataFound: page yielded no profile fields")]
    NoDataFound,
}

/// A rule set turning page content into profile fields. A map with at least
/// one populated field is a success; none at all is `NoDataFound`.
pub trait FieldExtractor: Send + Sync {
    fn extract(&self, content: &str) -> Result<FieldMap, ExtractionError>;
}

static H1: Lazy<Selector> = Lazy::new(|| selector("h1"));
static H2: Lazy<Selector> = Lazy::new(|| selector("h2"));
static LABELS: Lazy<Selector> = Lazy::new(|| selector("dt, label, span, div"));
static ABOUT_BLOCKS: Lazy<Selector> = Lazy::new(|| selector("section, div"));
static CONTACT_BLOCKS: Lazy<Selector> = Lazy::new(|| selector("section, div, footer"));

static NAME_CLASS: Lazy<Regex> = Lazy::new(|| regex(r"(?i)name|title"));
static LABEL_CLASS: Lazy<Regex> = Lazy::new(|| regex(r"(?i)label|key|field"));
static ABOUT_CLASS: Lazy<Regex> = Lazy::new(|| regex(r"(?i)about|description|overview"));
static CONTACT_CLASS: Lazy<Regex> = Lazy::new(|| regex(r"(?i)contact|footer|address"));
static EMAIL: Lazy<Regex> =
    Lazy::new(|| regex(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b"));
static PHONE: Lazy<Regex> = Lazy::new(|| {
    regex(
        r"\+91[\s-]?\d{10}|\(\d{3}\)[\s-]?\d{3}[\s-]?\d{4}|\b\d{3}[\s-]\d{3}[\s-]\d{4}\b|\b\d{10}\b",
    )
});
static DOMAIN: Lazy<Regex> = Lazy::new(|| regex(r"^(?i:https?://)?(?i:www\.)?([^/\s?#]+)"));
static CITY_REGION: Lazy<Regex> =
    Lazy::new(|| regex(r"[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*,\s*[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector must parse")
}

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static regex must compile")
}

/// Extracts startup profile pages: headline name, labelled values, contact
/// details found anywhere in the text, and company blurbs.
#[derive(Debug, Default, Clone, Copy)]
pub struct StartupProfileExtractor;

impl FieldExtractor for StartupProfileExtractor {
    fn extract(&self, content: &str) -> Result<FieldMap, ExtractionError> {
        let html = Html::parse_document(content);
        let mut fields = FieldMap::default();

        if let Some(name) = extract_name(&html) {
            fields.fill("name", &name);
        }

        for label in html.select(&LABELS) {
            let Some((key, value)) = labelled_value(label) else {
                continue;
            };
            fields.fill(key, &value);
        }

        let text = visible_text(&html);

        if fields.email.is_none() {
            if let Some(email) = EMAIL.find(&text) {
                fields.fill("email", email.as_str());
            }
        }

        if fields.contact_number.is_none() && fields.mobile_number.is_none() {
            let mut phones = extract_phone_numbers(&text).into_iter();
            if let Some(contact) = phones.next() {
                fields.fill("contact_number", &contact);
            }
            if let Some(mobile) = phones.next() {
                fields.fill("mobile_number", &mobile);
            }
        }

        if let Some(domain) = fields.website.as_deref().and_then(extract_domain) {
            fields.fill("domain", &domain);
        }

        if let Some(about) = extract_about(&html) {
            fields.fill("about_company", &about);
        }

        if fields.location.is_none() {
            if let Some(location) = extract_location(&html) {
                fields.fill("location", &location);
            }
        }

        match fields.is_empty() {
            true => Err(ExtractionError::NoDataFound),
            false => {
                log::info!("Extracted {} profile fields", fields.populated());
                Ok(fields)
            }
        }
    }
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<&str>>().join(" ")
}

fn element_text(element: ElementRef) -> String {
    collapse(&element.text().collect::<Vec<&str>>().join(" "))
}

fn has_class(element: ElementRef, pattern: &Regex) -> bool {
    element
        .value()
        .attr("class")
        .is_some_and(|class| pattern.is_match(class))
}

fn extract_name(html: &Html) -> Option<String> {
    html.select(&H1)
        .map(element_text)
        .find(|t| !t.is_empty())
        .or_else(|| {
            html.select(&H2)
                .filter(|h2| has_class(*h2, &NAME_CLASS))
                .map(element_text)
                .find(|t| !t.is_empty())
        })
}

/// Maps a label caption to the field it introduces.
fn field_for_label(label: &str) -> Option<&'static str> {
    let has = |words: &[&str]| words.iter().any(|w| label.contains(w));

    if has(&["website", "url"]) {
        Some("website")
    } else if has(&["email"]) {
        Some("email")
    } else if has(&["mobile"]) {
        Some("mobile_number")
    } else if has(&["phone", "contact"]) {
        Some("contact_number")
    } else if has(&["stage"]) {
        Some("stage")
    } else if has(&["industry"]) {
        Some("focus_industry")
    } else if has(&["sector"]) {
        Some("focus_sector")
    } else if has(&["service"]) {
        Some("service_area")
    } else if has(&["portal"]) {
        Some("active_on_portal")
    } else if has(&["engagement"]) {
        Some("engagement_level")
    } else if has(&["year", "active"]) {
        Some("active_years")
    } else if has(&["location", "address", "city"]) {
        Some("location")
    } else {
        None
    }
}

/// Reads a `<dt class="label">Stage</dt><dd>Seed</dd>` style pair. Only leaf
/// elements qualify as labels, so wrappers around a whole pair are skipped.
///
/// The value is the label's next sibling element. When the label is wrapped
/// on its own, it is the first `dd` after the wrapper, then the first `span`
/// after the label.
fn labelled_value(label: ElementRef) -> Option<(&'static str, String)> {
    if !has_class(label, &LABEL_CLASS) || label.children().any(|c| c.value().is_element()) {
        return None;
    }

    let key = field_for_label(&element_text(label).to_lowercase())?;
    let value = label
        .next_siblings()
        .find_map(ElementRef::wrap)
        .or_else(|| {
            label
                .parent()
                .and_then(ElementRef::wrap)
                .and_then(|wrapper| find_next(wrapper, "dd"))
        })
        .or_else(|| find_next(label, "span"))
        .map(element_text)
        .filter(|v| !v.is_empty())?;

    Some((key, value))
}

/// First element called `name` after `from` in document order, its own
/// descendants included.
fn find_next<'a>(from: ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    from.tree()
        .root()
        .descendants()
        .skip_while(|node| node.id() != from.id())
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|element| element.value().name() == name)
}

fn visible_text(html: &Html) -> String {
    let pieces: Vec<&str> = html
        .root_element()
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let parent = node.parent().and_then(ElementRef::wrap)?;
            match parent.value().name() {
                "script" | "style" | "noscript" => None,
                _ => Some(&**text),
            }
        })
        .collect();

    collapse(&pieces.join(" "))
}

/// Phone numbers in document order, skipping repeats of the same digits.
fn extract_phone_numbers(text: &str) -> Vec<String> {
    let mut seen: Vec<String> = vec![];
    let mut phones = vec![];

    for found in PHONE.find_iter(text) {
        let digits: String = found.as_str().chars().filter(char::is_ascii_digit).collect();
        let last_ten = &digits[digits.len().saturating_sub(10)..];
        if seen.iter().any(|d| d == last_ten) {
            continue;
        }
        seen.push(last_ten.to_string());
        phones.push(found.as_str().to_string());
    }

    phones
}

pub fn extract_domain(website: &str) -> Option<String> {
    DOMAIN
        .captures(website.trim())
        .and_then(|caps| caps.get(1))
        .map(|host| host.as_str().to_lowercase())
        .filter(|host| !host.is_empty())
}

fn extract_about(html: &Html) -> Option<String> {
    html.select(&ABOUT_BLOCKS)
        .filter(|block| has_class(*block, &ABOUT_CLASS))
        .map(element_text)
        .find(|t| !t.is_empty())
        .map(|about| about.chars().take(ABOUT_MAX_CHARS).collect())
}

fn extract_location(html: &Html) -> Option<String> {
    html.select(&CONTACT_BLOCKS)
        .filter(|block| has_class(*block, &CONTACT_CLASS))
        .find_map(|block| {
            CITY_REGION
                .find(&element_text(block))
                .map(|m| m.as_str().to_string())
        })
}
