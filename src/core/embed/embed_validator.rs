// Field-by-field validation of an embed draft before it is submitted.
// Only shape rules live here (lengths, URLs, dates). Whether every image has
// been uploaded is checked later by the conversion to wire format.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use reqwest::Url;
use serde_json::{json, Map, Value};
use std::fmt;

use super::embed_models::{EmbedDraft, ImageSource};

/// Counted in UTF-16 code units, like the dashboard form.
pub const DESCRIPTION_MAX_CHARS: usize = 2000;

const URL_SCHEMES: [&str; 3] = ["http", "https", "ftp"];

/// One violated rule, addressed by its path inside the draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

/// Every rule a draft violated, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            path: path.into(),
            message: message.into(),
        });
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[cfg(test)]
    pub fn has_path(&self, path: &str) -> bool {
        self.errors.iter().any(|e| e.path == path)
    }

    /// True if `path` or one of its parents already has an error.
    fn covers(&self, path: &str) -> bool {
        self.errors.iter().any(|e| {
            path == e.path
                || path
                    .strip_prefix(e.path.as_str())
                    .is_some_and(|rest| rest.starts_with('.') || rest.starts_with('['))
        })
    }

    /// Add `other`'s errors, skipping paths that are already reported.
    fn merge(&mut self, other: ValidationErrors) {
        for error in other.errors {
            if !self.covers(&error.path) {
                self.errors.push(error);
            }
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "embed failed validation")?;
        for error in &self.errors {
            write!(f, "\n  {}: {}", error.path, error.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

pub struct EmbedValidator;

impl EmbedValidator {
    /// Check a draft. The draft is never modified.
    pub fn validate(draft: &EmbedDraft) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        if let Some(description) = present(&draft.description) {
            let chars = description.encode_utf16().count();
            if chars > DESCRIPTION_MAX_CHARS {
                errors.push(
                    "description",
                    format!(
                        "must be at most {} characters (got {})",
                        DESCRIPTION_MAX_CHARS, chars
                    ),
                );
            }
        }

        check_url(&mut errors, "url", present(&draft.url));

        if let Some(timestamp) = present(&draft.timestamp) {
            if !is_date(timestamp) {
                errors.push("timestamp", "must be a valid date");
            }
        }

        if let Some(footer) = &draft.footer {
            check_image(&mut errors, "footer.image", footer.image.as_ref());
        }
        check_image(&mut errors, "image", draft.image.as_ref());
        check_image(&mut errors, "thumbnail", draft.thumbnail.as_ref());

        if let Some(author) = &draft.author {
            check_url(&mut errors, "author.url", present(&author.url));
            check_image(&mut errors, "author.image", author.image.as_ref());
        }

        for (i, field) in draft.fields.iter().enumerate() {
            if field.name.is_empty() {
                errors.push(format!("fields[{}].name", i), "is required");
            }
            if field.value.is_empty() {
                errors.push(format!("fields[{}].value", i), "is required");
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate an untyped JSON object, as read from a file or a form.
    ///
    /// Type errors are reported per field. Mistyped members are then set
    /// aside so the remaining rules still run on everything else.
    pub fn validate_json(value: &Value) -> Result<EmbedDraft, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let Some(root) = value.as_object() else {
            errors.push("$", "must be an object");
            return Err(errors);
        };
        let mut root = root.clone();
        check_shape(&mut root, &mut errors);

        let draft = match serde_json::from_value::<EmbedDraft>(Value::Object(root)) {
            Ok(draft) => draft,
            Err(e) => {
                errors.push("$", e.to_string());
                return Err(errors);
            }
        };

        if let Err(rules) = Self::validate(&draft) {
            errors.merge(rules);
        }

        if errors.is_empty() {
            Ok(draft)
        } else {
            Err(errors)
        }
    }
}

// ============================================================================
// TYPE CHECKS ON RAW JSON
// ============================================================================
// Each check reports a mistyped member and removes it (or blanks it, for
// required field entries) so the cleaned object always decodes.

fn check_shape(root: &mut Map<String, Value>, errors: &mut ValidationErrors) {
    for key in ["title", "description", "url", "timestamp"] {
        expect_string(root, key, "", errors);
    }
    expect_color(root, errors);
    expect_image(root, "image", "", errors);
    expect_image(root, "thumbnail", "", errors);

    if let Some(footer) = expect_object(root, "footer", errors) {
        expect_string(footer, "text", "footer", errors);
        expect_image(footer, "image", "footer", errors);
    }
    if let Some(author) = expect_object(root, "author", errors) {
        expect_string(author, "name", "author", errors);
        expect_string(author, "url", "author", errors);
        expect_image(author, "image", "author", errors);
    }

    check_fields(root, errors);
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

fn expect_string(
    map: &mut Map<String, Value>,
    key: &str,
    prefix: &str,
    errors: &mut ValidationErrors,
) {
    match map.get(key) {
        None | Some(Value::String(_)) => {}
        Some(Value::Null) => {
            map.remove(key);
        }
        Some(_) => {
            errors.push(join_path(prefix, key), "must be a string");
            map.remove(key);
        }
    }
}

fn expect_color(map: &mut Map<String, Value>, errors: &mut ValidationErrors) {
    let ok = match map.get("color") {
        None | Some(Value::Null) | Some(Value::String(_)) => true,
        Some(Value::Number(n)) => n.as_u64().is_some_and(|c| u32::try_from(c).is_ok()),
        Some(_) => false,
    };
    if !ok {
        errors.push("color", "must be a colour code or a CSS colour string");
        map.remove("color");
    }
}

fn expect_image(
    map: &mut Map<String, Value>,
    key: &str,
    prefix: &str,
    errors: &mut ValidationErrors,
) {
    let ok = match map.get(key) {
        None | Some(Value::Null) | Some(Value::String(_)) => true,
        Some(Value::Object(file)) => matches!(file.get("file"), Some(Value::String(_))),
        Some(_) => false,
    };
    if !ok {
        errors.push(
            join_path(prefix, key),
            r#"must be a URL or {"file": "<path>"}"#,
        );
        map.remove(key);
    }
}

fn expect_object<'a>(
    map: &'a mut Map<String, Value>,
    key: &str,
    errors: &mut ValidationErrors,
) -> Option<&'a mut Map<String, Value>> {
    let is_object = match map.get(key) {
        None | Some(Value::Null) => return None,
        Some(value) => value.is_object(),
    };
    if !is_object {
        errors.push(key, "must be an object");
        map.remove(key);
        return None;
    }
    map.get_mut(key).and_then(Value::as_object_mut)
}

fn check_fields(root: &mut Map<String, Value>, errors: &mut ValidationErrors) {
    match root.get("fields") {
        None => return,
        Some(Value::Array(_)) => {}
        Some(Value::Null) => {
            root.remove("fields");
            return;
        }
        Some(_) => {
            errors.push("fields", "must be a list");
            root.remove("fields");
            return;
        }
    }
    let Some(Value::Array(entries)) = root.get_mut("fields") else {
        return;
    };

    for (i, entry) in entries.iter_mut().enumerate() {
        let path = format!("fields[{}]", i);
        let Some(field) = entry.as_object_mut() else {
            errors.push(path, "must be an object with a name and a value");
            *entry = json!({ "name": "", "value": "" });
            continue;
        };

        for key in ["name", "value"] {
            let message = match field.get(key) {
                Some(Value::String(_)) => continue,
                None | Some(Value::Null) => "is required",
                Some(_) => "must be a string",
            };
            errors.push(join_path(&path, key), message);
            field.insert(key.to_string(), Value::String(String::new()));
        }

        if matches!(field.get("inline"), Some(v) if !v.is_boolean() && !v.is_null()) {
            errors.push(join_path(&path, "inline"), "must be true or false");
            field.remove("inline");
        }
    }
}

/// Forms submit empty inputs as "", which counts as absent.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn check_url(errors: &mut ValidationErrors, path: &str, value: Option<&str>) {
    if let Some(value) = value {
        if !is_url(value) {
            errors.push(path, "must be a valid URL");
        }
    }
}

fn check_image(errors: &mut ValidationErrors, path: &str, image: Option<&ImageSource>) {
    let url = image.and_then(ImageSource::as_url).filter(|u| !u.is_empty());
    check_url(errors, path, url);
}

pub fn is_url(value: &str) -> bool {
    match Url::parse(value) {
        Ok(url) => URL_SCHEMES.contains(&url.scheme()) && url.has_host(),
        Err(_) => false,
    }
}

fn is_date(value: &str) -> bool {
    DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}
