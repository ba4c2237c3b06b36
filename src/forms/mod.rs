//! Typed request payloads and their conversion into domain values.

use std::collections::BTreeMap;

use validator::ValidationErrors;

pub mod cart;
pub mod catalog;
pub mod categories;
pub mod products;

/// Field name to human-readable messages, returned to clients on validation
/// failures.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Field-level messages for a single offending field.
pub fn field_error(field: &str, message: impl Into<String>) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.insert(field.to_string(), vec![message.into()]);
    errors
}

/// Flatten `validator` errors into field-level messages.
pub fn validation_field_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errors)| {
            let messages = errors
                .iter()
                .map(|error| match &error.message {
                    Some(message) => message.to_string(),
                    None => format!("invalid value ({})", error.code),
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

/// Collapse runs of whitespace into single spaces and drop control characters.
pub(crate) fn sanitize_inline_text(input: &str) -> String {
    let mut sanitized = String::with_capacity(input.len());
    let mut previous_whitespace = false;

    for ch in input.trim().chars() {
        if ch.is_whitespace() {
            if !previous_whitespace {
                sanitized.push(' ');
                previous_whitespace = true;
            }
        } else if ch.is_control() {
            continue;
        } else {
            sanitized.push(ch);
            previous_whitespace = false;
        }
    }

    sanitized
}

/// Sanitize every line, trim blank lines at both ends and keep at most one
/// blank line between paragraphs.
pub(crate) fn sanitize_multiline_text(input: &str) -> String {
    let mut lines: Vec<String> = input.lines().map(sanitize_inline_text).collect();

    while matches!(lines.first(), Some(line) if line.is_empty()) {
        lines.remove(0);
    }

    while matches!(lines.last(), Some(line) if line.is_empty()) {
        lines.pop();
    }

    let mut result = Vec::with_capacity(lines.len());
    let mut previous_empty = false;
    for line in lines {
        let is_empty = line.is_empty();
        if is_empty && previous_empty {
            continue;
        }
        previous_empty = is_empty;
        result.push(line);
    }

    result.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "This field may not be blank."))]
        name: String,
        #[validate(range(min = 1))]
        quantity: i64,
    }

    #[test]
    fn inline_text_collapses_whitespace() {
        assert_eq!(sanitize_inline_text("  Smart \t phone\u{7}  "), "Smart phone");
    }

    #[test]
    fn multiline_text_keeps_single_blank_line() {
        assert_eq!(
            sanitize_multiline_text("\n\n First  line\n\n\n\nSecond line \n\n"),
            "First line\n\nSecond line"
        );
    }

    #[test]
    fn validation_errors_are_keyed_by_field() {
        let sample = Sample {
            name: String::new(),
            quantity: 0,
        };

        let errors = sample.validate().expect_err("expected validation failure");
        let fields = validation_field_errors(&errors);

        assert_eq!(
            fields.get("name"),
            Some(&vec!["This field may not be blank.".to_string()])
        );
        assert_eq!(
            fields.get("quantity"),
            Some(&vec!["invalid value (range)".to_string()])
        );
    }
}
