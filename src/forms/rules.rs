// forms/rules.rs - Field rules shared by the form schemas

use chrono::{Local, NaiveDate};

use super::FieldErrors;

/// Date format used for every stored date field
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

pub fn required_text(errors: &mut FieldErrors, field: &str, label: &str, value: &str, min_len: usize) {
    let len = value.trim().chars().count();
    if len == 0 {
        errors.add(field, format!("{} is required", label));
    } else if len < min_len {
        errors.add(field, format!("{} must be at least {} characters", label, min_len));
    }
}

/// Blank is fine; anything entered must meet the minimum
pub fn optional_text(errors: &mut FieldErrors, field: &str, label: &str, value: &str, min_len: usize) {
    if !value.trim().is_empty() {
        required_text(errors, field, label, value, min_len);
    }
}

pub fn required_choice<T>(errors: &mut FieldErrors, field: &str, label: &str, value: &Option<T>) {
    if value.is_none() {
        errors.add(field, format!("Please select a {}", label));
    }
}

pub fn is_email(value: &str) -> bool {
    let value = value.trim();
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.starts_with('.')
                && domain.contains('.')
                && !domain.ends_with('.')
                && !value.contains(char::is_whitespace)
        }
        None => false,
    }
}

pub fn required_email(errors: &mut FieldErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, "Email is required");
    } else if !is_email(value) {
        errors.add(field, "Please enter a valid email address");
    }
}

pub fn optional_email(errors: &mut FieldErrors, field: &str, value: &str) {
    if !value.trim().is_empty() && !is_email(value) {
        errors.add(field, "Please enter a valid email address");
    }
}

pub fn optional_phone(errors: &mut FieldErrors, field: &str, value: &str) {
    let value = value.trim();
    if value.is_empty() {
        return;
    }
    let digits = value.chars().filter(char::is_ascii_digit).count();
    let allowed = value
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')' | '.'));
    if !allowed || digits < 7 {
        errors.add(field, "Please enter a valid phone number");
    }
}

pub fn past_date(errors: &mut FieldErrors, field: &str, label: &str, value: Option<NaiveDate>) {
    if let Some(date) = value {
        if date >= Local::now().date_naive() {
            errors.add(field, format!("{} must be in the past", label));
        }
    }
}
