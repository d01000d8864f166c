//! Category-key normalization.
//!
//! Tables originating from differently-worded export headers must converge
//! on the same key: "App - Usage Time" on the phone and "App  - Usage Time"
//! in a later export both become `app_usage_time`, and the phone-model
//! suffix in a device label maps to its generic alias so that
//! `...moto g(6) plus` and a plain `motorola` row land in the same table.

use std::collections::BTreeMap;

/// Normalize a sheet name into a key fragment: lower-case, dashes dropped,
/// whitespace runs collapsed to single underscores.
pub fn sheet_token(sheet_name: &str) -> String {
    let lowered = sheet_name.to_lowercase().replace('-', " ");
    let mut token = String::with_capacity(lowered.len());
    for part in lowered.split_whitespace() {
        if !token.is_empty() {
            token.push('_');
        }
        token.push_str(part);
    }
    token
}

/// Reduce a raw device label to its identifying token: the last
/// whitespace-separated word, lower-cased, with vocabulary aliases applied.
///
/// `"motorola moto g(6) plus"` → `"motorola"` (via the `plus` alias),
/// `"StayFree Chrome"` → `"chrome"`.
pub fn device_token(raw_device: &str, aliases: &BTreeMap<String, String>) -> String {
    let token = raw_device
        .split_whitespace()
        .last()
        .unwrap_or(raw_device)
        .to_lowercase();
    match aliases.get(&token) {
        Some(alias) => alias.clone(),
        None => token,
    }
}

/// Build the full category key for one sheet × device group.
pub fn category_key(
    sheet_name: &str,
    raw_device: &str,
    aliases: &BTreeMap<String, String>,
) -> String {
    format!(
        "{}_{}",
        sheet_token(sheet_name),
        device_token(raw_device, aliases)
    )
}
