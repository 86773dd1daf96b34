//! Unit conversion helpers for decoded sensor values.

use semver::Version;

/// Gyro counts per degree per second (raw / 16.4 = deg/s)
pub const GYRO_SCALE: f64 = 1.0 / 16.4;

/// Multiply a raw sensor count by a scale factor
pub fn scale_raw(raw_value: i64, scale: f64) -> f64 {
    raw_value as f64 * scale
}

/// Extract version from firmware revision string
pub fn extract_firmware_version(firmware_revision: &str) -> Option<Version> {
    // Parse version from strings like "Betaflight 4.5.1 (77d01ba3b) AT32F435M"
    let words: Vec<&str> = firmware_revision.split_whitespace().collect();
    for (i, word) in words.iter().enumerate() {
        let lower = word.to_lowercase();
        if (lower.contains("betaflight") || lower.contains("emuflight") || lower.contains("inav"))
            && i + 1 < words.len()
        {
            if let Ok(version) = Version::parse(words[i + 1]) {
                return Some(version);
            }
        }
    }

    // Bare version headers such as "H Version:4.3.0"
    Version::parse(firmware_revision.trim()).ok()
}
