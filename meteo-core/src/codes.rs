//! WMO weather-code lookup tables.
//!
//! The codes and their meanings are part of the upstream provider's contract,
//! not business logic; both functions are total, with a sentinel for codes
//! outside the published set.

/// Glyph for a WMO weather code.
pub fn icon(code: i32) -> &'static str {
    match code {
        // Clear / cloud
        0 | 1 | 2 | 3 => "\u{2600}\u{fe0f}",
        // Fog
        45 | 48 => "\u{1f32b}\u{fe0f}",
        // Drizzle
        51 | 53 | 55 | 56 | 57 => "\u{1f326}\u{fe0f}",
        // Rain
        61 | 63 | 65 | 66 | 67 => "\u{1f327}\u{fe0f}",
        // Snow
        71 | 73 | 75 | 77 => "\u{2744}\u{fe0f}",
        // Rain showers
        80 | 81 | 82 => "\u{1f326}\u{fe0f}",
        // Snow showers
        85 | 86 => "\u{2744}\u{fe0f}",
        // Thunderstorm
        95 | 96 | 99 => "\u{26c8}\u{fe0f}",
        _ => "Unknown",
    }
}

/// Human-readable summary for a WMO weather code.
pub fn summary(code: i32) -> &'static str {
    match code {
        0 => "Clear Sky",
        1 => "Mainly Clear",
        2 => "Partly Cloudy",
        3 => "Overcast",

        45 => "Fog",
        48 => "Depositing Rime Fog",

        51 => "Light Drizzle",
        53 => "Moderate Drizzle",
        55 => "Dense Drizzle",
        56 => "Light Freezing Drizzle",
        57 => "Dense Freezing Drizzle",

        61 => "Slight Rain",
        63 => "Moderate Rain",
        65 => "Heavy Rain",
        66 => "Light Freezing Rain",
        67 => "Heavy Freezing Rain",

        71 => "Slight Snow Fall",
        73 => "Moderate Snow Fall",
        75 => "Heavy Snow Fall",
        77 => "Snow Grains",

        80 => "Slight Rain Showers",
        81 => "Moderate Rain Showers",
        82 => "Violent Rain Showers",

        85 => "Slight Snow Showers",
        86 => "Heavy Snow Showers",

        95 => "Thunderstorm",
        96 => "Thunderstorm with Slight Hail",
        99 => "Thunderstorm with Heavy Hail",

        _ => "Unknown",
    }
}
