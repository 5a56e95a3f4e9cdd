//! Draft prompt assembly from keywords and configured flavor text.

/// Inputs for one draft prompt.
///
/// Empty strings mean the segment is omitted. `artist_hint` is drawn by
/// the caller (uniformly from the configured hints), so assembly itself
/// is deterministic.
#[derive(Debug, Clone, Default)]
pub struct DraftContext {
    /// Ranked headline keywords.
    pub keywords: Vec<String>,
    /// Configured base style.
    pub style: String,
    /// Configured vibe.
    pub vibe: String,
    /// Artist hint drawn from the configured pool, empty when none.
    pub artist_hint: String,
    /// Configured negative prompt clause.
    pub negative: String,
    /// Time-of-day descriptor, e.g. "morning golden light".
    pub time_of_day: String,
}

/// Maps a local hour (0-23) to a lighting descriptor.
pub fn time_of_day_descriptor(hour: u32) -> &'static str {
    match hour {
        0..=5 => "pre-dawn night",
        6..=10 => "morning golden light",
        11..=13 => "midday bright daylight",
        14..=17 => "afternoon warm light",
        18..=20 => "sunset dusk glow",
        _ => "night cool tones",
    }
}

/// Assembles the draft wallpaper prompt. This is what goes to the image
/// model when refinement is disabled or fails.
pub fn build_draft_prompt(context: &DraftContext) -> String {
    let keywords = context.keywords.join(", ");

    let mut segments = vec![
        format!("A visually striking wallpaper evoking: {keywords}."),
        format!("Atmosphere/time: {}.", context.time_of_day),
    ];
    if !context.style.is_empty() {
        segments.push(format!("Style: {}.", context.style));
    }
    if !context.vibe.is_empty() {
        segments.push(format!("Vibe: {}.", context.vibe));
    }
    if !context.artist_hint.is_empty() {
        segments.push(format!("{}.", context.artist_hint));
    }
    let positive = segments.join(" ");

    if context.negative.is_empty() {
        positive
    } else {
        format!("{positive} Avoid: {}.", context.negative)
    }
}
