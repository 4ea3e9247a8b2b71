/// Keyword table for proficiency labels, French and English.
///
/// Checked in order, so the multi-word or more specific labels come first.
const PROFICIENCY_KEYWORDS: &[(&str, u8)] = &[
    ("débutant", 1),
    ("debutant", 1),
    ("beginner", 1),
    ("novice", 1),
    ("basique", 1),
    ("basic", 1),
    ("élémentaire", 2),
    ("elementaire", 2),
    ("elementary", 2),
    ("notions", 2),
    ("junior", 2),
    ("intermédiaire", 3),
    ("intermediaire", 3),
    ("intermediate", 3),
    ("moyen", 3),
    ("avancé", 4),
    ("avance", 4),
    ("advanced", 4),
    ("confirmé", 4),
    ("confirme", 4),
    ("senior", 4),
    ("expert", 5),
    ("maître", 5),
    ("maitre", 5),
    ("master", 5),
];

/// Normalize a free-text proficiency level to an integer in 1..=5.
///
/// Returns 0 for an empty value (no proficiency recorded) and 1 for text
/// that neither matches a keyword nor contains a number.
pub fn normalize_proficiency(raw: &str) -> u8 {
    let text = raw.trim().to_lowercase();
    if text.is_empty() {
        return 0;
    }

    if let Some((_, level)) = PROFICIENCY_KEYWORDS
        .iter()
        .find(|(keyword, _)| text.contains(keyword))
    {
        return *level;
    }

    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();

    match digits.parse::<u64>() {
        Ok(n) => n.clamp(1, 5) as u8,
        // Overflowing digit runs are still "a lot"
        Err(_) if !digits.is_empty() => 5,
        Err(_) => 1,
    }
}
