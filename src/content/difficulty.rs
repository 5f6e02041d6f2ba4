//! Difficulty badges from free-text difficulty labels.

/// Badge styling for a difficulty label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DifficultyInfo {
    pub icon: &'static str,
    pub class_name: &'static str,
    /// Display text, normalised to Arabic when the label is recognised
    pub text: String,
}

impl DifficultyInfo {
    fn known(icon: &'static str, class_name: &'static str, text: &str) -> Self {
        Self {
            icon,
            class_name,
            text: text.to_string(),
        }
    }

    fn beginner() -> Self {
        Self::known("🟢", "difficulty-beginner", "مبتدئ")
    }

    fn intermediate() -> Self {
        Self::known("🟠", "difficulty-intermediate", "متوسط")
    }

    fn advanced() -> Self {
        Self::known("🔴", "difficulty-advanced", "متقدم")
    }

    /// Classify `label`: exact synonyms first, then keyword containment,
    /// then a neutral badge keeping the original text.
    pub fn classify(label: &str) -> Self {
        let label = label.trim();
        match label {
            "مبتدئ" | "beginner" => return Self::beginner(),
            "سهل" | "easy" => return Self::known("🟢", "difficulty-easy", "سهل"),
            "متوسط" | "intermediate" => return Self::intermediate(),
            "medium" => return Self::known("🟠", "difficulty-medium", "متوسط"),
            "متقدم" | "advanced" => return Self::advanced(),
            "hard" => return Self::known("🔴", "difficulty-hard", "صعب"),
            "مبتدئ - متوسط" => {
                return Self::known("🟡", "difficulty-intermediate", "مبتدئ - متوسط")
            }
            _ => {}
        }

        let lower = label.to_lowercase();
        let contains_any = |words: &[&str]| words.iter().any(|w| lower.contains(w));

        if contains_any(&["مبتدئ", "beginner", "easy"]) {
            Self::beginner()
        } else if contains_any(&["متوسط", "intermediate", "medium"]) {
            Self::intermediate()
        } else if contains_any(&["متقدم", "advanced", "hard"]) {
            Self::advanced()
        } else {
            Self {
                icon: "⚪",
                class_name: "difficulty-intermediate",
                text: label.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_synonyms() {
        assert_eq!(DifficultyInfo::classify("beginner").text, "مبتدئ");
        assert_eq!(DifficultyInfo::classify("easy").class_name, "difficulty-easy");
        assert_eq!(DifficultyInfo::classify("medium").class_name, "difficulty-medium");
        assert_eq!(DifficultyInfo::classify("hard").text, "صعب");
        assert_eq!(DifficultyInfo::classify("متقدم").icon, "🔴");
    }

    #[test]
    fn test_range_label() {
        let info = DifficultyInfo::classify("مبتدئ - متوسط");
        assert_eq!(info.icon, "🟡");
        assert_eq!(info.text, "مبتدئ - متوسط");
    }

    #[test]
    fn test_keyword_fallback_prefers_lower_levels() {
        assert_eq!(DifficultyInfo::classify("Easy-Medium").class_name, "difficulty-beginner");
        assert_eq!(DifficultyInfo::classify("Intermediate+").class_name, "difficulty-intermediate");
        assert_eq!(DifficultyInfo::classify("Very Hard").text, "متقدم");
    }

    #[test]
    fn test_unknown_keeps_text() {
        let info = DifficultyInfo::classify("Div. 2 C");
        assert_eq!(info.icon, "⚪");
        assert_eq!(info.text, "Div. 2 C");
    }
}
