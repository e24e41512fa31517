//! Compiles the skill dictionary into one boundary-aware matcher per canonical skill

use crate::error::Result;
use crate::vocabulary::dictionary::SkillDictionary;
use log::{debug, info};
use regex::{Regex, RegexBuilder};
use std::collections::{BTreeSet, HashSet};

/// Neighbouring characters that disqualify a match: word characters and hyphen.
const BOUNDARY_CLASS: &str = r"[^\w-]";
/// The bare letter `c` must also not touch `+` or `#` so `c++`/`c#` don't count.
const C_BOUNDARY_CLASS: &str = r"[^\w+#]";

#[derive(Debug, Clone)]
pub struct CompiledSkill {
    pub canonical: String,
    /// Expanded synonyms, longest first
    pub synonyms: Vec<String>,
    pattern: Regex,
}

impl CompiledSkill {
    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// Ordered collection of compiled skills. Immutable once built.
#[derive(Debug, Clone)]
pub struct SkillEngine {
    skills: Vec<CompiledSkill>,
}

impl SkillEngine {
    pub fn build(dictionary: &SkillDictionary) -> Result<Self> {
        let mut skills = Vec::with_capacity(dictionary.len());

        for (canonical, raw) in dictionary.iter() {
            let synonyms = expand_synonyms(raw);
            if synonyms.is_empty() {
                debug!("Skill '{}' has no usable synonyms, skipping", canonical);
                continue;
            }

            let alternatives: Vec<String> = synonyms
                .iter()
                .map(|synonym| synonym_pattern(canonical, synonym))
                .collect();
            let full_pattern = format!("(?:{})", alternatives.join("|"));

            let pattern = RegexBuilder::new(&full_pattern)
                .case_insensitive(true)
                .build()?;

            skills.push(CompiledSkill {
                canonical: canonical.clone(),
                synonyms,
                pattern,
            });
        }

        info!("Skill engine built: {} canonical skills ready for scanning", skills.len());
        Ok(Self { skills })
    }

    /// Canonical names whose pattern matches anywhere in `text`.
    pub fn scan(&self, text: &str) -> BTreeSet<String> {
        if text.is_empty() {
            return BTreeSet::new();
        }

        self.skills
            .iter()
            .filter(|skill| skill.is_match(text))
            .map(|skill| skill.canonical.clone())
            .collect()
    }

    pub fn skills(&self) -> &[CompiledSkill] {
        &self.skills
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

/// Split comma-separated entries, trim, drop empties and duplicates, then
/// order longest first (ties lexicographic so builds are reproducible).
pub fn expand_synonyms(raw: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out: Vec<String> = raw
        .iter()
        .flat_map(|entry| entry.split(','))
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .filter(|part| seen.insert(part.to_string()))
        .map(str::to_string)
        .collect();

    out.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then_with(|| a.cmp(b)));
    out
}

/// The regex crate has no lookaround, so each side is either a text edge or
/// one consumed non-boundary character. Fine for `is_match`, which is all we need.
fn synonym_pattern(canonical: &str, synonym: &str) -> String {
    let class = if canonical == "c" && synonym.eq_ignore_ascii_case("c") {
        C_BOUNDARY_CLASS
    } else {
        BOUNDARY_CLASS
    };

    format!(
        "(?:^|{class}){escaped}(?:$|{class})",
        class = class,
        escaped = regex::escape(synonym)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> SkillEngine {
        let dict = SkillDictionary::from_entries(vec![
            ("python", vec!["python", "py"]),
            ("react", vec!["react", "react.js"]),
            ("c++", vec!["c++", "cpp"]),
            ("c#", vec!["c#", "c-sharp"]),
            ("c", vec!["c"]),
            ("docker", vec!["docker"]),
        ]);
        SkillEngine::build(&dict).unwrap()
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_expand_synonyms_splits_and_orders() {
        let raw = vec!["js, javascript".to_string(), " js ".to_string(), "".to_string(), "ecmascript".to_string()];
        assert_eq!(expand_synonyms(&raw), vec!["ecmascript", "javascript", "js"]);
    }

    #[test]
    fn test_one_pattern_per_skill() {
        let engine = engine();
        assert_eq!(engine.len(), 6);
        let react = engine.skills().iter().find(|s| s.canonical == "react").unwrap();
        assert_eq!(react.synonyms, vec!["react.js", "react"]);
    }

    #[test]
    fn test_c_family_disambiguation() {
        let engine = engine();
        assert_eq!(
            engine.scan("I know c, c++, and c# (or c-sharp). I also use cpp."),
            set(&["c", "c++", "c#"])
        );
        assert_eq!(engine.scan("Modern C++ and C# only"), set(&["c++", "c#"]));
        assert_eq!(engine.scan("C"), set(&["c"]));
    }

    #[test]
    fn test_hyphen_and_word_boundaries() {
        let engine = engine();
        assert!(engine.scan("react-or").is_empty());
        assert!(engine.scan("reactive programming").is_empty());
        assert_eq!(engine.scan("built with react.js/redux"), set(&["react"]));
        assert_eq!(engine.scan("(docker)"), set(&["docker"]));
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(
            engine().scan("Experience with PyThOn and React.JS"),
            set(&["python", "react"])
        );
    }

    #[test]
    fn test_empty_text() {
        assert!(engine().scan("").is_empty());
    }

    #[test]
    fn test_synonyms_with_regex_metacharacters_are_literal() {
        let dict = SkillDictionary::from_entries(vec![("node.js", vec!["node.js", "nodejs"])]);
        let engine = SkillEngine::build(&dict).unwrap();
        assert!(engine.scan("nodeXjs").is_empty());
        assert_eq!(engine.scan("node.js backend"), set(&["node.js"]));
    }

    #[test]
    fn test_skill_without_synonyms_is_skipped() {
        let dict = SkillDictionary::from_entries(vec![("ghost", vec![" , "]), ("go", vec!["golang"])]);
        let engine = SkillEngine::build(&dict).unwrap();
        assert_eq!(engine.len(), 1);
    }
}
