//! Worksheet linting: structure, writing space, language, design and
//! pedagogy checks over the raw Markdown.
//!
//! Findings come in two grades. **Errors** reject the worksheet (it prints
//! solutions); **warnings** are advisory. Neither is a Rust error: every
//! finding is a plain value in the returned [`ValidationReport`].
//!
//! The rules are textual. A worksheet is checked as written, before any
//! conversion, so a failing line can be found with a text search.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::debug;

static RE_H1: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#\s+").unwrap());
static RE_LETTERED_QUESTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^###\s*\([א-ת]\)").unwrap());
static RE_NUMBERED_QUESTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\d+\.").unwrap());
static RE_QUESTION_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"###\s*\([א-ת]\)").unwrap());
static RE_WRITING_SPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(דרך פתרון|הסבר|נימוק)[^\n]*\n([_ ]+)").unwrap());
static RE_SOLUTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(תשובה:|פתרון:|דוגמה פתורה)").unwrap());

const REPORT_RULE: usize = 60;

/// Thresholds and word lists for the validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatorRules {
    /// Fewer questions than this is a warning.
    pub min_questions: usize,
    /// Fewer Hebrew letters than this is a warning.
    pub min_hebrew_chars: usize,
    /// A writing-space run is too small when it has fewer than
    /// `min_writing_lines` newlines *and* fewer than `min_writing_underscores`
    /// underscores.
    pub min_writing_lines: usize,
    pub min_writing_underscores: usize,
    /// Shortest acceptable last line of a question section.
    pub min_trailing_chars: usize,
    /// Topics beyond grade 8.
    pub advanced_topics: Vec<String>,
}

impl Default for ValidatorRules {
    fn default() -> Self {
        Self {
            min_questions: 3,
            min_hebrew_chars: 100,
            min_writing_lines: 2,
            min_writing_underscores: 40,
            min_trailing_chars: 3,
            advanced_topics: ["נגזרת", "אינטגרל", "לוגריתם", "מטריצה"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Outcome of validating one worksheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub file: PathBuf,
    /// Hard findings; any one rejects the worksheet.
    pub errors: Vec<String>,
    /// Advisory findings, in rule order.
    pub warnings: Vec<String>,
    /// Lettered question headings (or numbered items when there are none).
    pub question_count: usize,
}

impl ValidationReport {
    /// `true` when there are no errors. Warnings do not count.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Human-readable, bilingual report.
    pub fn render_text(&self) -> String {
        let rule = "=".repeat(REPORT_RULE);
        let name = self
            .file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.file.display().to_string());

        let mut out = String::new();
        let _ = writeln!(out, "\n{rule}");
        let _ = writeln!(out, "דוח בדיקת איכות / Quality report: {name}");
        let _ = writeln!(out, "{rule}");
        if self.errors.is_empty() {
            let _ = writeln!(out, "✅ אין שגיאות / No errors");
        } else {
            let _ = writeln!(out, "❌ שגיאות / Errors ({}):", self.errors.len());
            for e in &self.errors {
                let _ = writeln!(out, "  - {e}");
            }
        }
        if self.warnings.is_empty() {
            let _ = writeln!(out, "✅ אין אזהרות / No warnings");
        } else {
            let _ = writeln!(out, "⚠️ אזהרות / Warnings ({}):", self.warnings.len());
            for w in &self.warnings {
                let _ = writeln!(out, "  - {w}");
            }
        }
        let _ = writeln!(out, "שאלות / Questions: {}", self.question_count);
        let _ = writeln!(out, "{rule}");
        out
    }
}

/// Stateless validator; one report per call.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    rules: ValidatorRules,
}

impl Validator {
    pub fn new(rules: ValidatorRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ValidatorRules {
        &self.rules
    }

    /// Validate a worksheet on disk.
    ///
    /// A missing or unreadable file yields exactly one error and no other
    /// findings.
    pub fn validate_file(&self, path: &Path) -> ValidationReport {
        let mut report = ValidationReport {
            file: path.to_path_buf(),
            ..ValidationReport::default()
        };
        if !path.exists() {
            report
                .errors
                .push(format!("קובץ לא נמצא / File not found: {}", path.display()));
            return report;
        }
        match std::fs::read_to_string(path) {
            Ok(content) => {
                self.check(&content, &mut report);
                report
            }
            Err(e) => {
                report.errors.push(format!(
                    "שגיאה בקריאת קובץ / Failed to read {}: {e}",
                    path.display()
                ));
                report
            }
        }
    }

    /// Validate Markdown text; `file` only labels the report.
    pub fn validate_str(&self, file: impl Into<PathBuf>, content: &str) -> ValidationReport {
        let mut report = ValidationReport {
            file: file.into(),
            ..ValidationReport::default()
        };
        self.check(content, &mut report);
        report
    }

    fn check(&self, content: &str, report: &mut ValidationReport) {
        self.check_structure(content, report);
        self.check_writing_space(content, report);
        self.check_hebrew(content, report);
        self.check_design(content, report);
        self.check_pedagogy(content, report);
        debug!(
            "Validated {}: {} errors, {} warnings",
            report.file.display(),
            report.errors.len(),
            report.warnings.len()
        );
    }

    // ── Rules ───────────────────────────────────────────────────────────

    fn check_structure(&self, content: &str, report: &mut ValidationReport) {
        if !RE_H1.is_match(content) {
            report
                .warnings
                .push("לא נמצאה כותרת ראשית (# ...) / No main title".to_string());
        }
        if !content.contains("הוראות") {
            report
                .warnings
                .push("לא נמצאו הוראות לתלמידים / No instructions for students".to_string());
        }

        let mut count = RE_LETTERED_QUESTION.find_iter(content).count();
        if count == 0 {
            count = RE_NUMBERED_QUESTION.find_iter(content).count();
        }
        report.question_count = count;
        if count < self.rules.min_questions {
            report
                .warnings
                .push(format!("מספר שאלות נמוך / Few questions: {count}"));
        }
    }

    fn check_writing_space(&self, content: &str, report: &mut ValidationReport) {
        for caps in RE_WRITING_SPACE.captures_iter(content) {
            let kind = &caps[1];
            let space = &caps[2];
            let lines = space.matches('\n').count();
            let underscores = space.matches('_').count();
            if lines < self.rules.min_writing_lines
                && underscores < self.rules.min_writing_underscores
            {
                report.warnings.push(format!(
                    "מקום לכתיבה קטן מדי בסעיף '{kind}' / Too little writing space: {lines} שורות / lines, {underscores} תווים / characters"
                ));
            }
        }

        for (i, section) in RE_QUESTION_SPLIT.split(content).enumerate().skip(1) {
            let trimmed = section.trim_end();
            let last_line = trimmed.rsplit('\n').next().unwrap_or("");
            if last_line.chars().count() < self.rules.min_trailing_chars {
                let letter = char::from_u32(0x05D0 + (i as u32 - 1)).unwrap_or('?');
                report.warnings.push(format!(
                    "סעיף ({letter}): מקום לכתיבה קטן מדי אחרי השאלה / Too little writing space after question"
                ));
            }
        }
    }

    fn check_hebrew(&self, content: &str, report: &mut ValidationReport) {
        let hebrew = content
            .chars()
            .filter(|c| ('\u{0590}'..='\u{05FF}').contains(c))
            .count();
        if hebrew < self.rules.min_hebrew_chars {
            report.warnings.push(format!(
                "תוכן עברי מועט / Little Hebrew text: {hebrew} תווים עבריים / Hebrew characters"
            ));
        }
    }

    fn check_design(&self, content: &str, report: &mut ValidationReport) {
        let h1 = RE_H1.find_iter(content).count();
        if h1 != 1 {
            report.warnings.push(format!(
                "מספר כותרות ראשיות שונה מ-1 / Expected exactly one main title, found {h1}"
            ));
        }
    }

    fn check_pedagogy(&self, content: &str, report: &mut ValidationReport) {
        if RE_SOLUTION.is_match(content) {
            report.errors.push(
                "נמצאו פתרונות או תשובות / Worksheet contains solutions or answers".to_string(),
            );
        }
        if content.contains("רמז:") || content.to_lowercase().contains("hint:") {
            report
                .warnings
                .push("נמצאו רמזים / Worksheet contains hints".to_string());
        }
        for topic in &self.rules.advanced_topics {
            if content.contains(topic.as_str()) {
                report.warnings.push(format!(
                    "נמצא נושא מתקדם / Advanced topic: {topic} - יתכן שלא מתאים לכיתה ח' / may not suit grade 8"
                ));
            }
        }
    }
}

/// Validate a worksheet file with the default rules.
pub fn validate_file(path: &Path) -> ValidationReport {
    Validator::default().validate_file(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LETTERS: [&str; 5] = ["א", "ב", "ג", "ד", "ה"];

    fn good_worksheet() -> String {
        let mut md = String::from("# דף עבודה: שיפוע\n\n## הוראות\n\n");
        md.push_str(&"קראו בעיון את השאלות וענו במקום המיועד. ".repeat(5));
        md.push('\n');
        for l in LETTERS {
            md.push_str(&format!(
                "\n### ({l}) מצאו את השיפוע של הישר\n\nנימוק:\n{}\n",
                "_".repeat(60)
            ));
        }
        md
    }

    #[test]
    fn well_formed_worksheet_has_no_structural_warnings() {
        let report = Validator::default().validate_str("good.md", &good_worksheet());
        assert!(report.is_valid(), "{:?}", report.errors);
        assert_eq!(report.question_count, 5);
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    }

    #[test]
    fn solutions_are_errors() {
        for marker in ["תשובה:", "פתרון:", "דוגמה פתורה"] {
            let md = format!("{}\n{marker} 42\n", good_worksheet());
            let report = Validator::default().validate_str("s.md", &md);
            assert!(!report.is_valid(), "{marker} should be rejected");
        }
    }

    #[test]
    fn missing_file_yields_exactly_one_error() {
        let report = validate_file(Path::new("does/not/exist.md"));
        assert_eq!(report.errors.len(), 1);
        assert!(report.warnings.is_empty());
        assert!(report.errors[0].contains("exist.md"));
    }

    #[test]
    fn short_writing_space_warns() {
        let md = format!("{}\nהסבר:\n____\n", good_worksheet());
        let report = Validator::default().validate_str("w.md", &md);
        assert!(report
            .warnings
            .iter()
            .any(|w| w.contains("'הסבר'") && w.contains("4 תווים")));
    }

    #[test]
    fn short_trailing_line_names_the_question_letter() {
        let md = "# כותרת\nהוראות\n### (א) שאלה\n\n__\n### (ב) שאלה\n\n____________\n";
        let report = Validator::default().validate_str("t.md", md);
        let trailing: Vec<&String> = report
            .warnings
            .iter()
            .filter(|w| w.contains("אחרי השאלה"))
            .collect();
        assert_eq!(trailing.len(), 1, "{trailing:?}");
        assert!(trailing[0].contains("סעיף (א)"));
    }

    #[test]
    fn numbered_items_count_when_no_lettered_questions() {
        let md = "# x\n1. a\n2. b\n3. c\n4. d\n";
        let report = Validator::default().validate_str("n.md", md);
        assert_eq!(report.question_count, 4);
    }

    #[test]
    fn hints_and_advanced_topics_warn() {
        let md = format!("{}\nHint: נגזרת ואינטגרל\n", good_worksheet());
        let report = Validator::default().validate_str("h.md", &md);
        assert!(report.is_valid());
        assert!(report.warnings.iter().any(|w| w.contains("רמזים")));
        assert_eq!(
            report
                .warnings
                .iter()
                .filter(|w| w.contains("Advanced topic"))
                .count(),
            2
        );
    }

    #[test]
    fn two_titles_break_design_consistency() {
        let md = format!("{}\n# כותרת שנייה\n", good_worksheet());
        let report = Validator::default().validate_str("d.md", &md);
        assert!(report.warnings.iter().any(|w| w.contains("found 2")));
    }

    #[test]
    fn report_text_frames_sections() {
        let report = ValidationReport {
            file: PathBuf::from("dir/sheet.md"),
            errors: vec!["bad".into()],
            warnings: vec![],
            question_count: 2,
        };
        let text = report.render_text();
        assert!(text.contains(&"=".repeat(60)));
        assert!(text.contains("Quality report: sheet.md"));
        assert!(text.contains("Errors (1):\n  - bad"));
        assert!(text.contains("No warnings"));
    }
}
