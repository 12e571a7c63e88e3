//! Form type detection.

use std::fmt;

use smartfill_protocols::{PageContext, SimplifiedField};

/// Coarse kind of form, used to steer the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormType {
    JobApplication,
    Survey,
    ContactRegistration,
    General,
}

const JOB_URL: &[&str] = &["job", "career", "apply"];
const JOB_TITLE: &[&str] = &["job", "career", "application"];
const JOB_LABELS: &[&str] = &["resume", "cover letter", "salary", "experience", "skills"];

const SURVEY_URL: &[&str] = &["survey", "feedback", "poll"];
const SURVEY_TITLE: &[&str] = &["survey", "feedback"];
const SURVEY_LABELS: &[&str] = &["gender", "age", "ethnicity"];

const CONTACT_URL: &[&str] = &["contact", "register", "signup"];
const CONTACT_TITLE: &[&str] = &["contact", "register", "sign up"];

fn mentions(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

impl FormType {
    /// Classify a form from its page and field labels. The first matching
    /// kind wins, in declaration order.
    pub fn detect(context: &PageContext, fields: &[SimplifiedField]) -> Self {
        let url = context.url.to_lowercase();
        let title = context.title.to_lowercase();
        let labels = fields
            .iter()
            .map(|field| {
                if field.label.is_empty() {
                    field.name.to_lowercase()
                } else {
                    field.label.to_lowercase()
                }
            })
            .collect::<Vec<_>>()
            .join(" ");

        if mentions(&url, JOB_URL) || mentions(&title, JOB_TITLE) || mentions(&labels, JOB_LABELS) {
            Self::JobApplication
        } else if mentions(&url, SURVEY_URL)
            || mentions(&title, SURVEY_TITLE)
            || mentions(&labels, SURVEY_LABELS)
        {
            Self::Survey
        } else if mentions(&url, CONTACT_URL) || mentions(&title, CONTACT_TITLE) {
            Self::ContactRegistration
        } else {
            Self::General
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JobApplication => "JOB_APPLICATION",
            Self::Survey => "SURVEY",
            Self::ContactRegistration => "CONTACT_REGISTRATION",
            Self::General => "GENERAL_FORM",
        }
    }
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartfill_protocols::FieldType;

    fn context(url: &str, title: &str) -> PageContext {
        PageContext {
            url: url.to_string(),
            title: title.to_string(),
        }
    }

    fn field(label: &str, name: &str) -> SimplifiedField {
        SimplifiedField {
            id: name.to_string(),
            label: label.to_string(),
            name: name.to_string(),
            field_type: FieldType::Text,
            placeholder: String::new(),
            options: Vec::new(),
        }
    }

    #[test]
    fn test_job_from_url() {
        let ctx = context("https://example.com/Careers/123", "Open role");
        assert_eq!(FormType::detect(&ctx, &[]), FormType::JobApplication);
    }

    #[test]
    fn test_job_from_labels() {
        let ctx = context("https://example.com/form", "Form");
        let fields = [field("", "name"), field("Upload your Resume", "cv")];
        assert_eq!(FormType::detect(&ctx, &fields), FormType::JobApplication);
    }

    #[test]
    fn test_job_beats_survey() {
        let ctx = context("https://example.com/survey", "Job survey");
        assert_eq!(FormType::detect(&ctx, &[]), FormType::JobApplication);
    }

    #[test]
    fn test_survey_from_name_fallback() {
        let ctx = context("https://example.com/form", "Form");
        let fields = [field("", "gender")];
        assert_eq!(FormType::detect(&ctx, &fields), FormType::Survey);
    }

    #[test]
    fn test_contact_from_title() {
        let ctx = context("https://example.com/", "Sign Up today");
        assert_eq!(FormType::detect(&ctx, &[]), FormType::ContactRegistration);
    }

    #[test]
    fn test_general_fallback() {
        let ctx = context("https://example.com/", "Newsletter");
        let fields = [field("Email", "email")];
        assert_eq!(FormType::detect(&ctx, &fields), FormType::General);
        assert_eq!(FormType::General.to_string(), "GENERAL_FORM");
    }
}
