use std::fmt;
use std::str::FromStr;

use plantai_backend::Diagnosis;
use serde::{Deserialize, Serialize};
use snafu::{Snafu, ensure};

mod profiles;

/// Languages the assistant can converse in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageCode {
    #[default]
    En,
    Hi,
    Kn,
    Ta,
    Te,
    Ml,
    Bn,
    Gu,
    Pa,
}

impl LanguageCode {
    pub const ALL: [Self; 9] = [
        Self::En,
        Self::Hi,
        Self::Kn,
        Self::Ta,
        Self::Te,
        Self::Ml,
        Self::Bn,
        Self::Gu,
        Self::Pa,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Hi => "hi",
            Self::Kn => "kn",
            Self::Ta => "ta",
            Self::Te => "te",
            Self::Ml => "ml",
            Self::Bn => "bn",
            Self::Gu => "gu",
            Self::Pa => "pa",
        }
    }

    pub fn profile(self) -> &'static LocaleProfile {
        profiles::lookup(self)
    }

    /// Parses a code, falling back to the default locale for anything unknown.
    pub fn parse_or_default(raw: &str) -> Self {
        raw.parse().unwrap_or_else(|error: LocaleError| {
            tracing::warn!(error = %error, "falling back to default language");
            Self::default()
        })
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LanguageCode {
    type Err = LocaleError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|code| code.as_str() == normalized)
            .ok_or_else(|| LocaleError::UnknownLanguage {
                stage: "parse-language-code",
                raw: raw.to_string(),
            })
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum LocaleError {
    #[snafu(display("unknown language code '{raw}'"))]
    UnknownLanguage { stage: &'static str, raw: String },
    #[snafu(display("locale '{code}' has an empty '{key}' template"))]
    MissingTemplate {
        stage: &'static str,
        code: LanguageCode,
        key: &'static str,
    },
    #[snafu(display("locale '{code}' template '{key}' lacks the {placeholder} placeholder"))]
    MissingPlaceholder {
        stage: &'static str,
        code: LanguageCode,
        key: &'static str,
        placeholder: &'static str,
    },
}

/// Static chrome strings for one language.
///
/// Templates carry named placeholders (`{file}`, `{label}`, `{confidence}`,
/// `{detail}`) filled by the accessor methods below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleProfile {
    pub code: LanguageCode,
    pub english_name: &'static str,
    pub native_name: &'static str,
    pub greeting: &'static str,
    pub uploaded_image: &'static str,
    pub thinking: &'static str,
    pub prediction_line: &'static str,
    pub confidence_line: &'static str,
    pub healthy_plant: &'static str,
    pub disclaimer: &'static str,
    pub error_line: &'static str,
    pub export_success: &'static str,
    pub export_failure: &'static str,
    pub input_hint: &'static str,
    pub upload_hint: &'static str,
}

impl LocaleProfile {
    pub fn uploaded_image(&self, file_name: &str) -> String {
        self.uploaded_image.replace("{file}", file_name)
    }

    pub fn error(&self, detail: &str) -> String {
        self.error_line.replace("{detail}", detail)
    }

    pub fn export_success(&self, file_name: &str) -> String {
        self.export_success.replace("{file}", file_name)
    }

    pub fn export_failure(&self, detail: &str) -> String {
        self.export_failure.replace("{detail}", detail)
    }

    /// Renders the assistant turn that replaces the upload placeholder.
    pub fn diagnosis_report(&self, diagnosis: &Diagnosis) -> String {
        let Some(label) = diagnosis.label.as_deref() else {
            return self.healthy_report(&diagnosis.narrative);
        };

        [
            self.prediction_line.replace("{label}", label),
            self.confidence_line
                .replace("{confidence}", &format_confidence(diagnosis.confidence)),
            diagnosis.narrative.clone(),
            self.disclaimer.to_string(),
        ]
        .join("\n\n")
    }

    /// Report for a plant with no detected disease; it has no confidence line.
    pub fn healthy_report(&self, narrative: &str) -> String {
        [self.healthy_plant, narrative, self.disclaimer].join("\n\n")
    }

    fn templates(&self) -> [(&'static str, &'static str, Option<&'static str>); 14] {
        [
            ("english_name", self.english_name, None),
            ("native_name", self.native_name, None),
            ("greeting", self.greeting, None),
            ("uploaded_image", self.uploaded_image, Some("{file}")),
            ("thinking", self.thinking, None),
            ("prediction_line", self.prediction_line, Some("{label}")),
            ("confidence_line", self.confidence_line, Some("{confidence}")),
            ("healthy_plant", self.healthy_plant, None),
            ("disclaimer", self.disclaimer, None),
            ("error_line", self.error_line, Some("{detail}")),
            ("export_success", self.export_success, Some("{file}")),
            ("export_failure", self.export_failure, Some("{detail}")),
            ("input_hint", self.input_hint, None),
            ("upload_hint", self.upload_hint, None),
        ]
    }

    fn validate(&self) -> Result<(), LocaleError> {
        for (key, template, placeholder) in self.templates() {
            ensure!(
                !template.trim().is_empty(),
                MissingTemplateSnafu {
                    stage: "validate-locale-template",
                    code: self.code,
                    key,
                }
            );
            if let Some(placeholder) = placeholder {
                ensure!(
                    template.contains(placeholder),
                    MissingPlaceholderSnafu {
                        stage: "validate-locale-placeholder",
                        code: self.code,
                        key,
                        placeholder,
                    }
                );
            }
        }
        Ok(())
    }
}

/// Formats a 0..1 score as a percentage with two decimals.
pub fn format_confidence(confidence: f64) -> String {
    format!("{:.2}%", confidence * 100.0)
}

/// Checks every locale for empty templates and missing placeholders.
pub fn validate_profiles() -> Result<(), LocaleError> {
    for code in LanguageCode::ALL {
        let profile = code.profile();
        if profile.code != code {
            tracing::error!(requested = %code, found = %profile.code, "locale table is misaligned");
        }
        profile.validate()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagnosis(label: Option<&str>, confidence: f64, narrative: &str) -> Diagnosis {
        Diagnosis {
            label: label.map(str::to_string),
            confidence,
            narrative: narrative.to_string(),
        }
    }

    #[test]
    fn every_locale_is_complete() {
        validate_profiles().unwrap();
        for code in LanguageCode::ALL {
            assert_eq!(code.profile().code, code);
        }
    }

    #[test]
    fn codes_parse_case_insensitively() {
        assert_eq!(" KN ".parse::<LanguageCode>().unwrap(), LanguageCode::Kn);
        assert!("xx".parse::<LanguageCode>().is_err());
        assert_eq!(LanguageCode::parse_or_default("xx"), LanguageCode::En);
    }

    #[test]
    fn confidence_renders_with_two_decimals() {
        assert_eq!(format_confidence(0.87), "87.00%");
        assert_eq!(format_confidence(0.123456), "12.35%");
    }

    #[test]
    fn diagnosis_report_orders_its_lines() {
        let profile = LanguageCode::En.profile();
        let body = profile.diagnosis_report(&diagnosis(Some("Leaf Blight"), 0.87, "Remove leaves."));
        let lines: Vec<&str> = body.split("\n\n").collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("Leaf Blight"));
        assert!(lines[1].contains("87.00%"));
        assert_eq!(lines[2], "Remove leaves.");
        assert_eq!(lines[3], profile.disclaimer);
    }

    #[test]
    fn healthy_report_has_no_confidence_line() {
        let profile = LanguageCode::Hi.profile();
        let body = profile.diagnosis_report(&diagnosis(None, 0.42, "पानी नियमित दें।"));

        assert_eq!(body, profile.healthy_report("पानी नियमित दें।"));
        assert!(!body.contains("42.00%"));
        assert!(body.starts_with(profile.healthy_plant));
    }

    #[test]
    fn templates_fill_named_placeholders() {
        let profile = LanguageCode::En.profile();
        assert_eq!(profile.error("model unavailable"), "Error: model unavailable");
        assert!(profile.uploaded_image("leaf.jpg").contains("leaf.jpg"));
        assert!(!profile.export_success("PlantAI_Report.pdf").contains("{file}"));
    }
}
