use std::borrow::Cow;
use std::collections::HashMap;

use crate::report::*;

use serde::{Deserialize, Serialize};

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputSource {
    pub provider: Option<String>,
    #[serde(rename = "filePath")]
    pub file_path: Option<String>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    #[serde(rename = "nullMarkers")]
    pub null_markers: Option<Vec<String>>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "logoPath")]
    pub logo_path: Option<String>,
    pub language: Option<String>,
    #[serde(rename = "documentTitle")]
    pub document_title: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelOverrides {
    #[serde(rename = "sectionPrefix")]
    pub section_prefix: Option<String>,
    #[serde(rename = "generationDateLabel")]
    pub generation_date_label: Option<String>,
    #[serde(rename = "reviewerLabel")]
    pub reviewer_label: Option<String>,
    #[serde(rename = "noResponse")]
    pub no_response: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(rename = "inputSource", default)]
    pub input_source: InputSource,
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
    pub labels: Option<LabelOverrides>,
    /// user name -> password
    pub credentials: Option<HashMap<String, String>>,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Language {
    Portuguese,
    English,
}

impl Language {
    pub fn parse(s: &str) -> ReportResult<Language> {
        match s.to_lowercase().as_str() {
            "pt" | "pt-br" | "portuguese" => Ok(Language::Portuguese),
            "en" | "english" => Ok(Language::English),
            _ => whatever!("unknown language: {} (expected pt or en)", s),
        }
    }

    pub fn rules(&self) -> ReportRules {
        match self {
            Language::Portuguese => ReportRules::PORTUGUESE,
            Language::English => ReportRules::ENGLISH,
        }
    }

    pub fn labels(&self) -> Labels {
        match self {
            Language::Portuguese => Labels::PORTUGUESE,
            Language::English => Labels::ENGLISH,
        }
    }
}

impl LabelOverrides {
    pub fn apply(&self, rules: &mut ReportRules, labels: &mut Labels) {
        if let Some(s) = &self.section_prefix {
            labels.section_prefix = Cow::Owned(s.clone());
        }
        if let Some(s) = &self.generation_date_label {
            labels.generation_date = Cow::Owned(s.clone());
        }
        if let Some(s) = &self.reviewer_label {
            labels.reviewer = Cow::Owned(s.clone());
        }
        if let Some(s) = &self.no_response {
            rules.no_response = Cow::Owned(s.clone());
        }
    }
}

pub fn read_config(path: &str) -> BReportResult<ReportConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: ReportConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    debug!("read_config: {:?}", config);
    Ok(config)
}
