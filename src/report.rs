use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};
use survey_report::render::{render, OutlineBackend};
use survey_report::*;

use std::fs;
use std::path::{Path, PathBuf};

use calamine::{open_workbook, Reader, Xlsx};
use chrono::Utc;

use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::report::auth::{CredentialStore, Session};
use crate::report::config_reader::*;
use crate::report::io_common::{output_path, relative_to, NullMarkers};
use crate::report::pdf_backend::{Logo, PdfBackend};

pub mod auth;
pub mod config_reader;
mod fonts;
pub mod io_common;
pub mod io_csv;
pub mod io_excel;
pub mod pdf_backend;

const DEFAULT_DOCUMENT_TITLE: &str = "Relatório";

#[derive(Debug, Snafu)]
pub enum ReportError {
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the JSON file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error serializing the document outline"))]
    SerializingJson { source: serde_json::Error },
    #[snafu(display("Error opening the CSV file {path}"))]
    CsvOpen {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error reading line {lineno} of the CSV file"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Error opening the Excel file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The Excel file {path} has no worksheet or no header row"))]
    EmptyExcel { path: String },
    #[snafu(display("Cannot find the worksheet {name}"))]
    MissingWorksheet { name: String },
    #[snafu(display("No input file: use --input or inputSource.filePath in the configuration"))]
    MissingInput {},
    #[snafu(display("Cannot build a report from {path}"))]
    Compiling {
        source: CompileError,
        path: String,
    },
    #[snafu(display("Error reading the logo {path}"))]
    ReadingLogo {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error decoding the logo {path}"))]
    DecodingLogo {
        source: image::ImageError,
        path: String,
    },
    #[snafu(display("Error writing the document {path}"))]
    WritingDocument {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing the outline {path}"))]
    WritingOutline {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Incorrect username or password for user {username:?}"))]
    AuthenticationMismatch { username: String },
    #[snafu(display("This deployment requires credentials: use --user and --password"))]
    MissingCredentials {},
    #[snafu(display("No credentials configured: add a credentials map to the configuration file"))]
    NoCredentialStore {},
    #[snafu(display("The session is not authenticated"))]
    NotAuthenticated {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ReportResult<T> = Result<T, ReportError>;
pub type BReportResult<T> = Result<T, Box<ReportError>>;

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum InputType {
    Csv,
    Excel,
}

impl InputType {
    pub fn parse(s: &str) -> ReportResult<InputType> {
        match s {
            "csv" => Ok(InputType::Csv),
            "excel" | "xlsx" => Ok(InputType::Excel),
            x => whatever!("Input type not implemented {:?} (expected csv or excel)", x),
        }
    }
}

/// Everything needed to produce one document, once the command line and the
/// configuration file have been merged.
#[derive(Debug, Clone)]
pub struct ReportSettings {
    pub input_path: String,
    pub input_type: InputType,
    pub worksheet: Option<String>,
    pub null_markers: NullMarkers,
    /// Directory, or explicit .pdf path.
    pub out: Option<String>,
    pub logo_path: Option<String>,
    pub document_title: String,
    pub rules: ReportRules,
    pub labels: Labels,
    pub outline: Option<String>,
    pub reference: Option<String>,
}

/// Command line flags take precedence. Paths coming from the configuration
/// are relative to the configuration file.
pub fn build_settings(
    args: &Args,
    config: &ReportConfig,
    root: Option<&Path>,
) -> ReportResult<ReportSettings> {
    let from_config = |p: &Option<String>| p.as_ref().map(|s| relative_to(root, s));

    let input_path = match args
        .input
        .clone()
        .or_else(|| from_config(&config.input_source.file_path))
    {
        Some(p) => p,
        None => return MissingInputSnafu {}.fail(),
    };

    let input_type = InputType::parse(
        args.input_type
            .as_deref()
            .or(config.input_source.provider.as_deref())
            .unwrap_or("csv"),
    )?;

    let language = Language::parse(
        args.language
            .as_deref()
            .or(config.output_settings.language.as_deref())
            .unwrap_or("pt"),
    )?;
    let mut rules = language.rules();
    let mut labels = language.labels();
    if let Some(overrides) = &config.labels {
        overrides.apply(&mut rules, &mut labels);
    }

    let null_markers = match &config.input_source.null_markers {
        Some(markers) => NullMarkers::new(markers),
        None => NullMarkers::default(),
    };

    Ok(ReportSettings {
        input_path,
        input_type,
        worksheet: args
            .excel_worksheet_name
            .clone()
            .or_else(|| config.input_source.excel_worksheet_name.clone()),
        null_markers,
        out: args
            .out
            .clone()
            .or_else(|| from_config(&config.output_settings.output_directory)),
        logo_path: args
            .logo
            .clone()
            .or_else(|| from_config(&config.output_settings.logo_path)),
        document_title: config
            .output_settings
            .document_title
            .clone()
            .unwrap_or_else(|| DEFAULT_DOCUMENT_TITLE.to_string()),
        rules,
        labels,
        outline: args.outline.clone(),
        reference: args.reference.clone(),
    })
}

/// Runs the access gate. A configuration without stored credentials is
/// refused: there is no unauthenticated path to the converter.
pub fn open_session(session: &mut Session, config: &ReportConfig, args: &Args) -> ReportResult<()> {
    let store = CredentialStore::new(config.credentials.clone().unwrap_or_default());
    if store.is_empty() {
        warn!("open_session: no credentials configured, refusing to run");
        return NoCredentialStoreSnafu {}.fail();
    }
    match (&args.user, &args.password) {
        (Some(user), Some(password)) => session.login(&store, user, password),
        _ => MissingCredentialsSnafu {}.fail(),
    }
}

fn read_records(settings: &ReportSettings) -> BReportResult<RecordSet> {
    info!(
        "Attempting to read survey export {:?} ({:?})",
        settings.input_path, settings.input_type
    );
    match settings.input_type {
        InputType::Csv => io_csv::read_csv_records(&settings.input_path, &settings.null_markers),
        InputType::Excel => io_excel::read_excel_records(
            &settings.input_path,
            settings.worksheet.as_deref(),
            &settings.null_markers,
        ),
    }
}

fn load_logo(path: Option<&str>) -> BReportResult<Option<Logo>> {
    match path {
        None => Ok(None),
        Some(p) => {
            let bytes = fs::read(p).context(ReadingLogoSnafu { path: p })?;
            let logo = Logo::from_bytes(&bytes).context(DecodingLogoSnafu { path: p })?;
            debug!("load_logo: {:?} decoded", p);
            Ok(Some(logo))
        }
    }
}

/// Produces the document for an authenticated session and returns where it
/// was written.
///
/// The document is assembled in memory and written in one step: a failure
/// before that point leaves nothing on disk.
pub fn generate_report(session: &Session, settings: &ReportSettings) -> BReportResult<PathBuf> {
    if !session.is_authenticated() {
        return Err(Box::new(ReportError::NotAuthenticated {}));
    }

    let records = read_records(settings)?;
    let doc = compile_at(&records, &settings.rules, Utc::now()).context(CompilingSnafu {
        path: settings.input_path.as_str(),
    })?;

    let file_name = output_file_name(&records);
    if output_stem(&records).is_empty() {
        warn!(
            "generate_report: the first response only holds reserved characters, the document is named {:?}",
            file_name
        );
    }
    let out_path = output_path(settings.out.as_deref(), &file_name);

    let logo = load_logo(settings.logo_path.as_deref())?;
    let mut backend = PdfBackend::new(&settings.labels, &settings.document_title, logo);
    render(&doc, &mut backend).unwrap_or_else(|never| match never {});
    info!("generate_report: {} pages", backend.page_count());
    let bytes = backend.finish();

    fs::write(&out_path, bytes).context(WritingDocumentSnafu {
        path: out_path.display().to_string(),
    })?;
    info!("Wrote report {:?}", out_path);

    if let Some(outline_p) = &settings.outline {
        write_outline(&doc, &settings.labels, outline_p)?;
    }

    // The reference outline, if provided for comparison
    if let Some(reference_p) = &settings.reference {
        check_reference(&doc, reference_p)?;
    }

    Ok(out_path)
}

fn write_outline(doc: &CompiledDocument, labels: &Labels, path: &str) -> ReportResult<()> {
    let contents = if path.ends_with(".txt") {
        let mut backend = OutlineBackend::new(labels);
        render(doc, &mut backend).unwrap_or_else(|never| match never {});
        backend.into_text()
    } else {
        serde_json::to_string_pretty(doc).context(SerializingJsonSnafu {})?
    };
    if path == "stdout" {
        println!("{}", contents);
    } else {
        fs::write(path, contents).context(WritingOutlineSnafu { path })?;
        info!("Wrote outline {:?}", path);
    }
    Ok(())
}

// The generation date changes at every run, it is left out of comparisons.
fn comparable_outline(mut js: JSValue) -> JSValue {
    if let Some(obj) = js.as_object_mut() {
        obj.remove("generatedAt");
    }
    js
}

fn check_reference(doc: &CompiledDocument, reference_path: &str) -> ReportResult<()> {
    let contents = fs::read_to_string(reference_path).context(OpeningJsonSnafu {
        path: reference_path,
    })?;
    let reference: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {
        path: reference_path,
    })?;
    let computed = serde_json::to_value(doc).context(SerializingJsonSnafu {})?;

    let pretty_reference = serde_json::to_string_pretty(&comparable_outline(reference))
        .context(SerializingJsonSnafu {})?;
    let pretty_computed = serde_json::to_string_pretty(&comparable_outline(computed))
        .context(SerializingJsonSnafu {})?;
    if pretty_reference != pretty_computed {
        warn!("Found differences with the reference outline");
        print_diff(pretty_reference.as_str(), pretty_computed.as_ref(), "\n");
        whatever!("Difference detected between the document outline and the reference outline")
    }
    Ok(())
}

/// Entry point of the program.
pub fn run(args: &Args) -> BReportResult<PathBuf> {
    let (config, root): (ReportConfig, Option<PathBuf>) = match &args.config {
        Some(config_path) => {
            let config = read_config(config_path)?;
            let root = Path::new(config_path).parent().map(|p| p.to_path_buf());
            (config, root)
        }
        None => (ReportConfig::default(), None),
    };

    let mut session = Session::new();
    open_session(&mut session, &config, args)?;

    let settings = build_settings(args, &config, root.as_deref())?;
    debug!("run: settings: {:?}", settings);
    generate_report(&session, &settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENGLISH_EXPORT: &str = "Section,Question Number,Question,Response Option(s),Reviewer Names\n\
        Intro,1,Name?,My/File:Name,Ana\n\
        Intro,2,Role?,,Ana\n\
        Data,3,Purpose?,Marketing,\n";

    fn scratch_dir(name: &str) -> PathBuf {
        let d = std::env::temp_dir().join(format!("surveypdf-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&d);
        fs::create_dir_all(&d).unwrap();
        d
    }

    fn args() -> Args {
        Args {
            config: None,
            input: None,
            input_type: None,
            excel_worksheet_name: None,
            out: None,
            logo: None,
            language: None,
            outline: None,
            reference: None,
            user: None,
            password: None,
            verbose: false,
        }
    }

    fn session() -> Session {
        let mut m = std::collections::HashMap::new();
        m.insert("ana".to_string(), "s3cret".to_string());
        let mut session = Session::new();
        session.login(&CredentialStore::new(m), "ana", "s3cret").unwrap();
        session
    }

    fn settings_for(dir: &Path, csv: &str) -> ReportSettings {
        let input = dir.join("export.csv");
        fs::write(&input, csv).unwrap();
        let mut a = args();
        a.input = Some(input.display().to_string());
        a.out = Some(dir.display().to_string());
        a.language = Some("en".to_string());
        build_settings(&a, &ReportConfig::default(), None).unwrap()
    }

    #[test]
    fn end_to_end_csv() {
        let dir = scratch_dir("e2e");
        let mut settings = settings_for(&dir, ENGLISH_EXPORT);
        let outline = dir.join("outline.json");
        settings.outline = Some(outline.display().to_string());

        let path = generate_report(&session(), &settings).unwrap();
        assert_eq!(path, dir.join("MyFileName.pdf"));
        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));

        let js: JSValue = serde_json::from_str(&fs::read_to_string(&outline).unwrap()).unwrap();
        assert_eq!(js["reviewer"], "Ana");
        let content = js["content"].as_array().unwrap();
        assert_eq!(content.len(), 5);
        assert_eq!(content[0]["kind"], "sectionHeader");
        assert_eq!(content[0]["title"], "Intro");
        assert_eq!(content[2]["response"], "No response");
        assert_eq!(content[3]["title"], "Data");
    }

    #[test]
    fn text_outline() {
        let dir = scratch_dir("text-outline");
        let mut settings = settings_for(&dir, ENGLISH_EXPORT);
        let outline = dir.join("outline.txt");
        settings.outline = Some(outline.display().to_string());
        generate_report(&session(), &settings).unwrap();
        let text = fs::read_to_string(&outline).unwrap();
        assert!(text.contains("Section: Intro\n1 - Name?\nMy/File:Name\n"));
        assert!(text.contains("2 - Role?\nNo response\n"));
    }

    #[test]
    fn empty_input_writes_nothing() {
        let dir = scratch_dir("empty");
        let settings = settings_for(&dir, "Section,Question Number,Question,Response Option(s)\n");
        let err = generate_report(&session(), &settings).unwrap_err();
        assert!(matches!(
            *err,
            ReportError::Compiling {
                source: CompileError::EmptyInput,
                ..
            }
        ));
        assert!(!dir.join("output.pdf").exists());
    }

    #[test]
    fn unwritable_destination() {
        let dir = scratch_dir("unwritable");
        let mut settings = settings_for(&dir, ENGLISH_EXPORT);
        settings.out = Some(dir.join("missing-dir").display().to_string());
        let err = generate_report(&session(), &settings).unwrap_err();
        assert!(matches!(*err, ReportError::WritingDocument { .. }));
    }

    #[test]
    fn logged_out_session_is_refused() {
        let dir = scratch_dir("logged-out");
        let settings = settings_for(&dir, ENGLISH_EXPORT);
        let err = generate_report(&Session::new(), &settings).unwrap_err();
        assert!(matches!(*err, ReportError::NotAuthenticated {}));
    }

    #[test]
    fn reference_comparison() {
        let dir = scratch_dir("reference");
        let mut settings = settings_for(&dir, ENGLISH_EXPORT);
        let outline = dir.join("reference.json");
        settings.outline = Some(outline.display().to_string());
        generate_report(&session(), &settings).unwrap();

        // Same data, other run: the generation date is ignored.
        settings.outline = None;
        settings.reference = Some(outline.display().to_string());
        generate_report(&session(), &settings).unwrap();

        let other = settings_for(&dir, &ENGLISH_EXPORT.replace("Marketing", "Sales"));
        let mut other = other;
        other.reference = Some(outline.display().to_string());
        let err = generate_report(&session(), &other).unwrap_err();
        assert!(matches!(*err, ReportError::Whatever { .. }));
    }

    #[test]
    fn gated_run() {
        let dir = scratch_dir("gated");
        fs::write(dir.join("export.csv"), ENGLISH_EXPORT).unwrap();
        let config = r#"{
            "inputSource": {"filePath": "export.csv"},
            "outputSettings": {"outputDirectory": ".", "language": "en"},
            "credentials": {"ana": "s3cret"}
        }"#;
        let config_path = dir.join("config.json");
        fs::write(&config_path, config).unwrap();

        let mut a = args();
        a.config = Some(config_path.display().to_string());
        let err = run(&a).unwrap_err();
        assert!(matches!(*err, ReportError::MissingCredentials {}));

        a.user = Some("ana".to_string());
        a.password = Some("wrong".to_string());
        let err = run(&a).unwrap_err();
        assert!(matches!(*err, ReportError::AuthenticationMismatch { .. }));
        assert!(!dir.join("MyFileName.pdf").exists());

        a.password = Some("s3cret".to_string());
        let path = run(&a).unwrap();
        assert_eq!(path, dir.join(".").join("MyFileName.pdf"));
        assert!(path.exists());
    }

    #[test]
    fn no_credential_store_is_refused() {
        let mut session = Session::new();
        let res = open_session(&mut session, &ReportConfig::default(), &args());
        assert!(matches!(res, Err(ReportError::NoCredentialStore {})));
        assert!(!session.is_authenticated());

        // Passing a user does not help without a store.
        let mut a = args();
        a.user = Some("ana".to_string());
        a.password = Some("s3cret".to_string());
        let config: ReportConfig = serde_json::from_str(r#"{"credentials": {}}"#).unwrap();
        assert!(open_session(&mut session, &config, &a).is_err());
        assert!(!session.is_authenticated());

        let dir = scratch_dir("no-store");
        fs::write(dir.join("export.csv"), ENGLISH_EXPORT).unwrap();
        a.input = Some(dir.join("export.csv").display().to_string());
        a.out = Some(dir.display().to_string());
        let err = run(&a).unwrap_err();
        assert!(matches!(*err, ReportError::NoCredentialStore {}));
        assert!(!dir.join("MyFileName.pdf").exists());
    }

    #[test]
    fn settings_precedence() {
        let config: ReportConfig = serde_json::from_str(
            r#"{
            "inputSource": {"filePath": "data/export.xlsx", "provider": "excel", "nullMarkers": ["-"]},
            "outputSettings": {"logoPath": "logo.png", "documentTitle": "Review"},
            "labels": {"noResponse": "(none)"}
        }"#,
        )
        .unwrap();
        let root = Path::new("conf");
        let s = build_settings(&args(), &config, Some(root)).unwrap();
        assert_eq!(s.input_path, root.join("data/export.xlsx").display().to_string());
        assert_eq!(s.input_type, InputType::Excel);
        assert_eq!(s.logo_path, Some(root.join("logo.png").display().to_string()));
        assert_eq!(s.document_title, "Review");
        assert_eq!(s.rules.no_response, "(none)");
        assert_eq!(s.labels, Labels::PORTUGUESE);
        assert!(s.null_markers.is_null("-"));

        let mut a = args();
        a.input = Some("other.csv".to_string());
        a.input_type = Some("csv".to_string());
        a.logo = Some("/abs/logo.png".to_string());
        let s = build_settings(&a, &config, Some(root)).unwrap();
        assert_eq!(s.input_path, "other.csv");
        assert_eq!(s.input_type, InputType::Csv);
        assert_eq!(s.logo_path.as_deref(), Some("/abs/logo.png"));

        let err = build_settings(&args(), &ReportConfig::default(), None).unwrap_err();
        assert!(matches!(err, ReportError::MissingInput {}));
    }
}
