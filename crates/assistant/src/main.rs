use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use plantai::chat::ReportArtifact;
use plantai::command::{ChatCommand, HELP};
use plantai::locale::LanguageCode;
use plantai::predictions::PredictionTable;
use plantai::render::{TranscriptRenderer, format_transcript};
use plantai::session::{OperationHandle, SessionController, SessionError};
use plantai::settings::{AssistantSettings, SettingsError, SettingsStore};
use plantai_backend::{BackendError, ImageUpload, create_backend};
use snafu::{ResultExt, Snafu};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "plantai",
    version,
    about = "Multilingual plant disease diagnosis assistant"
)]
struct Cli {
    /// Base URL of the diagnosis service.
    #[arg(long, global = true)]
    endpoint: Option<String>,
    /// Conversation language (en, hi, kn, ta, te, ml, bn, gu, pa).
    #[arg(long, global = true)]
    language: Option<LanguageCode>,
    /// Settings file to read instead of the default location.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive session (default).
    Chat,
    /// Diagnose one image, then ask optional follow-up questions.
    Diagnose(DiagnoseArgs),
    /// Top predictions for a batch of images.
    Predict(PredictArgs),
    /// Print the effective settings.
    Config(ConfigArgs),
}

#[derive(Debug, Parser)]
struct DiagnoseArgs {
    image: PathBuf,
    #[arg(long = "question", short = 'q')]
    questions: Vec<String>,
}

#[derive(Debug, Parser)]
struct PredictArgs {
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[derive(Debug, Parser)]
struct ConfigArgs {
    /// Persist the effective settings, including command-line overrides.
    #[arg(long)]
    save: bool,
}

#[derive(Debug, Snafu)]
enum CliError {
    #[snafu(display("{source}"))]
    Backend {
        stage: &'static str,
        source: BackendError,
    },
    #[snafu(display("{source}"))]
    Session {
        stage: &'static str,
        source: SessionError,
    },
    #[snafu(display("{source}"))]
    Settings {
        stage: &'static str,
        source: SettingsError,
    },
    #[snafu(display("failed to render settings on `{stage}`: {source}"))]
    RenderSettings {
        stage: &'static str,
        source: serde_json::Error,
    },
    #[snafu(display("failed to read input on `{stage}`: {source}"))]
    ReadInput {
        stage: &'static str,
        source: std::io::Error,
    },
    #[snafu(display("failed to save report to {path:?} on `{stage}`: {source}"))]
    SaveReport {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("no diagnosis was produced for {path:?}"))]
    DiagnosisFailed { stage: &'static str, path: PathBuf },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::debug!(error = ?error, "command failed");
            eprintln!("plantai: {error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let store = match &cli.config {
        Some(path) => SettingsStore::new(path.clone()),
        None => SettingsStore::load(),
    };

    let mut settings = (*store.settings()).clone();
    if let Some(endpoint) = &cli.endpoint {
        settings.endpoint = endpoint.clone();
    }
    if let Some(language) = cli.language {
        settings.language = language;
    }
    let settings = settings.normalized();

    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => run_chat(&settings).await,
        Command::Diagnose(args) => run_diagnose(&settings, args).await,
        Command::Predict(args) => run_predict(&settings, args).await,
        Command::Config(args) => run_config(&store, settings, args),
    }
}

fn open_session(settings: &AssistantSettings) -> Result<SessionController, CliError> {
    let backend = create_backend(settings.backend_config()).context(BackendSnafu {
        stage: "create-backend",
    })?;
    let session = SessionController::new(backend, settings.language).context(SessionSnafu {
        stage: "create-session",
    })?;
    Ok(session.with_chunk_timeout(settings.chunk_timeout()))
}

async fn drive(
    session: &mut SessionController,
    handle: OperationHandle,
    renderer: &mut TranscriptRenderer,
) {
    let profile = session.profile();
    session
        .drive(handle, |timeline, change| {
            print!("{}", renderer.render(timeline, change, profile));
            if let Err(error) = std::io::stdout().flush() {
                tracing::debug!(error = %error, "failed to flush transcript output");
            }
        })
        .await;
    print!("{}", renderer.finish());
}

async fn save_artifact(artifact: ReportArtifact, dir: &Path) -> Result<PathBuf, CliError> {
    tokio::fs::create_dir_all(dir).await.context(SaveReportSnafu {
        stage: "create-download-directory",
        path: dir.to_path_buf(),
    })?;

    let path = dir.join(&artifact.file_name);
    tokio::fs::write(&path, &artifact.bytes)
        .await
        .context(SaveReportSnafu {
            stage: "write-report",
            path: path.clone(),
        })?;
    Ok(path)
}

fn print_hint(session: &SessionController) {
    let profile = session.profile();
    if session.can_ask() {
        println!("[{}]", profile.input_hint);
    } else if session.can_upload() {
        println!("[{}]", profile.upload_hint);
    }
}

fn print_languages(current: LanguageCode) {
    for code in LanguageCode::ALL {
        let profile = code.profile();
        let marker = if code == current { "*" } else { " " };
        println!(
            "{marker} {code}  {} ({})",
            profile.native_name, profile.english_name
        );
    }
}

async fn run_chat(settings: &AssistantSettings) -> Result<(), CliError> {
    let mut session = open_session(settings)?;
    let mut renderer = TranscriptRenderer::new();
    print!("{}", format_transcript(session.timeline(), session.profile()));
    print_hint(&session);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context(ReadInputSnafu {
        stage: "read-chat-line",
    })? {
        match ChatCommand::parse(&line) {
            ChatCommand::Quit => break,
            ChatCommand::Help => println!("{HELP}"),
            ChatCommand::Restart => {
                let change = session.restart();
                print!(
                    "{}",
                    renderer.render(session.timeline(), &change, session.profile())
                );
            }
            ChatCommand::Language(None) => print_languages(session.language()),
            ChatCommand::Language(Some(raw)) => match raw.parse::<LanguageCode>() {
                Ok(code) => match session.set_language(code) {
                    Some(change) => print!(
                        "{}",
                        renderer.render(session.timeline(), &change, session.profile())
                    ),
                    None => println!("{}", session.profile().native_name),
                },
                Err(error) => eprintln!("{error}"),
            },
            ChatCommand::Upload(path) => {
                let image = match ImageUpload::from_path(&path).await {
                    Ok(image) => image,
                    Err(error) => {
                        eprintln!("{error}");
                        continue;
                    }
                };
                match session.diagnose(image) {
                    Ok(handle) => drive(&mut session, handle, &mut renderer).await,
                    Err(error) => eprintln!("{error}"),
                }
            }
            ChatCommand::Export => match session.export() {
                Ok(handle) => {
                    drive(&mut session, handle, &mut renderer).await;
                    if let Some(artifact) = session.take_artifact() {
                        match save_artifact(artifact, &settings.download_dir).await {
                            Ok(path) => println!("{}", path.display()),
                            Err(error) => eprintln!("{error}"),
                        }
                    }
                }
                Err(error) => eprintln!("{error}"),
            },
            ChatCommand::Ask(question) => match session.ask(&question) {
                Ok(Some(handle)) => drive(&mut session, handle, &mut renderer).await,
                Ok(None) => {}
                Err(error) => eprintln!("{error}"),
            },
            ChatCommand::MissingArgument(command) => eprintln!("{command} needs an argument"),
            ChatCommand::Unknown(command) => eprintln!("unknown command {command}, try /help"),
        }
        print_hint(&session);
    }

    Ok(())
}

async fn run_diagnose(settings: &AssistantSettings, args: DiagnoseArgs) -> Result<(), CliError> {
    let mut session = open_session(settings)?;
    let mut renderer = TranscriptRenderer::new();
    let image = ImageUpload::from_path(&args.image)
        .await
        .context(BackendSnafu {
            stage: "read-diagnosis-image",
        })?;

    print!("{}", format_transcript(session.timeline(), session.profile()));
    let handle = session.diagnose(image).context(SessionSnafu {
        stage: "start-diagnosis",
    })?;
    drive(&mut session, handle, &mut renderer).await;

    if !session.diagnosis_established() {
        return DiagnosisFailedSnafu {
            stage: "run-diagnosis",
            path: args.image,
        }
        .fail();
    }

    for question in &args.questions {
        let handle = session.ask(question).context(SessionSnafu {
            stage: "start-follow-up",
        })?;
        if let Some(handle) = handle {
            drive(&mut session, handle, &mut renderer).await;
        }
    }
    Ok(())
}

async fn run_predict(settings: &AssistantSettings, args: PredictArgs) -> Result<(), CliError> {
    let backend = create_backend(settings.backend_config()).context(BackendSnafu {
        stage: "create-backend",
    })?;

    let mut files = Vec::with_capacity(args.files.len());
    for path in &args.files {
        files.push(
            ImageUpload::from_path(path)
                .await
                .context(BackendSnafu {
                    stage: "read-prediction-image",
                })?,
        );
    }

    let results = backend.predict(files).await.context(BackendSnafu {
        stage: "predict-batch",
    })?;
    let table = PredictionTable::from_results(&results);
    print!("{table}");
    println!("{} image(s) processed", table.file_count());
    if table.has_errors() {
        eprintln!("some images could not be processed");
    }
    Ok(())
}

fn run_config(
    store: &SettingsStore,
    settings: AssistantSettings,
    args: ConfigArgs,
) -> Result<(), CliError> {
    if args.save {
        store.update(settings.clone()).context(SettingsSnafu {
            stage: "save-settings",
        })?;
        eprintln!("saved settings to {}", store.config_path().display());
    }

    let rendered = serde_json::to_string_pretty(&settings).context(RenderSettingsSnafu {
        stage: "render-settings",
    })?;
    println!("{rendered}");
    Ok(())
}
