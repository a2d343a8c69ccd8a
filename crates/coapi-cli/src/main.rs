//! The `coapi` command-line interface.

use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{Parser, Subcommand};
use coapi::{DocsOptions, OpenApi, Spec};
use tracing::info;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Debug, Parser)]
#[command(name = "coapi", version, about = "C ↔ OpenAPI bridge")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
#[command(rename_all = "snake_case")]
enum Command {
    /// Emit a C SDK skeleton (generated_client.{c,h}) from an OpenAPI document
    FromOpenapi {
        /// The OpenAPI or JSON Schema document
        #[arg(short = 'i')]
        input: PathBuf,
    },
    /// Walk annotated C sources and emit an OpenAPI document
    ToOpenapi {
        /// The source directory to scan
        #[arg(short = 'f')]
        from: PathBuf,
        /// The output file; stdout when omitted
        #[arg(short = 'o')]
        output: Option<PathBuf>,
    },
    /// Emit the per-operation example snippet catalog to stdout
    ToDocsJson {
        /// Skip the include lines in snippets
        #[arg(long)]
        no_imports: bool,
        /// Skip the main() wrapper in snippets
        #[arg(long)]
        no_wrapping: bool,
        /// The OpenAPI document to catalog
        #[arg(short = 'i')]
        input: PathBuf,
    },
    /// Like to_openapi, merged onto a base document
    C2openapi {
        /// A base OpenAPI document to merge onto
        #[arg(long)]
        base: Option<PathBuf>,
        /// The document's $self URI
        #[arg(long = "self")]
        self_uri: Option<String>,
        /// The JSON Schema dialect URI
        #[arg(long)]
        dialect: Option<String>,
        /// The source directory to scan
        dir: PathBuf,
        /// The output file
        out: PathBuf,
    },
    /// Derive a JSON Schema document from a C header
    Code2schema {
        /// The header to inspect
        header: PathBuf,
        /// The schema file to write
        schema: PathBuf,
    },
    /// Heuristic allocation-pairing scan over C sources
    Audit {
        /// The source directory to scan
        dir: PathBuf,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::FromOpenapi { .. } => "from_openapi",
            Command::ToOpenapi { .. } => "to_openapi",
            Command::ToDocsJson { .. } => "to_docs_json",
            Command::C2openapi { .. } => "c2openapi",
            Command::Code2schema { .. } => "code2schema",
            Command::Audit { .. } => "audit",
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let name = cli.command.name();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let code = error.code();
            tracing::debug!(message = %error, "command failed");
            eprintln!("Error executing '{name}': code {code}");
            ExitCode::from(code)
        }
    }
}

/// A failure carrying its errno-style process exit code.
#[derive(Debug)]
struct CliError {
    code: u8,
    message: String,
}

impl CliError {
    fn code(&self) -> u8 {
        self.code
    }

    fn new(code: u8, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<std::io::Error> for CliError {
    fn from(error: std::io::Error) -> Self {
        let code = if error.kind() == std::io::ErrorKind::NotFound {
            2
        } else {
            5
        };
        Self::new(code, error.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(error: serde_json::Error) -> Self {
        Self::new(22, error.to_string())
    }
}

impl From<walkdir::Error> for CliError {
    fn from(error: walkdir::Error) -> Self {
        Self::new(5, error.to_string())
    }
}

impl From<coapi::Error> for CliError {
    fn from(error: coapi::Error) -> Self {
        let code = match &error {
            coapi::Error::NotFound(_) => 2,
            coapi::Error::Io(_) => 5,
            _ => 22,
        };
        Self::new(code, error.to_string())
    }
}

impl From<coapi::EmitError> for CliError {
    fn from(error: coapi::EmitError) -> Self {
        let code = match &error {
            coapi::EmitError::Unresolved(_) => 2,
            coapi::EmitError::Io(_) => 5,
            _ => 22,
        };
        Self::new(code, error.to_string())
    }
}

impl From<coapi::PipelineError> for CliError {
    fn from(error: coapi::PipelineError) -> Self {
        let code = match &error {
            coapi::PipelineError::Io(_) | coapi::PipelineError::Walk(_) => 5,
            coapi::PipelineError::Parse { .. } => 22,
            coapi::PipelineError::Aggregate { .. } => 22,
        };
        Self::new(code, error.to_string())
    }
}

fn run(command: Command) -> Result<(), CliError> {
    match command {
        Command::FromOpenapi { input } => from_openapi(&input),
        Command::ToOpenapi { from, output } => to_openapi(&from, output.as_deref()),
        Command::ToDocsJson {
            no_imports,
            no_wrapping,
            input,
        } => to_docs_json(&input, no_imports, no_wrapping),
        Command::C2openapi {
            base,
            self_uri,
            dialect,
            dir,
            out,
        } => c2openapi(base.as_deref(), self_uri, dialect, &dir, &out),
        Command::Code2schema { header, schema } => code2schema(&header, &schema),
        Command::Audit { dir } => audit(&dir),
    }
}

fn from_openapi(input: &Path) -> Result<(), CliError> {
    let text = std::fs::read_to_string(input)?;
    let doc: serde_json::Value = serde_json::from_str(&text)?;
    let types = coapi::load_schemas(&doc)?;
    let (header, source) =
        coapi::write_c_files(&types, Path::new("."), "generated_client")?;
    info!(header = %header.display(), source = %source.display(), "wrote C SDK skeleton");
    Ok(())
}

fn to_openapi(from: &Path, output: Option<&Path>) -> Result<(), CliError> {
    let mut spec = coapi::scan_dir(from)?;
    apply_fallback_title(&mut spec, from);
    let json = coapi::emit_json(&spec)?;
    match output {
        Some(path) => std::fs::write(path, json)?,
        None => print!("{json}"),
    }
    Ok(())
}

fn to_docs_json(input: &Path, no_imports: bool, no_wrapping: bool) -> Result<(), CliError> {
    let text = std::fs::read_to_string(input)?;
    let document: OpenApi = serde_json::from_str(&text)?;
    let catalog = coapi::emit_docs_json(
        &document,
        DocsOptions {
            no_imports,
            no_wrapping,
        },
    )?;
    print!("{catalog}");
    Ok(())
}

fn c2openapi(
    base: Option<&Path>,
    self_uri: Option<String>,
    dialect: Option<String>,
    dir: &Path,
    out: &Path,
) -> Result<(), CliError> {
    let mut spec = Spec::new();
    if let Some(base) = base {
        let text = std::fs::read_to_string(base)?;
        spec.document = serde_json::from_str(&text)?;
    }
    if let Some(self_uri) = self_uri {
        spec.document.self_uri = Some(self_uri);
    }
    if let Some(dialect) = dialect {
        spec.document.json_schema_dialect = Some(dialect);
    }
    coapi::pipeline::scan_dir_into(&mut spec, dir)?;
    apply_fallback_title(&mut spec, dir);
    let json = coapi::emit_json(&spec)?;
    std::fs::write(out, json)?;
    Ok(())
}

fn code2schema(header: &Path, schema: &Path) -> Result<(), CliError> {
    let source = std::fs::read_to_string(header)?;
    let tokens = coapi::tokenize(&source);
    let types = coapi::extract_types(&tokens)
        .map_err(|error| CliError::new(22, error.to_string()))?;

    let mut schemas = serde_json::Map::new();
    for def in &types {
        let value = serde_json::to_value(coapi::schema_from_typedef(def))?;
        schemas.insert(def.name().to_string(), value);
    }
    let doc = serde_json::json!({ "components": { "schemas": schemas } });
    let mut text = serde_json::to_string_pretty(&doc)?;
    text.push('\n');
    std::fs::write(schema, text)?;
    Ok(())
}

/// Counts allocation and release call sites per file and reports files
/// whose counts diverge. A heuristic lint, not a verifier.
fn audit(dir: &Path) -> Result<(), CliError> {
    const ALLOCATORS: &[&str] = &["malloc", "calloc", "realloc", "strdup"];

    let mut flagged = 0usize;
    for entry in walk_c_files(dir)? {
        let source = std::fs::read_to_string(&entry)?;
        let tokens = coapi::tokenize(&source);
        let mut allocs = 0usize;
        let mut frees = 0usize;
        for token in tokens.tokens() {
            if token.kind == coapi::TokenKind::Identifier {
                let text = token.text(&source);
                if ALLOCATORS.contains(&text) {
                    allocs += 1;
                } else if text == "free" {
                    frees += 1;
                }
            }
        }
        if allocs > frees {
            flagged += 1;
            println!(
                "{}: {} allocation site(s), {} free site(s)",
                entry.display(),
                allocs,
                frees
            );
        }
    }
    println!("audit: {flagged} file(s) with unbalanced allocations");
    Ok(())
}

fn walk_c_files(dir: &Path) -> Result<Vec<PathBuf>, CliError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type().is_file()
            && matches!(path.extension().and_then(|e| e.to_str()), Some("c" | "h"))
        {
            files.push(path.to_path_buf());
        }
    }
    Ok(files)
}

fn apply_fallback_title(spec: &mut Spec, dir: &Path) {
    let fallback = dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("api");
    coapi::ensure_info_defaults(spec, fallback);
}
