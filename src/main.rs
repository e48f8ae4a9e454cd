use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use asyncapi_docgen::Result;
use asyncapi_docgen::config::ApiConfig;
use asyncapi_docgen::diagnostics::{Diagnostic, Severity};
use asyncapi_docgen::emit;
use asyncapi_docgen::render;
use asyncapi_docgen::session::BuildSession;

#[derive(Parser)]
#[command(name = "asyncapi-docgen")]
#[command(about = "Pub/sub channel documentation generator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build HTML pages and the asyncapi.yaml artifact from document files.
    Build {
        /// Document files to process.
        #[arg(required = true)]
        docs: Vec<PathBuf>,

        /// Output directory.
        #[arg(short = 'o', long)]
        out: PathBuf,

        /// Optional YAML config: {asyncapi: <version>, data: {...}}.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Commands::Build { docs, out, config } => {
            // 1) Load configuration.
            let config = match config {
                Some(path) => ApiConfig::from_yaml_file(&path)?,
                None => ApiConfig::default(),
            };

            // 2) Process every document, collecting channels and
            //    diagnostics as we go.
            let mut session = BuildSession::new(config);
            let mut processed = Vec::new();
            let mut diagnostics = Vec::new();
            for path in &docs {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("read document {}", path.display()))?;
                let docname = document_name(path);
                let (doc, mut diags) =
                    session.process_document_at(&docname, &text, path.parent())?;
                processed.push(doc);
                diagnostics.append(&mut diags);
            }
            report(&diagnostics);

            // 3) Render one HTML page per document; overview tables
            //    resolve against the now-complete registry.
            std::fs::create_dir_all(&out)
                .with_context(|| format!("create output directory {}", out.display()))?;
            for doc in &processed {
                let html = render::render_document(doc, &session.registry);
                let page = out.join(format!("{}.html", doc.docname));
                std::fs::write(&page, html)
                    .with_context(|| format!("write page {}", page.display()))?;
            }

            // 4) Emit the machine-readable artifact.
            let artifact = out.join(emit::ARTIFACT_FILE_NAME);
            emit::write_artifact(&artifact, &session.config, &session.registry)?;
            println!("Wrote {}", out.display());
        }
    }

    Ok(())
}

fn document_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn report(diagnostics: &[Diagnostic]) {
    for diag in diagnostics {
        match diag.severity {
            Severity::Warning => eprintln!("WARN: {diag}"),
            Severity::Error => eprintln!("ERROR: {diag}"),
        }
    }
}
