use api_shared::{validate_diagnosis_request, AnswerReq, DiagnosisDto, DiagnosisReq, QuestionDto};
use clap::{Parser, Subcommand};
use herbdx_core::{
    constants::{DEFAULT_CATALOG_PATH, DEFAULT_CATALOG_TIMEOUT_MS}, AuditOptions, AuditWriter, CatalogReader, DiagnosisLogStore,
    DiagnosisService, FileDiagnosisLogStore, InMemoryCatalog, InMemoryDiagnosisLogStore,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "herbdx")]
#[command(about = "HerbDx syndrome matcher CLI")]
struct Cli {
    /// Catalog YAML file
    #[arg(long, global = true, default_value = DEFAULT_CATALOG_PATH)]
    catalog: PathBuf,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List active symptoms
    Symptoms {
        /// Only list symptoms in this category
        #[arg(long)]
        category: Option<String>,
    },
    /// List active questions
    Questions {
        /// Only list this symptom's questions plus universal ones
        #[arg(long)]
        symptom_id: Option<String>,
    },
    /// Run a diagnosis and print the result as JSON
    Diagnose {
        /// Selected symptom id (repeatable)
        #[arg(long = "symptom", required = true)]
        symptoms: Vec<String>,
        /// Answer as QUESTION_ID=VALUE (repeatable); numeric values are sent as numbers
        #[arg(long = "answer", value_parser = parse_answer)]
        answers: Vec<AnswerReq>,
        /// Write the diagnosis log under this directory (default: keep it in memory)
        #[arg(long)]
        audit_dir: Option<PathBuf>,
    },
    /// Validate a catalog file and print its contents summary
    CheckCatalog,
}

fn parse_answer(raw: &str) -> Result<AnswerReq, String> {
    let (question_id, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected QUESTION_ID=VALUE, got '{}'", raw))?;

    let value = match value.trim().parse::<f64>() {
        Ok(n) => serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or_else(|| serde_json::Value::String(value.to_string())),
        Err(_) => serde_json::Value::String(value.to_string()),
    };

    Ok(AnswerReq {
        question_id: question_id.trim().to_string(),
        value,
    })
}

fn catalog_timeout() -> Duration {
    Duration::from_millis(DEFAULT_CATALOG_TIMEOUT_MS)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("herbdx=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Use 'herbdx --help' for commands");
        return Ok(());
    };

    let catalog = InMemoryCatalog::from_file(&cli.catalog)?;

    match command {
        Commands::Symptoms { category } => {
            let symptoms = catalog.active_symptoms(category.as_deref()).await?;
            if symptoms.is_empty() {
                println!("No symptoms found.");
            }
            for s in symptoms {
                println!(
                    "{}\t{}\t{}",
                    s.id,
                    s.name,
                    s.category.as_deref().unwrap_or("-")
                );
            }
        }
        Commands::Questions { symptom_id } => {
            let questions = catalog.active_questions(symptom_id.as_deref()).await?;
            if questions.is_empty() {
                println!("No questions found.");
            }
            for q in questions {
                let dto = QuestionDto::from(q);
                println!("{}\t{}\t{}", dto.id, dto.question_type, dto.question_text);
            }
        }
        Commands::Diagnose {
            symptoms,
            answers,
            audit_dir,
        } => {
            let request = validate_diagnosis_request(DiagnosisReq {
                symptom_ids: symptoms,
                answers,
            })
            .map_err(|errors| {
                errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect::<Vec<_>>()
                    .join("; ")
            })?;

            let store: Arc<dyn DiagnosisLogStore> = match &audit_dir {
                Some(dir) => Arc::new(FileDiagnosisLogStore::new(dir)),
                None => Arc::new(InMemoryDiagnosisLogStore::new()),
            };
            let (writer, worker) = AuditWriter::spawn(store, AuditOptions::default());
            let service = DiagnosisService::new(Arc::new(catalog), writer, catalog_timeout());

            let diagnosis = service.diagnose(request).await?;
            drop(service);
            worker.join().await;

            println!(
                "{}",
                serde_json::to_string_pretty(&DiagnosisDto::from(diagnosis))?
            );
        }
        Commands::CheckCatalog => {
            let summary = catalog.summary();
            println!("Catalog OK: {}", cli.catalog.display());
            println!("  symptoms:        {}", summary.symptoms);
            println!("  questions:       {}", summary.questions);
            println!(
                "  syndromes:       {} ({} active)",
                summary.syndromes, summary.active_syndromes
            );
            println!("  treatment axes:  {}", summary.treatment_axes);
            println!("  herbs:           {}", summary.herbs);
            println!("  syndrome herbs:  {}", summary.syndrome_herbs);
            println!("  relations:       {}", summary.relations);
            for warning in catalog.warnings() {
                println!("warning: {}", warning);
            }
        }
    }

    Ok(())
}
