use anyhow::Context;
use clap::Parser;
use difflens::config::Config;
use difflens::llm::{self, ChatReply, Message, Provider, ToolSpec};
use difflens::review::conversation::ConsoleOperator;
use difflens::review::{ReviewRun, Severity};
use difflens::search::GitGrepSearch;
use difflens::spinner::Spinner;
use difflens::symbols::ExtractorRegistry;
use difflens::{git_ops, prompt, report};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "difflens",
    version,
    about = "Symbol-aware LLM review of staged git changes"
)]
struct Cli {
    /// Path to the JSON config file
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Prompt variant to use (overrides the config)
    #[arg(long)]
    prompt: Option<String>,

    /// List available prompt variants and exit
    #[arg(long)]
    list_prompts: bool,
}

/// Keeps the spinner moving while the main thread blocks on the model. The
/// spinner stops before any operator interaction because it only lives for
/// the duration of the transport call.
struct SpinnerProvider {
    inner: Box<dyn Provider>,
}

impl Provider for SpinnerProvider {
    fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        let spinner = Spinner::start("waiting for model");
        let result = self.inner.generate(prompt);
        spinner.stop();
        result
    }

    fn chat_with_tools(
        &self,
        messages: &[Message],
        tools: &[ToolSpec],
    ) -> anyhow::Result<ChatReply> {
        let spinner = Spinner::start("waiting for model");
        let result = self.inner.chat_with_tools(messages, tools);
        spinner.stop();
        result
    }

    fn model(&self) -> &str {
        self.inner.model()
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {:#}", err);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.list_prompts {
        println!("Available prompt variants:");
        for variant in prompt::variants() {
            println!("  {:<14} {}", variant.name, variant.description);
        }
        return Ok(());
    }

    let config = Config::load(&cli.config)?;
    let variant_name = cli
        .prompt
        .unwrap_or_else(|| config.review.prompt_variant.clone());
    let template = prompt::get(&variant_name).with_context(|| {
        let names: Vec<&str> = prompt::variants().iter().map(|v| v.name).collect();
        format!(
            "unknown prompt variant '{}' (available: {})",
            variant_name,
            names.join(", ")
        )
    })?;

    let repo = git_ops::discover_repo(Path::new("."))?;
    let root = git_ops::workdir(&repo)?;
    let files = git_ops::staged_files(&repo)?;
    if files.is_empty() {
        println!("No staged changes to review.");
        return Ok(());
    }
    let diff = git_ops::staged_diff(&repo)?;
    if diff.trim().is_empty() {
        println!("No staged changes to review.");
        return Ok(());
    }

    let provider = SpinnerProvider {
        inner: llm::create_provider(&config.llm)?,
    };
    println!(
        "difflens: reviewing {} staged file(s) with {} via {}",
        files.len(),
        provider.model(),
        config.llm.provider
    );

    let registry = ExtractorRegistry::with_default_languages();
    let search = GitGrepSearch;
    let mut operator = ConsoleOperator;

    let mut review = ReviewRun {
        provider: &provider,
        registry: &registry,
        search: &search,
        operator: &mut operator,
        template,
        root: root.clone(),
        max_turns: config.review.max_turns,
        usage_context_lines: config.review.usage_context_lines,
    };
    let outcome = review.run(&diff, &files);

    let report_path = if outcome.issues.is_empty() && outcome.failures.is_empty() {
        None
    } else {
        Some(report::write_report(&outcome.issues, &outcome.failures, &root)?)
    };
    report::print_summary(&outcome, report_path.as_deref());

    let has_critical = outcome
        .issues
        .iter()
        .any(|i| i.severity == Severity::Critical);
    if has_critical || !outcome.failures.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}
