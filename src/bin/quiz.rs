use anyhow::{Context, Result};
use clap::Parser;
use crossterm::style::Stylize;
use quizcraft::clients::FlexibleClient;
use quizcraft::config::{AppConfig, ProviderKind};
use quizcraft::interceptors::FileInterceptor;
use quizcraft::{OptionMark, Phase, QuizGenerator, QuizPresenter, QuizSession};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;

const OPTION_LABELS: [char; 4] = ['a', 'b', 'c', 'd'];

#[derive(Parser)]
#[command(author, version, about = "🎮 Interactive video game quiz generator", long_about = None)]
#[command(after_help = "ENVIRONMENT VARIABLES:
    QUIZ_PROVIDER        Backend: gemini (default), claude, deepseek, mock (offline demo quiz)
    QUIZ_MODEL           Model id override for the backend
    QUIZ_STREAM          Use the streaming endpoint (1/true/yes/on)
    QUIZ_TRANSCRIPT_DIR  Save every prompt and raw response to this directory
    GOOGLE_API_KEY       API key for Gemini
    ANTHROPIC_API_KEY    API key for Claude
    DEEPSEEK_API_KEY     API key for DeepSeek
    RUST_LOG             Log filter (default: warn)")]
struct Args {
    /// Backend to use: gemini, claude, deepseek, mock (offline demo quiz)
    #[arg(short, long)]
    provider: Option<String>,

    /// Model id to request from the backend
    #[arg(short, long)]
    model: Option<String>,

    /// Drain the backend's streaming endpoint instead of a single request
    #[arg(long)]
    stream: bool,

    /// Directory for prompt/response transcripts
    #[arg(long)]
    transcript_dir: Option<PathBuf>,
}

impl Args {
    fn apply(self, mut config: AppConfig) -> Result<AppConfig> {
        if let Some(provider) = self.provider {
            config.provider = provider.parse::<ProviderKind>()?;
        }
        if self.model.is_some() {
            config.model = self.model;
        }
        config.stream |= self.stream;
        if self.transcript_dir.is_some() {
            config.transcript_dir = self.transcript_dir;
        }
        Ok(config)
    }
}

type Input = Lines<BufReader<Stdin>>;

enum View {
    TopicForm,
    Quiz,
    Results,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.apply(AppConfig::from_env()?)?;

    let client = FlexibleClient::from_config(&config)
        .with_context(|| format!("cannot start with the {} backend", config.provider))?;

    let mut generator = QuizGenerator::new(client).with_streaming(config.stream);
    if let Some(dir) = &config.transcript_dir {
        generator = generator.with_interceptor(Arc::new(FileInterceptor::new(dir.clone())));
    }

    let mut input: Input = BufReader::new(tokio::io::stdin()).lines();
    let mut presenter = QuizPresenter::new();

    println!("{}", "Gerador de Questionário Interativo de Games com IA".bold().cyan());
    println!("Type :q at any prompt to quit.\n");

    loop {
        let view = match presenter.phase() {
            Phase::Idle { .. } | Phase::Loading => View::TopicForm,
            Phase::Active(session) if session.is_submitted() => View::Results,
            Phase::Active(_) => View::Quiz,
        };
        let keep_going = match view {
            View::TopicForm => topic_form(&mut presenter, &generator, &mut input).await?,
            View::Quiz => quiz_view(&mut presenter, &mut input).await?,
            View::Results => results_view(&mut presenter, &mut input).await?,
        };
        if !keep_going {
            break;
        }
    }

    Ok(())
}

async fn prompt_line(input: &mut Input, label: &str) -> Result<Option<String>> {
    print!("{label}");
    std::io::stdout().flush()?;

    let line = input.next_line().await.context("failed to read stdin")?;
    Ok(line
        .map(|l| l.trim().to_string())
        .filter(|l| l != ":q"))
}

async fn topic_form(
    presenter: &mut QuizPresenter,
    generator: &QuizGenerator<FlexibleClient>,
    input: &mut Input,
) -> Result<bool> {
    if let Some(error) = presenter.error() {
        println!("{}\n", error.red());
    }

    let Some(topic) = prompt_line(input, "Game topic (e.g. Fortnite, Minecraft, Valorant): ").await? else {
        return Ok(false);
    };

    presenter.set_topic_input(&topic)?;
    println!("{}", "Gerando questionário...".dim());
    if let Err(e) = presenter.submit_topic(generator).await {
        println!("{}\n", e.to_string().yellow());
    }
    Ok(true)
}

async fn quiz_view(presenter: &mut QuizPresenter, input: &mut Input) -> Result<bool> {
    if let Some(session) = presenter.session() {
        render_session(session);
        println!(
            "Answered {}/{}. Pick with '<question> <option>' (e.g. '3 b'), submit with 's'.",
            session.answered_count(),
            session.quiz().len()
        );
    }

    let Some(command) = prompt_line(input, "> ").await? else {
        return Ok(false);
    };

    if command.eq_ignore_ascii_case("s") {
        presenter.submit_answers()?;
        return Ok(true);
    }

    match parse_pick(presenter, &command) {
        Some((index, option)) => {
            if let Err(e) = presenter.select_answer(index, &option) {
                println!("{}", e.to_string().yellow());
            }
        }
        None => println!("{}", "Could not understand that. Try '3 b' or 's'.".yellow()),
    }
    Ok(true)
}

async fn results_view(presenter: &mut QuizPresenter, input: &mut Input) -> Result<bool> {
    if let Some(session) = presenter.session() {
        render_session(session);
    }
    let summary = presenter.summary()?;
    println!("{}", "Resultados:".bold());
    println!("  Sua pontuação: {} de {}", summary.score.to_string().yellow(), summary.total);
    println!("  Acertos: {}", summary.score.to_string().green());
    println!("  Erros: {}\n", summary.wrong.to_string().red());

    if prompt_line(input, "Press Enter to go back (Voltar)... ").await?.is_none() {
        return Ok(false);
    }
    presenter.reset();
    Ok(true)
}

// "3 b" or "3 2" -> (2, text of option b of question 3)
fn parse_pick(presenter: &QuizPresenter, command: &str) -> Option<(usize, String)> {
    let session = presenter.session()?;
    let mut parts = command.split_whitespace();
    let number: usize = parts.next()?.parse().ok()?;
    let choice = parts.next()?.to_lowercase();
    if parts.next().is_some() || number == 0 {
        return None;
    }

    let index = number - 1;
    let option_index = match choice.parse::<usize>() {
        Ok(n) if n >= 1 => n - 1,
        Ok(_) => return None,
        Err(_) => {
            let letter = choice.chars().next()?;
            OPTION_LABELS.iter().position(|&l| l == letter)?
        }
    };

    let option = session.quiz().questions().get(index)?.options().get(option_index)?;
    Some((index, option.clone()))
}

fn render_session(session: &QuizSession) {
    let quiz = session.quiz();
    println!("\n{}\n", format!("Questionário sobre {}", quiz.topic()).bold().green());

    for (index, question) in quiz.questions().iter().enumerate() {
        println!("{}. {}", index + 1, question.text().bold());
        for (label, option) in OPTION_LABELS.iter().zip(question.options()) {
            let line = format!("   {label}) {option}");
            match session.mark(index, option) {
                OptionMark::Unselected => println!("{line}"),
                OptionMark::Selected => println!("{}", line.blue().bold()),
                OptionMark::Correct => println!("{}", line.green().bold()),
                OptionMark::Missed => println!("{}", line.red().bold()),
            }
        }
        println!();
    }
}
