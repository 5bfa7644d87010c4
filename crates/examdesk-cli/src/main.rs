//! examdesk CLI: exam authoring, attempts and review from the terminal.

use std::path::PathBuf;
use std::process;

use chrono::NaiveDate;
use clap::{ArgGroup, Parser, Subcommand};

use examdesk_core::validation::Gender;

mod commands;

#[derive(Parser)]
#[command(name = "examdesk", version, about = "Client for the examdesk exam platform")]
struct Cli {
    /// Config file path
    #[arg(long, global = true, env = "EXAMDESK_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter config and an example exam draft
    Init,

    /// Parse pasted question text and print the question records
    #[command(group(ArgGroup::new("input").required(true).multiple(true)))]
    Parse {
        /// Multiple-choice text file
        #[arg(long, group = "input")]
        multiple_choice: Option<PathBuf>,

        /// True/false text file
        #[arg(long, group = "input")]
        true_false: Option<PathBuf>,

        /// Short-answer text file
        #[arg(long, group = "input")]
        short_answer: Option<PathBuf>,

        /// Question label (defaults to the configured label)
        #[arg(long)]
        label: Option<String>,

        /// Print the records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate an exam draft file
    Validate {
        /// Path to the draft .toml
        #[arg(long)]
        draft: PathBuf,
    },

    /// Register a new account
    Signup {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        /// male, female or other
        #[arg(long)]
        gender: Option<Gender>,
        /// Date of birth, YYYY-MM-DD
        #[arg(long)]
        birth: Option<NaiveDate>,
        #[arg(long, env = "EXAMDESK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign in and store the refresh credential
    Signin {
        #[arg(long)]
        username: String,
        #[arg(long, env = "EXAMDESK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out and forget the stored credential
    Signout,

    /// Show the signed-in user
    Whoami,

    /// List the classes you belong to
    Classes,

    /// Show one class
    Class {
        /// Class id
        id: String,

        /// List members with their profiles
        #[arg(long)]
        members: bool,

        /// Show submission statistics
        #[arg(long)]
        stats: bool,
    },

    /// Create a class
    CreateClass {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Member limit
        #[arg(long, default_value = "10")]
        max_members: u32,
    },

    /// Join a class through its invite
    Join {
        /// Class id from the invite link
        class_id: String,
    },

    /// Upload an exam built from a draft file
    CreateExam {
        /// Path to the draft .toml
        #[arg(long)]
        draft: PathBuf,

        /// Attach the exam to this class, overriding the draft
        #[arg(long)]
        class: Option<String>,

        /// Upload even if validation reports warnings
        #[arg(long)]
        force: bool,

        /// Print the payload instead of uploading it
        #[arg(long)]
        dry_run: bool,
    },

    /// List the exams of a class
    Exams {
        /// Class id
        class_id: String,
    },

    /// Show an exam's questions
    Exam {
        /// Exam id
        id: String,

        /// Print the exam as JSON
        #[arg(long)]
        json: bool,
    },

    /// Take an exam with answers from a file and submit it
    Submit {
        /// Exam id
        exam_id: String,

        /// Answers .toml
        #[arg(long)]
        answers: PathBuf,
    },

    /// List submissions for an exam or a class
    #[command(group(ArgGroup::new("scope").required(true)))]
    Submissions {
        /// Exam id
        #[arg(long, group = "scope")]
        exam: Option<String>,

        /// Class id
        #[arg(long, group = "scope")]
        class: Option<String>,
    },

    /// Review one submission question by question
    Submission {
        /// Submission id
        id: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("examdesk=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config;

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Parse {
            multiple_choice,
            true_false,
            short_answer,
            label,
            json,
        } => commands::parse::execute(
            multiple_choice,
            true_false,
            short_answer,
            label,
            json,
            config,
        ),
        Commands::Validate { draft } => commands::validate::execute(draft),
        Commands::Signup {
            username,
            email,
            first_name,
            last_name,
            gender,
            birth,
            password,
        } => {
            let form = examdesk_core::validation::SignUpForm {
                username,
                password,
                email,
                first_name,
                last_name,
                gender,
                birth,
            };
            commands::account::sign_up(form, config).await
        }
        Commands::Signin { username, password } => {
            commands::account::sign_in(username, password, config).await
        }
        Commands::Signout => commands::account::sign_out(config).await,
        Commands::Whoami => commands::account::whoami(config).await,
        Commands::Classes => commands::classes::list(config).await,
        Commands::Class { id, members, stats } => {
            commands::classes::show(id, members, stats, config).await
        }
        Commands::CreateClass {
            name,
            description,
            max_members,
        } => commands::classes::create(name, description, max_members, config).await,
        Commands::Join { class_id } => commands::classes::join(class_id, config).await,
        Commands::CreateExam {
            draft,
            class,
            force,
            dry_run,
        } => commands::exams::create(draft, class, force, dry_run, config).await,
        Commands::Exams { class_id } => commands::exams::list(class_id, config).await,
        Commands::Exam { id, json } => commands::exams::show(id, json, config).await,
        Commands::Submit { exam_id, answers } => {
            commands::submit::execute(exam_id, answers, config).await
        }
        Commands::Submissions { exam, class } => {
            commands::submissions::list(exam, class, config).await
        }
        Commands::Submission { id } => commands::submissions::review(id, config).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        if let Some(hint) = commands::hint(&e) {
            eprintln!("Hint: {hint}");
        }
        process::exit(1);
    }
}
