use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use advent_campaign::api::types::RegisterRequest;
use advent_campaign::machine::{CalendarState, IdentityForm, RegistrationMode};
use advent_campaign::{render, CalendarMachine, CampaignClient, TokenStore};

#[derive(Parser, Debug)]
#[command(author, version, about = "Advent campaign client - headless", long_about = None)]
struct Cli {
    /// Campaign backend base URL (the REST namespace is appended)
    #[arg(long, env = "CAMPAIGN_API", default_value = "http://localhost")]
    api: String,

    /// Directory for persisted client state (session token)
    #[arg(long, env = "CAMPAIGN_STATE", default_value = "campaign_state")]
    state_dir: String,

    /// Anti-forgery nonce to attach as X-WP-Nonce, when the deployment uses one
    #[arg(long, env = "WP_NONCE")]
    nonce: Option<String>,

    /// Log level (error|warn|info|debug|trace)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    log: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive session: sign in, open days, answer questions
    Play,
    /// Fetch and print the calendar grid
    Dashboard,
    /// Fetch and print one day's question
    Day {
        /// Day number (1-based)
        number: u32,
    },
    /// Submit an answer for a day
    Answer {
        /// Day number (1-based)
        day: u32,
        /// Selected option (A-D)
        choice: String,
    },
    /// Register an identity and open a session
    Register {
        email: String,
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        job_title: Option<String>,
        #[arg(long)]
        business_phone: Option<String>,
    },
    /// Open a session for an already registered email
    Login { email: String },
    /// Fetch and print answer progress
    Progress,
    /// Drop the stored session token
    Logout,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let log = cli.log.clone();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log))
        .init();

    let tokens = TokenStore::new(&cli.state_dir);
    let client = CampaignClient::new(&cli.api, tokens.clone(), cli.nonce.clone())?;

    match cli.command {
        Commands::Play => cmd_play(client).await?,
        Commands::Dashboard => cmd_dashboard(client).await?,
        Commands::Day { number } => cmd_day(client, number).await?,
        Commands::Answer { day, choice } => cmd_answer(client, day, &choice).await?,
        Commands::Register {
            email,
            full_name,
            company,
            job_title,
            business_phone,
        } => {
            cmd_register(
                client,
                RegisterRequest {
                    email,
                    full_name,
                    company,
                    job_title,
                    business_phone,
                },
            )
            .await?
        }
        Commands::Login { email } => cmd_login(client, &email).await?,
        Commands::Progress => cmd_progress(client).await?,
        Commands::Logout => {
            tokens.clear();
            println!("Signed out.");
        }
    }

    Ok(())
}

async fn cmd_dashboard(client: CampaignClient) -> anyhow::Result<()> {
    let dash = client.get_dashboard().await?;
    render::print_dashboard(&dash.days, dash.current_day, dash.effective_total_days());
    Ok(())
}

async fn cmd_day(client: CampaignClient, number: u32) -> anyhow::Result<()> {
    let detail = client.get_day(number).await?;
    render::print_question(&detail);
    if detail.already_answered {
        println!(
            "Already answered: {} ({})",
            detail.user_answer.as_deref().unwrap_or("-"),
            match detail.is_correct {
                Some(true) => "correct",
                Some(false) => "incorrect",
                None => "pending",
            }
        );
        if let Some(text) = &detail.correct_answer_text {
            println!("Correct Answer: {text}");
        }
    }
    Ok(())
}

async fn cmd_answer(client: CampaignClient, day: u32, choice: &str) -> anyhow::Result<()> {
    let resp = client.submit_answer(day, choice).await?;
    render::print_result(&advent_campaign::machine::AnswerOutcome {
        is_correct: resp.is_correct,
        correct_answer_text: resp.correct_answer_text,
    });
    Ok(())
}

async fn cmd_register(client: CampaignClient, req: RegisterRequest) -> anyhow::Result<()> {
    client.register(&req).await?;
    let resp = client.create_session(&req.email).await?;
    if resp.success && resp.token.is_some() {
        println!("Registered {}. Session ready.", req.email);
    } else {
        anyhow::bail!(resp
            .message
            .unwrap_or_else(|| "Failed to create session".to_string()));
    }
    Ok(())
}

async fn cmd_login(client: CampaignClient, email: &str) -> anyhow::Result<()> {
    let resp = client.create_session(email).await?;
    if resp.success && resp.token.is_some() {
        println!("Session ready for {email}.");
    } else {
        anyhow::bail!(resp
            .message
            .unwrap_or_else(|| "Failed to create session".to_string()));
    }
    Ok(())
}

async fn cmd_progress(client: CampaignClient) -> anyhow::Result<()> {
    match client.get_progress().await? {
        Some(progress) => render::print_progress(&progress),
        None => println!("No progress yet."),
    }
    Ok(())
}

async fn cmd_play(client: CampaignClient) -> anyhow::Result<()> {
    let mut machine = CalendarMachine::new(client);
    machine.start().await;

    loop {
        render::print_notices(&machine.take_notices());

        match machine.state().clone() {
            CalendarState::CheckingSession => machine.start().await,
            CalendarState::NeedsIdentity(mode) => {
                let Some(form) = prompt_identity(mode)? else {
                    break;
                };
                machine.submit_identity(&form).await;
            }
            CalendarState::Dashboard => {
                render::print_dashboard(
                    machine.days(),
                    machine.current_day(),
                    machine.total_days(),
                );
                let Some(input) = prompt("Day number to open (q to quit)")? else {
                    break;
                };
                match input.as_str() {
                    "q" | "Q" => break,
                    other => match other.parse::<u32>() {
                        Ok(n) => machine.open_day(n).await,
                        Err(_) => println!("Enter a day number, or q to quit."),
                    },
                }
            }
            CalendarState::QuestionOpen => {
                if let Some(detail) = machine.question() {
                    render::print_question(detail);
                }
                let Some(choice) = prompt("Your answer (A-D, c to cancel)")? else {
                    break;
                };
                if choice.eq_ignore_ascii_case("c") {
                    machine.cancel_question();
                } else {
                    machine.submit_answer(&choice.to_uppercase()).await;
                }
            }
            CalendarState::ResultShown => {
                if let Some(outcome) = machine.last_result() {
                    render::print_result(outcome);
                }
                if prompt("Press Enter to continue")?.is_none() {
                    break;
                }
                machine.close_result().await;
            }
        }
    }

    render::print_notices(&machine.take_notices());
    Ok(())
}

fn prompt_identity(mode: RegistrationMode) -> anyhow::Result<Option<IdentityForm>> {
    match mode {
        RegistrationMode::Full => println!("Register to play."),
        RegistrationMode::IdentityOnly => println!("Confirm your details."),
    }
    let mut form = IdentityForm::default();
    let Some(full_name) = prompt("Full name")? else {
        return Ok(None);
    };
    form.full_name = full_name;
    if mode == RegistrationMode::Full {
        let Some(company) = prompt("Company")? else {
            return Ok(None);
        };
        form.company = company;
        let Some(job_title) = prompt("Job title")? else {
            return Ok(None);
        };
        form.job_title = job_title;
        let Some(phone) = prompt("Business phone (optional)")? else {
            return Ok(None);
        };
        form.business_phone = phone;
    }
    let Some(email) = prompt("Email")? else {
        return Ok(None);
    };
    form.email = email;
    Ok(Some(form))
}

/// Read one trimmed line from stdin; `None` on end of input.
fn prompt(label: &str) -> anyhow::Result<Option<String>> {
    use std::io::Write;
    print!("{label}: ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    if std::io::stdin().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
