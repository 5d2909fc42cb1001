mod config;
mod render;

use clap::{Parser, Subcommand};

use jobwiz_core::{
    JobUpdate, NewJob, RegisterUser, SearchCriteria, WorkerClient, WorkerError,
};

use config::JobwizConfig;

#[derive(Parser)]
#[command(name = "jobwiz", about = "Console client for the job_wizard job-board worker")]
struct Cli {
    /// Worker binary (overrides JOBWIZ_WORKER env var)
    #[arg(long, global = true)]
    worker: Option<String>,

    /// Capture file path (overrides JOBWIZ_CAPTURE env var)
    #[arg(long, global = true)]
    capture: Option<String>,

    /// Print decoded records as JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a jobwiz config file
    Init {
        /// Worker binary to record in the config
        #[arg(long, default_value = jobwiz_core::DEFAULT_WORKER_BINARY)]
        binary: String,
        /// Capture file path to record in the config
        #[arg(long)]
        capture_path: Option<String>,
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Register a new user
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        first: String,
        #[arg(long)]
        last: String,
        /// 10 digit phone number starting with 0
        #[arg(long)]
        phone: String,
        /// Education level, 0 to 4 (doctoral)
        #[arg(long, default_value_t = 0)]
        education: i64,
    },
    /// Post a new job
    Create {
        /// Email of the user creating the job
        #[arg(long)]
        creator: String,
        /// Job title, 64 characters max
        #[arg(long)]
        title: String,
        /// Job description, 1024 characters max
        #[arg(long)]
        description: String,
        /// Minimum education level required, 0 to 4
        #[arg(long, default_value_t = 0)]
        min_education: i64,
        /// Minimum years of experience desired
        #[arg(long, default_value_t = 0)]
        min_experience: i64,
        /// Monthly salary offered, 1 million max
        #[arg(long, default_value_t = 0)]
        salary: i64,
    },
    /// Search for jobs
    Search {
        #[arg(long)]
        email: String,
        /// Only jobs posted on or after this date (YYYY-MM-DD)
        #[arg(long)]
        posted: Option<String>,
        #[arg(long)]
        min_education: Option<i64>,
        #[arg(long)]
        min_experience: Option<i64>,
        #[arg(long)]
        salary: Option<i64>,
        /// Keyword for title search
        #[arg(long)]
        keyword: Option<String>,
    },
    /// Show detailed information about one job
    Detail {
        #[arg(long)]
        email: String,
        /// Id of the job to display
        job_id: String,
    },
    /// List jobs created by a user
    Offered {
        #[arg(long)]
        creator: String,
    },
    /// List jobs a user has applied for
    Applied {
        #[arg(long)]
        email: String,
    },
    /// Modify a job you created
    Modify {
        #[arg(long)]
        creator: String,
        /// Id of the job to modify
        job_id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        min_education: Option<i64>,
        #[arg(long)]
        min_experience: Option<i64>,
        #[arg(long)]
        salary: Option<i64>,
        /// Is the job still open? (true or false)
        #[arg(long)]
        is_open: Option<bool>,
    },
    /// Submit an application for a job
    Submit {
        #[arg(long)]
        email: String,
        /// Id of the job to apply for
        job_id: String,
    },
    /// List applicants for one of your jobs
    Candidates {
        #[arg(long)]
        creator: String,
        /// Id of the job to list applicants for
        job_id: String,
    },
}

/// Run one worker exchange and print the outcome.
async fn run_command(client: &WorkerClient, command: Commands, json: bool) -> anyhow::Result<()> {
    match command {
        // Handled in main before the client exists.
        Commands::Init { .. } => unreachable!("init is handled before config resolution"),

        Commands::Register {
            email,
            first,
            last,
            phone,
            education,
        } => {
            let message = client
                .register(RegisterUser {
                    email,
                    first,
                    last,
                    phone,
                    education,
                })
                .await?;
            println!("{message}");
        }

        Commands::Create {
            creator,
            title,
            description,
            min_education,
            min_experience,
            salary,
        } => {
            let job_id = client
                .create_job(NewJob {
                    creator,
                    title,
                    description,
                    min_education,
                    min_experience,
                    salary,
                })
                .await?;
            println!("Created job {job_id}");
        }

        Commands::Search {
            email,
            posted,
            min_education,
            min_experience,
            salary,
            keyword,
        } => {
            let mut criteria = SearchCriteria::new(email);
            criteria.posted = posted;
            criteria.min_education = min_education;
            criteria.min_experience = min_experience;
            criteria.salary = salary;
            criteria.keyword = keyword;

            let projection = client.search(criteria).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&projection.records)?);
                render::print_anomalies(&projection.anomalies);
            } else {
                render::print_summaries(&projection);
            }
        }

        Commands::Detail { email, job_id } => {
            let (detail, anomalies) = client.detail(email, job_id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&detail)?);
                render::print_anomalies(&anomalies);
            } else {
                render::print_detail(&detail, &anomalies);
            }
        }

        Commands::Offered { creator } => {
            let projection = client.offered(creator).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&projection.records)?);
                render::print_anomalies(&projection.anomalies);
            } else {
                render::print_summaries(&projection);
            }
        }

        Commands::Applied { email } => {
            let projection = client.applied(email).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&projection.records)?);
                render::print_anomalies(&projection.anomalies);
            } else {
                render::print_summaries(&projection);
            }
        }

        Commands::Modify {
            creator,
            job_id,
            title,
            description,
            min_education,
            min_experience,
            salary,
            is_open,
        } => {
            let mut update = JobUpdate::new(creator, job_id);
            update.title = title;
            update.description = description;
            update.min_education = min_education;
            update.min_experience = min_experience;
            update.salary = salary;
            update.is_open = is_open;

            let job_id = client.modify_job(update).await?;
            println!("Modified job {job_id}");
        }

        Commands::Submit { email, job_id } => {
            let job_id = client.submit(email, job_id).await?;
            println!("Applied for job {job_id}");
        }

        Commands::Candidates { creator, job_id } => {
            let projection = client.candidates(creator, job_id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&projection.records)?);
                render::print_anomalies(&projection.anomalies);
            } else {
                render::print_candidates(&projection);
            }
        }
    }

    Ok(())
}

/// Print a failed exchange. The worker's captured output rides along on
/// a non-zero exit and usually holds the real explanation, so it is
/// echoed after the error itself -- as plain data, never as a format
/// string.
fn report_failure(err: &anyhow::Error) {
    eprintln!("{err:#}");
    if let Some(WorkerError::NonZeroExit { output, .. }) = err.downcast_ref::<WorkerError>() {
        if !output.is_empty() {
            eprintln!("worker output:");
            eprint!("{output}");
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Commands::Init {
        binary,
        capture_path,
        force,
    } = &cli.command
    {
        return config::cmd_init(binary, capture_path.as_deref(), *force);
    }

    let resolved = JobwizConfig::resolve(cli.worker.as_deref(), cli.capture.as_deref());
    tracing::debug!(
        binary = %resolved.binary,
        capture = %resolved.capture_path.display(),
        "resolved worker configuration"
    );
    let client = WorkerClient::with_binary(resolved.binary, resolved.capture_path);

    if let Err(e) = run_command(&client, cli.command, cli.json).await {
        report_failure(&e);
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
pub(crate) mod test_util {
    use std::sync::{Mutex, MutexGuard};

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Serialize tests that mutate process environment variables.
    pub fn lock_env() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
