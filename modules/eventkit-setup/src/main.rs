use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use eventkit_common::templates::ALL_CATEGORIES;
use eventkit_common::{expand_template, starter_templates, Config, EventFormValues};
use eventkit_setup::{
    browse_clusters, EventFormController, FeedbackSink, NoopFeedback, OnboardingFlow,
    ProjectSession, UpdatePolicy,
};
use platform_client::{FeedbackClient, PlatformClient};

#[derive(Parser)]
#[command(name = "eventkit", about = "Configure event detection for analytics projects")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the events of an onboarding template
    Templates {
        #[arg(long, default_value = "Writing assistant")]
        name: String,
        #[arg(long, default_value = "")]
        project: String,
        #[arg(long, default_value = "")]
        org: String,
    },
    /// Print the starter catalog used by the event form
    Starters {
        #[arg(long, default_value = ALL_CATEGORIES)]
        category: String,
        #[arg(long, default_value = "")]
        project: String,
        #[arg(long, default_value = "")]
        org: String,
    },
    /// Validate raw form values from a JSON file
    Validate { file: PathBuf },
    /// Create an event, or edit one with --edit, from raw form values
    Submit {
        #[arg(long)]
        project: String,
        /// Name of the existing event to edit
        #[arg(long)]
        edit: Option<String>,
        file: PathBuf,
    },
    /// Add an onboarding template's events to a project
    Onboard {
        #[arg(long)]
        project: String,
        #[arg(long)]
        org: String,
        #[arg(long)]
        template: String,
        /// Event to leave out (repeatable)
        #[arg(long)]
        skip: Vec<String>,
        #[arg(long)]
        task_id: Option<String>,
    },
    /// List clusters of a clustering (latest by default)
    Clusters {
        #[arg(long)]
        project: String,
        #[arg(long)]
        clustering: Option<String>,
        /// Print an event definition seeded from each cluster instead of the listing
        #[arg(long)]
        seed: bool,
        #[arg(long, default_value = "")]
        org: String,
    },
}

fn read_form_values(file: &PathBuf) -> Result<EventFormValues> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("Cannot read form values from {}", file.display()))?;
    Ok(serde_json::from_str(&raw)?)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Templates { name, project, org } => {
            print_json(&expand_template(&name, &project, &org))?;
        }
        Command::Starters {
            category,
            project,
            org,
        } => {
            print_json(&starter_templates(&category, &project, &org))?;
        }
        Command::Validate { file } => {
            let mut form = EventFormController::create(None);
            *form.values_mut() = read_form_values(&file)?;
            match form.derived_score() {
                Some(Ok(score)) => eprintln!(
                    "score: {:?} {}..{} {:?}",
                    score.score_type, score.min, score.max, score.categories
                ),
                Some(Err(e)) => eprintln!("score: {e}"),
                None => {}
            }
            match form.validate("", "") {
                Ok(definition) => print_json(&definition)?,
                Err(errors) => {
                    for e in &errors {
                        eprintln!("{e}");
                    }
                    bail!("{} validation error(s)", errors.len());
                }
            }
        }
        Command::Submit {
            project,
            edit,
            file,
        } => {
            let config = Config::from_env()?;
            let client = Arc::new(PlatformClient::new(
                &config.platform_api_url,
                &config.access_token,
            )?);
            let policy = UpdatePolicy {
                rollback_on_failure: config.rollback_on_persist_failure,
            };
            let mut session = ProjectSession::load(client, &project, policy).await?;

            let mut form = match edit {
                Some(name) => {
                    let existing = session
                        .project()
                        .settings
                        .as_ref()
                        .and_then(|s| s.events.get(&name))
                        .cloned()
                        .with_context(|| format!("No event named {name} in project {project}"))?;
                    EventFormController::edit(existing)
                }
                None => EventFormController::create(None),
            };
            *form.values_mut() = read_form_values(&file)?;

            let definition = session.submit(&mut form, &config.org_plan).await?;
            print_json(&definition)?;
        }
        Command::Onboard {
            project,
            org,
            template,
            skip,
            task_id,
        } => {
            let config = Config::from_env()?;
            let client = PlatformClient::new(&config.platform_api_url, &config.access_token)?;
            let feedback: Arc<dyn FeedbackSink> = match &config.telemetry_api_key {
                Some(key) => Arc::new(FeedbackClient::new(&config.telemetry_api_url, key)?),
                None => Arc::new(NoopFeedback),
            };

            let mut flow =
                OnboardingFlow::new(project, org, task_id, config.telemetry_project_id.clone());
            flow.select_template(&template);
            for name in &skip {
                flow.toggle(name);
            }

            let mut outcome = flow.confirm(&client, feedback).await?;
            if let Some(handle) = outcome.feedback.take() {
                // the process exits right after, so give the signal a chance to go out
                let _ = handle.await;
            }
            eprintln!("{}", outcome.notice());
            println!("{}", outcome.redirect_to);
        }
        Command::Clusters {
            project,
            clustering,
            seed,
            org,
        } => {
            let config = Config::from_env()?;
            let client = PlatformClient::new(&config.platform_api_url, &config.access_token)?;
            match browse_clusters(&client, &project, clustering.as_deref()).await? {
                Some(view) if seed => {
                    let seeds: Vec<_> = view
                        .clusters
                        .iter()
                        .map(|c| c.to_event_seed(&project, &org))
                        .collect();
                    print_json(&seeds)?;
                }
                Some(view) => {
                    println!("{}", view.clustering.display_name());
                    for cluster in &view.clusters {
                        let hint = if cluster.can_break_down() { " (break down)" } else { "" };
                        println!("{:>6}  {}{}", cluster.size, cluster.name, hint);
                    }
                }
                None => println!("No clustering yet"),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clusters_seed_flag_parses() {
        let cli = Cli::try_parse_from([
            "eventkit", "clusters", "--project", "p1", "--seed", "--org", "o1",
        ])
        .unwrap();
        match cli.command {
            Command::Clusters {
                project,
                clustering,
                seed,
                org,
            } => {
                assert_eq!(project, "p1");
                assert!(clustering.is_none());
                assert!(seed);
                assert_eq!(org, "o1");
            }
            _ => panic!("expected clusters subcommand"),
        }
    }

    #[test]
    fn onboard_collects_repeated_skips() {
        let cli = Cli::try_parse_from([
            "eventkit",
            "onboard",
            "--project",
            "p1",
            "--org",
            "o1",
            "--template",
            "Customer support",
            "--skip",
            "Toxic content",
            "--skip",
            "Sentiment",
        ])
        .unwrap();
        match cli.command {
            Command::Onboard { skip, task_id, .. } => {
                assert_eq!(skip, vec!["Toxic content", "Sentiment"]);
                assert!(task_id.is_none());
            }
            _ => panic!("expected onboard subcommand"),
        }
    }
}
