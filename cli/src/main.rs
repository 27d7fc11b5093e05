//! TaskDesk CLI
//!
//! Drives the task desk from a terminal. State lives in the configured
//! data directory, so successive invocations (and other running
//! instances) see each other's writes. Results are printed as JSON.
//!
//! ```sh
//! taskdesk login --email admin@admin.com --password admin
//! taskdesk users create-manager --name "Max" --email max@x.com --password pw
//! taskdesk tasks create --title "Report" --description "Q1" --deadline 2026-05-01 --assigned-to <id>
//! taskdesk chat unread
//! taskdesk watch
//! ```

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info};
use validator::Validate;

use taskdesk::application::Session;
use taskdesk::config::{AppConfig, StorageBackendKind};
use taskdesk::domain::{
    Attachment, CreateTaskDto, DomainError, RegisterUserDto, TaskStatus, UpdateTaskDto,
    UpdateUserDto, UserRole,
};
use taskdesk::shared::shutdown::listen_for_ctrl_c;
use taskdesk::{init_tracing, TaskDesk, TaskDeskOptions};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// TaskDesk: role-based task assignment and chat, from the command line.
#[derive(Parser, Debug)]
#[command(
    name = "taskdesk",
    version,
    about = "Task assignment dashboard engine",
    long_about = "TaskDesk keeps users, tasks and conversations in a local data \
                  directory shared by every running instance.\n\n\
                  Default config: ~/.config/taskdesk/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "TASKDESK_CONFIG")]
    config: Option<PathBuf>,

    /// Override the data directory.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate the configuration and exit.
    Check,
    /// Sign in; the session is kept for later invocations.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    /// Show the signed-in user.
    Whoami,
    #[command(subcommand)]
    Users(UsersCommand),
    #[command(subcommand)]
    Tasks(TasksCommand),
    #[command(subcommand)]
    Chat(ChatCommand),
    /// Print change events as JSON lines until Ctrl+C.
    Watch,
}

#[derive(Args, Debug)]
struct NewUserArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
    #[arg(long)]
    avatar: Option<String>,
}

impl NewUserArgs {
    fn into_dto(self) -> RegisterUserDto {
        RegisterUserDto {
            name: self.name,
            email: self.email,
            password: self.password,
            role: None,
            avatar: self.avatar,
        }
    }
}

#[derive(Subcommand, Debug)]
enum UsersCommand {
    List {
        #[arg(long)]
        role: Option<UserRole>,
    },
    /// Self sign-up as an employee; signs the new user in.
    Register(NewUserArgs),
    /// Admin only.
    CreateManager(NewUserArgs),
    /// Edit the signed-in user's profile.
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        avatar: Option<String>,
    },
    /// Admin only.
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
enum TasksCommand {
    /// Tasks visible to the signed-in user.
    List {
        /// Only tasks due on or after this date.
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Only tasks due on or before this date.
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Manager or admin only.
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        deadline: NaiveDate,
        #[arg(long)]
        assigned_to: String,
    },
    /// Manager or admin only.
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        deadline: Option<NaiveDate>,
        #[arg(long)]
        assigned_to: Option<String>,
        #[arg(long)]
        status: Option<TaskStatus>,
    },
    /// Hand in a task assigned to the signed-in user.
    Submit {
        id: String,
        #[arg(long)]
        file_name: String,
        #[arg(long, default_value_t = 0)]
        file_size: u64,
        #[arg(long, default_value = "")]
        url: String,
    },
    /// Dashboard counters for the visible tasks.
    Stats,
}

#[derive(Subcommand, Debug)]
enum ChatCommand {
    Send {
        #[arg(long)]
        to: String,
        #[arg(long)]
        text: String,
    },
    /// Show the thread with a peer and mark it read.
    Open { peer: String },
    /// Unread message count for the signed-in user.
    Unread,
    /// Conversation list for the signed-in user.
    List,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        error!("{}", e);
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let config_path = cli.config.unwrap_or_else(taskdesk::default_config_path);
    let mut config = AppConfig::load(&config_path)?;

    // Successive invocations must share state.
    config.storage.backend = StorageBackendKind::File;
    if let Some(dir) = cli.data_dir {
        config.storage.data_dir = dir;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    init_tracing(&config.logging);
    info!(config = %config_path.display(), data_dir = %config.storage.data_dir.display(), "Configuration loaded");

    if let Command::Check = cli.command {
        println!("Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   Data dir    : {}", config.storage.data_dir.display());
        println!("   Log level   : {}", config.logging.level);
        println!("   Seed admin  : {}", config.seed.admin_email);
        return Ok(());
    }

    if !matches!(cli.command, Command::Watch) {
        config.storage.watch_interval_ms = 0;
    }
    let desk = TaskDesk::start(TaskDeskOptions::new(config)).await?;
    let result = dispatch(&desk, cli.command).await;
    desk.shutdown().await;
    result
}

async fn dispatch(desk: &TaskDesk, command: Command) -> CliResult<()> {
    match command {
        Command::Check => Ok(()),
        Command::Login { email, password } => print(&desk.session().login(&email, &password).await?),
        Command::Logout => {
            desk.session().logout()?;
            print(&serde_json::json!({ "signedOut": true }))
        }
        Command::Whoami => print(&desk.session().current_user()),
        Command::Users(cmd) => users(desk, cmd).await,
        Command::Tasks(cmd) => tasks(desk, cmd).await,
        Command::Chat(cmd) => chat(desk, cmd).await,
        Command::Watch => watch(desk).await,
    }
}

async fn users(desk: &TaskDesk, command: UsersCommand) -> CliResult<()> {
    let identity = desk.identity();
    match command {
        UsersCommand::List { role } => {
            desk.session().require()?;
            let users = match role {
                Some(role) => identity.list_users_by_role(role).await?,
                None => identity.list_users().await?,
            };
            print(&users)
        }
        UsersCommand::Register(args) => {
            let dto = args.into_dto();
            dto.validate()?;
            print(&desk.session().register(dto).await?)
        }
        UsersCommand::CreateManager(args) => {
            require_role(desk, &[UserRole::Admin])?;
            let dto = args.into_dto();
            dto.validate()?;
            print(&identity.create_manager(dto).await?)
        }
        UsersCommand::Update {
            name,
            email,
            password,
            avatar,
        } => {
            let session = desk.session().require()?;
            let dto = UpdateUserDto {
                name,
                email,
                password,
                avatar,
            };
            dto.validate()?;
            print(&identity.update_profile(&session.user_id, dto).await?)
        }
        UsersCommand::Delete { id } => {
            require_role(desk, &[UserRole::Admin])?;
            identity.delete_user(&id).await?;
            print(&serde_json::json!({ "deleted": id }))
        }
    }
}

async fn tasks(desk: &TaskDesk, command: TasksCommand) -> CliResult<()> {
    let service = desk.tasks();
    match command {
        TasksCommand::List { from, to } => {
            let session = desk.session().require()?;
            let visible = service.tasks_for(&session).await?;
            let visible: Vec<_> = visible
                .into_iter()
                .filter(|t| from.map_or(true, |d| t.deadline >= d))
                .filter(|t| to.map_or(true, |d| t.deadline <= d))
                .collect();
            print(&visible)
        }
        TasksCommand::Create {
            title,
            description,
            deadline,
            assigned_to,
        } => {
            require_role(desk, &[UserRole::Admin, UserRole::Manager])?;
            let dto = CreateTaskDto {
                title,
                description,
                deadline,
                assigned_to,
                attachments: Vec::new(),
            };
            dto.validate()?;
            desk.identity().get_user(&dto.assigned_to).await?;
            print(&service.create_task(dto).await?)
        }
        TasksCommand::Update {
            id,
            title,
            description,
            deadline,
            assigned_to,
            status,
        } => {
            require_role(desk, &[UserRole::Admin, UserRole::Manager])?;
            let dto = UpdateTaskDto {
                title,
                description,
                deadline,
                assigned_to,
                status,
                attachments: None,
            };
            print(&service.update_task(&id, dto).await?)
        }
        TasksCommand::Submit {
            id,
            file_name,
            file_size,
            url,
        } => {
            let session = desk.session().require()?;
            let task = service.get_task(&id).await?;
            if task.assigned_to != session.user_id {
                return Err(DomainError::Forbidden("task is assigned to someone else".into()).into());
            }
            let attachment = Attachment {
                file_name,
                file_size,
                url,
            };
            print(&service.submit_task(&id, attachment).await?)
        }
        TasksCommand::Stats => {
            let session = desk.session().require()?;
            let visible = service.tasks_for(&session).await?;
            print(&service.stats(&visible))
        }
    }
}

async fn chat(desk: &TaskDesk, command: ChatCommand) -> CliResult<()> {
    let session = desk.session().require()?;
    let chat = desk.chat();
    match command {
        ChatCommand::Send { to, text } => {
            desk.identity().get_user(&to).await?;
            print(&chat.send_message(&session.user_id, &to, &text).await?)
        }
        ChatCommand::Open { peer } => print(&chat.open_conversation(&session.user_id, &peer).await?),
        ChatCommand::Unread => {
            let unread = chat.unread_count(&session.user_id).await?;
            print(&serde_json::json!({ "userId": session.user_id, "unread": unread }))
        }
        ChatCommand::List => {
            let peers = desk.identity().list_users().await?;
            print(&chat.summaries(&session.user_id, &peers).await?)
        }
    }
}

async fn watch(desk: &TaskDesk) -> CliResult<()> {
    let mut events = desk.subscribe();
    let shutdown = desk.shutdown_signal();
    tokio::spawn(listen_for_ctrl_c(shutdown.clone()));
    info!("Watching for changes, press Ctrl+C to stop");

    loop {
        tokio::select! {
            _ = shutdown.wait() => break,
            event = events.recv() => match event {
                Some(event) => println!("{}", serde_json::to_string(&event)?),
                None => break,
            },
        }
    }
    Ok(())
}

fn require_role(desk: &TaskDesk, allowed: &[UserRole]) -> CliResult<Session> {
    let session = desk.session().require()?;
    if !allowed.contains(&session.role) {
        return Err(DomainError::Forbidden(format!("{} cannot do this", session.role)).into());
    }
    Ok(session)
}

fn print<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
