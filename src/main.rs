
use clap::{Args, Parser, Subcommand};
use roombook::app::{AppContext, OpenError};
use roombook::config::{ClientConfig, ConfigError};
use roombook::net::types::{ApiError, RegisterRequest, Role};
use roombook::routes::Route;
use roombook::routes::guard::Admission;
use roombook::routes::nav;
use roombook::screens::{self, ScreenError};
use roombook::services::auth::AuthError;
use roombook::services::notify::{self, Notification, NotificationLevel};
use roombook::state::storage::{FileStorage, StorageError};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("[{}] {}", .0.error_code(), .0)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Screen(#[from] ScreenError),
    #[error(transparent)]
    Open(#[from] OpenError),
    #[error("invalid role: {0}")]
    Role(#[from] roombook::net::types::UnknownRole),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl CliError {
    /// Whether the failure was already printed as an `[error]` notification.
    fn already_notified(&self) -> bool {
        matches!(
            self,
            Self::Auth(AuthError::Rejected(_)) | Self::Screen(ScreenError::Failed(_) | ScreenError::Invalid(_))
        )
    }
}

#[derive(Parser, Debug)]
#[command(name = "roombook", about = "Room booking client")]
struct Cli {
    /// Backend origin; overrides ROOMBOOK_BASE_URL.
    #[arg(long)]
    base_url: Option<String>,

    /// Credential file; overrides ROOMBOOK_STATE_FILE.
    #[arg(long)]
    state_file: Option<std::path::PathBuf>,

    /// Print raw JSON instead of tables.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "ROOMBOOK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Register(RegisterArgs),
    Logout,
    /// Show the current session.
    Whoami,
    /// Show the navigation links for the current session.
    Nav,
    /// Navigate to a path and report the guard decision.
    Open { path: String },
    /// Landing screen for the current role.
    Dashboard,
    Profile(ProfileCommand),
    Rooms(RoomsCommand),
    Bookings(BookingsCommand),
    Admin(AdminCommand),
}

#[derive(Args, Debug)]
struct RegisterArgs {
    #[arg(long)]
    username: String,
    #[arg(long, env = "ROOMBOOK_PASSWORD", hide_env_values = true)]
    password: String,
    #[arg(long)]
    email: String,
    #[arg(long, default_value = "STUDENT")]
    role: String,
    #[arg(long)]
    full_name: Option<String>,
    #[arg(long)]
    department: Option<String>,
}

#[derive(Args, Debug)]
struct ProfileCommand {
    #[command(subcommand)]
    command: Option<ProfileSubcommand>,
}

#[derive(Subcommand, Debug)]
enum ProfileSubcommand {
    Show,
    Update {
        #[arg(long)]
        data: String,
    },
    Password {
        #[arg(long)]
        old: String,
        #[arg(long)]
        new: String,
    },
}

#[derive(Args, Debug)]
struct RoomsCommand {
    #[command(subcommand)]
    command: RoomsSubcommand,
}

#[derive(Subcommand, Debug)]
enum RoomsSubcommand {
    /// Rooms free for a window (times as yyyy-MM-ddTHH:mm).
    Available {
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
    },
    Book {
        room_id: i64,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        #[arg(long, default_value = "")]
        purpose: String,
    },
}

#[derive(Args, Debug)]
struct BookingsCommand {
    #[command(subcommand)]
    command: BookingsSubcommand,
}

#[derive(Subcommand, Debug)]
enum BookingsSubcommand {
    List,
    Cancel {
        id: i64,
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
struct AdminCommand {
    #[command(subcommand)]
    command: AdminSubcommand,
}

#[derive(Subcommand, Debug)]
enum AdminSubcommand {
    Stats,
    Rooms(AdminRoomsCommand),
    Equipment(AdminEquipmentCommand),
    Users(AdminUsersCommand),
}

#[derive(Args, Debug)]
struct AdminRoomsCommand {
    #[command(subcommand)]
    command: AdminRoomsSubcommand,
}

#[derive(Subcommand, Debug)]
enum AdminRoomsSubcommand {
    List,
    Get { id: i64 },
    Create {
        #[arg(long)]
        data: String,
    },
    Update {
        id: i64,
        #[arg(long)]
        data: String,
    },
    Delete {
        id: i64,
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
    Status { id: i64, status: String },
    /// Upcoming bookings for a room.
    Schedule { id: i64 },
}

#[derive(Args, Debug)]
struct AdminEquipmentCommand {
    #[command(subcommand)]
    command: AdminEquipmentSubcommand,
}

#[derive(Subcommand, Debug)]
enum AdminEquipmentSubcommand {
    List,
    Get { id: i64 },
    Create {
        #[arg(long)]
        data: String,
    },
    Update {
        id: i64,
        #[arg(long)]
        data: String,
    },
    Delete {
        id: i64,
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
struct AdminUsersCommand {
    #[command(subcommand)]
    command: AdminUsersSubcommand,
}

#[derive(Subcommand, Debug)]
enum AdminUsersSubcommand {
    List,
    Get { id: i64 },
    Update {
        id: i64,
        #[arg(long)]
        data: String,
    },
    Delete {
        id: i64,
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
}

type App = AppContext<FileStorage>;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let (notifier, mut notifications) = notify::channel();

    let outcome = match build_app(&cli, notifier) {
        Ok(app) => {
            app.start().await;
            run(&app, cli.command, cli.json).await
        }
        Err(e) => Err(e),
    };

    print_notifications(&mut notifications);
    if let Err(e) = outcome {
        if !e.already_notified() {
            eprintln!("error: {e}");
        }
        std::process::exit(1);
    }
}

fn build_app(cli: &Cli, notifier: notify::Notifier) -> Result<App, CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url)?;
    }
    if let Some(state_file) = &cli.state_file {
        config.state_file.clone_from(state_file);
    }
    tracing::debug!(base_url = %config.base_url, state_file = %config.state_file.display(), "client config");

    let storage = FileStorage::open(&config.state_file)?;
    Ok(AppContext::new(&config, storage, notifier)?)
}

async fn run(app: &App, command: Command, json: bool) -> Result<(), CliError> {
    match command {
        Command::Login { username, password } => {
            app.navigator().go(Route::Login);
            app.auth().login(&username, &password).await?;
            app.navigator().return_after_login();
            println!("{}", app.navigator().current().route);
            Ok(())
        }
        Command::Register(args) => run_register(app, args).await,
        Command::Logout => {
            app.auth().logout();
            Ok(())
        }
        Command::Whoami => {
            let session = app.session().current();
            match &session.identity {
                Some(user) if json => print_json(user),
                Some(user) => {
                    println!("{} ({})", user.display_name(), user.role);
                    Ok(())
                }
                None => {
                    println!("not logged in");
                    Ok(())
                }
            }
        }
        Command::Nav => {
            let session = app.session().current();
            let current = app.navigator().current().route;
            for link in nav::links(&session, &current) {
                let marker = if link.active { "*" } else { " " };
                println!("{marker} {:<12} {}", link.label, link.route);
            }
            Ok(())
        }
        Command::Open { path } => {
            let decision = app.navigator().navigate(&path);
            let landed = app.navigator().current().route;
            match decision {
                Admission::Allow => println!("{landed}"),
                Admission::Pending => println!("loading"),
                Admission::RedirectToLogin { .. } | Admission::RedirectToDefault(_) => {
                    println!("{} -> {landed}", Route::parse(&path));
                }
            }
            Ok(())
        }
        Command::Dashboard => {
            print!("{}", screens::profile::dashboard(app)?);
            Ok(())
        }
        Command::Profile(profile) => run_profile(app, profile, json).await,
        Command::Rooms(rooms) => run_rooms(app, rooms, json).await,
        Command::Bookings(bookings) => run_bookings(app, bookings, json).await,
        Command::Admin(admin) => run_admin(app, admin, json).await,
    }
}

async fn run_register(app: &App, args: RegisterArgs) -> Result<(), CliError> {
    app.open(&Route::Register.path())?;
    let request = RegisterRequest {
        username: args.username,
        password: args.password,
        email: args.email,
        role: args.role.parse::<Role>()?,
        full_name: args.full_name,
        department: args.department,
    };
    app.auth().register(&request).await?;
    app.navigator().go(Route::Login);
    Ok(())
}

async fn run_profile(app: &App, profile: ProfileCommand, json: bool) -> Result<(), CliError> {
    match profile.command.unwrap_or(ProfileSubcommand::Show) {
        ProfileSubcommand::Show => {
            let user = screens::profile::show(app).await?;
            render(json, &user, screens::profile::render_profile)
        }
        ProfileSubcommand::Update { data } => {
            let form = parse_form(&data)?;
            let user = screens::profile::update(app, &form).await?;
            render(json, &user, screens::profile::render_profile)
        }
        ProfileSubcommand::Password { old, new } => {
            screens::profile::change_password(app, &old, &new).await?;
            Ok(())
        }
    }
}

async fn run_rooms(app: &App, rooms: RoomsCommand, json: bool) -> Result<(), CliError> {
    match rooms.command {
        RoomsSubcommand::Available { start, end } => {
            let rooms = screens::bookings::search(app, &start, &end).await?;
            render(json, &rooms, |r| screens::bookings::render_rooms(r))
        }
        RoomsSubcommand::Book { room_id, start, end, purpose } => {
            let booking = screens::bookings::book(app, room_id, &start, &end, &purpose).await?;
            let now = screens::bookings::local_now();
            render(json, &booking, |b| screens::bookings::render_bookings(std::slice::from_ref(b), now))
        }
    }
}

async fn run_bookings(app: &App, bookings: BookingsCommand, json: bool) -> Result<(), CliError> {
    match bookings.command {
        BookingsSubcommand::List => {
            let bookings = screens::bookings::mine(app).await?;
            let now = screens::bookings::local_now();
            render(json, &bookings, |b| screens::bookings::render_bookings(b, now))
        }
        BookingsSubcommand::Cancel { id, yes } => {
            screens::bookings::cancel(app, id, yes).await?;
            Ok(())
        }
    }
}

async fn run_admin(app: &App, cmd: AdminCommand, json: bool) -> Result<(), CliError> {
    use screens::admin;

    match cmd.command {
        AdminSubcommand::Stats => {
            let stats = admin::stats(app).await?;
            render(json, &stats, admin::render_stats)
        }
        AdminSubcommand::Rooms(rooms) => match rooms.command {
            AdminRoomsSubcommand::List => {
                let rooms = admin::rooms(app).await?;
                render(json, &rooms, |r| screens::bookings::render_rooms(r))
            }
            AdminRoomsSubcommand::Get { id } => print_json(&admin::room(app, id).await?),
            AdminRoomsSubcommand::Create { data } => {
                print_json(&admin::create_room(app, &parse_form(&data)?).await?)
            }
            AdminRoomsSubcommand::Update { id, data } => {
                print_json(&admin::update_room(app, id, &parse_form(&data)?).await?)
            }
            AdminRoomsSubcommand::Delete { id, yes } => Ok(admin::delete_room(app, id, yes).await?),
            AdminRoomsSubcommand::Status { id, status } => Ok(admin::set_room_status(app, id, &status).await?),
            AdminRoomsSubcommand::Schedule { id } => {
                let bookings = admin::room_schedule(app, id).await?;
                let now = screens::bookings::local_now();
                render(json, &bookings, |b| screens::bookings::render_bookings(b, now))
            }
        },
        AdminSubcommand::Equipment(equipment) => match equipment.command {
            AdminEquipmentSubcommand::List => {
                let items = admin::equipment(app).await?;
                render(json, &items, |i| admin::render_equipment(i))
            }
            AdminEquipmentSubcommand::Get { id } => print_json(&admin::equipment_item(app, id).await?),
            AdminEquipmentSubcommand::Create { data } => {
                print_json(&admin::save_equipment(app, None, &parse_form(&data)?).await?)
            }
            AdminEquipmentSubcommand::Update { id, data } => {
                print_json(&admin::save_equipment(app, Some(id), &parse_form(&data)?).await?)
            }
            AdminEquipmentSubcommand::Delete { id, yes } => Ok(admin::delete_equipment(app, id, yes).await?),
        },
        AdminSubcommand::Users(users) => match users.command {
            AdminUsersSubcommand::List => {
                let users = admin::users(app).await?;
                render(json, &users, |u| admin::render_users(u))
            }
            AdminUsersSubcommand::Get { id } => print_json(&admin::user(app, id).await?),
            AdminUsersSubcommand::Update { id, data } => {
                print_json(&admin::update_user(app, id, &parse_form(&data)?).await?)
            }
            AdminUsersSubcommand::Delete { id, yes } => Ok(admin::delete_user(app, id, yes).await?),
        },
    }
}

fn parse_form(data: &str) -> Result<Value, CliError> {
    Ok(serde_json::from_str::<Value>(data)?)
}

fn render<T: Serialize + ?Sized>(json: bool, value: &T, table: impl FnOnce(&T) -> String) -> Result<(), CliError> {
    if json {
        return print_json(value);
    }
    print!("{}", table(value));
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

fn print_notifications(rx: &mut UnboundedReceiver<Notification>) {
    while let Ok(Notification { level, message }) = rx.try_recv() {
        let tag = match level {
            NotificationLevel::Success => "ok",
            NotificationLevel::Error => "error",
            NotificationLevel::Info => "info",
        };
        eprintln!("[{tag}] {message}");
    }
}
