use clap::{Arg, ArgMatches, Command};
use log::info;
use mockable::Clock;
use std::error::Error;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use recovery_reset::auth::{validate_password, NewUser, ResetPasswordRequest};
use recovery_reset::utils::io::{is_valid_email, prompt_secret};
use recovery_reset::utils::logging::{initialize_logging, mask_sensitive};
use recovery_reset::utils::time::{format_duration, format_timestamp, utc_to_local};
use recovery_reset::{
    system_clock, FileTokenStore, FileUserStore, PasswordHasher, Pbkdf2Hasher, RecoveryIssuer,
    ResetError, ResetPasswordService, Settings, SharedClock, TokenStore, UserStore,
    PASSPHRASE_ENV,
};

/// Stores and collaborators opened from settings
struct Context {
    settings: Settings,
    users: Arc<FileUserStore>,
    tokens: Arc<FileTokenStore>,
    hasher: Arc<Pbkdf2Hasher>,
    clock: SharedClock,
}

impl Context {
    fn open(settings: Settings) -> Result<Self, Box<dyn Error>> {
        let passphrase = match std::env::var(PASSPHRASE_ENV) {
            Ok(passphrase) => passphrase,
            Err(_) => prompt_secret("Store passphrase: ")?,
        };
        let clock = system_clock();
        let users = FileUserStore::open(
            &settings.users_path(),
            &passphrase,
            settings.kdf_iterations,
        )?;
        let tokens = FileTokenStore::open(
            &settings.tokens_path(),
            &passphrase,
            settings.kdf_iterations,
            clock.clone(),
        )?;
        info!("Opened user store at {}", users.path().display());

        Ok(Self {
            hasher: Arc::new(Pbkdf2Hasher::new(settings.kdf_iterations)),
            users: Arc::new(users),
            tokens: Arc::new(tokens),
            clock,
            settings,
        })
    }

    fn reset_service(&self) -> ResetPasswordService {
        ResetPasswordService::new(
            self.users.clone(),
            self.tokens.clone(),
            self.hasher.clone(),
            self.clock.clone(),
            self.settings.policy(),
        )
    }
}

fn cli() -> Command {
    Command::new("recovery-reset")
        .about("Issue and redeem password recovery tokens")
        .arg(
            Arg::new("config")
                .long("config")
                .help("Path to the JSON settings file")
                .value_name("PATH")
                .default_value("recovery-reset.json"),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("add-user")
                .about("Create a user account")
                .arg(Arg::new("name").long("name").required(true))
                .arg(Arg::new("email").long("email").required(true)),
        )
        .subcommand(
            Command::new("issue")
                .about("Issue a recovery token for a user")
                .arg(
                    Arg::new("user")
                        .long("user")
                        .help("The id of the user")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("reset")
                .about("Redeem a recovery token for a new password")
                .arg(Arg::new("token").long("token").required(true)),
        )
        .subcommand(
            Command::new("inspect")
                .about("Show when a recovery token expires")
                .arg(Arg::new("token").long("token").required(true)),
        )
}

fn main() {
    let matches = cli().get_matches();

    let config_path = matches
        .get_one::<String>("config")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("recovery-reset.json"));

    let settings = match Settings::load(&config_path) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            process::exit(2);
        }
    };

    if let Err(e) = initialize_logging(settings.log_file.as_deref()) {
        eprintln!("Warning: failed to initialize logging: {}", e);
    }

    if let Err(e) = run(&matches, settings) {
        match e.downcast_ref::<ResetError>() {
            Some(reset) => eprintln!(
                "Error [{:?}/{}]: {}",
                reset.category(),
                reset.kind(),
                reset
            ),
            None => eprintln!("Error: {}", e),
        }
        process::exit(1);
    }
}

fn run(matches: &ArgMatches, settings: Settings) -> Result<(), Box<dyn Error>> {
    // Interactive prompts come before the stores are opened
    match matches.subcommand() {
        Some(("add-user", sub_matches)) => handle_add_user(settings, sub_matches),
        Some(("issue", sub_matches)) => handle_issue(&Context::open(settings)?, sub_matches),
        Some(("reset", sub_matches)) => handle_reset(settings, sub_matches),
        Some(("inspect", sub_matches)) => handle_inspect(&Context::open(settings)?, sub_matches),
        _ => Err("unknown command".into()),
    }
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str, Box<dyn Error>> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| format!("missing --{}", name).into())
}

/// Prompt twice for a new password and check its strength
fn read_new_password() -> Result<String, Box<dyn Error>> {
    println!("(minimum 8 characters, must include uppercase, lowercase, number, and special char)");
    let password = prompt_secret("New password: ")?;
    if let Err(e) = validate_password(&password) {
        return Err(format!("Password validation failed: {:?}", e).into());
    }
    let confirm_password = prompt_secret("Confirm new password: ")?;
    if password != confirm_password {
        return Err("Passwords don't match".into());
    }
    Ok(password)
}

fn handle_add_user(settings: Settings, sub_matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let name = required(sub_matches, "name")?;
    let email = required(sub_matches, "email")?;
    if !is_valid_email(email) {
        return Err("Invalid email format".into());
    }

    let password = read_new_password()?;
    let context = Context::open(settings)?;
    let user = context.users.create(NewUser {
        name: name.to_string(),
        email: email.to_string(),
        password: context.hasher.hash(&password)?,
    })?;

    println!("User created: {}", user.id);
    Ok(())
}

fn handle_issue(context: &Context, sub_matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let user_id = required(sub_matches, "user")?;
    let issuer = RecoveryIssuer::new(context.users.clone(), context.tokens.clone());
    let recovery = issuer.issue(user_id)?;

    let expires_at = recovery.expires_at(context.settings.policy().validity_window);
    println!("Recovery token: {}", recovery.token);
    println!("Expires at:     {}", utc_to_local(expires_at));
    Ok(())
}

fn handle_reset(settings: Settings, sub_matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let token = required(sub_matches, "token")?;
    let password = read_new_password()?;
    let context = Context::open(settings)?;

    context.reset_service().execute(ResetPasswordRequest {
        token: token.to_string(),
        password,
    })?;

    println!("Password reset successful!");
    Ok(())
}

fn handle_inspect(context: &Context, sub_matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let token = required(sub_matches, "token")?;
    let recovery = context
        .tokens
        .find_by_token(token)?
        .ok_or(ResetError::InvalidToken)?;

    let window = context.settings.policy().validity_window;
    let now = context.clock.utc();
    println!("Owner:      {}", mask_sensitive(&recovery.user_id));
    println!("Created at: {}", format_timestamp(recovery.created_at));
    println!("Expires at: {}", format_timestamp(recovery.expires_at(window)));
    if recovery.is_expired(now, window) {
        println!("Status:     expired");
    } else {
        println!(
            "Status:     valid for {}",
            format_duration(recovery.expires_at(window) - now)
        );
    }
    Ok(())
}
