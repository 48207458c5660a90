//! Bootstraps an admin account.
//!
//! Interactive by default; `--noinput` with `--username`, `--email` and
//! `--password` for provisioning scripts.

use clap::Parser;
use console::style;
use dialoguer::{Confirm, Input, Password};
use medmatch_db::{AdminRole, MatchStore};

#[derive(Parser, Debug)]
#[command(name = "medmatch-createadmin")]
#[command(about = "Creates an admin account", long_about = None)]
struct Args {
	/// Username for the admin
	#[arg(long, value_name = "USERNAME")]
	username: Option<String>,

	/// Email address for the admin
	#[arg(long, value_name = "EMAIL")]
	email: Option<String>,

	/// Password (non-interactive mode only; prompted otherwise)
	#[arg(long, value_name = "PASSWORD")]
	password: Option<String>,

	/// Grant the super-admin role instead of admin
	#[arg(long)]
	super_admin: bool,

	/// Non-interactive mode (requires --username, --email and --password)
	#[arg(long)]
	noinput: bool,

	/// Database connection string
	#[arg(long, value_name = "DATABASE", default_value = "sqlite:medmatch.db")]
	database: String,
}

fn validate_username(username: &str) -> bool {
	username.len() >= 3
		&& username
			.chars()
			.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn validate_email(email: &str) -> bool {
	email.contains('@') && email.contains('.')
}

fn required_in_noinput(value: Option<String>, flag: &str) -> String {
	match value {
		Some(value) => value,
		None => {
			eprintln!(
				"{}",
				style(format!("Error: {} is required in non-interactive mode", flag)).red()
			);
			std::process::exit(1);
		}
	}
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	println!("{}", style("Creating admin account").cyan().bold());
	println!();

	let username = if args.noinput {
		let username = required_in_noinput(args.username, "--username");
		if !validate_username(&username) {
			eprintln!("{}", style("Error: Invalid username").red());
			std::process::exit(1);
		}
		username
	} else if let Some(username) = args.username {
		username
	} else {
		Input::<String>::new()
			.with_prompt("Username")
			.validate_with(|input: &String| -> Result<(), &str> {
				if validate_username(input) {
					Ok(())
				} else {
					Err("Username must be at least 3 characters (letters, digits, - and _)")
				}
			})
			.interact_text()?
	};

	let email = if args.noinput {
		let email = required_in_noinput(args.email, "--email");
		if !validate_email(&email) {
			eprintln!("{}", style("Error: Invalid email address").red());
			std::process::exit(1);
		}
		email
	} else if let Some(email) = args.email {
		email
	} else {
		Input::<String>::new()
			.with_prompt("Email address")
			.validate_with(|input: &String| -> Result<(), &str> {
				if validate_email(input) {
					Ok(())
				} else {
					Err("Invalid email address")
				}
			})
			.interact_text()?
	};

	let password = if args.noinput {
		required_in_noinput(args.password, "--password")
	} else {
		Password::new()
			.with_prompt("Password")
			.with_confirmation("Password (again)", "Error: Passwords do not match")
			.validate_with(|input: &String| -> Result<(), &str> {
				if input.len() >= 8 {
					Ok(())
				} else {
					Err("Password must be at least 8 characters")
				}
			})
			.interact()?
	};

	let role = if args.super_admin {
		AdminRole::SuperAdmin
	} else {
		AdminRole::Admin
	};

	println!();
	println!("{}", style("Admin details:").green().bold());
	println!("  Username: {}", style(&username).yellow());
	println!("  Email:    {}", style(&email).yellow());
	println!("  Role:     {}", style(role.as_str()).yellow());

	if !args.noinput {
		println!();
		let confirmed = Confirm::new()
			.with_prompt("Create admin?")
			.default(true)
			.interact()?;
		if !confirmed {
			println!("{}", style("Admin creation cancelled").yellow());
			return Ok(());
		}
	}

	println!();
	println!("{}", style("Connecting to database...").cyan());
	let store = MatchStore::connect(&args.database).await?;
	store.create_schema().await?;

	let user = store.create_user(&username, &email, &password).await?;
	store.grant_role(&user.id, role).await?;
	store.ensure_profile(&user.id, Some(&username)).await?;

	println!("{}", style("✓ Admin created successfully!").green().bold());
	println!();
	println!("  Database: {}", style(&args.database).dim());
	println!("  Username: {}", style(&username).yellow());
	println!("  User id:  {}", style(&user.id).dim());

	Ok(())
}
