use unixcrypt::unix::{self, SaltStatus};

use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about)]
#[command(infer_subcommands = true)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    generate: GenerateArgs,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Hash a password with a freshly generated setting
    Generate(GenerateArgs),
    /// Check a password against a hash
    Validate(ValidateArgs),
    /// Print a new setting string
    Gensalt(GensaltArgs),
    /// Report whether a setting or hash is fit for use
    Check(CheckArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Scheme {
    Bcrypt,
    Yescrypt,
    GostYescrypt,
    Scrypt,
    Argon2d,
    Argon2i,
    Argon2id,
    Sha512,
    Sha256,
    Sha1,
    Sunmd5,
    Md5,
    Nt,
    Bsdi,
    Des,
}

impl Scheme {
    fn prefix(self) -> &'static str {
	match self {
	    Scheme::Bcrypt => "$2b$",
	    Scheme::Yescrypt => "$y$",
	    Scheme::GostYescrypt => "$gy$",
	    Scheme::Scrypt => "$7$",
	    Scheme::Argon2d => "$argon2d$",
	    Scheme::Argon2i => "$argon2i$",
	    Scheme::Argon2id => "$argon2id$",
	    Scheme::Sha512 => "$6$",
	    Scheme::Sha256 => "$5$",
	    Scheme::Sha1 => "$sha1",
	    Scheme::Sunmd5 => "$md5",
	    Scheme::Md5 => "$1$",
	    Scheme::Nt => "$3$",
	    Scheme::Bsdi => "_",
	    Scheme::Des => "",
	}
    }
}

#[derive(Clone, Debug, Args)]
struct PasswordArgs {
    /// The password; prompted for if not given
    #[arg(long, short, env = "UNIXCRYPT_PASSWORD", hide_env_values = true)]
    password: Option<String>,
    /// Read the password from the first line of a file, which takes
    /// precedence over the other sources
    #[arg(long)]
    password_file: Option<PathBuf>,
}

#[derive(Clone, Debug, Args)]
struct GenerateArgs {
    #[command(flatten)]
    password: PasswordArgs,
    /// Hashing method; the library's preferred method if not given
    #[arg(long, short, value_enum)]
    scheme: Option<Scheme>,
    /// Method-specific cost, 0 for the default
    #[arg(long, short, default_value_t = 0)]
    count: u64,
}

#[derive(Clone, Debug, Args)]
struct ValidateArgs {
    #[command(flatten)]
    password: PasswordArgs,
    hash: String,
}

#[derive(Clone, Debug, Args)]
struct GensaltArgs {
    #[arg(long, short, value_enum)]
    scheme: Option<Scheme>,
    #[arg(long, short, default_value_t = 0)]
    count: u64,
}

#[derive(Clone, Debug, Args)]
struct CheckArgs {
    setting: String,
}

fn generate(GenerateArgs { password, scheme, count }: GenerateArgs) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let pw = get_password(password, true)?;
    let setting = unix::gensalt(scheme.map(Scheme::prefix), count)?;
    println!("{}", unix::crypt(pw, &setting)?);
    Ok(ExitCode::SUCCESS)
}

fn validate(ValidateArgs { password, hash }: ValidateArgs) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let pw = get_password(password, false)?;
    if unix::verify(pw, &hash) {
	println!("valid");
	Ok(ExitCode::SUCCESS)
    } else {
	println!("not valid");
	Ok(ExitCode::FAILURE)
    }
}

fn gensalt(GensaltArgs { scheme, count }: GensaltArgs) -> Result<ExitCode, Box<dyn std::error::Error>> {
    println!("{}", unix::gensalt(scheme.map(Scheme::prefix), count)?);
    Ok(ExitCode::SUCCESS)
}

fn check(CheckArgs { setting }: CheckArgs) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let status = unix::checksalt(&setting);
    let label = match status {
	SaltStatus::Ok => "ok",
	SaltStatus::Legacy => "legacy",
	SaltStatus::Disabled => "disabled",
	SaltStatus::Invalid => "invalid",
    };
    println!("{}", label);
    Ok(if status == SaltStatus::Ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();
    let cmd = cli.command.unwrap_or(Commands::Generate(cli.generate));
    match cmd {
	Commands::Generate(args) => generate(args),
	Commands::Validate(args) => validate(args),
	Commands::Gensalt(args) => gensalt(args),
	Commands::Check(args) => check(args),
    }
}

fn get_password(PasswordArgs { password, password_file }: PasswordArgs, confirm: bool) -> io::Result<String> {
    if let Some(path) = password_file {
	let contents = fs::read_to_string(path)?;
	return Ok(contents.lines().next().unwrap_or("").to_string());
    }
    if let Some(pw) = password {
	return Ok(pw);
    }
    if !confirm {
	return rpassword::prompt_password("Password: ");
    }
    loop {
	let pw = rpassword::prompt_password("Enter new password: ")?;
	let confirmed = rpassword::prompt_password("Retype new password: ")?;
	if pw == confirmed {
	    return Ok(pw)
	}
	println!("Error: Passwords don't match!")
    }
}
