use blogicum::{
    auth,
    config::AppConfig,
    db,
    repositories::users::{self, RegistrationForm},
};
use clap::Parser;
use validator::Validate;

/// Creates a staff account that can manage categories, locations and users.
#[derive(Parser, Debug)]
#[command(name = "createsuperuser")]
struct Args {
    #[arg(long)]
    username: String,

    /// Read from BLOGICUM_PASSWORD when omitted.
    #[arg(long, env = "BLOGICUM_PASSWORD", hide_env_values = true)]
    password: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let args = Args::parse();
    let form = RegistrationForm {
        username: args.username,
        password1: args.password.clone(),
        password2: args.password,
    };
    form.validate()?;

    let settings = AppConfig::load()?;
    let pool = db::setup_database(&settings).await?;

    let password_hash = auth::hash_password(&form.password1)?;
    let user = users::create(&pool, &form.username, &password_hash, true).await?;
    tracing::info!(user_id = user.id, username = %user.username, "Created staff user");

    Ok(())
}
