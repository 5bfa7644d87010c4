//! Account commands: `signup`, `signin`, `signout`, `whoami`.

use std::path::PathBuf;

use anyhow::Result;

use examdesk_core::validation::SignUpForm;

pub async fn sign_up(form: SignUpForm, config_path: Option<PathBuf>) -> Result<()> {
    let client = super::connect(config_path)?;
    let username = form.username.clone();
    client.sign_up(form).await?;
    println!("Account {username} created. Sign in with: examdesk signin --username {username}");
    Ok(())
}

pub async fn sign_in(
    username: String,
    password: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let client = super::connect(config_path)?;
    let user = client.sign_in(&username, &password).await?;
    println!("Signed in as {} ({})", user.display_name(), user.username);
    Ok(())
}

pub async fn sign_out(config_path: Option<PathBuf>) -> Result<()> {
    let client = super::connect(config_path)?;
    client.sign_out().await;
    println!("Signed out.");
    Ok(())
}

pub async fn whoami(config_path: Option<PathBuf>) -> Result<()> {
    let client = super::connect(config_path)?;
    let user = client.current_user().await?;

    println!("{}", user.display_name());
    println!("  id:       {}", user.id);
    println!("  username: {}", user.username);
    println!("  email:    {}", user.email);
    if !user.role.is_empty() {
        println!("  role:     {}", user.role);
    }
    if !user.is_verified {
        println!("  (email not verified)");
    }
    Ok(())
}
