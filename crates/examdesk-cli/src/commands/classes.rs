//! Class commands: `classes`, `class`, `create-class`, `join`.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::Cell;

use examdesk_core::validation::CreateClassForm;

use super::{connect, format_timestamp, table};

pub async fn list(config_path: Option<PathBuf>) -> Result<()> {
    let client = connect(config_path)?;
    let classes = client.my_classes().await?;

    if classes.is_empty() {
        println!("You are not in any class yet. Join one with: examdesk join <class id>");
        return Ok(());
    }

    let mut table = table(vec!["Class ID", "Name", "Role", "Max members"]);
    for membership in &classes {
        table.add_row(vec![
            Cell::new(&membership.info.class_id),
            Cell::new(&membership.class.name),
            Cell::new(&membership.info.role),
            Cell::new(
                membership
                    .class
                    .max_mem
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "-".into()),
            ),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub async fn show(
    class_id: String,
    members: bool,
    stats: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let client = connect(config_path)?;
    let info = client.class_info(&class_id).await?;

    println!("{} ({})", info.name, info.id);
    if let Some(description) = info.description.as_deref().filter(|d| !d.is_empty()) {
        println!("  {description}");
    }
    match info.max_mem {
        Some(max) => println!("  members: {}/{max}", info.members.len()),
        None => println!("  members: {}", info.members.len()),
    }
    println!("  created: {}", format_timestamp(info.create_at));

    if members {
        let mut table = table(vec!["User ID", "Name", "Email", "Role", "Joined"]);
        for (member, profile) in client.class_members(&info).await {
            let (name, email) = match &profile {
                Some(p) => (format!("{} {}", p.first_name, p.last_name), p.email.clone()),
                None => ("?".to_string(), "?".to_string()),
            };
            table.add_row(vec![
                Cell::new(&member.user_id),
                Cell::new(name.trim()),
                Cell::new(email),
                Cell::new(format!("{:?}", member.role).to_lowercase()),
                Cell::new(member.joined_at.as_deref().unwrap_or("-")),
            ]);
        }
        println!("\n{table}");
    }

    if stats {
        let stats = client.class_stats(&class_id).await?;
        println!("\nSubmissions: {}", stats.total);
        println!("  completed: {}", stats.completed);
        println!("  pending:   {}", stats.pending);
        match stats.average_score {
            Some(avg) => println!("  average:   {avg:.2}"),
            None => println!("  average:   -"),
        }
    }

    Ok(())
}

pub async fn create(
    name: String,
    description: String,
    max_members: u32,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let form = CreateClassForm {
        name,
        description,
        max_members,
    };
    form.validate()?;

    let client = connect(config_path)?;
    client.create_class(&form).await?;
    println!("Created class {}.", form.name.trim());
    Ok(())
}

pub async fn join(class_id: String, config_path: Option<PathBuf>) -> Result<()> {
    let client = connect(config_path)?;
    let invite = client.resolve_invite(&class_id).await?;

    println!(
        "Invite to {} (created {}): {}",
        invite.class_name,
        format_timestamp(invite.created_at),
        invite.status
    );
    if !invite.can_join() {
        println!("You are already a member of this class.");
        return Ok(());
    }

    let invite = client.accept_invite(invite).await?;
    println!("Joined {}.", invite.class_name);
    Ok(())
}
