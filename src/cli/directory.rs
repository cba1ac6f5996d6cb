//! User and group CLI commands

use clap::Subcommand;

use crate::display::{format_group_list, format_user_list};
use crate::error::SplitResult;
use crate::services::DirectoryService;
use crate::storage::LedgerRepository;

/// User subcommands
#[derive(Subcommand)]
pub enum UserCommands {
    /// Register a user
    Add {
        /// Display name
        name: String,
        /// Email address
        #[arg(short, long)]
        email: Option<String>,
    },
    /// List all users
    List,
    /// Make two users friends
    Befriend {
        /// First user (name or ID)
        user: String,
        /// Second user (name or ID)
        friend: String,
    },
}

/// Group subcommands
#[derive(Subcommand)]
pub enum GroupCommands {
    /// Create a group
    Create {
        /// Group name
        name: String,
        /// Members (names or IDs)
        #[arg(short, long = "member", num_args = 1..)]
        members: Vec<String>,
    },
    /// List all groups
    List,
    /// Add a member to a group
    AddMember {
        /// Group name or ID
        group: String,
        /// User name or ID
        user: String,
    },
}

/// Handle a user command
pub fn handle_user_command(ledger: &LedgerRepository, cmd: UserCommands) -> SplitResult<()> {
    let service = DirectoryService::new(ledger);

    match cmd {
        UserCommands::Add { name, email } => {
            let user = service.add_user(&name, email.as_deref())?;
            println!("Added user: {} ({})", user.name, user.id);
        }
        UserCommands::List => {
            print!("{}", format_user_list(&service.list_users()?));
        }
        UserCommands::Befriend { user, friend } => {
            let user = service.resolve_user(&user)?;
            let friend = service.resolve_user(&friend)?;
            service.befriend(user.id, friend.id)?;
            println!("{} and {} are now friends", user.name, friend.name);
        }
    }

    Ok(())
}

/// Handle a group command
pub fn handle_group_command(ledger: &LedgerRepository, cmd: GroupCommands) -> SplitResult<()> {
    let service = DirectoryService::new(ledger);

    match cmd {
        GroupCommands::Create { name, members } => {
            let members = members
                .iter()
                .map(|m| service.resolve_user(m).map(|u| u.id))
                .collect::<SplitResult<Vec<_>>>()?;
            let group = service.create_group(&name, members)?;
            println!(
                "Created group: {} ({}, {} members)",
                group.name,
                group.id,
                group.members.len()
            );
        }
        GroupCommands::List => {
            let groups = service.list_groups()?;
            print!("{}", format_group_list(&groups, |u| service.label(u)));
        }
        GroupCommands::AddMember { group, user } => {
            let group = service.resolve_group(&group)?;
            let user = service.resolve_user(&user)?;
            let group = service.add_member(group.id, user.id)?;
            println!(
                "Added {} to {} ({} members)",
                user.name,
                group.name,
                group.members.len()
            );
        }
    }

    Ok(())
}
