//! User and group formatting

use crate::models::{Group, User, UserId};

/// Format the user directory
pub fn format_user_list(users: &[User]) -> String {
    if users.is_empty() {
        return "No users found.\n".to_string();
    }

    let name_width = users.iter().map(|u| u.name.len()).max().unwrap_or(4).max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:12}  {:<name_width$}  {}\n",
        "ID",
        "Name",
        "Email",
        name_width = name_width
    ));
    output.push_str(&format!(
        "{:-<12}  {:-<name_width$}  {:-<5}\n",
        "",
        "",
        "",
        name_width = name_width
    ));

    for user in users {
        output.push_str(&format!(
            "{:12}  {:<name_width$}  {}\n",
            user.id.to_string(),
            user.name,
            user.email,
            name_width = name_width
        ));
    }
    output
}

/// Format groups with their member names
pub fn format_group_list(groups: &[Group], label: impl Fn(UserId) -> String) -> String {
    if groups.is_empty() {
        return "No groups found.\n".to_string();
    }

    let mut output = String::new();
    for group in groups {
        let members: Vec<String> = group.members.iter().map(|m| label(*m)).collect();
        output.push_str(&format!(
            "{}  {} ({} members): {}\n",
            group.id,
            group.name,
            members.len(),
            members.join(", ")
        ));
    }
    output
}
