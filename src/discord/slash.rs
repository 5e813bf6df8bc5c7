//! Slash command definitions derived from the registry
//!
//! Every `HandlerKind::Command` descriptor becomes a global slash command with
//! one optional free-form `arguments` option, so the same handler serves both
//! `!name args` and `/name arguments:args`.

use anyhow::Result;
use log::info;
use serenity::builder::CreateApplicationCommand;
use serenity::http::Http;
use serenity::model::application::command::{Command, CommandOptionType};
use std::sync::Arc;

use crate::commands::{HandlerDescriptor, HandlerKind};

pub const ARGUMENTS_OPTION: &str = "arguments";

/// Discord caps slash command descriptions at 100 characters
const DESCRIPTION_LIMIT: usize = 100;

pub fn create_slash_command(descriptor: &HandlerDescriptor) -> CreateApplicationCommand {
    let description = if descriptor.description.is_empty() {
        format!("Run {}", descriptor.id)
    } else {
        descriptor.description.chars().take(DESCRIPTION_LIMIT).collect()
    };

    let mut command = CreateApplicationCommand::default();
    command
        .name(descriptor.id.to_lowercase())
        .description(description)
        .create_option(|option| {
            option
                .name(ARGUMENTS_OPTION)
                .description("Command arguments")
                .kind(CommandOptionType::String)
                .required(false)
        });
    if !descriptor.required_user_permissions.is_empty() {
        command.default_member_permissions(descriptor.required_user_permissions);
    }
    command
}

pub fn create_slash_commands(descriptors: &[Arc<HandlerDescriptor>]) -> Vec<CreateApplicationCommand> {
    descriptors
        .iter()
        .filter(|d| d.kind == HandlerKind::Command)
        .map(|d| create_slash_command(d))
        .collect()
}

/// Replace the global slash command set with the registry's commands
pub async fn register_global_commands(
    http: &Http,
    descriptors: &[Arc<HandlerDescriptor>],
) -> Result<()> {
    let slash_commands = create_slash_commands(descriptors);
    let count = slash_commands.len();

    Command::set_global_application_commands(http, |commands| {
        for command in slash_commands {
            commands.add_application_command(command);
        }
        commands
    })
    .await?;

    info!("Global slash commands registered successfully ({count} commands)");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serenity::model::Permissions;

    fn name_of(command: &CreateApplicationCommand) -> String {
        command.0.get("name").unwrap().as_str().unwrap().to_string()
    }

    #[test]
    fn test_only_commands_become_slash_commands() {
        let descriptors = vec![
            Arc::new(HandlerDescriptor::command("ping")),
            Arc::new(HandlerDescriptor::button("help_refresh")),
            Arc::new(HandlerDescriptor::modal("feedback_modal")),
        ];

        let commands = create_slash_commands(&descriptors);
        let names: Vec<String> = commands.iter().map(name_of).collect();
        assert_eq!(names, vec!["ping"]);
    }

    #[test]
    fn test_default_member_permissions() {
        let with = create_slash_command(
            &HandlerDescriptor::command("prefix").user_permissions(Permissions::MANAGE_GUILD),
        );
        let without = create_slash_command(&HandlerDescriptor::command("ping"));

        assert!(with.0.contains_key("default_member_permissions"));
        assert!(!without.0.contains_key("default_member_permissions"));
    }

    #[test]
    fn test_description_fallback_and_limit() {
        let fallback = create_slash_command(&HandlerDescriptor::command("ping"));
        assert_eq!(fallback.0.get("description").unwrap(), "Run ping");

        let long = "x".repeat(150);
        let truncated = create_slash_command(&HandlerDescriptor::command("ping").description(long));
        assert_eq!(
            truncated.0.get("description").unwrap().as_str().unwrap().len(),
            DESCRIPTION_LIMIT
        );
    }
}
