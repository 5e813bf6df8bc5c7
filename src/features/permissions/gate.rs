use serenity::model::Permissions;
use std::collections::HashSet;

use crate::commands::context::Actor;
use crate::commands::descriptor::HandlerDescriptor;
use crate::core::Denial;

/// Pure access check over (actor, bot permissions, descriptor)
#[derive(Debug, Clone, Default)]
pub struct PermissionGate {
    owners: HashSet<u64>,
}

impl PermissionGate {
    pub fn new(owners: HashSet<u64>) -> Self {
        Self { owners }
    }

    pub fn is_owner(&self, actor_id: u64) -> bool {
        self.owners.contains(&actor_id)
    }

    /// Evaluate in order: owner-only, user permissions, bot permissions
    pub fn evaluate(
        &self,
        actor: &Actor,
        bot_permissions: Permissions,
        descriptor: &HandlerDescriptor,
    ) -> Result<(), Denial> {
        if descriptor.owner_only && !self.is_owner(actor.id) {
            return Err(Denial::OwnerOnly);
        }

        let missing = missing_permissions(actor.permissions, descriptor.required_user_permissions);
        if !missing.is_empty() {
            return Err(Denial::InsufficientUserPermissions { missing });
        }

        let missing = missing_permissions(bot_permissions, descriptor.required_bot_permissions);
        if !missing.is_empty() {
            return Err(Denial::InsufficientBotPermissions { missing });
        }

        Ok(())
    }
}

/// Required flags not present in `actual`; administrators lack nothing
pub fn missing_permissions(actual: Permissions, required: Permissions) -> Permissions {
    if actual.contains(Permissions::ADMINISTRATOR) {
        return Permissions::empty();
    }
    required & !actual
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: u64 = 100;
    const MEMBER: u64 = 200;

    fn gate() -> PermissionGate {
        PermissionGate::new(HashSet::from([OWNER]))
    }

    #[test]
    fn test_no_requirements_allows() {
        let descriptor = HandlerDescriptor::command("ping");
        let actor = Actor::user(MEMBER, Permissions::empty());
        assert_eq!(gate().evaluate(&actor, Permissions::empty(), &descriptor), Ok(()));
    }

    #[test]
    fn test_owner_only_denies_non_owner() {
        let descriptor = HandlerDescriptor::command("blockip").owner_only();
        let actor = Actor::user(MEMBER, Permissions::ADMINISTRATOR);
        assert_eq!(
            gate().evaluate(&actor, Permissions::all(), &descriptor),
            Err(Denial::OwnerOnly)
        );
    }

    #[test]
    fn test_owner_only_allows_owner() {
        let descriptor = HandlerDescriptor::command("blockip").owner_only();
        let actor = Actor::user(OWNER, Permissions::empty());
        assert_eq!(gate().evaluate(&actor, Permissions::empty(), &descriptor), Ok(()));
    }

    #[test]
    fn test_owner_check_precedes_permission_check() {
        let descriptor = HandlerDescriptor::command("x")
            .owner_only()
            .user_permissions(Permissions::MANAGE_GUILD);
        let actor = Actor::user(MEMBER, Permissions::empty());
        assert_eq!(
            gate().evaluate(&actor, Permissions::empty(), &descriptor),
            Err(Denial::OwnerOnly)
        );
    }

    #[test]
    fn test_missing_user_permissions_named() {
        let descriptor = HandlerDescriptor::command("prefix")
            .user_permissions(Permissions::MANAGE_GUILD | Permissions::SEND_MESSAGES);
        let actor = Actor::user(MEMBER, Permissions::SEND_MESSAGES);

        assert_eq!(
            gate().evaluate(&actor, Permissions::all(), &descriptor),
            Err(Denial::InsufficientUserPermissions {
                missing: Permissions::MANAGE_GUILD
            })
        );
    }

    #[test]
    fn test_user_check_precedes_bot_check() {
        let descriptor = HandlerDescriptor::command("prefix")
            .user_permissions(Permissions::MANAGE_GUILD)
            .bot_permissions(Permissions::SEND_MESSAGES);
        let actor = Actor::user(MEMBER, Permissions::empty());

        assert!(matches!(
            gate().evaluate(&actor, Permissions::empty(), &descriptor),
            Err(Denial::InsufficientUserPermissions { .. })
        ));
    }

    #[test]
    fn test_missing_bot_permissions() {
        let descriptor = HandlerDescriptor::command("say")
            .bot_permissions(Permissions::SEND_MESSAGES | Permissions::EMBED_LINKS);
        let actor = Actor::user(MEMBER, Permissions::empty());

        assert_eq!(
            gate().evaluate(&actor, Permissions::SEND_MESSAGES, &descriptor),
            Err(Denial::InsufficientBotPermissions {
                missing: Permissions::EMBED_LINKS
            })
        );
    }

    #[test]
    fn test_administrator_implies_everything() {
        let descriptor = HandlerDescriptor::command("prefix")
            .user_permissions(Permissions::MANAGE_GUILD)
            .bot_permissions(Permissions::MANAGE_MESSAGES);
        let actor = Actor::user(MEMBER, Permissions::ADMINISTRATOR);

        assert_eq!(
            gate().evaluate(&actor, Permissions::ADMINISTRATOR, &descriptor),
            Ok(())
        );
    }

    #[test]
    fn test_owner_gets_no_permission_bypass() {
        let descriptor =
            HandlerDescriptor::command("prefix").user_permissions(Permissions::MANAGE_GUILD);
        let actor = Actor::user(OWNER, Permissions::empty());

        assert!(gate().evaluate(&actor, Permissions::all(), &descriptor).is_err());
    }
}
