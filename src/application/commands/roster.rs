//! Roster commands: list, cyclePope, deferPope, addPope, removePope

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::quotes::dev_quote;
use super::PopeServices;
use crate::application::errors::{BotError, CommandError};
use crate::domain::entities::{CommandHandler, Invocation, RosterListing, User};
use crate::domain::traits::Directory;

/// Platform mention markup, e.g. `<@U024BE7LH>` or `<@U024BE7LH|bob>`
static MENTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^<@([A-Z0-9]+)(?:\|[^>]*)?>$").expect("valid mention pattern"));

/// Resolve a typed name or a mention to a platform user
pub async fn resolve_subject(directory: &dyn Directory, subject: &str) -> Result<Option<User>, BotError> {
    let mentioned = MENTION.captures(subject).map(|caps| caps[1].to_string());
    if let Some(id) = mentioned {
        return match directory.resolve_user_by_id(&id).await {
            Ok(user) => Ok(Some(user)),
            Err(BotError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        };
    }
    directory.resolve_user_by_name(subject).await
}

fn becoming_pope() -> String {
    format!(
        "You are now pope. If you are ever overwhelmed, just remember: \n\"{}\"",
        dev_quote()
    )
}

/// `list`
pub struct ListPopes {
    services: PopeServices,
}

impl ListPopes {
    pub fn new(services: PopeServices) -> Self {
        Self { services }
    }
}

#[async_trait]
impl CommandHandler for ListPopes {
    async fn handle(&self, invocation: Invocation) -> Result<(), CommandError> {
        let roster = self.services.roster.list().await?;
        let mut names = Vec::with_capacity(roster.len());
        for id in roster.iter() {
            names.push(self.services.name_of(id).await);
        }

        tracing::info!("{} was given the pope list", invocation.sender());
        tracing::debug!("Pope list is as follows: {:?}", names);

        let listing = RosterListing::new(names);
        self.services
            .notifier
            .send_private(invocation.sender(), &listing.to_string())
            .await?;
        Ok(())
    }
}

/// `cyclePope`
pub struct CyclePope {
    services: PopeServices,
}

impl CyclePope {
    pub fn new(services: PopeServices) -> Self {
        Self { services }
    }
}

#[async_trait]
impl CommandHandler for CyclePope {
    async fn handle(&self, invocation: Invocation) -> Result<(), CommandError> {
        let rotation = self.services.roster.cycle().await?;
        let previous_name = self.services.name_of(&rotation.previous).await;
        let current_name = self.services.name_of(&rotation.current).await;

        tracing::info!(
            "User {} ({}) was cycled out of pope and {} ({}) cycled in",
            previous_name,
            rotation.previous,
            current_name,
            rotation.current
        );

        self.services
            .notify(
                invocation.sender(),
                &format!(
                    "Popes cycled. {} has been replaced by {} as pope.",
                    previous_name, current_name
                ),
            )
            .await;
        self.services
            .notify(&rotation.previous, "You are no longer pope.")
            .await;
        self.services.notify(&rotation.current, &becoming_pope()).await;
        self.services
            .announce(&format!("{} is now pope, taking over from {}.", current_name, previous_name))
            .await;
        Ok(())
    }
}

/// `deferPope`
pub struct DeferPope {
    services: PopeServices,
}

impl DeferPope {
    pub fn new(services: PopeServices) -> Self {
        Self { services }
    }
}

#[async_trait]
impl CommandHandler for DeferPope {
    async fn handle(&self, invocation: Invocation) -> Result<(), CommandError> {
        let rotation = self.services.roster.defer().await?;
        let deferred_name = self.services.name_of(&rotation.previous).await;
        let current_name = self.services.name_of(&rotation.current).await;

        tracing::info!(
            "User {} ({}) was deferred as pope for a week in favor of {} ({})",
            deferred_name,
            rotation.previous,
            current_name,
            rotation.current
        );

        self.services
            .notify(
                invocation.sender(),
                &format!(
                    "{} will now be pope _next_. The current pope is now {}.",
                    deferred_name, current_name
                ),
            )
            .await;
        self.services
            .notify(&rotation.previous, "You are no longer pope.")
            .await;
        self.services.notify(&rotation.current, &becoming_pope()).await;
        self.services
            .announce(&format!("{} is now pope, {} is up next.", current_name, deferred_name))
            .await;
        Ok(())
    }
}

/// `addPope <user>`
pub struct AddPope {
    services: PopeServices,
}

impl AddPope {
    pub fn new(services: PopeServices) -> Self {
        Self { services }
    }
}

#[async_trait]
impl CommandHandler for AddPope {
    async fn handle(&self, invocation: Invocation) -> Result<(), CommandError> {
        let subject = invocation
            .param(0)
            .ok_or_else(|| CommandError::Validation("You must provide a user name!".to_string()))?;

        let Some(user) = resolve_subject(self.services.directory.as_ref(), subject).await? else {
            tracing::info!("User {} was not found, so no pope was added", subject);
            return Err(CommandError::NotFound(
                "User not found - no user added.".to_string(),
            ));
        };

        let id = self.services.roster.add(&user.id).await?;
        tracing::info!("User {} ({}) added to end of pope queue", user, id);

        self.services.notify(invocation.sender(), "Pope successfully added to end of queue.").await;
        self.services
            .notify(
                &id,
                "You have been added to the pope queue, making you eligible for pope duties.",
            )
            .await;
        Ok(())
    }
}

/// `removePope <user>`
pub struct RemovePope {
    services: PopeServices,
}

impl RemovePope {
    pub fn new(services: PopeServices) -> Self {
        Self { services }
    }
}

#[async_trait]
impl CommandHandler for RemovePope {
    async fn handle(&self, invocation: Invocation) -> Result<(), CommandError> {
        let subject = invocation
            .param(0)
            .ok_or_else(|| CommandError::Validation("You must provide a user name!".to_string()))?;

        let Some(user) = resolve_subject(self.services.directory.as_ref(), subject).await? else {
            tracing::info!("User {} was not found, so no pope was removed", subject);
            return Err(CommandError::NotFound(
                "User not found - no user removed.".to_string(),
            ));
        };

        let id = self.services.roster.remove(&user.id).await?;
        tracing::info!("User {} ({}) removed from the pope queue", user, id);

        self.services.notify(invocation.sender(), "Pope successfully removed from queue.").await;
        self.services
            .notify(
                &id,
                "You have been removed from the pope queue - you will no longer be pope.",
            )
            .await;
        Ok(())
    }
}
