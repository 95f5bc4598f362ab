//! Delivery channel adapters and registry.

pub mod channel;
mod chat;
mod email;
mod notifier;

pub use channel::{DeliveryChannel, DeliveryMessage, DeliveryReceipt, Recipient};
pub use chat::{ChatChannel, ChatTarget};
pub use email::EmailChannel;
pub use notifier::NotifierChannel;

use std::sync::Arc;

use crate::config::DeliveryConfig;
use crate::scheduling::models::ScheduledPrompt;

/// Registry of the configured delivery channels.
///
/// A channel slot stays empty when its endpoint is not configured; a
/// prompt that enables such a channel gets a configuration error string
/// in its execution result while the remaining channels still deliver.
#[derive(Clone, Default)]
pub struct ChannelRegistry {
    ai_chat: Option<Arc<dyn DeliveryChannel>>,
    chat: Option<Arc<dyn DeliveryChannel>>,
    notifier: Option<Arc<dyn DeliveryChannel>>,
    email: Option<Arc<dyn DeliveryChannel>>,
}

impl ChannelRegistry {
    pub fn from_config(config: &DeliveryConfig) -> Self {
        let timeout = config.timeout_seconds;

        let ai_chat = config.assistant_url.clone().map(|url| {
            Arc::new(ChatChannel::new(url, ChatTarget::Assistant, timeout))
                as Arc<dyn DeliveryChannel>
        });
        let chat = config.chat_url.clone().map(|url| {
            Arc::new(ChatChannel::new(url, ChatTarget::Direct, timeout))
                as Arc<dyn DeliveryChannel>
        });
        let notifier = config.notifier_url.clone().map(|url| {
            Arc::new(NotifierChannel::new(
                url,
                config.notifier_token.clone(),
                timeout,
            )) as Arc<dyn DeliveryChannel>
        });
        let email = config.email_url.clone().map(|url| {
            Arc::new(EmailChannel::new(
                url,
                config.email_token.clone(),
                config.email_from.clone().unwrap_or_default(),
                timeout,
            )) as Arc<dyn DeliveryChannel>
        });

        Self {
            ai_chat,
            chat,
            notifier,
            email,
        }
    }

    /// Channels enabled by the prompt's delivery flags, plus one error
    /// string per enabled-but-unconfigured channel.
    pub fn enabled_for(
        &self,
        prompt: &ScheduledPrompt,
    ) -> (Vec<Arc<dyn DeliveryChannel>>, Vec<String>) {
        let wanted = [
            (prompt.deliver_ai_chat, &self.ai_chat, "ai_chat"),
            (prompt.deliver_chat, &self.chat, "chat"),
            (prompt.deliver_notifier, &self.notifier, "notifier"),
            (prompt.deliver_email, &self.email, "email"),
        ];

        let mut channels = Vec::new();
        let mut missing = Vec::new();
        for (enabled, slot, name) in wanted {
            if !enabled {
                continue;
            }
            match slot {
                Some(channel) => channels.push(Arc::clone(channel)),
                None => missing.push(format!("delivery channel '{}' is not configured", name)),
            }
        }
        (channels, missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduling::models::test_prompt;

    fn config_with_chat_and_email() -> DeliveryConfig {
        DeliveryConfig {
            chat_url: Some("http://chat.internal/messages".to_string()),
            email_url: Some("http://mail.internal/send".to_string()),
            email_from: Some("herald@example.com".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn enabled_for_returns_only_configured_channels() {
        let registry = ChannelRegistry::from_config(&config_with_chat_and_email());
        let prompt = test_prompt(|p| {
            p.deliver_chat = true;
            p.deliver_email = true;
        });

        let (channels, missing) = registry.enabled_for(&prompt);
        assert_eq!(channels.len(), 2);
        assert!(missing.is_empty());
        let names: Vec<_> = channels.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["chat", "email"]);
    }

    #[test]
    fn unconfigured_channel_is_reported_not_dropped_silently() {
        let registry = ChannelRegistry::from_config(&config_with_chat_and_email());
        let prompt = test_prompt(|p| {
            p.deliver_chat = true;
            p.deliver_notifier = true;
        });

        let (channels, missing) = registry.enabled_for(&prompt);
        assert_eq!(channels.len(), 1);
        assert_eq!(missing.len(), 1);
        assert!(missing[0].contains("notifier"));
    }

    #[test]
    fn no_flags_means_no_channels() {
        let registry = ChannelRegistry::from_config(&config_with_chat_and_email());
        let prompt = test_prompt(|_| {});
        let (channels, missing) = registry.enabled_for(&prompt);
        assert!(channels.is_empty());
        assert!(missing.is_empty());
    }
}
